use axum::http::StatusCode;
use axum::Router;

use crate::models::game::GameError;
use crate::services::game_service::GameServiceError;
use crate::state::AppState;

mod admin;
mod game;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/game", game::routes(state.clone()))
        .nest("/api/admin", admin::routes(state.clone()))
}

/// サービスエラーをHTTPステータスに対応づける。
pub(crate) fn error_status(err: &GameServiceError) -> StatusCode {
    match err {
        GameServiceError::GameNotFound(_) | GameServiceError::NoOpenGame => StatusCode::NOT_FOUND,
        GameServiceError::Game(game_err) => match game_err {
            GameError::PlayerNotFound(_) | GameError::TargetNotFound(_) => StatusCode::NOT_FOUND,
            GameError::NoPlayers
            | GameError::ConfigRequired
            | GameError::MissingTarget
            | GameError::PlayerDead(_) => StatusCode::BAD_REQUEST,
            GameError::CorruptedRoster(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}
