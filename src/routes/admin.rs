use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::game::GamePhase;
use crate::models::roster::RoleConfig;
use crate::services::{game_service, phase_service};
use crate::state::AppState;

use super::error_status;

#[derive(Debug, Serialize, Deserialize)]
pub struct StartRequest {
    pub role_config: Option<RoleConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhaseRequest {
    pub next_phase: GamePhase,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // ゲーム作成
        // curl -X POST http://localhost:8080/api/admin/create
        .route("/create", post(create_game))
        // セッション一覧
        // curl http://localhost:8080/api/admin/sessions
        .route("/sessions", get(get_sessions))
        // ゲーム削除
        // curl -X DELETE http://localhost:8080/api/admin/{gameid}
        .route("/:gameid", delete(delete_game))
        // 配役してゲーム開始
        // curl -X POST http://localhost:8080/api/admin/{gameid}/start -H 'Content-Type: application/json' -d '{"role_config":{"werewolf":2,"seer":1,"villager":5}}'
        .route("/:gameid/start", post(start_game))
        // フェーズを進める（夜・昼の解決はここで走る）
        // curl -X POST http://localhost:8080/api/admin/{gameid}/phase/next -H 'Content-Type: application/json' -d '{"next_phase":"day"}'
        .route("/:gameid/phase/next", post(advance_phase_handler))
        // ロビーに戻す
        // curl -X POST http://localhost:8080/api/admin/{gameid}/reset
        .route("/:gameid/reset", post(reset_game))
        // プレイヤーの退場
        // curl -X POST http://localhost:8080/api/admin/{gameid}/kick/{playerid}
        .route("/:gameid/kick/:playerid", post(kick_player))
        .with_state(state)
}

async fn create_game(State(state): State<AppState>) -> impl IntoResponse {
    let (game_id, short_id) = game_service::create_game(state).await;
    (
        StatusCode::OK,
        Json(json!({ "game_id": game_id, "short_id": short_id })),
    )
}

async fn get_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = game_service::list_sessions(state).await;
    (StatusCode::OK, Json(json!({ "sessions": sessions })))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> impl IntoResponse {
    match game_service::delete_game(state, &game_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<StartRequest>,
) -> impl IntoResponse {
    match game_service::start_game(state, &game_id, req.role_config).await {
        Ok(center_count) => (
            StatusCode::OK,
            Json(json!({ "center_card_count": center_count })),
        ),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<PhaseRequest>,
) -> impl IntoResponse {
    match phase_service::advance_game_phase(state, &game_id, req.next_phase).await {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn reset_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> impl IntoResponse {
    match game_service::reset_game(state, &game_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn kick_player(
    State(state): State<AppState>,
    Path((game_id, player_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match game_service::kick_player(state, &game_id, &player_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}
