use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::player::ActionTarget;
use crate::services::{action_service, game_service};
use crate::state::AppState;

use super::error_status;

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player_id: String,
    pub target_id: Option<ActionTarget>,
    pub target_id2: Option<ActionTarget>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // 最新の待機中ゲームに参加
        // curl -X POST http://localhost:8080/api/game/join -H 'Content-Type: application/json' -d '{"name":"Alice"}'
        .route("/join", post(join_game))
        // ゲーム状態取得
        // curl http://localhost:8080/api/game/{gameid}/state
        .route("/:gameid/state", get(get_game_state))
        // 夜アクション・昼投票の送信
        // curl -X POST http://localhost:8080/api/game/{gameid}/action -H 'Content-Type: application/json' -d '{"player_id":"...","target_id":"center_0"}'
        .route("/:gameid/action", post(submit_action_handler))
        // 不眠症の最終役職の確認
        // curl http://localhost:8080/api/game/{gameid}/night-reveal/{playerid}
        .route("/:gameid/night-reveal/:playerid", get(night_reveal_handler))
        .with_state(state)
}

async fn join_game(State(state): State<AppState>, Json(req): Json<JoinRequest>) -> impl IntoResponse {
    match game_service::join_game(state, &req.name).await {
        Ok((game_id, player_id)) => (
            StatusCode::OK,
            Json(json!({ "game_id": game_id, "player_id": player_id })),
        ),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn get_game_state(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> impl IntoResponse {
    match game_service::get_game_state(state, &game_id).await {
        Ok(view) => (StatusCode::OK, Json(json!({ "game": view }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn submit_action_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<ActionRequest>,
) -> impl IntoResponse {
    match action_service::submit_action(state, &game_id, &req.player_id, req.target_id, req.target_id2)
        .await
    {
        Ok(revealed) => (StatusCode::OK, Json(json!({ "revealed": revealed }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}

async fn night_reveal_handler(
    State(state): State<AppState>,
    Path((game_id, player_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match game_service::night_reveal(state, &game_id, &player_id).await {
        Ok(role) => (StatusCode::OK, Json(json!({ "role": role }))),
        Err(e) => (error_status(&e), Json(json!({ "error": e.to_string() }))),
    }
}
