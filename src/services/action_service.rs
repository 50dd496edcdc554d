use log::debug;

use crate::models::{game::RevealedInfo, player::ActionTarget};
use crate::state::AppState;

use super::game_service::GameServiceError;

/// 夜アクション・昼投票の送信。対象はプレイヤー自身の行にだけ書き込まれる
/// ので、別々のプレイヤーからの同時送信は競合しない。同じプレイヤーの
/// 再送信は上書きになる。
pub async fn submit_action(
    state: AppState,
    game_id: &str,
    player_id: &str,
    target: Option<ActionTarget>,
    target_secondary: Option<ActionTarget>,
) -> Result<Option<RevealedInfo>, GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let mut game = shared.lock().await;
    let revealed = game.record_action(player_id, target, target_secondary)?;
    debug!(
        "アクションを記録しました: game={} player={} reveal={}",
        game_id,
        player_id,
        revealed.is_some()
    );
    Ok(revealed)
}
