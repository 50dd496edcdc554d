use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use crate::models::game::{GamePhase, GameStatus, Winner};
use crate::state::AppState;

use super::game_service::GameServiceError;

/// フェーズ遷移の結果。遷移しなかった場合は changed = false で現状を返す。
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub phase: GamePhase,
    pub changed: bool,
    pub eliminated_player_id: Option<String>,
    pub winner: Option<Winner>,
}

impl PhaseOutcome {
    fn unchanged(phase: GamePhase) -> Self {
        PhaseOutcome {
            phase,
            changed: false,
            eliminated_player_id: None,
            winner: None,
        }
    }
}

/// フェーズ遷移ガード。
///
/// クライアントのカウントダウンと進行役の手動操作が同じ遷移を同時に
/// 要求してくるため、解決処理は「現在フェーズが要求の前提と一致している
/// 場合だけ・一度だけ」適用しなければならない。ゲームごとのロックの下で
/// 遷移表を確認し、解決はコピーの上で行って成功した場合だけ書き戻す。
/// 競合に負けたリクエストは遷移済みのフェーズを観測して何もしない。
pub async fn advance_game_phase(
    state: AppState,
    game_id: &str,
    requested: GamePhase,
) -> Result<PhaseOutcome, GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let mut game = shared.lock().await;

    // 終了したゲームは一切遷移しない。前提フェーズが既に変わっていた
    // 場合も同様で、どちらも呼び出し側の誤りではなく無害な競合なので
    // エラーにはしない。
    if game.status == GameStatus::Finished || !game.phase.can_advance_to(requested) {
        debug!(
            "フェーズ遷移を無視しました: game={} phase={:?} requested={:?}",
            game_id, game.phase, requested
        );
        return Ok(PhaseOutcome::unchanged(game.phase));
    }

    // 解決はコピーの上で行い、成功した場合だけ書き戻す。途中でエラーに
    // なった遷移は部分適用されない。
    let mut working = game.clone();
    let mut outcome = PhaseOutcome {
        phase: requested,
        changed: true,
        eliminated_player_id: None,
        winner: None,
    };

    match (working.phase, requested) {
        (GamePhase::Night, GamePhase::Morning) | (GamePhase::Night, GamePhase::Day) => {
            outcome.eliminated_player_id = working.resolve_night()?;
            working.phase = requested;
            working.phase_started_at = Utc::now();
        }
        (GamePhase::Morning, GamePhase::Day) => {
            // 朝は夜の結果発表だけなので解決処理はない
            working.phase = GamePhase::Day;
            working.phase_started_at = Utc::now();
        }
        (GamePhase::Day, GamePhase::Night) => {
            let day = working.resolve_day()?;
            if let (Some(id), Some(role)) = (&day.eliminated_player_id, day.eliminated_role) {
                info!("投票で処刑されました: game={} player={} role={}", game_id, id, role);
            }
            outcome.eliminated_player_id = day.eliminated_player_id;
            if let Some(winner) = day.winner {
                working.status = GameStatus::Finished;
                working.winner = Some(winner);
                working.phase = GamePhase::Finished;
                outcome.phase = GamePhase::Finished;
                outcome.winner = Some(winner);
            } else {
                working.clear_actions();
                working.phase = GamePhase::Night;
                working.phase_started_at = Utc::now();
            }
        }
        // 遷移表で弾かれているのでここには来ない
        _ => return Ok(PhaseOutcome::unchanged(game.phase)),
    }

    info!(
        "フェーズを更新しました: game={} {:?} -> {:?}",
        game_id, game.phase, outcome.phase
    );
    if state.debug_config.verbose_logging {
        debug!("遷移後の状態: {:?}", working);
    }
    *game = working;

    Ok(outcome)
}
