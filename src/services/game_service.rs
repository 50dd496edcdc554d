use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    game::{Game, GameError, GamePhase, GameStatus, Winner},
    player::Player,
    role::Role,
    roster::RoleConfig,
};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum GameServiceError {
    #[error("ゲームが見つかりません: {0}")]
    GameNotFound(String),
    #[error("参加できる待機中のゲームがありません")]
    NoOpenGame,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// 紛らわしい文字を除いた共有コード用の文字集合
const CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

fn generate_short_id<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// クライアントに返すゲームの外観。中央カードは枚数だけを見せる。
#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: String,
    pub short_id: String,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub winner: Option<Winner>,
    pub phase_started_at: DateTime<Utc>,
    pub phase_duration_seconds: u64,
    pub created_at: DateTime<Utc>,
    pub players: Vec<Player>,
    pub center_card_count: usize,
}

impl GameView {
    fn build(game: &Game, phase_duration_seconds: u64) -> Self {
        GameView {
            id: game.id.clone(),
            short_id: game.short_id.clone(),
            status: game.status,
            phase: game.phase,
            winner: game.winner,
            phase_started_at: game.phase_started_at,
            phase_duration_seconds,
            created_at: game.created_at,
            players: game.players.clone(),
            center_card_count: game.center_cards.len(),
        }
    }
}

/// 管理画面のセッション一覧の1行。
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub short_id: String,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub player_count: usize,
    pub created_at: DateTime<Utc>,
}

pub async fn create_game(state: AppState) -> (String, String) {
    let id = Uuid::new_v4().to_string();
    let short_id = generate_short_id(&mut rand::thread_rng());
    let game = Game::new(id.clone(), short_id.clone());
    state.insert_game(game).await;
    info!("ゲームを作成しました: {} ({})", id, short_id);
    (id, short_id)
}

/// 最新の待機中ゲームに参加する。最初に参加したプレイヤーがホストになる。
pub async fn join_game(
    state: AppState,
    name: &str,
) -> Result<(String, String), GameServiceError> {
    // 待機中のゲームのうち作成が最も新しいものを選ぶ
    let mut newest: Option<(crate::state::SharedGame, DateTime<Utc>)> = None;
    for shared in state.list_games().await {
        let game = shared.lock().await;
        if game.status != GameStatus::Waiting {
            continue;
        }
        let created = game.created_at;
        drop(game);
        match &newest {
            Some((_, best)) if *best >= created => {}
            _ => newest = Some((shared, created)),
        }
    }
    let (shared, _) = newest.ok_or(GameServiceError::NoOpenGame)?;

    let mut game = shared.lock().await;
    // 選んでから取り直すまでの間に開始されていたら参加できない
    if game.status != GameStatus::Waiting {
        return Err(GameServiceError::NoOpenGame);
    }
    let player_id = Uuid::new_v4().to_string();
    let is_host = game.players.is_empty();
    game.players
        .push(Player::new(player_id.clone(), name.to_string(), is_host));
    info!("プレイヤーが参加しました: {} -> {}", name, game.id);
    Ok((game.id.clone(), player_id))
}

/// 役職を配ってゲームを開始する。戻り値は中央カードの枚数。
pub async fn start_game(
    state: AppState,
    game_id: &str,
    role_config: Option<RoleConfig>,
) -> Result<usize, GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    // 既定の構成で誤魔化さず、構成なしはエラーにする
    let config = role_config.ok_or(GameError::ConfigRequired)?;

    let mut game = shared.lock().await;
    let center_count = game.deal(&config, &mut rand::thread_rng())?;
    info!(
        "ゲームを開始しました: {} (プレイヤー{}人 / 中央{}枚)",
        game_id,
        game.players.len(),
        center_count
    );
    Ok(center_count)
}

pub async fn reset_game(state: AppState, game_id: &str) -> Result<(), GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let mut game = shared.lock().await;
    game.reset_to_lobby();
    info!("ゲームをロビーに戻しました: {}", game_id);
    Ok(())
}

pub async fn delete_game(state: AppState, game_id: &str) -> Result<(), GameServiceError> {
    if state.remove_game(game_id).await {
        info!("ゲームを削除しました: {}", game_id);
        Ok(())
    } else {
        Err(GameServiceError::GameNotFound(game_id.to_string()))
    }
}

pub async fn kick_player(
    state: AppState,
    game_id: &str,
    player_id: &str,
) -> Result<(), GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let mut game = shared.lock().await;
    let index = game
        .players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))?;
    game.players.remove(index);
    Ok(())
}

pub async fn get_game_state(
    state: AppState,
    game_id: &str,
) -> Result<GameView, GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let game = shared.lock().await;
    Ok(GameView::build(
        &game,
        state.debug_config.phase_duration_seconds,
    ))
}

/// 不眠症の最終役職を読み出す。夜の解決後にのみ値が入る。
pub async fn night_reveal(
    state: AppState,
    game_id: &str,
    player_id: &str,
) -> Result<Option<Role>, GameServiceError> {
    let shared = state
        .get_game(game_id)
        .await
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
    let game = shared.lock().await;
    let player = game
        .player(player_id)
        .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))?;
    Ok(player.night_reveal)
}

pub async fn list_sessions(state: AppState) -> Vec<SessionSummary> {
    let mut sessions = Vec::new();
    for shared in state.list_games().await {
        let game = shared.lock().await;
        sessions.push(SessionSummary {
            id: game.id.clone(),
            short_id: game.short_id.clone(),
            status: game.status,
            phase: game.phase,
            player_count: game.players.len(),
            created_at: game.created_at,
        });
    }
    // 新しい順に最大20件
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sessions.truncate(20);
    sessions
}
