use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::models::config::DebugConfig;
use crate::models::game::Game;

/// ゲーム1件分の行セット（ゲーム + プレイヤー + 中央カード）。
/// ゲーム内の読み書きはこのロックで直列化する。
pub type SharedGame = Arc<Mutex<Game>>;

#[derive(Clone)]
pub struct AppState {
    /// ゲームIDごとの行セット。外側のロックはハンドルの取得・登録だけに
    /// 使うので、別のゲーム同士が競合することはない。
    pub games: Arc<Mutex<HashMap<String, SharedGame>>>,
    pub debug_config: Arc<DebugConfig>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            games: Arc::new(Mutex::new(HashMap::new())),
            debug_config: Arc::new(DebugConfig::default()),
        }
    }

    pub async fn insert_game(&self, game: Game) -> SharedGame {
        let id = game.id.clone();
        let shared = Arc::new(Mutex::new(game));
        self.games.lock().await.insert(id, shared.clone());
        shared
    }

    pub async fn get_game(&self, game_id: &str) -> Option<SharedGame> {
        self.games.lock().await.get(game_id).cloned()
    }

    pub async fn remove_game(&self, game_id: &str) -> bool {
        self.games.lock().await.remove(game_id).is_some()
    }

    /// 全ゲームのハンドルのスナップショットを返す。中身を見る前に
    /// 外側のロックを手放すための入口。
    pub async fn list_games(&self) -> Vec<SharedGame> {
        self.games.lock().await.values().cloned().collect()
    }
}
