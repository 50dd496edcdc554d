use std::env;

#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    // フェーズ遷移後にゲーム全体の状態をログに出すかどうか
    pub verbose_logging: bool,
    // クライアントのカウントダウンに使う各フェーズの制限時間
    pub phase_duration_seconds: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        let debug_mode = cfg!(debug_assertions) || env::var("DEBUG_MODE").is_ok();

        Self {
            enabled: debug_mode,
            verbose_logging: debug_mode,
            phase_duration_seconds: 60,
        }
    }
}

impl DebugConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEBUG_ENABLED")
            .map(|v| v == "true")
            .unwrap_or_else(|_| cfg!(debug_assertions));
        let verbose_logging = env::var("DEBUG_VERBOSE_LOGGING")
            .map(|v| v == "true")
            .unwrap_or(enabled);
        let phase_duration_seconds = env::var("PHASE_DURATION_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        Self {
            enabled,
            verbose_logging,
            phase_duration_seconds,
        }
    }
}
