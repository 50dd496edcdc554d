use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // バックアップ値を設定（.envファイルが存在しない場合のデフォルト値）
        if std::env::var("BIND_ADDR").is_err() {
            std::env::set_var("BIND_ADDR", "127.0.0.1:8080");
        }
        if std::env::var("CORS_ORIGIN").is_err() {
            std::env::set_var("CORS_ORIGIN", "http://localhost:3000");
        }
    });
}
