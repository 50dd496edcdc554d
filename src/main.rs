use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use server::app;
use server::utils::config::CONFIG;

// ログ設定
fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("tower_http", LevelFilter::Debug)
        .filter_module("server", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    init_logger();

    // CORSレイヤーの設定
    let origins = [CONFIG.cors_origin.parse::<HeaderValue>().unwrap()];
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE]);

    // ルーティングの設定
    let app = app::create_app().layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    // サーバーの起動
    let listener = tokio::net::TcpListener::bind(&CONFIG.bind_addr).await.unwrap();

    println!("サーバーを起動しました: http://{}", CONFIG.bind_addr);
    axum::serve(listener, app).await.unwrap();
}
