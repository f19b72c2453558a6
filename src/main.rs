use wedding_bot_rs::handlers;
use wedding_bot_rs::llm::OpenAiClient;
use wedding_bot_rs::store::PgGuestStore;
use wedding_bot_rs::types::AppState;

use std::env;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            (
                "wedding_bot_rs",
                tracing_subscriber::filter::LevelFilter::DEBUG,
            ),
        ]));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let openai_api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set!");
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set!");
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let store = PgGuestStore::connect(&database_url)
        .await
        .expect("failed to connect to database");
    let http_client = reqwest::Client::new();
    let llm = OpenAiClient::new(openai_api_key, http_client);

    let app_state = Arc::new(AppState {
        store: Arc::new(store),
        llm: Arc::new(llm),
    });
    let app = handlers::router(app_state);

    tracing::info!(port, "wedding bot listening");
    axum::Server::bind(&format!("0.0.0.0:{port}").parse().unwrap())
        .serve(app.into_make_service())
        .await
        .unwrap();
}
