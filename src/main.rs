use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use words_book::config::{Config, StoreBackend};
use words_book::store::{EntityStore, MemoryStore, PgStore};
use words_book::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 初始化日志系统
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. 加载 .env 环境变量
    dotenv().ok();
    let config = Config::from_env()?;

    // 3. 初始化存储
    let store: Arc<dyn EntityStore> = match config.backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().unwrap_or_default();
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("Failed to create database connection pool")?;
            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run database migrations")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("使用内存存储, 重启后数据会丢失");
            Arc::new(MemoryStore::new())
        }
    };

    let shared_state = Arc::new(AppState { store });

    // 4. 构建路由并启动服务
    let app = app(shared_state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Server started at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
