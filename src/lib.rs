use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use models::EntityKind;
use store::EntityStore;

// 全局状态：Handler 里通过它拿到存储
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
}

/// 构建路由：每类条目一个 `/api/{resource}`，外加 `/random`
pub fn app(state: Arc<AppState>) -> Router {
    // 浏览器插件和启动器从别的源调用，放开跨域
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new().route("/health", get(|| async { "OK" }));
    for kind in EntityKind::ALL {
        let base = format!("/api/{}", kind.resource());
        router = router
            .route(&base, handlers::collection_handler::collection_methods(kind))
            .route(&format!("{base}/random"), handlers::collection_handler::random_method(kind));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
