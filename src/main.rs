//! Storefront API server.

use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::api::{self, AppState};
use storefront_api::domain::aggregates::{Category, Product};
use storefront_api::store::Db;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Arc::new(Db::new());
    if std::env::var("SEED_DEMO").is_ok() {
        seed_demo(&db).await;
    }

    let state = AppState { db };
    let app = api::router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    tracing::info!("storefront API listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

/// A few demo products so the storefront isn't empty on first run.
async fn seed_demo(db: &Db) {
    let catalog = [
        ("iPhone 14 Pro", "Flagship phone with A16 Bionic chip", 99999, Category::Electronics, "Apple", 50),
        ("Galaxy S23", "Premium Android smartphone", 79999, Category::Electronics, "Samsung", 35),
        ("Air Max 270", "Running shoes with Air Max cushioning", 12999, Category::Sports, "Nike", 100),
        ("The Pragmatic Programmer", "Classic software craftsmanship book", 450, Category::Books, "Addison-Wesley", 200),
    ];
    for (name, description, price, category, brand, stock) in catalog {
        db.products
            .insert(Product::new(name, description, Decimal::from(price), category, brand, stock))
            .await;
    }
    tracing::info!(count = catalog.len(), "seeded demo catalog");
}
