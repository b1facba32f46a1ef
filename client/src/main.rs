//! fridge-sync - prints every fridge and its shopping list.
//!
//! Reads its configuration from the environment (or a `.env` file) and
//! refreshes each list from the backend once.

use fridge_client::{
    api::{ApiClient, RestFridgeAdapter, RestGroceryAdapter},
    Config, IdentityGuard, KeyValueStore, ListController, MemoryStore, AUTH_TOKEN_KEY,
    USER_ID_KEY,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fridge_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Syncing with {}", config.api_url);

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    if let Some(token) = &config.api_token {
        storage.set(AUTH_TOKEN_KEY, token)?;
    }
    if let Some(user_id) = &config.user_id {
        storage.set(USER_ID_KEY, user_id)?;
    }

    let api = ApiClient::new(&config)?;
    let mut fridges = ListController::new(RestFridgeAdapter::new(api.clone()))
        .with_identity_guard(IdentityGuard::new(storage.clone()))
        .with_cache(storage.clone(), "fridges");

    if let Err(e) = fridges.refresh().await {
        let message = e.user_message();
        tracing::error!(error = %e, "Could not load fridges");
        eprintln!("{}: {}", message.title, message.message);
        std::process::exit(1);
    }

    for fridge in fridges.entities() {
        let Some(fridge_id) = fridge.id.as_server() else {
            continue;
        };
        println!("{} (#{})", fridge.name, fridge_id);

        let mut groceries = ListController::new(RestGroceryAdapter::new(api.clone(), fridge_id));
        if let Err(e) = groceries.refresh().await {
            tracing::warn!(fridge_id, error = %e, "Could not load shopping list");
            println!("  <{}>", e.user_message().message);
            continue;
        }
        for item in groceries.entities() {
            let mark = if item.purchased { "x" } else { " " };
            println!("  [{}] {} {} {}", mark, item.name, item.quantity, item.unit);
        }
    }

    Ok(())
}
