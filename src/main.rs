use std::sync::Arc;

use dotenvy::dotenv;
use storefront_client::application::auth::AuthWorkflow;
use storefront_client::application::cart::CartWorkflow;
use storefront_client::domain::session::Credentials;
use storefront_client::infrastructure::http_gateway::HttpGateway;
use storefront_client::infrastructure::session_file::FileSessionStore;
use storefront_client::Config;

/// Smoke binary: log in with credentials from the environment and print
/// the cart summary the workflows see.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let email = std::env::var("STOREFRONT_EMAIL").expect("STOREFRONT_EMAIL must be set");
    let password = std::env::var("STOREFRONT_PASSWORD").expect("STOREFRONT_PASSWORD must be set");

    let gateway = Arc::new(HttpGateway::new(
        config.base_url.clone(),
        config.request_timeout,
    )?);

    let auth = AuthWorkflow::new(
        Arc::clone(&gateway),
        FileSessionStore::new(config.session_path.clone()),
    );
    let session = auth.login(&Credentials { email, password }).await?;
    log::info!("Signed in as {} ({})", session.user.name, session.user.email);

    let cart = CartWorkflow::new(gateway, config.reconcile_delay);
    cart.refresh().await?;
    let snapshot = cart.cart();
    log::info!(
        "Cart: {} item(s), subtotal {}, total {}",
        snapshot.total_items,
        snapshot.subtotal,
        snapshot.total_amount
    );
    for item in &snapshot.items {
        log::info!(
            "  {} x{} = {}",
            item.product.name,
            item.quantity,
            item.line_total
        );
    }

    Ok(())
}
