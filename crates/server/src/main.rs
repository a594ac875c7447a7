// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod live;
mod session;

#[cfg(test)]
mod tests;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use reparto_api::{LifecycleService, SystemClock};
use reparto_domain::BusinessHours;
use reparto_live::{HubConfig, NotificationHub, NotificationSink};
use reparto_persistence::Persistence;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Reparto Server - order lifecycle and live notifications for deliveries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone the business hours are expressed in
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Opening time of day, `HH:MM`
    #[arg(long, default_value = "09:00")]
    opens_at: String,

    /// Closing time of day, `HH:MM`; earlier than the opening time wraps midnight
    #[arg(long, default_value = "21:00")]
    closes_at: String,

    /// How long a live delivery may wait on a slow connection, in milliseconds
    #[arg(long, default_value_t = 2_000)]
    delivery_timeout_ms: u64,

    /// Events buffered per live connection
    #[arg(long, default_value_t = 32)]
    connection_buffer: usize,
}

/// Application state shared across handlers.
///
/// Storage is a single connection behind an async mutex; the hub is shared
/// by the lifecycle service (as its notification sink) and the live channel.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    service: Arc<LifecycleService>,
    hub: Arc<NotificationHub>,
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/orders",
            post(handlers::handle_create_order).get(handlers::handle_list_orders),
        )
        .route("/orders/nearby", get(handlers::handle_find_nearby))
        .route("/orders/{id}", get(handlers::handle_get_order))
        .route("/orders/{id}/history", get(handlers::handle_order_history))
        .route("/orders/{id}/status", post(handlers::handle_update_status))
        .route("/orders/{id}/assign", post(handlers::handle_assign))
        .route("/orders/{id}/eta", post(handlers::handle_set_eta))
        .route("/live", get(live::live_events_handler))
        .route("/health", get(handlers::handle_health))
        .with_state(app_state)
}

async fn shutdown_signal(hub: Arc<NotificationHub>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown requested");
    // Closing every live queue lets the socket workers finish, which lets
    // the graceful shutdown complete.
    hub.shutdown().await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Reparto Server");

    let hours: BusinessHours = BusinessHours::new(&args.timezone, &args.opens_at, &args.closes_at)
        .inspect_err(|e| error!(error = %e, "Invalid business hours"))?;
    info!(
        timezone = %args.timezone,
        opens_at = %args.opens_at,
        closes_at = %args.closes_at,
        "Business hours configured"
    );

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let (hub, dispatcher) = NotificationHub::new(HubConfig {
        delivery_timeout: Duration::from_millis(args.delivery_timeout_ms),
        connection_buffer: args.connection_buffer,
    });
    tokio::spawn(dispatcher.run());

    let sink: Arc<dyn NotificationSink> = hub.clone();
    let service = LifecycleService::new(hours, Arc::new(SystemClock), sink);
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        service: Arc::new(service),
        hub: Arc::clone(&hub),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&hub)))
        .await?;

    info!("Server stopped");
    Ok(())
}
