mod bot;
mod command;
mod config;
mod data;
mod error;
mod middleware;
mod model;
mod router;
mod scheduler;
mod service;
mod startup;
mod state;
mod util;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::AppError, scheduler::giveaway};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let db = startup::connect_to_database(&config).await?;

    let client = bot::start::init_bot(config.clone(), db.clone()).await?;

    giveaway::start_scheduler(db, client.http.clone()).await?;

    bot::start::start_bot(client).await
}
