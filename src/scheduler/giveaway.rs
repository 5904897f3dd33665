use chrono::Utc;
use sea_orm::DatabaseConnection;
use serenity::http::Http;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{error::AppError, service::giveaway::GiveawayService};

/// Starts the giveaway sweep scheduler
///
/// Runs every minute and ends active giveaways whose end time has passed. Timers
/// armed in-process end giveaways on time; the sweep catches those whose timer
/// was lost, e.g. across a restart between two ready events.
///
/// # Arguments
/// - `db`: Database connection
/// - `discord_http`: Discord HTTP client for editing announcements
pub async fn start_scheduler(db: DatabaseConnection, discord_http: Arc<Http>) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let db = db.clone();
        let http = discord_http.clone();

        Box::pin(async move {
            match GiveawayService::new(&db, http).end_overdue(Utc::now()).await {
                Ok(0) => {}
                Ok(ended) => tracing::info!("Giveaway sweep ended {} overdue giveaways", ended),
                Err(e) => tracing::error!("Error sweeping overdue giveaways: {}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Giveaway scheduler started");

    Ok(())
}
