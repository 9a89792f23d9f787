pub mod config;

use std::sync::Arc;

use anyhow::Context;
use assign_engine::AssignmentEngine;
use common::{BusinessCalendar, Counters, SystemClock};
use sqlx::PgPool;
use storage::{BroadcastEventSink, PgCallerRepository, PgDailyCounterStore, PgFairnessStore, PgLeadStore};

use config::AppConfig;

/// Everything a caller needs to start ingesting leads: a live pool, the
/// assembled engine, and a handle to subscribe to assignment events.
pub struct AppState {
    pub pool: PgPool,
    pub engine: AssignmentEngine,
    pub events: Arc<BroadcastEventSink>,
}

/// Connects to Postgres, runs migrations, and wires the engine's
/// persistence adapters. Does not spawn any transport — ingestion is out
/// of scope.
pub async fn build(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let pool = PgPool::connect(&cfg.database_url)
        .await
        .context("failed to connect to Postgres")?;

    storage::migrate(&pool).await.context("failed to run migrations")?;

    let calendar = BusinessCalendar::from_iana_name(&cfg.business_timezone)
        .with_context(|| format!("invalid BUSINESS_TIMEZONE: {}", cfg.business_timezone))?;

    let events = Arc::new(BroadcastEventSink::with_capacity(cfg.event_channel_capacity));

    let engine = AssignmentEngine::new(
        Arc::new(PgCallerRepository::new()),
        Arc::new(PgFairnessStore::new()),
        Arc::new(PgDailyCounterStore::new()),
        Arc::new(PgLeadStore::new()),
        events.clone(),
        Arc::new(SystemClock),
        calendar,
        Counters::new(),
        cfg.max_transient_retries,
    );

    Ok(AppState { pool, engine, events })
}
