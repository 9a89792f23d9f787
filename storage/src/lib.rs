pub mod caller_repository;
pub mod counter_store;
pub mod events;
pub mod fairness_store;
pub mod lead_store;

pub use caller_repository::PgCallerRepository;
pub use counter_store::PgDailyCounterStore;
pub use events::BroadcastEventSink;
pub use fairness_store::PgFairnessStore;
pub use lead_store::PgLeadStore;

/// Runs the embedded schema migrations against `pool`. Intended for
/// service startup and integration-test setup alike.
pub async fn migrate(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
