use common::logger::init_logger;
use service::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cfg = AppConfig::from_env();

    init_logger("assign-engine", cfg.log_json);

    let state = service::build(&cfg).await?;

    tracing::info!(business_timezone = %cfg.business_timezone, "assignment engine ready");

    let mut events = state.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(
                lead_id = %event.assignment.lead_id,
                caller_id = ?event.assignment.caller_id,
                reason = %event.assignment.reason,
                "assignment committed"
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
