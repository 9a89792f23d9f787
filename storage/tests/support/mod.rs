use std::sync::Arc;

use assign_engine::AssignmentEngine;
use common::{BusinessCalendar, Clock, Counters, FixedClock};
use sqlx::PgPool;
use storage::{BroadcastEventSink, PgCallerRepository, PgDailyCounterStore, PgFairnessStore, PgLeadStore};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

static CONTAINER: OnceCell<(ContainerAsync<Postgres>, String)> = OnceCell::const_new();

async fn db_url() -> &'static str {
    let (_container, url) = CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.expect("start postgres container");
            let host = container.get_host().await.expect("container host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("container port");
            let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
            (container, url)
        })
        .await;
    url
}

pub struct Harness {
    pub pool: PgPool,
    pub engine: AssignmentEngine,
    pub events: Arc<BroadcastEventSink>,
    pub now: chrono::DateTime<chrono::Utc>,
}

impl Harness {
    pub async fn new(now: chrono::DateTime<chrono::Utc>) -> Self {
        let url = db_url().await;
        let pool = PgPool::connect(url).await.expect("connect to test database");
        storage::migrate(&pool).await.expect("run migrations");

        // Each test runs against a clean slate; truncation is cheap and
        // keeps the container (and its migrations) shared across the suite.
        sqlx::query(
            "TRUNCATE assignments, leads, caller_states, callers, rr_pointers, daily_counters",
        )
        .execute(&pool)
        .await
        .expect("truncate tables");

        let events = Arc::new(BroadcastEventSink::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
        let calendar = BusinessCalendar::from_iana_name("UTC").expect("UTC is a valid zone");

        let engine = AssignmentEngine::new(
            Arc::new(PgCallerRepository::new()),
            Arc::new(PgFairnessStore::new()),
            Arc::new(PgDailyCounterStore::new()),
            Arc::new(PgLeadStore::new()),
            events.clone(),
            clock,
            calendar,
            Counters::new(),
            3,
        );

        Self {
            pool,
            engine,
            events,
            now,
        }
    }

    /// Inserts a caller with the given states (lowercase) directly, since
    /// caller administration is out of scope for the engine itself.
    pub async fn seed_caller(&self, name: &str, daily_limit: i32, states: &[&str]) -> domain::CallerId {
        let id = domain::CallerId::new();
        sqlx::query(
            "INSERT INTO callers (id, name, daily_limit, status) VALUES ($1, $2, $3, 'active')",
        )
        .bind(id.0)
        .bind(name)
        .bind(daily_limit)
        .execute(&self.pool)
        .await
        .expect("insert caller");

        for state in states {
            sqlx::query("INSERT INTO caller_states (caller_id, state) VALUES ($1, $2)")
                .bind(id.0)
                .bind(state)
                .execute(&self.pool)
                .await
                .expect("insert caller_states");
        }
        id
    }

    pub async fn counter(&self, caller_id: domain::CallerId, date: chrono::NaiveDate) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "SELECT count FROM daily_counters WHERE caller_id = $1 AND business_date = $2",
        )
        .bind(caller_id.0)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .expect("query counter")
        .unwrap_or(0)
    }

    pub async fn pointer(&self, key: &domain::RoutingKey) -> Option<domain::CallerId> {
        sqlx::query_scalar::<_, Option<uuid::Uuid>>(
            "SELECT last_caller_id FROM rr_pointers WHERE routing_key = $1",
        )
        .bind(key.to_string())
        .fetch_optional(&self.pool)
        .await
        .expect("query pointer")
        .flatten()
        .map(domain::CallerId)
    }
}
