pub mod clock;
pub mod logger;
pub mod metrics;

pub use clock::{BusinessCalendar, Clock, FixedClock, SystemClock};
pub use metrics::Counters;
