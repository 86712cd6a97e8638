pub mod aggregator;
pub mod progress;

pub use aggregator::{compose_dashboard, monthly_dashboard, revenue_timeline, RevenueSources};
