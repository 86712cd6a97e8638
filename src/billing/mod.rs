pub mod merge;
pub mod status;

pub use merge::{merge_sources, MergedPayments, SourceOutcome};
pub use status::{classify_subscription, matches_filter, Classification, FilterCounts, FilterKind};
