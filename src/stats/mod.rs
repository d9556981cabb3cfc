//! Stats module - per-year grant counts and shares

mod aggregator;

pub use aggregator::{concat_tables, AggregateError, GroupedCounts, YearSeries, FEMALE, MALE};
