//! Stats module - filtering, aggregation, and KPI metrics

mod aggregator;
mod metrics;

pub use aggregator::{aggregate, period_start, AggregatedRecord, FilterSettings, TimeView};
pub use metrics::{format_tons, SummaryMetrics, MAX_CAPACITY_TONS};
