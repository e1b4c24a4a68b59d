//! Metrics Module
//! Headline figures shown above the charts.

use crate::stats::aggregator::{AggregatedRecord, TimeView};

/// Rated load per truck trip, in tons. Only meaningful against a single
/// day's figures.
pub const MAX_CAPACITY_TONS: f64 = 20.0;

/// KPI row values for the current aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total_tons: f64,
    pub average_load: f64,
    pub max_capacity: Option<f64>,
}

impl SummaryMetrics {
    pub fn from_aggregate(aggregate: &[AggregatedRecord], view: TimeView) -> Self {
        let total_tons: f64 = aggregate.iter().map(|a| a.total_tons).sum();
        let average_load = if aggregate.is_empty() {
            0.0
        } else {
            total_tons / aggregate.len() as f64
        };

        Self {
            total_tons,
            average_load,
            max_capacity: (view == TimeView::Daily).then_some(MAX_CAPACITY_TONS),
        }
    }

    pub fn capacity_label(&self) -> String {
        match self.max_capacity {
            Some(cap) => format!("{:.0} t", cap),
            None => "n/a".to_string(),
        }
    }
}

/// Format tonnage with thousands separators, no decimals.
pub fn format_tons(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Truck;
    use chrono::NaiveDate;

    fn agg(truck: Truck, tons: f64) -> AggregatedRecord {
        AggregatedRecord {
            period: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            truck,
            total_tons: tons,
        }
    }

    #[test]
    fn worked_example_totals() {
        let aggregate = vec![agg(Truck::Lemon, 8.0), agg(Truck::Blue, 10.0)];
        let metrics = SummaryMetrics::from_aggregate(&aggregate, TimeView::Daily);
        assert_eq!(metrics.total_tons, 18.0);
        assert_eq!(metrics.average_load, 9.0);
        assert_eq!(metrics.max_capacity, Some(MAX_CAPACITY_TONS));
    }

    #[test]
    fn empty_aggregate_averages_to_zero() {
        let metrics = SummaryMetrics::from_aggregate(&[], TimeView::Weekly);
        assert_eq!(metrics.total_tons, 0.0);
        assert_eq!(metrics.average_load, 0.0);
    }

    #[test]
    fn capacity_only_applies_to_daily_view() {
        let aggregate = vec![agg(Truck::Black, 12.0)];
        for view in [TimeView::Weekly, TimeView::Monthly] {
            let metrics = SummaryMetrics::from_aggregate(&aggregate, view);
            assert_eq!(metrics.max_capacity, None);
            assert_eq!(metrics.capacity_label(), "n/a");
        }
        let daily = SummaryMetrics::from_aggregate(&aggregate, TimeView::Daily);
        assert_eq!(daily.capacity_label(), "20 t");
    }

    #[test]
    fn tons_formatting_groups_thousands() {
        assert_eq!(format_tons(0.0), "0");
        assert_eq!(format_tons(999.4), "999");
        assert_eq!(format_tons(1234.0), "1,234");
        assert_eq!(format_tons(1234567.6), "1,234,568");
    }
}
