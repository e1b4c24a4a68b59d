//! Aggregator Module
//! Applies the user's filters and buckets tonnage per (period, truck).

use crate::data::{NormalizedRecord, Truck};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Time bucketing for the trend view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeView {
    Daily,
    Weekly,
    Monthly,
}

impl Default for TimeView {
    fn default() -> Self {
        TimeView::Daily
    }
}

impl TimeView {
    pub const ALL: [TimeView; 3] = [TimeView::Daily, TimeView::Weekly, TimeView::Monthly];

    pub fn label(&self) -> &'static str {
        match self {
            TimeView::Daily => "Daily",
            TimeView::Weekly => "Weekly",
            TimeView::Monthly => "Monthly",
        }
    }
}

/// Resolved filter controls: time view, truck subset, and (Daily only) the
/// selected date.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub view: TimeView,
    pub trucks: BTreeSet<Truck>,
    pub date: Option<NaiveDate>,
}

impl FilterSettings {
    pub fn all_trucks(view: TimeView, date: Option<NaiveDate>) -> Self {
        Self {
            view,
            trucks: Truck::ALL.into_iter().collect(),
            date,
        }
    }
}

/// Tonnage summed over one (period, truck) group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRecord {
    pub period: NaiveDate,
    pub truck: Truck,
    pub total_tons: f64,
}

/// The time bucket a date falls into for the given view.
/// Weekly buckets start on Monday (ISO week); monthly on the 1st.
pub fn period_start(view: TimeView, date: NaiveDate) -> NaiveDate {
    match view {
        TimeView::Daily => date,
        TimeView::Weekly => {
            date - Duration::days(date.weekday().num_days_from_monday() as i64)
        }
        TimeView::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Filter and aggregate the normalized records.
///
/// Records with unselected trucks or missing dates are dropped. In Daily
/// view only records matching the selected date are kept (no selected date
/// means an empty result). Remaining records are grouped by (period, truck)
/// and their totals summed; output is sorted by (period, truck) and has at
/// most one row per group. An empty result is a normal state, not an error.
pub fn aggregate(records: &[NormalizedRecord], filter: &FilterSettings) -> Vec<AggregatedRecord> {
    let mut buckets: BTreeMap<(NaiveDate, Truck), f64> = BTreeMap::new();

    for record in records {
        if !filter.trucks.contains(&record.truck) {
            continue;
        }
        let Some(date) = record.date else {
            continue;
        };

        let period = match filter.view {
            TimeView::Daily => match filter.date {
                Some(selected) if selected == date => date,
                _ => continue,
            },
            view => period_start(view, date),
        };

        *buckets.entry((period, record.truck)).or_insert(0.0) += record.total_tons();
    }

    buckets
        .into_iter()
        .map(|((period, truck), total_tons)| AggregatedRecord {
            period,
            truck,
            total_tons,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: Option<&str>, truck: Truck, crusher: f64, rom: f64) -> NormalizedRecord {
        NormalizedRecord {
            date: date.map(|d| d.parse().unwrap()),
            truck,
            crusher_tons: Some(crusher),
            rom_pad_tons: Some(rom),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn daily_example_from_the_worked_case() {
        let records = vec![
            record(Some("2024-01-01"), Truck::Lemon, 5.0, 3.0),
            record(Some("2024-01-01"), Truck::Blue, 10.0, 0.0),
        ];
        let filter = FilterSettings::all_trucks(TimeView::Daily, Some(date("2024-01-01")));

        let agg = aggregate(&records, &filter);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].truck, Truck::Lemon);
        assert_eq!(agg[0].total_tons, 8.0);
        assert_eq!(agg[1].truck, Truck::Blue);
        assert_eq!(agg[1].total_tons, 10.0);
    }

    #[test]
    fn daily_view_is_exact_match_only() {
        let records = vec![
            record(Some("2024-01-01"), Truck::Lemon, 5.0, 0.0),
            record(Some("2024-01-02"), Truck::Lemon, 7.0, 0.0),
        ];
        let filter = FilterSettings::all_trucks(TimeView::Daily, Some(date("2024-01-02")));

        let agg = aggregate(&records, &filter);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].period, date("2024-01-02"));
        assert_eq!(agg[0].total_tons, 7.0);

        // No selected date: nothing matches.
        let filter = FilterSettings::all_trucks(TimeView::Daily, None);
        assert!(aggregate(&records, &filter).is_empty());
    }

    #[test]
    fn weekly_periods_start_on_monday() {
        // 2024-01-03 is a Wednesday; its ISO week starts 2024-01-01.
        assert_eq!(
            period_start(TimeView::Weekly, date("2024-01-03")),
            date("2024-01-01")
        );
        // A Monday is its own week start.
        assert_eq!(
            period_start(TimeView::Weekly, date("2024-01-08")),
            date("2024-01-08")
        );
        // A Sunday belongs to the week that began the previous Monday.
        assert_eq!(
            period_start(TimeView::Weekly, date("2024-01-07")),
            date("2024-01-01")
        );
    }

    #[test]
    fn month_boundary_belongs_to_its_own_month() {
        assert_eq!(
            period_start(TimeView::Monthly, date("2024-02-01")),
            date("2024-02-01")
        );
        assert_eq!(
            period_start(TimeView::Monthly, date("2024-02-29")),
            date("2024-02-01")
        );
    }

    #[test]
    fn weekly_buckets_sum_across_days() {
        let records = vec![
            record(Some("2024-01-01"), Truck::Yellow, 4.0, 0.0),
            record(Some("2024-01-03"), Truck::Yellow, 6.0, 0.0),
            record(Some("2024-01-08"), Truck::Yellow, 5.0, 0.0),
        ];
        let filter = FilterSettings::all_trucks(TimeView::Weekly, None);

        let agg = aggregate(&records, &filter);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].period, date("2024-01-01"));
        assert_eq!(agg[0].total_tons, 10.0);
        assert_eq!(agg[1].period, date("2024-01-08"));
        assert_eq!(agg[1].total_tons, 5.0);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut records = vec![
            record(Some("2024-01-01"), Truck::Lemon, 1.0, 0.0),
            record(Some("2024-01-02"), Truck::Blue, 2.0, 1.0),
            record(Some("2024-01-15"), Truck::Lemon, 3.0, 2.0),
            record(Some("2024-02-01"), Truck::Black, 4.0, 0.5),
            record(Some("2024-01-01"), Truck::Lemon, 0.5, 0.5),
        ];
        let filter = FilterSettings::all_trucks(TimeView::Monthly, None);

        let forward = aggregate(&records, &filter);
        records.reverse();
        records.rotate_left(2);
        let shuffled = aggregate(&records, &filter);

        assert_eq!(forward, shuffled);
    }

    #[test]
    fn unselected_trucks_and_missing_dates_are_dropped() {
        let records = vec![
            record(Some("2024-01-01"), Truck::Lemon, 5.0, 0.0),
            record(Some("2024-01-01"), Truck::Blue, 5.0, 0.0),
            record(None, Truck::Lemon, 99.0, 99.0),
        ];

        let filter = FilterSettings {
            view: TimeView::Monthly,
            trucks: [Truck::Lemon].into_iter().collect(),
            date: None,
        };
        let agg = aggregate(&records, &filter);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].truck, Truck::Lemon);
        assert_eq!(agg[0].total_tons, 5.0);

        let filter = FilterSettings {
            view: TimeView::Monthly,
            trucks: BTreeSet::new(),
            date: None,
        };
        assert!(aggregate(&records, &filter).is_empty());
    }

    #[test]
    fn undated_records_never_reach_any_aggregate() {
        let records = vec![record(None, Truck::Blue, 5.0, 5.0)];
        for view in TimeView::ALL {
            let filter = FilterSettings::all_trucks(view, Some(date("2024-01-01")));
            assert!(aggregate(&records, &filter).is_empty());
        }
    }
}
