//! Derived statistics over a snapshot of records.
//!
//! Nothing here is stored. Callers load the records, aggregate, render, and
//! throw the result away on the next refresh.

use itertools::Itertools;

use crate::record::{Category, TimerRecord};
use crate::time_series::SeriesPoint;
use crate::util;

/// Arithmetic mean of `durations`, 0.0 when empty
pub fn average(durations: &[f64]) -> f64 {
    util::average(durations)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub category: Category,
    pub durations: Vec<f64>,
    pub average: f64,
}

impl CategoryStats {
    pub fn count(&self) -> usize {
        self.durations.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSnapshot {
    pub count: usize,
    /// One entry per category, in `Category::ALL` order, including empty ones
    pub categories: Vec<CategoryStats>,
    pub global_average: f64,
}

impl AggregateSnapshot {
    pub fn category(&self, category: Category) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn average_for(&self, category: Category) -> f64 {
        self.category(category).map_or(0.0, |c| c.average)
    }

    pub fn count_for(&self, category: Category) -> usize {
        self.category(category).map_or(0, CategoryStats::count)
    }
}

/// Partition by category and average each partition and the whole
pub fn aggregate(records: &[TimerRecord]) -> AggregateSnapshot {
    let mut by_category = records
        .iter()
        .into_group_map_by(|r| r.category);

    let categories = Category::ALL
        .iter()
        .map(|&category| {
            let durations: Vec<f64> = by_category
                .remove(&category)
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.duration_seconds)
                .collect();
            CategoryStats {
                category,
                average: average(&durations),
                durations,
            }
        })
        .collect::<Vec<_>>();

    let all: Vec<f64> = categories
        .iter()
        .flat_map(|c| c.durations.iter().copied())
        .collect();

    AggregateSnapshot {
        count: records.len(),
        global_average: average(&all),
        categories,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: Category,
    pub points: Vec<SeriesPoint>,
}

/// Horizontal line at an average, spanning every plotted position
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// None for the global average
    pub category: Option<Category>,
    pub value: f64,
    pub points: [SeriesPoint; 2],
}

impl ReferenceLine {
    pub fn label(&self) -> String {
        match self.category {
            Some(category) => format!("Avg {category}"),
            None => "Avg Global".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    /// Number of positions on the x axis
    pub len: usize,
    pub series: Vec<CategorySeries>,
    pub references: Vec<ReferenceLine>,
}

/// Chart data for a newest-first record list.
///
/// Every record keeps its 1-based position in the full list, so a
/// category's series is sparse along the x axis rather than compacted.
pub fn chart_series(newest_first: &[TimerRecord]) -> ChartSeries {
    let len = newest_first.len();
    if len == 0 {
        return ChartSeries::default();
    }

    let series = Category::ALL
        .iter()
        .map(|&category| CategorySeries {
            category,
            points: newest_first
                .iter()
                .enumerate()
                .filter(|(_, r)| r.category == category)
                .map(|(i, r)| SeriesPoint::new((i + 1) as f64, r.duration_seconds))
                .collect(),
        })
        .collect::<Vec<_>>();

    let snapshot = aggregate(newest_first);
    let span = |value| {
        [
            SeriesPoint::new(1.0, value),
            SeriesPoint::new(len as f64, value),
        ]
    };

    let mut references = snapshot
        .categories
        .iter()
        .map(|c| ReferenceLine {
            category: Some(c.category),
            value: c.average,
            points: span(c.average),
        })
        .collect::<Vec<_>>();
    references.push(ReferenceLine {
        category: None,
        value: snapshot.global_average,
        points: span(snapshot.global_average),
    });

    ChartSeries {
        len,
        series,
        references,
    }
}
