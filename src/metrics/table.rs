//! Filterable, sortable view over derived metrics

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{DerivedOptionMetric, TableFilter};
use crate::core::OptionType;

/// Sortable column of the metrics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    Expiration,
    OptionType,
    Strike,
    DayDiff,
    Delta,
    ProbabilityOfProfit,
    OpenInterest,
    Volume,
    Premium,
    Leverage,
    BidSize,
    AskSize,
    Roi,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One level of a multi-column sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: MetricColumn,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: MetricColumn) -> Self {
        Self { column, direction: SortDirection::Asc }
    }

    pub fn desc(column: MetricColumn) -> Self {
        Self { column, direction: SortDirection::Desc }
    }
}

fn column_value(row: &DerivedOptionMetric, column: MetricColumn) -> Option<f64> {
    let c = &row.contract;
    let value = match column {
        MetricColumn::Expiration => c.expiration.timestamp_millis() as f64,
        MetricColumn::OptionType => match c.option_type {
            OptionType::Call => 0.0,
            OptionType::Put => 1.0,
        },
        MetricColumn::Strike => c.strike,
        MetricColumn::DayDiff => row.day_diff as f64,
        MetricColumn::Delta => return c.delta,
        MetricColumn::ProbabilityOfProfit => row.probability_of_profit,
        MetricColumn::OpenInterest => c.open_interest as f64,
        MetricColumn::Volume => c.volume as f64,
        MetricColumn::Premium => row.premium,
        MetricColumn::Leverage => row.leverage,
        MetricColumn::BidSize => c.bid_size as f64,
        MetricColumn::AskSize => c.ask_size as f64,
        MetricColumn::Roi => row.roi,
        MetricColumn::LowerBound => row.lower_bound,
        MetricColumn::UpperBound => row.upper_bound,
    };
    Some(value)
}

/// Flattened metrics table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    rows: Vec<DerivedOptionMetric>,
}

impl MetricsTable {
    pub fn new(rows: Vec<DerivedOptionMetric>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DerivedOptionMetric] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<DerivedOptionMetric> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows passing the ROI floor, |delta| ceiling and optional cone screen
    pub fn filter(&self, filter: &TableFilter) -> MetricsTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.roi >= filter.min_roi)
            .filter(|r| matches!(r.delta(), Some(d) if d.abs() <= filter.max_abs_delta))
            .filter(|r| !filter.beyond_cone || r.is_beyond_cone())
            .cloned()
            .collect();
        MetricsTable { rows }
    }

    /// Stable sort by `keys` in priority order; rows without a value sort last
    pub fn sort_by(&mut self, keys: &[SortKey]) {
        self.rows.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    match (column_value(a, key.column), column_value(b, key.column)) {
                        (Some(x), Some(y)) => match key.direction {
                            SortDirection::Asc => x.total_cmp(&y),
                            SortDirection::Desc => y.total_cmp(&x),
                        },
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Rows of page `page` (zero-based) with `page_size` rows per page
    pub fn page(&self, page: usize, page_size: usize) -> &[DerivedOptionMetric] {
        let start = page.saturating_mul(page_size).min(self.rows.len());
        let end = start.saturating_add(page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

impl From<Vec<DerivedOptionMetric>> for MetricsTable {
    fn from(rows: Vec<DerivedOptionMetric>) -> Self {
        Self::new(rows)
    }
}
