//! Leaders Module
//! Nationality distribution and career points/wins rankings.

use super::{driver_names, driver_refs, f64_values, i64_values, inner_on, str_values, AnalysisError, DriverRef};
use crate::data::Tables;
use polars::prelude::*;

/// Bucket for drivers whose nationality is missing.
pub const UNKNOWN_NATIONALITY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalityCount {
    pub nationality: String,
    pub drivers: usize,
}

/// Driver counts per nationality plus the configured nationality's share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalityDistribution {
    /// Ranked by count descending, then nationality ascending.
    pub ranked: Vec<NationalityCount>,
    pub total_drivers: usize,
    pub target: String,
    pub target_count: usize,
}

impl NationalityDistribution {
    /// Drivers of every other nationality.
    pub fn others_count(&self) -> usize {
        self.total_drivers - self.target_count
    }

    pub fn top(&self, n: usize) -> &[NationalityCount] {
        &self.ranked[..n.min(self.ranked.len())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverPoints {
    pub driver: DriverRef,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverWins {
    pub driver: DriverRef,
    pub wins: usize,
}

/// Count drivers per nationality.
pub fn nationality_distribution(
    tables: &Tables,
    target: &str,
) -> Result<NationalityDistribution, AnalysisError> {
    let counts = tables
        .drivers
        .clone()
        .lazy()
        .select([col("nationality").fill_null(lit(UNKNOWN_NATIONALITY))])
        .group_by([col("nationality")])
        .agg([len().cast(DataType::Int64).alias("drivers")])
        .sort_by_exprs(
            [col("drivers"), col("nationality")],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let ranked: Vec<NationalityCount> = str_values(&counts, "nationality")?
        .into_iter()
        .zip(i64_values(&counts, "drivers")?)
        .map(|(nationality, drivers)| NationalityCount {
            nationality: nationality.unwrap_or_else(|| UNKNOWN_NATIONALITY.to_string()),
            drivers: drivers.unwrap_or(0) as usize,
        })
        .collect();

    let target_count = ranked
        .iter()
        .find(|c| c.nationality == target)
        .map(|c| c.drivers)
        .unwrap_or(0);

    Ok(NationalityDistribution {
        total_drivers: tables.drivers.height(),
        ranked,
        target: target.to_string(),
        target_count,
    })
}

/// Career points per driver, highest first; ties by driver identifier.
pub fn points_leaders(tables: &Tables) -> Result<Vec<DriverPoints>, AnalysisError> {
    let totals = tables
        .results
        .clone()
        .lazy()
        .group_by([col("driverId")])
        .agg([col("points").sum().alias("points")]);

    let ranked = inner_on(totals, driver_names(tables), "driverId")
        .sort_by_exprs(
            [col("points"), col("driverId")],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    Ok(driver_refs(&ranked)?
        .into_iter()
        .zip(f64_values(&ranked, "points")?)
        .filter_map(|(driver, points)| {
            Some(DriverPoints {
                driver: driver?,
                points: points.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Career wins (finishing position 1) per driver, most first; ties by driver
/// identifier. Drivers without a win are absent.
pub fn win_leaders(tables: &Tables) -> Result<Vec<DriverWins>, AnalysisError> {
    let totals = tables
        .results
        .clone()
        .lazy()
        .filter(col("positionOrder").eq(lit(1i64)))
        .group_by([col("driverId")])
        .agg([len().cast(DataType::Int64).alias("wins")]);

    let ranked = inner_on(totals, driver_names(tables), "driverId")
        .sort_by_exprs(
            [col("wins"), col("driverId")],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    Ok(driver_refs(&ranked)?
        .into_iter()
        .zip(i64_values(&ranked, "wins")?)
        .filter_map(|(driver, wins)| {
            Some(DriverWins {
                driver: driver?,
                wins: wins.unwrap_or(0) as usize,
            })
        })
        .collect())
}
