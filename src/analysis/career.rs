//! Career Summary Module
//! Race-by-race record of one named driver.

use super::{
    date_values, driver_refs, f64_values, i64_values, str_values, AnalysisError, DriverRef,
};
use crate::config::Subject;
use crate::data::Tables;
use chrono::NaiveDate;
use polars::prelude::*;

/// Listing name for a result whose race is missing from the race table.
pub const UNKNOWN_RACE: &str = "Unknown race";

/// Whether the dataset supports a conclusion about the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerVerdict {
    /// No driver with the exact forename and surname.
    NotListed,
    /// Listed, but without a single result row.
    NoResults,
    /// At least one result row.
    Sufficient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerEntry {
    pub year: Option<i64>,
    pub race: String,
    pub date: Option<NaiveDate>,
    pub position: Option<String>,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerSummary {
    pub subject: Subject,
    pub driver: Option<DriverRef>,
    pub races: usize,
    pub points: f64,
    pub wins: usize,
    /// One per result row, ordered by race date; undated races last.
    pub entries: Vec<CareerEntry>,
    pub verdict: CareerVerdict,
}

impl CareerSummary {
    fn insufficient(subject: &Subject, driver: Option<DriverRef>, verdict: CareerVerdict) -> Self {
        Self {
            subject: subject.clone(),
            driver,
            races: 0,
            points: 0.0,
            wins: 0,
            entries: Vec::new(),
            verdict,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.verdict != CareerVerdict::Sufficient
    }

    /// First and last season with a dated entry.
    pub fn season_span(&self) -> Option<(i64, i64)> {
        let years = self.entries.iter().filter_map(|e| e.year);
        let first = years.clone().min()?;
        let last = years.max()?;
        Some((first, last))
    }
}

/// Summarize the career of the driver named by `subject`.
///
/// Name matching is exact on forename and surname; with duplicates the
/// lowest driver identifier is used.
pub fn career_summary(tables: &Tables, subject: &Subject) -> Result<CareerSummary, AnalysisError> {
    let matches = tables
        .drivers
        .clone()
        .lazy()
        .filter(
            col("forename")
                .eq(lit(subject.forename.as_str()))
                .and(col("surname").eq(lit(subject.surname.as_str()))),
        )
        .select([col("driverId"), col("forename"), col("surname")])
        .sort_by_exprs([col("driverId")], SortMultipleOptions::default())
        .collect()?;

    let Some(driver) = driver_refs(&matches)?.into_iter().flatten().next() else {
        return Ok(CareerSummary::insufficient(subject, None, CareerVerdict::NotListed));
    };

    let results = tables
        .results
        .clone()
        .lazy()
        .filter(col("driverId").eq(lit(driver.id)))
        .select([
            col("raceId"),
            col("positionOrder"),
            col("positionText"),
            col("points"),
        ])
        .collect()?;

    if results.height() == 0 {
        return Ok(CareerSummary::insufficient(
            subject,
            Some(driver),
            CareerVerdict::NoResults,
        ));
    }

    let points: f64 = f64_values(&results, "points")?.into_iter().flatten().sum();
    let wins = i64_values(&results, "positionOrder")?
        .into_iter()
        .filter(|p| *p == Some(1))
        .count();

    let races = tables.races.clone().lazy().select([
        col("raceId"),
        col("year"),
        col("name"),
        col("date"),
    ]);
    let detailed = results
        .clone()
        .lazy()
        .join(
            races,
            [col("raceId")],
            [col("raceId")],
            JoinArgs::new(JoinType::Left),
        )
        .sort_by_exprs(
            [col("date"), col("raceId")],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let entries: Vec<CareerEntry> = i64_values(&detailed, "year")?
        .into_iter()
        .zip(str_values(&detailed, "name")?)
        .zip(date_values(&detailed, "date")?)
        .zip(str_values(&detailed, "positionText")?)
        .zip(f64_values(&detailed, "points")?)
        .map(|((((year, race), date), position), points)| CareerEntry {
            year,
            race: race.unwrap_or_else(|| UNKNOWN_RACE.to_string()),
            date,
            position,
            points: points.unwrap_or(0.0),
        })
        .collect();

    Ok(CareerSummary {
        subject: subject.clone(),
        driver: Some(driver),
        races: results.height(),
        points,
        wins,
        entries,
        verdict: CareerVerdict::Sufficient,
    })
}
