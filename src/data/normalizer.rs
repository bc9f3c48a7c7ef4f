//! Data Normalizer Module
//! Replaces the missing-value sentinel and coerces numeric and date columns.

use super::loader::RawTables;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the Polars date epoch.
pub(crate) const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Target type of a coerced column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Whole number; `fill_zero` turns unparseable cells into 0 instead of null.
    Integer { fill_zero: bool },
    /// Floating point; `fill_zero` turns unparseable cells into 0.0 instead of null.
    Float { fill_zero: bool },
    /// `YYYY-MM-DD` calendar date.
    Date,
}

const DRIVER_COLUMNS: &[(&str, ColumnKind)] = &[("driverId", ColumnKind::Integer { fill_zero: false })];

const RACE_COLUMNS: &[(&str, ColumnKind)] = &[
    ("raceId", ColumnKind::Integer { fill_zero: false }),
    ("year", ColumnKind::Integer { fill_zero: false }),
    ("round", ColumnKind::Integer { fill_zero: false }),
    ("date", ColumnKind::Date),
];

const RESULT_COLUMNS: &[(&str, ColumnKind)] = &[
    ("resultId", ColumnKind::Integer { fill_zero: false }),
    ("raceId", ColumnKind::Integer { fill_zero: false }),
    ("driverId", ColumnKind::Integer { fill_zero: false }),
    ("positionOrder", ColumnKind::Integer { fill_zero: false }),
    ("points", ColumnKind::Float { fill_zero: true }),
];

const STANDING_COLUMNS: &[(&str, ColumnKind)] = &[
    ("driverStandingsId", ColumnKind::Integer { fill_zero: false }),
    ("raceId", ColumnKind::Integer { fill_zero: false }),
    ("driverId", ColumnKind::Integer { fill_zero: false }),
    ("points", ColumnKind::Float { fill_zero: true }),
    ("position", ColumnKind::Integer { fill_zero: false }),
    ("wins", ColumnKind::Integer { fill_zero: true }),
];

/// Normalized, read-only tables shared by every analysis.
#[derive(Debug, Clone)]
pub struct Tables {
    pub drivers: DataFrame,
    pub races: DataFrame,
    pub results: DataFrame,
    pub standings: DataFrame,
}

/// Cleans raw text tables into typed tables.
pub struct Normalizer {
    missing_token: String,
}

impl Normalizer {
    pub fn new(missing_token: impl Into<String>) -> Self {
        Self {
            missing_token: missing_token.into(),
        }
    }

    /// Normalize all four tables.
    pub fn normalize(&self, raw: RawTables) -> Result<Tables, NormalizeError> {
        let tables = Tables {
            drivers: self.normalize_table(&raw.drivers, DRIVER_COLUMNS)?,
            races: self.normalize_table(&raw.races, RACE_COLUMNS)?,
            results: self.normalize_table(&raw.results, RESULT_COLUMNS)?,
            standings: self.normalize_table(&raw.standings, STANDING_COLUMNS)?,
        };
        info!("missing values replaced and column types coerced");
        Ok(tables)
    }

    /// Null out the sentinel in every text column, then coerce the listed
    /// columns. Listed columns absent from `df` are skipped.
    pub fn normalize_table(
        &self,
        df: &DataFrame,
        kinds: &[(&str, ColumnKind)],
    ) -> Result<DataFrame, NormalizeError> {
        let mut columns: Vec<Column> = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let cleaned = self.replace_sentinel(column)?;
            let kind = kinds
                .iter()
                .find(|(name, _)| *name == column.name().as_str())
                .map(|(_, kind)| *kind);

            let typed = match kind {
                Some(kind) => coerce_column(&cleaned, kind)?,
                None => cleaned,
            };
            columns.push(typed);
        }

        Ok(DataFrame::new(columns)?)
    }

    fn replace_sentinel(&self, column: &Column) -> Result<Column, NormalizeError> {
        if column.dtype() != &DataType::String {
            return Ok(column.clone());
        }

        let values: Vec<Option<&str>> = column
            .str()?
            .into_iter()
            .map(|v| v.filter(|s| *s != self.missing_token))
            .collect();
        Ok(Column::new(column.name().clone(), values))
    }
}

/// Parse a text column into `kind`. Unparseable cells become null, or zero
/// when the kind asks for it.
pub fn coerce_column(column: &Column, kind: ColumnKind) -> Result<Column, NormalizeError> {
    let text = column.cast(&DataType::String)?;
    let text = text.str()?;
    let name = column.name().clone();
    let mut rejected = 0usize;

    let coerced = match kind {
        ColumnKind::Integer { fill_zero } => {
            let values: Vec<Option<i64>> = text
                .into_iter()
                .map(|v| {
                    let parsed = v.and_then(parse_integer);
                    if v.is_some() && parsed.is_none() {
                        rejected += 1;
                    }
                    if fill_zero {
                        Some(parsed.unwrap_or(0))
                    } else {
                        parsed
                    }
                })
                .collect();
            Column::new(name.clone(), values)
        }
        ColumnKind::Float { fill_zero } => {
            let values: Vec<Option<f64>> = text
                .into_iter()
                .map(|v| {
                    let parsed = v.and_then(parse_float);
                    if v.is_some() && parsed.is_none() {
                        rejected += 1;
                    }
                    if fill_zero {
                        Some(parsed.unwrap_or(0.0))
                    } else {
                        parsed
                    }
                })
                .collect();
            Column::new(name.clone(), values)
        }
        ColumnKind::Date => {
            let days: Vec<Option<i32>> = text
                .into_iter()
                .map(|v| {
                    let parsed = v.and_then(parse_date);
                    if v.is_some() && parsed.is_none() {
                        rejected += 1;
                    }
                    parsed.map(date_to_days)
                })
                .collect();
            Column::new(name.clone(), days).cast(&DataType::Date)?
        }
    };

    if rejected > 0 {
        debug!(column = %name, rejected, "unparseable values coerced");
    }
    Ok(coerced)
}

fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    })
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_results() -> DataFrame {
        df!(
            "resultId" => ["1", "2", "3"],
            "raceId" => ["10", "10", "11"],
            "driverId" => ["1", "2", "\\N"],
            "positionText" => ["1", "R", "\\N"],
            "positionOrder" => ["1", "\\N", "2.0"],
            "points" => ["9", "\\N", "abc"],
        )
        .unwrap()
    }

    #[test]
    fn sentinel_never_survives_normalization() {
        let normalizer = Normalizer::new("\\N");
        let df = normalizer.normalize_table(&raw_results(), RESULT_COLUMNS).unwrap();

        for column in df.get_columns() {
            if column.dtype() == &DataType::String {
                assert!(column.str().unwrap().into_iter().all(|v| v != Some("\\N")));
            }
        }
        let text = df.column("positionText").unwrap().str().unwrap();
        assert_eq!(text.get(2), None);
    }

    #[test]
    fn points_default_to_zero_and_positions_stay_null() {
        let normalizer = Normalizer::new("\\N");
        let df = normalizer.normalize_table(&raw_results(), RESULT_COLUMNS).unwrap();

        let points: Vec<Option<f64>> = df.column("points").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(points, vec![Some(9.0), Some(0.0), Some(0.0)]);

        let positions: Vec<Option<i64>> = df
            .column("positionOrder")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(positions, vec![Some(1), None, Some(2)]);

        let drivers: Vec<Option<i64>> =
            df.column("driverId").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(drivers, vec![Some(1), Some(2), None]);
    }

    #[test]
    fn race_dates_become_date_typed() {
        let raw = df!(
            "raceId" => ["1", "2"],
            "year" => ["2009", "2009"],
            "name" => ["Australian Grand Prix", "Malaysian Grand Prix"],
            "date" => ["2009-03-29", "\\N"],
        )
        .unwrap();
        let df = Normalizer::new("\\N").normalize_table(&raw, RACE_COLUMNS).unwrap();

        let date = df.column("date").unwrap();
        assert_eq!(date.dtype(), &DataType::Date);
        let days = date.cast(&DataType::Int32).unwrap();
        let days: Vec<Option<i32>> = days.i32().unwrap().into_iter().collect();
        assert_eq!(
            days[0].and_then(days_to_date),
            NaiveDate::from_ymd_opt(2009, 3, 29)
        );
        assert_eq!(days[1], None);
    }

    #[test]
    fn wins_default_to_zero() {
        let raw = df!(
            "raceId" => ["1"],
            "driverId" => ["1"],
            "position" => ["1"],
            "wins" => ["\\N"],
        )
        .unwrap();
        let df = Normalizer::new("\\N").normalize_table(&raw, STANDING_COLUMNS).unwrap();
        assert_eq!(df.column("wins").unwrap().i64().unwrap().get(0), Some(0));
    }

    #[test]
    fn epoch_conversion_is_reversible() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(date), 0);
        assert_eq!(days_to_date(0), Some(date));
    }
}
