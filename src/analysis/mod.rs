//! Analysis module - the eight historical questions
//!
//! Every analysis is a pure function of the normalized [`Tables`] and returns
//! a plain result record. Polars does the joins and aggregations; the small
//! final frames are read back into Rust types here.

mod career;
mod leaders;
mod milestones;
mod national;

pub use career::{career_summary, CareerEntry, CareerSummary, CareerVerdict};
pub use leaders::{
    nationality_distribution, points_leaders, win_leaders, DriverPoints, DriverWins,
    NationalityCount, NationalityDistribution, UNKNOWN_NATIONALITY,
};
pub use milestones::{
    participation_milestones, winner_milestones, DateMilestone, Milestones, WinnerMilestone,
    WinnerMilestones,
};
pub use national::{
    national_championships, national_trend, season_final_races, Champion, NationalTrend,
    SeasonShare, YearPoints,
};

use crate::config::AnalysisSettings;
use crate::data::{days_to_date, Tables};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Driver identity as carried through every result record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DriverRef {
    pub id: i64,
    pub forename: String,
    pub surname: String,
}

impl DriverRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

impl fmt::Display for DriverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.forename, self.surname)
    }
}

/// Results of all eight analyses for one run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub participation: Milestones,
    pub winners: WinnerMilestones,
    pub nationalities: NationalityDistribution,
    pub points: Vec<DriverPoints>,
    pub wins: Vec<DriverWins>,
    pub champions: Vec<Champion>,
    pub trend: NationalTrend,
    pub career: CareerSummary,
}

/// Run every analysis in question order.
pub fn analyze_all(
    tables: &Tables,
    settings: &AnalysisSettings<'_>,
) -> Result<AnalysisReport, AnalysisError> {
    let participation = participation_milestones(tables)?;
    let winners = winner_milestones(tables)?;
    let nationalities = nationality_distribution(tables, settings.nationality)?;
    let points = points_leaders(tables)?;
    let wins = win_leaders(tables)?;
    let champions = national_championships(tables, settings.nationality, settings.season_end)?;
    let trend = national_trend(tables, settings.nationality)?;
    let career = career_summary(tables, settings.subject)?;

    info!(
        ranked_drivers = points.len(),
        winners = wins.len(),
        national_champions = champions.len(),
        seasons = trend.seasons.len(),
        "all analyses complete"
    );

    Ok(AnalysisReport {
        participation,
        winners,
        nationalities,
        points,
        wins,
        champions,
        trend,
        career,
    })
}

// ---------------------------------------------------------------------------
// Column readers
// ---------------------------------------------------------------------------

pub(crate) fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

pub(crate) fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

pub(crate) fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

pub(crate) fn date_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let column = df.column(name)?.cast(&DataType::Int32)?;
    Ok(column
        .i32()?
        .into_iter()
        .map(|v| v.and_then(days_to_date))
        .collect())
}

/// Read `driverId`, `forename`, `surname` rows. Rows without an id are `None`.
pub(crate) fn driver_refs(df: &DataFrame) -> PolarsResult<Vec<Option<DriverRef>>> {
    let ids = i64_values(df, "driverId")?;
    let forenames = str_values(df, "forename")?;
    let surnames = str_values(df, "surname")?;

    Ok(ids
        .into_iter()
        .zip(forenames)
        .zip(surnames)
        .map(|((id, forename), surname)| {
            id.map(|id| DriverRef {
                id,
                forename: forename.unwrap_or_default(),
                surname: surname.unwrap_or_default(),
            })
        })
        .collect())
}

/// `driverId`, `forename`, `surname` projection of the drivers table.
pub(crate) fn driver_names(tables: &Tables) -> LazyFrame {
    tables
        .drivers
        .clone()
        .lazy()
        .select([col("driverId"), col("forename"), col("surname")])
}

pub(crate) fn inner_on(left: LazyFrame, right: LazyFrame, key: &str) -> LazyFrame {
    left.join(right, [col(key)], [col(key)], JoinArgs::new(JoinType::Inner))
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small normalized datasets shared by the analysis tests.

    use crate::data::{Normalizer, RawTables, Tables};
    use polars::prelude::*;

    /// Three seasons and five drivers: Fangio and González are Argentine,
    /// Colapinto has no nationality and no results.
    ///
    /// - 1950: races 1 (Fangio wins) and 2 (Farina wins); Farina champion.
    /// - 1951: races 3 and 4 (Fangio wins both); Fangio champion.
    /// - 1952: race 5 (Ascari wins); Ascari champion.
    pub fn season_tables() -> Tables {
        let drivers = df!(
            "driverId" => ["1", "2", "3", "4", "5"],
            "forename" => ["Juan", "Nino", "Alberto", "Froilán", "Franco"],
            "surname" => ["Fangio", "Farina", "Ascari", "González", "Colapinto"],
            "nationality" => ["Argentine", "Italian", "Italian", "Argentine", "\\N"],
        )
        .unwrap();
        let races = df!(
            "raceId" => ["1", "2", "3", "4", "5"],
            "year" => ["1950", "1950", "1951", "1951", "1952"],
            "round" => ["1", "2", "1", "2", "1"],
            "name" => ["British Grand Prix", "Monaco Grand Prix", "Swiss Grand Prix",
                       "Italian Grand Prix", "Belgian Grand Prix"],
            "date" => ["1950-05-13", "1950-05-21", "1951-05-27", "1951-09-16", "1952-06-22"],
        )
        .unwrap();
        let results = df!(
            "resultId" => ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
            "raceId" => ["1", "1", "2", "2", "3", "3", "4", "4", "5", "5"],
            "driverId" => ["1", "2", "2", "4", "1", "3", "1", "4", "3", "1"],
            "positionText" => ["1", "2", "1", "R", "1", "2", "1", "2", "1", "2"],
            "positionOrder" => ["1", "2", "1", "\\N", "1", "2", "1", "2", "1", "2"],
            "points" => ["8", "6", "8", "\\N", "8", "6", "9", "6", "8", "6"],
        )
        .unwrap();
        let standings = df!(
            "driverStandingsId" => ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
            "raceId" => ["1", "1", "2", "2", "3", "3", "4", "4", "5", "5"],
            "driverId" => ["1", "2", "2", "1", "1", "3", "1", "4", "3", "1"],
            "points" => ["8", "6", "14", "8", "8", "6", "17", "6", "8", "6"],
            "position" => ["1", "2", "1", "2", "1", "2", "1", "2", "1", "2"],
            "wins" => ["1", "0", "1", "1", "1", "0", "2", "0", "1", "\\N"],
        )
        .unwrap();

        Normalizer::new("\\N")
            .normalize(RawTables {
                drivers,
                races,
                results,
                standings,
            })
            .unwrap()
    }

    /// One race, one driver, one win.
    pub fn single_race_tables() -> Tables {
        let drivers = df!(
            "driverId" => ["7"],
            "forename" => ["Juan"],
            "surname" => ["Fangio"],
            "nationality" => ["Argentine"],
        )
        .unwrap();
        let races = df!(
            "raceId" => ["100"],
            "year" => ["1957"],
            "name" => ["German Grand Prix"],
            "date" => ["1957-08-04"],
        )
        .unwrap();
        let results = df!(
            "resultId" => ["1"],
            "raceId" => ["100"],
            "driverId" => ["7"],
            "positionText" => ["1"],
            "positionOrder" => ["1"],
            "points" => ["9"],
        )
        .unwrap();
        let standings = df!(
            "raceId" => ["100"],
            "driverId" => ["7"],
            "position" => ["1"],
            "wins" => ["1"],
        )
        .unwrap();

        Normalizer::new("\\N")
            .normalize(RawTables {
                drivers,
                races,
                results,
                standings,
            })
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn analyze_all_is_deterministic() {
        let tables = fixtures::season_tables();
        let config = AnalysisConfig::default();

        let first = analyze_all(&tables, &config.settings()).unwrap();
        let second = analyze_all(&tables, &config.settings()).unwrap();
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn driver_refs_skip_rows_without_id() {
        let df = df!(
            "driverId" => [Some(1i64), None],
            "forename" => ["Juan", "Nobody"],
            "surname" => ["Fangio", "Known"],
        )
        .unwrap();
        let refs = driver_refs(&df).unwrap();
        assert_eq!(refs[0].as_ref().map(|d| d.full_name()).as_deref(), Some("Juan Fangio"));
        assert!(refs[1].is_none());
    }
}
