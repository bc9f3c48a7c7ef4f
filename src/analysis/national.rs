//! National Performance Module
//! Season champions of one nationality and that nationality's yearly trend.

use super::{
    date_values, driver_refs, f64_values, i64_values, inner_on, AnalysisError, DriverRef,
};
use crate::config::SeasonEndPolicy;
use crate::data::Tables;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// A driver's season titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Champion {
    pub driver: DriverRef,
    /// Title years, ascending.
    pub seasons: Vec<i64>,
}

impl Champion {
    pub fn titles(&self) -> usize {
        self.seasons.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearPoints {
    pub year: i64,
    pub points: f64,
}

/// One season's races and the nationality's wins in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonShare {
    pub year: i64,
    pub total_races: usize,
    pub wins: usize,
    /// `wins / total_races`, 0 when the season has no races.
    pub proportion: f64,
}

impl SeasonShare {
    pub fn new(year: i64, total_races: usize, wins: usize) -> Self {
        let proportion = if total_races == 0 {
            0.0
        } else {
            wins as f64 / total_races as f64
        };
        Self {
            year,
            total_races,
            wins,
            proportion,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NationalTrend {
    pub nationality: String,
    /// Points per year with at least one result, ascending by year.
    pub points_by_year: Vec<YearPoints>,
    /// Every season year in the race table, ascending.
    pub seasons: Vec<SeasonShare>,
    /// Season with the highest win proportion; earliest on ties, `None` when
    /// the nationality never won.
    pub best: Option<SeasonShare>,
}

/// Final race identifier per season year, chosen by `policy`.
pub fn season_final_races(
    tables: &Tables,
    policy: SeasonEndPolicy,
) -> Result<BTreeMap<i64, i64>, AnalysisError> {
    let races = &tables.races;
    let years = i64_values(races, "year")?;
    let ids = i64_values(races, "raceId")?;
    let dates = date_values(races, "date")?;

    let mut finals: BTreeMap<i64, (Option<NaiveDate>, i64)> = BTreeMap::new();
    for ((year, id), date) in years.into_iter().zip(ids).zip(dates) {
        let (Some(year), Some(id)) = (year, id) else {
            continue;
        };
        let candidate = match policy {
            SeasonEndPolicy::MaxRaceId => (None, id),
            SeasonEndPolicy::LatestDate => (date, id),
        };
        // Option orders None below Some, so undated races lose to dated ones
        finals
            .entry(year)
            .and_modify(|current| {
                if candidate > *current {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    Ok(finals.into_iter().map(|(year, (_, id))| (year, id)).collect())
}

/// Season champions of `nationality`, most titles first; ties by driver id.
///
/// A season's champion is the driver in standing position 1 after the
/// season's final race.
pub fn national_championships(
    tables: &Tables,
    nationality: &str,
    policy: SeasonEndPolicy,
) -> Result<Vec<Champion>, AnalysisError> {
    let finals = season_final_races(tables, policy)?;
    let (years, race_ids): (Vec<i64>, Vec<i64>) = finals.into_iter().unzip();
    let season_end = DataFrame::new(vec![
        Column::new("year".into(), years),
        Column::new("last_raceId".into(), race_ids),
    ])?;

    let standings = tables
        .standings
        .clone()
        .lazy()
        .filter(col("position").eq(lit(1i64)))
        .select([col("raceId"), col("driverId")]);

    let drivers = tables.drivers.clone().lazy().select([
        col("driverId"),
        col("forename"),
        col("surname"),
        col("nationality"),
    ]);

    let champions = standings
        .join(
            season_end.lazy(),
            [col("raceId")],
            [col("last_raceId")],
            JoinArgs::new(JoinType::Inner),
        )
        .select([col("year"), col("driverId")]);
    let champions = inner_on(champions, drivers, "driverId")
        .filter(col("nationality").eq(lit(nationality)))
        .collect()?;

    let mut by_driver: BTreeMap<i64, Champion> = BTreeMap::new();
    for (driver, year) in driver_refs(&champions)?
        .into_iter()
        .zip(i64_values(&champions, "year")?)
    {
        let (Some(driver), Some(year)) = (driver, year) else {
            continue;
        };
        by_driver
            .entry(driver.id)
            .or_insert_with(|| Champion {
                driver,
                seasons: Vec::new(),
            })
            .seasons
            .push(year);
    }

    let mut ranked: Vec<Champion> = by_driver
        .into_values()
        .map(|mut champion| {
            champion.seasons.sort_unstable();
            champion
        })
        .collect();
    // Stable sort keeps identifier order within equal title counts
    ranked.sort_by(|a, b| b.titles().cmp(&a.titles()));
    Ok(ranked)
}

/// Yearly points and win proportion for drivers of `nationality`.
pub fn national_trend(tables: &Tables, nationality: &str) -> Result<NationalTrend, AnalysisError> {
    let results = tables.results.clone().lazy().select([
        col("raceId"),
        col("driverId"),
        col("points"),
        col("positionOrder"),
    ]);
    let race_years = tables
        .races
        .clone()
        .lazy()
        .select([col("raceId"), col("year")]);
    let nationalities = tables
        .drivers
        .clone()
        .lazy()
        .select([col("driverId"), col("nationality")]);

    let national = inner_on(inner_on(results, race_years, "raceId"), nationalities, "driverId")
        .filter(col("nationality").eq(lit(nationality)));

    let points = national
        .clone()
        .filter(col("year").is_not_null())
        .group_by([col("year")])
        .agg([col("points").sum().alias("points")])
        .sort_by_exprs([col("year")], SortMultipleOptions::default())
        .collect()?;

    let points_by_year: Vec<YearPoints> = i64_values(&points, "year")?
        .into_iter()
        .zip(f64_values(&points, "points")?)
        .filter_map(|(year, points)| {
            Some(YearPoints {
                year: year?,
                points: points.unwrap_or(0.0),
            })
        })
        .collect();

    let races_per_year = tables
        .races
        .clone()
        .lazy()
        .filter(col("year").is_not_null())
        .group_by([col("year")])
        .agg([len().cast(DataType::Int64).alias("total_races")]);
    let wins_per_year = national
        .filter(col("positionOrder").eq(lit(1i64)))
        .group_by([col("year")])
        .agg([len().cast(DataType::Int64).alias("wins")]);

    let summary = races_per_year
        .join(
            wins_per_year,
            [col("year")],
            [col("year")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([col("wins").fill_null(lit(0i64))])
        .sort_by_exprs([col("year")], SortMultipleOptions::default())
        .collect()?;

    let seasons: Vec<SeasonShare> = i64_values(&summary, "year")?
        .into_iter()
        .zip(i64_values(&summary, "total_races")?)
        .zip(i64_values(&summary, "wins")?)
        .filter_map(|((year, total), wins)| {
            Some(SeasonShare::new(
                year?,
                total.unwrap_or(0) as usize,
                wins.unwrap_or(0) as usize,
            ))
        })
        .collect();

    let best = seasons
        .iter()
        .filter(|s| s.wins > 0)
        .fold(None::<SeasonShare>, |best, season| match best {
            Some(b) if b.proportion >= season.proportion => Some(b),
            _ => Some(*season),
        });

    Ok(NationalTrend {
        nationality: nationality.to_string(),
        points_by_year,
        seasons,
        best,
    })
}
