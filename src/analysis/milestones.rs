//! Milestones Module
//! First and last participants, first and last race winners.

use super::{date_values, driver_names, driver_refs, inner_on, AnalysisError, DriverRef};
use crate::data::Tables;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Every driver with a result on one race date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMilestone {
    pub date: NaiveDate,
    /// Distinct drivers, ordered by identifier.
    pub drivers: Vec<DriverRef>,
}

/// Earliest and latest participation. Both are `None` for an empty dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestones {
    pub first: Option<DateMilestone>,
    pub last: Option<DateMilestone>,
}

/// Winner on one race date; several drivers may share the date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerMilestone {
    pub date: NaiveDate,
    /// Lowest driver identifier among the tied winners.
    pub winner: DriverRef,
    /// All winners on the date, ordered by identifier, `winner` first.
    pub tied: Vec<DriverRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerMilestones {
    pub first: Option<WinnerMilestone>,
    pub last: Option<WinnerMilestone>,
}

/// Drivers taking part on the earliest and the latest race date.
pub fn participation_milestones(tables: &Tables) -> Result<Milestones, AnalysisError> {
    let rows = dated_results(tables, false)?;
    Ok(Milestones {
        first: milestone_at(&rows, Extreme::Earliest),
        last: milestone_at(&rows, Extreme::Latest),
    })
}

/// Race winners on the earliest and latest winning dates.
pub fn winner_milestones(tables: &Tables) -> Result<WinnerMilestones, AnalysisError> {
    let rows = dated_results(tables, true)?;
    let pick = |extreme| {
        milestone_at(&rows, extreme).and_then(|m| {
            let winner = m.drivers.first().cloned()?;
            Some(WinnerMilestone {
                date: m.date,
                winner,
                tied: m.drivers,
            })
        })
    };

    Ok(WinnerMilestones {
        first: pick(Extreme::Earliest),
        last: pick(Extreme::Latest),
    })
}

#[derive(Debug, Clone, Copy)]
enum Extreme {
    Earliest,
    Latest,
}

/// Result rows joined with race date and driver name; undated rows dropped.
fn dated_results(
    tables: &Tables,
    winners_only: bool,
) -> Result<Vec<(NaiveDate, DriverRef)>, AnalysisError> {
    let mut results = tables
        .results
        .clone()
        .lazy()
        .select([col("raceId"), col("driverId"), col("positionOrder")]);
    if winners_only {
        results = results.filter(col("positionOrder").eq(lit(1i64)));
    }

    let races = tables
        .races
        .clone()
        .lazy()
        .select([col("raceId"), col("date")]);

    let joined = inner_on(inner_on(results, races, "raceId"), driver_names(tables), "driverId")
        .select([col("date"), col("driverId"), col("forename"), col("surname")])
        .collect()?;

    let dates = date_values(&joined, "date")?;
    let drivers = driver_refs(&joined)?;

    Ok(dates
        .into_iter()
        .zip(drivers)
        .filter_map(|(date, driver)| Some((date?, driver?)))
        .collect())
}

fn milestone_at(rows: &[(NaiveDate, DriverRef)], extreme: Extreme) -> Option<DateMilestone> {
    let dates = rows.iter().map(|(date, _)| *date);
    let date = match extreme {
        Extreme::Earliest => dates.min()?,
        Extreme::Latest => dates.max()?,
    };

    let drivers: BTreeMap<i64, DriverRef> = rows
        .iter()
        .filter(|(d, _)| *d == date)
        .map(|(_, driver)| (driver.id, driver.clone()))
        .collect();

    Some(DateMilestone {
        date,
        drivers: drivers.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;

    fn names(drivers: &[DriverRef]) -> Vec<String> {
        drivers.iter().map(DriverRef::full_name).collect()
    }

    #[test]
    fn first_and_last_participants_include_ties() {
        let milestones = participation_milestones(&fixtures::season_tables()).unwrap();

        let first = milestones.first.unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(1950, 5, 13).unwrap());
        assert_eq!(names(&first.drivers), vec!["Juan Fangio", "Nino Farina"]);

        let last = milestones.last.unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(1952, 6, 22).unwrap());
        assert_eq!(names(&last.drivers), vec!["Juan Fangio", "Alberto Ascari"]);
    }

    #[test]
    fn first_and_last_winners() {
        let winners = winner_milestones(&fixtures::season_tables()).unwrap();
        assert_eq!(winners.first.unwrap().winner.full_name(), "Juan Fangio");
        assert_eq!(winners.last.unwrap().winner.full_name(), "Alberto Ascari");
    }

    #[test]
    fn single_race_winner_is_both_first_and_last() {
        let winners = winner_milestones(&fixtures::single_race_tables()).unwrap();
        let first = winners.first.unwrap();
        let last = winners.last.unwrap();
        assert_eq!(first, last);
        assert_eq!(first.winner.id, 7);
        assert_eq!(first.tied.len(), 1);
    }

    #[test]
    fn tied_winners_resolve_to_lowest_identifier() {
        let date = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
        let driver = |id: i64| DriverRef {
            id,
            forename: format!("D{id}"),
            surname: "X".to_string(),
        };
        let rows = vec![(date, driver(9)), (date, driver(3)), (date, driver(9))];

        let milestone = milestone_at(&rows, Extreme::Earliest).unwrap();
        assert_eq!(
            milestone.drivers.iter().map(|d| d.id).collect::<Vec<_>>(),
            vec![3, 9]
        );
    }

    #[test]
    fn empty_rows_have_no_milestone() {
        assert!(milestone_at(&[], Extreme::Latest).is_none());
    }
}
