//! CSV Data Loader Module
//! Loads the four source tables with Polars, every column as text.

use polars::prelude::*;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source '{table}' unavailable at {path}: {reason}")]
    SourceUnavailable {
        table: TableKind,
        path: PathBuf,
        reason: String,
    },
}

/// The four source tables, each read from a fixed file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Drivers,
    Races,
    Results,
    DriverStandings,
}

impl TableKind {
    pub fn file_name(self) -> &'static str {
        match self {
            TableKind::Drivers => "drivers.csv",
            TableKind::Races => "races.csv",
            TableKind::Results => "results.csv",
            TableKind::DriverStandings => "driver_standings.csv",
        }
    }

    /// Columns the analyses read; a source lacking any of them is unusable.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Drivers => &["driverId", "forename", "surname", "nationality"],
            TableKind::Races => &["raceId", "year", "name", "date"],
            TableKind::Results => &["raceId", "driverId", "positionOrder", "points", "positionText"],
            TableKind::DriverStandings => &["raceId", "driverId", "position", "wins"],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Drivers => "drivers",
            TableKind::Races => "races",
            TableKind::Results => "results",
            TableKind::DriverStandings => "driver_standings",
        };
        f.write_str(name)
    }
}

/// Tables as read from disk, before sentinel replacement and typing.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub drivers: DataFrame,
    pub races: DataFrame,
    pub results: DataFrame,
    pub standings: DataFrame,
}

/// Reads the source CSV files from one directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load all four tables. The first unavailable source aborts the load.
    pub fn load_all(&self) -> Result<RawTables, LoaderError> {
        let drivers = self.load_table(TableKind::Drivers)?;
        let races = self.load_table(TableKind::Races)?;
        let results = self.load_table(TableKind::Results)?;
        let standings = self.load_table(TableKind::DriverStandings)?;

        info!(
            drivers = drivers.height(),
            races = races.height(),
            results = results.height(),
            standings = standings.height(),
            "all source tables loaded"
        );

        Ok(RawTables {
            drivers,
            races,
            results,
            standings,
        })
    }

    /// Load a single table with every column typed as text.
    pub fn load_table(&self, table: TableKind) -> Result<DataFrame, LoaderError> {
        let path = self.data_dir.join(table.file_name());
        let unavailable = |reason: String| LoaderError::SourceUnavailable {
            table,
            path: path.clone(),
            reason,
        };

        if !path.is_file() {
            return Err(unavailable("file not found".to_string()));
        }

        // Schema inference over zero rows reads every column as String
        let df = LazyCsvReader::new(&path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| unavailable(e.to_string()))?;

        let missing: Vec<&str> = table
            .required_columns()
            .iter()
            .copied()
            .filter(|name| df.column(name).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(unavailable(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        debug!(%table, rows = df.height(), path = %path.display(), "table loaded");
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn write_minimal_sources(dir: &Path) {
        write(
            dir,
            "drivers.csv",
            "driverId,driverRef,forename,surname,nationality\n1,fangio,Juan,Fangio,Argentine\n",
        );
        write(dir, "races.csv", "raceId,year,round,name,date\n10,1950,1,British Grand Prix,1950-05-13\n");
        write(
            dir,
            "results.csv",
            "resultId,raceId,driverId,positionText,positionOrder,points\n1,10,1,1,1,8\n",
        );
        write(
            dir,
            "driver_standings.csv",
            "driverStandingsId,raceId,driverId,points,position,wins\n1,10,1,8,1,1\n",
        );
    }

    #[test]
    fn loads_every_column_as_text() {
        let dir = TempDir::new().unwrap();
        write_minimal_sources(dir.path());

        let tables = DataLoader::new(dir.path()).load_all().unwrap();
        assert_eq!(tables.drivers.height(), 1);
        assert_eq!(tables.results.height(), 1);
        assert_eq!(
            tables.results.column("points").unwrap().dtype(),
            &DataType::String
        );
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        write_minimal_sources(dir.path());
        fs::remove_file(dir.path().join("results.csv")).unwrap();

        let err = DataLoader::new(dir.path()).load_all().unwrap_err();
        let LoaderError::SourceUnavailable { table, path, .. } = err;
        assert_eq!(table, TableKind::Results);
        assert!(path.ends_with("results.csv"));
    }

    #[test]
    fn missing_required_column_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        write_minimal_sources(dir.path());
        write(dir.path(), "drivers.csv", "driverId,forename,surname\n1,Juan,Fangio\n");

        let err = DataLoader::new(dir.path()).load_table(TableKind::Drivers).unwrap_err();
        assert!(err.to_string().contains("nationality"));
    }
}
