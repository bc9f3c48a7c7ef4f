//! Analysis Configuration Module
//! Run settings with defaults, optionally overridden by a JSON file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory for overrides.
pub const CONFIG_FILE_NAME: &str = "f1_insights.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// How the final race of a season is chosen for the standings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonEndPolicy {
    /// Race with the highest identifier in the season year.
    MaxRaceId,
    /// Race with the latest date; the higher identifier wins a date tie.
    LatestDate,
}

impl Default for SeasonEndPolicy {
    fn default() -> Self {
        SeasonEndPolicy::MaxRaceId
    }
}

/// Driver singled out for the career summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub forename: String,
    pub surname: String,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            forename: "Franco".to_string(),
            surname: "Colapinto".to_string(),
        }
    }
}

impl Subject {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

/// Settings consumed by the analyses only.
#[derive(Debug, Clone)]
pub struct AnalysisSettings<'a> {
    pub nationality: &'a str,
    pub subject: &'a Subject,
    pub season_end: SeasonEndPolicy,
}

/// Complete run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub missing_token: String,
    pub nationality: String,
    /// File-name tag for the nationality charts; `None` derives it from
    /// `nationality`.
    pub nationality_tag: Option<String>,
    pub subject: Subject,
    pub report_top_n: usize,
    pub chart_top_n: usize,
    pub top_nationalities: usize,
    pub season_end: SeasonEndPolicy,
    pub render_charts: bool,
    pub chart_size: (u32, u32),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            missing_token: "\\N".to_string(),
            nationality: "Argentine".to_string(),
            nationality_tag: Some("argentinian".to_string()),
            subject: Subject::default(),
            report_top_n: 10,
            chart_top_n: 20,
            top_nationalities: 10,
            season_end: SeasonEndPolicy::default(),
            render_charts: true,
            chart_size: (1200, 800),
        }
    }
}

impl AnalysisConfig {
    /// Load overrides from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse overrides. A file that names a nationality but no tag gets the
    /// tag derived from that nationality.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let derive_tag = value.get("nationality").is_some() && value.get("nationality_tag").is_none();
        let mut config: Self = serde_json::from_value(value)?;
        if derive_tag {
            config.nationality_tag = None;
        }
        Ok(config)
    }

    pub fn settings(&self) -> AnalysisSettings<'_> {
        AnalysisSettings {
            nationality: &self.nationality,
            subject: &self.subject,
            season_end: self.season_end,
        }
    }

    /// Lowercase file-name fragment for the configured nationality.
    pub fn nationality_slug(&self) -> String {
        slugify(self.nationality_tag.as_deref().unwrap_or(&self.nationality))
    }

    /// Lowercase file-name fragment for the career subject.
    pub fn subject_slug(&self) -> String {
        slugify(&self.subject.full_name())
    }
}

/// Lowercase, with every run of non-alphanumeric characters collapsed to `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
