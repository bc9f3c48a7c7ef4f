//! Chart Plotter Module
//! Turns analysis results into chart descriptions ready for rendering.

use crate::analysis::AnalysisReport;
use crate::config::AnalysisConfig;
use plotters::style::RGBColor;

/// Bar and line colors, cycled by series index.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Pie slice colors: target share first, everyone else second.
pub const PIE_COLORS: [RGBColor; 2] = [
    RGBColor(135, 206, 235), // Sky blue
    RGBColor(240, 128, 128), // Light coral
];

/// Shape and series of one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// One vertical bar per label.
    Bar { labels: Vec<String>, values: Vec<f64> },
    /// One horizontal bar per label, first label on top.
    HorizontalBar { labels: Vec<String>, values: Vec<f64> },
    Pie { labels: Vec<String>, values: Vec<f64> },
    /// Values against integer years.
    Line { points: Vec<(i64, f64)> },
    /// Primary series on the left axis, secondary on the right.
    DualLine {
        primary: Vec<(i64, f64)>,
        primary_label: String,
        secondary: Vec<(i64, f64)>,
        secondary_label: String,
    },
}

/// Everything needed to draw one chart file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub file_name: String,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub kind: ChartKind,
}

impl ChartData {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Bar { values, .. }
            | ChartKind::HorizontalBar { values, .. } => values.is_empty(),
            ChartKind::Pie { values, .. } => values.iter().all(|v| *v <= 0.0),
            ChartKind::Line { points } => points.is_empty(),
            ChartKind::DualLine { primary, .. } => primary.is_empty(),
        }
    }
}

/// Builds the chart list for a report.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Charts for questions 3 to 8, in question order. Charts without data
    /// are left out.
    pub fn plan(report: &AnalysisReport, config: &AnalysisConfig) -> Vec<ChartData> {
        let nat = &config.nationality;
        let nat_slug = config.nationality_slug();
        let top_n = config.chart_top_n;
        let mut charts = Vec::new();

        // Q3: nationality distribution
        let top = report.nationalities.top(config.top_nationalities);
        charts.push(ChartData {
            file_name: "q3_top_nationalities_bar_chart.png".to_string(),
            title: format!("Top {} Nationalities by Number of F1 Drivers", config.top_nationalities),
            x_desc: "Nationality".to_string(),
            y_desc: "Number of Drivers".to_string(),
            kind: ChartKind::Bar {
                labels: top.iter().map(|c| c.nationality.clone()).collect(),
                values: top.iter().map(|c| c.drivers as f64).collect(),
            },
        });
        charts.push(ChartData {
            file_name: format!("q3_{nat_slug}_proportion_pie_chart.png"),
            title: format!("Share of {nat} Drivers vs. Other Nationalities"),
            x_desc: String::new(),
            y_desc: String::new(),
            kind: ChartKind::Pie {
                labels: vec![nat.clone(), "Other".to_string()],
                values: vec![
                    report.nationalities.target_count as f64,
                    report.nationalities.others_count() as f64,
                ],
            },
        });

        // Q4: points leaders
        let points: Vec<_> = report.points.iter().take(top_n).collect();
        charts.push(ChartData {
            file_name: "q4_top_points_scorers_bar_chart.png".to_string(),
            title: format!("Top {top_n} F1 Drivers by Career Points"),
            x_desc: "Total Points".to_string(),
            y_desc: "Driver".to_string(),
            kind: ChartKind::HorizontalBar {
                labels: points.iter().map(|p| p.driver.full_name()).collect(),
                values: points.iter().map(|p| p.points).collect(),
            },
        });

        // Q5: win leaders
        let wins: Vec<_> = report.wins.iter().take(top_n).collect();
        charts.push(ChartData {
            file_name: "q5_top_winners_bar_chart.png".to_string(),
            title: format!("Top {top_n} F1 Drivers by Career Wins"),
            x_desc: "Total Wins".to_string(),
            y_desc: "Driver".to_string(),
            kind: ChartKind::HorizontalBar {
                labels: wins.iter().map(|w| w.driver.full_name()).collect(),
                values: wins.iter().map(|w| w.wins as f64).collect(),
            },
        });

        // Q6: national champions
        charts.push(ChartData {
            file_name: format!("q6_{nat_slug}_champions_bar_chart.png"),
            title: format!("World Championships Won by {nat} Drivers"),
            x_desc: "Championships".to_string(),
            y_desc: "Driver".to_string(),
            kind: ChartKind::HorizontalBar {
                labels: report.champions.iter().map(|c| c.driver.full_name()).collect(),
                values: report.champions.iter().map(|c| c.titles() as f64).collect(),
            },
        });

        // Q7: yearly trend
        let trend = &report.trend;
        charts.push(ChartData {
            file_name: format!("q7_{nat_slug}_points_over_years_line_chart.png"),
            title: format!("Total Points Scored by {nat} Drivers per Year"),
            x_desc: "Year".to_string(),
            y_desc: "Total Points".to_string(),
            kind: ChartKind::Line {
                points: trend.points_by_year.iter().map(|p| (p.year, p.points)).collect(),
            },
        });
        charts.push(ChartData {
            file_name: format!("q7_{nat_slug}_win_proportion_line_chart.png"),
            title: format!("{nat} Win Proportion and Total Races per Year"),
            x_desc: "Year".to_string(),
            y_desc: format!("{nat} Win Proportion"),
            kind: ChartKind::DualLine {
                primary: trend.seasons.iter().map(|s| (s.year, s.proportion)).collect(),
                primary_label: format!("{nat} win proportion"),
                secondary: trend
                    .seasons
                    .iter()
                    .map(|s| (s.year, s.total_races as f64))
                    .collect(),
                secondary_label: "Total races".to_string(),
            },
        });

        // Q8: subject career
        let career = &report.career;
        let span = career
            .season_span()
            .map(|(first, last)| format!(" ({first}-{last})"))
            .unwrap_or_default();
        charts.push(ChartData {
            file_name: format!("q8_{}_points_per_race_bar_chart.png", config.subject_slug()),
            title: format!("F1 Points per Race for {}{span}", career.subject.full_name()),
            x_desc: "Race".to_string(),
            y_desc: "Points Scored".to_string(),
            kind: ChartKind::Bar {
                labels: career.entries.iter().map(|e| e.race.clone()).collect(),
                values: career.entries.iter().map(|e| e.points).collect(),
            },
        });

        charts.retain(|chart| !chart.is_empty());
        charts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_all, fixtures};

    fn plan_for(config: &AnalysisConfig) -> Vec<ChartData> {
        let report = analyze_all(&fixtures::season_tables(), &config.settings()).unwrap();
        ChartPlotter::plan(&report, config)
    }

    fn file_names(charts: &[ChartData]) -> Vec<&str> {
        charts.iter().map(|c| c.file_name.as_str()).collect()
    }

    #[test]
    fn subject_without_results_gets_no_chart() {
        let charts = plan_for(&AnalysisConfig::default());
        assert_eq!(
            file_names(&charts),
            vec![
                "q3_top_nationalities_bar_chart.png",
                "q3_argentinian_proportion_pie_chart.png",
                "q4_top_points_scorers_bar_chart.png",
                "q5_top_winners_bar_chart.png",
                "q6_argentinian_champions_bar_chart.png",
                "q7_argentinian_points_over_years_line_chart.png",
                "q7_argentinian_win_proportion_line_chart.png",
            ]
        );
    }

    #[test]
    fn subject_with_results_gets_points_per_race_chart() {
        let mut config = AnalysisConfig::default();
        config.subject.forename = "Juan".to_string();
        config.subject.surname = "Fangio".to_string();

        let charts = plan_for(&config);
        let career = charts.last().unwrap();
        assert_eq!(career.file_name, "q8_juan_fangio_points_per_race_bar_chart.png");
        assert!(career.title.ends_with("(1950-1952)"));
        assert_eq!(
            career.kind,
            ChartKind::Bar {
                labels: vec![
                    "British Grand Prix".to_string(),
                    "Swiss Grand Prix".to_string(),
                    "Italian Grand Prix".to_string(),
                    "Belgian Grand Prix".to_string(),
                ],
                values: vec![8.0, 8.0, 9.0, 6.0],
            }
        );
    }

    #[test]
    fn nationality_without_champions_skips_champion_chart() {
        let mut config = AnalysisConfig::default();
        config.nationality = "British".to_string();
        config.nationality_tag = None;

        let names = file_names(&plan_for(&config)).join(",");
        assert!(!names.contains("q6_"));
        assert!(!names.contains("points_over_years"));
        assert!(names.contains("q7_british_win_proportion_line_chart.png"));
    }

    #[test]
    fn horizontal_bars_respect_chart_top_n() {
        let mut config = AnalysisConfig::default();
        config.chart_top_n = 2;

        let charts = plan_for(&config);
        let points = charts
            .iter()
            .find(|c| c.file_name.starts_with("q4_"))
            .unwrap();
        match &points.kind {
            ChartKind::HorizontalBar { labels, values } => {
                assert_eq!(labels, &vec!["Juan Fangio".to_string(), "Nino Farina".to_string()]);
                assert_eq!(values, &vec![31.0, 14.0]);
            }
            other => panic!("unexpected chart kind {other:?}"),
        }
    }

    #[test]
    fn pie_without_drivers_is_empty() {
        let chart = ChartData {
            file_name: "pie.png".to_string(),
            title: String::new(),
            x_desc: String::new(),
            y_desc: String::new(),
            kind: ChartKind::Pie {
                labels: vec!["A".to_string(), "B".to_string()],
                values: vec![0.0, 0.0],
            },
        };
        assert!(chart.is_empty());
    }
}
