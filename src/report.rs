//! Console Report Module
//! Formats the analysis results as plain text.

use crate::analysis::{
    AnalysisReport, CareerSummary, CareerVerdict, Champion, DateMilestone, DriverPoints,
    DriverWins, Milestones, NationalTrend, NationalityDistribution, WinnerMilestone,
    WinnerMilestones,
};
use crate::config::AnalysisConfig;
use std::io::{self, Write};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Writes every analysis section, in question order, to a text sink.
pub struct Reporter {
    top_n: usize,
    top_nationalities: usize,
    trend_tail: usize,
}

impl Reporter {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            top_n: config.report_top_n,
            top_nationalities: config.top_nationalities,
            trend_tail: 5,
        }
    }

    /// Write the full report.
    pub fn write_report<W: Write>(&self, report: &AnalysisReport, out: &mut W) -> io::Result<()> {
        self.write_participation(&report.participation, out)?;
        self.write_winners(&report.winners, out)?;
        self.write_nationalities(&report.nationalities, out)?;
        self.write_points(&report.points, out)?;
        self.write_wins(&report.wins, out)?;
        self.write_championships(&report.champions, &report.nationalities.target, out)?;
        self.write_trend(&report.trend, out)?;
        self.write_career(&report.career, out)?;
        writeln!(out, "\n--- Analysis complete ---")
    }

    fn write_participation<W: Write>(&self, m: &Milestones, out: &mut W) -> io::Result<()> {
        section(out, 1, "First and Last Drivers to Take Part")?;
        write_date_milestone(out, "First driver(s) to take part", m.first.as_ref())?;
        write_date_milestone(out, "Last driver(s) to take part", m.last.as_ref())
    }

    fn write_winners<W: Write>(&self, m: &WinnerMilestones, out: &mut W) -> io::Result<()> {
        section(out, 2, "First and Last Drivers to Win a Race")?;
        write_winner(out, "First driver to win a race", m.first.as_ref())?;
        write_winner(out, "Last driver to win a race", m.last.as_ref())
    }

    fn write_nationalities<W: Write>(
        &self,
        dist: &NationalityDistribution,
        out: &mut W,
    ) -> io::Result<()> {
        section(out, 3, &format!("{} Drivers Compared With Other Nationalities", dist.target))?;
        writeln!(
            out,
            "Number of {} drivers: {} of {} ({} other)",
            dist.target,
            dist.target_count,
            dist.total_drivers,
            dist.others_count()
        )?;
        writeln!(out, "\nTop {} nationalities by driver count:", self.top_nationalities)?;
        let top = dist.top(self.top_nationalities);
        for (rank, entry) in top.iter().enumerate() {
            writeln!(out, "{:>3}. {:<24} {:>5}", rank + 1, entry.nationality, entry.drivers)?;
        }

        let rest = &dist.ranked[top.len()..];
        if !rest.is_empty() {
            let listed: Vec<String> = rest
                .iter()
                .map(|entry| format!("{} ({})", entry.nationality, entry.drivers))
                .collect();
            writeln!(out, "Remaining nationalities: {}", listed.join(", "))?;
        }
        Ok(())
    }

    fn write_points<W: Write>(&self, leaders: &[DriverPoints], out: &mut W) -> io::Result<()> {
        section(out, 4, "Total Points by Driver")?;
        writeln!(out, "Top {} drivers by career points:", self.top_n)?;
        for (rank, entry) in leaders.iter().take(self.top_n).enumerate() {
            writeln!(
                out,
                "{:>3}. {:<32} {:>9.2}",
                rank + 1,
                entry.driver.full_name(),
                entry.points
            )?;
        }
        Ok(())
    }

    fn write_wins<W: Write>(&self, leaders: &[DriverWins], out: &mut W) -> io::Result<()> {
        section(out, 5, "Total Wins by Driver")?;
        writeln!(out, "Top {} drivers by career wins:", self.top_n)?;
        for (rank, entry) in leaders.iter().take(self.top_n).enumerate() {
            writeln!(
                out,
                "{:>3}. {:<32} {:>5}",
                rank + 1,
                entry.driver.full_name(),
                entry.wins
            )?;
        }
        match leaders.first() {
            Some(top) => writeln!(
                out,
                "\nMost successful driver: {} with {} wins.",
                top.driver, top.wins
            ),
            None => writeln!(out, "\nNo race winners in the dataset."),
        }
    }

    fn write_championships<W: Write>(
        &self,
        champions: &[Champion],
        nationality: &str,
        out: &mut W,
    ) -> io::Result<()> {
        section(out, 6, &format!("{nationality} World Championships"))?;
        if champions.is_empty() {
            return writeln!(out, "No {nationality} champions found in the dataset.");
        }

        writeln!(out, "{nationality} drivers and their championships:")?;
        for champion in champions {
            let seasons: Vec<String> = champion.seasons.iter().map(i64::to_string).collect();
            writeln!(
                out,
                "  {:<32} {:>3}  ({})",
                champion.driver.full_name(),
                champion.titles(),
                seasons.join(", ")
            )?;
        }
        Ok(())
    }

    fn write_trend<W: Write>(&self, trend: &NationalTrend, out: &mut W) -> io::Result<()> {
        let nationality = &trend.nationality;
        section(out, 7, &format!("{nationality} Performance Over the Years"))?;

        if trend.points_by_year.is_empty() {
            writeln!(out, "No results recorded for {nationality} drivers.")?;
        } else {
            let skip = trend.points_by_year.len().saturating_sub(self.trend_tail);
            writeln!(out, "Total points by {nationality} drivers per year (latest seasons):")?;
            for entry in &trend.points_by_year[skip..] {
                writeln!(out, "  {}  {:>9.2}", entry.year, entry.points)?;
            }
        }

        match &trend.best {
            Some(best) => writeln!(
                out,
                "\nYear with the highest {nationality} win proportion: {} at {:.2} ({} wins of {} races).",
                best.year, best.proportion, best.wins, best.total_races
            ),
            None => writeln!(out, "\nNo {nationality} race wins in any season."),
        }
    }

    fn write_career<W: Write>(&self, career: &CareerSummary, out: &mut W) -> io::Result<()> {
        let name = career.subject.full_name();
        section(out, 8, &format!("Career of {name}"))?;

        match career.verdict {
            CareerVerdict::NotListed => {
                writeln!(out, "{name} is not listed in the drivers table.")?;
            }
            CareerVerdict::NoResults => {
                writeln!(out, "{name} is listed in the drivers table, but has no race results.")?;
            }
            CareerVerdict::Sufficient => {
                writeln!(out, "Races entered:  {}", career.races)?;
                writeln!(out, "Points scored:  {:.2}", career.points)?;
                writeln!(out, "Race wins:      {}", career.wins)?;
                writeln!(out, "\nRace-by-race results:")?;
                for entry in &career.entries {
                    let year = entry.year.map(|y| y.to_string()).unwrap_or_default();
                    writeln!(
                        out,
                        "  {:<4}  {:<32} {:>4}  {:>6.2}",
                        year,
                        entry.race,
                        entry.position.as_deref().unwrap_or("-"),
                        entry.points
                    )?;
                }
            }
        }

        writeln!(out, "\nConclusion:")?;
        if career.is_insufficient() {
            writeln!(
                out,
                "Insufficient data: the dataset holds no race results for {name}, so no conclusion about their performance can be drawn."
            )
        } else {
            writeln!(
                out,
                "{name} took part in {} race(s), scoring {:.2} point(s) and {} win(s).",
                career.races, career.points, career.wins
            )
        }
    }
}

fn section<W: Write>(out: &mut W, question: usize, title: &str) -> io::Result<()> {
    writeln!(out, "\n--- Question {question}: {title} ---")
}

fn write_date_milestone<W: Write>(
    out: &mut W,
    label: &str,
    milestone: Option<&DateMilestone>,
) -> io::Result<()> {
    let Some(milestone) = milestone else {
        return writeln!(out, "{label}: no dated results.");
    };

    writeln!(out, "{label} (on {}):", milestone.date.format(DATE_FORMAT))?;
    for driver in &milestone.drivers {
        writeln!(out, "- {driver}")?;
    }
    Ok(())
}

fn write_winner<W: Write>(
    out: &mut W,
    label: &str,
    milestone: Option<&WinnerMilestone>,
) -> io::Result<()> {
    let Some(milestone) = milestone else {
        return writeln!(out, "{label}: no race winners.");
    };

    writeln!(
        out,
        "{label} (on {}): {}",
        milestone.date.format(DATE_FORMAT),
        milestone.winner
    )?;
    if milestone.tied.len() > 1 {
        let others: Vec<String> = milestone.tied[1..].iter().map(|d| d.full_name()).collect();
        writeln!(out, "  also winning on that date: {}", others.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_all, fixtures};

    fn render(config: &AnalysisConfig) -> String {
        let report = analyze_all(&fixtures::season_tables(), &config.settings()).unwrap();
        let mut buf = Vec::new();
        Reporter::new(config).write_report(&report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn report_text() -> String {
        render(&AnalysisConfig::default())
    }

    #[test]
    fn sections_appear_in_question_order() {
        let text = report_text();
        let positions: Vec<usize> = (1..=8)
            .map(|q| text.find(&format!("--- Question {q}:")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.ends_with("--- Analysis complete ---\n"));
    }

    #[test]
    fn report_names_milestones_and_leaders() {
        let text = report_text();
        assert!(text.contains("First driver(s) to take part (on 1950-05-13):\n- Juan Fangio\n- Nino Farina"));
        assert!(text.contains("Last driver to win a race (on 1952-06-22): Alberto Ascari"));
        assert!(text.contains("Number of Argentine drivers: 2 of 5 (3 other)"));
        assert!(text.contains("Most successful driver: Juan Fangio with 3 wins."));
        assert!(text.contains("Juan Fangio"));
        assert!(text.contains("(1951)"));
        assert!(text.contains("1951 at 1.00 (2 wins of 2 races)"));
    }

    #[test]
    fn missing_subject_reports_insufficient_data() {
        let text = report_text();
        assert!(text.contains("Franco Colapinto is listed in the drivers table, but has no race results."));
        assert!(text.contains("Insufficient data"));
    }

    #[test]
    fn identical_input_renders_identical_text() {
        assert_eq!(report_text(), report_text());
    }

    #[test]
    fn nationalities_beyond_top_n_are_still_listed() {
        let config = AnalysisConfig {
            top_nationalities: 1,
            ..AnalysisConfig::default()
        };
        let text = render(&config);
        assert!(text.contains("Top 1 nationalities by driver count:\n  1. Argentine"));
        assert!(text.contains("Remaining nationalities: Italian (2), Unknown (1)"));
    }

    #[test]
    fn full_ranking_fits_without_remainder() {
        assert!(!report_text().contains("Remaining nationalities"));
    }
}
