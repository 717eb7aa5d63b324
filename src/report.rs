use std::fmt::Write as _;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::standings::TeamStats;

/// Report column order. Downstream tooling reads these by position.
pub const COLUMNS: [&str; 16] = [
    "team",
    "wins",
    "losses",
    "ties",
    "matches_played",
    "goals_for",
    "goals_against",
    "goal_differential",
    "goals_per_match",
    "points",
    "wp",
    "owp",
    "oowp",
    "rpi",
    "event_name",
    "record",
];

// Field order must match COLUMNS.
#[derive(Debug, Serialize)]
pub struct StandingsRow<'a> {
    pub team: &'a str,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub matches_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_differential: i64,
    pub goals_per_match: f64,
    pub points: u32,
    pub wp: f64,
    pub owp: f64,
    pub oowp: f64,
    pub rpi: f64,
    pub event_name: Option<&'a str>,
    pub record: &'a str,
}

impl<'a> From<&'a TeamStats> for StandingsRow<'a> {
    fn from(s: &'a TeamStats) -> Self {
        Self {
            team: &s.team.name,
            wins: s.wins,
            losses: s.losses,
            ties: s.ties,
            matches_played: s.matches_played,
            goals_for: s.goals_for,
            goals_against: s.goals_against,
            goal_differential: s.goal_differential,
            goals_per_match: s.goals_per_match,
            points: s.points,
            wp: s.wp,
            owp: s.owp,
            oowp: s.oowp,
            rpi: s.rpi,
            event_name: s.event_name.as_deref(),
            record: &s.record,
        }
    }
}

pub fn write_standings_csv<W: io::Write>(writer: W, standings: &[TeamStats]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if standings.is_empty() {
        wtr.write_record(COLUMNS).context("write standings header")?;
    }
    for stats in standings {
        wtr.serialize(StandingsRow::from(stats))
            .context("write standings row")?;
    }
    wtr.flush().context("flush standings csv")?;
    Ok(())
}

pub fn write_standings_file(path: &Path, standings: &[TeamStats]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_standings_csv(file, standings)
}

/// Fixed-width table for the terminal.
pub fn render_table(standings: &[TeamStats]) -> String {
    let name_width = standings
        .iter()
        .map(|s| s.team.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<name_width$}  {:>8}  {:>3}  {:>4}  {:>4}  {:>5}  {:>5}  {:>5}  {:>5}  {}",
        "#", "Team", "W-L-T", "GP", "GD", "Pts", "WP", "OWP", "OOWP", "RPI", "Event"
    );
    for (idx, s) in standings.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<name_width$}  {:>8}  {:>3}  {:>4}  {:>4}  {:>5.2}  {:>5.2}  {:>5.2}  {:>5.2}  {}",
            idx + 1,
            s.team.name,
            s.record,
            s.matches_played,
            s.goal_differential,
            s.points,
            s.wp,
            s.owp,
            s.oowp,
            s.rpi,
            s.event_name.as_deref().unwrap_or("")
        );
    }
    out
}
