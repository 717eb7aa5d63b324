use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::RatingsError;
use crate::models::{Division, Match, ScheduleItem, Team};

const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const CSV_DATE_FORMAT: &str = "%Y-%m-%d";

/// Which matches make it into a corpus.
#[derive(Debug, Clone, Copy)]
pub struct CorpusFilter {
    pub include_future: bool,
    pub today: NaiveDate,
}

impl CorpusFilter {
    /// Completed-season view: matches dated after `today` are dropped.
    pub fn completed_as_of(today: NaiveDate) -> Self {
        Self {
            include_future: false,
            today,
        }
    }

    pub fn everything(today: NaiveDate) -> Self {
        Self {
            include_future: true,
            today,
        }
    }
}

/// Drops non-positive ids and (unless asked not to) future matches, then
/// dedupes by id keeping the first occurrence. Input order is preserved.
pub fn build_corpus(matches: impl IntoIterator<Item = Match>, filter: &CorpusFilter) -> Vec<Match> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in matches {
        if m.id <= 0 {
            continue;
        }
        if !filter.include_future && m.is_future(filter.today) {
            continue;
        }
        if seen.insert(m.id) {
            out.push(m);
        }
    }
    out
}

fn positive(id: Option<i64>) -> Option<i64> {
    id.filter(|v| *v > 0)
}

fn score(value: Option<i64>, index: usize, field: &str) -> Result<u32, RatingsError> {
    let raw = value.unwrap_or(0);
    u32::try_from(raw).map_err(|_| RatingsError::MalformedItem {
        kind: "schedule",
        index,
        reason: format!("{field} must be a non-negative integer, got {raw}"),
    })
}

impl ScheduleItem {
    /// Normalizes a provider record. `index` is only used in error messages.
    pub fn to_match(&self, index: usize) -> Result<Match, RatingsError> {
        let raw_date = self.game_date();
        let date = if raw_date.is_empty() {
            None
        } else {
            let parsed = NaiveDateTime::parse_from_str(raw_date, PROVIDER_DATE_FORMAT).map_err(|err| {
                RatingsError::MalformedItem {
                    kind: "schedule",
                    index,
                    reason: format!("gameDate {raw_date:?}: {err}"),
                }
            })?;
            Some(parsed.date())
        };

        Ok(Match {
            id: self.match_id.unwrap_or(0),
            home: Team::with_ids(
                self.home_team(),
                positive(self.home_team_id),
                positive(self.home_team_club_id),
            ),
            away: Team::with_ids(
                self.away_team(),
                positive(self.away_team_id),
                positive(self.away_team_club_id),
            ),
            home_score: score(self.home_team_score, index, "homeTeamScore")?,
            away_score: score(self.away_team_score, index, "awayTeamScore")?,
            date,
        })
    }
}

/// Normalizes the schedule items of one division.
pub fn division_matches(items: &[ScheduleItem], division: &Division) -> Result<Vec<Match>, RatingsError> {
    let code = division.to_string();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.division() == code)
        .map(|(idx, item)| item.to_match(idx))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MatchCsvRow {
    match_id: String,
    home_team: String,
    away_team: String,
    home_score: String,
    away_score: String,
    date: String,
    home_team_id: String,
    away_team_id: String,
    home_team_club_id: String,
    away_team_club_id: String,
}

#[derive(Debug, Serialize)]
struct MatchCsvOut<'a> {
    match_id: i64,
    home_team: &'a str,
    away_team: &'a str,
    home_score: u32,
    away_score: u32,
    date: String,
    home_team_id: Option<i64>,
    away_team_id: Option<i64>,
    home_team_club_id: Option<i64>,
    away_team_club_id: Option<i64>,
}

fn parse_field<T: std::str::FromStr>(
    raw: &str,
    line: usize,
    field: &'static str,
) -> Result<Option<T>, RatingsError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| RatingsError::MalformedRecord {
            line,
            field,
            value: raw.to_string(),
        })
}

impl MatchCsvRow {
    fn into_match(self, line: usize) -> Result<Match, RatingsError> {
        let date = if self.date.is_empty() {
            None
        } else {
            let parsed = NaiveDate::parse_from_str(&self.date, CSV_DATE_FORMAT).map_err(|_| {
                RatingsError::MalformedRecord {
                    line,
                    field: "date",
                    value: self.date.clone(),
                }
            })?;
            Some(parsed)
        };
        Ok(Match {
            id: parse_field::<i64>(&self.match_id, line, "match_id")?.unwrap_or(0),
            home: Team::with_ids(
                self.home_team,
                parse_field(&self.home_team_id, line, "home_team_id")?,
                parse_field(&self.home_team_club_id, line, "home_team_club_id")?,
            ),
            away: Team::with_ids(
                self.away_team,
                parse_field(&self.away_team_id, line, "away_team_id")?,
                parse_field(&self.away_team_club_id, line, "away_team_club_id")?,
            ),
            home_score: parse_field(&self.home_score, line, "home_score")?.unwrap_or(0),
            away_score: parse_field(&self.away_score, line, "away_score")?.unwrap_or(0),
            date,
        })
    }
}

/// Reads a match file. Optional columns may be absent; any unparseable number
/// or date fails the whole read with [`RatingsError::MalformedRecord`].
pub fn read_matches_csv<R: io::Read>(reader: R) -> Result<Vec<Match>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("read match csv header")?.clone();

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record.context("read match csv record")?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();
        let row: MatchCsvRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("decode match csv line {line}"))?;
        out.push(row.into_match(line)?);
    }
    Ok(out)
}

pub fn write_matches_csv<W: io::Write>(writer: W, matches: &[Match]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for m in matches {
        wtr.serialize(MatchCsvOut {
            match_id: m.id,
            home_team: &m.home.name,
            away_team: &m.away.name,
            home_score: m.home_score,
            away_score: m.away_score,
            date: m
                .date
                .map(|d| d.format(CSV_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            home_team_id: m.home.team_id,
            away_team_id: m.away.team_id,
            home_team_club_id: m.home.club_id,
            away_team_club_id: m.away.club_id,
        })
        .context("write match csv row")?;
    }
    wtr.flush().context("flush match csv")?;
    Ok(())
}

pub fn read_matches_file(path: &Path) -> Result<Vec<Match>> {
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_matches_csv(file).with_context(|| format!("read matches from {}", path.display()))
}

/// Reads a match file and applies the corpus rules: ids <= 0 dropped,
/// duplicate ids collapsed to their first row.
pub fn read_corpus_csv<R: io::Read>(reader: R, filter: &CorpusFilter) -> Result<Vec<Match>> {
    Ok(build_corpus(read_matches_csv(reader)?, filter))
}

pub fn read_corpus_file(path: &Path, filter: &CorpusFilter) -> Result<Vec<Match>> {
    Ok(build_corpus(read_matches_file(path)?, filter))
}

pub fn write_matches_file(path: &Path, matches: &[Match]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_matches_csv(file, matches)
}

/// `matches_{gender}_{yy}_{org}.csv`.
pub fn matches_file_name(division: &Division, organization_id: i64) -> String {
    format!(
        "matches_{}_{}_{}.csv",
        division.gender().as_str(),
        division.year(),
        organization_id
    )
}

/// The report path for a match file: `matches` in the file name becomes
/// `stats`, or `stats_` is prepended when the name has no `matches` in it.
pub fn stats_file_name(matches_path: &Path) -> PathBuf {
    let name = matches_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = if name.contains("matches") {
        name.replace("matches", "stats")
    } else {
        format!("stats_{name}")
    };
    matches_path.with_file_name(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_file_name_swaps_prefix() {
        assert_eq!(
            stats_file_name(Path::new("out/matches_girls_09_12.csv")),
            PathBuf::from("out/stats_girls_09_12.csv")
        );
        assert_eq!(stats_file_name(Path::new("season.csv")), PathBuf::from("stats_season.csv"));
    }

    #[test]
    fn matches_file_name_uses_gender_year_org() {
        let d: Division = "G2009".parse().expect("division");
        assert_eq!(matches_file_name(&d, 12), "matches_girls_09_12.csv");
    }
}
