use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::error::RatingsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub season_id: i64,
    pub name: String,
    pub season_group_id: i64,
}

impl Organization {
    pub fn is_ecnl(&self) -> bool {
        self.name.contains("ECNL")
    }
}

/// Organization names published by the TGS association list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationName {
    BoysPreEcnl,
    EcnlBoys,
    EcnlBoysRegionalLeague,
    EcnlGirls,
    EcnlGirlsRegionalLeague,
    GirlsPreEcnl,
}

impl OrganizationName {
    pub const ALL: [OrganizationName; 6] = [
        OrganizationName::BoysPreEcnl,
        OrganizationName::EcnlBoys,
        OrganizationName::EcnlBoysRegionalLeague,
        OrganizationName::EcnlGirls,
        OrganizationName::EcnlGirlsRegionalLeague,
        OrganizationName::GirlsPreEcnl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationName::BoysPreEcnl => "BOYS PRE-ECNL",
            OrganizationName::EcnlBoys => "ECNL Boys",
            OrganizationName::EcnlBoysRegionalLeague => "ECNL Boys Regional League",
            OrganizationName::EcnlGirls => "ECNL Girls",
            OrganizationName::EcnlGirlsRegionalLeague => "ECNL Girls Regional League",
            OrganizationName::GirlsPreEcnl => "GIRLS PRE-ECNL",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|known| known.as_str() == name)
    }
}

impl fmt::Display for OrganizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub city: String,
    pub logo: String,
    pub state_code: String,
    pub org_id: i64,
    pub org_season_id: i64,
    /// Zero when the club is not attached to an event.
    pub event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub org_id: i64,
    pub org_name: String,
    pub org_season_id: i64,
    pub org_season_name: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.id, self.name, self.org_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Gender {
    Girls,
    Boys,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Girls => "girls",
            Gender::Boys => "boys",
        }
    }

    fn prefix(self) -> char {
        match self {
            Gender::Girls => 'G',
            Gender::Boys => 'B',
        }
    }
}

/// Gender plus two-digit birth year, displayed the way the provider labels
/// divisions (`G2009`, `B2010`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Division {
    gender: Gender,
    year: String,
}

impl Division {
    pub fn new(gender: Gender, year: &str) -> Result<Self, RatingsError> {
        let year = year.trim();
        if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RatingsError::InvalidDivision {
                raw: format!("{}{}", gender.prefix(), year),
            });
        }
        Ok(Self {
            gender,
            year: year.to_string(),
        })
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn year(&self) -> &str {
        &self.year
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}20{}", self.gender.prefix(), self.year)
    }
}

impl FromStr for Division {
    type Err = RatingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || RatingsError::InvalidDivision {
            raw: raw.to_string(),
        };
        let gender = match raw.chars().next() {
            Some('G') | Some('g') => Gender::Girls,
            Some('B') | Some('b') => Gender::Boys,
            _ => return Err(invalid()),
        };
        let year = raw
            .get(1..)
            .and_then(|rest| rest.strip_prefix("20"))
            .ok_or_else(invalid)?;
        Division::new(gender, year).map_err(|_| invalid())
    }
}

/// A team as it appears on one side of a match.
///
/// Identity is the display name: equality, ordering and hashing ignore the
/// numeric ids, which are carried only so the club can be looked up later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub team_id: Option<i64>,
    pub club_id: Option<i64>,
}

impl Team {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team_id: None,
            club_id: None,
        }
    }

    pub fn with_ids(name: impl Into<String>, team_id: Option<i64>, club_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            team_id,
            club_id,
        }
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Team {}

impl Hash for Team {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Team {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Team {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: i64,
    pub home: Team,
    pub away: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub date: Option<NaiveDate>,
}

impl Match {
    /// Which side `team` played on. The home side is checked first, so a
    /// match listing the same name twice still counts once.
    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home.name == team {
            Some(Side::Home)
        } else if self.away.name == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.side_of(team).is_some()
    }

    pub fn opponent_of(&self, team: &str) -> Option<&Team> {
        self.side_of(team).map(|side| self.opponent(side))
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn opponent(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.away,
            Side::Away => &self.home,
        }
    }

    /// (scored, conceded) from the point of view of `side`.
    pub fn goals(&self, side: Side) -> (u32, u32) {
        match side {
            Side::Home => (self.home_score, self.away_score),
            Side::Away => (self.away_score, self.home_score),
        }
    }

    pub fn outcome(&self, side: Side) -> Outcome {
        let (scored, conceded) = self.goals(side);
        match scored.cmp(&conceded) {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Loss,
            Ordering::Equal => Outcome::Tie,
        }
    }

    /// Calendar-date comparison: a match dated today is never future,
    /// whatever its kick-off time. Undated matches are never future.
    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|d| d > today)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        write!(
            f,
            "{} vs {} on {} - {}-{}",
            self.home, self.away, date, self.home_score, self.away_score
        )
    }
}

/// Raw schedule entry as returned by the score-reporting endpoint.
///
/// Numeric fields accept either JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    #[serde(rename = "matchID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub match_id: Option<i64>,
    #[serde(default)]
    pub game_date: Option<String>,
    #[serde(rename = "hometeamID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub home_team_id: Option<i64>,
    #[serde(rename = "homeTeamClubID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub home_team_club_id: Option<i64>,
    #[serde(rename = "awayTeamID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub away_team_id: Option<i64>,
    #[serde(rename = "awayTeamClubID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub away_team_club_id: Option<i64>,
    #[serde(default)]
    pub game_time: Option<String>,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(rename = "homeclublogo", default)]
    pub home_club_logo: Option<String>,
    #[serde(rename = "awayclublogo", default)]
    pub away_club_logo: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub complex: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(rename = "scheduleID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub schedule_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub home_team_score: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub away_team_score: Option<i64>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub event_logo: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(rename = "eventTypeID", default, deserialize_with = "deserialize_option_number_from_string")]
    pub event_type_id: Option<i64>,
}

impl ScheduleItem {
    pub fn division(&self) -> &str {
        trimmed(&self.division)
    }

    pub fn home_team(&self) -> &str {
        trimmed(&self.home_team)
    }

    pub fn away_team(&self) -> &str {
        trimmed(&self.away_team)
    }

    pub fn game_date(&self) -> &str {
        trimmed(&self.game_date)
    }
}

pub(crate) fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}
