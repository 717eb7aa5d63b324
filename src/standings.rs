use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{Match, Team};
use crate::stats::{self, OowpPrecision, DEFAULT_DIGITS};

/// How a standings table is ordered. Both end with the team name ascending,
/// so the order is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortStrategy {
    /// RPI descending.
    #[default]
    Rpi,
    /// Points descending, then goal differential descending.
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOptions {
    pub digits: u32,
    pub oowp_precision: OowpPrecision,
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
            oowp_precision: OowpPrecision::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStats {
    pub team: Team,
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
    pub event_name: Option<String>,
    pub record: String,
}

impl TeamStats {
    pub fn compute(
        matches: &[Match],
        team: &Team,
        options: RatingOptions,
        event_name: Option<String>,
    ) -> Self {
        let name = team.name.as_str();
        let digits = options.digits;
        let wp = stats::wp(matches, name, digits);
        let owp = stats::owp(matches, name, digits);
        let oowp = stats::oowp_with(matches, name, digits, options.oowp_precision);
        Self {
            team: team.clone(),
            wins: stats::wins(matches, name),
            losses: stats::losses(matches, name),
            ties: stats::ties(matches, name),
            matches_played: stats::matches_played(matches, name),
            goals_for: stats::goals_for(matches, name),
            goals_against: stats::goals_against(matches, name),
            goal_differential: stats::goal_differential(matches, name),
            goals_per_match: stats::goals_per_match(matches, name),
            points: stats::points(matches, name),
            wp,
            owp,
            oowp,
            rpi: stats::combine_rpi(wp, owp, oowp, digits),
            event_name,
            record: stats::record(matches, name),
        }
    }
}

/// Distinct teams in the corpus, sorted by name.
///
/// Teams are keyed by name. The ids of the first appearance are kept, and a
/// missing team or club id is filled from a later appearance. A blank name
/// is not a team and gets no row; its matches still count for the opponent.
pub fn collect_teams(matches: &[Match]) -> Vec<Team> {
    let mut by_name: BTreeMap<&str, Team> = BTreeMap::new();
    for m in matches {
        for side in [&m.home, &m.away] {
            if side.name.is_empty() {
                continue;
            }
            let entry = by_name
                .entry(side.name.as_str())
                .or_insert_with(|| side.clone());
            if entry.team_id.is_none() {
                entry.team_id = side.team_id;
            }
            if entry.club_id.is_none() {
                entry.club_id = side.club_id;
            }
        }
    }
    by_name.into_values().collect()
}

pub fn compare(a: &TeamStats, b: &TeamStats, strategy: SortStrategy) -> Ordering {
    let primary = match strategy {
        SortStrategy::Rpi => b.rpi.total_cmp(&a.rpi),
        SortStrategy::Points => b
            .points
            .cmp(&a.points)
            .then_with(|| b.goal_differential.cmp(&a.goal_differential)),
    };
    primary.then_with(|| a.team.name.cmp(&b.team.name))
}

pub fn sort_standings(rows: &mut [TeamStats], strategy: SortStrategy) {
    rows.sort_by(|a, b| compare(a, b, strategy));
}

/// Builds the full standings table for a corpus.
///
/// `event_name` is asked once per team; returning `None` leaves the event
/// column empty.
pub fn build_standings(
    matches: &[Match],
    options: RatingOptions,
    strategy: SortStrategy,
    mut event_name: impl FnMut(&Team) -> Option<String>,
) -> Vec<TeamStats> {
    let mut rows: Vec<TeamStats> = collect_teams(matches)
        .iter()
        .map(|team| TeamStats::compute(matches, team, options, event_name(team)))
        .collect();
    sort_standings(&mut rows, strategy);
    rows
}
