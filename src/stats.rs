//! Per-team statistics over an immutable match list.
//!
//! Teams are matched by display name. Every function here is total: an
//! unknown team yields zeros and empty denominators yield `0.0`.
//!
//! Rounding is half away from zero (`f64::round`) and is applied at every
//! stage, so WP, OWP and OOWP are each rounded before RPI combines them.

use crate::models::{Match, Outcome, Side};

pub const DEFAULT_DIGITS: u32 = 2;

/// Precision used by the OWP values that OOWP averages.
///
/// `Default` keeps the historical behaviour where the nested OWP is always
/// rounded to [`DEFAULT_DIGITS`] no matter what the caller asked for.
/// `Caller` threads the caller's digits through instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OowpPrecision {
    #[default]
    Default,
    Caller,
}

/// Digits past this are below f64 resolution for values in `[0, 1]`.
pub const MAX_ROUNDING_DIGITS: u32 = 15;

/// Rounds half away from zero to `digits` decimal places. `digits` is
/// clamped to [`MAX_ROUNDING_DIGITS`] so the scale stays finite.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits.min(MAX_ROUNDING_DIGITS) as i32);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    played: u32,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.played += 1;
    }

    fn remove(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins = self.wins.saturating_sub(1),
            Outcome::Loss => self.losses = self.losses.saturating_sub(1),
            Outcome::Tie => self.ties = self.ties.saturating_sub(1),
        }
        self.played = self.played.saturating_sub(1);
    }

    /// Ties count as half a win.
    fn win_fraction(&self) -> Option<f64> {
        if self.played == 0 {
            return None;
        }
        Some((self.wins as f64 + 0.5 * self.ties as f64) / self.played as f64)
    }
}

fn tally(matches: &[Match], team: &str) -> Tally {
    let mut out = Tally::default();
    for m in matches {
        if let Some(side) = m.side_of(team) {
            out.record(m.outcome(side));
        }
    }
    out
}

/// Iterates the matches `team` took part in, with the side it played.
fn appearances<'a>(matches: &'a [Match], team: &'a str) -> impl Iterator<Item = (&'a Match, Side)> + 'a {
    matches
        .iter()
        .filter_map(move |m| m.side_of(team).map(|side| (m, side)))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn wins(matches: &[Match], team: &str) -> u32 {
    tally(matches, team).wins
}

pub fn losses(matches: &[Match], team: &str) -> u32 {
    tally(matches, team).losses
}

pub fn ties(matches: &[Match], team: &str) -> u32 {
    tally(matches, team).ties
}

pub fn matches_played(matches: &[Match], team: &str) -> u32 {
    appearances(matches, team).count() as u32
}

pub fn goals_for(matches: &[Match], team: &str) -> u32 {
    appearances(matches, team).map(|(m, side)| m.goals(side).0).sum()
}

pub fn goals_against(matches: &[Match], team: &str) -> u32 {
    appearances(matches, team).map(|(m, side)| m.goals(side).1).sum()
}

pub fn goal_differential(matches: &[Match], team: &str) -> i64 {
    goals_for(matches, team) as i64 - goals_against(matches, team) as i64
}

/// Three points for a win, one for a tie.
pub fn points(matches: &[Match], team: &str) -> u32 {
    let t = tally(matches, team);
    t.wins * 3 + t.ties
}

/// `"{wins}-{losses}-{ties}"`.
pub fn record(matches: &[Match], team: &str) -> String {
    let t = tally(matches, team);
    format!("{}-{}-{}", t.wins, t.losses, t.ties)
}

pub fn goals_per_match(matches: &[Match], team: &str) -> f64 {
    let played = matches_played(matches, team);
    if played == 0 {
        return 0.0;
    }
    round_to(goals_for(matches, team) as f64 / played as f64, DEFAULT_DIGITS)
}

/// Wins over matches played. Ties do not count toward the numerator.
pub fn wp(matches: &[Match], team: &str, digits: u32) -> f64 {
    let t = tally(matches, team);
    if t.played == 0 {
        return 0.0;
    }
    round_to(t.wins as f64 / t.played as f64, digits)
}

/// Opponents' winning percentage.
///
/// One sample per match `team` played, so an opponent met twice is counted
/// twice. Each sample is the opponent's full-corpus record with the
/// head-to-head match removed; opponents left with no other matches are
/// skipped, as are matches listing `team` on both sides.
pub fn owp(matches: &[Match], team: &str, digits: u32) -> f64 {
    let mut fractions = Vec::new();
    for (m, side) in appearances(matches, team) {
        let opponent_side = match side {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        };
        let opponent = &m.team(opponent_side).name;
        if opponent == team {
            continue;
        }
        let mut opponent_tally = tally(matches, opponent);
        opponent_tally.remove(m.outcome(opponent_side));
        if let Some(fraction) = opponent_tally.win_fraction() {
            fractions.push(fraction);
        }
    }
    mean(&fractions).map_or(0.0, |v| round_to(v, digits))
}

/// Opponents' opponents' winning percentage with the historical precision
/// behaviour (see [`OowpPrecision::Default`]).
pub fn oowp(matches: &[Match], team: &str, digits: u32) -> f64 {
    oowp_with(matches, team, digits, OowpPrecision::Default)
}

pub fn oowp_with(matches: &[Match], team: &str, digits: u32, precision: OowpPrecision) -> f64 {
    let inner_digits = match precision {
        OowpPrecision::Default => DEFAULT_DIGITS,
        OowpPrecision::Caller => digits,
    };
    let values: Vec<f64> = appearances(matches, team)
        .map(|(m, side)| owp(matches, &m.opponent(side).name, inner_digits))
        .collect();
    mean(&values).map_or(0.0, |v| round_to(v, digits))
}

/// Rating percentage index: 25% WP, 50% OWP, 25% OOWP.
pub fn rpi(matches: &[Match], team: &str, digits: u32) -> f64 {
    rpi_with(matches, team, digits, OowpPrecision::Default)
}

pub fn rpi_with(matches: &[Match], team: &str, digits: u32, precision: OowpPrecision) -> f64 {
    let wp = wp(matches, team, digits);
    let owp = owp(matches, team, digits);
    let oowp = oowp_with(matches, team, digits, precision);
    combine_rpi(wp, owp, oowp, digits)
}

pub fn combine_rpi(wp: f64, owp: f64, oowp: f64, digits: u32) -> f64 {
    round_to(0.25 * wp + 0.50 * owp + 0.25 * oowp, digits)
}
