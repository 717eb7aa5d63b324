use proptest::prelude::*;

use tgs_ratings::models::{Match, Team};
use tgs_ratings::stats::{
    goal_differential, goals_against, goals_for, goals_per_match, losses, matches_played, oowp,
    owp, points, record, round_to, rpi, ties, wins, wp,
};

fn game(id: i64, home: &str, away: &str, home_score: u32, away_score: u32) -> Match {
    Match {
        id,
        home: Team::named(home),
        away: Team::named(away),
        home_score,
        away_score,
        date: None,
    }
}

#[test]
fn single_match_winner_and_loser() {
    let m = vec![game(1, "A", "B", 3, 1)];

    assert_eq!(wins(&m, "A"), 1);
    assert_eq!(losses(&m, "A"), 0);
    assert_eq!(wp(&m, "A", 2), 1.0);
    assert_eq!(goal_differential(&m, "A"), 2);

    assert_eq!(wins(&m, "B"), 0);
    assert_eq!(losses(&m, "B"), 1);
    assert_eq!(wp(&m, "B", 2), 0.0);
    assert_eq!(goal_differential(&m, "B"), -2);

    assert_eq!(record(&m, "A"), "1-0-0");
    assert_eq!(points(&m, "A"), 3);
    assert_eq!(goals_per_match(&m, "A"), 3.0);
}

#[test]
fn owp_excludes_the_head_to_head_match() {
    // B's record without the loss to A is 1-0 against C.
    let m = vec![game(1, "A", "B", 2, 0), game(2, "B", "C", 1, 0)];
    assert_eq!(owp(&m, "A", 2), 1.0);
    // A only played B, so from B's side A has nothing left once excluded;
    // C has nothing left either.
    assert_eq!(owp(&m, "B", 2), 0.0);
}

#[test]
fn round_robin_of_ties() {
    let m = vec![
        game(1, "A", "B", 1, 1),
        game(2, "B", "C", 1, 1),
        game(3, "C", "A", 1, 1),
    ];
    for team in ["A", "B", "C"] {
        assert_eq!(ties(&m, team), 2);
        assert_eq!(wins(&m, team), 0);
        assert_eq!(losses(&m, team), 0);
        assert_eq!(points(&m, team), 2);
        assert_eq!(wp(&m, team, 2), 0.0);
        assert_eq!(owp(&m, team, 2), 0.5);
        assert_eq!(oowp(&m, team, 2), 0.5);
        assert_eq!(rpi(&m, team, 2), round_to(0.25 * 0.0 + 0.5 * 0.5 + 0.25 * 0.5, 2));
    }
}

#[test]
fn unknown_team_is_all_zero() {
    let m = vec![game(1, "A", "B", 3, 1)];
    assert_eq!(matches_played(&m, "Nobody"), 0);
    assert_eq!(record(&m, "Nobody"), "0-0-0");
    assert_eq!(goals_per_match(&m, "Nobody"), 0.0);
    assert_eq!(wp(&m, "Nobody", 2), 0.0);
    assert_eq!(owp(&m, "Nobody", 2), 0.0);
    assert_eq!(oowp(&m, "Nobody", 2), 0.0);
    assert_eq!(rpi(&m, "Nobody", 2), 0.0);
}

#[test]
fn goals_are_taken_from_the_right_side() {
    let m = vec![game(1, "A", "B", 3, 1), game(2, "C", "A", 4, 2)];
    assert_eq!(goals_for(&m, "A"), 5);
    assert_eq!(goals_against(&m, "A"), 5);
    assert_eq!(goals_per_match(&m, "A"), 2.5);
}

#[test]
fn goals_per_match_rounds_to_two_places() {
    let m = vec![
        game(1, "A", "B", 1, 0),
        game(2, "A", "C", 0, 0),
        game(3, "A", "D", 0, 0),
    ];
    assert_eq!(goals_per_match(&m, "A"), 0.33);
    assert_eq!(wp(&m, "A", 2), 0.33);
    assert_eq!(wp(&m, "A", 3), 0.333);
}

#[test]
fn oversized_digits_do_not_produce_nan() {
    let m = vec![game(1, "A", "B", 0, 1), game(2, "B", "C", 2, 2)];
    for team in ["A", "B", "C"] {
        for value in [wp(&m, team, 400), owp(&m, team, 400), oowp(&m, team, 400), rpi(&m, team, 400)] {
            assert!((0.0..=1.0).contains(&value), "{team}: {value}");
        }
    }
    assert_eq!(wp(&m, "A", 400), 0.0);
    assert_eq!(rpi(&m, "A", u32::MAX), rpi(&m, "A", 15));
}

#[test]
fn same_name_on_both_sides_counts_once() {
    let m = vec![game(1, "A", "A", 2, 1)];
    assert_eq!(matches_played(&m, "A"), 1);
    assert_eq!(wins(&m, "A"), 1);
    assert_eq!(losses(&m, "A"), 0);
    assert_eq!(goals_for(&m, "A"), 2);
    assert_eq!(goals_against(&m, "A"), 1);
}

const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];

fn corpus() -> impl Strategy<Value = Vec<Match>> {
    prop::collection::vec((0usize..5, 0usize..5, 0u32..6, 0u32..6), 0..25).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (h, a, hs, as_))| game(idx as i64 + 1, NAMES[h], NAMES[a], hs, as_))
            .collect()
    })
}

proptest! {
    #[test]
    fn counting_identities_hold(m in corpus(), t in 0usize..5) {
        let team = NAMES[t];
        prop_assert_eq!(matches_played(&m, team), wins(&m, team) + losses(&m, team) + ties(&m, team));
        prop_assert_eq!(points(&m, team), 3 * wins(&m, team) + ties(&m, team));
        prop_assert_eq!(
            goal_differential(&m, team),
            goals_for(&m, team) as i64 - goals_against(&m, team) as i64
        );
    }

    #[test]
    fn percentages_stay_in_unit_range(m in corpus(), t in 0usize..5, digits in 0u32..5) {
        let team = NAMES[t];
        for value in [wp(&m, team, digits), owp(&m, team, digits), oowp(&m, team, digits), rpi(&m, team, digits)] {
            prop_assert!((0.0..=1.0).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn rpi_is_the_weighted_sum_of_its_rounded_terms(m in corpus(), t in 0usize..5, digits in 1u32..5) {
        let team = NAMES[t];
        let expected = round_to(
            0.25 * wp(&m, team, digits) + 0.50 * owp(&m, team, digits) + 0.25 * oowp(&m, team, digits),
            digits,
        );
        prop_assert_eq!(rpi(&m, team, digits), expected);
    }

    #[test]
    fn repeated_computation_is_identical(m in corpus(), t in 0usize..5) {
        let team = NAMES[t];
        let before = m.clone();
        let first = (record(&m, team), owp(&m, team, 2), oowp(&m, team, 2), rpi(&m, team, 2));
        let second = (record(&m, team), owp(&m, team, 2), oowp(&m, team, 2), rpi(&m, team, 2));
        prop_assert_eq!(first, second);
        prop_assert_eq!(m, before);
    }
}
