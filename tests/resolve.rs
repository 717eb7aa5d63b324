use tgs_ratings::models::{Club, Event, Team};
use tgs_ratings::resolve::{CollectedWarnings, EventDirectory, club_name_from_team_name};

fn club(id: i64, name: &str, event_id: i64) -> Club {
    Club {
        id,
        name: name.to_string(),
        full_name: format!("{name} Soccer Club"),
        city: String::new(),
        logo: String::new(),
        state_code: "GA".to_string(),
        org_id: 12,
        org_season_id: 55,
        event_id,
    }
}

fn event(id: i64, name: &str) -> Event {
    Event {
        id,
        name: name.to_string(),
        org_id: 12,
        org_name: "ECNL Girls".to_string(),
        org_season_id: 55,
        org_season_name: "2023-24".to_string(),
    }
}

fn directory() -> EventDirectory {
    EventDirectory::new(
        &[
            club(1, "Tophat SC", 101),
            club(2, "Concorde Fire", 999),
            club(4, "Idle FC", 0),
        ],
        &[event(101, "ECNL Girls Southeast 2023-24")],
    )
}

#[test]
fn club_name_drops_age_group_and_league() {
    assert_eq!(club_name_from_team_name("Tophat SC G09 ECNL"), "Tophat SC");
    assert_eq!(club_name_from_team_name("Solar G09 ECNL"), "Solar");
    assert_eq!(club_name_from_team_name("G09 ECNL"), "");
    assert_eq!(club_name_from_team_name("Short"), "");
}

#[test]
fn team_name_resolves_to_event() {
    let warnings = CollectedWarnings::new();
    let name = directory().resolve(&Team::named("Tophat SC G09 ECNL"), &warnings);
    assert_eq!(name.as_deref(), Some("ECNL Girls Southeast 2023-24"));
    assert!(warnings.is_empty());
}

#[test]
fn club_id_takes_precedence_over_the_name() {
    let dir = directory();
    let team = Team::with_ids("Renamed Academy G09 ECNL", Some(11), Some(1));
    assert_eq!(dir.club_for(&team).map(|c| c.id), Some(1));

    // unknown id falls back to the derived name
    let team = Team::with_ids("Tophat SC G09 ECNL", Some(11), Some(77));
    assert_eq!(dir.club_for(&team).map(|c| c.id), Some(1));
}

#[test]
fn each_failure_mode_warns_and_yields_none() {
    let dir = directory();
    let warnings = CollectedWarnings::new();

    assert_eq!(dir.resolve(&Team::named("Nobody FC G09 ECNL"), &warnings), None);
    assert_eq!(dir.resolve(&Team::named("Idle FC G09 ECNL"), &warnings), None);
    assert_eq!(dir.resolve(&Team::named("Concorde Fire G09 ECNL"), &warnings), None);

    assert_eq!(
        warnings.messages(),
        vec![
            "no club found for team 'Nobody FC G09 ECNL'".to_string(),
            "club 'Idle FC' has no event".to_string(),
            "event 999 of club 'Concorde Fire' not found".to_string(),
        ]
    );
}

#[test]
fn empty_directory_resolves_nothing() {
    let warnings = CollectedWarnings::new();
    assert_eq!(
        EventDirectory::default().resolve(&Team::named("Tophat SC G09 ECNL"), &warnings),
        None
    );
    assert_eq!(warnings.messages().len(), 1);
}
