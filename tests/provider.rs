use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use tgs_ratings::cache::{MemoryCache, RecordCache};
use tgs_ratings::error::RatingsError;
use tgs_ratings::ingest::CorpusFilter;
use tgs_ratings::models::{Division, OrganizationName, State};
use tgs_ratings::tgs::{StaticSource, TgsClient};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn canned() -> StaticSource {
    StaticSource::new()
        .with("/api/Association/get-all-states", read_fixture("tgs_states.json"))
        .with("/api/Association/get-all-countries", read_fixture("tgs_countries.json"))
        .with("/api/Association/get-current-orgs-list", read_fixture("tgs_organizations.json"))
        .with(
            "/api/Event/get-org-club-list-by-orgID-improved/12",
            read_fixture("tgs_clubs_org_12.json"),
        )
        .with("/api/Event/get-org-event-by-eventID/101", read_fixture("tgs_event_101.json"))
        .with("/api/Event/get-org-event-by-eventID/102", read_fixture("tgs_event_102.json"))
        .with(
            "/api/Club/get-score-reporting-schedule-list/1/101",
            read_fixture("tgs_schedule_club_1.json"),
        )
        .with(
            "/api/Club/get-score-reporting-schedule-list/2/101",
            read_fixture("tgs_schedule_club_2.json"),
        )
}

fn client() -> TgsClient<StaticSource, MemoryCache> {
    TgsClient::new(canned(), MemoryCache::new())
}

#[test]
fn reference_lists_are_cached_after_first_fetch() {
    let client = client();
    assert!(!client.cache().contains("states"));
    let states = client.states().expect("states");
    assert_eq!(states.len(), 2);
    assert!(client.cache().contains("states"));

    client.countries().expect("countries");
    assert!(client.cache().contains("countries"));
}

#[test]
fn cached_records_win_over_the_source() {
    let cache = MemoryCache::new();
    cache
        .put(
            "states",
            &[State {
                id: 99,
                name: "Cached".to_string(),
            }],
        )
        .expect("put");
    let client = TgsClient::new(StaticSource::new(), cache);
    let states = client.states().expect("served from cache");
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].name, "Cached");
}

#[test]
fn organizations_filter_after_caching_the_full_list() {
    let client = client();
    let ecnl: Vec<i64> = client.organizations(true).expect("orgs").iter().map(|o| o.id).collect();
    assert_eq!(ecnl, vec![12, 9]);
    let all = client.organizations(false).expect("orgs");
    assert_eq!(all.len(), 3);

    assert_eq!(
        client.organization_by_name(OrganizationName::EcnlBoys.as_str()).expect("lookup").map(|o| o.id),
        Some(9)
    );
    assert!(client.organization_by_id(404).expect("lookup").is_none());
}

#[test]
fn unknown_organization_is_reported() {
    let err = client().require_organization(404).expect_err("missing org");
    assert!(matches!(
        err.downcast_ref::<RatingsError>(),
        Some(RatingsError::OrganizationNotFound { organization_id: 404 })
    ));
}

#[test]
fn clubs_and_event_ids_of_an_organization() {
    let client = client();
    let clubs = client.clubs_by_organization_name("ECNL Girls").expect("clubs");
    assert_eq!(clubs.len(), 4);
    assert!(client.cache().contains("clubs_org_12"));
    assert_eq!(client.event_ids_by_organization_id(12).expect("ids"), vec![101, 102]);
    assert!(client.clubs_by_organization_name("No Such League").expect("clubs").is_empty());
}

#[test]
fn events_of_an_organization_are_fetched_and_cached() {
    let client = client();
    let events = client.events_by_organization_id(12).expect("events");
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ECNL Girls Southeast 2023-24", "ECNL Girls Mid-Atlantic 2023-24"]);
    assert!(client.cache().contains("events_org_12"));
}

#[test]
fn schedule_with_zero_id_is_empty_without_fetching() {
    let client = TgsClient::new(StaticSource::new(), MemoryCache::new());
    assert!(client.schedule(0, 101).expect("no fetch").is_empty());
    assert!(client.schedule(4, 0).expect("no fetch").is_empty());
    assert!(client.schedule(1, 101).is_err());
}

#[test]
fn division_matches_are_deduped_filtered_and_failures_collected() {
    let client = client();
    let division: Division = "G2009".parse().expect("division");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");

    let collected = client
        .matches_for_division(&division, 12, &CorpusFilter::completed_as_of(today))
        .expect("collected");
    let ids: Vec<i64> = collected.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5001, 5002, 5004]);
    assert_eq!(collected.clubs_total, 4);
    // NC Courage has no canned schedule; Idle FC has no event and yields nothing.
    assert_eq!(collected.clubs_fetched, 3);
    assert_eq!(collected.errors.len(), 1);
    assert!(collected.errors[0].starts_with("club 3 (NC Courage)"));

    let with_future = client
        .matches_for_division(&division, 12, &CorpusFilter::everything(today))
        .expect("collected");
    let ids: Vec<i64> = with_future.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5001, 5002, 5099, 5004]);
}

#[test]
fn malformed_item_is_recorded_and_skipped() {
    let source = canned().with(
        "/api/Club/get-score-reporting-schedule-list/2/101",
        read_fixture("tgs_schedule_bad_score.json"),
    );
    let client = TgsClient::new(source, MemoryCache::new());
    let division: Division = "G2009".parse().expect("division");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");

    let collected = client
        .matches_for_division(&division, 12, &CorpusFilter::completed_as_of(today))
        .expect("collected");
    let ids: Vec<i64> = collected.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5001, 5002]);
    // the bad item and NC Courage's missing schedule
    assert_eq!(collected.errors.len(), 2);
    assert_eq!(collected.clubs_fetched, 3);
}

#[test]
fn malformed_item_does_not_drop_the_rest_of_the_club() {
    let source = canned().with(
        "/api/Club/get-score-reporting-schedule-list/2/101",
        read_fixture("tgs_schedule_mixed.json"),
    );
    let client = TgsClient::new(source, MemoryCache::new());
    let division: Division = "G2009".parse().expect("division");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");

    let collected = client
        .matches_for_division(&division, 12, &CorpusFilter::completed_as_of(today))
        .expect("collected");
    let ids: Vec<i64> = collected.matches.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![5001, 5002, 7003]);
    assert_eq!(collected.errors.len(), 2);
    assert!(
        collected
            .errors
            .iter()
            .any(|e| e.starts_with("club 2 (Concorde Fire): malformed schedule item 1"))
    );
}
