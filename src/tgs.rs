//! Client for the Total Global Sports public API.
//!
//! Reference data (states, countries, organizations, clubs, events) goes
//! through a [`RecordCache`]; schedules are always fetched live.

use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::RecordCache;
use crate::error::RatingsError;
use crate::http_client::{fetch_json, http_client};
use crate::ingest::{CorpusFilter, build_corpus};
use crate::models::{Club, Country, Division, Event, Match, Organization, ScheduleItem, State};

pub const TGS_API_BASE: &str = "https://public.totalglobalsports.com";

/// Where response bodies come from. Paths are relative to the API root.
pub trait JsonSource {
    fn fetch(&self, path: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }
}

impl JsonSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<String> {
        let client = http_client(self.timeout_secs)?;
        fetch_json(client, &format!("{}{}", self.base_url, path))
    }
}

/// Canned responses keyed by path.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    bodies: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(path.into(), body.into());
        self
    }
}

impl JsonSource for StaticSource {
    fn fetch(&self, path: &str) -> Result<String> {
        self.bodies
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no canned response for {path}"))
    }
}

/// One club's matches in a division, plus the items that failed to normalize.
#[derive(Debug, Default)]
pub struct ScheduleMatches {
    pub matches: Vec<Match>,
    pub errors: Vec<RatingsError>,
}

/// Matches gathered for one division, plus the per-club and per-item failures
/// that were skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct DivisionMatches {
    pub matches: Vec<Match>,
    pub clubs_total: usize,
    pub clubs_fetched: usize,
    pub errors: Vec<String>,
}

pub struct TgsClient<S, C> {
    source: S,
    cache: C,
}

impl<S: JsonSource, C: RecordCache> TgsClient<S, C> {
    pub fn new(source: S, cache: C) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cached<T>(&self, key: &str, fetch: impl FnOnce() -> Result<Vec<T>>) -> Result<Vec<T>>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        if let Some(records) = self.cache.get::<T>(key)? {
            return Ok(records);
        }
        info!(key, "cache miss, fetching");
        let records = fetch()?;
        self.cache.put(key, &records)?;
        Ok(records)
    }

    fn fetch(&self, path: &str) -> Result<String> {
        self.source.fetch(path)
    }

    pub fn states(&self) -> Result<Vec<State>> {
        self.cached("states", || {
            let body = self.fetch("/api/Association/get-all-states")?;
            parse_states_json(&body)
        })
    }

    pub fn countries(&self) -> Result<Vec<Country>> {
        self.cached("countries", || {
            let body = self.fetch("/api/Association/get-all-countries")?;
            parse_countries_json(&body)
        })
    }

    /// Current organizations. The full list is cached; `ecnl_only` filters
    /// afterwards.
    pub fn organizations(&self, ecnl_only: bool) -> Result<Vec<Organization>> {
        let all = self.cached("organizations", || {
            let body = self.fetch("/api/Association/get-current-orgs-list")?;
            parse_organizations_json(&body)
        })?;
        Ok(all
            .into_iter()
            .filter(|org| !ecnl_only || org.is_ecnl())
            .collect())
    }

    pub fn organization_by_id(&self, organization_id: i64) -> Result<Option<Organization>> {
        Ok(self
            .organizations(false)?
            .into_iter()
            .find(|org| org.id == organization_id))
    }

    pub fn organization_by_name(&self, name: &str) -> Result<Option<Organization>> {
        Ok(self
            .organizations(false)?
            .into_iter()
            .find(|org| org.name == name))
    }

    pub fn require_organization(&self, organization_id: i64) -> Result<Organization> {
        self.organization_by_id(organization_id)?
            .ok_or_else(|| RatingsError::OrganizationNotFound { organization_id }.into())
    }

    pub fn clubs_by_organization_id(&self, organization_id: i64) -> Result<Vec<Club>> {
        self.cached(&format!("clubs_org_{organization_id}"), || {
            let body = self.fetch(&format!(
                "/api/Event/get-org-club-list-by-orgID-improved/{organization_id}"
            ))?;
            parse_clubs_json(&body)
        })
    }

    pub fn clubs_by_organization_name(&self, name: &str) -> Result<Vec<Club>> {
        match self.organization_by_name(name)? {
            Some(org) => self.clubs_by_organization_id(org.id),
            None => Ok(Vec::new()),
        }
    }

    /// Distinct, non-zero event ids of the organization's clubs, ascending.
    pub fn event_ids_by_organization_id(&self, organization_id: i64) -> Result<Vec<i64>> {
        let ids: BTreeSet<i64> = self
            .clubs_by_organization_id(organization_id)?
            .iter()
            .map(|club| club.event_id)
            .filter(|id| *id != 0)
            .collect();
        Ok(ids.into_iter().collect())
    }

    pub fn event_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        let body = self.fetch(&format!("/api/Event/get-org-event-by-eventID/{event_id}"))?;
        parse_event_json(&body)
    }

    pub fn events_by_organization_id(&self, organization_id: i64) -> Result<Vec<Event>> {
        self.cached(&format!("events_org_{organization_id}"), || {
            let mut events = Vec::new();
            for event_id in self.event_ids_by_organization_id(organization_id)? {
                match self.event_by_id(event_id)? {
                    Some(event) => events.push(event),
                    None => warn!(event_id, organization_id, "event has no data"),
                }
            }
            Ok(events)
        })
    }

    /// Events of every organization, sorted by name.
    pub fn events(&self, ecnl_only: bool) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for org in self.organizations(ecnl_only)? {
            events.extend(self.events_by_organization_id(org.id)?);
        }
        events.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(events)
    }

    /// Past schedule of one club within one event. Either id being zero means
    /// there is nothing to fetch.
    pub fn schedule(&self, club_id: i64, event_id: i64) -> Result<Vec<ScheduleItem>> {
        if club_id == 0 || event_id == 0 {
            return Ok(Vec::new());
        }
        let body = self.fetch(&format!(
            "/api/Club/get-score-reporting-schedule-list/{club_id}/{event_id}"
        ))?;
        parse_schedule_json(&body)
    }

    /// Past schedule of one club restricted to `division`. Malformed items
    /// of the division are returned as errors next to the good matches.
    pub fn division_schedule(
        &self,
        club_id: i64,
        event_id: i64,
        division: &Division,
    ) -> Result<ScheduleMatches> {
        if club_id == 0 || event_id == 0 {
            return Ok(ScheduleMatches::default());
        }
        let body = self.fetch(&format!(
            "/api/Club/get-score-reporting-schedule-list/{club_id}/{event_id}"
        ))?;
        parse_division_schedule_json(&body, division)
    }

    /// Every club's schedule in the organization, restricted to `division`.
    ///
    /// A club whose schedule cannot be fetched is recorded in `errors` and
    /// skipped; so is each malformed item, without dropping the rest of that
    /// club's matches.
    pub fn matches_for_division(
        &self,
        division: &Division,
        organization_id: i64,
        filter: &CorpusFilter,
    ) -> Result<DivisionMatches> {
        let clubs = self.clubs_by_organization_id(organization_id)?;
        let mut out = DivisionMatches {
            clubs_total: clubs.len(),
            ..DivisionMatches::default()
        };
        let mut gathered = Vec::new();
        for club in &clubs {
            match self.division_schedule(club.id, club.event_id, division) {
                Ok(schedule) => {
                    out.clubs_fetched += 1;
                    for err in schedule.errors {
                        warn!(club_id = club.id, club = %club.name, "schedule item skipped: {err}");
                        out.errors.push(format!("club {} ({}): {err}", club.id, club.name));
                    }
                    gathered.extend(schedule.matches);
                }
                Err(err) => {
                    warn!(club_id = club.id, club = %club.name, "schedule skipped: {err:#}");
                    out.errors.push(format!("club {} ({}): {err:#}", club.id, club.name));
                }
            }
        }
        out.matches = build_corpus(gathered, filter);
        info!(
            division = %division,
            matches = out.matches.len(),
            clubs = out.clubs_fetched,
            "division matches collected"
        );
        Ok(out)
    }
}

fn data_array<'a>(v: &'a Value) -> &'a [Value] {
    v.get("data")
        .and_then(|x| x.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn read_str(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|x| x.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Integer field that may arrive as a number or a numeric string. Missing
/// and null read as zero.
fn read_int(item: &Value, key: &'static str, kind: &'static str, index: usize) -> Result<i64, RatingsError> {
    let malformed = |raw: String| RatingsError::MalformedItem {
        kind,
        index,
        reason: format!("{key} is not an integer: {raw}"),
    };
    match item.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| malformed(n.to_string())),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<i64>().map_err(|_| malformed(s.to_string()))
            }
        }
        Some(other) => Err(malformed(other.to_string())),
    }
}

fn parse_root(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).context("invalid json")
}

pub fn parse_states_json(raw: &str) -> Result<Vec<State>> {
    let v = parse_root(raw)?;
    let mut out = Vec::new();
    for (idx, item) in data_array(&v).iter().enumerate() {
        out.push(State {
            id: read_int(item, "stateID", "state", idx)?,
            name: read_str(item, "stateName"),
        });
    }
    Ok(out)
}

pub fn parse_countries_json(raw: &str) -> Result<Vec<Country>> {
    let v = parse_root(raw)?;
    let mut out = Vec::new();
    for (idx, item) in data_array(&v).iter().enumerate() {
        out.push(Country {
            id: read_int(item, "countryID", "country", idx)?,
            name: read_str(item, "countryName"),
        });
    }
    Ok(out)
}

pub fn parse_organizations_json(raw: &str) -> Result<Vec<Organization>> {
    let v = parse_root(raw)?;
    let mut out = Vec::new();
    for (idx, item) in data_array(&v).iter().enumerate() {
        out.push(Organization {
            id: read_int(item, "orgID", "organization", idx)?,
            season_id: read_int(item, "orgSeasonID", "organization", idx)?,
            name: read_str(item, "orgName"),
            season_group_id: read_int(item, "orgSeasonGroupID", "organization", idx)?,
        });
    }
    Ok(out)
}

pub fn parse_clubs_json(raw: &str) -> Result<Vec<Club>> {
    let v = parse_root(raw)?;
    let mut out = Vec::new();
    for (idx, item) in data_array(&v).iter().enumerate() {
        out.push(Club {
            id: read_int(item, "clubID", "club", idx)?,
            name: read_str(item, "clubName"),
            full_name: read_str(item, "clubFullName"),
            city: read_str(item, "city"),
            logo: read_str(item, "clubLogo"),
            state_code: read_str(item, "stateCode"),
            org_id: read_int(item, "orgID", "club", idx)?,
            org_season_id: read_int(item, "orgSeasonID", "club", idx)?,
            event_id: read_int(item, "eventID", "club", idx)?,
        });
    }
    Ok(out)
}

/// `None` when the response carries no `data` object.
pub fn parse_event_json(raw: &str) -> Result<Option<Event>> {
    let v = parse_root(raw)?;
    let Some(item) = v.get("data").filter(|d| d.is_object()) else {
        return Ok(None);
    };
    Ok(Some(Event {
        id: read_int(item, "eventID", "event", 0)?,
        name: read_str(item, "eventName"),
        org_id: read_int(item, "orgID", "event", 0)?,
        org_name: read_str(item, "orgName"),
        org_season_id: read_int(item, "orgSeasonID", "event", 0)?,
        org_season_name: read_str(item, "orgSeasonName"),
    }))
}

fn schedule_list(v: &Value) -> &[Value] {
    v.get("data")
        .and_then(|d| d.get("eventPastScheduleList"))
        .and_then(|x| x.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn malformed_schedule(index: usize, err: serde_json::Error) -> RatingsError {
    RatingsError::MalformedItem {
        kind: "schedule",
        index,
        reason: err.to_string(),
    }
}

/// Strict parse: the first malformed item fails the whole list.
pub fn parse_schedule_json(raw: &str) -> Result<Vec<ScheduleItem>> {
    let v = parse_root(raw)?;
    let list = schedule_list(&v);
    let mut out = Vec::with_capacity(list.len());
    for (idx, item) in list.iter().enumerate() {
        out.push(ScheduleItem::deserialize_item(item).map_err(|err| malformed_schedule(idx, err))?);
    }
    Ok(out)
}

/// Parses only the items labelled with `division`, normalizing each one on
/// its own. Items of other divisions are never decoded, so their problems
/// don't surface here.
pub fn parse_division_schedule_json(raw: &str, division: &Division) -> Result<ScheduleMatches> {
    let v = parse_root(raw)?;
    let code = division.to_string();
    let mut out = ScheduleMatches::default();
    for (idx, item) in schedule_list(&v).iter().enumerate() {
        let label = item
            .get("division")
            .and_then(|d| d.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if label != code {
            continue;
        }
        let normalized = ScheduleItem::deserialize_item(item)
            .map_err(|err| malformed_schedule(idx, err))
            .and_then(|parsed| parsed.to_match(idx));
        match normalized {
            Ok(m) => out.matches.push(m),
            Err(err) => out.errors.push(err),
        }
    }
    Ok(out)
}

impl ScheduleItem {
    fn deserialize_item(item: &Value) -> serde_json::Result<Self> {
        serde::Deserialize::deserialize(item)
    }
}

#[cfg(test)]
mod tests {
    use super::{read_int, parse_root};
    use serde_json::json;

    #[test]
    fn read_int_accepts_numbers_and_numeric_strings() {
        let item = json!({"a": 5, "b": " 12 ", "c": null, "d": "", "e": "x1"});
        assert_eq!(read_int(&item, "a", "t", 0).expect("a"), 5);
        assert_eq!(read_int(&item, "b", "t", 0).expect("b"), 12);
        assert_eq!(read_int(&item, "c", "t", 0).expect("c"), 0);
        assert_eq!(read_int(&item, "d", "t", 0).expect("d"), 0);
        assert_eq!(read_int(&item, "missing", "t", 0).expect("missing"), 0);
        assert!(read_int(&item, "e", "t", 0).is_err());
    }

    #[test]
    fn empty_body_parses_as_null() {
        assert!(parse_root("  ").expect("empty").is_null());
        assert!(parse_root("null").expect("null").is_null());
    }
}
