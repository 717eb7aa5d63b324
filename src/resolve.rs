//! Team → event (division) name lookup.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::models::{Club, Event, Team};

/// Receives non-fatal problems found while building a report.
pub trait Warnings {
    fn warn(&self, message: &str);
}

/// Forwards to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarnings;

impl Warnings for TracingWarnings {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

#[derive(Debug, Default)]
pub struct CollectedWarnings {
    messages: RefCell<Vec<String>>,
}

impl CollectedWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Warnings for CollectedWarnings {
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Team names end in a two-word age group and league label
/// (`"Tophat SC G09 ECNL"`); the club name is everything before that.
pub fn club_name_from_team_name(team_name: &str) -> String {
    let parts: Vec<&str> = team_name.split(' ').collect();
    let keep = parts.len().saturating_sub(2);
    parts[..keep].join(" ")
}

/// Club and event tables of one organization.
#[derive(Debug, Clone, Default)]
pub struct EventDirectory {
    clubs_by_id: HashMap<i64, Club>,
    clubs_by_name: HashMap<String, Club>,
    events: HashMap<i64, Event>,
}

impl EventDirectory {
    pub fn new(clubs: &[Club], events: &[Event]) -> Self {
        let mut clubs_by_id = HashMap::new();
        let mut clubs_by_name = HashMap::new();
        for club in clubs {
            clubs_by_id.entry(club.id).or_insert_with(|| club.clone());
            clubs_by_name
                .entry(club.name.clone())
                .or_insert_with(|| club.clone());
        }
        let events = events.iter().map(|e| (e.id, e.clone())).collect();
        Self {
            clubs_by_id,
            clubs_by_name,
            events,
        }
    }

    /// The club id on the team wins; the name-derived club is the fallback
    /// for teams read from files without ids.
    pub fn club_for(&self, team: &Team) -> Option<&Club> {
        if let Some(club) = team.club_id.filter(|id| *id > 0).and_then(|id| self.clubs_by_id.get(&id)) {
            return Some(club);
        }
        self.clubs_by_name.get(&club_name_from_team_name(&team.name))
    }

    pub fn resolve(&self, team: &Team, warnings: &dyn Warnings) -> Option<String> {
        let Some(club) = self.club_for(team) else {
            warnings.warn(&format!("no club found for team '{}'", team.name));
            return None;
        };
        if club.event_id == 0 {
            warnings.warn(&format!("club '{}' has no event", club.name));
            return None;
        }
        match self.events.get(&club.event_id) {
            Some(event) => Some(event.name.clone()),
            None => {
                warnings.warn(&format!(
                    "event {} of club '{}' not found",
                    club.event_id, club.name
                ));
                None
            }
        }
    }
}
