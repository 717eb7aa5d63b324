//! Youth-soccer standings and RPI ratings from Total Global Sports results.
//!
//! `stats` and `standings` are pure functions over a match list; `tgs`,
//! `cache` and `ingest` build that list from the API or from CSV files.

pub mod cache;
pub mod config;
pub mod error;
pub mod http_client;
pub mod ingest;
pub mod models;
pub mod report;
pub mod resolve;
pub mod standings;
pub mod stats;
pub mod tgs;

pub use error::{RatingsError, Result};
pub use models::{Division, Gender, Match, Team};
pub use standings::{RatingOptions, SortStrategy, TeamStats, build_standings};
pub use stats::OowpPrecision;
