//! Typed errors surfaced by ingestion and the provider layer.
//!
//! Most call sites work in `anyhow::Result` and attach context at I/O
//! boundaries; the variants here are the failures callers are expected to
//! match on.

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, thiserror::Error)]
pub enum RatingsError {
    #[error("malformed record at line {line}: field `{field}` has invalid value {value:?}")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("malformed {kind} item {index}: {reason}")]
    MalformedItem {
        kind: &'static str,
        index: usize,
        reason: String,
    },

    #[error("organization not found: {organization_id}")]
    OrganizationNotFound { organization_id: i64 },

    #[error("invalid division {raw:?}: expected a gender prefix and a two-digit birth year")]
    InvalidDivision { raw: String },

    #[error("cache entry `{key}` is unreadable: {reason}")]
    CorruptCache { key: String, reason: String },
}
