use std::fmt;

/// Which input table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Planned,
    Actual,
    Kpi,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Actual => write!(f, "actual"),
            Self::Kpi => write!(f, "kpi"),
        }
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty candidates, unknown role, etc.).
    ConfigValidation(String),
    /// No column matched any of the candidates (or a key column is absent).
    ColumnNotFound { side: Side, candidates: Vec<String> },
    /// Upstream data provider failure. Never retried.
    DataSource { sheet: String, tab: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::ColumnNotFound { side, candidates } => {
                write!(f, "{side} table: no column matches {}", candidates.join(" | "))
            }
            Self::DataSource { sheet, tab, message } => {
                write!(f, "cannot load tab '{tab}' from '{sheet}': {message}")
            }
        }
    }
}

impl std::error::Error for ReconError {}

/// Raised by the access filter. Never degrades to an implicit permission level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Role string outside the known set.
    UnknownRole(String),
    /// Identity is blank, unknown to the resolver, or has no display name.
    UnknownIdentity(String),
    /// Admin selection names a manager absent from the data.
    UnknownManager(String),
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRole(role) => write!(f, "unknown role: '{role}'"),
            Self::UnknownIdentity(who) => write!(f, "unknown identity: '{who}'"),
            Self::UnknownManager(name) => {
                write!(f, "selected manager '{name}' is not present in the data")
            }
        }
    }
}

impl std::error::Error for AccessError {}
