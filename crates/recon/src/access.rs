//! Row-level visibility by caller role.
//!
//! Callers pass role and identity explicitly on every call; nothing here keeps
//! session state. Resolving a login to a [`Caller`] goes through the
//! [`IdentityResolver`] trait so the credential source can be swapped.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::UserConfig;
use crate::error::AccessError;
use crate::model::ReconciledRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees every manager, optionally narrowed by an explicit selection.
    Admin,
    /// Sees only rows for their own display name.
    Restricted,
}

impl Role {
    /// Exact match; `manager` is accepted as an alias for `restricted`.
    pub fn parse(role: &str) -> Result<Self, AccessError> {
        match role {
            "admin" => Ok(Self::Admin),
            "restricted" | "manager" => Ok(Self::Restricted),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: String,
    pub role: Role,
    pub display_name: Option<String>,
}

/// Maps a login to a caller. Implementations must fail on unknown logins
/// rather than hand out a default role.
pub trait IdentityResolver {
    fn resolve(&self, identity: &str) -> Result<Caller, AccessError>;
}

/// Credential table loaded from the `[users]` section of the config.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: BTreeMap<String, UserConfig>,
}

impl StaticCredentials {
    pub fn new(users: BTreeMap<String, UserConfig>) -> Self {
        Self { users }
    }
}

impl IdentityResolver for StaticCredentials {
    fn resolve(&self, identity: &str) -> Result<Caller, AccessError> {
        let user = self
            .users
            .get(identity)
            .ok_or_else(|| AccessError::UnknownIdentity(identity.to_string()))?;
        Ok(Caller {
            identity: identity.to_string(),
            role: Role::parse(&user.role)?,
            display_name: user.display_name.clone(),
        })
    }
}

/// Result of a successful filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Rows the caller may see. May be empty when an admin selected nobody.
    Visible(Vec<ReconciledRecord>),
    /// A restricted caller has no rows. Not an error.
    NoData { manager: String },
}

impl FilterOutcome {
    pub fn records(&self) -> &[ReconciledRecord] {
        match self {
            Self::Visible(records) => records,
            Self::NoData { .. } => &[],
        }
    }
}

/// Restrict reconciled rows to what the caller may see.
///
/// Restricted callers get only their own rows and `explicit_selection` is
/// ignored. Admin selections must name managers present in `records`.
pub fn filter_for_caller(
    records: &[ReconciledRecord],
    role: &str,
    identity: &str,
    manager_display_name: Option<&str>,
    explicit_selection: Option<&[String]>,
) -> Result<FilterOutcome, AccessError> {
    let role = Role::parse(role)?;
    if identity.trim().is_empty() {
        return Err(AccessError::UnknownIdentity(identity.to_string()));
    }

    match role {
        Role::Admin => {
            let Some(selection) = explicit_selection else {
                return Ok(FilterOutcome::Visible(records.to_vec()));
            };

            let present = managers(records);
            if let Some(missing) = selection.iter().find(|name| !present.contains(name.as_str())) {
                return Err(AccessError::UnknownManager(missing.clone()));
            }

            let wanted: BTreeSet<&str> = selection.iter().map(String::as_str).collect();
            Ok(FilterOutcome::Visible(
                records
                    .iter()
                    .filter(|r| wanted.contains(r.manager.as_str()))
                    .cloned()
                    .collect(),
            ))
        }
        Role::Restricted => {
            let name = manager_display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AccessError::UnknownIdentity(identity.to_string()))?;

            if explicit_selection.is_some() {
                tracing::debug!(identity, "selection ignored for restricted caller");
            }

            let own: Vec<ReconciledRecord> = records.iter().filter(|r| r.manager == name).cloned().collect();
            if own.is_empty() {
                return Ok(FilterOutcome::NoData { manager: name.to_string() });
            }
            Ok(FilterOutcome::Visible(own))
        }
    }
}

/// [`filter_for_caller`] for an already-resolved caller.
pub fn filter_for(
    records: &[ReconciledRecord],
    caller: &Caller,
    explicit_selection: Option<&[String]>,
) -> Result<FilterOutcome, AccessError> {
    filter_for_caller(
        records,
        &caller.role.to_string(),
        &caller.identity,
        caller.display_name.as_deref(),
        explicit_selection,
    )
}

/// Keep rows whose project is in `selection`; `None` keeps everything.
pub fn filter_projects(records: &[ReconciledRecord], selection: Option<&[String]>) -> Vec<ReconciledRecord> {
    match selection {
        None => records.to_vec(),
        Some(projects) => records
            .iter()
            .filter(|r| projects.iter().any(|p| *p == r.project))
            .cloned()
            .collect(),
    }
}

/// Sorted unique managers.
pub fn managers(records: &[ReconciledRecord]) -> BTreeSet<&str> {
    records.iter().map(|r| r.manager.as_str()).collect()
}

/// Sorted unique projects.
pub fn projects(records: &[ReconciledRecord]) -> BTreeSet<&str> {
    records.iter().map(|r| r.project.as_str()).collect()
}
