use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::access::Role;
use crate::aggregate::AggregateOptions;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "SideConfig::planned_default", deserialize_with = "planned_side")]
    pub planned: SideConfig,
    #[serde(default = "SideConfig::actual_default", deserialize_with = "actual_side")]
    pub actual: SideConfig,
    #[serde(default)]
    pub columns: KeyColumns,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub kpi: Option<KpiConfig>,
    #[serde(default)]
    pub users: BTreeMap<String, UserConfig>,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Which spreadsheet to read. For the CSV provider this is a directory,
/// relative to the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { sheet: default_sheet() }
    }
}

fn default_sheet() -> String {
    ".".into()
}

// ---------------------------------------------------------------------------
// Planned / actual sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SideConfig {
    pub tab: String,
    pub amount_candidates: Vec<String>,
    pub skip_blank_manager: bool,
    pub exclude_managers: Vec<String>,
}

/// A side as written in TOML. An omitted `skip_blank_manager` falls back to
/// the side's own default, not to `false`.
#[derive(Deserialize)]
struct RawSide {
    tab: String,
    amount_candidates: Vec<String>,
    #[serde(default)]
    skip_blank_manager: Option<bool>,
    #[serde(default)]
    exclude_managers: Vec<String>,
}

impl RawSide {
    fn into_side(self, defaults: SideConfig) -> SideConfig {
        SideConfig {
            tab: self.tab,
            amount_candidates: self.amount_candidates,
            skip_blank_manager: self.skip_blank_manager.unwrap_or(defaults.skip_blank_manager),
            exclude_managers: self.exclude_managers,
        }
    }
}

fn planned_side<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SideConfig, D::Error> {
    RawSide::deserialize(deserializer).map(|raw| raw.into_side(SideConfig::planned_default()))
}

fn actual_side<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SideConfig, D::Error> {
    RawSide::deserialize(deserializer).map(|raw| raw.into_side(SideConfig::actual_default()))
}

impl SideConfig {
    pub fn planned_default() -> Self {
        Self {
            tab: "Согласованные расходы".into(),
            amount_candidates: vec!["Сумма".into(), "в дс".into(), "sum".into()],
            skip_blank_manager: false,
            exclude_managers: Vec::new(),
        }
    }

    pub fn actual_default() -> Self {
        Self {
            tab: "Фактические расходы".into(),
            amount_candidates: vec!["Сумма".into(), "в долл".into(), "sum".into()],
            skip_blank_manager: true,
            exclude_managers: Vec::new(),
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            skip_blank_manager: self.skip_blank_manager,
            exclude_managers: self.exclude_managers.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Key columns
// ---------------------------------------------------------------------------

/// Header names of the composite key columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyColumns {
    #[serde(default = "default_manager_column")]
    pub manager: String,
    #[serde(default = "default_project_column")]
    pub project: String,
    #[serde(default = "default_category_column")]
    pub category: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            manager: default_manager_column(),
            project: default_project_column(),
            category: default_category_column(),
        }
    }
}

fn default_manager_column() -> String {
    "Менеджер".into()
}

fn default_project_column() -> String {
    "Проект".into()
}

fn default_category_column() -> String {
    "Статья расходов".into()
}

// ---------------------------------------------------------------------------
// Highlight
// ---------------------------------------------------------------------------

/// Variance beyond `threshold` in either direction is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { threshold: default_threshold() }
    }
}

fn default_threshold() -> f64 {
    10.0
}

// ---------------------------------------------------------------------------
// KPI plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct KpiConfig {
    #[serde(default = "default_kpi_tab")]
    pub tab: String,
    #[serde(default = "default_revenue_candidates")]
    pub revenue_candidates: Vec<String>,
    #[serde(default = "default_margin_candidates")]
    pub margin_candidates: Vec<String>,
    #[serde(default = "default_kpi_excluded")]
    pub exclude_managers: Vec<String>,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            tab: default_kpi_tab(),
            revenue_candidates: default_revenue_candidates(),
            margin_candidates: default_margin_candidates(),
            exclude_managers: default_kpi_excluded(),
        }
    }
}

fn default_kpi_tab() -> String {
    "Общие параметры".into()
}

fn default_revenue_candidates() -> Vec<String> {
    vec!["План по выручке".into()]
}

fn default_margin_candidates() -> Vec<String> {
    vec!["План по маржинальной прибыли".into()]
}

fn default_kpi_excluded() -> Vec<String> {
    vec!["Итого".into()]
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// One row of the static credential table. Role is kept as text so that
/// unknown roles surface as access errors at filter time.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub role: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "Plan-Fact".into(),
            source: SourceConfig::default(),
            planned: SideConfig::planned_default(),
            actual: SideConfig::actual_default(),
            columns: KeyColumns::default(),
            highlight: HighlightConfig::default(),
            kpi: None,
            users: BTreeMap::new(),
        }
    }
}

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (label, side) in [("planned", &self.planned), ("actual", &self.actual)] {
            if side.tab.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{label}: tab must not be empty")));
            }
            if side.amount_candidates.iter().all(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{label}: amount_candidates must contain at least one name"
                )));
            }
        }

        for (label, name) in [
            ("manager", &self.columns.manager),
            ("project", &self.columns.project),
            ("category", &self.columns.category),
        ] {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("columns.{label} must not be empty")));
            }
        }

        if !self.highlight.threshold.is_finite() || self.highlight.threshold < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "highlight.threshold must be a non-negative number, got {}",
                self.highlight.threshold
            )));
        }

        if let Some(ref kpi) = self.kpi {
            if kpi.revenue_candidates.is_empty() || kpi.margin_candidates.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "kpi: revenue_candidates and margin_candidates must not be empty".into(),
                ));
            }
        }

        for (login, user) in &self.users {
            let role = Role::parse(&user.role)
                .map_err(|e| ReconError::ConfigValidation(format!("user '{login}': {e}")))?;
            let has_name = user.display_name.as_deref().is_some_and(|n| !n.trim().is_empty());
            if role == Role::Restricted && !has_name {
                return Err(ReconError::ConfigValidation(format!(
                    "user '{login}': restricted users need a display_name"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
