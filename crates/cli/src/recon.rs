//! `planfact run | kpi | validate`: config-driven plan-vs-actual reports.

use std::path::{Path, PathBuf};

use serde::Serialize;

use planfact_recon::access::{filter_for, filter_projects, IdentityResolver, StaticCredentials};
use planfact_recon::engine::{load_input, run};
use planfact_recon::kpi::summarize_plans;
use planfact_recon::model::{ReconMeta, Totals};
use planfact_recon::source::{CsvDirectoryProvider, DataProvider};
use planfact_recon::summary::{compute_totals, format_amount, VarianceStatus};
use planfact_recon::{AccessError, FilterOutcome, ReconConfig, ReconError, ReconciledRecord, Role};

use crate::exit_codes::{recon_exit_code, EXIT_ACCESS_DENIED, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_NO_DATA};
use crate::util::render_table;
use crate::CliError;

const MAX_TEXT_WIDTH: usize = 28;

fn recon_err(err: ReconError) -> CliError {
    let hint = match &err {
        ReconError::ColumnNotFound { .. } => Some("check amount_candidates / [columns] in the config".to_string()),
        ReconError::DataSource { .. } => Some("check [source].sheet and the tab names".to_string()),
        _ => None,
    };
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
}

fn access_err(err: AccessError) -> CliError {
    CliError { code: EXIT_ACCESS_DENIED, message: err.to_string(), hint: None }
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&text).map_err(recon_err)
}

/// Tab files resolve relative to the config file's directory.
fn provider_for(config_path: &Path) -> CsvDirectoryProvider {
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    CsvDirectoryProvider::new(base)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(flatten)]
    record: &'a ReconciledRecord,
    status: VarianceStatus,
}

#[derive(Serialize)]
struct RunReport<'a> {
    meta: &'a ReconMeta,
    user: &'a str,
    role: Role,
    totals: Totals,
    rows: Vec<ReportRow<'a>>,
}

pub struct RunArgs {
    pub config: PathBuf,
    pub user: String,
    pub managers: Vec<String>,
    pub projects: Vec<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;

    // Resolve the caller before touching the data source.
    let caller = StaticCredentials::new(config.users.clone())
        .resolve(&args.user)
        .map_err(access_err)?;
    tracing::info!(user = %caller.identity, role = %caller.role, "resolved caller");

    let provider = provider_for(&args.config);
    let input = load_input(&provider, &config).map_err(recon_err)?;
    let result = run(&config, &input).map_err(recon_err)?;

    if caller.role == Role::Restricted && !args.managers.is_empty() {
        tracing::warn!("--manager is ignored for restricted users");
    }
    let selection = (!args.managers.is_empty()).then_some(args.managers.as_slice());

    let visible = match filter_for(&result.records, &caller, selection).map_err(access_err)? {
        FilterOutcome::Visible(records) => records,
        FilterOutcome::NoData { manager } => {
            // Informational: main prints nothing for an empty message.
            eprintln!("no data for {manager} yet");
            return Err(CliError { code: EXIT_NO_DATA, message: String::new(), hint: None });
        }
    };

    let project_selection = (!args.projects.is_empty()).then_some(args.projects.as_slice());
    let shown = filter_projects(&visible, project_selection);
    let totals = compute_totals(&shown);

    let report = RunReport {
        meta: &result.meta,
        user: &caller.identity,
        role: caller.role,
        totals,
        rows: shown
            .iter()
            .map(|record| ReportRow { record, status: record.status(&config.highlight) })
            .collect(),
    };

    let json_str = serde_json::to_string_pretty(&report).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("cannot write output: {e}"),
            hint: None,
        })?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    } else {
        print!("{}", render_rows(&report.rows));
    }

    eprintln!(
        "{}: plan {}, actual {}, savings {} ({} rows)",
        result.meta.report_name,
        format_amount(totals.planned),
        format_amount(totals.actual),
        format_amount(totals.savings),
        shown.len(),
    );

    Ok(())
}

fn render_rows(rows: &[ReportRow<'_>]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let r = row.record;
            vec![
                r.manager.clone(),
                r.project.clone(),
                r.category.clone(),
                format_amount(r.planned),
                format_amount(r.actual),
                format_amount(r.variance),
                match row.status {
                    VarianceStatus::Neutral => String::new(),
                    other => other.to_string(),
                },
            ]
        })
        .collect();

    render_table(
        &["manager", "project", "category", "planned", "actual", "variance", "status"],
        &body,
        &[3, 4, 5],
        MAX_TEXT_WIDTH,
    )
}

// ---------------------------------------------------------------------------
// kpi
// ---------------------------------------------------------------------------

pub fn cmd_kpi(config_path: PathBuf, json: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let kpi = config.kpi.clone().unwrap_or_default();

    let provider = provider_for(&config_path);
    let table = provider.fetch_table(&config.source.sheet, &kpi.tab).map_err(recon_err)?;
    let summary = summarize_plans(&table, &config.columns, &kpi).map_err(recon_err)?;

    if json {
        let json_str = serde_json::to_string_pretty(&summary).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    } else {
        let body: Vec<Vec<String>> = summary
            .managers
            .iter()
            .map(|m| vec![m.manager.clone(), format_amount(m.revenue_plan), format_amount(m.margin_plan)])
            .collect();
        print!("{}", render_table(&["manager", "revenue plan", "margin plan"], &body, &[1, 2], MAX_TEXT_WIDTH));
    }

    eprintln!(
        "revenue plan {}, margin plan {} ({} managers)",
        format_amount(summary.total_revenue_plan),
        format_amount(summary.total_margin_plan),
        summary.managers.len(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: \"{}\" (planned tab \"{}\", actual tab \"{}\", {} user(s))",
        config.name,
        config.planned.tab,
        config.actual.tab,
        config.users.len(),
    );
    Ok(())
}
