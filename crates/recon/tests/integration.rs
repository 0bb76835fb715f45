use std::path::PathBuf;

use planfact_recon::access::{filter_for, filter_projects, IdentityResolver, StaticCredentials};
use planfact_recon::engine::{load_input, run};
use planfact_recon::kpi::summarize_plans;
use planfact_recon::source::{CsvDirectoryProvider, DataProvider};
use planfact_recon::summary::{compute_totals, VarianceStatus};
use planfact_recon::{AccessError, FilterOutcome, ReconConfig, ReconError, ReconResult};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("planfact.recon.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

fn load_and_run(config: &ReconConfig) -> ReconResult {
    let provider = CsvDirectoryProvider::new(fixtures_dir());
    let input = load_input(&provider, config).unwrap();
    run(config, &input).unwrap()
}

// -------------------------------------------------------------------------
// Reconciliation
// -------------------------------------------------------------------------

#[test]
fn fixture_reconciles_every_key_once() {
    let config = load_config();
    let result = load_and_run(&config);

    assert_eq!(result.meta.report_name, "Расходы: план-факт");
    assert_eq!(result.meta.planned_column, "Сумма, в дс");
    assert_eq!(result.meta.actual_column, "Сумма в долл");

    let rows: Vec<(&str, &str, &str, f64, f64, f64)> = result
        .records
        .iter()
        .map(|r| (r.manager.as_str(), r.project.as_str(), r.category.as_str(), r.planned, r.actual, r.variance))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("Лана", "Альфа", "Аренда", 1500.5, 1200.0, 300.5),
            ("Лана", "Бета", "Реклама", 2000.0, 1950.0, 50.0),
            ("Султан", "Альфа", "Аренда", 3000.0, 3000.0, 0.0),
            ("Султан", "Гамма", "Транспорт", 0.0, 0.0, 0.0),
            ("Султан", "Дельта", "Связь", 0.0, 150.25, -150.25),
        ]
    );
}

#[test]
fn fixture_summary() {
    let config = load_config();
    let s = load_and_run(&config).summary;

    assert_eq!(s.total_keys, 5);
    assert_eq!(s.matched, 3);
    assert_eq!(s.planned_only, 1);
    assert_eq!(s.actual_only, 1);
    assert_eq!(s.overspend, 1);
    assert_eq!(s.savings, 2);
    assert_eq!(s.totals.planned, 6500.5);
    assert_eq!(s.totals.actual, 6300.25);
    assert_eq!(s.totals.savings, 200.25);
}

#[test]
fn blank_manager_rows_count_when_filter_disabled() {
    let mut config = load_config();
    config.actual.skip_blank_manager = false;
    let result = load_and_run(&config);

    let blank = result.records.iter().find(|r| r.manager.is_empty()).unwrap();
    assert_eq!(blank.actual, 999.0);
    assert_eq!(blank.variance, -999.0);
    assert_eq!(result.summary.total_keys, 6);
}

#[test]
fn unmatched_amount_candidates_fail_the_view() {
    let mut config = load_config();
    config.actual.amount_candidates = vec!["итог".into()];

    let provider = CsvDirectoryProvider::new(fixtures_dir());
    let input = load_input(&provider, &config).unwrap();
    let err = run(&config, &input).unwrap_err();
    assert!(matches!(err, ReconError::ColumnNotFound { .. }), "got {err}");
}

#[test]
fn missing_tab_surfaces_data_source_error() {
    let mut config = load_config();
    config.planned.tab = "Удалённая вкладка".into();

    let provider = CsvDirectoryProvider::new(fixtures_dir());
    let err = load_input(&provider, &config).unwrap_err();
    assert!(matches!(err, ReconError::DataSource { ref tab, .. } if tab == "Удалённая вкладка"));
}

// -------------------------------------------------------------------------
// Access
// -------------------------------------------------------------------------

#[test]
fn restricted_user_sees_own_rows_only() {
    let config = load_config();
    let result = load_and_run(&config);
    let creds = StaticCredentials::new(config.users.clone());

    let lana = creds.resolve("lana").unwrap();
    let selection = vec!["Султан".to_string()];
    let visible = filter_for(&result.records, &lana, Some(&selection)).unwrap();
    assert_eq!(visible.records().len(), 2);
    assert!(visible.records().iter().all(|r| r.manager == "Лана"));

    let totals = compute_totals(visible.records());
    assert_eq!(totals.planned, 3500.5);
    assert_eq!(totals.actual, 3150.0);
    assert_eq!(totals.savings, 350.5);
}

#[test]
fn manager_alias_resolves_to_restricted() {
    let config = load_config();
    let result = load_and_run(&config);
    let creds = StaticCredentials::new(config.users.clone());

    let sultan = creds.resolve("sultan").unwrap();
    let visible = filter_for(&result.records, &sultan, None).unwrap();
    assert_eq!(visible.records().len(), 3);
}

#[test]
fn restricted_user_without_rows_gets_no_data() {
    let config = load_config();
    let result = load_and_run(&config);
    let creds = StaticCredentials::new(config.users.clone());

    let kim = creds.resolve("kim").unwrap();
    let outcome = filter_for(&result.records, &kim, None).unwrap();
    assert_eq!(outcome, FilterOutcome::NoData { manager: "Ким".into() });
}

#[test]
fn admin_narrows_by_manager_then_project() {
    let config = load_config();
    let result = load_and_run(&config);
    let creds = StaticCredentials::new(config.users.clone());

    let director = creds.resolve("director").unwrap();
    let managers = vec!["Султан".to_string()];
    let visible = filter_for(&result.records, &director, Some(&managers)).unwrap();
    assert_eq!(visible.records().len(), 3);

    let projects = vec!["Дельта".to_string()];
    let shown = filter_projects(visible.records(), Some(&projects));
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].status(&config.highlight), VarianceStatus::Overspend);
}

#[test]
fn unknown_login_is_access_error() {
    let config = load_config();
    let creds = StaticCredentials::new(config.users.clone());
    assert_eq!(creds.resolve("mallory").unwrap_err(), AccessError::UnknownIdentity("mallory".into()));
}

// -------------------------------------------------------------------------
// KPI plans
// -------------------------------------------------------------------------

#[test]
fn kpi_plans_exclude_total_row() {
    let config = load_config();
    let kpi = config.kpi.clone().unwrap();
    let provider = CsvDirectoryProvider::new(fixtures_dir());
    let table = provider.fetch_table(&config.source.sheet, &kpi.tab).unwrap();

    let summary = summarize_plans(&table, &config.columns, &kpi).unwrap();
    let names: Vec<&str> = summary.managers.iter().map(|m| m.manager.as_str()).collect();
    assert_eq!(names, vec!["Лана", "Султан"]);
    assert_eq!(summary.total_revenue_plan, 3_500_000.0);
    assert_eq!(summary.total_margin_plan, 750_000.0);
}
