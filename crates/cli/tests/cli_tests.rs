// End-to-end tests for the planfact binary.
// Run with: cargo test -p planfact-cli --test cli_tests
//
// Each test writes a config plus CSV tabs into a temp dir and runs the binary
// against it, checking exit codes and output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const CONFIG: &str = r#"
name = "Расходы"

[source]
sheet = "sheet"

[planned]
tab = "plan"
amount_candidates = ["Сумма", "в дс"]

[actual]
tab = "fact"
amount_candidates = ["Сумма", "в долл"]
skip_blank_manager = true

[kpi]
tab = "kpi"

[users.director]
role = "admin"
display_name = "Отабек"

[users.lana]
role = "restricted"
display_name = "Лана"

[users.kim]
role = "restricted"
display_name = "Ким"
"#;

const PLAN_CSV: &str = "\
Менеджер,Проект,Статья расходов,\"Сумма, в дс\"
Лана,Альфа,Аренда,1 000
Лана,Бета,Реклама,\"500,5\"
Султан,Альфа,Аренда,2 000
";

const FACT_CSV: &str = "\
Менеджер,Проект,Статья расходов,Сумма в долл
Лана,Альфа,Аренда,750
Султан,Альфа,Аренда,2 100
,Альфа,Аренда,999
";

const KPI_CSV: &str = "\
Менеджер,План по выручке,План по маржинальной прибыли
Лана,1 000 000,200 000
Султан,2 000 000,400 000
Итого,3 000 000,600 000
";

fn planfact() -> Command {
    Command::new(env!("CARGO_BIN_EXE_planfact"))
}

fn workspace(config: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("sheet");
    std::fs::create_dir(&sheet).unwrap();
    std::fs::write(sheet.join("plan.csv"), PLAN_CSV).unwrap();
    std::fs::write(sheet.join("fact.csv"), FACT_CSV).unwrap();
    std::fs::write(sheet.join("kpi.csv"), KPI_CSV).unwrap();
    let config_path = dir.path().join("report.toml");
    std::fs::write(&config_path, config).unwrap();
    (dir, config_path)
}

fn run(config_path: &Path, args: &[&str]) -> Output {
    planfact().arg("run").arg(config_path).args(args).output().unwrap()
}

fn json_rows(output: &Output) -> Vec<serde_json::Value> {
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    report["rows"].as_array().unwrap().clone()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// -------------------------------------------------------------------------
// run
// -------------------------------------------------------------------------

#[test]
fn admin_sees_all_rows_as_table() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "director"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Лана"));
    assert!(stdout.contains("Султан"));
    assert!(stdout.contains("overspend"));
    assert!(stderr(&output).contains("plan 3 501, actual 2 850, savings 651 (3 rows)"));
}

#[test]
fn admin_json_report() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "director", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["role"], "admin");
    assert_eq!(report["meta"]["planned_column"], "Сумма, в дс");

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["manager"], "Лана");
    assert_eq!(rows[0]["variance"], 250.0);
    assert_eq!(rows[0]["status"], "savings");
    assert_eq!(rows[2]["manager"], "Султан");
    assert_eq!(rows[2]["status"], "overspend");
}

#[test]
fn restricted_user_ignores_manager_selection() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "lana", "--manager", "Султан", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let rows = json_rows(&output);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["manager"] == "Лана"));
}

#[test]
fn project_filter_applies_after_access() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "director", "--project", "Бета", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let rows = json_rows(&output);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["actual"], 0.0);
}

#[test]
fn output_file_written() {
    let (dir, config) = workspace(CONFIG);
    let out_path = dir.path().join("out.json");
    let output = run(&config, &["--user", "director", "--output", out_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["totals"]["planned"], 3500.5);
}

#[test]
fn restricted_user_without_rows_exits_no_data() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "kim"]);
    assert_eq!(output.status.code(), Some(7));
    let err = stderr(&output);
    assert!(err.contains("no data for Ким"));
    assert!(!err.contains("error:"));
}

#[test]
fn unknown_user_exits_access_denied() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "mallory"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("unknown identity: 'mallory'"));
}

#[test]
fn unknown_manager_selection_exits_access_denied() {
    let (_dir, config) = workspace(CONFIG);
    let output = run(&config, &["--user", "director", "--manager", "Ким"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn unmatched_amount_column_exits_column_not_found() {
    let (_dir, config) = workspace(&CONFIG.replace(r#"["Сумма", "в долл"]"#, r#"["итог"]"#));
    let output = run(&config, &["--user", "director"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("actual table: no column matches итог"));
}

#[test]
fn missing_tab_exits_data_source() {
    let (_dir, config) = workspace(&CONFIG.replace(r#"tab = "fact""#, r#"tab = "archive""#));
    let output = run(&config, &["--user", "director"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("archive"));
}

// -------------------------------------------------------------------------
// kpi + validate
// -------------------------------------------------------------------------

#[test]
fn kpi_json_excludes_total_row() {
    let (_dir, config) = workspace(CONFIG);
    let output = planfact().arg("kpi").arg(&config).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["managers"].as_array().unwrap().len(), 2);
    assert_eq!(summary["total_revenue_plan"], 3_000_000.0);
    assert_eq!(summary["total_margin_plan"], 600_000.0);
}

#[test]
fn validate_accepts_good_config() {
    let (_dir, config) = workspace(CONFIG);
    let output = planfact().arg("validate").arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("3 user(s)"));
}

#[test]
fn validate_rejects_unknown_role() {
    let (_dir, config) = workspace(&CONFIG.replace(r#"role = "admin""#, r#"role = "superadmin""#));
    let output = planfact().arg("validate").arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("superadmin"));
}

#[test]
fn no_command_is_usage_error() {
    let output = planfact().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
