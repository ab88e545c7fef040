//! Integration tests for the autoservice CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an autoservice command isolated from the user's config
fn autoservice(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("autoservice").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("AUTOSERVICE_DB")
        .env_remove("AUTOSERVICE_USER")
        .env_remove("AUTOSERVICE_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a workshop in a temp directory
fn setup_shop() -> TempDir {
    let tmp = TempDir::new().unwrap();
    autoservice(&tmp).arg("init").assert().success();
    tmp
}

/// Run a creating command with `-f id` and return the new id
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = autoservice(tmp)
        .args(args)
        .args(["-f", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = autoservice(tmp)
        .args(args)
        .args(["-f", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A client with one car; returns (client id, car id)
fn client_with_car(tmp: &TempDir) -> (String, String) {
    let client = create(
        tmp,
        &["client", "new", "-n", "Ivan Petrov", "-p", "+7 900 000-00-01"],
    );
    let car = create(
        tmp,
        &[
            "car", "new", "--client", &client, "-b", "Lada", "-m", "Vesta", "--vin",
            "XTA00000000000001",
        ],
    );
    (client, car)
}

fn part_quantity(tmp: &TempDir, id: &str) -> i64 {
    let parts = json(tmp, &["part", "list"]);
    parts
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].to_string() == id)
        .map(|p| p["quantity"].as_i64().unwrap())
        .unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    autoservice(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("client"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    autoservice(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("autoservice"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    autoservice(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autoservice"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_shop() {
    let tmp = setup_shop();
    assert!(tmp.path().join(".autoservice/config.yaml").is_file());
    assert!(tmp.path().join(".autoservice/autoservice.db").is_file());
}

#[test]
fn test_init_twice_reports_existing_shop() {
    let tmp = setup_shop();
    autoservice(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_a_shop_need_a_database() {
    let tmp = TempDir::new().unwrap();
    autoservice(&tmp)
        .args(["client", "list"])
        .assert()
        .failure();
}

#[test]
fn test_explicit_db_path_works_without_init() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("garage.db");
    autoservice(&tmp)
        .args(["--db", db.to_str().unwrap()])
        .args(["client", "new", "-n", "Anna", "-p", "+7 900 555-00-00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created client"));
    assert!(db.is_file());

    autoservice(&tmp)
        .args(["--db", db.to_str().unwrap(), "client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anna"));
}

// ============================================================================
// Client and Car Tests
// ============================================================================

#[test]
fn test_client_crud() {
    let tmp = setup_shop();
    let id = create(
        &tmp,
        &["client", "new", "-n", "Ivan Petrov", "-p", "+7 900 123-45-67", "-e", "ivan@example.com"],
    );

    autoservice(&tmp)
        .args(["client", "list", "--search", "PETROV"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ivan Petrov"));

    autoservice(&tmp)
        .args(["client", "edit", &id, "-p", "+7 900 456-00-00", "--clear-email"])
        .assert()
        .success();
    let client = &json(&tmp, &["client", "show", &id])["client"];
    assert_eq!(client["phone"], "+7 900 456-00-00");
    assert!(client["email"].is_null());

    autoservice(&tmp)
        .args(["client", "delete", &id, "--force"])
        .assert()
        .success();
    let clients = json(&tmp, &["client", "list"]);
    assert!(clients.as_array().unwrap().is_empty());
}

#[test]
fn test_client_requires_name() {
    let tmp = setup_shop();
    autoservice(&tmp)
        .args(["client", "new", "-n", "  ", "-p", "+7 900 123-45-67"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn test_duplicate_email_rejected() {
    let tmp = setup_shop();
    create(&tmp, &["client", "new", "-n", "A", "-p", "+7 900 000-00-11", "-e", "a@example.com"]);
    autoservice(&tmp)
        .args(["client", "new", "-n", "B", "-p", "+7 900 000-00-22", "-e", "a@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_duplicate_vin_rejected() {
    let tmp = setup_shop();
    let (client, _) = client_with_car(&tmp);
    autoservice(&tmp)
        .args([
            "car", "new", "--client", &client, "-b", "Kia", "-m", "Rio", "--vin",
            "XTA00000000000001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_car_list_and_show() {
    let tmp = setup_shop();
    let (client, car) = client_with_car(&tmp);

    autoservice(&tmp)
        .args(["car", "list", "--client", &client])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vesta"));

    let detail = json(&tmp, &["car", "show", &car]);
    assert_eq!(detail["car"]["vin"], "XTA00000000000001");
    assert_eq!(detail["owner"]["full_name"], "Ivan Petrov");
}

// ============================================================================
// Order and Inventory Tests
// ============================================================================

#[test]
fn test_order_takes_parts_from_stock() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    let part = create(&tmp, &["part", "new", "-n", "Oil filter", "--quantity", "10", "-p", "300"]);

    let line = format!("{}:2", part);
    let order = create(
        &tmp,
        &["order", "new", "--car", &car, "-d", "Oil change", "-l", "500", "-p", &line],
    );
    assert_eq!(part_quantity(&tmp, &part), 8);

    let detail = json(&tmp, &["order", "show", &order]);
    assert_eq!(detail["total"].as_f64(), Some(1100.0));
    assert_eq!(detail["lines"][0]["quantity"], 2);
}

#[test]
fn test_order_beyond_stock_is_refused() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    let part = create(&tmp, &["part", "new", "-n", "Bulb", "--quantity", "1", "-p", "50"]);

    let line = format!("{}:3", part);
    autoservice(&tmp)
        .args(["order", "new", "--car", &car, "-d", "Lights", "-p", &line])
        .assert()
        .failure()
        .stderr(predicate::str::contains("in stock"));
    assert_eq!(part_quantity(&tmp, &part), 1);
    let orders = json(&tmp, &["order", "list", "--car", &car]);
    assert!(orders.as_array().unwrap().is_empty());
}

#[test]
fn test_order_edit_and_delete_restore_stock() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    let part = create(&tmp, &["part", "new", "-n", "Oil filter", "--quantity", "10", "-p", "300"]);
    let line = format!("{}:4", part);
    let order = create(&tmp, &["order", "new", "--car", &car, "-d", "Service", "-p", &line]);
    assert_eq!(part_quantity(&tmp, &part), 6);

    let fewer = format!("{}:1", part);
    autoservice(&tmp)
        .args(["order", "edit", &order, "--clear-parts", "-p", &fewer, "--status", "ready"])
        .assert()
        .success();
    assert_eq!(part_quantity(&tmp, &part), 9);

    autoservice(&tmp)
        .args(["order", "delete", &order, "--force"])
        .assert()
        .success();
    assert_eq!(part_quantity(&tmp, &part), 10);
}

#[test]
fn test_part_in_use_cannot_be_deleted() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    let part = create(&tmp, &["part", "new", "-n", "Oil filter", "--quantity", "10", "-p", "300"]);
    let line = format!("{}:1", part);
    create(&tmp, &["order", "new", "--car", &car, "-d", "Oil change", "-p", &line]);

    autoservice(&tmp)
        .args(["part", "delete", &part, "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be deleted"));
}

#[test]
fn test_order_list_filters_by_status() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    create(&tmp, &["order", "new", "--car", &car, "-d", "Diagnostics"]);
    create(
        &tmp,
        &["order", "new", "--car", &car, "-d", "Tyres", "--status", "delivered"],
    );

    let orders = json(&tmp, &["order", "list", "--car", &car, "--status", "delivered"]);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order"]["description"], "Tyres");
}

#[test]
fn test_print_text_work_order() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    let part = create(&tmp, &["part", "new", "-n", "Oil filter", "--quantity", "10", "-p", "300"]);
    let line = format!("{}:2", part);
    create(
        &tmp,
        &["order", "new", "--car", &car, "-d", "Oil change", "-l", "500", "-p", &line],
    );

    let out = tmp.path().join("history.txt");
    autoservice(&tmp)
        .args(["order", "print", &car, "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("VIN XTA00000000000001"));
    assert!(text.contains("Oil filter"));
    assert!(text.contains("1100.00"));
}

#[test]
fn test_print_html_to_stdout() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    autoservice(&tmp)
        .args(["order", "print", &car])
        .assert()
        .success()
        .stdout(predicate::str::contains("<html"))
        .stdout(predicate::str::contains("Ivan Petrov"));
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_revenue_counts_delivered_orders() {
    let tmp = setup_shop();
    let (_, car) = client_with_car(&tmp);
    create(
        &tmp,
        &["order", "new", "--car", &car, "-d", "Tyres", "-l", "700", "--status", "delivered"],
    );
    create(&tmp, &["order", "new", "--car", &car, "-d", "Pending", "-l", "900"]);

    let report = json(
        &tmp,
        &["report", "revenue", "--from", "2000-01-01", "--to", "2999-12-31"],
    );
    assert_eq!(report["total"].as_f64(), Some(700.0));
    assert_eq!(report["orders"].as_array().unwrap().len(), 1);
}

#[test]
fn test_history_needs_client_or_car() {
    let tmp = setup_shop();
    autoservice(&tmp)
        .args(["report", "history"])
        .assert()
        .failure();
}

#[test]
fn test_client_history_report() {
    let tmp = setup_shop();
    let (client, car) = client_with_car(&tmp);
    create(&tmp, &["order", "new", "--car", &car, "-d", "Brake pads", "-l", "800"]);

    autoservice(&tmp)
        .args(["report", "history", "--client", &client])
        .assert()
        .success()
        .stdout(predicate::str::contains("Service History"))
        .stdout(predicate::str::contains("Brake pads"));
}

#[test]
fn test_dashboard_shows_low_stock() {
    let tmp = setup_shop();
    create(&tmp, &["part", "new", "-n", "Wiper blade", "--quantity", "1", "-p", "400"]);
    autoservice(&tmp)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wiper blade"));
}

// ============================================================================
// Database Tests
// ============================================================================

#[test]
fn test_export_then_import_restores_data() {
    let tmp = setup_shop();
    create(&tmp, &["client", "new", "-n", "Backup Client", "-p", "+7 900 000-00-11"]);
    let backup = tmp.path().join("backup.db");

    autoservice(&tmp)
        .args(["db", "export", backup.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sha256"));
    assert!(backup.is_file());
    assert!(!tmp.path().join("backup.db.partial").exists());

    create(&tmp, &["client", "new", "-n", "Later Client", "-p", "+7 900 000-00-22"]);

    autoservice(&tmp)
        .args(["db", "import", backup.to_str().unwrap(), "--force"])
        .assert()
        .success();

    let clients = json(&tmp, &["client", "list"]);
    let names: Vec<&str> = clients
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Backup Client"]);
}

#[test]
fn test_import_of_garbage_keeps_current_data() {
    let tmp = setup_shop();
    create(&tmp, &["client", "new", "-n", "Kept", "-p", "+7 900 000-00-11"]);
    let junk = tmp.path().join("junk.db");
    fs::write(&junk, "definitely not sqlite").unwrap();

    autoservice(&tmp)
        .args(["db", "import", junk.to_str().unwrap(), "--force"])
        .assert()
        .failure();

    autoservice(&tmp)
        .args(["client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept"));
}

#[test]
fn test_db_status_counts_rows() {
    let tmp = setup_shop();
    create(&tmp, &["client", "new", "-n", "A", "-p", "+7 900 000-00-11"]);
    let status = json(&tmp, &["db", "status"]);
    assert_eq!(status["exists"], true);
    let clients = status["tables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["table"] == "clients")
        .unwrap();
    assert_eq!(clients["rows"], 1);
}

#[test]
fn test_db_query() {
    let tmp = setup_shop();
    create(&tmp, &["client", "new", "-n", "Query Me", "-p", "+7 900 000-00-11"]);
    autoservice(&tmp)
        .args(["db", "query", "SELECT full_name FROM clients", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("full_name"))
        .stdout(predicate::str::contains("Query Me"));
}

// ============================================================================
// Part Import Tests
// ============================================================================

#[test]
fn test_part_csv_import() {
    let tmp = setup_shop();
    let csv = tmp.path().join("parts.csv");
    fs::write(
        &csv,
        "name,article,quantity,price\nOil filter,OF-1,10,\"300,50\"\nSpark plug,SP-4,8,120\n",
    )
    .unwrap();

    autoservice(&tmp)
        .args(["part", "import", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parts created:  2"));

    let parts = json(&tmp, &["part", "list", "--search", "of-1"]);
    let parts = parts.as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["price"].as_f64(), Some(300.5));
}

#[test]
fn test_part_csv_dry_run_saves_nothing() {
    let tmp = setup_shop();
    let csv = tmp.path().join("parts.csv");
    fs::write(&csv, "name,quantity,price\nBulb,3,50\n").unwrap();

    autoservice(&tmp)
        .args(["part", "import", csv.to_str().unwrap(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    let parts = json(&tmp, &["part", "list"]);
    assert!(parts.as_array().unwrap().is_empty());
}
