use std::fs;
use std::path::Path;

use insta_cmd::assert_cmd_snapshot;
use sqlrun::backend::SqliteConnection;
use tempfile::TempDir;

mod common;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

fn count(db: &Path, table: &str) -> i64 {
    SqliteConnection::open(db)
        .unwrap()
        .inner()
        .query_row(&format!("select count(*) from {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
}

#[test]
fn test_cli_help() {
    let output = common::run_cli().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--database"));
    assert!(stdout.contains("--path"));
    assert!(stdout.contains("--file"));
}

#[test]
fn test_cli_version() {
    let mut cmd = common::run_cli();
    assert_cmd_snapshot!(cmd.arg("--version"), @r"
success: true
exit_code: 0
----- stdout -----
sqlrun 0.1.0

----- stderr -----
");
}

#[test]
fn test_cli_empty_directory() {
    let scripts = TempDir::new().unwrap();
    let mut cmd = common::run_cli();
    assert_cmd_snapshot!(cmd.args(["-d", "sqlite::memory:", "-p"]).arg(scripts.path()), @r"
success: true
exit_code: 0
----- stdout -----

----- stderr -----
");
}

#[test]
fn test_cli_runs_directory_in_order() {
    let scripts = TempDir::new().unwrap();
    write(scripts.path(), "002_seed.sql", "INSERT INTO t VALUES (1);");
    write(scripts.path(), "001_init.sql", "CREATE TABLE t(x int);");
    write(scripts.path(), "README.md", "# migrations");
    let db = TempDir::new().unwrap();
    let db = db.path().join("app.db");

    let output = common::run_cli()
        .arg("--database")
        .arg(sqlite_url(&db))
        .arg("--path")
        .arg(scripts.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].starts_with("001_init.sql("));
    assert!(lines[1].starts_with("002_seed.sql("));
    assert_eq!(count(&db, "t"), 1);
}

#[test]
fn test_cli_reports_failing_file() {
    let scripts = TempDir::new().unwrap();
    write(scripts.path(), "a.sql", "create table t(x int);");
    write(scripts.path(), "bad.sql", "SELEC 1;");
    write(scripts.path(), "c.sql", "insert into t values (1);");
    let db = TempDir::new().unwrap();
    let db = db.path().join("app.db");

    let output = common::run_cli()
        .arg("-d")
        .arg(sqlite_url(&db))
        .arg("-p")
        .arg(scripts.path())
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.starts_with("a.sql("));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.sql"), "{stderr}");
    assert_eq!(count(&db, "t"), 0);
}

#[test]
fn test_cli_single_file_extension() {
    let scripts = TempDir::new().unwrap();
    write(scripts.path(), "init.txt", "create table t(x int);");
    let file = scripts.path().join("init.txt");

    let output = common::run_cli()
        .args(["-d", "sqlite::memory:", "-f"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let output = common::run_cli()
        .args(["-d", "sqlite::memory:", "--allow-any-extension", "-f"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("init.txt("));
}

#[test]
fn test_cli_database_from_env() {
    let scripts = TempDir::new().unwrap();
    write(scripts.path(), "init.sql", "select 1;");

    let output = common::run_cli()
        .env("DATABASE_URL", "sqlite::memory:")
        .arg("--file")
        .arg(scripts.path().join("init.sql"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
}

#[test]
fn test_cli_requires_database() {
    let output = common::run_cli().args(["--path", "."]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--database"), "{stderr}");
}

#[test]
fn test_cli_rejects_unknown_database_url() {
    let scripts = TempDir::new().unwrap();
    let output = common::run_cli()
        .args(["-d", "mysql://localhost/db", "-p"])
        .arg(scripts.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported database url"), "{stderr}");
}
