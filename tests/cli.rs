use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary workspace plus an isolated settings directory
struct TestFixture {
    _temp_dir: TempDir,
    workspace: PathBuf,
    config_dir: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = temp_dir.path().join("demo");
        let config_dir = temp_dir.path().join("config");
        fs::create_dir_all(&workspace).expect("Failed to create workspace");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        let fixture = Self {
            _temp_dir: temp_dir,
            workspace,
            config_dir,
        };
        fixture.write("README.md", "# demo");
        fixture.write("src/main.py", "print('hello')");
        fixture.write("src/__pycache__/main.cpython-311.pyc", "bytecode");
        fixture.write(".venv/lib/site.py", "venv");
        fixture.write("lib/native.dll", "MZ");
        fixture
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.workspace.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn backup_dir(&self) -> PathBuf {
        self.workspace.join("backup")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("wsbackup").expect("Failed to find wsbackup binary");
        cmd.env("WSBACKUP_CONFIG_DIR", &self.config_dir)
            .env_remove("WSBACKUP_WORKSPACE")
            .env_remove("RUST_LOG")
            .arg("--workspace")
            .arg(&self.workspace);
        cmd
    }

    fn archives(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.backup_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".zip") || n.ends_with(".rar"))
            .collect();
        names.sort();
        names
    }

    fn seed_archive(&self, name: &str, age_secs: i64) {
        let path = self.backup_dir().join(name);
        fs::create_dir_all(self.backup_dir()).unwrap();
        fs::write(&path, "old").unwrap();
        let now = filetime::FileTime::now().unix_seconds();
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(now - age_secs, 0))
            .unwrap();
    }
}

fn zip_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn test_run_fallback_creates_zip() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["run", "--fallback-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let archives = fixture.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("demo_backup_"));
    assert!(archives[0].ends_with(".zip"));

    let entries = zip_entries(&fixture.backup_dir().join(&archives[0]));
    assert_eq!(entries, vec!["README.md", "src/main.py"]);
}

#[test]
fn test_run_writes_log_file() {
    let fixture = TestFixture::new();

    fixture.command().args(["run", "--fallback-only"]).assert().success();

    let log = fs::read_to_string(fixture.workspace.join("logs").join("system.log")).unwrap();
    assert!(log.contains("Backup started"));
    assert!(log.contains("Elapsed time"));
}

#[test]
fn test_unwritable_log_file_falls_back_to_stdout() {
    let fixture = TestFixture::new();
    // A plain file where the log directory should be
    fixture.write("logs", "not a directory");

    fixture
        .command()
        .args(["run", "--fallback-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File logging disabled"))
        .stdout(predicate::str::contains("Backup started"));

    assert_eq!(fixture.archives().len(), 1);
    assert!(fixture.workspace.join("logs").is_file());
}

#[test]
fn test_parent_segment_workspace_rejected() {
    let fixture = TestFixture::new();
    let sneaky = fixture.workspace.join("src").join("..");

    let mut cmd = Command::cargo_bin("wsbackup").unwrap();
    cmd.env("WSBACKUP_CONFIG_DIR", &fixture.config_dir)
        .arg("--workspace")
        .arg(&sneaky)
        .arg("run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid workspace"));

    assert!(!fixture.backup_dir().exists());
}

#[test]
fn test_missing_workspace_rejected() {
    let fixture = TestFixture::new();

    let mut cmd = Command::cargo_bin("wsbackup").unwrap();
    cmd.env("WSBACKUP_CONFIG_DIR", &fixture.config_dir)
        .arg("--workspace")
        .arg(fixture.workspace.join("does-not-exist"))
        .assert()
        .code(1);
}

#[test]
fn test_list_shows_archives() {
    let fixture = TestFixture::new();
    fixture.seed_archive("demo_backup_20250101_000000.rar", 3600);

    fixture
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo_backup_20250101_000000.rar"))
        .stdout(predicate::str::contains("Total: 1 backup(s)"));
}

#[test]
fn test_list_empty() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn test_prune_requires_force() {
    let fixture = TestFixture::new();
    fixture.seed_archive("demo_backup_20250101_000000.zip", 300);
    fixture.seed_archive("demo_backup_20250102_000000.zip", 200);
    fixture.seed_archive("demo_backup_20250103_000000.zip", 100);

    fixture
        .command()
        .args(["prune", "--keep", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(fixture.archives().len(), 3);

    fixture
        .command()
        .args(["prune", "--keep", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 backup(s)."));
    assert_eq!(fixture.archives(), vec!["demo_backup_20250103_000000.zip"]);
}

#[test]
fn test_init_writes_settings() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings written"));

    let contents = fs::read_to_string(fixture.config_dir.join("settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["keep_count"], 250);
}

#[test]
fn test_settings_file_is_honored() {
    let fixture = TestFixture::new();
    let settings = fixture.config_dir.join("custom.json");
    fs::write(&settings, r#"{ "project_name": "custom", "log_to_file": false }"#).unwrap();

    fixture
        .command()
        .arg("--config")
        .arg(&settings)
        .args(["run", "--fallback-only"])
        .assert()
        .success();

    let archives = fixture.archives();
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("custom_backup_"));
    assert!(!fixture.workspace.join("logs").exists());
}

#[test]
fn test_config_shows_paths() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup directory"))
        .stdout(predicate::str::contains("Keep count:          250"));
}
