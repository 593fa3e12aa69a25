//! Integration tests for geomatrix

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Config whose store lives in `dir` and whose service is unreachable
    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            "[service]\nbase_url = \"http://127.0.0.1:9\"\nrequest_timeout_secs = 2\n\n\
             [quota]\ncall_delay_ms = 0\n\n[store]\ndirectory = {:?}\n",
            dir.join("store")
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn geomatrix(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("geomatrix");
        cmd.env("GEOMATRIX_CONFIG", config)
            .env_remove("ONEMAP_EMAIL")
            .env_remove("ONEMAP_PASSWORD")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("geomatrix")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cached travel matrices"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("geomatrix")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("geomatrix"));
    }

    #[test]
    fn config_path_follows_env() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[quota]"))
            .stdout(predicate::str::contains("max_calls = 150"));
    }

    #[test]
    fn config_init_creates_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("nested").join("config.toml");

        geomatrix(&config)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(config.exists());

        geomatrix(&config)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "[quota]\nmax_calls = \"many\"\n").unwrap();

        geomatrix(&config)
            .args(["cache", "info"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn cache_info_on_empty_store() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no snapshot"))
            .stdout(predicate::str::contains("Entries: 0"));
    }

    #[test]
    fn cache_clear_with_yes() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        let store = temp.path().join("store");
        std::fs::create_dir_all(&store).unwrap();
        std::fs::write(store.join("geocode.json"), "{}").unwrap();

        geomatrix(&config)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Caches cleared"));
        assert!(!store.join("geocode.json").exists());
    }

    #[test]
    fn token_without_stored_token() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .arg("token")
            .assert()
            .success()
            .stdout(predicate::str::contains("No stored token"));
    }

    #[test]
    fn token_refresh_without_credentials_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["token", "--refresh"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("ONEMAP_EMAIL"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn matrix_with_unreachable_service_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["matrix", "338729", "018956"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("could be resolved"));
    }

    #[test]
    fn resolve_reports_unreachable_service_per_id() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        geomatrix(&config)
            .args(["resolve", "--format", "json", "338729"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"error\""));
    }
}
