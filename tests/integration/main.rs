//! Integration tests for relcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "linux": {
    "18.04": {
      "x64": {
        "1.0": { "url": "https://example.test/widget/1.0/linux/x64/pkg.tar.gz" }
      }
    }
  },
  "run_data": { "timestamp": "2024-01-01T00:00:00Z" }
}
"#;

    /// Command isolated from the user's config, with a test catalog
    fn relcache(dir: &Path) -> Command {
        let config = dir.join("config.toml");
        if !config.exists() {
            fs::write(
                &config,
                "[catalog]\nprojects = [\"widget\", \"gadget\"]\n\n[upstream]\nendpoint = \"http://127.0.0.1:9\"\nmirror_endpoint = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n",
            )
            .unwrap();
        }

        let mut cmd = cargo_bin_cmd!("relcache");
        cmd.env_remove("RELCACHE_CACHE_ROOT")
            .arg("--config")
            .arg(&config)
            .arg("--cache-root")
            .arg(dir.join("cache"));
        cmd
    }

    fn seed(dir: &Path, channel: &str, project: &str, body: &str) {
        let channel_dir = dir.join("cache").join(channel);
        fs::create_dir_all(&channel_dir).unwrap();
        fs::write(channel_dir.join(format!("{}-manifest.json", project)), body).unwrap();
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("relcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("release manifest cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("relcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("relcache"));
    }

    #[test]
    fn show_missing_manifest() {
        let temp = TempDir::new().unwrap();
        relcache(temp.path())
            .args(["show", "widget", "stable"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Can not find the manifest file for 'widget' - 'stable'",
            ));
    }

    #[test]
    fn show_cached_manifest() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "widget", MANIFEST);

        relcache(temp.path())
            .args(["show", "widget", "stable"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "https://example.test/widget/1.0/linux/x64/pkg.tar.gz",
            ));
    }

    #[test]
    fn last_modified_prints_timestamp() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "current", "gadget", MANIFEST);

        relcache(temp.path())
            .args(["last-modified", "gadget", "current"])
            .assert()
            .success()
            .stdout("2024-01-01T00:00:00Z\n");
    }

    #[test]
    fn last_modified_without_run_data() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "widget", r#"{"linux": {}}"#);

        relcache(temp.path())
            .args(["last-modified", "widget", "stable"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Malformed manifest"));
    }

    #[test]
    fn unknown_channel_rejected() {
        let temp = TempDir::new().unwrap();
        relcache(temp.path())
            .args(["show", "widget", "beta"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown channel: beta"));
    }

    #[test]
    fn init_creates_channel_dirs() {
        let temp = TempDir::new().unwrap();
        relcache(temp.path()).arg("init").assert().success();

        assert!(temp.path().join("cache/current").is_dir());
        assert!(temp.path().join("cache/stable").is_dir());
    }

    #[test]
    fn status_plain_lists_pairs() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "widget", MANIFEST);

        relcache(temp.path())
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("widget stable cached"))
            .stdout(predicate::str::contains("gadget current missing"));
    }

    #[test]
    fn status_plain_flags_malformed_pairs() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "widget", MANIFEST);
        seed(temp.path(), "current", "widget", "{ truncated");

        relcache(temp.path())
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("widget stable cached"))
            .stdout(predicate::str::contains("widget current malformed"));
    }

    #[test]
    fn status_json_includes_state() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "gadget", r#"{"linux": {}}"#);

        relcache(temp.path())
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""state": "malformed""#))
            .stdout(predicate::str::contains("missing run_data"));
    }

    #[test]
    fn failed_update_keeps_previous_manifest() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), "stable", "widget", MANIFEST);

        relcache(temp.path())
            .args(["update", "-p", "widget", "-c", "stable"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Update failed for 1 of 1 pairs"));

        let cached = fs::read_to_string(temp.path().join("cache/stable/widget-manifest.json")).unwrap();
        assert_eq!(cached, MANIFEST);
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        relcache(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_includes_sections() {
        let temp = TempDir::new().unwrap();
        relcache(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("[upstream]"));
    }
}
