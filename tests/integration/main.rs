//! Integration tests for goalpost

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Isolated workspace: config, cache and a boundary package.json
    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("package.json"), r#"{"name": "fixture"}"#).unwrap();
            Self { dir }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, rel: &str, content: &str) -> String {
            let path = self.dir.path().join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("goalpost");
            cmd.env_remove("GOALPOST_CONFIG")
                .env_remove("GOALPOST_CACHE_DIR")
                .arg("--config")
                .arg(self.path().join("config.toml"))
                .arg("--cache-dir")
                .arg(self.path().join("cache"));
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("goalpost")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("resolve"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("goalpost")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("goalpost"));
    }

    #[test]
    fn resolves_export_as_module() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "function foo(){} foo(); export {};");

        ws.cmd()
            .args(["resolve", "--format", "plain", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\tmodule"));
    }

    #[test]
    fn resolves_plain_source_as_script() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "function foo(){} foo();");

        ws.cmd()
            .args(["resolve", "--format", "json", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"goal\": \"script\""))
            .stdout(predicate::str::contains("\"cache\": \"miss\""));
    }

    #[test]
    fn second_run_hits_cache() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "import x from 'y'; x();");

        ws.cmd().args(["resolve", &file]).assert().success();
        ws.cmd()
            .args(["resolve", "--format", "json", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"cache\": \"hit\""));

        ws.cmd()
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\tmodule"));
    }

    #[test]
    fn no_cache_flag_skips_cache() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "foo();");

        ws.cmd()
            .args(["resolve", "--no-cache", "--format", "json", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"cache\": \"disabled\""));
        assert!(!ws.path().join("cache").exists());
    }

    #[test]
    fn declared_goal_has_no_fallback() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "with (obj) { x = 1; }");

        ws.cmd()
            .args(["resolve", "--goal", "module", &file])
            .assert()
            .failure()
            .stderr(predicate::str::contains("module (declared)"))
            .stderr(predicate::str::contains("1 of 1 file(s) failed"));
    }

    #[test]
    fn manifest_type_module_is_declared() {
        let ws = Workspace::new();
        ws.write("pkg/package.json", r#"{"type": "module"}"#);
        let file = ws.write("pkg/index.js", "function foo(){} foo();");

        ws.cmd()
            .args(["resolve", "--format", "json", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"source\": \"declared\""))
            .stdout(predicate::str::contains("\"goal\": \"module\""));
    }

    #[test]
    fn order_flag_changes_primary() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "foo();");

        ws.cmd()
            .args(["resolve", "--no-cache", "--order", "module", "--format", "plain", &file])
            .assert()
            .success()
            .stdout(predicate::str::contains("\tmodule"));
    }

    #[test]
    fn unparseable_source_fails_with_position() {
        let ws = Workspace::new();
        let file = ws.write("bad.js", "foo(");

        ws.cmd()
            .args(["resolve", &file])
            .assert()
            .failure()
            .stderr(predicate::str::contains(":1:4:"))
            .stderr(predicate::str::contains("unclosed '('"));
    }

    #[test]
    fn missing_file_fails() {
        let ws = Workspace::new();
        let missing = ws.path().join("nope.js");

        ws.cmd()
            .args(["resolve", missing.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn cache_clear_empties_cache() {
        let ws = Workspace::new();
        let file = ws.write("a.js", "foo();");
        ws.cmd().args(["resolve", &file]).assert().success();

        ws.cmd()
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 1 record(s)"));

        ws.cmd()
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached goals"));
    }

    #[test]
    fn cache_path_uses_override() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache"));
    }

    #[test]
    fn config_show() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[resolver]"));
    }

    #[test]
    fn config_init_writes_file() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(ws.path().join("config.toml").exists());
    }

    #[test]
    fn invalid_config_reports_hint() {
        let ws = Workspace::new();
        std::fs::write(
            ws.path().join("config.toml"),
            "[resolver]\norder = [\"script\", \"script\"]\n",
        )
        .unwrap();

        ws.cmd()
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }
}
