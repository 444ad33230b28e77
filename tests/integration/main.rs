//! Integration tests for inset

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn inset() -> Command {
        cargo_bin_cmd!("inset")
    }

    #[test]
    fn help_displays() {
        inset()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("jittered-TTL cache"));
    }

    #[test]
    fn version_displays() {
        inset()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("inset"));
    }

    #[test]
    fn missing_src_fails() {
        inset()
            .assert()
            .failure()
            .stderr(predicate::str::contains("SRC"));
    }

    #[test]
    fn unwritable_store_dir_reports_unsupported_environment() {
        inset()
            .args(["a.html", "--store-dir", "/dev/null/inset"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not support local storage"));
    }
}
