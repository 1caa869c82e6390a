//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create an alertcfg command isolated to the test directory.
    ///
    /// Returns a Command configured with:
    /// - Current directory set to the test directory
    /// - Key and settings overrides from the parent environment removed
    /// - Colors disabled
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("alertcfg").expect("failed to find alertcfg binary");
        cmd.env_remove("ALERTCFG_SECRET_KEY");
        cmd.env_remove("ALERTCFG_SETTINGS");
        cmd.env_remove("ALERTCFG_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `alertcfg keygen`.
    pub fn keygen(&self) -> Output {
        self.cmd()
            .arg("keygen")
            .output()
            .expect("failed to run alertcfg keygen")
    }

    /// Shortcut for `alertcfg get`.
    pub fn get(&self) -> Output {
        self.cmd()
            .arg("get")
            .output()
            .expect("failed to run alertcfg get")
    }

    /// Shortcut for `alertcfg get --tenant`.
    pub fn get_tenant(&self, tenant: &str) -> Output {
        self.cmd()
            .args(["get", "--tenant", tenant])
            .output()
            .expect("failed to run alertcfg get")
    }

    /// Write `json` to a file and run `alertcfg set` on it.
    pub fn set(&self, json: &str) -> Output {
        let file = self.write("document.json", json);
        self.cmd()
            .args(["set", file.as_str()])
            .output()
            .expect("failed to run alertcfg set")
    }

    /// Run `alertcfg set -` with `json` on stdin.
    pub fn set_stdin(&self, json: &str) -> Output {
        self.cmd()
            .args(["set", "-"])
            .write_stdin(json)
            .output()
            .expect("failed to run alertcfg set")
    }

    /// Shortcut for `alertcfg previous`.
    pub fn previous(&self) -> Output {
        self.cmd()
            .arg("previous")
            .output()
            .expect("failed to run alertcfg previous")
    }

    /// Write `json` to a file and run `alertcfg check` on it.
    pub fn check(&self, json: &str) -> Output {
        let file = self.write("check.json", json);
        self.cmd()
            .args(["check", file.as_str()])
            .output()
            .expect("failed to run alertcfg check")
    }
}
