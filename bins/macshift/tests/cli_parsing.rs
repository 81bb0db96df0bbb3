//! CLI argument parsing tests for the macshift command.
//!
//! These tests exercise argument handling only and never need root or a
//! particular set of network interfaces.

use assert_cmd::Command;
use predicates::prelude::*;

fn macshift_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_macshift"))
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        macshift_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Change network interface MAC addresses"))
            .stdout(predicate::str::contains("--interface"))
            .stdout(predicate::str::contains("--mac"));
    }

    #[test]
    fn test_version() {
        macshift_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("macshift"));
    }

    #[test]
    fn test_unknown_flag() {
        macshift_cmd()
            .arg("--frobnicate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn test_positional_argument_rejected() {
        macshift_cmd().arg("eth0").assert().failure();
    }
}

mod mac_argument {
    use super::*;

    #[test]
    fn test_invalid_mac_rejected() {
        for bad in ["00:11:22:33:44", "00-11-22-33-44-55", "0:11:22:33:44:55", "zz:11:22:33:44:55"] {
            macshift_cmd()
                .args(["-i", "eth0", "-m", bad])
                .assert()
                .failure()
                .code(2)
                .stderr(predicate::str::contains("colon-separated"));
        }
    }

    #[test]
    fn test_mac_missing_value() {
        macshift_cmd()
            .args(["-i", "eth0", "--mac"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn test_list_conflicts_with_mac() {
        macshift_cmd()
            .args(["--list", "-m", "00:11:22:33:44:55"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}

mod backend_argument {
    use super::*;

    #[test]
    fn test_invalid_backend_rejected() {
        macshift_cmd()
            .args(["--backend", "netlink", "--list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("netlink"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        macshift_cmd()
            .args(["--timeout", "soon", "--list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod runtime_errors {
    use super::*;

    #[test]
    fn test_malformed_interface_name_is_fatal() {
        // Either the name check or the tool probe fails; both are fatal.
        macshift_cmd()
            .args(["-i", "bad name", "-m", "00:11:22:33:44:55"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error: "));
    }

    #[test]
    fn test_list_with_malformed_interface_name_is_fatal() {
        macshift_cmd()
            .args(["--list", "-i", "bad name"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error: "));
    }
}
