use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("kn-rate-filter").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn kn_help_runs() {
    let mut cmd = Command::cargo_bin("kn-rate-filter").expect("binary exists");
    cmd.args(["kn", "--help"]).assert().success();
}
