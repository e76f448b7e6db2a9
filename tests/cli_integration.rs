use assert_cmd::Command;
use serde_json::Value;

const ENV_VARS: [&str; 5] = [
    "CARD_SIGNER_RPC_URL",
    "CARD_SIGNER_CHAIN_ID",
    "CARD_SIGNER_KEY_SLOT",
    "CARD_SIGNER_PUBLIC_KEY",
    "CARD_SIGNER_TIMEOUT_SECS",
];

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("card-eth-signer").expect("binary builds");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn error_report(output: &std::process::Output) -> Value {
    let stderr = String::from_utf8(output.stderr.clone()).expect("stderr is utf8");
    let line = stderr
        .lines()
        .find(|line| line.starts_with('{'))
        .expect("error report on stderr");
    serde_json::from_str(line).expect("error report is json")
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().expect("cli runs");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    assert!(stdout.contains("balance"));
    assert!(stdout.contains("nonce"));
}

#[test]
fn missing_configuration_is_reported() {
    let output = cli()
        .args(["balance", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"])
        .output()
        .expect("cli runs");

    assert!(!output.status.success());
    let report = error_report(&output);
    assert_eq!(report["code"], "config_error");
    assert!(report["message"].as_str().unwrap().contains("CARD_SIGNER_RPC_URL"));
}

#[test]
fn plain_http_remote_endpoint_is_rejected() {
    let output = cli()
        .env("CARD_SIGNER_RPC_URL", "http://node.example.com:8545")
        .env("CARD_SIGNER_CHAIN_ID", "1")
        .args(["nonce", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"])
        .output()
        .expect("cli runs");

    assert!(!output.status.success());
    assert_eq!(error_report(&output)["code"], "config_error");
}

#[test]
fn malformed_address_is_invalid_input() {
    let output = cli()
        .env("CARD_SIGNER_RPC_URL", "http://127.0.0.1:8545")
        .env("CARD_SIGNER_CHAIN_ID", "1")
        .args(["balance", "0x1234"])
        .output()
        .expect("cli runs");

    assert!(!output.status.success());
    assert_eq!(error_report(&output)["code"], "invalid_input");
}
