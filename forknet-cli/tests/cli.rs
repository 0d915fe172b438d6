// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fs;

use assert_cmd::Command;

fn forknet() -> Command {
    let mut cmd = Command::cargo_bin("forknet").unwrap();
    cmd.env_remove("FORKNET_CONFIG");
    cmd
}

#[test]
fn prints_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forknet.toml");
    fs::write(&path, "[network]\naccounts = { count = 2 }\n").unwrap();

    let output = forknet()
        .args(["accounts", "--private-keys", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
    assert!(stdout.contains("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"));
    assert!(stdout.contains("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"));
    assert!(stdout.contains("10000 ETH"));
}

#[test]
fn reports_missing_simulator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forknet.toml");
    fs::write(&path, "[node]\nprogram = \"forknet-missing-simulator\"\n").unwrap();

    let output = forknet()
        .args(["node", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("requires the `forknet-missing-simulator` simulator"));
}
