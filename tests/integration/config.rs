//! Configuration and argument errors surfaced by the binary

use crate::{assert_exit_code, fake_node, run_probe, stdout_lines, write_config, write_raw_config};

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let output = run_probe(&path, &[]);

    assert_exit_code(&output, 2);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("invalid configuration"), "{stdout}");
    assert!(stdout.contains("failed to read config file"), "{stdout}");
}

#[test]
fn test_unknown_config_field() {
    let config = write_raw_config(
        ".json",
        r#"{"hostname": "127.0.0.1", "username": "u", "password": "p", "database": "x"}"#,
    );

    let output = run_probe(config.path(), &[]);

    assert_exit_code(&output, 2);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("failed to parse JSON config"), "{stdout}");
    assert!(stdout.contains("database"), "{stdout}");
}

#[test]
fn test_cluster_size_below_two_rejected() {
    let config = write_config("127.0.0.1", 3306, "monitor", "secret");

    let output = run_probe(config.path(), &["--cluster-size", "1"]);

    assert_exit_code(&output, 2);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least 2"), "{stderr}");
}

#[test]
fn test_toml_config() {
    let port = fake_node::spawn(&[
        ("wsrep_connected", "ON"),
        ("wsrep_ready", "ON"),
        ("wsrep_local_state_comment", "Synced"),
        ("wsrep_cluster_size", "2"),
        ("Com_commit", "0"),
        ("Com_insert", "0"),
        ("Com_rollback", "0"),
        ("Com_select", "0"),
        ("Com_update", "0"),
        ("Com_delete", "0"),
    ]);
    let config = write_raw_config(
        ".toml",
        &format!(
            "hostname = \"127.0.0.1\"\nusername = \"monitor\"\npassword = \"\"\nport = {port}\n"
        ),
    );

    let output = run_probe(config.path(), &["--cluster-size", "2"]);

    assert_exit_code(&output, 0);
    assert_eq!(
        stdout_lines(&output),
        vec![
            "galera,hostname=127.0.0.1 commit=0,insert=0,rollback=0,select=0,update=0,delete=0,cluster_size=2"
                .to_string()
        ]
    );
}
