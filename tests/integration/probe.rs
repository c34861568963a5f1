//! End-to-end probe runs against the in-process fake node

use crate::{assert_exit_code, fake_node, run_probe, stdout_lines, write_config};

fn healthy_status() -> Vec<(&'static str, &'static str)> {
    vec![
        ("wsrep_connected", "ON"),
        ("wsrep_ready", "ON"),
        ("wsrep_local_state_comment", "Synced"),
        ("wsrep_cluster_size", "3"),
        ("Com_commit", "11"),
        ("Com_insert", "7"),
        ("Com_rollback", "1"),
        ("Com_select", "250"),
        ("Com_update", "4"),
        ("Com_delete", "2"),
    ]
}

fn with_value(key: &str, value: &'static str) -> Vec<(&'static str, &'static str)> {
    healthy_status()
        .into_iter()
        .map(|(k, v)| if k == key { (k, value) } else { (k, v) })
        .collect()
}

const HEALTHY_LINE: &str =
    "galera,hostname=127.0.0.1 commit=11,insert=7,rollback=1,select=250,update=4,delete=2,cluster_size=3";

#[test]
fn test_healthy_node() {
    let port = fake_node::spawn(&healthy_status());
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &["--cluster-size", "3"]);

    assert_exit_code(&output, 0);
    assert_eq!(stdout_lines(&output), vec![HEALTHY_LINE.to_string()]);
}

#[test]
fn test_healthy_node_without_expected_size() {
    let port = fake_node::spawn(&with_value("wsrep_cluster_size", "1"));
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &[]);

    assert_exit_code(&output, 0);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(",cluster_size=1"));
}

#[test]
fn test_custom_measurement() {
    let port = fake_node::spawn(&healthy_status());
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &["--measurement", "mysql"]);

    assert_exit_code(&output, 0);
    assert!(stdout_lines(&output)[0].starts_with("mysql,hostname=127.0.0.1 commit=11,"));
}

#[test]
fn test_degraded_cluster_warns() {
    let port = fake_node::spawn(&with_value("wsrep_cluster_size", "2"));
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &["--cluster-size", "3"]);

    assert_exit_code(&output, 1);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(",cluster_size=2"));
    assert_eq!(
        lines[1],
        "degraded cluster: wsrep_cluster_size == 2 (expected 3)"
    );
}

#[test]
fn test_unsynced_node_is_critical() {
    let port = fake_node::spawn(&with_value("wsrep_local_state_comment", "Donor/Desynced"));
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &["--cluster-size", "3"]);

    assert_exit_code(&output, 2);
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], HEALTHY_LINE);
    assert_eq!(
        lines[1],
        "ERROR: wsrep_local_state_comment = 'Donor/Desynced' (expected 'Synced')"
    );
}

#[test]
fn test_warning_and_critical_together() {
    let status: Vec<_> = with_value("wsrep_cluster_size", "2")
        .into_iter()
        .map(|(k, v)| if k == "wsrep_ready" { (k, "OFF") } else { (k, v) })
        .collect();
    let port = fake_node::spawn(&status);
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &["--cluster-size", "3"]);

    assert_exit_code(&output, 2);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "degraded cluster: wsrep_cluster_size == 2 (expected 3)"
    );
    assert_eq!(lines[2], "ERROR: wsrep_ready = 'OFF' (expected 'ON')");
}

#[test]
fn test_missing_counter_is_critical_without_line() {
    let status: Vec<_> = healthy_status()
        .into_iter()
        .filter(|(k, _)| *k != "Com_delete")
        .collect();
    let port = fake_node::spawn(&status);
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &[]);

    assert_exit_code(&output, 2);
    assert_eq!(
        stdout_lines(&output),
        vec!["expected state key not found: Com_delete".to_string()]
    );
}

#[test]
fn test_unreachable_node_is_critical() {
    // Grab a free port and release it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = write_config("127.0.0.1", port, "monitor", "secret");

    let output = run_probe(config.path(), &[]);

    assert_exit_code(&output, 2);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("status source unavailable"), "{stdout}");
    assert!(!stdout.contains("commit="));
}
