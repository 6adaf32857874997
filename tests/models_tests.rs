// Model serialization tests (JSON camelCase)

use servermon::models::{ServerSnapshot, SystemInfo};

#[test]
fn test_server_snapshot_serialization_camel_case() {
    let snapshot = ServerSnapshot {
        timestamp: 1234,
        bytes_sent_sec: 10,
        bytes_recv_sec: 20,
        available_memory: 4096,
        process_count: 3,
        ..ServerSnapshot::default()
    };
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"bytesSentSec\""));
    assert!(json.contains("\"bytesRecvSec\""));
    assert!(json.contains("\"availableMemory\""));
    assert!(json.contains("\"processCount\""));
    assert!(json.contains("\"outputCacheTotalMisses\""));
    let back: ServerSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_server_snapshot_default_is_all_zero() {
    let snapshot = ServerSnapshot::default();
    assert_eq!(snapshot.timestamp, 0);
    assert_eq!(snapshot.requests_sec, 0);
    assert_eq!(snapshot.process_count, 0);
}

#[test]
fn test_system_info_serialization_camel_case() {
    let info = SystemInfo {
        os_family: "Linux".into(),
        os_version: "6.1".into(),
        host_name: "web-01".into(),
        processor_name: "test-cpu".into(),
    };
    let json = serde_json::to_string(&info).unwrap();
    assert!(json.contains("\"osFamily\""));
    assert!(json.contains("\"hostName\""));
    assert!(json.contains("\"processorName\""));
    let back: SystemInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back.host_name, "web-01");
}
