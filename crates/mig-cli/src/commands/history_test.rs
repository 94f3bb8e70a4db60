use super::*;

#[test]
fn test_format_apply_time() {
    assert_eq!(format_apply_time(0), "1970-01-01 00:00:00");
    assert_eq!(format_apply_time(1_704_067_200), "2024-01-01 00:00:00");
}

#[test]
fn test_entry_from_record() {
    let record = HistoryRecord {
        version: "m240101_000000_init".to_string(),
        apply_time: 1_704_067_200,
    };
    let entry = HistoryEntry::from(&record);
    assert_eq!(entry.version, "m240101_000000_init");
    assert_eq!(entry.applied_at, "2024-01-01 00:00:00");

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["apply_time"], 1_704_067_200);
}
