#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use showup_common::testing::TempDir;
use showup_domain::{MeetingLifecycle, PendingMeeting, StakeAmount, StakeRecord, WalletAddress};
use showup_infra::database::DbManager;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new("infra-test").expect("temp dir should be created");
        let db_path = temp_dir.path().join("showup.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn meeting_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 16, 0, 0).unwrap()
}

pub fn wallet(seed: char) -> WalletAddress {
    WalletAddress::parse(&format!("0x{}", seed.to_string().repeat(40))).unwrap()
}

pub fn pending_meeting(meeting_id: &str) -> PendingMeeting {
    let start = meeting_start();
    PendingMeeting {
        meeting_id: meeting_id.to_string(),
        organizer: wallet('a'),
        organizer_email: "organizer@example.com".to_string(),
        title: "Weekly sync".to_string(),
        description: Some("Agenda in the doc".to_string()),
        start_time: start,
        end_time: start + Duration::hours(1),
        required_stake: StakeAmount::parse_ether("0.01").unwrap(),
        attendees: vec!["tom.jones@example.com".to_string(), "alice@example.com".to_string()],
        lifecycle: MeetingLifecycle::Pending,
        created_at: start - Duration::days(2),
    }
}

pub fn stake(seed: char, minutes_before_start: i64) -> StakeRecord {
    StakeRecord::new(
        wallet(seed),
        StakeAmount::parse_ether("0.01").unwrap(),
        Some(format!("{seed}@example.com")),
        meeting_start() - Duration::minutes(minutes_before_start),
    )
}
