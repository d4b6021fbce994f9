//! Walks one meeting through its timeline using only domain types.

use chrono::{Duration, TimeZone, Utc};
use showup_domain::{
    MeetingLifecycle, MeetingStatus, PendingMeeting, StakeAmount, StakeRecord, StakingConfig,
    WalletAddress,
};

fn wallet(seed: char) -> WalletAddress {
    WalletAddress::parse(&format!("0x{}", seed.to_string().repeat(40))).unwrap()
}

#[test]
fn meeting_status_follows_configured_windows() {
    let start = Utc.with_ymd_and_hms(2025, 9, 10, 14, 0, 0).unwrap();
    let pending = PendingMeeting {
        meeting_id: "m-42".to_string(),
        organizer: wallet('a'),
        organizer_email: "organizer@example.com".to_string(),
        title: "Quarterly planning".to_string(),
        description: Some("Bring numbers".to_string()),
        start_time: start,
        end_time: start + Duration::hours(1),
        required_stake: StakeAmount::parse_ether("0.01").unwrap(),
        attendees: vec!["tom@example.com".to_string()],
        lifecycle: MeetingLifecycle::Pending,
        created_at: start - Duration::days(2),
    };

    let mut meeting = pending.initialize().unwrap();
    meeting.stakes.push(StakeRecord::new(
        wallet('b'),
        meeting.required_stake,
        None,
        start - Duration::hours(2),
    ));

    let config = StakingConfig { check_in_grace_minutes: 30, ..StakingConfig::default() };
    let windows = config.windows();

    assert_eq!(meeting.status(start - Duration::hours(2), &windows), MeetingStatus::Upcoming);
    assert_eq!(
        meeting.status(start + Duration::minutes(80), &windows),
        MeetingStatus::CheckInPeriod
    );
    assert_eq!(
        meeting.status(start + Duration::minutes(91), &windows),
        MeetingStatus::PendingSettlement
    );
    assert_eq!(meeting.check_in_deadline(&windows), start + Duration::minutes(90));
    assert_eq!(meeting.total_staked().unwrap().to_string(), "0.01");
    assert!(meeting.stake_for(&wallet('b')).is_some());
    assert!(meeting.is_organizer(&wallet('a')));
}
