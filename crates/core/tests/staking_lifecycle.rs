//! Stake posting, attendance and settlement against in-memory fakes.

mod support;

use chrono::Duration;
use showup_core::PostStakeRequest;
use showup_domain::{
    CheckInOutcome, MeetingLifecycle, MeetingStatus, ShowupError, StakeAmount, StakingConfig,
};
use support::{meeting_start, organizer, pending_meeting, stake_amount, wallet, Harness};

fn stake_request(meeting_id: &str, seed: char) -> PostStakeRequest {
    PostStakeRequest {
        meeting_id: meeting_id.to_string(),
        wallet_address: wallet(seed),
        amount: stake_amount(),
        email: None,
        invitation_token: None,
    }
}

#[tokio::test]
async fn full_meeting_scenario() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::seconds(7200));
    harness.seed(pending_meeting("m-1", t));
    let ledger = harness.stake_ledger();

    // T-7200: first stake initializes the meeting
    let receipt = ledger.post_stake(stake_request("m-1", '1')).await.unwrap();
    assert!(receipt.initialized);
    assert_eq!(receipt.status, MeetingStatus::Upcoming);
    assert_eq!(harness.meetings.lifecycle("m-1"), Some(MeetingLifecycle::StakeConfirmed));

    // A second staker, who will not show up
    let receipt = ledger.post_stake(stake_request("m-1", '2')).await.unwrap();
    assert!(!receipt.initialized);

    // T-1800: same wallet again is a duplicate, not a staking-closed error
    harness.clock.set(t - Duration::seconds(1800));
    let err = ledger.post_stake(stake_request("m-1", '1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(ref m) if m.contains("already staked")), "{err}");

    // Organizer generates the code during the meeting
    harness.clock.set(t + Duration::minutes(50));
    let code = harness.attendance().generate_code("m-1", &organizer()).await.unwrap();
    assert_eq!(code.code.len(), 6);

    // T+3700: staker checks in
    harness.clock.set(t + Duration::seconds(3700));
    let outcome = harness.attendance().submit_code("m-1", &code.code, &wallet('1')).await.unwrap();
    assert!(matches!(outcome, CheckInOutcome::CheckedIn { .. }));

    // T+4000: a wallet that never staked gets a no-op success
    harness.clock.set(t + Duration::seconds(4000));
    let outcome = harness.attendance().submit_code("m-1", &code.code, &wallet('9')).await.unwrap();
    assert_eq!(outcome, CheckInOutcome::NotStaked { wallet_address: wallet('9') });

    // T+3600+901: settlement
    harness.clock.set(t + Duration::seconds(3600 + 901));
    let summary = harness.settlement().settle("m-1").await.unwrap();
    assert!(summary.newly_settled);
    assert_eq!(summary.refunded_wallets, vec![wallet('1')]);
    assert_eq!(summary.forfeited_wallets, vec![wallet('2')]);
    assert_eq!(summary.refunded_total, stake_amount());
    assert_eq!(summary.forfeited_total, stake_amount());

    let meeting = harness.meetings.meeting("m-1");
    assert!(meeting.is_settled);
    assert!(meeting.stake_for(&wallet('1')).unwrap().is_refunded);
    assert!(!meeting.stake_for(&wallet('2')).unwrap().is_refunded);

    // Second settlement changes nothing
    let again = harness.settlement().settle("m-1").await.unwrap();
    assert!(!again.newly_settled);
    assert_eq!(again.refunded_total, summary.refunded_total);
    assert_eq!(again.forfeited_total, summary.forfeited_total);
    assert_eq!(harness.meetings.meeting("m-1"), meeting);
}

#[tokio::test]
async fn unknown_meeting_is_not_found() {
    let harness = Harness::new(meeting_start() - Duration::hours(3));
    let err = harness.stake_ledger().post_stake(stake_request("nope", '1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::NotFound(_)));
}

#[tokio::test]
async fn stake_must_equal_required_amount() {
    let harness = Harness::new(meeting_start() - Duration::hours(3));
    harness.seed(pending_meeting("m-1", meeting_start()));

    let mut request = stake_request("m-1", '1');
    request.amount = StakeAmount::parse_ether("0.02").unwrap();
    let err = harness.stake_ledger().post_stake(request).await.unwrap_err();

    assert!(matches!(err, ShowupError::InvalidInput(_)));
    assert_eq!(harness.meetings.lifecycle("m-1"), Some(MeetingLifecycle::Pending));
}

#[tokio::test]
async fn staking_closes_an_hour_before_start() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::hours(1));
    harness.seed(pending_meeting("m-1", t));

    let err = harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(ref m) if m.contains("closed")));

    harness.clock.set(t - Duration::hours(1) - Duration::seconds(1));
    assert!(harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.is_ok());
}

#[tokio::test]
async fn staking_deadline_can_be_disabled() {
    let t = meeting_start();
    let config = StakingConfig { enforce_staking_deadline: false, ..StakingConfig::default() };
    let harness = Harness::new(t + Duration::minutes(10)).with_config(config);
    harness.seed(pending_meeting("m-1", t));

    let receipt = harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.unwrap();
    assert_eq!(receipt.status, MeetingStatus::InProgress);
}

#[tokio::test]
async fn cancelled_and_settled_meetings_reject_stakes() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::hours(3));
    harness.seed(pending_meeting("m-1", t));
    harness.seed(pending_meeting("m-2", t));
    let ledger = harness.stake_ledger();

    harness.scheduler().cancel("m-1", &organizer()).await.unwrap();
    let err = ledger.post_stake(stake_request("m-1", '1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(ref m) if m.contains("cancelled")));

    ledger.post_stake(stake_request("m-2", '1')).await.unwrap();
    harness.clock.set(t + Duration::hours(2));
    harness.settlement().settle("m-2").await.unwrap();
    let config = StakingConfig { enforce_staking_deadline: false, ..StakingConfig::default() };
    let late = Harness { config, ..harness }.stake_ledger();
    let err = late.post_stake(stake_request("m-2", '2')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(ref m) if m.contains("settled")));
}

#[tokio::test]
async fn code_generation_is_organizer_only_and_regeneration_invalidates() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::hours(3));
    harness.seed(pending_meeting("m-1", t));
    harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.unwrap();
    let attendance = harness.attendance();

    let err = attendance.generate_code("m-1", &wallet('1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Auth(_)));

    let first = attendance.generate_code("m-1", &organizer()).await.unwrap();
    let mut second = attendance.generate_code("m-1", &organizer()).await.unwrap();
    while second.code == first.code {
        second = attendance.generate_code("m-1", &organizer()).await.unwrap();
    }

    harness.clock.set(t + Duration::minutes(30));
    let err = attendance.submit_code("m-1", &first.code, &wallet('1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::InvalidInput(_)));
    let outcome = attendance.submit_code("m-1", &second.code, &wallet('1')).await.unwrap();
    assert!(matches!(outcome, CheckInOutcome::CheckedIn { .. }));

    // Checking in twice is a harmless overwrite
    let outcome = attendance.submit_code("m-1", &second.code, &wallet('1')).await.unwrap();
    assert!(matches!(outcome, CheckInOutcome::CheckedIn { .. }));
}

#[tokio::test]
async fn code_submission_failures() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::hours(3));
    harness.seed(pending_meeting("m-1", t));
    harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.unwrap();
    let attendance = harness.attendance();

    let err = attendance.submit_code("m-1", "ABCDEF", &wallet('1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::NotFound(_)));

    let code = attendance.generate_code("m-1", &organizer()).await.unwrap();

    // Exactly at the deadline is still accepted; one second later is not
    harness.clock.set(t + Duration::minutes(75));
    assert!(attendance.submit_code("m-1", &code.code, &wallet('1')).await.is_ok());
    harness.clock.set(t + Duration::minutes(75) + Duration::seconds(1));
    let err = attendance.submit_code("m-1", &code.code, &wallet('1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(_)));

    harness.settlement().settle("m-1").await.unwrap();
    let err = attendance.submit_code("m-1", &code.code, &wallet('1')).await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(ref m) if m.contains("settled")));
}

#[tokio::test]
async fn early_settlement_is_rejected_unless_allowed() {
    let t = meeting_start();
    let harness = Harness::new(t - Duration::hours(3));
    harness.seed(pending_meeting("m-1", t));
    harness.stake_ledger().post_stake(stake_request("m-1", '1')).await.unwrap();

    harness.clock.set(t + Duration::minutes(75));
    let err = harness.settlement().settle("m-1").await.unwrap_err();
    assert!(matches!(err, ShowupError::Conflict(_)));

    let config = StakingConfig { allow_early_settlement: true, ..StakingConfig::default() };
    let harness = harness.with_config(config);
    let summary = harness.settlement().settle("m-1").await.unwrap();
    assert!(summary.newly_settled);
    assert_eq!(summary.forfeited_wallets, vec![wallet('1')]);
}

#[tokio::test]
async fn failing_email_never_fails_stake_posting() {
    let harness = Harness::new(meeting_start() - Duration::hours(3));
    harness.seed(pending_meeting("m-1", meeting_start()));
    harness.notifier.fail_all();

    let mut request = stake_request("m-1", '1');
    request.email = Some("tom.jones@example.com".to_string());
    let receipt = harness.stake_ledger().post_stake(request).await.unwrap();

    assert_eq!(receipt.stake.email.as_deref(), Some("tom.jones@example.com"));
    assert_eq!(harness.notifier.confirmations.lock().len(), 1);
}

#[tokio::test]
async fn wallet_case_does_not_bypass_uniqueness() {
    let harness = Harness::new(meeting_start() - Duration::hours(3));
    harness.seed(pending_meeting("m-1", meeting_start()));
    let ledger = harness.stake_ledger();
    ledger.post_stake(stake_request("m-1", 'b')).await.unwrap();

    let mut request = stake_request("m-1", 'b');
    request.wallet_address = format!("0x{}", "B".repeat(40)).parse().unwrap();
    assert!(matches!(ledger.post_stake(request).await, Err(ShowupError::Conflict(_))));
}
