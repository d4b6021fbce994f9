//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Meeting timeline
/// Grace window after `end_time` during which attendance codes are accepted.
/// Both the `check_in_period` status band and the code-expiry check read it.
pub const CHECK_IN_GRACE_MINUTES: i64 = 15;
/// Staking closes this long before `start_time`.
pub const STAKING_CUTOFF_MINUTES: i64 = 60;

// Attendance codes
pub const ATTENDANCE_CODE_LENGTH: usize = 6;

// Invitation tokens
pub const INVITATION_TTL_DAYS: i64 = 7;
pub const INVITATION_TOKEN_BYTES: usize = 32;

// Contact resolution
pub const CONFIDENCE_EXACT_NAME: f32 = 1.0;
pub const CONFIDENCE_FIRST_WORD: f32 = 0.95;
pub const CONFIDENCE_NAME_PREFIX: f32 = 0.8;
pub const CONFIDENCE_GIVEN_NAME_PREFIX: f32 = 0.75;
pub const CONFIDENCE_SUBSTRING: f32 = 0.6;
/// Word-overlap scores are scaled into `[0, CONFIDENCE_WORD_OVERLAP_MAX]`.
pub const CONFIDENCE_WORD_OVERLAP_MAX: f32 = 0.5;
pub const CONFIDENCE_FLOOR: f32 = 0.1;
/// Contacts below this score are never offered as candidates.
pub const MIN_CANDIDATE_CONFIDENCE: f32 = 0.3;
/// The best candidate must reach this score to be auto-accepted...
pub const AUTO_ACCEPT_MIN_CONFIDENCE: f32 = 0.6;
/// ...and beat the runner-up by at least this margin.
pub const AUTO_ACCEPT_MARGIN: f32 = 0.15;

// Stake amounts
pub const WEI_DECIMALS: u32 = 18;
