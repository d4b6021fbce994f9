//! Stake amounts
//!
//! Amounts are held in wei so arithmetic is exact; the decimal ether form is
//! only used at the edges (JSON payloads, log lines).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::WEI_DECIMALS;
use crate::errors::{Result, ShowupError};

const WEI_PER_ETHER: u128 = 10u128.pow(WEI_DECIMALS);

/// Non-negative stake amount in wei.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct StakeAmount(u128);

impl StakeAmount {
    pub const ZERO: Self = Self(0);

    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    pub const fn wei(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal ether string such as `"0.01"` or `"2"`.
    pub fn parse_ether(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let invalid = || ShowupError::InvalidInput(format!("invalid stake amount: {value}"));

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !digits(whole) || !digits(fraction) {
            return Err(invalid());
        }
        if fraction.len() > WEI_DECIMALS as usize {
            return Err(ShowupError::InvalidInput(format!(
                "stake amount has more than {WEI_DECIMALS} decimal places: {value}"
            )));
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|w| w.checked_mul(WEI_PER_ETHER))
                .ok_or_else(invalid)?
        };
        let fraction_wei = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = WEI_DECIMALS as usize);
            padded.parse::<u128>().map_err(|_| invalid())?
        };

        whole_wei.checked_add(fraction_wei).map(Self).ok_or_else(invalid)
    }

    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| ShowupError::Internal("stake total overflow".to_string()))
    }

    /// Sum an iterator of amounts, failing on overflow.
    pub fn sum<I>(amounts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

impl fmt::Display for StakeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_ETHER;
        let fraction = self.0 % WEI_PER_ETHER;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:0width$}", width = WEI_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for StakeAmount {
    type Err = ShowupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_ether(s)
    }
}

impl TryFrom<String> for StakeAmount {
    type Error = ShowupError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_ether(&value)
    }
}

impl From<StakeAmount> for String {
    fn from(value: StakeAmount) -> Self {
        value.to_string()
    }
}
