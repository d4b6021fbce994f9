//! Column conversions shared by the SQLite repositories.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use showup_domain::{MeetingLifecycle, StakeAmount, WalletAddress};

pub(crate) fn to_ts(value: DateTime<Utc>) -> i64 {
    value.timestamp()
}

pub(crate) fn from_ts(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {secs}").into(),
        )
    })
}

pub(crate) fn from_opt_ts(
    idx: usize,
    secs: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    secs.map(|s| from_ts(idx, s)).transpose()
}

pub(crate) fn wallet(idx: usize, value: String) -> rusqlite::Result<WalletAddress> {
    WalletAddress::parse(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn amount(idx: usize, wei: String) -> rusqlite::Result<StakeAmount> {
    wei.parse::<u128>().map(StakeAmount::from_wei).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
    })
}

pub(crate) fn lifecycle(idx: usize, value: String) -> rusqlite::Result<MeetingLifecycle> {
    value
        .parse::<MeetingLifecycle>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
