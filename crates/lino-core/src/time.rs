// crates/lino-core/src/time.rs
//
// Calendar constants and the block header.
//
// Two independent key spaces hang off block time: the time-event bucket key
// (seconds since the Unix epoch, rendered in base 10) and the stake-stat day
// index (whole days since chain start). They are deliberately different
// functions and must never be mixed.

use serde::{Deserialize, Serialize};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const MINUTES_PER_HOUR: i64 = 60;
pub const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;
pub const SECONDS_PER_DAY: i64 = MINUTES_PER_DAY * SECONDS_PER_MINUTE;

/// 365.25 days.
pub const HOURS_PER_YEAR: i64 = 8766;
pub const MINUTES_PER_YEAR: i64 = HOURS_PER_YEAR * MINUTES_PER_HOUR;
pub const MINUTES_PER_MONTH: i64 = MINUTES_PER_YEAR / 12;

/// The slice of a block header the economic core reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height, starting at 1.
    pub height: i64,
    /// Block time in seconds since the Unix epoch.
    pub time: i64,
    /// Number of transactions included in the block.
    pub num_txs: i64,
}

impl BlockHeader {
    pub fn new(height: i64, time: i64, num_txs: i64) -> Self {
        Self {
            height,
            time,
            num_txs,
        }
    }
}

/// Whole days elapsed between `chain_start` and `unix_time`, never negative.
pub fn day_index(unix_time: i64, chain_start: i64) -> i64 {
    if unix_time <= chain_start {
        return 0;
    }
    (unix_time - chain_start) / SECONDS_PER_DAY
}

/// Whole minutes elapsed between `chain_start` and `unix_time`, never negative.
pub fn minute_index(unix_time: i64, chain_start: i64) -> i64 {
    if unix_time <= chain_start {
        return 0;
    }
    (unix_time - chain_start) / SECONDS_PER_MINUTE
}

/// Storage key suffix for the time-event bucket at `unix_time`.
///
/// Plain base-10 with no padding, so lexicographic key order is not numeric
/// order. Callers that need ordered buckets must sort by the parsed value.
pub fn timestamp_key(unix_time: i64) -> String {
    unix_time.to_string()
}
