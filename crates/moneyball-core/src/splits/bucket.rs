// Bucketing functions: each maps an event record to exactly one key per
// dimension.

use serde::Serialize;
use std::fmt;

use crate::db::EventRecord;

/// Bucket label for records whose alignment or pitcher hand is missing.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Coarse pitch grouping. Variant order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PitchCategory {
    Fastball,
    Breaking,
    Offspeed,
    Other,
}

impl PitchCategory {
    /// Map a Statcast pitch-type code to its category. Codes outside the
    /// table (including missing codes) are `Other`.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("FC" | "FF" | "FT" | "SI") => PitchCategory::Fastball,
            Some("CU" | "SL" | "KC" | "KN") => PitchCategory::Breaking,
            Some("CH" | "FS" | "FO" | "SC") => PitchCategory::Offspeed,
            _ => PitchCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PitchCategory::Fastball => "Fastball",
            PitchCategory::Breaking => "Breaking",
            PitchCategory::Offspeed => "Offspeed",
            PitchCategory::Other => "Other",
        }
    }
}

impl fmt::Display for PitchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inning bucket: regulation innings keep their number, everything past the
/// ninth collapses into `Extras`. Derived ordering puts innings in numeric
/// order followed by `Extras`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InningGroup {
    Regulation(u8),
    Extras,
}

impl InningGroup {
    /// Precondition: `inning >= 1`. Anything lower is clamped into inning 1.
    pub fn from_inning(inning: i64) -> Self {
        if inning > 9 {
            InningGroup::Extras
        } else {
            InningGroup::Regulation(inning.max(1) as u8)
        }
    }
}

impl fmt::Display for InningGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InningGroup::Regulation(n) => write!(f, "{n}"),
            InningGroup::Extras => f.write_str("Extras"),
        }
    }
}

/// Shift bucket: the raw alignment string.
pub fn shift_key(record: &EventRecord) -> String {
    raw_key(record.fielding_alignment.as_deref())
}

/// Platoon bucket: the raw pitcher-hand string.
pub fn platoon_key(record: &EventRecord) -> String {
    raw_key(record.pitcher_hand.as_deref())
}

fn raw_key(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_BUCKET.to_string(),
    }
}
