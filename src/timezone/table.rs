//! Static zone code → offset table.
//!
//! # Responsibilities
//! - Hold the fixed set of supported zones in definition order
//! - Resolve client-submitted codes case-insensitively
//!
//! # Design Decisions
//! - Built once at startup and shared read-only
//! - Definition order is kept so clients can number the zones in a menu

use std::collections::HashMap;

use super::offset::TimezoneOffset;

/// A single supported zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Uppercase zone code, e.g. `"JST"`.
    pub code: String,
    /// Human-readable zone name.
    pub name: String,
    pub offset: TimezoneOffset,
}

/// The zones the server understands.
#[derive(Debug, Clone)]
pub struct TimezoneTable {
    entries: Vec<ZoneEntry>,
    index: HashMap<String, usize>,
}

const STANDARD_ZONES: &[(&str, &str, TimezoneOffset)] = &[
    ("UTC", "Coordinated Universal Time", TimezoneOffset::ZERO),
    ("EST", "Eastern Standard Time", TimezoneOffset::from_hours(-5)),
    ("CST", "Central Standard Time", TimezoneOffset::from_hours(-6)),
    ("MST", "Mountain Standard Time", TimezoneOffset::from_hours(-7)),
    ("PST", "Pacific Standard Time", TimezoneOffset::from_hours(-8)),
    ("IST", "Indian Standard Time", TimezoneOffset::from_hours(5)),
    ("JST", "Japan Standard Time", TimezoneOffset::from_hours(9)),
    ("AEST", "Australian Eastern Standard Time", TimezoneOffset::from_hours(10)),
    ("CET", "Central European Time", TimezoneOffset::from_hours(1)),
    ("EET", "Eastern European Time", TimezoneOffset::from_hours(2)),
    ("NST", "Newfoundland Standard Time", TimezoneOffset::from_minutes(-210)),
    ("HKT", "Hong Kong Time", TimezoneOffset::from_hours(8)),
];

impl TimezoneTable {
    /// The twelve zones served by default.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ZONES.iter().map(|(code, name, offset)| ZoneEntry {
            code: (*code).to_string(),
            name: (*name).to_string(),
            offset: *offset,
        }))
    }

    /// Build a table from arbitrary entries.
    ///
    /// Codes are upper-cased. A repeated code replaces the earlier entry's
    /// offset but keeps its position.
    pub fn from_entries(entries: impl IntoIterator<Item = ZoneEntry>) -> Self {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for mut entry in entries {
            entry.code = entry.code.to_uppercase();
            match table.index.get(&entry.code) {
                Some(&pos) => table.entries[pos] = entry,
                None => {
                    table.index.insert(entry.code.clone(), table.entries.len());
                    table.entries.push(entry);
                }
            }
        }
        table
    }

    /// Resolve a zone code, ignoring case.
    pub fn lookup(&self, code: &str) -> Option<TimezoneOffset> {
        self.index
            .get(&code.to_uppercase())
            .map(|&pos| self.entries[pos].offset)
    }

    /// All zones in definition order.
    pub fn entries(&self) -> &[ZoneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TimezoneTable {
    fn default() -> Self {
        Self::standard()
    }
}
