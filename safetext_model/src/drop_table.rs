//! The table of codepoints that Discord is known to silently drop.
//!
//! Discord drops these characters from messages 100% of the time, and then acts on the
//! transformed message. The list was found by trial and error, and has no justification beyond
//! observed behavior. It is kept as versioned data so it can be updated or replaced without
//! touching the pipeline.

use crate::serde::*;
use lazy_static::*;
use safetext_errors::*;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;

/// The version of the built-in drop table.
pub const BUILTIN_VERSION: u32 = 1;

const BUILTIN_ENTRIES: &[(u32, u32, &str)] = &[
    (0x202E, 0x202E, "right-to-left override"),
    (0xD800, 0xD800, "unpaired surrogate"),
    (0xDB7F, 0xDB7F, "unpaired surrogate"),
    (0xDB80, 0xDB80, "unpaired surrogate"),
    (0xDBFF, 0xDBFF, "unpaired surrogate"),
    (0xDC00, 0xDC00, "unpaired surrogate"),
    (0xDFFF, 0xDFFF, "unpaired surrogate"),
    (0xE0195, 0xE01EF, "variation selectors 166 to 256"),
];

const MAX_CODEPOINT: u32 = 0x10FFFF;

mod codepoint {
    use super::*;
    use serde::de::Visitor;

    pub fn serialize<S: Serializer>(t: &u32, s: S) -> StdResult<S::Ok, S::Error> {
        s.serialize_str(&format!("U+{:04X}", t))
    }

    struct CodepointVisitor;
    impl <'de> Visitor<'de> for CodepointVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a codepoint number or a string of the form \"U+XXXX\"")
        }

        fn visit_u64<E: DeError>(self, v: u64) -> StdResult<u32, E> {
            u32::try_from(v).map_err(|_| E::custom("codepoint out of range"))
        }
        fn visit_i64<E: DeError>(self, v: i64) -> StdResult<u32, E> {
            u32::try_from(v).map_err(|_| E::custom("codepoint out of range"))
        }
        fn visit_str<E: DeError>(self, v: &str) -> StdResult<u32, E> {
            let hex = v.strip_prefix("U+")
                .or_else(|| v.strip_prefix("u+"))
                .or_else(|| v.strip_prefix("0x"))
                .ok_or_else(|| E::custom("codepoint strings must start with `U+` or `0x`"))?;
            u32::from_str_radix(hex, 16).map_err(|_| E::custom("invalid hexadecimal codepoint"))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> StdResult<u32, D::Error> {
        d.deserialize_any(CodepointVisitor)
    }
}

/// An inclusive range of codepoints in a [`DropTable`].
///
/// Codepoints are serialized as `"U+XXXX"` strings. Plain numbers are accepted when loading.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Hash)]
pub struct DropEntry {
    /// The first codepoint of the range.
    #[serde(with = "codepoint")]
    pub start: u32,
    /// The last codepoint of the range.
    #[serde(with = "codepoint")]
    pub end: u32,
    /// A description of the dropped characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
impl DropEntry {
    /// Creates an entry for a single codepoint.
    pub fn single(cp: u32) -> Self {
        DropEntry { start: cp, end: cp, note: None }
    }

    /// Creates an entry for an inclusive range of codepoints.
    pub fn range(start: u32, end: u32) -> Self {
        DropEntry { start, end, note: None }
    }

    /// Sets the note on this entry.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    fn check(&self) -> Result<()> {
        if self.start > self.end {
            bail!(InvalidDropTable, format!(
                "range U+{:04X}..=U+{:04X} is reversed", self.start, self.end,
            ).into());
        }
        if self.end > MAX_CODEPOINT {
            bail!(InvalidDropTable, format!(
                "U+{:04X} is not a valid codepoint", self.end,
            ).into());
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawDropTable {
    version: u32,
    entries: Vec<DropEntry>,
}

/// A versioned table of codepoints known to be dropped by Discord.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Hash)]
#[serde(try_from = "RawDropTable")]
pub struct DropTable {
    version: u32,
    entries: Vec<DropEntry>,
    /// Sorted, merged copy of `entries` used for lookups.
    #[serde(skip_serializing)]
    ranges: Vec<(u32, u32)>,
}
impl DropTable {
    /// Creates a new drop table, checking that every entry is a valid codepoint range.
    pub fn new(version: u32, entries: Vec<DropEntry>) -> Result<Self> {
        for entry in &entries {
            entry.check()?;
        }
        Ok(Self::build(version, entries))
    }

    fn build(version: u32, entries: Vec<DropEntry>) -> Self {
        let mut ranges: Vec<(u32, u32)> = entries.iter().map(|e| (e.start, e.end)).collect();
        ranges.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        DropTable { version, entries, ranges: merged }
    }

    /// Returns the built-in drop table.
    pub fn builtin() -> &'static DropTable {
        lazy_static! {
            static ref BUILTIN: DropTable = DropTable::build(
                BUILTIN_VERSION,
                BUILTIN_ENTRIES.iter()
                    .map(|&(start, end, note)| DropEntry::range(start, end).note(note))
                    .collect(),
            );
        }
        &BUILTIN
    }

    /// Loads a drop table from JSON.
    ///
    /// The expected format is `{"version": 1, "entries": [{"start": "U+202E", "end":
    /// "U+202E"}]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: DropTable = serde_json::from_str(json)
            .invalid_drop_table("Could not parse drop table.")?;
        debug!("Loaded drop table version {} with {} entries.",
               table.version, table.entries.len());
        Ok(table)
    }

    /// Serializes this drop table to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).internal_err("Could not serialize drop table.")
    }

    /// Returns the version of this table.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the entries of this table, in the order they were defined.
    pub fn entries(&self) -> &[DropEntry] {
        &self.entries
    }

    /// Returns whether the given codepoint or UTF-16 code unit value is dropped.
    pub fn contains(&self, cp: u32) -> bool {
        let idx = match self.ranges.binary_search_by_key(&cp, |&(start, _)| start) {
            Ok(_) => return true,
            Err(0) => return false,
            Err(idx) => idx - 1,
        };
        cp <= self.ranges[idx].1
    }

    /// Returns whether the given character is dropped.
    pub fn contains_char(&self, c: char) -> bool {
        self.contains(c as u32)
    }

    /// Returns whether the given UTF-16 code unit is dropped.
    ///
    /// This is only meaningful for unpaired surrogates. Paired surrogates should be decoded and
    /// checked with [`DropTable::contains_char`].
    pub fn contains_unit(&self, unit: u16) -> bool {
        self.contains(unit as u32)
    }

    /// Removes every dropped character from a string.
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.chars().any(|c| self.contains_char(c)) {
            return Cow::Borrowed(text);
        }

        let before = text.chars().count();
        let stripped: String = text.chars().filter(|&c| !self.contains_char(c)).collect();
        debug!("Removed {} characters known to be dropped by Discord.",
               before - stripped.chars().count());
        Cow::Owned(stripped)
    }
}
impl Default for DropTable {
    fn default() -> Self {
        DropTable::builtin().clone()
    }
}
impl TryFrom<RawDropTable> for DropTable {
    type Error = Error;
    fn try_from(raw: RawDropTable) -> Result<Self> {
        DropTable::new(raw.version, raw.entries)
    }
}
