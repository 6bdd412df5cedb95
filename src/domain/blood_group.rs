use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};

use crate::domain::lenient::LenientCount;

/// One of the eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BloodGroup {
    /// A positive
    #[serde(rename = "A+")]
    APositive,
    /// A negative
    #[serde(rename = "A-")]
    ANegative,
    /// B positive
    #[serde(rename = "B+")]
    BPositive,
    /// B negative
    #[serde(rename = "B-")]
    BNegative,
    /// O positive
    #[serde(rename = "O+")]
    OPositive,
    /// O negative
    #[serde(rename = "O-")]
    ONegative,
    /// AB positive
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    /// Every blood group, in display order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::OPositive,
        Self::ONegative,
        Self::AbPositive,
        Self::AbNegative,
    ];

    /// The canonical label, e.g. `"AB-"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalised)
            .ok_or_else(|| UnknownBloodGroup(s.to_string()))
    }
}

/// Labels are read the same way [`FromStr`] parses them, so hand-edited
/// records such as `"ab-"` load.
impl<'de> Deserialize<'de> for BloodGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

/// Error returned when a string is not one of the eight blood group labels.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown blood group '{0}': expected one of A+, A-, B+, B-, O+, O-, AB+, AB-")]
pub struct UnknownBloodGroup(String);

/// Units held per blood group.
///
/// The domain is fixed: every one of the eight groups always has a count, and
/// counts are never negative.
///
/// On the wire this is a JSON object keyed by blood group label. Reading is
/// tolerant of hand-edited data: missing or non-numeric counts read as zero,
/// negative counts clamp to zero and unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory([u32; 8]);

impl Inventory {
    /// Units held for `group`.
    #[must_use]
    pub const fn get(&self, group: BloodGroup) -> u32 {
        self.0[group.index()]
    }

    /// Overwrite the units held for `group`.
    pub const fn set(&mut self, group: BloodGroup, units: u32) {
        self.0[group.index()] = units;
    }

    /// Returns a copy with `units` held for `group`.
    #[must_use]
    pub const fn with(mut self, group: BloodGroup, units: u32) -> Self {
        self.set(group, units);
        self
    }

    /// Returns a copy with `units` removed from `group`, or `None` if fewer
    /// than `units` are held.
    #[must_use]
    pub fn checked_take(&self, group: BloodGroup, units: u32) -> Option<Self> {
        let remaining = self.get(group).checked_sub(units)?;
        Some(self.with(group, remaining))
    }

    /// Iterate over every group and its count, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (BloodGroup, u32)> + '_ {
        BloodGroup::ALL
            .into_iter()
            .map(|group| (group, self.get(group)))
    }

    /// Sum of units across all groups.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&units| u64::from(units)).sum()
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(BloodGroup::ALL.len()))?;
        for (group, units) in self.iter() {
            map.serialize_entry(group.as_str(), &units)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, LenientCount>::deserialize(deserializer)?;
        let mut inventory = Self::default();
        for (label, count) in raw {
            if let Ok(group) = label.parse::<BloodGroup>() {
                inventory.set(group, count.to_count().unwrap_or(0));
            }
        }
        Ok(inventory)
    }
}

/// Per-group totals, such as aggregate stock or open demand.
pub type GroupTotals = BTreeMap<BloodGroup, u64>;

/// A [`GroupTotals`] with every group present at zero.
#[must_use]
pub fn zeroed_totals() -> GroupTotals {
    BloodGroup::ALL.into_iter().map(|group| (group, 0)).collect()
}
