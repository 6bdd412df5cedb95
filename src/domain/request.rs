use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodGroup, Id, lenient,
    validation::{Checker, ValidationErrors, optional_text},
};

/// Progress of a blood request.
///
/// Requests only ever move from open to fulfilled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Still needs units.
    #[default]
    Open,
    /// Resolved.
    Fulfilled,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Fulfilled => f.write_str("fulfilled"),
        }
    }
}

/// A request for blood on behalf of a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique within the request store.
    #[serde(default)]
    pub id: Id,
    /// Patient or contact name.
    pub name: String,
    /// Blood group needed.
    pub blood_group: BloodGroup,
    /// Contact number.
    pub phone: String,
    /// Units still needed.
    #[serde(default = "one", deserialize_with = "lenient::units")]
    pub units: u32,
    /// City where the blood is needed.
    #[serde(
        default,
        deserialize_with = "lenient::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// Free-form notes, e.g. ward or urgency.
    #[serde(
        default,
        deserialize_with = "lenient::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    /// Open until fulfilled.
    #[serde(default)]
    pub status: RequestStatus,
    /// When the request was raised.
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
}

const fn one() -> u32 {
    1
}

impl Request {
    /// Whether the request still needs units.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }

    /// Case-insensitive substring match on blood group or city.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.blood_group.as_str().to_lowercase().contains(&needle)
            || self
                .city
                .as_deref()
                .is_some_and(|city| city.to_lowercase().contains(&needle))
    }
}

/// A request as submitted by a caller.
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// Required.
    pub name: String,
    /// Required.
    pub blood_group: Option<BloodGroup>,
    /// Required.
    pub phone: String,
    /// Units needed.
    pub units: u32,
    /// Optional.
    pub city: Option<String>,
    /// Optional.
    pub notes: Option<String>,
}

impl Default for NewRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            blood_group: None,
            phone: String::new(),
            units: one(),
            city: None,
            notes: None,
        }
    }
}

impl NewRequest {
    /// Validate the candidate and build an open request.
    ///
    /// # Errors
    ///
    /// Returns the list of missing required fields.
    pub fn into_request(
        self,
        id: Id,
        created: DateTime<Utc>,
    ) -> Result<Request, ValidationErrors> {
        let mut checker = Checker::default();
        let name = checker.text("name", self.name);
        let blood_group = checker.present("blood group", self.blood_group);
        let phone = checker.text("phone", self.phone);
        checker.finish()?;
        let blood_group = blood_group.ok_or_else(|| ValidationErrors::missing("blood group"))?;

        Ok(Request {
            id,
            name,
            blood_group,
            phone,
            units: self.units,
            city: optional_text(self.city),
            notes: optional_text(self.notes),
            status: RequestStatus::Open,
            created,
        })
    }
}
