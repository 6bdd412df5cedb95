use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    BloodGroup, Id, lenient,
    validation::{Checker, ValidationErrors, optional_text},
};

/// Whether a donor can currently be contacted for a donation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Ready to donate.
    #[default]
    Available,
    /// Temporarily unable to donate.
    Unavailable,
}

impl Availability {
    /// The other state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Available => Self::Unavailable,
            Self::Unavailable => Self::Available,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Unique within the donor store.
    #[serde(default)]
    pub id: Id,
    /// Full name.
    pub name: String,
    /// Donor's blood group.
    pub blood_group: BloodGroup,
    /// Contact number.
    pub phone: String,
    /// City of residence.
    #[serde(
        default,
        deserialize_with = "lenient::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// Current availability.
    #[serde(default)]
    pub availability: Availability,
    /// When the donor was registered.
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
}

impl Donor {
    /// Whether `other` describes the same person: either the same identifier,
    /// or the same name and phone number.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id || (self.name == other.name && self.phone == other.phone)
    }
}

/// A donor as submitted for registration.
#[derive(Debug, Clone, Default)]
pub struct NewDonor {
    /// Required.
    pub name: String,
    /// Required.
    pub blood_group: Option<BloodGroup>,
    /// Required.
    pub phone: String,
    /// Optional.
    pub city: Option<String>,
    /// Defaults to available.
    pub availability: Availability,
}

impl NewDonor {
    /// Validate the candidate and build the stored record.
    ///
    /// # Errors
    ///
    /// Returns the list of missing required fields.
    pub fn into_donor(self, id: Id, created: DateTime<Utc>) -> Result<Donor, ValidationErrors> {
        let mut checker = Checker::default();
        let name = checker.text("name", self.name);
        let blood_group = checker.present("blood group", self.blood_group);
        let phone = checker.text("phone", self.phone);
        checker.finish()?;
        let blood_group = blood_group.ok_or_else(|| ValidationErrors::missing("blood group"))?;

        Ok(Donor {
            id,
            name,
            blood_group,
            phone,
            city: optional_text(self.city),
            availability: self.availability,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn candidate() -> NewDonor {
        NewDonor {
            name: "Asha Verma".to_string(),
            blood_group: Some(BloodGroup::APositive),
            phone: "+919876543210".to_string(),
            city: Some("New Delhi".to_string()),
            availability: Availability::Available,
        }
    }

    #[test]
    fn availability_toggles_between_two_states() {
        assert_eq!(Availability::Available.toggled(), Availability::Unavailable);
        assert_eq!(Availability::Unavailable.toggled(), Availability::Available);
    }

    #[test]
    fn empty_name_is_rejected() {
        let errors = NewDonor {
            name: String::new(),
            phone: "123".to_string(),
            ..candidate()
        }
        .into_donor(Id::from("d1"), Utc::now())
        .unwrap_err();

        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, "name");
    }

    #[test]
    fn missing_blood_group_alone_is_reported() {
        let errors = NewDonor {
            blood_group: None,
            ..candidate()
        }
        .into_donor(Id::from("d1"), Utc::now())
        .unwrap_err();

        assert_eq!(errors, ValidationErrors::missing("blood group"));
    }

    #[test]
    fn all_missing_fields_are_reported() {
        let errors = NewDonor::default()
            .into_donor(Id::from("d1"), Utc::now())
            .unwrap_err();
        let fields: Vec<_> = errors.fields().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "blood group", "phone"]);
    }

    #[test]
    fn identity_matches_on_id_or_name_and_phone() {
        let donor = candidate().into_donor(Id::from("d1"), Utc::now()).unwrap();
        let mut other = donor.clone();
        other.id = Id::from("d2");
        assert!(donor.same_identity(&other));

        other.phone = "000".to_string();
        assert!(!donor.same_identity(&other));

        other.id = Id::from("d1");
        assert!(donor.same_identity(&other));
    }

    #[test]
    fn reads_legacy_donor_without_created_or_availability() {
        let donor: Donor = serde_json::from_value(json!({
            "id": "d1",
            "name": "Asha Verma",
            "bloodGroup": "A+",
            "phone": "+919876543210",
        }))
        .unwrap();

        assert_eq!(donor.availability, Availability::Available);
        assert_eq!(donor.blood_group, BloodGroup::APositive);
        assert!(donor.city.is_none());
    }

    #[test]
    fn writes_camel_case_and_millisecond_timestamps() {
        let created = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let donor = candidate().into_donor(Id::from("d1"), created).unwrap();
        let value = serde_json::to_value(&donor).unwrap();

        assert_eq!(value["bloodGroup"], json!("A+"));
        assert_eq!(value["availability"], json!("available"));
        assert_eq!(value["created"], json!(1_700_000_000_000_i64));
    }
}
