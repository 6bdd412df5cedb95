use chrono::Utc;

use super::{Store, replace_one};
use crate::{
    Error,
    domain::{BloodGroup, Donor, Id, IdKind, NewDonor},
    error::Result,
    storage::{Backend, Key},
};

impl<B: Backend> Store<B> {
    /// Every donor, in registration order.
    #[must_use]
    pub fn donors(&self) -> Vec<Donor> {
        self.load(Key::Donors, Vec::new())
    }

    /// Donors filtered by blood group and by a case-insensitive substring of
    /// their city. Donors without a city never match a city filter.
    #[must_use]
    pub fn list_donors(&self, blood_group: Option<BloodGroup>, city: Option<&str>) -> Vec<Donor> {
        let city = city.map(str::to_lowercase).filter(|c| !c.is_empty());
        self.donors()
            .into_iter()
            .filter(|d| blood_group.is_none_or(|group| d.blood_group == group))
            .filter(|d| {
                city.as_deref().is_none_or(|needle| {
                    d.city
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(needle))
                })
            })
            .collect()
    }

    /// Register a donor.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the name, blood group or phone is
    /// missing.
    pub fn add_donor(&mut self, candidate: NewDonor) -> Result<Donor> {
        let mut donors = self.donors();
        let id = Id::generate_unique(IdKind::Donor, |id| donors.iter().any(|d| &d.id == id));
        let donor = candidate.into_donor(id, Utc::now())?;

        donors.push(donor.clone());
        self.persist(Key::Donors, &donors);
        self.touch();

        tracing::info!("registered donor {} ({})", donor.id, donor.blood_group);
        Ok(donor)
    }

    /// Flip a donor between available and unavailable.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the donor does not exist.
    pub fn toggle_donor_availability(&mut self, id: &Id) -> Result<Donor> {
        let (donors, donor) = replace_one(
            &self.donors(),
            |d| &d.id == id,
            |d| Donor {
                availability: d.availability.toggled(),
                ..d.clone()
            },
        )
        .ok_or_else(|| Error::DonorNotFound(id.clone()))?;

        self.persist(Key::Donors, &donors);
        self.touch();

        tracing::info!("donor {id} is now {}", donor.availability);
        Ok(donor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Availability;

    fn donor(name: &str, group: BloodGroup, city: Option<&str>) -> NewDonor {
        NewDonor {
            name: name.to_string(),
            blood_group: Some(group),
            phone: "123".to_string(),
            city: city.map(str::to_string),
            availability: Availability::Available,
        }
    }

    #[test]
    fn empty_name_is_rejected_and_store_unchanged() {
        let mut store = Store::in_memory();
        store
            .add_donor(donor("Asha Verma", BloodGroup::APositive, None))
            .unwrap();

        let result = store.add_donor(donor("", BloodGroup::APositive, None));

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.donors().len(), 1);
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let mut store = Store::in_memory();
        let asha = store
            .add_donor(donor("Asha", BloodGroup::APositive, None))
            .unwrap();
        let ravi = store
            .add_donor(donor("Ravi", BloodGroup::BPositive, None))
            .unwrap();

        let toggled = store.toggle_donor_availability(&asha.id).unwrap();
        assert_eq!(toggled.availability, Availability::Unavailable);
        assert_eq!(store.donors()[1], ravi);

        let toggled = store.toggle_donor_availability(&asha.id).unwrap();
        assert_eq!(toggled.availability, Availability::Available);
    }

    #[test]
    fn hand_edited_labels_survive_a_registration() {
        let mut store = Store::in_memory();
        store.backend_mut().insert_raw(
            "bdi_donors",
            r#"[
                {"id": "d1", "name": "Asha", "bloodGroup": "A+", "phone": "1"},
                {"id": "d2", "name": "Ravi", "bloodGroup": "a+", "phone": "2"},
                {"id": "d3", "name": "Meera", "bloodGroup": "O-", "phone": "3"}
            ]"#,
        );

        store
            .add_donor(donor("Kiran", BloodGroup::BPositive, None))
            .unwrap();

        let donors = store.donors();
        assert_eq!(donors.len(), 4);
        assert_eq!(donors[1].blood_group, BloodGroup::APositive);
        assert!(store.take_faults().is_empty());
    }

    #[test]
    fn toggling_unknown_donor_fails() {
        let mut store = Store::in_memory();
        assert_eq!(
            store.toggle_donor_availability(&Id::from("d404")),
            Err(Error::DonorNotFound(Id::from("d404")))
        );
    }

    #[test]
    fn list_filters_by_group_and_city() {
        let mut store = Store::in_memory();
        store
            .add_donor(donor("Asha", BloodGroup::APositive, Some("New Delhi")))
            .unwrap();
        store
            .add_donor(donor("Ravi", BloodGroup::APositive, Some("Noida")))
            .unwrap();
        store
            .add_donor(donor("Meera", BloodGroup::ONegative, None))
            .unwrap();

        assert_eq!(store.list_donors(None, None).len(), 3);
        assert_eq!(store.list_donors(Some(BloodGroup::APositive), None).len(), 2);

        let delhi = store.list_donors(Some(BloodGroup::APositive), Some("DELHI"));
        assert_eq!(delhi.len(), 1);
        assert_eq!(delhi[0].name, "Asha");

        assert!(store.list_donors(Some(BloodGroup::ONegative), Some("noida")).is_empty());
        assert_eq!(store.list_donors(None, Some("")).len(), 3);
    }
}
