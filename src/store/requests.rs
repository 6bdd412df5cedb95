use chrono::Utc;

use super::{Store, replace_one};
use crate::{
    Error,
    domain::{Id, IdKind, NewRequest, Request, RequestStatus},
    error::Result,
    storage::{Backend, Key},
};

impl<B: Backend> Store<B> {
    /// Every request, open or fulfilled, in the order raised.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.load(Key::Requests, Vec::new())
    }

    /// Look up a request by identifier.
    #[must_use]
    pub fn request(&self, id: &Id) -> Option<Request> {
        self.requests().into_iter().find(|r| &r.id == id)
    }

    /// Open requests, newest first, optionally filtered by a case-insensitive
    /// substring of the blood group or city.
    #[must_use]
    pub fn list_requests(&self, search: Option<&str>) -> Vec<Request> {
        let mut open: Vec<_> = self
            .requests()
            .into_iter()
            .filter(Request::is_open)
            .filter(|r| search.is_none_or(|needle| r.matches_search(needle)))
            .collect();
        open.sort_by(|a, b| b.created.cmp(&a.created));
        open
    }

    /// The most recent open requests, up to the configured limit.
    #[must_use]
    pub fn recent_requests(&self) -> Vec<Request> {
        let mut open = self.list_requests(None);
        open.truncate(self.config.recent_limit);
        open
    }

    /// Raise a new open request.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the name, blood group or phone is
    /// missing.
    pub fn add_request(&mut self, candidate: NewRequest) -> Result<Request> {
        let mut requests = self.requests();
        let id = Id::generate_unique(IdKind::Request, |id| requests.iter().any(|r| &r.id == id));
        let request = candidate.into_request(id, Utc::now())?;

        requests.push(request.clone());
        self.persist(Key::Requests, &requests);
        self.touch();

        tracing::info!(
            "raised request {} for {} unit(s) of {}",
            request.id,
            request.units,
            request.blood_group
        );
        Ok(request)
    }

    /// Mark a request as fulfilled.
    ///
    /// Bank stock is not touched. Fulfilling an already fulfilled request
    /// succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the request does not exist.
    pub fn fulfill_request(&mut self, id: &Id) -> Result<Request> {
        let requests = self.requests();
        let existing = requests
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::RequestNotFound(id.clone()))?;
        if !existing.is_open() {
            return Ok(existing.clone());
        }

        let (requests, request) = replace_one(
            &requests,
            |r| &r.id == id,
            |r| Request {
                status: RequestStatus::Fulfilled,
                ..r.clone()
            },
        )
        .ok_or_else(|| Error::RequestNotFound(id.clone()))?;

        self.persist(Key::Requests, &requests);
        self.touch();

        tracing::info!("request {id} fulfilled");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{BloodGroup, Dataset};

    fn candidate(group: BloodGroup, city: Option<&str>) -> NewRequest {
        NewRequest {
            name: "Rahul Jain".to_string(),
            blood_group: Some(group),
            phone: "+919999999999".to_string(),
            units: 2,
            city: city.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn new_request_is_open_with_id() {
        let mut store = Store::in_memory();
        let request = store
            .add_request(candidate(BloodGroup::APositive, None))
            .unwrap();

        assert!(request.is_open());
        assert!(request.id.as_str().starts_with('r'));
        assert_eq!(store.requests(), [request]);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut store = Store::in_memory();
        let result = store.add_request(NewRequest {
            blood_group: None,
            ..candidate(BloodGroup::APositive, None)
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn fulfilment_is_monotonic() {
        let mut store = Store::in_memory();
        let request = store
            .add_request(candidate(BloodGroup::OPositive, None))
            .unwrap();

        let fulfilled = store.fulfill_request(&request.id).unwrap();
        assert_eq!(fulfilled.status, RequestStatus::Fulfilled);

        let again = store.fulfill_request(&request.id).unwrap();
        assert_eq!(again.status, RequestStatus::Fulfilled);
        assert_eq!(store.requests().len(), 1);
    }

    #[test]
    fn fulfilling_unknown_request_fails() {
        let mut store = Store::in_memory();
        assert_eq!(
            store.fulfill_request(&Id::from("r404")),
            Err(Error::RequestNotFound(Id::from("r404")))
        );
    }

    #[test]
    fn listing_is_open_only_newest_first_and_searchable() {
        let mut store = Store::in_memory();
        let base = Utc::now();
        let mut requests = Vec::new();
        for (i, (group, city)) in [
            (BloodGroup::APositive, "New Delhi"),
            (BloodGroup::BNegative, "Noida"),
            (BloodGroup::AbPositive, "Gurgaon"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut request = candidate(group, Some(city))
                .into_request(Id::from(format!("r{i}")), base + Duration::minutes(i64::try_from(i).unwrap()))
                .unwrap();
            if i == 2 {
                request.status = RequestStatus::Fulfilled;
            }
            requests.push(request);
        }
        store.merge(Dataset {
            requests,
            ..Dataset::default()
        });

        let ids: Vec<_> = store
            .list_requests(None)
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, ["r1", "r0"]);

        let noida = store.list_requests(Some("NOIDA"));
        assert_eq!(noida.len(), 1);
        assert_eq!(noida[0].blood_group, BloodGroup::BNegative);

        assert_eq!(store.list_requests(Some("a+")).len(), 1);
        assert!(store.list_requests(Some("gurgaon")).is_empty());
    }

    #[test]
    fn recent_requests_respects_limit() {
        let mut store = Store::in_memory();
        for _ in 0..8 {
            store
                .add_request(candidate(BloodGroup::OPositive, None))
                .unwrap();
        }

        assert_eq!(store.recent_requests().len(), store.config().recent_limit);
    }
}
