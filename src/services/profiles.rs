//! Client profile service
//!
//! Orchestrates store lookups, applies partial-update semantics and maps
//! persisted rows to response DTOs.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::profiles::{ClientProfile, ClientProfileResponse, UpdateClientProfileRequest};
use crate::error::{ApiError, ApiResult};
use crate::store::ProfileStore;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetch a profile by its email
    pub async fn get_profile(&self, email: &str) -> ApiResult<ClientProfileResponse> {
        tracing::debug!(email, "Looking up client profile");

        let profile = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::ProfileNotFound(email.to_string()))?;

        Ok(profile.into())
    }

    /// Apply a partial update to the profile identified by `email`.
    ///
    /// Fields absent from the request keep their stored values. `updated_at`
    /// advances on every call, even when no field is supplied.
    pub async fn update_profile(
        &self,
        email: &str,
        request: UpdateClientProfileRequest,
    ) -> ApiResult<ClientProfileResponse> {
        tracing::info!(email, "Updating client profile");

        let mut profile = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::ProfileNotFound(email.to_string()))?;

        if let Some(new_email) = request.email {
            // Reject an email already owned by another record before
            // writing; the store's unique index remains the backstop.
            if new_email != profile.email
                && self.store.find_by_email(&new_email).await?.is_some()
            {
                return Err(ApiError::DuplicateEmail(new_email));
            }
            profile.email = new_email;
        }
        if let Some(phone) = request.phone {
            profile.phone = phone;
        }
        if let Some(birth_date) = request.birth_date {
            profile.birth_date = birth_date;
        }
        if let Some(first_name) = request.first_name {
            profile.first_name = Some(first_name);
        }
        if let Some(last_name) = request.last_name {
            profile.last_name = Some(last_name);
        }
        if let Some(middle_name) = request.middle_name {
            profile.middle_name = Some(middle_name);
        }

        profile.updated_at = Utc::now().naive_utc();

        let updated = self.store.upsert(profile).await?;
        tracing::info!(email, "Client profile updated");

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use parking_lot::Mutex;
    use uuid::Uuid;

    /// In-memory store standing in for PostgreSQL
    #[derive(Default)]
    struct InMemoryStore {
        profiles: Mutex<Vec<ClientProfile>>,
        writes: Mutex<usize>,
    }

    impl InMemoryStore {
        fn seeded(profiles: Vec<ClientProfile>) -> Arc<Self> {
            Arc::new(Self {
                profiles: Mutex::new(profiles),
                writes: Mutex::new(0),
            })
        }

        fn stored(&self, email: &str) -> Option<ClientProfile> {
            self.profiles
                .lock()
                .iter()
                .find(|p| p.email == email)
                .cloned()
        }

        fn write_count(&self) -> usize {
            *self.writes.lock()
        }
    }

    #[async_trait]
    impl ProfileStore for InMemoryStore {
        async fn find_by_email(&self, email: &str) -> ApiResult<Option<ClientProfile>> {
            Ok(self
                .profiles
                .lock()
                .iter()
                .find(|p| p.email == email)
                .cloned())
        }

        async fn upsert(&self, profile: ClientProfile) -> ApiResult<ClientProfile> {
            *self.writes.lock() += 1;

            let mut profiles = self.profiles.lock();
            if profiles
                .iter()
                .any(|p| p.id != profile.id && p.email == profile.email)
            {
                return Err(ApiError::DuplicateEmail(profile.email));
            }

            match profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(slot) => *slot = profile.clone(),
                None => profiles.push(profile.clone()),
            }

            Ok(profile)
        }
    }

    fn sample_profile(email: &str) -> ClientProfile {
        let yesterday = Utc::now().naive_utc() - Duration::days(1);
        ClientProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: Some("Ann".to_string()),
            last_name: Some("Smith".to_string()),
            middle_name: None,
            email: email.to_string(),
            phone: "111".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            created_at: yesterday,
            updated_at: yesterday,
        }
    }

    fn service_with(profiles: Vec<ClientProfile>) -> (ProfileService, Arc<InMemoryStore>) {
        let store = InMemoryStore::seeded(profiles);
        (ProfileService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn get_profile_returns_the_stored_fields() {
        let profile = sample_profile("a@x.com");
        let (service, _) = service_with(vec![profile.clone()]);

        let response = service.get_profile("a@x.com").await.unwrap();

        assert_eq!(response.id, profile.id);
        assert_eq!(response.user_id, profile.user_id);
        assert_eq!(response.email, "a@x.com");
        assert_eq!(response.phone, "111");
        assert_eq!(response.first_name.as_deref(), Some("Ann"));
        assert_eq!(response.birth_date, profile.birth_date);
        assert_eq!(response.created_at, profile.created_at);
        assert_eq!(response.updated_at, profile.updated_at);
    }

    #[tokio::test]
    async fn get_profile_for_unknown_email_is_not_found_and_writes_nothing() {
        let (service, store) = service_with(vec![]);

        let err = service.get_profile("missing@x.com").await.unwrap_err();

        match err {
            ApiError::ProfileNotFound(email) => assert_eq!(email, "missing@x.com"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn update_overwrites_only_the_supplied_fields() {
        let profile = sample_profile("a@x.com");
        let t0 = profile.updated_at;
        let (service, store) = service_with(vec![profile.clone()]);

        let request = UpdateClientProfileRequest {
            phone: Some("222".to_string()),
            ..Default::default()
        };
        let response = service.update_profile("a@x.com", request).await.unwrap();

        assert_eq!(response.phone, "222");
        assert_eq!(response.first_name.as_deref(), Some("Ann"));
        assert_eq!(response.last_name.as_deref(), Some("Smith"));
        assert_eq!(response.birth_date, profile.birth_date);
        assert!(response.updated_at > t0);

        let stored = store.stored("a@x.com").unwrap();
        assert_eq!(stored.phone, "222");
        assert_eq!(stored.first_name.as_deref(), Some("Ann"));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn update_never_touches_id_user_id_or_created_at() {
        let profile = sample_profile("a@x.com");
        let (service, _) = service_with(vec![profile.clone()]);

        let request = UpdateClientProfileRequest {
            first_name: Some("Bea".to_string()),
            last_name: Some("Jones".to_string()),
            middle_name: Some("May".to_string()),
            email: Some("b@x.com".to_string()),
            phone: Some("333".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1999, 12, 31),
        };
        let response = service.update_profile("a@x.com", request).await.unwrap();

        assert_eq!(response.id, profile.id);
        assert_eq!(response.user_id, profile.user_id);
        assert_eq!(response.created_at, profile.created_at);
        assert_eq!(response.email, "b@x.com");
        assert_eq!(response.middle_name.as_deref(), Some("May"));
    }

    #[tokio::test]
    async fn empty_update_still_advances_updated_at() {
        let profile = sample_profile("a@x.com");
        let t0 = profile.updated_at;
        let (service, store) = service_with(vec![profile]);

        let response = service
            .update_profile("a@x.com", UpdateClientProfileRequest::default())
            .await
            .unwrap();

        assert!(response.updated_at > t0);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn repeating_a_full_update_yields_the_same_field_values() {
        let (service, _) = service_with(vec![sample_profile("a@x.com")]);

        let request = UpdateClientProfileRequest {
            first_name: Some("Bea".to_string()),
            last_name: Some("Jones".to_string()),
            middle_name: Some("May".to_string()),
            email: Some("a@x.com".to_string()),
            phone: Some("333".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1999, 12, 31),
        };
        let first = service
            .update_profile("a@x.com", request.clone())
            .await
            .unwrap();
        let second = service.update_profile("a@x.com", request).await.unwrap();

        assert_eq!(first.first_name, second.first_name);
        assert_eq!(first.last_name, second.last_name);
        assert_eq!(first.middle_name, second.middle_name);
        assert_eq!(first.email, second.email);
        assert_eq!(first.phone, second.phone);
        assert_eq!(first.birth_date, second.birth_date);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn update_for_unknown_email_is_not_found_and_writes_nothing() {
        let (service, store) = service_with(vec![sample_profile("a@x.com")]);

        let err = service
            .update_profile("missing@x.com", UpdateClientProfileRequest::default())
            .await
            .unwrap_err();

        match err {
            ApiError::ProfileNotFound(email) => assert_eq!(email, "missing@x.com"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn changing_email_to_one_already_in_use_conflicts() {
        let first = sample_profile("a@x.com");
        let second = sample_profile("b@x.com");
        let (service, store) = service_with(vec![first.clone(), second]);

        let request = UpdateClientProfileRequest {
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };
        let err = service.update_profile("a@x.com", request).await.unwrap_err();

        match err {
            ApiError::DuplicateEmail(email) => assert_eq!(email, "b@x.com"),
            other => panic!("unexpected error: {other:?}"),
        }
        // Rejected before the write, store left untouched
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.stored("a@x.com").unwrap().email, first.email);
    }

    #[tokio::test]
    async fn resubmitting_the_current_email_is_not_a_conflict() {
        let (service, _) = service_with(vec![sample_profile("a@x.com")]);

        let request = UpdateClientProfileRequest {
            email: Some("a@x.com".to_string()),
            phone: Some("444".to_string()),
            ..Default::default()
        };
        let response = service.update_profile("a@x.com", request).await.unwrap();

        assert_eq!(response.email, "a@x.com");
        assert_eq!(response.phone, "444");
    }
}
