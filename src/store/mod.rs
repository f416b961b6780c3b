//! Profile persistence
//!
//! The store is injected into the service as a trait object so tests can
//! substitute an in-memory implementation.

pub mod postgres;

pub use postgres::PgProfileStore;

use async_trait::async_trait;

use crate::domain::profiles::ClientProfile;
use crate::error::ApiResult;

/// Durable keyed storage for client profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile by its unique email
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<ClientProfile>>;

    /// Insert or update a profile keyed by id, returning the persisted row
    async fn upsert(&self, profile: ClientProfile) -> ApiResult<ClientProfile>;
}
