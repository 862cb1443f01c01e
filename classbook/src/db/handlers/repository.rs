//! Base repository trait for database operations.
//!
//! A repository is a data access layer over one SQLite table. Each one borrows a
//! connection (or a transaction, which derefs to one) for its lifetime, so several
//! repositories can be used in sequence inside a single transaction.

use crate::db::errors::Result;

/// Base repository trait providing the operations every table supports
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities matching the filter, in the repository's natural order
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;
}
