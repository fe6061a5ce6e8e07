//! Persistence seam for users and products.
//!
//! Handlers and the credential manager only see these traits. `PgStore` backs
//! them with PostgreSQL through a `sqlx` pool; `MemoryStore` keeps everything
//! in process and is used when no database is configured and in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::filter::ProductFilter;
use crate::models::{Product, ProductChanges, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with `AppError::Conflict` when the username is taken.
    async fn insert_user(&self, user: User) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: Product) -> Result<Product, AppError>;

    /// Returns every product matching `filter`. Order is unspecified.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// Applies `changes` to the product. `Ok(None)` when `id` does not exist.
    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<Product>, AppError>;

    /// Removes the product. `Ok(false)` when `id` does not exist.
    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError>;
}

/// A complete backend with an explicit lifecycle.
#[async_trait]
pub trait Store: UserStore + ProductStore {
    /// Short name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Releases connections. Called once at shutdown.
    async fn close(&self);
}
