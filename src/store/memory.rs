use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProductStore, Store, UserStore};
use crate::error::AppError;
use crate::filter::ProductFilter;
use crate::models::{Product, ProductChanges, User};

/// Process-local store. Collections keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| product.id == id).cloned())
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        Ok(products
            .iter_mut()
            .find(|product| product.id == id)
            .map(|product| {
                changes.apply(product);
                product.clone()
            }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| product.id != id);
        Ok(products.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductInput, Role};

    fn product(price: f64, quantity: i32) -> Product {
        let input = ProductInput {
            name: "Apples".into(),
            price,
            description: "Crisp".into(),
            quantity,
            farmer_id: None,
        };
        Product::new(input, "memory://apples.png".into(), Uuid::new_v4())
    }

    #[actix_rt::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_user(User::new("bob".into(), "hash".into(), Role::Consumer))
            .await
            .unwrap();

        let result = store
            .insert_user(User::new("bob".into(), "other".into(), Role::Farmer))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.user_count().await, 1);
    }

    #[actix_rt::test]
    async fn test_product_lifecycle() {
        let store = MemoryStore::new();
        let created = store.insert_product(product(3.0, 4)).await.unwrap();

        let found = store.find_product(created.id).await.unwrap();
        assert_eq!(found.as_ref().map(|p| p.id), Some(created.id));

        let changes = ProductChanges {
            price: Some(4.5),
            ..Default::default()
        };
        let updated = store
            .update_product(created.id, changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 4.5);
        assert_eq!(updated.image_url, created.image_url);

        assert!(store.delete_product(created.id).await.unwrap());
        assert!(!store.delete_product(created.id).await.unwrap());
        assert!(store.find_product(created.id).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_missing_product_update_is_none() {
        let store = MemoryStore::new();
        let result = store
            .update_product(Uuid::new_v4(), ProductChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[actix_rt::test]
    async fn test_list_applies_filter() {
        let store = MemoryStore::new();
        for (price, quantity) in [(5.0, 0), (10.0, 2), (15.0, 0)] {
            store.insert_product(product(price, quantity)).await.unwrap();
        }

        let available = ProductFilter {
            available: Some(true),
            ..Default::default()
        };
        let listed = store.list_products(&available).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].price, 10.0);

        let all = store.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
