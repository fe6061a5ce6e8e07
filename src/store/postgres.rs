use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ProductStore, Store, UserStore};
use crate::error::AppError;
use crate::filter::ProductFilter;
use crate::models::{Product, ProductChanges, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";
const PRODUCT_COLUMNS: &str =
    "id, name, price, description, quantity, image_url, farmer_id, created_at, updated_at";

/// PostgreSQL-backed store. The `users.username` unique index enforces
/// username uniqueness even for racing registrations.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Renders the filter as a `WHERE` clause. Price bounds become positional
/// parameters starting at `$1`, min before max.
pub(crate) fn where_clause(filter: &ProductFilter) -> String {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_count = 1;

    if filter.min_price.is_some() {
        conditions.push(format!("price >= ${}", param_count));
        param_count += 1;
    }
    if filter.max_price.is_some() {
        conditions.push(format!("price <= ${}", param_count));
    }
    match filter.available {
        Some(true) => conditions.push("quantity > 0".to_string()),
        Some(false) => conditions.push("quantity = 0".to_string()),
        None => {}
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        let sql = format!(
            "INSERT INTO products ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {cols}",
            cols = PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(product.quantity)
            .bind(&product.image_url)
            .bind(product.farmer_id)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let sql = format!(
            "SELECT {} FROM products{}",
            PRODUCT_COLUMNS,
            where_clause(filter)
        );

        let mut query_builder = sqlx::query_as::<_, Product>(&sql);
        if let Some(min_price) = filter.min_price {
            query_builder = query_builder.bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query_builder = query_builder.bind(max_price);
        }

        let products = query_builder.fetch_all(&self.pool).await?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let sql = format!(
            "UPDATE products
             SET name = COALESCE($1, name),
                 price = COALESCE($2, price),
                 description = COALESCE($3, description),
                 quantity = COALESCE($4, quantity),
                 image_url = COALESCE($5, image_url),
                 updated_at = NOW()
             WHERE id = $6
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(changes.name)
            .bind(changes.price)
            .bind(changes.description)
            .bind(changes.quantity)
            .bind(changes.image_url)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
