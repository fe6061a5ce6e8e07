use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// A product listing as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: Uuid,
    pub name: String,
    /// Unit price, never negative.
    pub price: f64,
    pub description: String,
    /// Units in stock. The product counts as available while this is above zero.
    pub quantity: i32,
    /// Opaque reference handed out by the image store.
    pub image_url: String,
    /// Owning user. Not checked against the user collection.
    pub farmer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new `Product` from validated input, the stored image reference and its owner.
    pub fn new(input: ProductInput, image_url: String, farmer_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            price: input.price,
            description: input.description,
            quantity: input.quantity,
            image_url,
            farmer_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// Fields of a create request, read from the multipart form.
#[derive(Debug, Clone, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    /// Explicit owner. Defaults to the authenticated caller when absent.
    pub farmer_id: Option<Uuid>,
}

impl ProductInput {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let input = Self {
            name: required(fields, "name")?.trim().to_string(),
            price: parse_price(required(fields, "price")?)?,
            description: required(fields, "description")?.trim().to_string(),
            quantity: parse_quantity(required(fields, "quantity")?)?,
            farmer_id: optional(fields, "farmerId").map(parse_uuid).transpose()?,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Fields of an update request. Absent fields keep their stored values;
/// present ones are checked like on create, so a blank `name` is rejected.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: Option<i32>,
}

impl ProductUpdate {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let update = Self {
            name: present(fields, "name").map(|v| v.trim().to_string()),
            price: present(fields, "price").map(parse_price).transpose()?,
            description: present(fields, "description").map(|v| v.trim().to_string()),
            quantity: present(fields, "quantity").map(parse_quantity).transpose()?,
        };
        update.validate()?;
        Ok(update)
    }

    /// Combines the field changes with an optional replacement image.
    pub fn into_changes(self, image_url: Option<String>) -> ProductChanges {
        ProductChanges {
            name: self.name,
            price: self.price,
            description: self.description,
            quantity: self.quantity,
            image_url,
        }
    }
}

/// A partial replacement applied by a store.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub image_url: Option<String>,
}

impl ProductChanges {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
        product.updated_at = Utc::now();
    }
}

fn required<'a>(fields: &'a HashMap<String, String>, key: &str) -> Result<&'a str, AppError> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::ValidationError(format!("{} is required", key)))
}

fn present<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields.get(key).map(String::as_str)
}

/// Browsers submit empty strings for untouched inputs; those count as absent.
fn optional<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

pub(crate) fn parse_price(raw: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(AppError::ValidationError(format!(
            "price must be a number, got '{}'",
            raw
        ))),
    }
}

fn parse_quantity(raw: &str) -> Result<i32, AppError> {
    raw.trim().parse::<i32>().map_err(|_| {
        AppError::ValidationError(format!("quantity must be a whole number, got '{}'", raw))
    })
}

fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::ValidationError(format!("farmerId is not a valid id: '{}'", raw)))
}
