//! Translation of the optional product query parameters into a store predicate.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{product::parse_price, Product};

/// Raw query string of `GET /api/products/filter`.
///
/// Values stay strings here so that malformed numbers produce a JSON
/// validation error instead of an extractor failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub available: Option<String>,
}

/// A conjunction of optional constraints over products.
/// The default value matches every product.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductFilter {
    /// `price >= min_price`
    pub min_price: Option<f64>,
    /// `price <= max_price`
    pub max_price: Option<f64>,
    /// `Some(true)`: `quantity > 0`, `Some(false)`: `quantity == 0`.
    pub available: Option<bool>,
}

impl FilterQuery {
    pub fn into_filter(self) -> Result<ProductFilter, AppError> {
        Ok(ProductFilter {
            min_price: price_bound(self.min_price.as_deref())?,
            max_price: price_bound(self.max_price.as_deref())?,
            // Any value other than "true" asks for sold-out products.
            available: self.available.map(|value| value == "true"),
        })
    }
}

fn price_bound(raw: Option<&str>) -> Result<Option<f64>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_price(value).map(Some),
    }
}

impl ProductFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.min_price.is_none() && self.max_price.is_none() && self.available.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        match self.available {
            Some(true) => product.quantity > 0,
            Some(false) => product.quantity == 0,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductInput;
    use uuid::Uuid;

    fn product(price: f64, quantity: i32) -> Product {
        let input = ProductInput {
            name: format!("item-{}", price),
            price,
            description: "test".into(),
            quantity,
            farmer_id: None,
        };
        Product::new(input, "uploads/x.png".into(), Uuid::new_v4())
    }

    fn prices(filter: &ProductFilter, products: &[Product]) -> Vec<f64> {
        products
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.price)
            .collect()
    }

    fn query(min: Option<&str>, max: Option<&str>, available: Option<&str>) -> ProductFilter {
        FilterQuery {
            min_price: min.map(String::from),
            max_price: max.map(String::from),
            available: available.map(String::from),
        }
        .into_filter()
        .unwrap()
    }

    #[test]
    fn test_filter_over_sample_catalogue() {
        let products = [product(5.0, 0), product(10.0, 2), product(15.0, 0)];

        assert_eq!(prices(&query(Some("6"), None, None), &products), [10.0, 15.0]);
        assert_eq!(prices(&query(None, None, Some("true")), &products), [10.0]);
        assert_eq!(prices(&query(None, None, Some("false")), &products), [5.0, 15.0]);
        assert_eq!(
            prices(&query(Some("5"), Some("10"), None), &products),
            [5.0, 10.0],
            "bounds are inclusive"
        );
        assert_eq!(
            prices(&query(None, None, None), &products),
            [5.0, 10.0, 15.0]
        );
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let products = [product(5.0, 1), product(10.0, 1)];
        assert!(prices(&query(Some("9"), Some("6"), None), &products).is_empty());
    }

    #[test]
    fn test_query_parsing() {
        assert!(query(None, None, None).is_unconstrained());
        assert!(query(Some(""), Some("  "), None).is_unconstrained());
        assert_eq!(query(None, None, Some("yes")).available, Some(false));

        let bad = FilterQuery {
            min_price: Some("cheap".into()),
            ..Default::default()
        };
        assert!(matches!(bad.into_filter(), Err(AppError::ValidationError(_))));
    }
}
