//! Catalog entities: products and their reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Product as listed in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "linen-shirt")]
    pub slug: String,
    #[schema(example = "Linen shirt")]
    pub name: String,
    pub description: String,
    #[schema(example = 4500.0)]
    pub price: f64,
    #[schema(example = "NGN")]
    pub currency: String,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Slug is required"))]
    #[schema(example = "linen-shirt")]
    pub slug: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than zero"))]
    pub price: f64,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    pub category: Option<String>,
}

/// Partial product update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductChanges {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be greater than zero"))]
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub category: Option<String>,
}

/// Customer review of a product. No moderation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author_name: String,
    #[serde(skip_serializing)]
    pub author_email: String,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new review
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub rating: i32,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_hides_author_email() {
        let review = Review {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            rating: 5,
            comment: "Great fit".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(review).unwrap();
        assert!(json.get("author_email").is_none());
        assert_eq!(json["rating"], 5);
    }

    #[test]
    fn test_new_product_defaults() {
        let product: NewProduct = serde_json::from_value(serde_json::json!({
            "slug": "cap",
            "name": "Cap",
            "description": "Cotton cap",
            "price": 1200.0,
            "currency": "NGN"
        }))
        .unwrap();
        assert!(product.images.is_empty());
        assert_eq!(product.stock, 0);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_product_rules() {
        let changes = ProductChanges {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
        assert!(ProductChanges::default().validate().is_ok());
    }
}
