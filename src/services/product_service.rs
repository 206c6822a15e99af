//! Product catalog service with review handling.
//!
//! Product lookups by slug go through the Redis cache. Cache failures are
//! logged and fall back to the database.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{
    CACHE_PREFIX_PRODUCT, MAX_REVIEW_RATING, MIN_REVIEW_RATING, PRODUCT_CACHE_TTL_SECONDS,
};
use crate::domain::{CurrentUser, NewProduct, NewReview, Product, ProductChanges, Review};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{get_json, set_json, CacheStore, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Review submission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReviewInput {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i32,
    #[validate(length(min = 1, message = "Comment is required"))]
    #[schema(example = "Fits perfectly")]
    pub comment: String,
}

/// Product service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(
        &self,
        params: &PaginationParams,
        category: Option<String>,
    ) -> AppResult<Paginated<Product>>;

    async fn get_product(&self, slug: &str) -> AppResult<Product>;

    async fn list_reviews(&self, slug: &str) -> AppResult<Vec<Review>>;

    async fn add_review(
        &self,
        actor: &CurrentUser,
        slug: &str,
        input: ReviewInput,
    ) -> AppResult<Review>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    async fn delete_product(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ProductService
pub struct Catalog {
    uow: Arc<dyn UnitOfWork>,
    cache: Arc<dyn CacheStore>,
}

impl Catalog {
    pub fn new(uow: Arc<dyn UnitOfWork>, cache: Arc<dyn CacheStore>) -> Self {
        Self { uow, cache }
    }

    async fn invalidate(&self, slug: &str) {
        if let Err(e) = self.cache.delete(&cache_key(slug)).await {
            tracing::warn!(slug = %slug, error = %e, "Failed to invalidate product cache");
        }
    }
}

fn cache_key(slug: &str) -> String {
    format!("{}{}", CACHE_PREFIX_PRODUCT, slug)
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::validation("Price must be greater than zero"));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("Stock cannot be negative"));
    }
    Ok(())
}

#[async_trait]
impl ProductService for Catalog {
    async fn list_products(
        &self,
        params: &PaginationParams,
        category: Option<String>,
    ) -> AppResult<Paginated<Product>> {
        let category = category.filter(|c| !c.trim().is_empty());
        let (products, total) = self.uow.products().list(params, category).await?;
        Ok(Paginated::new(products, params, total))
    }

    async fn get_product(&self, slug: &str) -> AppResult<Product> {
        let key = cache_key(slug);
        match get_json::<Product>(self.cache.as_ref(), &key).await {
            Ok(Some(product)) => return Ok(product),
            Ok(None) => {}
            Err(e) => tracing::warn!(slug = %slug, error = %e, "Product cache read failed"),
        }

        let product = self
            .uow
            .products()
            .find_by_slug(slug)
            .await?
            .ok_or_not_found("Product")?;

        if let Err(e) = set_json(self.cache.as_ref(), &key, &product, PRODUCT_CACHE_TTL_SECONDS).await {
            tracing::warn!(slug = %slug, error = %e, "Product cache write failed");
        }

        Ok(product)
    }

    async fn list_reviews(&self, slug: &str) -> AppResult<Vec<Review>> {
        let product = self.get_product(slug).await?;
        self.uow.reviews().list_for_product(product.id).await
    }

    async fn add_review(
        &self,
        actor: &CurrentUser,
        slug: &str,
        input: ReviewInput,
    ) -> AppResult<Review> {
        if !(MIN_REVIEW_RATING..=MAX_REVIEW_RATING).contains(&input.rating) {
            return Err(AppError::validation(format!(
                "Rating must be between {} and {}",
                MIN_REVIEW_RATING, MAX_REVIEW_RATING
            )));
        }
        let comment = input.comment.trim().to_string();
        if comment.is_empty() {
            return Err(AppError::validation("Comment is required"));
        }

        let product = self.get_product(slug).await?;
        let author_name = self
            .uow
            .users()
            .find_by_id(actor.id)
            .await?
            .map(|user| user.name)
            .unwrap_or_else(|| actor.email.clone());

        self.uow
            .reviews()
            .create(NewReview {
                product_id: product.id,
                author_name,
                author_email: actor.email.clone(),
                rating: input.rating,
                comment,
            })
            .await
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        if product.slug.trim().is_empty() || product.name.trim().is_empty() {
            return Err(AppError::validation("Slug and name are required"));
        }
        validate_price(product.price)?;
        validate_stock(product.stock)?;

        let product = self.uow.products().create(product).await?;
        tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if let Some(stock) = changes.stock {
            validate_stock(stock)?;
        }

        let product = self.uow.products().update(id, changes).await?;
        self.invalidate(&product.slug).await;
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let product = self
            .uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")?;

        self.uow.products().delete(id).await?;
        self.invalidate(&product.slug).await;
        tracing::info!(product_id = %id, slug = %product.slug, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        MockCacheStore, MockProductRepository, MockReviewRepository, MockUnitOfWork,
        ProductRepository, ReviewRepository,
    };
    use chrono::Utc;

    fn product() -> Product {
        Product {
            id: Uuid::new_v4(),
            slug: "linen-shirt".to_string(),
            name: "Linen shirt".to_string(),
            description: "Breathable".to_string(),
            price: 4500.0,
            currency: "NGN".to_string(),
            images: vec![],
            colors: vec!["navy".to_string()],
            stock: 3,
            category: Some("shirts".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog(
        products: MockProductRepository,
        reviews: MockReviewRepository,
        cache: MockCacheStore,
    ) -> Catalog {
        let products: Arc<dyn ProductRepository> = Arc::new(products);
        let reviews: Arc<dyn ReviewRepository> = Arc::new(reviews);
        let mut uow = MockUnitOfWork::new();
        uow.expect_products().returning(move || products.clone());
        uow.expect_reviews().returning(move || reviews.clone());
        Catalog::new(Arc::new(uow), Arc::new(cache))
    }

    #[tokio::test]
    async fn test_cached_product_skips_database() {
        let cached = product();
        let json = serde_json::to_string(&cached).unwrap();

        let mut cache = MockCacheStore::new();
        cache
            .expect_get_raw()
            .withf(|key| key == "product:linen-shirt")
            .returning(move |_| Ok(Some(json.clone())));
        let mut products = MockProductRepository::new();
        products.expect_find_by_slug().never();

        let found = catalog(products, MockReviewRepository::new(), cache)
            .get_product("linen-shirt")
            .await
            .unwrap();
        assert_eq!(found, cached);
    }

    #[tokio::test]
    async fn test_cache_miss_loads_and_stores_with_ttl() {
        let mut cache = MockCacheStore::new();
        cache.expect_get_raw().returning(|_| Ok(None));
        cache
            .expect_set_raw()
            .withf(|key, _, ttl| key == "product:linen-shirt" && *ttl == PRODUCT_CACHE_TTL_SECONDS)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_slug()
            .returning(|_| Ok(Some(product())));

        let found = catalog(products, MockReviewRepository::new(), cache)
            .get_product("linen-shirt")
            .await
            .unwrap();
        assert_eq!(found.slug, "linen-shirt");
    }

    #[tokio::test]
    async fn test_cache_outage_falls_back_to_database() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get_raw()
            .returning(|_| Err(AppError::internal("redis down")));
        cache
            .expect_set_raw()
            .returning(|_, _, _| Err(AppError::internal("redis down")));
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_slug()
            .returning(|_| Ok(Some(product())));

        assert!(catalog(products, MockReviewRepository::new(), cache)
            .get_product("linen-shirt")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_slug() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_delete()
            .withf(|key| key == "product:linen-shirt")
            .times(1)
            .returning(|_| Ok(()));
        let mut products = MockProductRepository::new();
        products.expect_update().returning(|_, _| Ok(product()));

        let changes = ProductChanges {
            stock: Some(10),
            ..Default::default()
        };
        catalog(products, MockReviewRepository::new(), cache)
            .update_product(Uuid::new_v4(), changes)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_not_found() {
        let mut products = MockProductRepository::new();
        products.expect_find_by_id().returning(|_| Ok(None));
        products.expect_delete().never();

        let result = catalog(products, MockReviewRepository::new(), MockCacheStore::new())
            .delete_product(Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_review_rating_bounds() {
        let mut reviews = MockReviewRepository::new();
        reviews.expect_create().never();
        let service = catalog(MockProductRepository::new(), reviews, MockCacheStore::new());
        let actor = CurrentUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role: crate::domain::UserRole::User,
        };

        for (rating, comment) in [(0, "ok"), (6, "ok"), (5, "   ")] {
            let input = ReviewInput {
                rating,
                comment: comment.to_string(),
            };
            let result = service.add_review(&actor, "linen-shirt", input).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_review_is_attributed_to_account_name() {
        let stored = product();
        let product_id = stored.id;

        let mut cache = MockCacheStore::new();
        cache.expect_get_raw().returning(|_| Ok(None));
        cache.expect_set_raw().returning(|_, _, _| Ok(()));

        let mut products = MockProductRepository::new();
        products
            .expect_find_by_slug()
            .returning(move |_| Ok(Some(stored.clone())));

        let mut users = crate::infra::MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(crate::domain::User {
                id,
                email: "ada@example.com".to_string(),
                password_hash: None,
                name: "Ada Obi".to_string(),
                role: crate::domain::UserRole::User,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let mut reviews = MockReviewRepository::new();
        reviews
            .expect_create()
            .withf(move |review| {
                review.product_id == product_id
                    && review.author_name == "Ada Obi"
                    && review.comment == "Fits perfectly"
            })
            .times(1)
            .returning(|review| {
                Ok(Review {
                    id: Uuid::new_v4(),
                    product_id: review.product_id,
                    author_name: review.author_name,
                    author_email: review.author_email,
                    rating: review.rating,
                    comment: review.comment,
                    created_at: Utc::now(),
                })
            });

        let products: Arc<dyn ProductRepository> = Arc::new(products);
        let reviews: Arc<dyn ReviewRepository> = Arc::new(reviews);
        let users: Arc<dyn crate::infra::UserRepository> = Arc::new(users);
        let mut uow = MockUnitOfWork::new();
        uow.expect_products().returning(move || products.clone());
        uow.expect_reviews().returning(move || reviews.clone());
        uow.expect_users().returning(move || users.clone());
        let service = Catalog::new(Arc::new(uow), Arc::new(cache));

        let actor = CurrentUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role: crate::domain::UserRole::User,
        };
        let input = ReviewInput {
            rating: 5,
            comment: "  Fits perfectly ".to_string(),
        };

        let review = service.add_review(&actor, "linen-shirt", input).await.unwrap();
        assert_eq!(review.rating, 5);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_price() {
        let mut products = MockProductRepository::new();
        products.expect_create().never();

        let new_product: NewProduct = serde_json::from_value(serde_json::json!({
            "slug": "cap",
            "name": "Cap",
            "description": "Cotton cap",
            "price": 0.0,
            "currency": "NGN"
        }))
        .unwrap();
        let result = catalog(products, MockReviewRepository::new(), MockCacheStore::new())
            .create_product(new_product)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
