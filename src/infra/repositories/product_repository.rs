//! Product and review repositories.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::product::{self, Entity as ProductEntity};
use super::entities::review::{self, Entity as ReviewEntity};
use super::map_write_error;
use crate::domain::{NewProduct, NewReview, Product, ProductChanges, Review};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Product>>;

    /// Newest first, optionally restricted to a category
    async fn list(
        &self,
        params: &PaginationParams,
        category: Option<String>,
    ) -> AppResult<(Vec<Product>, u64)>;

    async fn create(&self, product: NewProduct) -> AppResult<Product>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<Review>>;

    async fn create(&self, review: NewReview) -> AppResult<Review>;
}

/// SeaORM-backed product repository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn string_list(values: &[String]) -> serde_json::Value {
    serde_json::Value::Array(
        values
            .iter()
            .cloned()
            .map(serde_json::Value::String)
            .collect(),
    )
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Product::from))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Product>> {
        Ok(ProductEntity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(Product::from))
    }

    async fn list(
        &self,
        params: &PaginationParams,
        category: Option<String>,
    ) -> AppResult<(Vec<Product>, u64)> {
        let mut query = ProductEntity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(category) = category {
            query = query.filter(product::Column::Category.eq(category));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;

        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    async fn create(&self, new_product: NewProduct) -> AppResult<Product> {
        let now = chrono::Utc::now();
        let active_model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(new_product.slug),
            name: Set(new_product.name),
            description: Set(new_product.description),
            price: Set(new_product.price),
            currency: Set(new_product.currency),
            images: Set(string_list(&new_product.images)),
            colors: Set(string_list(&new_product.colors)),
            stock: Set(new_product.stock),
            category: Set(new_product.category),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "Product"))?;
        Ok(Product::from(model))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let model = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;

        let mut active: product::ActiveModel = model.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(images) = changes.images {
            active.images = Set(string_list(&images));
        }
        if let Some(colors) = changes.colors {
            active.colors = Set(string_list(&colors));
        }
        if let Some(stock) = changes.stock {
            active.stock = Set(stock);
        }
        if let Some(category) = changes.category {
            active.category = Set(Some(category));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Product"));
        }
        Ok(())
    }
}

/// SeaORM-backed review repository
pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Review::from).collect())
    }

    async fn create(&self, new_review: NewReview) -> AppResult<Review> {
        let active_model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(new_review.product_id),
            author_name: Set(new_review.author_name),
            author_email: Set(new_review.author_email),
            rating: Set(new_review.rating),
            comment: Set(new_review.comment),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Review::from(model))
    }
}
