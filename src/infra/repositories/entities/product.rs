//! Product table entity.

use sea_orm::entity::prelude::*;

use crate::domain::Product;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub currency: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub colors: Json,
    pub stock: i32,
    pub category: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Product {
            id: model.id,
            slug: model.slug,
            name: model.name,
            description: model.description,
            price: model.price,
            currency: model.currency,
            // Malformed arrays degrade to empty rather than hiding the product
            images: serde_json::from_value(model.images).unwrap_or_default(),
            colors: serde_json::from_value(model.colors).unwrap_or_default(),
            stock: model.stock,
            category: model.category,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
