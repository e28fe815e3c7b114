use sea_orm::entity::prelude::*;
use serde::Serialize;
use crate::entities::category::Entity as Category;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f32,
    pub old_price: Option<f32>,
    #[sea_orm(indexed)]
    pub category_id: i32,
    pub available_sizes: String,
    pub available_colors: String,
    pub stock: u32,
    pub is_active: bool,
    pub rating: f32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Rounded percentage off `old_price`, 0 when there is no discount.
    pub fn discount_percent(&self) -> u32 {
        match self.old_price {
            Some(old) if old > self.price && old > 0.0 => {
                (((old - self.price) / old) * 100.0).round() as u32
            }
            _ => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Category",
        from = "crate::entities::product::Column::CategoryId",
        to = "crate::entities::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade",
    )]
    Category,
}

impl Related<crate::entities::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
