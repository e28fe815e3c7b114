use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "telegram_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bot_token: String,
    pub chat_id: String,
    pub is_active: bool,
    pub notify_new_orders: bool,
    pub notify_status_changes: bool,
    pub notify_contact_messages: bool,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
