use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub vat: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub commercial_company_name: String,
    pub contact_type: String,
    pub lang: String,
    pub active: i64,
    pub is_company: i64,
    pub partner_share: i64,
    pub company_registry: Option<String>,
    pub custom_fields: Option<String>, // JSON-encoded object
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
