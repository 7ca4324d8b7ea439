use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: Option<i64>,
    pub name: String,
    pub partner_name: String,
    pub phone_sanitized: Option<String>,
    pub phone: Option<String>,
    pub company_vat_number: Option<String>,
    pub company_organisation_number: Option<String>,
    pub company_employees: Option<String>,
    pub company_turnover: Option<String>,
    pub company_legal_entity: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country_id: i64,
    pub contact_name: String,
    pub priority: i64,
    pub lead_type: String,
    pub referred: String,
    pub stage_id: i64,
    pub active: i64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
