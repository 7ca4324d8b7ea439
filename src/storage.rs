use crate::entities;
use crate::errors::BridgeError;
use crate::settings::Database as DbCfg;
use async_trait::async_trait;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Column that holds the organisation number on contacts.
pub const CONTACT_REGISTRY_FIELD: &str = "company_registry";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgNumberField {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub company_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub vat: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub commercial_company_name: String,
    pub lang: String,
    pub organisation_number: Option<OrgNumberField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
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
    pub stage_id: i64,
    pub referred: String,
    pub description: String,
}

/// Record store behind the bridge: the Prospector credential pair plus the
/// CRM contacts and leads created from prospects.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Most recently stored credential pair, if any.
    async fn active_credentials(&self) -> Result<Option<Credentials>, BridgeError>;

    /// Replace whatever pair is stored with `credentials`.
    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), BridgeError>;

    /// Remove the stored pair. Returns the number of rows removed.
    async fn clear_credentials(&self) -> Result<u64, BridgeError>;

    async fn create_contact(&self, contact: NewContact) -> Result<i32, BridgeError>;

    async fn create_lead(&self, lead: NewLead) -> Result<i32, BridgeError>;

    async fn find_contact_by_vat(&self, vat: &str) -> Result<Option<i32>, BridgeError>;

    /// Distinct non-empty organisation numbers on contacts.
    async fn contact_organisation_numbers(&self) -> Result<Vec<String>, BridgeError>;

    /// Distinct non-empty organisation numbers on leads.
    async fn lead_organisation_numbers(&self) -> Result<Vec<String>, BridgeError>;
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, BridgeError> {
    let db = Database::connect(&cfg.url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl CrmStore for SeaOrmStore {
    async fn active_credentials(&self) -> Result<Option<Credentials>, BridgeError> {
        use entities::prospector_settings::{Column, Entity};

        let row = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await?;

        Ok(row.map(|m| Credentials {
            client_id: m.api_client_id,
            client_secret: m.api_client_secret,
        }))
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), BridgeError> {
        use entities::prospector_settings::{ActiveModel, Entity};

        let txn = self.db.begin().await?;

        Entity::delete_many().exec(&txn).await?;

        let row = ActiveModel {
            api_client_id: Set(credentials.client_id.clone()),
            api_client_secret: Set(credentials.client_secret.clone()),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        row.insert(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn clear_credentials(&self) -> Result<u64, BridgeError> {
        use entities::prospector_settings::Entity;

        let result = Entity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<i32, BridgeError> {
        let mut company_registry = None;
        let mut custom_fields = None;
        if let Some(field) = contact.organisation_number {
            if field.key == CONTACT_REGISTRY_FIELD {
                company_registry = field.value;
            } else {
                let mut map = Map::new();
                map.insert(
                    field.key,
                    field.value.map(Value::String).unwrap_or(Value::Null),
                );
                custom_fields = Some(serde_json::to_string(&map)?);
            }
        }

        let row = entities::contact::ActiveModel {
            company_id: Set(contact.company_id),
            name: Set(contact.name),
            phone: Set(contact.phone),
            vat: Set(contact.vat),
            street: Set(contact.street),
            zip: Set(contact.zip),
            city: Set(contact.city),
            commercial_company_name: Set(contact.commercial_company_name),
            contact_type: Set("contact".to_string()),
            lang: Set(contact.lang),
            active: Set(1),
            is_company: Set(1),
            partner_share: Set(1),
            company_registry: Set(company_registry),
            custom_fields: Set(custom_fields),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let model = row.insert(&self.db).await?;
        Ok(model.id)
    }

    async fn create_lead(&self, lead: NewLead) -> Result<i32, BridgeError> {
        let row = entities::lead::ActiveModel {
            company_id: Set(lead.company_id),
            name: Set(lead.name),
            partner_name: Set(lead.partner_name),
            phone_sanitized: Set(lead.phone_sanitized),
            phone: Set(lead.phone),
            company_vat_number: Set(lead.company_vat_number),
            company_organisation_number: Set(lead.company_organisation_number),
            company_employees: Set(lead.company_employees),
            company_turnover: Set(lead.company_turnover),
            company_legal_entity: Set(lead.company_legal_entity),
            street: Set(lead.street),
            zip: Set(lead.zip),
            city: Set(lead.city),
            country_id: Set(lead.country_id),
            contact_name: Set(String::new()),
            priority: Set(0),
            lead_type: Set("lead".to_string()),
            referred: Set(lead.referred),
            stage_id: Set(lead.stage_id),
            active: Set(1),
            description: Set(lead.description),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let model = row.insert(&self.db).await?;
        Ok(model.id)
    }

    async fn find_contact_by_vat(&self, vat: &str) -> Result<Option<i32>, BridgeError> {
        use entities::contact::{Column, Entity};

        let found = Entity::find()
            .filter(Column::Vat.eq(vat))
            .one(&self.db)
            .await?;
        Ok(found.map(|m| m.id))
    }

    async fn contact_organisation_numbers(&self) -> Result<Vec<String>, BridgeError> {
        use entities::contact::{Column, Entity};

        let numbers = Entity::find()
            .select_only()
            .column(Column::CompanyRegistry)
            .filter(Column::CompanyRegistry.is_not_null())
            .filter(Column::CompanyRegistry.ne(""))
            .distinct()
            .order_by_asc(Column::CompanyRegistry)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(numbers)
    }

    async fn lead_organisation_numbers(&self) -> Result<Vec<String>, BridgeError> {
        use entities::lead::{Column, Entity};

        let numbers = Entity::find()
            .select_only()
            .column(Column::CompanyOrganisationNumber)
            .filter(Column::CompanyOrganisationNumber.is_not_null())
            .filter(Column::CompanyOrganisationNumber.ne(""))
            .distinct()
            .order_by_asc(Column::CompanyOrganisationNumber)
            .into_tuple::<String>()
            .all(&self.db)
            .await?;
        Ok(numbers)
    }
}
