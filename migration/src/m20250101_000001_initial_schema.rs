use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Credential pair issued by the Prospector sign-on flow
        manager
            .create_table(
                Table::create()
                    .table(ProspectorSettings::Table)
                    .if_not_exists()
                    .col(pk_auto(ProspectorSettings::Id))
                    .col(string(ProspectorSettings::ApiClientId))
                    .col(string(ProspectorSettings::ApiClientSecret))
                    .col(big_integer(ProspectorSettings::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create contacts table
        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(pk_auto(Contacts::Id))
                    .col(big_integer_null(Contacts::CompanyId))
                    .col(string(Contacts::Name))
                    .col(string_null(Contacts::Phone))
                    .col(string_null(Contacts::Vat))
                    .col(string_null(Contacts::Street))
                    .col(string_null(Contacts::Zip))
                    .col(string_null(Contacts::City))
                    .col(string(Contacts::CommercialCompanyName))
                    .col(string(Contacts::ContactType))
                    .col(string(Contacts::Lang))
                    .col(
                        ColumnDef::new(Contacts::Active)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Contacts::IsCompany)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Contacts::PartnerShare)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string_null(Contacts::CompanyRegistry))
                    .col(big_integer(Contacts::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contacts_vat")
                    .table(Contacts::Table)
                    .col(Contacts::Vat)
                    .to_owned(),
            )
            .await?;

        // Create leads table
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(pk_auto(Leads::Id))
                    .col(big_integer_null(Leads::CompanyId))
                    .col(string(Leads::Name))
                    .col(string(Leads::PartnerName))
                    .col(string_null(Leads::PhoneSanitized))
                    .col(string_null(Leads::Phone))
                    .col(string_null(Leads::CompanyVatNumber))
                    .col(string_null(Leads::CompanyOrganisationNumber))
                    .col(string_null(Leads::CompanyEmployees))
                    .col(string_null(Leads::CompanyTurnover))
                    .col(string_null(Leads::CompanyLegalEntity))
                    .col(string_null(Leads::Street))
                    .col(string_null(Leads::Zip))
                    .col(string_null(Leads::City))
                    .col(big_integer(Leads::CountryId))
                    .col(string(Leads::ContactName))
                    .col(
                        ColumnDef::new(Leads::Priority)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string(Leads::LeadType))
                    .col(string(Leads::Referred))
                    .col(big_integer(Leads::StageId))
                    .col(
                        ColumnDef::new(Leads::Active)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(text(Leads::Description))
                    .col(big_integer(Leads::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProspectorSettings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProspectorSettings {
    Table,
    Id,
    ApiClientId,
    ApiClientSecret,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    CompanyId,
    Name,
    Phone,
    Vat,
    Street,
    Zip,
    City,
    CommercialCompanyName,
    ContactType,
    Lang,
    Active,
    IsCompany,
    PartnerShare,
    CompanyRegistry,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    CompanyId,
    Name,
    PartnerName,
    PhoneSanitized,
    Phone,
    CompanyVatNumber,
    CompanyOrganisationNumber,
    CompanyEmployees,
    CompanyTurnover,
    CompanyLegalEntity,
    Street,
    Zip,
    City,
    CountryId,
    ContactName,
    Priority,
    LeadType,
    Referred,
    StageId,
    Active,
    Description,
    CreatedAt,
}
