use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 locations 表
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::LocationId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::ProvinceState).string_len(255).null())
                    .col(
                        ColumnDef::new(Locations::CountryRegion)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Locations::Lat).double().null())
                    .col(ColumnDef::new(Locations::Long).double().null())
                    .col(ColumnDef::new(Locations::Iso3).string_len(3).null())
                    .to_owned(),
            )
            .await?;

        // (province, country) 自然键唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_locations_province_country")
                    .table(Locations::Table)
                    .col(Locations::ProvinceState)
                    .col(Locations::CountryRegion)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 聚合按国家分组
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_locations_country")
                    .table(Locations::Table)
                    .col(Locations::CountryRegion)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_locations_country").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("uq_locations_province_country").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Locations {
    #[sea_orm(iden = "locations")]
    Table,
    LocationId,
    ProvinceState,
    CountryRegion,
    Lat,
    Long,
    Iso3,
}
