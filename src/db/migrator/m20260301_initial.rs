use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

use crate::entities::{
    constituencies, departments, department_units, sub_counties, wards,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Creation order respects foreign keys.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Accounts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Profiles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Counties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SubCounties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Constituencies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Wards)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DepartmentCategories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Departments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DepartmentUnits)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DepartmentOfficers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DepartmentContacts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Composite uniqueness the entities cannot express on their own.
        manager
            .create_index(
                Index::create()
                    .name("idx_sub_counties_county_name")
                    .table(SubCounties)
                    .col(sub_counties::Column::CountyId)
                    .col(sub_counties::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_constituencies_sub_county_name")
                    .table(Constituencies)
                    .col(constituencies::Column::SubCountyId)
                    .col(constituencies::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_wards_constituency_name")
                    .table(Wards)
                    .col(wards::Column::ConstituencyId)
                    .col(wards::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_departments_county_name")
                    .table(Departments)
                    .col(departments::Column::CountyId)
                    .col(departments::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_units_department_name")
                    .table(DepartmentUnits)
                    .col(department_units::Column::DepartmentId)
                    .col(department_units::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentContacts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepartmentOfficers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepartmentUnits).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DepartmentCategories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wards).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Constituencies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubCounties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts).to_owned())
            .await?;

        Ok(())
    }
}
