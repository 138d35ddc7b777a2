use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Officer assignment to a department or one of its units.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "department_officers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub department_id: i32,

    pub unit_id: Option<i32>,

    /// An account holds at most one officer assignment.
    #[sea_orm(unique)]
    pub account_id: i32,

    pub position: Option<String>,

    /// Area the officer oversees within the county.
    pub sub_county_id: Option<i32>,

    pub is_head: bool,

    pub active: bool,

    pub date_assigned: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::department_units::Entity",
        from = "Column::UnitId",
        to = "super::department_units::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Unit,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::sub_counties::Entity",
        from = "Column::SubCountyId",
        to = "super::sub_counties::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SubCounty,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
