use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A department within a county government.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub county_id: i32,

    pub category_id: Option<i32>,

    /// Unique within its county (composite index in the migration).
    pub name: String,

    #[sea_orm(unique)]
    pub code: Option<String>,

    pub description: Option<String>,

    /// Core functions and responsibilities of this department.
    pub mandate: Option<String>,

    pub email: String,

    pub phone: Option<String>,

    pub website: Option<String>,

    pub head_office_location: Option<String>,

    pub active: bool,

    pub budget_allocated: Option<f64>,

    pub staff_count: i32,

    pub date_established: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counties::Entity",
        from = "Column::CountyId",
        to = "super::counties::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    County,
    #[sea_orm(
        belongs_to = "super::department_categories::Entity",
        from = "Column::CategoryId",
        to = "super::department_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::department_units::Entity")]
    Units,
    #[sea_orm(has_many = "super::department_officers::Entity")]
    Officers,
    #[sea_orm(has_many = "super::department_contacts::Entity")]
    Contacts,
}

impl Related<super::counties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::County.def()
    }
}

impl Related<super::department_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::department_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl Related<super::department_officers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Officers.def()
    }
}

impl Related<super::department_contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
