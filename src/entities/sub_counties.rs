use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "sub_counties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub county_id: i32,

    /// Unique within its county (composite index in the migration).
    pub name: String,

    pub code: Option<String>,

    pub population: Option<i32>,
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
    #[sea_orm(has_many = "super::constituencies::Entity")]
    Constituencies,
}

impl Related<super::counties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::County.def()
    }
}

impl Related<super::constituencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Constituencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
