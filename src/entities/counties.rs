use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One of Kenya's 47 counties.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "counties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    /// Official county code, e.g. 42 for Kisumu.
    #[sea_orm(unique)]
    pub code: Option<i16>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_counties::Entity")]
    SubCounties,
    #[sea_orm(has_many = "super::departments::Entity")]
    Departments,
}

impl Related<super::sub_counties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCounties.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
