use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "constituencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sub_county_id: i32,

    pub name: String,

    pub code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sub_counties::Entity",
        from = "Column::SubCountyId",
        to = "super::sub_counties::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SubCounty,
    #[sea_orm(has_many = "super::wards::Entity")]
    Wards,
}

impl Related<super::sub_counties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubCounty.def()
    }
}

impl Related<super::wards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
