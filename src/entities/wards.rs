use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "wards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub constituency_id: Option<i32>,

    pub name: String,

    pub code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::constituencies::Entity",
        from = "Column::ConstituencyId",
        to = "super::constituencies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Constituency,
}

impl Related<super::constituencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Constituency.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
