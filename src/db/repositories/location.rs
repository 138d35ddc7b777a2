use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use super::insert_all;
use crate::entities::{constituencies, counties, sub_counties, wards};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCounty {
    pub name: String,
    pub code: Option<i16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubCounty {
    pub county_id: i32,
    pub name: String,
    pub code: Option<String>,
    pub population: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConstituency {
    pub sub_county_id: i32,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWard {
    pub constituency_id: Option<i32>,
    pub name: String,
    pub code: Option<String>,
}

pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Counties ordered by official code, the order the reference list is
    /// published in.
    pub async fn list_counties(&self) -> Result<Vec<counties::Model>> {
        counties::Entity::find()
            .order_by_asc(counties::Column::Code)
            .all(&self.conn)
            .await
            .context("Failed to list counties")
    }

    pub async fn get_county(&self, id: i32) -> Result<Option<counties::Model>> {
        counties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query county")
    }

    pub async fn create_counties(&self, items: Vec<NewCounty>) -> Result<Vec<counties::Model>> {
        let models = items.into_iter().map(|c| counties::ActiveModel {
            name: Set(c.name),
            code: Set(c.code),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn list_sub_counties(
        &self,
        county_id: Option<i32>,
    ) -> Result<Vec<sub_counties::Model>> {
        let mut query = sub_counties::Entity::find().order_by_asc(sub_counties::Column::Name);
        if let Some(county_id) = county_id {
            query = query.filter(sub_counties::Column::CountyId.eq(county_id));
        }
        query.all(&self.conn).await.context("Failed to list sub-counties")
    }

    pub async fn get_sub_county(&self, id: i32) -> Result<Option<sub_counties::Model>> {
        sub_counties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query sub-county")
    }

    pub async fn create_sub_counties(
        &self,
        items: Vec<NewSubCounty>,
    ) -> Result<Vec<sub_counties::Model>> {
        let models = items.into_iter().map(|s| sub_counties::ActiveModel {
            county_id: Set(s.county_id),
            name: Set(s.name),
            code: Set(s.code),
            population: Set(s.population),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn update_sub_county(
        &self,
        id: i32,
        update: NewSubCounty,
    ) -> Result<Option<sub_counties::Model>> {
        let Some(existing) = self.get_sub_county(id).await? else {
            return Ok(None);
        };

        let mut active: sub_counties::ActiveModel = existing.into();
        active.county_id = Set(update.county_id);
        active.name = Set(update.name);
        active.code = Set(update.code);
        active.population = Set(update.population);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update sub-county")?;
        Ok(Some(updated))
    }

    pub async fn delete_sub_county(&self, id: i32) -> Result<bool> {
        let result = sub_counties::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete sub-county")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_constituencies(
        &self,
        sub_county_id: Option<i32>,
    ) -> Result<Vec<constituencies::Model>> {
        let mut query =
            constituencies::Entity::find().order_by_asc(constituencies::Column::Name);
        if let Some(sub_county_id) = sub_county_id {
            query = query.filter(constituencies::Column::SubCountyId.eq(sub_county_id));
        }
        query
            .all(&self.conn)
            .await
            .context("Failed to list constituencies")
    }

    pub async fn get_constituency(&self, id: i32) -> Result<Option<constituencies::Model>> {
        constituencies::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query constituency")
    }

    pub async fn create_constituencies(
        &self,
        items: Vec<NewConstituency>,
    ) -> Result<Vec<constituencies::Model>> {
        let models = items.into_iter().map(|c| constituencies::ActiveModel {
            sub_county_id: Set(c.sub_county_id),
            name: Set(c.name),
            code: Set(c.code),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn update_constituency(
        &self,
        id: i32,
        update: NewConstituency,
    ) -> Result<Option<constituencies::Model>> {
        let Some(existing) = self.get_constituency(id).await? else {
            return Ok(None);
        };

        let mut active: constituencies::ActiveModel = existing.into();
        active.sub_county_id = Set(update.sub_county_id);
        active.name = Set(update.name);
        active.code = Set(update.code);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update constituency")?;
        Ok(Some(updated))
    }

    pub async fn delete_constituency(&self, id: i32) -> Result<bool> {
        let result = constituencies::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete constituency")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_wards(&self, constituency_id: Option<i32>) -> Result<Vec<wards::Model>> {
        let mut query = wards::Entity::find().order_by_asc(wards::Column::Name);
        if let Some(constituency_id) = constituency_id {
            query = query.filter(wards::Column::ConstituencyId.eq(constituency_id));
        }
        query.all(&self.conn).await.context("Failed to list wards")
    }

    pub async fn get_ward(&self, id: i32) -> Result<Option<wards::Model>> {
        wards::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query ward")
    }

    pub async fn create_wards(&self, items: Vec<NewWard>) -> Result<Vec<wards::Model>> {
        let models = items.into_iter().map(|w| wards::ActiveModel {
            constituency_id: Set(w.constituency_id),
            name: Set(w.name),
            code: Set(w.code),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn update_ward(&self, id: i32, update: NewWard) -> Result<Option<wards::Model>> {
        let Some(existing) = self.get_ward(id).await? else {
            return Ok(None);
        };

        let mut active: wards::ActiveModel = existing.into();
        active.constituency_id = Set(update.constituency_id);
        active.name = Set(update.name);
        active.code = Set(update.code);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update ward")?;
        Ok(Some(updated))
    }

    pub async fn delete_ward(&self, id: i32) -> Result<bool> {
        let result = wards::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete ward")?;
        Ok(result.rows_affected > 0)
    }
}
