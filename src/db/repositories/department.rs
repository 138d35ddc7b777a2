use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use super::insert_all;
use crate::entities::department_contacts::ContactType;
use crate::entities::{
    department_categories, department_contacts, department_officers, department_units, departments,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub county_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub mandate: Option<String>,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub head_office_location: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub budget_allocated: Option<f64>,
    #[serde(default)]
    pub staff_count: i32,
    pub date_established: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUnit {
    pub department_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub head_account_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOfficer {
    pub department_id: i32,
    pub unit_id: Option<i32>,
    pub account_id: i32,
    pub position: Option<String>,
    pub sub_county_id: Option<i32>,
    #[serde(default)]
    pub is_head: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    pub date_assigned: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub department_id: i32,
    pub contact_type: ContactType,
    pub value: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Optional list filters matching the original query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentFilter {
    pub county_id: Option<i32>,
    pub category_id: Option<i32>,
}

pub struct DepartmentRepository {
    conn: DatabaseConnection,
}

impl DepartmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<department_categories::Model>> {
        department_categories::Entity::find()
            .order_by_asc(department_categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list department categories")
    }

    pub async fn create_categories(
        &self,
        items: Vec<NewCategory>,
    ) -> Result<Vec<department_categories::Model>> {
        let models = items
            .into_iter()
            .map(|c| department_categories::ActiveModel {
                name: Set(c.name),
                description: Set(c.description),
                ..Default::default()
            });
        insert_all(&self.conn, models).await
    }

    pub async fn delete_category(&self, id: i32) -> Result<bool> {
        let result = department_categories::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department category")?;
        Ok(result.rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    pub async fn list_departments(
        &self,
        filter: DepartmentFilter,
    ) -> Result<Vec<departments::Model>> {
        let mut query = departments::Entity::find().order_by_asc(departments::Column::Name);
        if let Some(county_id) = filter.county_id {
            query = query.filter(departments::Column::CountyId.eq(county_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(departments::Column::CategoryId.eq(category_id));
        }
        query
            .all(&self.conn)
            .await
            .context("Failed to list departments")
    }

    pub async fn get_department(&self, id: i32) -> Result<Option<departments::Model>> {
        departments::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query department")
    }

    pub async fn create_departments(
        &self,
        items: Vec<NewDepartment>,
    ) -> Result<Vec<departments::Model>> {
        let models = items.into_iter().map(|d| departments::ActiveModel {
            county_id: Set(d.county_id),
            category_id: Set(d.category_id),
            name: Set(d.name),
            code: Set(d.code),
            description: Set(d.description),
            mandate: Set(d.mandate),
            email: Set(d.email),
            phone: Set(d.phone),
            website: Set(d.website),
            head_office_location: Set(d.head_office_location),
            active: Set(d.active),
            budget_allocated: Set(d.budget_allocated),
            staff_count: Set(d.staff_count),
            date_established: Set(d.date_established),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn update_department(
        &self,
        id: i32,
        update: NewDepartment,
    ) -> Result<Option<departments::Model>> {
        let Some(existing) = self.get_department(id).await? else {
            return Ok(None);
        };

        let mut active: departments::ActiveModel = existing.into();
        active.county_id = Set(update.county_id);
        active.category_id = Set(update.category_id);
        active.name = Set(update.name);
        active.code = Set(update.code);
        active.description = Set(update.description);
        active.mandate = Set(update.mandate);
        active.email = Set(update.email);
        active.phone = Set(update.phone);
        active.website = Set(update.website);
        active.head_office_location = Set(update.head_office_location);
        active.active = Set(update.active);
        active.budget_allocated = Set(update.budget_allocated);
        active.staff_count = Set(update.staff_count);
        active.date_established = Set(update.date_established);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update department")?;
        Ok(Some(updated))
    }

    pub async fn delete_department(&self, id: i32) -> Result<bool> {
        let result = departments::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department")?;
        Ok(result.rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    pub async fn list_units(&self, department_id: Option<i32>) -> Result<Vec<department_units::Model>> {
        let mut query =
            department_units::Entity::find().order_by_asc(department_units::Column::Name);
        if let Some(department_id) = department_id {
            query = query.filter(department_units::Column::DepartmentId.eq(department_id));
        }
        query
            .all(&self.conn)
            .await
            .context("Failed to list department units")
    }

    pub async fn create_units(&self, items: Vec<NewUnit>) -> Result<Vec<department_units::Model>> {
        let models = items.into_iter().map(|u| department_units::ActiveModel {
            department_id: Set(u.department_id),
            name: Set(u.name),
            description: Set(u.description),
            head_account_id: Set(u.head_account_id),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn delete_unit(&self, id: i32) -> Result<bool> {
        let result = department_units::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department unit")?;
        Ok(result.rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Officers
    // ------------------------------------------------------------------

    pub async fn list_officers(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_officers::Model>> {
        let mut query = department_officers::Entity::find()
            .order_by_asc(department_officers::Column::DepartmentId);
        if let Some(department_id) = department_id {
            query = query.filter(department_officers::Column::DepartmentId.eq(department_id));
        }
        query
            .all(&self.conn)
            .await
            .context("Failed to list department officers")
    }

    pub async fn create_officers(
        &self,
        items: Vec<NewOfficer>,
    ) -> Result<Vec<department_officers::Model>> {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let models = items.into_iter().map(|o| department_officers::ActiveModel {
            department_id: Set(o.department_id),
            unit_id: Set(o.unit_id),
            account_id: Set(o.account_id),
            position: Set(o.position),
            sub_county_id: Set(o.sub_county_id),
            is_head: Set(o.is_head),
            active: Set(o.active),
            date_assigned: Set(o.date_assigned.unwrap_or_else(|| today.clone())),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn delete_officer(&self, id: i32) -> Result<bool> {
        let result = department_officers::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department officer")?;
        Ok(result.rows_affected > 0)
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    pub async fn list_contacts(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_contacts::Model>> {
        let mut query = department_contacts::Entity::find()
            .order_by_asc(department_contacts::Column::DepartmentId);
        if let Some(department_id) = department_id {
            query = query.filter(department_contacts::Column::DepartmentId.eq(department_id));
        }
        query
            .all(&self.conn)
            .await
            .context("Failed to list department contacts")
    }

    pub async fn create_contacts(
        &self,
        items: Vec<NewContact>,
    ) -> Result<Vec<department_contacts::Model>> {
        let models = items.into_iter().map(|c| department_contacts::ActiveModel {
            department_id: Set(c.department_id),
            contact_type: Set(c.contact_type),
            value: Set(c.value),
            active: Set(c.active),
            ..Default::default()
        });
        insert_all(&self.conn, models).await
    }

    pub async fn delete_contact(&self, id: i32) -> Result<bool> {
        let result = department_contacts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department contact")?;
        Ok(result.rows_affected > 0)
    }
}
