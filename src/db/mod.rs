use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::accounts::{self, Role};
use crate::entities::{
    constituencies, counties, department_categories, department_contacts, department_officers,
    department_units, departments, profiles, sub_counties, wards,
};

pub mod migrator;
pub mod repositories;

pub use repositories::account::{AccountRepoError, NewAccount, normalize_email};
pub use repositories::department::{
    DepartmentFilter, NewCategory, NewContact, NewDepartment, NewOfficer, NewUnit,
};
pub use repositories::location::{NewConstituency, NewCounty, NewSubCounty, NewWard};
pub use repositories::profile::ProfileChanges;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str, security: SecurityConfig) -> Result<Self> {
        Self::with_pool_options(db_url, security, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        security: SecurityConfig,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database would get its
        // own empty database, so those are pinned to a single connection.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone(), self.security.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn location_repo(&self) -> repositories::location::LocationRepository {
        repositories::location::LocationRepository::new(self.conn.clone())
    }

    fn department_repo(&self) -> repositories::department::DepartmentRepository {
        repositories::department::DepartmentRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Accounts & profiles
    // ------------------------------------------------------------------

    pub async fn create_account(
        &self,
        new: NewAccount,
    ) -> Result<accounts::Model, AccountRepoError> {
        self.account_repo().create(new).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        self.account_repo().get_by_email(email).await
    }

    pub async fn get_account_by_id(&self, id: i32) -> Result<Option<accounts::Model>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn verify_account_password(
        &self,
        password_hash: &str,
        password: &str,
    ) -> Result<bool> {
        self.account_repo()
            .verify_password(password_hash, password)
            .await
    }

    pub async fn set_account_password(&self, id: i32, new_password: &str) -> Result<()> {
        self.account_repo().set_password(id, new_password).await
    }

    pub async fn set_account_active(&self, id: i32, is_active: bool) -> Result<()> {
        self.account_repo().set_active(id, is_active).await
    }

    pub async fn set_account_role(&self, id: i32, role: Role) -> Result<Option<accounts::Model>> {
        self.account_repo().set_role(id, role).await
    }

    pub async fn update_account_identity(
        &self,
        id: i32,
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    ) -> Result<accounts::Model, AccountRepoError> {
        self.account_repo()
            .update_identity(id, first_name, last_name, username)
            .await
    }

    pub async fn get_or_create_profile(&self, account_id: i32) -> Result<profiles::Model> {
        self.profile_repo().get_or_create(account_id).await
    }

    pub async fn update_profile(
        &self,
        account_id: i32,
        changes: ProfileChanges,
    ) -> Result<profiles::Model> {
        self.profile_repo().update(account_id, changes).await
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    pub async fn list_counties(&self) -> Result<Vec<counties::Model>> {
        self.location_repo().list_counties().await
    }

    pub async fn get_county(&self, id: i32) -> Result<Option<counties::Model>> {
        self.location_repo().get_county(id).await
    }

    pub async fn create_counties(&self, items: Vec<NewCounty>) -> Result<Vec<counties::Model>> {
        self.location_repo().create_counties(items).await
    }

    pub async fn list_sub_counties(
        &self,
        county_id: Option<i32>,
    ) -> Result<Vec<sub_counties::Model>> {
        self.location_repo().list_sub_counties(county_id).await
    }

    pub async fn get_sub_county(&self, id: i32) -> Result<Option<sub_counties::Model>> {
        self.location_repo().get_sub_county(id).await
    }

    pub async fn create_sub_counties(
        &self,
        items: Vec<NewSubCounty>,
    ) -> Result<Vec<sub_counties::Model>> {
        self.location_repo().create_sub_counties(items).await
    }

    pub async fn update_sub_county(
        &self,
        id: i32,
        update: NewSubCounty,
    ) -> Result<Option<sub_counties::Model>> {
        self.location_repo().update_sub_county(id, update).await
    }

    pub async fn delete_sub_county(&self, id: i32) -> Result<bool> {
        self.location_repo().delete_sub_county(id).await
    }

    pub async fn list_constituencies(
        &self,
        sub_county_id: Option<i32>,
    ) -> Result<Vec<constituencies::Model>> {
        self.location_repo().list_constituencies(sub_county_id).await
    }

    pub async fn get_constituency(&self, id: i32) -> Result<Option<constituencies::Model>> {
        self.location_repo().get_constituency(id).await
    }

    pub async fn create_constituencies(
        &self,
        items: Vec<NewConstituency>,
    ) -> Result<Vec<constituencies::Model>> {
        self.location_repo().create_constituencies(items).await
    }

    pub async fn update_constituency(
        &self,
        id: i32,
        update: NewConstituency,
    ) -> Result<Option<constituencies::Model>> {
        self.location_repo().update_constituency(id, update).await
    }

    pub async fn delete_constituency(&self, id: i32) -> Result<bool> {
        self.location_repo().delete_constituency(id).await
    }

    pub async fn list_wards(&self, constituency_id: Option<i32>) -> Result<Vec<wards::Model>> {
        self.location_repo().list_wards(constituency_id).await
    }

    pub async fn get_ward(&self, id: i32) -> Result<Option<wards::Model>> {
        self.location_repo().get_ward(id).await
    }

    pub async fn create_wards(&self, items: Vec<NewWard>) -> Result<Vec<wards::Model>> {
        self.location_repo().create_wards(items).await
    }

    pub async fn update_ward(&self, id: i32, update: NewWard) -> Result<Option<wards::Model>> {
        self.location_repo().update_ward(id, update).await
    }

    pub async fn delete_ward(&self, id: i32) -> Result<bool> {
        self.location_repo().delete_ward(id).await
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    pub async fn list_department_categories(
        &self,
    ) -> Result<Vec<department_categories::Model>> {
        self.department_repo().list_categories().await
    }

    pub async fn create_department_categories(
        &self,
        items: Vec<NewCategory>,
    ) -> Result<Vec<department_categories::Model>> {
        self.department_repo().create_categories(items).await
    }

    pub async fn delete_department_category(&self, id: i32) -> Result<bool> {
        self.department_repo().delete_category(id).await
    }

    pub async fn list_departments(
        &self,
        filter: DepartmentFilter,
    ) -> Result<Vec<departments::Model>> {
        self.department_repo().list_departments(filter).await
    }

    pub async fn get_department(&self, id: i32) -> Result<Option<departments::Model>> {
        self.department_repo().get_department(id).await
    }

    pub async fn create_departments(
        &self,
        items: Vec<NewDepartment>,
    ) -> Result<Vec<departments::Model>> {
        self.department_repo().create_departments(items).await
    }

    pub async fn update_department(
        &self,
        id: i32,
        update: NewDepartment,
    ) -> Result<Option<departments::Model>> {
        self.department_repo().update_department(id, update).await
    }

    pub async fn delete_department(&self, id: i32) -> Result<bool> {
        self.department_repo().delete_department(id).await
    }

    pub async fn list_department_units(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_units::Model>> {
        self.department_repo().list_units(department_id).await
    }

    pub async fn create_department_units(
        &self,
        items: Vec<NewUnit>,
    ) -> Result<Vec<department_units::Model>> {
        self.department_repo().create_units(items).await
    }

    pub async fn delete_department_unit(&self, id: i32) -> Result<bool> {
        self.department_repo().delete_unit(id).await
    }

    pub async fn list_department_officers(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_officers::Model>> {
        self.department_repo().list_officers(department_id).await
    }

    pub async fn create_department_officers(
        &self,
        items: Vec<NewOfficer>,
    ) -> Result<Vec<department_officers::Model>> {
        self.department_repo().create_officers(items).await
    }

    pub async fn delete_department_officer(&self, id: i32) -> Result<bool> {
        self.department_repo().delete_officer(id).await
    }

    pub async fn list_department_contacts(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_contacts::Model>> {
        self.department_repo().list_contacts(department_id).await
    }

    pub async fn create_department_contacts(
        &self,
        items: Vec<NewContact>,
    ) -> Result<Vec<department_contacts::Model>> {
        self.department_repo().create_contacts(items).await
    }

    pub async fn delete_department_contact(&self, id: i32) -> Result<bool> {
        self.department_repo().delete_contact(id).await
    }
}

/// Directory writes rely on database unique indexes; this classifies the
/// resulting failure so handlers can answer 409 instead of 500.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    format!("{err:#}").contains("UNIQUE constraint failed")
}
