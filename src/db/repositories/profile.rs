use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::profiles;

/// Partial profile field changes; `None` leaves the field untouched.
/// `avatar_url` is doubly optional so a caller can clear it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<Option<String>>,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Registration always creates the profile, so this is a plain fetch in
    /// practice; the create path is defensive.
    pub async fn get_or_create(&self, account_id: i32) -> Result<profiles::Model> {
        let existing = profiles::Entity::find()
            .filter(profiles::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile")?;

        if let Some(profile) = existing {
            return Ok(profile);
        }

        let created = profiles::ActiveModel {
            account_id: Set(account_id),
            bio: Set(String::new()),
            phone: Set(String::new()),
            location: Set(String::new()),
            avatar_url: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to create missing profile")?;

        Ok(created)
    }

    pub async fn update(
        &self,
        account_id: i32,
        changes: ProfileChanges,
    ) -> Result<profiles::Model> {
        let profile = self.get_or_create(account_id).await?;

        // An update with nothing set would be rejected by the orm.
        if changes.bio.is_none()
            && changes.phone.is_none()
            && changes.location.is_none()
            && changes.avatar_url.is_none()
        {
            return Ok(profile);
        }

        let mut active: profiles::ActiveModel = profile.into();
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(location) = changes.location {
            active.location = Set(location);
        }
        if let Some(avatar_url) = changes.avatar_url {
            active.avatar_url = Set(avatar_url);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update profile")?;

        Ok(updated)
    }
}
