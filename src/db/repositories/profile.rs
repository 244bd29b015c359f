use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::profiles;
use crate::models::patch::Patch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: i32,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub updated_at: String,
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Self {
            user_id: model.user_id,
            bio: model.bio,
            profile_image: model.profile_image,
            updated_at: model.updated_at,
        }
    }
}

/// Field-level changes for a profile. Absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Patch<String>,
    pub profile_image: Patch<String>,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_user(&self, user_id: i32) -> Result<Option<Profile>> {
        let profile = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile by user ID")?;

        Ok(profile.map(Profile::from))
    }

    /// Apply `changes` to the user's profile, creating the row on first write.
    pub async fn upsert(&self, user_id: i32, changes: ProfileChanges) -> Result<Profile> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let existing = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&txn)
            .await
            .context("Failed to query profile for update")?;

        let model = if let Some(existing) = existing {
            let bio = changes.bio.apply(existing.bio.clone());
            let profile_image = changes.profile_image.apply(existing.profile_image.clone());

            let mut active: profiles::ActiveModel = existing.into();
            active.bio = Set(bio);
            active.profile_image = Set(profile_image);
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            profiles::ActiveModel {
                user_id: Set(user_id),
                bio: Set(changes.bio.apply(None)),
                profile_image: Set(changes.profile_image.apply(None)),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        };

        txn.commit().await?;
        Ok(Profile::from(model))
    }
}
