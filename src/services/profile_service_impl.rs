//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Profile, ProfileChanges, Store, User};
use crate::models::patch::Patch;
use crate::services::profile_service::{ProfileError, ProfileService, ProfileView};

const MAX_BIO_LEN: usize = 255;
const MAX_IMAGE_LEN: usize = 255;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn check_len(field: &str, value: &Patch<String>, max: usize) -> Result<(), ProfileError> {
        match value.as_set() {
            Some(v) if v.chars().count() > max => Err(ProfileError::Validation(format!(
                "{field} must be {max} characters or less"
            ))),
            _ => Ok(()),
        }
    }

    async fn view(&self, user: User, profile: Profile) -> Result<ProfileView, ProfileError> {
        let (follower_count, following_count) = self.store.follow_counts(user.id).await?;

        Ok(ProfileView {
            user_id: user.id,
            username: user.username,
            bio: profile.bio,
            profile_image: profile.profile_image,
            follower_count,
            following_count,
        })
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn get_profile(&self, user_id: i32) -> Result<ProfileView, ProfileError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ProfileError::UserNotFound(user_id))?;

        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or(ProfileError::ProfileNotFound(user_id))?;

        self.view(user, profile).await
    }

    async fn update_profile(
        &self,
        caller_id: i32,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<ProfileView, ProfileError> {
        if caller_id != user_id {
            return Err(ProfileError::Forbidden);
        }

        Self::check_len("Bio", &changes.bio, MAX_BIO_LEN)?;
        Self::check_len("Profile image", &changes.profile_image, MAX_IMAGE_LEN)?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ProfileError::UserNotFound(user_id))?;

        let profile = self.store.upsert_profile(user_id, changes).await?;
        info!(user_id, "Profile updated");

        self.view(user, profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        let ok = Patch::Set("x".repeat(MAX_BIO_LEN));
        assert!(SeaOrmProfileService::check_len("Bio", &ok, MAX_BIO_LEN).is_ok());

        let too_long = Patch::Set("x".repeat(MAX_BIO_LEN + 1));
        assert!(SeaOrmProfileService::check_len("Bio", &too_long, MAX_BIO_LEN).is_err());

        assert!(SeaOrmProfileService::check_len("Bio", &Patch::Clear, MAX_BIO_LEN).is_ok());
        assert!(SeaOrmProfileService::check_len("Bio", &Patch::Absent, MAX_BIO_LEN).is_ok());
    }
}
