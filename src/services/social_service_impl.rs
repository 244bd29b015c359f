//! `SeaORM` implementation of the `SocialService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::services::account_service::UserSummary;
use crate::services::social_service::{SocialError, SocialService};

pub struct SeaOrmSocialService {
    store: Store,
}

impl SeaOrmSocialService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_user(&self, user_id: i32) -> Result<(), SocialError> {
        if self.store.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(SocialError::UserNotFound(user_id))
        }
    }
}

#[async_trait]
impl SocialService for SeaOrmSocialService {
    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<(), SocialError> {
        if follower_id == followed_id {
            return Err(SocialError::SelfFollow);
        }
        if !self.store.user_exists(follower_id).await? {
            return Err(SocialError::CurrentUserNotFound);
        }
        if !self.store.user_exists(followed_id).await? {
            return Err(SocialError::FollowTargetNotFound);
        }

        if !self.store.add_follow(follower_id, followed_id).await? {
            return Err(SocialError::AlreadyFollowing);
        }

        info!(follower_id, followed_id, "Follow edge added");
        Ok(())
    }

    async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<(), SocialError> {
        if !self.store.user_exists(follower_id).await? {
            return Err(SocialError::CurrentUserNotFound);
        }
        if !self.store.user_exists(followed_id).await? {
            return Err(SocialError::UnfollowTargetNotFound);
        }

        if !self.store.remove_follow(follower_id, followed_id).await? {
            return Err(SocialError::NotFollowing);
        }

        info!(follower_id, followed_id, "Follow edge removed");
        Ok(())
    }

    async fn followers(&self, user_id: i32) -> Result<Vec<UserSummary>, SocialError> {
        self.ensure_user(user_id).await?;
        let users = self.store.list_followers(user_id).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    async fn following(&self, user_id: i32) -> Result<Vec<UserSummary>, SocialError> {
        self.ensure_user(user_id).await?;
        let users = self.store.list_following(user_id).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }
}
