//! `SeaORM` implementation of the `PostService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::services::post_service::{PostError, PostService, PostView};

const MAX_SONG_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 255;

pub struct SeaOrmPostService {
    store: Store,
}

impl SeaOrmPostService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn validate_post(song_recommendation: &str, description: Option<&str>) -> Result<(), PostError> {
    if song_recommendation.trim().is_empty() {
        return Err(PostError::Validation(
            "Song recommendation is required".to_string(),
        ));
    }
    if song_recommendation.chars().count() > MAX_SONG_LEN {
        return Err(PostError::Validation(format!(
            "Song recommendation must be {MAX_SONG_LEN} characters or less"
        )));
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        return Err(PostError::Validation(format!(
            "Description must be {MAX_DESCRIPTION_LEN} characters or less"
        )));
    }
    Ok(())
}

#[async_trait]
impl PostService for SeaOrmPostService {
    async fn create_post(
        &self,
        user_id: i32,
        song_recommendation: &str,
        description: Option<&str>,
    ) -> Result<PostView, PostError> {
        validate_post(song_recommendation, description)?;

        if !self.store.user_exists(user_id).await? {
            return Err(PostError::UserNotFound(user_id));
        }

        let post = self
            .store
            .create_post(user_id, song_recommendation.trim(), description)
            .await?;

        info!(user_id, post_id = post.id, "Post created");
        Ok(PostView::from(post))
    }

    async fn list_posts(&self, user_id: i32) -> Result<Vec<PostView>, PostError> {
        if !self.store.user_exists(user_id).await? {
            return Err(PostError::UserNotFound(user_id));
        }

        let posts = self.store.list_posts_for_user(user_id).await?;
        Ok(posts.into_iter().map(PostView::from).collect())
    }

    async fn delete_post(&self, caller_id: i32, post_id: i32) -> Result<(), PostError> {
        let post = self
            .store
            .get_post(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))?;

        if post.user_id != caller_id {
            return Err(PostError::Forbidden);
        }

        // Lost a race with another delete of the same post.
        if !self.store.delete_post(post_id).await? {
            return Err(PostError::NotFound(post_id));
        }

        info!(user_id = caller_id, post_id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_post() {
        assert!(validate_post("Song A", None).is_ok());
        assert!(validate_post("Song A", Some("great")).is_ok());
        assert!(validate_post("", None).is_err());
        assert!(validate_post("   ", None).is_err());
        assert!(validate_post(&"s".repeat(MAX_SONG_LEN + 1), None).is_err());
        assert!(validate_post("Song A", Some(&"d".repeat(MAX_DESCRIPTION_LEN + 1))).is_err());
    }
}
