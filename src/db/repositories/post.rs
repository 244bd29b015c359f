use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::posts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub song_recommendation: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            song_recommendation: model.song_recommendation,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        song_recommendation: &str,
        description: Option<&str>,
    ) -> Result<Post> {
        let model = posts::ActiveModel {
            user_id: Set(user_id),
            song_recommendation: Set(song_recommendation.to_string()),
            description: Set(description.map(str::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert post")?;

        Ok(Post::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        let post = posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post")?;

        Ok(post.map(Post::from))
    }

    /// Newest first; ties broken by id so the order is stable.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Post>> {
        let posts = posts::Entity::find()
            .filter(posts::Column::UserId.eq(user_id))
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list posts")?;

        Ok(posts.into_iter().map(Post::from).collect())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = posts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected > 0)
    }
}
