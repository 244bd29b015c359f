use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};

use crate::entities::{follows, users};

use super::user::User;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert the edge. Returns `false` when it already exists.
    pub async fn insert(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let edge = follows::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        match follows::Entity::insert(edge)
            .exec_without_returning(&self.conn)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to insert follow edge"),
        }
    }

    /// Remove the edge. Returns `false` when there was nothing to remove.
    pub async fn delete(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let result = follows::Entity::delete_by_id((follower_id, followed_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(result.rows_affected > 0)
    }

    /// Users following `user_id`, ordered by username.
    pub async fn followers(&self, user_id: i32) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .join(JoinType::InnerJoin, follows::Relation::Follower.def().rev())
            .filter(follows::Column::FollowedId.eq(user_id))
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list followers")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    /// Users that `user_id` follows, ordered by username.
    pub async fn following(&self, user_id: i32) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .join(JoinType::InnerJoin, follows::Relation::Followed.def().rev())
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list followed users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn follower_count(&self, user_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FollowedId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followers")
    }

    pub async fn following_count(&self, user_id: i32) -> Result<u64> {
        follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count followed users")
    }
}
