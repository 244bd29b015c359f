use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use crate::entities::spotify_tokens;

#[derive(Debug, Clone)]
pub struct SpotifyToken {
    pub user_id: i32,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub expires_at: String,
}

impl From<spotify_tokens::Model> for SpotifyToken {
    fn from(model: spotify_tokens::Model) -> Self {
        Self {
            user_id: model.user_id,
            access_token: model.access_token,
            refresh_token: model.refresh_token,
            expires_in: model.expires_in,
            expires_at: model.expires_at,
        }
    }
}

/// Instant a token issued at `issued_at` stops being valid, or `None` when
/// `expires_in` is negative or past what a timestamp can hold.
#[must_use]
pub fn expiry_after(issued_at: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in < 0 {
        return None;
    }
    issued_at.checked_add_signed(TimeDelta::try_seconds(expires_in)?)
}

pub struct SpotifyTokenRepository {
    conn: DatabaseConnection,
}

impl SpotifyTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<SpotifyToken>> {
        let token = spotify_tokens::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query Spotify token")?;

        Ok(token.map(SpotifyToken::from))
    }

    /// Store the grant for `user_id`, replacing any previous one.
    ///
    /// Spotify omits `refresh_token` on some re-consents; the stored one is
    /// kept in that case.
    pub async fn upsert(
        &self,
        user_id: i32,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in: i64,
    ) -> Result<()> {
        let now = Utc::now();
        let expires_at = expiry_after(now, expires_in)
            .with_context(|| format!("Token lifetime out of range: expires_in={expires_in}"))?
            .to_rfc3339();

        let mut update_columns = vec![
            spotify_tokens::Column::AccessToken,
            spotify_tokens::Column::ExpiresIn,
            spotify_tokens::Column::ExpiresAt,
            spotify_tokens::Column::UpdatedAt,
        ];
        if refresh_token.is_some() {
            update_columns.push(spotify_tokens::Column::RefreshToken);
        }

        let model = spotify_tokens::ActiveModel {
            user_id: Set(user_id),
            access_token: Set(access_token.to_string()),
            refresh_token: Set(refresh_token.map(str::to_string)),
            expires_in: Set(expires_in),
            expires_at: Set(expires_at),
            updated_at: Set(now.to_rfc3339()),
        };

        spotify_tokens::Entity::insert(model)
            .on_conflict(
                OnConflict::column(spotify_tokens::Column::UserId)
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to store Spotify token")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_after() {
        let issued = DateTime::parse_from_rfc3339("2024-05-02T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(
            expiry_after(issued, 3600).unwrap().to_rfc3339(),
            "2024-05-02T11:00:00+00:00"
        );
        assert_eq!(expiry_after(issued, 0), Some(issued));
        assert!(expiry_after(issued, -1).is_none());
        assert!(expiry_after(issued, 10_000_000_000_000).is_none());
        assert!(expiry_after(issued, i64::MAX).is_none());
    }
}
