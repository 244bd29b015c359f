pub mod prelude;

pub mod albums;
pub mod artists;
pub mod follows;
pub mod playlists;
pub mod posts;
pub mod profiles;
pub mod songs;
pub mod spotify_tokens;
pub mod users;
