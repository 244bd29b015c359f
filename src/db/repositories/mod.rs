pub mod follow;
pub mod post;
pub mod profile;
pub mod spotify_token;
pub mod user;
