pub use super::albums::Entity as Albums;
pub use super::artists::Entity as Artists;
pub use super::follows::Entity as Follows;
pub use super::playlists::Entity as Playlists;
pub use super::posts::Entity as Posts;
pub use super::profiles::Entity as Profiles;
pub use super::songs::Entity as Songs;
pub use super::spotify_tokens::Entity as SpotifyTokens;
pub use super::users::Entity as Users;
