pub mod account_service;
pub use account_service::{AccountError, AccountInfo, AccountService, Registration, UserSummary};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;

pub mod link_service;
pub mod link_service_impl;
pub mod post_service;
pub mod post_service_impl;
pub mod profile_service;
pub mod profile_service_impl;

pub use link_service::{LinkError, LinkService};
pub use link_service_impl::SeaOrmLinkService;
pub use post_service::{PostError, PostService, PostView};
pub use post_service_impl::SeaOrmPostService;
pub use profile_service::{ProfileError, ProfileService, ProfileView};
pub use profile_service_impl::SeaOrmProfileService;

pub mod social_service;
pub use social_service::{SocialError, SocialService};

pub mod social_service_impl;
pub use social_service_impl::SeaOrmSocialService;
