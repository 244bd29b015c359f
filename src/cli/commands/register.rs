use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountError, AccountService, Registration, SeaOrmAccountService};

pub async fn cmd_register(
    config: &Config,
    username: &str,
    email: &str,
    password: &str,
    bio: Option<String>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let accounts = SeaOrmAccountService::new(store, config.security.clone());

    let registration = Registration {
        username: username.to_string(),
        password: password.to_string(),
        email: email.to_string(),
        bio,
    };

    match accounts.register(registration).await {
        Ok(user) => {
            println!("✓ Registered '{}' (ID: {})", user.username, user.user_id);
            Ok(())
        }
        Err(e @ (AccountError::UsernameTaken | AccountError::EmailTaken)) => {
            println!("✗ {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
