use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, SeaOrmAccountService};

pub async fn cmd_search_users(config: &Config, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let store = Store::new(&config.general.database_path).await?;
    let accounts = SeaOrmAccountService::new(store, config.security.clone());
    let results = accounts.search(query, config.server.search_limit).await?;

    if results.is_empty() {
        println!("No users found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<40}", "");

    for user in &results {
        println!("• {} (ID: {})", user.username, user.user_id);
    }

    Ok(())
}
