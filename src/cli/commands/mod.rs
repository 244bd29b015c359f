mod register;
mod search;

pub use register::cmd_register;
pub use search::cmd_search_users;
