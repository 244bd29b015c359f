use sea_orm_migration::prelude::*;

mod m20240408_initial;
mod m20240420_add_follows;
mod m20240502_add_spotify_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240408_initial::Migration),
            Box::new(m20240420_add_follows::Migration),
            Box::new(m20240502_add_spotify_tokens::Migration),
        ]
    }
}
