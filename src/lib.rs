use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod config;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod rankings;
pub mod schema;
pub mod scoring;
pub mod stats;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
