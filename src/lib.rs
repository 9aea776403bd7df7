pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod images;
pub mod label_synth;
pub mod models;
pub mod providers;
pub mod routes;
pub mod scan;
pub mod schema;
pub mod services;
pub mod state;

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
