pub mod call;
pub mod config;
pub mod post;
pub mod procedures;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use lectern_core::procedure::ProcedureManifest;
use lectern_core::schema::Database;
use lectern_core::{catalog, ProcedureInvoker, ProcedureRegistry};
use serde::Serialize;

use crate::config::Config;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    pub const fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub fn open_database(config: &Config) -> Result<Database> {
    Database::open(&config.database_path).with_context(|| {
        format!("Failed to open database at {}", config.database_path.display())
    })
}

/// Built-in contracts plus whatever the configured manifest declares.
pub fn load_registry(config: &Config) -> Result<ProcedureRegistry> {
    let mut registry = catalog::registry()?;
    if let Some(path) = &config.manifest_path {
        let manifest = ProcedureManifest::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?;
        let added = manifest.register_into(&mut registry)?;
        log::info!("Registered {added} procedures from {}", path.display());
    }
    Ok(registry)
}

pub fn open_invoker(config: &Config) -> Result<ProcedureInvoker<Database>> {
    let registry = load_registry(config)?;
    let db = open_database(config)?;
    Ok(ProcedureInvoker::new(registry, db))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
