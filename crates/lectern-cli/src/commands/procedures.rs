use anyhow::Result;
use serde::Serialize;

use super::{load_registry, open_database, print_json, Output};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct ProcedureListing {
    name: String,
    params: Vec<String>,
    columns: Vec<(String, String)>,
    deployed: bool,
}

/// Registered contracts, and whether a body is deployed for each.
pub fn list_procedures(config: &Config, output: Output) -> Result<()> {
    let registry = load_registry(config)?;
    let db = open_database(config)?;
    let deployed = db.list_procedures()?;

    let listings: Vec<ProcedureListing> = registry
        .specs()
        .map(|spec| ProcedureListing {
            name: spec.name().to_string(),
            params: spec.params().to_vec(),
            columns: spec
                .columns()
                .iter()
                .map(|c| (c.name.clone(), c.semantic_type.to_string()))
                .collect(),
            deployed: deployed.iter().any(|p| p.name == spec.name()),
        })
        .collect();

    if output == Output::Json {
        return print_json(&listings);
    }

    for listing in &listings {
        let marker = if listing.deployed { "" } else { "  (not deployed)" };
        println!("{}({}){marker}", listing.name, listing.params.join(", "));
        for (column, ty) in &listing.columns {
            println!("    {column}: {ty}");
        }
    }

    let orphans: Vec<&str> = deployed
        .iter()
        .filter(|p| !registry.contains(&p.name))
        .map(|p| p.name.as_str())
        .collect();
    if !orphans.is_empty() {
        println!("\nDeployed without a contract: {}", orphans.join(", "));
    }
    Ok(())
}
