use anyhow::Result;

use crate::config::{self, Config};

/// Show the current effective configuration.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!(
        "  manifest_path: {}",
        config
            .manifest_path
            .as_ref()
            .map_or_else(|| String::from("<not set>"), |p| p.display().to_string())
    );
    println!("  logging.level: {}", config.logging.level);
    println!("  logging.coloured: {}", config.logging.coloured);
    println!("  logging.report_caller: {}", config.logging.report_caller);

    println!("\nPriority: CLI args > ENV vars (LECTERN_*) > Config file > Defaults");

    Ok(())
}

/// Write the commented default config file.
pub fn init_config() -> Result<()> {
    let path = config::config_file_path();
    if config::ensure_config_file()? {
        println!("Created config file: {}", path.display());
    } else {
        println!("Config file already exists: {}", path.display());
    }
    Ok(())
}

pub fn show_path() {
    println!("{}", config::config_file_path().display());
}
