use anyhow::Result;
use lectern_core::Value;

use super::{open_invoker, print_json};
use crate::config::Config;

/// Invoke any registered procedure, binding every argument as text.
///
/// Prints the validated rows as JSON regardless of `--json`, since the
/// column set is only known at runtime.
pub fn call_procedure(config: &Config, name: &str, args: &[String]) -> Result<()> {
    let invoker = open_invoker(config)?;
    let params: Vec<Value> = args.iter().map(|a| Value::from(a.as_str())).collect();
    let rows = invoker.invoke(name, &params)?;
    log::info!("{name} returned {} rows", rows.len());
    print_json(&rows)
}
