use anyhow::anyhow;

use glottoreg_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output;

/// Handle `glt schema`: print one schema, or list all registered names.
pub fn handle(args: &SchemaArgs, _flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match args.name.as_deref() {
        Some(name) => {
            let schema = registry.get(name).ok_or_else(|| {
                anyhow!(
                    "unknown schema '{name}' (available: {})",
                    registry.list().join(", ")
                )
            })?;
            output::json(schema)
        }
        None => {
            for name in registry.list() {
                println!("{name}");
            }
            Ok(())
        }
    }
}
