use anyhow::Context;
use dv_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `dataview schema`. Needs no project.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();

    let Some(name) = args.type_name.as_deref() else {
        return output(&registry.list(), flags.format);
    };

    let schema = registry.get(name).with_context(|| {
        format!(
            "unknown schema '{name}'; available: {}",
            registry.list().join(", ")
        )
    })?;
    output(schema, flags.format)
}
