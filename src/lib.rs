//! # SchemKit
//!
//! An editable-document engine for schematic and symbol drawings.
//!
//! ## Architecture
//!
//! SchemKit is organized as a workspace with multiple crates:
//!
//! 1. **schemkit-core** - Item handles, structural errors, event dispatch
//! 2. **schemkit-settings** - Editor configuration and its persistence
//! 3. **schemkit-designer** - Document model, commands, history, net resolver
//! 4. **schemkit** - This crate: logging setup and the command-line tool
//!
//! ## Features
//!
//! - **Undoable Editing**: Every change is a command; gestures become macros
//! - **Net Connectivity**: Collinear nets merge, crossings split, junctions get dots
//! - **Symbols**: Groups with pins that nets snap to
//! - **Persistence**: JSON design files

pub use schemkit_core as core;
pub use schemkit_designer as designer;
pub use schemkit_settings as settings;

pub use schemkit_designer::{
    CommandHistory, DesignFile, DesignerCommand, DesignerError, DesignerState, Document,
    NetResolver,
};
pub use schemkit_settings::EditorConfig;

/// Initialize logging with tracing-subscriber.
///
/// Honours `RUST_LOG`; defaults to `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// One-line summary of a design file's contents.
pub fn summarize(design: &DesignFile) -> anyhow::Result<String> {
    let doc = design.to_document()?;
    let symbols = doc
        .walk()
        .into_iter()
        .filter(|id| doc.get(*id).is_some_and(|i| i.is_symbol()))
        .count();
    Ok(format!(
        "{} (v{}): {} items, {} nets, {} junction dots, {} symbols, {} pins",
        design.metadata.name,
        design.version,
        doc.len(),
        doc.nets().len(),
        doc.junction_dots().len(),
        symbols,
        doc.pins().len()
    ))
}

/// Resolve every net of `design` and return the result. The second value
/// is the number of edits the resolution made.
pub fn heal(design: &DesignFile, config: &EditorConfig) -> anyhow::Result<(DesignFile, usize)> {
    let mut doc = design.to_document()?;
    let mut history = CommandHistory::new(usize::MAX);
    let resolver = NetResolver::from_config(config);

    history.begin_macro("Heal");
    resolver.resolve_all(&mut doc, &mut history)?;
    history.end_macro()?;

    let edits = history.undo_command().map_or(0, |c| c.leaf_count());
    let mut healed = DesignFile::from_document(&doc, design.metadata.name.clone());
    healed.metadata.id = design.metadata.id;
    healed.metadata.created = design.metadata.created;
    healed.metadata.author = design.metadata.author.clone();
    healed.metadata.description = design.metadata.description.clone();
    Ok((healed, edits))
}
