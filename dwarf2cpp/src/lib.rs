use std::path::PathBuf;

use error_stack::{Result, ResultExt};

pub mod dwarf;
pub mod parsed;

pub use parsed::NodeStore;

pub struct Options {
    /// Input ELF with DWARF debug info
    pub elf: PathBuf,
    /// Where to write the reconstructed header
    pub output: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to process DWARF")]
    Dwarf,
    #[error("Failed to write output file")]
    WriteFile,
}

/// Reconstruct the type and declaration tree of an ELF's DWARF info and
/// write it out as a header
pub fn extract(options: &Options) -> Result<(), Error> {
    let store = dwarf::parse(&options.elf).change_context(Error::Dwarf)?;

    let header = store.render_header();

    // statistics
    let mut namespace_count = 0usize;
    let mut class_count = 0;
    let mut enum_count = 0;
    let mut typedef_count = 0;
    let mut func_count = 0;
    for node in store.iter() {
        match node {
            parsed::Node::Namespace { .. } => namespace_count += 1,
            parsed::Node::Typed { kind, .. } => match kind {
                parsed::TypeKind::Class(_) => class_count += 1,
                parsed::TypeKind::Enum { .. } => enum_count += 1,
                parsed::TypeKind::Typedef { .. } => typedef_count += 1,
                _ => {}
            },
            parsed::Node::SubProgram { name, .. } if !name.is_empty() => func_count += 1,
            _ => {}
        }
    }
    println!("Reconstructed:");
    // don't count the global namespace
    println!("  namespaces: {}", namespace_count.saturating_sub(1));
    println!("  classes: {}", class_count);
    println!("  enums: {}", enum_count);
    println!("  typedefs: {}", typedef_count);
    println!("  functions: {}", func_count);

    common::ensure_parent_exists(&options.output).change_context(Error::WriteFile)?;
    std::fs::write(&options.output, header).change_context(Error::WriteFile)?;
    println!("Output written to {}", options.output.display());

    Ok(())
}
