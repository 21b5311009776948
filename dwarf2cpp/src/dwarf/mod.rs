#![allow(non_upper_case_globals)]

use std::path::Path;

use elf::ElfBytes;
use error_stack::{Report, Result, ResultExt};
use gimli::{DwarfFileType, DwAt, DwTag, EndianSlice};

use crate::parsed::NodeStore;
use common::ProgressPrinter;

mod entry_integer;
mod entry_name;
mod entry_type;

mod read_class;
use read_class::*;
mod read_enum;
use read_enum::*;
mod read_namespace;
use read_namespace::*;
mod read_subprogram;
use read_subprogram::*;
mod read_type;
use read_type::*;

mod resolve;
pub use resolve::{resolve_die, resolve_unit};

mod unit;
pub use unit::UnitCtx;

pub type In<'i> = EndianSlice<'i, gimli::LittleEndian>;
pub type Unit<'i> = gimli::Unit<In<'i>>;
pub type UnitHeader<'i> = gimli::UnitHeader<In<'i>>;
pub type Tree<'i, 'a, 'u> = gimli::EntriesTree<'a, 'u, In<'i>>;
pub type Node<'i, 'a, 'u, 't> = gimli::EntriesTreeNode<'a, 'u, 't, In<'i>>;
pub type Dwarf<'i> = gimli::Dwarf<In<'i>>;
pub type UnitOffset = gimli::UnitOffset<usize>;
#[allow(clippy::upper_case_acronyms)]
pub type DIE<'i, 'a, 'u> = gimli::DebuggingInformationEntry<'a, 'u, In<'i>, usize>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read ELF file `{0}`")]
    ReadElf(String),
    #[error("Failed to parse ELF")]
    ParseElf,
    #[error("Failed to read header for section `{0}`")]
    SectionHeader(String),
    #[error("Failed to read unit header")]
    ReadUnitHeader,
    #[error("Failed to create unit")]
    CreateUnit,
    #[error("Failed to create unit abbreviations")]
    CreateUnitAbbrev,
    #[error("Failed to create unit, expecting a DebugInfoOffset")]
    CreateUnitOffset,

    #[error("Failed to create entry tree")]
    CreateTree,
    #[error("Failed to read root of entry tree")]
    ReadRoot,
    #[error("Failed to read child entry")]
    ReadChild,
    #[error("Expecting a child entry, but none found")]
    ExpectingChild,
    #[error("Failed to read entry in unit")]
    ReadEntry,
    #[error("Failed to read DIE attribute `{0}`")]
    ReadEntryAttr(DwAt),
    #[error("Expected DIE attribute `{0}`, but it's not found")]
    MissingEntryAttr(DwAt),
    #[error("DIE attribute `{0}` should have type `{1}`")]
    BadEntryAttrType(DwAt, &'static str),

    #[error("Unimplemented DIE tag `{0}`")]
    UnimplementedTag(DwTag),
    #[error("Unexpected tag `{0}`")]
    UnexpectedTag(DwTag),
    #[error("Expected the referenced entry to resolve to {0}, but it is {1}")]
    WrongReferencedKind(&'static str, &'static str),
    #[error("Enumerator value is neither a signed nor an unsigned constant")]
    InvalidEnumeratorValue,
    #[error("Conflicting declarations while merging namespaces")]
    SymbolMerge,

    #[error("Failed to read string attribute")]
    AttrString,

    #[error("{0} at 0x{1:08x}")]
    Ctx(&'static str, usize),
}

macro_rules! process_units {
    ($units:ident, $desc:literal, $unit:ident, $root:ident, $block:block) => {{
        let progress = common::ProgressPrinter::new($units.len(), $desc);
        for (i, $unit) in $units.iter().enumerate() {
            progress.print(i, $unit.name);
            let mut tree = $unit.tree()?;
            let $root = $crate::dwarf::unit::err_ctx!($unit, $crate::dwarf::Error::ReadRoot, tree.root())?;
            $block
        }
        progress.done();
    }};
}
pub(crate) use process_units;

/// Read the ELF at `elf_path` and reconstruct the declaration tree from its
/// DWARF sections
pub fn parse(elf_path: &Path) -> Result<NodeStore, Error> {
    println!("Extracting DWARF from ELF {}", elf_path.display());
    let elf_bytes = std::fs::read(elf_path)
        .change_context_lazy(|| Error::ReadElf(elf_path.display().to_string()))?;
    let file = ElfBytes::<elf::endian::LittleEndian>::minimal_parse(&elf_bytes)
        .change_context(Error::ParseElf)?;

    let mut dwarf = gimli::Dwarf::load(|section| {
        let header = file
            .section_header_by_name(section.name())
            .change_context_lazy(|| Error::SectionHeader(section.name().to_string()))?;
        match header {
            Some(header) => {
                let start = header.sh_offset as usize;
                let end = start + header.sh_size as usize;
                let slice = EndianSlice::new(&elf_bytes[start..end], gimli::LittleEndian);
                Ok::<_, Report<Error>>(slice)
            }
            None => Ok(EndianSlice::new(&[], gimli::LittleEndian)),
        }
    })?;
    dwarf.file_type = DwarfFileType::Main;

    parse_dwarf(&dwarf)
}

/// Reconstruct the declaration tree from already-loaded DWARF data.
///
/// Every top-level DIE of every compile unit is resolved and merged into
/// the one global namespace; the first failure in any unit aborts the parse.
pub fn parse_dwarf<'i>(dwarf: &Dwarf<'i>) -> Result<NodeStore, Error> {
    let debug_info = dwarf.debug_info;

    let mut iter = debug_info.units();
    let mut units = Vec::new();
    let mut progress = ProgressPrinter::new(0, "Discover compile units");
    while let Some(unit_header) = iter.next().change_context(Error::ReadUnitHeader)? {
        let unit_ctx = UnitCtx::new(unit_header, dwarf)?;
        progress.set_total(units.len() + 1);
        progress.print(units.len(), unit_ctx.name);
        units.push(unit_ctx);
    }
    progress.done();

    let mut store = NodeStore::new();
    process_units!(units, "Resolve debug entries", unit, root, {
        resolve_unit(root, unit, &mut store)?;
    });
    println!("Resolved {} debug entries", store.len());

    Ok(store)
}
