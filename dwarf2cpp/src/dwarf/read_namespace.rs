use error_stack::Result;

use crate::parsed::{NodeId, NodeStore};

use super::resolve::resolve_die;
use super::unit::err_ctx;
use super::{Error, UnitCtx, DIE};

/// Read the DIE as a DW_TAG_namespace, merging each child into it
pub fn read_namespace<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    // anonymous namespaces from every unit collapse into one bucket
    let name = match unit.get_entry_name_optional(entry)? {
        Some(name) => name.to_string(),
        None => "::".to_string(),
    };
    store.set_name(id, name);
    unit.for_each_child_entry(entry, |child| {
        let child_offset = child.entry().offset();
        let member = resolve_die(child_offset, unit, store)?;
        let merged = store.merge_into(id, member);
        err_ctx!(
            unit,
            unit.to_global_offset(child_offset),
            Error::SymbolMerge,
            merged
        )
    })
}
