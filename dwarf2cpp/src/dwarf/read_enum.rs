use error_stack::Result;

use crate::parsed::{self, anonymous_name, NodeId, NodeStore, TypeKind};

use super::resolve::resolve_die;
use super::unit::bad;
use super::{Error, UnitCtx, DIE};

/// Read the DIE as a DW_TAG_enumeration_type
pub fn read_enum_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    // enums can be anonymous
    let name = match unit.get_entry_name_optional(entry)? {
        Some(name) => name.to_string(),
        None => anonymous_name("enum", unit.to_global_offset(entry.offset())),
    };
    store.set_name(id, name.clone());
    let mut enumerators = Vec::new();
    unit.for_each_child_entry(entry, |child| {
        let child_entry = child.entry();
        let enumerator = resolve_die(child_entry.offset(), unit, store)?;
        match store.get(enumerator) {
            parsed::Node::Enumerator { .. } => enumerators.push(enumerator),
            other => {
                return bad!(
                    unit,
                    unit.to_global_offset(child_entry.offset()),
                    Error::WrongReferencedKind("an enumerator", other.kind_name())
                );
            }
        }
        Ok(())
    })?;
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Enum { enumerators },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_enumerator
pub fn read_enumerator<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let name = unit.get_entry_name(entry)?.to_string();
    let value = unit.get_entry_enum_value(entry)?;
    store.replace(id, parsed::Node::Enumerator { name, value });
    Ok(())
}
