use error_stack::Result;
use gimli::{
    DW_TAG_formal_parameter, DW_TAG_template_type_parameter, DW_TAG_template_value_parameter,
};

use crate::parsed::{self, NodeId, NodeStore, TypeKind};

use super::resolve::{resolve_die, resolve_type_ref};
use super::unit::bad;
use super::{Error, UnitCtx, DIE};

/// Gather the parameter Values and the template parameters declared as
/// children of a subprogram or subroutine type. Other children (lexical
/// blocks, local variables) don't shape the signature and are skipped.
fn read_signature_children<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
) -> Result<(Vec<NodeId>, Vec<NodeId>), Error> {
    let mut params = Vec::new();
    let mut template_params = Vec::new();
    unit.for_each_child_entry(entry, |child| {
        let child_entry = child.entry();
        match child_entry.tag() {
            DW_TAG_formal_parameter => {
                params.push(resolve_die(child_entry.offset(), unit, store)?);
            }
            DW_TAG_template_type_parameter | DW_TAG_template_value_parameter => {
                template_params.push(resolve_die(child_entry.offset(), unit, store)?);
            }
            _ => {}
        }
        Ok(())
    })?;
    Ok((params, template_params))
}

/// Read the DIE as a DW_TAG_subprogram
pub fn read_subprogram<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    // an out-of-class definition refers back to its in-class declaration;
    // its children carry the real parameter list, which completes the
    // declaration node. The node for this DIE stays an anonymous
    // placeholder and is never printed.
    if let Some(spec_offset) = unit.get_entry_specification(entry)? {
        let target = resolve_die(spec_offset, unit, store)?;
        match store.get(target) {
            parsed::Node::SubProgram { .. } => {}
            other => {
                return bad!(
                    unit,
                    unit.to_global_offset(spec_offset),
                    Error::WrongReferencedKind("a subprogram", other.kind_name())
                );
            }
        }
        let (params, _) = read_signature_children(entry, unit, store)?;
        store.set_subprogram_params(target, params);
        return Ok(());
    }
    let name = unit.get_entry_name(entry)?.to_string();
    store.set_name(id, name.clone());
    let ret = match unit.get_entry_type_offset_optional(entry)? {
        Some(offset) => Some(resolve_type_ref(offset, unit, store)?),
        None => None,
    };
    let is_virtual = unit.get_entry_virtuality(entry)?;
    let (params, template_params) = read_signature_children(entry, unit, store)?;
    store.replace(
        id,
        parsed::Node::SubProgram {
            name,
            ret,
            params,
            is_virtual,
            template_params,
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_subroutine_type, a function type with no name
/// of its own
pub fn read_subroutine_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let ret = match unit.get_entry_type_offset_optional(entry)? {
        Some(offset) => Some(resolve_type_ref(offset, unit, store)?),
        None => None,
    };
    let (params, _) = read_signature_children(entry, unit, store)?;
    let name = store.subroutine_display_name(ret, &params);
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Subroutine { ret, params },
        },
    );
    Ok(())
}
