use std::collections::BTreeMap;

use error_stack::Result;
use gimli::{
    DW_TAG_GNU_template_template_param, DW_TAG_array_type, DW_TAG_base_type, DW_TAG_class_type,
    DW_TAG_const_type, DW_TAG_enumeration_type, DW_TAG_enumerator, DW_TAG_formal_parameter,
    DW_TAG_imported_declaration, DW_TAG_imported_module, DW_TAG_member, DW_TAG_namespace,
    DW_TAG_pointer_type, DW_TAG_ptr_to_member_type, DW_TAG_reference_type,
    DW_TAG_rvalue_reference_type, DW_TAG_structure_type, DW_TAG_subprogram,
    DW_TAG_subroutine_type, DW_TAG_template_type_parameter, DW_TAG_template_value_parameter,
    DW_TAG_typedef, DW_TAG_union_type, DW_TAG_variable, DwTag,
};

use crate::parsed::{self, ClassInfo, ClassKeyword, EnumValue, NodeId, NodeStore, TypeKind};

use super::unit::{bad, err_ctx};
use super::{
    read_array, read_base_type, read_class_type, read_const_type, read_enum_type, read_enumerator,
    read_namespace, read_pointer_type, read_ptr_to_member_type, read_reference_type,
    read_subprogram, read_subroutine_type, read_template_parameter, read_typedef, read_value,
    read_volatile_type, Error, Node, UnitCtx, UnitOffset,
};

/// Resolve every top-level DIE of a compile unit and merge the results into
/// the global namespace
pub fn resolve_unit<'i>(
    node: Node<'i, '_, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
) -> Result<(), Error> {
    let global = store.global();
    unit.for_each_child(node, |child| {
        let offset = child.entry().offset();
        let id = resolve_die(offset, unit, store)?;
        let merged = store.merge_into(global, id);
        err_ctx!(unit, unit.to_global_offset(offset), Error::SymbolMerge, merged)
    })
}

/// Produce the unique node for the DIE at `offset`, parsing it on the first
/// visit.
///
/// The memo entry is created before the payload is parsed, so a reference
/// cycle lands back on the placeholder instead of descending forever. The
/// placeholder already has the right variant; callers observing it mid-parse
/// may see a payload that is still being filled further up the stack.
pub fn resolve_die<'i>(
    offset: UnitOffset,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
) -> Result<NodeId, Error> {
    let global_offset = unit.to_global_offset(offset);
    if let Some(id) = store.lookup(global_offset) {
        return Ok(id);
    }
    let entry = unit.entry_at(offset)?;
    let tag = entry.tag();
    let placeholder = match placeholder_for(tag) {
        Some(node) => node,
        None => return bad!(unit, global_offset, Error::UnimplementedTag(tag)),
    };
    let id = store.insert(global_offset, placeholder);
    match tag {
        DW_TAG_array_type => read_array(&entry, unit, store, id)?,
        DW_TAG_base_type => read_base_type(&entry, unit, store, id)?,
        DW_TAG_class_type | DW_TAG_structure_type | DW_TAG_union_type => {
            read_class_type(&entry, unit, store, id)?
        }
        DW_TAG_const_type => read_const_type(&entry, unit, store, id)?,
        DW_TAG_enumeration_type => read_enum_type(&entry, unit, store, id)?,
        DW_TAG_enumerator => read_enumerator(&entry, unit, store, id)?,
        DW_TAG_formal_parameter | DW_TAG_member | DW_TAG_variable => {
            read_value(&entry, unit, store, id)?
        }
        DW_TAG_imported_declaration
        | DW_TAG_imported_module
        | DW_TAG_GNU_template_template_param => {}
        DW_TAG_namespace => read_namespace(&entry, unit, store, id)?,
        DW_TAG_pointer_type => read_pointer_type(&entry, unit, store, id)?,
        DW_TAG_ptr_to_member_type => read_ptr_to_member_type(&entry, unit, store, id)?,
        DW_TAG_reference_type | DW_TAG_rvalue_reference_type => {
            read_reference_type(&entry, unit, store, id)?
        }
        DW_TAG_subprogram => read_subprogram(&entry, unit, store, id)?,
        DW_TAG_subroutine_type => read_subroutine_type(&entry, unit, store, id)?,
        DW_TAG_template_type_parameter | DW_TAG_template_value_parameter => {
            read_template_parameter(&entry, unit, store, id)?
        }
        DW_TAG_typedef => read_typedef(&entry, unit, store, id)?,
        DW_TAG_volatile_type => read_volatile_type(&entry, unit, store, id)?,
        _ => unreachable!("tag accepted by placeholder_for but not dispatched"),
    }
    Ok(id)
}

/// The empty node inserted into the memo table before a DIE's payload is
/// parsed. None for tags outside the implemented set.
fn placeholder_for(tag: DwTag) -> Option<parsed::Node> {
    let node = match tag {
        DW_TAG_array_type => parsed::Node::typed(TypeKind::Array {
            elem: NodeId::INVALID,
            len: 0,
        }),
        DW_TAG_base_type => parsed::Node::typed(TypeKind::Basic),
        DW_TAG_class_type => parsed::Node::typed(TypeKind::Class(ClassInfo::new(
            ClassKeyword::Class,
        ))),
        DW_TAG_structure_type => parsed::Node::typed(TypeKind::Class(ClassInfo::new(
            ClassKeyword::Struct,
        ))),
        DW_TAG_union_type => parsed::Node::typed(TypeKind::Class(ClassInfo::new(
            ClassKeyword::Union,
        ))),
        DW_TAG_const_type => parsed::Node::typed(TypeKind::Const { pointee: None }),
        DW_TAG_enumeration_type => parsed::Node::typed(TypeKind::Enum {
            enumerators: Vec::new(),
        }),
        DW_TAG_enumerator => parsed::Node::Enumerator {
            name: String::new(),
            value: EnumValue::Unsigned(0),
        },
        DW_TAG_formal_parameter | DW_TAG_member | DW_TAG_variable => parsed::Node::Value {
            name: None,
            ty: NodeId::INVALID,
        },
        DW_TAG_imported_declaration
        | DW_TAG_imported_module
        | DW_TAG_GNU_template_template_param => parsed::Node::Ignored,
        DW_TAG_namespace => parsed::Node::Namespace {
            name: String::new(),
            children: BTreeMap::new(),
        },
        DW_TAG_pointer_type => parsed::Node::typed(TypeKind::Pointer { pointee: None }),
        DW_TAG_ptr_to_member_type => parsed::Node::typed(TypeKind::PtrToMember {
            class: NodeId::INVALID,
            func: NodeId::INVALID,
        }),
        DW_TAG_reference_type => parsed::Node::typed(TypeKind::Ref {
            pointee: NodeId::INVALID,
        }),
        DW_TAG_rvalue_reference_type => parsed::Node::typed(TypeKind::RRef {
            pointee: NodeId::INVALID,
        }),
        DW_TAG_subprogram => parsed::Node::SubProgram {
            name: String::new(),
            ret: None,
            params: Vec::new(),
            is_virtual: false,
            template_params: Vec::new(),
        },
        DW_TAG_subroutine_type => parsed::Node::typed(TypeKind::Subroutine {
            ret: None,
            params: Vec::new(),
        }),
        DW_TAG_template_type_parameter | DW_TAG_template_value_parameter => {
            parsed::Node::typed(TypeKind::Named {
                ty: NodeId::INVALID,
            })
        }
        DW_TAG_typedef => parsed::Node::typed(TypeKind::Typedef {
            aliased: NodeId::INVALID,
        }),
        DW_TAG_volatile_type => parsed::Node::typed(TypeKind::Volatile {
            pointee: NodeId::INVALID,
        }),
        _ => return None,
    };
    Some(node)
}

/// Resolve a DIE reference that must produce a type
pub fn resolve_type_ref<'i>(
    offset: UnitOffset,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
) -> Result<NodeId, Error> {
    let id = resolve_die(offset, unit, store)?;
    match store.get(id) {
        parsed::Node::Typed { .. } => Ok(id),
        other => bad!(
            unit,
            unit.to_global_offset(offset),
            Error::WrongReferencedKind("a type", other.kind_name())
        ),
    }
}
