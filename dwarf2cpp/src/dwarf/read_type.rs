use error_stack::Result;
use gimli::{DW_TAG_member, DW_TAG_rvalue_reference_type, DW_TAG_subrange_type};

use crate::parsed::{
    self, array_name, const_name, pointer_name, reference_name, rvalue_reference_name,
    volatile_name, NodeId, NodeStore, TypeKind,
};

use super::resolve::{resolve_die, resolve_type_ref};
use super::unit::{bad, err_ctx, opt_ctx};
use super::{Error, UnitCtx, DIE};

/// Read the DIE as a DW_TAG_base_type, a language built-in
pub fn read_base_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let name = unit.get_entry_name(entry)?.to_string();
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Basic,
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_array_type. The element count comes from the
/// DW_AT_upper_bound of the first child, which must be a subrange.
pub fn read_array<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let elem_offset = unit.get_entry_type_offset(entry)?;
    let elem = resolve_type_ref(elem_offset, unit, store)?;
    let offset = entry.offset();
    let global_offset = unit.to_global_offset(offset);
    let mut tree = unit.tree_at(offset)?;
    let root = unit.root_of(offset, &mut tree)?;
    let mut children = root.children();
    let subrange = err_ctx!(unit, global_offset, Error::ReadChild, children.next())?;
    let subrange = opt_ctx!(unit, global_offset, Error::ExpectingChild, subrange)?;
    let subrange = subrange.entry();
    unit.check_tag(subrange, DW_TAG_subrange_type)?;
    // upper_bound is the highest valid index of the zero-based array
    let len = unit.get_entry_upper_bound(subrange)? + 1;
    let name = array_name(store.name_of(elem), len);
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Array { elem, len },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_pointer_type. A missing target means `void*`.
pub fn read_pointer_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let pointee = match unit.get_entry_type_offset_optional(entry)? {
        Some(offset) => Some(resolve_type_ref(offset, unit, store)?),
        None => None,
    };
    let name = pointer_name(pointee.map(|p| store.name_of(p)));
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Pointer { pointee },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_const_type. A missing target means `const void`.
pub fn read_const_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let pointee = match unit.get_entry_type_offset_optional(entry)? {
        Some(offset) => Some(resolve_type_ref(offset, unit, store)?),
        None => None,
    };
    let name = const_name(pointee.map(|p| store.name_of(p)));
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Const { pointee },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_reference_type or DW_TAG_rvalue_reference_type.
/// Unlike pointers, references require a target.
pub fn read_reference_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let offset = unit.get_entry_type_offset(entry)?;
    let pointee = resolve_type_ref(offset, unit, store)?;
    let (name, kind) = if entry.tag() == DW_TAG_rvalue_reference_type {
        (
            rvalue_reference_name(store.name_of(pointee)),
            TypeKind::RRef { pointee },
        )
    } else {
        (
            reference_name(store.name_of(pointee)),
            TypeKind::Ref { pointee },
        )
    };
    store.replace(id, parsed::Node::Typed { name, kind });
    Ok(())
}

/// Read the DIE as a DW_TAG_volatile_type
pub fn read_volatile_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let offset = unit.get_entry_type_offset(entry)?;
    let pointee = resolve_type_ref(offset, unit, store)?;
    let name = volatile_name(store.name_of(pointee));
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Volatile { pointee },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_typedef
pub fn read_typedef<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let name = unit.get_entry_name(entry)?.to_string();
    store.set_name(id, name.clone());
    let offset = unit.get_entry_type_offset(entry)?;
    let aliased = resolve_type_ref(offset, unit, store)?;
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Typedef { aliased },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_template_type_parameter or
/// DW_TAG_template_value_parameter, a locally named binding of another type
pub fn read_template_parameter<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let local_name = unit.get_entry_name_optional(entry)?.map(str::to_string);
    if let Some(name) = &local_name {
        store.set_name(id, name.clone());
    }
    let offset = unit.get_entry_type_offset(entry)?;
    let ty = resolve_type_ref(offset, unit, store)?;
    let name = local_name.unwrap_or_else(|| store.name_of(ty).to_string());
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Named { ty },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_ptr_to_member_type. The containing type must be
/// a class and the pointee must be a subroutine type.
pub fn read_ptr_to_member_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let class_offset = unit.get_entry_containing_type_offset(entry)?;
    let class = resolve_die(class_offset, unit, store)?;
    match store.get(class) {
        parsed::Node::Typed {
            kind: TypeKind::Class(_),
            ..
        } => {}
        other => {
            return bad!(
                unit,
                unit.to_global_offset(class_offset),
                Error::WrongReferencedKind("a class", other.kind_name())
            );
        }
    }
    let func_offset = unit.get_entry_type_offset(entry)?;
    let func = resolve_die(func_offset, unit, store)?;
    match store.get(func) {
        parsed::Node::Typed {
            kind: TypeKind::Subroutine { .. },
            ..
        } => {}
        other => {
            return bad!(
                unit,
                unit.to_global_offset(func_offset),
                Error::WrongReferencedKind("a subroutine type", other.kind_name())
            );
        }
    }
    let name = store.member_pointer_name(class, func);
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::PtrToMember { class, func },
        },
    );
    Ok(())
}

/// Read the DIE as a DW_TAG_formal_parameter, DW_TAG_member or
/// DW_TAG_variable. Members must be named; the other two may be anonymous.
pub fn read_value<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let name = if entry.tag() == DW_TAG_member {
        Some(unit.get_entry_name(entry)?.to_string())
    } else {
        unit.get_entry_name_optional(entry)?.map(str::to_string)
    };
    let ty_offset = unit.get_entry_type_offset(entry)?;
    let ty = resolve_type_ref(ty_offset, unit, store)?;
    store.replace(id, parsed::Node::Value { name, ty });
    Ok(())
}
