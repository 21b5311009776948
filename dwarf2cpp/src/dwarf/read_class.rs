use error_stack::Result;
use gimli::{
    DW_TAG_class_type, DW_TAG_inheritance, DW_TAG_template_type_parameter,
    DW_TAG_template_value_parameter, DW_TAG_union_type,
};

use crate::parsed::{self, anonymous_name, ClassInfo, ClassKeyword, NodeId, NodeStore, TypeKind};

use super::resolve::resolve_die;
use super::unit::bad;
use super::{Error, UnitCtx, DIE};

/// Read a DW_TAG_class_type, DW_TAG_structure_type or DW_TAG_union_type.
///
/// The three tags share one shape; only the default member accessibility
/// differs, private for `class` and public for the other two.
pub fn read_class_type<'i>(
    entry: &DIE<'i, '_, '_>,
    unit: &UnitCtx<'_, 'i>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), Error> {
    let keyword = match entry.tag() {
        DW_TAG_class_type => ClassKeyword::Class,
        DW_TAG_union_type => ClassKeyword::Union,
        _ => ClassKeyword::Struct,
    };
    // classes can be anonymous, those get a stable generated name
    let name = match unit.get_entry_name_optional(entry)? {
        Some(name) => name.to_string(),
        None => anonymous_name(keyword.keyword(), unit.to_global_offset(entry.offset())),
    };
    // members may point back at this class, make the name visible first
    store.set_name(id, name.clone());
    let default_access = keyword.default_access();
    let mut info = ClassInfo::new(keyword);
    unit.for_each_child_entry(entry, |child| {
        let child_entry = child.entry();
        match child_entry.tag() {
            DW_TAG_inheritance => {
                let ty_offset = unit.get_entry_type_offset(child_entry)?;
                let base = resolve_die(ty_offset, unit, store)?;
                match store.get(base) {
                    parsed::Node::Typed {
                        kind: TypeKind::Class(_),
                        ..
                    } => {}
                    other => {
                        return bad!(
                            unit,
                            unit.to_global_offset(child_entry.offset()),
                            Error::WrongReferencedKind("a class", other.kind_name())
                        );
                    }
                }
                let access = unit
                    .get_entry_accessibility(child_entry)?
                    .unwrap_or(default_access);
                info.bases.push((base, access));
            }
            DW_TAG_template_type_parameter | DW_TAG_template_value_parameter => {
                let param = resolve_die(child_entry.offset(), unit, store)?;
                info.template_params.push(param);
            }
            _ => {
                let member = resolve_die(child_entry.offset(), unit, store)?;
                if store.get(member).is_namespace() {
                    return bad!(
                        unit,
                        unit.to_global_offset(child_entry.offset()),
                        Error::WrongReferencedKind("a class member", "a namespace")
                    );
                }
                let access = unit
                    .get_entry_accessibility(child_entry)?
                    .unwrap_or(default_access);
                info.members.push((member, access));
                store.record_parent(member, id);
            }
        }
        Ok(())
    })?;
    store.replace(
        id,
        parsed::Node::Typed {
            name,
            kind: TypeKind::Class(info),
        },
    );
    Ok(())
}
