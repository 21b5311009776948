//! End-to-end tests over synthetic DWARF: compile units are authored with
//! `gimli::write`, emitted to in-memory sections, read back, and pushed
//! through the full parse + print pipeline.

use gimli::write::{self, AttributeValue, EndianVec, LineProgram, Sections, Unit, UnitEntryId};
use gimli::{EndianSlice, LittleEndian, SectionId};

use dwarf2cpp::dwarf::parse_dwarf;
use dwarf2cpp::NodeStore;

fn encoding() -> gimli::Encoding {
    gimli::Encoding {
        format: gimli::Format::Dwarf32,
        version: 4,
        address_size: 8,
    }
}

/// Add a compile unit with the given source name, returning its id
fn add_unit(dwarf: &mut write::Dwarf, name: &str) -> write::UnitId {
    let unit_id = dwarf.units.add(Unit::new(encoding(), LineProgram::none()));
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    unit.get_mut(root).set(
        gimli::DW_AT_name,
        AttributeValue::String(name.as_bytes().to_vec()),
    );
    unit_id
}

fn add_die(
    unit: &mut Unit,
    parent: UnitEntryId,
    tag: gimli::DwTag,
    name: Option<&str>,
) -> UnitEntryId {
    let id = unit.add(parent, tag);
    if let Some(name) = name {
        unit.get_mut(id).set(
            gimli::DW_AT_name,
            AttributeValue::String(name.as_bytes().to_vec()),
        );
    }
    id
}

fn set_type(unit: &mut Unit, die: UnitEntryId, ty: UnitEntryId) {
    unit.get_mut(die)
        .set(gimli::DW_AT_type, AttributeValue::UnitRef(ty));
}

fn emit(dwarf: &mut write::Dwarf) -> Vec<(SectionId, Vec<u8>)> {
    let mut sections = Sections::new(EndianVec::new(LittleEndian));
    dwarf.write(&mut sections).expect("emit dwarf");
    let mut out = Vec::new();
    sections
        .for_each(|id, data| -> Result<(), std::convert::Infallible> {
            out.push((id, data.slice().to_vec()));
            Ok(())
        })
        .expect("collect sections");
    out
}

fn load<'a>(
    sections: &'a [(SectionId, Vec<u8>)],
) -> gimli::Dwarf<EndianSlice<'a, LittleEndian>> {
    gimli::Dwarf::load(|id| {
        let data = sections
            .iter()
            .find(|(section, _)| *section == id)
            .map(|(_, data)| data.as_slice())
            .unwrap_or(&[]);
        Ok::<_, gimli::Error>(EndianSlice::new(data, LittleEndian))
    })
    .expect("load sections")
}

fn parse(dwarf: &mut write::Dwarf) -> error_stack::Result<NodeStore, dwarf2cpp::dwarf::Error> {
    let sections = emit(dwarf);
    let read_dwarf = load(&sections);
    parse_dwarf(&read_dwarf)
}

fn render(dwarf: &mut write::Dwarf) -> String {
    parse(dwarf).expect("parse should succeed").render_header()
}

#[test]
fn empty_namespace() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    add_die(unit, root, gimli::DW_TAG_namespace, Some("N"));
    assert_eq!(render(&mut dwarf), "namespace N\n{\n};\n");
}

#[test]
fn struct_with_two_members() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let p = add_die(unit, root, gimli::DW_TAG_structure_type, Some("P"));
    let x = add_die(unit, p, gimli::DW_TAG_member, Some("x"));
    set_type(unit, x, int);
    let y = add_die(unit, p, gimli::DW_TAG_member, Some("y"));
    set_type(unit, y, int);
    assert_eq!(render(&mut dwarf), "struct P\n{\n\tint x;\n\tint y;\n};\n");
}

#[test]
fn class_access_label_on_transition_only() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let class = add_die(unit, root, gimli::DW_TAG_class_type, Some("C"));
    let priv_member = add_die(unit, class, gimli::DW_TAG_member, Some("priv"));
    set_type(unit, priv_member, int);
    let pub_member = add_die(unit, class, gimli::DW_TAG_member, Some("pub"));
    set_type(unit, pub_member, int);
    unit.get_mut(pub_member).set(
        gimli::DW_AT_accessibility,
        AttributeValue::Accessibility(gimli::DW_ACCESS_public),
    );
    assert_eq!(
        render(&mut dwarf),
        "class C\n{\n\tint priv;\npublic:\n\tint pub;\n};\n"
    );
}

#[test]
fn pointer_cycle_terminates() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let node = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Node"));
    let ptr = add_die(unit, root, gimli::DW_TAG_pointer_type, None);
    set_type(unit, ptr, node);
    let next = add_die(unit, node, gimli::DW_TAG_member, Some("next"));
    set_type(unit, next, ptr);
    assert_eq!(render(&mut dwarf), "struct Node\n{\n\tNode* next;\n};\n");
}

#[test]
fn subprogram_specification_fusion() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let decl = add_die(unit, root, gimli::DW_TAG_subprogram, Some("f"));
    set_type(unit, decl, int);
    let def = add_die(unit, root, gimli::DW_TAG_subprogram, None);
    unit.get_mut(def)
        .set(gimli::DW_AT_specification, AttributeValue::UnitRef(decl));
    let x = add_die(unit, def, gimli::DW_TAG_formal_parameter, Some("x"));
    set_type(unit, x, int);
    assert_eq!(render(&mut dwarf), "int f(int x);\n");
}

#[test]
fn subprogram_specification_fusion_definition_first() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    // the definition comes before the declaration it refers to
    let def = add_die(unit, root, gimli::DW_TAG_subprogram, None);
    let x = add_die(unit, def, gimli::DW_TAG_formal_parameter, Some("x"));
    set_type(unit, x, int);
    let decl = add_die(unit, root, gimli::DW_TAG_subprogram, Some("f"));
    set_type(unit, decl, int);
    unit.get_mut(def)
        .set(gimli::DW_AT_specification, AttributeValue::UnitRef(decl));
    assert_eq!(render(&mut dwarf), "int f(int x);\n");
}

#[test]
fn namespace_merge_across_units() {
    let mut dwarf = write::Dwarf::default();
    let unit_a = add_unit(&mut dwarf, "a.cpp");
    {
        let unit = dwarf.units.get_mut(unit_a);
        let root = unit.root();
        let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
        let ns = add_die(unit, root, gimli::DW_TAG_namespace, Some("std"));
        let size_t = add_die(unit, ns, gimli::DW_TAG_typedef, Some("size_t"));
        set_type(unit, size_t, int);
    }
    let unit_b = add_unit(&mut dwarf, "b.cpp");
    {
        let unit = dwarf.units.get_mut(unit_b);
        let root = unit.root();
        let long = add_die(unit, root, gimli::DW_TAG_base_type, Some("long"));
        let ns = add_die(unit, root, gimli::DW_TAG_namespace, Some("std"));
        let ptrdiff_t = add_die(unit, ns, gimli::DW_TAG_typedef, Some("ptrdiff_t"));
        set_type(unit, ptrdiff_t, long);
    }
    assert_eq!(
        render(&mut dwarf),
        "namespace std\n{\n\ttypedef long ptrdiff_t;\n\ttypedef int size_t;\n};\n"
    );
}

#[test]
fn modifiers_without_target_become_void() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let ptr = add_die(unit, root, gimli::DW_TAG_pointer_type, None);
    let vp = add_die(unit, root, gimli::DW_TAG_typedef, Some("vp"));
    set_type(unit, vp, ptr);
    let cv_const = add_die(unit, root, gimli::DW_TAG_const_type, None);
    let cv = add_die(unit, root, gimli::DW_TAG_typedef, Some("cv"));
    set_type(unit, cv, cv_const);
    assert_eq!(
        render(&mut dwarf),
        "typedef const void cv;\ntypedef void* vp;\n"
    );
}

#[test]
fn reference_and_volatile_names() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let reference = add_die(unit, root, gimli::DW_TAG_reference_type, None);
    set_type(unit, reference, int);
    let rref = add_die(unit, root, gimli::DW_TAG_rvalue_reference_type, None);
    set_type(unit, rref, int);
    let volatile = add_die(unit, root, gimli::DW_TAG_volatile_type, None);
    set_type(unit, volatile, int);
    for (alias, ty) in [("ref_t", reference), ("rref_t", rref), ("vol_t", volatile)] {
        let typedef = add_die(unit, root, gimli::DW_TAG_typedef, Some(alias));
        set_type(unit, typedef, ty);
    }
    assert_eq!(
        render(&mut dwarf),
        "typedef int& ref_t;\ntypedef int&& rref_t;\ntypedef volatile int vol_t;\n"
    );
}

#[test]
fn array_member_uses_element_count() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let array = add_die(unit, root, gimli::DW_TAG_array_type, None);
    set_type(unit, array, int);
    let subrange = add_die(unit, array, gimli::DW_TAG_subrange_type, None);
    unit.get_mut(subrange)
        .set(gimli::DW_AT_upper_bound, AttributeValue::Udata(3));
    let s = add_die(unit, root, gimli::DW_TAG_structure_type, Some("S"));
    let arr = add_die(unit, s, gimli::DW_TAG_member, Some("arr"));
    set_type(unit, arr, array);
    assert_eq!(render(&mut dwarf), "struct S\n{\n\tint[4] arr;\n};\n");
}

#[test]
fn array_without_upper_bound_fails() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let array = add_die(unit, root, gimli::DW_TAG_array_type, None);
    set_type(unit, array, int);
    add_die(unit, array, gimli::DW_TAG_subrange_type, None);
    let s = add_die(unit, root, gimli::DW_TAG_structure_type, Some("S"));
    let arr = add_die(unit, s, gimli::DW_TAG_member, Some("arr"));
    set_type(unit, arr, array);
    let err = parse(&mut dwarf).unwrap_err();
    assert!(format!("{:?}", err).contains("DW_AT_upper_bound"));
}

#[test]
fn inheritance_renders_with_access() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let base = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Base"));
    let derived = add_die(unit, root, gimli::DW_TAG_class_type, Some("Derived"));
    let inherit = add_die(unit, derived, gimli::DW_TAG_inheritance, None);
    set_type(unit, inherit, base);
    unit.get_mut(inherit).set(
        gimli::DW_AT_accessibility,
        AttributeValue::Accessibility(gimli::DW_ACCESS_public),
    );
    let header = render(&mut dwarf);
    assert!(header.contains("class Derived : public Base\n"));
    assert!(header.contains("struct Base\n"));
}

#[test]
fn inheritance_from_typedef_is_rejected() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let base = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Base"));
    let alias = add_die(unit, root, gimli::DW_TAG_typedef, Some("BaseAlias"));
    set_type(unit, alias, base);
    let derived = add_die(unit, root, gimli::DW_TAG_class_type, Some("Derived"));
    let inherit = add_die(unit, derived, gimli::DW_TAG_inheritance, None);
    set_type(unit, inherit, alias);
    let err = parse(&mut dwarf).unwrap_err();
    assert!(format!("{:?}", err).contains("but it is a typedef"));
}

#[test]
fn virtual_method_in_class() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let widget = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Widget"));
    let method = add_die(unit, widget, gimli::DW_TAG_subprogram, Some("draw"));
    unit.get_mut(method).set(
        gimli::DW_AT_virtuality,
        AttributeValue::Virtuality(gimli::DW_VIRTUALITY_virtual),
    );
    assert_eq!(
        render(&mut dwarf),
        "struct Widget\n{\n\tvirtual void draw();\n};\n"
    );
}

#[test]
fn enum_members_keep_signedness() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let holder = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Holder"));
    let color = add_die(unit, holder, gimli::DW_TAG_enumeration_type, Some("Color"));
    let red = add_die(unit, color, gimli::DW_TAG_enumerator, Some("Red"));
    unit.get_mut(red)
        .set(gimli::DW_AT_const_value, AttributeValue::Udata(0));
    let err_val = add_die(unit, color, gimli::DW_TAG_enumerator, Some("Invalid"));
    unit.get_mut(err_val)
        .set(gimli::DW_AT_const_value, AttributeValue::Sdata(-1));
    assert_eq!(
        render(&mut dwarf),
        "struct Holder\n{\n\tenum Color\n\t{\n\t\tRed = 0,\n\t\tInvalid = -1,\n\t};\n};\n"
    );
}

#[test]
fn anonymous_enum_gets_stable_name() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let holder = add_die(unit, root, gimli::DW_TAG_structure_type, Some("Holder"));
    let anon = add_die(unit, holder, gimli::DW_TAG_enumeration_type, None);
    let one = add_die(unit, anon, gimli::DW_TAG_enumerator, Some("One"));
    unit.get_mut(one)
        .set(gimli::DW_AT_const_value, AttributeValue::Udata(1));
    let sections = emit(&mut dwarf);
    let first = parse_dwarf(&load(&sections)).unwrap().render_header();
    assert!(first.contains("enum anonymous_enum_0x"));
    // the generated name is a function of the DIE identity, not of the run
    let second = parse_dwarf(&load(&sections)).unwrap().render_header();
    assert_eq!(first, second);
}

#[test]
fn template_class_parameters() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let boxed = add_die(unit, root, gimli::DW_TAG_class_type, Some("Box"));
    let t_param = add_die(unit, boxed, gimli::DW_TAG_template_type_parameter, Some("T"));
    set_type(unit, t_param, int);
    let value = add_die(unit, boxed, gimli::DW_TAG_member, Some("value"));
    set_type(unit, value, int);
    assert_eq!(
        render(&mut dwarf),
        "template <T>\nclass Box\n{\n\tint value;\n};\n"
    );
}

#[test]
fn pointer_to_member_function() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let class = add_die(unit, root, gimli::DW_TAG_structure_type, Some("S"));
    let func = add_die(unit, root, gimli::DW_TAG_subroutine_type, None);
    set_type(unit, func, int);
    let param = add_die(unit, func, gimli::DW_TAG_formal_parameter, None);
    set_type(unit, param, int);
    let ptm = add_die(unit, root, gimli::DW_TAG_ptr_to_member_type, None);
    unit.get_mut(ptm)
        .set(gimli::DW_AT_containing_type, AttributeValue::UnitRef(class));
    set_type(unit, ptm, func);
    let alias = add_die(unit, root, gimli::DW_TAG_typedef, Some("method_t"));
    set_type(unit, alias, ptm);
    let header = render(&mut dwarf);
    assert!(header.contains("typedef int (S::*)(int) method_t;\n"));
}

#[test]
fn unimplemented_tag_fails() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    add_die(unit, root, gimli::DW_TAG_lexical_block, None);
    let err = parse(&mut dwarf).unwrap_err();
    assert!(format!("{:?}", err).contains("Unimplemented DIE tag"));
}

#[test]
fn duplicate_symbols_across_units_collapse() {
    let mut dwarf = write::Dwarf::default();
    for name in ["a.cpp", "b.cpp"] {
        let unit_id = add_unit(&mut dwarf, name);
        let unit = dwarf.units.get_mut(unit_id);
        let root = unit.root();
        let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
        let s = add_die(unit, root, gimli::DW_TAG_structure_type, Some("P"));
        let x = add_die(unit, s, gimli::DW_TAG_member, Some("x"));
        set_type(unit, x, int);
    }
    // the struct appears once even though both units define it
    assert_eq!(render(&mut dwarf), "struct P\n{\n\tint x;\n};\n");
}

#[test]
fn two_parses_render_identically() {
    let mut dwarf = write::Dwarf::default();
    let unit_id = add_unit(&mut dwarf, "a.cpp");
    let unit = dwarf.units.get_mut(unit_id);
    let root = unit.root();
    let int = add_die(unit, root, gimli::DW_TAG_base_type, Some("int"));
    let ns = add_die(unit, root, gimli::DW_TAG_namespace, Some("util"));
    let s = add_die(unit, ns, gimli::DW_TAG_structure_type, Some("Pair"));
    for member in ["first", "second"] {
        let m = add_die(unit, s, gimli::DW_TAG_member, Some(member));
        set_type(unit, m, int);
    }
    let sections = emit(&mut dwarf);
    let first = parse_dwarf(&load(&sections)).unwrap().render_header();
    let second = parse_dwarf(&load(&sections)).unwrap().render_header();
    assert_eq!(first, second);
    assert_eq!(
        first,
        "namespace util\n{\n\tstruct Pair\n\t{\n\t\tint first;\n\t\tint second;\n\t};\n};\n"
    );
}
