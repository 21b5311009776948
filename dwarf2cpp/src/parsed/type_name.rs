use itertools::Itertools;

use super::{Node, NodeId, NodeStore, TypeKind};

/// Synthesized names for structural types. Each one is a pure function of
/// the payload, so the same shape always prints the same way.

pub fn pointer_name(pointee: Option<&str>) -> String {
    format!("{}*", pointee.unwrap_or("void"))
}

pub fn const_name(pointee: Option<&str>) -> String {
    format!("const {}", pointee.unwrap_or("void"))
}

pub fn reference_name(pointee: &str) -> String {
    format!("{}&", pointee)
}

pub fn rvalue_reference_name(pointee: &str) -> String {
    format!("{}&&", pointee)
}

pub fn volatile_name(pointee: &str) -> String {
    format!("volatile {}", pointee)
}

pub fn array_name(elem: &str, len: u64) -> String {
    format!("{}[{}]", elem, len)
}

pub fn subroutine_name(ret: Option<&str>, params: &[&str]) -> String {
    format!(
        "FunctionPtr<{}({})>",
        ret.unwrap_or("void"),
        params.iter().join(", ")
    )
}

/// Deterministic identifier for an anonymous class or enum, derived from the
/// DIE identity rather than anything address- or order-dependent
pub fn anonymous_name(keyword: &str, global_offset: usize) -> String {
    format!("anonymous_{}_0x{:08x}", keyword, global_offset)
}

impl NodeStore {
    /// Name of the type held by a parameter or member Value
    pub fn value_type_name(&self, id: NodeId) -> &str {
        match self.get(id) {
            Node::Value { ty, .. } => self.name_of(*ty),
            _ => "",
        }
    }

    pub fn subroutine_display_name(&self, ret: Option<NodeId>, params: &[NodeId]) -> String {
        let params: Vec<&str> = params.iter().map(|p| self.value_type_name(*p)).collect();
        subroutine_name(ret.map(|r| self.name_of(r)), &params)
    }

    /// `R (C::*)(P1, P2)` for a pointer to a member function of `class`
    pub fn member_pointer_name(&self, class: NodeId, func: NodeId) -> String {
        match self.get(func) {
            Node::Typed {
                kind: TypeKind::Subroutine { ret, params },
                ..
            } => {
                let params: Vec<&str> = params.iter().map(|p| self.value_type_name(*p)).collect();
                format!(
                    "{} ({}::*)({})",
                    ret.map(|r| self.name_of(r)).unwrap_or("void"),
                    self.name_of(class),
                    params.iter().join(", ")
                )
            }
            _ => format!("{}::*", self.name_of(class)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_names() {
        assert_eq!(pointer_name(Some("int")), "int*");
        assert_eq!(pointer_name(None), "void*");
        assert_eq!(const_name(Some("char")), "const char");
        assert_eq!(const_name(None), "const void");
        assert_eq!(reference_name("int"), "int&");
        assert_eq!(rvalue_reference_name("int"), "int&&");
        assert_eq!(volatile_name("int"), "volatile int");
    }

    #[test]
    fn compound_names() {
        assert_eq!(array_name("int", 4), "int[4]");
        assert_eq!(subroutine_name(None, &[]), "FunctionPtr<void()>");
        assert_eq!(
            subroutine_name(Some("int"), &["char", "long"]),
            "FunctionPtr<int(char, long)>"
        );
    }

    #[test]
    fn names_compose() {
        let inner = pointer_name(Some("Node"));
        assert_eq!(const_name(Some(&inner)), "const Node*");
        assert_eq!(array_name(&inner, 8), "Node*[8]");
    }

    #[test]
    fn anonymous_names_are_stable() {
        assert_eq!(anonymous_name("enum", 0x42), "anonymous_enum_0x00000042");
        assert_eq!(anonymous_name("enum", 0x42), anonymous_name("enum", 0x42));
        assert_ne!(anonymous_name("enum", 1), anonymous_name("enum", 2));
    }
}
