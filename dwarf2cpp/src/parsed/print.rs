use itertools::Itertools;

use super::{Node, NodeId, NodeStore, TypeKind};

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push('\t');
    }
}

impl NodeStore {
    /// Render the reconstructed global namespace as header-like text.
    ///
    /// Namespace children print in name order; class members print in
    /// declaration order. Both are deterministic, so the same node graph
    /// always renders byte-identical output.
    pub fn render_header(&self) -> String {
        let mut out = String::new();
        self.print_namespace_body(self.global(), &mut out, 0);
        out
    }

    fn print_namespace_body(&self, ns: NodeId, out: &mut String, indent: usize) {
        if let Node::Namespace { children, .. } = self.get(ns) {
            for child in children.values() {
                self.print_scope_item(*child, out, indent);
            }
        }
    }

    /// Namespace scope emits namespaces, classes, typedefs and named
    /// subprograms. Other typed nodes only appear inlined, through their
    /// synthesized names in user signatures.
    fn print_scope_item(&self, id: NodeId, out: &mut String, indent: usize) {
        match self.get(id) {
            Node::Namespace { name, .. } => {
                push_indent(out, indent);
                out.push_str("namespace ");
                out.push_str(name);
                out.push('\n');
                push_indent(out, indent);
                out.push_str("{\n");
                self.print_namespace_body(id, out, indent + 1);
                push_indent(out, indent);
                out.push_str("};\n");
            }
            Node::Typed { kind, name } => match kind {
                TypeKind::Class(_) => self.print_class(id, out, indent),
                TypeKind::Typedef { aliased } => self.print_typedef(name, *aliased, out, indent),
                _ => {}
            },
            Node::SubProgram { .. } => self.print_subprogram(id, out, indent),
            _ => {}
        }
    }

    fn print_class(&self, id: NodeId, out: &mut String, indent: usize) {
        let (name, info) = match self.get(id) {
            Node::Typed {
                name,
                kind: TypeKind::Class(info),
            } => (name, info),
            _ => return,
        };
        if !info.template_params.is_empty() {
            push_indent(out, indent);
            out.push_str("template <");
            out.push_str(&info.template_params.iter().map(|p| self.name_of(*p)).join(", "));
            out.push_str(">\n");
        }
        push_indent(out, indent);
        out.push_str(info.keyword.keyword());
        out.push(' ');
        out.push_str(name);
        if !info.bases.is_empty() {
            out.push_str(" : ");
            out.push_str(
                &info
                    .bases
                    .iter()
                    .map(|(base, access)| format!("{} {}", access.keyword(), self.name_of(*base)))
                    .join(", "),
            );
        }
        out.push('\n');
        push_indent(out, indent);
        out.push_str("{\n");
        let mut current = info.keyword.default_access();
        for (member, access) in &info.members {
            if !self.member_is_printed(*member) {
                continue;
            }
            if *access != current {
                push_indent(out, indent);
                out.push_str(access.keyword());
                out.push_str(":\n");
                current = *access;
            }
            self.print_member(*member, out, indent + 1);
        }
        push_indent(out, indent);
        out.push_str("};\n");
    }

    /// Whether a class member produces output. Access labels are only
    /// emitted for members that do.
    fn member_is_printed(&self, id: NodeId) -> bool {
        match self.get(id) {
            Node::Value { .. } => true,
            Node::SubProgram { name, .. } => !name.is_empty(),
            Node::Typed { kind, .. } => matches!(
                kind,
                TypeKind::Class(_) | TypeKind::Enum { .. } | TypeKind::Typedef { .. }
            ),
            _ => false,
        }
    }

    fn print_member(&self, id: NodeId, out: &mut String, indent: usize) {
        match self.get(id) {
            Node::Value { name, ty } => {
                push_indent(out, indent);
                out.push_str(self.name_of(*ty));
                if let Some(name) = name {
                    out.push(' ');
                    out.push_str(name);
                }
                out.push_str(";\n");
            }
            Node::SubProgram { .. } => self.print_subprogram(id, out, indent),
            Node::Typed { name, kind } => match kind {
                TypeKind::Class(_) => self.print_class(id, out, indent),
                TypeKind::Enum { .. } => self.print_enum(id, out, indent),
                TypeKind::Typedef { aliased } => self.print_typedef(name, *aliased, out, indent),
                _ => {}
            },
            _ => {}
        }
    }

    fn print_subprogram(&self, id: NodeId, out: &mut String, indent: usize) {
        let (name, ret, params, is_virtual, template_params) = match self.get(id) {
            Node::SubProgram {
                name,
                ret,
                params,
                is_virtual,
                template_params,
            } => (name, ret, params, is_virtual, template_params),
            _ => return,
        };
        // placeholders left behind by specification fusion have no name
        if name.is_empty() {
            return;
        }
        if !template_params.is_empty() {
            push_indent(out, indent);
            out.push_str("template <");
            out.push_str(&template_params.iter().map(|p| self.name_of(*p)).join(", "));
            out.push_str(">\n");
        }
        push_indent(out, indent);
        if *is_virtual {
            out.push_str("virtual ");
        }
        out.push_str(ret.map(|r| self.name_of(r)).unwrap_or("void"));
        out.push(' ');
        out.push_str(name);
        out.push('(');
        out.push_str(&params.iter().map(|p| self.parameter_text(*p)).join(", "));
        out.push_str(");\n");
    }

    fn parameter_text(&self, id: NodeId) -> String {
        match self.get(id) {
            Node::Value { name, ty } => match name {
                Some(name) => format!("{} {}", self.name_of(*ty), name),
                None => self.name_of(*ty).to_string(),
            },
            _ => String::new(),
        }
    }

    fn print_enum(&self, id: NodeId, out: &mut String, indent: usize) {
        let (name, enumerators) = match self.get(id) {
            Node::Typed {
                name,
                kind: TypeKind::Enum { enumerators },
            } => (name, enumerators),
            _ => return,
        };
        push_indent(out, indent);
        out.push_str("enum ");
        out.push_str(name);
        out.push('\n');
        push_indent(out, indent);
        out.push_str("{\n");
        for enumerator in enumerators {
            if let Node::Enumerator { name, value } = self.get(*enumerator) {
                push_indent(out, indent + 1);
                out.push_str(name);
                out.push_str(" = ");
                out.push_str(&value.to_string());
                out.push_str(",\n");
            }
        }
        push_indent(out, indent);
        out.push_str("};\n");
    }

    fn print_typedef(&self, name: &str, aliased: NodeId, out: &mut String, indent: usize) {
        push_indent(out, indent);
        out.push_str("typedef ");
        out.push_str(self.name_of(aliased));
        out.push(' ');
        out.push_str(name);
        out.push_str(";\n");
    }
}
