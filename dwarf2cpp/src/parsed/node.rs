use std::collections::BTreeMap;

/// Index of a node in the [`NodeStore`](super::NodeStore) arena.
///
/// References between nodes are plain indices so that cyclic type graphs
/// (a class holding a pointer back to itself) stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for a payload slot that has not been resolved yet. Only
    /// observable while the owning DIE is still on the resolution stack.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "node#{}", self.0)
        } else {
            write!(f, "node#INVALID")
        }
    }
}

/// C++ member accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

/// The record keyword a class-like DIE was declared with. Only `class`
/// defaults its members to private.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKeyword {
    Class,
    Struct,
    Union,
}

impl ClassKeyword {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKeyword::Class => "class",
            ClassKeyword::Struct => "struct",
            ClassKeyword::Union => "union",
        }
    }

    pub fn default_access(self) -> Access {
        match self {
            ClassKeyword::Class => Access::Private,
            ClassKeyword::Struct | ClassKeyword::Union => Access::Public,
        }
    }
}

/// An enumerator constant, kept in the signedness DWARF encoded it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumValue {
    Signed(i64),
    Unsigned(u64),
}

impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumValue::Signed(x) => write!(f, "{}", x),
            EnumValue::Unsigned(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub keyword: ClassKeyword,
    /// Members in declaration order, with the accessibility each one was
    /// declared with (explicit attribute, or the keyword default)
    pub members: Vec<(NodeId, Access)>,
    /// Base classes in declaration order
    pub bases: Vec<(NodeId, Access)>,
    pub template_params: Vec<NodeId>,
}

impl ClassInfo {
    pub fn new(keyword: ClassKeyword) -> Self {
        Self {
            keyword,
            members: Vec::new(),
            bases: Vec::new(),
            template_params: Vec::new(),
        }
    }
}

/// The type-level payload of a [`Node::Typed`]
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Fixed-length array. `len` is the element count
    Array { elem: NodeId, len: u64 },
    /// A language built-in, fully described by its name
    Basic,
    Class(ClassInfo),
    /// `const T`; a missing pointee is `const void`
    Const { pointee: Option<NodeId> },
    Enum { enumerators: Vec<NodeId> },
    /// A template parameter binding: a local name for another type
    Named { ty: NodeId },
    /// `T*`; a missing pointee is `void*`
    Pointer { pointee: Option<NodeId> },
    /// Pointer to a member function of `class`
    PtrToMember { class: NodeId, func: NodeId },
    /// `T&`
    Ref { pointee: NodeId },
    /// `T&&`
    RRef { pointee: NodeId },
    /// A function type: return type (None is `void`) and parameter Values
    Subroutine { ret: Option<NodeId>, params: Vec<NodeId> },
    Typedef { aliased: NodeId },
    /// `volatile T`
    Volatile { pointee: NodeId },
}

impl TypeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeKind::Array { .. } => "an array type",
            TypeKind::Basic => "a base type",
            TypeKind::Class(info) => match info.keyword {
                ClassKeyword::Class => "a class",
                ClassKeyword::Struct => "a struct",
                ClassKeyword::Union => "a union",
            },
            TypeKind::Const { .. } => "a const type",
            TypeKind::Enum { .. } => "an enum",
            TypeKind::Named { .. } => "a template parameter",
            TypeKind::Pointer { .. } => "a pointer type",
            TypeKind::PtrToMember { .. } => "a pointer-to-member type",
            TypeKind::Ref { .. } => "a reference type",
            TypeKind::RRef { .. } => "an rvalue reference type",
            TypeKind::Subroutine { .. } => "a subroutine type",
            TypeKind::Typedef { .. } => "a typedef",
            TypeKind::Volatile { .. } => "a volatile type",
        }
    }
}

/// A language entity reconstructed from one DIE.
///
/// Shared freely: the same node can be the element type of many arrays, the
/// target of many pointers, and a member of a class all at once.
#[derive(Debug, Clone)]
pub enum Node {
    Enumerator {
        name: String,
        value: EnumValue,
    },
    /// Imported-module/declaration entries, kept for identity only
    Ignored,
    Namespace {
        name: String,
        children: BTreeMap<String, NodeId>,
    },
    SubProgram {
        name: String,
        ret: Option<NodeId>,
        params: Vec<NodeId>,
        is_virtual: bool,
        template_params: Vec<NodeId>,
    },
    Typed {
        name: String,
        kind: TypeKind,
    },
    Value {
        name: Option<String>,
        ty: NodeId,
    },
}

impl Node {
    pub fn typed(kind: TypeKind) -> Self {
        Node::Typed {
            name: String::new(),
            kind,
        }
    }

    /// The display name used for namespace merging and printing. Empty for
    /// anonymous values, ignored entries and unnamed placeholders.
    pub fn display_name(&self) -> &str {
        match self {
            Node::Enumerator { name, .. } => name,
            Node::Ignored => "",
            Node::Namespace { name, .. } => name,
            Node::SubProgram { name, .. } => name,
            Node::Typed { name, .. } => name,
            Node::Value { name, .. } => name.as_deref().unwrap_or(""),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Enumerator { .. } => "an enumerator",
            Node::Ignored => "an ignored entry",
            Node::Namespace { .. } => "a namespace",
            Node::SubProgram { .. } => "a subprogram",
            Node::Typed { kind, .. } => kind.kind_name(),
            Node::Value { .. } => "a value",
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, Node::Namespace { .. })
    }
}
