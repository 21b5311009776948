mod error;
pub use error::ModelError;
mod node;
pub use node::{Access, ClassInfo, ClassKeyword, EnumValue, Node, NodeId, TypeKind};
mod store;
pub use store::NodeStore;
mod type_name;
pub use type_name::{
    anonymous_name, array_name, const_name, pointer_name, reference_name, rvalue_reference_name,
    subroutine_name, volatile_name,
};
mod print;
