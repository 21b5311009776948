use super::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Symbol `{0}` already exists in namespace `{1}` as a different kind of entity")]
    SymbolTypeMismatch(String, String),
    #[error("Cannot merge into {0}, which is not a namespace")]
    NotANamespace(NodeId),
}
