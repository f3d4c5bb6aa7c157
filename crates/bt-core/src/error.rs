use thiserror::Error;

use crate::Access;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("client `{client}` already registered key `{key}` (id={id}) with {existing:?} access")]
    DuplicateKey {
        client: String,
        key: &'static str,
        id: u64,
        existing: Access,
    },
}
