use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("the order (minimum degree) of a B-tree must be at least 2, but was {0}")]
    OrderTooSmall(usize),
    #[error("the order (minimum degree) of a B-tree must be at most {max}, but was {0}", max = crate::MAX_ORDER)]
    OrderTooLarge(usize),
    #[error("the search path pointed to a node that does not contain the key")]
    KeyNotInNode,
    #[error("B-tree invariant violated: {0}")]
    InvariantViolated(String),
}
