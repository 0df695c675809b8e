//! An in-memory ordered key/value index implemented as a B-tree of configurable
//! minimum degree.
//!
//! # Example
//!
//! ```rust
//! use memory_btree_index::{BtreeConfig, BtreeIndex, Error};
//!
//! fn main() -> std::result::Result<(), Error> {
//!     let mut b = BtreeIndex::<u16, u16>::with_config(BtreeConfig::default().order(2))?;
//!     b.put(1, 2)?;
//!     b.put(200, 4)?;
//!     b.put(20, 3)?;
//!
//!     assert_eq!(Some(&3), b.get(&20));
//!     assert_eq!(Some(3), b.delete(&20)?);
//!     assert_eq!(None, b.search(&20));
//!     Ok(())
//! }
//! ```

mod btree;
mod error;
mod key_val;

pub use btree::BtreeIndex;
pub use error::{Error, Result};
pub use key_val::KeyVal;

use serde_derive::{Deserialize, Serialize};

const DEFAULT_ORDER: usize = 32;
/// Largest accepted order, a node then holds up to 131071 entries.
pub const MAX_ORDER: usize = 1 << 16;

/// Configuration for a [`BtreeIndex`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BtreeConfig {
    order: usize,
}

impl Default for BtreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

impl BtreeConfig {
    /// Set the order (minimum degree `d`) of the B-tree.
    ///
    /// Each node holds between `d - 1` and `2d - 1` keys, except the root which may hold
    /// fewer. The order must be at least 2 and at most [`MAX_ORDER`].
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}
