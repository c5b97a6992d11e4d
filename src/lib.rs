//! Package implement an ordered index using a sentinel based
//! [red-black tree][wiki-rbt].
//!
//! [RbTree] is an ephemeral, single-threaded, ordered container over a
//! single key type:
//!
//! - Keys are totally ordered, `K: Ord`.
//! - Duplicate keys are allowed, equal keys stay in arrival order.
//! - insert(), find(), erase() in O(log n).
//! - min(), max(), successor(), predecessor() for positional walks.
//! - to_array() and iter() for in-order scan.
//! - Nodes live in an arena, index ZERO is the black sentinel that stands in
//!   for every missing child and for the root's parent.
//! - Not thread safe, mutation requires `&mut` access.
//!
//! Every call to insert() returns a [NodeRef] handle. Handles are checked on
//! use: a handle that was erased, or that belongs to a different tree, is
//! reported as [Error::InvalidHandle].
//!
//! Constructing a new [RbTree] instance and CRUD operations:
//!
//! ```
//! use rbtree::RbTree;
//!
//! let mut index: RbTree<u32> = RbTree::new();
//! assert_eq!(index.len(), 0);
//! assert_eq!(index.is_empty(), true);
//!
//! for key in [5, 3, 8, 3, 1].iter() {
//!     index.insert(*key).unwrap();
//! }
//! assert_eq!(index.len(), 5);
//! assert_eq!(index.to_array(10), vec![1, 3, 3, 5, 8]);
//!
//! let node = index.find(&8).unwrap();
//! assert_eq!(index.get(node).unwrap(), &8);
//! assert_eq!(index.erase(node).unwrap(), 8);
//! assert_eq!(index.find(&8), None);
//!
//! let min = index.min().unwrap();
//! assert_eq!(index.get(min).unwrap(), &1);
//! ```
//!
//! [wiki-rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use std::{error, fmt, result};

// Short form to compose Error values.
//
// Here are few possible ways:
//
// ```ignore
// use crate::Error;
// err_at!(InvalidHandle, msg: format!("bad handle"));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(AllocationFailure, slots.try_reserve(1));
// ```
//
// ```ignore
// use crate::Error;
// err_at!(AllocationFailure, slots.try_reserve(n), "for {} slots", n);
// ```
//
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod arena;
mod fixup;
mod node;
mod tree;

pub use node::{Color, NodeRef};
pub use tree::{Iter, RbTree};

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location.
pub enum Error {
    /// Tree invariant is broken, returned by [RbTree::validate].
    Fatal(String, String),
    /// Key is not present in the tree.
    NotFound(String, String),
    /// Node storage could not be grown, tree is left untouched.
    AllocationFailure(String, String),
    /// Handle was erased, is stale, or belongs to a different tree.
    InvalidHandle(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
            NotFound(p, msg) => write!(f, "{} NotFound: {}", p, msg),
            AllocationFailure(p, msg) => write!(f, "{} AllocationFailure: {}", p, msg),
            InvalidHandle(p, msg) => write!(f, "{} InvalidHandle: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;
