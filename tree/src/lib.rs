#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

//! An ordered set of unique keys backed by a red-black tree.
//!
//! Keys are only ever inserted. The tree rebalances itself after every
//! insertion so that its height stays within `2 * log2(len + 1)`, and exposes
//! its nodes through [`NodeRef`] so that callers can walk the topology
//! (keys, colors, children, parents) without being able to mutate it.

mod error;
mod iter;
mod node;
mod red_black_tree;

pub use error::DuplicateKey;
pub use iter::{Iter, Levels, Nodes};
pub use node::{Color, NodeRef, Side};
pub use red_black_tree::RedBlackTree;

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use simplelog::{Config, LevelFilter, TestLogger};

    // Several tests race to install the logger, only the first one wins.
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}
