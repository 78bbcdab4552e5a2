use thiserror::Error;

/// Returned by [`RedBlackTree::try_insert`] when the key is already stored.
///
/// The tree is left untouched and the rejected key is handed back.
///
/// [`RedBlackTree::try_insert`]: crate::RedBlackTree::try_insert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key already present in the tree")]
pub struct DuplicateKey<K>(K);

impl<K> DuplicateKey<K> {
    pub(crate) fn new(key: K) -> Self {
        Self(key)
    }

    /// The key that was rejected.
    pub fn key(&self) -> &K {
        &self.0
    }

    pub fn into_key(self) -> K {
        self.0
    }
}
