use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{NodeRef, RawNode};
use crate::red_black_tree::RedBlackTree;

/// In-order iterator over the nodes of a [`RedBlackTree`].
///
/// Walks the tree through parent links, so it needs neither recursion nor a
/// stack.
pub struct Nodes<'a, K> {
    next: Option<RawNode<K>>,
    remaining: usize,
    marker: PhantomData<&'a RedBlackTree<K>>,
}

// SAFETY: the iterators only hand out shared views, like `&'a K`.
unsafe impl<K: Sync> Send for Nodes<'_, K> {}
unsafe impl<K: Sync> Sync for Nodes<'_, K> {}
unsafe impl<K: Sync> Send for Levels<'_, K> {}
unsafe impl<K: Sync> Sync for Levels<'_, K> {}

impl<'a, K> Nodes<'a, K> {
    /// # Safety
    ///
    /// `first` must be the minimum of a tree with `len` nodes that stays
    /// borrowed for `'a`.
    pub(crate) unsafe fn new(first: Option<RawNode<K>>, len: usize) -> Self {
        Self {
            next: first,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<K> Clone for Nodes<'_, K> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<'a, K> Iterator for Nodes<'a, K> {
    type Item = NodeRef<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = unsafe { RedBlackTree::successor_core(node) };
        self.remaining -= 1;
        Some(unsafe { NodeRef::new(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Nodes<'_, K> {}

impl<K> FusedIterator for Nodes<'_, K> {}

/// In-order iterator over the keys of a [`RedBlackTree`].
pub struct Iter<'a, K> {
    nodes: Nodes<'a, K>,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(nodes: Nodes<'a, K>) -> Self {
        Self { nodes }
    }
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|node| node.key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// Breadth-first iterator yielding one level of a [`RedBlackTree`] at a time.
pub struct Levels<'a, K> {
    level: Vec<RawNode<K>>,
    marker: PhantomData<&'a RedBlackTree<K>>,
}

impl<'a, K> Levels<'a, K> {
    /// # Safety
    ///
    /// `root` must be the root of a tree that stays borrowed for `'a`.
    pub(crate) unsafe fn new(root: Option<RawNode<K>>) -> Self {
        Self {
            level: root.into_iter().collect(),
            marker: PhantomData,
        }
    }
}

impl<K> Clone for Levels<'_, K> {
    fn clone(&self) -> Self {
        Self {
            level: self.level.clone(),
            marker: PhantomData,
        }
    }
}

impl<'a, K> Iterator for Levels<'a, K> {
    type Item = Vec<NodeRef<'a, K>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.level.is_empty() {
            return None;
        }

        let mut next_level = Vec::with_capacity(self.level.len() * 2);
        for node in &self.level {
            unsafe {
                next_level.extend(node.left());
                next_level.extend(node.right());
            }
        }

        let level = std::mem::replace(&mut self.level, next_level);
        Some(level.into_iter().map(|n| unsafe { NodeRef::new(n) }).collect())
    }
}

impl<K> FusedIterator for Levels<'_, K> {}

#[cfg(test)]
mod tests {
    use crate::{Color, RedBlackTree, Side};

    fn keys(level: &[crate::NodeRef<'_, i32>]) -> Vec<i32> {
        level.iter().map(|n| *n.key()).collect()
    }

    #[test]
    fn empty() {
        let tree = RedBlackTree::<i32>::new();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.nodes().len(), 0);
        assert_eq!(tree.levels().next(), None);
    }

    #[test]
    fn iter_is_sorted_and_exact() {
        let tree: RedBlackTree<i32> = [12, 5, 9, 2, 18, 15, 13, 17, 19].into_iter().collect();

        let mut iter = tree.iter();
        assert_eq!(iter.len(), 9);
        iter.next();
        assert_eq!(iter.len(), 8);

        let items: Vec<_> = (&tree).into_iter().copied().collect();
        assert_eq!(&items, &[2, 5, 9, 12, 13, 15, 17, 18, 19]);

        let mut iter = tree.iter();
        iter.by_ref().for_each(drop);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn nodes_expose_topology() {
        let tree: RedBlackTree<i32> = [10, 20, 30, 15].into_iter().collect();
        let colors: Vec<_> = tree.nodes().map(|n| (*n.key(), n.color())).collect();
        assert_eq!(
            colors,
            [
                (10, Color::Black),
                (15, Color::Red),
                (20, Color::Black),
                (30, Color::Black),
            ]
        );

        let fifteen = tree.nodes().find(|n| *n.key() == 15).unwrap();
        assert_eq!(fifteen.side(), Side::Right);
        assert_eq!(fifteen.depth(), 2);
        assert_eq!(*fifteen.parent().unwrap().key(), 10);
    }

    #[test]
    fn levels_group_by_depth() {
        let tree: RedBlackTree<i32> = [10, 20, 30, 15].into_iter().collect();
        let levels: Vec<_> = tree.levels().map(|level| keys(&level)).collect();
        assert_eq!(levels, [vec![20], vec![10, 30], vec![15]]);
        assert_eq!(tree.height(), 3);

        for (depth, level) in tree.levels().enumerate() {
            assert!(level.iter().all(|n| n.depth() == depth));
        }
    }

    #[test]
    fn levels_clone_resumes_independently() {
        let tree: RedBlackTree<i32> = [10, 20, 30, 15].into_iter().collect();
        let mut levels = tree.levels();
        levels.next();

        let copy = levels.clone();
        let rest: Vec<_> = levels.map(|level| keys(&level)).collect();
        let copied: Vec<_> = copy.map(|level| keys(&level)).collect();
        assert_eq!(rest, [vec![10, 30], vec![15]]);
        assert_eq!(rest, copied);
    }

    #[test]
    fn levels_cover_every_node() {
        let tree: RedBlackTree<i32> = (0..500).rev().collect();
        let mut seen: Vec<_> = tree.levels().flatten().map(|n| *n.key()).collect();
        seen.sort();
        assert!(seen.into_iter().eq(0..500));
    }
}
