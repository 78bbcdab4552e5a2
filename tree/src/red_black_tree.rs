use core::fmt;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::marker::PhantomData;

use log::{debug, trace};

use crate::error::DuplicateKey;
use crate::iter::{Iter, Levels, Nodes};
use crate::node::{Color, Node, NodeRef, RawNode, Side};

/// A red-black tree based set.
///
/// Duplicate keys are rejected, never overwritten.
pub struct RedBlackTree<K> {
    // INVARIANTS:
    //  * `root` is `None` iff `len == 0`
    //  * every node reachable from `root` was allocated by `RawNode::from_node`
    //    and is owned by exactly one `left`/`right` slot (or by `root`)
    root: Option<RawNode<K>>,
    len: usize,
    marker: PhantomData<Box<Node<K>>>,
}

// SAFETY: the tree owns its nodes exclusively, like a `Box<Node<K>>` would,
// and mutation requires `&mut self`.
unsafe impl<K: Send> Send for RedBlackTree<K> {}
unsafe impl<K: Sync> Sync for RedBlackTree<K> {}

/// Which fixup case applies to a red node, derived purely from its
/// surroundings.
enum Fixup<K> {
    Root,
    BlackParent,
    /// Parent and uncle are both red.
    RedUncle {
        parent: RawNode<K>,
        uncle: RawNode<K>,
        grand_parent: RawNode<K>,
    },
    /// Parent is red, uncle is black or missing, and the node sits on the
    /// inner side of its parent.
    ZigZag { parent: RawNode<K> },
    /// Parent is red, uncle is black or missing, and node, parent and
    /// grandparent form a straight line.
    Line {
        parent: RawNode<K>,
        grand_parent: RawNode<K>,
    },
}

impl<K> Drop for RedBlackTree<K> {
    fn drop(&mut self) {
        unsafe fn inner<K>(node: RawNode<K>) {
            if let Some(l) = unsafe { node.left() } {
                unsafe { inner(l) };
            }
            if let Some(r) = unsafe { node.right() } {
                unsafe { inner(r) };
            }
            let _: Box<Node<K>> = unsafe { node.into_box() };
        }

        self.len = 0;
        if let Some(root) = self.root.take() {
            unsafe { inner(root) };
        }
    }
}

impl<K> fmt::Debug for RedBlackTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, K>(&'a RedBlackTree<K>);

        impl<K> fmt::Debug for TreeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.0.nodes()).finish()
            }
        }

        f.debug_struct("RedBlackTree")
            .field("len", &self.len)
            .field("root", &self.root())
            .field("nodes", &TreeDebug(self))
            .finish()
    }
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RedBlackTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The root node, `None` for an empty tree.
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(|root| unsafe { NodeRef::new(root) })
    }

    /// Iterates over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.nodes())
    }

    /// Iterates over the nodes in ascending key order.
    pub fn nodes(&self) -> Nodes<'_, K> {
        let first = self.root.map(|root| unsafe { Self::min_of(root) });
        unsafe { Nodes::new(first, self.len) }
    }

    /// Iterates over the tree one depth at a time, starting at the root. Each
    /// level lists its nodes from left to right.
    pub fn levels(&self) -> Levels<'_, K> {
        unsafe { Levels::new(self.root) }
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        self.levels().count()
    }

    /// Number of black nodes on any path from the root down to a missing
    /// child, the root included.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut node = self.root;
        while let Some(n) = node {
            if unsafe { n.color() }.is_black() {
                count += 1;
            }
            node = unsafe { n.left() };
        }
        count
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).map(|node| unsafe { node.key() })
    }

    fn get_raw<Q>(&self, key: &Q) -> Option<RawNode<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root?;
        loop {
            let next = match key.cmp(unsafe { x.key() }.borrow()) {
                Ordering::Less => unsafe { x.left() },
                Ordering::Equal => return Some(x),
                Ordering::Greater => unsafe { x.right() },
            };
            x = next?;
        }
    }

    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::min_of(root).key() })
    }

    pub(crate) unsafe fn min_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(left) = unsafe { x.left() } {
            x = left;
        }

        x
    }

    pub fn max(&self) -> Option<&K> {
        self.root.map(|root| unsafe { Self::max_of(root).key() })
    }

    unsafe fn max_of(root: RawNode<K>) -> RawNode<K> {
        let mut x = root;
        while let Some(right) = unsafe { x.right() } {
            x = right;
        }

        x
    }

    /// The smallest key greater than `key`, if `key` is in the tree.
    pub fn successor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key)
            .and_then(|node| unsafe { Self::successor_core(node) })
            .map(|node| unsafe { node.key() })
    }

    pub(crate) unsafe fn successor_core(mut node: RawNode<K>) -> Option<RawNode<K>> {
        //       +---------- 34 ---------+
        //       |                       |
        // +---- 2 ----+                 58 ----+
        // |           |                        |
        // 1      +--- 9 ----+              +-- 77 --+
        //        |          |              |        |
        //     +- 6       +- 20 -+      +- 71 -+     82
        //     |          |      |      |      |
        //     5         12 -+   24    67      75
        //                   |
        //                   13

        // 9 -> 12, 2 -> 5, 58 -> 67 ...
        if let Some(right) = unsafe { node.right() } {
            return Some(unsafe { Self::min_of(right) });
        }

        // 6 -> 9, 1 -> 2, 13 -> 20, 24 -> 34 ...
        // Climb while we are a right child, the parent of the first left
        // child on the way up is the successor.
        loop {
            match unsafe { node.side() } {
                Side::Root => return None,
                Side::Left => return unsafe { node.parent() },
                Side::Right => node = unsafe { node.parent() }?,
            }
        }
    }

    /// The largest key smaller than `key`, if `key` is in the tree.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key)
            .and_then(|node| unsafe { Self::predecessor_core(node) })
            .map(|node| unsafe { node.key() })
    }

    unsafe fn predecessor_core(mut node: RawNode<K>) -> Option<RawNode<K>> {
        // 2 -> 1, 9 -> 6, 20 -> 13, 77 -> 75
        if let Some(left) = unsafe { node.left() } {
            return Some(unsafe { Self::max_of(left) });
        }

        // 12 -> 9, 58 -> 34, 67 -> 58
        loop {
            match unsafe { node.side() } {
                Side::Root => return None,
                Side::Right => return unsafe { node.parent() },
                Side::Left => node = unsafe { node.parent() }?,
            }
        }
    }

    /// Inserts `key`. Returns `false` and leaves the tree untouched if an
    /// equal key is already present.
    pub fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        self.try_insert(key).is_ok()
    }

    /// Like [`insert`](Self::insert) but hands a rejected key back to the
    /// caller.
    pub fn try_insert(&mut self, key: K) -> Result<(), DuplicateKey<K>>
    where
        K: Ord,
    {
        let new_node = self.insert_bst(key)?;
        self.insert_fixup(new_node);
        Ok(())
    }

    /// Plain binary search tree insertion. The first node of an empty tree is
    /// black, every other new node is a red leaf.
    fn insert_bst(&mut self, key: K) -> Result<RawNode<K>, DuplicateKey<K>>
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            let root = RawNode::from_node(Node::new(key, Color::Black));
            self.root = Some(root);
            self.len = 1;
            return Ok(root);
        };

        // Move left/right down the tree until we find empty slot
        let mut parent = root;
        let side = loop {
            let (side, child) = match key.cmp(unsafe { parent.key() }) {
                Ordering::Less => (Side::Left, unsafe { parent.left() }),
                Ordering::Equal => {
                    debug!("rejected duplicate key, len stays {}", self.len);
                    return Err(DuplicateKey::new(key));
                }
                Ordering::Greater => (Side::Right, unsafe { parent.right() }),
            };
            match child {
                Some(child) => parent = child,
                None => break side,
            }
        };

        // new_node is a leaf, it cannot have left or right subtrees
        let new_node = RawNode::from_node(Node::new(key, Color::Red));
        unsafe { parent.attach(side, Some(new_node)) };
        self.len += 1;
        Ok(new_node)
    }

    unsafe fn classify(node: RawNode<K>) -> Fixup<K> {
        unsafe {
            let Some(parent) = node.parent() else {
                return Fixup::Root;
            };
            if parent.color().is_black() {
                return Fixup::BlackParent;
            }

            // grand_parent must exist because parent is red and
            // thus not root as root is always black
            let Some(grand_parent) = node.grand_parent() else {
                unreachable!("red node without a parent is the root")
            };
            debug_assert!(grand_parent.color().is_black());

            match node.uncle() {
                Some(uncle) if uncle.color().is_red() => Fixup::RedUncle {
                    parent,
                    uncle,
                    grand_parent,
                },
                _ if node.side() == parent.side() => Fixup::Line {
                    parent,
                    grand_parent,
                },
                _ => Fixup::ZigZag { parent },
            }
        }
    }

    fn insert_fixup(&mut self, new_node: RawNode<K>) {
        let mut node = new_node;
        unsafe {
            loop {
                debug_assert!(node.color().is_red() || node.parent().is_none());
                // At most one violation exists: `node` and its parent may both
                // be red. Every arm either ends the loop or moves the violation
                // strictly closer to the root.
                match Self::classify(node) {
                    Fixup::Root => {
                        trace!("fixup: reached the root");
                        break;
                    }
                    Fixup::BlackParent => {
                        trace!("fixup: parent is black");
                        break;
                    }
                    Fixup::RedUncle {
                        mut parent,
                        mut uncle,
                        mut grand_parent,
                    } => {
                        //     +--- gp:b ---+               +--- gp:r ---+
                        //     |            |               |            |
                        //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                        //  |     |      |     |         |     |      |     |
                        // n:r   a:b    b:b   c:b       n:r   a:b    b:b   c:b
                        // (a, b, c can be any subtrees)
                        //
                        // Black height is unchanged, but gp may now have a red
                        // parent, so repeat from gp.
                        trace!("fixup: red uncle, recoloring");
                        parent.set_color(Color::Black);
                        uncle.set_color(Color::Black);
                        grand_parent.set_color(Color::Red);
                        node = grand_parent;
                    }
                    Fixup::ZigZag { parent } => {
                        //       +-- gp:b --+                 +-- gp:b --+
                        //       |          |                 |          |
                        //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                        //  |         |                   |        |
                        // a:b    +- n:r -+           +- p:r -+   c:b
                        //        |       |           |       |
                        //       b:b     c:b         a:b     b:b
                        // (a, b, c, u can be any subtrees, mirrored on the right)
                        //
                        // p is now the bottom of a straight line.
                        trace!("fixup: zig-zag, straightening");
                        match parent.side() {
                            Side::Left => self.rotate_left(parent),
                            Side::Right => self.rotate_right(parent),
                            Side::Root => unreachable!("red parent is never the root"),
                        }
                        node = parent;
                    }
                    Fixup::Line {
                        mut parent,
                        mut grand_parent,
                    } => {
                        //           +-- gp:b --+            +----- p:b -----+
                        //           |          |            |               |
                        //      +-- p:r --+    u:b  -->   +- n:r -+     +- gp:r -+
                        //      |         |               |       |     |        |
                        //  +- n:r -+    c:b             a:b     b:b   c:b      u:b
                        //  |       |
                        // a:b     b:b
                        // (a, b, c, u can be any subtrees, mirrored on the right)
                        trace!("fixup: straight line, rotating grandparent");
                        parent.set_color(Color::Black);
                        grand_parent.set_color(Color::Red);
                        match parent.side() {
                            Side::Left => self.rotate_right(grand_parent),
                            Side::Right => self.rotate_left(grand_parent),
                            Side::Root => unreachable!("red parent is never the root"),
                        }
                        break;
                    }
                }
            }

            if let Some(mut root) = self.root {
                root.set_color(Color::Black);
            }
        }
    }

    /// Moves the subtree rooted at `new` into the slot `old` occupied, or
    /// makes it the root.
    unsafe fn replace_in_parent(&mut self, old: RawNode<K>, mut new: RawNode<K>) {
        unsafe {
            match old.parent() {
                Some(mut parent) => parent.attach(old.side(), Some(new)),
                None => {
                    new.detach_as_root();
                    self.root = Some(new);
                }
            }
        }
    }

    fn rotate_left(&mut self, mut node: RawNode<K>) {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut right) = node.right() {
                trace!("rotate left");
                // attach right to parent
                self.replace_in_parent(node, right);
                // attach b to node
                node.attach(Side::Right, right.left());
                // attach node to right
                right.attach(Side::Left, Some(node));
            }
        }
    }

    fn rotate_right(&mut self, mut node: RawNode<K>) {
        //         p              p
        //         |              |
        //     +-node-+       +-left-+
        //     |      |       |      |
        // +-left-+   c  -->  a  +-node-+
        // |      |              |      |
        // a      b              b      c
        // where a, b, c can be any subtrees
        unsafe {
            if let Some(mut left) = node.left() {
                trace!("rotate right");
                // attach left to parent
                self.replace_in_parent(node, left);
                // attach b to node
                node.attach(Side::Left, left.right());
                // attach node to left
                left.attach(Side::Right, Some(node));
            }
        }
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K> IntoIterator for &'a RedBlackTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
