use core::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Which slot of its parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Root,
    Left,
    Right,
}

pub(crate) struct Node<K> {
    key: K,
    color: Color,
    // cached, must always match the parent's child pointer
    side: Side,
    parent: Option<RawNode<K>>,
    left: Option<RawNode<K>>,
    right: Option<RawNode<K>>,
}

impl<K> Node<K> {
    /// A detached leaf.
    pub(crate) fn new(key: K, color: Color) -> Self {
        Self {
            key,
            color,
            side: Side::Root,
            parent: None,
            left: None,
            right: None,
        }
    }
}

/// Wrapper around `NonNull<Node<K>>` to provide convenient methods in order
/// to make the algorithms of RedBlackTree much more readable.
#[repr(transparent)]
pub(crate) struct RawNode<K> {
    ptr: NonNull<Node<K>>,
}

impl<K> Clone for RawNode<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RawNode<K> {}

impl<K> PartialEq for RawNode<K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.as_ptr(), other.as_ptr())
    }
}

impl<K> Eq for RawNode<K> {}

impl<K> fmt::Debug for RawNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawNode").field(&self.ptr).finish()
    }
}

impl<K> RawNode<K> {
    pub(crate) fn from_node(node: Node<K>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(Box::new(node))),
        }
    }

    /// Reclaims the allocation. Children are not touched.
    ///
    /// # Safety
    ///
    /// `self` must have been created by [`RawNode::from_node`] and must not be
    /// used again afterwards.
    pub(crate) unsafe fn into_box(self) -> Box<Node<K>> {
        unsafe { Box::from_raw(self.as_ptr()) }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut Node<K> {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) unsafe fn key<'a>(&self) -> &'a K {
        unsafe { &(*self.as_ptr()).key }
    }

    #[inline]
    pub(crate) unsafe fn color(&self) -> Color {
        unsafe { (*self.as_ptr()).color }
    }

    #[inline]
    pub(crate) unsafe fn set_color(&mut self, new_color: Color) {
        unsafe { (*self.as_ptr()).color = new_color }
    }

    #[inline]
    pub(crate) unsafe fn side(&self) -> Side {
        unsafe { (*self.as_ptr()).side }
    }

    #[inline]
    pub(crate) unsafe fn parent(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).parent }
    }

    #[inline]
    pub(crate) unsafe fn left(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).left }
    }

    #[inline]
    pub(crate) unsafe fn right(&self) -> Option<RawNode<K>> {
        unsafe { (*self.as_ptr()).right }
    }

    /// Puts `child` into the `side` slot of `self` and points the child back at
    /// `self`. Whatever previously occupied the slot is forgotten by `self`,
    /// but keeps its own (now stale) parent link.
    ///
    /// Both directions of the edge are written here so that `parent`, `side`
    /// and `left`/`right` can never disagree.
    pub(crate) unsafe fn attach(&mut self, side: Side, child: Option<RawNode<K>>) {
        let ptr = self.as_ptr();
        unsafe {
            match side {
                Side::Left => (*ptr).left = child,
                Side::Right => (*ptr).right = child,
                Side::Root => unreachable!("a node cannot be attached as a root child"),
            }
            if let Some(child) = child {
                let child = child.as_ptr();
                (*child).parent = Some(*self);
                (*child).side = side;
            }
        }
    }

    /// Turns `self` into a root: no parent, [`Side::Root`].
    pub(crate) unsafe fn detach_as_root(&mut self) {
        let ptr = self.as_ptr();
        unsafe {
            (*ptr).parent = None;
            (*ptr).side = Side::Root;
        }
    }

    #[inline]
    pub(crate) unsafe fn grand_parent(&self) -> Option<RawNode<K>> {
        unsafe { self.parent().and_then(|p| p.parent()) }
    }

    /// The other child of the grandparent.
    pub(crate) unsafe fn uncle(&self) -> Option<RawNode<K>> {
        unsafe {
            let parent = self.parent()?;
            let grand_parent = parent.parent()?;
            match parent.side() {
                Side::Left => grand_parent.right(),
                Side::Right => grand_parent.left(),
                Side::Root => None,
            }
        }
    }
}

/// A shared view of one node of a [`RedBlackTree`].
///
/// The view borrows the tree, so the topology it describes cannot change
/// while it is alive. Two `NodeRef`s are equal if they point at the same node.
///
/// [`RedBlackTree`]: crate::RedBlackTree
pub struct NodeRef<'a, K> {
    raw: RawNode<K>,
    marker: PhantomData<&'a Node<K>>,
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for NodeRef<'_, K> {}

// SAFETY: a `NodeRef` only hands out `&K`, exactly like `&'a K` would.
unsafe impl<K: Sync> Send for NodeRef<'_, K> {}
unsafe impl<K: Sync> Sync for NodeRef<'_, K> {}

impl<'a, K> NodeRef<'a, K> {
    /// # Safety
    ///
    /// `raw` must point to a live node of a tree that stays borrowed
    /// (immutably) for `'a`.
    pub(crate) unsafe fn new(raw: RawNode<K>) -> Self {
        Self {
            raw,
            marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'a K {
        unsafe { self.raw.key() }
    }

    pub fn color(&self) -> Color {
        unsafe { self.raw.color() }
    }

    pub fn is_red(&self) -> bool {
        self.color().is_red()
    }

    pub fn is_black(&self) -> bool {
        self.color().is_black()
    }

    pub fn side(&self) -> Side {
        unsafe { self.raw.side() }
    }

    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        unsafe { self.raw.parent().map(|p| NodeRef::new(p)) }
    }

    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        unsafe { self.raw.left().map(|l| NodeRef::new(l)) }
    }

    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        unsafe { self.raw.right().map(|r| NodeRef::new(r)) }
    }

    /// Number of edges between this node and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.raw;
        while let Some(parent) = unsafe { node.parent() } {
            depth += 1;
            node = parent;
        }
        depth
    }

    pub fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }
}

impl<'a, K> fmt::Debug for NodeRef<'a, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("Node");
        f.field("key", self.key())
            .field("color", &self.color())
            .field("side", &self.side());

        let mut dbg_opt_node = |name: &str, node: Option<NodeRef<'a, K>>| match node {
            Some(node) => {
                f.field(name, &Some((node.key(), node.color())));
            }
            None => {
                f.field(name, &None::<K>);
            }
        };
        dbg_opt_node("parent", self.parent());
        dbg_opt_node("left", self.left());
        dbg_opt_node("right", self.right());

        f.finish()
    }
}
