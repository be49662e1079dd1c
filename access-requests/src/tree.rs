//! Depth-first traversal of row trees.
//!
//! Traversal uses an explicit worklist instead of recursion, so arbitrarily
//! deep nesting is handled without growing the call stack.

/// A node with ordered children
pub trait TreeNode: Sized {
    /// Direct children, in display order
    fn children(&self) -> &[Self];

    /// Whether this node is a leaf
    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// Pre-order iterator over a forest
#[derive(Debug)]
pub struct Preorder<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: TreeNode> Iterator for Preorder<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Visit every node of `roots` in pre-order (parents before their children,
/// siblings in order)
pub fn preorder<'a, N, I>(roots: I) -> Preorder<'a, N>
where
    N: TreeNode + 'a,
    I: IntoIterator<Item = &'a N>,
{
    let mut stack: Vec<&'a N> = roots.into_iter().collect();
    stack.reverse();
    Preorder { stack }
}

/// Leaves of `roots`, left to right
pub fn leaves<'a, N, I>(roots: I) -> impl Iterator<Item = &'a N>
where
    N: TreeNode + 'a,
    I: IntoIterator<Item = &'a N>,
{
    preorder(roots).filter(|node| node.is_leaf())
}

/// First node in pre-order matching `predicate`
pub fn find<'a, N, I, P>(roots: I, mut predicate: P) -> Option<&'a N>
where
    N: TreeNode + 'a,
    I: IntoIterator<Item = &'a N>,
    P: FnMut(&N) -> bool,
{
    preorder(roots).find(|node| predicate(*node))
}
