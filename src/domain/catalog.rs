//! Title-ordered book catalog.
//!
//! An unbalanced binary search tree whose nodes live in a generational arena.
//! Left subtrees hold strictly smaller titles, right subtrees hold titles that
//! are greater or equal, so duplicate titles are allowed and always route right.

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{instrument, trace};

use crate::domain::entities::Book;

/// Levels drawn by [`Catalog::to_tree`].
pub const RENDER_DEPTH: usize = 64;

/// One tree node. The catalog is the only owner of the contained book.
#[derive(Debug)]
pub struct CatalogNode {
    pub book: Book,
    pub left: Option<Index>,
    pub right: Option<Index>,
}

impl CatalogNode {
    fn leaf(book: Book) -> Self {
        Self {
            book,
            left: None,
            right: None,
        }
    }
}

/// Where a node hangs: the root slot or one side of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    Left(Index),
    Right(Index),
}

#[derive(Debug, Default)]
pub struct Catalog {
    arena: Arena<CatalogNode>,
    root: Option<Index>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Adds `book` as a new leaf. Never fails and never rebalances.
    #[instrument(level = "trace", skip(self, book), fields(title = %book.title))]
    pub fn insert(&mut self, book: Book) {
        let mut slot = Slot::Root;
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let Some(node) = self.arena.get(idx) else {
                break;
            };
            if book.title < node.book.title {
                slot = Slot::Left(idx);
                cursor = node.left;
            } else {
                slot = Slot::Right(idx);
                cursor = node.right;
            }
        }
        let new_idx = self.arena.insert(CatalogNode::leaf(book));
        self.set_slot(slot, Some(new_idx));
    }

    /// First book on the descent path whose title equals `title`.
    pub fn search(&self, title: &str) -> Option<&Book> {
        let (_, idx) = self.locate(title)?;
        self.arena.get(idx).map(|n| &n.book)
    }

    pub fn search_mut(&mut self, title: &str) -> Option<&mut Book> {
        let (_, idx) = self.locate(title)?;
        self.arena.get_mut(idx).map(|n| &mut n.book)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.locate(title).is_some()
    }

    /// Removes the node `search` would find and hands its book back.
    ///
    /// Returns `None` and leaves the tree untouched when the title is absent.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, title: &str) -> Option<Book> {
        let (slot, idx) = self.locate(title)?;
        self.unlink(slot, idx)
    }

    /// Lazy in-order traversal, ascending by title.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(self)
    }

    /// Number of nodes on the longest root-to-leaf path.
    ///
    /// Iterative; sorted inserts (as on reload) build a chain as deep as the catalog.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> =
            self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(
                    node.left
                        .into_iter()
                        .chain(node.right)
                        .map(|child| (child, level + 1)),
                );
            }
        }
        deepest
    }

    /// Renders the tree shape, children prefixed with `L`/`R`.
    ///
    /// Only the top [`RENDER_DEPTH`] levels are drawn; a deeper subtree shows
    /// up as a single `...` child.
    pub fn to_tree(&self) -> Tree<String> {
        fn build(catalog: &Catalog, idx: Index, label: String, level: usize) -> Tree<String> {
            let mut tree = Tree::new(label);
            let Some(node) = catalog.arena.get(idx) else {
                return tree;
            };
            if level >= RENDER_DEPTH {
                if node.left.is_some() || node.right.is_some() {
                    tree.push(Tree::new("...".to_string()));
                }
                return tree;
            }
            if let Some(left) = node.left {
                let label = format!("L {}", catalog.title_at(left));
                tree.push(build(catalog, left, label, level + 1));
            }
            if let Some(right) = node.right {
                let label = format!("R {}", catalog.title_at(right));
                tree.push(build(catalog, right, label, level + 1));
            }
            tree
        }

        match self.root {
            Some(root) => build(self, root, self.title_at(root).to_string(), 1),
            None => Tree::new("Empty catalog".to_string()),
        }
    }

    fn title_at(&self, idx: Index) -> &str {
        self.arena.get(idx).map_or("", |n| n.book.title.as_str())
    }

    fn locate(&self, title: &str) -> Option<(Slot, Index)> {
        let mut slot = Slot::Root;
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let node = self.arena.get(idx)?;
            if node.book.title == title {
                return Some((slot, idx));
            }
            if title < node.book.title.as_str() {
                slot = Slot::Left(idx);
                cursor = node.left;
            } else {
                slot = Slot::Right(idx);
                cursor = node.right;
            }
        }
        None
    }

    fn set_slot(&mut self, slot: Slot, child: Option<Index>) {
        match slot {
            Slot::Root => self.root = child,
            Slot::Left(parent) => {
                if let Some(node) = self.arena.get_mut(parent) {
                    node.left = child;
                }
            }
            Slot::Right(parent) => {
                if let Some(node) = self.arena.get_mut(parent) {
                    node.right = child;
                }
            }
        }
    }

    fn unlink(&mut self, slot: Slot, idx: Index) -> Option<Book> {
        let node = self.arena.get(idx)?;
        match (node.left, node.right) {
            (None, None) => {
                trace!("unlink leaf");
                self.set_slot(slot, None);
                self.arena.remove(idx).map(|n| n.book)
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!("unlink single child");
                self.set_slot(slot, Some(child));
                self.arena.remove(idx).map(|n| n.book)
            }
            (Some(_), Some(right)) => {
                // Successor is the left-most node of the right subtree; it has no
                // left child, so unlinking it never recurses further.
                let mut succ_slot = Slot::Right(idx);
                let mut succ = right;
                while let Some(left) = self.arena.get(succ).and_then(|n| n.left) {
                    succ_slot = Slot::Left(succ);
                    succ = left;
                }
                trace!("unlink two children, successor moved up");
                let succ_book = self.unlink(succ_slot, succ)?;
                let node = self.arena.get_mut(idx)?;
                Some(std::mem::replace(&mut node.book, succ_book))
            }
        }
    }
}

impl FromIterator<Book> for Catalog {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        catalog.extend(iter);
        catalog
    }
}

impl Extend<Book> for Catalog {
    fn extend<I: IntoIterator<Item = Book>>(&mut self, iter: I) {
        for book in iter {
            self.insert(book);
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Book;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator with an explicit stack of pending ancestors.
pub struct InOrder<'a> {
    catalog: &'a Catalog,
    stack: Vec<Index>,
    cursor: Option<Index>,
}

impl<'a> InOrder<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            stack: Vec::new(),
            cursor: catalog.root,
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.cursor {
            self.stack.push(idx);
            self.cursor = self.catalog.arena.get(idx).and_then(|n| n.left);
        }
        let idx = self.stack.pop()?;
        let node = self.catalog.arena.get(idx)?;
        self.cursor = node.right;
        Some(&node.book)
    }
}
