//! QuadTree spatial partitioning structure
//!
//! Recursively divides a 2D region into four quadrants so that collision
//! queries only look at entries near the query rectangle. A node is either a
//! leaf or split into exactly four children; splits are never undone.
//!
//! An entry is stored at the deepest node whose single quadrant fully contains
//! its rectangle. Entries that straddle a quadrant boundary stay at the
//! current node, which is also where everything ends up once `max_levels` is
//! reached.

use crate::config::QuadTreeConfig;
use crate::foundation::math::Rectangle;

/// One of the four children of a split node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Top-left
    NorthWest,
    /// Top-right
    NorthEast,
    /// Bottom-left
    SouthWest,
    /// Bottom-right
    SouthEast,
}

impl Quadrant {
    /// All quadrants in child order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Position of this quadrant in a node's child array
    pub fn index(self) -> usize {
        match self {
            Quadrant::NorthWest => 0,
            Quadrant::NorthEast => 1,
            Quadrant::SouthWest => 2,
            Quadrant::SouthEast => 3,
        }
    }

    /// The part of `parent` this quadrant covers
    pub fn bounds_within(self, parent: &Rectangle) -> Rectangle {
        let half_width = parent.width * 0.5;
        let half_height = parent.height * 0.5;
        let (dx, dy) = match self {
            Quadrant::NorthWest => (0.0, 0.0),
            Quadrant::NorthEast => (half_width, 0.0),
            Quadrant::SouthWest => (0.0, half_height),
            Quadrant::SouthEast => (half_width, half_height),
        };
        Rectangle::new(parent.x + dx, parent.y + dy, half_width, half_height)
    }
}

/// An item stored in the tree together with its rectangle
#[derive(Debug, Clone)]
pub struct QuadTreeEntry<T> {
    /// Rectangle the item was inserted with
    pub rectangle: Rectangle,
    /// Stored item
    pub item: T,
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    max_objects: usize,
    max_levels: u32,
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode<T> {
    level: u32,
    bounds: Rectangle,
    objects: Vec<QuadTreeEntry<T>>,
    children: Option<Box<[QuadTreeNode<T>; 4]>>,
}

impl<T> QuadTreeNode<T> {
    /// Create an empty leaf
    pub fn new(level: u32, bounds: Rectangle) -> Self {
        Self {
            level,
            bounds,
            objects: Vec::new(),
            children: None,
        }
    }

    /// Depth of this node (0 = root)
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Region covered by this node
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Entries held directly by this node
    pub fn objects(&self) -> &[QuadTreeEntry<T>] {
        &self.objects
    }

    /// The four children, if split
    pub fn children(&self) -> Option<&[QuadTreeNode<T>; 4]> {
        self.children.as_deref()
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The single quadrant that fully contains `rectangle`, if any
    pub fn quadrant_of(&self, rectangle: &Rectangle) -> Option<Quadrant> {
        Quadrant::ALL
            .into_iter()
            .find(|quadrant| quadrant.bounds_within(&self.bounds).contains(rectangle))
    }

    fn split(&mut self) {
        if self.children.is_some() {
            return;
        }
        let level = self.level + 1;
        let bounds = self.bounds;
        self.children = Some(Box::new(
            Quadrant::ALL.map(|quadrant| QuadTreeNode::new(level, quadrant.bounds_within(&bounds))),
        ));
        log::debug!(
            "QuadTree node at level {} split ({}x{} at {}, {})",
            self.level,
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y
        );
    }

    fn insert(&mut self, entry: QuadTreeEntry<T>, limits: Limits) {
        let quadrant = self.quadrant_of(&entry.rectangle);
        if let (Some(children), Some(quadrant)) = (self.children.as_mut(), quadrant) {
            children[quadrant.index()].insert(entry, limits);
            return;
        }

        self.objects.push(entry);

        if self.is_leaf() && self.objects.len() > limits.max_objects && self.level < limits.max_levels {
            self.split();
            // Straddling entries come straight back to this node
            for entry in std::mem::take(&mut self.objects) {
                self.insert(entry, limits);
            }
        }
    }

    fn collect<'a>(&'a self, query: &Rectangle, results: &mut Vec<&'a QuadTreeEntry<T>>) {
        results.extend(self.objects.iter());
        if let Some(children) = &self.children {
            for child in children.iter() {
                if reaches_child(&child.bounds, query) {
                    child.collect(query, results);
                }
            }
        }
    }

    fn remove_first(&mut self, predicate: &mut dyn FnMut(&T) -> bool) -> bool {
        if let Some(index) = self.objects.iter().position(|entry| predicate(&entry.item)) {
            self.objects.remove(index);
            return true;
        }
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if child.remove_first(predicate) {
                    return true;
                }
            }
        }
        false
    }

    fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(QuadTreeNode::count_nodes).sum())
    }

    fn max_level(&self) -> u32 {
        self.children.as_ref().map_or(self.level, |children| {
            children.iter().map(QuadTreeNode::max_level).max().unwrap_or(self.level)
        })
    }
}

/// Whether `query` reaches into the half-open region `[start, end)` of a child
///
/// An edge lying exactly on the child's start does not reach it; a query of
/// zero extent reaches the child whose range holds its position.
fn reaches(start: f32, end: f32, query_start: f32, query_end: f32) -> bool {
    if query_end > query_start {
        query_start < end && start < query_end
    } else {
        start <= query_start && query_start < end
    }
}

fn reaches_child(child: &Rectangle, query: &Rectangle) -> bool {
    reaches(child.left(), child.right(), query.left(), query.right())
        && reaches(child.top(), child.bottom(), query.top(), query.bottom())
}

/// QuadTree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: QuadTreeNode<T>,
    limits: Limits,
    len: usize,
}

impl<T: Clone> QuadTree<T> {
    /// Create an empty tree from config
    pub fn new(config: &QuadTreeConfig) -> Self {
        Self::with_bounds(config.bounds, config.max_objects_per_node, config.max_levels)
    }

    /// Create an empty tree covering `bounds`
    pub fn with_bounds(bounds: Rectangle, max_objects_per_node: usize, max_levels: u32) -> Self {
        Self {
            root: QuadTreeNode::new(0, bounds),
            limits: Limits {
                max_objects: max_objects_per_node,
                max_levels,
            },
            len: 0,
        }
    }

    /// Region covered by the root node
    pub fn bounds(&self) -> Rectangle {
        self.root.bounds
    }

    /// Root node, for inspection
    pub fn root(&self) -> &QuadTreeNode<T> {
        &self.root
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    /// Deepest node level (0 for an unsplit tree)
    pub fn depth(&self) -> u32 {
        self.root.max_level()
    }

    /// Insert an item with its rectangle
    ///
    /// Rectangles outside the tree bounds are kept at the root.
    pub fn insert(&mut self, rectangle: Rectangle, item: T) {
        self.root.insert(QuadTreeEntry { rectangle, item }, self.limits);
        self.len += 1;
    }

    /// Entries that may collide with `query`
    ///
    /// Only narrows the search: callers still run a precise test on each
    /// returned entry. Every entry whose rectangle overlaps `query` is
    /// returned, together with unrelated entries stored on the way down.
    pub fn candidate_entries(&self, query: &Rectangle) -> Vec<&QuadTreeEntry<T>> {
        let mut results = Vec::new();
        self.root.collect(query, &mut results);
        results
    }

    /// Items that may collide with `query`
    pub fn candidates(&self, query: &Rectangle) -> Vec<T> {
        self.candidate_entries(query)
            .into_iter()
            .map(|entry| entry.item.clone())
            .collect()
    }

    /// Remove the first entry whose item matches `predicate`
    pub fn remove_by(&mut self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        let removed = self.root.remove_first(&mut predicate);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Remove every entry and collapse back to a single empty leaf
    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(0, self.root.bounds);
        self.len = 0;
    }

    /// Replace the covered region; implies [`QuadTree::clear`]
    pub fn reset(&mut self, bounds: Rectangle) {
        self.root = QuadTreeNode::new(0, bounds);
        self.len = 0;
    }
}

impl<T: Clone + PartialEq> QuadTree<T> {
    /// Remove the first entry holding `item`
    pub fn remove(&mut self, item: &T) -> bool {
        self.remove_by(|stored| stored == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(max_objects: usize, max_levels: u32) -> QuadTree<u32> {
        QuadTree::with_bounds(Rectangle::new(0.0, 0.0, 800.0, 600.0), max_objects, max_levels)
    }

    fn assert_split_is_atomic<T>(node: &QuadTreeNode<T>) {
        if let Some(children) = node.children() {
            assert_eq!(children.len(), 4);
            for child in children {
                assert_eq!(child.level(), node.level() + 1);
                assert_split_is_atomic(child);
            }
        }
    }

    #[test]
    fn test_quadrant_bounds() {
        let parent = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(Quadrant::NorthWest.bounds_within(&parent), Rectangle::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(Quadrant::SouthEast.bounds_within(&parent), Rectangle::new(400.0, 300.0, 400.0, 300.0));

        let node: QuadTreeNode<u32> = QuadTreeNode::new(0, parent);
        assert_eq!(node.quadrant_of(&Rectangle::new(410.0, 10.0, 10.0, 10.0)), Some(Quadrant::NorthEast));
        assert_eq!(node.quadrant_of(&Rectangle::new(395.0, 10.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_inserted_entry_is_its_own_candidate() {
        let mut tree = tree(2, 4);
        let rects = [
            Rectangle::new(10.0, 10.0, 5.0, 5.0),
            Rectangle::new(390.0, 290.0, 20.0, 20.0),
            Rectangle::new(700.0, 500.0, 30.0, 30.0),
            Rectangle::new(100.0, 400.0, 10.0, 10.0),
            Rectangle::new(-50.0, -50.0, 10.0, 10.0),
        ];
        for (id, rect) in rects.iter().enumerate() {
            tree.insert(*rect, id as u32);
            assert!(tree.candidates(rect).contains(&(id as u32)));
        }
        for (id, rect) in rects.iter().enumerate() {
            assert!(tree.candidates(rect).contains(&(id as u32)));
        }
        assert_eq!(tree.len(), rects.len());
    }

    #[test]
    fn test_depth_never_exceeds_max_levels() {
        let mut tree = tree(1, 3);
        for id in 0..64 {
            tree.insert(Rectangle::new(1.0, 1.0, 2.0, 2.0), id);
        }
        assert_eq!(tree.depth(), 3);
        assert_split_is_atomic(tree.root());
        assert_eq!(tree.candidates(&Rectangle::new(1.0, 1.0, 2.0, 2.0)).len(), 64);
    }

    #[test]
    fn test_no_split_below_threshold() {
        let mut tree = tree(4, 5);
        for id in 0..4 {
            tree.insert(Rectangle::new(id as f32 * 10.0, 0.0, 5.0, 5.0), id);
        }
        assert!(tree.root().is_leaf());
        assert_eq!(tree.node_count(), 1);

        tree.insert(Rectangle::new(600.0, 400.0, 5.0, 5.0), 4);
        assert!(!tree.root().is_leaf());
        assert_eq!(tree.node_count(), 5);
        assert_split_is_atomic(tree.root());
    }

    #[test]
    fn test_straddling_entries_stay_at_node() {
        let mut tree = tree(1, 5);
        tree.insert(Rectangle::new(390.0, 290.0, 20.0, 20.0), 0);
        tree.insert(Rectangle::new(10.0, 10.0, 5.0, 5.0), 1);

        let root = tree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.objects().len(), 1);
        assert_eq!(root.objects()[0].item, 0);

        // A straddling query still sees entries on both sides
        let wide = tree.candidates(&Rectangle::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(wide.len(), 2);
    }

    #[test]
    fn test_query_on_quadrant_boundary_stays_on_its_side() {
        let mut tree = tree(1, 3);
        tree.insert(Rectangle::new(390.0, 10.0, 10.0, 10.0), 0);
        tree.insert(Rectangle::new(400.0, 10.0, 10.0, 10.0), 1);
        assert_eq!(tree.root().objects().len(), 0);

        // Left edge exactly on the vertical split
        assert_eq!(tree.candidates(&Rectangle::new(400.0, 50.0, 10.0, 10.0)), vec![1]);
        // Right edge exactly on the vertical split
        assert_eq!(tree.candidates(&Rectangle::new(390.0, 50.0, 10.0, 10.0)), vec![0]);
        // A point on the split belongs to the eastern half
        assert_eq!(tree.candidates(&Rectangle::new(400.0, 15.0, 0.0, 0.0)), vec![1]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut tree = tree(1, 4);
        for id in 0..8 {
            tree.insert(Rectangle::new(id as f32 * 90.0, id as f32 * 70.0, 10.0, 10.0), id);
        }
        assert!(tree.remove(&3));
        assert!(!tree.remove(&3));
        assert!(tree.remove_by(|item| *item == 7));
        assert_eq!(tree.len(), 6);
        assert!(!tree.candidates(&Rectangle::new(270.0, 210.0, 10.0, 10.0)).contains(&3));

        let nodes = tree.node_count();
        assert!(nodes > 1);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.candidates(&tree.bounds()).is_empty());
    }
}
