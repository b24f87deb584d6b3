//! Tree presenter
//!
//! Turns a flat list of parent-linked items (departments) into a forest.
//! Parent references are never trusted: a parent of 0 or one that does not
//! resolve makes the item a root, and parent cycles are broken so that every
//! item still appears exactly once.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

/// An item that knows its own id and its parent's id (0 = none)
pub trait TreeItem {
    fn id(&self) -> i64;
    fn parent_id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Number of nodes in this subtree, self included
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Number of levels in this subtree, self included
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

/// Deepest level a node may sit at; deeper chains are cut into new roots so
/// that rendering, cloning and dropping a tree stay within a bounded depth
pub const MAX_DEPTH: usize = 64;

/// Referential problems found while building, reported rather than rejected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    /// Items whose parent id does not exist; promoted to roots
    pub dangling: Vec<i64>,
    /// Items promoted to roots to break a parent cycle
    pub cycles: Vec<i64>,
    /// Repeated ids; only the first occurrence is kept
    pub duplicates: Vec<i64>,
    /// Items below `MAX_DEPTH` levels; promoted to roots
    pub too_deep: Vec<i64>,
}

impl TreeReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
            && self.cycles.is_empty()
            && self.duplicates.is_empty()
            && self.too_deep.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forest<T> {
    pub roots: Vec<TreeNode<T>>,
    pub report: TreeReport,
}

impl<T> Forest<T> {
    pub fn size(&self) -> usize {
        self.roots.iter().map(TreeNode::size).sum()
    }
}

/// Build a forest in two passes: index by id, then attach to parents.
/// Sibling order follows input order.
pub fn build_forest<T: TreeItem>(items: Vec<T>) -> Forest<T> {
    let mut report = TreeReport::default();

    // Pass 1: index every item by its own id
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(items.len());
    let mut slots: Vec<Option<T>> = Vec::with_capacity(items.len());
    for item in items {
        if index.contains_key(&item.id()) {
            report.duplicates.push(item.id());
            continue;
        }
        index.insert(item.id(), slots.len());
        slots.push(Some(item));
    }

    // Pass 2: attach to the parent's entry or start a root
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut root_slots = Vec::new();
    for (pos, slot) in slots.iter().enumerate() {
        let Some(item) = slot else { continue };
        let parent = item.parent_id();
        match index.get(&parent) {
            Some(&parent_pos) if parent != 0 => children[parent_pos].push(pos),
            _ => {
                if parent != 0 {
                    report.dangling.push(item.id());
                }
                root_slots.push(pos);
            }
        }
    }

    let mut layout = Layout::new(children);
    for pos in root_slots {
        layout.plant(pos);
    }
    layout.plant_cut();

    // Whatever is still unplaced hangs off a parent cycle
    for pos in 0..slots.len() {
        if layout.depth[pos].is_none() {
            layout.plant(pos);
            layout.plant_cut();
            if let Some(item) = &slots[pos] {
                report.cycles.push(item.id());
            }
        }
    }

    report.too_deep = layout
        .cut
        .iter()
        .filter_map(|&pos| slots[pos].as_ref().map(TreeItem::id))
        .collect();

    if !report.dangling.is_empty() {
        tracing::warn!("Promoted items with missing parents to roots: {:?}", report.dangling);
    }
    if !report.cycles.is_empty() {
        tracing::warn!("Broke parent cycles at: {:?}", report.cycles);
    }
    if !report.duplicates.is_empty() {
        tracing::warn!("Skipped duplicate ids: {:?}", report.duplicates);
    }
    if !report.too_deep.is_empty() {
        tracing::warn!("Cut chains deeper than {} levels at: {:?}", MAX_DEPTH, report.too_deep);
    }

    let roots = layout.assemble(slots);
    Forest { roots, report }
}

/// Placement of every slot: its level and the children kept under it
struct Layout {
    children: Vec<Vec<usize>>,
    kept: Vec<Vec<usize>>,
    depth: Vec<Option<usize>>,
    roots: Vec<usize>,
    cut: Vec<usize>,
    pending: VecDeque<usize>,
}

impl Layout {
    fn new(children: Vec<Vec<usize>>) -> Self {
        let len = children.len();
        Self {
            children,
            kept: vec![Vec::new(); len],
            depth: vec![None; len],
            roots: Vec::new(),
            cut: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Place `root` at level 0 and walk its descendants
    fn plant(&mut self, root: usize) {
        self.depth[root] = Some(0);
        self.roots.push(root);
        let mut stack = vec![(root, 0)];
        while let Some((pos, level)) = stack.pop() {
            for child in std::mem::take(&mut self.children[pos]) {
                if self.depth[child].is_some() {
                    continue;
                }
                if level + 1 >= MAX_DEPTH {
                    self.depth[child] = Some(0);
                    self.cut.push(child);
                    self.pending.push_back(child);
                } else {
                    self.depth[child] = Some(level + 1);
                    self.kept[pos].push(child);
                    stack.push((child, level + 1));
                }
            }
        }
    }

    /// Plant every subtree that was cut off for depth
    fn plant_cut(&mut self) {
        while let Some(pos) = self.pending.pop_front() {
            self.plant(pos);
        }
    }

    /// Build nodes bottom-up with an explicit stack
    fn assemble<T>(self, mut slots: Vec<Option<T>>) -> Vec<TreeNode<T>> {
        let mut built: Vec<Option<TreeNode<T>>> = (0..slots.len()).map(|_| None).collect();
        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&pos| (pos, false)).collect();
        while let Some((pos, ready)) = stack.pop() {
            if ready {
                let Some(item) = slots[pos].take() else { continue };
                let children = self.kept[pos]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[pos] = Some(TreeNode { item, children });
            } else {
                stack.push((pos, true));
                stack.extend(self.kept[pos].iter().map(|&child| (child, false)));
            }
        }
        self.roots.iter().filter_map(|&pos| built[pos].take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Dept {
        id: i64,
        parent: i64,
    }

    impl TreeItem for Dept {
        fn id(&self) -> i64 {
            self.id
        }

        fn parent_id(&self) -> i64 {
            self.parent
        }
    }

    fn depts(pairs: &[(i64, i64)]) -> Vec<Dept> {
        pairs.iter().map(|&(id, parent)| Dept { id, parent }).collect()
    }

    fn shape(node: &TreeNode<Dept>) -> String {
        if node.children.is_empty() {
            node.item.id.to_string()
        } else {
            let kids: Vec<String> = node.children.iter().map(shape).collect();
            format!("{}[{}]", node.item.id, kids.join(","))
        }
    }

    fn shapes(forest: &Forest<Dept>) -> Vec<String> {
        forest.roots.iter().map(shape).collect()
    }

    #[test]
    fn test_dangling_parent_is_promoted() {
        let forest = build_forest(depts(&[(1, 0), (2, 1), (3, 99)]));
        assert_eq!(shapes(&forest), vec!["1[2]", "3"]);
        assert_eq!(forest.report.dangling, vec![3]);
        assert!(forest.report.cycles.is_empty());
    }

    #[test]
    fn test_children_before_parents_in_input() {
        let forest = build_forest(depts(&[(4, 2), (3, 2), (2, 1), (1, 0)]));
        assert_eq!(shapes(&forest), vec!["1[2[4,3]]"]);
        assert!(forest.report.is_clean());
    }

    #[test]
    fn test_every_node_once_with_cycle() {
        // 2 -> 3 -> 2 is a cycle, 5 hangs below 3
        let forest = build_forest(depts(&[(1, 0), (2, 3), (3, 2), (5, 3)]));
        assert_eq!(forest.size(), 4);
        assert_eq!(shapes(&forest), vec!["1", "2[3[5]]"]);
        assert_eq!(forest.report.cycles, vec![2]);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let forest = build_forest(depts(&[(7, 7)]));
        assert_eq!(shapes(&forest), vec!["7"]);
        assert_eq!(forest.report.cycles, vec![7]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let forest = build_forest(vec![
            Dept { id: 1, parent: 0 },
            Dept { id: 1, parent: 5 },
            Dept { id: 2, parent: 1 },
        ]);
        assert_eq!(shapes(&forest), vec!["1[2]"]);
        assert_eq!(forest.roots[0].item.parent, 0);
        assert_eq!(forest.report.duplicates, vec![1]);
    }

    #[test]
    fn test_each_resolvable_node_appears_once_under_its_parent() {
        let input = depts(&[(1, 0), (2, 1), (3, 1), (4, 3), (5, 42), (6, 0), (7, 6)]);
        let forest = build_forest(input.clone());
        assert_eq!(forest.size(), input.len());

        fn walk(node: &TreeNode<Dept>, parent: i64, seen: &mut Vec<(i64, i64)>) {
            seen.push((node.item.id, parent));
            for child in &node.children {
                walk(child, node.item.id, seen);
            }
        }
        let mut seen = Vec::new();
        for root in &forest.roots {
            walk(root, 0, &mut seen);
        }
        seen.sort();
        assert_eq!(seen, vec![(1, 0), (2, 1), (3, 1), (4, 3), (5, 0), (6, 0), (7, 6)]);
    }

    #[test]
    fn test_long_chain_is_cut_into_bounded_trees() {
        let chain: Vec<Dept> = (1..=100_000).map(|id| Dept { id, parent: id - 1 }).collect();
        let forest = build_forest(chain);

        assert_eq!(forest.size(), 100_000);
        assert_eq!(forest.roots.len(), 1_563);
        assert!(forest.roots.iter().all(|root| root.depth() <= MAX_DEPTH));
        assert_eq!(forest.roots[0].depth(), MAX_DEPTH);
        assert_eq!(forest.roots[1].item.id, 65);
        assert_eq!(forest.report.too_deep.len(), 1_562);
        assert_eq!(forest.report.too_deep[0], 65);
        assert!(forest.report.dangling.is_empty());

        let json = serde_json::to_string(&forest).unwrap();
        assert!(json.starts_with("{\"roots\":[{\"id\":1,"));
    }

    #[test]
    fn test_empty_input() {
        let forest: Forest<Dept> = build_forest(Vec::new());
        assert!(forest.roots.is_empty());
        assert!(forest.report.is_clean());
    }
}
