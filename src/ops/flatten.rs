use std::collections::HashSet;

use crate::model::flat::FlatItem;
use crate::model::task::{TaskId, TaskItem};

/// Flatten a task tree into pre-order rows.
///
/// Roots get depth 0 and no parent; `index` counts up from 0 in output order.
/// Walks with an explicit stack so arbitrarily deep trees are fine.
pub fn flatten(roots: &[TaskItem]) -> Vec<FlatItem> {
    let mut items = Vec::new();
    // (task, depth, parent), pushed in reverse so siblings pop in order
    let mut stack: Vec<(&TaskItem, usize, Option<&TaskId>)> =
        roots.iter().rev().map(|t| (t, 0, None)).collect();

    while let Some((task, depth, parent)) = stack.pop() {
        let index = items.len();
        items.push(FlatItem::from_task(task, depth, parent.cloned(), index));
        for child in task.children.iter().rev() {
            stack.push((child, depth + 1, Some(&task.id)));
        }
    }

    items
}

/// Drop every row whose ancestor chain reaches one of `excluded`.
///
/// The excluded rows themselves stay. Relies on pre-order contiguity: a
/// single forward pass sees every parent before its children, so the working
/// set only has to grow with removed rows that have children of their own.
pub fn exclude_descendants_of(items: Vec<FlatItem>, excluded: &HashSet<TaskId>) -> Vec<FlatItem> {
    if excluded.is_empty() {
        return items;
    }
    let mut hidden_parents: HashSet<TaskId> = excluded.clone();

    items
        .into_iter()
        .filter(|item| match &item.parent_id {
            Some(parent) if hidden_parents.contains(parent) => {
                if item.has_children {
                    hidden_parents.insert(item.id.clone());
                }
                false
            }
            _ => true,
        })
        .collect()
}

/// Ids of collapsed rows that actually hide something
pub fn collapsed_ids(items: &[FlatItem]) -> HashSet<TaskId> {
    items
        .iter()
        .filter(|item| item.collapsed && item.has_children)
        .map(|item| item.id.clone())
        .collect()
}

/// The rendered sequence: collapsed subtrees hidden, and while a drag is in
/// progress the dragged item's subtree hidden too (it travels as a unit).
pub fn visible_items(roots: &[TaskItem], active: Option<&TaskId>) -> Vec<FlatItem> {
    let items = flatten(roots);
    let mut excluded = collapsed_ids(&items);
    if let Some(active) = active {
        excluded.insert(active.clone());
    }
    exclude_descendants_of(items, &excluded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[FlatItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    /// A[B[C], D], E
    fn sample() -> Vec<TaskItem> {
        vec![
            TaskItem::with_id("a", "A")
                .child(TaskItem::with_id("b", "B").child(TaskItem::with_id("c", "C")))
                .child(TaskItem::with_id("d", "D")),
            TaskItem::with_id("e", "E"),
        ]
    }

    #[test]
    fn test_flatten_pre_order() {
        let flat = flatten(&sample());
        assert_eq!(ids(&flat), vec!["a", "b", "c", "d", "e"]);
        let depths: Vec<usize> = flat.iter().map(|i| i.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 0]);
        let indexes: Vec<usize> = flat.iter().map(|i| i.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_flatten_parents() {
        let flat = flatten(&sample());
        let parents: Vec<Option<&str>> = flat
            .iter()
            .map(|i| i.parent_id.as_ref().map(|p| p.as_str()))
            .collect();
        assert_eq!(parents, vec![None, Some("a"), Some("b"), Some("a"), None]);
        assert!(flat[0].has_children);
        assert!(!flat[2].has_children);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let roots = sample();
        assert_eq!(flatten(&roots), flatten(&roots));
    }

    #[test]
    fn test_flatten_deep_chain_does_not_recurse() {
        let mut node = TaskItem::with_id("leaf", "leaf");
        for i in 0..20_000 {
            node = TaskItem::with_id(format!("n{}", i), "n").child(node);
        }
        let flat = flatten(std::slice::from_ref(&node));
        assert_eq!(flat.len(), 20_001);
        assert_eq!(flat.last().unwrap().depth, 20_000);
    }

    #[test]
    fn test_exclude_descendants_transitively() {
        let flat = flatten(&sample());
        let excluded: HashSet<TaskId> = [TaskId::from("a")].into_iter().collect();
        let kept = exclude_descendants_of(flat, &excluded);
        assert_eq!(ids(&kept), vec!["a", "e"]);
    }

    #[test]
    fn test_exclude_nothing() {
        let flat = flatten(&sample());
        let kept = exclude_descendants_of(flat.clone(), &HashSet::new());
        assert_eq!(kept, flat);
    }

    #[test]
    fn test_collapsed_ids_ignores_leaves() {
        let mut roots = sample();
        roots[0].children[0].collapsed = true; // B has a child
        roots[1].collapsed = true; // E is a leaf
        let flat = flatten(&roots);
        let collapsed = collapsed_ids(&flat);
        assert_eq!(collapsed.len(), 1);
        assert!(collapsed.contains(&TaskId::from("b")));
    }

    #[test]
    fn test_visible_items_hides_collapsed_and_active() {
        let mut roots = sample();
        roots[0].children[0].collapsed = true;
        assert_eq!(ids(&visible_items(&roots, None)), vec!["a", "b", "d", "e"]);

        roots[0].children[0].collapsed = false;
        let active = TaskId::from("a");
        assert_eq!(ids(&visible_items(&roots, Some(&active))), vec!["a", "e"]);
    }

    #[test]
    fn test_collapse_removes_exactly_descendants() {
        let mut roots = sample();
        let open = visible_items(&roots, None).len();
        roots[0].collapsed = true;
        let closed = visible_items(&roots, None);
        assert_eq!(open - closed.len(), roots[0].descendant_count());
        assert_eq!(ids(&closed), vec!["a", "e"]);
    }
}
