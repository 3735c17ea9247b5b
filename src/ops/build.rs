use indexmap::IndexMap;
use tracing::warn;

use crate::model::flat::FlatItem;
use crate::model::task::{TaskId, TaskItem};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Walk {
    Unseen,
    OnPath,
    Rooted,
}

/// Rebuild a nested tree from flat rows.
///
/// Each row becomes the last child of the row named by its `parent_id`, or a
/// root when there is none, so sibling order is sequence order. A parent may
/// appear later in the sequence than its child. Rows whose parent cannot be
/// used (missing, self, or part of a cycle) are attached at the root rather
/// than dropped. If an id repeats, its first row wins.
pub fn build_tree(items: Vec<FlatItem>) -> Vec<TaskItem> {
    let mut arena: IndexMap<TaskId, usize> = IndexMap::with_capacity(items.len());
    let mut parent_ids: Vec<Option<TaskId>> = Vec::with_capacity(items.len());
    let mut slots: Vec<Option<TaskItem>> = Vec::with_capacity(items.len());

    for item in items {
        if arena.contains_key(&item.id) {
            warn!(task_id = %item.id, "duplicate task id in flat sequence, dropping later row");
            continue;
        }
        arena.insert(item.id.clone(), slots.len());
        parent_ids.push(item.parent_id.clone());
        slots.push(Some(item.into_task()));
    }

    let mut parent_slot: Vec<Option<usize>> = parent_ids
        .iter()
        .enumerate()
        .map(|(slot, parent)| {
            let parent = parent.as_ref()?;
            match arena.get(parent) {
                Some(&p) if p != slot => Some(p),
                Some(_) => {
                    warn!(task_id = %parent, "task lists itself as parent, attaching at root");
                    None
                }
                None => {
                    warn!(
                        task_id = %slots[slot].as_ref().map(|t| t.id.as_str()).unwrap_or_default(),
                        parent_id = %parent,
                        "parent not found, attaching at root"
                    );
                    None
                }
            }
        })
        .collect();

    break_cycles(&mut parent_slot, &slots);

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    for (slot, parent) in parent_slot.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(slot),
            None => roots.push(slot),
        }
    }

    // Pre-order over slots; reversing it visits every child before its parent
    let mut order = Vec::with_capacity(slots.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(slot) = stack.pop() {
        order.push(slot);
        stack.extend(children[slot].iter().rev().copied());
    }

    for &slot in order.iter().rev() {
        let kids: Vec<TaskItem> = children[slot]
            .iter()
            .filter_map(|&c| slots[c].take())
            .collect();
        if let Some(task) = slots[slot].as_mut() {
            task.children = kids;
        }
    }

    roots.iter().filter_map(|&r| slots[r].take()).collect()
}

/// Cut every parent cycle at its earliest row so each row reaches the root.
fn break_cycles(parent_slot: &mut [Option<usize>], slots: &[Option<TaskItem>]) {
    let mut state = vec![Walk::Unseen; parent_slot.len()];

    for start in 0..parent_slot.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut cur = start;
        loop {
            match state[cur] {
                Walk::Rooted => break,
                Walk::OnPath => {
                    let from = path.iter().position(|&p| p == cur).unwrap_or(0);
                    if let Some(&cut) = path[from..].iter().min() {
                        warn!(
                            task_id = %slots[cut].as_ref().map(|t| t.id.as_str()).unwrap_or_default(),
                            "parent cycle detected, attaching at root"
                        );
                        parent_slot[cut] = None;
                    }
                    break;
                }
                Walk::Unseen => {
                    state[cur] = Walk::OnPath;
                    path.push(cur);
                    match parent_slot[cur] {
                        Some(p) => cur = p,
                        None => break,
                    }
                }
            }
        }
        for slot in path {
            state[slot] = Walk::Rooted;
        }
    }
}
