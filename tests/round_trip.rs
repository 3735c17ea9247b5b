//! Property tests for the flatten / project / build pipeline.

use std::collections::{HashMap, HashSet};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use taskdeck::io::board_json::{from_json, to_json};
use taskdeck::model::flat::FlatItem;
use taskdeck::model::section::{BoardDoc, Section};
use taskdeck::model::task::{TaskId, TaskItem};
use taskdeck::ops::build::build_tree;
use taskdeck::ops::drag::{DropOutcome, SectionController};
use taskdeck::ops::flatten::{flatten, visible_items};
use taskdeck::ops::projection::project;

const INDENT: f64 = 28.0;

/// (parent choice, collapsed, done) per node
type NodeSpec = (usize, bool, bool);

/// Node `i` hangs under an earlier node or at the root, picked by `choice`.
fn tree_from_specs(specs: &[NodeSpec]) -> Vec<TaskItem> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];
    let mut roots = Vec::new();
    for (i, (choice, _, _)) in specs.iter().enumerate() {
        match choice % (i + 1) {
            0 => roots.push(i),
            p => children[p - 1].push(i),
        }
    }

    fn make(i: usize, specs: &[NodeSpec], children: &[Vec<usize>]) -> TaskItem {
        let mut task = TaskItem::with_id(format!("t{}", i), format!("Task {}", i));
        task.collapsed = specs[i].1;
        task.done = specs[i].2;
        task.children = children[i]
            .iter()
            .map(|&c| make(c, specs, children))
            .collect();
        task
    }

    roots
        .iter()
        .map(|&r| make(r, specs, &children))
        .collect()
}

fn arb_tree() -> impl Strategy<Value = Vec<TaskItem>> {
    prop::collection::vec((any::<usize>(), any::<bool>(), any::<bool>()), 0..40)
        .prop_map(|specs| tree_from_specs(&specs))
}

/// Mostly a single chain (each node under the one before), with a few
/// random branches, so depths run into the hundreds.
fn arb_deep_tree() -> impl Strategy<Value = Vec<TaskItem>> {
    prop::collection::vec((any::<bool>(), any::<usize>(), any::<bool>()), 64..300).prop_map(
        |picks| {
            let specs: Vec<NodeSpec> = picks
                .iter()
                .enumerate()
                .map(|(i, &(branch, choice, collapsed))| {
                    let parent = if branch { choice } else { i };
                    (parent, collapsed, false)
                })
                .collect();
            tree_from_specs(&specs)
        },
    )
}

/// Pointer offsets in pixels: mostly ordinary travel, sometimes extreme
fn arb_offset() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -400.0f64..400.0,
        1 => prop::num::f64::ANY,
        1 => prop_oneof![
            Just(1e300),
            Just(-1e300),
            Just(f64::MAX),
            Just(f64::MIN),
            Just(1e19),
            Just(-1e19),
        ],
    ]
}

fn assert_depths_consistent(items: &[FlatItem]) {
    let depth_of: HashMap<&TaskId, usize> = items.iter().map(|i| (&i.id, i.depth)).collect();
    for item in items {
        match &item.parent_id {
            None => assert_eq!(item.depth, 0, "root {} has depth", item.id),
            Some(parent) => assert_eq!(
                item.depth,
                depth_of[parent] + 1,
                "{} is not one below its parent",
                item.id
            ),
        }
    }
}

fn ids(items: &[FlatItem]) -> HashSet<TaskId> {
    items.iter().map(|i| i.id.clone()).collect()
}

proptest! {
    #[test]
    fn build_inverts_flatten(tree in prop_oneof![arb_tree(), arb_deep_tree()]) {
        let rebuilt = build_tree(flatten(&tree));
        prop_assert!(rebuilt == tree);
    }

    #[test]
    fn board_json_round_trips(tree in prop_oneof![arb_tree(), arb_deep_tree()]) {
        let mut section = Section::new("prop");
        section.tasks = tree;
        let doc = BoardDoc {
            sections: vec![section],
            labels: Vec::new(),
        };
        let json = to_json(&doc).unwrap();
        let back = from_json(&json).unwrap();
        prop_assert!(back == doc);
    }

    #[test]
    fn depth_is_parent_depth_plus_one(tree in arb_tree()) {
        assert_depths_consistent(&flatten(&tree));
    }

    #[test]
    fn descendants_follow_their_node(tree in arb_tree()) {
        let items = flatten(&tree);
        for (i, item) in items.iter().enumerate() {
            prop_assert_eq!(item.index, i);
            let task = taskdeck::ops::task_ops::find_task(&tree, &item.id).unwrap();
            let count = task.descendant_count();
            let block = &items[i + 1..i + 1 + count];
            prop_assert!(block.iter().all(|d| d.depth > item.depth));
            if let Some(after) = items.get(i + 1 + count) {
                prop_assert!(after.depth <= item.depth);
            }
        }
    }

    #[test]
    fn collapse_hides_exactly_descendants(tree in arb_tree(), pick in any::<usize>()) {
        let mut tree = tree;
        let all = flatten(&tree);
        prop_assume!(!all.is_empty());
        // start fully expanded so only the chosen row hides anything
        for item in &all {
            let task = taskdeck::ops::task_ops::find_task_mut(&mut tree, &item.id).unwrap();
            task.collapsed = false;
        }
        let target = all[pick % all.len()].id.clone();
        let open = visible_items(&tree, None).len();
        let hidden = {
            let task = taskdeck::ops::task_ops::find_task_mut(&mut tree, &target).unwrap();
            task.collapsed = true;
            task.descendant_count()
        };
        prop_assert_eq!(open - visible_items(&tree, None).len(), hidden);
    }

    #[test]
    fn projection_stays_in_bounds(
        tree in arb_tree(),
        active_pick in any::<usize>(),
        over_pick in any::<usize>(),
        offset in arb_offset(),
    ) {
        let shown = visible_items(&tree, None);
        prop_assume!(!shown.is_empty());
        let active = shown[active_pick % shown.len()].id.clone();
        let items = visible_items(&tree, Some(&active));
        let over = items[over_pick % items.len()].id.clone();

        let p = project(&items, &active, &over, offset, INDENT).unwrap();
        prop_assert!(p.depth <= p.max_depth);
        if p.min_depth <= p.max_depth {
            prop_assert!(p.min_depth <= p.depth);
        }
        prop_assert_eq!(p.depth == 0, p.parent_id.is_none());
    }

    #[test]
    fn drop_keeps_every_task_and_lands_where_projected(
        tree in prop_oneof![arb_tree(), arb_deep_tree()],
        active_pick in any::<usize>(),
        over_pick in any::<usize>(),
        offset in arb_offset(),
    ) {
        let shown = visible_items(&tree, None);
        prop_assume!(!shown.is_empty());
        let active = shown[active_pick % shown.len()].id.clone();
        let candidates = visible_items(&tree, Some(&active));
        let over = candidates[over_pick % candidates.len()].id.clone();

        let mut section = Section::new("prop");
        section.tasks = tree.clone();
        let mut ctl = SectionController::new(section, INDENT);
        ctl.drag_start(&active).unwrap();
        ctl.drag_over(Some(&over));
        ctl.drag_move(offset);
        let projected = ctl.projection().unwrap();
        let outcome = ctl.drag_end();

        let after = flatten(ctl.tasks());
        prop_assert_eq!(ids(&after), ids(&flatten(&tree)));
        assert_depths_consistent(&after);

        let moved = after.iter().find(|i| i.id == active).unwrap();
        prop_assert_eq!(moved.depth, projected.depth);
        prop_assert_eq!(&moved.parent_id, &projected.parent_id);
        prop_assert_eq!(
            outcome,
            DropOutcome::Moved {
                task_id: active.clone(),
                parent_id: projected.parent_id.clone(),
                depth: projected.depth,
            }
        );
    }
}
