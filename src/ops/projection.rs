use crate::model::flat::FlatItem;
use crate::model::task::TaskId;

/// Where the dragged item would land if dropped now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub depth: usize,
    pub parent_id: Option<TaskId>,
    /// Shallowest legal depth (depth of the row below the drop point)
    pub min_depth: usize,
    /// Deepest legal depth (one below the row above the drop point)
    pub max_depth: usize,
}

/// Levels of horizontal travel: one per `indent_width` pixels, rounded to
/// the nearest level with halves going toward positive infinity.
pub fn drag_depth(offset_x: f64, indent_width: f64) -> i64 {
    if !offset_x.is_finite() || !indent_width.is_finite() || indent_width <= 0.0 {
        return 0;
    }
    (offset_x / indent_width + 0.5).floor() as i64
}

/// Move the element at `from` to `to`, shifting everything between.
/// Out-of-range indexes leave the slice untouched.
pub fn array_move<T>(items: &mut [T], from: usize, to: usize) {
    if from >= items.len() || to >= items.len() {
        return;
    }
    if from < to {
        items[from..=to].rotate_left(1);
    } else if to < from {
        items[to..=from].rotate_right(1);
    }
}

/// Compute the legal depth and parent for dragging `active_id` onto the row
/// `over_id` with a horizontal pointer offset of `offset_x` pixels.
///
/// `items` is the rendered sequence (dragged subtree already excluded).
/// Returns `None` when either id is not in `items`.
pub fn project(
    items: &[FlatItem],
    active_id: &TaskId,
    over_id: &TaskId,
    offset_x: f64,
    indent_width: f64,
) -> Option<Projection> {
    let over_index = items.iter().position(|i| &i.id == over_id)?;
    let active_index = items.iter().position(|i| &i.id == active_id)?;
    let active_depth = items[active_index].depth;

    let mut trial: Vec<&FlatItem> = items.iter().collect();
    array_move(&mut trial, active_index, over_index);

    let previous = over_index.checked_sub(1).map(|i| trial[i]);
    let next = trial.get(over_index + 1).copied();

    let max_depth = previous.map_or(0, |p| p.depth + 1);
    let min_depth = next.map_or(0, |n| n.depth);

    let candidate = (active_depth as i64).saturating_add(drag_depth(offset_x, indent_width));
    let depth = if candidate >= max_depth as i64 {
        max_depth
    } else if candidate < min_depth as i64 {
        min_depth
    } else {
        candidate as usize
    };

    let parent_id = match previous {
        None => None,
        Some(_) if depth == 0 => None,
        Some(prev) if depth == prev.depth => prev.parent_id.clone(),
        Some(prev) if depth > prev.depth => Some(prev.id.clone()),
        // Shallower than the row above: the sibling we would join sits
        // further up, so walk back to the nearest row at this depth.
        Some(_) => trial[..over_index]
            .iter()
            .rev()
            .find(|item| item.depth == depth)
            .and_then(|item| item.parent_id.clone()),
    };

    Some(Projection {
        depth,
        parent_id,
        min_depth,
        max_depth,
    })
}
