use super::payload::Edge;

/// Moves the item at `start` so it ends up at `finish` in the returned list.
/// `finish` indexes the list after removal, so `len - 1` means "last".
/// Out-of-range indexes leave the order untouched.
pub fn reorder<T: Clone>(list: &[T], start: usize, finish: usize) -> Vec<T> {
    let mut result = list.to_vec();
    if start >= list.len() || finish >= list.len() || start == finish {
        return result;
    }
    let item = result.remove(start);
    result.insert(finish, item);
    result
}

/// Index the dragged item lands on when dropped against `target`'s `edge`.
///
/// Dropping onto yourself never moves anything. Without an edge the item
/// takes the target's current slot.
pub fn reorder_destination_index(start: usize, target: usize, edge: Option<Edge>) -> usize {
    if start == target {
        return start;
    }
    let Some(edge) = edge else {
        return target;
    };

    let going_after = edge == Edge::Bottom;
    if start < target {
        // removal shifts the target one slot up
        if going_after { target } else { target - 1 }
    } else if going_after {
        target + 1
    } else {
        target
    }
}

pub fn reorder_with_edge<T: Clone>(
    list: &[T],
    start: usize,
    target: usize,
    edge: Option<Edge>,
) -> Vec<T> {
    if target >= list.len() {
        return list.to_vec();
    }
    reorder(list, start, reorder_destination_index(start, target, edge))
}
