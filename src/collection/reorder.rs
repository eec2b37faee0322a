//! Index math for moving items inside an ordered list.
//!
//! Target indices are always expressed in the post-removal index space: the
//! moved items are taken out first, then re-inserted at `target` among the
//! remaining items. This keeps a drop position stable no matter how scattered
//! the moved items were.

/// Relocate a single element. Out-of-range indices are clamped.
///
/// Returns `true` when the order changed.
pub(crate) fn move_one<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if items.len() < 2 {
        return false;
    }
    let from = from.min(items.len() - 1);
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    from != to
}

/// Gather the elements at `indices` into one contiguous block at `target`.
///
/// The block keeps the elements' original relative order, as do the remaining
/// elements. Indices outside the list are ignored; `target` is clamped to the
/// end of the remaining list.
pub(crate) fn move_block<T>(items: &mut Vec<T>, indices: &[usize], target: usize) -> bool {
    let mut picked = vec![false; items.len()];
    for &index in indices {
        if let Some(slot) = picked.get_mut(index) {
            *slot = true;
        }
    }
    let count = picked.iter().filter(|picked| **picked).count();
    if count == 0 {
        return false;
    }
    let mut block = Vec::with_capacity(count);
    let mut rest = Vec::with_capacity(items.len() - count);
    for (item, picked) in items.drain(..).zip(picked.iter()) {
        if *picked {
            block.push(item);
        } else {
            rest.push(item);
        }
    }
    let target = target.min(rest.len());
    let unchanged = picked
        .iter()
        .enumerate()
        .all(|(index, picked)| *picked == (index >= target && index < target + count));
    rest.splice(target..target, block);
    *items = rest;
    !unchanged
}
