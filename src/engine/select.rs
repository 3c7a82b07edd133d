//! Picks the best few items out of a collection.

use std::cmp::Ordering;

/// Returns the `n` highest items under `compare`, best first.
///
/// Each pass scans every item not yet picked and keeps the first one that no
/// later item strictly beats, so equal items come out in input order. Runs in
/// `O(n · items.len())` and leaves `items` untouched. Asking for more items
/// than exist returns all of them.
pub fn select_top_n<T, F>(items: &[T], n: usize, mut compare: F) -> Vec<&T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let count = n.min(items.len());
    let mut picked = vec![false; items.len()];
    let mut best = Vec::with_capacity(count);

    for _ in 0..count {
        let mut winner: Option<usize> = None;
        for (k, item) in items.iter().enumerate() {
            if picked[k] {
                continue;
            }
            match winner {
                Some(w) if compare(item, &items[w]) != Ordering::Greater => {}
                _ => winner = Some(k),
            }
        }

        // count <= number of unpicked items, so a winner always exists
        if let Some(w) = winner {
            picked[w] = true;
            best.push(&items[w]);
        }
    }

    best
}
