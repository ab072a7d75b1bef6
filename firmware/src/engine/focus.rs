//! Focus picker — chooses at most one target from the frame's list.
//!
//! A forced cluster id (host command `SET_FOCUS`) wins when present this
//! frame; otherwise the nearest target is chosen. Ties on range break
//! by list order.

use super::{FocusTarget, Target};

/// Select the focus target.
///
/// * `forced_cluster >= 0`: first target with that cluster id; if the
///   cluster is absent this frame, fall back to the nearest.
/// * otherwise: the target with the smallest finite range.
///
/// Returns `None` for an empty list, or when no target has a finite
/// range.
pub fn pick(targets: &[Target], forced_cluster: i16) -> Option<FocusTarget> {
    if forced_cluster >= 0 {
        if let Some((index, target)) = targets
            .iter()
            .enumerate()
            .find(|(_, t)| t.cluster_id == forced_cluster)
        {
            return Some(FocusTarget {
                index,
                target: *target,
            });
        }
    }

    nearest(targets)
}

fn nearest(targets: &[Target]) -> Option<FocusTarget> {
    let mut best: Option<(usize, f32)> = None;
    for (index, target) in targets.iter().enumerate() {
        let r = target.range_m();
        if !r.is_finite() {
            continue;
        }
        // Strict comparison keeps the first of equally-near targets.
        match best {
            Some((_, best_r)) if r >= best_r => {}
            _ => best = Some((index, r)),
        }
    }
    best.map(|(index, _)| FocusTarget {
        index,
        target: targets[index],
    })
}

// ── Tests ────────────────────────────────────────────────────
