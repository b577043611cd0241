use crate::tdigest::centroids::{is_sorted_by_mean, total_weight_of, Centroid};
use crate::tdigest::scale::ArcsineScale;
use crate::tdigest::DigestConfig;

const KLIMIT_TOL: f64 = 1e-12;

/// k-limited fold over an ascending unit sequence.
///
/// The first and last units are emitted untouched. Interior units fold into the open
/// centroid while `k(q_right) − k(q_left) ≤ 1`, where `q_left` is the weight placed before
/// the open centroid and `q_right` includes the candidate unit, both over `total_weight`.
fn klimit_fold(items: &[Centroid], total_weight: u64, scale: ArcsineScale) -> Vec<Centroid> {
    if items.len() <= 2 {
        return items.to_vec();
    }
    let total = total_weight as f64;
    let last = items.len() - 1;

    let mut out: Vec<Centroid> = Vec::with_capacity(items.len().min(256));
    out.push(items[0]);

    let mut placed = items[0].weight();
    let mut open = items[1];
    let mut k_left = scale.k(placed as f64 / total);

    for unit in &items[2..last] {
        let q_right = (placed + open.weight() + unit.weight()) as f64 / total;
        if scale.k(q_right) - k_left <= 1.0 + KLIMIT_TOL {
            open.absorb(unit);
        } else {
            placed += open.weight();
            out.push(open);
            open = *unit;
            k_left = scale.k(placed as f64 / total);
        }
    }
    out.push(open);
    out.push(items[last]);
    out
}

/// Re-fold with a coarser resolution until the store fits `max_centroids`.
/// Doubling `δ` eventually shrinks the k range below 1, which leaves 3 centroids.
fn cap_centroids(mut out: Vec<Centroid>, total_weight: u64, config: &DigestConfig) -> Vec<Centroid> {
    let mut compression = config.compression;
    while out.len() > config.max_centroids {
        compression *= 2.0;
        let before = out.len();
        out = klimit_fold(&out, total_weight, ArcsineScale::new(compression));
        tracing::debug!(
            before,
            after = out.len(),
            compression,
            max_centroids = config.max_centroids,
            "tdigest: centroid cap re-fold"
        );
    }
    out
}

/// Fold an ascending stream of units (existing centroids and/or raw points) into a new,
/// size-bounded centroid store. `total_weight` must equal the summed unit weight.
pub(crate) fn compress_into<I>(units: I, total_weight: u64, config: &DigestConfig) -> Vec<Centroid>
where
    I: IntoIterator<Item = Centroid>,
{
    let items: Vec<Centroid> = units.into_iter().collect();
    debug_assert!(
        is_sorted_by_mean(&items),
        "compress_into requires non-decreasing means"
    );
    debug_assert_eq!(total_weight_of(&items), Some(total_weight), "total weight mismatch");

    let mut out = klimit_fold(&items, total_weight, ArcsineScale::new(config.compression));
    ttrace!(
        units_in = items.len(),
        centroids_out = out.len(),
        total_weight,
        "tdigest: compress"
    );

    if out.len() > config.max_centroids {
        out = cap_centroids(out, total_weight, config);
    }

    debug_assert!(is_sorted_by_mean(&out));
    debug_assert_eq!(total_weight_of(&out), Some(total_weight), "total weight changed");
    out
}
