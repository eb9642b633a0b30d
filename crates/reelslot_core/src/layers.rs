use crate::types::TextOverlay;
use std::collections::HashMap;
use uuid::Uuid;

/// Two overlays overlap when their half-open ranges `[start, end)` intersect.
/// Touching ranges do not overlap.
pub fn ranges_overlap(a: &TextOverlay, b: &TextOverlay) -> bool {
    !(a.end_time <= b.start_time || a.start_time >= b.end_time)
}

/// Assign each overlay a timeline lane so that overlays sharing a lane never
/// overlap in time.
///
/// Greedy first-fit in start-time order: each overlay takes the lowest lane
/// not used by an already placed overlay it overlaps. Ties in start time keep
/// collection order, so the result is deterministic.
pub fn assign_layers(overlays: &[TextOverlay]) -> HashMap<Uuid, usize> {
    let mut order: Vec<&TextOverlay> = overlays.iter().collect();
    // stable: equal start times keep collection order
    order.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let mut placed: Vec<(&TextOverlay, usize)> = Vec::with_capacity(order.len());
    let mut layers = HashMap::with_capacity(order.len());

    for overlay in order {
        let taken: Vec<usize> = placed
            .iter()
            .filter(|(other, _)| ranges_overlap(overlay, other))
            .map(|(_, layer)| *layer)
            .collect();

        let layer = (0..).find(|l| !taken.contains(l)).unwrap_or(0);
        placed.push((overlay, layer));
        layers.insert(overlay.id, layer);
    }

    layers
}

/// Number of lanes needed to draw the assignment.
pub fn layer_count(layers: &HashMap<Uuid, usize>) -> usize {
    layers.values().max().map_or(0, |max| max + 1)
}
