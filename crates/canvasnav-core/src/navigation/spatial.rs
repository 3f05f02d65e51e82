//! Directional nearest-neighbour search.

use crate::command::Direction;
use crate::element::Element;
use crate::store::ElementStore;
use kurbo::Rect;

/// Whether `candidate` counts as lying in `direction` from `current`.
///
/// The candidate's centre must be strictly past the current centre on the
/// primary axis, and its extent on the perpendicular axis must overlap the
/// current extent grown by `tolerance` on both sides.
pub fn in_direction(current: Rect, candidate: Rect, direction: Direction, tolerance: f64) -> bool {
    let from = current.center();
    let to = candidate.center();

    let beyond = match direction {
        Direction::Left => to.x < from.x,
        Direction::Right => to.x > from.x,
        Direction::Up => to.y < from.y,
        Direction::Down => to.y > from.y,
    };
    if !beyond {
        return false;
    }

    if direction.is_horizontal() {
        candidate.y0 <= current.y1 + tolerance && candidate.y1 >= current.y0 - tolerance
    } else {
        candidate.x0 <= current.x1 + tolerance && candidate.x1 >= current.x0 - tolerance
    }
}

/// The element closest to `current` (centre to centre) in `direction`.
///
/// Ties go to the element that comes first in store order.
pub fn nearest_in_direction<'a>(
    store: &'a ElementStore,
    current: &Element,
    direction: Direction,
    tolerance: f64,
) -> Option<&'a Element> {
    let bounds = current.bounds().abs();
    let center = bounds.center();

    let mut best: Option<(&Element, f64)> = None;
    for candidate in store.iter() {
        if candidate.id() == current.id() {
            continue;
        }
        if !in_direction(bounds, candidate.bounds().abs(), direction, tolerance) {
            continue;
        }
        let distance = center.distance(candidate.center());
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(element, _)| element)
}
