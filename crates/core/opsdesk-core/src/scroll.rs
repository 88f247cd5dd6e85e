//! Scroll anchoring across history prepends
//!
//! The scroll container is an external collaborator: the engine only
//! reads its content height and offset, and applies one offset
//! adjustment in the same turn as a prepend so the visible anchor point
//! does not jump.

/// Boundary to the scroll container of a thread view
pub trait ScrollAnchor: Send {
    /// Total scrollable content height
    fn content_height(&self) -> f64;

    /// Current scroll offset from the top of the content
    fn scroll_offset(&self) -> f64;

    /// Move the scroll position
    fn set_scroll_offset(&mut self, offset: f64);
}

/// Preserve the visual anchor point after older content was prepended
///
/// `height_before` must be read before the prepend; the offset is
/// shifted by however much the content grew. Must run in the same task
/// turn as the prepend, before the renderer paints.
pub fn preserve_on_prepend(anchor: &mut dyn ScrollAnchor, height_before: f64) {
    let delta = anchor.content_height() - height_before;
    if delta > 0.0 {
        anchor.set_scroll_offset(anchor.scroll_offset() + delta);
    }
}

/// Backward-load trigger policy: is the viewport near the top?
pub fn near_top(anchor: &dyn ScrollAnchor, threshold: f64) -> bool {
    anchor.scroll_offset() <= threshold
}
