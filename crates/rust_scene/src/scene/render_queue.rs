//! Render queue for deferred drawing
//!
//! Collects leaves routed to a bucket during a draw traversal and hands them
//! to the renderer in bucket order once the traversal is done.

use super::draw::{DrawItem, Renderer};
use super::modes::RenderQueueMode;
use crate::foundation::math::Vec3;

#[derive(Debug, Clone)]
struct QueuedItem {
    distance_squared: f32,
    item: DrawItem,
}

/// Bucketed draw list for a frame
///
/// Opaque items are drawn front-to-back for early depth rejection,
/// transparent items back-to-front for blending, ortho items by descending
/// z order.
#[derive(Debug, Default)]
pub struct RenderQueue {
    /// Opaque items (rendered front-to-back for early-z)
    opaque: Vec<QueuedItem>,

    /// Transparent items (rendered back-to-front for alpha blending)
    transparent: Vec<QueuedItem>,

    /// Screen-space items (rendered by z order)
    ortho: Vec<DrawItem>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `item` in the bucket named by `mode`. Returns the item back
    /// when the mode does not name a bucket.
    pub fn add(&mut self, mode: RenderQueueMode, item: DrawItem, camera_location: &Vec3) -> Option<DrawItem> {
        let distance_squared = (item.world.translation - camera_location).norm_squared();
        match mode {
            RenderQueueMode::Opaque => self.opaque.push(QueuedItem { distance_squared, item }),
            RenderQueueMode::Transparent => self.transparent.push(QueuedItem { distance_squared, item }),
            RenderQueueMode::Ortho => self.ortho.push(item),
            RenderQueueMode::Skip | RenderQueueMode::Inherit => return Some(item),
        }
        None
    }

    /// Sort every bucket and draw opaque, transparent then ortho items,
    /// leaving the queue empty
    pub fn flush<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.sort();

        for queued in self.opaque.drain(..).chain(self.transparent.drain(..)) {
            renderer.draw(&queued.item);
        }

        if !self.ortho.is_empty() {
            renderer.set_ortho();
            for item in self.ortho.drain(..) {
                renderer.draw(&item);
            }
            renderer.unset_ortho();
        }
    }

    fn sort(&mut self) {
        self.opaque
            .sort_by(|a, b| a.distance_squared.total_cmp(&b.distance_squared));
        self.transparent
            .sort_by(|a, b| b.distance_squared.total_cmp(&a.distance_squared));
        self.ortho.sort_by_key(|item| std::cmp::Reverse(item.z_order));
    }

    /// Number of queued opaque items
    pub fn opaque_count(&self) -> usize {
        self.opaque.len()
    }

    /// Number of queued transparent items
    pub fn transparent_count(&self) -> usize {
        self.transparent.len()
    }

    /// Number of queued ortho items
    pub fn ortho_count(&self) -> usize {
        self.ortho.len()
    }

    /// Total number of queued items
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len() + self.ortho.len()
    }

    /// Is nothing queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued item without drawing
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
        self.ortho.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::{draw_item, RecordingRenderer};

    #[test]
    fn test_skip_is_not_queued() {
        let mut queue = RenderQueue::new();
        let returned = queue.add(RenderQueueMode::Skip, draw_item("a", Vec3::zeros(), 0), &Vec3::zeros());
        assert!(returned.is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_flush_order() {
        let camera = Vec3::zeros();
        let mut queue = RenderQueue::new();
        queue.add(RenderQueueMode::Ortho, draw_item("hud_low", Vec3::zeros(), 1), &camera);
        queue.add(RenderQueueMode::Transparent, draw_item("glass_near", Vec3::new(0.0, 0.0, -2.0), 0), &camera);
        queue.add(RenderQueueMode::Opaque, draw_item("wall_far", Vec3::new(0.0, 0.0, -9.0), 0), &camera);
        queue.add(RenderQueueMode::Ortho, draw_item("hud_high", Vec3::zeros(), 5), &camera);
        queue.add(RenderQueueMode::Transparent, draw_item("glass_far", Vec3::new(0.0, 0.0, -7.0), 0), &camera);
        queue.add(RenderQueueMode::Opaque, draw_item("wall_near", Vec3::new(0.0, 0.0, -3.0), 0), &camera);

        assert_eq!(queue.opaque_count(), 2);
        assert_eq!(queue.transparent_count(), 2);
        assert_eq!(queue.ortho_count(), 2);

        let mut renderer = RecordingRenderer::default();
        queue.flush(&mut renderer);

        assert_eq!(
            renderer.drawn,
            ["wall_near", "wall_far", "glass_far", "glass_near", "hud_high", "hud_low"]
        );
        assert_eq!(renderer.ortho_passes, 1);
        assert!(queue.is_empty());
    }
}
