//! Viewport over the layout, scrolled so the cursor stays visible.

use crate::layout::layout_geometry::{KDCoordinate, KDPoint, KDRect, KDSize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollableView {
    viewport: KDSize,
    content: KDSize,
    offset: KDPoint,
}

impl ScrollableView {
    pub fn new(viewport: KDSize) -> Self {
        ScrollableView {
            viewport,
            content: KDSize::ZERO,
            offset: KDPoint::ORIGIN,
        }
    }

    pub fn viewport(&self) -> KDSize {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: KDSize) {
        self.viewport = viewport;
        self.clamp_offset();
    }

    pub fn set_content_size(&mut self, content: KDSize) {
        self.content = content;
        self.clamp_offset();
    }

    pub fn offset(&self) -> KDPoint {
        self.offset
    }

    /// Part of the content currently shown, in content coordinates.
    pub fn visible_rect(&self) -> KDRect {
        KDRect::from_origin_and_size(self.offset, self.viewport)
    }

    fn clamp_offset(&mut self) {
        let max_x = (self.content.width - self.viewport.width).max(0);
        let max_y = (self.content.height - self.viewport.height).max(0);
        self.offset = KDPoint::new(self.offset.x.clamp(0, max_x), self.offset.y.clamp(0, max_y));
    }

    /// Minimal scroll that brings `rect` into view.
    pub fn scroll_to_content_rect(&mut self, rect: KDRect) {
        let mut offset = self.offset;
        if rect.left() < offset.x {
            offset.x = rect.left();
        } else if rect.right() > offset.x + self.viewport.width {
            offset.x = rect.right() - self.viewport.width;
        }
        if rect.top() < offset.y {
            offset.y = rect.top();
        } else if rect.bottom() > offset.y + self.viewport.height {
            offset.y = rect.bottom() - self.viewport.height;
        }
        self.offset = offset;
        self.clamp_offset();
    }

    /// Scrolls `rect` into view, then keeps the band around its baseline visible so tall
    /// content does not make the baseline jump.
    pub fn scroll_to_baselined_rect(&mut self, rect: KDRect, baseline: KDCoordinate) {
        self.scroll_to_content_rect(rect);
        let margin = baseline
            .min(rect.height - baseline)
            .min(self.viewport.height / 2);
        self.scroll_to_content_rect(KDRect::new(
            rect.x,
            rect.y + baseline - margin,
            rect.width,
            2 * margin,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_to_content_rect() {
        let mut view = ScrollableView::new(KDSize::new(100, 40));
        view.set_content_size(KDSize::new(300, 40));
        view.scroll_to_content_rect(KDRect::new(250, 0, 1, 18));
        assert_eq!(view.offset(), KDPoint::new(151, 0));
        view.scroll_to_content_rect(KDRect::new(10, 0, 1, 18));
        assert_eq!(view.offset(), KDPoint::new(10, 0));
    }

    #[test]
    fn test_baselined_scroll_centres_tall_rect() {
        let mut view = ScrollableView::new(KDSize::new(100, 40));
        view.set_content_size(KDSize::new(100, 200));
        // 120 high, baseline at 60: the band [y+40, y+80] ends up visible
        view.scroll_to_baselined_rect(KDRect::new(0, 50, 1, 120), 60);
        let visible = view.visible_rect();
        assert!(visible.top() <= 90 && visible.bottom() >= 130);
    }
}
