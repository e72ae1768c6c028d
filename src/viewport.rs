//! Window sizing state.
//!
//! A [`Viewport`] is always replaced as a whole, never field by field, so a
//! frame can only ever observe a consistent width/height/pixel-ratio triple.
//! Resize events land in a [`PendingResize`] slot and are applied at the start
//! of the next frame.

use glam::Vec2;

/// Upper bound for the rendering pixel ratio.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Viewports narrower than this use the mobile camera preset.
pub const MOBILE_BREAKPOINT: f32 = 1024.0;

/// Logical size of the drawing surface plus its pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

impl Viewport {
    /// `device_pixel_ratio` is clamped to `[f32::EPSILON, MAX_PIXEL_RATIO]`.
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            pixel_ratio: device_pixel_ratio.clamp(f32::EPSILON, MAX_PIXEL_RATIO),
        }
    }

    /// From a physical window size and its scale factor.
    pub fn from_physical(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f32>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor as f32)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    #[inline]
    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT
    }

    /// Render resolution in pixels, as fed to the particle shader.
    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * self.pixel_ratio
    }
}

/// Single-slot mailbox for the latest resize.
#[derive(Debug, Default)]
pub struct PendingResize {
    slot: Option<Viewport>,
}

impl PendingResize {
    /// Store `viewport`, replacing any resize not yet applied.
    pub fn request(&mut self, viewport: Viewport) {
        self.slot = Some(viewport);
    }

    /// Take the pending viewport, leaving the slot empty.
    pub fn take(&mut self) -> Option<Viewport> {
        self.slot.take()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_is_capped() {
        let vp = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.resolution(), Vec2::new(1600.0, 1200.0));
    }

    #[test]
    fn test_pixel_ratio_keeps_sub_unit_values() {
        assert_eq!(Viewport::new(800.0, 600.0, 0.5).pixel_ratio(), 0.5);
        assert_eq!(Viewport::new(800.0, 600.0, 0.0).pixel_ratio(), f32::EPSILON);
    }

    #[test]
    fn test_mobile_breakpoint() {
        assert!(Viewport::new(800.0, 600.0, 1.0).is_mobile());
        assert!(!Viewport::new(1024.0, 768.0, 1.0).is_mobile());
    }

    #[test]
    fn test_from_physical_uses_logical_size() {
        let vp = Viewport::from_physical(winit::dpi::PhysicalSize::new(2048, 1536), 2.0);
        assert_eq!(vp.width(), 1024.0);
        assert_eq!(vp.height(), 768.0);
        assert_eq!(vp.resolution(), Vec2::new(2048.0, 1536.0));
    }

    #[test]
    fn test_latest_resize_wins() {
        let mut pending = PendingResize::default();
        pending.request(Viewport::new(640.0, 480.0, 1.0));
        pending.request(Viewport::new(800.0, 600.0, 1.0));
        assert!(pending.is_pending());
        assert_eq!(pending.take(), Some(Viewport::new(800.0, 600.0, 1.0)));
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let vp = Viewport::new(100.0, 0.0, 1.0);
        assert!(vp.aspect().is_finite());
    }
}
