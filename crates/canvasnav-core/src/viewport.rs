//! Viewport module for pan/zoom transforms and animated focus.

use crate::animation::{AnimationStatus, AnimationToken, CameraAnimation, Instant};
use crate::config::ViewportConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest width/height used when fitting bounds, so a zero-sized box
/// cannot produce an infinite zoom.
pub const MIN_FOCUS_EXTENT: f64 = 1e-6;

/// Plain camera snapshot handed to renderers.
///
/// `screen = world * zoom + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Viewport manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and world coordinates, and runs at
/// most one camera animation at a time.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Current translation offset (pan)
    offset: Vec2,
    /// Current zoom level
    zoom: f64,
    /// Minimum allowed zoom level
    min_zoom: f64,
    /// Maximum allowed zoom level
    max_zoom: f64,
    /// Factor for a single zoom step
    zoom_step: f64,
    /// Canvas size in screen pixels
    size: Size,
    /// In-flight camera transition
    animation: Option<CameraAnimation>,
    /// Last issued animation generation
    generation: u64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a viewport at the origin with zoom 1.
    ///
    /// An unusable zoom range falls back to the default one.
    pub fn new(config: &ViewportConfig) -> Self {
        let (min_zoom, max_zoom) = if config.min_zoom > 0.0 && config.min_zoom <= config.max_zoom {
            (config.min_zoom, config.max_zoom)
        } else {
            log::warn!("Ignoring zoom range {}..{}", config.min_zoom, config.max_zoom);
            let defaults = ViewportConfig::default();
            (defaults.min_zoom, defaults.max_zoom)
        };
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            zoom_step: config.zoom_step,
            size: config.canvas_size(),
            animation: None,
            generation: 0,
        }
    }

    /// Set the canvas size in screen pixels.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width.max(0.0), height.max(0.0));
    }

    pub fn canvas_size(&self) -> Size {
        self.size
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Current camera state.
    pub fn viewport(&self) -> ViewportState {
        ViewportState {
            x: self.offset.x,
            y: self.offset.y,
            zoom: self.zoom,
        }
    }

    /// Jump to a camera state. Zoom is clamped; any animation is dropped.
    pub fn set_viewport(&mut self, state: ViewportState) {
        self.cancel_animation();
        self.apply(state);
    }

    fn apply(&mut self, state: ViewportState) {
        self.offset = Vec2::new(state.x, state.y);
        self.zoom = self.clamp_zoom(state.zoom);
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.cancel_animation();
        self.offset += delta;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    ///
    /// The result is clamped to the zoom range, so a zero or negative factor
    /// lands on `min_zoom` and an infinite one on `max_zoom`. NaN is ignored.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        if factor.is_nan() {
            return;
        }
        self.cancel_animation();

        let new_zoom = self.clamp_zoom((self.zoom * factor).max(0.0));
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to world before zoom
        let world_point = self.screen_to_world(screen_point);

        self.zoom = new_zoom;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    fn canvas_center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Zoom in one step around the canvas centre.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.canvas_center(), self.zoom_step);
    }

    /// Zoom out one step around the canvas centre.
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.canvas_center(), 1.0 / self.zoom_step);
    }

    /// Return to zoom 1, keeping the canvas centre fixed.
    pub fn reset_zoom(&mut self) {
        self.zoom_at(self.canvas_center(), 1.0 / self.zoom);
    }

    /// Camera state that centres `bounds` with `padding` pixels to spare.
    pub fn target_for_bounds(&self, bounds: Rect, padding: f64) -> ViewportState {
        let bounds = bounds.abs();
        let width = bounds.width().max(MIN_FOCUS_EXTENT);
        let height = bounds.height().max(MIN_FOCUS_EXTENT);

        let padded_viewport = Size::new(
            (self.size.width - padding * 2.0).max(1.0),
            (self.size.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / width;
        let scale_y = padded_viewport.height / height;
        let zoom = self.clamp_zoom(scale_x.min(scale_y));

        // Center the bounds in the viewport
        let bounds_center = bounds.center();
        let viewport_center = self.canvas_center();

        ViewportState {
            x: viewport_center.x - bounds_center.x * zoom,
            y: viewport_center.y - bounds_center.y * zoom,
            zoom,
        }
    }

    /// Fit the camera to show the given bounding box immediately.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        let target = self.target_for_bounds(bounds, padding);
        self.set_viewport(target);
    }

    /// Start animating towards a view that centres `bounds`.
    ///
    /// Any animation already running is superseded. A zero duration applies
    /// the target immediately. The returned token identifies this animation
    /// for [`Viewport::step_animation`].
    pub fn focus_on_bounds(
        &mut self,
        bounds: Rect,
        padding: f64,
        duration: Duration,
        now: Instant,
    ) -> AnimationToken {
        let target = self.target_for_bounds(bounds, padding);
        if self.animation.is_some() {
            log::trace!("Superseding camera animation {}", self.generation);
        }
        self.animation = None;
        self.generation += 1;
        let token = AnimationToken(self.generation);

        if duration.is_zero() {
            self.apply(target);
        } else {
            self.animation = Some(CameraAnimation::new(
                token,
                self.viewport(),
                target,
                now,
                duration,
            ));
        }
        token
    }

    /// Advance the animation identified by `token` to `now`.
    ///
    /// Frames of a superseded animation leave the state untouched.
    pub fn step_animation(&mut self, token: AnimationToken, now: Instant) -> AnimationStatus {
        let Some(animation) = self.animation.as_ref().filter(|a| a.token == token) else {
            return AnimationStatus::Superseded;
        };

        let (state, finished) = animation.sample(now);
        self.apply(state);
        if finished {
            self.animation = None;
            AnimationStatus::Finished
        } else {
            AnimationStatus::Running
        }
    }

    /// Advance the current animation, if any. Returns `true` while another
    /// frame is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.animation.as_ref().map(CameraAnimation::token) {
            Some(token) => self.step_animation(token, now) == AnimationStatus::Running,
            None => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// The running animation, if any.
    pub fn animation(&self) -> Option<&CameraAnimation> {
        self.animation.as_ref()
    }

    /// Drop the running animation and invalidate its token.
    pub fn cancel_animation(&mut self) {
        if self.animation.take().is_some() {
            self.generation += 1;
        }
    }

    /// Whether world-space `bounds`, grown by `margin` screen pixels,
    /// overlaps the canvas.
    pub fn is_visible(&self, bounds: Rect, margin: f64) -> bool {
        let screen = self.transform().transform_rect_bbox(bounds.abs()).inflate(margin, margin);
        screen.x1 >= 0.0
            && screen.x0 <= self.size.width
            && screen.y1 >= 0.0
            && screen.y0 <= self.size.height
    }

    /// The visible region of the canvas in world coordinates.
    pub fn viewport_bounds(&self) -> Rect {
        let inverse = self.inverse_transform();
        let corners = [
            Point::ZERO,
            Point::new(self.size.width, 0.0),
            Point::new(0.0, self.size.height),
            Point::new(self.size.width, self.size.height),
        ]
        .map(|p| inverse * p);

        let (mut min, mut max) = (corners[0], corners[0]);
        for p in &corners[1..] {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Rect::from_points(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    fn viewport_at(x: f64, y: f64, zoom: f64) -> Viewport {
        let mut viewport = Viewport::default();
        viewport.set_viewport(ViewportState { x, y, zoom });
        viewport
    }

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new(&ViewportConfig::default());
        assert_eq!(viewport.viewport(), ViewportState::default());
        assert_eq!(viewport.canvas_size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let viewport = viewport_at(50.0, 100.0, 2.0);
        let world = viewport.screen_to_world(Point::new(150.0, 300.0));
        assert_close(world.x, 50.0);
        assert_close(world.y, 100.0);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let states = [(0.0, 0.0, 1.0), (30.0, -20.0, 1.5), (-812.3, 77.1, 0.1), (5.0, 5.0, 5.0)];
        for (x, y, zoom) in states {
            let viewport = viewport_at(x, y, zoom);
            for original in [Point::new(123.0, 456.0), Point::new(-9.5, 0.25), Point::ZERO] {
                let back = viewport.world_to_screen(viewport.screen_to_world(original));
                assert!((back.x - original.x).abs() < 1e-9);
                assert!((back.y - original.y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zoom_at_center_scenario() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Point::new(400.0, 300.0), 2.0);
        let state = viewport.viewport();
        assert_close(state.x, -400.0);
        assert_close(state.y, -300.0);
        assert_close(state.zoom, 2.0);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut viewport = viewport_at(-37.0, 12.5, 0.8);
        let anchor = Point::new(215.0, 90.0);
        for factor in [1.1, 0.5, 3.0, 0.9] {
            let before = viewport.screen_to_world(anchor);
            viewport.zoom_at(anchor, factor);
            let after = viewport.screen_to_world(anchor);
            assert!((before.x - after.x).abs() < 1e-9);
            assert!((before.y - after.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Point::ZERO, 0.001); // Try to zoom way out
        assert_close(viewport.zoom(), 0.1);

        for _ in 0..50 {
            viewport.zoom_at(Point::new(10.0, 10.0), 1.7);
            assert!(viewport.zoom() <= 5.0 && viewport.zoom() >= 0.1);
        }
        assert_close(viewport.zoom(), 5.0);

        viewport.zoom_at(Point::ZERO, f64::NAN);
        assert_close(viewport.zoom(), 5.0);
        viewport.zoom_at(Point::ZERO, -2.0);
        assert_close(viewport.zoom(), 0.1);
    }

    #[test]
    fn test_zoom_at_degenerate_factors_clamp() {
        let center = Point::new(400.0, 300.0);
        for (factor, expected) in [(0.0, 0.1), (-3.0, 0.1), (f64::INFINITY, 5.0)] {
            let mut viewport = viewport_at(-20.0, 35.0, 1.0);
            let before = viewport.screen_to_world(center);
            viewport.zoom_at(center, factor);
            assert_close(viewport.zoom(), expected);
            let after = viewport.screen_to_world(center);
            assert_close(before.x, after.x);
            assert_close(before.y, after.y);
        }
    }

    #[test]
    fn test_set_canvas_size() {
        let mut viewport = Viewport::default();
        viewport.set_canvas_size(1000.0, 400.0);
        assert_eq!(viewport.canvas_size(), Size::new(1000.0, 400.0));
        assert_eq!(viewport.viewport_bounds(), Rect::new(0.0, 0.0, 1000.0, 400.0));

        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut moved = viewport.clone();
        moved.set_viewport(viewport.target_for_bounds(bounds, 50.0));
        let center = moved.world_to_screen(bounds.center());
        assert_close(center.x, 500.0);
        assert_close(center.y, 200.0);

        viewport.set_canvas_size(-5.0, 300.0);
        assert_eq!(viewport.canvas_size(), Size::new(0.0, 300.0));
    }

    #[test]
    fn test_pan_is_additive() {
        let mut split = Viewport::default();
        split.pan(Vec2::new(10.0, 20.0));
        split.pan(Vec2::new(-3.5, 7.0));

        let mut single = Viewport::default();
        single.pan(Vec2::new(6.5, 27.0));

        assert_close(split.offset().x, single.offset().x);
        assert_close(split.offset().y, single.offset().y);
    }

    #[test]
    fn test_zoom_steps_about_center() {
        let mut viewport = Viewport::default();
        let center = Point::new(400.0, 300.0);
        let before = viewport.screen_to_world(center);
        viewport.zoom_in();
        assert_close(viewport.zoom(), 1.2);
        viewport.zoom_out();
        viewport.zoom_out();
        viewport.reset_zoom();
        assert_close(viewport.zoom(), 1.0);
        let after = viewport.screen_to_world(center);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn test_target_for_bounds_centers() {
        let viewport = Viewport::default();
        let bounds = Rect::new(100.0, 100.0, 200.0, 180.0);
        let target = viewport.target_for_bounds(bounds, 100.0);
        // min(600 / 100, 400 / 80) = 5
        assert_close(target.zoom, 5.0);

        let mut moved = viewport.clone();
        moved.set_viewport(target);
        let center = moved.world_to_screen(bounds.center());
        assert_close(center.x, 400.0);
        assert_close(center.y, 300.0);
    }

    #[test]
    fn test_degenerate_bounds_are_finite() {
        let viewport = Viewport::default();
        let target = viewport.target_for_bounds(Rect::new(10.0, 10.0, 10.0, 10.0), 50.0);
        assert!(target.zoom.is_finite());
        assert!(target.x.is_finite() && target.y.is_finite());
        assert_close(target.zoom, 5.0);
    }

    #[test]
    fn test_focus_animation_runs_to_target() {
        let mut viewport = Viewport::default();
        let start = Instant::now();
        let bounds = Rect::new(1000.0, 1000.0, 1400.0, 1300.0);
        let target = viewport.target_for_bounds(bounds, 50.0);
        let token = viewport.focus_on_bounds(bounds, 50.0, Duration::from_millis(300), start);

        assert!(viewport.is_animating());
        assert_eq!(
            viewport.step_animation(token, start + Duration::from_millis(100)),
            AnimationStatus::Running
        );
        assert_ne!(viewport.viewport(), target);
        assert_eq!(
            viewport.step_animation(token, start + Duration::from_millis(300)),
            AnimationStatus::Finished
        );
        assert_eq!(viewport.viewport(), target);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn test_newer_focus_supersedes_older() {
        let mut viewport = Viewport::default();
        let start = Instant::now();
        let first = viewport.focus_on_bounds(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            0.0,
            Duration::from_millis(300),
            start,
        );
        let second_bounds = Rect::new(5000.0, 5000.0, 5100.0, 5100.0);
        let second =
            viewport.focus_on_bounds(second_bounds, 0.0, Duration::from_millis(300), start);
        assert_ne!(first, second);

        let later = start + Duration::from_millis(150);
        viewport.step_animation(second, later);
        let state = viewport.viewport();

        // A stale frame must not write state
        assert_eq!(viewport.step_animation(first, later), AnimationStatus::Superseded);
        assert_eq!(viewport.viewport(), state);

        while viewport.tick(start + Duration::from_secs(1)) {}
        assert_eq!(viewport.viewport(), viewport.target_for_bounds(second_bounds, 0.0));
    }

    #[test]
    fn test_manual_pan_cancels_animation() {
        let mut viewport = Viewport::default();
        let start = Instant::now();
        let token = viewport.focus_on_bounds(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0.0,
            Duration::from_millis(300),
            start,
        );
        viewport.pan(Vec2::new(5.0, 5.0));
        assert!(!viewport.is_animating());
        assert_eq!(
            viewport.step_animation(token, start + Duration::from_millis(10)),
            AnimationStatus::Superseded
        );
        assert_close(viewport.offset().x, 5.0);
    }

    #[test]
    fn test_zero_duration_focus_snaps() {
        let mut viewport = Viewport::default();
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        viewport.focus_on_bounds(bounds, 0.0, Duration::ZERO, Instant::now());
        assert!(!viewport.is_animating());
        assert_eq!(viewport.viewport(), viewport.target_for_bounds(bounds, 0.0));
    }

    #[test]
    fn test_is_visible() {
        let viewport = Viewport::default();
        assert!(viewport.is_visible(Rect::new(10.0, 10.0, 50.0, 50.0), 0.0));
        assert!(!viewport.is_visible(Rect::new(900.0, 10.0, 950.0, 50.0), 0.0));
        assert!(viewport.is_visible(Rect::new(900.0, 10.0, 950.0, 50.0), 150.0));

        let zoomed = viewport_at(-1000.0, 0.0, 2.0);
        // World x 500..550 maps to screen 0..100
        assert!(zoomed.is_visible(Rect::new(500.0, 0.0, 550.0, 10.0), 0.0));
        assert!(!zoomed.is_visible(Rect::new(0.0, 0.0, 100.0, 10.0), 0.0));
    }

    #[test]
    fn test_viewport_bounds() {
        let viewport = Viewport::default();
        assert_eq!(viewport.viewport_bounds(), Rect::new(0.0, 0.0, 800.0, 600.0));

        let zoomed = viewport_at(-400.0, -300.0, 2.0);
        let bounds = zoomed.viewport_bounds();
        assert_close(bounds.x0, 200.0);
        assert_close(bounds.y0, 150.0);
        assert_close(bounds.width(), 400.0);
        assert_close(bounds.height(), 300.0);
    }
}
