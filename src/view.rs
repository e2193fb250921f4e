//! Input-driven view state: orbit camera, layer camera and the resizable
//! layer viewport. Handlers apply their change immediately; the next frame
//! reads whatever was written last.

use glam::Vec2;

use crate::config::LayerViewConfig;
use crate::renderer::camera::{LayerCamera, OrbitCamera};

pub const HANDLE_SIZE: f32 = 16.0;
const LAYER_VIEW_MARGIN: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragStart {
    cursor: Vec2,
    width: f32,
    height: f32,
}

/// Secondary viewport anchored at the top-left corner, resized from its
/// bottom-right handle.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerViewport {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub min_size: f32,
    drag: Option<DragStart>,
}

impl LayerViewport {
    pub fn new(width: f32, height: f32, min_size: f32) -> Self {
        Self {
            origin: Vec2::splat(LAYER_VIEW_MARGIN),
            width: width.max(min_size),
            height: height.max(min_size),
            min_size,
            drag: None,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x <= self.origin.x + self.width
            && p.y <= self.origin.y + self.height
    }

    pub fn handle_contains(&self, p: Vec2) -> bool {
        let corner = self.origin + Vec2::new(self.width, self.height);
        p.x >= corner.x - HANDLE_SIZE && p.y >= corner.y - HANDLE_SIZE && p.x <= corner.x && p.y <= corner.y
    }

    /// Starts a resize if `cursor` is on the handle.
    pub fn begin_drag(&mut self, cursor: Vec2) -> bool {
        if !self.handle_contains(cursor) {
            return false;
        }
        self.drag = Some(DragStart {
            cursor,
            width: self.width,
            height: self.height,
        });
        true
    }

    /// New `(width, height)` while a resize is active.
    pub fn drag_to(&mut self, cursor: Vec2) -> Option<(f32, f32)> {
        let start = self.drag?;
        let delta = cursor - start.cursor;
        self.width = (start.width + delta.x).max(self.min_size);
        self.height = (start.height + delta.y).max(self.min_size);
        Some((self.width, self.height))
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The part of the viewport inside a `surface_w` x `surface_h` target,
    /// as `(x, y, w, h)` in whole pixels.
    pub fn clipped_rect(&self, surface_w: u32, surface_h: u32) -> Option<(u32, u32, u32, u32)> {
        let x = self.origin.x.max(0.0) as u32;
        let y = self.origin.y.max(0.0) as u32;
        if x >= surface_w || y >= surface_h {
            return None;
        }

        let w = (self.width as u32).min(surface_w - x);
        let h = (self.height as u32).min(surface_h - y);
        (w > 0 && h > 0).then_some((x, y, w, h))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Routes pointer, wheel and resize input to the right view.
pub struct ViewController {
    pub orbit: OrbitCamera,
    pub layer_camera: LayerCamera,
    pub layer_viewport: LayerViewport,
    /// Whether the layer viewport is on screen and accepts input.
    pub layer_active: bool,
    cursor: Vec2,
    orbiting: bool,
}

impl ViewController {
    pub fn new(layer: &LayerViewConfig, ortho_size: f32) -> Self {
        Self {
            orbit: OrbitCamera::default(),
            layer_camera: LayerCamera::new(ortho_size, layer.zoom_min, layer.zoom_max),
            layer_viewport: LayerViewport::new(layer.width, layer.height, layer.min_size),
            layer_active: true,
            cursor: Vec2::ZERO,
            orbiting: false,
        }
    }

    /// Returns the new layer viewport size when a resize is in progress.
    pub fn on_cursor_moved(&mut self, position: Vec2) -> Option<(f32, f32)> {
        let delta = position - self.cursor;
        self.cursor = position;

        if let Some(size) = self.layer_viewport.drag_to(position) {
            return Some(size);
        }
        if self.orbiting {
            self.orbit.process_drag(delta);
        }
        None
    }

    pub fn on_button(&mut self, button: PointerButton, pressed: bool) {
        match (button, pressed) {
            (PointerButton::Primary, true) => {
                if self.layer_active && self.layer_viewport.begin_drag(self.cursor) {
                    log::debug!("layer viewport resize started at {:?}", self.cursor);
                    return;
                }
                if !(self.layer_active && self.layer_viewport.contains(self.cursor)) {
                    self.orbiting = true;
                }
            }
            (PointerButton::Primary, false) => {
                if self.layer_viewport.is_dragging() {
                    log::debug!(
                        "layer viewport resized to {}x{}",
                        self.layer_viewport.width,
                        self.layer_viewport.height
                    );
                }
                self.layer_viewport.end_drag();
                self.orbiting = false;
            }
            (PointerButton::Secondary, _) => {}
        }
    }

    /// `delta_y > 0` means scrolling down, as reported by a page.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if self.layer_active && self.layer_viewport.contains(self.cursor) {
            self.layer_camera.on_wheel(delta_y);
            log::debug!("layer zoom {:.3}", self.layer_camera.zoom);
        } else {
            self.orbit.process_scroll(-delta_y);
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.orbit.set_aspect(width as f32, height as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ViewController {
        ViewController::new(&LayerViewConfig::default(), 2.0)
    }

    fn handle_point(vp: &LayerViewport) -> Vec2 {
        vp.origin + Vec2::new(vp.width, vp.height) - Vec2::splat(4.0)
    }

    #[test]
    fn test_drag_resizes_by_delta() {
        let mut vp = LayerViewport::new(500.0, 500.0, 150.0);
        let start = handle_point(&vp);
        assert!(vp.begin_drag(start));
        assert_eq!(vp.drag_to(start + Vec2::new(40.0, -25.0)), Some((540.0, 475.0)));
        vp.end_drag();
        assert_eq!(vp.drag_to(start + Vec2::new(1000.0, 1000.0)), None);
        assert_eq!((vp.width, vp.height), (540.0, 475.0));
    }

    #[test]
    fn test_resize_never_below_minimum() {
        let mut vp = LayerViewport::new(500.0, 500.0, 150.0);
        let start = handle_point(&vp);
        vp.begin_drag(start);

        for delta in [
            Vec2::new(-10_000.0, -10_000.0),
            Vec2::new(-349.0, -351.0),
            Vec2::new(-350.0, 0.0),
            Vec2::new(f32::MIN / 2.0, 3.0),
        ] {
            let (w, h) = vp.drag_to(start + delta).unwrap();
            assert!(w >= 150.0 && h >= 150.0, "{w}x{h}");
        }
        assert!(LayerViewport::new(10.0, 20.0, 150.0).width >= 150.0);
    }

    #[test]
    fn test_drag_requires_handle() {
        let mut vp = LayerViewport::new(500.0, 500.0, 150.0);
        assert!(!vp.begin_drag(Vec2::new(100.0, 100.0)));
        assert!(!vp.is_dragging());
    }

    #[test]
    fn test_clipped_rect_stays_inside_surface() {
        let vp = LayerViewport::new(500.0, 500.0, 150.0);
        assert_eq!(vp.clipped_rect(1600, 900), Some((16, 16, 500, 500)));
        assert_eq!(vp.clipped_rect(300, 200), Some((16, 16, 284, 184)));
        assert_eq!(vp.clipped_rect(10, 10), None);
    }

    #[test]
    fn test_wheel_over_layer_zooms_layer() {
        let mut c = controller();
        c.on_cursor_moved(Vec2::new(100.0, 100.0));
        c.on_wheel(1.0);
        assert!((c.layer_camera.zoom - 1.1).abs() < 1e-6);

        c.on_cursor_moved(Vec2::new(1000.0, 800.0));
        c.on_wheel(1.0);
        assert!((c.layer_camera.zoom - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_ignores_inactive_layer() {
        let mut c = controller();
        c.layer_active = false;
        c.on_cursor_moved(Vec2::new(100.0, 100.0));
        c.on_wheel(1.0);
        assert_eq!(c.layer_camera.zoom, 1.0);
    }

    #[test]
    fn test_handle_drag_through_controller() {
        let mut c = controller();
        let start = handle_point(&c.layer_viewport);
        c.on_cursor_moved(start);
        c.on_button(PointerButton::Primary, true);

        assert_eq!(c.on_cursor_moved(start - Vec2::splat(1000.0)), Some((150.0, 150.0)));
        c.on_button(PointerButton::Primary, false);
        assert_eq!(c.on_cursor_moved(start), None);
    }

    #[test]
    fn test_orbit_drag_outside_layer() {
        let mut c = controller();
        let yaw = c.orbit.yaw;
        c.on_cursor_moved(Vec2::new(1000.0, 600.0));
        c.on_button(PointerButton::Primary, true);
        c.on_cursor_moved(Vec2::new(1100.0, 600.0));
        c.on_button(PointerButton::Primary, false);
        c.orbit.update();
        assert!(c.orbit.yaw > yaw);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut c = controller();
        c.on_resize(800, 400);
        assert_eq!(c.orbit.aspect, 2.0);
        c.on_resize(0, 400);
        assert_eq!(c.orbit.aspect, 2.0);
    }
}
