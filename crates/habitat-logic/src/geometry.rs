//! Plane geometry for placed modules.
//!
//! Pure functions over plain structs. Every computation that depends on a
//! main module's extent goes through [`effective_footprint`], so rotation is
//! handled in one place.

use crate::catalog::{Port, PortSide};
use crate::layout::{PlacedMainModule, PlacedSubModule};

/// Axis-aligned rectangle on the plane, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub depth: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, depth: f32) -> Self {
        Self {
            x,
            y,
            width,
            depth,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.depth
    }

    /// Strict AABB overlap. Rectangles that only share an edge do not
    /// overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Point-in-rectangle test, edges inclusive.
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Half-open interval overlap: `[a, a+a_len)` against `[b, b+b_len)`.
pub fn intervals_overlap(a: f32, a_len: f32, b: f32, b_len: f32) -> bool {
    !(a + a_len <= b || b + b_len <= a)
}

/// Width and depth after rotation (90°/270° swap them).
pub fn effective_footprint(module: &PlacedMainModule) -> (f32, f32) {
    if module.rotation.swaps_axes() {
        (module.kind.depth, module.kind.width)
    } else {
        (module.kind.width, module.kind.depth)
    }
}

/// Rotation-adjusted footprint of a main module on the global plane.
pub fn main_module_rect(module: &PlacedMainModule) -> Rect {
    let (w, d) = effective_footprint(module);
    Rect::new(module.x, module.y, w, d)
}

/// Footprint of a sub-module in its parent's local frame. Sub-modules do
/// not rotate.
pub fn sub_module_rect(sub: &PlacedSubModule) -> Rect {
    Rect::new(sub.x, sub.y, sub.kind.width, sub.kind.depth)
}

/// Centre of a main module on the global plane.
pub fn module_center(module: &PlacedMainModule) -> (f32, f32) {
    let (w, d) = effective_footprint(module);
    (module.x + w / 2.0, module.y + d / 2.0)
}

/// Where a port sits on the global plane.
///
/// North/south ports keep their x offset and snap to the near/far edge;
/// east/west ports keep their y offset. Top and bottom ports sit at their
/// raw offset.
pub fn port_world_position(module: &PlacedMainModule, port: &Port) -> (f32, f32) {
    let (w, d) = effective_footprint(module);
    match port.side {
        PortSide::North => (module.x + port.x, module.y),
        PortSide::South => (module.x + port.x, module.y + d),
        PortSide::East => (module.x + w, module.y + port.y),
        PortSide::West => (module.x, module.y + port.y),
        PortSide::Top | PortSide::Bottom => (module.x + port.x, module.y + port.y),
    }
}

/// Size label shown on a module, e.g. `"4.00×2.50m"`.
pub fn dimension_label(module: &PlacedMainModule) -> String {
    let (w, d) = effective_footprint(module);
    format!("{:.2}×{:.2}m", w, d)
}

/// Round a coordinate to the nearest multiple of `grid`.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}
