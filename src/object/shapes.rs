//! Per-kind shape geometry
//!
//! Rectangle-like shapes keep the design-time rectangle as their corners.
//! Point-based shapes re-derive their corners from the current point list on
//! every read and render through a path string.

use enum_dispatch::enum_dispatch;

use crate::descriptor::ShapeKind;
use crate::geometry::{bezier_path, bounding_box, polyline_points};
use crate::types::{BBox, Point, Size};

/// Geometry behavior that differs between shape kinds
#[enum_dispatch]
pub trait ShapeGeometry {
    /// Transformed corner coordinates
    fn corners(&self, static_rect: BBox, abs_points: &[Point]) -> BBox;

    /// Path string for the drawing surface, if the shape is drawn as a path
    fn path_data(&self, _rel_points: &[Point]) -> Option<String> {
        None
    }

    /// Endpoints of a line shape, relative to its corner
    fn line_endpoints(&self, _size: Size) -> Option<(Point, Point)> {
        None
    }

    /// Whether the path closes back on its first point
    fn is_closed(&self) -> bool {
        false
    }
}

/// Rectangle, rounded rectangle and ellipse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectGeometry;

impl ShapeGeometry for RectGeometry {
    fn corners(&self, static_rect: BBox, _abs_points: &[Point]) -> BBox {
        static_rect
    }
}

/// Straight line across the corner rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineGeometry;

impl ShapeGeometry for LineGeometry {
    fn corners(&self, static_rect: BBox, _abs_points: &[Point]) -> BBox {
        static_rect
    }

    /// The editor draws lines from the bottom-left to the top-right corner
    fn line_endpoints(&self, size: Size) -> Option<(Point, Point)> {
        Some((Point::new(0.0, size.height), Point::new(size.width, 0.0)))
    }
}

/// Polygon and polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyGeometry {
    pub closed: bool,
}

impl ShapeGeometry for PolyGeometry {
    fn corners(&self, static_rect: BBox, abs_points: &[Point]) -> BBox {
        bounding_box(abs_points).unwrap_or(static_rect)
    }

    fn path_data(&self, rel_points: &[Point]) -> Option<String> {
        Some(polyline_points(rel_points))
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Cubic Bezier curve through control points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BezierGeometry;

impl ShapeGeometry for BezierGeometry {
    fn corners(&self, static_rect: BBox, abs_points: &[Point]) -> BBox {
        bounding_box(abs_points).unwrap_or(static_rect)
    }

    fn path_data(&self, rel_points: &[Point]) -> Option<String> {
        Some(bezier_path(rel_points))
    }
}

#[enum_dispatch(ShapeGeometry)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect(RectGeometry),
    Line(LineGeometry),
    Poly(PolyGeometry),
    Bezier(BezierGeometry),
}

impl From<ShapeKind> for Geometry {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle | ShapeKind::RoundRectangle | ShapeKind::Ellipse => {
                RectGeometry.into()
            }
            ShapeKind::Line => LineGeometry.into(),
            ShapeKind::Polygon => PolyGeometry { closed: true }.into(),
            ShapeKind::Polyline => PolyGeometry { closed: false }.into(),
            ShapeKind::Bezier => BezierGeometry.into(),
        }
    }
}
