//! Point-in-time view of a visual object

use crate::descriptor::ShapeKind;
use crate::types::{Point, fmt_num};

use super::resolve::{PointerEvents, Visibility};

/// Every attribute a renderer needs, read once from the live graph
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub kind: ShapeKind,

    // Container, in transformed corner coordinates
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub edge: f64,

    // Raw movement offsets from the left/right/top/bottom slots
    pub offset_left: f64,
    pub offset_right: f64,
    pub offset_top: f64,
    pub offset_bottom: f64,

    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub stroke_dash_array: String,
    pub alarm: bool,

    pub display: Visibility,
    pub pointer_events: PointerEvents,
    pub tooltip: String,

    pub transform: String,
    pub transform_origin: String,

    /// Points relative to the container, edge padding included
    pub points: Vec<Point>,
    pub path_data: Option<String>,
    pub closed: bool,
    pub line_endpoints: Option<(Point, Point)>,

    pub read_access: bool,
    pub write_access: bool,
}

impl ObjectSnapshot {
    /// Inline style attribute for the drawing container
    pub fn style(&self) -> String {
        format!(
            "left:{}px; top:{}px; transform:{}; transform-origin:{}; visibility:{}; pointer-events:{}",
            fmt_num(self.left),
            fmt_num(self.top),
            self.transform,
            self.transform_origin,
            self.display.as_str(),
            self.pointer_events.as_str(),
        )
    }

    /// Outer size of the drawing surface, with room for the stroke on both
    /// sides
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width + 2.0 * self.edge, self.height + 2.0 * self.edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ObjectSnapshot {
        ObjectSnapshot {
            kind: ShapeKind::Rectangle,
            left: 10.0,
            top: 10.0,
            width: 100.0,
            height: 50.0,
            edge: 2.0,
            offset_left: 0.0,
            offset_right: 0.0,
            offset_top: 0.0,
            offset_bottom: 0.0,
            fill: "none".to_string(),
            stroke: "#000000".to_string(),
            stroke_width: 2.0,
            stroke_dash_array: "0".to_string(),
            alarm: false,
            display: Visibility::Hidden,
            pointer_events: PointerEvents::None,
            tooltip: String::new(),
            transform: "scale(1) rotate(0deg) translate(0px, 0px)".to_string(),
            transform_origin: "50px 25px".to_string(),
            points: Vec::new(),
            path_data: None,
            closed: false,
            line_endpoints: None,
            read_access: false,
            write_access: false,
        }
    }

    #[test]
    fn container_style() {
        insta::assert_snapshot!(
            snapshot().style(),
            @"left:10px; top:10px; transform:scale(1) rotate(0deg) translate(0px, 0px); transform-origin:50px 25px; visibility:hidden; pointer-events:none"
        );
    }

    #[test]
    fn canvas_includes_edge() {
        assert_eq!(snapshot().canvas_size(), (104.0, 54.0));
    }
}
