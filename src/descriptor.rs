//! Design-time shape descriptors.
//!
//! Descriptors are produced by whatever reads the screen definition; this
//! crate only consumes them. Colors are expected as `#RRGGBB` strings.

use std::fmt;
use std::str::FromStr;

use crate::color::Rgb;
use crate::errors::DescriptorError;
use crate::types::{BBox, Point, check_finite, check_non_negative};

/// Shape kinds of the visualization editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    RoundRectangle,
    Ellipse,
    Polygon,
    Polyline,
    Bezier,
}

impl ShapeKind {
    /// Whether the geometry is given by a point list rather than a rectangle
    pub fn is_point_based(self) -> bool {
        matches!(self, Self::Polygon | Self::Polyline | Self::Bezier)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::RoundRectangle => "round-rect",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Bezier => "bezier",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(ShapeKind::Line),
            "rectangle" => Ok(ShapeKind::Rectangle),
            "round-rect" | "roundrect" => Ok(ShapeKind::RoundRectangle),
            "ellipse" | "circle" => Ok(ShapeKind::Ellipse),
            "polygon" => Ok(ShapeKind::Polygon),
            "polyline" => Ok(ShapeKind::Polyline),
            "bezier" => Ok(ShapeKind::Bezier),
            other => Err(format!("unknown shape kind: {}", other)),
        }
    }
}

/// Per-user-level permissions, indexed by user level.
///
/// Each entry is a permission string; `r` grants read access and `w` grants
/// write access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessTable(Vec<String>);

impl AccessTable {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessTable(levels.into_iter().map(Into::into).collect())
    }

    pub fn get(&self, level: usize) -> Option<&str> {
        self.0.get(level).map(String::as_str)
    }

    /// Whether `level` has the `permission` character. Levels outside the
    /// table have no permissions.
    pub fn grants(&self, level: usize, permission: char) -> bool {
        self.get(level).is_some_and(|p| p.contains(permission))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Static definition of a shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    /// Corner rectangle (x1, y1, x2, y2)
    pub rect: BBox,
    /// Rotation and scale center
    pub center: Point,
    /// Absolute points of polygon, polyline and bezier shapes
    pub points: Vec<Point>,
    pub fill_color: String,
    pub fill_color_alarm: String,
    pub frame_color: String,
    pub frame_color_alarm: String,
    pub has_fill_color: bool,
    pub has_frame_color: bool,
    /// Raw line width. 0 is the editor's way of saying "thinnest line".
    pub line_width: f64,
    pub tooltip: String,
    pub access_levels: AccessTable,
}

impl ShapeDescriptor {
    /// A descriptor with editor defaults: black frame, no fill, white fill
    /// color, red alarm colors, center at the middle of the rectangle.
    pub fn new(kind: ShapeKind, rect: BBox) -> Self {
        Self {
            kind,
            rect,
            center: Point::new((rect.x1 + rect.x2) / 2.0, (rect.y1 + rect.y2) / 2.0),
            points: Vec::new(),
            fill_color: Rgb::WHITE.to_hex(),
            fill_color_alarm: Rgb::RED.to_hex(),
            frame_color: Rgb::BLACK.to_hex(),
            frame_color_alarm: Rgb::RED.to_hex(),
            has_fill_color: false,
            has_frame_color: true,
            line_width: 0.0,
            tooltip: String::new(),
            access_levels: AccessTable::default(),
        }
    }

    /// A point-based shape; the rectangle starts as the bounding box of the
    /// points, or empty if there are none.
    pub fn with_points(kind: ShapeKind, points: Vec<Point>) -> Self {
        let rect = crate::geometry::bounding_box(&points).unwrap_or_default();
        let mut desc = Self::new(kind, rect);
        desc.points = points;
        desc
    }

    pub fn center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self.has_fill_color = true;
        self
    }

    pub fn fill_alarm(mut self, color: impl Into<String>) -> Self {
        self.fill_color_alarm = color.into();
        self
    }

    pub fn frame(mut self, color: impl Into<String>) -> Self {
        self.frame_color = color.into();
        self.has_frame_color = true;
        self
    }

    pub fn frame_alarm(mut self, color: impl Into<String>) -> Self {
        self.frame_color_alarm = color.into();
        self
    }

    pub fn has_fill_color(mut self, on: bool) -> Self {
        self.has_fill_color = on;
        self
    }

    pub fn has_frame_color(mut self, on: bool) -> Self {
        self.has_frame_color = on;
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = text.into();
        self
    }

    pub fn access_levels(mut self, table: AccessTable) -> Self {
        self.access_levels = table;
        self
    }

    /// Check the structural requirements the resolver relies on
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let finite = |field: &'static str, v: f64| {
            check_finite(v).map_err(|source| DescriptorError::NonFiniteCoordinate { field, source })
        };

        for v in [self.rect.x1, self.rect.y1, self.rect.x2, self.rect.y2] {
            finite("rect", v)?;
        }
        finite("center", self.center.x)?;
        finite("center", self.center.y)?;
        for p in &self.points {
            finite("points", p.x)?;
            finite("points", p.y)?;
        }

        check_non_negative(self.line_width).map_err(|source| DescriptorError::InvalidLineWidth {
            value: self.line_width,
            source,
        })?;

        if self.kind.is_point_based() && self.points.is_empty() {
            return Err(DescriptorError::EmptyPointList {
                kind: self.kind.name(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumericError;

    #[test]
    fn defaults() {
        let d = ShapeDescriptor::new(ShapeKind::Rectangle, BBox::new(10.0, 10.0, 110.0, 60.0));
        assert_eq!(d.center, Point::new(60.0, 35.0));
        assert!(!d.has_fill_color);
        assert!(d.has_frame_color);
        assert_eq!(d.frame_color, "#000000");
        assert!(d.validate().is_ok());
    }

    #[test]
    fn builder_colors_enable_flags() {
        let d = ShapeDescriptor::new(ShapeKind::Ellipse, BBox::default())
            .has_frame_color(false)
            .fill("#00FF00");
        assert!(d.has_fill_color);
        assert!(!d.has_frame_color);
        assert_eq!(d.fill_color, "#00FF00");
    }

    #[test]
    fn point_shapes_take_rect_from_points() {
        let d = ShapeDescriptor::with_points(
            ShapeKind::Polygon,
            vec![Point::new(5.0, 20.0), Point::new(15.0, 2.0)],
        );
        assert_eq!(d.rect, BBox::new(5.0, 2.0, 15.0, 20.0));
    }

    #[test]
    fn rejects_empty_polygon() {
        let d = ShapeDescriptor::with_points(ShapeKind::Polygon, Vec::new());
        assert_eq!(
            d.validate(),
            Err(DescriptorError::EmptyPointList { kind: "polygon" })
        );
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let d = ShapeDescriptor::new(ShapeKind::Rectangle, BBox::new(0.0, f64::NAN, 1.0, 1.0));
        assert_eq!(
            d.validate(),
            Err(DescriptorError::NonFiniteCoordinate {
                field: "rect",
                source: NumericError::NaN
            })
        );
    }

    #[test]
    fn rejects_negative_line_width() {
        let d = ShapeDescriptor::new(ShapeKind::Line, BBox::default()).line_width(-2.0);
        assert!(matches!(
            d.validate(),
            Err(DescriptorError::InvalidLineWidth { .. })
        ));
    }

    #[test]
    fn access_table_lookup() {
        let table = AccessTable::new(["", "r", "rw"]);
        assert!(table.grants(2, 'w'));
        assert!(table.grants(1, 'r'));
        assert!(!table.grants(1, 'w'));
        assert!(!table.grants(0, 'r'));
        assert!(!table.grants(7, 'r'));
    }

    #[test]
    fn kind_names_parse() {
        for kind in [
            ShapeKind::Line,
            ShapeKind::Rectangle,
            ShapeKind::RoundRectangle,
            ShapeKind::Ellipse,
            ShapeKind::Polygon,
            ShapeKind::Polyline,
            ShapeKind::Bezier,
        ] {
            assert_eq!(kind.name().parse::<ShapeKind>(), Ok(kind));
        }
        assert_eq!("circle".parse::<ShapeKind>(), Ok(ShapeKind::Ellipse));
        assert!("hexagon".parse::<ShapeKind>().is_err());
    }
}
