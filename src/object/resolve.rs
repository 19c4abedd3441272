//! Static attribute resolution: descriptor → baseline attribute bag

use crate::descriptor::{AccessTable, ShapeDescriptor, ShapeKind};
use crate::errors::DescriptorError;
use crate::types::{BBox, Point, Size};

use super::defaults;

/// Whether the shape is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        }
    }
}

/// Whether the shape reacts to pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerEvents {
    #[default]
    Visible,
    None,
}

impl PointerEvents {
    pub fn as_str(self) -> &'static str {
        match self {
            PointerEvents::Visible => "visible",
            PointerEvents::None => "none",
        }
    }
}

/// Design-time line width 0 means "thinnest visible line", never invisible
pub fn normalize_line_width(raw: f64) -> f64 {
    if raw == 0.0 { 1.0 } else { raw }
}

/// Baseline attribute bag of a shape: the value of every raw field when no
/// binding overrides it.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub kind: ShapeKind,

    // Position
    pub abs_corner: BBox,
    pub abs_center: Point,
    pub rel_size: Size,
    pub rel_midpoint: Point,
    pub abs_points: Vec<Point>,
    pub rel_points: Vec<Point>,

    // Color channels and flags
    pub normal_fill_color: String,
    pub alarm_fill_color: String,
    pub normal_frame_color: String,
    pub alarm_frame_color: String,
    pub has_fill_color: bool,
    pub has_frame_color: bool,
    /// Normalized line width (never 0)
    pub line_width: f64,

    // Movement
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub xpos: f64,
    pub ypos: f64,
    pub scale: f64,
    pub angle: f64,

    pub tooltip: String,
    pub display: Visibility,
    pub pointer_events: PointerEvents,
    pub access_levels: AccessTable,

    // Seeds for the derived layer
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

/// Build the baseline for a descriptor.
///
/// Fails for structurally invalid descriptors instead of producing a
/// half-formed baseline.
pub fn resolve(desc: &ShapeDescriptor) -> Result<Baseline, DescriptorError> {
    desc.validate()?;

    let abs_corner = desc.rect;
    let line_width = normalize_line_width(desc.line_width);

    let rel_points = if desc.kind.is_point_based() {
        let origin = abs_corner.origin();
        desc.points
            .iter()
            .map(|p| Point::new(p.x - origin.x, p.y - origin.y))
            .collect()
    } else {
        Vec::new()
    };

    let fill = if desc.has_fill_color {
        desc.fill_color.clone()
    } else {
        defaults::NO_COLOR.to_string()
    };

    Ok(Baseline {
        kind: desc.kind,
        abs_corner,
        abs_center: desc.center,
        rel_size: abs_corner.size(),
        rel_midpoint: abs_corner.relative_midpoint(),
        abs_points: desc.points.clone(),
        rel_points,
        normal_fill_color: desc.fill_color.clone(),
        alarm_fill_color: desc.fill_color_alarm.clone(),
        normal_frame_color: desc.frame_color.clone(),
        alarm_frame_color: desc.frame_color_alarm.clone(),
        has_fill_color: desc.has_fill_color,
        has_frame_color: desc.has_frame_color,
        line_width,
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
        xpos: 0.0,
        ypos: 0.0,
        scale: defaults::SCALE_UNITY,
        angle: 0.0,
        tooltip: desc.tooltip.clone(),
        display: Visibility::Visible,
        pointer_events: PointerEvents::Visible,
        access_levels: desc.access_levels.clone(),
        fill,
        stroke: desc.frame_color.clone(),
        stroke_width: if desc.has_frame_color { line_width } else { 0.0 },
    })
}
