//! The object-binding engine.
//!
//! [`bind`] installs a live evaluator for every slot present in the binding
//! set; every accessor of the resulting [`VisualObject`] then computes its
//! value on the spot from those evaluators, the baseline and other accessors.
//! Nothing is cached, so a read always reflects the adapter's current values.
//!
//! Reads never fail. An evaluator that reports an error (stale tag, malformed
//! value) makes its field fall back to the baseline, and every derived field
//! built on it follows.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use glam::DAffine2;

use crate::color::packed_to_hex;
use crate::descriptor::{AccessTable, ShapeKind};
use crate::errors::LiveError;
use crate::geometry;
use crate::live::{Evaluator, LiveAdapter, LiveValue};
use crate::log::{debug, warn};
use crate::types::{BBox, Offset, Point, Size};

use super::defaults;
use super::resolve::{Baseline, PointerEvents, Visibility, normalize_line_width};
use super::shapes::{Geometry, ShapeGeometry};
use super::slots::{BindingSet, BindingSlot};
use super::snapshot::ObjectSnapshot;

/// Run-time knobs of the binding engine
#[derive(Debug, Clone, PartialEq)]
pub struct BindOptions {
    /// Live variable holding the current user level
    pub user_level_variable: String,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            user_level_variable: defaults::USER_LEVEL_VARIABLE.to_string(),
        }
    }
}

/// A shape instance with its live attribute graph
pub struct VisualObject {
    base: Baseline,
    geometry: Geometry,
    live: BTreeMap<BindingSlot, Evaluator>,
    adapter: Rc<dyn LiveAdapter>,
    options: BindOptions,
}

/// Bind a baseline to its live expressions with default options
pub fn bind(
    base: Baseline,
    bindings: &BindingSet,
    adapter: Rc<dyn LiveAdapter>,
) -> Result<VisualObject, LiveError> {
    bind_with(base, bindings, adapter, BindOptions::default())
}

/// Bind a baseline to its live expressions.
///
/// Every expression is compiled up front; an expression the adapter cannot
/// compile is an authoring error and fails construction.
pub fn bind_with(
    base: Baseline,
    bindings: &BindingSet,
    adapter: Rc<dyn LiveAdapter>,
    options: BindOptions,
) -> Result<VisualObject, LiveError> {
    let mut live = BTreeMap::new();
    for (slot, expr) in bindings {
        debug!(%slot, terms = expr.terms().len(), "installing live binding");
        live.insert(*slot, adapter.compile(expr)?);
    }

    Ok(VisualObject {
        geometry: Geometry::from(base.kind),
        base,
        live,
        adapter,
        options,
    })
}

impl VisualObject {
    /// Current value of a bound slot. `None` if the slot is unbound or its
    /// value is unavailable right now.
    fn read(&self, slot: BindingSlot) -> Option<LiveValue> {
        let eval = self.live.get(&slot)?;
        match eval() {
            Ok(value) => Some(value),
            Err(_err) => {
                debug!(%slot, error = %_err, "live value unavailable, using baseline");
                None
            }
        }
    }

    /// Numeric value of a bound slot, or `fallback`
    fn read_number(&self, slot: BindingSlot, fallback: f64) -> f64 {
        self.read(slot)
            .and_then(|v| v.as_number())
            .unwrap_or(fallback)
    }

    /// Color slot: packed controller integer → `#RRGGBB`
    fn read_color(&self, slot: BindingSlot, fallback: &str) -> String {
        self.read(slot)
            .and_then(|v| v.as_number())
            .map(packed_to_hex)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_bound(&self, slot: BindingSlot) -> bool {
        self.live.contains_key(&slot)
    }

    pub fn bound_slots(&self) -> impl Iterator<Item = BindingSlot> + '_ {
        self.live.keys().copied()
    }

    pub fn kind(&self) -> ShapeKind {
        self.base.kind
    }

    pub fn baseline(&self) -> &Baseline {
        &self.base
    }

    // ------------------------------------------------------------------
    // Raw fields
    // ------------------------------------------------------------------

    pub fn normal_fill_color(&self) -> String {
        self.read_color(BindingSlot::FillColor, &self.base.normal_fill_color)
    }

    pub fn alarm_fill_color(&self) -> String {
        self.read_color(BindingSlot::FillColorAlarm, &self.base.alarm_fill_color)
    }

    pub fn normal_frame_color(&self) -> String {
        self.read_color(BindingSlot::FrameColor, &self.base.normal_frame_color)
    }

    pub fn alarm_frame_color(&self) -> String {
        self.read_color(BindingSlot::FrameColorAlarm, &self.base.alarm_frame_color)
    }

    /// Fill-flags `"1"` switches the fill off
    pub fn has_fill_color(&self) -> bool {
        self.read(BindingSlot::FillFlags)
            .map(|v| !v.loosely_equals(defaults::FILL_FLAG_NO_FILL))
            .unwrap_or(self.base.has_fill_color)
    }

    /// Frame-flags `"8"` switches the frame off
    pub fn has_frame_color(&self) -> bool {
        self.read(BindingSlot::FrameFlags)
            .map(|v| !v.loosely_equals(defaults::FRAME_FLAG_NO_FRAME))
            .unwrap_or(self.base.has_frame_color)
    }

    /// Normalized line width (0 → 1)
    pub fn line_width(&self) -> f64 {
        self.read(BindingSlot::LineWidth)
            .and_then(|v| v.as_number())
            .map(normalize_line_width)
            .unwrap_or(self.base.line_width)
    }

    pub fn left(&self) -> f64 {
        self.read_number(BindingSlot::Left, self.base.left)
    }

    pub fn right(&self) -> f64 {
        self.read_number(BindingSlot::Right, self.base.right)
    }

    pub fn top(&self) -> f64 {
        self.read_number(BindingSlot::Top, self.base.top)
    }

    pub fn bottom(&self) -> f64 {
        self.read_number(BindingSlot::Bottom, self.base.bottom)
    }

    pub fn xpos(&self) -> f64 {
        self.read_number(BindingSlot::XPos, self.base.xpos)
    }

    pub fn ypos(&self) -> f64 {
        self.read_number(BindingSlot::YPos, self.base.ypos)
    }

    /// Raw scale, 1000 = 1:1
    pub fn scale(&self) -> f64 {
        self.read_number(BindingSlot::Scale, self.base.scale)
    }

    /// Rotation in degrees
    pub fn angle(&self) -> f64 {
        self.read_number(BindingSlot::Angle, self.base.angle)
    }

    pub fn tooltip(&self) -> String {
        self.read(BindingSlot::TooltipDisplay)
            .map(|v| v.to_string())
            .unwrap_or_else(|| self.base.tooltip.clone())
    }

    /// Invisible: 0 shows the shape, any other value hides it
    pub fn display(&self) -> Visibility {
        match self.read(BindingSlot::Invisible) {
            Some(v) if v.as_number() == Some(0.0) => Visibility::Visible,
            Some(_) => Visibility::Hidden,
            None => self.base.display,
        }
    }

    /// Input-disabled `"1"` blocks pointer events
    pub fn pointer_events(&self) -> PointerEvents {
        match self.read(BindingSlot::InputDisabled) {
            Some(v) if v.loosely_equals(defaults::INPUT_DISABLED) => PointerEvents::None,
            Some(_) => PointerEvents::Visible,
            None => self.base.pointer_events,
        }
    }

    pub fn abs_corner(&self) -> BBox {
        self.base.abs_corner
    }

    pub fn abs_center(&self) -> Point {
        self.base.abs_center
    }

    pub fn abs_points(&self) -> &[Point] {
        &self.base.abs_points
    }

    pub fn access_levels(&self) -> &AccessTable {
        &self.base.access_levels
    }

    // ------------------------------------------------------------------
    // Derived fields
    // ------------------------------------------------------------------

    /// Alarm state; only a toggle-color binding can raise it
    pub fn alarm(&self) -> bool {
        self.read(BindingSlot::ToggleColor)
            .is_some_and(|v| v.is_truthy())
    }

    pub fn fill(&self) -> String {
        if self.alarm() {
            self.alarm_fill_color()
        } else if self.has_fill_color() {
            self.normal_fill_color()
        } else {
            defaults::NO_COLOR.to_string()
        }
    }

    pub fn stroke(&self) -> String {
        if self.alarm() {
            self.alarm_frame_color()
        } else if self.has_frame_color() {
            self.normal_frame_color()
        } else {
            defaults::NO_COLOR.to_string()
        }
    }

    /// Effective border width: 0 without frame and alarm, else the
    /// normalized line width
    pub fn edge(&self) -> f64 {
        if self.has_frame_color() || self.alarm() {
            normalize_line_width(self.line_width())
        } else {
            0.0
        }
    }

    pub fn stroke_width(&self) -> f64 {
        self.edge()
    }

    /// Dash pattern selected by the frame flags. Only thin lines are dashed.
    pub fn stroke_dash_array(&self) -> &'static str {
        let Some(flag) = self.read(BindingSlot::FrameFlags) else {
            return defaults::DASH_SOLID;
        };
        if self.edge() > defaults::DASH_MAX_EDGE {
            return defaults::DASH_SOLID;
        }
        defaults::DASH_PATTERNS
            .iter()
            .find(|(value, _)| flag.loosely_equals(value))
            .map(|(_, pattern)| *pattern)
            .unwrap_or(defaults::DASH_SOLID)
    }

    /// Corner coordinates after transformation. Point-based shapes always
    /// use the bounding box of their current points.
    pub fn transformed_corners(&self) -> BBox {
        self.geometry
            .corners(self.base.abs_corner, &self.base.abs_points)
    }

    pub fn relative_size(&self) -> Size {
        self.transformed_corners().size()
    }

    pub fn relative_width(&self) -> f64 {
        self.relative_size().width
    }

    pub fn relative_height(&self) -> f64 {
        self.relative_size().height
    }

    /// Points relative to the transformed corner, padded by the edge so the
    /// stroke stays inside the drawing container
    pub fn relative_points(&self) -> Vec<Point> {
        let edge = self.edge();
        let origin = self.transformed_corners().origin() - Offset::new(edge, edge);
        self.base
            .abs_points
            .iter()
            .map(|p| Point::new(p.x - origin.x, p.y - origin.y))
            .collect()
    }

    /// Path string for point-based shapes
    pub fn path_data(&self) -> Option<String> {
        self.geometry.path_data(&self.relative_points())
    }

    pub fn is_closed(&self) -> bool {
        self.geometry.is_closed()
    }

    /// Endpoints of a line shape relative to its corner
    pub fn line_endpoints(&self) -> Option<(Point, Point)> {
        self.geometry.line_endpoints(self.relative_size())
    }

    /// Rotation/scale center relative to the descriptor's corner
    pub fn transform_origin(&self) -> Point {
        let rel = self.base.abs_center - self.base.abs_corner.origin();
        Point::new(rel.dx, rel.dy)
    }

    pub fn css_transform_origin(&self) -> String {
        geometry::css_transform_origin(self.base.abs_center, self.base.abs_corner.origin())
    }

    pub fn css_transform(&self) -> String {
        geometry::css_transform(
            geometry::scale_factor(self.scale(), defaults::SCALE_UNITY),
            self.angle(),
            self.xpos(),
            self.ypos(),
        )
    }

    /// The affine equivalent of [`css_transform`](Self::css_transform) about
    /// the transform origin
    pub fn transform_matrix(&self) -> DAffine2 {
        geometry::transform_matrix(
            geometry::scale_factor(self.scale(), defaults::SCALE_UNITY),
            self.angle(),
            self.xpos(),
            self.ypos(),
            self.transform_origin(),
        )
    }

    /// Current user level as a table index, if it is a valid one
    fn user_level(&self) -> Option<usize> {
        let name = &self.options.user_level_variable;
        let level = self.adapter.current_value(name)?.as_strict_number();
        match level {
            Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 => Some(n as usize),
            _ => {
                warn!(variable = %name, ?level, "invalid user level, denying access");
                None
            }
        }
    }

    pub fn write_access(&self) -> bool {
        self.user_level()
            .is_some_and(|level| self.base.access_levels.grants(level, 'w'))
    }

    pub fn read_access(&self) -> bool {
        self.user_level()
            .is_some_and(|level| self.base.access_levels.grants(level, 'r'))
    }

    /// Read every attribute once, for a render tick
    pub fn snapshot(&self) -> ObjectSnapshot {
        let corners = self.transformed_corners();
        ObjectSnapshot {
            kind: self.kind(),
            left: corners.x1,
            top: corners.y1,
            width: corners.width(),
            height: corners.height(),
            edge: self.edge(),
            offset_left: self.left(),
            offset_right: self.right(),
            offset_top: self.top(),
            offset_bottom: self.bottom(),
            fill: self.fill(),
            stroke: self.stroke(),
            stroke_width: self.stroke_width(),
            stroke_dash_array: self.stroke_dash_array().to_string(),
            alarm: self.alarm(),
            display: self.display(),
            pointer_events: self.pointer_events(),
            tooltip: self.tooltip(),
            transform: self.css_transform(),
            transform_origin: self.css_transform_origin(),
            points: self.relative_points(),
            path_data: self.path_data(),
            closed: self.is_closed(),
            line_endpoints: self.line_endpoints(),
            read_access: self.read_access(),
            write_access: self.write_access(),
        }
    }
}

impl fmt::Debug for VisualObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualObject")
            .field("kind", &self.base.kind)
            .field("bound", &self.live.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ShapeDescriptor;
    use crate::live::{BindingExpr, TagTable};
    use crate::object::resolve::resolve;

    fn rect() -> ShapeDescriptor {
        ShapeDescriptor::new(ShapeKind::Rectangle, BBox::new(10.0, 10.0, 110.0, 60.0))
    }

    fn build(desc: &ShapeDescriptor, bindings: BindingSet, tags: &TagTable) -> VisualObject {
        bind(resolve(desc).unwrap(), &bindings, Rc::new(tags.clone())).unwrap()
    }

    fn var(slot: BindingSlot, name: &str) -> BindingSet {
        BindingSet::new().with(slot, BindingExpr::var(name))
    }

    #[test]
    fn unbound_rectangle() {
        let obj = build(&rect().frame("#123456"), BindingSet::new(), &TagTable::new());
        assert_eq!(obj.relative_width(), 100.0);
        assert_eq!(obj.relative_height(), 50.0);
        assert_eq!(obj.fill(), "none");
        assert_eq!(obj.stroke(), "#123456");
        assert!(!obj.alarm());
        assert_eq!(obj.stroke_dash_array(), "0");
        assert_eq!(obj.display(), Visibility::Visible);
    }

    #[test]
    fn alarm_switches_fill_and_stroke() {
        let tags = TagTable::new();
        tags.set("alarm", false);
        let desc = rect().fill("#00FF00").fill_alarm("#FF0000").frame("#000000").frame_alarm("#FFFF00");
        let obj = build(&desc, var(BindingSlot::ToggleColor, "alarm"), &tags);

        assert_eq!(obj.fill(), "#00FF00");
        assert_eq!(obj.stroke(), "#000000");
        tags.set("alarm", true);
        assert_eq!(obj.fill(), "#FF0000");
        assert_eq!(obj.stroke(), "#FFFF00");
    }

    #[test]
    fn alarm_overrides_missing_fill() {
        let tags = TagTable::new();
        tags.set("alarm", 1.0);
        let obj = build(&rect().has_frame_color(false), var(BindingSlot::ToggleColor, "alarm"), &tags);
        assert_eq!(obj.fill(), "#FF0000");
        assert_eq!(obj.stroke(), "#FF0000");
        assert_eq!(obj.edge(), 1.0);
    }

    #[test]
    fn color_slots_convert_packed_values() {
        let tags = TagTable::new();
        tags.set("c", 255.0);
        let obj = build(&rect().fill("#FFFFFF"), var(BindingSlot::FillColor, "c"), &tags);
        assert_eq!(obj.fill(), "#FF0000");
        tags.set("c", 16711680.0);
        assert_eq!(obj.fill(), "#0000FF");
    }

    #[test]
    fn fill_flags_polarity() {
        let tags = TagTable::new();
        tags.set("ff", "1");
        let obj = build(&rect().fill("#00FF00"), var(BindingSlot::FillFlags, "ff"), &tags);
        assert!(!obj.has_fill_color());
        assert_eq!(obj.fill(), "none");
        tags.set("ff", "0");
        assert!(obj.has_fill_color());
        assert_eq!(obj.fill(), "#00FF00");
    }

    #[test]
    fn frame_flags_turn_off_frame() {
        let tags = TagTable::new();
        tags.set("fr", 8.0);
        let obj = build(&rect().line_width(3.0), var(BindingSlot::FrameFlags, "fr"), &tags);
        assert!(!obj.has_frame_color());
        assert_eq!(obj.stroke(), "none");
        assert_eq!(obj.edge(), 0.0);
        assert_eq!(obj.stroke_width(), 0.0);
    }

    #[test]
    fn dash_patterns_follow_frame_flags() {
        let tags = TagTable::new();
        let obj = build(&rect().line_width(1.0), var(BindingSlot::FrameFlags, "fr"), &tags);
        for (flag, pattern) in [
            ("4", "20,10,5,5,5,10"),
            ("3", "20,5,5,5"),
            ("2", "5,5"),
            ("1", "10,10"),
            ("0", "0"),
            ("8", "0"),
        ] {
            tags.set("fr", flag);
            assert_eq!(obj.stroke_dash_array(), pattern, "flag {}", flag);
        }
    }

    #[test]
    fn dash_suppressed_on_thick_lines() {
        let tags = TagTable::new();
        tags.set("fr", "2");
        let thin = build(&rect().line_width(1.0), var(BindingSlot::FrameFlags, "fr"), &tags);
        let thick = build(&rect().line_width(3.0), var(BindingSlot::FrameFlags, "fr"), &tags);
        assert_eq!(thin.edge(), 1.0);
        assert_eq!(thin.stroke_dash_array(), "5,5");
        assert_eq!(thick.edge(), 3.0);
        assert_eq!(thick.stroke_dash_array(), "0");
    }

    #[test]
    fn bound_line_width_normalizes_zero() {
        let tags = TagTable::new();
        tags.set("lw", 0.0);
        let obj = build(&rect(), var(BindingSlot::LineWidth, "lw"), &tags);
        assert_eq!(obj.line_width(), 1.0);
        tags.set("lw", 5.0);
        assert_eq!(obj.line_width(), 5.0);
        assert_eq!(obj.edge(), 5.0);
    }

    #[test]
    fn invisible_slot() {
        let tags = TagTable::new();
        tags.set("inv", 0.0);
        let obj = build(&rect(), var(BindingSlot::Invisible, "inv"), &tags);
        assert_eq!(obj.display(), Visibility::Visible);
        tags.set("inv", 3.0);
        assert_eq!(obj.display(), Visibility::Hidden);
        tags.mark_unavailable("inv");
        assert_eq!(obj.display(), Visibility::Visible);
    }

    #[test]
    fn input_disabled_slot() {
        let tags = TagTable::new();
        tags.set("dis", "1");
        let obj = build(&rect(), var(BindingSlot::InputDisabled, "dis"), &tags);
        assert_eq!(obj.pointer_events(), PointerEvents::None);
        tags.set("dis", "0");
        assert_eq!(obj.pointer_events(), PointerEvents::Visible);
    }

    #[test]
    fn transform_string() {
        let tags = TagTable::new();
        tags.set("s", 500.0);
        tags.set("a", 30.0);
        tags.set("x", 4.0);
        tags.set("y", -2.0);
        let bindings = BindingSet::new()
            .with(BindingSlot::Scale, BindingExpr::var("s"))
            .with(BindingSlot::Angle, BindingExpr::var("a"))
            .with(BindingSlot::XPos, BindingExpr::var("x"))
            .with(BindingSlot::YPos, BindingExpr::var("y"));
        let obj = build(&rect(), bindings, &tags);
        insta::assert_snapshot!(obj.css_transform(), @"scale(0.5) rotate(30deg) translate(4px, -2px)");
        insta::assert_snapshot!(obj.css_transform_origin(), @"50px 25px");
    }

    #[test]
    fn unbound_transform_is_identity() {
        let obj = build(&rect(), BindingSet::new(), &TagTable::new());
        assert_eq!(obj.css_transform(), "scale(1) rotate(0deg) translate(0px, 0px)");
        assert!(obj.transform_matrix().abs_diff_eq(DAffine2::IDENTITY, 1e-12));
    }

    #[test]
    fn stale_binding_falls_back_to_baseline() {
        let tags = TagTable::new();
        let obj = build(&rect().fill("#ABCDEF"), var(BindingSlot::FillColor, "c"), &tags);
        assert_eq!(obj.fill(), "#ABCDEF");
        tags.set("c", 0.0);
        assert_eq!(obj.fill(), "#000000");
        tags.mark_unavailable("c");
        assert_eq!(obj.fill(), "#ABCDEF");
    }

    #[test]
    fn tooltip_passes_through() {
        let tags = TagTable::new();
        tags.set("tt", "Pump running");
        let obj = build(&rect().tooltip("static"), var(BindingSlot::TooltipDisplay, "tt"), &tags);
        assert_eq!(obj.tooltip(), "Pump running");
        tags.mark_unavailable("tt");
        assert_eq!(obj.tooltip(), "static");
    }

    #[test]
    fn access_levels() {
        let tags = TagTable::new();
        let desc = rect().access_levels(AccessTable::new(["", "r", "rw"]));
        let obj = build(&desc, BindingSet::new(), &tags);

        tags.set(".currentuserlevel", "2");
        assert!(obj.write_access());
        assert!(obj.read_access());

        tags.set(".currentuserlevel", "1");
        assert!(!obj.write_access());
        assert!(obj.read_access());

        tags.set(".currentuserlevel", "admin");
        assert!(!obj.write_access());
        assert!(!obj.read_access());

        tags.set(".currentuserlevel", 1.5);
        assert!(!obj.read_access());

        tags.remove(".currentuserlevel");
        assert!(!obj.read_access());
    }

    #[test]
    fn custom_user_level_variable() {
        let tags = TagTable::new();
        tags.set("PLC_PRG.iUser", 1.0);
        let desc = rect().access_levels(AccessTable::new(["", "rw"]));
        let options = BindOptions {
            user_level_variable: "PLC_PRG.iUser".to_string(),
        };
        let obj = bind_with(resolve(&desc).unwrap(), &BindingSet::new(), Rc::new(tags), options).unwrap();
        assert!(obj.write_access());
    }

    #[test]
    fn uncompilable_binding_fails_construction() {
        let bindings = BindingSet::new().with(BindingSlot::Angle, BindingExpr::postfix("a +"));
        let result = bind(resolve(&rect()).unwrap(), &bindings, Rc::new(TagTable::new()));
        assert!(matches!(result, Err(LiveError::Eval(_))));
    }

    #[test]
    fn bound_slots_are_reported() {
        let obj = build(&rect(), var(BindingSlot::Top, "t"), &TagTable::new());
        assert!(obj.is_bound(BindingSlot::Top));
        assert!(!obj.is_bound(BindingSlot::Left));
        assert_eq!(obj.bound_slots().collect::<Vec<_>>(), vec![BindingSlot::Top]);
    }
}
