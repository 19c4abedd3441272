//! Geometry helpers: bounding boxes, path strings and shape transforms

use glam::{DAffine2, DVec2, dvec2};

use crate::types::{BBox, Point, fmt_num};

/// Bounding box of a point list (componentwise min/max).
///
/// Returns `None` for an empty list.
pub fn bounding_box(points: &[Point]) -> Option<BBox> {
    let (first, rest) = points.split_first()?;
    let mut bbox = BBox::from_point(*first);
    for p in rest {
        bbox.expand_point(*p);
    }
    Some(bbox)
}

/// Encode points as an SVG `points` attribute: `"x,y x,y ..."`
pub fn polyline_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encode points as a cubic Bezier path.
///
/// The first point is the moveto, the second opens the curveto and every
/// following point continues its control list: `"M x y C x y, x y, ..."`.
pub fn bezier_path(points: &[Point]) -> String {
    let mut path = String::new();
    for (i, p) in points.iter().enumerate() {
        let pair = format!("{} {}", fmt_num(p.x), fmt_num(p.y));
        match i {
            0 => {
                path.push('M');
                path.push_str(&pair);
            }
            1 => {
                path.push_str(" C");
                path.push_str(&pair);
            }
            _ => {
                path.push_str(", ");
                path.push_str(&pair);
            }
        }
    }
    path
}

/// Scale factor of the raw controller scale value (1000 means 1:1)
pub fn scale_factor(raw_scale: f64, unity: f64) -> f64 {
    raw_scale / unity
}

/// CSS transform string: scale, then rotate, then translate.
///
/// The order is part of the contract; any non-zero rotation combined with a
/// non-unity scale renders differently when reordered.
pub fn css_transform(scale: f64, angle_deg: f64, xpos: f64, ypos: f64) -> String {
    format!(
        "scale({}) rotate({}deg) translate({}px, {}px)",
        fmt_num(scale),
        fmt_num(angle_deg),
        fmt_num(xpos),
        fmt_num(ypos)
    )
}

/// CSS transform origin: `"{x}px {y}px"` for an offset from the object's
/// top-left corner
pub fn css_transform_origin(center: Point, corner: Point) -> String {
    let rel = center - corner;
    format!("{}px {}px", fmt_num(rel.dx), fmt_num(rel.dy))
}

/// The affine matrix equivalent to [`css_transform`] applied about `origin`.
///
/// Maps points given relative to the object's corner to their transformed
/// position in the same frame.
pub fn transform_matrix(scale: f64, angle_deg: f64, xpos: f64, ypos: f64, origin: Point) -> DAffine2 {
    let o = DVec2::from(origin);
    DAffine2::from_translation(o)
        * DAffine2::from_scale(dvec2(scale, scale))
        * DAffine2::from_angle(angle_deg.to_radians())
        * DAffine2::from_translation(dvec2(xpos, ypos))
        * DAffine2::from_translation(-o)
}

/// Apply a matrix to a point
pub fn transform_point(matrix: &DAffine2, p: Point) -> Point {
    let v = matrix.transform_point2(DVec2::from(p));
    Point::new(v.x, v.y)
}
