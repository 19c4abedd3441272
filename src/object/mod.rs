//! Visual objects: baseline resolution, live bindings and the derived
//! attribute graph

pub mod defaults;
mod engine;
mod resolve;
mod shapes;
mod slots;
mod snapshot;

pub use engine::{BindOptions, VisualObject, bind, bind_with};
pub use resolve::{Baseline, PointerEvents, Visibility, normalize_line_width, resolve};
pub use shapes::{BezierGeometry, Geometry, LineGeometry, PolyGeometry, RectGeometry, ShapeGeometry};
pub use slots::{BindingSet, BindingSlot, UnknownSlot};
pub use snapshot::ObjectSnapshot;
