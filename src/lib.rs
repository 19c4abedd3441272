//! Live attribute binding for industrial visualization shapes.
//!
//! A [`ShapeDescriptor`] holds what a screen author drew: geometry, colors,
//! flags and access levels. [`resolve`] turns it into a [`Baseline`], and
//! [`bind`] attaches live expressions to any of its [`BindingSlot`]s. The
//! resulting [`VisualObject`] answers every rendering question (fill, stroke,
//! dash pattern, transform, visibility, access) from the current live values,
//! falling back to the baseline whenever a value is unavailable.
//!
//! ```
//! use std::rc::Rc;
//! use visubind::{BBox, BindingExpr, BindingSet, BindingSlot, ShapeDescriptor, ShapeKind, TagTable};
//!
//! let tags = TagTable::new();
//! tags.set("PLC_PRG.bAlarm", false);
//!
//! let desc = ShapeDescriptor::new(ShapeKind::Rectangle, BBox::new(10.0, 10.0, 110.0, 60.0))
//!     .fill("#00FF00");
//! let bindings = BindingSet::new()
//!     .with(BindingSlot::ToggleColor, BindingExpr::var("PLC_PRG.bAlarm"));
//! let obj = visubind::build(&desc, &bindings, Rc::new(tags.clone())).unwrap();
//!
//! assert_eq!(obj.fill(), "#00FF00");
//! tags.set("PLC_PRG.bAlarm", true);
//! assert_eq!(obj.fill(), "#FF0000");
//! ```

use std::rc::Rc;

mod log;

pub mod color;
pub mod descriptor;
pub mod errors;
pub mod geometry;
pub mod live;
pub mod object;
pub mod rpn;
pub mod types;

pub use color::Rgb;
pub use descriptor::{AccessTable, ShapeDescriptor, ShapeKind};
pub use errors::{BuildError, DescriptorError, EvalError, LiveError};
pub use live::{BindingExpr, Evaluator, ExprTerm, LiveAdapter, LiveValue, TagTable};
pub use object::{
    Baseline, BindOptions, BindingSet, BindingSlot, ObjectSnapshot, PointerEvents, Visibility,
    VisualObject, bind, bind_with, resolve,
};
pub use types::{BBox, Offset, Point, Size};

/// Resolve a descriptor and bind it in one step
pub fn build(
    desc: &ShapeDescriptor,
    bindings: &BindingSet,
    adapter: Rc<dyn LiveAdapter>,
) -> Result<VisualObject, BuildError> {
    let base = resolve(desc)?;
    Ok(bind(base, bindings, adapter)?)
}

/// Like [`build`], with explicit engine options
pub fn build_with(
    desc: &ShapeDescriptor,
    bindings: &BindingSet,
    adapter: Rc<dyn LiveAdapter>,
    options: BindOptions,
) -> Result<VisualObject, BuildError> {
    let base = resolve(desc)?;
    Ok(bind_with(base, bindings, adapter, options)?)
}
