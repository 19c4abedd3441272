//! Binding slots and binding sets

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use crate::live::BindingExpr;
use crate::log::debug;

/// Attribute of a shape that a live expression can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingSlot {
    ToggleColor,
    FillColor,
    FillColorAlarm,
    FrameColor,
    FrameColorAlarm,
    Invisible,
    FillFlags,
    FrameFlags,
    LineWidth,
    Left,
    Right,
    Top,
    Bottom,
    XPos,
    YPos,
    Scale,
    Angle,
    TooltipDisplay,
    InputDisabled,
}

impl BindingSlot {
    pub const ALL: [BindingSlot; 19] = [
        BindingSlot::ToggleColor,
        BindingSlot::FillColor,
        BindingSlot::FillColorAlarm,
        BindingSlot::FrameColor,
        BindingSlot::FrameColorAlarm,
        BindingSlot::Invisible,
        BindingSlot::FillFlags,
        BindingSlot::FrameFlags,
        BindingSlot::LineWidth,
        BindingSlot::Left,
        BindingSlot::Right,
        BindingSlot::Top,
        BindingSlot::Bottom,
        BindingSlot::XPos,
        BindingSlot::YPos,
        BindingSlot::Scale,
        BindingSlot::Angle,
        BindingSlot::TooltipDisplay,
        BindingSlot::InputDisabled,
    ];

    /// Slot name as the descriptor spells it, without the `expr-` prefix
    pub fn name(self) -> &'static str {
        match self {
            BindingSlot::ToggleColor => "toggle-color",
            BindingSlot::FillColor => "fill-color",
            BindingSlot::FillColorAlarm => "fill-color-alarm",
            BindingSlot::FrameColor => "frame-color",
            BindingSlot::FrameColorAlarm => "frame-color-alarm",
            BindingSlot::Invisible => "invisible",
            BindingSlot::FillFlags => "fill-flags",
            BindingSlot::FrameFlags => "frame-flags",
            BindingSlot::LineWidth => "line-width",
            BindingSlot::Left => "left",
            BindingSlot::Right => "right",
            BindingSlot::Top => "top",
            BindingSlot::Bottom => "bottom",
            BindingSlot::XPos => "xpos",
            BindingSlot::YPos => "ypos",
            BindingSlot::Scale => "scale",
            BindingSlot::Angle => "angle",
            BindingSlot::TooltipDisplay => "tooltip-display",
            BindingSlot::InputDisabled => "input-disabled",
        }
    }
}

impl fmt::Display for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown slot name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown binding slot: {0}")]
pub struct UnknownSlot(pub String);

impl FromStr for BindingSlot {
    type Err = UnknownSlot;

    /// Accepts `fill-color` as well as the descriptor's `expr-fill-color`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_prefix("expr-").unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.name() == bare)
            .ok_or_else(|| UnknownSlot(s.to_string()))
    }
}

/// The bindings attached to one shape instance. Fixed once the object is
/// built; a slot that is absent keeps its static value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingSet {
    slots: BTreeMap<BindingSlot, BindingExpr>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an expression, replacing any previous one for the slot
    pub fn insert(&mut self, slot: BindingSlot, expr: BindingExpr) -> Option<BindingExpr> {
        self.slots.insert(slot, expr)
    }

    pub fn with(mut self, slot: BindingSlot, expr: BindingExpr) -> Self {
        self.insert(slot, expr);
        self
    }

    /// Attach an expression by descriptor slot name. Names the engine does
    /// not know are skipped and reported as `false`.
    pub fn insert_named(&mut self, name: &str, expr: BindingExpr) -> bool {
        match name.parse::<BindingSlot>() {
            Ok(slot) => {
                self.insert(slot, expr);
                true
            }
            Err(_) => {
                debug!(name, "ignoring unknown binding slot");
                false
            }
        }
    }

    pub fn get(&self, slot: BindingSlot) -> Option<&BindingExpr> {
        self.slots.get(&slot)
    }

    pub fn contains(&self, slot: BindingSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, BindingSlot, BindingExpr> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(BindingSlot, BindingExpr)> for BindingSet {
    fn from_iter<T: IntoIterator<Item = (BindingSlot, BindingExpr)>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BindingSet {
    type Item = (&'a BindingSlot, &'a BindingExpr);
    type IntoIter = btree_map::Iter<'a, BindingSlot, BindingExpr>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
