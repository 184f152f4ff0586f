mod error;
mod grid;
mod placement;

pub use error::LayoutError;
pub use grid::{grid_columns, synthesize_grid};
pub use placement::{Binding, Placement, PlacementReport, place_entries};

use crate::config::LayoutConfig;
use crate::roster::{RosterEntry, normalize_key};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A seat position. `r` is a rotation in degrees about the slot center and is
/// never normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub r: f32,
}

impl Slot {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id: None,
            x,
            y,
            w,
            h,
            r: 0.0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Key used to bind this slot to a roster entry by name.
    pub fn match_key(&self) -> Option<String> {
        let key = normalize_key(self.id.as_deref()?);
        (!key.is_empty()).then_some(key)
    }

    /// Model-space point expressed in the slot's unrotated frame, relative to
    /// its center.
    pub fn to_local(&self, px: f32, py: f32) -> (f32, f32) {
        let (cx, cy) = self.center();
        let theta = (-self.r).to_radians();
        let (sin, cos) = theta.sin_cos();
        let dx = px - cx;
        let dy = py - cy;
        (dx * cos - dy * sin, dx * sin + dy * cos)
    }

    /// Whether a model-space point falls inside the slot, rotation included.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        let (lx, ly) = self.to_local(px, py);
        lx.abs() <= self.w / 2.0 && ly.abs() <= self.h / 2.0
    }

    fn validate(&self, index: usize) -> Result<(), LayoutError> {
        for (field, value) in [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h), ("r", self.r)] {
            if !value.is_finite() {
                return Err(LayoutError::slot(index, format!("{field} is not a finite number")));
            }
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(LayoutError::slot(
                index,
                format!("size {}x{} must be positive", self.w, self.h),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub slots: Vec<Slot>,
}

impl Layout {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            slots: Vec::new(),
        }
    }

    pub fn empty(config: &LayoutConfig) -> Self {
        Self::new(config.default_name.clone(), config.default_width, config.default_height)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let extent_ok = |v: f32| v.is_finite() && v >= 0.0;
        if !extent_ok(self.width) || !extent_ok(self.height) {
            return Err(LayoutError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        for (idx, slot) in self.slots.iter().enumerate() {
            slot.validate(idx)?;
        }
        Ok(())
    }

    /// Topmost slot under a model-space point.
    pub fn slot_at(&self, x: f32, y: f32) -> Option<usize> {
        self.slots.iter().rposition(|slot| slot.contains(x, y))
    }

    pub fn to_json_pretty(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_key_ignores_case_and_blank_ids() {
        assert_eq!(Slot::new(0.0, 0.0, 1.0, 1.0).with_id(" Ann ").match_key(), Some("ann".to_string()));
        assert_eq!(Slot::new(0.0, 0.0, 1.0, 1.0).with_id("  ").match_key(), None);
        assert_eq!(Slot::new(0.0, 0.0, 1.0, 1.0).match_key(), None);
    }

    #[test]
    fn contains_respects_rotation() {
        let mut slot = Slot::new(0.0, 0.0, 100.0, 20.0);
        assert!(slot.contains(95.0, 10.0));
        slot.r = 90.0;
        assert!(!slot.contains(95.0, 10.0));
        assert!(slot.contains(50.0, 55.0));
    }

    #[test]
    fn slot_at_prefers_last_drawn() {
        let mut layout = Layout::new("room", 200.0, 200.0);
        layout.slots.push(Slot::new(0.0, 0.0, 100.0, 100.0));
        layout.slots.push(Slot::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(layout.slot_at(75.0, 75.0), Some(1));
        assert_eq!(layout.slot_at(10.0, 10.0), Some(0));
        assert_eq!(layout.slot_at(190.0, 10.0), None);
    }

    #[test]
    fn validate_rejects_degenerate_slots() {
        let mut layout = Layout::new("room", 200.0, 200.0);
        layout.slots.push(Slot::new(0.0, 0.0, 0.0, 10.0));
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::InvalidSlot { index: 0, .. })
        ));
        layout.slots[0].w = 10.0;
        layout.slots[0].r = f32::NAN;
        assert!(layout.validate().is_err());
        layout.slots[0].r = -725.0;
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn serialized_slot_omits_missing_id() {
        let mut layout = Layout::new("room", 10.0, 10.0);
        layout.slots.push(Slot::new(1.0, 2.0, 3.0, 4.0));
        let json = layout.to_json_pretty().unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"r\": 0.0"));
    }
}
