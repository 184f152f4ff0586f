//! Interactive slot geometry editing.
//!
//! Each pointer owns at most one [`Gesture`], created on pointer-down and
//! dropped on release or cancel. A gesture keeps the slot geometry and the
//! pointer position captured at its start; every move recomputes the slot from
//! that snapshot, so rounding never accumulates across moves.
//!
//! Pointers are independent: two pointers may edit two different slots at the
//! same time. A slot accepts only one gesture at a time.

use crate::layout::{Layout, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps pointer coordinates to model coordinates: `model = (screen - origin) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Viewport {
    pub fn scaled(scale: f32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn to_model(&self, point: Point) -> Point {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        Point {
            x: (point.x - self.origin_x) / scale,
            y: (point.y - self.origin_y) / scale,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Translate,
    Resize,
    Rotate,
}

impl GestureKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "translate" | "move" | "drag" => Some(Self::Translate),
            "resize" => Some(Self::Resize),
            "rotate" => Some(Self::Rotate),
            _ => None,
        }
    }
}

/// Position, size and rotation of a slot, without its identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub r: f32,
}

impl Geometry {
    pub fn of(slot: &Slot) -> Self {
        Self {
            x: slot.x,
            y: slot.y,
            w: slot.w,
            h: slot.h,
            r: slot.r,
        }
    }

    fn apply(&self, slot: &mut Slot) {
        slot.x = self.x;
        slot.y = self.y;
        slot.w = self.w;
        slot.h = self.h;
        slot.r = self.r;
    }

    fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.0} y={:.0} w={:.0} h={:.0} r={:.1}°",
            self.x, self.y, self.w, self.h, self.r
        )
    }
}

#[derive(Debug, Clone)]
struct Gesture {
    kind: GestureKind,
    slot: usize,
    snapshot: Geometry,
    start: Point,
    last_angle: f32,
    sweep: f32,
}

impl Gesture {
    fn target(&mut self, pointer: Point, min_size: f32) -> Geometry {
        let mut next = self.snapshot;
        let dx = pointer.x - self.start.x;
        let dy = pointer.y - self.start.y;
        match self.kind {
            GestureKind::Translate => {
                next.x = self.snapshot.x + dx;
                next.y = self.snapshot.y + dy;
            }
            GestureKind::Resize => {
                next.w = (self.snapshot.w + dx).max(min_size);
                next.h = (self.snapshot.h + dy).max(min_size);
            }
            GestureKind::Rotate => {
                if let Some(angle) = angle_about(self.snapshot.center(), pointer) {
                    self.sweep += wrap_degrees(angle - self.last_angle);
                    self.last_angle = angle;
                }
                next.r = self.snapshot.r + self.sweep;
            }
        }
        next
    }
}

/// Pointer angle around `center` in degrees, or `None` when the pointer sits
/// on the center itself.
fn angle_about(center: Point, pointer: Point) -> Option<f32> {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    if dx.hypot(dy) < f32::EPSILON {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Folds an angle difference into (-180, 180].
fn wrap_degrees(delta: f32) -> f32 {
    let mut d = delta % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

#[derive(Debug, Clone)]
pub struct GeometryEditor {
    min_size: f32,
    gestures: BTreeMap<PointerId, Gesture>,
}

impl GeometryEditor {
    pub fn new(min_size: f32) -> Self {
        Self {
            min_size: min_size.max(f32::EPSILON),
            gestures: BTreeMap::new(),
        }
    }

    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    pub fn is_active(&self) -> bool {
        !self.gestures.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.gestures.len()
    }

    /// Kind of the gesture currently editing `slot`, if any.
    pub fn editing(&self, slot: usize) -> Option<GestureKind> {
        self.gestures
            .values()
            .find(|g| g.slot == slot)
            .map(|g| g.kind)
    }

    /// Slot edited by the pointer's gesture.
    pub fn slot_of(&self, pointer: PointerId) -> Option<usize> {
        self.gestures.get(&pointer).map(|g| g.slot)
    }

    /// Starts a gesture. A pointer that still owns a gesture releases it
    /// first. Returns `false` when the slot does not exist or is already being
    /// edited by another pointer.
    pub fn begin(
        &mut self,
        pointer: PointerId,
        slot: usize,
        kind: GestureKind,
        at: Point,
        viewport: &Viewport,
        layout: &Layout,
    ) -> bool {
        if self.gestures.contains_key(&pointer) {
            self.release(pointer);
        }
        let Some(target) = layout.slots.get(slot) else {
            return false;
        };
        if self.editing(slot).is_some() {
            tracing::debug!(pointer, slot, "slot already has an active gesture");
            return false;
        }
        let snapshot = Geometry::of(target);
        let start = viewport.to_model(at);
        let last_angle = angle_about(snapshot.center(), start).unwrap_or(0.0);
        self.gestures.insert(
            pointer,
            Gesture {
                kind,
                slot,
                snapshot,
                start,
                last_angle,
                sweep: 0.0,
            },
        );
        tracing::debug!(pointer, slot, ?kind, "gesture started");
        true
    }

    /// Applies the pointer position to the slot under the pointer's gesture
    /// and returns the slot's new live geometry.
    pub fn update(
        &mut self,
        pointer: PointerId,
        at: Point,
        viewport: &Viewport,
        layout: &mut Layout,
    ) -> Option<Geometry> {
        let min_size = self.min_size;
        let gesture = self.gestures.get_mut(&pointer)?;
        let Some(slot) = layout.slots.get_mut(gesture.slot) else {
            tracing::debug!(pointer, slot = gesture.slot, "gesture target vanished");
            self.gestures.remove(&pointer);
            return None;
        };
        let next = gesture.target(viewport.to_model(at), min_size);
        next.apply(slot);
        Some(next)
    }

    /// Ends the pointer's gesture; the last applied geometry stays committed.
    pub fn release(&mut self, pointer: PointerId) -> Option<usize> {
        let gesture = self.gestures.remove(&pointer)?;
        tracing::debug!(pointer, slot = gesture.slot, kind = ?gesture.kind, "gesture released");
        Some(gesture.slot)
    }

    /// Implicitly releases every gesture, e.g. when editing is switched off
    /// or pointer capture is lost.
    pub fn release_all(&mut self) -> usize {
        let count = self.gestures.len();
        if count > 0 {
            tracing::debug!(count, "releasing abandoned gestures");
        }
        self.gestures.clear();
        count
    }
}
