//! Session context: the roster, the layout and the interaction state of one
//! seating chart, owned by the host and driven by discrete UI events.

use crate::assets::AssetResolver;
use crate::config::Config;
use crate::editor::{Geometry, GeometryEditor, GestureKind, Point, PointerId, Viewport};
use crate::layout::{Layout, LayoutError, Slot, place_entries, synthesize_grid};
use crate::parser::{parse_layout, parse_roster};
use crate::render::ROTATE_HANDLE_OFFSET;
use crate::roster::{Roster, RosterEntry, export_file_name};
use crate::selection::{SelectionController, SelectionOutcome};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Swap,
    Edit,
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub slot_index: usize,
    pub slot: Slot,
    /// Canonical roster index of the bound entry; `None` for an empty seat.
    pub entry_index: Option<usize>,
    pub entry: Option<RosterEntry>,
    pub first_selected: bool,
    pub editing: Option<GestureKind>,
}

/// Result of one render call: every slot of the active layout with the entry
/// bound to it.
#[derive(Debug, Clone)]
pub struct Scene {
    pub layout_name: String,
    pub width: f32,
    pub height: f32,
    pub seats: Vec<Seat>,
    pub unplaced: Vec<RosterEntry>,
    pub synthesized: bool,
    pub mode: Mode,
}

impl Scene {
    pub fn seat_for_entry(&self, entry_index: usize) -> Option<&Seat> {
        self.seats
            .iter()
            .find(|seat| seat.entry_index == Some(entry_index))
    }

    /// Topmost seat under a model-space point.
    pub fn seat_at(&self, at: Point) -> Option<&Seat> {
        self.seats.iter().rev().find(|seat| seat.slot.contains(at.x, at.y))
    }

    pub fn bound_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.entry.is_some()).count()
    }
}

pub struct Session {
    config: Config,
    roster: Roster,
    roster_source: String,
    layout: Option<Layout>,
    selection: SelectionController,
    editor: GeometryEditor,
    viewport: Viewport,
    mode: Mode,
    scene: Option<Scene>,
    status: String,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let editor = GeometryEditor::new(config.layout.min_slot_size);
        let roster_source = config.roster.default_source.clone();
        Self {
            config,
            roster: Roster::new(),
            roster_source,
            layout: None,
            selection: SelectionController::new(),
            editor,
            viewport: Viewport::default(),
            mode: Mode::Swap,
            scene: None,
            status: String::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.first()
    }

    pub fn set_roster(&mut self, roster: Roster, source: impl Into<String>) {
        self.roster = roster;
        self.roster_source = source.into();
        self.selection.clear();
        tracing::info!(rows = self.roster.row_count(), names = self.roster.len(), source = %self.roster_source, "roster loaded");
        self.render();
        self.set_status(format!("Parsed {} row(s) from {}.", self.roster.row_count(), self.roster_source));
    }

    pub fn load_roster_text(&mut self, text: &str, source: impl Into<String>) {
        let roster = parse_roster(text, self.config.roster.delimiter);
        self.set_roster(roster, source);
    }

    /// Replaces the layout. Gestures referring to old slot indices are released.
    pub fn set_layout(&mut self, layout: Option<Layout>) {
        self.editor.release_all();
        let status = match &layout {
            Some(layout) => {
                tracing::info!(name = %layout.name, slots = layout.slots.len(), "layout loaded");
                format!("Loaded layout {} with {} seat(s).", layout.name, layout.slots.len())
            }
            None => "Using the default grid.".to_string(),
        };
        self.layout = layout;
        if self.mode == Mode::Edit && self.layout.is_none() {
            self.layout = Some(self.export_layout());
        }
        self.render();
        self.set_status(status);
    }

    /// Parses and installs a layout document. On failure the current layout is
    /// kept and the error is reported through the status line.
    pub fn load_layout_str(&mut self, text: &str) -> Result<(), LayoutError> {
        match parse_layout(text) {
            Ok(layout) => {
                self.set_layout(Some(layout));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "layout document rejected");
                self.set_status(format!("Layout not loaded: {err}"));
                Err(err)
            }
        }
    }

    /// Records a failed external load without touching session state.
    pub fn note_load_failure(&mut self, what: &str, err: &dyn fmt::Display) {
        tracing::warn!(source = what, error = %err, "load failed");
        self.set_status(format!("Could not load {what}: {err}."));
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        match mode {
            Mode::Edit => {
                self.selection.clear();
                if self.layout.is_none() {
                    self.layout = Some(self.export_layout());
                }
            }
            Mode::Swap => {
                self.editor.release_all();
            }
        }
        self.mode = mode;
        tracing::debug!(?mode, "mode changed");
        self.render();
    }

    pub fn render(&mut self) -> &Scene {
        let scene = self.build_scene();
        let mut status = match scene.mode {
            Mode::Swap => format!("Rendered {} seat(s). Click two seats to swap.", scene.seats.len()),
            Mode::Edit => format!("Editing {} seat(s). Drag to move, resize or rotate.", scene.seats.len()),
        };
        if !scene.unplaced.is_empty() {
            status.push_str(&format!(" {} name(s) did not fit.", scene.unplaced.len()));
        }
        tracing::info!(
            seats = scene.seats.len(),
            bound = scene.bound_count(),
            unplaced = scene.unplaced.len(),
            synthesized = scene.synthesized,
            "rendered"
        );
        self.set_status(status);
        self.scene.insert(scene)
    }

    pub fn render_svg(&mut self, resolver: &dyn AssetResolver) -> String {
        self.render();
        match &self.scene {
            Some(scene) => crate::render::render_svg(scene, resolver, &self.config.theme, &self.config.render),
            None => String::new(),
        }
    }

    pub fn clear(&mut self) {
        self.scene = None;
        self.selection.clear();
        self.editor.release_all();
        self.set_status("Cleared.");
    }

    /// Selection click on the seat showing roster entry `entry_index`.
    pub fn click_seat(&mut self, entry_index: usize) -> SelectionOutcome {
        if self.mode == Mode::Edit {
            return SelectionOutcome::Ignored;
        }
        let outcome = self.selection.click(entry_index, &mut self.roster);
        match outcome {
            SelectionOutcome::Ignored => {}
            SelectionOutcome::Selected(first) => {
                if let Some(scene) = self.scene.as_mut() {
                    for seat in &mut scene.seats {
                        seat.first_selected = seat.entry_index == Some(first);
                    }
                }
            }
            SelectionOutcome::Swapped { first, second } => {
                tracing::info!(first, second, "swapped seats");
                self.render();
            }
        }
        outcome
    }

    /// Selection click at a pointer position; clicks on empty seats or on the
    /// background are ignored.
    pub fn click_at(&mut self, at: Point) -> SelectionOutcome {
        let model = self.viewport.to_model(at);
        let entry_index = self
            .scene
            .as_ref()
            .and_then(|scene| scene.seat_at(model))
            .and_then(|seat| seat.entry_index);
        match entry_index {
            Some(index) => self.click_seat(index),
            None => SelectionOutcome::Ignored,
        }
    }

    pub fn pointer_down(&mut self, pointer: PointerId, slot: usize, kind: GestureKind, at: Point) -> bool {
        if self.mode != Mode::Edit {
            return false;
        }
        let Some(layout) = self.layout.as_ref() else {
            return false;
        };
        let started = self.editor.begin(pointer, slot, kind, at, &self.viewport, layout);
        if started {
            self.sync_seat(slot);
        }
        started
    }

    /// Starts a gesture on whatever lies under the pointer. A resize or rotate
    /// handle starts its own gesture kind; the seat body starts `kind`.
    pub fn pointer_down_at(&mut self, pointer: PointerId, kind: GestureKind, at: Point) -> bool {
        let model = self.viewport.to_model(at);
        let target = self.handle_at(model).or_else(|| {
            self.layout
                .as_ref()
                .and_then(|layout| layout.slot_at(model.x, model.y))
                .map(|slot| (slot, kind))
        });
        let Some((slot, kind)) = target else {
            return false;
        };
        self.pointer_down(pointer, slot, kind, at)
    }

    /// Edit handle under a model-space point, topmost slot first. Handles are
    /// hit-tested with the same geometry the renderer draws them with.
    pub fn handle_at(&self, at: Point) -> Option<(usize, GestureKind)> {
        if self.mode != Mode::Edit {
            return None;
        }
        let size = self.config.render.handle_size;
        let half = size / 2.0;
        let slots = &self.layout.as_ref()?.slots;
        slots.iter().enumerate().rev().find_map(|(idx, slot)| {
            let (lx, ly) = slot.to_local(at.x, at.y);
            let (rx, ry) = (lx - slot.w / 2.0, ly - slot.h / 2.0);
            if rx.abs() <= half && ry.abs() <= half {
                return Some((idx, GestureKind::Resize));
            }
            let knob_y = ly + slot.h / 2.0 + size * ROTATE_HANDLE_OFFSET;
            if lx.hypot(knob_y) <= half {
                return Some((idx, GestureKind::Rotate));
            }
            None
        })
    }

    pub fn pointer_move(&mut self, pointer: PointerId, at: Point) -> Option<Geometry> {
        let slot = self.editor.slot_of(pointer)?;
        let layout = self.layout.as_mut()?;
        let geometry = self.editor.update(pointer, at, &self.viewport, layout)?;
        self.sync_seat(slot);
        self.set_status(geometry.to_string());
        Some(geometry)
    }

    pub fn pointer_up(&mut self, pointer: PointerId, at: Point) -> Option<Geometry> {
        let geometry = self.pointer_move(pointer, at);
        let slot = self.editor.release(pointer)?;
        self.sync_seat(slot);
        let committed = geometry.or_else(|| {
            self.layout
                .as_ref()
                .and_then(|layout| layout.slots.get(slot))
                .map(Geometry::of)
        });
        if let Some(geometry) = committed {
            self.set_status(format!("Seat {}: {geometry}", slot + 1));
        }
        committed
    }

    /// Pointer lost without a release: the gesture is released implicitly and
    /// the last applied geometry stays.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> Option<Geometry> {
        let slot = self.editor.release(pointer)?;
        self.sync_seat(slot);
        self.layout
            .as_ref()
            .and_then(|layout| layout.slots.get(slot))
            .map(Geometry::of)
    }

    pub fn release_all_gestures(&mut self) -> usize {
        let released = self.editor.release_all();
        if let Some(scene) = self.scene.as_mut() {
            for seat in &mut scene.seats {
                seat.editing = None;
            }
        }
        released
    }

    /// Snapshot of the active layout with live slot geometry. Without a
    /// loaded layout the default grid is exported under the default name.
    pub fn export_layout(&self) -> Layout {
        if let Some(layout) = &self.layout {
            return layout.clone();
        }
        let grid = synthesize_grid(self.roster.len(), &self.config.layout);
        Layout {
            name: self.config.layout.default_name.clone(),
            width: self.config.layout.default_width.max(grid.width),
            height: self.config.layout.default_height.max(grid.height),
            slots: grid.slots,
        }
    }

    pub fn export_layout_json(&self) -> Result<String, LayoutError> {
        self.export_layout().to_json_pretty()
    }

    /// Makes the exported snapshot the session layout.
    pub fn recollect_layout(&mut self) {
        let layout = self.export_layout();
        self.set_layout(Some(layout));
    }

    pub fn export_roster_text(&self) -> String {
        self.roster.to_text_with(self.config.roster.delimiter)
    }

    pub fn export_roster_file_name(&self) -> String {
        export_file_name(&self.roster_source)
    }

    pub fn mark_exported(&mut self, file_name: &str) {
        tracing::info!(file = file_name, "exported");
        self.set_status(format!("Exported {file_name}."));
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn sync_seat(&mut self, slot: usize) {
        let Some(live) = self.layout.as_ref().and_then(|layout| layout.slots.get(slot)) else {
            return;
        };
        let editing = self.editor.editing(slot);
        if let Some(seat) = self
            .scene
            .as_mut()
            .and_then(|scene| scene.seats.get_mut(slot))
        {
            seat.slot = live.clone();
            seat.editing = editing;
        }
    }

    fn build_scene(&self) -> Scene {
        let entries = self.roster.entries();
        let (layout, synthesized) = match &self.layout {
            Some(layout) => (layout.clone(), false),
            None => (synthesize_grid(entries.len(), &self.config.layout), true),
        };
        let report = place_entries(&entries, &layout.slots);
        let first = self.selection.first();

        let seats = layout
            .slots
            .into_iter()
            .enumerate()
            .map(|(slot_index, slot)| {
                let placement = report.for_slot(slot_index);
                let entry_index = placement.map(|p| p.entry_index);
                Seat {
                    slot_index,
                    slot,
                    entry_index,
                    entry: placement.map(|p| p.entry.clone()),
                    first_selected: first.is_some() && entry_index == first,
                    editing: self.editor.editing(slot_index),
                }
            })
            .collect();

        Scene {
            layout_name: layout.name,
            width: layout.width,
            height: layout.height,
            seats,
            unplaced: report
                .unplaced
                .iter()
                .map(|idx| entries[*idx].clone())
                .collect(),
            synthesized,
            mode: self.mode,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SEATS: &str = r#"{"name":"front","width":400,"height":200,"slots":[
        {"x":0,"y":0,"w":100,"h":100,"r":0},
        {"x":200,"y":0,"w":100,"h":100,"r":0}
    ]}"#;

    fn session(roster: &str) -> Session {
        let mut session = Session::default();
        session.load_roster_text(roster, "groups/Class1.txt");
        session
    }

    #[test]
    fn default_grid_is_synthesized_without_layout() {
        let mut session = session("A,B,C\nD");
        let scene = session.render();
        assert!(scene.synthesized);
        assert_eq!(scene.seats.len(), 4);
        assert_eq!(scene.bound_count(), 4);
        assert_eq!(scene.layout_name, "layout");
        assert!(session.status().starts_with("Rendered 4 seat(s)."));
    }

    #[test]
    fn malformed_layout_keeps_previous_layout() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        assert!(session.load_layout_str("{\"name\":").is_err());
        assert!(session.status().starts_with("Layout not loaded"));
        assert_eq!(session.layout().map(|l| l.name.as_str()), Some("front"));
        assert_eq!(session.render().seats.len(), 2);
    }

    #[test]
    fn swap_rerenders_with_new_binding() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        assert_eq!(session.click_seat(0), SelectionOutcome::Selected(0));
        let first = session.scene().and_then(|scene| scene.seat_for_entry(0)).unwrap();
        assert!(first.first_selected);

        assert_eq!(
            session.click_seat(1),
            SelectionOutcome::Swapped { first: 0, second: 1 }
        );
        let scene = session.scene().unwrap();
        assert_eq!(scene.seats[0].entry.as_ref().map(|e| e.name.as_str()), Some("B"));
        assert!(scene.seats.iter().all(|seat| !seat.first_selected));
        assert_eq!(session.export_roster_text(), "B,A");
    }

    #[test]
    fn click_at_maps_through_viewport() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        session.set_viewport(Viewport::scaled(0.5));
        assert_eq!(session.click_at(Point::new(125.0, 25.0)), SelectionOutcome::Selected(1));
        assert_eq!(session.click_at(Point::new(75.0, 25.0)), SelectionOutcome::Ignored);
        assert_eq!(session.selected(), Some(1));
    }

    #[test]
    fn edit_mode_disables_selection() {
        let mut session = session("A,B");
        session.click_seat(0);
        session.set_mode(Mode::Edit);
        assert_eq!(session.selected(), None);
        assert_eq!(session.click_seat(1), SelectionOutcome::Ignored);
        assert_eq!(session.export_roster_text(), "A,B");
    }

    #[test]
    fn entering_edit_mode_materializes_grid() {
        let mut session = session("A,B,C");
        session.set_mode(Mode::Edit);
        let layout = session.layout().unwrap();
        assert_eq!(layout.name, "layout");
        assert_eq!(layout.slots.len(), 3);
        assert!(!session.scene().unwrap().synthesized);
    }

    #[test]
    fn translate_gesture_updates_live_slot() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        assert!(!session.pointer_down(1, 0, GestureKind::Translate, Point::new(10.0, 10.0)));

        session.set_mode(Mode::Edit);
        assert!(session.pointer_down(1, 0, GestureKind::Translate, Point::new(10.0, 10.0)));
        let geometry = session.pointer_move(1, Point::new(40.0, 30.0)).unwrap();
        assert_eq!((geometry.x, geometry.y), (30.0, 20.0));
        assert!(session.status().starts_with("x=30"));
        assert_eq!(session.scene().unwrap().seats[0].slot.x, 30.0);
        assert_eq!(session.scene().unwrap().seats[0].editing, Some(GestureKind::Translate));

        let committed = session.pointer_up(1, Point::new(50.0, 30.0)).unwrap();
        assert_eq!(committed.x, 40.0);
        assert_eq!(session.layout().unwrap().slots[0].x, 40.0);
        assert_eq!(session.scene().unwrap().seats[0].editing, None);
        assert!(session.pointer_move(1, Point::new(90.0, 90.0)).is_none());
    }

    #[test]
    fn pointer_down_at_picks_slot_under_pointer() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        session.set_mode(Mode::Edit);
        assert!(!session.pointer_down_at(1, GestureKind::Resize, Point::new(150.0, 50.0)));
        assert!(session.pointer_down_at(1, GestureKind::Resize, Point::new(250.0, 50.0)));
        let geometry = session.pointer_move(1, Point::new(100.0, 50.0)).unwrap();
        assert_eq!(geometry.w, session.config().layout.min_slot_size);
    }

    #[test]
    fn clearing_layout_while_editing_keeps_gestures_available() {
        let mut session = session("A,B,C");
        session.load_layout_str(TWO_SEATS).unwrap();
        session.set_mode(Mode::Edit);
        session.set_layout(None);
        assert_eq!(session.mode(), Mode::Edit);
        assert_eq!(session.layout().map(|l| l.slots.len()), Some(3));
        assert!(session.pointer_down(1, 2, GestureKind::Translate, Point::new(0.0, 0.0)));
        assert!(session.pointer_down_at(2, GestureKind::Translate, Point::new(90.0, 90.0)));
        assert_eq!(session.status(), "Using the default grid.");
    }

    #[test]
    fn drawn_handles_start_their_own_gestures() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        assert_eq!(session.handle_at(Point::new(300.0, 100.0)), None);

        session.set_mode(Mode::Edit);
        // Resize square straddles the bottom-right corner of seat 2.
        assert_eq!(
            session.handle_at(Point::new(304.0, 103.0)),
            Some((1, GestureKind::Resize))
        );
        // Rotate knob sits above the top edge, outside the seat body.
        let knob = Point::new(50.0, -21.0);
        assert!(session.layout().unwrap().slot_at(knob.x, knob.y).is_none());
        assert_eq!(session.handle_at(knob), Some((0, GestureKind::Rotate)));

        assert!(session.pointer_down_at(1, GestureKind::Translate, knob));
        let geometry = session.pointer_move(1, Point::new(121.0, 50.0)).unwrap();
        assert!((geometry.r - 90.0).abs() < 1e-3);
        assert_eq!((geometry.x, geometry.y), (0.0, 0.0));
    }

    #[test]
    fn rotated_handles_follow_the_seat() {
        let mut session = session("A");
        session.load_layout_str(
            r#"{"name":"tilted","width":200,"height":200,"slots":[{"x":0,"y":0,"w":100,"h":100,"r":90}]}"#,
        )
        .unwrap();
        session.set_mode(Mode::Edit);
        // Turned a quarter clockwise, the knob lands right of the seat.
        assert_eq!(
            session.handle_at(Point::new(121.0, 50.0)),
            Some((0, GestureKind::Rotate))
        );
        assert_eq!(session.handle_at(Point::new(50.0, -21.0)), None);
    }

    #[test]
    fn pointer_cancel_keeps_last_geometry() {
        let mut session = session("A");
        session.load_layout_str(TWO_SEATS).unwrap();
        session.set_mode(Mode::Edit);
        session.pointer_down(7, 1, GestureKind::Translate, Point::new(0.0, 0.0));
        session.pointer_move(7, Point::new(0.0, 15.0));
        let geometry = session.pointer_cancel(7).unwrap();
        assert_eq!(geometry.y, 15.0);
        assert!(session.pointer_cancel(7).is_none());
    }

    #[test]
    fn leaving_edit_mode_releases_gestures() {
        let mut session = session("A,B");
        session.load_layout_str(TWO_SEATS).unwrap();
        session.set_mode(Mode::Edit);
        session.pointer_down(1, 0, GestureKind::Rotate, Point::new(0.0, 0.0));
        session.pointer_down(2, 1, GestureKind::Translate, Point::new(0.0, 0.0));
        session.set_mode(Mode::Swap);
        assert!(session.pointer_move(1, Point::new(5.0, 5.0)).is_none());
        assert_eq!(session.release_all_gestures(), 0);
    }

    #[test]
    fn unplaced_names_are_reported() {
        let mut session = session("A,B,C");
        session.load_layout_str(TWO_SEATS).unwrap();
        let scene = session.render();
        assert_eq!(scene.unplaced.len(), 1);
        assert_eq!(scene.unplaced[0].name, "C");
        assert!(session.status().ends_with("1 name(s) did not fit."));
    }

    #[test]
    fn exported_layout_round_trips() {
        let mut session = session("A,B,C,D,E");
        let json = session.export_layout_json().unwrap();
        let layout = parse_layout(&json).unwrap();
        assert_eq!(layout.slots.len(), 5);
        assert!(layout.width >= session.config().layout.default_width);

        session.load_layout_str(&json).unwrap();
        assert!(!session.render().synthesized);
        assert_eq!(session.export_layout(), layout);
    }

    #[test]
    fn recollect_commits_edited_geometry() {
        let mut session = session("A,B");
        session.set_mode(Mode::Edit);
        session.pointer_down(1, 0, GestureKind::Translate, Point::new(0.0, 0.0));
        session.pointer_up(1, Point::new(5.0, 0.0));
        let x = session.layout().unwrap().slots[0].x;
        session.recollect_layout();
        assert_eq!(session.layout().unwrap().slots[0].x, x);
        assert!(session.status().starts_with("Loaded layout layout"));
    }

    #[test]
    fn roster_export_file_name_follows_source() {
        let mut session = session("A,B");
        assert_eq!(session.export_roster_file_name(), "Class1-updated.txt");
        session.mark_exported("Class1-updated.txt");
        assert_eq!(session.status(), "Exported Class1-updated.txt.");
    }

    #[test]
    fn clear_drops_scene_and_selection() {
        let mut session = session("A,B");
        session.click_seat(0);
        session.clear();
        assert!(session.scene().is_none());
        assert_eq!(session.selected(), None);
        assert_eq!(session.status(), "Cleared.");
    }
}
