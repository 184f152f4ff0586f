use seating_rs_planner::{
    AssetCatalog, Config, GestureKind, Mode, Point, SelectionOutcome, Session, Theme, Viewport,
    parse_config,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    config: Option<String>,
}

fn build_config(options: BoardOptions) -> Result<Config, String> {
    let mut config = match options.config {
        Some(raw) => parse_config(&raw).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    if let Some(theme) = options.theme.as_deref().and_then(Theme::from_name) {
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    Ok(config)
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum ClickResult {
    Ignored,
    Selected { index: usize },
    Swapped { first: usize, second: usize },
}

impl From<SelectionOutcome> for ClickResult {
    fn from(outcome: SelectionOutcome) -> Self {
        match outcome {
            SelectionOutcome::Ignored => Self::Ignored,
            SelectionOutcome::Selected(index) => Self::Selected { index },
            SelectionOutcome::Swapped { first, second } => Self::Swapped { first, second },
        }
    }
}

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Browser-side seating chart: the host feeds file contents and pointer
/// events, and paints the SVG it gets back.
#[wasm_bindgen]
pub struct SeatingBoard {
    session: Session,
    catalog: AssetCatalog,
}

#[wasm_bindgen]
impl SeatingBoard {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<SeatingBoard, JsValue> {
        let options = match options_json {
            Some(raw) => serde_json::from_str::<BoardOptions>(&raw).map_err(to_js)?,
            None => BoardOptions::default(),
        };
        let config = build_config(options).map_err(to_js)?;
        Ok(SeatingBoard {
            session: Session::new(config),
            catalog: AssetCatalog::new(),
        })
    }

    #[wasm_bindgen(js_name = loadRoster)]
    pub fn load_roster(&mut self, text: &str, source: &str) {
        self.session.load_roster_text(text, source);
    }

    #[wasm_bindgen(js_name = loadLayout)]
    pub fn load_layout(&mut self, text: &str) -> Result<(), JsValue> {
        self.session.load_layout_str(text).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearLayout)]
    pub fn clear_layout(&mut self) {
        self.session.set_layout(None);
    }

    /// Registers picture files, e.g. from a directory picker. `base` is the
    /// URL prefix the images are served under.
    #[wasm_bindgen(js_name = addPictures)]
    pub fn add_pictures(&mut self, names: Vec<String>, base: &str) -> usize {
        let found = AssetCatalog::from_file_names(names.iter().map(String::as_str), base);
        self.catalog.merge(found);
        self.catalog.len()
    }

    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&mut self) -> String {
        self.session.render_svg(&self.catalog)
    }

    #[wasm_bindgen(js_name = setEditing)]
    pub fn set_editing(&mut self, editing: bool) {
        self.session
            .set_mode(if editing { Mode::Edit } else { Mode::Swap });
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, scale: f32, origin_x: f32, origin_y: f32) {
        self.session.set_viewport(Viewport {
            scale,
            origin_x,
            origin_y,
        });
    }

    /// Returns a JSON `{ kind, ... }` describing what the click did.
    #[wasm_bindgen(js_name = clickSeat)]
    pub fn click_seat(&mut self, index: usize) -> Result<String, JsValue> {
        let result = ClickResult::from(self.session.click_seat(index));
        serde_json::to_string(&result).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clickAt)]
    pub fn click_at(&mut self, x: f32, y: f32) -> Result<String, JsValue> {
        let result = ClickResult::from(self.session.click_at(Point::new(x, y)));
        serde_json::to_string(&result).map_err(to_js)
    }

    /// `kind` is one of `translate`, `resize` or `rotate`.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, pointer: u32, slot: usize, kind: &str, x: f32, y: f32) -> Result<bool, JsValue> {
        let kind = GestureKind::from_token(kind)
            .ok_or_else(|| to_js(format!("unknown gesture {kind:?}")))?;
        Ok(self.session.pointer_down(pointer, slot, kind, Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, pointer: u32, x: f32, y: f32) -> bool {
        self.session.pointer_move(pointer, Point::new(x, y)).is_some()
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, pointer: u32, x: f32, y: f32) -> bool {
        self.session.pointer_up(pointer, Point::new(x, y)).is_some()
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self, pointer: u32) {
        self.session.pointer_cancel(pointer);
    }

    #[wasm_bindgen(js_name = exportLayout)]
    pub fn export_layout(&self) -> Result<String, JsValue> {
        self.session.export_layout_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = exportRoster)]
    pub fn export_roster(&self) -> String {
        self.session.export_roster_text()
    }

    #[wasm_bindgen(js_name = exportRosterFileName)]
    pub fn export_roster_file_name(&self) -> String {
        self.session.export_roster_file_name()
    }

    #[wasm_bindgen(js_name = markExported)]
    pub fn mark_exported(&mut self, file_name: &str) {
        self.session.mark_exported(file_name);
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn status(&self) -> String {
        self.session.status().to_string()
    }
}

#[cfg(test)]
mod tests {
    use seating_rs_planner::{AssetCatalog, Mode, Session};

    use crate::{BoardOptions, ClickResult, build_config};

    #[test]
    fn options_override_theme_and_config() {
        let options = BoardOptions {
            theme: Some("modern".to_string()),
            font_size: Some(18.0),
            config: Some(r#"{"layout":{"cellSize":120}}"#.to_string()),
            ..BoardOptions::default()
        };
        let config = build_config(options).unwrap();
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.layout.cell_size, 120.0);
    }

    #[test]
    fn swap_and_edit_through_session() {
        let mut session = Session::new(build_config(BoardOptions::default()).unwrap());
        session.load_roster_text("Ann,Ben", "room.txt");
        let catalog = AssetCatalog::from_file_names(["ann.png"], "blob:");
        assert!(session.render_svg(&catalog).contains("blob:/ann.png"));

        session.click_seat(0);
        let swapped = ClickResult::from(session.click_seat(1));
        assert_eq!(
            serde_json::to_string(&swapped).unwrap(),
            r#"{"kind":"swapped","first":0,"second":1}"#
        );
        assert_eq!(session.export_roster_text(), "Ben,Ann");

        session.set_mode(Mode::Edit);
        let json = session.export_layout_json().unwrap();
        assert!(json.contains("\"slots\""));
    }
}
