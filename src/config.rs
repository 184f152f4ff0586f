use crate::roster::DEFAULT_DELIMITER;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub cell_size: f32,
    pub cell_gap: f32,
    pub grid_margin: f32,
    pub grid_min_columns: usize,
    pub grid_max_columns: usize,
    /// Floor applied to slot width and height while resizing.
    pub min_slot_size: f32,
    pub default_name: String,
    pub default_width: f32,
    pub default_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 160.0,
            cell_gap: 12.0,
            grid_margin: 12.0,
            grid_min_columns: 3,
            grid_max_columns: 8,
            min_slot_size: 40.0,
            default_name: "layout".to_string(),
            default_width: 1200.0,
            default_height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub label_height: f32,
    pub chip_size: f32,
    pub selection_stroke_width: f32,
    pub placeholder_tile: f32,
    pub handle_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            label_height: 26.0,
            chip_size: 22.0,
            selection_stroke_width: 4.0,
            placeholder_tile: 20.0,
            handle_size: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub delimiter: char,
    pub default_source: String,
    pub pictures_dir: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            default_source: "groups/Class1.txt".to_string(),
            pictures_dir: "pics".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub roster: RosterConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    seat_fill: Option<String>,
    seat_border: Option<String>,
    empty_seat_border: Option<String>,
    name_background: Option<String>,
    name_color: Option<String>,
    missing_name_background: Option<String>,
    missing_name_color: Option<String>,
    chip_background: Option<String>,
    chip_text_color: Option<String>,
    first_selection_color: Option<String>,
    placeholder_dark: Option<String>,
    placeholder_light: Option<String>,
    handle_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    cell_size: Option<f32>,
    cell_gap: Option<f32>,
    grid_margin: Option<f32>,
    grid_min_columns: Option<usize>,
    grid_max_columns: Option<usize>,
    min_slot_size: Option<f32>,
    default_name: Option<String>,
    default_width: Option<f32>,
    default_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    label_height: Option<f32>,
    chip_size: Option<f32>,
    selection_stroke_width: Option<f32>,
    placeholder_tile: Option<f32>,
    handle_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterConfigFile {
    delimiter: Option<char>,
    default_source: Option<String>,
    pictures_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    roster: Option<RosterConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.seat_fill {
            config.theme.seat_fill = v;
        }
        if let Some(v) = vars.seat_border {
            config.theme.seat_border = v;
        }
        if let Some(v) = vars.empty_seat_border {
            config.theme.empty_seat_border = v;
        }
        if let Some(v) = vars.name_background {
            config.theme.name_background = v;
        }
        if let Some(v) = vars.name_color {
            config.theme.name_color = v;
        }
        if let Some(v) = vars.missing_name_background {
            config.theme.missing_name_background = v;
        }
        if let Some(v) = vars.missing_name_color {
            config.theme.missing_name_color = v;
        }
        if let Some(v) = vars.chip_background {
            config.theme.chip_background = v;
        }
        if let Some(v) = vars.chip_text_color {
            config.theme.chip_text_color = v;
        }
        if let Some(v) = vars.first_selection_color {
            config.theme.first_selection_color = v;
        }
        if let Some(v) = vars.placeholder_dark {
            config.theme.placeholder_dark = v;
        }
        if let Some(v) = vars.placeholder_light {
            config.theme.placeholder_light = v;
        }
        if let Some(v) = vars.handle_color {
            config.theme.handle_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.cell_size {
            config.layout.cell_size = v;
        }
        if let Some(v) = layout.cell_gap {
            config.layout.cell_gap = v;
        }
        if let Some(v) = layout.grid_margin {
            config.layout.grid_margin = v;
        }
        if let Some(v) = layout.grid_min_columns {
            config.layout.grid_min_columns = v;
        }
        if let Some(v) = layout.grid_max_columns {
            config.layout.grid_max_columns = v;
        }
        if let Some(v) = layout.min_slot_size {
            config.layout.min_slot_size = v;
        }
        if let Some(v) = layout.default_name {
            config.layout.default_name = v;
        }
        if let Some(v) = layout.default_width {
            config.layout.default_width = v;
        }
        if let Some(v) = layout.default_height {
            config.layout.default_height = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.label_height {
            config.render.label_height = v;
        }
        if let Some(v) = render.chip_size {
            config.render.chip_size = v;
        }
        if let Some(v) = render.selection_stroke_width {
            config.render.selection_stroke_width = v;
        }
        if let Some(v) = render.placeholder_tile {
            config.render.placeholder_tile = v;
        }
        if let Some(v) = render.handle_size {
            config.render.handle_size = v;
        }
    }

    if let Some(roster) = parsed.roster {
        if let Some(v) = roster.delimiter {
            config.roster.delimiter = v;
        }
        if let Some(v) = roster.default_source {
            config.roster.default_source = v;
        }
        if let Some(v) = roster.pictures_dir {
            config.roster.pictures_dir = v;
        }
    }

    Ok(config)
}
