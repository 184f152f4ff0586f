use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub seat_fill: String,
    pub seat_border: String,
    pub empty_seat_border: String,
    pub name_background: String,
    pub name_color: String,
    pub missing_name_background: String,
    pub missing_name_color: String,
    pub chip_background: String,
    pub chip_text_color: String,
    pub first_selection_color: String,
    pub placeholder_dark: String,
    pub placeholder_light: String,
    pub handle_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "system-ui, -apple-system, Segoe UI, Roboto, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            seat_fill: "#FFFFFF".to_string(),
            seat_border: "#D1D5DB".to_string(),
            empty_seat_border: "#9CA3AF".to_string(),
            name_background: "rgba(0,0,0,.55)".to_string(),
            name_color: "#FFFFFF".to_string(),
            missing_name_background: "rgba(255,255,255,.92)".to_string(),
            missing_name_color: "#B91C1C".to_string(),
            chip_background: "rgba(17,24,39,.75)".to_string(),
            chip_text_color: "#FFFFFF".to_string(),
            first_selection_color: "#2563EB".to_string(),
            placeholder_dark: "#F0F0F0".to_string(),
            placeholder_light: "#FFFFFF".to_string(),
            handle_color: "#F59E0B".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#F8FAFF".to_string(),
            seat_fill: "#FFFFFF".to_string(),
            seat_border: "#C7D2E5".to_string(),
            empty_seat_border: "#7A8AA6".to_string(),
            name_background: "rgba(28,36,48,.72)".to_string(),
            name_color: "#FFFFFF".to_string(),
            missing_name_background: "rgba(255,255,255,.92)".to_string(),
            missing_name_color: "#B91C1C".to_string(),
            chip_background: "#1C2430".to_string(),
            chip_text_color: "#FFFFFF".to_string(),
            first_selection_color: "#4F46E5".to_string(),
            placeholder_dark: "#EEF2F8".to_string(),
            placeholder_light: "#FFFFFF".to_string(),
            handle_color: "#7A8AA6".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" => Some(Self::classic()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
