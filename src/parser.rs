use crate::layout::{Layout, LayoutError};
use crate::roster::Roster;

/// Parses a layout document. Strict JSON is tried first; documents with
/// comments or trailing commas are accepted through JSON5.
pub fn parse_layout(input: &str) -> Result<Layout, LayoutError> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(LayoutError::Empty);
    }
    let layout = match serde_json::from_str::<Layout>(trimmed) {
        Ok(layout) => layout,
        Err(strict) => match json5::from_str::<Layout>(trimmed) {
            Ok(layout) => layout,
            Err(_) => return Err(LayoutError::Parse(strict.to_string())),
        },
    };
    layout.validate()?;
    tracing::debug!(
        name = %layout.name,
        slots = layout.slots.len(),
        "parsed layout document"
    );
    Ok(layout)
}

pub fn parse_roster(input: &str, delimiter: char) -> Roster {
    let roster = Roster::parse_with(input.trim_start_matches('\u{feff}'), delimiter);
    tracing::debug!(rows = roster.row_count(), names = roster.len(), "parsed roster");
    roster
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layout_document() {
        let layout = parse_layout(
            r#"{
                "name": "Room 12",
                "width": 800,
                "height": 600,
                "slots": [
                    { "id": "Alice", "x": 10, "y": 20, "w": 100, "h": 120, "r": 15 },
                    { "x": 200, "y": 20, "w": 100, "h": 120, "r": -30.5 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(layout.name, "Room 12");
        assert_eq!(layout.slots.len(), 2);
        assert_eq!(layout.slots[0].id.as_deref(), Some("Alice"));
        assert_eq!(layout.slots[1].id, None);
        assert_eq!(layout.slots[1].r, -30.5);
    }

    #[test]
    fn accepts_json5_comments_and_trailing_commas() {
        let layout = parse_layout(
            r#"{
                // exported by hand
                name: "lab",
                width: 300,
                height: 200,
                slots: [ { x: 1, y: 2, w: 3, h: 4, r: 0, }, ],
            }"#,
        )
        .unwrap();
        assert_eq!(layout.slots[0].h, 4.0);
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let err = parse_layout(r#"{ "name": "x", "width": 1, "height": 1, "slots": [ { "x": 0, "y": 0, "w": 1, "h": 1 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, LayoutError::Parse(_)));
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(parse_layout("  \n"), Err(LayoutError::Empty)));
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let err = parse_layout(r#"{ "name": "x", "width": 1, "height": 1, "slots": [ { "x": 0, "y": 0, "w": -5, "h": 1, "r": 0 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidSlot { index: 0, .. }));
    }

    #[test]
    fn roster_ignores_byte_order_mark() {
        let roster = parse_roster("\u{feff}Ann,Ben\nCy", ',');
        assert_eq!(roster.name_at(0), Some("Ann"));
        assert_eq!(roster.len(), 3);
    }
}
