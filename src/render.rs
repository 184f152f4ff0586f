use crate::assets::{AssetLeases, AssetResolver};
use crate::config::RenderConfig;
use crate::session::{Mode, Scene, Seat};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Distance of the rotate knob above the top edge, in handle sizes.
pub const ROTATE_HANDLE_OFFSET: f32 = 1.5;

pub fn render_svg(scene: &Scene, resolver: &dyn AssetResolver, theme: &Theme, config: &RenderConfig) -> String {
    let mut leases = AssetLeases::new(resolver);
    let mut svg = String::new();
    let width = scene.width.max(1.0);
    let height = scene.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!("<title>{}</title>", escape_xml(&scene.layout_name)));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    let tile = config.placeholder_tile.max(2.0);
    let half = tile / 2.0;
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<pattern id=\"placeholder\" width=\"{tile}\" height=\"{tile}\" patternUnits=\"userSpaceOnUse\"><rect width=\"{tile}\" height=\"{tile}\" fill=\"{}\"/><rect width=\"{half}\" height=\"{half}\" fill=\"{}\"/><rect x=\"{half}\" y=\"{half}\" width=\"{half}\" height=\"{half}\" fill=\"{}\"/></pattern>",
        theme.placeholder_light, theme.placeholder_dark, theme.placeholder_dark
    ));
    svg.push_str("</defs>");

    for seat in &scene.seats {
        let href = seat
            .entry
            .as_ref()
            .and_then(|entry| leases.acquire(&entry.normalized_key))
            .map(|asset| asset.href);
        svg.push_str(&seat_svg(seat, href.as_deref(), scene.mode, theme, config));
    }

    svg.push_str("</svg>");
    tracing::debug!(seats = scene.seats.len(), images = leases.len(), "svg rendered");
    svg
}

fn seat_svg(seat: &Seat, href: Option<&str>, mode: Mode, theme: &Theme, config: &RenderConfig) -> String {
    let slot = &seat.slot;
    let (cx, cy) = slot.center();
    let mut out = String::new();

    out.push_str(&format!(
        "<g class=\"seat\" data-slot=\"{}\"{} transform=\"rotate({:.2} {cx:.2} {cy:.2})\">",
        seat.slot_index,
        seat.entry_index
            .map(|idx| format!(" data-index=\"{idx}\""))
            .unwrap_or_default(),
        slot.r,
    ));

    let Some(entry) = &seat.entry else {
        out.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" stroke-dasharray=\"6 4\"/>",
            slot.x, slot.y, slot.w, slot.h, theme.empty_seat_border
        ));
        out.push_str(&handles_svg(seat, mode, theme, config));
        out.push_str("</g>");
        return out;
    };

    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        slot.x, slot.y, slot.w, slot.h, theme.seat_fill, theme.seat_border
    ));
    match href {
        Some(href) => out.push_str(&format!(
            "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
            slot.x,
            slot.y,
            slot.w,
            slot.h,
            escape_xml(href)
        )),
        None => out.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"url(#placeholder)\"/>",
            slot.x, slot.y, slot.w, slot.h
        )),
    }

    if let Some(idx) = seat.entry_index {
        let chip = config.chip_size.min(slot.w).min(slot.h);
        out.push_str(&format!(
            "<rect class=\"idx\" x=\"{:.2}\" y=\"{:.2}\" width=\"{chip:.2}\" height=\"{chip:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"/>",
            slot.x + 4.0,
            slot.y + 4.0,
            theme.chip_background
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
            slot.x + 4.0 + chip / 2.0,
            slot.y + 4.0 + chip / 2.0,
            theme.font_family,
            theme.font_size * 0.8,
            theme.chip_text_color,
            idx + 1
        ));
    }

    let band = config.label_height.min(slot.h);
    let (band_fill, name_fill) = if href.is_some() {
        (&theme.name_background, &theme.name_color)
    } else {
        (&theme.missing_name_background, &theme.missing_name_color)
    };
    out.push_str(&format!(
        "<rect class=\"name\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{band:.2}\" fill=\"{band_fill}\"/>",
        slot.x,
        slot.y + slot.h - band,
        slot.w
    ));
    out.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{name_fill}\">",
        slot.y + slot.h - band / 2.0,
        theme.font_family,
        theme.font_size
    ));
    if href.is_none() {
        out.push_str(&format!("<title>{} (No image found)</title>", escape_xml(&entry.name)));
    }
    out.push_str(&escape_xml(&entry.name));
    out.push_str("</text>");

    if seat.first_selected {
        let stroke = config.selection_stroke_width;
        out.push_str(&format!(
            "<rect class=\"selectA\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke}\"/>",
            slot.x, slot.y, slot.w, slot.h, theme.first_selection_color
        ));
    }

    out.push_str(&handles_svg(seat, mode, theme, config));
    out.push_str("</g>");
    out
}

/// Resize handle at the bottom-right corner and rotate handle above the top
/// edge, drawn only while editing.
fn handles_svg(seat: &Seat, mode: Mode, theme: &Theme, config: &RenderConfig) -> String {
    if mode != Mode::Edit {
        return String::new();
    }
    let slot = &seat.slot;
    let size = config.handle_size;
    let (cx, _) = slot.center();
    let mut out = String::new();
    if seat.editing.is_some() {
        out.push_str(&format!(
            "<rect class=\"editing\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"4 3\"/>",
            slot.x, slot.y, slot.w, slot.h, theme.handle_color
        ));
    }
    out.push_str(&format!(
        "<rect class=\"handle-resize\" x=\"{:.2}\" y=\"{:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" fill=\"{}\"/>",
        slot.x + slot.w - size / 2.0,
        slot.y + slot.h - size / 2.0,
        theme.handle_color
    ));
    out.push_str(&format!(
        "<line x1=\"{cx:.2}\" y1=\"{:.2}\" x2=\"{cx:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        slot.y,
        slot.y - size * ROTATE_HANDLE_OFFSET,
        theme.handle_color
    ));
    out.push_str(&format!(
        "<circle class=\"handle-rotate\" cx=\"{cx:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
        slot.y - size * ROTATE_HANDLE_OFFSET,
        size / 2.0,
        theme.handle_color
    ));
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options {
        resources_dir: std::env::current_dir().ok(),
        font_family: theme
            .font_family
            .split(',')
            .next()
            .map(|family| family.trim().trim_matches('"').to_string())
            .unwrap_or_else(|| "sans-serif".to_string()),
        ..usvg::Options::default()
    };
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid default render size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
