use super::*;

/// Column count of the fallback grid: `ceil(sqrt(count))` clamped to the
/// configured column range.
pub fn grid_columns(count: usize, config: &LayoutConfig) -> usize {
    let min = config.grid_min_columns.max(1);
    let max = config.grid_max_columns.max(min);
    let root = (count as f64).sqrt().ceil() as usize;
    root.clamp(min, max)
}

/// Square-cell grid with one unnamed slot per entry, in roster order.
pub fn synthesize_grid(count: usize, config: &LayoutConfig) -> Layout {
    let columns = grid_columns(count, config);
    let rows = count.div_ceil(columns);
    let cell = config.cell_size.max(config.min_slot_size);
    let gap = config.cell_gap.max(0.0);
    let margin = config.grid_margin.max(0.0);

    let slots = (0..count)
        .map(|idx| {
            let col = (idx % columns) as f32;
            let row = (idx / columns) as f32;
            Slot {
                id: None,
                x: margin + col * (cell + gap),
                y: margin + row * (cell + gap),
                w: cell,
                h: cell,
                r: 0.0,
            }
        })
        .collect();

    let span = |n: usize| {
        if n == 0 {
            0.0
        } else {
            n as f32 * cell + (n - 1) as f32 * gap
        }
    };

    Layout {
        name: config.default_name.clone(),
        width: margin * 2.0 + span(columns),
        height: margin * 2.0 + span(rows),
        slots,
    }
}
