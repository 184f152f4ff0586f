use crate::session::Scene;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct PlacementDump {
    pub layout: String,
    pub width: f32,
    pub height: f32,
    pub synthesized: bool,
    pub seats: Vec<SeatDump>,
    pub unplaced: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeatDump {
    pub slot: usize,
    pub slot_id: Option<String>,
    pub index: Option<usize>,
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub r: f32,
}

impl PlacementDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let seats = scene
            .seats
            .iter()
            .map(|seat| SeatDump {
                slot: seat.slot_index,
                slot_id: seat.slot.id.clone(),
                index: seat.entry_index,
                name: seat.entry.as_ref().map(|entry| entry.name.clone()),
                x: seat.slot.x,
                y: seat.slot.y,
                w: seat.slot.w,
                h: seat.slot.h,
                r: seat.slot.r,
            })
            .collect();

        PlacementDump {
            layout: scene.layout_name.clone(),
            width: scene.width,
            height: scene.height,
            synthesized: scene.synthesized,
            seats,
            unplaced: scene.unplaced.iter().map(|entry| entry.name.clone()).collect(),
        }
    }
}

pub fn write_placement_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = PlacementDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
