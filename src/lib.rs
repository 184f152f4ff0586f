pub mod assets;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod editor;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod roster;
pub mod selection;
pub mod session;
pub mod theme;

pub use assets::{AssetCatalog, AssetRef, AssetResolver, NoAssets};
pub use config::{Config, LayoutConfig, RenderConfig, RosterConfig, load_config, parse_config};
pub use editor::{Geometry, GeometryEditor, GestureKind, Point, PointerId, Viewport};
pub use layout::{Layout, LayoutError, Slot, place_entries, synthesize_grid};
pub use parser::{parse_layout, parse_roster};
pub use roster::{Roster, RosterEntry, export_file_name};
pub use selection::{SelectionController, SelectionOutcome, SelectionState};
pub use session::{Mode, Scene, Seat, Session};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
