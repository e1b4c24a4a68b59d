//! GUI module - User interface components

mod app;
mod control_panel;
mod table;

pub use app::QuarryApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use table::RecordTable;
