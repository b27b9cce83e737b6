pub mod status_display;

pub use status_display::{render_status, spawn_status_display_task, StatusView};
