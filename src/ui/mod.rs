mod charts;
mod controls;
mod dashboard;
mod placeholder;
mod query_plan;
mod sunburst;
mod toolbar;
mod uir_viewer;

pub use controls::render_controls;
pub use dashboard::render_dashboard;
pub use toolbar::{render_error_window, render_toolbar};
