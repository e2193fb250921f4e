pub mod panels;
pub mod state;
pub mod theme;

pub use panels::{FrameStats, draw_help_overlay, draw_layer_frame, draw_side_panel};
pub use state::{ModelStatus, UiActions, UiState};
pub use theme::apply_theme;
