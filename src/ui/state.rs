use crate::config::Config;
use crate::scene::Demo;

#[derive(Clone, Debug, PartialEq)]
pub enum ModelStatus {
    Idle,
    Loading,
    Loaded { triangles: usize },
    Failed(String),
}

pub struct UiState {
    pub demo: Demo,

    pub current_layer: usize,
    pub layer_count: usize,

    pub sphere_point: [f32; 3],
    pub sphere_tangent_length: f32,

    pub model_path: String,
    pub model_point: [f32; 3],
    pub model_status: ModelStatus,

    pub vsync_enabled: bool,
    pub show_stats: bool,
    pub overlay_error: Option<String>,
}

impl UiState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            demo: config.demo,

            current_layer: config.lattice.initial_layer,
            layer_count: config.lattice.nz,

            sphere_point: config.sphere.point,
            sphere_tangent_length: config.sphere.tangent_length,

            model_path: config.model.path.display().to_string(),
            model_point: config.model.point,
            model_status: ModelStatus::Idle,

            vsync_enabled: config.window.vsync,
            show_stats: true,
            overlay_error: None,
        }
    }

    /// Moves the layer by `step`, saturating at the valid range.
    pub fn step_layer(&mut self, step: i32) {
        let max = self.layer_count.saturating_sub(1);
        let layer = if step < 0 {
            self.current_layer.saturating_sub(step.unsigned_abs() as usize)
        } else {
            self.current_layer.saturating_add(step as usize)
        };
        self.current_layer = layer.min(max);
    }
}

#[derive(Default)]
pub struct UiActions {
    pub switch_demo: Option<Demo>,
    pub rebuild_overlay: bool,
    pub reload_model: bool,
}
