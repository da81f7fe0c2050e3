use std::time::Duration;

use glam::Vec2;

use crate::config::ViewerConfig;
use crate::geometry::{TORUS_PRESETS, TorusParams};

/// Upper bound on either segment count, shared by the sliders and config.
pub const MAX_SEGMENTS: u32 = 512;

pub struct UiState {
    pub params: TorusParams,
    pub selected_preset: Option<usize>,

    pub auto_regenerate: bool,
    pub mesh_needs_regenerate: bool,

    pub opacity: f32,
    pub vsync_enabled: bool,
    pub show_stats: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl UiState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let params = clamp_segments(config.torus);

        Self {
            params,
            selected_preset: TORUS_PRESETS.iter().position(|p| p.params == params),

            auto_regenerate: true,
            mesh_needs_regenerate: true,

            opacity: config.view.opacity,
            vsync_enabled: config.window.vsync,
            show_stats: true,
        }
    }

    /// Copies a preset into the editable parameters. Returns `false` for an
    /// unknown index.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        let Some(preset) = TORUS_PRESETS.get(index) else {
            return false;
        };
        self.selected_preset = Some(index);
        self.params = preset.params;
        self.mesh_needs_regenerate = true;
        true
    }

    /// Call after the sliders touched `params`.
    pub fn params_edited(&mut self) {
        self.mesh_needs_regenerate = true;
        self.selected_preset = TORUS_PRESETS.iter().position(|p| p.params == self.params);
    }
}

fn clamp_segments(mut params: TorusParams) -> TorusParams {
    for (name, segments) in [
        ("major_segments", &mut params.major_segments),
        ("minor_segments", &mut params.minor_segments),
    ] {
        if *segments > MAX_SEGMENTS {
            log::warn!("[torus] {} = {} exceeds {}, clamping", name, segments, MAX_SEGMENTS);
            *segments = MAX_SEGMENTS;
        }
    }
    params
}

/// Read-only numbers shown in the stats box.
#[derive(Clone, Copy, Default)]
pub struct ViewerStats {
    pub fps: f32,
    pub vertices: usize,
    pub triangles: usize,
    pub generation_time: Duration,
    pub rotation: Vec2,
}
