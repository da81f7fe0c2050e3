use glam::{Mat4, Vec3};

use crate::config::{CameraConfig, ViewConfig, WindowConfig};

/// Fixed look-at camera; the torus turns, the camera does not.
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), &WindowConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig, window: &WindowConfig) -> Self {
        let mut camera = Self {
            eye: Vec3::from_array(config.eye),
            target: Vec3::ZERO,
            up: Vec3::Y,

            fov: config.fov_degrees.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        camera.set_aspect(window.width as f32, window.height as f32);
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

/// Surface appearance fed to the fragment shader.
#[derive(Clone, Copy, Debug)]
pub struct Shading {
    pub light_direction: Vec3,
    pub color: Vec3,
    pub opacity: f32,
}

impl Shading {
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            light_direction: Vec3::from_array(config.light_direction)
                .try_normalize()
                .unwrap_or(Vec3::NEG_Z),
            color: Vec3::from_array(config.color),
            opacity: config.opacity.clamp(0.0, 1.0),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TorusUniform {
    pub mvp: [[f32; 4]; 4],
    pub model_inverse: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub color: [f32; 4],
}

impl TorusUniform {
    pub fn new(camera: &Camera, model: Mat4, shading: &Shading) -> Self {
        let mvp = camera.view_projection_matrix() * model;

        Self {
            mvp: mvp.to_cols_array_2d(),
            model_inverse: model.inverse().to_cols_array_2d(),
            light_dir: shading.light_direction.extend(0.0).to_array(),
            color: shading.color.extend(shading.opacity).to_array(),
        }
    }
}
