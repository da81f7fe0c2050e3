use glam::{Mat4, Vec2};

pub const INITIAL_ROTATION: Vec2 = Vec2::new(0.0, 1.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DragButton {
    Primary,
    Other,
}

/// Drag-to-rotate state owned by the app and read once per frame.
///
/// `rotation.x` is the angle about the X axis, `rotation.y` about Y.
/// While dragging, the rotation is recomputed from where the drag started
/// rather than accumulated per event, so it never drifts.
#[derive(Clone, Debug)]
pub struct DragRotation {
    pub rotation: Vec2,
    pub sensitivity: f32,

    dragging: bool,
    drag_start: Vec2,
    start_rotation: Vec2,
}

impl DragRotation {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            rotation: INITIAL_ROTATION,
            sensitivity,
            dragging: false,
            drag_start: Vec2::ZERO,
            start_rotation: INITIAL_ROTATION,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self, button: DragButton, cursor: Vec2) {
        if button != DragButton::Primary {
            return;
        }
        self.dragging = true;
        self.drag_start = cursor;
        self.start_rotation = self.rotation;
    }

    pub fn release(&mut self, button: DragButton) {
        if button == DragButton::Primary {
            self.dragging = false;
        }
    }

    pub fn cursor_moved(&mut self, cursor: Vec2) {
        if !self.dragging {
            return;
        }
        let delta = cursor - self.drag_start;
        self.rotation.y = self.start_rotation.y - self.sensitivity * delta.x;
        self.rotation.x = self.start_rotation.x - self.sensitivity * delta.y;
    }

    pub fn reset(&mut self) {
        self.rotation = INITIAL_ROTATION;
        self.start_rotation = INITIAL_ROTATION;
        self.dragging = false;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x) * Mat4::from_rotation_y(self.rotation.y)
    }
}

impl Default for DragRotation {
    fn default() -> Self {
        Self::new(std::f32::consts::PI / 100.0)
    }
}
