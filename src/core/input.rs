//! Input system for handling keyboard and mouse input
//!
//! Translates WASD and right-mouse drag into first-person camera movement.

use std::collections::HashSet;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;
use winit::window::Window;
use tracing::{debug, warn};
use crate::component::Camera;
use crate::core::scene::CameraConfig;

/// Configuration for InputSystem behavior
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Camera movement speed in units per second
    pub move_speed: f32,
    /// Mouse sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            mouse_sensitivity: 0.2,
        }
    }
}

impl From<&CameraConfig> for InputConfig {
    fn from(camera: &CameraConfig) -> Self {
        Self {
            move_speed: camera.move_speed,
            mouse_sensitivity: camera.mouse_sensitivity,
        }
    }
}

/// InputSystem manages keyboard and mouse input state
/// and translates them into camera movements
pub struct InputSystem {
    // Keyboard state
    pressed_keys: HashSet<KeyCode>,

    // Mouse state
    last_mouse_pos: (f64, f64),
    mouse_buttons: HashSet<MouseButton>,
    mouse_delta: (f32, f32),

    move_speed: f32,        // Units per second
    mouse_sensitivity: f32, // Degrees per pixel

    first_mouse: bool,
    cursor_locked: bool,
}

impl InputSystem {
    /// Create a new InputSystem with default configuration
    pub fn new() -> Self {
        Self::with_config(InputConfig::default())
    }

    /// Create InputSystem with custom configuration
    pub fn with_config(config: InputConfig) -> Self {
        Self {
            pressed_keys: HashSet::new(),
            last_mouse_pos: (0.0, 0.0),
            mouse_buttons: HashSet::new(),
            mouse_delta: (0.0, 0.0),
            move_speed: config.move_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            first_mouse: true,
            cursor_locked: false,
        }
    }

    /// Process keyboard input event
    pub fn on_keyboard_input(&mut self, keycode: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed_keys.insert(keycode);
            }
            ElementState::Released => {
                self.pressed_keys.remove(&keycode);
            }
        };
    }

    /// Process mouse button event
    /// Handles cursor locking when right button is pressed/released
    pub fn on_mouse_button(&mut self, window: &Window, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
                if button == MouseButton::Right {
                    self.lock_cursor(window);
                }
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
                if button == MouseButton::Right {
                    self.unlock_cursor(window);
                }
            }
        }
    }

    /// Process mouse movement event
    ///
    /// Window coordinates grow downward, so a positive dy means "look down".
    pub fn on_mouse_move(&mut self, position: (f64, f64)) {
        if self.first_mouse {
            self.last_mouse_pos = position;
            self.first_mouse = false;
            return;
        }

        let dx = (position.0 - self.last_mouse_pos.0) as f32;
        let dy = (position.1 - self.last_mouse_pos.1) as f32;

        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
        self.last_mouse_pos = position;
    }

    /// Update camera based on current input state
    /// Called every frame with delta time
    pub fn update_camera(&mut self, camera: &mut Camera, delta_time: f32) {
        self.handle_keyboard_movement(camera, delta_time);
        self.handle_mouse_rotation(camera);

        self.mouse_delta = (0.0, 0.0);
    }

    fn handle_keyboard_movement(&self, camera: &mut Camera, delta_time: f32) {
        let distance = self.move_speed * delta_time;

        if self.pressed_keys.contains(&KeyCode::KeyW) {
            camera.walk(distance);
        }
        if self.pressed_keys.contains(&KeyCode::KeyS) {
            camera.walk(-distance);
        }
        if self.pressed_keys.contains(&KeyCode::KeyA) {
            camera.strafe(-distance);
        }
        if self.pressed_keys.contains(&KeyCode::KeyD) {
            camera.strafe(distance);
        }
    }

    fn handle_mouse_rotation(&mut self, camera: &mut Camera) {
        // Only rotate while the right mouse button is held
        if !self.mouse_buttons.contains(&MouseButton::Right) {
            return;
        }

        if self.mouse_delta.0.abs() < 0.001 && self.mouse_delta.1.abs() < 0.001 {
            return;
        }

        let dx = self.mouse_delta.0 * self.mouse_sensitivity.to_radians();
        let dy = self.mouse_delta.1 * self.mouse_sensitivity.to_radians();

        camera.pitch(dy);
        camera.rotate_y(dx);
    }

    /// Lock and hide cursor for immersive camera control
    pub fn lock_cursor(&mut self, window: &Window) {
        if self.cursor_locked {
            return;
        }

        window.set_cursor_visible(false);

        // Confined is more widely supported than Locked
        if let Err(e) = window.set_cursor_grab(winit::window::CursorGrabMode::Confined) {
            if let Err(e2) = window.set_cursor_grab(winit::window::CursorGrabMode::Locked) {
                warn!(
                    "Failed to grab cursor (Confined: {}, Locked: {}). Cursor will remain visible but rotation still works.",
                    e, e2
                );
            } else {
                debug!("Cursor grabbed with Locked mode");
                self.cursor_locked = true;
            }
        } else {
            debug!("Cursor grabbed with Confined mode");
            self.cursor_locked = true;
        }
    }

    /// Unlock and show cursor
    pub fn unlock_cursor(&mut self, window: &Window) {
        window.set_cursor_visible(true);
        if !self.cursor_locked {
            return;
        }

        if let Err(e) = window.set_cursor_grab(winit::window::CursorGrabMode::None) {
            warn!("Failed to release cursor grab: {}", e);
        } else {
            debug!("Cursor grab released");
        }

        self.cursor_locked = false;
    }

    /// Reset mouse state (useful when window loses focus)
    pub fn reset_mouse(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.mouse_buttons.clear();
        self.pressed_keys.clear();
        self.first_mouse = true;
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector3;

    #[test]
    fn test_walk_forward_with_w() {
        let mut input = InputSystem::with_config(InputConfig { move_speed: 2.0, mouse_sensitivity: 0.2 });
        let mut camera = Camera::new();

        input.on_keyboard_input(KeyCode::KeyW, ElementState::Pressed);
        input.update_camera(&mut camera, 0.5);

        // 默认朝向 +Z
        assert!((camera.position() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-5);

        input.on_keyboard_input(KeyCode::KeyW, ElementState::Released);
        input.update_camera(&mut camera, 0.5);
        assert!((camera.position().z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mouse_ignored_without_right_button() {
        let mut input = InputSystem::new();
        let mut camera = Camera::new();
        let before = camera.look();

        input.on_mouse_move((10.0, 10.0));
        input.on_mouse_move((60.0, 40.0));
        input.update_camera(&mut camera, 0.016);

        assert!((camera.look() - before).norm() < 1e-6);
    }

    #[test]
    fn test_from_camera_config() {
        let config = CameraConfig { move_speed: 3.0, ..CameraConfig::default() };
        let input = InputSystem::with_config(InputConfig::from(&config));
        assert_eq!(input.move_speed(), 3.0);
    }
}
