//! Input state for the tick loop.
//!
//! `Input` turns raw winit window events into per-tick state: keys that went
//! down this tick (edge), keys currently held (level), accumulated mouse
//! motion and wheel, and a pending viewport resize. The app calls
//! [`Input::begin_tick`] after each tick has consumed the state.
//!
//! Resizes are only recorded here. They are applied at the next tick
//! boundary, never in the middle of the pass chain.

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Pixels of wheel travel treated as one wheel line.
const PIXELS_PER_LINE: f32 = 100.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Keys the scene controls listen to.
///
/// Left and right modifiers are kept apart: left Alt adjusts ripple
/// amplitude/duration while right Alt adjusts the decay rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    A, B, D, E, G, H, I, J, K, Q, R, S, T, U, V, W, X, Y, Z,

    Up, Down, Left, Right,

    LeftShift, RightShift,
    LeftControl, RightControl,
    LeftAlt, RightAlt,

    Escape,

    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::KeyA => KeyCode::A,
            WinitKeyCode::KeyB => KeyCode::B,
            WinitKeyCode::KeyD => KeyCode::D,
            WinitKeyCode::KeyE => KeyCode::E,
            WinitKeyCode::KeyG => KeyCode::G,
            WinitKeyCode::KeyH => KeyCode::H,
            WinitKeyCode::KeyI => KeyCode::I,
            WinitKeyCode::KeyJ => KeyCode::J,
            WinitKeyCode::KeyK => KeyCode::K,
            WinitKeyCode::KeyQ => KeyCode::Q,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyT => KeyCode::T,
            WinitKeyCode::KeyU => KeyCode::U,
            WinitKeyCode::KeyV => KeyCode::V,
            WinitKeyCode::KeyW => KeyCode::W,
            WinitKeyCode::KeyX => KeyCode::X,
            WinitKeyCode::KeyY => KeyCode::Y,
            WinitKeyCode::KeyZ => KeyCode::Z,

            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,

            WinitKeyCode::ShiftLeft => KeyCode::LeftShift,
            WinitKeyCode::ShiftRight => KeyCode::RightShift,
            WinitKeyCode::ControlLeft => KeyCode::LeftControl,
            WinitKeyCode::ControlRight => KeyCode::RightControl,
            WinitKeyCode::AltLeft => KeyCode::LeftAlt,
            WinitKeyCode::AltRight => KeyCode::RightAlt,

            WinitKeyCode::Escape => KeyCode::Escape,

            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Keyboard, mouse and viewport state for one tick.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,
    mouse_released: HashSet<MouseButton>,

    cursor: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: f32,

    pending_resize: Option<(u32, u32)>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Key Queries ==========

    /// Key went down during this tick (no auto-repeat).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Key is currently held.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    // ========== Mouse Queries ==========

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_released.contains(&button)
    }

    /// Cursor motion accumulated over this tick, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel motion accumulated over this tick, in lines. Positive is away
    /// from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    // ========== Viewport ==========

    /// Take the most recent resize requested since the last call.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    // ========== Direct injection ==========
    //
    // Used by `handle_event` and by headless drivers (tests, benches).

    pub fn key_down(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn button_down(&mut self, button: MouseButton) {
        if self.mouse_held.insert(button) {
            self.mouse_pressed.insert(button);
        }
    }

    pub fn button_up(&mut self, button: MouseButton) {
        if self.mouse_held.remove(&button) {
            self.mouse_released.insert(button);
        }
    }

    pub fn move_mouse(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Record a viewport change. Zero-sized (minimized) viewports are ignored.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.pending_resize = Some((width, height));
        }
    }

    /// Clear edge-triggered state once a tick has consumed it.
    pub fn begin_tick(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        self.mouse_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let key = KeyCode::from(keycode);
                    match event.state {
                        ElementState::Pressed => self.key_down(key),
                        ElementState::Released => self.key_up(key),
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let btn = MouseButton::from(*button);
                match state {
                    ElementState::Pressed => self.button_down(btn),
                    ElementState::Released => self.button_up(btn),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                if let Some(last) = self.cursor {
                    self.move_mouse(pos - last);
                }
                self.cursor = Some(pos);
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines);
            }

            WindowEvent::Resized(size) => {
                self.request_resize(size.width, size.height);
            }

            WindowEvent::Focused(false) => {
                // Releases are lost while unfocused; treat everything held
                // as released so nothing stays stuck down.
                self.keys_held.clear();
                self.mouse_released.extend(self.mouse_held.drain());
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();

        assert!(!input.key_held(KeyCode::V));
        assert!(!input.key_pressed(KeyCode::V));

        input.key_down(KeyCode::V);
        assert!(input.key_held(KeyCode::V));
        assert!(input.key_pressed(KeyCode::V));

        // After begin_tick, pressed is cleared but held remains
        input.begin_tick();
        assert!(input.key_held(KeyCode::V));
        assert!(!input.key_pressed(KeyCode::V));

        // Repeat while held is not a new press
        input.key_down(KeyCode::V);
        assert!(!input.key_pressed(KeyCode::V));

        input.key_up(KeyCode::V);
        assert!(!input.key_held(KeyCode::V));
    }

    #[test]
    fn test_mouse_accumulates_within_tick() {
        let mut input = Input::new();
        input.move_mouse(Vec2::new(3.0, -1.0));
        input.move_mouse(Vec2::new(2.0, 4.0));
        input.scroll(1.0);
        input.scroll(0.5);

        assert_eq!(input.mouse_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(input.scroll_delta(), 1.5);

        input.begin_tick();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.scroll_delta(), 0.0);
    }

    #[test]
    fn test_button_edges() {
        let mut input = Input::new();
        input.button_down(MouseButton::Right);
        assert!(input.mouse_pressed(MouseButton::Right));
        assert!(input.mouse_held(MouseButton::Right));

        input.begin_tick();
        input.button_up(MouseButton::Right);
        assert!(input.mouse_released(MouseButton::Right));
        assert!(!input.mouse_held(MouseButton::Right));
    }

    #[test]
    fn test_resize_is_latest_and_taken_once() {
        let mut input = Input::new();
        input.request_resize(1600, 900);
        input.request_resize(0, 900);
        input.request_resize(1920, 1080);

        assert_eq!(input.take_resize(), Some((1920, 1080)));
        assert_eq!(input.take_resize(), None);
    }
}
