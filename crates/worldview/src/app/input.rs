use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::coords::Vec2;
use crate::input::{PointerButton, PointerEvent, PointerEventKind, ScrollEvent};

/// A release closer than this to its press point also produces a click.
pub const CLICK_SLOP_PX: f32 = 4.0;
/// Pixels scrolled per wheel line.
pub const LINE_SCROLL_PX: f32 = 24.0;

const BUTTON_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeldButton {
    pressed_at: Vec2,
    beyond_slop: bool,
}

/// Turns raw window button/cursor events into the ordered press, drag, release, click stream.
///
/// Drags within [`CLICK_SLOP_PX`] of the press point are swallowed so that a click and a
/// marquee never come out of the same gesture.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    /// Last known position; kept after the cursor leaves so held buttons can still release.
    cursor: Option<Vec2>,
    inside: bool,
    held: [Option<HeldButton>; BUTTON_COUNT],
    shift_down: bool,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_shift_down(&mut self, shift_down: bool) {
        self.shift_down = shift_down;
    }

    pub fn shift_down(&self) -> bool {
        self.shift_down
    }

    /// Position of the cursor while it is over the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor.filter(|_| self.inside)
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> Vec<PointerEvent> {
        self.cursor = Some(position);
        self.inside = true;
        let mut events = Vec::new();
        for button in ALL_BUTTONS {
            let Some(held) = self.held[button_index(button)].as_mut() else {
                continue;
            };
            if !held.beyond_slop
                && held.pressed_at.distance_squared(position) > CLICK_SLOP_PX * CLICK_SLOP_PX
            {
                held.beyond_slop = true;
            }
            let dragging = held.beyond_slop;
            if dragging {
                events.push(self.event(PointerEventKind::Drag, button, position));
            }
        }
        events
    }

    pub fn cursor_left(&mut self) {
        self.inside = false;
    }

    pub fn button_changed(
        &mut self,
        button: PointerButton,
        state: ElementState,
    ) -> Vec<PointerEvent> {
        let slot = button_index(button);
        match state {
            ElementState::Pressed => {
                let Some(position) = self.cursor() else {
                    return Vec::new();
                };
                if self.held[slot].is_some() {
                    return Vec::new();
                }
                self.held[slot] = Some(HeldButton {
                    pressed_at: position,
                    beyond_slop: false,
                });
                vec![self.event(PointerEventKind::Press, button, position)]
            }
            ElementState::Released => {
                let Some(held) = self.held[slot].take() else {
                    return Vec::new();
                };
                let position = self.cursor.unwrap_or(held.pressed_at);
                let mut events = vec![self.event(PointerEventKind::Release, button, position)];
                // No click is synthesized for a release outside the window.
                if self.inside && !held.beyond_slop {
                    events.push(self.event(PointerEventKind::Click, button, position));
                }
                events
            }
        }
    }

    pub fn scroll(&self, delta: MouseScrollDelta) -> ScrollEvent {
        let (delta_x, delta_y) = scroll_delta_px(delta);
        ScrollEvent {
            delta_x,
            delta_y,
            shift_down: self.shift_down,
        }
    }

    fn event(&self, kind: PointerEventKind, button: PointerButton, position: Vec2) -> PointerEvent {
        PointerEvent {
            kind,
            button,
            position,
            shift_down: self.shift_down,
        }
    }
}

const ALL_BUTTONS: [PointerButton; BUTTON_COUNT] = [
    PointerButton::Primary,
    PointerButton::Middle,
    PointerButton::Secondary,
];

const fn button_index(button: PointerButton) -> usize {
    match button {
        PointerButton::Primary => 0,
        PointerButton::Middle => 1,
        PointerButton::Secondary => 2,
    }
}

pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

fn scroll_delta_px(delta: MouseScrollDelta) -> (f32, f32) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (x * LINE_SCROLL_PX, y * LINE_SCROLL_PX),
        MouseScrollDelta::PixelDelta(position) => (position.x as f32, position.y as f32),
    }
}

/// Next pinned depth when cycling the show-underlying override.
pub fn next_show_underlying(current: Option<u32>) -> Option<u32> {
    match current {
        None => Some(0),
        Some(depth) if depth < 2 => Some(depth + 1),
        Some(_) => None,
    }
}

/// Keyboard state with edge detection for the viewer's shortcut keys.
#[derive(Debug, Default)]
pub(crate) struct KeyCollector {
    pub quit_requested: bool,
    underlying_key_is_down: bool,
    underlying_pressed_edge: bool,
}

impl KeyCollector {
    pub(crate) fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        match key {
            PhysicalKey::Code(KeyCode::Escape) => {
                if state == ElementState::Pressed {
                    self.quit_requested = true;
                }
            }
            PhysicalKey::Code(KeyCode::KeyU) => match state {
                ElementState::Pressed => {
                    if !self.underlying_key_is_down {
                        self.underlying_pressed_edge = true;
                    }
                    self.underlying_key_is_down = true;
                }
                ElementState::Released => self.underlying_key_is_down = false,
            },
            _ => {}
        }
    }

    pub(crate) fn take_underlying_cycle_pressed(&mut self) -> bool {
        let was_pressed = self.underlying_pressed_edge;
        self.underlying_pressed_edge = false;
        was_pressed
    }
}
