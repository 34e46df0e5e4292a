use tracing::debug;

use crate::coords::{ScreenRect, Vec2};
use crate::input_handler::WorldRegion;
use crate::view_model::ViewModel;

/// Pan commands are scaled by `pixels_per_tile / PAN_SCALE_DIVISOR`.
pub const PAN_SCALE_DIVISOR: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Drag,
    Release,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub button: PointerButton,
    pub position: Vec2,
    pub shift_down: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, button: PointerButton, x: f32, y: f32) -> Self {
        Self {
            kind,
            button,
            position: Vec2::new(x, y),
            shift_down: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub delta_x: f32,
    pub delta_y: f32,
    pub shift_down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

/// Marquee rectangle in screen space. Hidden until the first drag tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub bounds: ScreenRect,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputState {
    Idle,
    MarqueeDragging {
        anchor: Option<Vec2>,
        rect: SelectionRect,
    },
    PanDragging {
        last: Vec2,
    },
}

/// What the view has to do with the view-model or the input handler after an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    MoveOrigin { dx: f32, dy: f32 },
    AdjustLevel { delta: i32 },
    WorldPointClicked { x: f32, y: f32, z: i32 },
    RegionSelected(WorldRegion),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputOutcome {
    pub disposition: EventDisposition,
    pub command: Option<ViewCommand>,
}

impl InputOutcome {
    const IGNORED: Self = Self {
        disposition: EventDisposition::Ignored,
        command: None,
    };

    fn consumed(command: Option<ViewCommand>) -> Self {
        Self {
            disposition: EventDisposition::Consumed,
            command,
        }
    }
}

/// Turns the ordered pointer stream of one viewport into pan, level, click and marquee commands.
#[derive(Debug)]
pub struct ViewportInputController {
    state: InputState,
    reverse_scroll: bool,
}

impl ViewportInputController {
    pub fn new(reverse_scroll: bool) -> Self {
        Self {
            state: InputState::Idle,
            reverse_scroll,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn set_reverse_scroll(&mut self, reverse_scroll: bool) {
        self.reverse_scroll = reverse_scroll;
    }

    /// The marquee while one is being dragged.
    pub fn selection_rect(&self) -> Option<SelectionRect> {
        match self.state {
            InputState::MarqueeDragging { rect, .. } => Some(rect),
            _ => None,
        }
    }

    pub fn handle_pointer<VM: ViewModel + ?Sized>(
        &mut self,
        event: &PointerEvent,
        view_model: &VM,
    ) -> InputOutcome {
        use PointerButton::{Middle, Primary};
        use PointerEventKind::{Click, Drag, Press, Release};

        let point = event.position;
        match (&mut self.state, event.kind, event.button) {
            (InputState::Idle, Press, Primary) => {
                self.state = InputState::MarqueeDragging {
                    anchor: Some(point),
                    rect: SelectionRect {
                        bounds: ScreenRect {
                            x: point.x,
                            y: point.y,
                            width: 0.0,
                            height: 0.0,
                        },
                        visible: false,
                    },
                };
                InputOutcome::consumed(None)
            }
            (InputState::Idle, Press, Middle) => {
                self.state = InputState::PanDragging { last: point };
                InputOutcome::consumed(None)
            }
            (InputState::MarqueeDragging { anchor, rect }, Drag, Primary) => {
                rect.visible = true;
                if let Some(anchor) = anchor {
                    rect.bounds = ScreenRect::from_corners(*anchor, point);
                }
                InputOutcome::consumed(None)
            }
            (InputState::MarqueeDragging { rect, .. }, Release, Primary) => {
                let rect = *rect;
                self.state = InputState::Idle;
                if !rect.visible {
                    return InputOutcome::consumed(None);
                }
                let region = screen_rect_to_region(&rect.bounds, view_model);
                debug!(?region, "marquee_finished");
                InputOutcome::consumed(Some(ViewCommand::RegionSelected(region)))
            }
            (InputState::PanDragging { last }, Drag, Middle) => {
                let scale = view_model.pixels_per_tile() as f32 / PAN_SCALE_DIVISOR;
                let dx = (last.x - point.x) * scale;
                let dy = (last.y - point.y) * scale;
                *last = point;
                InputOutcome::consumed(Some(ViewCommand::MoveOrigin { dx, dy }))
            }
            (InputState::PanDragging { .. }, Release, Middle) => {
                self.state = InputState::Idle;
                InputOutcome::consumed(None)
            }
            (InputState::Idle, Click, Primary) => {
                let x = view_model.screen_to_world_x(point.x);
                let y = view_model.screen_to_world_y(point.y);
                let z = view_model.screen_to_world_z(point.x, point.y);
                InputOutcome::consumed(Some(ViewCommand::WorldPointClicked { x, y, z }))
            }
            _ => InputOutcome::IGNORED,
        }
    }

    /// Scroll is stateless: shift turns it into a level step, otherwise it pans.
    pub fn handle_scroll(&self, event: &ScrollEvent) -> InputOutcome {
        let (mut dx, mut dy) = (event.delta_x, event.delta_y);
        if self.reverse_scroll {
            dx = -dx;
            dy = -dy;
        }
        let command = if event.shift_down {
            let delta = if dx > 0.0 || dy > 0.0 { 1 } else { -1 };
            ViewCommand::AdjustLevel { delta }
        } else {
            ViewCommand::MoveOrigin { dx, dy }
        };
        InputOutcome::consumed(Some(command))
    }
}

fn screen_rect_to_region<VM: ViewModel + ?Sized>(bounds: &ScreenRect, view_model: &VM) -> WorldRegion {
    let z = view_model.current_z_level();
    WorldRegion {
        x_min: view_model.screen_to_world_x(bounds.min_x()),
        y_min: view_model.screen_to_world_y(bounds.min_y()),
        z_min: z,
        x_max: view_model.screen_to_world_x(bounds.max_x()),
        y_max: view_model.screen_to_world_y(bounds.max_y()),
        z_max: z + 1,
    }
}
