#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for BioCrowds adapters.
//!
//! Renderers never see the world. They receive a [`RenderFrame`] per tick,
//! report user input as a [`FrameInput`], and the adapter folds that input
//! into [`ControlToggles`] that become world commands.

mod field;

use anyhow::Result as AnyResult;
use biocrowds_core::{Command, FloorDimensions, FrameView};
use glam::Vec2;
use std::{error::Error, fmt};

pub use field::{render_field, DebugView, FieldImage, AGENT_DRAW_RADIUS, DIRECTIONAL_INFLUENCE};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb_u8(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb_u8(255, 255, 255);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from floating point RGB channels.
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Grey shade identifying an agent by its encoded channel.
    #[must_use]
    pub const fn from_channel(channel: f32) -> Self {
        Self::rgb(channel, channel, channel)
    }

    /// Converts the RGB channels to bytes, saturating out-of-range intensities.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        ]
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Input snapshot gathered by adapters before the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a pause toggle on this frame.
    pub pause_toggle: bool,
    /// Whether the adapter detected a reset request on this frame.
    pub reset_pressed: bool,
    /// Whether the adapter detected a hold-positions toggle on this frame.
    pub hold_toggle: bool,
}

/// Control panel state shared between the renderer and the frame driver.
///
/// `pause` and `hold_positions` are levels. `reset` is an edge: it is cleared
/// as soon as it has been turned into a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlToggles {
    /// Whether ticks should be skipped.
    pub pause: bool,
    /// Whether a reset was requested and not yet forwarded.
    pub reset: bool,
    /// Whether agents are frozen while the pipeline keeps running.
    pub hold_positions: bool,
}

impl Default for ControlToggles {
    fn default() -> Self {
        Self {
            pause: false,
            reset: true,
            hold_positions: false,
        }
    }
}

impl ControlToggles {
    /// Folds one frame of input into the toggles.
    pub fn absorb(&mut self, input: FrameInput) {
        if input.pause_toggle {
            self.pause = !self.pause;
        }
        if input.hold_toggle {
            self.hold_positions = !self.hold_positions;
        }
        self.reset |= input.reset_pressed;
    }

    /// Emits the commands for one tick and consumes the reset edge.
    pub fn commands_for_tick(&mut self, out_commands: &mut Vec<Command>) {
        out_commands.push(Command::SetPaused { paused: self.pause });
        out_commands.push(Command::HoldPositions {
            hold: self.hold_positions,
        });
        if std::mem::take(&mut self.reset) {
            out_commands.push(Command::RequestReset);
        }
        out_commands.push(Command::Tick);
    }
}

/// Agent as drawn by a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentPresentation {
    /// Normalized floor position.
    pub position: Vec2,
    /// Displacement produced by the latest tick.
    pub velocity: Vec2,
    /// Draw radius, in renderer units.
    pub radius: f32,
    /// Identifying color.
    pub color: Color,
}

/// Everything a renderer consumes for one tick.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RenderFrame {
    /// Index of the frame.
    pub tick: u64,
    /// Agents in index order.
    pub agents: Vec<AgentPresentation>,
    /// Optional debug image of the floor.
    pub field: Option<FieldImage>,
}

impl RenderFrame {
    /// Refreshes the frame from the world's latest view.
    ///
    /// `radii` and `channels` are the static per-agent attributes; missing
    /// entries fall back to a zero radius and black.
    pub fn update_from(&mut self, view: FrameView<'_>, radii: &[f32], channels: &[f32]) {
        self.tick = view.tick;
        self.agents.clear();
        self.agents.extend(
            view.positions
                .iter()
                .zip(view.velocities)
                .enumerate()
                .map(|(index, (position, velocity))| AgentPresentation {
                    position: *position,
                    velocity: *velocity,
                    radius: radii.get(index).copied().unwrap_or(0.0),
                    color: channels
                        .get(index)
                        .copied()
                        .map_or(Color::BLACK, Color::from_channel),
                }),
        );
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Floor the agents move on.
    pub floor: FloorDimensions,
    /// Debug view drawn under the agents, if any.
    pub debug_view: Option<DebugView>,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        floor: FloorDimensions,
        debug_view: Option<DebugView>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            floor,
            debug_view,
        }
    }
}

/// Rendering backend capable of presenting BioCrowds frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the input captured by the
    /// adapter since the previous call and refreshes the frame that is about
    /// to be presented.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut RenderFrame) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Debug views are numbered 1 through 6.
    UnknownDebugView {
        /// Mode number that failed validation.
        mode: u8,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDebugView { mode } => {
                write!(f, "debug view must be within 1..=6 (received {mode})")
            }
        }
    }
}

impl Error for RenderingError {}
