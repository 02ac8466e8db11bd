use biocrowds_core::{FloorDimensions, PixelCoord, TickBuffers};
use glam::Vec2;

use crate::{Color, RenderingError};

/// Half-width, in pixels, of the square marking an agent in debug views.
pub const AGENT_DRAW_RADIUS: f32 = 5.0;

/// Gain applied to directional weights so they become visible.
pub const DIRECTIONAL_INFLUENCE: f32 = 10.0;

/// Diagnostic rendering of the latest tick's intermediate buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugView {
    /// Owner channel in red; the ambiguous band shows as full red.
    AgentIds,
    /// Marker weight in blue.
    MarkerWeights,
    /// Absolute directional weight, x in red and y in blue.
    DirectionalWeights,
    /// Agents as squares colored by their normalized position.
    AgentPositions,
    /// Agents as squares colored by their raw movement vector on white.
    MovementVectors,
    /// Owner channel, directional x weight and agent squares combined.
    Combined,
}

impl DebugView {
    /// All views in mode order.
    pub const ALL: [Self; 6] = [
        Self::AgentIds,
        Self::MarkerWeights,
        Self::DirectionalWeights,
        Self::AgentPositions,
        Self::MovementVectors,
        Self::Combined,
    ];

    /// Resolves a numbered render mode, 1 through 6.
    pub fn from_mode(mode: u8) -> Result<Self, RenderingError> {
        usize::from(mode)
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(RenderingError::UnknownDebugView { mode })
    }
}

/// RGB image covering the floor, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldImage {
    floor: FloorDimensions,
    pixels: Vec<Color>,
}

impl FieldImage {
    /// Floor covered by the image.
    #[must_use]
    pub const fn floor(&self) -> FloorDimensions {
        self.floor
    }

    /// Row-major pixel colors.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Color of a single pixel, if it lies on the floor.
    #[must_use]
    pub fn pixel(&self, pixel: PixelCoord) -> Option<Color> {
        self.floor
            .index(pixel)
            .and_then(|index| self.pixels.get(index).copied())
    }

    /// Encodes the image as a binary PPM (`P6`) file.
    #[must_use]
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.floor.width(), self.floor.height());
        let mut bytes = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        bytes.extend_from_slice(header.as_bytes());
        for color in &self.pixels {
            bytes.extend_from_slice(&color.to_rgb_u8());
        }
        bytes
    }
}

/// Renders `view` from a tick's buffers.
///
/// `positions` are the normalized positions the tick started from, which are
/// the positions every buffer was computed against.
#[must_use]
pub fn render_field(view: DebugView, buffers: &TickBuffers, positions: &[Vec2]) -> FieldImage {
    let floor = buffers.owners.dimensions();
    let agents: Vec<Vec2> = positions
        .iter()
        .map(|position| floor.to_pixel_space(*position))
        .collect();

    let pixels = buffers
        .owners
        .iter()
        .map(|(pixel, owner)| {
            let point = pixel.to_vec2();
            match view {
                DebugView::AgentIds => Color::rgb(*owner, 0.0, 0.0),
                DebugView::MarkerWeights => {
                    let weight = buffers.marker_weights.value(pixel).unwrap_or_default();
                    Color::rgb(0.0, 0.0, weight)
                }
                DebugView::DirectionalWeights => {
                    let weight = buffers.directional_weights.value(pixel).unwrap_or_default();
                    let scaled = (weight * DIRECTIONAL_INFLUENCE).abs();
                    Color::rgb(scaled.x, 0.0, scaled.y)
                }
                DebugView::AgentPositions => agents
                    .iter()
                    .position(|agent| covers(*agent, point))
                    .and_then(|index| positions.get(index))
                    .map_or(Color::BLACK, |position| {
                        Color::rgb(position.x, 0.0, position.y)
                    }),
                DebugView::MovementVectors => agents
                    .iter()
                    .rposition(|agent| covers(*agent, point))
                    .and_then(|index| buffers.summed_directional_weights.get(index))
                    .map_or(Color::WHITE, |movement| {
                        Color::rgb(movement.x, 0.0, movement.y)
                    }),
                DebugView::Combined => {
                    let directional = buffers.directional_weights.value(pixel).unwrap_or_default();
                    if agents.iter().any(|agent| covers(*agent, point)) {
                        Color::rgb(1.0, directional.x, 1.0)
                    } else {
                        Color::rgb(*owner, directional.x, 0.0)
                    }
                }
            }
        })
        .collect();

    FieldImage { floor, pixels }
}

fn covers(agent: Vec2, point: Vec2) -> bool {
    (agent - point).abs().max_element() < AGENT_DRAW_RADIUS
}
