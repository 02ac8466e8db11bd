use crate::AgentIndex;

/// Channel value written for pixels on the border between two agents.
///
/// Encoded agent channels are `index / count`, which never reaches `1.0`, so
/// the value decodes to the sentinel index `count`.
pub const AMBIGUOUS_CHANNEL: f32 = 1.0;

/// Distance below which a scaled channel is considered already integral.
pub const INDEX_TOLERANCE: f64 = 1e-5;

/// Encodes an agent index as the floating-point channel stored per pixel.
#[must_use]
pub fn encode_channel(index: AgentIndex, agent_count: u32) -> f32 {
    index.get() as f32 / agent_count as f32
}

/// Maps a channel value back to the agent index it encodes.
///
/// The scaled value is rounded down when it is within [`INDEX_TOLERANCE`] of
/// an integer and rounded up otherwise. The asymmetry absorbs the roundoff
/// left by `index / count`, which lands on either side of the true value.
/// [`AMBIGUOUS_CHANNEL`] decodes to `agent_count`. Corrupted channels outside
/// `[0, 1]` decode to out-of-range indices; use [`Owner::decode`] for a
/// checked result.
#[must_use]
pub fn color_to_index(channel: f32, agent_count: u32) -> i64 {
    let raw = f64::from(channel) * f64::from(agent_count);
    let floor = raw.floor();
    if (floor - raw).abs() < INDEX_TOLERANCE {
        floor as i64
    } else {
        raw.ceil() as i64
    }
}

/// Resolved owner of a floor pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The pixel belongs to the agent.
    Agent(AgentIndex),
    /// The pixel is ambiguous or its channel is corrupted.
    Unowned,
}

impl Owner {
    /// Decodes a channel value, rejecting the sentinel and any out-of-range index.
    #[must_use]
    pub fn decode(channel: f32, agent_count: u32) -> Self {
        if !(0.0..=1.0).contains(&channel) {
            return Self::Unowned;
        }
        let index = color_to_index(channel, agent_count);
        match u32::try_from(index) {
            Ok(index) if index < agent_count => Self::Agent(AgentIndex::new(index)),
            _ => Self::Unowned,
        }
    }

    /// Encodes the owner back into its channel representation.
    #[must_use]
    pub fn encode(self, agent_count: u32) -> f32 {
        match self {
            Self::Agent(index) => encode_channel(index, agent_count),
            Self::Unowned => AMBIGUOUS_CHANNEL,
        }
    }

    /// Returns the owning agent, if any.
    #[must_use]
    pub const fn agent(self) -> Option<AgentIndex> {
        match self {
            Self::Agent(index) => Some(index),
            Self::Unowned => None,
        }
    }
}
