//! Performance events at absolute tick positions.
//!
//! The translator produces an [`EventSequence`]; the player walks it with a
//! [`Cursor`] and hands each event to the transport. Ticks are integers at
//! [`PULSES_PER_QUARTER`] resolution; wall-clock time only appears in the
//! transport.

pub mod sequence;
pub mod timing;
pub mod types;

pub use sequence::{Cursor, EventSequence, LoopEdge, Walk};
pub use timing::{Slot, NOTE_GAP, PULSES_PER_QUARTER};
pub use types::{Event, EventKind};
