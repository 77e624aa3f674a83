//! Ordered event storage with an optional loop back-edge.
//!
//! The translator produces a flat list of events. An endless repeat is not
//! unrolled; its first and last events carry `start_loop`/`end_loop` flags
//! and [`EventSequence::new`] turns the first such pair into an explicit
//! [`LoopEdge`]. Walking the sequence follows the edge back to the loop start
//! and shifts every later event by the accumulated loop length, so a finite
//! vector plays as an infinite, monotonically timed stream.

use std::fmt;

use super::types::Event;

/// Back-edge from the last event of a loop body to its first event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopEdge {
    /// Index of the `start_loop` event.
    pub start: usize,
    /// Index of the `end_loop` event; the last index of the sequence.
    pub end: usize,
    /// Ticks added to every event on each pass through the edge.
    pub offset: u64,
}

/// The translator's output, owned by the player during playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSequence {
    events: Vec<Event>,
    edge: Option<LoopEdge>,
}

impl EventSequence {
    /// Build a sequence, closing at most one loop.
    ///
    /// The first `end_loop` event that has a preceding `start_loop` event
    /// becomes the loop edge and everything after it is dropped: it can never
    /// be reached. Loop flags that do not belong to that edge are cleared.
    pub fn new(mut events: Vec<Event>) -> Self {
        let edge = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.end_loop && e.loop_offset > 0)
            .find_map(|(end, e)| {
                events[..=end]
                    .iter()
                    .rposition(|s| s.start_loop)
                    .map(|start| LoopEdge {
                        start,
                        end,
                        offset: e.loop_offset,
                    })
            });

        if let Some(edge) = edge {
            let dropped = events.len() - edge.end - 1;
            if dropped > 0 {
                log::debug!("dropping {dropped} events unreachable after the loop");
            }
            events.truncate(edge.end + 1);
        }

        for (i, event) in events.iter_mut().enumerate() {
            let is_start = edge.is_some_and(|edge| edge.start == i);
            let is_end = edge.is_some_and(|edge| edge.end == i);
            event.start_loop = is_start;
            event.end_loop = is_end;
            if !is_end {
                event.loop_offset = 0;
            }
        }

        Self { events, edge }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn loop_edge(&self) -> Option<LoopEdge> {
        self.edge
    }

    /// Whether walking the sequence never ends.
    pub fn is_cyclic(&self) -> bool {
        self.edge.is_some()
    }

    /// Remove the loop edge so the sequence walks straight to its end.
    pub fn linearize(&mut self) {
        if self.edge.take().is_some() {
            log::debug!("loop edge removed");
        }
    }

    /// Return the event under `cursor`, shifted by its loop accumulator, and advance it.
    pub fn next_event(&self, cursor: &mut Cursor) -> Option<Event> {
        let event = self.events.get(cursor.index)?;
        let shifted = event.shifted(cursor.shift);
        match self.edge {
            Some(edge) if cursor.index == edge.end => {
                cursor.shift = cursor.shift.saturating_add(edge.offset);
                cursor.index = edge.start;
                cursor.passes += 1;
            }
            _ => cursor.index += 1,
        }
        Some(shifted)
    }

    /// Iterate in playback order, following the loop edge.
    ///
    /// Endless when the sequence is cyclic; pair with `take`.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            sequence: self,
            cursor: Cursor::default(),
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl fmt::Display for EventSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{event}")?;
        }
        Ok(())
    }
}

/// Read position in an [`EventSequence`], independent of the sequence borrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    shift: u64,
    passes: u64,
}

impl Cursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Ticks added to events read from now on.
    pub fn shift(&self) -> u64 {
        self.shift
    }

    /// How many times the loop edge has been followed.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

/// Iterator returned by [`EventSequence::walk`].
pub struct Walk<'a> {
    sequence: &'a EventSequence,
    cursor: Cursor,
}

impl Iterator for Walk<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.sequence.next_event(&mut self.cursor)
    }
}
