//! Typed simulation events with pre-allocated ring buffers.
//!
//! The engine emits events as it executes each stage of a frame. Every event
//! kind has its own [`EventBuffer`], allocated on first use. Events are
//! observational only and never feed back into the simulation.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventLog::suppress`], which prevents
//! any allocation or recording for that kind.

use crate::atom::AtomKind;
use crate::grid::Coord;
use crate::id::{AtomId, FaucetId, MechId, OperatorId, SinkId};
use crate::operator::OperatorKind;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the frame in which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Mechs --
    AtomEngaged {
        mech: MechId,
        atom: AtomId,
        cell: Coord,
        frame: u64,
    },
    AtomReleased {
        mech: MechId,
        atom: AtomId,
        cell: Coord,
        frame: u64,
    },
    /// A blocking instruction held the mech's cursor in place.
    MechWaiting {
        mech: MechId,
        frame: u64,
    },
    /// A move would have left the grid.
    MechBlocked {
        mech: MechId,
        frame: u64,
    },

    // -- Operators --
    OperatorFired {
        operator: OperatorId,
        kind: OperatorKind,
        frame: u64,
    },

    // -- Faucets and sinks --
    AtomEmitted {
        faucet: FaucetId,
        atom: AtomId,
        kind: AtomKind,
        frame: u64,
    },
    AtomDelivered {
        sink: SinkId,
        atom: AtomId,
        latency: u64,
        frame: u64,
    },
    AtomDiscarded {
        sink: SinkId,
        atom: AtomId,
        kind: AtomKind,
        frame: u64,
    },
}

/// Which variant an [`Event`] is. Keys the per-kind buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AtomEngaged,
    AtomReleased,
    MechWaiting,
    MechBlocked,
    OperatorFired,
    AtomEmitted,
    AtomDelivered,
    AtomDiscarded,
}

/// Number of [`EventKind`] variants.
const EVENT_KIND_COUNT: usize = 8;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AtomEngaged { .. } => EventKind::AtomEngaged,
            Event::AtomReleased { .. } => EventKind::AtomReleased,
            Event::MechWaiting { .. } => EventKind::MechWaiting,
            Event::MechBlocked { .. } => EventKind::MechBlocked,
            Event::OperatorFired { .. } => EventKind::OperatorFired,
            Event::AtomEmitted { .. } => EventKind::AtomEmitted,
            Event::AtomDelivered { .. } => EventKind::AtomDelivered,
            Event::AtomDiscarded { .. } => EventKind::AtomDiscarded,
        }
    }

    pub fn frame(&self) -> u64 {
        match self {
            Event::AtomEngaged { frame, .. }
            | Event::AtomReleased { frame, .. }
            | Event::MechWaiting { frame, .. }
            | Event::MechBlocked { frame, .. }
            | Event::OperatorFired { frame, .. }
            | Event::AtomEmitted { frame, .. }
            | Event::AtomDelivered { frame, .. }
            | Event::AtomDiscarded { frame, .. } => *frame,
        }
    }
}

impl EventKind {
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::AtomEngaged,
        EventKind::AtomReleased,
        EventKind::MechWaiting,
        EventKind::MechBlocked,
        EventKind::OperatorFired,
        EventKind::AtomEmitted,
        EventKind::AtomDelivered,
        EventKind::AtomDiscarded,
    ];

    /// Position in [`EventKind::ALL`].
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// Fixed-size event ring. Once full, each new event overwrites the oldest.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next slot to write.
    head: usize,
    len: usize,
    /// Events pushed over the buffer's lifetime, overwritten ones included.
    total_written: u64,
}

impl EventBuffer {
    /// A ring holding up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: vec![None; capacity],
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Append `event`, overwriting the oldest entry when full.
    pub fn push(&mut self, event: Event) {
        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lifetime push count.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events lost to overwriting.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.len as u64)
    }

    /// Buffered events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        // Once full, head points at the oldest entry.
        let start = if self.len < self.capacity() { 0 } else { self.head };
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    /// Empty the ring. The lifetime count is kept.
    pub fn clear(&mut self) {
        self.events.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Per-kind event buffers with suppression.
#[derive(Debug, Clone)]
pub struct EventLog {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    capacity: usize,
}

impl EventLog {
    /// Create a log whose buffers each hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            capacity,
        }
    }

    /// Stop recording `kind` and free its buffer.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn suppress_all(&mut self) {
        for kind in EventKind::ALL {
            self.suppress(kind);
        }
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event. No-ops if its kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Buffer for `kind`, if anything of that kind was emitted.
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events of `kind` currently buffered, oldest first.
    pub fn events(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.buffer(kind).into_iter().flat_map(EventBuffer::iter)
    }

    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffer(kind).map_or(0, EventBuffer::len)
    }

    /// All events of `kind` emitted so far, overwritten ones included.
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffer(kind).map_or(0, EventBuffer::total_written)
    }

    /// Clear all buffers. Suppression settings are kept.
    pub fn clear_all(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(1024)
    }
}
