//! Event snapshots and the transport-ready EventPack carrier.

use crate::point::{Point, PointValue};
use crate::time::Cp56Timestamp;
use crate::types::{Cot, Quality, TypeId};

/// An immutable snapshot of a point transition.
///
/// Every field is a true `Option`, not a Python-style truthy check — this
/// is the Rust-safe restatement of the source's `Event.exists()` method,
/// which conflated "never set" with "false/zero". An event missing any
/// field is simply dropped during [`EventPack`] construction rather than
/// silently treated as present-but-falsy.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub ioa: u32,
    pub type_id: TypeId,
    pub cot: Cot,
    pub value: Option<PointValue>,
    pub flags: Option<Quality>,
    pub time: Option<Cp56Timestamp>,
}

impl Event {
    /// Snapshot a point's current state with the given cause of
    /// transmission. Used both by `Point::set` (cot = SPONT) and by
    /// from-points `EventPack` construction (cot = INROGEN / BACK).
    pub fn from_point(point: &Point, cot: Cot) -> Self {
        Self {
            ioa: point.ioa,
            type_id: point.type_id,
            cot,
            value: point.value,
            flags: point.flags,
            time: point.time,
        }
    }

    /// True once every field is present — the condition required before an
    /// event may enter an [`EventPack`].
    fn is_complete(&self) -> bool {
        self.value.is_some() && self.flags.is_some()
    }
}

/// A transport-ready grouping consumed by the dispatcher.
///
/// For this core, a pack carries at most one event (single information
/// object, `sq = 0`). A pack with no surviving event is *empty* and forces
/// the dispatcher to reply with the "no data available" short frame.
#[derive(Debug, Clone, Default)]
pub struct EventPack {
    pub events: Vec<Event>,
    pub cot: Option<Cot>,
    pub type_id: Option<TypeId>,
    pub time: Option<Cp56Timestamp>,
}

impl EventPack {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Dequeue the head event of `queue`. Drops it (producing an empty
    /// pack) if it is missing `value` or `flags`.
    pub fn from_queue(queue: &mut std::collections::VecDeque<Event>) -> Self {
        let Some(event) = queue.pop_front() else {
            return Self::default();
        };
        if !event.is_complete() {
            return Self::default();
        }
        Self {
            cot: Some(event.cot),
            type_id: Some(event.type_id),
            time: event.time,
            events: vec![event],
        }
    }

    /// Pop the first point from `points`, synthesize one event with `cot`,
    /// and wrap it. Drops it (producing an empty pack) if the point's
    /// fields are incomplete.
    pub fn from_points(
        points: &mut Vec<std::rc::Rc<std::cell::RefCell<Point>>>,
        cot: Cot,
        now: Cp56Timestamp,
    ) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let point = points.remove(0);
        let event = Event::from_point(&point.borrow(), cot);
        if !event.is_complete() {
            return Self {
                cot: Some(cot),
                type_id: None,
                time: Some(now),
                events: Vec::new(),
            };
        }
        Self {
            cot: Some(cot),
            type_id: Some(event.type_id),
            time: Some(now),
            events: vec![event],
        }
    }
}
