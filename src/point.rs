//! Addressable process variables and their subscriber fan-out.

use crate::event::Event;
use crate::registry::ServerId;
use crate::time::Cp56Timestamp;
use crate::types::{Cot, Quality, TypeId};
use std::collections::VecDeque;

/// A point's value, tagged by the ASDU type it belongs to. Replaces the
/// Python source's untyped `value` field with a real sum type so dispatch
/// can never observe a value/type mismatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Bool(bool),
    Float(f32),
}

impl PointValue {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            PointValue::Bool(b) => Some(b),
            PointValue::Float(_) => None,
        }
    }

    pub fn as_f32(self) -> Option<f32> {
        match self {
            PointValue::Float(f) => Some(f),
            PointValue::Bool(_) => None,
        }
    }
}

/// An addressable process variable.
///
/// `subscribers` is a multiset, not a set: [`Point::register`] appends and
/// [`Point::deregister`] removes *every* matching occurrence, mirroring the
/// source's `srv_register`/`srv_deregister` — a double-registration is
/// harmless to register but produces duplicate events on every `set` until
/// deregistered, and deregistering once clears all of them at once.
#[derive(Debug, Clone)]
pub struct Point {
    pub type_id: TypeId,
    pub ioa: u32,
    pub value: Option<PointValue>,
    pub flags: Option<Quality>,
    pub time: Option<Cp56Timestamp>,
    subscribers: Vec<ServerId>,
}

impl Point {
    pub fn new_single(ioa: u32, value: bool) -> Self {
        Self {
            type_id: TypeId::SinglePoint,
            ioa,
            value: Some(PointValue::Bool(value)),
            flags: Some(Quality::GOOD),
            time: None,
            subscribers: Vec::new(),
        }
    }

    pub fn new_measured(ioa: u32, value: f32) -> Self {
        Self {
            type_id: TypeId::MeasuredFloat,
            ioa,
            value: Some(PointValue::Float(value)),
            flags: Some(Quality::GOOD),
            time: None,
            subscribers: Vec::new(),
        }
    }

    /// Append `server` to the subscriber multiset.
    pub fn register(&mut self, server: ServerId) {
        self.subscribers.push(server);
    }

    /// Remove every occurrence of `server` from the subscriber multiset.
    /// A no-op, not an error, if `server` was never registered.
    pub fn deregister(&mut self, server: ServerId) {
        self.subscribers.retain(|s| *s != server);
    }

    pub fn subscribers(&self) -> &[ServerId] {
        &self.subscribers
    }

    /// Overwrite whichever of `value`/`flags`/`time` is supplied, leaving
    /// the rest intact, then return a SPONT event snapshot for every
    /// current subscriber (in registration order).
    ///
    /// Called with every argument `None`, this still produces one event per
    /// subscriber — matching the source's behavior of generating a SPONT on
    /// every call to `set`, even a no-op one.
    pub fn set(
        &mut self,
        value: Option<PointValue>,
        flags: Option<Quality>,
        time: Option<Cp56Timestamp>,
    ) -> Vec<(ServerId, Event)> {
        if let Some(v) = value {
            self.value = Some(v);
        }
        if let Some(f) = flags {
            self.flags = Some(f);
        }
        if let Some(t) = time {
            self.time = Some(t);
        }

        let event = Event::from_point(self, Cot::Spontaneous);
        self.subscribers
            .iter()
            .map(|&sid| (sid, event.clone()))
            .collect()
    }
}

/// FIFO of pending spontaneous events for one server connection.
pub type EventQueue = VecDeque<Event>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_a_multiset() {
        let mut p = Point::new_single(1, false);
        let sid = ServerId::new(1);
        p.register(sid);
        p.register(sid);
        assert_eq!(p.subscribers(), &[sid, sid]);
        p.deregister(sid);
        assert!(p.subscribers().is_empty());
    }

    #[test]
    fn set_notifies_every_subscriber_once() {
        let mut p = Point::new_single(1, false);
        let a = ServerId::new(1);
        let b = ServerId::new(2);
        p.register(a);
        p.register(b);
        let events = p.set(Some(PointValue::Bool(true)), None, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, a);
        assert_eq!(events[1].0, b);
        assert_eq!(p.value, Some(PointValue::Bool(true)));
    }

    #[test]
    fn set_with_no_arguments_still_notifies() {
        let mut p = Point::new_single(1, false);
        let a = ServerId::new(1);
        p.register(a);
        let events = p.set(None, None, None);
        assert_eq!(events.len(), 1);
    }
}
