//! Per-connection server state: the FT 1.2 link state plus this
//! connection's event queue, interrogation list, and background cursor.

use crate::event::EventQueue;
use crate::grinder::Grinder;
use crate::point::Point;
use crate::registry::{next_server_id, ServerId};
use crate::types::CaWidth;
use std::cell::RefCell;
use std::rc::Rc;

/// FT 1.2 unbalanced-link reset state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    NotReset,
    Reset,
}

/// Builder for a per-connection [`Server`].
pub struct ServerBuilder {
    asdu_addr: u16,
    link_address: u8,
    background: bool,
    grinder: Grinder,
    ca_width: CaWidth,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            asdu_addr: 1,
            link_address: 1,
            background: false,
            grinder: Grinder::disabled(),
            ca_width: CaWidth::default(),
        }
    }

    /// Common ASDU address used by short frames and every ASDU this server
    /// emits.
    pub fn asdu_addr(mut self, addr: u16) -> Self {
        self.asdu_addr = addr;
        self
    }

    /// Link-layer address used by variable-length frames. Independently
    /// configurable from `asdu_addr`.
    pub fn link_address(mut self, addr: u8) -> Self {
        self.link_address = addr;
        self
    }

    /// Enable the background-scan fallback when class-2 polls find no
    /// interrogation data pending.
    pub fn background(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    pub fn grinder(mut self, grinder: Grinder) -> Self {
        self.grinder = grinder;
        self
    }

    /// Width of the CommonAddress field carried by every outbound ASDU and
    /// expected on inbound ones. Defaults to the one-byte form.
    pub fn common_address_width(mut self, width: CaWidth) -> Self {
        self.ca_width = width;
        self
    }

    pub fn build(self) -> Server {
        Server {
            id: next_server_id(),
            asdu_addr: self.asdu_addr,
            link_address: self.link_address,
            state: LinkState::NotReset,
            fcb: false,
            dfc: false,
            event_queue: Rc::new(RefCell::new(EventQueue::new())),
            inrg_list: Vec::new(),
            bg_cursor: 0,
            points: Vec::new(),
            background: self.background,
            grinder: self.grinder,
            ca_width: self.ca_width,
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One connection's worth of protocol state.
///
/// `acd` is never stored — it's always recomputed from `event_queue`
/// non-emptiness at the moment a control byte is built.
pub struct Server {
    pub id: ServerId,
    pub asdu_addr: u16,
    pub link_address: u8,
    pub(crate) state: LinkState,
    pub(crate) fcb: bool,
    pub dfc: bool,
    pub(crate) event_queue: Rc<RefCell<EventQueue>>,
    pub(crate) inrg_list: Vec<Rc<RefCell<Point>>>,
    pub(crate) bg_cursor: usize,
    pub points: Vec<Rc<RefCell<Point>>>,
    pub background: bool,
    pub grinder: Grinder,
    pub ca_width: CaWidth,
}

impl Server {
    pub fn link_state(&self) -> LinkState {
        self.state
    }

    pub fn acd(&self) -> bool {
        !self.event_queue.borrow().is_empty()
    }

    /// Shared handle to this connection's event queue, registered with a
    /// [`crate::registry::PointRegistry`] so spontaneous events produced by
    /// [`crate::point::Point::set`] can be routed here by `ServerId`.
    pub fn event_queue_handle(&self) -> Rc<RefCell<EventQueue>> {
        self.event_queue.clone()
    }

    /// Advance the background-scan cursor and return the point it pointed
    /// at, wrapping around the attached point list. Mirrors
    /// `get_next_point`'s `last_point_get` cursor.
    pub(crate) fn next_background_point(&mut self) -> Vec<Rc<RefCell<Point>>> {
        if self.points.is_empty() {
            return Vec::new();
        }
        let point = self.points[self.bg_cursor].clone();
        self.bg_cursor = if self.bg_cursor + 1 < self.points.len() {
            self.bg_cursor + 1
        } else {
            0
        };
        vec![point]
    }

    /// Copy every attached point into `inrg_list` unless already present,
    /// preserving existing order (set-union semantics).
    pub(crate) fn start_interrogation(&mut self) {
        for point in &self.points {
            if !self.inrg_list.iter().any(|p| Rc::ptr_eq(p, point)) {
                self.inrg_list.push(point.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_original_constants() {
        let server = ServerBuilder::new().build();
        assert_eq!(server.asdu_addr, 1);
        assert_eq!(server.link_address, 1);
        assert!(!server.background);
        assert_eq!(server.link_state(), LinkState::NotReset);
    }

    #[test]
    fn acd_tracks_event_queue() {
        use crate::event::Event;
        use crate::types::{Cot, TypeId};
        let server = ServerBuilder::new().build();
        assert!(!server.acd());
        server.event_queue.borrow_mut().push_back(Event {
            ioa: 1,
            type_id: TypeId::SinglePoint,
            cot: Cot::Spontaneous,
            value: None,
            flags: None,
            time: None,
        });
        assert!(server.acd());
    }
}
