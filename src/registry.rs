//! Shared, cross-connection point set and per-connection attachment.

use crate::event::Event;
use crate::point::{EventQueue, Point};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle identifying one server connection as a point subscriber.
///
/// Points hold only this handle, never a reference to the server itself —
/// avoiding the ownership cycle a back-reference would create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId(u64);

impl ServerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

static NEXT_SERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh, process-unique `ServerId`.
pub fn next_server_id() -> ServerId {
    ServerId(NEXT_SERVER_ID.fetch_add(1, Ordering::Relaxed))
}

/// The process-wide point set, shared by every connection's `Server`.
///
/// Backed by `Rc<RefCell<_>>`, not `Arc<Mutex<_>>` — the crate runs on a
/// single-threaded `tokio` executor, so the extra atomics would
/// misrepresent the concurrency model rather than protect anything.
#[derive(Default, Clone)]
pub struct PointRegistry {
    points: Rc<RefCell<Vec<Rc<RefCell<Point>>>>>,
    queues: Rc<RefCell<HashMap<ServerId, Rc<RefCell<EventQueue>>>>>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's event queue so [`PointRegistry::deliver`] can
    /// route it spontaneous events. Mirrors the per-server registration a
    /// connection performs on accept.
    pub fn register_server(&self, id: ServerId, queue: Rc<RefCell<EventQueue>>) {
        self.queues.borrow_mut().insert(id, queue);
    }

    /// Drop a connection's queue, e.g. on disconnect.
    pub fn unregister_server(&self, id: ServerId) {
        self.queues.borrow_mut().remove(&id);
    }

    /// Route each `(ServerId, Event)` pair produced by [`Point::set`] into
    /// its subscriber's queue, if that server is still registered. Events
    /// for a server that has since disconnected are silently dropped.
    pub fn deliver(&self, events: Vec<(ServerId, Event)>) {
        let queues = self.queues.borrow();
        for (id, event) in events {
            if let Some(queue) = queues.get(&id) {
                queue.borrow_mut().push_back(event);
            }
        }
    }

    pub fn add(&self, point: Point) -> Rc<RefCell<Point>> {
        let handle = Rc::new(RefCell::new(point));
        self.points.borrow_mut().push(handle.clone());
        handle
    }

    /// Snapshot of every point currently registered, in insertion order.
    pub fn all(&self) -> Vec<Rc<RefCell<Point>>> {
        self.points.borrow().clone()
    }

    /// Attach every currently-registered point to `server_id`, returning
    /// the attached handles. Mirrors `server-async.py`'s loop over
    /// `set_of_points` calling `add_point` for each newly accepted
    /// connection.
    pub fn attach_all(&self, server_id: ServerId) -> Vec<Rc<RefCell<Point>>> {
        let points = self.all();
        for p in &points {
            p.borrow_mut().register(server_id);
        }
        points
    }

    /// Deregister `server_id` from every point it was attached to.
    pub fn detach_all(&self, server_id: ServerId, attached: &[Rc<RefCell<Point>>]) {
        for p in attached {
            p.borrow_mut().deregister(server_id);
        }
    }

    pub fn len(&self) -> usize {
        self.points.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
