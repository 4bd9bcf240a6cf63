//! Process-data simulator: a random-walk generator that mutates demo
//! points on a timer. Binary/demo-only scaffolding — the library's core
//! types never depend on this module.

#![cfg(feature = "sim")]

use crate::config::PointsConfig;
use crate::point::PointValue;
use crate::registry::PointRegistry;
use crate::time::Cp56Timestamp;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

enum Kind {
    Discrete,
    Measured,
}

struct Tracked {
    point: Rc<RefCell<crate::point::Point>>,
    kind: Kind,
    next_update: Instant,
}

/// Owns the demo point set and drives it forward on a fixed tick,
/// matching `server-async.py`'s `process()` coroutine (250ms tick,
/// per-point reschedule uniformly in `[min_update, max_update]`).
pub struct Generator {
    tracked: Vec<Tracked>,
    registry: PointRegistry,
    min_update: Duration,
    max_update: Duration,
    timezone_offset_secs: i64,
}

impl Generator {
    /// Build the demo point set from `config` and register every point
    /// with `registry`.
    pub fn new(config: &PointsConfig, registry: &PointRegistry) -> Self {
        let mut tracked = Vec::new();
        let now = Instant::now();

        for i in 0..config.measured_count {
            let ioa = config.measured_start + i;
            let point = registry.add(crate::point::Point::new_measured(ioa, i as f32));
            tracked.push(Tracked {
                point,
                kind: Kind::Measured,
                next_update: now,
            });
        }
        for i in 0..config.discrete_count {
            let ioa = config.discrete_start + i;
            let point = registry.add(crate::point::Point::new_single(ioa, true));
            tracked.push(Tracked {
                point,
                kind: Kind::Discrete,
                next_update: now,
            });
        }

        Self {
            tracked,
            registry: registry.clone(),
            min_update: Duration::from_secs_f64(config.min_update_secs),
            max_update: Duration::from_secs_f64(config.max_update_secs),
            timezone_offset_secs: config.timezone_offset_secs,
        }
    }

    /// Advance every point whose scheduled update instant has passed,
    /// routing the resulting spontaneous events to every subscribed
    /// connection's queue.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let mut rng = rand::thread_rng();
        let stamp = Cp56Timestamp::from_ms(
            (Cp56Timestamp::now().as_ms()) + self.timezone_offset_secs * 1000,
        );

        for entry in &mut self.tracked {
            if entry.next_update > now {
                continue;
            }
            let mut point = entry.point.borrow_mut();
            let events = match entry.kind {
                Kind::Discrete => {
                    let bit = rng.gen_bool(0.5);
                    point.set(Some(PointValue::Bool(bit)), None, Some(stamp))
                }
                Kind::Measured => {
                    let old = point.value.and_then(PointValue::as_f32).unwrap_or(0.0);
                    let next = old * 0.99 + gaussian(&mut rng, 0.0, 0.10);
                    point.set(Some(PointValue::Float(next)), None, Some(stamp))
                }
            };
            drop(point);
            self.registry.deliver(events);
            let jitter = rng.gen_range(self.min_update.as_secs_f64()..=self.max_update.as_secs_f64());
            entry.next_update = now + Duration::from_secs_f64(jitter);
        }
    }
}

/// Box-Muller transform — `rand` alone has no normal distribution, and
/// this is the only place one is needed.
fn gaussian(rng: &mut impl Rng, mu: f64, sigma: f64) -> f32 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (mu + sigma * z0) as f32
}
