//! Fault-injection postprocess hook ("grinder"), applied to outgoing
//! frame bytes by [`crate::driver::ConnectionDriver`].

use rand::Rng;

/// Corrupts outbound bytes for robustness testing. A disabled grinder is
/// the identity function, leaving frames byte-for-byte unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Grinder {
    pub enabled: bool,
    /// `1 / (probability + 1)` chance of corrupting a given frame, matching
    /// the original's `random.randint(0, PROBABILITY) == 0` gate.
    pub probability: u8,
}

impl Grinder {
    pub fn new(enabled: bool, probability: u8) -> Self {
        Self {
            enabled,
            probability,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, 16)
    }

    /// Apply fault injection to `data`, returning the (possibly mutated)
    /// bytes.
    pub fn apply(&self, data: Vec<u8>) -> Vec<u8> {
        if !self.enabled {
            return data;
        }
        let mut rng = rand::thread_rng();
        match rng.gen_range(0..=self.probability) {
            0 => insert_random_bytes(data, &mut rng),
            1 => delete_random_range(data, &mut rng),
            2 => flip_random_byte(data, &mut rng),
            _ => data,
        }
    }
}

fn insert_random_bytes(data: Vec<u8>, rng: &mut impl Rng) -> Vec<u8> {
    let mut array = data;
    let ins_point = rng.gen_range(0..=array.len());
    let count = rng.gen_range(0..=32usize);
    let junk: Vec<u8> = (0..count).map(|_| rng.gen()).collect();
    array.splice(ins_point..ins_point, junk);
    array
}

fn delete_random_range(data: Vec<u8>, rng: &mut impl Rng) -> Vec<u8> {
    let mut array = data;
    if array.is_empty() {
        return array;
    }
    let start = rng.gen_range(0..=array.len());
    let end = rng.gen_range(start..=array.len());
    array.drain(start..end);
    array
}

fn flip_random_byte(data: Vec<u8>, rng: &mut impl Rng) -> Vec<u8> {
    let mut array = data;
    if array.is_empty() {
        return array;
    }
    let idx = rng.gen_range(0..array.len());
    array[idx] = rng.gen();
    array
}
