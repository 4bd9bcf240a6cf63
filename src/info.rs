//! Information object payloads for IEC 60870-5-101.
//!
//! Information objects carry the actual data values inside an ASDU. Only
//! the two kinds this slave produces are modeled.

use crate::types::Quality;

/// Information object address (IOA). Encoded on the wire as 3 bytes,
/// little-endian.
pub type Ioa = u32;

/// Compute an SIQ byte from a boolean state and quality flags.
///
/// `(flags & !1) | (1 if value else 0)` — bit 0 is reserved in [`Quality`]
/// and is always overwritten here, never read from `flags`.
pub fn siq_byte(value: bool, flags: Quality) -> u8 {
    (flags.bits() & !1) | (value as u8)
}
