//! Common types and enums for IEC 60870-5-101.

use serde::Deserialize;

/// ASDU type identification.
///
/// Only the type identifiers this slave actually produces or consumes are
/// modeled; anything else decodes to [`crate::asdu::Asdu::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    /// Single-point information (M_SP_NA_1)
    SinglePoint = 1,
    /// Measured value, short floating point (M_ME_NC_1)
    MeasuredFloat = 13,
    /// Interrogation command (C_IC_NA_1)
    Interrogation = 100,
}

impl TypeId {
    /// Convert to the raw wire value.
    pub fn as_raw(self) -> u8 {
        self as u8
    }

    /// Try to create from a raw wire value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::SinglePoint),
            13 => Some(Self::MeasuredFloat),
            100 => Some(Self::Interrogation),
            _ => None,
        }
    }
}

// ============================================================================
// Cause of Transmission
// ============================================================================

/// Cause of transmission for ASDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cot {
    /// Background scan
    Background = 2,
    /// Spontaneous transmission
    Spontaneous = 3,
    /// Interrogated by station interrogation
    InterrogatedByStation = 20,
}

impl Cot {
    /// Convert to the raw wire value.
    pub fn as_raw(self) -> u8 {
        self as u8
    }

    /// Try to create from a raw wire value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            2 => Some(Self::Background),
            3 => Some(Self::Spontaneous),
            20 => Some(Self::InterrogatedByStation),
            _ => None,
        }
    }
}

// ============================================================================
// Quality Descriptor
// ============================================================================

bitflags::bitflags! {
    /// Quality descriptor flags shared by SIQ (single-point) and QDS
    /// (measured value) encodings.
    ///
    /// Bit 0 is reserved in both SIQ and QDS; for single-point information
    /// the dispatcher overwrites it with the point's boolean state when
    /// building the outbound SIQ byte (see [`crate::info::siq_byte`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Quality: u8 {
        /// Good quality (no flags set)
        const GOOD = 0;
        /// Overflow flag
        const OVERFLOW = 0x01;
        /// Reserved (bit 1)
        const RESERVED = 0x02;
        /// Blocked
        const BLOCKED = 0x10;
        /// Substituted
        const SUBSTITUTED = 0x20;
        /// Not topical
        const NOT_TOPICAL = 0x40;
        /// Invalid
        const INVALID = 0x80;
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::GOOD
    }
}

// ============================================================================
// Link-layer function codes
// ============================================================================

/// Link-layer function codes recognized by the slave, inbound (master to
/// slave) direction. Anything else is handled by the catch-all arms of
/// [`crate::link::LinkStateMachine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    /// Reset of remote link
    ResetLink = 0,
    /// User data, confirmed transmission
    UserDataConfirmed = 3,
    /// Request status of link
    RequestStatus = 9,
    /// Request class-2 data (swapped with 11 in this slave — see link.rs)
    RequestClass2 = 10,
    /// Request class-1 data (swapped with 10 in this slave — see link.rs)
    RequestClass1 = 11,
}

impl FunctionCode {
    /// Try to create from the low nibble of an inbound control byte.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::ResetLink),
            3 => Some(Self::UserDataConfirmed),
            9 => Some(Self::RequestStatus),
            10 => Some(Self::RequestClass2),
            11 => Some(Self::RequestClass1),
            _ => None,
        }
    }
}

/// Outbound link-layer function codes the slave ever sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutFunctionCode {
    /// ACK (confirmation / reset acknowledgement)
    Ack = 0,
    /// Respond with user data, confirmed expected
    UserData = 8,
    /// NACK (requested data not available)
    Nack = 9,
    /// Status of link
    StatusOfLink = 11,
    /// Service not implemented
    NotImplemented = 15,
}

impl OutFunctionCode {
    /// Raw wire value.
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

// ============================================================================
// CommonAddress width
// ============================================================================

/// Width in bytes of the CommonAddress field carried by every ASDU. The
/// default configuration uses one byte; a controlling station configured
/// for the extended form uses two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaWidth {
    #[default]
    One,
    Two,
}

impl CaWidth {
    pub fn octets(self) -> usize {
        match self {
            CaWidth::One => 1,
            CaWidth::Two => 2,
        }
    }
}
