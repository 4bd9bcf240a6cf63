//! Maps an [`EventPack`] to a well-formed FT 1.2 response frame, and
//! computes the link-layer control byte.

use crate::asdu::Asdu;
use crate::codec::Frame;
use crate::event::EventPack;
use crate::point::PointValue;
use crate::types::{Cot, OutFunctionCode, Quality, TypeId};

/// Control byte for every outbound frame: bit 0 = `dfc`, bit 1 = `acd`
/// (class-1 data pending).
pub fn control_byte(dfc: bool, acd: bool) -> u8 {
    (dfc as u8) | ((acd as u8) << 1)
}

/// Build the "no data available" short frame (link fcode 9).
pub fn no_data_frame(control: u8, address: u8) -> Frame {
    Frame::Fixed {
        control: control | (OutFunctionCode::Nack.as_raw()),
        address,
    }
}

/// Build a response frame from an [`EventPack`].
///
/// An empty pack always produces the "data unavailable" short frame,
/// regardless of why it's empty (missing fields, empty queue, or a point
/// type this core doesn't know how to encode).
pub fn build_response(
    pack: &EventPack,
    control: u8,
    asdu_addr: u16,
    link_address: u8,
) -> Frame {
    if pack.is_empty() {
        return no_data_frame(control, asdu_addr as u8);
    }
    let event = &pack.events[0];
    let cot = pack.cot.unwrap_or(Cot::Spontaneous);
    let asdu = match (event.type_id, event.value, event.flags) {
        (TypeId::SinglePoint, Some(PointValue::Bool(value)), Some(quality)) => Asdu::SinglePoint {
            cot,
            common_address: asdu_addr,
            ioa: event.ioa,
            value,
            quality,
        },
        (TypeId::MeasuredFloat, Some(PointValue::Float(value)), Some(quality)) => {
            Asdu::MeasuredFloat {
                cot,
                common_address: asdu_addr,
                ioa: event.ioa,
                value,
                quality: quality_for_measured(quality),
            }
        }
        _ => return no_data_frame(control, asdu_addr as u8),
    };
    Frame::Variable {
        control: control | OutFunctionCode::UserData.as_raw(),
        address: link_address,
        asdu,
    }
}

/// QDS quality has no reserved low bit the way SIQ does; flags are used
/// verbatim.
fn quality_for_measured(flags: Quality) -> Quality {
    flags
}

/// Service-not-implemented short frame, used when fcode-3 user data
/// carries an ASDU type other than 100.
pub fn not_implemented_frame(control: u8, address: u8) -> Frame {
    Frame::Fixed {
        control: control | OutFunctionCode::NotImplemented.as_raw(),
        address,
    }
}

/// ACK frame for reset-of-link and for a successfully processed
/// interrogation command.
pub fn ack_frame(control: u8, address: u8) -> Frame {
    Frame::Fixed {
        control: control | OutFunctionCode::Ack.as_raw(),
        address,
    }
}

/// Status-of-link frame, sent in answer to fcode 9 regardless of reset
/// state.
pub fn status_of_link_frame(control: u8, address: u8) -> Frame {
    Frame::Fixed {
        control: control | OutFunctionCode::StatusOfLink.as_raw(),
        address,
    }
}
