//! Application Service Data Unit (ASDU) for IEC 60870-5-101.
//!
//! An ASDU is the user-data payload of a variable-length FT 1.2 frame. This
//! slave only ever produces ASDUs carrying exactly one information object
//! (`sq = 0, number = 1`) and only ever parses one inbound type (100).

use crate::info::Ioa;
use crate::types::{CaWidth, Cot, TypeId};

/// Variable structure qualifier: object count and the sequence flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vsq {
    /// If set, information objects share one base IOA and are contiguous.
    /// Always `false` in this slave — it never batches objects.
    pub sq: bool,
    /// Number of information objects (always 1 here).
    pub number: u8,
}

impl Vsq {
    pub fn as_raw(self) -> u8 {
        (self.number & 0x7f) | ((self.sq as u8) << 7)
    }
}

/// An Application Service Data Unit.
///
/// Outbound ASDUs are built directly as `Asdu::SinglePoint { .. }` /
/// `Asdu::MeasuredFloat { .. }` literals; inbound ASDUs decode through
/// [`Asdu::decode`], which only understands type 100 — anything else
/// becomes [`Asdu::Unknown`] so the dispatcher can still answer with
/// fcode 15 without having to fully understand the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Asdu {
    SinglePoint {
        cot: Cot,
        common_address: u16,
        ioa: Ioa,
        value: bool,
        quality: crate::types::Quality,
    },
    MeasuredFloat {
        cot: Cot,
        common_address: u16,
        ioa: Ioa,
        value: f32,
        quality: crate::types::Quality,
    },
    Interrogation {
        common_address: u16,
        qualifier: u8,
    },
    /// Anything this slave doesn't produce or consume.
    Unknown { type_id: u8 },
}

impl Asdu {
    pub fn type_id(&self) -> u8 {
        match self {
            Asdu::SinglePoint { .. } => TypeId::SinglePoint.as_raw(),
            Asdu::MeasuredFloat { .. } => TypeId::MeasuredFloat.as_raw(),
            Asdu::Interrogation { .. } => TypeId::Interrogation.as_raw(),
            Asdu::Unknown { type_id } => *type_id,
        }
    }

    /// Encode the ASDU body (type, VSQ, COT, CA, information object) — not
    /// including the surrounding FT 1.2 frame fields. `ca_width` picks
    /// between the one-byte default CommonAddress and the two-byte form.
    pub fn encode(&self, ca_width: CaWidth) -> Vec<u8> {
        let vsq = Vsq { sq: false, number: 1 }.as_raw();
        let mut out = Vec::with_capacity(13);
        match *self {
            Asdu::SinglePoint {
                cot,
                common_address,
                ioa,
                value,
                quality,
            } => {
                out.push(TypeId::SinglePoint.as_raw());
                out.push(vsq);
                out.push(cot.as_raw());
                push_ca(&mut out, common_address, ca_width);
                push_ioa(&mut out, ioa);
                out.push(crate::info::siq_byte(value, quality));
            }
            Asdu::MeasuredFloat {
                cot,
                common_address,
                ioa,
                value,
                quality,
            } => {
                out.push(TypeId::MeasuredFloat.as_raw());
                out.push(vsq);
                out.push(cot.as_raw());
                push_ca(&mut out, common_address, ca_width);
                push_ioa(&mut out, ioa);
                out.extend_from_slice(&value.to_le_bytes());
                out.push(quality.bits());
            }
            Asdu::Interrogation {
                common_address,
                qualifier,
            } => {
                out.push(TypeId::Interrogation.as_raw());
                out.push(vsq);
                out.push(6); // activation, the only COT used for inbound interrogation
                push_ca(&mut out, common_address, ca_width);
                push_ioa(&mut out, 0);
                out.push(qualifier);
            }
            Asdu::Unknown { type_id } => {
                out.push(type_id);
            }
        }
        out
    }

    /// Decode an ASDU body from fcode-3 user data. Only type 100 (general
    /// interrogation) is understood; anything else decodes to `Unknown` so
    /// the dispatcher can still reply with "service not implemented".
    pub fn decode(data: &[u8], ca_width: CaWidth) -> Option<Asdu> {
        if data.is_empty() {
            return None;
        }
        let type_id = data[0];
        if type_id != TypeId::Interrogation.as_raw() {
            return Some(Asdu::Unknown { type_id });
        }
        let ca_len = ca_width.octets();
        let ca_start = 3;
        let ioa_start = ca_start + ca_len;
        let qualifier_index = ioa_start + 3;
        if data.len() <= qualifier_index {
            return None;
        }
        let common_address = read_ca(&data[ca_start..ioa_start], ca_width);
        let qualifier = data[qualifier_index];
        Some(Asdu::Interrogation {
            common_address,
            qualifier,
        })
    }
}

fn push_ca(out: &mut Vec<u8>, ca: u16, width: CaWidth) {
    let bytes = ca.to_le_bytes();
    out.extend_from_slice(&bytes[..width.octets()]);
}

fn read_ca(bytes: &[u8], width: CaWidth) -> u16 {
    match width {
        CaWidth::One => bytes[0] as u16,
        CaWidth::Two => u16::from_le_bytes([bytes[0], bytes[1]]),
    }
}

fn push_ioa(out: &mut Vec<u8>, ioa: Ioa) {
    let bytes = ioa.to_le_bytes();
    out.extend_from_slice(&bytes[0..3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quality;

    #[test]
    fn single_point_encode_matches_interrogation_reply() {
        let asdu = Asdu::SinglePoint {
            cot: Cot::InterrogatedByStation,
            common_address: 1,
            ioa: 1,
            value: true,
            quality: Quality::GOOD,
        };
        let bytes = asdu.encode(CaWidth::One);
        assert_eq!(bytes, vec![1, 1, 20, 1, 1, 0, 0, 0x01]);
    }

    #[test]
    fn single_point_encode_with_two_byte_common_address() {
        let asdu = Asdu::SinglePoint {
            cot: Cot::InterrogatedByStation,
            common_address: 1,
            ioa: 1,
            value: true,
            quality: Quality::GOOD,
        };
        let bytes = asdu.encode(CaWidth::Two);
        assert_eq!(bytes, vec![1, 1, 20, 1, 0, 1, 0, 0, 0x01]);
    }

    #[test]
    fn measured_float_encode_matches_spontaneous_reply() {
        let asdu = Asdu::MeasuredFloat {
            cot: Cot::Spontaneous,
            common_address: 1,
            ioa: 1001,
            value: 1.0,
            quality: Quality::GOOD,
        };
        let bytes = asdu.encode(CaWidth::One);
        assert_eq!(&bytes[0..3], &[13, 1, 3]);
        assert_eq!(&bytes[4..7], &[0xe9, 0x03, 0x00]);
        assert_eq!(&bytes[7..11], &1.0f32.to_le_bytes());
        assert_eq!(bytes[11], 0x00);
    }

    #[test]
    fn decode_unknown_type() {
        let asdu = Asdu::decode(&[1, 1, 20, 1, 1, 0, 0, 0x01], CaWidth::One).unwrap();
        assert!(matches!(asdu, Asdu::Unknown { type_id: 1 }));
    }

    #[test]
    fn decode_interrogation() {
        let body = vec![100, 1, 6, 1, 0, 0, 0, 20];
        let asdu = Asdu::decode(&body, CaWidth::One).unwrap();
        assert!(matches!(
            asdu,
            Asdu::Interrogation {
                common_address: 1,
                qualifier: 20
            }
        ));
    }

    #[test]
    fn decode_interrogation_with_two_byte_common_address() {
        let body = vec![100, 1, 6, 1, 0, 0, 0, 0, 20];
        let asdu = Asdu::decode(&body, CaWidth::Two).unwrap();
        assert!(matches!(
            asdu,
            Asdu::Interrogation {
                common_address: 1,
                qualifier: 20
            }
        ));
    }

    #[test]
    fn decode_interrogation_rejects_short_body() {
        let body = vec![100, 1, 6, 1, 0, 0, 0];
        assert!(Asdu::decode(&body, CaWidth::One).is_none());
    }
}
