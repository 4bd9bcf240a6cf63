//! FT 1.2 unbalanced link-layer state machine.
//!
//! This is the one piece of the protocol with a documented, intentional
//! quirk: the original Python slave swaps the conventional priority of
//! function codes 10 and 11. Both polls consult the same three sources —
//! the spontaneous-event queue, the interrogation list, and the background
//! scan — but a standards-compliant unbalanced slave would have fcode 10
//! (class 2) check background/cyclic data first and fcode 11 (class 1)
//! check events first. The source instead has fcode 10 check the event
//! queue first, falling back to interrogation then background, while
//! fcode 11 checks interrogation/background first, falling back to events.
//! This behavior is preserved rather than silently corrected, so
//! [`Priority`] is named after what each poll actually prefers, not the
//! class number a compliant implementation would assign it.

use crate::asdu::Asdu;
use crate::codec::Frame;
use crate::dispatcher;
use crate::event::EventPack;
use crate::server::{LinkState, Server};
use crate::time::Cp56Timestamp;
use crate::types::{Cot, FunctionCode};

/// Which data source a class poll consults first; the other two are tried,
/// in a fixed order, only if the first is unavailable.
enum Priority {
    /// fcode 10: event queue, then interrogation list, then background.
    EventsFirst,
    /// fcode 11: interrogation list, then background, then event queue.
    InrgOrBackgroundFirst,
}

impl Server {
    /// Feed one parsed inbound frame through the link state machine,
    /// returning the frame to send back, or `None` to silently drop.
    pub fn step(&mut self, frame: Frame) -> Option<Frame> {
        match frame {
            Frame::SingleChar => None,
            Frame::Fixed { control, .. } => self.step_control(control & 0x0f, None),
            Frame::Variable { control, asdu, .. } => self.step_control(control & 0x0f, Some(asdu)),
        }
    }

    fn control_byte(&self) -> u8 {
        dispatcher::control_byte(self.dfc, self.acd())
    }

    fn step_control(&mut self, fcode: u8, asdu: Option<Asdu>) -> Option<Frame> {
        let fcode = FunctionCode::from_raw(fcode);
        match self.state {
            LinkState::NotReset => self.when_not_reset(fcode),
            LinkState::Reset => self.when_reset(fcode, asdu),
        }
    }

    fn reset_link(&mut self) -> Frame {
        log::debug!("connection {:?}: link reset", self.id);
        self.state = LinkState::Reset;
        self.fcb = false;
        dispatcher::ack_frame(self.control_byte(), self.asdu_addr as u8)
    }

    fn when_not_reset(&mut self, fcode: Option<FunctionCode>) -> Option<Frame> {
        match fcode {
            Some(FunctionCode::ResetLink) => Some(self.reset_link()),
            Some(FunctionCode::RequestStatus) => {
                Some(dispatcher::status_of_link_frame(self.control_byte(), self.asdu_addr as u8))
            }
            _ => None,
        }
    }

    fn when_reset(&mut self, fcode: Option<FunctionCode>, asdu: Option<Asdu>) -> Option<Frame> {
        match fcode {
            Some(FunctionCode::ResetLink) => Some(self.reset_link()),
            Some(FunctionCode::UserDataConfirmed) => Some(self.user_data(asdu)),
            Some(FunctionCode::RequestStatus) => {
                Some(dispatcher::status_of_link_frame(self.control_byte(), self.asdu_addr as u8))
            }
            // Swapped: prioritizes the event queue, which a compliant slave
            // would do on fcode 11 (class 1) rather than fcode 10 (class 2).
            Some(FunctionCode::RequestClass2) => Some(self.poll(Priority::EventsFirst)),
            // Swapped: prioritizes interrogation/background, which a
            // compliant slave would do on fcode 10 (class 2) rather than
            // fcode 11 (class 1).
            Some(FunctionCode::RequestClass1) => Some(self.poll(Priority::InrgOrBackgroundFirst)),
            _ => Some(Frame::SingleChar),
        }
    }

    fn user_data(&mut self, asdu: Option<Asdu>) -> Frame {
        match asdu {
            Some(Asdu::Interrogation { .. }) => {
                self.start_interrogation();
                dispatcher::ack_frame(self.control_byte(), self.asdu_addr as u8)
            }
            _ => dispatcher::not_implemented_frame(self.control_byte(), self.asdu_addr as u8),
        }
    }

    /// Both class polls consult the same three data sources — the
    /// spontaneous-event queue, the interrogation list, and the background
    /// scan — only in opposite priority order.
    fn poll(&mut self, priority: Priority) -> Frame {
        match priority {
            Priority::EventsFirst => {
                if !self.event_queue.borrow().is_empty() {
                    return self.respond_from_queue();
                }
                if !self.inrg_list.is_empty() {
                    return self.respond_from_inrg();
                }
                if self.background {
                    return self.respond_from_background();
                }
            }
            Priority::InrgOrBackgroundFirst => {
                if !self.inrg_list.is_empty() {
                    return self.respond_from_inrg();
                }
                if self.background {
                    return self.respond_from_background();
                }
                if !self.event_queue.borrow().is_empty() {
                    return self.respond_from_queue();
                }
            }
        }
        dispatcher::no_data_frame(self.control_byte(), self.asdu_addr as u8)
    }

    fn respond_from_queue(&mut self) -> Frame {
        let pack = EventPack::from_queue(&mut self.event_queue.borrow_mut());
        dispatcher::build_response(&pack, self.control_byte(), self.asdu_addr, self.link_address)
    }

    fn respond_from_inrg(&mut self) -> Frame {
        let mut inrg_list = std::mem::take(&mut self.inrg_list);
        let pack = EventPack::from_points(&mut inrg_list, Cot::InterrogatedByStation, Cp56Timestamp::now());
        self.inrg_list = inrg_list;
        dispatcher::build_response(&pack, self.control_byte(), self.asdu_addr, self.link_address)
    }

    fn respond_from_background(&mut self) -> Frame {
        let mut next = self.next_background_point();
        let pack = EventPack::from_points(&mut next, Cot::Background, Cp56Timestamp::now());
        dispatcher::build_response(&pack, self.control_byte(), self.asdu_addr, self.link_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use crate::server::ServerBuilder;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn frame_fixed(fcode: u8, address: u8) -> Frame {
        Frame::Fixed {
            control: 0x40 | fcode,
            address,
        }
    }

    #[test]
    fn reset_of_link_from_not_reset() {
        let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
        let reply = server.step(frame_fixed(0, 1)).unwrap();
        assert_eq!(
            reply,
            Frame::Fixed {
                control: 0,
                address: 1
            }
        );
        assert_eq!(server.link_state(), LinkState::Reset);
        assert!(!server.fcb);
    }

    #[test]
    fn status_request_any_state() {
        let mut server = ServerBuilder::new().build();
        let reply = server.step(frame_fixed(9, 1)).unwrap();
        assert_eq!(reply, Frame::Fixed { control: 11, address: 1 });
        assert_eq!(server.link_state(), LinkState::NotReset);
    }

    #[test]
    fn class2_poll_empty_in_reset() {
        let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
        server.step(frame_fixed(0, 1));
        let reply = server.step(frame_fixed(10, 1)).unwrap();
        assert_eq!(reply, Frame::Fixed { control: 9, address: 1 });
    }

    #[test]
    fn interrogation_then_class2_poll() {
        let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
        server.step(frame_fixed(0, 1));
        let point = Rc::new(RefCell::new(Point::new_single(1, true)));
        point.borrow_mut().register(server.id);
        server.points.push(point);

        let interrogation = Asdu::Interrogation {
            common_address: 1,
            qualifier: 20,
        };
        let frame = Frame::Variable {
            control: 0x43, // PRM=1, fcode=3 (user data, confirmed)
            address: 1,
            asdu: interrogation,
        };
        let ack = server.step(frame).unwrap();
        assert!(matches!(ack, Frame::Fixed { .. }));

        // fcode 10: no queued events, so the interrogation list (non-empty
        // after the command above) is served instead via the fallback chain.
        let reply = server.step(frame_fixed(10, 1)).unwrap();
        match reply {
            Frame::Variable { asdu, .. } => {
                let bytes = asdu.encode(crate::types::CaWidth::One);
                assert_eq!(&bytes, &[1, 1, 20, 1, 1, 0, 0, 0x01]);
            }
            _ => panic!("expected variable frame"),
        }
    }

    #[test]
    fn fcode11_prefers_interrogation_over_queued_events() {
        let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
        server.step(frame_fixed(0, 1));
        let point = Rc::new(RefCell::new(Point::new_single(1, true)));
        point.borrow_mut().register(server.id);
        server.points.push(point.clone());
        server.inrg_list.push(point.clone());
        server.event_queue.borrow_mut().push_back(crate::event::Event::from_point(
            &point.borrow(),
            crate::types::Cot::Spontaneous,
        ));

        let reply = server.step(frame_fixed(11, 1)).unwrap();
        match reply {
            Frame::Variable { asdu, .. } => {
                assert_eq!(asdu.type_id(), crate::types::TypeId::SinglePoint.as_raw());
            }
            _ => panic!("expected variable frame"),
        }
        // the interrogation list was drained, the spontaneous event was not
        assert!(server.inrg_list.is_empty());
        assert_eq!(server.event_queue.borrow().len(), 1);
    }

    #[test]
    fn fcode10_prefers_queued_events_over_interrogation() {
        let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
        server.step(frame_fixed(0, 1));
        let point = Rc::new(RefCell::new(Point::new_single(1, true)));
        point.borrow_mut().register(server.id);
        server.inrg_list.push(point.clone());
        server.event_queue.borrow_mut().push_back(crate::event::Event::from_point(
            &point.borrow(),
            crate::types::Cot::Spontaneous,
        ));

        server.step(frame_fixed(10, 1)).unwrap();
        // the queued event was drained first, the interrogation list
        // untouched
        assert!(server.event_queue.borrow().is_empty());
        assert_eq!(server.inrg_list.len(), 1);
    }

    #[test]
    fn unknown_fcode_in_reset_replies_single_char() {
        let mut server = ServerBuilder::new().build();
        server.step(frame_fixed(0, 1));
        let reply = server.step(frame_fixed(7, 1)).unwrap();
        assert_eq!(reply, Frame::SingleChar);
    }

    #[test]
    fn unknown_fcode_in_not_reset_is_silently_dropped() {
        let mut server = ServerBuilder::new().build();
        assert!(server.step(frame_fixed(7, 1)).is_none());
    }
}
