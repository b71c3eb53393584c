// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! END_SESSION / END_SESSION_ACK: tears down an established session.
//! Once the ack comes back, every secret for the session is zeroized
//! and its slot is returned to `NotStarted` whether or not the peer
//! was asked to preserve negotiated state for a later PSK resumption.

use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmEndSessionRequestPayload, SpdmEndSessionResponsePayload, SpdmRequestResponseCode};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_end_session(&mut self, session_id: u32, preserve_negotiated_state: bool) -> SpdmResult {
        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        if session.session_state() != SpdmSessionState::Established {
            return Err(SpdmStatus::InvalidStateLocal);
        }

        let request = SpdmEndSessionRequestPayload { preserve_negotiated_state };
        self.send_receive_secured::<_, SpdmEndSessionResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestEndSession,
            &request,
            SpdmRequestResponseCode::SpdmResponseEndSessionAck,
        )?;

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        session.teardown(session_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmCodec;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::SpdmVersion;
    use crate::testlib::{establish_test_session, new_test_requester_with_responses};
    use alloc::vec::Vec;
    use codec::{Codec, Writer};

    fn encode_end_session_ack_bytes() -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseEndSessionAck,
        }
        .encode(&mut w);
        SpdmEndSessionResponsePayload {}.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn requires_established_session() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let result = requester.send_receive_spdm_end_session(0xdead_beef, false);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn end_session_tears_down_the_session_slot() {
        let (mut requester, state) = new_test_requester_with_responses(Vec::new());
        let session_id = 0x77u32;
        establish_test_session(&mut requester, session_id);
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let app_bytes = encode_end_session_ack_bytes();
        let wire = crate::testlib::encode_secured_response(&mut requester, session_id, &app_bytes);
        state.borrow_mut().responses.push_back(wire);

        requester.send_receive_spdm_end_session(session_id, false).unwrap();
        assert!(requester.common.get_session_via_id(session_id).is_none());
    }
}
