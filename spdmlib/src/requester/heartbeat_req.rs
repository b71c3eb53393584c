// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! HEARTBEAT: a no-op secured round trip that resets both sides'
//! session-liveness timer. Carries nothing beyond the opcode itself and
//! touches no transcript, since it isn't covered by any signature or
//! HMAC in the protocol.

use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmHeartbeatRequestPayload, SpdmHeartbeatResponsePayload, SpdmRequestResponseCode};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_heartbeat(&mut self, session_id: u32) -> SpdmResult {
        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        if session.session_state() != SpdmSessionState::Established {
            return Err(SpdmStatus::InvalidStateLocal);
        }

        let request = SpdmHeartbeatRequestPayload {};
        self.send_receive_secured::<_, SpdmHeartbeatResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestHeartbeat,
            &request,
            SpdmRequestResponseCode::SpdmResponseHeartbeatAck,
        )?;
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

    fn encode_heartbeat_ack_bytes() -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseHeartbeatAck,
        }
        .encode(&mut w);
        SpdmHeartbeatResponsePayload {}.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn requires_established_session() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let result = requester.send_receive_spdm_heartbeat(0xdead_beef);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn heartbeat_round_trip_succeeds_on_established_session() {
        let (mut requester, state) = new_test_requester_with_responses(Vec::new());
        let session_id = 0x42u32;
        establish_test_session(&mut requester, session_id);
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let app_bytes = encode_heartbeat_ack_bytes();
        let wire = crate::testlib::encode_secured_response(&mut requester, session_id, &app_bytes);
        state.borrow_mut().responses.push_back(wire);

        requester.send_receive_spdm_heartbeat(session_id).unwrap();
    }
}
