// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! PSK_FINISH / PSK_FINISH_RSP: closes out a session established by
//! PSK_EXCHANGE. Unlike FINISH, there is no optional signature and no
//! HANDSHAKE_IN_THE_CLEAR_CAP branch — the requester's `verify_data` is
//! the only proof either side needs, since PSK_EXCHANGE already
//! authenticated both ends via the shared key. The response carries no
//! verify_data of its own; a well-formed PSK_FINISH_RSP is itself the
//! responder's acknowledgement.

use crate::common::SpdmConnectionState;
use crate::common::transcript::combined_hash;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmPskFinishRequestPayload, SpdmPskFinishResponsePayload, SpdmRequestResponseCode};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_psk_finish(&mut self, session_id: u32) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;

        let message_a = self.common.transcript.message_a.clone();
        let hash_algo = self.common.negotiate_info.base_hash_sel;

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        if session.session_state() != SpdmSessionState::Handshaking {
            return Err(SpdmStatus::InvalidStateLocal);
        }
        let th = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        let verify_data = session.generate_hmac_with_request_finished_key(th.as_ref())?;

        let request = SpdmPskFinishRequestPayload { verify_data };
        let (_response, request_bytes, response_bytes) = self.send_receive_secured::<_, SpdmPskFinishResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestPskFinish,
            &request,
            SpdmRequestResponseCode::SpdmResponsePskFinishRsp,
        )?;

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        session.message_k.append(&request_bytes)?;
        session.message_k.append(&response_bytes)?;

        let th2 = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        session.generate_data_secret(&th2)?;
        session.set_session_state(SpdmSessionState::Established);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpdmStatus;
    use crate::testlib::new_test_requester_with_responses;
    use alloc::vec::Vec;

    #[test]
    fn requires_allocated_session() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        let result = requester.send_receive_spdm_psk_finish(0xdead_beef);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn requires_handshaking_session_state() {
        crate::testlib::register_crypto_once();
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        let session_id = 0x7u32;
        crate::testlib::establish_test_session(&mut requester, session_id);

        let result = requester.send_receive_spdm_psk_finish(session_id);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }
}
