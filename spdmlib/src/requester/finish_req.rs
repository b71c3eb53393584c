// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! FINISH / FINISH_RSP: closes out the handshake phase of a session
//! established by KEY_EXCHANGE. The request's `verify_data` is an HMAC
//! over `message_a` plus the session's accumulated `message_k` plus
//! this request's own bytes (everything but `verify_data` itself),
//! keyed by `finished_key_req`; the response's `verify_data` is
//! checked the same way against `finished_key_rsp` unless
//! HANDSHAKE_IN_THE_CLEAR_CAP was negotiated, in which case the
//! responder sends no `verify_data` at all. Either way, a successful
//! FINISH derives the data-phase secrets and moves the session to
//! `Established`.

use crate::common::SpdmConnectionState;
use crate::common::transcript::combined_hash;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmFinishRequestPayload, SpdmFinishResponsePayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmDigestStruct, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_finish(&mut self, session_id: u32) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::AfterCertificate)?;

        let message_a = self.common.transcript.message_a.clone();
        let hash_algo = self.common.negotiate_info.base_hash_sel;
        let in_clear_text = self
            .common
            .negotiate_info
            .req_capabilities_sel
            .contains(SpdmRequestCapabilityFlags::HANDSHAKE_IN_THE_CLEAR_CAP)
            && self
                .common
                .negotiate_info
                .rsp_capabilities_sel
                .contains(SpdmResponseCapabilityFlags::HANDSHAKE_IN_THE_CLEAR_CAP);

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        let th = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        let verify_data = session.generate_hmac_with_request_finished_key(th.as_ref())?;

        let request = SpdmFinishRequestPayload {
            signature_included: false,
            req_slot_id: 0,
            signature: crate::protocol::SpdmSignatureStruct::default(),
            verify_data,
        };
        let (response, request_bytes, response_bytes) = self.send_receive_secured::<_, SpdmFinishResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestFinish,
            &request,
            SpdmRequestResponseCode::SpdmResponseFinishRsp,
        )?;

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        session.message_k.append(&request_bytes)?;

        if in_clear_text {
            // Responder omits verify_data on FINISH_RSP once both sides
            // negotiated HANDSHAKE_IN_THE_CLEAR_CAP.
            session.message_k.append(&response_bytes)?;
        } else {
            let expected = response.verify_data.ok_or(SpdmStatus::InvalidMsgField)?;
            let verify_data_len = expected.as_ref().len();
            let signed_len = response_bytes.len() - verify_data_len;
            session.message_k.append(&response_bytes[..signed_len])?;
            let th = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
            if session.verify_hmac_with_response_finished_key(th.as_ref(), &expected).is_err() {
                session.teardown(session_id)?;
                return Err(SpdmStatus::VerifyFail);
            }
            session.message_k.append(expected.as_ref())?;
        }

        let th2 = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        session.generate_data_secret(&th2)?;
        session.set_session_state(SpdmSessionState::Established);
        Ok(())
    }
}
