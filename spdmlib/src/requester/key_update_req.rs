// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! KEY_UPDATE / KEY_UPDATE_ACK: rotates one direction's AEAD traffic
//! key without a full handshake. The requester rolls its own key
//! forward via `SpdmSession::update_key` *before* sending, so the
//! UPDATE_KEY request itself already travels under the new key; once
//! the responder's ack round trips, a second VERIFY_NEW_KEY exchange
//! confirms both sides derived the same key before the old epoch's
//! backup is dropped.

use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmKeyUpdateOperation, SpdmKeyUpdateRequestPayload, SpdmKeyUpdateResponsePayload, SpdmRequestResponseCode};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_key_update(&mut self, session_id: u32, update_request_direction: bool) -> SpdmResult {
        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        if session.session_state() != SpdmSessionState::Established {
            return Err(SpdmStatus::InvalidStateLocal);
        }
        session.update_key(update_request_direction)?;

        let mut tag_buf = [0u8; 1];
        crate::crypto::rand::get_random(&mut tag_buf)?;
        let operation = SpdmKeyUpdateOperation::SpdmUpdateSingleKey;
        let request = SpdmKeyUpdateRequestPayload {
            key_update_operation: operation,
            tag: tag_buf[0],
        };
        let (response, _, _) = self.send_receive_secured::<_, SpdmKeyUpdateResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestKeyUpdate,
            &request,
            SpdmRequestResponseCode::SpdmResponseKeyUpdateAck,
        )?;
        if response.key_update_operation != operation || response.tag != tag_buf[0] {
            return Err(SpdmStatus::UnexpectedResponse);
        }

        let mut verify_tag_buf = [0u8; 1];
        crate::crypto::rand::get_random(&mut verify_tag_buf)?;
        let verify_request = SpdmKeyUpdateRequestPayload {
            key_update_operation: SpdmKeyUpdateOperation::SpdmVerifyNewKey,
            tag: verify_tag_buf[0],
        };
        let (verify_response, _, _) = self.send_receive_secured::<_, SpdmKeyUpdateResponsePayload>(
            session_id,
            SpdmRequestResponseCode::SpdmRequestKeyUpdate,
            &verify_request,
            SpdmRequestResponseCode::SpdmResponseKeyUpdateAck,
        )?;
        if verify_response.key_update_operation != SpdmKeyUpdateOperation::SpdmVerifyNewKey || verify_response.tag != verify_tag_buf[0] {
            return Err(SpdmStatus::UnexpectedResponse);
        }

        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidStateLocal)?;
        session.confirm_key_update(update_request_direction);
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

    fn encode_key_update_ack_bytes(operation: SpdmKeyUpdateOperation, tag: u8) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseKeyUpdateAck,
        }
        .encode(&mut w);
        SpdmKeyUpdateResponsePayload {
            key_update_operation: operation,
            tag,
        }
        .spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn requires_established_session() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let result = requester.send_receive_spdm_key_update(0xdead_beef, true);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn mismatched_ack_tag_is_rejected() {
        let (mut requester, state) = new_test_requester_with_responses(Vec::new());
        let session_id = 0x9u32;
        establish_test_session(&mut requester, session_id);
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let wrong_ack = encode_key_update_ack_bytes(SpdmKeyUpdateOperation::SpdmUpdateSingleKey, 0xEE);
        let wire = crate::testlib::encode_secured_response(&mut requester, session_id, &wrong_ack);
        state.borrow_mut().responses.push_back(wire);

        let result = requester.send_receive_spdm_key_update(session_id, true);
        assert_eq!(result.err(), Some(SpdmStatus::UnexpectedResponse));
    }
}
