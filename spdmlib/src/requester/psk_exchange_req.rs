// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! PSK_EXCHANGE / PSK_EXCHANGE_RSP: establishes a session from a
//! pre-shared key instead of an ephemeral DHE exchange. No certificate
//! chain is involved, so this only needs the connection's algorithm
//! negotiation to be done, not a verified certificate — the minimum
//! state is `Negotiated`, one step short of what KEY_EXCHANGE requires.
//! The handshake secret is derived straight from the PSK rather than a
//! computed shared secret; everything past that (verifying the
//! responder's HMAC, activating handshake keys) mirrors KEY_EXCHANGE.

use crate::common::SpdmConnectionState;
use crate::common::transcript::combined_hash;
use crate::config::MAX_SPDM_PSK_CONTEXT_SIZE;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmPskExchangeRequestPayload, SpdmPskExchangeResponsePayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_psk_exchange(&mut self, measurement_summary_hash_type: u8) -> SpdmResult<u32> {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::PSK_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::PSK_CAP),
        )?;

        let psk_hint = self.common.provision_info.psk_hint.ok_or(SpdmStatus::InvalidStateLocal)?;
        self.common.runtime_info.need_measurement_signature = measurement_summary_hash_type != 0;

        let mut req_session_id_buf = [0u8; 2];
        crypto::rand::get_random(&mut req_session_id_buf)?;
        let req_session_id = u16::from_le_bytes(req_session_id_buf);

        let mut psk_context = [0u8; MAX_SPDM_PSK_CONTEXT_SIZE];
        let hash_size = self.common.negotiate_info.base_hash_sel.get_size() as usize;
        crypto::rand::get_random(&mut psk_context[..hash_size])?;

        let request = SpdmPskExchangeRequestPayload {
            measurement_summary_hash_type,
            req_session_id,
            psk_hint_size: psk_hint.data_size,
            psk_hint: psk_hint.data,
            psk_context_size: hash_size as u16,
            psk_context,
            ..Default::default()
        };

        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmPskExchangeResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestPskExchange,
            &request,
            SpdmRequestResponseCode::SpdmResponsePskExchangeRsp,
        )?;

        let session_id = ((response.rsp_session_id as u32) << 16) | req_session_id as u32;
        let hash_algo = self.common.negotiate_info.base_hash_sel;
        let dhe_algo = self.common.negotiate_info.dhe_sel;
        let aead_algo = self.common.negotiate_info.aead_sel;
        let key_schedule_algo = self.common.negotiate_info.key_schedule_sel;
        let message_a = self.common.transcript.message_a.clone();

        let session = self.common.allocate_session(session_id)?;
        session.set_crypto_param(hash_algo, dhe_algo, aead_algo, key_schedule_algo);
        session.heartbeat_period = response.heartbeat_period;

        let verify_data_len = response.responder_verify_data.as_ref().len();
        if response_bytes.len() < verify_data_len {
            return Err(SpdmStatus::InvalidMsgSize);
        }
        let signed_len = response_bytes.len() - verify_data_len;
        session.message_k.append(&request_bytes)?;
        session.message_k.append(&response_bytes[..signed_len])?;

        let th1 = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        session.generate_handshake_secret(None, Some(&psk_hint.data[..psk_hint.data_size as usize]), &th1)?;
        session.activate_handshake_keys()?;

        if session.verify_hmac_with_response_finished_key(th1.as_ref(), &response.responder_verify_data).is_err() {
            session.teardown(session_id)?;
            return Err(SpdmStatus::VerifyFail);
        }
        session.message_k.append(response.responder_verify_data.as_ref())?;

        Ok(session_id)
    }
}
