// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! KEY_EXCHANGE / KEY_EXCHANGE_RSP: establishes a session via an
//! ephemeral Diffie-Hellman exchange. The 32-bit session id is
//! `(rsp_session_id << 16) | req_session_id`, half picked by each
//! side; the responder's `responder_verify_data` is an HMAC over
//! `message_a` plus this exchange's own bytes (everything but the
//! verify_data field), keyed by a `finished_key_rsp` derived from that
//! same hash (`TH1`) — mirroring how FINISH checks the handshake's
//! other half. A verified KEY_EXCHANGE_RSP leaves the session
//! `Handshaking` with its handshake keys active; FINISH still has to
//! run before application data can flow.

use crate::common::SpdmConnectionState;
use crate::common::transcript::combined_hash;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmKeyExchangeRequestPayload, SpdmKeyExchangeResponsePayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmNonceStruct, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_key_exchange(&mut self, slot_id: u8, measurement_summary_hash_type: u8) -> SpdmResult<u32> {
        self.common.check_connection_state(SpdmConnectionState::AfterCertificate)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::KEY_EX_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::KEY_EX_CAP),
        )?;

        let use_provisioned_key = slot_id == 0xFF;
        if !use_provisioned_key && slot_id as usize >= crate::config::MAX_SPDM_SLOT_NUMBER {
            return Err(SpdmStatus::InvalidMsgField);
        }

        self.common.runtime_info.need_measurement_signature = measurement_summary_hash_type != 0;

        let dhe_algo = self.common.negotiate_info.dhe_sel;
        let key_pair = crypto::dhe::generate_key_pair(dhe_algo)?;

        let mut req_session_id_buf = [0u8; 2];
        crypto::rand::get_random(&mut req_session_id_buf)?;
        let req_session_id = u16::from_le_bytes(req_session_id_buf);

        let mut nonce = SpdmNonceStruct::default();
        crypto::rand::get_random(&mut nonce.data)?;

        let mut request = SpdmKeyExchangeRequestPayload {
            measurement_summary_hash_type,
            slot_id,
            req_session_id,
            session_policy: 0,
            nonce,
            exchange_data_size: key_pair.public_key().len() as u16,
            ..Default::default()
        };
        request.exchange_data[..key_pair.public_key().len()].copy_from_slice(key_pair.public_key());

        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmKeyExchangeResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestKeyExchange,
            &request,
            SpdmRequestResponseCode::SpdmResponseKeyExchangeRsp,
        )?;

        // The leaf cert that authenticates the Responder in this exchange:
        // either the slot GET_CERTIFICATE already fetched and verified, or
        // (slot 0xFF) the raw key the Requester was provisioned with.
        let hash_size = self.common.negotiate_info.base_hash_sel.get_size() as usize;
        let leaf_cert: alloc::vec::Vec<u8> = if use_provisioned_key {
            let key = self.common.provision_info.local_public_key_provision.ok_or(SpdmStatus::InvalidStateLocal)?;
            key.as_ref().to_vec()
        } else {
            let chain = self.common.peer_info.peer_cert_chain[slot_id as usize].ok_or(SpdmStatus::InvalidStateLocal)?;
            let (cert_offset, cert_len) = crypto::cert_operation::get_cert_from_cert_chain(chain.cert_chain_der(hash_size), -1)?;
            chain.cert_chain_der(hash_size)[cert_offset..cert_offset + cert_len].to_vec()
        };

        let session_id = ((response.rsp_session_id as u32) << 16) | req_session_id as u32;
        let hash_algo = self.common.negotiate_info.base_hash_sel;
        let asym_algo = self.common.negotiate_info.base_asym_sel;
        let aead_algo = self.common.negotiate_info.aead_sel;
        let key_schedule_algo = self.common.negotiate_info.key_schedule_sel;
        let message_a = self.common.transcript.message_a.clone();

        let session = self.common.allocate_session(session_id)?;
        session.set_crypto_param(hash_algo, dhe_algo, aead_algo, key_schedule_algo);
        session.heartbeat_period = response.heartbeat_period;
        session.mut_auth_requested = response.mut_auth_requested != 0;

        let verify_data_len = response.responder_verify_data.as_ref().len();
        let signature_len = response.signature.as_ref().len();
        if response_bytes.len() < verify_data_len + signature_len {
            session.teardown(session_id)?;
            return Err(SpdmStatus::InvalidMsgSize);
        }
        let presig_len = response_bytes.len() - verify_data_len - signature_len;
        session.message_k.append(&request_bytes)?;
        session.message_k.append(&response_bytes[..presig_len])?;

        let presig_data: alloc::vec::Vec<u8> = [&message_a, &session.message_k]
            .into_iter()
            .map(|s| s.get())
            .collect::<Option<alloc::vec::Vec<&[u8]>>>()
            .ok_or(SpdmStatus::CryptoError)?
            .concat();
        if crypto::asym_verify::verify(hash_algo, asym_algo, &leaf_cert, &presig_data, &response.signature).is_err() {
            session.teardown(session_id)?;
            return Err(SpdmStatus::VerifyFail);
        }
        session.message_k.append(response.signature.as_ref())?;

        let shared_secret = key_pair.compute_shared(&response.exchange_data[..response.exchange_data_size as usize])?;
        let th1 = combined_hash(hash_algo, &[&message_a, &session.message_k])?;
        session.generate_handshake_secret(Some(&shared_secret), None, &th1)?;
        session.activate_handshake_keys()?;

        if session.verify_hmac_with_response_finished_key(th1.as_ref(), &response.responder_verify_data).is_err() {
            session.teardown(session_id)?;
            return Err(SpdmStatus::VerifyFail);
        }
        session.message_k.append(response.responder_verify_data.as_ref())?;

        Ok(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SpdmCodec, SpdmConnectionState};
    use crate::error::SpdmStatus;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::{SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags, SpdmVersion};
    use crate::testlib::new_test_requester_with_responses;
    use alloc::vec::Vec;
    use codec::{Codec, Writer};

    fn encode_key_exchange_response() -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        context.negotiate_info.dhe_sel = SpdmDheAlgo::SECP_256_R1;
        context.negotiate_info.base_asym_sel = SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256;
        context.runtime_info.need_measurement_signature = false;

        let mut payload = SpdmKeyExchangeResponsePayload {
            rsp_session_id: 0x1234,
            exchange_data_size: 64,
            ..Default::default()
        };
        payload.exchange_data[..64].copy_from_slice(&[9u8; 64]);
        payload.signature.data_size = 64;

        let mut buf = [0u8; 512];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseKeyExchangeRsp,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    fn with_key_ex_cap(requester: &mut RequesterContext<'static>) {
        requester.common.connection_state = SpdmConnectionState::AfterCertificate;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::KEY_EX_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::KEY_EX_CAP;
        requester.common.negotiate_info.dhe_sel = SpdmDheAlgo::SECP_256_R1;
        requester.common.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        requester.common.negotiate_info.base_asym_sel = SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;
    }

    #[test]
    fn requires_key_ex_cap() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::AfterCertificate;
        let result = requester.send_receive_spdm_key_exchange(0, 0);
        assert_eq!(result.err(), Some(SpdmStatus::UnsupportedCap));
    }

    #[test]
    fn oversized_slot_is_rejected_locally_without_touching_wire() {
        crate::testlib::register_crypto_once();
        let (mut requester, state) = new_test_requester_with_responses(Vec::new());
        with_key_ex_cap(&mut requester);

        let result = requester.send_receive_spdm_key_exchange(crate::config::MAX_SPDM_SLOT_NUMBER as u8, 0);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidMsgField));
        assert!(state.borrow().sent.is_empty());
    }

    #[test]
    fn missing_peer_certificate_chain_is_rejected_before_activating_keys() {
        crate::testlib::register_crypto_once();
        let response = encode_key_exchange_response();
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        with_key_ex_cap(&mut requester);

        let result = requester.send_receive_spdm_key_exchange(0, 0);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn malformed_peer_certificate_chain_is_rejected_before_activating_keys() {
        crate::testlib::register_crypto_once();
        let response = encode_key_exchange_response();
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        with_key_ex_cap(&mut requester);
        let mut chain = crate::protocol::SpdmCertChainBuffer::default();
        chain.data_size = 4 + 32 + 10; // header + a body that isn't a DER SEQUENCE
        requester.common.peer_info.peer_cert_chain[0] = Some(chain);

        let result = requester.send_receive_spdm_key_exchange(0, 0);
        assert_eq!(result.err(), Some(SpdmStatus::InvalidMsgField));
        assert!(requester.common.session.iter().all(|s| s.session_state() == crate::session::SpdmSessionState::NotStarted));
    }
}
