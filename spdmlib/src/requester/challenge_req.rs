// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! CHALLENGE / CHALLENGE_AUTH: proves the peer holds the private key
//! behind a certificate chain GET_CERTIFICATE already fetched and
//! verified. The response's signature covers every byte exchanged so
//! far (`message_a`/`message_b`) plus this exchange's own request and
//! response up to the signature field, so a successful verify here is
//! what actually authenticates the connection.

use crate::common::SpdmConnectionState;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmChallengeAuthResponsePayload, SpdmChallengeRequestPayload, SpdmMeasurementSummaryHashType, SpdmRequestResponseCode};
use crate::protocol::{SpdmNonceStruct, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_challenge(
        &mut self,
        slot_id: u8,
        measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    ) -> SpdmResult {
        let use_provisioned_key = slot_id == 0xFF;
        if !use_provisioned_key && slot_id as usize >= crate::config::MAX_SPDM_SLOT_NUMBER {
            return Err(SpdmStatus::InvalidMsgField);
        }
        if use_provisioned_key {
            self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
            if self.common.provision_info.local_public_key_provision.is_none() {
                return Err(SpdmStatus::InvalidMsgField);
            }
        } else {
            self.common.check_connection_state(SpdmConnectionState::AfterCertificate)?;
        }
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CHAL_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CHAL_CAP),
        )?;

        self.common.runtime_info.need_measurement_signature = measurement_summary_hash_type != SpdmMeasurementSummaryHashType::None;

        let mut nonce = SpdmNonceStruct::default();
        crypto::rand::get_random(&mut nonce.data)?;
        let request = SpdmChallengeRequestPayload {
            slot_id,
            measurement_summary_hash_type,
            nonce,
        };
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmChallengeAuthResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestChallenge,
            &request,
            SpdmRequestResponseCode::SpdmResponseChallengeAuth,
        )?;

        let signature_len = response.signature.as_ref().len();
        if response_bytes.len() < signature_len {
            return Err(SpdmStatus::InvalidMsgSize);
        }
        let signed_len = response_bytes.len() - signature_len;

        let hash_size = self.common.negotiate_info.base_hash_sel.get_size() as usize;
        // Slot 0xFF ("use provisioned raw public key, no chain") hashes and
        // signs against `local_public_key_provision` instead of a fetched
        // chain; no peer certificate is consulted on this path.
        let leaf_cert: alloc::vec::Vec<u8> = if use_provisioned_key {
            let key = self.common.provision_info.local_public_key_provision.ok_or(SpdmStatus::InvalidStateLocal)?;
            let expected_hash = crypto::hash::hash_all(self.common.negotiate_info.base_hash_sel, key.as_ref())?;
            if response.cert_chain_hash.as_ref() != expected_hash.as_ref() {
                return Err(SpdmStatus::VerifyCertFail);
            }
            key.as_ref().to_vec()
        } else {
            let chain = self.common.peer_info.peer_cert_chain[slot_id as usize].ok_or(SpdmStatus::InvalidStateLocal)?;
            let expected_hash = crypto::hash::hash_all(self.common.negotiate_info.base_hash_sel, &chain.data[..chain.data_size as usize])?;
            if response.cert_chain_hash.as_ref() != expected_hash.as_ref() {
                return Err(SpdmStatus::VerifyCertFail);
            }
            let (cert_offset, cert_len) = crypto::cert_operation::get_cert_from_cert_chain(chain.cert_chain_der(hash_size), -1)?;
            chain.cert_chain_der(hash_size)[cert_offset..cert_offset + cert_len].to_vec()
        };

        self.common.transcript.message_c.append(&request_bytes)?;
        self.common.transcript.message_c.append(&response_bytes[..signed_len])?;

        let transcript = [
            self.common.transcript.message_a.get(),
            self.common.transcript.message_b.get(),
            self.common.transcript.message_c.get(),
        ];
        let signed_data: alloc::vec::Vec<u8> = transcript
            .into_iter()
            .collect::<Option<alloc::vec::Vec<&[u8]>>>()
            .ok_or(SpdmStatus::CryptoError)?
            .concat();

        crypto::asym_verify::verify(
            self.common.negotiate_info.base_hash_sel,
            self.common.negotiate_info.base_asym_sel,
            &leaf_cert,
            &signed_data,
            &response.signature,
        )?;
        self.common.transcript.message_c.append(response.signature.as_ref())?;

        self.common.connection_state = SpdmConnectionState::Authenticated;
        Ok(())
    }
}
