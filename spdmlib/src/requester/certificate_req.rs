// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CERTIFICATE / CERTIFICATE: retrieves one slot's full chain
//! across as many `offset`/`length` round trips as the responder's
//! `remainder_length` demands, checks it hashes to the digest GET_DIGESTS
//! already reported for that slot (when one was reported), and verifies
//! the chain itself via the crypto adapter before trusting it for
//! CHALLENGE/KEY_EXCHANGE signature checks.

use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_CERT_CHAIN_DATA_SIZE;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmCertificateResponsePayload, SpdmGetCertificateRequestPayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmCertChainBuffer, SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_certificate(&mut self, slot_id: u8) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::AfterDigests)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CERT_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CERT_CAP),
        )?;

        let mut chain = SpdmCertChainBuffer::default();
        let mut offset: u16 = 0;
        loop {
            let request = SpdmGetCertificateRequestPayload {
                slot_id,
                offset,
                length: crate::config::MAX_SPDM_CERT_CHAIN_BLOCK_LEN as u16,
            };
            let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmCertificateResponsePayload>(
                SpdmRequestResponseCode::SpdmRequestGetCertificate,
                &request,
                SpdmRequestResponseCode::SpdmResponseCertificate,
            )?;
            self.common.transcript.message_b.append(&request_bytes)?;
            self.common.transcript.message_b.append(&response_bytes)?;

            let portion = &response.cert_chain[..response.portion_length as usize];
            let used = chain.data_size as usize;
            if used + portion.len() > 4 + crate::protocol::SPDM_MAX_HASH_SIZE + MAX_SPDM_CERT_CHAIN_DATA_SIZE {
                return Err(SpdmStatus::BufferFull);
            }
            chain.data[used..used + portion.len()].copy_from_slice(portion);
            chain.data_size += portion.len() as u16;

            offset += response.portion_length;
            if response.remainder_length == 0 {
                break;
            }
        }

        let hash_size = self.common.negotiate_info.base_hash_sel.get_size() as usize;
        if let Some(expected) = self.common.peer_info.peer_cert_chain_digest[slot_id as usize] {
            let computed = crypto::hash::hash_all(self.common.negotiate_info.base_hash_sel, &chain.data[..chain.data_size as usize])?;
            if computed.as_ref() != expected.as_ref() {
                return Err(SpdmStatus::VerifyCertFail);
            }
        }
        crypto::cert_operation::verify_cert_chain(chain.cert_chain_der(hash_size))?;

        self.common.peer_info.peer_cert_chain[slot_id as usize] = Some(chain);
        self.common.connection_state = SpdmConnectionState::AfterCertificate;
        Ok(())
    }
}
