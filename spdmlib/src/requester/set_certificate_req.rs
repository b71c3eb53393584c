// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! SET_CERTIFICATE / SET_CERTIFICATE_RSP: provisions a certificate
//! chain into one of the peer's slots, typically following GET_CSR.
//! A chain longer than one transport MTU goes through CHUNK_SEND
//! instead; this handler only covers the single-message case.

use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_CERT_CHAIN_BLOCK_LEN;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmRequestResponseCode, SpdmSetCertificateRequestPayload, SpdmSetCertificateResponsePayload};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_set_certificate(&mut self, slot_id: u8, cert_chain: &[u8]) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CSR_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CSR_CAP),
        )?;
        if cert_chain.len() > MAX_SPDM_CERT_CHAIN_BLOCK_LEN {
            return Err(SpdmStatus::InvalidParameter);
        }

        let mut chain_buf = [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN];
        chain_buf[..cert_chain.len()].copy_from_slice(cert_chain);
        let request = SpdmSetCertificateRequestPayload {
            slot_id,
            cert_chain_size: cert_chain.len() as u16,
            cert_chain: chain_buf,
        };

        let (response, _, _) = self.send_receive::<_, SpdmSetCertificateResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestSetCertificate,
            &request,
            SpdmRequestResponseCode::SpdmResponseSetCertificateRsp,
        )?;
        if response.slot_id != slot_id {
            return Err(SpdmStatus::InvalidMsgField);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmCodec;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::SpdmVersion;
    use crate::testlib::new_test_requester_with_responses;
    use alloc::vec::Vec;
    use codec::{Codec, Writer};

    fn encode_set_certificate_response(slot_id: u8) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let payload = SpdmSetCertificateResponsePayload { slot_id };
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseSetCertificateRsp,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn rejects_without_csr_cap() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        let result = requester.send_receive_spdm_set_certificate(0, b"der-bytes");
        assert_eq!(result.err(), Some(SpdmStatus::UnsupportedCap));
    }

    #[test]
    fn succeeds_on_matching_slot_ack() {
        let response = encode_set_certificate_response(2);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        requester.send_receive_spdm_set_certificate(2, b"der-bytes").unwrap();
    }

    #[test]
    fn mismatched_slot_in_response_is_rejected() {
        let response = encode_set_certificate_response(1);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let result = requester.send_receive_spdm_set_certificate(2, b"der-bytes");
        assert_eq!(result.err(), Some(SpdmStatus::InvalidMsgField));
    }
}
