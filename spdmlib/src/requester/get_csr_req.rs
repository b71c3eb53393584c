// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CSR / CSR (feature `get-csr`): asks the peer to produce a
//! certificate signing request over requester-supplied info and
//! opaque data. This is a provisioning exchange, not part of the
//! authentication transcript, so neither side's bytes get folded into
//! any `message_*` stream.

use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_OPAQUE_SIZE;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmCsrResponsePayload, SpdmGetCsrRequestPayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;
use alloc::vec::Vec;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_csr(&mut self, requester_info: &[u8], opaque_data: &[u8]) -> SpdmResult<Vec<u8>> {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CSR_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CSR_CAP),
        )?;
        if requester_info.len() > MAX_SPDM_OPAQUE_SIZE || opaque_data.len() > MAX_SPDM_OPAQUE_SIZE {
            return Err(SpdmStatus::InvalidParameter);
        }

        let mut request = SpdmGetCsrRequestPayload {
            requester_info_size: requester_info.len() as u16,
            requester_info: [0u8; MAX_SPDM_OPAQUE_SIZE],
            opaque_data_size: opaque_data.len() as u16,
            opaque_data: [0u8; MAX_SPDM_OPAQUE_SIZE],
        };
        request.requester_info[..requester_info.len()].copy_from_slice(requester_info);
        request.opaque_data[..opaque_data.len()].copy_from_slice(opaque_data);

        let (response, _, _) = self.send_receive::<_, SpdmCsrResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestGetCsr,
            &request,
            SpdmRequestResponseCode::SpdmResponseCsr,
        )?;

        Ok(response.as_ref().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmCodec;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::SpdmVersion;
    use crate::testlib::new_test_requester_with_responses;
    use codec::{Codec, Writer};

    fn encode_csr_response(csr: &[u8]) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let mut csr_buf = [0u8; crate::config::MAX_SPDM_CSR_SIZE];
        csr_buf[..csr.len()].copy_from_slice(csr);
        let payload = SpdmCsrResponsePayload {
            csr_length: csr.len() as u16,
            csr: csr_buf,
        };
        let mut buf = [0u8; 2048];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseCsr,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn rejects_without_csr_cap() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        let result = requester.send_receive_spdm_csr(b"req-info", b"");
        assert_eq!(result.err(), Some(SpdmStatus::UnsupportedCap));
    }

    #[test]
    fn returns_csr_bytes_on_success() {
        let response = encode_csr_response(b"fake-csr-bytes");
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::CSR_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let csr = requester.send_receive_spdm_csr(b"req-info", b"").unwrap();
        assert_eq!(&csr, b"fake-csr-bytes");
    }
}
