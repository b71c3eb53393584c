// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CAPABILITIES / CAPABILITIES. Requires GET_VERSION to have run;
//! folds both messages into `message_a` and rejects an incoherent
//! capability set before it can mislead later negotiation.

use crate::common::SpdmConnectionState;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmCapabilitiesResponsePayload, SpdmGetCapabilitiesRequestPayload, SpdmRequestResponseCode};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_capabilities(&mut self) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::AfterVersion)?;

        let request = SpdmGetCapabilitiesRequestPayload {
            ct_exponent: self.common.config_info.req_ct_exponent_sel,
            flags: self.common.config_info.req_capabilities_sel,
        };
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmCapabilitiesResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestGetCapabilities,
            &request,
            SpdmRequestResponseCode::SpdmResponseCapabilities,
        )?;

        if !response.is_coherent() {
            return Err(SpdmStatus::NegotiationFail);
        }

        self.common.transcript.message_a.append(&request_bytes)?;
        self.common.transcript.message_a.append(&response_bytes)?;

        self.common.negotiate_info.req_capabilities_sel = self.common.config_info.req_capabilities_sel;
        self.common.negotiate_info.rsp_capabilities_sel = response.flags;
        self.common.negotiate_info.req_ct_exponent_sel = self.common.config_info.req_ct_exponent_sel;
        self.common.negotiate_info.rsp_ct_exponent_sel = response.ct_exponent;
        self.common.connection_state = SpdmConnectionState::AfterCapabilities;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmCodec;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags, SpdmVersion};
    use crate::testlib::new_test_requester_with_responses;
    use alloc::vec::Vec;
    use codec::{Codec, Writer};

    fn encode_capabilities_response(flags: SpdmResponseCapabilityFlags) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let payload = SpdmCapabilitiesResponsePayload { ct_exponent: 4, flags };
        let mut buf = [0u8; 32];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseCapabilities,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn requires_version_to_have_run() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let result = requester.send_receive_spdm_capabilities();
        assert_eq!(result.err(), Some(SpdmStatus::InvalidStateLocal));
    }

    #[test]
    fn coherent_capabilities_advance_connection_state() {
        let response = encode_capabilities_response(SpdmResponseCapabilityFlags::CERT_CAP | SpdmResponseCapabilityFlags::CHAL_CAP);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::AfterVersion;
        requester.common.config_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CERT_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        requester.send_receive_spdm_capabilities().unwrap();
        assert_eq!(requester.common.connection_state, SpdmConnectionState::AfterCapabilities);
        assert_eq!(requester.common.negotiate_info.rsp_capabilities_sel, SpdmResponseCapabilityFlags::CERT_CAP | SpdmResponseCapabilityFlags::CHAL_CAP);
    }

    #[test]
    fn incoherent_capabilities_fail_negotiation() {
        let response = encode_capabilities_response(SpdmResponseCapabilityFlags::ENCRYPT_CAP);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::AfterVersion;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let result = requester.send_receive_spdm_capabilities();
        assert_eq!(result.err(), Some(SpdmStatus::NegotiationFail));
    }
}
