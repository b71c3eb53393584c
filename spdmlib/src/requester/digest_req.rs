// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_DIGESTS / DIGESTS: records which certificate-chain slots the
//! peer populated and their root-of-trust digests, ahead of
//! GET_CERTIFICATE fetching the chains themselves.

use crate::common::SpdmConnectionState;
use crate::error::SpdmResult;
use crate::message::{SpdmDigestsResponsePayload, SpdmGetDigestsRequestPayload, SpdmRequestResponseCode};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_digest(&mut self) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CERT_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CERT_CAP),
        )?;

        let request = SpdmGetDigestsRequestPayload {};
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmDigestsResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestGetDigests,
            &request,
            SpdmRequestResponseCode::SpdmResponseDigests,
        )?;

        self.common.transcript.message_b.append(&request_bytes)?;
        self.common.transcript.message_b.append(&response_bytes)?;

        self.common.peer_info.peer_slot_mask = response.slot_mask;
        for slot in 0..crate::config::MAX_SPDM_SLOT_NUMBER {
            self.common.peer_info.peer_cert_chain_digest[slot] =
                if response.slot_mask & (1 << slot) != 0 { Some(response.digests[slot]) } else { None };
        }
        self.common.connection_state = SpdmConnectionState::AfterDigests;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SpdmCodec;
    use crate::message::SpdmMessageHeader;
    use crate::protocol::{SpdmBaseHashAlgo, SpdmVersion};
    use crate::testlib::new_test_requester_with_responses;
    use alloc::vec::Vec;
    use codec::{Codec, Writer};

    fn encode_digests_response(slot_mask: u8) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        context.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        let mut payload = SpdmDigestsResponsePayload::default();
        payload.slot_mask = slot_mask;
        for slot in 0..8 {
            if slot_mask & (1 << slot) != 0 {
                payload.digests[slot].data_size = 32;
                payload.digests[slot].data[..32].copy_from_slice(&[slot as u8; 32]);
            }
        }
        let mut buf = [0u8; 512];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseDigests,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn populates_peer_slot_mask_and_digests() {
        let response = encode_digests_response(0b0000_0001);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        requester.common.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CERT_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::CERT_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        requester.send_receive_spdm_digest().unwrap();
        assert_eq!(requester.common.peer_info.peer_slot_mask, 0b0000_0001);
        assert!(requester.common.peer_info.peer_cert_chain_digest[0].is_some());
        assert!(requester.common.peer_info.peer_cert_chain_digest[1].is_none());
        assert_eq!(requester.common.connection_state, SpdmConnectionState::AfterDigests);
    }
}
