// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! NEGOTIATE_ALGORITHMS / ALGORITHMS: the last exchange that runs
//! before a hash algorithm is known, so this is also where the
//! transcript streams switch from buffer to running-hash backing when
//! `record_transcript_data_support` is disabled (the
//! `hashed-transcript-data` feature's runtime counterpart). `message_a`
//! already holds GET_VERSION/VERSION/GET_CAPABILITIES/CAPABILITIES
//! bytes and is upgraded in place so nothing it already buffered is
//! lost; `message_b/c/m` and the mutual-auth streams haven't received
//! anything yet and are simply (re)initialized directly in hash mode.

use crate::common::SpdmConnectionState;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmNegotiateAlgorithmsRequestPayload, SpdmRequestResponseCode};
pub use crate::message::SpdmAlgorithmsResponsePayload;
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_algorithm(&mut self) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::AfterCapabilities)?;

        let config = self.common.config_info;
        let request = SpdmNegotiateAlgorithmsRequestPayload {
            measurement_specification: config.measurement_specification_sel,
            base_asym_algo: config.base_asym_algo,
            base_hash_algo: config.base_hash_algo,
            dhe_algo: config.dhe_algo,
            aead_algo: config.aead_algo,
            req_asym_algo: config.req_asym_algo,
            key_schedule_algo: config.key_schedule_algo,
        };
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmAlgorithmsResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestNegotiateAlgorithms,
            &request,
            SpdmRequestResponseCode::SpdmResponseAlgorithms,
        )?;

        if response.base_hash_sel.get_size() == 0 || response.base_asym_sel.get_size() == 0 {
            return Err(SpdmStatus::NegotiationFail);
        }

        self.common.transcript.message_a.append(&request_bytes)?;
        self.common.transcript.message_a.append(&response_bytes)?;

        self.common.negotiate_info.measurement_specification_sel = response.measurement_specification_sel;
        self.common.negotiate_info.measurement_hash_sel = response.measurement_hash_algo;
        self.common.negotiate_info.base_asym_sel = response.base_asym_sel;
        self.common.negotiate_info.base_hash_sel = response.base_hash_sel;
        self.common.negotiate_info.dhe_sel = response.dhe_sel;
        self.common.negotiate_info.aead_sel = response.aead_sel;
        self.common.negotiate_info.req_asym_sel = response.req_asym_sel;
        self.common.negotiate_info.key_schedule_sel = response.key_schedule_sel;

        #[cfg(feature = "hashed-transcript-data")]
        if !self.common.config_info.record_transcript_data_support {
            let algo = response.base_hash_sel;
            self.common.transcript.message_a.upgrade_to_hash(algo)?;
            self.common.transcript.message_b = crate::common::transcript::TranscriptStream::new_hashed(algo);
            self.common.transcript.message_c = crate::common::transcript::TranscriptStream::new_hashed(algo);
            self.common.transcript.message_m = crate::common::transcript::TranscriptStream::new_hashed(algo);
            self.common.transcript.message_mut_b = crate::common::transcript::TranscriptStream::new_hashed(algo);
            self.common.transcript.message_mut_c = crate::common::transcript::TranscriptStream::new_hashed(algo);
        }

        self.common.connection_state = SpdmConnectionState::Negotiated;
        Ok(())
    }
}
