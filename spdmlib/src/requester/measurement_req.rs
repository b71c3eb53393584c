// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_MEASUREMENTS / MEASUREMENTS: retrieves the peer's measurement
//! block count or full record, optionally signed. Unlike CHALLENGE,
//! there's no requester-side capability bit for this exchange — only
//! the responder advertises MEAS_CAP_NO_SIG/MEAS_CAP_SIG, and only the
//! signed form demands a verified certificate chain be on hand.

use crate::common::SpdmConnectionState;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{
    SpdmGetMeasurementsRequestPayload, SpdmMeasurementAttributes, SpdmMeasurementOperation, SpdmMeasurementsResponsePayload,
    SpdmRequestResponseCode,
};
use crate::protocol::{SpdmNonceStruct, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;

impl<'a> RequesterContext<'a> {
    pub fn send_receive_spdm_measurement(
        &mut self,
        slot_id: u8,
        measurement_operation: SpdmMeasurementOperation,
        request_signature: bool,
    ) -> SpdmResult<SpdmMeasurementsResponsePayload> {
        self.common.check_connection_state(SpdmConnectionState::AfterCertificate)?;
        let rsp_caps = self.common.negotiate_info.rsp_capabilities_sel;
        if request_signature {
            crate::common::SpdmContext::check_capability(true, rsp_caps.contains(SpdmResponseCapabilityFlags::MEAS_CAP_SIG))?;
        } else {
            let any_meas_cap =
                rsp_caps.contains(SpdmResponseCapabilityFlags::MEAS_CAP_SIG) || rsp_caps.contains(SpdmResponseCapabilityFlags::MEAS_CAP_NO_SIG);
            crate::common::SpdmContext::check_capability(true, any_meas_cap)?;
        }

        self.common.runtime_info.need_measurement_signature = request_signature;

        let mut attributes = SpdmMeasurementAttributes::empty();
        let mut nonce = SpdmNonceStruct::default();
        if request_signature {
            attributes |= SpdmMeasurementAttributes::SIGNATURE_REQUESTED;
            crypto::rand::get_random(&mut nonce.data)?;
        }

        let request = SpdmGetMeasurementsRequestPayload {
            measurement_attributes: attributes,
            measurement_operation,
            nonce,
            slot_id,
        };
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmMeasurementsResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestGetMeasurements,
            &request,
            SpdmRequestResponseCode::SpdmResponseMeasurements,
        )?;

        if !request_signature {
            self.common.transcript.message_m.append(&request_bytes)?;
            self.common.transcript.message_m.append(&response_bytes)?;
            return Ok(response);
        }

        let signature_len = response.signature.as_ref().len();
        if response_bytes.len() < signature_len {
            return Err(SpdmStatus::InvalidMsgSize);
        }
        let signed_len = response_bytes.len() - signature_len;
        self.common.transcript.message_m.append(&request_bytes)?;
        self.common.transcript.message_m.append(&response_bytes[..signed_len])?;

        let hash_size = self.common.negotiate_info.base_hash_sel.get_size() as usize;
        let chain = self.common.peer_info.peer_cert_chain[slot_id as usize].ok_or(SpdmStatus::InvalidStateLocal)?;
        let streams = [
            self.common.transcript.message_a.get(),
            self.common.transcript.message_b.get(),
            self.common.transcript.message_c.get(),
            self.common.transcript.message_m.get(),
        ];
        let signed_data: alloc::vec::Vec<u8> = streams
            .into_iter()
            .collect::<Option<alloc::vec::Vec<&[u8]>>>()
            .ok_or(SpdmStatus::CryptoError)?
            .concat();

        let (cert_offset, cert_len) = crypto::cert_operation::get_cert_from_cert_chain(chain.cert_chain_der(hash_size), -1)?;
        let leaf_cert = &chain.cert_chain_der(hash_size)[cert_offset..cert_offset + cert_len];
        crypto::asym_verify::verify(
            self.common.negotiate_info.base_hash_sel,
            self.common.negotiate_info.base_asym_sel,
            leaf_cert,
            &signed_data,
            &response.signature,
        )?;
        self.common.transcript.message_m.append(response.signature.as_ref())?;

        Ok(response)
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

    fn encode_measurements_response(number_of_measurement: u8) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        context.runtime_info.need_measurement_signature = false;
        let payload = SpdmMeasurementsResponsePayload {
            number_of_measurement,
            ..Default::default()
        };
        let mut buf = [0u8; 1024];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseMeasurements,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn rejects_unsigned_request_without_any_measurement_cap() {
        let response = encode_measurements_response(3);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::AfterCertificate;

        let result =
            requester.send_receive_spdm_measurement(0, SpdmMeasurementOperation::SpdmMeasurementQueryTotalNumber, false);
        assert_eq!(result.err(), Some(SpdmStatus::UnsupportedCap));
    }

    #[test]
    fn unsigned_query_returns_total_count() {
        let response = encode_measurements_response(3);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([response]));
        requester.common.connection_state = SpdmConnectionState::AfterCertificate;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::MEAS_CAP_NO_SIG;
        requester.common.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let response = requester
            .send_receive_spdm_measurement(0, SpdmMeasurementOperation::SpdmMeasurementQueryTotalNumber, false)
            .unwrap();
        assert_eq!(response.number_of_measurement, 3);
    }
}
