// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Normalizes an ERROR response into either a typed failure or, for
//! `BUSY`/`RESPONSE_NOT_READY`, a retry the caller can act on.
//! `RequesterContext::send_receive`/`send_receive_secured` call this
//! the moment they see `SpdmResponseError` in place of the response
//! they asked for; `BUSY` bubbles back up to their own retry loop,
//! `RESPONSE_NOT_READY` is resolved here with a single RESPOND_IF_READY
//! round trip.

use alloc::vec::Vec;

use crate::common::SpdmCodec;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmErrorCode, SpdmErrorResponsePayload, SpdmMessageHeader, SpdmRequestResponseCode, SpdmRespondIfReadyRequestPayload};
use crate::requester::RequesterContext;
use codec::{Codec, Reader};

impl<'a> RequesterContext<'a> {
    /// `raw_response` is the full ERROR message (header included) the
    /// caller already peeked at and recognized as `SpdmResponseError`.
    /// `req_code`/`rsp_code` are the opcode pair the caller was
    /// originally waiting on, so `RESPONSE_NOT_READY`'s extended data
    /// can be checked against it and `RESPOND_IF_READY` can reference
    /// the same request.
    pub(crate) fn handle_error_response_req<Rsp: SpdmCodec>(
        &mut self,
        raw_response: &[u8],
        req_code: SpdmRequestResponseCode,
        rsp_code: SpdmRequestResponseCode,
    ) -> SpdmResult<(Rsp, Vec<u8>)> {
        let mut reader = Reader::init(raw_response);
        let _header = SpdmMessageHeader::read(&mut reader).ok_or(spdm_err!(InvalidMsgSize))?;
        let error = SpdmErrorResponsePayload::spdm_read(&mut self.common, &mut reader).ok_or(spdm_err!(InvalidMsgField))?;

        match error.error_code {
            SpdmErrorCode::Busy => spdm_result_err!(BusyPeer),
            SpdmErrorCode::RequestResynch => spdm_result_err!(ResynchPeer),
            SpdmErrorCode::VersionMismatch => spdm_result_err!(VersionMismatch),
            SpdmErrorCode::UnsupportedRequest => spdm_result_err!(UnsupportedCap),
            SpdmErrorCode::UnexpectedRequest => spdm_result_err!(UnexpectedRequest),
            SpdmErrorCode::InvalidRequest | SpdmErrorCode::InvalidPolicy => spdm_result_err!(InvalidMsgField),
            SpdmErrorCode::InvalidSessionId => spdm_result_err!(InvalidStatePeer),
            SpdmErrorCode::ResponseNotReady => {
                if error.extended_data.request_code != req_code.get_u8() {
                    return spdm_result_err!(InvalidMsgField);
                }
                self.resolve_response_not_ready(&error, req_code, rsp_code)
            }
            _ => spdm_result_err!(UnexpectedResponse),
        }
    }

    /// Sleeps for the responder-advertised back-off (`2^rdt_exponent`
    /// microseconds, scaled by the requested-minimum-timeout
    /// multiplier `rdtm`) and re-asks once via RESPOND_IF_READY. Does
    /// not itself recurse into `handle_error_response_req` if the
    /// reply is again an ERROR — one RESPONSE_NOT_READY deferral is
    /// resolved per call, matching the one extra round trip the wire
    /// exchange spends on it.
    fn resolve_response_not_ready<Rsp: SpdmCodec>(
        &mut self,
        error: &SpdmErrorResponsePayload,
        req_code: SpdmRequestResponseCode,
        rsp_code: SpdmRequestResponseCode,
    ) -> SpdmResult<(Rsp, Vec<u8>)> {
        let base_delay_us: u64 = 1u64 << error.extended_data.rdt_exponent;
        let multiplier = error.extended_data.rdtm.max(1) as u64;
        crate::time::sleep(base_delay_us.saturating_mul(multiplier));

        let retry = SpdmRespondIfReadyRequestPayload {
            original_request_code: req_code.get_u8(),
            token: error.extended_data.token,
        };
        let request_bytes = self.encode_plain_request(SpdmRequestResponseCode::SpdmRequestRespondIfReady, &retry)?;
        self.send_spdm_request(&request_bytes)?;

        let mut raw = [0u8; crate::config::MAX_SPDM_MSG_SIZE];
        let len = self.receive_spdm_response(&mut raw)?;
        let mut reader = Reader::init(&raw[..len]);
        let header = SpdmMessageHeader::read(&mut reader).ok_or(spdm_err!(InvalidMsgSize))?;

        if header.request_response_code == SpdmRequestResponseCode::SpdmResponseError {
            let retried = SpdmErrorResponsePayload::spdm_read(&mut self.common, &mut reader).ok_or(spdm_err!(InvalidMsgField))?;
            return match retried.error_code {
                SpdmErrorCode::Busy => spdm_result_err!(BusyPeer),
                SpdmErrorCode::RequestResynch => spdm_result_err!(ResynchPeer),
                _ => spdm_result_err!(NotReadyPeer),
            };
        }

        if header.request_response_code != rsp_code {
            return spdm_result_err!(UnexpectedResponse);
        }
        let payload = Rsp::spdm_read(&mut self.common, &mut reader).ok_or(spdm_err!(InvalidMsgField))?;
        Ok((payload, raw[..len].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{SpdmDigestsResponsePayload, SpdmRequestResponseCode};
    use crate::protocol::SpdmVersion;
    use crate::testlib::new_test_requester_with_responses;
    use codec::Writer;

    fn encode_error(error: SpdmErrorResponsePayload, version: SpdmVersion) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        context.negotiate_info.spdm_version_sel = version;
        let mut buf = [0u8; 64];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version,
            request_response_code: SpdmRequestResponseCode::SpdmResponseError,
        }
        .encode(&mut w);
        error.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    #[test]
    fn busy_is_reported_without_sending_respond_if_ready() {
        let (mut requester, state) = new_test_requester_with_responses(Vec::new());
        let raw = encode_error(
            SpdmErrorResponsePayload {
                error_code: SpdmErrorCode::Busy,
                ..Default::default()
            },
            SpdmVersion::SpdmVersion11,
        );

        let result = requester.handle_error_response_req::<SpdmDigestsResponsePayload>(
            &raw,
            SpdmRequestResponseCode::SpdmRequestGetDigests,
            SpdmRequestResponseCode::SpdmResponseDigests,
        );
        assert_eq!(result.err(), Some(SpdmStatus::BusyPeer));
        assert!(state.borrow().sent.is_empty());
    }

    #[test]
    fn response_not_ready_sends_respond_if_ready_and_decodes_retry() {
        let mut digests_context = crate::testlib::new_test_context();
        digests_context.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;
        let mut digests_buf = [0u8; 256];
        let mut w = Writer::init(&mut digests_buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseDigests,
        }
        .encode(&mut w);
        SpdmDigestsResponsePayload::default().spdm_encode(&mut digests_context, &mut w);
        let digests_response = digests_buf[..w.used()].to_vec();

        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([digests_response]));
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;

        let raw = encode_error(
            SpdmErrorResponsePayload {
                error_code: SpdmErrorCode::ResponseNotReady,
                error_data: 0,
                extended_data: crate::message::SpdmResponseNotReadyExtData {
                    rdt_exponent: 0,
                    request_code: SpdmRequestResponseCode::SpdmRequestGetDigests.get_u8(),
                    token: 9,
                    rdtm: 1,
                },
            },
            SpdmVersion::SpdmVersion11,
        );

        let (_payload, response_bytes) = requester
            .handle_error_response_req::<SpdmDigestsResponsePayload>(
                &raw,
                SpdmRequestResponseCode::SpdmRequestGetDigests,
                SpdmRequestResponseCode::SpdmResponseDigests,
            )
            .unwrap();
        assert!(!response_bytes.is_empty());
    }

    #[test]
    fn response_not_ready_for_wrong_request_code_is_rejected() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let raw = encode_error(
            SpdmErrorResponsePayload {
                error_code: SpdmErrorCode::ResponseNotReady,
                error_data: 0,
                extended_data: crate::message::SpdmResponseNotReadyExtData {
                    rdt_exponent: 0,
                    request_code: SpdmRequestResponseCode::SpdmRequestGetCertificate.get_u8(),
                    token: 1,
                    rdtm: 1,
                },
            },
            SpdmVersion::SpdmVersion11,
        );

        let result = requester.handle_error_response_req::<SpdmDigestsResponsePayload>(
            &raw,
            SpdmRequestResponseCode::SpdmRequestGetDigests,
            SpdmRequestResponseCode::SpdmResponseDigests,
        );
        assert_eq!(result.err(), Some(SpdmStatus::InvalidMsgField));
    }

    #[test]
    fn request_resynch_is_reported() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        let raw = encode_error(
            SpdmErrorResponsePayload {
                error_code: SpdmErrorCode::RequestResynch,
                ..Default::default()
            },
            SpdmVersion::SpdmVersion11,
        );

        let result = requester.handle_error_response_req::<SpdmDigestsResponsePayload>(
            &raw,
            SpdmRequestResponseCode::SpdmRequestGetDigests,
            SpdmRequestResponseCode::SpdmResponseDigests,
        );
        assert_eq!(result.err(), Some(SpdmStatus::ResynchPeer));
    }
}
