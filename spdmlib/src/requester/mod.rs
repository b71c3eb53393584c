// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The Requester role: one handler module per SPDM opcode, all
//! driving the same shape described in `RequesterContext`'s docs.
//! `RequesterContext` itself owns nothing protocol-specific beyond the
//! connection context (`common`) and the wire plumbing every handler
//! shares — encode/send/receive/dispatch, and the BUSY/RESPONSE_NOT_READY
//! retry loop that subsumes the per-opcode "try" wrapper.

mod algorithm_req;
mod capabilities_req;
mod certificate_req;
mod challenge_req;
mod chunk_req;
mod digest_req;
mod end_session_req;
mod finish_req;
mod get_csr_req;
mod handle_error_response_req;
mod heartbeat_req;
mod key_exchange_req;
mod key_update_req;
mod measurement_req;
mod psk_exchange_req;
mod psk_finish_req;
mod set_certificate_req;
mod version_req;

use alloc::vec::Vec;

use crate::common::{SpdmCodec, SpdmContext, SpdmProvisionInfo};
use crate::config::{SpdmConfigInfo, MAX_SPDM_MSG_SIZE, MAX_SPDM_TRANSPORT_SIZE};
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmMessageHeader, SpdmRequestResponseCode};
use crate::transport::{SpdmDeviceIo, SpdmTransportEncap};
use codec::{Codec, Reader, Writer};

/// Owns the connection context and provides the wire plumbing every
/// opcode handler composes into the canonical shape: build request,
/// encode, send, receive, recognize ERROR and dispatch it, decode the
/// expected response, let the caller fold it into transcript/session
/// state.
pub struct RequesterContext<'a> {
    pub common: SpdmContext<'a>,
}

impl<'a> RequesterContext<'a> {
    pub fn new(
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        RequesterContext {
            common: SpdmContext::new(device_io, transport_encap, config_info, provision_info),
        }
    }

    fn encode_plain_request<Req: SpdmCodec>(
        &mut self,
        req_code: SpdmRequestResponseCode,
        payload: &Req,
    ) -> SpdmResult<Vec<u8>> {
        let mut buf = [0u8; MAX_SPDM_MSG_SIZE];
        let mut writer = Writer::init(&mut buf);
        let header = SpdmMessageHeader {
            version: self.common.negotiate_info.spdm_version_sel,
            request_response_code: req_code,
        };
        header.encode(&mut writer);
        payload.spdm_encode(&mut self.common, &mut writer);
        Ok(buf[..writer.used()].to_vec())
    }

    fn send_spdm_request(&mut self, request: &[u8]) -> SpdmResult {
        let mut framed = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let used = self.common.transport_encap.encap(None, false, request, &mut framed)?;
        self.common.device_io.send(&framed[..used])
    }

    fn receive_spdm_response(&mut self, out: &mut [u8]) -> SpdmResult<usize> {
        let n = self.common.device_io.receive(out)?;
        let (_session_id, len) = self.common.transport_encap.decap(out, n)?;
        Ok(len)
    }

    fn send_secured_request(&mut self, session_id: u32, app_payload: &[u8]) -> SpdmResult {
        let mut secured = [0u8; MAX_SPDM_MSG_SIZE];
        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidMsgField)?;
        let secured_used = crate::secured_message::encode_request(session, app_payload, &mut secured)?;

        let mut framed = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let framed_used = self
            .common
            .transport_encap
            .encap(Some(session_id), true, &secured[..secured_used], &mut framed)?;
        self.common.device_io.send(&framed[..framed_used])
    }

    fn receive_secured_response(&mut self, session_id: u32, out: &mut [u8]) -> SpdmResult<usize> {
        let mut raw = [0u8; MAX_SPDM_TRANSPORT_SIZE];
        let n = self.common.device_io.receive(&mut raw)?;
        let (decap_session_id, len) = self.common.transport_encap.decap(&mut raw, n)?;
        if decap_session_id != Some(session_id) {
            return Err(SpdmStatus::InvalidMsgField);
        }
        let session = self.common.get_session_via_id(session_id).ok_or(SpdmStatus::InvalidMsgField)?;
        crate::secured_message::decode_response(session, &raw[..len], out)
    }

    /// Sends `req_payload` as `req_code` in the clear and waits for
    /// `rsp_code`, transparently retrying on `BUSY` up to
    /// `config_info.retry_times` and resolving `RESPONSE_NOT_READY`
    /// via `RESPOND_IF_READY`. Returns the decoded response alongside
    /// the exact request/response bytes so the caller can fold them
    /// into the right transcript stream and verify any signature that
    /// covers them.
    pub(crate) fn send_receive<Req: SpdmCodec, Rsp: SpdmCodec>(
        &mut self,
        req_code: SpdmRequestResponseCode,
        req_payload: &Req,
        rsp_code: SpdmRequestResponseCode,
    ) -> SpdmResult<(Rsp, Vec<u8>, Vec<u8>)> {
        let retry_times = self.common.config_info.retry_times;
        let mut attempts = 0u8;
        loop {
            let request_bytes = self.encode_plain_request(req_code, req_payload)?;
            self.send_spdm_request(&request_bytes)?;

            let mut raw = [0u8; MAX_SPDM_MSG_SIZE];
            let len = self.receive_spdm_response(&mut raw)?;
            let mut reader = Reader::init(&raw[..len]);
            let header = SpdmMessageHeader::read(&mut reader).ok_or(spdm_err!(InvalidMsgSize))?;
            if header.version != self.common.negotiate_info.spdm_version_sel {
                return spdm_result_err!(InvalidMsgField);
            }

            if header.request_response_code == SpdmRequestResponseCode::SpdmResponseError {
                match self.handle_error_response_req::<Rsp>(&raw[..len], req_code, rsp_code) {
                    Ok((payload, response_bytes)) => return Ok((payload, request_bytes, response_bytes)),
                    Err(SpdmStatus::BusyPeer) if attempts < retry_times => {
                        attempts += 1;
                        crate::time::sleep(self.common.config_info.retry_delay_time_us);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            if header.request_response_code != rsp_code {
                return spdm_result_err!(UnexpectedResponse);
            }
            let payload = Rsp::spdm_read(&mut self.common, &mut reader).ok_or(spdm_err!(InvalidMsgField))?;
            return Ok((payload, request_bytes, raw[..len].to_vec()));
        }
    }

    /// Secured-session analogue of [`Self::send_receive`]: the
    /// payload is wrapped/unwrapped by `crate::secured_message` before
    /// the same header framing and error handling applies. Used for
    /// END_SESSION, KEY_UPDATE, HEARTBEAT, and any other request
    /// issued after the session is established (including GET_DIGESTS
    /// re-sent inside a session, per the handler that calls it).
    pub(crate) fn send_receive_secured<Req: SpdmCodec, Rsp: SpdmCodec>(
        &mut self,
        session_id: u32,
        req_code: SpdmRequestResponseCode,
        req_payload: &Req,
        rsp_code: SpdmRequestResponseCode,
    ) -> SpdmResult<(Rsp, Vec<u8>, Vec<u8>)> {
        let retry_times = self.common.config_info.retry_times;
        let mut attempts = 0u8;
        loop {
            let request_bytes = self.encode_plain_request(req_code, req_payload)?;
            self.send_secured_request(session_id, &request_bytes)?;

            let mut raw = [0u8; MAX_SPDM_MSG_SIZE];
            let len = self.receive_secured_response(session_id, &mut raw)?;
            let mut reader = Reader::init(&raw[..len]);
            let header = SpdmMessageHeader::read(&mut reader).ok_or(spdm_err!(InvalidMsgSize))?;
            if header.version != self.common.negotiate_info.spdm_version_sel {
                return spdm_result_err!(InvalidMsgField);
            }

            if header.request_response_code == SpdmRequestResponseCode::SpdmResponseError {
                match self.handle_error_response_req::<Rsp>(&raw[..len], req_code, rsp_code) {
                    Ok((payload, response_bytes)) => return Ok((payload, request_bytes, response_bytes)),
                    Err(SpdmStatus::BusyPeer) if attempts < retry_times => {
                        attempts += 1;
                        crate::time::sleep(self.common.config_info.retry_delay_time_us);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            if header.request_response_code != rsp_code {
                return spdm_result_err!(UnexpectedResponse);
            }
            let payload = Rsp::spdm_read(&mut self.common, &mut reader).ok_or(spdm_err!(InvalidMsgField))?;
            return Ok((payload, request_bytes, raw[..len].to_vec()));
        }
    }
}
