// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! CHUNK_GET / CHUNK_RESPONSE and CHUNK_SEND / CHUNK_SEND_ACK: pulls
//! or pushes a large message (an oversized GET_CSR response, a long
//! SET_CERTIFICATE chain, a sprawling measurement record) across
//! several transport-sized chunks keyed by a handle the first message
//! established out of band. Neither direction folds its bytes into
//! any transcript stream; chunking is a transport concern, not part
//! of the authentication that rides inside the reassembled message.

use crate::common::SpdmConnectionState;
use crate::config::MAX_SPDM_CHUNK_SIZE;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{
    SpdmChunkGetRequestPayload, SpdmChunkResponsePayload, SpdmChunkSendAckResponsePayload, SpdmChunkSendRequestPayload,
    SpdmRequestResponseCode,
};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use crate::requester::RequesterContext;
use alloc::vec::Vec;

impl<'a> RequesterContext<'a> {
    fn check_chunk_cap(&self) -> SpdmResult {
        self.common.check_connection_state(SpdmConnectionState::Negotiated)?;
        crate::common::SpdmContext::check_capability(
            self.common.negotiate_info.req_capabilities_sel.contains(SpdmRequestCapabilityFlags::CHUNK_CAP),
            self.common.negotiate_info.rsp_capabilities_sel.contains(SpdmResponseCapabilityFlags::CHUNK_CAP),
        )
    }

    /// Pulls the full large message identified by `handle`, one
    /// CHUNK_GET/CHUNK_RESPONSE round trip per chunk, until the
    /// responder marks a chunk as the last one.
    pub fn send_receive_spdm_chunk_get(&mut self, handle: u8) -> SpdmResult<Vec<u8>> {
        self.check_chunk_cap()?;

        let mut assembled = Vec::new();
        let mut total_size: Option<u32> = None;
        let mut chunk_seq_no: u16 = 0;
        loop {
            let request = SpdmChunkGetRequestPayload { handle, chunk_seq_no };
            let (response, _, _) = self.send_receive::<_, SpdmChunkResponsePayload>(
                SpdmRequestResponseCode::SpdmRequestChunkGet,
                &request,
                SpdmRequestResponseCode::SpdmResponseChunkResponse,
            )?;
            if response.handle != handle || response.chunk_seq_no != chunk_seq_no {
                return Err(SpdmStatus::UnexpectedResponse);
            }
            if chunk_seq_no == 0 {
                total_size = response.large_message_size;
            }
            assembled.extend_from_slice(&response.chunk[..response.chunk_size as usize]);
            if response.last_chunk {
                break;
            }
            chunk_seq_no += 1;
        }

        if let Some(expected) = total_size {
            if assembled.len() != expected as usize {
                return Err(SpdmStatus::InvalidMsgSize);
            }
        }
        Ok(assembled)
    }

    /// Pushes `data` to the peer under `handle`, splitting it into
    /// `MAX_SPDM_CHUNK_SIZE`-sized chunks and waiting for a
    /// CHUNK_SEND_ACK that names the same handle and sequence number
    /// before sending the next one.
    pub fn send_spdm_chunk_send(&mut self, handle: u8, data: &[u8]) -> SpdmResult {
        self.check_chunk_cap()?;

        let mut offset = 0usize;
        let mut chunk_seq_no: u16 = 0;
        loop {
            let remaining = data.len() - offset;
            let take = remaining.min(MAX_SPDM_CHUNK_SIZE);
            let last_chunk = offset + take == data.len();

            let mut chunk = [0u8; MAX_SPDM_CHUNK_SIZE];
            chunk[..take].copy_from_slice(&data[offset..offset + take]);
            let request = SpdmChunkSendRequestPayload {
                handle,
                chunk_seq_no,
                last_chunk,
                chunk_size: take as u16,
                large_message_size: if chunk_seq_no == 0 { Some(data.len() as u32) } else { None },
                chunk,
            };

            let (response, _, _) = self.send_receive::<_, SpdmChunkSendAckResponsePayload>(
                SpdmRequestResponseCode::SpdmRequestChunkSend,
                &request,
                SpdmRequestResponseCode::SpdmResponseChunkSendAck,
            )?;
            if response.handle != handle || response.chunk_seq_no != chunk_seq_no {
                return Err(SpdmStatus::UnexpectedResponse);
            }

            offset += take;
            if last_chunk {
                break;
            }
            chunk_seq_no += 1;
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
    use codec::{Codec, Writer};

    fn encode_chunk_response(chunk_seq_no: u16, last_chunk: bool, data: &[u8], large_message_size: Option<u32>) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let mut chunk = [0u8; MAX_SPDM_CHUNK_SIZE];
        chunk[..data.len()].copy_from_slice(data);
        let payload = SpdmChunkResponsePayload {
            handle: 5,
            chunk_seq_no,
            last_chunk,
            chunk_size: data.len() as u16,
            large_message_size,
            chunk,
        };
        let mut buf = [0u8; 2048];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseChunkResponse,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    fn encode_chunk_send_ack(chunk_seq_no: u16) -> Vec<u8> {
        let mut context = crate::testlib::new_test_context();
        let payload = SpdmChunkSendAckResponsePayload { handle: 5, chunk_seq_no };
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion11,
            request_response_code: SpdmRequestResponseCode::SpdmResponseChunkSendAck,
        }
        .encode(&mut w);
        payload.spdm_encode(&mut context, &mut w);
        buf[..w.used()].to_vec()
    }

    fn with_chunk_cap(requester: &mut RequesterContext<'static>) {
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        requester.common.negotiate_info.req_capabilities_sel = SpdmRequestCapabilityFlags::CHUNK_CAP;
        requester.common.negotiate_info.rsp_capabilities_sel = SpdmResponseCapabilityFlags::CHUNK_CAP;
        requester.common.negotiate_info.spdm_version_sel = SpdmVersion::SpdmVersion11;
    }

    #[test]
    fn chunk_get_rejects_without_chunk_cap() {
        let (mut requester, _state) = new_test_requester_with_responses(Vec::new());
        requester.common.connection_state = SpdmConnectionState::Negotiated;
        let result = requester.send_receive_spdm_chunk_get(5);
        assert_eq!(result.err(), Some(SpdmStatus::UnsupportedCap));
    }

    #[test]
    fn chunk_get_assembles_two_chunks() {
        let first = encode_chunk_response(0, false, &[1, 2, 3], Some(6));
        let second = encode_chunk_response(1, true, &[4, 5, 6], None);
        let (mut requester, _state) = new_test_requester_with_responses(Vec::from([first, second]));
        with_chunk_cap(&mut requester);

        let assembled = requester.send_receive_spdm_chunk_get(5).unwrap();
        assert_eq!(assembled, Vec::from([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn chunk_send_pushes_every_chunk_and_waits_for_acks() {
        let data = {
            let mut v = Vec::with_capacity(MAX_SPDM_CHUNK_SIZE + 10);
            v.extend(core::iter::repeat(0xAAu8).take(MAX_SPDM_CHUNK_SIZE));
            v.extend(core::iter::repeat(0xBBu8).take(10));
            v
        };
        let first_ack = encode_chunk_send_ack(0);
        let second_ack = encode_chunk_send_ack(1);
        let (mut requester, state) = new_test_requester_with_responses(Vec::from([first_ack, second_ack]));
        with_chunk_cap(&mut requester);

        requester.send_spdm_chunk_send(5, &data).unwrap();
        assert_eq!(state.borrow().sent.len(), 2);
    }
}
