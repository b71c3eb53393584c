// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! CHUNK_SEND / CHUNK_GET and their acks, used when a large message
//! (GET_CSR with a long CSR, SET_CERTIFICATE with a long chain, a
//! measurement record) exceeds the transport MTU and the normal
//! offset/length pagination of GET_CERTIFICATE doesn't apply.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::MAX_SPDM_CHUNK_SIZE;
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmChunkGetRequestPayload {
    pub handle: u8,
    pub chunk_seq_no: u16,
}

impl SpdmCodec for SpdmChunkGetRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        self.handle.encode(bytes);
        self.chunk_seq_no.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChunkGetRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        let handle = u8::read(r)?;
        let chunk_seq_no = u16::read(r)?;
        Some(SpdmChunkGetRequestPayload { handle, chunk_seq_no })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmChunkResponsePayload {
    pub handle: u8,
    pub chunk_seq_no: u16,
    pub last_chunk: bool,
    pub chunk_size: u16,
    /// Only present on the first chunk of a transfer (`chunk_seq_no ==
    /// 0`): the total length of the message being chunked.
    pub large_message_size: Option<u32>,
    pub chunk: [u8; MAX_SPDM_CHUNK_SIZE],
}

impl Default for SpdmChunkResponsePayload {
    fn default() -> Self {
        SpdmChunkResponsePayload {
            handle: 0,
            chunk_seq_no: 0,
            last_chunk: false,
            chunk_size: 0,
            large_message_size: None,
            chunk: [0u8; MAX_SPDM_CHUNK_SIZE],
        }
    }
}

impl SpdmCodec for SpdmChunkResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        let param1: u8 = if self.last_chunk { 1 } else { 0 };
        param1.encode(bytes);
        0u8.encode(bytes); // param2 reserved
        self.handle.encode(bytes);
        self.chunk_seq_no.encode(bytes);
        0u16.encode(bytes); // reserved
        self.chunk_size.encode(bytes);
        if let Some(total) = self.large_message_size {
            total.encode(bytes);
        }
        bytes.extend_from_slice(&self.chunk[..self.chunk_size as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChunkResponsePayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        let handle = u8::read(r)?;
        let chunk_seq_no = u16::read(r)?;
        u16::read(r)?; // reserved
        let chunk_size = u16::read(r)?;
        let large_message_size = if chunk_seq_no == 0 { Some(u32::read(r)?) } else { None };
        if chunk_size as usize > MAX_SPDM_CHUNK_SIZE {
            return None;
        }
        let raw = r.take_bytes(chunk_size as usize)?;
        let mut chunk = [0u8; MAX_SPDM_CHUNK_SIZE];
        chunk[..chunk_size as usize].copy_from_slice(raw);
        Some(SpdmChunkResponsePayload {
            handle,
            chunk_seq_no,
            last_chunk: param1 & 0x1 != 0,
            chunk_size,
            large_message_size,
            chunk,
        })
    }
}

/// CHUNK_SEND: the push-direction counterpart of `SpdmChunkResponsePayload`,
/// carrying one chunk of a large request (a long SET_CERTIFICATE chain,
/// typically) up to the responder.
#[derive(Debug, Clone, Copy)]
pub struct SpdmChunkSendRequestPayload {
    pub handle: u8,
    pub chunk_seq_no: u16,
    pub last_chunk: bool,
    pub chunk_size: u16,
    /// Only present on the first chunk of a transfer.
    pub large_message_size: Option<u32>,
    pub chunk: [u8; MAX_SPDM_CHUNK_SIZE],
}

impl Default for SpdmChunkSendRequestPayload {
    fn default() -> Self {
        SpdmChunkSendRequestPayload {
            handle: 0,
            chunk_seq_no: 0,
            last_chunk: false,
            chunk_size: 0,
            large_message_size: None,
            chunk: [0u8; MAX_SPDM_CHUNK_SIZE],
        }
    }
}

impl SpdmCodec for SpdmChunkSendRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        let param1: u8 = if self.last_chunk { 1 } else { 0 };
        param1.encode(bytes);
        0u8.encode(bytes); // param2 reserved
        self.handle.encode(bytes);
        self.chunk_seq_no.encode(bytes);
        0u16.encode(bytes); // reserved
        self.chunk_size.encode(bytes);
        if let Some(total) = self.large_message_size {
            total.encode(bytes);
        }
        bytes.extend_from_slice(&self.chunk[..self.chunk_size as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChunkSendRequestPayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        let handle = u8::read(r)?;
        let chunk_seq_no = u16::read(r)?;
        u16::read(r)?; // reserved
        let chunk_size = u16::read(r)?;
        let large_message_size = if chunk_seq_no == 0 { Some(u32::read(r)?) } else { None };
        if chunk_size as usize > MAX_SPDM_CHUNK_SIZE {
            return None;
        }
        let raw = r.take_bytes(chunk_size as usize)?;
        let mut chunk = [0u8; MAX_SPDM_CHUNK_SIZE];
        chunk[..chunk_size as usize].copy_from_slice(raw);
        Some(SpdmChunkSendRequestPayload {
            handle,
            chunk_seq_no,
            last_chunk: param1 & 0x1 != 0,
            chunk_size,
            large_message_size,
            chunk,
        })
    }
}

/// CHUNK_SEND_ACK: acknowledges one CHUNK_SEND chunk by handle and
/// sequence number; the full message is accepted once the ack for the
/// chunk carrying `last_chunk` comes back.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmChunkSendAckResponsePayload {
    pub handle: u8,
    pub chunk_seq_no: u16,
}

impl SpdmCodec for SpdmChunkSendAckResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        self.handle.encode(bytes);
        self.chunk_seq_no.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChunkSendAckResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        let handle = u8::read(r)?;
        let chunk_seq_no = u16::read(r)?;
        Some(SpdmChunkSendAckResponsePayload { handle, chunk_seq_no })
    }
}
