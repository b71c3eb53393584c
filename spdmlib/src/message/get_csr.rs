// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CSR / CSR (feature `get-csr`): requests a PKCS#10 certificate
//! signing request from the peer, optionally binding it to requester-
//! supplied info and an opaque trailer. The response is a single
//! length-prefixed CSR blob; callers that need it chunked across
//! multiple round trips use CHUNK_GET instead. This assumes the CSR
//! fits in one transport MTU, the common case in practice.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::{MAX_SPDM_CSR_SIZE, MAX_SPDM_OPAQUE_SIZE};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy)]
pub struct SpdmGetCsrRequestPayload {
    pub requester_info_size: u16,
    pub requester_info: [u8; MAX_SPDM_OPAQUE_SIZE],
    pub opaque_data_size: u16,
    pub opaque_data: [u8; MAX_SPDM_OPAQUE_SIZE],
}

impl Default for SpdmGetCsrRequestPayload {
    fn default() -> Self {
        SpdmGetCsrRequestPayload {
            requester_info_size: 0,
            requester_info: [0u8; MAX_SPDM_OPAQUE_SIZE],
            opaque_data_size: 0,
            opaque_data: [0u8; MAX_SPDM_OPAQUE_SIZE],
        }
    }
}

impl SpdmCodec for SpdmGetCsrRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        self.requester_info_size.encode(bytes);
        self.opaque_data_size.encode(bytes);
        bytes.extend_from_slice(&self.requester_info[..self.requester_info_size as usize]);
        bytes.extend_from_slice(&self.opaque_data[..self.opaque_data_size as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetCsrRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        let requester_info_size = u16::read(r)?;
        let opaque_data_size = u16::read(r)?;
        if requester_info_size as usize > MAX_SPDM_OPAQUE_SIZE || opaque_data_size as usize > MAX_SPDM_OPAQUE_SIZE {
            return None;
        }
        let mut requester_info = [0u8; MAX_SPDM_OPAQUE_SIZE];
        requester_info[..requester_info_size as usize].copy_from_slice(r.take_bytes(requester_info_size as usize)?);
        let mut opaque_data = [0u8; MAX_SPDM_OPAQUE_SIZE];
        opaque_data[..opaque_data_size as usize].copy_from_slice(r.take_bytes(opaque_data_size as usize)?);
        Some(SpdmGetCsrRequestPayload {
            requester_info_size,
            requester_info,
            opaque_data_size,
            opaque_data,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmCsrResponsePayload {
    pub csr_length: u16,
    pub csr: [u8; MAX_SPDM_CSR_SIZE],
}

impl Default for SpdmCsrResponsePayload {
    fn default() -> Self {
        SpdmCsrResponsePayload {
            csr_length: 0,
            csr: [0u8; MAX_SPDM_CSR_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmCsrResponsePayload {
    fn as_ref(&self) -> &[u8] {
        &self.csr[..self.csr_length as usize]
    }
}

impl SpdmCodec for SpdmCsrResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        self.csr_length.encode(bytes);
        bytes.extend_from_slice(&self.csr[..self.csr_length as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmCsrResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        let csr_length = u16::read(r)?;
        if csr_length as usize > MAX_SPDM_CSR_SIZE {
            return None;
        }
        let raw = r.take_bytes(csr_length as usize)?;
        let mut csr = [0u8; MAX_SPDM_CSR_SIZE];
        csr[..csr_length as usize].copy_from_slice(raw);
        Some(SpdmCsrResponsePayload { csr_length, csr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn csr_response_roundtrips() {
        let mut context = new_test_context();
        let mut payload = SpdmCsrResponsePayload {
            csr_length: 5,
            ..Default::default()
        };
        payload.csr[..5].copy_from_slice(b"hello");

        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmCsrResponsePayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.as_ref(), b"hello");
    }

    #[test]
    fn get_csr_request_roundtrips_with_trailers() {
        let mut context = new_test_context();
        let mut payload = SpdmGetCsrRequestPayload {
            requester_info_size: 3,
            opaque_data_size: 2,
            ..Default::default()
        };
        payload.requester_info[..3].copy_from_slice(b"abc");
        payload.opaque_data[..2].copy_from_slice(b"xy");

        let mut buf = [0u8; 32];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmGetCsrRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(&back.requester_info[..3], b"abc");
        assert_eq!(&back.opaque_data[..2], b"xy");
    }
}
