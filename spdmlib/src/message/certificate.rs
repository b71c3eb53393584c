// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CERTIFICATE / CERTIFICATE. Certificate chains larger than one
//! transport MTU are retrieved across several round-trips using
//! `offset`/`length`; the requester handler in
//! `crate::requester::certificate_req` drives the loop and assembles
//! the portions into a single `SpdmCertChainBuffer`.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::MAX_SPDM_CERT_CHAIN_BLOCK_LEN;
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmGetCertificateRequestPayload {
    pub slot_id: u8,
    pub offset: u16,
    pub length: u16,
}

impl SpdmCodec for SpdmGetCertificateRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.offset.encode(bytes);
        self.length.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetCertificateRequestPayload> {
        let slot_id = u8::read(r)?;
        u8::read(r)?;
        let offset = u16::read(r)?;
        let length = u16::read(r)?;
        Some(SpdmGetCertificateRequestPayload {
            slot_id,
            offset,
            length,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmCertificateResponsePayload {
    pub slot_id: u8,
    pub portion_length: u16,
    pub remainder_length: u16,
    pub cert_chain: [u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN],
}

impl Default for SpdmCertificateResponsePayload {
    fn default() -> Self {
        SpdmCertificateResponsePayload {
            slot_id: 0,
            portion_length: 0,
            remainder_length: 0,
            cert_chain: [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN],
        }
    }
}

impl SpdmCodec for SpdmCertificateResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.portion_length.encode(bytes);
        self.remainder_length.encode(bytes);
        bytes.extend_from_slice(&self.cert_chain[..self.portion_length as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmCertificateResponsePayload> {
        let slot_id = u8::read(r)?;
        u8::read(r)?;
        let portion_length = u16::read(r)?;
        let remainder_length = u16::read(r)?;
        if portion_length as usize > MAX_SPDM_CERT_CHAIN_BLOCK_LEN {
            return None;
        }
        let raw = r.take_bytes(portion_length as usize)?;
        let mut cert_chain = [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN];
        cert_chain[..portion_length as usize].copy_from_slice(raw);
        Some(SpdmCertificateResponsePayload {
            slot_id,
            portion_length,
            remainder_length,
            cert_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn certificate_portion_roundtrips() {
        let mut context = new_test_context();
        let mut payload = SpdmCertificateResponsePayload {
            slot_id: 0,
            portion_length: 4,
            remainder_length: 100,
            cert_chain: [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN],
        };
        payload.cert_chain[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();
        assert_eq!(used, 6 + 4);

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmCertificateResponsePayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.remainder_length, 100);
        assert_eq!(&back.cert_chain[..4], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn get_certificate_request_roundtrips() {
        let mut context = new_test_context();
        let payload = SpdmGetCertificateRequestPayload {
            slot_id: 2,
            offset: 0,
            length: 512,
        };
        let mut buf = [0u8; 8];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let mut r = Reader::init(&buf[..w.used()]);
        let back = SpdmGetCertificateRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.slot_id, 2);
        assert_eq!(back.length, 512);
    }
}
