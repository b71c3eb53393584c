// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! SET_CERTIFICATE / SET_CERTIFICATE_RSP: provisions a certificate
//! chain into one of the peer's slots, typically following GET_CSR.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::MAX_SPDM_CERT_CHAIN_BLOCK_LEN;
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy)]
pub struct SpdmSetCertificateRequestPayload {
    pub slot_id: u8,
    pub cert_chain_size: u16,
    pub cert_chain: [u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN],
}

impl Default for SpdmSetCertificateRequestPayload {
    fn default() -> Self {
        SpdmSetCertificateRequestPayload {
            slot_id: 0,
            cert_chain_size: 0,
            cert_chain: [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN],
        }
    }
}

impl SpdmCodec for SpdmSetCertificateRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        (self.slot_id & 0xf).encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.cert_chain_size.encode(bytes);
        bytes.extend_from_slice(&self.cert_chain[..self.cert_chain_size as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmSetCertificateRequestPayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        let cert_chain_size = u16::read(r)?;
        if cert_chain_size as usize > MAX_SPDM_CERT_CHAIN_BLOCK_LEN {
            return None;
        }
        let raw = r.take_bytes(cert_chain_size as usize)?;
        let mut cert_chain = [0u8; MAX_SPDM_CERT_CHAIN_BLOCK_LEN];
        cert_chain[..cert_chain_size as usize].copy_from_slice(raw);
        Some(SpdmSetCertificateRequestPayload {
            slot_id: param1 & 0xf,
            cert_chain_size,
            cert_chain,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmSetCertificateResponsePayload {
    pub slot_id: u8,
}

impl SpdmCodec for SpdmSetCertificateResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        (self.slot_id & 0xf).encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmSetCertificateResponsePayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        Some(SpdmSetCertificateResponsePayload { slot_id: param1 & 0xf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn set_certificate_request_roundtrips() {
        let mut context = new_test_context();
        let mut payload = SpdmSetCertificateRequestPayload {
            slot_id: 3,
            cert_chain_size: 4,
            ..Default::default()
        };
        payload.cert_chain[..4].copy_from_slice(&[1, 2, 3, 4]);

        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmSetCertificateRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.slot_id, 3);
        assert_eq!(&back.cert_chain[..4], &[1, 2, 3, 4]);
    }
}
