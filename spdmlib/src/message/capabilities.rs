// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_CAPABILITIES / CAPABILITIES. Flag coherency (`ENCRYPT_CAP`
//! requires `KEY_EX_CAP` or `PSK_CAP`) is checked by the requester
//! handler after decode, not here — the codec only lays out bytes.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{SpdmRequestCapabilityFlags, SpdmResponseCapabilityFlags};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmGetCapabilitiesRequestPayload {
    pub ct_exponent: u8,
    pub flags: SpdmRequestCapabilityFlags,
}

impl SpdmCodec for SpdmGetCapabilitiesRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        0u8.encode(bytes); // reserved
        self.ct_exponent.encode(bytes);
        0u16.encode(bytes); // reserved
        self.flags.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetCapabilitiesRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        u8::read(r)?;
        let ct_exponent = u8::read(r)?;
        u16::read(r)?;
        let flags = SpdmRequestCapabilityFlags::read(r)?;
        Some(SpdmGetCapabilitiesRequestPayload { ct_exponent, flags })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmCapabilitiesResponsePayload {
    pub ct_exponent: u8,
    pub flags: SpdmResponseCapabilityFlags,
}

impl SpdmCapabilitiesResponsePayload {
    /// Enforces flag coherency: ENCRYPT_CAP requires KEY_EX_CAP or PSK_CAP.
    pub fn is_coherent(&self) -> bool {
        if self.flags.contains(SpdmResponseCapabilityFlags::ENCRYPT_CAP)
            && !(self.flags.contains(SpdmResponseCapabilityFlags::KEY_EX_CAP)
                || self.flags.contains(SpdmResponseCapabilityFlags::PSK_CAP))
        {
            return false;
        }
        if self.flags.contains(SpdmResponseCapabilityFlags::MAC_CAP)
            && !(self.flags.contains(SpdmResponseCapabilityFlags::KEY_EX_CAP)
                || self.flags.contains(SpdmResponseCapabilityFlags::PSK_CAP))
        {
            return false;
        }
        true
    }
}

impl SpdmCodec for SpdmCapabilitiesResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        0u8.encode(bytes); // reserved
        self.ct_exponent.encode(bytes);
        0u16.encode(bytes); // reserved
        self.flags.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmCapabilitiesResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        u8::read(r)?;
        let ct_exponent = u8::read(r)?;
        u16::read(r)?;
        let flags = SpdmResponseCapabilityFlags::read(r)?;
        Some(SpdmCapabilitiesResponsePayload { ct_exponent, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn capabilities_roundtrip() {
        let mut context = new_test_context();
        let payload = SpdmCapabilitiesResponsePayload {
            ct_exponent: 4,
            flags: SpdmResponseCapabilityFlags::CERT_CAP | SpdmResponseCapabilityFlags::CHAL_CAP,
        };
        let mut buf = [0u8; 16];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let mut r = Reader::init(&buf[..w.used()]);
        let back = SpdmCapabilitiesResponsePayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.ct_exponent, 4);
        assert_eq!(back.flags, payload.flags);
    }

    #[test]
    fn encrypt_cap_without_key_ex_or_psk_is_incoherent() {
        let payload = SpdmCapabilitiesResponsePayload {
            ct_exponent: 0,
            flags: SpdmResponseCapabilityFlags::ENCRYPT_CAP,
        };
        assert!(!payload.is_coherent());
    }

    #[test]
    fn encrypt_cap_with_psk_is_coherent() {
        let payload = SpdmCapabilitiesResponsePayload {
            ct_exponent: 0,
            flags: SpdmResponseCapabilityFlags::ENCRYPT_CAP | SpdmResponseCapabilityFlags::PSK_CAP,
        };
        assert!(payload.is_coherent());
    }
}
