// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! END_SESSION / END_SESSION_ACK: the teardown handshake. `param1` bit
//! 0 requests that the responder preserve negotiated state for a
//! future PSK-based resumption instead of discarding it.

use crate::common::{SpdmCodec, SpdmContext};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmEndSessionRequestPayload {
    pub preserve_negotiated_state: bool,
}

impl SpdmCodec for SpdmEndSessionRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        let param1: u8 = if self.preserve_negotiated_state { 1 } else { 0 };
        param1.encode(bytes);
        0u8.encode(bytes); // param2 reserved
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmEndSessionRequestPayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        Some(SpdmEndSessionRequestPayload {
            preserve_negotiated_state: param1 & 0x1 != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmEndSessionResponsePayload {}

impl SpdmCodec for SpdmEndSessionResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmEndSessionResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmEndSessionResponsePayload {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn end_session_request_roundtrips() {
        let mut context = new_test_context();
        let payload = SpdmEndSessionRequestPayload {
            preserve_negotiated_state: true,
        };
        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let mut r = Reader::init(&buf);
        let back = SpdmEndSessionRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert!(back.preserve_negotiated_state);
    }
}
