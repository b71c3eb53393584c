// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! HEARTBEAT / HEARTBEAT_ACK: keeps a session alive between real
//! traffic. Carries no payload beyond the two reserved bytes.

use crate::common::{SpdmCodec, SpdmContext};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmHeartbeatRequestPayload {}

impl SpdmCodec for SpdmHeartbeatRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmHeartbeatRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmHeartbeatRequestPayload {})
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmHeartbeatResponsePayload {}

impl SpdmCodec for SpdmHeartbeatResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmHeartbeatResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmHeartbeatResponsePayload {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn heartbeat_roundtrips() {
        let mut context = new_test_context();
        let payload = SpdmHeartbeatRequestPayload {};
        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let mut r = Reader::init(&buf);
        assert!(SpdmHeartbeatRequestPayload::spdm_read(&mut context, &mut r).is_some());
    }
}
