// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! KEY_UPDATE / KEY_UPDATE_ACK: rotates the secure session's AEAD
//! traffic keys without a full handshake. `SpdmVerifyNewKey` is a
//! second round trip confirming the responder derived the same key
//! before the requester discards its backup.

use crate::common::{SpdmCodec, SpdmContext};
use codec::{enum_builder, Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmKeyUpdateOperation;
    EnumVal {
        SpdmUpdateSingleKey => 0x1,
        SpdmUpdateAllKeys => 0x2,
        SpdmVerifyNewKey => 0x3
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmKeyUpdateRequestPayload {
    pub key_update_operation: SpdmKeyUpdateOperation,
    pub tag: u8,
}

impl SpdmCodec for SpdmKeyUpdateRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.key_update_operation.encode(bytes); // param1
        self.tag.encode(bytes); // param2
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmKeyUpdateRequestPayload> {
        let key_update_operation = SpdmKeyUpdateOperation::read(r)?;
        let tag = u8::read(r)?;
        Some(SpdmKeyUpdateRequestPayload {
            key_update_operation,
            tag,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmKeyUpdateResponsePayload {
    pub key_update_operation: SpdmKeyUpdateOperation,
    pub tag: u8,
}

impl SpdmCodec for SpdmKeyUpdateResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.key_update_operation.encode(bytes); // param1
        self.tag.encode(bytes); // param2
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmKeyUpdateResponsePayload> {
        let key_update_operation = SpdmKeyUpdateOperation::read(r)?;
        let tag = u8::read(r)?;
        Some(SpdmKeyUpdateResponsePayload {
            key_update_operation,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn key_update_request_roundtrips() {
        let mut context = new_test_context();
        let value = SpdmKeyUpdateRequestPayload {
            key_update_operation: SpdmKeyUpdateOperation::SpdmUpdateAllKeys,
            tag: 100u8,
        };

        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        value.spdm_encode(&mut context, &mut w);
        assert_eq!(w.used(), 2);

        let mut r = Reader::init(&buf);
        let back = SpdmKeyUpdateRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.key_update_operation, SpdmKeyUpdateOperation::SpdmUpdateAllKeys);
        assert_eq!(back.tag, 100);
    }

    #[test]
    fn verify_new_key_roundtrips_through_response() {
        let mut context = new_test_context();
        let value = SpdmKeyUpdateResponsePayload {
            key_update_operation: SpdmKeyUpdateOperation::SpdmVerifyNewKey,
            tag: 7,
        };

        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        value.spdm_encode(&mut context, &mut w);

        let mut r = Reader::init(&buf);
        let back = SpdmKeyUpdateResponsePayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.key_update_operation, SpdmKeyUpdateOperation::SpdmVerifyNewKey);
        assert_eq!(back.tag, 7);
    }
}
