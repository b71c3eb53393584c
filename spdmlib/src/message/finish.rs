// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! FINISH / FINISH_RSP: completes a KEY_EXCHANGE session by exchanging
//! HMACs over the transcript, keyed with `finished_key_req`/
//! `finished_key_rsp`. The request's signature field is present only
//! when mutual authentication was requested in KEY_EXCHANGE_RSP.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{SpdmDigestStruct, SpdmSignatureStruct};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmFinishRequestPayload {
    pub signature_included: bool,
    pub req_slot_id: u8,
    pub signature: SpdmSignatureStruct,
    pub verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmFinishRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let param1: u8 = if self.signature_included { 1 } else { 0 };
        param1.encode(bytes);
        self.req_slot_id.encode(bytes); // param2
        if self.signature_included {
            self.signature.spdm_encode(context, bytes);
        }
        self.verify_data.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmFinishRequestPayload> {
        let param1 = u8::read(r)?;
        let req_slot_id = u8::read(r)?;
        let signature_included = param1 & 0x1 != 0;
        let signature = if signature_included {
            SpdmSignatureStruct::spdm_read(context, r)?
        } else {
            SpdmSignatureStruct::default()
        };
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmFinishRequestPayload {
            signature_included,
            req_slot_id,
            signature,
            verify_data,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmFinishResponsePayload {
    /// Present only when the session was negotiated without
    /// `HANDSHAKE_IN_THE_CLEAR_CAP`.
    pub verify_data: Option<SpdmDigestStruct>,
}

impl SpdmCodec for SpdmFinishResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        0u8.encode(bytes); // param2 reserved
        if let Some(verify_data) = &self.verify_data {
            verify_data.spdm_encode(context, bytes);
        }
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmFinishResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        let verify_data = if r.left() > 0 {
            Some(SpdmDigestStruct::spdm_read(context, r)?)
        } else {
            None
        };
        Some(SpdmFinishResponsePayload { verify_data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SpdmBaseHashAlgo;
    use crate::testlib::new_test_context;

    #[test]
    fn finish_request_without_signature_roundtrips() {
        let mut context = new_test_context();
        context.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        let mut payload = SpdmFinishRequestPayload::default();
        payload.verify_data.data_size = 32;

        let mut buf = [0u8; 64];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();
        assert_eq!(used, 2 + 32);

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmFinishRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert!(!back.signature_included);
        assert_eq!(back.verify_data.data_size, 32);
    }

    #[test]
    fn finish_response_with_verify_data_roundtrips() {
        let mut context = new_test_context();
        context.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;
        let mut digest = SpdmDigestStruct::default();
        digest.data_size = 32;
        let payload = SpdmFinishResponsePayload {
            verify_data: Some(digest),
        };

        let mut buf = [0u8; 64];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmFinishResponsePayload::spdm_read(&mut context, &mut r).unwrap();
        assert!(back.verify_data.is_some());
    }
}
