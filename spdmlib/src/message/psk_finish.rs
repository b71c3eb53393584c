// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! PSK_FINISH / PSK_FINISH_RSP: the PSK handshake's final confirmation
//! step, carrying only the requester's HMAC over the transcript so
//! far (no signature, since the session is pre-shared-key authenticated).

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::SpdmDigestStruct;
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmPskFinishRequestPayload {
    pub verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmPskFinishRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1
        0u8.encode(bytes); // param2
        self.verify_data.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmPskFinishRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        let verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmPskFinishRequestPayload { verify_data })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmPskFinishResponsePayload {}

impl SpdmCodec for SpdmPskFinishResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmPskFinishResponsePayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmPskFinishResponsePayload {})
    }
}
