// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_DIGESTS / DIGESTS. `param2` of the response is a bitmask of
//! which of the eight certificate-chain slots were populated; one
//! digest follows per set bit, in slot order.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::MAX_SPDM_SLOT_NUMBER;
use crate::protocol::SpdmDigestStruct;
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmGetDigestsRequestPayload {}

impl SpdmCodec for SpdmGetDigestsRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes);
        0u8.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetDigestsRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmGetDigestsRequestPayload {})
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmDigestsResponsePayload {
    pub slot_mask: u8,
    pub digests: [SpdmDigestStruct; MAX_SPDM_SLOT_NUMBER],
}

impl Default for SpdmDigestsResponsePayload {
    fn default() -> Self {
        SpdmDigestsResponsePayload {
            slot_mask: 0,
            digests: [SpdmDigestStruct::default(); MAX_SPDM_SLOT_NUMBER],
        }
    }
}

impl SpdmCodec for SpdmDigestsResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // param1 reserved
        self.slot_mask.encode(bytes); // param2
        for slot in 0..MAX_SPDM_SLOT_NUMBER {
            if self.slot_mask & (1 << slot) != 0 {
                self.digests[slot].spdm_encode(context, bytes);
            }
        }
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmDigestsResponsePayload> {
        u8::read(r)?;
        let slot_mask = u8::read(r)?;
        let mut digests = [SpdmDigestStruct::default(); MAX_SPDM_SLOT_NUMBER];
        for slot in 0..MAX_SPDM_SLOT_NUMBER {
            if slot_mask & (1 << slot) != 0 {
                digests[slot] = SpdmDigestStruct::spdm_read(context, r)?;
            }
        }
        Some(SpdmDigestsResponsePayload { slot_mask, digests })
    }
}
