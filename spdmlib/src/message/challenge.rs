// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! CHALLENGE / CHALLENGE_AUTH. `param2` of the request packs the
//! measurement-summary-hash type requested from the responder;
//! `param1` carries the slot number being challenged (0-7, or 0xFF for
//! a provisioned raw public key). The response signs the transcript of
//! everything up to and including its own header and opaque trailer.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{SpdmDigestStruct, SpdmNonceStruct, SpdmOpaqueStruct, SpdmSignatureStruct};
use codec::{enum_builder, Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmMeasurementSummaryHashType;
    EnumVal {
        None => 0,
        Tcb => 1,
        All => 0xff
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmChallengeRequestPayload {
    pub slot_id: u8,
    pub measurement_summary_hash_type: SpdmMeasurementSummaryHashType,
    pub nonce: SpdmNonceStruct,
}

impl SpdmCodec for SpdmChallengeRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.slot_id.encode(bytes); // param1
        self.measurement_summary_hash_type.encode(bytes); // param2
        self.nonce.encode(bytes);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChallengeRequestPayload> {
        let slot_id = u8::read(r)?;
        let measurement_summary_hash_type = SpdmMeasurementSummaryHashType::read(r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        Some(SpdmChallengeRequestPayload {
            slot_id,
            measurement_summary_hash_type,
            nonce,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmChallengeAuthResponsePayload {
    pub slot_id: u8,
    pub slot_mask: u8,
    pub cert_chain_hash: SpdmDigestStruct,
    pub nonce: SpdmNonceStruct,
    pub measurement_summary_hash: SpdmDigestStruct,
    pub opaque: SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
}

impl SpdmCodec for SpdmChallengeAuthResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let param1 = self.slot_id & 0xf;
        param1.encode(bytes); // param1: low nibble slot id, high nibble reserved
        self.slot_mask.encode(bytes); // param2
        self.cert_chain_hash.spdm_encode(context, bytes);
        self.nonce.encode(bytes);
        if context.runtime_info.need_measurement_signature {
            self.measurement_summary_hash.spdm_encode(context, bytes);
        }
        self.opaque.spdm_encode(context, bytes);
        self.signature.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmChallengeAuthResponsePayload> {
        let param1 = u8::read(r)?;
        let slot_mask = u8::read(r)?;
        let cert_chain_hash = SpdmDigestStruct::spdm_read(context, r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        let measurement_summary_hash = if context.runtime_info.need_measurement_signature {
            SpdmDigestStruct::spdm_read(context, r)?
        } else {
            SpdmDigestStruct::default()
        };
        let opaque = SpdmOpaqueStruct::spdm_read(context, r)?;
        let signature = SpdmSignatureStruct::spdm_read(context, r)?;
        Some(SpdmChallengeAuthResponsePayload {
            slot_id: param1 & 0xf,
            slot_mask,
            cert_chain_hash,
            nonce,
            measurement_summary_hash,
            opaque,
            signature,
        })
    }
}
