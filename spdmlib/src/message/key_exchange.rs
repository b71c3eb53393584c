// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! KEY_EXCHANGE / KEY_EXCHANGE_RSP. Establishes a session via
//! Diffie-Hellman: the requester sends its ephemeral public key and a
//! nonce, the responder answers with its own ephemeral key, a session
//! ID, and (when `MAC_CAP`/mutual auth call for it) an HMAC over the
//! transcript so far, computed with `finished_key_rsp`.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{SpdmDigestStruct, SpdmNonceStruct, SpdmOpaqueStruct, SpdmSignatureStruct, SPDM_MAX_DHE_KEY_SIZE};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy)]
pub struct SpdmKeyExchangeRequestPayload {
    pub measurement_summary_hash_type: u8,
    pub slot_id: u8,
    pub req_session_id: u16,
    pub session_policy: u8,
    pub nonce: SpdmNonceStruct,
    pub exchange_data_size: u16,
    pub exchange_data: [u8; SPDM_MAX_DHE_KEY_SIZE],
    pub opaque: SpdmOpaqueStruct,
}

impl Default for SpdmKeyExchangeRequestPayload {
    fn default() -> Self {
        SpdmKeyExchangeRequestPayload {
            measurement_summary_hash_type: 0,
            slot_id: 0,
            req_session_id: 0,
            session_policy: 0,
            nonce: SpdmNonceStruct::default(),
            exchange_data_size: 0,
            exchange_data: [0u8; SPDM_MAX_DHE_KEY_SIZE],
            opaque: SpdmOpaqueStruct::default(),
        }
    }
}

impl SpdmCodec for SpdmKeyExchangeRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.measurement_summary_hash_type.encode(bytes); // param1
        self.slot_id.encode(bytes); // param2
        self.req_session_id.encode(bytes);
        self.session_policy.encode(bytes);
        0u8.encode(bytes); // reserved
        self.nonce.encode(bytes);
        bytes.extend_from_slice(&self.exchange_data[..self.exchange_data_size as usize]);
        self.opaque.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmKeyExchangeRequestPayload> {
        let measurement_summary_hash_type = u8::read(r)?;
        let slot_id = u8::read(r)?;
        let req_session_id = u16::read(r)?;
        let session_policy = u8::read(r)?;
        u8::read(r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        let exchange_data_size = context.negotiate_info.dhe_sel.get_size();
        let raw = r.take_bytes(exchange_data_size as usize)?;
        let mut exchange_data = [0u8; SPDM_MAX_DHE_KEY_SIZE];
        exchange_data[..exchange_data_size as usize].copy_from_slice(raw);
        let opaque = SpdmOpaqueStruct::spdm_read(context, r)?;
        Some(SpdmKeyExchangeRequestPayload {
            measurement_summary_hash_type,
            slot_id,
            req_session_id,
            session_policy,
            nonce,
            exchange_data_size,
            exchange_data,
            opaque,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmKeyExchangeResponsePayload {
    pub heartbeat_period: u8,
    pub rsp_session_id: u16,
    pub mut_auth_requested: u8,
    pub req_slot_id: u8,
    pub nonce: SpdmNonceStruct,
    pub exchange_data_size: u16,
    pub exchange_data: [u8; SPDM_MAX_DHE_KEY_SIZE],
    pub measurement_summary_hash: SpdmDigestStruct,
    pub opaque: SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
    pub responder_verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmKeyExchangeResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.heartbeat_period.encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.rsp_session_id.encode(bytes);
        self.mut_auth_requested.encode(bytes);
        self.req_slot_id.encode(bytes);
        self.nonce.encode(bytes);
        bytes.extend_from_slice(&self.exchange_data[..self.exchange_data_size as usize]);
        if context.runtime_info.need_measurement_signature {
            self.measurement_summary_hash.spdm_encode(context, bytes);
        }
        self.opaque.spdm_encode(context, bytes);
        self.signature.spdm_encode(context, bytes);
        self.responder_verify_data.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmKeyExchangeResponsePayload> {
        let heartbeat_period = u8::read(r)?;
        u8::read(r)?;
        let rsp_session_id = u16::read(r)?;
        let mut_auth_requested = u8::read(r)?;
        let req_slot_id = u8::read(r)?;
        let nonce = SpdmNonceStruct::read(r)?;
        let exchange_data_size = context.negotiate_info.dhe_sel.get_size();
        let raw = r.take_bytes(exchange_data_size as usize)?;
        let mut exchange_data = [0u8; SPDM_MAX_DHE_KEY_SIZE];
        exchange_data[..exchange_data_size as usize].copy_from_slice(raw);
        let measurement_summary_hash = if context.runtime_info.need_measurement_signature {
            SpdmDigestStruct::spdm_read(context, r)?
        } else {
            SpdmDigestStruct::default()
        };
        let opaque = SpdmOpaqueStruct::spdm_read(context, r)?;
        let signature = SpdmSignatureStruct::spdm_read(context, r)?;
        let responder_verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmKeyExchangeResponsePayload {
            heartbeat_period,
            rsp_session_id,
            mut_auth_requested,
            req_slot_id,
            nonce,
            exchange_data_size,
            exchange_data,
            measurement_summary_hash,
            opaque,
            signature,
            responder_verify_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{SpdmBaseHashAlgo, SpdmDheAlgo};
    use crate::testlib::new_test_context;

    #[test]
    fn key_exchange_request_roundtrips_at_negotiated_dhe_size() {
        let mut context = new_test_context();
        context.negotiate_info.dhe_sel = SpdmDheAlgo::SECP_256_R1;
        context.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;

        let mut payload = SpdmKeyExchangeRequestPayload {
            req_session_id: 0xabcd,
            exchange_data_size: 64,
            ..Default::default()
        };
        payload.exchange_data[..64].copy_from_slice(&[3u8; 64]);

        let mut buf = [0u8; 128];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmKeyExchangeRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.req_session_id, 0xabcd);
        assert_eq!(back.exchange_data_size, 64);
        assert_eq!(&back.exchange_data[..64], &[3u8; 64][..]);
    }
}
