// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! PSK_EXCHANGE / PSK_EXCHANGE_RSP: session establishment from a
//! pre-shared key instead of an ephemeral DHE exchange. Gated behind
//! the `psk-exchange` feature since it pulls in no extra crypto
//! primitives beyond HKDF, already required for KEY_EXCHANGE.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::{MAX_SPDM_PSK_CONTEXT_SIZE, MAX_SPDM_PSK_HINT_SIZE};
use crate::protocol::{SpdmDigestStruct, SpdmOpaqueStruct};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy)]
pub struct SpdmPskExchangeRequestPayload {
    pub measurement_summary_hash_type: u8,
    pub req_session_id: u16,
    pub psk_hint_size: u16,
    pub psk_hint: [u8; MAX_SPDM_PSK_HINT_SIZE],
    pub psk_context_size: u16,
    pub psk_context: [u8; MAX_SPDM_PSK_CONTEXT_SIZE],
    pub opaque: SpdmOpaqueStruct,
}

impl Default for SpdmPskExchangeRequestPayload {
    fn default() -> Self {
        SpdmPskExchangeRequestPayload {
            measurement_summary_hash_type: 0,
            req_session_id: 0,
            psk_hint_size: 0,
            psk_hint: [0u8; MAX_SPDM_PSK_HINT_SIZE],
            psk_context_size: 0,
            psk_context: [0u8; MAX_SPDM_PSK_CONTEXT_SIZE],
            opaque: SpdmOpaqueStruct::default(),
        }
    }
}

impl SpdmCodec for SpdmPskExchangeRequestPayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.measurement_summary_hash_type.encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.req_session_id.encode(bytes);
        self.psk_hint_size.encode(bytes);
        self.psk_context_size.encode(bytes);
        0u16.encode(bytes); // OpaqueDataLength filled by SpdmOpaqueStruct below
        bytes.extend_from_slice(&self.psk_hint[..self.psk_hint_size as usize]);
        bytes.extend_from_slice(&self.psk_context[..self.psk_context_size as usize]);
        self.opaque.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmPskExchangeRequestPayload> {
        let measurement_summary_hash_type = u8::read(r)?;
        u8::read(r)?;
        let req_session_id = u16::read(r)?;
        let psk_hint_size = u16::read(r)?;
        let psk_context_size = u16::read(r)?;
        u16::read(r)?; // OpaqueDataLength, re-derived from SpdmOpaqueStruct's own prefix
        if psk_hint_size as usize > MAX_SPDM_PSK_HINT_SIZE || psk_context_size as usize > MAX_SPDM_PSK_CONTEXT_SIZE {
            return None;
        }
        let mut psk_hint = [0u8; MAX_SPDM_PSK_HINT_SIZE];
        psk_hint[..psk_hint_size as usize].copy_from_slice(r.take_bytes(psk_hint_size as usize)?);
        let mut psk_context = [0u8; MAX_SPDM_PSK_CONTEXT_SIZE];
        psk_context[..psk_context_size as usize].copy_from_slice(r.take_bytes(psk_context_size as usize)?);
        let opaque = SpdmOpaqueStruct::spdm_read(context, r)?;
        Some(SpdmPskExchangeRequestPayload {
            measurement_summary_hash_type,
            req_session_id,
            psk_hint_size,
            psk_hint,
            psk_context_size,
            psk_context,
            opaque,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmPskExchangeResponsePayload {
    pub heartbeat_period: u8,
    pub rsp_session_id: u16,
    pub psk_context_size: u16,
    pub psk_context: [u8; MAX_SPDM_PSK_CONTEXT_SIZE],
    pub measurement_summary_hash: SpdmDigestStruct,
    pub opaque: SpdmOpaqueStruct,
    pub responder_verify_data: SpdmDigestStruct,
}

impl SpdmCodec for SpdmPskExchangeResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        self.heartbeat_period.encode(bytes); // param1
        0u8.encode(bytes); // param2 reserved
        self.rsp_session_id.encode(bytes);
        self.psk_context_size.encode(bytes);
        0u16.encode(bytes); // OpaqueDataLength, re-derived from SpdmOpaqueStruct's own prefix
        bytes.extend_from_slice(&self.psk_context[..self.psk_context_size as usize]);
        if context.runtime_info.need_measurement_signature {
            self.measurement_summary_hash.spdm_encode(context, bytes);
        }
        self.opaque.spdm_encode(context, bytes);
        self.responder_verify_data.spdm_encode(context, bytes);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmPskExchangeResponsePayload> {
        let heartbeat_period = u8::read(r)?;
        u8::read(r)?;
        let rsp_session_id = u16::read(r)?;
        let psk_context_size = u16::read(r)?;
        u16::read(r)?;
        if psk_context_size as usize > MAX_SPDM_PSK_CONTEXT_SIZE {
            return None;
        }
        let mut psk_context = [0u8; MAX_SPDM_PSK_CONTEXT_SIZE];
        psk_context[..psk_context_size as usize].copy_from_slice(r.take_bytes(psk_context_size as usize)?);
        let measurement_summary_hash = if context.runtime_info.need_measurement_signature {
            SpdmDigestStruct::spdm_read(context, r)?
        } else {
            SpdmDigestStruct::default()
        };
        let opaque = SpdmOpaqueStruct::spdm_read(context, r)?;
        let responder_verify_data = SpdmDigestStruct::spdm_read(context, r)?;
        Some(SpdmPskExchangeResponsePayload {
            heartbeat_period,
            rsp_session_id,
            psk_context_size,
            psk_context,
            measurement_summary_hash,
            opaque,
            responder_verify_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SpdmBaseHashAlgo;
    use crate::testlib::new_test_context;

    #[test]
    fn psk_exchange_request_roundtrips() {
        let mut context = new_test_context();
        context.negotiate_info.base_hash_sel = SpdmBaseHashAlgo::TPM_ALG_SHA_256;

        let mut payload = SpdmPskExchangeRequestPayload {
            req_session_id: 0x1234,
            psk_hint_size: 4,
            ..Default::default()
        };
        payload.psk_hint[..4].copy_from_slice(b"demo");

        let mut buf = [0u8; 64];
        let mut w = Writer::init(&mut buf);
        payload.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmPskExchangeRequestPayload::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.req_session_id, 0x1234);
        assert_eq!(&back.psk_hint[..4], b"demo");
    }
}
