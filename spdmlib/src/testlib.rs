// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Test-only fixtures: a connection context wired to fake transport
//! collaborators, plus a scripted `SpdmDeviceIo` that lets a requester
//! handler test hand back a canned response and inspect what was
//! sent. None of this is reachable outside `#[cfg(test)]` builds.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use std::cell::RefCell;
use std::sync::Once;

use crate::common::{SpdmContext, SpdmProvisionInfo};
use crate::config::SpdmConfigInfo;
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::{SpdmAeadAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmDigestStruct, SpdmKeyScheduleAlgo, SPDM_MAX_HASH_SIZE};
use crate::requester::RequesterContext;
use crate::session::SpdmSessionState;
use crate::transport::{SpdmDeviceIo, SpdmTransportEncap};

static CRYPTO_REGISTERED: Once = Once::new();

/// Registers the `spdm_ring` backend exactly once per test binary.
/// Individual backend modules already guard against double
/// registration via `conquer_once`; this additionally avoids the cost
/// of walking all eight `register()` calls on every fixture creation.
pub fn register_crypto_once() {
    CRYPTO_REGISTERED.call_once(|| {
        #[cfg(feature = "spdm-ring")]
        crate::crypto::spdm_ring::register_all();
    });
}

/// Never sends or receives; suitable for tests that only exercise
/// `SpdmCodec`/transcript/session logic against `SpdmContext`'s other
/// fields and never drive an actual exchange.
#[derive(Default)]
struct InertDeviceIo;

impl SpdmDeviceIo for InertDeviceIo {
    fn send(&mut self, _buf: &[u8]) -> SpdmResult {
        Err(SpdmStatus::SendFail)
    }

    fn receive(&mut self, _buf: &mut [u8]) -> SpdmResult<usize> {
        Err(SpdmStatus::ReceiveFail)
    }
}

/// A transport encapsulation that does the least framing possible: a
/// one-byte "has session id" flag, the session id itself (0 if none),
/// and the payload, copied back out verbatim by `decap`. Real
/// transport bindings (MCTP, PCI DOE, ...) are out of scope for this
/// crate; this exists only so requester-level tests can round-trip
/// bytes through the same `encap`/`decap` seam production code uses.
#[derive(Default)]
pub struct PassthroughTransportEncap;

const PASSTHROUGH_HEADER_SIZE: usize = 5;

impl SpdmTransportEncap for PassthroughTransportEncap {
    fn encap(&mut self, session_id: Option<u32>, _is_app_message: bool, payload: &[u8], out_buf: &mut [u8]) -> SpdmResult<usize> {
        if out_buf.len() < PASSTHROUGH_HEADER_SIZE + payload.len() {
            return Err(SpdmStatus::BufferTooSmall);
        }
        out_buf[0] = session_id.is_some() as u8;
        out_buf[1..5].copy_from_slice(&session_id.unwrap_or(0).to_le_bytes());
        out_buf[5..5 + payload.len()].copy_from_slice(payload);
        Ok(PASSTHROUGH_HEADER_SIZE + payload.len())
    }

    fn decap(&mut self, in_out_buf: &mut [u8], len: usize) -> SpdmResult<(Option<u32>, usize)> {
        if len < PASSTHROUGH_HEADER_SIZE {
            return Err(SpdmStatus::InvalidMsgSize);
        }
        let has_session = in_out_buf[0] == 1;
        let session_id = u32::from_le_bytes(in_out_buf[1..5].try_into().map_err(|_| SpdmStatus::InvalidMsgSize)?);
        let payload_len = len - PASSTHROUGH_HEADER_SIZE;
        in_out_buf.copy_within(PASSTHROUGH_HEADER_SIZE..len, 0);
        Ok((if has_session { Some(session_id) } else { None }, payload_len))
    }
}

/// Shared state behind [`ScriptedDeviceIo`]: every `send` is recorded
/// verbatim, and `receive` hands back the next queued response.
#[derive(Default)]
pub struct ScriptedState {
    pub sent: Vec<Vec<u8>>,
    pub responses: VecDeque<Vec<u8>>,
}

pub struct ScriptedDeviceIo(pub &'static RefCell<ScriptedState>);

impl SpdmDeviceIo for ScriptedDeviceIo {
    fn send(&mut self, buf: &[u8]) -> SpdmResult {
        self.0.borrow_mut().sent.push(buf.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> SpdmResult<usize> {
        let response = self.0.borrow_mut().responses.pop_front().ok_or(SpdmStatus::ReceiveFail)?;
        buf[..response.len()].copy_from_slice(&response);
        Ok(response.len())
    }
}

/// A bare connection context for tests that exercise `SpdmCodec`,
/// transcript, or session logic directly and never call
/// `RequesterContext::send_receive`.
pub fn new_test_context() -> SpdmContext<'static> {
    register_crypto_once();
    let device_io: &'static mut dyn SpdmDeviceIo = Box::leak(Box::new(InertDeviceIo::default()));
    let transport_encap: &'static mut dyn SpdmTransportEncap = Box::leak(Box::new(PassthroughTransportEncap::default()));
    SpdmContext::new(device_io, transport_encap, SpdmConfigInfo::default(), SpdmProvisionInfo::default())
}

/// A `RequesterContext` whose transport is scripted to hand back
/// `responses` in order and record every encoded request it was
/// asked to send. The returned handle lets a test inspect `.sent`
/// after driving a handler.
pub fn new_test_requester_with_responses(responses: Vec<Vec<u8>>) -> (RequesterContext<'static>, &'static RefCell<ScriptedState>) {
    register_crypto_once();
    let state: &'static RefCell<ScriptedState> = Box::leak(Box::new(RefCell::new(ScriptedState {
        sent: Vec::new(),
        responses: responses.into(),
    })));
    let device_io: &'static mut dyn SpdmDeviceIo = Box::leak(Box::new(ScriptedDeviceIo(state)));
    let transport_encap: &'static mut dyn SpdmTransportEncap = Box::leak(Box::new(PassthroughTransportEncap::default()));
    let requester = RequesterContext::new(device_io, transport_encap, SpdmConfigInfo::default(), SpdmProvisionInfo::default());
    (requester, state)
}

/// A `RequesterContext` with no scripted responses, for tests that
/// only need `.common` wired up (e.g. pre-seeding negotiated
/// algorithms before checking a handler's precondition gate).
pub fn new_test_requester() -> RequesterContext<'static> {
    new_test_requester_with_responses(Vec::new()).0
}

/// Allocates a session on `requester` and derives both handshake and
/// data-phase keys from fixed, non-secret test material, so secured-
/// message handler tests can encrypt/decrypt without re-running a real
/// DHE exchange.
pub fn establish_test_session(requester: &mut RequesterContext<'static>, session_id: u32) {
    let session = requester.common.allocate_session(session_id).expect("session slot");
    session.set_crypto_param(
        SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        SpdmDheAlgo::SECP_256_R1,
        SpdmAeadAlgo::AES_128_GCM,
        SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE,
    );
    let th1 = SpdmDigestStruct { data_size: 32, data: [7u8; SPDM_MAX_HASH_SIZE] };
    session.generate_handshake_secret(Some(&[1u8; 32]), None, &th1).unwrap();
    session.activate_handshake_keys().unwrap();
    let th2 = SpdmDigestStruct { data_size: 32, data: [9u8; SPDM_MAX_HASH_SIZE] };
    session.generate_data_secret(&th2).unwrap();
    session.set_session_state(SpdmSessionState::Established);
}

/// Like [`establish_test_session`] but stops once handshake keys are
/// active, leaving the session in `Handshaking` state with no data
/// secrets derived yet — the state FINISH/PSK_FINISH run in.
pub fn establish_test_handshaking_session(requester: &mut RequesterContext<'static>, session_id: u32) {
    let session = requester.common.allocate_session(session_id).expect("session slot");
    session.set_crypto_param(
        SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        SpdmDheAlgo::SECP_256_R1,
        SpdmAeadAlgo::AES_128_GCM,
        SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE,
    );
    let th1 = SpdmDigestStruct { data_size: 32, data: [7u8; SPDM_MAX_HASH_SIZE] };
    session.generate_handshake_secret(Some(&[1u8; 32]), None, &th1).unwrap();
    session.activate_handshake_keys().unwrap();
    session.set_session_state(SpdmSessionState::Handshaking);
}

/// Encrypts `app_payload` (a full `SpdmMessageHeader` + payload) in the
/// response direction of `session_id`'s session the way a real
/// Responder would, then wraps it in the passthrough transport framing
/// so it can be queued as a scripted response for
/// `receive_secured_response` to unwrap.
pub fn encode_secured_response(requester: &mut RequesterContext<'static>, session_id: u32, app_payload: &[u8]) -> Vec<u8> {
    let session = requester.common.get_session_via_id(session_id).expect("session");
    let algo = session.aead_algo();
    let dir = session.secured_message_context.response_direction.clone();
    let tag_len = algo.get_tag_size() as usize;
    let length = (app_payload.len() + tag_len) as u16;

    let mut aad = Vec::with_capacity(4 + 8 + 2);
    aad.extend_from_slice(&session_id.to_le_bytes());
    aad.extend_from_slice(&dir.sequence_number.to_le_bytes());
    aad.extend_from_slice(&length.to_le_bytes());
    let iv = dir.current_iv();
    let key = &dir.key[..dir.key_len as usize];

    let mut cipher_and_tag = alloc::vec![0u8; app_payload.len() + tag_len];
    crate::crypto::aead::encrypt(algo, key, &iv[..algo.get_iv_size() as usize], &aad, app_payload, &mut cipher_and_tag).unwrap();

    let mut secured = Vec::with_capacity(4 + 2 + cipher_and_tag.len());
    secured.extend_from_slice(&session_id.to_le_bytes());
    secured.extend_from_slice(&length.to_le_bytes());
    secured.extend_from_slice(&cipher_and_tag);

    let mut framed = alloc::vec![0u8; PASSTHROUGH_HEADER_SIZE + secured.len()];
    framed[0] = 1;
    framed[1..5].copy_from_slice(&session_id.to_le_bytes());
    framed[PASSTHROUGH_HEADER_SIZE..].copy_from_slice(&secured);
    framed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_encap_roundtrips_session_id() {
        let mut encap = PassthroughTransportEncap::default();
        let mut buf = [0u8; 64];
        let used = encap.encap(Some(7), true, b"hello", &mut buf).unwrap();
        let (session_id, len) = encap.decap(&mut buf[..used], used).unwrap();
        assert_eq!(session_id, Some(7));
        assert_eq!(&buf[..len], b"hello");
    }

    #[test]
    fn scripted_device_io_replays_queued_responses() {
        let (requester, state) = new_test_requester_with_responses(Vec::from([Vec::from(*b"rsp1")]));
        drop(requester);
        assert_eq!(state.borrow().responses.len(), 1);
    }
}
