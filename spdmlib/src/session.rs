// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Session store and key schedule: the KEY_EXCHANGE/PSK_EXCHANGE/
//! FINISH derivations. The secured message AEAD wrap/unwrap itself
//! lives in `crate::secured_message`, operating on the fields kept
//! here even though both read and write the same `SpdmSession`.

use crate::common::transcript::TranscriptStream;
use crate::config::MAX_SPDM_SESSION_COUNT;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::{
    SpdmAeadAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmDigestStruct, SpdmKeyScheduleAlgo,
    SPDM_MAX_AEAD_IV_SIZE, SPDM_MAX_AEAD_KEY_SIZE, SPDM_MAX_HASH_SIZE,
};
use zeroize::Zeroize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmSessionState {
    NotStarted,
    Handshaking,
    Established,
    EndSessionReceived,
}

impl Default for SpdmSessionState {
    fn default() -> Self {
        SpdmSessionState::NotStarted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmSessionType {
    None,
    MacOnly,
    EncryptMac,
}

impl Default for SpdmSessionType {
    fn default() -> Self {
        SpdmSessionType::None
    }
}

/// One direction's AEAD state: current key/IV salt, sequence number,
/// and — during the one-message grace period after `update_key` —
/// the previous epoch's key/IV, kept until a message verifies under
/// the new one.
#[derive(Clone, Default, Zeroize)]
pub struct SpdmSecureSequenceDirection {
    pub sequence_number: u64,
    pub key: [u8; SPDM_MAX_AEAD_KEY_SIZE],
    pub key_len: u16,
    pub salt: [u8; SPDM_MAX_AEAD_IV_SIZE],
    pub salt_len: u16,
    /// The traffic secret the current `key`/`salt` were expanded from
    /// — retained so `update_key` can derive the next epoch via
    /// HKDF-Expand-Label("traffic upd", ...) instead of restarting
    /// from the master secret.
    pub traffic_secret: [u8; SPDM_MAX_HASH_SIZE],
    pub traffic_secret_len: u16,
    #[zeroize(skip)]
    pub backup: Option<alloc::boxed::Box<SpdmSecureSequenceDirection>>,
}

impl SpdmSecureSequenceDirection {
    fn set_key(&mut self, key: &[u8], salt: &[u8]) {
        self.key = [0u8; SPDM_MAX_AEAD_KEY_SIZE];
        self.key[..key.len()].copy_from_slice(key);
        self.key_len = key.len() as u16;
        self.salt = [0u8; SPDM_MAX_AEAD_IV_SIZE];
        self.salt[..salt.len()].copy_from_slice(salt);
        self.salt_len = salt.len() as u16;
        self.sequence_number = 0;
    }

    fn set_traffic_secret(&mut self, secret: &[u8]) {
        self.traffic_secret = [0u8; SPDM_MAX_HASH_SIZE];
        self.traffic_secret[..secret.len()].copy_from_slice(secret);
        self.traffic_secret_len = secret.len() as u16;
    }

    pub fn traffic_secret(&self) -> &[u8] {
        &self.traffic_secret[..self.traffic_secret_len as usize]
    }

    /// IV = salt XOR sequence_number, little-endian, right-aligned.
    pub fn current_iv(&self) -> [u8; SPDM_MAX_AEAD_IV_SIZE] {
        let mut iv = self.salt;
        let seq_bytes = self.sequence_number.to_le_bytes();
        let len = self.salt_len as usize;
        for (i, b) in seq_bytes.iter().enumerate() {
            if i < len {
                iv[len - 1 - i] ^= b;
            }
        }
        iv
    }

    pub fn advance_sequence(&mut self) -> SpdmResult {
        self.sequence_number = self
            .sequence_number
            .checked_add(1)
            .ok_or(SpdmStatus::SessionLimitExceeded)?;
        Ok(())
    }

    /// Derives the next epoch's key/IV from the current traffic
    /// secret via HKDF-Expand-Label("traffic upd", ...), stashing the
    /// current epoch in `backup` so a message still in flight under
    /// the old key can be decrypted for one more round trip.
    fn update_key(&mut self, base_hash_algo: SpdmBaseHashAlgo, key_len: usize, iv_len: usize) -> SpdmResult {
        let next_secret = crypto::hkdf::expand_label(
            base_hash_algo,
            self.traffic_secret(),
            "traffic upd",
            &[],
            base_hash_algo.get_size() as usize,
        )?;
        let next_key = crypto::hkdf::expand_label(base_hash_algo, &next_secret, "key", &[], key_len)?;
        let next_iv = crypto::hkdf::expand_label(base_hash_algo, &next_secret, "iv", &[], iv_len)?;

        let previous = alloc::boxed::Box::new(self.clone());
        self.set_key(&next_key, &next_iv);
        self.set_traffic_secret(&next_secret);
        self.backup = Some(previous);
        Ok(())
    }

    /// Drops the backed-up previous epoch once the new key has been
    /// confirmed (KEY_UPDATE's VERIFY_NEW_KEY round trip succeeded).
    fn confirm_key_update(&mut self) {
        self.backup = None;
    }
}

#[derive(Clone, Default, Zeroize)]
pub struct SpdmSecuredMessageContext {
    pub request_direction: SpdmSecureSequenceDirection,
    pub response_direction: SpdmSecureSequenceDirection,
}

/// One live (or handshaking) session.
#[derive(Clone, Default)]
pub struct SpdmSession {
    pub session_id: u32,
    pub session_type: SpdmSessionType,
    session_state: SpdmSessionState,
    pub session_policy: u8,
    pub heartbeat_period: u8,
    pub mut_auth_requested: bool,

    pub message_k: TranscriptStream,
    pub message_f: TranscriptStream,
    pub message_m: TranscriptStream,

    base_hash_algo: SpdmBaseHashAlgo,
    dhe_algo: SpdmDheAlgo,
    aead_algo: SpdmAeadAlgo,
    key_schedule_algo: SpdmKeyScheduleAlgo,

    handshake_secret: SpdmSecret,
    request_handshake_secret: SpdmSecret,
    response_handshake_secret: SpdmSecret,
    finished_key_req: SpdmSecret,
    finished_key_rsp: SpdmSecret,
    master_secret: SpdmSecret,
    request_data_secret: SpdmSecret,
    response_data_secret: SpdmSecret,
    export_master_secret: SpdmSecret,

    pub secured_message_context: SpdmSecuredMessageContext,
}

#[derive(Clone, Copy, Zeroize)]
struct SpdmSecret {
    data: [u8; SPDM_MAX_HASH_SIZE],
    len: u16,
}

impl Default for SpdmSecret {
    fn default() -> Self {
        SpdmSecret {
            data: [0u8; SPDM_MAX_HASH_SIZE],
            len: 0,
        }
    }
}

impl SpdmSecret {
    fn set(&mut self, bytes: &[u8]) {
        self.data = [0u8; SPDM_MAX_HASH_SIZE];
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len() as u16;
    }

    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl SpdmSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setup(&mut self, session_id: u32) -> SpdmResult {
        *self = SpdmSession::default();
        self.session_id = session_id;
        self.session_state = SpdmSessionState::Handshaking;
        Ok(())
    }

    /// Zeroes every secret and returns the slot to `NotStarted`.
    pub fn teardown(&mut self, _session_id: u32) -> SpdmResult {
        self.handshake_secret.zeroize();
        self.request_handshake_secret.zeroize();
        self.response_handshake_secret.zeroize();
        self.finished_key_req.zeroize();
        self.finished_key_rsp.zeroize();
        self.master_secret.zeroize();
        self.request_data_secret.zeroize();
        self.response_data_secret.zeroize();
        self.export_master_secret.zeroize();
        self.secured_message_context.zeroize();
        self.message_k.reset();
        self.message_f.reset();
        self.message_m.reset();
        self.session_state = SpdmSessionState::NotStarted;
        self.session_id = 0;
        Ok(())
    }

    pub fn set_crypto_param(
        &mut self,
        base_hash_algo: SpdmBaseHashAlgo,
        dhe_algo: SpdmDheAlgo,
        aead_algo: SpdmAeadAlgo,
        key_schedule_algo: SpdmKeyScheduleAlgo,
    ) {
        self.base_hash_algo = base_hash_algo;
        self.dhe_algo = dhe_algo;
        self.aead_algo = aead_algo;
        self.key_schedule_algo = key_schedule_algo;
    }

    pub fn session_state(&self) -> SpdmSessionState {
        self.session_state
    }

    pub fn set_session_state(&mut self, state: SpdmSessionState) {
        self.session_state = state;
    }

    fn hkdf_expand_label(&self, secret: &[u8], label: &str, context: &[u8]) -> SpdmResult<alloc::vec::Vec<u8>> {
        let out_len = self.base_hash_algo.get_size() as usize;
        crypto::hkdf::expand_label(self.base_hash_algo, secret, label, context, out_len)
    }

    /// Derives `handshake_secret`, the per-direction handshake
    /// secrets, and the finished keys from the DHE shared secret
    /// and/or PSK and `TH1` (the KEY_EXCHANGE/PSK_EXCHANGE transcript hash).
    pub fn generate_handshake_secret(
        &mut self,
        shared_secret: Option<&[u8]>,
        psk: Option<&[u8]>,
        th1: &SpdmDigestStruct,
    ) -> SpdmResult {
        let hash_size = self.base_hash_algo.get_size() as usize;
        let zero_salt = [0u8; SPDM_MAX_HASH_SIZE];
        let mut ikm = alloc::vec::Vec::new();
        if let Some(s) = shared_secret {
            ikm.extend_from_slice(s);
        }
        if let Some(p) = psk {
            ikm.extend_from_slice(p);
        }
        if ikm.is_empty() {
            return Err(SpdmStatus::InvalidStateLocal);
        }
        let handshake_secret = crypto::hkdf::extract(self.base_hash_algo, &zero_salt[..hash_size], &ikm)?;
        self.handshake_secret.set(handshake_secret.as_ref());

        let req = self.hkdf_expand_label(handshake_secret.as_ref(), "req hs data", th1.as_ref())?;
        let rsp = self.hkdf_expand_label(handshake_secret.as_ref(), "rsp hs data", th1.as_ref())?;
        self.request_handshake_secret.set(&req);
        self.response_handshake_secret.set(&rsp);

        let finished_req = self.hkdf_expand_label(&req, "finished", &[])?;
        let finished_rsp = self.hkdf_expand_label(&rsp, "finished", &[])?;
        self.finished_key_req.set(&finished_req);
        self.finished_key_rsp.set(&finished_rsp);
        Ok(())
    }

    /// Derives `master_secret`, the per-direction data secrets, and
    /// `export_master_secret` from `TH2` (the FINISH transcript hash).
    pub fn generate_data_secret(&mut self, th2: &SpdmDigestStruct) -> SpdmResult {
        let hash_size = self.base_hash_algo.get_size() as usize;
        let zero_ikm = [0u8; SPDM_MAX_HASH_SIZE];
        let salt = self.hkdf_expand_label(self.handshake_secret.as_slice(), "derived", &[])?;
        let master_secret = crypto::hkdf::extract(self.base_hash_algo, &salt, &zero_ikm[..hash_size])?;
        self.master_secret.set(master_secret.as_ref());

        let req = self.hkdf_expand_label(master_secret.as_ref(), "req app data", th2.as_ref())?;
        let rsp = self.hkdf_expand_label(master_secret.as_ref(), "rsp app data", th2.as_ref())?;
        self.request_data_secret.set(&req);
        self.response_data_secret.set(&rsp);

        let export = self.hkdf_expand_label(master_secret.as_ref(), "exp master", th2.as_ref())?;
        self.export_master_secret.set(&export);

        self.derive_direction_keys(true)?;
        self.derive_direction_keys(false)?;
        Ok(())
    }

    fn derive_direction_keys(&mut self, use_handshake_secret: bool) -> SpdmResult {
        let (req_secret, rsp_secret): (&[u8], &[u8]) = if use_handshake_secret {
            (
                self.request_handshake_secret.as_slice(),
                self.response_handshake_secret.as_slice(),
            )
        } else {
            (
                self.request_data_secret.as_slice(),
                self.response_data_secret.as_slice(),
            )
        };
        let key_len = self.aead_algo.get_key_size() as usize;
        let iv_len = self.aead_algo.get_iv_size() as usize;

        let req_key = crypto::hkdf::expand_label(self.base_hash_algo, req_secret, "key", &[], key_len)?;
        let req_iv = crypto::hkdf::expand_label(self.base_hash_algo, req_secret, "iv", &[], iv_len)?;
        let rsp_key = crypto::hkdf::expand_label(self.base_hash_algo, rsp_secret, "key", &[], key_len)?;
        let rsp_iv = crypto::hkdf::expand_label(self.base_hash_algo, rsp_secret, "iv", &[], iv_len)?;

        self.secured_message_context.request_direction.set_key(&req_key, &req_iv);
        self.secured_message_context.request_direction.set_traffic_secret(req_secret);
        self.secured_message_context.response_direction.set_key(&rsp_key, &rsp_iv);
        self.secured_message_context.response_direction.set_traffic_secret(rsp_secret);
        Ok(())
    }

    /// Rolls the requester-to-responder (or the reverse) traffic key
    /// forward one epoch. Driven by `requester::key_update_req`, which
    /// also issues the VERIFY_NEW_KEY round trip before calling
    /// [`SpdmSession::confirm_key_update`].
    pub fn update_key(&mut self, update_request_direction: bool) -> SpdmResult {
        let key_len = self.aead_algo.get_key_size() as usize;
        let iv_len = self.aead_algo.get_iv_size() as usize;
        let base_hash_algo = self.base_hash_algo;
        if update_request_direction {
            self.secured_message_context.request_direction.update_key(base_hash_algo, key_len, iv_len)
        } else {
            self.secured_message_context.response_direction.update_key(base_hash_algo, key_len, iv_len)
        }
    }

    pub fn confirm_key_update(&mut self, update_request_direction: bool) {
        if update_request_direction {
            self.secured_message_context.request_direction.confirm_key_update();
        } else {
            self.secured_message_context.response_direction.confirm_key_update();
        }
    }

    /// Re-applies handshake-phase keys after the handshake secrets are
    /// first derived (KEY_EXCHANGE_RSP processing): the session is
    /// encrypted from that point even though it's still `Handshaking`.
    pub fn activate_handshake_keys(&mut self) -> SpdmResult {
        self.derive_direction_keys(true)
    }

    pub fn activate_data_keys(&mut self) -> SpdmResult {
        self.derive_direction_keys(false)
    }

    pub fn generate_hmac_with_request_finished_key(&self, data: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        crypto::hmac::hmac(self.base_hash_algo, self.finished_key_req.as_slice(), data)
    }

    pub fn generate_hmac_with_response_finished_key(&self, data: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        crypto::hmac::hmac(self.base_hash_algo, self.finished_key_rsp.as_slice(), data)
    }

    pub fn verify_hmac_with_response_finished_key(
        &self,
        data: &[u8],
        expected: &SpdmDigestStruct,
    ) -> SpdmResult {
        crypto::hmac::verify(self.base_hash_algo, self.finished_key_rsp.as_slice(), data, expected.as_ref())
    }

    pub fn export_master_secret(&self) -> &[u8] {
        self.export_master_secret.as_slice()
    }

    pub fn aead_algo(&self) -> SpdmAeadAlgo {
        self.aead_algo
    }

    pub fn base_hash_algo(&self) -> SpdmBaseHashAlgo {
        self.base_hash_algo
    }
}

/// Scans `sessions` for the first `NotStarted` slot and sets it up
/// with `session_id`.
pub fn allocate(sessions: &mut [SpdmSession; MAX_SPDM_SESSION_COUNT], session_id: u32) -> SpdmResult<&mut SpdmSession> {
    for session in sessions.iter_mut() {
        if session.session_state() == SpdmSessionState::NotStarted {
            session.setup(session_id)?;
            return Ok(session);
        }
    }
    Err(SpdmStatus::SessionLimitExceeded)
}

/// Linear search by session id.
pub fn find(sessions: &mut [SpdmSession; MAX_SPDM_SESSION_COUNT], session_id: u32) -> Option<&mut SpdmSession> {
    sessions
        .iter_mut()
        .find(|s| s.session_state() != SpdmSessionState::NotStarted && s.session_id == session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_iv_xors_sequence_into_right_aligned_bytes() {
        let mut dir = SpdmSecureSequenceDirection::default();
        dir.set_key(&[0u8; 32], &[0xffu8; 12]);
        dir.sequence_number = 1;
        let iv = dir.current_iv();
        assert_eq!(iv[11], 0xfe);
        assert_eq!(&iv[..11], &[0xffu8; 11][..]);
    }

    #[test]
    fn sequence_overflow_is_rejected() {
        let mut dir = SpdmSecureSequenceDirection::default();
        dir.sequence_number = u64::MAX;
        assert_eq!(dir.advance_sequence(), Err(SpdmStatus::SessionLimitExceeded));
    }

    #[test]
    fn allocate_then_find_then_teardown_frees_slot() {
        let mut sessions: [SpdmSession; MAX_SPDM_SESSION_COUNT] = Default::default();
        let s = allocate(&mut sessions, 0x1122_3344).unwrap();
        assert_eq!(s.session_state(), SpdmSessionState::Handshaking);
        assert!(find(&mut sessions, 0x1122_3344).is_some());
        find(&mut sessions, 0x1122_3344).unwrap().teardown(0x1122_3344).unwrap();
        assert!(find(&mut sessions, 0x1122_3344).is_none());
    }
}
