// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The secured-message AEAD layer: wraps/unwraps application payloads
//! exchanged over an established session, operating on the per-
//! direction key state kept in [`crate::session::SpdmSession`].
//!
//! Wire shape: `SessionID (4B LE) || Length (2B LE) || Ciphertext || Tag`.
//! `Length` counts the ciphertext plus tag, not the two header fields.
//! The AEAD's associated data is `SessionID || SequenceNumber (8B LE) ||
//! Length`, and the nonce is the direction's salt XOR'd with the
//! sequence number (little-endian, right-aligned) — see
//! `SpdmSecureSequenceDirection::current_iv`. The sequence number only
//! advances after a successful encrypt/decrypt, so a failed unwrap
//! never desynchronizes the two ends.

use alloc::vec::Vec;

use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::SPDM_MAX_AEAD_TAG_SIZE;
use crate::session::{SpdmSecureSequenceDirection, SpdmSession};

const SESSION_ID_SIZE: usize = 4;
const LENGTH_SIZE: usize = 2;
pub const SECURED_MESSAGE_HEADER_SIZE: usize = SESSION_ID_SIZE + LENGTH_SIZE;

fn build_aad(session_id: u32, sequence_number: u64, length: u16) -> Vec<u8> {
    let mut aad = Vec::with_capacity(SESSION_ID_SIZE + 8 + LENGTH_SIZE);
    aad.extend_from_slice(&session_id.to_le_bytes());
    aad.extend_from_slice(&sequence_number.to_le_bytes());
    aad.extend_from_slice(&length.to_le_bytes());
    aad
}

fn encrypt_with_direction(
    session_id: u32,
    algo: crate::protocol::SpdmAeadAlgo,
    dir: &mut SpdmSecureSequenceDirection,
    app_payload: &[u8],
    out: &mut [u8],
) -> SpdmResult<usize> {
    let tag_len = algo.get_tag_size() as usize;
    let length = (app_payload.len() + tag_len) as u16;
    let aad = build_aad(session_id, dir.sequence_number, length);
    let iv = dir.current_iv();
    let key = &dir.key[..dir.key_len as usize];

    if out.len() < SECURED_MESSAGE_HEADER_SIZE + length as usize {
        return Err(SpdmStatus::BufferTooSmall);
    }
    out[..SESSION_ID_SIZE].copy_from_slice(&session_id.to_le_bytes());
    out[SESSION_ID_SIZE..SECURED_MESSAGE_HEADER_SIZE].copy_from_slice(&length.to_le_bytes());
    let written = crypto::aead::encrypt(
        algo,
        key,
        &iv[..algo.get_iv_size() as usize],
        &aad,
        app_payload,
        &mut out[SECURED_MESSAGE_HEADER_SIZE..],
    )?;
    dir.advance_sequence()?;
    Ok(SECURED_MESSAGE_HEADER_SIZE + written)
}

/// Wraps an application payload for transmission in the request
/// direction (the direction the Requester encrypts with).
pub fn encode_request(session: &mut SpdmSession, app_payload: &[u8], out: &mut [u8]) -> SpdmResult<usize> {
    let algo = session.aead_algo();
    let session_id = session.session_id;
    encrypt_with_direction(session_id, algo, &mut session.secured_message_context.request_direction, app_payload, out)
}

fn decrypt_with_direction(
    session_id: u32,
    algo: crate::protocol::SpdmAeadAlgo,
    dir: &SpdmSecureSequenceDirection,
    length: u16,
    cipher_and_tag: &[u8],
    out: &mut [u8],
) -> SpdmResult<usize> {
    let aad = build_aad(session_id, dir.sequence_number, length);
    let iv = dir.current_iv();
    let key = &dir.key[..dir.key_len as usize];
    crypto::aead::decrypt(algo, key, &iv[..algo.get_iv_size() as usize], &aad, cipher_and_tag, out)
}

/// Unwraps a secured message received in the response direction (the
/// direction the Responder encrypts with). Falls back to the backed-
/// up previous epoch for the one-message grace period after this end
/// called `update_key` on this direction but the peer's reply still
/// used the old key; a successful fallback decrypt does not itself
/// confirm the update, so callers driving KEY_UPDATE still call
/// `SpdmSession::confirm_key_update` explicitly once they're sure.
pub fn decode_response(session: &mut SpdmSession, wire: &[u8], out: &mut [u8]) -> SpdmResult<usize> {
    if wire.len() < SECURED_MESSAGE_HEADER_SIZE {
        return Err(SpdmStatus::InvalidMsgSize);
    }
    let session_id = u32::from_le_bytes(wire[..SESSION_ID_SIZE].try_into().map_err(|_| SpdmStatus::InvalidMsgSize)?);
    if session_id != session.session_id {
        return Err(SpdmStatus::InvalidMsgField);
    }
    let length = u16::from_le_bytes(
        wire[SESSION_ID_SIZE..SECURED_MESSAGE_HEADER_SIZE]
            .try_into()
            .map_err(|_| SpdmStatus::InvalidMsgSize)?,
    );
    if length as usize > SPDM_MAX_AEAD_TAG_SIZE + out.len() {
        return Err(SpdmStatus::InvalidMsgSize);
    }
    let cipher_and_tag = wire
        .get(SECURED_MESSAGE_HEADER_SIZE..SECURED_MESSAGE_HEADER_SIZE + length as usize)
        .ok_or(SpdmStatus::InvalidMsgSize)?;

    let algo = session.aead_algo();
    let dir = &session.secured_message_context.response_direction;
    match decrypt_with_direction(session_id, algo, dir, length, cipher_and_tag, out) {
        Ok(n) => {
            session.secured_message_context.response_direction.advance_sequence()?;
            Ok(n)
        }
        Err(_) => {
            let backup = dir.backup.clone().ok_or(SpdmStatus::CryptoError)?;
            let n = decrypt_with_direction(session_id, algo, &backup, length, cipher_and_tag, out)?;
            Ok(n)
        }
    }
}
