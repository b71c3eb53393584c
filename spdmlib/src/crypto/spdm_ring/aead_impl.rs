// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

extern crate alloc;

use crate::crypto::aead::{self, AeadImpl};
use crate::protocol::SpdmAeadAlgo;
use alloc::vec::Vec;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey};

fn ring_algo(algo: SpdmAeadAlgo) -> Option<&'static ring::aead::Algorithm> {
    match algo {
        SpdmAeadAlgo::AES_128_GCM => Some(&ring::aead::AES_128_GCM),
        SpdmAeadAlgo::AES_256_GCM => Some(&ring::aead::AES_256_GCM),
        SpdmAeadAlgo::CHACHA20_POLY1305 => Some(&ring::aead::CHACHA20_POLY1305),
        SpdmAeadAlgo::Unknown(_) => None,
    }
}

fn encrypt(
    algo: SpdmAeadAlgo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plain_text: &[u8],
    out: &mut [u8],
) -> Option<usize> {
    let alg = ring_algo(algo)?;
    let unbound = UnboundKey::new(alg, key).ok()?;
    let key = LessSafeKey::new(unbound);
    let nonce = Nonce::try_assume_unique_for_key(iv).ok()?;
    let tag_len = alg.tag_len();
    if out.len() < plain_text.len() + tag_len {
        return None;
    }
    out[..plain_text.len()].copy_from_slice(plain_text);
    let tag = key
        .seal_in_place_separate_tag(nonce, Aad::from(aad), &mut out[..plain_text.len()])
        .ok()?;
    out[plain_text.len()..plain_text.len() + tag_len].copy_from_slice(tag.as_ref());
    Some(plain_text.len() + tag_len)
}

fn decrypt(
    algo: SpdmAeadAlgo,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    cipher_and_tag: &[u8],
    out: &mut [u8],
) -> Option<usize> {
    let alg = ring_algo(algo)?;
    let unbound = UnboundKey::new(alg, key).ok()?;
    let key = LessSafeKey::new(unbound);
    let nonce = Nonce::try_assume_unique_for_key(iv).ok()?;
    let mut buf: Vec<u8> = cipher_and_tag.to_vec();
    let plain = key.open_in_place(nonce, Aad::from(aad), &mut buf).ok()?;
    if out.len() < plain.len() {
        return None;
    }
    out[..plain.len()].copy_from_slice(plain);
    Some(plain.len())
}

pub fn register() {
    aead::register(AeadImpl {
        encrypt_cb: encrypt,
        decrypt_cb: decrypt,
    });
}
