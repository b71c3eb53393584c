// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! HKDF (RFC 5869) built directly on `ring::hmac` rather than
//! `ring::hkdf`: the key schedule needs the raw pseudorandom-key bytes
//! from `extract` to feed into several independent `expand_label`
//! calls and eventually into `update_key`'s re-keying, which doesn't
//! fit `ring::hkdf`'s opaque `Prk` type. HKDF is two HMAC constructs,
//! so this is a thin, faithful rebuild rather than a reimplementation
//! of primitives.

use crate::crypto::hkdf::{self, HkdfImpl};
use crate::protocol::SpdmBaseHashAlgo;
use alloc::vec::Vec;

fn ring_hmac_algo(algo: SpdmBaseHashAlgo) -> Option<ring::hmac::Algorithm> {
    match algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Some(ring::hmac::HMAC_SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Some(ring::hmac::HMAC_SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Some(ring::hmac::HMAC_SHA512),
        _ => None,
    }
}

fn extract(
    algo: SpdmBaseHashAlgo,
    salt: &[u8],
    ikm: &[u8],
) -> Option<crate::protocol::SpdmDigestStruct> {
    let ring_algo = ring_hmac_algo(algo)?;
    let key = ring::hmac::Key::new(ring_algo, salt);
    let tag = ring::hmac::sign(&key, ikm);
    let raw = tag.as_ref();
    let mut data = [0u8; crate::protocol::SPDM_MAX_HASH_SIZE];
    data[..raw.len()].copy_from_slice(raw);
    Some(crate::protocol::SpdmDigestStruct {
        data_size: algo.get_size(),
        data,
    })
}

fn expand(algo: SpdmBaseHashAlgo, prk: &[u8], info: &[u8], out_len: usize) -> Option<Vec<u8>> {
    let ring_algo = ring_hmac_algo(algo)?;
    let hash_len = ring_algo.digest_algorithm().output_len();
    let key = ring::hmac::Key::new(ring_algo, prk);
    let mut okm = Vec::with_capacity(out_len);
    let mut t: Vec<u8> = Vec::new();
    let mut counter: u8 = 1;
    while okm.len() < out_len {
        let mut ctx = ring::hmac::Context::with_key(&key);
        ctx.update(&t);
        ctx.update(info);
        ctx.update(&[counter]);
        let tag = ctx.sign();
        t = tag.as_ref().to_vec();
        okm.extend_from_slice(&t);
        counter = counter.checked_add(1)?;
        if counter == 0 && okm.len() < out_len {
            return None;
        }
        let _ = hash_len;
    }
    okm.truncate(out_len);
    Some(okm)
}

pub fn register() {
    hkdf::register(HkdfImpl {
        extract_cb: extract,
        expand_cb: expand,
    });
}
