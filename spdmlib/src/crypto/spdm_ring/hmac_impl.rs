// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::crypto::hmac::{self, HmacImpl};
use crate::protocol::{SpdmBaseHashAlgo, SpdmDigestStruct};

fn ring_hmac_algo(algo: SpdmBaseHashAlgo) -> Option<ring::hmac::Algorithm> {
    match algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Some(ring::hmac::HMAC_SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Some(ring::hmac::HMAC_SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Some(ring::hmac::HMAC_SHA512),
        _ => None,
    }
}

fn hmac(algo: SpdmBaseHashAlgo, key: &[u8], data: &[u8]) -> Option<SpdmDigestStruct> {
    let ring_algo = ring_hmac_algo(algo)?;
    let key = ring::hmac::Key::new(ring_algo, key);
    let tag = ring::hmac::sign(&key, data);
    let raw = tag.as_ref();
    let mut out = [0u8; crate::protocol::SPDM_MAX_HASH_SIZE];
    out[..raw.len()].copy_from_slice(raw);
    Some(SpdmDigestStruct {
        data_size: algo.get_size(),
        data: out,
    })
}

pub fn register() {
    hmac::register(HmacImpl { hmac_cb: hmac });
}
