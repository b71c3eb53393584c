// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::crypto::hash::{self, HashImpl};
use crate::crypto::HashCtx;
use crate::protocol::{SpdmBaseHashAlgo, SpdmDigestStruct};

fn ring_algo(algo: SpdmBaseHashAlgo) -> Option<&'static ring::digest::Algorithm> {
    match algo {
        SpdmBaseHashAlgo::TPM_ALG_SHA_256 => Some(&ring::digest::SHA256),
        SpdmBaseHashAlgo::TPM_ALG_SHA_384 => Some(&ring::digest::SHA384),
        SpdmBaseHashAlgo::TPM_ALG_SHA_512 => Some(&ring::digest::SHA512),
        // ring has no SHA3 family; SPDM permits it but this backend
        // doesn't implement it (no crate in the stack provides it).
        _ => None,
    }
}

fn to_digest_struct(algo: SpdmBaseHashAlgo, digest: ring::digest::Digest) -> SpdmDigestStruct {
    let raw = digest.as_ref();
    let mut data = [0u8; crate::protocol::SPDM_MAX_HASH_SIZE];
    data[..raw.len()].copy_from_slice(raw);
    SpdmDigestStruct {
        data_size: algo.get_size(),
        data,
    }
}

fn hash_all(algo: SpdmBaseHashAlgo, data: &[u8]) -> Option<SpdmDigestStruct> {
    let ring_algo = ring_algo(algo)?;
    Some(to_digest_struct(algo, ring::digest::digest(ring_algo, data)))
}

fn hash_ctx_new(algo: SpdmBaseHashAlgo) -> Option<HashCtx> {
    let ring_algo = ring_algo(algo)?;
    Some(HashCtx::Ring(ring::digest::Context::new(ring_algo)))
}

fn hash_ctx_update(ctx: &mut HashCtx, data: &[u8]) {
    let HashCtx::Ring(ctx) = ctx;
    ctx.update(data);
}

fn hash_ctx_finalize(ctx: HashCtx) -> Option<SpdmDigestStruct> {
    let HashCtx::Ring(ctx) = ctx;
    let algo = match ctx.algorithm().output_len() {
        32 => SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        48 => SpdmBaseHashAlgo::TPM_ALG_SHA_384,
        64 => SpdmBaseHashAlgo::TPM_ALG_SHA_512,
        _ => return None,
    };
    Some(to_digest_struct(algo, ctx.finish()))
}

pub fn register() {
    hash::register(HashImpl {
        hash_all_cb: hash_all,
        hash_ctx_new_cb: hash_ctx_new,
        hash_ctx_update_cb: hash_ctx_update,
        hash_ctx_finalize_cb: hash_ctx_finalize,
    });
}
