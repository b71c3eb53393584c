// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Uniform interface over hash/HMAC/HKDF/signature/DHE/AEAD primitives,
//! dispatched by algorithm id. Every category is a registry of
//! function pointers filled in once at startup via `register()`,
//! backed by `conquer_once` so a second registration attempt is a
//! silent no-op rather than a panic mid-handshake.
//!
//! None of the categories here implement cryptography themselves;
//! `spdm_ring` is the one concrete backend shipped in this crate, and
//! it is what `register()` is called with by default (see
//! `spdm_ring::register_all`).

use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::*;
use alloc::boxed::Box;
use alloc::vec::Vec;
use conquer_once::spin::OnceCell;

#[cfg(feature = "spdm-ring")]
pub mod spdm_ring;

/// A running hash context, opaque to everything except the
/// registered backend. Exists so the transcript manager can offer a
/// "running hash" backing without hard-coding a crypto library
/// dependency into `common::transcript`.
pub enum HashCtx {
    #[cfg(feature = "spdm-ring")]
    Ring(ring::digest::Context),
}

impl Clone for HashCtx {
    fn clone(&self) -> Self {
        match self {
            #[cfg(feature = "spdm-ring")]
            HashCtx::Ring(ctx) => HashCtx::Ring(ctx.clone()),
        }
    }
}

pub mod hash {
    use super::*;

    pub struct HashImpl {
        pub hash_all_cb: fn(SpdmBaseHashAlgo, &[u8]) -> Option<SpdmDigestStruct>,
        pub hash_ctx_new_cb: fn(SpdmBaseHashAlgo) -> Option<HashCtx>,
        pub hash_ctx_update_cb: fn(&mut HashCtx, &[u8]),
        pub hash_ctx_finalize_cb: fn(HashCtx) -> Option<SpdmDigestStruct>,
    }

    static INSTANCE: OnceCell<HashImpl> = OnceCell::uninit();

    pub fn register(v: HashImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn hash_all(algo: SpdmBaseHashAlgo, data: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.hash_all_cb)(algo, data).ok_or(SpdmStatus::CryptoError)
    }

    pub fn hash_ctx_new(algo: SpdmBaseHashAlgo) -> SpdmResult<HashCtx> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.hash_ctx_new_cb)(algo).ok_or(SpdmStatus::CryptoError)
    }

    pub fn hash_ctx_update(ctx: &mut HashCtx, data: &[u8]) -> SpdmResult {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.hash_ctx_update_cb)(ctx, data);
        Ok(())
    }

    pub fn hash_ctx_finalize(ctx: HashCtx) -> SpdmResult<SpdmDigestStruct> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.hash_ctx_finalize_cb)(ctx).ok_or(SpdmStatus::CryptoError)
    }
}

pub mod hmac {
    use super::*;

    pub struct HmacImpl {
        pub hmac_cb: fn(SpdmBaseHashAlgo, key: &[u8], data: &[u8]) -> Option<SpdmDigestStruct>,
    }

    static INSTANCE: OnceCell<HmacImpl> = OnceCell::uninit();

    pub fn register(v: HmacImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn hmac(algo: SpdmBaseHashAlgo, key: &[u8], data: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.hmac_cb)(algo, key, data).ok_or(SpdmStatus::CryptoError)
    }

    /// Constant-time comparison, required when verifying FINISH/
    /// PSK_FINISH HMACs: a short-circuiting `==` would leak mismatch
    /// position through timing.
    pub fn verify(algo: SpdmBaseHashAlgo, key: &[u8], data: &[u8], tag: &[u8]) -> SpdmResult {
        let computed = hmac(algo, key, data)?;
        let expected = computed.as_ref();
        if expected.len() != tag.len() {
            return Err(SpdmStatus::VerifyFail);
        }
        let mut diff = 0u8;
        for (a, b) in expected.iter().zip(tag.iter()) {
            diff |= a ^ b;
        }
        if diff == 0 {
            Ok(())
        } else {
            Err(SpdmStatus::VerifyFail)
        }
    }
}

pub mod hkdf {
    use super::*;

    pub struct HkdfImpl {
        pub extract_cb: fn(SpdmBaseHashAlgo, salt: &[u8], ikm: &[u8]) -> Option<SpdmDigestStruct>,
        pub expand_cb: fn(SpdmBaseHashAlgo, prk: &[u8], info: &[u8], out_len: usize) -> Option<Vec<u8>>,
    }

    static INSTANCE: OnceCell<HkdfImpl> = OnceCell::uninit();

    pub fn register(v: HkdfImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn extract(algo: SpdmBaseHashAlgo, salt: &[u8], ikm: &[u8]) -> SpdmResult<SpdmDigestStruct> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.extract_cb)(algo, salt, ikm).ok_or(SpdmStatus::CryptoError)
    }

    pub fn expand(algo: SpdmBaseHashAlgo, prk: &[u8], info: &[u8], out_len: usize) -> SpdmResult<Vec<u8>> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.expand_cb)(algo, prk, info, out_len).ok_or(SpdmStatus::CryptoError)
    }

    /// RFC 8446-style `HKDF-Expand-Label`, re-keyed for SPDM's label
    /// prefix (used by `update_key` and by KEY_EXCHANGE's `req/rsp hs
    /// data` and `finished` labels).
    pub fn expand_label(
        algo: SpdmBaseHashAlgo,
        prk: &[u8],
        label: &str,
        context: &[u8],
        out_len: usize,
    ) -> SpdmResult<Vec<u8>> {
        let mut info = Vec::new();
        info.extend_from_slice(&(out_len as u16).to_be_bytes());
        let full_label = alloc::format!("spdm1.1 {}", label);
        info.push(full_label.len() as u8);
        info.extend_from_slice(full_label.as_bytes());
        info.push(context.len() as u8);
        info.extend_from_slice(context);
        expand(algo, prk, &info, out_len)
    }
}

pub mod asym_verify {
    use super::*;

    pub struct AsymVerifyImpl {
        pub verify_cb: fn(
            base_hash_algo: SpdmBaseHashAlgo,
            base_asym_algo: SpdmBaseAsymAlgo,
            public_cert_der: &[u8],
            data: &[u8],
            signature: &SpdmSignatureStruct,
        ) -> bool,
    }

    static INSTANCE: OnceCell<AsymVerifyImpl> = OnceCell::uninit();

    pub fn register(v: AsymVerifyImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn verify(
        base_hash_algo: SpdmBaseHashAlgo,
        base_asym_algo: SpdmBaseAsymAlgo,
        public_cert_der: &[u8],
        data: &[u8],
        signature: &SpdmSignatureStruct,
    ) -> SpdmResult {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        if (imp.verify_cb)(base_hash_algo, base_asym_algo, public_cert_der, data, signature) {
            Ok(())
        } else {
            Err(SpdmStatus::VerifyFail)
        }
    }
}

/// Signing is only needed for mutual-authentication responses (the
/// Requester proving its own identity back to the Responder); kept
/// separate from `asym_verify` because an embedder without mutual
/// auth need not register a signing key at all.
pub mod asym_sign {
    use super::*;

    pub struct AsymSignImpl {
        pub sign_cb: fn(
            base_hash_algo: SpdmBaseHashAlgo,
            req_asym_algo: SpdmReqAsymAlgo,
            is_data_hash: bool,
            private_key: &[u8],
            msg: &[u8],
        ) -> Option<SpdmSignatureStruct>,
    }

    static INSTANCE: OnceCell<AsymSignImpl> = OnceCell::uninit();

    pub fn register(v: AsymSignImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn sign(
        base_hash_algo: SpdmBaseHashAlgo,
        req_asym_algo: SpdmReqAsymAlgo,
        is_data_hash: bool,
        private_key: &[u8],
        msg: &[u8],
    ) -> SpdmResult<SpdmSignatureStruct> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.sign_cb)(base_hash_algo, req_asym_algo, is_data_hash, private_key, msg)
            .ok_or(SpdmStatus::CryptoError)
    }
}

/// One party's half of an ephemeral DHE/ECDHE exchange. Consumes
/// `self` on `compute_shared` since a private key must never be used
/// twice.
pub trait SpdmDheKeyExchange {
    fn public_key(&self) -> &[u8];
    fn compute_shared(self: Box<Self>, peer_public: &[u8]) -> SpdmResult<Vec<u8>>;
}

pub mod dhe {
    use super::*;

    pub struct DheImpl {
        pub generate_key_pair_cb: fn(SpdmDheAlgo) -> Option<Box<dyn SpdmDheKeyExchange>>,
    }

    static INSTANCE: OnceCell<DheImpl> = OnceCell::uninit();

    pub fn register(v: DheImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn generate_key_pair(algo: SpdmDheAlgo) -> SpdmResult<Box<dyn SpdmDheKeyExchange>> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.generate_key_pair_cb)(algo).ok_or(SpdmStatus::CryptoError)
    }
}

pub mod aead {
    use super::*;

    pub struct AeadImpl {
        pub encrypt_cb: fn(
            algo: SpdmAeadAlgo,
            key: &[u8],
            iv: &[u8],
            aad: &[u8],
            plain_text: &[u8],
            out: &mut [u8],
        ) -> Option<usize>,
        pub decrypt_cb: fn(
            algo: SpdmAeadAlgo,
            key: &[u8],
            iv: &[u8],
            aad: &[u8],
            cipher_and_tag: &[u8],
            out: &mut [u8],
        ) -> Option<usize>,
    }

    static INSTANCE: OnceCell<AeadImpl> = OnceCell::uninit();

    pub fn register(v: AeadImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn encrypt(
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plain_text: &[u8],
        out: &mut [u8],
    ) -> SpdmResult<usize> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.encrypt_cb)(algo, key, iv, aad, plain_text, out).ok_or(SpdmStatus::CryptoError)
    }

    pub fn decrypt(
        algo: SpdmAeadAlgo,
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        cipher_and_tag: &[u8],
        out: &mut [u8],
    ) -> SpdmResult<usize> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        // A single status (`CryptoError`) covers both "tag mismatch"
        // and "length mismatch": the API must not let a caller
        // distinguish the two and leak a timing side channel.
        (imp.decrypt_cb)(algo, key, iv, aad, cipher_and_tag, out).ok_or(SpdmStatus::CryptoError)
    }
}

pub mod rand {
    use super::*;

    pub struct RandImpl {
        pub get_random_cb: fn(&mut [u8]) -> bool,
    }

    static INSTANCE: OnceCell<RandImpl> = OnceCell::uninit();

    pub fn register(v: RandImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn get_random(buf: &mut [u8]) -> SpdmResult {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        if (imp.get_random_cb)(buf) {
            Ok(())
        } else {
            Err(SpdmStatus::CryptoError)
        }
    }
}

pub mod cert_operation {
    use super::*;

    pub struct CertOperationImpl {
        pub get_cert_from_cert_chain_cb: fn(cert_chain: &[u8], index: isize) -> Option<(usize, usize)>,
        pub verify_cert_chain_cb: fn(cert_chain: &[u8]) -> bool,
    }

    static INSTANCE: OnceCell<CertOperationImpl> = OnceCell::uninit();

    pub fn register(v: CertOperationImpl) {
        let _ = INSTANCE.try_init_once(|| v);
    }

    pub fn get_cert_from_cert_chain(cert_chain: &[u8], index: isize) -> SpdmResult<(usize, usize)> {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        (imp.get_cert_from_cert_chain_cb)(cert_chain, index).ok_or(SpdmStatus::InvalidMsgField)
    }

    pub fn verify_cert_chain(cert_chain: &[u8]) -> SpdmResult {
        let imp = INSTANCE.get().ok_or(SpdmStatus::CryptoError)?;
        if (imp.verify_cert_chain_cb)(cert_chain) {
            Ok(())
        } else {
            Err(SpdmStatus::VerifyCertFail)
        }
    }
}
