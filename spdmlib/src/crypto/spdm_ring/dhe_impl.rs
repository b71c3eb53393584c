// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! ECDHE via `ring::agreement`. The FFDHE groups SPDM also allows
//! (`FFDHE_2048/3072/4096`) have no finite-field Diffie-Hellman
//! implementation anywhere in this crate's stack — `ring` is
//! elliptic-curve only — so `generate_key_pair` returns `None` for
//! them; an embedder that needs FFDHE has to register its own
//! `dhe::DheImpl` ahead of `spdm_ring::register_all`'s (the registry
//! keeps the first registration, so call the specialized one first).

extern crate alloc;

use crate::crypto::dhe::{self, DheImpl};
use crate::crypto::SpdmDheKeyExchange;
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::SpdmDheAlgo;
use alloc::boxed::Box;
use alloc::vec::Vec;
use ring::agreement;
use ring::rand::SystemRandom;

fn ring_alg(algo: SpdmDheAlgo) -> Option<&'static agreement::Algorithm> {
    match algo {
        SpdmDheAlgo::SECP_256_R1 => Some(&agreement::ECDH_P256),
        SpdmDheAlgo::SECP_384_R1 => Some(&agreement::ECDH_P384),
        _ => None,
    }
}

struct RingDhe {
    private: agreement::EphemeralPrivateKey,
    public: Vec<u8>,
    alg: &'static agreement::Algorithm,
}

impl SpdmDheKeyExchange for RingDhe {
    fn public_key(&self) -> &[u8] {
        &self.public
    }

    fn compute_shared(self: Box<Self>, peer_public: &[u8]) -> SpdmResult<Vec<u8>> {
        let peer = agreement::UnparsedPublicKey::new(self.alg, peer_public);
        agreement::agree_ephemeral(self.private, &peer, |shared_secret| Ok(shared_secret.to_vec()))
            .map_err(|_| SpdmStatus::CryptoError)
    }
}

fn generate_key_pair(algo: SpdmDheAlgo) -> Option<Box<dyn SpdmDheKeyExchange>> {
    let alg = ring_alg(algo)?;
    let rng = SystemRandom::new();
    let private = agreement::EphemeralPrivateKey::generate(alg, &rng).ok()?;
    let public = private.compute_public_key().ok()?.as_ref().to_vec();
    Some(Box::new(RingDhe {
        private,
        public,
        alg,
    }))
}

pub fn register() {
    dhe::register(DheImpl {
        generate_key_pair_cb: generate_key_pair,
    });
}
