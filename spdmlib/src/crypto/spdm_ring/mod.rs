// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Default crypto backend, built on crates.io `ring` and
//! `x509-parser` for certificate-chain walking. See DESIGN.md for the
//! rationale behind this pairing.

mod aead_impl;
mod asym_impl;
mod cert_operation_impl;
mod dhe_impl;
mod hash_impl;
mod hkdf_impl;
mod hmac_impl;
mod rand_impl;

/// Registers every category with the `ring`-backed implementation.
/// Call once, before any handshake is driven (`testlib` does this for
/// every test context; a real embedder calls it once at startup).
pub fn register_all() {
    hash_impl::register();
    hmac_impl::register();
    hkdf_impl::register();
    asym_impl::register();
    dhe_impl::register();
    aead_impl::register();
    rand_impl::register();
    cert_operation_impl::register();
}
