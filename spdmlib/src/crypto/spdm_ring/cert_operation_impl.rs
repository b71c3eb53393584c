// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Certificate-chain walking and validation. DER certs are
//! self-delimiting via their SEQUENCE length prefix, so splitting a
//! concatenated chain is a hand-rolled boundary walk independent of
//! any particular verification library; signature-chain linkage and
//! validity-window checks are then handled with `x509-parser`.

extern crate alloc;

use crate::crypto::cert_operation::{self, CertOperationImpl};
use alloc::vec::Vec;
use x509_parser::prelude::*;

/// Reads a DER SEQUENCE header starting at `chain[offset]` and returns
/// the total length of that TLV (tag + length bytes + contents).
fn der_sequence_len(chain: &[u8], offset: usize) -> Option<usize> {
    if chain.len() < offset + 2 || chain[offset] != 0x30 {
        return None;
    }
    let len_byte = chain[offset + 1];
    if len_byte & 0x80 == 0 {
        Some(2 + len_byte as usize)
    } else {
        let num_len_bytes = (len_byte & 0x7f) as usize;
        if num_len_bytes == 0 || num_len_bytes > 4 || chain.len() < offset + 2 + num_len_bytes {
            return None;
        }
        let mut len = 0usize;
        for b in &chain[offset + 2..offset + 2 + num_len_bytes] {
            len = (len << 8) | (*b as usize);
        }
        Some(2 + num_len_bytes + len)
    }
}

/// Splits `cert_chain` (a back-to-back concatenation of DER
/// certificates, as laid out by a CERTIFICATE response body) and
/// returns the `(start, end)` byte range of the certificate at
/// `index`. `index == -1` selects the last (leaf) certificate.
fn get_cert_from_cert_chain(cert_chain: &[u8], index: isize) -> Option<(usize, usize)> {
    let mut offsets = Vec::new();
    let mut offset = 0usize;
    while offset < cert_chain.len() {
        let len = der_sequence_len(cert_chain, offset)?;
        offsets.push((offset, offset + len));
        offset += len;
    }
    if offsets.is_empty() {
        return None;
    }
    let idx = if index < 0 {
        offsets.len() - 1
    } else {
        index as usize
    };
    offsets.get(idx).copied()
}

/// Walks the chain checking each certificate parses, that every
/// non-root certificate's issuer matches the next certificate's
/// subject, and that every certificate's validity window covers now.
/// A full trust-root check additionally needs a configured anchor
/// store; that comparison (root hash against
/// `peer_root_cert_provision`) happens one layer up in `common`,
/// separating "chain is well-formed" from "chain is trusted".
fn verify_cert_chain(cert_chain: &[u8]) -> bool {
    let mut offset = 0usize;
    let mut certs = Vec::new();
    while offset < cert_chain.len() {
        let len = match der_sequence_len(cert_chain, offset) {
            Some(l) => l,
            None => return false,
        };
        let der = &cert_chain[offset..offset + len];
        match X509Certificate::from_der(der) {
            Ok((_, cert)) => certs.push(cert),
            Err(_) => return false,
        }
        offset += len;
    }
    if certs.is_empty() {
        return false;
    }
    for pair in certs.windows(2) {
        let (child, issuer) = (&pair[0], &pair[1]);
        if child.issuer() != issuer.subject() {
            return false;
        }
    }
    certs.iter().all(|cert| cert.validity().is_valid())
}

pub fn register() {
    cert_operation::register(CertOperationImpl {
        get_cert_from_cert_chain_cb: get_cert_from_cert_chain,
        verify_cert_chain_cb: verify_cert_chain,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_chain() {
        assert!(get_cert_from_cert_chain(&[], -1).is_none());
        assert!(!verify_cert_chain(&[]));
    }

    #[test]
    fn rejects_truncated_der() {
        let bogus = [0x11u8; 3];
        assert!(get_cert_from_cert_chain(&bogus, 0).is_none());
    }

    #[test]
    fn short_form_length_splits_correctly() {
        // Two back-to-back minimal SEQUENCEs: 30 02 AA AA, 30 02 BB BB.
        let chain = [0x30, 0x02, 0xAA, 0xAA, 0x30, 0x02, 0xBB, 0xBB];
        assert_eq!(get_cert_from_cert_chain(&chain, 0), Some((0, 4)));
        assert_eq!(get_cert_from_cert_chain(&chain, 1), Some((4, 8)));
        assert_eq!(get_cert_from_cert_chain(&chain, -1), Some((4, 8)));
    }
}
