// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::crypto::asym_verify::{self, AsymVerifyImpl};
use crate::protocol::{SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmSignatureStruct};
use x509_parser::prelude::*;

/// Pulls the raw `subjectPublicKey` bit-string content out of a leaf
/// certificate. For both RSA and EC keys this is exactly the byte
/// string `ring::signature::UnparsedPublicKey` expects: RSA's is the
/// PKCS#1 `RSAPublicKey` DER sequence, EC's is the uncompressed point,
/// and in both cases that's what the SPKI embeds verbatim.
fn leaf_public_key(cert_der: &[u8]) -> Option<alloc::vec::Vec<u8>> {
    let (_, cert) = X509Certificate::from_der(cert_der).ok()?;
    Some(cert.public_key().subject_public_key.data.to_vec())
}

fn ring_verify_algo(
    base_hash_algo: SpdmBaseHashAlgo,
    base_asym_algo: SpdmBaseAsymAlgo,
) -> Option<&'static dyn ring::signature::VerificationAlgorithm> {
    use ring::signature::{
        ECDSA_P256_SHA256_FIXED, ECDSA_P384_SHA384_FIXED, RSA_PKCS1_2048_8192_SHA256,
        RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512, RSA_PSS_2048_8192_SHA256,
        RSA_PSS_2048_8192_SHA384, RSA_PSS_2048_8192_SHA512,
    };
    match (base_asym_algo, base_hash_algo) {
        (SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256, SpdmBaseHashAlgo::TPM_ALG_SHA_256) => {
            Some(&ECDSA_P256_SHA256_FIXED)
        }
        (SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384, SpdmBaseHashAlgo::TPM_ALG_SHA_384) => {
            Some(&ECDSA_P384_SHA384_FIXED)
        }
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        ) => Some(&RSA_PKCS1_2048_8192_SHA256),
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384,
        ) => Some(&RSA_PKCS1_2048_8192_SHA384),
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_512,
        ) => Some(&RSA_PKCS1_2048_8192_SHA512),
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_256,
        ) => Some(&RSA_PSS_2048_8192_SHA256),
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384,
        ) => Some(&RSA_PSS_2048_8192_SHA384),
        (
            SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072
            | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096,
            SpdmBaseHashAlgo::TPM_ALG_SHA_512,
        ) => Some(&RSA_PSS_2048_8192_SHA512),
        _ => None,
    }
}

fn verify(
    base_hash_algo: SpdmBaseHashAlgo,
    base_asym_algo: SpdmBaseAsymAlgo,
    public_cert_der: &[u8],
    data: &[u8],
    signature: &SpdmSignatureStruct,
) -> bool {
    let key_bytes = match leaf_public_key(public_cert_der) {
        Some(k) => k,
        None => return false,
    };
    let algo = match ring_verify_algo(base_hash_algo, base_asym_algo) {
        Some(a) => a,
        None => return false,
    };
    ring::signature::UnparsedPublicKey::new(algo, &key_bytes)
        .verify(data, signature.as_ref())
        .is_ok()
}

pub fn register() {
    asym_verify::register(AsymVerifyImpl { verify_cb: verify });
}
