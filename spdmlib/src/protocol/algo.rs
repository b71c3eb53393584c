// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use bitflags::bitflags;
use codec::{enum_builder, Codec, Reader, Writer};

pub const SPDM_NONCE_SIZE: usize = 32;
pub const SPDM_MAX_HASH_SIZE: usize = 64;
pub const SPDM_MAX_ASYM_KEY_SIZE: usize = 512;
pub const SPDM_MAX_DHE_KEY_SIZE: usize = 132;
pub const SPDM_MAX_AEAD_KEY_SIZE: usize = 32;
pub const SPDM_MAX_AEAD_IV_SIZE: usize = 12;
pub const SPDM_MAX_AEAD_TAG_SIZE: usize = 16;

bitflags! {
    #[derive(Default)]
    pub struct SpdmRequestCapabilityFlags: u32 {
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0001_0000_0000;
        const KEY_EX_CAP = 0b0010_0000_0000;
        const PSK_CAP = 0b0100_0000_0000;
        const ENCAP_CAP = 0b0000_1000;
        const HBEAT_CAP = 0b0001_0000;
        const KEY_UPD_CAP = 0b0010_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000;
        const CSR_CAP = 0b1_0000_0000_0000;
        const CHUNK_CAP = 0b10_0000_0000_0000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmResponseCapabilityFlags: u32 {
        const CACHE_CAP = 0b0000_0001;
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const MEAS_CAP_NO_SIG = 0b0000_1000;
        const MEAS_CAP_SIG = 0b0001_0000;
        const MEAS_FRESH_CAP = 0b0010_0000;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0001_0000_0000;
        const KEY_EX_CAP = 0b0010_0000_0000;
        const PSK_CAP = 0b0100_0000_0000;
        const ENCAP_CAP = 0b0000_1000_0000_0000_0000;
        const HBEAT_CAP = 0b0001_0000_0000_0000_0000;
        const KEY_UPD_CAP = 0b0010_0000_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000;
        const PUB_KEY_ID_CAP = 0b1_0000_0000_0000;
        const CSR_CAP = 0b10_0000_0000_0000;
        const CHUNK_CAP = 0b100_0000_0000_0000;
    }
}

impl Codec for SpdmRequestCapabilityFlags {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        Self::from_bits(u32::read(r)?)
    }
}

impl Codec for SpdmResponseCapabilityFlags {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }
    fn read(r: &mut Reader) -> Option<Self> {
        Self::from_bits(u32::read(r)?)
    }
}

enum_builder! {
    @U32
    EnumName: SpdmBaseHashAlgo;
    EnumVal {
        TPM_ALG_SHA_256 => 0b0000_0001,
        TPM_ALG_SHA_384 => 0b0000_0010,
        TPM_ALG_SHA_512 => 0b0000_0100,
        TPM_ALG_SHA3_256 => 0b0000_1000,
        TPM_ALG_SHA3_384 => 0b0001_0000,
        TPM_ALG_SHA3_512 => 0b0010_0000
    }
}

impl SpdmBaseHashAlgo {
    pub fn get_size(&self) -> u16 {
        match self {
            SpdmBaseHashAlgo::TPM_ALG_SHA_256 | SpdmBaseHashAlgo::TPM_ALG_SHA3_256 => 32,
            SpdmBaseHashAlgo::TPM_ALG_SHA_384 | SpdmBaseHashAlgo::TPM_ALG_SHA3_384 => 48,
            SpdmBaseHashAlgo::TPM_ALG_SHA_512 | SpdmBaseHashAlgo::TPM_ALG_SHA3_512 => 64,
            SpdmBaseHashAlgo::Unknown(_) => 0,
        }
    }
}

enum_builder! {
    @U32
    EnumName: SpdmBaseAsymAlgo;
    EnumVal {
        TPM_ALG_RSASSA_2048 => 0b0000_0001,
        TPM_ALG_RSAPSS_2048 => 0b0000_0010,
        TPM_ALG_RSASSA_3072 => 0b0000_0100,
        TPM_ALG_RSAPSS_3072 => 0b0000_1000,
        TPM_ALG_ECDSA_ECC_NIST_P256 => 0b0001_0000,
        TPM_ALG_RSASSA_4096 => 0b0010_0000,
        TPM_ALG_RSAPSS_4096 => 0b0100_0000,
        TPM_ALG_ECDSA_ECC_NIST_P384 => 0b1000_0000,
        TPM_ALG_ECDSA_ECC_NIST_P521 => 0b0001_0000_0000,
        TPM_ALG_EDDSA_ED25519 => 0b0010_0000_0000
    }
}

impl SpdmBaseAsymAlgo {
    pub fn get_size(&self) -> u16 {
        match self {
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_2048 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_2048 => 256,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_3072 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_3072 => 384,
            SpdmBaseAsymAlgo::TPM_ALG_RSASSA_4096 | SpdmBaseAsymAlgo::TPM_ALG_RSAPSS_4096 => 512,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256 => 64,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P384 => 96,
            SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P521 => 132,
            SpdmBaseAsymAlgo::TPM_ALG_EDDSA_ED25519 => 64,
            SpdmBaseAsymAlgo::Unknown(_) => 0,
        }
    }
}

/// Requester asymmetric algorithm (`req_base_asym`), selected for
/// mutual-auth signatures made by the Requester (NEGOTIATE_ALGORITHMS'
/// `req_asym` category). Same value space as `SpdmBaseAsymAlgo`.
pub type SpdmReqAsymAlgo = SpdmBaseAsymAlgo;

enum_builder! {
    @U16
    EnumName: SpdmDheAlgo;
    EnumVal {
        FFDHE_2048 => 0b0000_0001,
        FFDHE_3072 => 0b0000_0010,
        FFDHE_4096 => 0b0000_0100,
        SECP_256_R1 => 0b0000_1000,
        SECP_384_R1 => 0b0001_0000,
        SECP_521_R1 => 0b0010_0000
    }
}

impl SpdmDheAlgo {
    pub fn get_size(&self) -> u16 {
        match self {
            SpdmDheAlgo::FFDHE_2048 => 256,
            SpdmDheAlgo::FFDHE_3072 => 384,
            SpdmDheAlgo::FFDHE_4096 => 512,
            SpdmDheAlgo::SECP_256_R1 => 64,
            SpdmDheAlgo::SECP_384_R1 => 96,
            SpdmDheAlgo::SECP_521_R1 => 132,
            SpdmDheAlgo::Unknown(_) => 0,
        }
    }
}

enum_builder! {
    @U16
    EnumName: SpdmAeadAlgo;
    EnumVal {
        AES_128_GCM => 0b0000_0001,
        AES_256_GCM => 0b0000_0010,
        CHACHA20_POLY1305 => 0b0000_0100
    }
}

impl SpdmAeadAlgo {
    pub fn get_key_size(&self) -> u16 {
        match self {
            SpdmAeadAlgo::AES_128_GCM => 16,
            SpdmAeadAlgo::AES_256_GCM | SpdmAeadAlgo::CHACHA20_POLY1305 => 32,
            SpdmAeadAlgo::Unknown(_) => 0,
        }
    }
    pub fn get_iv_size(&self) -> u16 {
        match self {
            SpdmAeadAlgo::Unknown(_) => 0,
            _ => 12,
        }
    }
    pub fn get_tag_size(&self) -> u16 {
        match self {
            SpdmAeadAlgo::Unknown(_) => 0,
            _ => 16,
        }
    }
}

enum_builder! {
    @U16
    EnumName: SpdmKeyScheduleAlgo;
    EnumVal {
        SPDM_KEY_SCHEDULE => 0b0000_0001
    }
}

enum_builder! {
    @U8
    EnumName: SpdmMeasurementSpecification;
    EnumVal {
        DMTF => 0b0000_0001
    }
}

enum_builder! {
    @U32
    EnumName: SpdmMeasurementHashAlgo;
    EnumVal {
        RAW_BIT_STREAM_ONLY => 0b0000_0001,
        TPM_ALG_SHA_256 => 0b0000_0010,
        TPM_ALG_SHA_384 => 0b0000_0100,
        TPM_ALG_SHA_512 => 0b0000_1000,
        TPM_ALG_SHA3_256 => 0b0001_0000,
        TPM_ALG_SHA3_384 => 0b0010_0000,
        TPM_ALG_SHA3_512 => 0b0100_0000
    }
}

impl SpdmMeasurementHashAlgo {
    pub fn get_size(&self) -> u16 {
        match self {
            SpdmMeasurementHashAlgo::RAW_BIT_STREAM_ONLY => 0,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_256 | SpdmMeasurementHashAlgo::TPM_ALG_SHA3_256 => 32,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_384 | SpdmMeasurementHashAlgo::TPM_ALG_SHA3_384 => 48,
            SpdmMeasurementHashAlgo::TPM_ALG_SHA_512 | SpdmMeasurementHashAlgo::TPM_ALG_SHA3_512 => 64,
            SpdmMeasurementHashAlgo::Unknown(_) => 0,
        }
    }
}

/// Selected algorithm set, immutable once NEGOTIATE_ALGORITHMS
/// completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmNegotiateInfo {
    pub spdm_version_sel: SpdmVersion,
    pub req_capabilities_sel: SpdmRequestCapabilityFlags,
    pub rsp_capabilities_sel: SpdmResponseCapabilityFlags,
    pub req_ct_exponent_sel: u8,
    pub rsp_ct_exponent_sel: u8,
    pub measurement_specification_sel: SpdmMeasurementSpecification,
    pub measurement_hash_sel: SpdmMeasurementHashAlgo,
    pub base_hash_sel: SpdmBaseHashAlgo,
    pub base_asym_sel: SpdmBaseAsymAlgo,
    pub req_asym_sel: SpdmReqAsymAlgo,
    pub dhe_sel: SpdmDheAlgo,
    pub aead_sel: SpdmAeadAlgo,
    pub key_schedule_sel: SpdmKeyScheduleAlgo,
}

use super::version::SpdmVersion;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_sizes_match_digest_lengths() {
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_256.get_size(), 32);
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_384.get_size(), 48);
        assert_eq!(SpdmBaseHashAlgo::TPM_ALG_SHA_512.get_size(), 64);
    }

    #[test]
    fn capability_flags_roundtrip() {
        let mut buf = [0u8; 4];
        let mut w = Writer::init(&mut buf);
        let flags = SpdmResponseCapabilityFlags::CERT_CAP | SpdmResponseCapabilityFlags::CHAL_CAP;
        flags.encode(&mut w);
        let mut r = Reader::init(&buf);
        assert_eq!(SpdmResponseCapabilityFlags::read(&mut r), Some(flags));
    }

    #[test]
    fn aead_sizes_are_nonzero_for_known_suites() {
        assert_eq!(SpdmAeadAlgo::AES_256_GCM.get_key_size(), 32);
        assert_eq!(SpdmAeadAlgo::AES_256_GCM.get_iv_size(), 12);
        assert_eq!(SpdmAeadAlgo::AES_256_GCM.get_tag_size(), 16);
    }
}
