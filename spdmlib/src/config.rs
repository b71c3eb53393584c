// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Compile-time size limits and the runtime-tunable knobs an embedder
//! supplies at context construction.

/// Upper bound on a single SPDM payload (excludes transport header).
pub const MAX_SPDM_MSG_SIZE: usize = 0x1200;
/// Scratch buffer size handed to transport send/receive, header included.
pub const MAX_SPDM_TRANSPORT_SIZE: usize = MAX_SPDM_MSG_SIZE + 0x100;
/// Chunk size used for GET_CERTIFICATE / GET_CSR / CHUNK_GET portions.
pub const MAX_SPDM_CERT_CHAIN_BLOCK_LEN: usize = 1024;
/// Upper bound on a peer certificate chain (root hash + DER chain).
pub const MAX_SPDM_CERT_CHAIN_DATA_SIZE: usize = 0x1000;
/// Number of certificate-chain slots a peer (and we) may populate.
pub const MAX_SPDM_SLOT_NUMBER: usize = 8;
/// Concurrent sessions a single connection may hold open.
pub const MAX_SPDM_SESSION_COUNT: usize = 4;
/// Largest single measurement value captured in a block.
pub const MAX_SPDM_MEASUREMENT_VALUE_LEN: usize = 64;
/// Largest number of measurement blocks returned by MEASUREMENTS.
pub const MAX_SPDM_MEASUREMENT_BLOCK_COUNT: usize = 8;
/// Largest encoded size of a MEASUREMENTS record (all blocks concatenated).
pub const MAX_SPDM_MEASUREMENT_RECORD_SIZE: usize = 640;
/// Largest opaque-data trailer accepted on any message.
pub const MAX_SPDM_OPAQUE_SIZE: usize = 1024;
/// Largest transcript arena kept per stream when
/// `hashed-transcript-data` is disabled.
pub const MAX_SPDM_MESSAGE_BUFFER_SIZE: usize = 0x2000;
/// Largest CSR blob accepted from a GET_CSR exchange.
pub const MAX_SPDM_CSR_SIZE: usize = 0x1000;
/// Largest PSK hint accepted/sent in PSK_EXCHANGE.
pub const MAX_SPDM_PSK_HINT_SIZE: usize = 32;
/// Largest PSK context accepted/sent in PSK_EXCHANGE/PSK_FINISH.
pub const MAX_SPDM_PSK_CONTEXT_SIZE: usize = 64;
/// Upper bound on the number of version entries a VERSION response may carry.
pub const MAX_SPDM_VERSION_COUNT: usize = 4;
/// Upper bound on a single CHUNK_SEND/CHUNK_GET transfer's chunk size.
pub const MAX_SPDM_CHUNK_SIZE: usize = 1024;

/// Runtime-tunable knobs supplied by the embedder at startup. Unlike
/// `config`'s `pub const`s (which bound buffer sizes compiled into the
/// binary), these vary connection-to-connection.
#[derive(Debug, Clone, Copy)]
pub struct SpdmConfigInfo {
    pub req_capabilities_sel: crate::protocol::SpdmRequestCapabilityFlags,
    pub req_ct_exponent_sel: u8,
    /// Single candidate offered per algorithm category in
    /// NEGOTIATE_ALGORITHMS — this crate never offers more than one,
    /// so there's nothing for the responder to pick among but itself.
    pub measurement_specification_sel: crate::protocol::SpdmMeasurementSpecification,
    pub base_asym_algo: crate::protocol::SpdmBaseAsymAlgo,
    pub base_hash_algo: crate::protocol::SpdmBaseHashAlgo,
    pub dhe_algo: crate::protocol::SpdmDheAlgo,
    pub aead_algo: crate::protocol::SpdmAeadAlgo,
    pub req_asym_algo: crate::protocol::SpdmReqAsymAlgo,
    pub key_schedule_algo: crate::protocol::SpdmKeyScheduleAlgo,
    /// Number of BUSY retries tolerated before surfacing `BusyPeer`.
    pub retry_times: u8,
    /// Back-off delay, in microseconds, between BUSY retries.
    pub retry_delay_time_us: u64,
    /// Use append-only byte buffers (`true`) or running hash contexts
    /// (`false`) for transcript accumulation. Mirrors the
    /// `hashed-transcript-data` Cargo feature but is also exposed as a
    /// runtime flag for hosts that build both backings in.
    pub record_transcript_data_support: bool,
    /// SPDM 1.2+ MEASUREMENTS `CONTENT_CHANGED` reporting in param2.
    pub runtime_content_change_support: bool,
}

impl Default for SpdmConfigInfo {
    fn default() -> Self {
        SpdmConfigInfo {
            req_capabilities_sel: crate::protocol::SpdmRequestCapabilityFlags::empty(),
            req_ct_exponent_sel: 0,
            measurement_specification_sel: crate::protocol::SpdmMeasurementSpecification::DMTF,
            base_asym_algo: crate::protocol::SpdmBaseAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
            base_hash_algo: crate::protocol::SpdmBaseHashAlgo::TPM_ALG_SHA_256,
            dhe_algo: crate::protocol::SpdmDheAlgo::SECP_256_R1,
            aead_algo: crate::protocol::SpdmAeadAlgo::AES_128_GCM,
            req_asym_algo: crate::protocol::SpdmReqAsymAlgo::TPM_ALG_ECDSA_ECC_NIST_P256,
            key_schedule_algo: crate::protocol::SpdmKeyScheduleAlgo::SPDM_KEY_SCHEDULE,
            retry_times: 3,
            retry_delay_time_us: 100_000,
            record_transcript_data_support: true,
            runtime_content_change_support: false,
        }
    }
}
