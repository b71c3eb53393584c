// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The connection context: negotiated state, peer/provisioned
//! certificate material, the transcript, and the session table, plus
//! the transport collaborator the handlers in `crate::requester`
//! drive. One `SpdmContext` exists per peer connection; its lifetime
//! parameter ties it to the borrowed `SpdmDeviceIo`/`SpdmTransportEncap`
//! trait objects supplied by the embedder.

pub mod spdm_codec;
pub mod transcript;

pub use spdm_codec::SpdmCodec;
pub use transcript::{ManagedBuffer, SpdmTranscript, TranscriptStream};

use crate::config::{SpdmConfigInfo, MAX_SPDM_CERT_CHAIN_DATA_SIZE, MAX_SPDM_PSK_HINT_SIZE, MAX_SPDM_SESSION_COUNT, MAX_SPDM_SLOT_NUMBER};
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::{SpdmCertChainBuffer, SpdmDigestStruct, SpdmNegotiateInfo, SPDM_MAX_ASYM_KEY_SIZE};
use crate::session::SpdmSession;
use crate::transport::{SpdmDeviceIo, SpdmTransportEncap};

/// Monotonic connection progress. Ord is derived so handlers can
/// write `context.connection_state >= SpdmConnectionState::Negotiated`
/// directly against the per-command precondition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpdmConnectionState {
    NotStarted,
    AfterVersion,
    AfterCapabilities,
    Negotiated,
    AfterDigests,
    AfterCertificate,
    Authenticated,
}

impl Default for SpdmConnectionState {
    fn default() -> Self {
        SpdmConnectionState::NotStarted
    }
}

/// Raw DER/public-key blob sized for a provisioned trust anchor or a
/// provisioned raw public key (slot 0xFF semantics).
#[derive(Clone, Copy)]
pub struct SpdmRawKeyBuffer {
    pub data_size: u16,
    pub data: [u8; MAX_SPDM_CERT_CHAIN_DATA_SIZE],
}

impl Default for SpdmRawKeyBuffer {
    fn default() -> Self {
        SpdmRawKeyBuffer {
            data_size: 0,
            data: [0u8; MAX_SPDM_CERT_CHAIN_DATA_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmRawKeyBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl core::fmt::Debug for SpdmRawKeyBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpdmRawKeyBuffer").field("data_size", &self.data_size).finish()
    }
}

/// Peer-supplied state accumulated across GET_DIGESTS/GET_CERTIFICATE/
/// CHALLENGE.
#[derive(Default)]
pub struct SpdmPeerInfo {
    pub peer_cert_chain: [Option<SpdmCertChainBuffer>; MAX_SPDM_SLOT_NUMBER],
    /// Populated by GET_DIGESTS when only the hash of a slot is known
    /// (the chain itself hasn't been retrieved via GET_CERTIFICATE yet).
    pub peer_cert_chain_digest: [Option<SpdmDigestStruct>; MAX_SPDM_SLOT_NUMBER],
    pub peer_slot_mask: u8,
    pub peer_root_cert_provision: [Option<SpdmRawKeyBuffer>; MAX_SPDM_SLOT_NUMBER],
}

/// A raw (non-DER-chain) public key, for slot 0xFF's "use provisioned
/// public key, no chain" semantics.
#[derive(Clone, Copy, Default)]
pub struct SpdmProvisionedPublicKey {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_ASYM_KEY_SIZE],
}

impl AsRef<[u8]> for SpdmProvisionedPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

#[derive(Clone, Copy, Default)]
pub struct SpdmPskHint {
    pub data_size: u16,
    pub data: [u8; MAX_SPDM_PSK_HINT_SIZE],
}

impl AsRef<[u8]> for SpdmPskHint {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

/// Locally held identity material: `local_cert_chain`,
/// `local_public_key_provision`, and the PSK hint used for PSK_EXCHANGE.
#[derive(Default)]
pub struct SpdmProvisionInfo {
    pub local_cert_chain: [Option<SpdmCertChainBuffer>; MAX_SPDM_SLOT_NUMBER],
    pub local_public_key_provision: Option<SpdmProvisionedPublicKey>,
    /// Private key bytes for mutual-auth signing (CHALLENGE_AUTH with
    /// `MUT_AUTH_CAP`, GET_CSR). Format is backend-defined; the
    /// `spdm_ring` backend does not register a signer since the
    /// Requester role normally only verifies, not signs — an embedder
    /// enabling `mut-auth` supplies its own `crypto::asym_sign`
    /// registration and stores the matching key material here.
    pub local_asym_private_key: Option<[u8; SPDM_MAX_ASYM_KEY_SIZE]>,
    pub local_asym_private_key_len: u16,
    pub psk_hint: Option<SpdmPskHint>,
}

/// Per-exchange scratch flags that don't belong to negotiated state or
/// the transcript, but influence how the next payload is encoded/
/// decoded.
#[derive(Default)]
pub struct SpdmRuntimeInfo {
    pub need_measurement_signature: bool,
}

pub struct SpdmContext<'a> {
    pub device_io: &'a mut dyn SpdmDeviceIo,
    pub transport_encap: &'a mut dyn SpdmTransportEncap,
    pub config_info: SpdmConfigInfo,
    pub negotiate_info: SpdmNegotiateInfo,
    pub connection_state: SpdmConnectionState,
    pub transcript: SpdmTranscript,
    pub peer_info: SpdmPeerInfo,
    pub provision_info: SpdmProvisionInfo,
    pub runtime_info: SpdmRuntimeInfo,
    pub session: [SpdmSession; MAX_SPDM_SESSION_COUNT],
}

impl<'a> SpdmContext<'a> {
    pub fn new(
        device_io: &'a mut dyn SpdmDeviceIo,
        transport_encap: &'a mut dyn SpdmTransportEncap,
        config_info: SpdmConfigInfo,
        provision_info: SpdmProvisionInfo,
    ) -> Self {
        SpdmContext {
            device_io,
            transport_encap,
            config_info,
            negotiate_info: SpdmNegotiateInfo::default(),
            connection_state: SpdmConnectionState::NotStarted,
            transcript: SpdmTranscript::default(),
            peer_info: SpdmPeerInfo::default(),
            provision_info,
            runtime_info: SpdmRuntimeInfo::default(),
            session: Default::default(),
        }
    }

    /// A `RequestResynch` ERROR, or a VERSION/CAPABILITIES redo, resets
    /// every transcript stream and drops back to `NotStarted`.
    pub fn reset_connection_state(&mut self) {
        self.connection_state = SpdmConnectionState::NotStarted;
        self.transcript.reset_all();
        self.peer_info = SpdmPeerInfo::default();
        self.runtime_info = SpdmRuntimeInfo::default();
    }

    pub fn get_session_via_id(&mut self, session_id: u32) -> Option<&mut SpdmSession> {
        crate::session::find(&mut self.session, session_id)
    }

    pub fn allocate_session(&mut self, session_id: u32) -> SpdmResult<&mut SpdmSession> {
        crate::session::allocate(&mut self.session, session_id)
    }

    /// Checks the state precondition for a command; callers pass the
    /// minimum `connection_state` their command requires.
    pub fn check_connection_state(&self, minimum: SpdmConnectionState) -> SpdmResult {
        if self.connection_state >= minimum {
            Ok(())
        } else {
            Err(SpdmStatus::InvalidStateLocal)
        }
    }

    /// Checks both sides advertised a capability flag. `local` and
    /// `peer` are pre-masked bool checks computed by the caller against
    /// the relevant bit, since request/response capability flag types
    /// differ in shape.
    pub fn check_capability(local: bool, peer: bool) -> SpdmResult {
        if local && peer {
            Ok(())
        } else {
            Err(SpdmStatus::UnsupportedCap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_state_is_monotonic_by_ord() {
        assert!(SpdmConnectionState::NotStarted < SpdmConnectionState::AfterVersion);
        assert!(SpdmConnectionState::AfterCertificate < SpdmConnectionState::Authenticated);
    }

    #[test]
    fn capability_check_requires_both_sides() {
        assert!(SpdmContext::check_capability(true, true).is_ok());
        assert_eq!(
            SpdmContext::check_capability(true, false),
            Err(SpdmStatus::UnsupportedCap)
        );
        assert_eq!(
            SpdmContext::check_capability(false, true),
            Err(SpdmStatus::UnsupportedCap)
        );
    }
}
