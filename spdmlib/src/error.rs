// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Typed error taxonomy for the Requester stack.
//!
//! Every handler returns `SpdmResult<T>` rather than panicking or
//! propagating a raw transport/crypto error: the taxonomy here follows
//! DSP0274's own status groups, not an ad hoc wrapper around
//! `std::io::Error`.

use core::fmt;

/// One entry per error kind named in the protocol's error taxonomy.
/// `#[non_exhaustive]` because the wire carries reserved error codes
/// we must be able to add support for without a semver break.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmStatus {
    // Protocol
    InvalidMsgSize,
    InvalidMsgField,
    UnsupportedCap,
    VersionMismatch,
    NegotiationFail,
    UnexpectedRequest,
    UnexpectedResponse,

    // State
    InvalidStateLocal,
    InvalidStatePeer,
    SessionLimitExceeded,

    // Transport
    SendFail,
    ReceiveFail,
    Timeout,

    // Peer transient
    BusyPeer,
    ResynchPeer,
    NotReadyPeer,

    // Cryptographic
    CryptoError,
    VerifyFail,
    VerifyCertFail,

    // Buffer
    BufferTooSmall,
    BufferFull,

    // Catch-all for reserved/unmapped wire error codes: treated as
    // InvalidMsgField at the call site; this variant exists for
    // internal plumbing that needs a generic "something went wrong
    // locally" return.
    InvalidParameter,
}

impl fmt::Display for SpdmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type SpdmResult<T = ()> = Result<T, SpdmStatus>;

/// Builds an `SpdmStatus` value from the short mnemonic used
/// throughout the handlers (`spdm_err!(InvalidMsgField)`).
#[macro_export]
macro_rules! spdm_err {
    ($status:ident) => {
        $crate::error::SpdmStatus::$status
    };
}

/// Shorthand for `Err(spdm_err!(...))`, used at every handler return
/// point so the failure kind reads next to the call site instead of
/// being wrapped twice.
#[macro_export]
macro_rules! spdm_result_err {
    ($status:ident) => {
        Err($crate::error::SpdmStatus::$status)
    };
}

impl SpdmStatus {
    /// True for the transient peer conditions the retry driver may
    /// recover from internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SpdmStatus::BusyPeer | SpdmStatus::NotReadyPeer)
    }
}
