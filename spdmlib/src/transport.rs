// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Transport collaborator contracts. Neither trait is implemented by
//! this crate for any real transport — MCTP, PCI DOE, TCP framing,
//! etc. are all out of scope — `testlib` supplies the only
//! implementations, for tests.

use crate::error::SpdmResult;

/// Blocking send/receive calls, the only legal suspension points
/// besides back-off sleeps.
pub trait SpdmDeviceIo {
    fn send(&mut self, buf: &[u8]) -> SpdmResult;
    fn receive(&mut self, buf: &mut [u8]) -> SpdmResult<usize>;

    /// Bytes reserved at the front of every acquired buffer for this
    /// transport's own framing.
    fn get_header_size(&self) -> usize {
        0
    }
}

/// Wraps/unwraps an SPDM payload in whatever framing the transport
/// binding below it requires (MCTP message type byte, PCI DOE header,
/// etc.) Nothing in `spdmlib` inspects the framed bytes; only `encap`
/// output ever reaches `SpdmDeviceIo::send`.
pub trait SpdmTransportEncap {
    /// `session_id` is `Some` for a secured (encrypted) message.
    fn encap(
        &mut self,
        session_id: Option<u32>,
        is_app_message: bool,
        payload: &[u8],
        out_buf: &mut [u8],
    ) -> SpdmResult<usize>;

    /// Returns `(session_id, payload_len)`; the decoded payload is
    /// written in place at the front of `in_out_buf`.
    fn decap(&mut self, in_out_buf: &mut [u8], len: usize) -> SpdmResult<(Option<u32>, usize)>;

    fn get_sequence_number_count(&self) -> u8 {
        0
    }

    fn get_max_random_count(&self) -> u16 {
        0
    }
}
