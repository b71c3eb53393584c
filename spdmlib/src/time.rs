// Copyright (c) 2022 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Platform sleep abstraction. Kept to a single free function so
//! `no_std` embedders can swap it for a timer-driven wait; std builds
//! just call through to `std::thread::sleep`. This is the thinnest
//! possible seam, not a scheduler.

/// Blocks the calling thread for `micros` microseconds. Used only at
/// the BUSY and RESPONSE_NOT_READY back-off suspension points.
#[cfg(feature = "std")]
pub fn sleep(micros: u64) {
    std::thread::sleep(std::time::Duration::from_micros(micros));
}

#[cfg(not(feature = "std"))]
pub fn sleep(_micros: u64) {
    // A `no_std` embedder must provide a real timer-backed wait;
    // busy-looping here would starve cooperative schedulers, so this
    // intentionally does nothing rather than pretend to block.
}
