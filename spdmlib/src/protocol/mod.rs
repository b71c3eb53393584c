// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Algorithm identifiers and the fixed wire structs (digests,
//! signatures, nonces, certificate chains, measurement records) shared
//! across every SPDM message type.

mod algo;
mod structs;
mod version;

pub use algo::*;
pub use structs::*;
pub use version::*;
