// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Requester-side SPDM (DSP0274/DSP0277) protocol engine: wire codec,
//! transcript manager, crypto adapter, session store, secured-message
//! layer, and the per-opcode request handlers that drive a connection
//! from GET_VERSION through an established secure session.
//!
//! This crate implements only the Requester role. Transport bindings,
//! the Responder role, and concrete crypto primitives are out of
//! scope; `crypto::spdm_ring` is the one bundled adapter backend, and
//! `transport` defines the collaborator contract an embedder's own
//! transport binding must satisfy.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

#[macro_use]
pub mod error;

pub mod common;
pub mod config;
pub mod crypto;
pub mod message;
pub mod protocol;
pub mod requester;
pub mod secured_message;
pub mod session;
pub mod time;
pub mod transport;

#[cfg(test)]
pub mod testlib;
