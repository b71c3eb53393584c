// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Per-opcode message payload codecs. Every request and
//! response body implements [`crate::common::SpdmCodec`]; the 2-byte
//! fixed header (`spdm_version`, `request_response_code`) is factored
//! out here as [`SpdmMessageHeader`] since it's identical across every
//! message type. `param1`/`param2` are NOT part of the header type —
//! each payload encodes/decodes them itself, since their meaning is
//! opcode-specific (e.g. GET_DIGESTS' `param2` is a slot bitmask,
//! CHALLENGE's `param1` is a slot number).

mod algorithm;
mod capabilities;
mod certificate;
mod challenge;
mod chunk;
mod digest;
mod end_session;
mod error;
mod finish;
mod get_csr;
mod heartbeat;
mod key_exchange;
mod key_update;
mod measurement;
mod psk_exchange;
mod psk_finish;
mod set_certificate;
mod version;

pub use algorithm::*;
pub use capabilities::*;
pub use certificate::*;
pub use challenge::*;
pub use chunk::*;
pub use digest::*;
pub use end_session::*;
pub use error::*;
pub use finish::*;
pub use get_csr::*;
pub use heartbeat::*;
pub use key_exchange::*;
pub use key_update::*;
pub use measurement::*;
pub use psk_exchange::*;
pub use psk_finish::*;
pub use set_certificate::*;
pub use version::*;

use crate::protocol::{SpdmRequestResponseCode, SpdmVersion};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpdmMessageHeader {
    pub version: SpdmVersion,
    pub request_response_code: SpdmRequestResponseCode,
}

impl Codec for SpdmMessageHeader {
    fn encode(&self, bytes: &mut Writer) {
        self.version.encode(bytes);
        self.request_response_code.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<SpdmMessageHeader> {
        let version = SpdmVersion::read(r)?;
        let request_response_code = SpdmRequestResponseCode::read(r)?;
        Some(SpdmMessageHeader {
            version,
            request_response_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrips() {
        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        let header = SpdmMessageHeader {
            version: SpdmVersion::SpdmVersion12,
            request_response_code: SpdmRequestResponseCode::SpdmRequestGetDigests,
        };
        header.encode(&mut w);
        let mut r = Reader::init(&buf);
        assert_eq!(SpdmMessageHeader::read(&mut r), Some(header));
    }
}
