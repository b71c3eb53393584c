// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_VERSION / VERSION: the one exchange that runs before any
//! algorithm is negotiated, so its payload uses plain `Codec`
//! throughout rather than `SpdmCodec`.

use crate::common::{SpdmCodec, SpdmContext};
use crate::config::MAX_SPDM_VERSION_COUNT;
use crate::protocol::SpdmVersion;
use codec::{Codec, Reader, Writer};

/// DSP0274 `version_number_entry`: a packed 16-bit field
/// `major:4 | minor:4 | update_version:4 | alpha:4`, encoded
/// little-endian like every other multi-byte SPDM field. The top byte
/// (`major<<4 | minor`) is exactly `SpdmVersion`'s `u8` repr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpdmVersionNumberEntry {
    pub version: SpdmVersion,
    pub update_version_number: u8,
    pub alpha: u8,
}

impl Default for SpdmVersionNumberEntry {
    fn default() -> Self {
        SpdmVersionNumberEntry {
            version: SpdmVersion::default(),
            update_version_number: 0,
            alpha: 0,
        }
    }
}

impl Codec for SpdmVersionNumberEntry {
    fn encode(&self, bytes: &mut Writer) {
        let raw: u16 = ((self.version.get_u8() as u16) << 8)
            | (((self.update_version_number & 0xf) as u16) << 4)
            | (self.alpha & 0xf) as u16;
        raw.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<SpdmVersionNumberEntry> {
        let raw = u16::read(r)?;
        let version_byte = (raw >> 8) as u8;
        let version = SpdmVersion::read(&mut Reader::init(&[version_byte]))?;
        Some(SpdmVersionNumberEntry {
            version,
            update_version_number: ((raw >> 4) & 0xf) as u8,
            alpha: (raw & 0xf) as u8,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmGetVersionRequestPayload {}

impl SpdmCodec for SpdmGetVersionRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // reserved (param1)
        0u8.encode(bytes); // reserved (param2)
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetVersionRequestPayload> {
        u8::read(r)?;
        u8::read(r)?;
        Some(SpdmGetVersionRequestPayload {})
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmVersionResponsePayload {
    pub version_number_entry_count: u8,
    pub versions: [SpdmVersionNumberEntry; MAX_SPDM_VERSION_COUNT],
}

impl Default for SpdmVersionResponsePayload {
    fn default() -> Self {
        SpdmVersionResponsePayload {
            version_number_entry_count: 0,
            versions: [SpdmVersionNumberEntry::default(); MAX_SPDM_VERSION_COUNT],
        }
    }
}

impl SpdmCodec for SpdmVersionResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        0u8.encode(bytes); // reserved (param1)
        0u8.encode(bytes); // reserved (param2)
        0u8.encode(bytes); // reserved byte before the count
        self.version_number_entry_count.encode(bytes);
        for i in 0..self.version_number_entry_count as usize {
            self.versions[i].encode(bytes);
        }
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmVersionResponsePayload> {
        u8::read(r)?; // param1
        u8::read(r)?; // param2
        u8::read(r)?; // reserved
        let version_number_entry_count = u8::read(r)?;
        if version_number_entry_count as usize > MAX_SPDM_VERSION_COUNT {
            return None;
        }
        let mut versions = [SpdmVersionNumberEntry::default(); MAX_SPDM_VERSION_COUNT];
        for i in 0..version_number_entry_count as usize {
            versions[i] = SpdmVersionNumberEntry::read(r)?;
        }
        Some(SpdmVersionResponsePayload {
            version_number_entry_count,
            versions,
        })
    }
}
