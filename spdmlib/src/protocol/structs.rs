// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::spdm_codec::SpdmCodec;
use crate::common::SpdmContext;
use crate::config::{
    MAX_SPDM_CERT_CHAIN_DATA_SIZE, MAX_SPDM_MEASUREMENT_BLOCK_COUNT, MAX_SPDM_MEASUREMENT_VALUE_LEN,
    MAX_SPDM_OPAQUE_SIZE,
};
use codec::{enum_builder, Codec, Reader, Writer};

use super::algo::{SPDM_MAX_ASYM_KEY_SIZE, SPDM_MAX_HASH_SIZE, SPDM_NONCE_SIZE};

/// A hash-sized digest. `data_size` is filled from
/// `negotiate_info.base_hash_sel` on encode; on decode it is trusted
/// to equal the same (the caller has already negotiated algorithms by
/// the time any digest appears on the wire).
#[derive(Debug, Clone, Copy)]
pub struct SpdmDigestStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_HASH_SIZE],
}

impl Default for SpdmDigestStruct {
    fn default() -> Self {
        SpdmDigestStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_HASH_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmDigestStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmCodec for SpdmDigestStruct {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let size = context.negotiate_info.base_hash_sel.get_size();
        bytes.extend_from_slice(&self.data[..size as usize]);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmDigestStruct> {
        let size = context.negotiate_info.base_hash_sel.get_size() as usize;
        let raw = r.take_bytes(size)?;
        let mut data = [0u8; SPDM_MAX_HASH_SIZE];
        data[..size].copy_from_slice(raw);
        Some(SpdmDigestStruct {
            data_size: size as u16,
            data,
        })
    }
}

/// An asymmetric-signature-sized blob, sized from `base_asym_sel` (the
/// algorithm used for every signature a Requester *verifies* — the
/// Responder's). Mutual-auth signatures the Requester *produces* are
/// sized from `req_asym_sel` instead and are built by hand in the
/// handlers that need them (see `requester::challenge_req`).
#[derive(Debug, Clone, Copy)]
pub struct SpdmSignatureStruct {
    pub data_size: u16,
    pub data: [u8; SPDM_MAX_ASYM_KEY_SIZE],
}

impl Default for SpdmSignatureStruct {
    fn default() -> Self {
        SpdmSignatureStruct {
            data_size: 0,
            data: [0u8; SPDM_MAX_ASYM_KEY_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmSignatureStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmCodec for SpdmSignatureStruct {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        let size = context.negotiate_info.base_asym_sel.get_size();
        bytes.extend_from_slice(&self.data[..size as usize]);
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmSignatureStruct> {
        let size = context.negotiate_info.base_asym_sel.get_size() as usize;
        let raw = r.take_bytes(size)?;
        let mut data = [0u8; SPDM_MAX_ASYM_KEY_SIZE];
        data[..size].copy_from_slice(raw);
        Some(SpdmSignatureStruct {
            data_size: size as u16,
            data,
        })
    }
}

/// A fixed 32-byte nonce (CHALLENGE, KEY_EXCHANGE, GET_MEASUREMENTS).
/// Its size never depends on negotiated algorithms, so it implements
/// plain `Codec` rather than `SpdmCodec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpdmNonceStruct {
    pub data: [u8; SPDM_NONCE_SIZE],
}

impl Default for SpdmNonceStruct {
    fn default() -> Self {
        SpdmNonceStruct {
            data: [0u8; SPDM_NONCE_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmNonceStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Codec for SpdmNonceStruct {
    fn encode(&self, bytes: &mut Writer) {
        bytes.extend_from_slice(&self.data);
    }

    fn read(r: &mut Reader) -> Option<SpdmNonceStruct> {
        let raw = r.take_bytes(SPDM_NONCE_SIZE)?;
        let mut data = [0u8; SPDM_NONCE_SIZE];
        data.copy_from_slice(raw);
        Some(SpdmNonceStruct { data })
    }
}

/// Self-describing length-prefixed opaque-data trailer.
#[derive(Debug, Clone, Copy)]
pub struct SpdmOpaqueStruct {
    pub data_size: u16,
    pub data: [u8; MAX_SPDM_OPAQUE_SIZE],
}

impl Default for SpdmOpaqueStruct {
    fn default() -> Self {
        SpdmOpaqueStruct {
            data_size: 0,
            data: [0u8; MAX_SPDM_OPAQUE_SIZE],
        }
    }
}

impl AsRef<[u8]> for SpdmOpaqueStruct {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.data_size as usize]
    }
}

impl SpdmCodec for SpdmOpaqueStruct {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.data_size.encode(bytes);
        bytes.extend_from_slice(&self.data[..self.data_size as usize]);
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmOpaqueStruct> {
        let data_size = u16::read(r)?;
        if data_size as usize > MAX_SPDM_OPAQUE_SIZE {
            return None;
        }
        let raw = r.take_bytes(data_size as usize)?;
        let mut data = [0u8; MAX_SPDM_OPAQUE_SIZE];
        data[..data_size as usize].copy_from_slice(raw);
        Some(SpdmOpaqueStruct { data_size, data })
    }
}

/// Storage for one certificate-chain slot: the 4-byte
/// `{length, reserved}` header, the root-cert hash, and the DER chain
/// itself, exactly as laid out on the wire by CERTIFICATE responses.
#[derive(Clone, Copy)]
pub struct SpdmCertChainBuffer {
    pub data_size: u16,
    pub data: [u8; 4 + SPDM_MAX_HASH_SIZE + MAX_SPDM_CERT_CHAIN_DATA_SIZE],
}

impl Default for SpdmCertChainBuffer {
    fn default() -> Self {
        SpdmCertChainBuffer {
            data_size: 0,
            data: [0u8; 4 + SPDM_MAX_HASH_SIZE + MAX_SPDM_CERT_CHAIN_DATA_SIZE],
        }
    }
}

impl core::fmt::Debug for SpdmCertChainBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpdmCertChainBuffer")
            .field("data_size", &self.data_size)
            .finish()
    }
}

impl SpdmCertChainBuffer {
    /// The DER-encoded chain, excluding the 4-byte header and root hash.
    pub fn cert_chain_der(&self, hash_size: usize) -> &[u8] {
        &self.data[4 + hash_size..self.data_size as usize]
    }

    pub fn root_hash(&self, hash_size: usize) -> &[u8] {
        &self.data[4..4 + hash_size]
    }
}

enum_builder! {
    @U8
    EnumName: SpdmDmtfMeasurementType;
    EnumVal {
        SpdmDmtfMeasurementRom => 0x0,
        SpdmDmtfMeasurementFirmware => 0x1,
        SpdmDmtfMeasurementHardwareConfig => 0x2,
        SpdmDmtfMeasurementFirmwareConfig => 0x3,
        SpdmDmtfMeasurementManifest => 0x4
    }
}

enum_builder! {
    @U8
    EnumName: SpdmDmtfMeasurementRepresentation;
    EnumVal {
        SpdmDmtfMeasurementRawBitStream => 0x0,
        SpdmDmtfMeasurementDigest => 0x1
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmDmtfMeasurementStructure {
    pub r#type: SpdmDmtfMeasurementType,
    pub representation: SpdmDmtfMeasurementRepresentation,
    pub value_size: u16,
    pub value: [u8; MAX_SPDM_MEASUREMENT_VALUE_LEN],
}

impl Default for SpdmDmtfMeasurementStructure {
    fn default() -> Self {
        SpdmDmtfMeasurementStructure {
            r#type: SpdmDmtfMeasurementType::default(),
            representation: SpdmDmtfMeasurementRepresentation::default(),
            value_size: 0,
            value: [0u8; MAX_SPDM_MEASUREMENT_VALUE_LEN],
        }
    }
}

impl Codec for SpdmDmtfMeasurementStructure {
    fn encode(&self, bytes: &mut Writer) {
        let tag = self.r#type.get_u8() | (self.representation.get_u8() << 7);
        tag.encode(bytes);
        self.value_size.encode(bytes);
        bytes.extend_from_slice(&self.value[..self.value_size as usize]);
    }

    fn read(r: &mut Reader) -> Option<SpdmDmtfMeasurementStructure> {
        let tag = u8::read(r)?;
        let r#type = SpdmDmtfMeasurementType::read(&mut Reader::init(&[tag & 0x7f]))?;
        let representation =
            SpdmDmtfMeasurementRepresentation::read(&mut Reader::init(&[tag >> 7]))?;
        let value_size = u16::read(r)?;
        if value_size as usize > MAX_SPDM_MEASUREMENT_VALUE_LEN {
            return None;
        }
        let raw = r.take_bytes(value_size as usize)?;
        let mut value = [0u8; MAX_SPDM_MEASUREMENT_VALUE_LEN];
        value[..value_size as usize].copy_from_slice(raw);
        Some(SpdmDmtfMeasurementStructure {
            r#type,
            representation,
            value_size,
            value,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmMeasurementBlockStructure {
    pub index: u8,
    pub measurement_specification: super::algo::SpdmMeasurementSpecification,
    pub measurement_size: u16,
    pub measurement: SpdmDmtfMeasurementStructure,
}

impl Default for SpdmMeasurementBlockStructure {
    fn default() -> Self {
        SpdmMeasurementBlockStructure {
            index: 0,
            measurement_specification: super::algo::SpdmMeasurementSpecification::default(),
            measurement_size: 0,
            measurement: SpdmDmtfMeasurementStructure::default(),
        }
    }
}

impl Codec for SpdmMeasurementBlockStructure {
    fn encode(&self, bytes: &mut Writer) {
        self.index.encode(bytes);
        self.measurement_specification.encode(bytes);
        self.measurement_size.encode(bytes);
        self.measurement.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<SpdmMeasurementBlockStructure> {
        let index = u8::read(r)?;
        let measurement_specification = super::algo::SpdmMeasurementSpecification::read(r)?;
        let measurement_size = u16::read(r)?;
        let measurement = SpdmDmtfMeasurementStructure::read(r)?;
        Some(SpdmMeasurementBlockStructure {
            index,
            measurement_specification,
            measurement_size,
            measurement,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpdmMeasurementRecordStructure {
    pub number_of_blocks: u8,
    pub record: [SpdmMeasurementBlockStructure; MAX_SPDM_MEASUREMENT_BLOCK_COUNT],
}

impl Default for SpdmMeasurementRecordStructure {
    fn default() -> Self {
        SpdmMeasurementRecordStructure {
            number_of_blocks: 0,
            record: [SpdmMeasurementBlockStructure::default(); MAX_SPDM_MEASUREMENT_BLOCK_COUNT],
        }
    }
}

impl SpdmCodec for SpdmMeasurementRecordStructure {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        for i in 0..self.number_of_blocks as usize {
            self.record[i].encode(bytes);
        }
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmMeasurementRecordStructure> {
        let mut record = [SpdmMeasurementBlockStructure::default(); MAX_SPDM_MEASUREMENT_BLOCK_COUNT];
        let mut number_of_blocks = 0u8;
        while r.left() > 0 && (number_of_blocks as usize) < MAX_SPDM_MEASUREMENT_BLOCK_COUNT {
            record[number_of_blocks as usize] = SpdmMeasurementBlockStructure::read(r)?;
            number_of_blocks += 1;
        }
        Some(SpdmMeasurementRecordStructure {
            number_of_blocks,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::new_test_context;

    #[test]
    fn digest_struct_roundtrips_at_negotiated_size() {
        let mut context = new_test_context();
        context.negotiate_info.base_hash_sel = super::super::algo::SpdmBaseHashAlgo::TPM_ALG_SHA_384;
        let value = SpdmDigestStruct {
            data_size: 48,
            data: {
                let mut d = [0u8; SPDM_MAX_HASH_SIZE];
                d[..48].copy_from_slice(&[7u8; 48]);
                d
            },
        };
        let mut buf = [0u8; 48];
        let mut w = Writer::init(&mut buf);
        value.spdm_encode(&mut context, &mut w);
        assert_eq!(w.used(), 48);

        let mut r = Reader::init(&buf);
        let back = SpdmDigestStruct::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.data_size, 48);
        assert_eq!(back.as_ref(), &[7u8; 48][..]);
    }

    #[test]
    fn nonce_struct_roundtrips() {
        let mut buf = [0u8; SPDM_NONCE_SIZE];
        let mut w = Writer::init(&mut buf);
        let value = SpdmNonceStruct {
            data: [9u8; SPDM_NONCE_SIZE],
        };
        value.encode(&mut w);
        let mut r = Reader::init(&buf);
        assert_eq!(SpdmNonceStruct::read(&mut r), Some(value));
    }

    #[test]
    fn measurement_record_roundtrips_multiple_blocks() {
        let mut context = new_test_context();
        let mut block = SpdmMeasurementBlockStructure::default();
        block.index = 1;
        block.measurement.value_size = 4;
        block.measurement.value[..4].copy_from_slice(&[1, 2, 3, 4]);
        block.measurement_size = 2 + 1 + 4;

        let mut record = SpdmMeasurementRecordStructure::default();
        record.number_of_blocks = 2;
        record.record[0] = block;
        record.record[1] = block;

        let mut buf = [0u8; 64];
        let mut w = Writer::init(&mut buf);
        record.spdm_encode(&mut context, &mut w);
        let used = w.used();

        let mut r = Reader::init(&buf[..used]);
        let back = SpdmMeasurementRecordStructure::spdm_read(&mut context, &mut r).unwrap();
        assert_eq!(back.number_of_blocks, 2);
        assert_eq!(back.record[0].index, 1);
        assert_eq!(back.record[0].measurement.value_size, 4);
    }
}
