// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_MEASUREMENTS / MEASUREMENTS. Requests either the total block
//! count (`measurement_operation == 0`) or the full record; a nonce
//! and slot id are present only when a signature is requested over the
//! response.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{
    SpdmMeasurementRecordStructure, SpdmNonceStruct, SpdmSignatureStruct, SpdmVersion,
};
use bitflags::bitflags;
use codec::{enum_builder, Codec, Reader, Writer};

pub const MEASUREMENT_RESPONDER_PARAM2_SLOT_ID_MASK: u8 = 0b0000_1111;
pub const MEASUREMENT_RESPONDER_PARAM2_CONTENT_CHANGED_MASK: u8 = 0b0011_0000;
pub const MEASUREMENT_RESPONDER_PARAM2_CONTENT_CHANGED_NOT_SUPPORTED_VALUE: u8 = 0b0000_0000;
pub const MEASUREMENT_RESPONDER_PARAM2_CONTENT_CHANGED_DETECTED_CHANGE_VALUE: u8 = 0b0001_0000;
pub const MEASUREMENT_RESPONDER_PARAM2_CONTENT_CHANGED_NO_CHANGE_VALUE: u8 = 0b0010_0000;

bitflags! {
    #[derive(Default)]
    pub struct SpdmMeasurementAttributes: u8 {
        const SIGNATURE_REQUESTED = 0b0000_0001;
        const RAW_BIT_STREAM_REQUESTED = 0b0000_0010;
    }
}

impl Codec for SpdmMeasurementAttributes {
    fn encode(&self, bytes: &mut Writer) {
        self.bits().encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<SpdmMeasurementAttributes> {
        SpdmMeasurementAttributes::from_bits(u8::read(r)?)
    }
}

enum_builder! {
    @U8
    EnumName: SpdmMeasurementOperation;
    EnumVal {
        SpdmMeasurementQueryTotalNumber => 0x0,
        SpdmMeasurementRequestAll => 0xff
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmGetMeasurementsRequestPayload {
    pub measurement_attributes: SpdmMeasurementAttributes,
    pub measurement_operation: SpdmMeasurementOperation,
    pub nonce: SpdmNonceStruct,
    pub slot_id: u8,
}

impl SpdmCodec for SpdmGetMeasurementsRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.measurement_attributes.encode(bytes); // param1
        self.measurement_operation.encode(bytes); // param2
        if self
            .measurement_attributes
            .contains(SpdmMeasurementAttributes::SIGNATURE_REQUESTED)
        {
            self.nonce.encode(bytes);
            self.slot_id.encode(bytes);
        }
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmGetMeasurementsRequestPayload> {
        let measurement_attributes = SpdmMeasurementAttributes::read(r)?;
        let measurement_operation = SpdmMeasurementOperation::read(r)?;
        let signature_requested = measurement_attributes.contains(SpdmMeasurementAttributes::SIGNATURE_REQUESTED);
        let nonce = if signature_requested {
            SpdmNonceStruct::read(r)?
        } else {
            SpdmNonceStruct::default()
        };
        let slot_id = if signature_requested { u8::read(r)? } else { 0 };

        Some(SpdmGetMeasurementsRequestPayload {
            measurement_attributes,
            measurement_operation,
            nonce,
            slot_id,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmMeasurementsResponsePayload {
    pub number_of_measurement: u8,
    pub content_changed: u8,
    pub slot_id: u8,
    pub measurement_record: SpdmMeasurementRecordStructure,
    pub nonce: SpdmNonceStruct,
    pub opaque: crate::protocol::SpdmOpaqueStruct,
    pub signature: SpdmSignatureStruct,
}

impl SpdmCodec for SpdmMeasurementsResponsePayload {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer) {
        // Only meaningful when the request's measurement_operation asked
        // for the total count; otherwise reserved.
        if self.number_of_measurement == 1 {
            0u8.encode(bytes);
        } else {
            self.number_of_measurement.encode(bytes);
        }
        if context.negotiate_info.spdm_version_sel == SpdmVersion::SpdmVersion12
            && context.config_info.runtime_content_change_support
        {
            (self.slot_id | self.content_changed).encode(bytes);
        } else {
            self.slot_id.encode(bytes);
        }

        // The record is framed by its own 3-byte little-endian length so
        // a reader can skip it without knowing the block encoding.
        let mut record_buf = [0u8; crate::config::MAX_SPDM_MEASUREMENT_RECORD_SIZE];
        let record_len = {
            let mut rw = Writer::init(&mut record_buf);
            self.measurement_record.spdm_encode(context, &mut rw);
            rw.used()
        };
        bytes.extend_from_slice(&(record_len as u32).to_le_bytes()[..3]);
        bytes.extend_from_slice(&record_buf[..record_len]);

        self.nonce.encode(bytes);
        self.opaque.spdm_encode(context, bytes);
        if context.runtime_info.need_measurement_signature {
            self.signature.spdm_encode(context, bytes);
        }
    }

    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmMeasurementsResponsePayload> {
        let number_of_measurement = u8::read(r)?;
        let param2 = u8::read(r)?;
        let slot_id = param2 & MEASUREMENT_RESPONDER_PARAM2_SLOT_ID_MASK;
        let content_changed = param2 & MEASUREMENT_RESPONDER_PARAM2_CONTENT_CHANGED_MASK;

        let mut len_bytes = [0u8; 4];
        len_bytes[..3].copy_from_slice(r.take_bytes(3)?);
        let record_len = u32::from_le_bytes(len_bytes) as usize;
        let record_bytes = r.take_bytes(record_len)?;
        let measurement_record = SpdmMeasurementRecordStructure::spdm_read(context, &mut Reader::init(record_bytes))?;

        let nonce = SpdmNonceStruct::read(r)?;
        let opaque = crate::protocol::SpdmOpaqueStruct::spdm_read(context, r)?;
        let signature = if context.runtime_info.need_measurement_signature {
            SpdmSignatureStruct::spdm_read(context, r)?
        } else {
            SpdmSignatureStruct::default()
        };
        Some(SpdmMeasurementsResponsePayload {
            number_of_measurement,
            content_changed,
            slot_id,
            measurement_record,
            nonce,
            opaque,
            signature,
        })
    }
}
