// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! NEGOTIATE_ALGORITHMS / ALGORITHMS. The request offers a bitmask of
//! candidate algorithms per category; the response narrows each
//! category to exactly one winner (or `Unknown(0)` if the category
//! wasn't offered). Variable-length `ReqAlgStruct`/`RespAlgStruct`
//! extension tables (DHE, AEAD, request-asym, key schedule) are fixed
//! at four entries here since this crate never offers more than one
//! candidate per category.

use crate::common::{SpdmCodec, SpdmContext};
use crate::protocol::{
    SpdmAeadAlgo, SpdmBaseAsymAlgo, SpdmBaseHashAlgo, SpdmDheAlgo, SpdmKeyScheduleAlgo,
    SpdmMeasurementHashAlgo, SpdmMeasurementSpecification, SpdmReqAsymAlgo,
};
use codec::{Codec, Reader, Writer};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmNegotiateAlgorithmsRequestPayload {
    pub measurement_specification: SpdmMeasurementSpecification,
    pub base_asym_algo: SpdmBaseAsymAlgo,
    pub base_hash_algo: SpdmBaseHashAlgo,
    pub dhe_algo: SpdmDheAlgo,
    pub aead_algo: SpdmAeadAlgo,
    pub req_asym_algo: SpdmReqAsymAlgo,
    pub key_schedule_algo: SpdmKeyScheduleAlgo,
}

impl SpdmCodec for SpdmNegotiateAlgorithmsRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        4u8.encode(bytes); // param1: number of ReqAlgStruct entries that follow
        0u8.encode(bytes); // param2 reserved
        48u16.encode(bytes); // Length
        self.measurement_specification.encode(bytes);
        0u8.encode(bytes); // OtherParamsSupport reserved
        self.base_asym_algo.encode(bytes);
        self.base_hash_algo.encode(bytes);
        [0u8; 12].iter().for_each(|b| b.encode(bytes)); // reserved
        4u8.encode(bytes); // ExtAsymCount
        0u8.encode(bytes); // ExtHashCount
        0u16.encode(bytes); // reserved

        encode_req_alg_struct(bytes, 2, self.dhe_algo.get_u16());
        encode_req_alg_struct(bytes, 3, self.aead_algo.get_u16());
        encode_req_alg_struct(bytes, 4, self.req_asym_algo.get_u32() as u16);
        encode_req_alg_struct(bytes, 5, self.key_schedule_algo.get_u16());
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmNegotiateAlgorithmsRequestPayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?; // param2
        u16::read(r)?; // Length
        let measurement_specification = SpdmMeasurementSpecification::read(r)?;
        u8::read(r)?; // OtherParamsSupport
        let base_asym_algo = SpdmBaseAsymAlgo::read(r)?;
        let base_hash_algo = SpdmBaseHashAlgo::read(r)?;
        for _ in 0..12 {
            u8::read(r)?;
        }
        u8::read(r)?; // ExtAsymCount
        u8::read(r)?; // ExtHashCount
        u16::read(r)?; // reserved

        let mut dhe_algo = SpdmDheAlgo::default();
        let mut aead_algo = SpdmAeadAlgo::default();
        let mut req_asym_algo = SpdmReqAsymAlgo::default();
        let mut key_schedule_algo = SpdmKeyScheduleAlgo::default();
        for _ in 0..param1 {
            let (alg_type, value) = decode_req_alg_struct(r)?;
            match alg_type {
                2 => dhe_algo = SpdmDheAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                3 => aead_algo = SpdmAeadAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                4 => req_asym_algo = SpdmReqAsymAlgo::read(&mut Reader::init(&(value as u32).to_le_bytes()))?,
                5 => key_schedule_algo = SpdmKeyScheduleAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                _ => {}
            }
        }

        Some(SpdmNegotiateAlgorithmsRequestPayload {
            measurement_specification,
            base_asym_algo,
            base_hash_algo,
            dhe_algo,
            aead_algo,
            req_asym_algo,
            key_schedule_algo,
        })
    }
}

fn encode_req_alg_struct(bytes: &mut Writer, alg_type: u8, value: u16) {
    alg_type.encode(bytes);
    2u8.encode(bytes); // AlgCount: fixed-size entry, one 2-byte value
    value.encode(bytes);
}

fn decode_req_alg_struct(r: &mut Reader) -> Option<(u8, u16)> {
    let alg_type = u8::read(r)?;
    u8::read(r)?; // AlgCount
    let value = u16::read(r)?;
    Some((alg_type, value))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmAlgorithmsResponsePayload {
    pub measurement_specification_sel: SpdmMeasurementSpecification,
    pub measurement_hash_algo: SpdmMeasurementHashAlgo,
    pub base_asym_sel: SpdmBaseAsymAlgo,
    pub base_hash_sel: SpdmBaseHashAlgo,
    pub dhe_sel: SpdmDheAlgo,
    pub aead_sel: SpdmAeadAlgo,
    pub req_asym_sel: SpdmReqAsymAlgo,
    pub key_schedule_sel: SpdmKeyScheduleAlgo,
}

impl SpdmCodec for SpdmAlgorithmsResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        4u8.encode(bytes); // param1: RespAlgStruct count
        0u8.encode(bytes); // param2 reserved
        52u16.encode(bytes); // Length
        self.measurement_specification_sel.encode(bytes);
        0u8.encode(bytes); // OtherParamsSelection reserved
        self.measurement_hash_algo.encode(bytes);
        self.base_asym_sel.encode(bytes);
        self.base_hash_sel.encode(bytes);
        [0u8; 12].iter().for_each(|b| b.encode(bytes));
        0u8.encode(bytes); // ExtAsymSelCount
        0u8.encode(bytes); // ExtHashSelCount
        0u16.encode(bytes); // reserved

        encode_req_alg_struct(bytes, 2, self.dhe_sel.get_u16());
        encode_req_alg_struct(bytes, 3, self.aead_sel.get_u16());
        encode_req_alg_struct(bytes, 4, self.req_asym_sel.get_u32() as u16);
        encode_req_alg_struct(bytes, 5, self.key_schedule_sel.get_u16());
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmAlgorithmsResponsePayload> {
        let param1 = u8::read(r)?;
        u8::read(r)?;
        u16::read(r)?;
        let measurement_specification_sel = SpdmMeasurementSpecification::read(r)?;
        u8::read(r)?;
        let measurement_hash_algo = SpdmMeasurementHashAlgo::read(r)?;
        let base_asym_sel = SpdmBaseAsymAlgo::read(r)?;
        let base_hash_sel = SpdmBaseHashAlgo::read(r)?;
        for _ in 0..12 {
            u8::read(r)?;
        }
        u8::read(r)?;
        u8::read(r)?;
        u16::read(r)?;

        let mut dhe_sel = SpdmDheAlgo::default();
        let mut aead_sel = SpdmAeadAlgo::default();
        let mut req_asym_sel = SpdmReqAsymAlgo::default();
        let mut key_schedule_sel = SpdmKeyScheduleAlgo::default();
        for _ in 0..param1 {
            let (alg_type, value) = decode_req_alg_struct(r)?;
            match alg_type {
                2 => dhe_sel = SpdmDheAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                3 => aead_sel = SpdmAeadAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                4 => req_asym_sel = SpdmReqAsymAlgo::read(&mut Reader::init(&(value as u32).to_le_bytes()))?,
                5 => key_schedule_sel = SpdmKeyScheduleAlgo::read(&mut Reader::init(&value.to_le_bytes()))?,
                _ => {}
            }
        }

        Some(SpdmAlgorithmsResponsePayload {
            measurement_specification_sel,
            measurement_hash_algo,
            base_asym_sel,
            base_hash_sel,
            dhe_sel,
            aead_sel,
            req_asym_sel,
            key_schedule_sel,
        })
    }
}
