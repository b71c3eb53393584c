// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! ERROR: the wire-level error response every handler must recognize
//! in place of the response it asked for. `BUSY` and `RESPONSE_NOT_READY`
//! carry extended data driving the retry handled in
//! `crate::requester::handle_error_response_req`.

use crate::common::{SpdmCodec, SpdmContext};
use codec::{enum_builder, Codec, Reader, Writer};

enum_builder! {
    @U8
    EnumName: SpdmErrorCode;
    EnumVal {
        InvalidRequest => 0x01,
        Busy => 0x03,
        UnexpectedRequest => 0x04,
        Unspecified => 0x05,
        DecryptError => 0x06,
        UnsupportedRequest => 0x07,
        RequestInFlight => 0x08,
        InvalidSessionId => 0x09,
        ResponseTooLarge => 0x0a,
        RequestTooLarge => 0x0b,
        LargeResponse => 0x0c,
        MessageLost => 0x0d,
        InvalidPolicy => 0x0e,
        VersionMismatch => 0x41,
        ResponseNotReady => 0x42,
        RequestResynch => 0x43,
        OperationFailed => 0x44,
        NoPendingRequests => 0x45,
        VendorDefinedError => 0xff
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmResponseNotReadyExtData {
    pub rdt_exponent: u8,
    pub request_code: u8,
    pub token: u8,
    pub rdtm: u8,
}

impl Codec for SpdmResponseNotReadyExtData {
    fn encode(&self, bytes: &mut Writer) {
        self.rdt_exponent.encode(bytes);
        self.request_code.encode(bytes);
        self.token.encode(bytes);
        self.rdtm.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<SpdmResponseNotReadyExtData> {
        let rdt_exponent = u8::read(r)?;
        let request_code = u8::read(r)?;
        let token = u8::read(r)?;
        let rdtm = u8::read(r)?;
        Some(SpdmResponseNotReadyExtData {
            rdt_exponent,
            request_code,
            token,
            rdtm,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmErrorResponsePayload {
    pub error_code: SpdmErrorCode,
    pub error_data: u8,
    pub extended_data: SpdmResponseNotReadyExtData,
}

impl SpdmCodec for SpdmErrorResponsePayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.error_code.encode(bytes); // param1
        self.error_data.encode(bytes); // param2
        if matches!(self.error_code, SpdmErrorCode::ResponseNotReady) {
            self.extended_data.encode(bytes);
        }
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmErrorResponsePayload> {
        let error_code = SpdmErrorCode::read(r)?;
        let error_data = u8::read(r)?;
        let extended_data = if matches!(error_code, SpdmErrorCode::ResponseNotReady) && r.left() >= 4 {
            SpdmResponseNotReadyExtData::read(r)?
        } else {
            SpdmResponseNotReadyExtData::default()
        };
        Some(SpdmErrorResponsePayload {
            error_code,
            error_data,
            extended_data,
        })
    }
}

/// RESPOND_IF_READY: re-asks for the response `RESPONSE_NOT_READY`
/// deferred. `param1`/`param2` echo the original request code and the
/// token the responder handed back, so it can find the same deferred
/// work without us resending the original payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdmRespondIfReadyRequestPayload {
    pub original_request_code: u8,
    pub token: u8,
}

impl SpdmCodec for SpdmRespondIfReadyRequestPayload {
    fn spdm_encode(&self, _context: &mut SpdmContext, bytes: &mut Writer) {
        self.original_request_code.encode(bytes); // param1
        self.token.encode(bytes); // param2
    }

    fn spdm_read(_context: &mut SpdmContext, r: &mut Reader) -> Option<SpdmRespondIfReadyRequestPayload> {
        let original_request_code = u8::read(r)?;
        let token = u8::read(r)?;
        Some(SpdmRespondIfReadyRequestPayload {
            original_request_code,
            token,
        })
    }
}
