// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use codec::enum_builder;

enum_builder! {
    @U8
    EnumName: SpdmVersion;
    EnumVal {
        SpdmVersion10 => 0x10,
        SpdmVersion11 => 0x11,
        SpdmVersion12 => 0x12,
        SpdmVersion13 => 0x13
    }
}

enum_builder! {
    @U8
    EnumName: SpdmRequestResponseCode;
    EnumVal {
        // Responses
        SpdmResponseDigests => 0x01,
        SpdmResponseCertificate => 0x02,
        SpdmResponseChallengeAuth => 0x03,
        SpdmResponseVersion => 0x04,
        SpdmResponseMeasurements => 0x60,
        SpdmResponseCapabilities => 0x61,
        SpdmResponseAlgorithms => 0x63,
        SpdmResponseKeyExchangeRsp => 0x64,
        SpdmResponseFinishRsp => 0x65,
        SpdmResponsePskExchangeRsp => 0x66,
        SpdmResponsePskFinishRsp => 0x67,
        SpdmResponseHeartbeatAck => 0x68,
        SpdmResponseKeyUpdateAck => 0x69,
        SpdmResponseEndSessionAck => 0x6c,
        SpdmResponseCsr => 0x6d,
        SpdmResponseSetCertificateRsp => 0x6e,
        SpdmResponseChunkSendAck => 0x6f,
        SpdmResponseChunkResponse => 0x70,
        SpdmResponseVendorDefinedResponse => 0x7e,
        SpdmResponseError => 0x7f,

        // Requests
        SpdmRequestGetDigests => 0x81,
        SpdmRequestGetCertificate => 0x82,
        SpdmRequestChallenge => 0x83,
        SpdmRequestGetVersion => 0x84,
        SpdmRequestGetMeasurements => 0xe0,
        SpdmRequestGetCapabilities => 0xe1,
        SpdmRequestNegotiateAlgorithms => 0xe3,
        SpdmRequestKeyExchange => 0xe4,
        SpdmRequestFinish => 0xe5,
        SpdmRequestPskExchange => 0xe6,
        SpdmRequestPskFinish => 0xe7,
        SpdmRequestHeartbeat => 0xe8,
        SpdmRequestKeyUpdate => 0xe9,
        SpdmRequestEndSession => 0xec,
        SpdmRequestGetCsr => 0xed,
        SpdmRequestSetCertificate => 0xee,
        SpdmRequestChunkSend => 0xef,
        SpdmRequestChunkGet => 0xf0,
        SpdmRequestVendorDefinedRequest => 0xfe,
        SpdmRequestRespondIfReady => 0xff
    }
}
