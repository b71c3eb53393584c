// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! GET_VERSION / VERSION: the first exchange on any connection. Picks
//! the highest version both sides understand and resets the
//! connection context so a retried negotiation starts clean.

use alloc::vec::Vec;

use crate::common::SpdmConnectionState;
use crate::error::{SpdmResult, SpdmStatus};
use crate::message::{SpdmGetVersionRequestPayload, SpdmRequestResponseCode, SpdmVersionResponsePayload};
use crate::protocol::SpdmVersion;
use crate::requester::RequesterContext;

const KNOWN_VERSIONS: [SpdmVersion; 4] = [
    SpdmVersion::SpdmVersion10,
    SpdmVersion::SpdmVersion11,
    SpdmVersion::SpdmVersion12,
    SpdmVersion::SpdmVersion13,
];

impl<'a> RequesterContext<'a> {
    /// Resets connection state, sends GET_VERSION, and picks the
    /// highest version entry in the response that this build also
    /// recognizes. `message_a` starts accumulating here and keeps
    /// doing so through CAPABILITIES and ALGORITHMS.
    pub fn send_receive_spdm_version(&mut self) -> SpdmResult<SpdmVersion> {
        self.common.reset_connection_state();

        let request = SpdmGetVersionRequestPayload {};
        let (response, request_bytes, response_bytes) = self.send_receive::<_, SpdmVersionResponsePayload>(
            SpdmRequestResponseCode::SpdmRequestGetVersion,
            &request,
            SpdmRequestResponseCode::SpdmResponseVersion,
        )?;

        let selected = response.versions[..response.version_number_entry_count as usize]
            .iter()
            .map(|entry| entry.version)
            .filter(|v| KNOWN_VERSIONS.contains(v))
            .max_by_key(|v| v.get_u8())
            .ok_or(SpdmStatus::VersionMismatch)?;

        self.common.transcript.message_a.append(&request_bytes)?;
        self.common.transcript.message_a.append(&response_bytes)?;

        self.common.negotiate_info.spdm_version_sel = selected;
        self.common.connection_state = SpdmConnectionState::AfterVersion;
        Ok(selected)
    }
}
