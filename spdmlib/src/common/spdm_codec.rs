// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::common::SpdmContext;
use codec::{Reader, Writer};

/// Like [`codec::Codec`], but for payload shapes that depend on
/// negotiated algorithm IDs (e.g. a digest's length depends on
/// `base_hash_sel`, a measurement record's field widths depend on the
/// measurement spec). Every SPDM message payload implements this
/// instead of `Codec` directly.
pub trait SpdmCodec: Sized {
    fn spdm_encode(&self, context: &mut SpdmContext, bytes: &mut Writer);
    fn spdm_read(context: &mut SpdmContext, r: &mut Reader) -> Option<Self>;
}
