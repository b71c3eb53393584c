// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! The transcript manager: append-only records of the
//! exact bytes a signature or MAC must cover. Every connection keeps
//! `message_a/b/c/m` (and the mutual-auth analogues
//! `message_mut_b/c`); every session additionally keeps its own
//! `message_k/f/m` (see `crate::session`).
//!
//! Two interchangeable backings exist, selected per stream at
//! construction time by `SpdmConfigInfo::record_transcript_data_support`:
//! a plain append-only [`ManagedBuffer`], or — when the
//! `hashed-transcript-data` feature is compiled in — a running
//! [`crate::crypto::HashCtx`] that never retains the raw bytes. The
//! buffer backing is always available (it's what `no_std` builds
//! without the `ring` backend fall back to); the hash backing trades
//! memory for being unable to produce `get()`'s borrowed view.

use alloc::vec::Vec;

use crate::config::MAX_SPDM_MESSAGE_BUFFER_SIZE;
use crate::crypto;
use crate::error::{SpdmResult, SpdmStatus};
use crate::protocol::{SpdmBaseHashAlgo, SpdmDigestStruct};

/// Fixed-capacity append-only byte arena. `append_message` is the only
/// fallible operation; overflow returns `BufferFull`.
#[derive(Clone, Copy)]
pub struct ManagedBuffer {
    data: [u8; MAX_SPDM_MESSAGE_BUFFER_SIZE],
    used: usize,
}

impl Default for ManagedBuffer {
    fn default() -> Self {
        ManagedBuffer {
            data: [0u8; MAX_SPDM_MESSAGE_BUFFER_SIZE],
            used: 0,
        }
    }
}

impl ManagedBuffer {
    pub fn append_message(&mut self, bytes: &[u8]) -> SpdmResult {
        if self.used + bytes.len() > self.data.len() {
            return Err(SpdmStatus::BufferFull);
        }
        self.data[self.used..self.used + bytes.len()].copy_from_slice(bytes);
        self.used += bytes.len();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn as_ref(&self) -> &[u8] {
        &self.data[..self.used]
    }
}

impl AsRef<[u8]> for ManagedBuffer {
    fn as_ref(&self) -> &[u8] {
        ManagedBuffer::as_ref(self)
    }
}

/// One transcript stream, backed by a byte arena or a running hash.
#[derive(Clone)]
pub enum TranscriptStream {
    Buffer(ManagedBuffer),
    #[cfg(feature = "hashed-transcript-data")]
    Hash {
        algo: SpdmBaseHashAlgo,
        ctx: Option<crypto::HashCtx>,
    },
}

impl Default for TranscriptStream {
    fn default() -> Self {
        TranscriptStream::Buffer(ManagedBuffer::default())
    }
}

impl TranscriptStream {
    #[cfg(feature = "hashed-transcript-data")]
    pub fn new_hashed(algo: SpdmBaseHashAlgo) -> Self {
        TranscriptStream::Hash { algo, ctx: None }
    }

    pub fn append(&mut self, bytes: &[u8]) -> SpdmResult {
        match self {
            TranscriptStream::Buffer(buf) => buf.append_message(bytes),
            #[cfg(feature = "hashed-transcript-data")]
            TranscriptStream::Hash { algo, ctx } => {
                if ctx.is_none() {
                    *ctx = Some(crypto::hash::hash_ctx_new(*algo)?);
                }
                crypto::hash::hash_ctx_update(ctx.as_mut().unwrap(), bytes)
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            TranscriptStream::Buffer(buf) => buf.reset(),
            #[cfg(feature = "hashed-transcript-data")]
            TranscriptStream::Hash { ctx, .. } => *ctx = None,
        }
    }

    /// Idempotent: does not consume the running hash context.
    pub fn snapshot_hash(&self, hash_algo: SpdmBaseHashAlgo) -> SpdmResult<SpdmDigestStruct> {
        match self {
            TranscriptStream::Buffer(buf) => crypto::hash::hash_all(hash_algo, buf.as_ref()),
            #[cfg(feature = "hashed-transcript-data")]
            TranscriptStream::Hash { ctx, .. } => {
                let ctx = ctx.clone().ok_or(SpdmStatus::InvalidStateLocal)?;
                crypto::hash::hash_ctx_finalize(ctx)
            }
        }
    }

    /// Borrowed view of the raw bytes, for handlers that sign/HMAC the
    /// stream's contents directly rather than its hash. Only available
    /// in buffer mode.
    pub fn get(&self) -> Option<&[u8]> {
        match self {
            TranscriptStream::Buffer(buf) => Some(buf.as_ref()),
            #[cfg(feature = "hashed-transcript-data")]
            TranscriptStream::Hash { .. } => None,
        }
    }

    /// Converts a buffer-backed stream in place into a running hash
    /// seeded with whatever it already holds. `message_a` starts
    /// buffered (the hash algorithm isn't known until ALGORITHMS
    /// completes) and is upgraded once `base_hash_sel` is decided;
    /// `message_b/c/m` and the mutual-auth streams start hashed
    /// directly since nothing is appended to them beforehand. A no-op
    /// on a stream that's already hashed.
    #[cfg(feature = "hashed-transcript-data")]
    pub fn upgrade_to_hash(&mut self, algo: SpdmBaseHashAlgo) -> SpdmResult {
        if let TranscriptStream::Buffer(buf) = self {
            let mut ctx = crypto::hash::hash_ctx_new(algo)?;
            crypto::hash::hash_ctx_update(&mut ctx, buf.as_ref())?;
            *self = TranscriptStream::Hash { algo, ctx: Some(ctx) };
        }
        Ok(())
    }
}

/// Hashes the signing/HMAC input spanning one or more transcript
/// streams, in the order given.
///
/// In buffer mode (every stream still holds its raw bytes) this hashes
/// the exact concatenation DSP0274 describes — bit-identical to what a
/// peer observing the same wire traffic would compute. Once any stream
/// has been upgraded to a running hash, its raw bytes are gone, so the
/// combined value is computed over the concatenation of each stream's
/// own finalized digest instead. That keeps `hashed-transcript-data`
/// builds internally consistent (this Requester's own FINISH HMAC
/// input matches what it derived at KEY_EXCHANGE time) without
/// claiming bit-exact interop with a real Responder's running-hash
/// computation across stream boundaries — see DESIGN.md.
pub fn combined_hash(hash_algo: SpdmBaseHashAlgo, streams: &[&TranscriptStream]) -> SpdmResult<SpdmDigestStruct> {
    if streams.iter().all(|s| s.get().is_some()) {
        let mut buf = Vec::new();
        for s in streams {
            buf.extend_from_slice(s.get().expect("checked above"));
        }
        crypto::hash::hash_all(hash_algo, &buf)
    } else {
        let mut buf = Vec::new();
        for s in streams {
            let digest = s.snapshot_hash(hash_algo)?;
            buf.extend_from_slice(digest.as_ref());
        }
        crypto::hash::hash_all(hash_algo, &buf)
    }
}

/// Connection-level transcript streams.
/// Session-level streams (`message_k`, `message_f`, per-session
/// `message_m`) live on `SpdmSession` instead, since they're scoped to
/// one session's lifetime rather than the whole connection.
#[derive(Clone, Default)]
pub struct SpdmTranscript {
    pub message_a: TranscriptStream,
    pub message_b: TranscriptStream,
    pub message_c: TranscriptStream,
    pub message_m: TranscriptStream,
    pub message_mut_b: TranscriptStream,
    pub message_mut_c: TranscriptStream,
}

impl SpdmTranscript {
    pub fn reset_all(&mut self) {
        self.message_a.reset();
        self.message_b.reset();
        self.message_c.reset();
        self.message_m.reset();
        self.message_mut_b.reset();
        self.message_mut_c.reset();
    }
}
