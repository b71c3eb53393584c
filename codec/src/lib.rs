// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

//! Minimal, allocation-free wire codec primitives shared by every SPDM
//! message type: a bounds-checked [`Writer`]/[`Reader`] pair, the
//! [`Codec`] trait they serialize through, and the [`enum_builder`]
//! macro used to declare wire enums that tolerate unknown values.

#![cfg_attr(not(feature = "std"), no_std)]

use core::convert::TryInto;

/// A bounds-checked cursor over a caller-owned output buffer.
///
/// `Writer` never panics and never grows the buffer: once `buf` is
/// exhausted, further writes are silently dropped and `used()` stops
/// advancing. Callers that need to detect truncation compare `used()`
/// against the expected encoded size.
pub struct Writer<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> Writer<'a> {
    pub fn init(buf: &'a mut [u8]) -> Self {
        Writer { buf, offset: 0 }
    }

    /// Number of bytes written so far.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Remaining capacity in the underlying buffer.
    pub fn left(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn push_byte(&mut self, b: u8) -> usize {
        if self.offset < self.buf.len() {
            self.buf[self.offset] = b;
            self.offset += 1;
            1
        } else {
            0
        }
    }

    /// Copies as much of `data` as fits; returns the number of bytes
    /// actually written.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> usize {
        let n = core::cmp::min(data.len(), self.left());
        self.buf[self.offset..self.offset + n].copy_from_slice(&data[..n]);
        self.offset += n;
        n
    }

    pub fn mut_used_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.offset]
    }

    pub fn used_slice(&self) -> &[u8] {
        &self.buf[..self.offset]
    }
}

/// A bounds-checked cursor over an input byte slice.
#[derive(Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn init(buf: &'a [u8]) -> Self {
        Reader { buf, offset: 0 }
    }

    /// Bytes remaining to be read.
    pub fn left(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Bytes consumed so far.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Opaque position marker; pair with [`Reader::get_slice_between`]
    /// to extract the bytes spanned by two marks (used by cert-chain
    /// DER walking).
    pub fn mark(&self) -> usize {
        self.offset
    }

    pub fn get_slice_between(&self, start: usize, end: usize) -> Option<&'a [u8]> {
        self.buf.get(start..end)
    }

    pub fn take_byte(&mut self) -> Option<u8> {
        if self.offset < self.buf.len() {
            let b = self.buf[self.offset];
            self.offset += 1;
            Some(b)
        } else {
            None
        }
    }

    pub fn take_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.left() < len {
            return None;
        }
        let s = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Some(s)
    }

    /// All unread bytes, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }
}

/// Encodes/decodes a fixed-layout type onto the wire. Every SPDM
/// message field that is not itself negotiation-dependent implements
/// this directly; fields whose layout depends on negotiated algorithms
/// go through `spdm_codec::SpdmCodec` instead (see `spdmlib::common`).
pub trait Codec: Sized {
    fn encode(&self, bytes: &mut Writer);
    fn read(r: &mut Reader) -> Option<Self>;
}

macro_rules! impl_codec_for_uint {
    ($ty:ty, $len:expr) => {
        impl Codec for $ty {
            fn encode(&self, bytes: &mut Writer) {
                bytes.extend_from_slice(&self.to_le_bytes());
            }

            fn read(r: &mut Reader) -> Option<$ty> {
                let raw = r.take_bytes($len)?;
                Some(<$ty>::from_le_bytes(raw.try_into().ok()?))
            }
        }
    };
}

impl_codec_for_uint!(u8, 1);
impl_codec_for_uint!(u16, 2);
impl_codec_for_uint!(u32, 4);
impl_codec_for_uint!(u64, 8);

impl Codec for bool {
    fn encode(&self, bytes: &mut Writer) {
        (*self as u8).encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<bool> {
        Some(u8::read(r)? != 0)
    }
}

/// Declares a C-like wire enum backed by `u8`/`u16`/`u32` that falls
/// back to an `Unknown(repr)` variant instead of failing to decode —
/// SPDM reserves large swaths of its opcode/algorithm-id space for
/// future use, and a Requester must not choke on a reserved value it
/// merely has to pass through or reject downstream.
#[macro_export]
macro_rules! enum_builder {
    (@U8
        EnumName: $enum_name:ident;
        EnumVal{$($enum_variant:ident => $enum_value:expr),* $(,)?}
    ) => {
        $crate::enum_builder!(@ENUM $enum_name, u8, get_u8, $($enum_variant => $enum_value),*);
    };
    (@U16
        EnumName: $enum_name:ident;
        EnumVal{$($enum_variant:ident => $enum_value:expr),* $(,)?}
    ) => {
        $crate::enum_builder!(@ENUM $enum_name, u16, get_u16, $($enum_variant => $enum_value),*);
    };
    (@U32
        EnumName: $enum_name:ident;
        EnumVal{$($enum_variant:ident => $enum_value:expr),* $(,)?}
    ) => {
        $crate::enum_builder!(@ENUM $enum_name, u32, get_u32, $($enum_variant => $enum_value),*);
    };
    (@ENUM $enum_name:ident, $repr:ty, $getter:ident, $($enum_variant:ident => $enum_value:expr),*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $($enum_variant,)*
            Unknown($repr),
        }

        impl $enum_name {
            pub fn $getter(&self) -> $repr {
                match self {
                    $($enum_name::$enum_variant => $enum_value,)*
                    $enum_name::Unknown(v) => *v,
                }
            }
        }

        impl Default for $enum_name {
            fn default() -> Self {
                $crate::enum_builder!(@FIRST $enum_name, $($enum_variant),*)
            }
        }

        impl $crate::Codec for $enum_name {
            fn encode(&self, bytes: &mut $crate::Writer) {
                self.$getter().encode(bytes);
            }

            fn read(r: &mut $crate::Reader) -> Option<$enum_name> {
                let v = <$repr as $crate::Codec>::read(r)?;
                Some(match v {
                    $($enum_value => $enum_name::$enum_variant,)*
                    _ => $enum_name::Unknown(v),
                })
            }
        }
    };
    (@FIRST $enum_name:ident, $first:ident $(, $rest:ident)*) => {
        $enum_name::$first
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_reader_roundtrip_u32() {
        let mut buf = [0u8; 4];
        let mut w = Writer::init(&mut buf);
        0xdead_beef_u32.encode(&mut w);
        assert_eq!(w.used(), 4);

        let mut r = Reader::init(&buf);
        assert_eq!(u32::read(&mut r), Some(0xdead_beef_u32));
        assert_eq!(r.left(), 0);
    }

    #[test]
    fn writer_truncates_on_overflow() {
        let mut buf = [0u8; 2];
        let mut w = Writer::init(&mut buf);
        0xdead_beef_u32.encode(&mut w);
        assert_eq!(w.used(), 2);
    }

    #[test]
    fn reader_rejects_short_buffer() {
        let buf = [0u8; 1];
        let mut r = Reader::init(&buf);
        assert_eq!(u32::read(&mut r), None);
    }

    enum_builder! {
        @U8
        EnumName: TestOpcode;
        EnumVal {
            Ping => 0x01,
            Pong => 0x02
        }
    }

    #[test]
    fn enum_builder_roundtrips_known_value() {
        let mut buf = [0u8; 1];
        let mut w = Writer::init(&mut buf);
        TestOpcode::Pong.encode(&mut w);
        let mut r = Reader::init(&buf);
        assert_eq!(TestOpcode::read(&mut r), Some(TestOpcode::Pong));
    }

    #[test]
    fn enum_builder_falls_back_to_unknown() {
        let buf = [0x7fu8];
        let mut r = Reader::init(&buf);
        assert_eq!(TestOpcode::read(&mut r), Some(TestOpcode::Unknown(0x7f)));
    }

    #[test]
    fn enum_builder_default_is_first_variant() {
        assert_eq!(TestOpcode::default(), TestOpcode::Ping);
    }
}
