// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Length-prefixed little-endian binary codec
//!
//! This is the wire format spoken by the zkVM proving networks: fixed width
//! little-endian integers, `u64` length prefixes for byte strings, text and
//! sequences, and `u32` tags for enums. Fixed size arrays carry no prefix.
//!
//! Composite values decode by threading the unconsumed remainder through each
//! field in declaration order:
//!
//! ```rust
//! use zkdcap::bincode::{Decode, DecodeContext, DecodeError};
//!
//! struct Pair {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl Decode for Pair {
//!     fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
//!         let (id, data) = u32::decode(data).field("id")?;
//!         let (name, data) = String::decode(data).field("name")?;
//!         Ok((Pair { id, name }, data))
//!     }
//! }
//! ```

mod error;

pub use error::{DecodeContext, DecodeError};

use std::mem::size_of;

/// Serialize a value into its binary encoding
pub trait Encode {
    /// Append the encoding of `self` to `buf`
    fn encode_to(&self, buf: &mut Vec<u8>);

    /// The encoding of `self` as a fresh buffer
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }
}

/// Deserialize a value from the front of a buffer
pub trait Decode: Sized {
    /// Consume the encoding of `Self` from the front of `data`,
    /// returning the value and the unconsumed remainder.
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError>;
}

/// Decode a top-level message, tolerating trailing bytes.
pub fn from_slice<T: Decode>(data: &[u8]) -> Result<T, DecodeError> {
    T::decode(data).map(|(value, _rest)| value)
}

/// Split `n` bytes off the front of `data`.
pub fn take(data: &[u8], n: usize) -> Result<(&[u8], &[u8]), DecodeError> {
    if data.len() < n {
        return Err(DecodeError::InsufficientBytes {
            needed: n,
            available: data.len(),
        });
    }
    Ok(data.split_at(n))
}

/// Decode an enum discriminant.
pub fn decode_tag(data: &[u8]) -> Result<(u32, &[u8]), DecodeError> {
    u32::decode(data).field("tag")
}

fn decode_len(data: &[u8]) -> Result<(usize, &[u8]), DecodeError> {
    let (len, data) = u64::decode(data).field("len")?;
    let len = usize::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))?;
    Ok((len, data))
}

fn encode_len(len: usize, buf: &mut Vec<u8>) {
    (len as u64).encode_to(buf);
}

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode_to(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }
            }

            impl Decode for $ty {
                fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
                    let (bytes, rest) = take(data, size_of::<$ty>())?;
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    Ok((<$ty>::from_le_bytes(raw), rest))
                }
            }
        )*
    };
}

impl_int!(u8, u16, u32, u64);

/// A `Vec<u8>` is the length-prefixed byte string; it is wire identical to a
/// collection of `u8`, with a fast path for the payload.
impl Encode for Vec<u8> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.as_slice().encode_to(buf);
    }
}

impl Encode for [u8] {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encode_len(self.len(), buf);
        buf.extend_from_slice(self);
    }
}

impl Decode for Vec<u8> {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (len, data) = decode_len(data)?;
        let (bytes, rest) = take(data, len)?;
        Ok((bytes.to_vec(), rest))
    }
}

impl Encode for String {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.as_str().encode_to(buf);
    }
}

impl Encode for str {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.as_bytes().encode_to(buf);
    }
}

impl Decode for String {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (bytes, rest) = Vec::<u8>::decode(data)?;
        Ok((String::from_utf8(bytes)?, rest))
    }
}

/// A homogeneous sequence: `u64` element count followed by the elements.
///
/// Sequences of bytes use the `Vec<u8>` impl above, so this is spelled out
/// for the element types that appear on the wire.
macro_rules! impl_collection {
    ($($elem:ty),*) => {
        $(
            impl Encode for Vec<$elem> {
                fn encode_to(&self, buf: &mut Vec<u8>) {
                    encode_collection(self, buf);
                }
            }

            impl Decode for Vec<$elem> {
                fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
                    decode_collection(data)
                }
            }
        )*
    };
}

impl_collection!(u32, u64, String, Vec<u8>);

/// Encode any slice as a collection.
pub fn encode_collection<T: Encode>(items: &[T], buf: &mut Vec<u8>) {
    encode_len(items.len(), buf);
    for item in items {
        item.encode_to(buf);
    }
}

/// Decode a collection, consuming exactly as many elements as the prefix announces.
pub fn decode_collection<T: Decode>(data: &[u8]) -> Result<(Vec<T>, &[u8]), DecodeError> {
    let (len, mut data) = decode_len(data)?;
    // every element occupies at least one byte, which bounds the allocation
    let mut items = Vec::with_capacity(len.min(data.len()));
    for _ in 0..len {
        let (item, rest) = T::decode(data)?;
        items.push(item);
        data = rest;
    }
    Ok((items, data))
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        for item in self {
            item.encode_to(buf);
        }
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(mut data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            let (item, rest) = T::decode(data)?;
            items.push(item);
            data = rest;
        }
        let array = items
            .try_into()
            .map_err(|items: Vec<T>| DecodeError::LengthOverflow(items.len() as u64))?;
        Ok((array, data))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            None => buf.push(0),
            Some(value) => {
                buf.push(1);
                value.encode_to(buf);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(data: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (tag, data) = u8::decode(data).field("tag")?;
        match tag {
            0 => Ok((None, data)),
            1 => {
                let (value, data) = T::decode(data)?;
                Ok((Some(value), data))
            }
            other => Err(DecodeError::UnknownVariant {
                type_name: "Option",
                discriminant: other.into(),
            }),
        }
    }
}
