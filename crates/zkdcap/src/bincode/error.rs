// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Matter Labs

//! Codec error type

use std::string::FromUtf8Error;
use thiserror::Error;

/// Error decoding a value from its binary encoding
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The buffer ends before the field does
    #[error("insufficient bytes: need {needed}, have {available}")]
    InsufficientBytes {
        /// number of bytes the field requires
        needed: usize,
        /// number of bytes left in the buffer
        available: usize,
    },

    /// An enum tag outside the known set
    #[error("unknown {type_name} variant: {discriminant}")]
    UnknownVariant {
        /// the enum being decoded
        type_name: &'static str,
        /// the offending tag
        discriminant: u64,
    },

    /// A known enum tag whose payload is not decoded by this crate
    #[error("unsupported {type_name} variant: {discriminant}")]
    UnsupportedVariant {
        /// the enum being decoded
        type_name: &'static str,
        /// the offending tag
        discriminant: u64,
    },

    /// String bytes are not valid UTF-8
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A length prefix that does not fit into memory on this platform
    #[error("length prefix {0} out of range")]
    LengthOverflow(u64),

    /// Wraps an inner error with the name of the field that failed
    #[error("{field}: {source}")]
    Field {
        /// the field being decoded
        field: &'static str,
        /// what went wrong inside of it
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// The innermost error, with all field context stripped
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            DecodeError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The field path leading to the innermost error, outermost first
    pub fn field_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut current = self;
        while let DecodeError::Field { field, source } = current {
            path.push(*field);
            current = source;
        }
        path
    }
}

/// Usability trait for annotating decode errors with the failing field
pub trait DecodeContext {
    /// The Ok Type
    type Ok;
    /// Prefix the error with the field name
    fn field(self, name: &'static str) -> Result<Self::Ok, DecodeError>;
}

impl<T> DecodeContext for Result<T, DecodeError> {
    type Ok = T;
    fn field(self, name: &'static str) -> Result<T, DecodeError> {
        self.map_err(|e| DecodeError::Field {
            field: name,
            source: Box::new(e),
        })
    }
}
