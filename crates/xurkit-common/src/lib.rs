//! Common utilities for xurkit.
//!
//! This crate provides foundational types and utilities used across all xurkit crates:
//!
//! - [`BinaryReader`] - Zero-copy big-endian reading from byte slices
//! - [`BinaryWriter`] - The exact inverse of the reader, backed by a `Vec<u8>`
//! - [`packed`] - Packed variable-length unsigned integers
//! - [`xml`] - A small owned XML tree shared by the schema and XUI readers

mod error;
mod reader;
mod writer;

pub mod packed;
pub mod xml;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
