//! Rift interp - incremental interpretation of encoded text buffers
//!
//! A [`buffer::ByteBuffer`] holds raw bytes. An
//! [`interpretation::Interpretation`] attached to it decodes those bytes with
//! a pluggable [`encoding::Encoding`] and keeps byte, codepoint, character
//! and line positions queryable in logarithmic time, repairing itself
//! locally after each edit batch.

pub mod buffer;
pub mod caret;
pub mod character;
pub mod config;
pub mod constants;
pub mod document;
pub mod encoding;
pub mod error;
pub mod interpretation;
pub mod tree;
