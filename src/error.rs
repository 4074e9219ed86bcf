//! Structured error types for binary decoding and IR construction.

use thiserror::Error;

/// Errors that can occur while decoding a fragment program into its IR.
///
/// Every fatal variant carries enough context (line number, offending raw
/// value) to build the user-visible diagnostic described in the error
/// handling design: the error plus the line at which parsing stopped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The reader was asked to read past the end of the supplied program bytes.
    #[error("read past end of program bytes at offset {offset}")]
    OutOfBounds {
        /// Byte offset of the failed read.
        offset: usize,
    },

    /// The decoded 7-bit opcode has no entry in the opcode enumeration.
    #[error("unknown opcode 0x{opcode:02x} at line {line}")]
    UnknownOpcode {
        /// The undecodable opcode value.
        opcode: u8,
        /// Absolute line number of the offending instruction.
        line: u32,
    },

    /// A `scale` field decoded to the unused value 4, or an out-of-range value.
    #[error("invalid scale field {value} at line {line}")]
    BadScale {
        /// The raw field value.
        value: u8,
        /// Absolute line number of the offending instruction.
        line: u32,
    },

    /// A source operand's `reg_type` field is not one of temp/special/constant.
    #[error("invalid source register type {value} at line {line}")]
    BadSourceRegType {
        /// The raw field value.
        value: u8,
        /// Absolute line number of the offending instruction.
        line: u32,
    },

    /// A `SpecialInput` operand's semantic index is out of the 15-entry table.
    #[error("invalid input semantic {value} at line {line}")]
    BadInputSemantic {
        /// The raw field value.
        value: u8,
        /// Absolute line number of the offending instruction.
        line: u32,
    },

    /// The parser's context stack underflowed: a block tried to close with no
    /// parent context left to return to.
    #[error("unbalanced control-flow block closing at line {line}")]
    UnbalancedBlock {
        /// Absolute line number at which the underflow was detected.
        line: u32,
    },
}

/// Convenience alias for results produced by the decoder and parser.
pub type Result<T> = core::result::Result<T, Error>;

/// A decode/parse failure enriched with a hex-dump of the offending 16-byte
/// line, for the user-visible diagnostic the error handling design asks for.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{source} (line bytes: {line_bytes:02x?})")]
pub struct Failure {
    /// The underlying structured error.
    #[source]
    pub source: Error,
    /// A zero-padded copy of the 16-byte line being decoded when this error
    /// was raised.
    pub line_bytes: [u8; 16],
}

impl Failure {
    /// Pair a raw error with the line bytes being decoded at the time.
    pub const fn new(source: Error, line_bytes: [u8; 16]) -> Self {
        Self { source, line_bytes }
    }
}
