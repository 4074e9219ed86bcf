//! Translator from packed fragment-shader microcode into GLSL 330 fragment
//! shader source.
//!
//! The microcode is the fixed-function fragment program format emitted by an
//! emulated console's RSX-style GPU: one 16-byte instruction "line" per
//! fragment op, halfword-swapped 32-bit words, trailing constant lines for
//! embedded `vec4` literals. [`translate`] decodes a program and an
//! accompanying control word into a complete, ready-to-compile shader string.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![deny(
    clippy::arithmetic_side_effects,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

pub mod condition;
pub mod control;
pub mod emit;
pub mod error;
pub mod fields;
pub mod hash;
pub mod instr;
pub mod opcode;
pub mod operand;
pub mod parser;
pub mod reader;

pub use control::ControlWord;
pub use error::{Error, Failure, Result};
pub use instr::{InstrMeta, Instruction};
pub use opcode::Opcode;

/// The result of translating one fragment program: the generated GLSL source,
/// the program's MurmurHash3_32 (for cache-key purposes), and the number of
/// bytes actually consumed from `program_bytes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Complete `#version 330` GLSL fragment shader source.
    pub glsl: String,
    /// MurmurHash3_32 of the bytes that were actually parsed.
    pub hash: u32,
    /// Number of bytes of `program_bytes` that were consumed.
    pub bytes_read: usize,
    /// Set if a control-flow block in the program never found its matching
    /// close; the translation still completes, with unclosed blocks folded
    /// into their parent scope.
    pub unclosed_blocks: bool,
}

/// Decode a packed fragment program and emit its GLSL 330 translation.
///
/// `control_bits` is the 32-bit control word that always accompanies a
/// fragment program on this console (see [`ControlWord`]); it determines
/// whether the final color comes from `r0` or `h0` and whether depth
/// replacement is active.
#[tracing::instrument(skip(program_bytes), fields(bytes_len = program_bytes.len()))]
pub fn translate(program_bytes: &[u8], control_bits: u32) -> core::result::Result<Translation, Failure> {
    let control = ControlWord::from_bits(control_bits);
    let parsed = parser::parse(program_bytes)?;
    let glsl = emit::emit(&parsed.instructions, control)
        .map_err(|source| Failure::new(source, line_bytes_at(program_bytes, parsed.bytes_read)))?;
    Ok(Translation {
        glsl,
        hash: parsed.hash,
        bytes_read: parsed.bytes_read,
        unclosed_blocks: parsed.unclosed_blocks,
    })
}

/// Hash a fragment program's raw bytes with MurmurHash3_32, the same hash
/// [`translate`] reports in [`Translation::hash`].
pub fn hash_program(program_bytes: &[u8]) -> u32 {
    hash::murmur3_32(program_bytes, 0)
}

/// Best-effort 16-byte window for a `Failure`'s diagnostic dump when the
/// error surfaced after parsing finished (emission errors have no single
/// offending line the way decode errors do).
fn line_bytes_at(data: &[u8], offset: usize) -> [u8; 16] {
    let mut out = [0u8; 16];
    let start = offset.min(data.len());
    let end = (start + 16).min(data.len());
    out[..end - start].copy_from_slice(&data[start..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_program_matches_parser_reported_hash() {
        // A single MOV from COL0 into r0, marked `end`.
        let mut bytes = vec![0u8; 16];
        let dst: u32 = 0x01 | (1 << 13) | (1 << 9); // opcode_low6=MOV, input_semantic=1, write_mask=x
        let src0: u32 = 1; // reg_type = SpecialInput
        let swap = |w: u32| -> [u8; 4] { (((w & 0xffff) << 16) | (w >> 16)).to_le_bytes() };
        bytes[0..4].copy_from_slice(&swap(dst | 1)); // end bit
        bytes[4..8].copy_from_slice(&swap(src0));
        bytes[8..12].copy_from_slice(&swap(0));
        bytes[12..16].copy_from_slice(&swap(0));

        let translation = translate(&bytes, 1 << 6).unwrap();
        assert_eq!(translation.hash, hash_program(&bytes[..translation.bytes_read]));
        assert!(translation.glsl.contains("#version 330"));
    }
}
