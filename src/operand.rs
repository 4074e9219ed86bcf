//! Source operand decoding: temp register / special (semantic) input / constant.

use crate::error::{Error, Result};
use crate::reader::Reader;

const fn bits(word: u32, start: u32, width: u32) -> u32 {
    (word >> start) & ((1u32 << width) - 1)
}

/// Where a decoded source operand's value comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperandKind {
    /// A temporary register, `rN` (full) or `hN` (half).
    TempRegister { index: u8, fp16: bool },
    /// An enumerated input semantic (position/color/texcoord/...).
    SpecialInput {
        semantic: u8,
        perspective_corrected: bool,
        use_index_reg: bool,
        loop_register_offset: u16,
    },
    /// An embedded vec4 float literal read from the constant line following
    /// the instruction.
    Constant {
        x: f32,
        y: f32,
        z: f32,
        w: f32,
        source_offset: u32,
    },
}

/// A decoded source operand, with the modifiers shared by every variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operand {
    pub kind: OperandKind,
    pub swizzle_mask: u8,
    pub abs: bool,
    pub negate: bool,
}

impl Operand {
    /// Decode operand `index` (1, 2 or 3).
    ///
    /// `operand_word` is the raw SRC0/SRC1/SRC2 word this operand's own
    /// register/swizzle fields live in. `dst_word` and `src2_word` are always
    /// needed in addition, because a `SpecialInput` operand's semantic comes
    /// from DST and its addressing modifiers always come from SRC2,
    /// regardless of which operand slot resolves to `SpecialInput`.
    pub fn load(
        index: u8,
        dst_word: u32,
        operand_word: u32,
        src2_word: u32,
        reader: &mut Reader<'_>,
        line: u32,
    ) -> Result<Self> {
        let reg_type = bits(operand_word, 0, 2) as u8;
        let tmp_reg_index = bits(operand_word, 2, 6) as u8;
        let fp16 = bits(operand_word, 8, 1) != 0;
        let swizzle_mask = bits(operand_word, 9, 8) as u8;
        let negate = bits(operand_word, 17, 1) != 0;
        // Operand 1's `abs` lives at a different bit than operands 2/3's,
        // because it is read out of a different 32-bit word, not because the
        // flag differs in meaning.
        let abs = if index == 1 {
            bits(operand_word, 29, 1) != 0
        } else {
            bits(operand_word, 18, 1) != 0
        };

        let kind = match reg_type {
            0 => OperandKind::TempRegister {
                index: tmp_reg_index,
                fp16,
            },
            1 => OperandKind::SpecialInput {
                semantic: bits(dst_word, 13, 4) as u8,
                perspective_corrected: bits(src2_word, 31, 1) == 0,
                use_index_reg: bits(src2_word, 30, 1) != 0,
                loop_register_offset: bits(src2_word, 19, 11) as u16,
            },
            2 => {
                let source_offset = reader.bytes_read() as u32;
                let (x, y, z, w) = reader.read_vec4()?;
                OperandKind::Constant {
                    x,
                    y,
                    z,
                    w,
                    source_offset,
                }
            }
            other => return Err(Error::BadSourceRegType { value: other, line }),
        };

        Ok(Self {
            kind,
            swizzle_mask,
            abs,
            negate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_one_and_two_read_abs_from_different_bits() {
        let mut reader = Reader::new(&[]);
        let op1 = Operand::load(1, 0, 1 << 29, 0, &mut reader, 0).unwrap();
        assert!(op1.abs);
        let op2 = Operand::load(2, 0, 1 << 18, 0, &mut reader, 0).unwrap();
        assert!(op2.abs);
        let op2_not_abs = Operand::load(2, 0, 1 << 29, 0, &mut reader, 0).unwrap();
        assert!(!op2_not_abs.abs);
    }

    #[test]
    fn special_input_reads_semantic_from_dst_and_modifiers_from_src2() {
        let mut reader = Reader::new(&[]);
        let dst_word = 0b0101 << 13; // input_semantic = 5
        let src2_word = (1 << 30) | (0 << 31); // use_index_reg, perspective enabled
        let op = Operand::load(1, dst_word, 0b01, src2_word, &mut reader, 0).unwrap();
        assert_eq!(
            op.kind,
            OperandKind::SpecialInput {
                semantic: 5,
                perspective_corrected: true,
                use_index_reg: true,
                loop_register_offset: 0,
            }
        );
    }

    #[test]
    fn constant_operand_reads_the_trailing_line() {
        let mut bytes = vec![0u8; 32];
        let swap = |w: u32| -> [u8; 4] { (((w & 0xffff) << 16) | (w >> 16)).to_le_bytes() };
        bytes[16..20].copy_from_slice(&swap(0x3f80_0000)); // 1.0
        bytes[20..24].copy_from_slice(&swap(0x4000_0000)); // 2.0
        let mut reader = Reader::new(&bytes);
        let op = Operand::load(1, 0, 0b10, 0, &mut reader, 0).unwrap();
        match op.kind {
            OperandKind::Constant { x, y, .. } => {
                assert_eq!(x, 1.0);
                assert_eq!(y, 2.0);
            }
            other => panic!("expected constant operand, got {other:?}"),
        }
    }
}
