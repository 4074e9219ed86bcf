//! Bitfield views over the four 32-bit words of one instruction line.
//!
//! Bit offsets below are LSB-first and mirror the packed hardware layout
//! exactly (see `DESIGN.md` for the union-by-union derivation); they are not
//! a fresh invention, so don't "clean them up" into a nicer-looking but
//! different order.

use crate::error::Error;

const fn bits(word: u32, start: u32, width: u32) -> u32 {
    (word >> start) & ((1u32 << width) - 1)
}

/// The destination word: which register is written, the write mask, and the
/// instruction-level modifiers (precision, saturate, scale target, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dst(pub u32);

impl Dst {
    /// Set on the last instruction of the program.
    pub const fn end(self) -> bool {
        bits(self.0, 0, 1) != 0
    }

    /// Destination register index (0..47).
    pub const fn dest_reg(self) -> u8 {
        bits(self.0, 1, 6) as u8
    }

    /// Destination is a half-precision (`hN`) register.
    pub const fn fp16(self) -> bool {
        bits(self.0, 7, 1) != 0
    }

    /// This instruction also writes a condition register.
    pub const fn set_cond(self) -> bool {
        bits(self.0, 8, 1) != 0
    }

    /// 4-bit x/y/z/w write mask.
    pub const fn write_mask(self) -> u8 {
        bits(self.0, 9, 4) as u8
    }

    /// Input semantic index, valid when a source operand resolves to `SpecialInput`.
    pub const fn input_semantic(self) -> u8 {
        bits(self.0, 13, 4) as u8
    }

    /// Texture sampler unit, valid for TEX-family opcodes.
    pub const fn tex_num(self) -> u8 {
        bits(self.0, 17, 4) as u8
    }

    /// "Biased" post-processing: `result * 2 - 1`.
    pub const fn exp_tex(self) -> bool {
        bits(self.0, 21, 1) != 0
    }

    /// 2-bit precision selector (Full/Half/Fixed12/Fixed9).
    pub const fn precision(self) -> u8 {
        bits(self.0, 22, 2) as u8
    }

    /// Low 6 bits of the 7-bit opcode (high bit lives in SRC1).
    pub const fn opcode_low6(self) -> u8 {
        bits(self.0, 24, 6) as u8
    }

    /// Destination is a condition register, not a normal temp/output register.
    pub const fn no_dest(self) -> bool {
        bits(self.0, 30, 1) != 0
    }

    /// Clamp the result to `[0, 1]`.
    pub const fn saturate(self) -> bool {
        bits(self.0, 31, 1) != 0
    }
}

/// Shared bit positions for the first operand word's swizzle/neg/reg fields,
/// common to SRC0/SRC1/SRC2's "normal" operand views.
const fn generic_reg_type(word: u32) -> u8 {
    bits(word, 0, 2) as u8
}
const fn generic_tmp_reg_index(word: u32) -> u8 {
    bits(word, 2, 6) as u8
}
const fn generic_fp16(word: u32) -> bool {
    bits(word, 8, 1) != 0
}
const fn generic_swizzle_mask(word: u32) -> u8 {
    bits(word, 9, 8) as u8
}
const fn generic_neg(word: u32) -> bool {
    bits(word, 17, 1) != 0
}

/// The SRC0 word: operand 1's register/swizzle fields, plus the condition
/// triple and per-channel condition swizzle used by predicated execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Src0(pub u32);

impl Src0 {
    pub const fn reg_type(self) -> u8 {
        generic_reg_type(self.0)
    }
    pub const fn tmp_reg_index(self) -> u8 {
        generic_tmp_reg_index(self.0)
    }
    pub const fn fp16(self) -> bool {
        generic_fp16(self.0)
    }
    pub const fn swizzle_mask(self) -> u8 {
        generic_swizzle_mask(self.0)
    }
    pub const fn neg(self) -> bool {
        generic_neg(self.0)
    }

    /// Operand-1's `abs` flag.
    pub const fn abs(self) -> bool {
        bits(self.0, 29, 1) != 0
    }

    /// Condition value: `exec_if_lt | (exec_if_eq << 1) | (exec_if_gr << 2)`.
    pub const fn condition_value(self) -> u8 {
        bits(self.0, 18, 3) as u8
    }

    /// Per-channel condition swizzle (4 × 2 bits) used to index the condition register.
    pub const fn condition_swizzle(self) -> u8 {
        bits(self.0, 21, 8) as u8
    }

    /// Which condition register this instruction reads (`rc` vs `rc1`).
    pub const fn cond_reg_index(self) -> bool {
        bits(self.0, 30, 1) != 0
    }

    /// Which condition register a `set_cond` instruction writes (`rc` vs `rc1`).
    pub const fn cond_mod_reg_index(self) -> bool {
        bits(self.0, 31, 1) != 0
    }
}

/// The SRC1 word. Three mutually-exclusive views: normal operand 2, the loop
/// counter triple (LOOP/REP), and the branch target (IFE/CAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Src1(pub u32);

impl Src1 {
    pub const fn reg_type(self) -> u8 {
        generic_reg_type(self.0)
    }
    pub const fn tmp_reg_index(self) -> u8 {
        generic_tmp_reg_index(self.0)
    }
    pub const fn fp16(self) -> bool {
        generic_fp16(self.0)
    }
    pub const fn swizzle_mask(self) -> u8 {
        generic_swizzle_mask(self.0)
    }
    pub const fn neg(self) -> bool {
        generic_neg(self.0)
    }

    /// Operand-2/3's shared `abs` bit position.
    pub const fn abs(self) -> bool {
        bits(self.0, 18, 1) != 0
    }

    /// Raw 3-bit scale selector (see [`crate::fields::Scale`]).
    pub const fn scale_bits(self) -> u8 {
        bits(self.0, 28, 3) as u8
    }

    /// High bit of the 7-bit opcode; also distinguishes the loop/branch views.
    pub const fn opcode_is_branch(self) -> bool {
        bits(self.0, 31, 1) != 0
    }

    /// LOOP/REP view: loop end counter (exclusive bound for LOOP, rep count for REP).
    pub const fn loop_end_counter(self) -> u8 {
        bits(self.0, 2, 8) as u8
    }

    /// LOOP view: initial counter value.
    pub const fn loop_init_counter(self) -> u8 {
        bits(self.0, 10, 8) as u8
    }

    /// LOOP view: per-iteration increment.
    pub const fn loop_increment(self) -> u8 {
        bits(self.0, 19, 8) as u8
    }

    /// IFE view: absolute line number of the `else` branch.
    pub const fn if_else_line(self) -> u32 {
        bits(self.0, 2, 17)
    }

    /// CAL view: absolute line number of the call target.
    pub const fn call_target(self) -> u32 {
        bits(self.0, 2, 17)
    }
}

/// The SRC2 word. Two views: normal operand 3, and the end-of-block line
/// number for IFE/LOOP/REP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Src2(pub u32);

impl Src2 {
    pub const fn reg_type(self) -> u8 {
        generic_reg_type(self.0)
    }
    pub const fn tmp_reg_index(self) -> u8 {
        generic_tmp_reg_index(self.0)
    }
    pub const fn fp16(self) -> bool {
        generic_fp16(self.0)
    }
    pub const fn swizzle_mask(self) -> u8 {
        generic_swizzle_mask(self.0)
    }
    pub const fn neg(self) -> bool {
        generic_neg(self.0)
    }
    pub const fn abs(self) -> bool {
        bits(self.0, 18, 1) != 0
    }

    /// Index register offset for indexed special-input addressing.
    pub const fn addr_reg(self) -> u16 {
        bits(self.0, 19, 11) as u16
    }

    /// Operand 1 is addressed through the loop index register.
    pub const fn use_index_reg(self) -> bool {
        bits(self.0, 30, 1) != 0
    }

    /// Perspective correction is *disabled* for this instruction's special input.
    pub const fn perspective_correction_disabled(self) -> bool {
        bits(self.0, 31, 1) != 0
    }

    /// Loop view: absolute line number of the matching `endif`/`endloop`/`endrep`.
    pub const fn loop_end(self) -> u32 {
        bits(self.0, 2, 17)
    }
}

/// Destination numeric precision / post-ALU clamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Full,
    Half,
    Fixed12,
    Fixed9,
}

impl Precision {
    /// Decode the 2-bit `dst.precision` field.
    pub const fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0 => Precision::Full,
            1 => Precision::Half,
            2 => Precision::Fixed12,
            _ => Precision::Fixed9,
        }
    }
}

/// Post-ALU scale applied to the destination before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    None,
    Times2,
    Times4,
    Times8,
    Div2,
    Div4,
    Div8,
}

impl Scale {
    /// Decode the 3-bit `src1.scale` field.
    pub fn from_bits(value: u8, line: u32) -> Result<Self, Error> {
        Ok(match value {
            0 => Scale::None,
            1 => Scale::Times2,
            2 => Scale::Times4,
            3 => Scale::Times8,
            5 => Scale::Div2,
            6 => Scale::Div4,
            7 => Scale::Div8,
            other => return Err(Error::BadScale { value: other, line }),
        })
    }

    /// The operator and factor to apply, or `None` for [`Scale::None`].
    pub const fn op_and_factor(self) -> Option<(char, f32)> {
        match self {
            Scale::None => None,
            Scale::Times2 => Some(('*', 2.0)),
            Scale::Times4 => Some(('*', 4.0)),
            Scale::Times8 => Some(('*', 8.0)),
            Scale::Div2 => Some(('/', 2.0)),
            Scale::Div4 => Some(('/', 4.0)),
            Scale::Div8 => Some(('/', 8.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dst_round_trips_every_field() {
        let mut word = 0u32;
        word |= 1 << 0; // end
        word |= 0b10_1010 << 1; // dest_reg
        word |= 1 << 7; // fp16
        word |= 1 << 8; // set_cond
        word |= 0b1011 << 9; // write_mask
        word |= 0b0111 << 13; // input_semantic
        word |= 0b1001 << 17; // tex_num
        word |= 1 << 21; // exp_tex
        word |= 0b10 << 22; // precision
        word |= 0b010101 << 24; // opcode_low6
        word |= 1 << 30; // no_dest
        word |= 1 << 31; // saturate

        let dst = Dst(word);
        assert!(dst.end());
        assert_eq!(dst.dest_reg(), 0b10_1010);
        assert!(dst.fp16());
        assert!(dst.set_cond());
        assert_eq!(dst.write_mask(), 0b1011);
        assert_eq!(dst.input_semantic(), 0b0111);
        assert_eq!(dst.tex_num(), 0b1001);
        assert!(dst.exp_tex());
        assert_eq!(dst.precision(), 0b10);
        assert_eq!(dst.opcode_low6(), 0b010101);
        assert!(dst.no_dest());
        assert!(dst.saturate());
    }

    #[test]
    fn src1_branch_bit_reads_through_every_view() {
        let word = 1u32 << 31;
        assert!(Src1(word).opcode_is_branch());
    }

    #[test]
    fn src0_abs_and_src1_abs_are_different_bits() {
        let src0 = Src0(1 << 29);
        assert!(src0.abs());
        let src1 = Src1(1 << 18);
        assert!(src1.abs());
        assert!(!Src1(1 << 29).abs());
    }

    #[test]
    fn scale_rejects_the_unused_encoding() {
        assert_eq!(Scale::from_bits(4, 7), Err(Error::BadScale { value: 4, line: 7 }));
    }
}
