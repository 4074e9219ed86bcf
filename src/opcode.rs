//! The 7-bit fragment-shader opcode space.

use crate::error::Error;

/// One of the fixed fragment-shader opcodes, decoded from
/// `dst.opcode_low6 | (src1.opcode_is_branch << 6)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Opcode {
    Nop = 0x00,
    Mov = 0x01,
    Mul = 0x02,
    Add = 0x03,
    Mad = 0x04,
    Dp3 = 0x05,
    Dp4 = 0x06,
    Dst = 0x07,
    Min = 0x08,
    Max = 0x09,
    Slt = 0x0A,
    Sge = 0x0B,
    Sle = 0x0C,
    Sgt = 0x0D,
    Sne = 0x0E,
    Seq = 0x0F,
    Frc = 0x10,
    Flr = 0x11,
    Kil = 0x12,
    Pk4 = 0x13,
    Up4 = 0x14,
    Ddx = 0x15,
    Ddy = 0x16,
    Tex = 0x17,
    Txp = 0x18,
    Txd = 0x19,
    Rcp = 0x1A,
    Rsq = 0x1B,
    Ex2 = 0x1C,
    Lg2 = 0x1D,
    Lit = 0x1E,
    Lrp = 0x1F,
    Str = 0x20,
    Sfl = 0x21,
    Cos = 0x22,
    Sin = 0x23,
    Pk2 = 0x24,
    Up2 = 0x25,
    Pow = 0x26,
    Pkb = 0x27,
    Upb = 0x28,
    Pk16 = 0x29,
    Up16 = 0x2A,
    Bem = 0x2B,
    Pkg = 0x2C,
    Upg = 0x2D,
    Dp2a = 0x2E,
    Txl = 0x2F,
    Txb = 0x31,
    Texbem = 0x33,
    Txpbem = 0x34,
    Bemlum = 0x35,
    Refl = 0x36,
    Timeswtex = 0x37,
    Dp2 = 0x38,
    Nrm = 0x39,
    Div = 0x3A,
    Divsq = 0x3B,
    Lif = 0x3C,
    Fenct = 0x3D,
    Fencb = 0x3E,
    Brk = 0x40,
    Cal = 0x41,
    Ife = 0x42,
    Loop = 0x43,
    Rep = 0x44,
    Ret = 0x45,
}

impl Opcode {
    /// Decode from the 7-bit combined opcode (`dst.opcode_low6 | (branch_bit << 6)`).
    pub fn from_bits(value: u8, line: u32) -> Result<Self, Error> {
        use Opcode::*;
        Ok(match value {
            0x00 => Nop,
            0x01 => Mov,
            0x02 => Mul,
            0x03 => Add,
            0x04 => Mad,
            0x05 => Dp3,
            0x06 => Dp4,
            0x07 => Dst,
            0x08 => Min,
            0x09 => Max,
            0x0A => Slt,
            0x0B => Sge,
            0x0C => Sle,
            0x0D => Sgt,
            0x0E => Sne,
            0x0F => Seq,
            0x10 => Frc,
            0x11 => Flr,
            0x12 => Kil,
            0x13 => Pk4,
            0x14 => Up4,
            0x15 => Ddx,
            0x16 => Ddy,
            0x17 => Tex,
            0x18 => Txp,
            0x19 => Txd,
            0x1A => Rcp,
            0x1B => Rsq,
            0x1C => Ex2,
            0x1D => Lg2,
            0x1E => Lit,
            0x1F => Lrp,
            0x20 => Str,
            0x21 => Sfl,
            0x22 => Cos,
            0x23 => Sin,
            0x24 => Pk2,
            0x25 => Up2,
            0x26 => Pow,
            0x27 => Pkb,
            0x28 => Upb,
            0x29 => Pk16,
            0x2A => Up16,
            0x2B => Bem,
            0x2C => Pkg,
            0x2D => Upg,
            0x2E => Dp2a,
            0x2F => Txl,
            0x31 => Txb,
            0x33 => Texbem,
            0x34 => Txpbem,
            0x35 => Bemlum,
            0x36 => Refl,
            0x37 => Timeswtex,
            0x38 => Dp2,
            0x39 => Nrm,
            0x3A => Div,
            0x3B => Divsq,
            0x3C => Lif,
            0x3D => Fenct,
            0x3E => Fencb,
            0x40 => Brk,
            0x41 => Cal,
            0x42 => Ife,
            0x43 => Loop,
            0x44 => Rep,
            0x45 => Ret,
            other => return Err(Error::UnknownOpcode { opcode: other, line }),
        })
    }
}
