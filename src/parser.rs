//! Single-pass IR builder.
//!
//! Drives the [`Reader`], decodes each instruction's field views, and
//! produces the instruction tree using a stack of pending-block contexts
//! keyed by absolute line numbers, exactly as the original parser's context
//! stack works — just without the visitor indirection.

use tracing::{instrument, trace};

use crate::condition::Condition;
use crate::error::{Error, Failure, Result};
use crate::fields::{Dst, Precision, Scale, Src0, Src1, Src2};
use crate::hash::murmur3_32;
use crate::instr::{InstrMeta, Instruction};
use crate::opcode::Opcode;
use crate::operand::Operand;
use crate::reader::Reader;

const NO_LINE: u32 = 0xFFFF_FFFF;

enum PendingKind {
    Root,
    IfElse {
        meta: InstrMeta,
    },
    Loop {
        meta: InstrMeta,
        init: u8,
        end: u8,
        increment: u8,
    },
    Rep {
        meta: InstrMeta,
        count: u16,
    },
}

struct Context {
    kind: PendingKind,
    line_number_end: u32,
    line_number_else: u32,
    body: Vec<Instruction>,
    else_body: Vec<Instruction>,
    in_else: bool,
}

impl Context {
    fn root() -> Self {
        Self {
            kind: PendingKind::Root,
            line_number_end: NO_LINE,
            line_number_else: NO_LINE,
            body: Vec::new(),
            else_body: Vec::new(),
            in_else: false,
        }
    }

    fn active_body_mut(&mut self) -> &mut Vec<Instruction> {
        if self.in_else {
            &mut self.else_body
        } else {
            &mut self.body
        }
    }
}

fn finish_context(ctx: Context) -> Instruction {
    match ctx.kind {
        PendingKind::Root => unreachable!("the root context is never popped"),
        PendingKind::IfElse { meta } => Instruction::IfElse {
            meta,
            then_body: ctx.body,
            else_body: ctx.else_body,
        },
        PendingKind::Loop {
            meta,
            init,
            end,
            increment,
        } => Instruction::Loop {
            meta,
            init,
            end,
            increment,
            body: ctx.body,
        },
        PendingKind::Rep { meta, count } => Instruction::Rep {
            meta,
            count,
            body: ctx.body,
        },
    }
}

enum Arity {
    Zero,
    One,
    Two,
    Three,
}

/// How many source operand slots an opcode reads. Branch/control-flow
/// opcodes (IFE/LOOP/REP/CAL/BRK/RET) are handled before this is consulted;
/// the rest mirrors the original decompiler's `Instruction{0,1,2,3}` arity
/// split. A handful of unimplemented opcodes (LIT, LRP, the BEM/TX family,
/// PK*/UP*, ...) have no effect on emitted GLSL either way, so their exact
/// arity here is a best-effort guess sized to keep line-number bookkeeping
/// plausible rather than a bit-exact fact recovered from the source (see
/// DESIGN.md).
const fn arity(op: Opcode) -> Arity {
    use Opcode::*;
    match op {
        Nop | Fenct | Fencb | Str | Sfl | Brk | Ret | Cal | Ife | Loop | Rep => Arity::Zero,
        Mov | Frc | Flr | Cos | Sin | Ex2 | Lg2 | Ddx | Ddy | Rcp | Rsq | Nrm | Kil | Tex
        | Txp | Txl | Txb | Pk4 | Up4 | Pk2 | Up2 | Pkb | Upb | Pk16 | Up16 | Pkg | Upg | Lif
        | Lit => Arity::One,
        Mul | Add | Min | Max | Slt | Sge | Sle | Sgt | Sne | Seq | Dp3 | Dp4 | Dst | Pow
        | Div | Divsq | Bem | Dp2 | Refl | Timeswtex | Texbem | Txpbem | Bemlum => Arity::Two,
        Mad | Dp2a | Lrp | Txd => Arity::Three,
    }
}

/// Whether this opcode's instruction writes a destination at all.
const fn has_destination(op: Opcode) -> bool {
    !matches!(
        op,
        Opcode::Nop
            | Opcode::Fenct
            | Opcode::Fencb
            | Opcode::Str
            | Opcode::Sfl
            | Opcode::Kil
            | Opcode::Brk
            | Opcode::Ret
            | Opcode::Cal
            | Opcode::Ife
            | Opcode::Loop
            | Opcode::Rep
    )
}

fn build_meta(dst: &Dst, src0: &Src0, src1: &Src1, line: u32, op: Opcode) -> Result<InstrMeta> {
    let scale = Scale::from_bits(src1.scale_bits(), line)?;
    Ok(InstrMeta {
        line,
        dest_reg_index: dst.dest_reg(),
        fp16_dest: dst.fp16(),
        write_mask: dst.write_mask(),
        precision: Precision::from_bits(dst.precision()),
        set_cond: dst.set_cond(),
        cond_reg_read: src0.cond_reg_index(),
        cond_reg_write: src0.cond_mod_reg_index(),
        condition: Condition::from_value(src0.condition_value()),
        condition_swizzle: src0.condition_swizzle(),
        scale,
        biased: dst.exp_tex(),
        saturate: dst.saturate(),
        targets_cond_register: dst.no_dest(),
        sampler: dst.tex_num(),
        has_dest: has_destination(op),
    })
}

#[allow(clippy::too_many_arguments)]
fn build_instruction(
    op: Opcode,
    meta: InstrMeta,
    dst: &Dst,
    src0: &Src0,
    src1: &Src1,
    src2: &Src2,
    reader: &mut Reader<'_>,
    line: u32,
) -> Result<Instruction> {
    match op {
        Opcode::Brk => Ok(Instruction::Break { meta }),
        Opcode::Ret => Ok(Instruction::Return { meta }),
        Opcode::Cal => Ok(Instruction::Call {
            meta,
            target_line: src1.call_target(),
        }),
        Opcode::Ife | Opcode::Loop | Opcode::Rep => {
            unreachable!("control-flow opcodes are folded in by the context stack, not built here")
        }
        _ => match arity(op) {
            Arity::Zero => Ok(Instruction::Nullary { meta, op }),
            Arity::One => {
                let a = Operand::load(1, dst.0, src0.0, src2.0, reader, line)?;
                Ok(Instruction::Unary { meta, op, a })
            }
            Arity::Two => {
                let a = Operand::load(1, dst.0, src0.0, src2.0, reader, line)?;
                let b = Operand::load(2, dst.0, src1.0, src2.0, reader, line)?;
                Ok(Instruction::Binary { meta, op, a, b })
            }
            Arity::Three => {
                let a = Operand::load(1, dst.0, src0.0, src2.0, reader, line)?;
                let b = Operand::load(2, dst.0, src1.0, src2.0, reader, line)?;
                let c = Operand::load(3, dst.0, src2.0, src2.0, reader, line)?;
                Ok(Instruction::Ternary { meta, op, a, b, c })
            }
        },
    }
}

/// Result of a successful parse: the top-level instruction list plus the
/// bookkeeping a caller needs for a shader cache (`bytes_read`, `hash`) and
/// the one non-fatal warning this stage can produce (`unclosed_blocks`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProgram {
    pub instructions: Vec<Instruction>,
    pub bytes_read: usize,
    pub hash: u32,
    /// `end=1` was reached with more than the root context on the stack.
    pub unclosed_blocks: bool,
}

/// Parse a fragment program's raw bytes into its instruction tree.
#[instrument(skip(data), fields(bytes_len = data.len()))]
pub fn parse(data: &[u8]) -> core::result::Result<ParsedProgram, Failure> {
    let mut reader = Reader::new(data);
    let mut stack: Vec<Context> = vec![Context::root()];

    loop {
        let current_line = reader.line_number();

        let top_end = stack.last().expect("stack is never empty").line_number_end;
        if current_line == top_end {
            if stack.len() <= 1 {
                return Err(Failure::new(
                    Error::UnbalancedBlock { line: current_line },
                    reader.dump_line(),
                ));
            }
            let closed = stack.pop().expect("checked len above");
            trace!(line = current_line, "closing control-flow block");
            let finished = finish_context(closed);
            stack
                .last_mut()
                .expect("stack is never empty")
                .active_body_mut()
                .push(finished);
            continue;
        }

        let top_else = stack.last().expect("stack is never empty").line_number_else;
        if current_line == top_else {
            stack.last_mut().expect("stack is never empty").in_else = true;
        }

        let (dst, src0, src1, src2) = reader
            .begin_instruction()
            .map_err(|e| Failure::new(e, reader.dump_line()))?;
        let line = reader.line_number();

        let raw_opcode = dst.opcode_low6() | ((src1.opcode_is_branch() as u8) << 6);
        let op =
            Opcode::from_bits(raw_opcode, line).map_err(|e| Failure::new(e, reader.dump_line()))?;
        trace!(%op, line, "decoding instruction");

        let is_end = dst.end();
        let meta = build_meta(&dst, &src0, &src1, line, op)
            .map_err(|e| Failure::new(e, reader.dump_line()))?;

        match op {
            Opcode::Ife => stack.push(Context {
                kind: PendingKind::IfElse { meta },
                line_number_end: src2.loop_end(),
                line_number_else: src1.if_else_line(),
                body: Vec::new(),
                else_body: Vec::new(),
                in_else: false,
            }),
            Opcode::Loop => stack.push(Context {
                kind: PendingKind::Loop {
                    meta,
                    init: src1.loop_init_counter(),
                    end: src1.loop_end_counter(),
                    increment: src1.loop_increment(),
                },
                line_number_end: src2.loop_end(),
                line_number_else: NO_LINE,
                body: Vec::new(),
                else_body: Vec::new(),
                in_else: false,
            }),
            Opcode::Rep => stack.push(Context {
                kind: PendingKind::Rep {
                    meta,
                    count: u16::from(src1.loop_end_counter()),
                },
                line_number_end: src2.loop_end(),
                line_number_else: NO_LINE,
                body: Vec::new(),
                else_body: Vec::new(),
                in_else: false,
            }),
            _ => {
                let instruction =
                    build_instruction(op, meta, &dst, &src0, &src1, &src2, &mut reader, line)
                        .map_err(|e| Failure::new(e, reader.dump_line()))?;
                stack
                    .last_mut()
                    .expect("stack is never empty")
                    .active_body_mut()
                    .push(instruction);
            }
        }

        reader.end_instruction();

        if is_end {
            break;
        }
    }

    let unclosed_blocks = stack.len() > 1;
    while stack.len() > 1 {
        let closed = stack.pop().expect("checked len above");
        let finished = finish_context(closed);
        stack
            .last_mut()
            .expect("stack is never empty")
            .active_body_mut()
            .push(finished);
    }
    let root = stack.pop().expect("stack is never empty");

    let bytes_read = reader.bytes_read();
    let hash = murmur3_32(&data[..bytes_read], 0);

    Ok(ParsedProgram {
        instructions: root.body,
        bytes_read,
        hash,
        unclosed_blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::OperandKind;

    fn swap_word(word: u32) -> [u8; 4] {
        (((word & 0xffff) << 16) | (word >> 16)).to_le_bytes()
    }

    fn push_line(bytes: &mut Vec<u8>, dst: u32, src0: u32, src1: u32, src2: u32) {
        bytes.extend_from_slice(&swap_word(dst));
        bytes.extend_from_slice(&swap_word(src0));
        bytes.extend_from_slice(&swap_word(src1));
        bytes.extend_from_slice(&swap_word(src2));
    }

    #[test]
    fn single_mov_from_special_input_parses_to_one_instruction() {
        // MOV r0.xyzw, f[COL0]; end=1
        let mut bytes = Vec::new();
        let dst = 1 /* end */
            | (0 << 1) /* dest_reg */
            | (0b1111 << 9) /* write_mask xyzw */
            | (1 << 13) /* input_semantic = COL0 */
            | (0x01 << 24); /* opcode MOV */
        let src0 = 1 /* reg_type = special */ | (0b1110_0100 << 9) /* identity swizzle */;
        push_line(&mut bytes, dst, src0, 0, 0);

        let parsed = parse(&bytes).expect("parses");
        assert_eq!(parsed.bytes_read, 16);
        assert_eq!(parsed.instructions.len(), 1);
        assert!(!parsed.unclosed_blocks);
        match &parsed.instructions[0] {
            Instruction::Unary { op, a, meta, .. } => {
                assert_eq!(*op, Opcode::Mov);
                assert_eq!(meta.write_mask, 0b1111);
                assert!(matches!(a.kind, OperandKind::SpecialInput { semantic: 1, .. }));
            }
            other => panic!("expected a unary MOV, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_close_is_reported() {
        // A LOOP whose body never reaches its declared end line before `end=1`.
        let mut bytes = Vec::new();
        let loop_dst: u32 = 0x03 << 24; // opcode_low6 = 0x03, the low bits of LOOP (0x43)
        let loop_src1: u32 = 1 << 31; // opcode_is_branch, makes the combined opcode 0x43 (LOOP)
        let loop_src2: u32 = 5 << 2; // line_number_end far past this two-line stream
        push_line(&mut bytes, loop_dst, 0, loop_src1, loop_src2);

        let end_dst: u32 = 1 | (0x01 << 24); // MOV, end=1
        push_line(&mut bytes, end_dst, 1, 0, 0);

        let parsed = parse(&bytes).expect("still parses: unclosed is a warning, not fatal");
        assert!(parsed.unclosed_blocks);
    }
}
