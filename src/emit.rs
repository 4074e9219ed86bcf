//! GLSL 330 emitter: walks the instruction tree and produces a complete
//! shader source string.
//!
//! Grounded on `GLSLFragmentProgramWriter::Process`/`PreInstruction`/
//! `PostInstruction`/per-opcode `Visit` overrides, collapsed from a visitor
//! into one dispatch match per §9's redesign note.

use std::collections::{BTreeSet, HashSet};

use crate::condition::Condition;
use crate::control::ControlWord;
use crate::error::{Error, Result};
use crate::fields::Precision;
use crate::instr::{InstrMeta, Instruction};
use crate::opcode::Opcode;
use crate::operand::{Operand, OperandKind};

const SWIZZLE_LETTERS: [char; 4] = ['x', 'y', 'z', 'w'];
const INPUT_NAMES: [&str; 15] = [
    "gl_Position",
    "col0",
    "col1",
    "fogc",
    "tc0",
    "tc1",
    "tc2",
    "tc3",
    "tc4",
    "tc5",
    "tc6",
    "tc7",
    "tc8",
    "tc9",
    "face_sign",
];

fn input_name(semantic: u8, line: u32) -> Result<&'static str> {
    INPUT_NAMES
        .get(semantic as usize)
        .copied()
        .ok_or(Error::BadInputSemantic { value: semantic, line })
}

fn swizzle_channel(mask: u8, channel: usize) -> char {
    let idx = (mask >> (channel * 2)) & 0b11;
    SWIZZLE_LETTERS[idx as usize]
}

fn operand_swizzle_suffix(swizzle_mask: u8, channels: &[usize]) -> String {
    if channels.is_empty() {
        return String::new();
    }
    if channels.len() == 4 && (0..4).all(|c| swizzle_channel(swizzle_mask, c) == SWIZZLE_LETTERS[c])
    {
        return String::new();
    }
    let mut s = String::from(".");
    for &c in channels {
        s.push(swizzle_channel(swizzle_mask, c));
    }
    s
}

fn condition_uniform(swizzle: u8) -> bool {
    (1..4).all(|c| swizzle_channel(swizzle, c) == swizzle_channel(swizzle, 0))
}

fn cond_register_name(uses_second: bool) -> &'static str {
    if uses_second {
        "rc1"
    } else {
        "rc"
    }
}

fn predicate_guard(meta: &InstrMeta) -> Option<String> {
    if meta.condition.is_unconditional() || matches!(meta.condition, Condition::False) {
        return None;
    }
    let reg = cond_register_name(meta.cond_reg_read);
    if condition_uniform(meta.condition_swizzle) {
        let channel = swizzle_channel(meta.condition_swizzle, 0);
        Some(format!(
            "if ({reg}.{channel} {} 0.0)",
            meta.condition.scalar_glyph()
        ))
    } else {
        let swiz: String = (0..4).map(|c| swizzle_channel(meta.condition_swizzle, c)).collect();
        Some(format!(
            "if (all({}({reg}.{swiz}, vec4(0.0))))",
            meta.condition.vector_builtin()
        ))
    }
}

fn single_channel_guard(meta: &InstrMeta, channel: usize) -> String {
    let reg = cond_register_name(meta.cond_reg_read);
    let c = swizzle_channel(meta.condition_swizzle, channel);
    format!("if ({reg}.{c} {} 0.0)", meta.condition.scalar_glyph())
}

fn unary_func_name(op: Opcode) -> &'static str {
    match op {
        Opcode::Frc => "fract",
        Opcode::Flr => "floor",
        Opcode::Cos => "cos",
        Opcode::Sin => "sin",
        Opcode::Ex2 => "exp2",
        Opcode::Lg2 => "log2",
        Opcode::Ddx => "dFdx",
        Opcode::Ddy => "dFdy",
        _ => unreachable!("not one of the elementwise unary opcodes"),
    }
}

fn compare_glyph(op: Opcode) -> &'static str {
    match op {
        Opcode::Slt => "<",
        Opcode::Sge => ">=",
        Opcode::Sle => "<=",
        Opcode::Sgt => ">",
        Opcode::Sne => "!=",
        Opcode::Seq => "==",
        _ => unreachable!("not one of the SLT-family opcodes"),
    }
}

fn compare_vector_builtin(op: Opcode) -> &'static str {
    match op {
        Opcode::Slt => "lessThan",
        Opcode::Sge => "greaterThanEqual",
        Opcode::Sle => "lessThanEqual",
        Opcode::Sgt => "greaterThan",
        Opcode::Sne => "notEqual",
        Opcode::Seq => "equal",
        _ => unreachable!("not one of the SLT-family opcodes"),
    }
}

const FULL: [usize; 4] = [0, 1, 2, 3];

/// How `wrap_assignment` truncates its expression to the destination width
/// before scale/bias/saturate wrapping.
#[derive(Clone, Copy)]
enum Truncate {
    /// Write-mask bits are destination positions (`.yz` for mask `0b0110`).
    Positional,
    /// Write-mask bits only set the result width; always the first N
    /// components (`.xy` for mask `0b0110`).
    PopcountPrefix,
    /// Expression is already the right width; add no cast.
    Pretruncated,
}

struct Emitter {
    body: String,
    indent: usize,
    single_component: Option<usize>,
    used_inputs: BTreeSet<u8>,
    used_temps: BTreeSet<(u8, bool)>,
    used_outputs: BTreeSet<(u8, bool)>,
    used_cond_regs: BTreeSet<bool>,
    warned_opcodes: HashSet<Opcode>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            body: String::new(),
            indent: 1,
            single_component: None,
            used_inputs: BTreeSet::new(),
            used_temps: BTreeSet::new(),
            used_outputs: BTreeSet::new(),
            used_cond_regs: BTreeSet::new(),
            warned_opcodes: HashSet::new(),
        }
    }

    fn write_line(&mut self, text: &str) {
        for _ in 0..self.indent.min(6) {
            self.body.push_str("    ");
        }
        self.body.push_str(text);
        self.body.push('\n');
    }

    fn warn_unimplemented(&mut self, op: Opcode, line: u32) {
        if self.warned_opcodes.insert(op) {
            tracing::warn!(%op, line, "opcode has no emission rule; instruction produced no GLSL");
        }
    }

    fn record_register(&mut self, index: u8, fp16: bool) {
        if matches!(index, 2 | 3 | 4) {
            self.used_outputs.insert((index, fp16));
        } else {
            self.used_temps.insert((index, fp16));
        }
    }

    fn destination_name(&mut self, meta: &InstrMeta) -> String {
        if meta.targets_cond_register {
            self.used_cond_regs.insert(meta.cond_reg_write);
            cond_register_name(meta.cond_reg_write).to_string()
        } else {
            self.record_register(meta.dest_reg_index, meta.fp16_dest);
            format!(
                "{}{}",
                if meta.fp16_dest { "h" } else { "r" },
                meta.dest_reg_index
            )
        }
    }

    fn dest_swizzle_suffix(&self, write_mask: u8) -> String {
        if let Some(channel) = self.single_component {
            return format!(".{}", SWIZZLE_LETTERS[channel]);
        }
        if write_mask == 0 || write_mask == 0b1111 {
            return String::new();
        }
        let mut s = String::from(".");
        for c in 0..4 {
            if write_mask & (1 << c) != 0 {
                s.push(SWIZZLE_LETTERS[c]);
            }
        }
        s
    }

    /// First-`popcount(write_mask)` components (`.x`/`.xy`/`.xyz`), as opposed
    /// to `dest_swizzle_suffix`'s write-mask *positions*. RCP/RSQ/DIVSQ take a
    /// vector operand but only ever compute from its leading components, cast
    /// down to however many components the destination write-mask actually
    /// writes.
    fn vector_cast_suffix(&self, write_mask: u8) -> String {
        if let Some(channel) = self.single_component {
            return format!(".{}", SWIZZLE_LETTERS[channel]);
        }
        match write_mask.count_ones() {
            1 => ".x".to_string(),
            2 => ".xy".to_string(),
            3 => ".xyz".to_string(),
            _ => String::new(),
        }
    }

    fn active_channel_list(&self, meta: &InstrMeta) -> Vec<usize> {
        if let Some(c) = self.single_component {
            return vec![c];
        }
        (0..4).filter(|c| meta.write_mask & (1 << c) != 0).collect()
    }

    fn active_channel_count(&self, meta: &InstrMeta) -> usize {
        self.active_channel_list(meta).len()
    }

    fn broadcast_scalar(&self, meta: &InstrMeta, scalar_expr: String) -> String {
        match self.active_channel_count(meta) {
            0 | 1 => scalar_expr,
            2 => format!("vec2({scalar_expr})"),
            3 => format!("vec3({scalar_expr})"),
            _ => format!("vec4({scalar_expr})"),
        }
    }

    fn operand_text(&mut self, operand: &Operand, channels: &[usize], line: u32) -> Result<String> {
        let mut base = match operand.kind {
            OperandKind::TempRegister { index, fp16 } => {
                self.record_register(index, fp16);
                format!("{}{}", if fp16 { "h" } else { "r" }, index)
            }
            OperandKind::SpecialInput { semantic, .. } => {
                let name = input_name(semantic, line)?;
                self.used_inputs.insert(semantic);
                name.to_string()
            }
            OperandKind::Constant { x, y, z, w, .. } => format!("vec4({x}, {y}, {z}, {w})"),
        };
        base.push_str(&operand_swizzle_suffix(operand.swizzle_mask, channels));
        if operand.abs {
            base = format!("abs({base})");
        }
        if operand.negate {
            base = format!("-{base}");
        }
        Ok(base)
    }

    /// Composes `dest<suffix> = <clamped/scaled expr>`, matching the
    /// pre/post-instruction wrapping order worked through in Scenario C:
    /// truncate to the destination width, then scale, then bias, then
    /// saturate/precision-clamp outermost. `truncate` picks how that first
    /// truncation step reads the write mask: `Positional` for elementwise ops
    /// (mask bits are destination *positions*), `PopcountPrefix` for
    /// RCP/RSQ/DIVSQ (mask bits only set the result *width*, always taken
    /// from the front), or `Pretruncated` for expressions (comparisons,
    /// dot-product broadcasts) that already produced the right width.
    fn wrap_assignment(&mut self, meta: &InstrMeta, expr: String, truncate: Truncate) -> String {
        let dest = self.destination_name(meta);
        let suffix = self.dest_swizzle_suffix(meta.write_mask);

        let cast = match truncate {
            Truncate::Positional => suffix.clone(),
            Truncate::PopcountPrefix => self.vector_cast_suffix(meta.write_mask),
            Truncate::Pretruncated => String::new(),
        };
        let mut rhs = if cast.is_empty() { expr } else { format!("({expr}){cast}") };

        if let Some((op_char, factor)) = meta.scale.op_and_factor() {
            rhs = format!("({rhs} {op_char} {factor:.1})");
        }
        if meta.biased {
            rhs = format!("({rhs} * 2.0 - 1.0)");
        }
        if meta.saturate {
            rhs = format!("clamp({rhs}, 0.0, 1.0)");
        } else {
            match meta.precision {
                Precision::Fixed12 => rhs = format!("clamp({rhs}, -2.0, 2.0)"),
                Precision::Fixed9 => rhs = format!("clamp({rhs}, -1.0, 1.0)"),
                Precision::Full | Precision::Half => {}
            }
        }

        format!("{dest}{suffix} = {rhs}")
    }

    fn emit_guarded<F>(&mut self, meta: &InstrMeta, mut statement: F) -> Result<()>
    where
        F: FnMut(&mut Self, Option<usize>) -> Result<Option<String>>,
    {
        if matches!(meta.condition, Condition::False) {
            return Ok(());
        }

        let splitting =
            meta.has_dest && !meta.condition.is_unconditional() && !condition_uniform(meta.condition_swizzle);

        if splitting {
            for channel in 0..4usize {
                if meta.write_mask & (1 << channel) == 0 {
                    continue;
                }
                self.single_component = Some(channel);
                let stmt = statement(self, Some(channel))?;
                if let Some(stmt) = stmt {
                    let guard = single_channel_guard(meta, channel);
                    self.write_line(&format!("{guard} {{"));
                    self.indent += 1;
                    self.write_line(&format!("{stmt};"));
                    self.indent -= 1;
                    self.write_line("}");
                }
            }
            self.single_component = None;
            return Ok(());
        }

        self.single_component = None;
        let guard = predicate_guard(meta);
        if let Some(stmt) = statement(self, None)? {
            match guard {
                Some(g) => {
                    self.write_line(&format!("{g} {{"));
                    self.indent += 1;
                    self.write_line(&format!("{stmt};"));
                    self.indent -= 1;
                    self.write_line("}");
                }
                None => self.write_line(&format!("{stmt};")),
            }
        }
        Ok(())
    }

    fn emit_instruction(&mut self, instr: &Instruction) -> Result<()> {
        match instr {
            Instruction::Nullary { meta, op } => self.emit_nullary(meta, *op),
            Instruction::Unary { meta, op, a } => self.emit_unary(meta, *op, a),
            Instruction::Binary { meta, op, a, b } => self.emit_binary(meta, *op, a, b),
            Instruction::Ternary { meta, op, a, b, c } => self.emit_ternary(meta, *op, a, b, c),
            Instruction::IfElse { meta, then_body, else_body } => {
                self.emit_if_else(meta, then_body, else_body)
            }
            Instruction::Loop { meta, init, end, increment, body } => {
                self.emit_loop(meta, *init, *end, *increment, body)
            }
            Instruction::Rep { meta, count, body } => self.emit_rep(meta, *count, body),
            Instruction::Break { meta } => self.emit_break(meta),
            Instruction::Return { meta } => self.emit_return(meta),
            Instruction::Call { .. } => Ok(()),
        }
    }

    fn emit_nullary(&mut self, meta: &InstrMeta, op: Opcode) -> Result<()> {
        self.emit_guarded(meta, |e, _channel| match op {
            Opcode::Nop | Opcode::Fenct | Opcode::Fencb => Ok(None),
            other => {
                e.warn_unimplemented(other, meta.line);
                Ok(None)
            }
        })
    }

    fn emit_unary(&mut self, meta: &InstrMeta, op: Opcode, a: &Operand) -> Result<()> {
        self.emit_guarded(meta, |e, channel| e.unary_statement(meta, op, a, channel))
    }

    fn unary_statement(
        &mut self,
        meta: &InstrMeta,
        op: Opcode,
        a: &Operand,
        _channel: Option<usize>,
    ) -> Result<Option<String>> {
        match op {
            Opcode::Kil => Ok(Some("discard".to_string())),
            Opcode::Mov => {
                let expr = self.operand_text(a, &FULL, meta.line)?;
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::Positional)))
            }
            Opcode::Frc | Opcode::Flr | Opcode::Cos | Opcode::Sin | Opcode::Ex2 | Opcode::Lg2
            | Opcode::Ddx | Opcode::Ddy => {
                let operand = self.operand_text(a, &FULL, meta.line)?;
                let expr = format!("{}({operand})", unary_func_name(op));
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::Positional)))
            }
            Opcode::Rcp => {
                let operand = self.operand_text(a, &FULL, meta.line)?;
                let expr = format!("(1.0 / ({operand}))");
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::PopcountPrefix)))
            }
            Opcode::Rsq => {
                let operand = self.operand_text(a, &FULL, meta.line)?;
                let expr = format!("inversesqrt({operand})");
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::PopcountPrefix)))
            }
            Opcode::Nrm => {
                let operand = self.operand_text(a, &[0, 1, 2], meta.line)?;
                Ok(Some(self.wrap_assignment(meta, format!("normalize({operand})"), Truncate::Positional)))
            }
            Opcode::Tex => {
                let operand = self.operand_text(a, &[0, 1], meta.line)?;
                let expr = format!("texture(tex{}, {operand})", meta.sampler);
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::Positional)))
            }
            other => {
                self.warn_unimplemented(other, meta.line);
                Ok(None)
            }
        }
    }

    fn emit_binary(&mut self, meta: &InstrMeta, op: Opcode, a: &Operand, b: &Operand) -> Result<()> {
        self.emit_guarded(meta, |e, channel| e.binary_statement(meta, op, a, b, channel))
    }

    fn binary_statement(
        &mut self,
        meta: &InstrMeta,
        op: Opcode,
        a: &Operand,
        b: &Operand,
        _channel: Option<usize>,
    ) -> Result<Option<String>> {
        match op {
            Opcode::Mul | Opcode::Add | Opcode::Div => {
                let glyph = match op {
                    Opcode::Mul => "*",
                    Opcode::Add => "+",
                    Opcode::Div => "/",
                    _ => unreachable!(),
                };
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                Ok(Some(self.wrap_assignment(meta, format!("{a_txt} {glyph} {b_txt}"), Truncate::Positional)))
            }
            Opcode::Min | Opcode::Max => {
                let func = if op == Opcode::Min { "min" } else { "max" };
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                Ok(Some(self.wrap_assignment(meta, format!("{func}({a_txt}, {b_txt})"), Truncate::Positional)))
            }
            Opcode::Pow => {
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                Ok(Some(self.wrap_assignment(meta, format!("pow({a_txt}, {b_txt})"), Truncate::Positional)))
            }
            Opcode::Divsq => {
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                let expr = format!("({a_txt} / sqrt({b_txt}))");
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::PopcountPrefix)))
            }
            Opcode::Dst => {
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                let scalar = format!("distance({a_txt}, {b_txt})");
                let broadcast = self.broadcast_scalar(meta, scalar);
                Ok(Some(self.wrap_assignment(meta, broadcast, Truncate::Pretruncated)))
            }
            Opcode::Dp2 | Opcode::Dp3 | Opcode::Dp4 => {
                let channels: &[usize] = match op {
                    Opcode::Dp2 => &[0, 1],
                    Opcode::Dp3 => &[0, 1, 2],
                    _ => &FULL,
                };
                let a_txt = self.operand_text(a, channels, meta.line)?;
                let b_txt = self.operand_text(b, channels, meta.line)?;
                let scalar = format!("dot({a_txt}, {b_txt})");
                let broadcast = self.broadcast_scalar(meta, scalar);
                Ok(Some(self.wrap_assignment(meta, broadcast, Truncate::Pretruncated)))
            }
            Opcode::Slt | Opcode::Sge | Opcode::Sle | Opcode::Sgt | Opcode::Sne | Opcode::Seq => {
                self.compare_statement(meta, op, a, b).map(Some)
            }
            other => {
                self.warn_unimplemented(other, meta.line);
                Ok(None)
            }
        }
    }

    fn compare_statement(
        &mut self,
        meta: &InstrMeta,
        op: Opcode,
        a: &Operand,
        b: &Operand,
    ) -> Result<String> {
        let channels = self.active_channel_list(meta);
        let n = channels.len();
        let a_txt = self.operand_text(a, &channels, meta.line)?;
        let b_txt = self.operand_text(b, &channels, meta.line)?;
        let expr = if n <= 1 {
            format!("float({a_txt} {} {b_txt})", compare_glyph(op))
        } else {
            format!("vec{n}({}({a_txt}, {b_txt}))", compare_vector_builtin(op))
        };
        Ok(self.wrap_assignment(meta, expr, Truncate::Pretruncated))
    }

    fn emit_ternary(
        &mut self,
        meta: &InstrMeta,
        op: Opcode,
        a: &Operand,
        b: &Operand,
        c: &Operand,
    ) -> Result<()> {
        self.emit_guarded(meta, |e, channel| e.ternary_statement(meta, op, a, b, c, channel))
    }

    fn ternary_statement(
        &mut self,
        meta: &InstrMeta,
        op: Opcode,
        a: &Operand,
        b: &Operand,
        c: &Operand,
        _channel: Option<usize>,
    ) -> Result<Option<String>> {
        match op {
            Opcode::Mad => {
                let a_txt = self.operand_text(a, &FULL, meta.line)?;
                let b_txt = self.operand_text(b, &FULL, meta.line)?;
                let c_txt = self.operand_text(c, &FULL, meta.line)?;
                Ok(Some(self.wrap_assignment(meta, format!("{a_txt} * {b_txt} + {c_txt}"), Truncate::Positional)))
            }
            Opcode::Dp2a => {
                let a_txt = self.operand_text(a, &[0, 1], meta.line)?;
                let b_txt = self.operand_text(b, &[0, 1], meta.line)?;
                let c_txt = self.operand_text(c, &FULL, meta.line)?;
                let expr = format!("(dot({a_txt}, {b_txt}) + {c_txt})");
                Ok(Some(self.wrap_assignment(meta, expr, Truncate::Positional)))
            }
            other => {
                self.warn_unimplemented(other, meta.line);
                Ok(None)
            }
        }
    }

    fn emit_if_else(
        &mut self,
        meta: &InstrMeta,
        then_body: &[Instruction],
        else_body: &[Instruction],
    ) -> Result<()> {
        if matches!(meta.condition, Condition::False) {
            return Ok(());
        }
        let guard = predicate_guard(meta).unwrap_or_else(|| "if (true)".to_string());
        self.write_line(&format!("{guard} {{"));
        self.indent += 1;
        for instr in then_body {
            self.emit_instruction(instr)?;
        }
        self.indent -= 1;
        if else_body.is_empty() {
            self.write_line("}");
        } else {
            self.write_line("} else {");
            self.indent += 1;
            for instr in else_body {
                self.emit_instruction(instr)?;
            }
            self.indent -= 1;
            self.write_line("}");
        }
        Ok(())
    }

    fn emit_loop(
        &mut self,
        meta: &InstrMeta,
        init: u8,
        end: u8,
        increment: u8,
        body: &[Instruction],
    ) -> Result<()> {
        if matches!(meta.condition, Condition::False) {
            return Ok(());
        }
        self.write_line(&format!(
            "for (int loopCnt = {init}; loopCnt < {end}; loopCnt += {increment}) {{"
        ));
        self.indent += 1;
        for instr in body {
            self.emit_instruction(instr)?;
        }
        self.indent -= 1;
        self.write_line("}");
        Ok(())
    }

    fn emit_rep(&mut self, meta: &InstrMeta, count: u16, body: &[Instruction]) -> Result<()> {
        if matches!(meta.condition, Condition::False) {
            return Ok(());
        }
        self.write_line(&format!("for (int loopCnt = 0; loopCnt < {count}; loopCnt++) {{"));
        self.indent += 1;
        for instr in body {
            self.emit_instruction(instr)?;
        }
        self.indent -= 1;
        self.write_line("}");
        Ok(())
    }

    fn emit_break(&mut self, meta: &InstrMeta) -> Result<()> {
        self.emit_guarded(meta, |_e, _c| Ok(Some("break".to_string())))
    }

    fn emit_return(&mut self, meta: &InstrMeta) -> Result<()> {
        self.emit_guarded(meta, |_e, _c| Ok(Some("return".to_string())))
    }

    fn finish(mut self, control: ControlWord) -> String {
        self.record_register(0, !control.output_from_r0);
        if control.depth_replace {
            self.record_register(1, false);
        }

        let mut out = String::from("#version 330\n\n");

        for &semantic in &self.used_inputs {
            out.push_str(&format!("in vec4 {};\n", INPUT_NAMES[semantic as usize]));
        }
        if !self.used_inputs.is_empty() {
            out.push('\n');
        }

        for &(index, fp16) in &self.used_temps {
            let prefix = if fp16 { "h" } else { "r" };
            let precision = if fp16 { "mediump " } else { "" };
            out.push_str(&format!(
                "{precision}vec4 {prefix}{index} = vec4(0.0, 0.0, 0.0, 0.0);\n"
            ));
        }
        for &uses_second in &self.used_cond_regs {
            out.push_str(&format!(
                "vec4 {} = vec4(0.0, 0.0, 0.0, 0.0);\n",
                cond_register_name(uses_second)
            ));
        }
        if !self.used_temps.is_empty() || !self.used_cond_regs.is_empty() {
            out.push('\n');
        }

        for &(index, fp16) in &self.used_outputs {
            let prefix = if fp16 { "h" } else { "r" };
            if fp16 {
                out.push_str(&format!("out vec4 {prefix}{index};\n"));
            } else {
                out.push_str(&format!(
                    "layout(location = {}) out vec4 {prefix}{index};\n",
                    index - 1
                ));
            }
        }
        out.push_str("layout(location = 0) out vec4 ocol;\n\n");

        out.push_str("void main() {\n");
        out.push_str(&self.body);
        let color_source = if control.output_from_r0 { "r0" } else { "h0" };
        out.push_str(&format!("    ocol = {color_source};\n"));
        if control.depth_replace {
            out.push_str("    gl_FragDepth = r1.z;\n");
        }
        out.push_str("}\n");

        out
    }
}

/// Translate a parsed instruction tree into a complete GLSL 330 shader string.
pub fn emit(instructions: &[Instruction], control: ControlWord) -> Result<String> {
    let mut emitter = Emitter::new();
    for instr in instructions {
        emitter.emit_instruction(instr)?;
    }
    Ok(emitter.finish(control))
}
