//! End-to-end scenarios exercising [`fp_glsl::translate`] against hand-built
//! instruction streams, one per documented behavior.

/// Collapse runs of whitespace so assertions don't care about the emitter's
/// exact indentation.
fn normalize(glsl: &str) -> String {
    glsl.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `MOV r0, f[COL0]`, `end = 1`, write-mask `xyzw`, unconditional.
const SCENARIO_A: &[u8] = &[0, 1, 1, 62, 157, 28, 1, 200, 0, 0, 0, 0, 0, 0, 0, 0];

/// `MUL r0, f[COL0], {0.5, 0.5, 0.5, 1.0}`, `end = 1`.
const SCENARIO_B: &[u8] = &[
    0, 2, 1, 62, 157, 28, 1, 200, 1, 0, 2, 200, 0, 0, 0, 0, 0, 63, 0, 0, 0, 63, 0, 0, 0, 63, 0, 0,
    128, 63, 0, 0,
];

/// `MAD_sat r1.xyz, r0, r0, c[{1, 0, 0, 0}]`, `scale = x2`, `end = 1`.
const SCENARIO_C: &[u8] = &[
    0, 132, 3, 14, 157, 28, 0, 200, 1, 16, 0, 200, 1, 0, 2, 200, 128, 63, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0,
];

/// `IFE` (else at line 3, endif at line 4) `{ MOV r0; MOV r1 } else { MOV r2 }`,
/// followed by `MOV r3` with `end = 1`.
const SCENARIO_D: &[u8] = &[
    0, 2, 0, 0, 156, 28, 0, 0, 0, 128, 12, 0, 0, 0, 16, 0, 0, 1, 0, 62, 157, 28, 1, 200, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 1, 2, 62, 157, 28, 1, 200, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 4, 62, 157, 28, 1,
    200, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 7, 62, 157, 28, 1, 200, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// `ADD r2.xyz, r0, r1` predicated `LessThan` with condition swizzle `xxxy`,
/// followed by `MOV r3` with `end = 1`.
const SCENARIO_E: &[u8] = &[
    0, 3, 4, 14, 5, 8, 0, 200, 1, 0, 4, 200, 0, 0, 0, 0, 0, 1, 7, 62, 157, 28, 1, 200, 0, 0, 0, 0,
    0, 0, 0, 0,
];

#[test]
fn scenario_a_identity_passthrough() {
    let translation = fp_glsl::translate(SCENARIO_A, 1 << 6).unwrap();
    let glsl = normalize(&translation.glsl);
    assert!(glsl.contains("in vec4 col0;"));
    assert!(glsl.contains("vec4 r0 = vec4(0.0, 0.0, 0.0, 0.0);"));
    assert!(glsl.contains("r0.xyzw = col0;") || glsl.contains("r0 = col0;"));
    assert!(glsl.contains("ocol = r0;"));
    assert_eq!(translation.bytes_read, 16);
}

#[test]
fn scenario_b_embedded_constant() {
    let translation = fp_glsl::translate(SCENARIO_B, 1 << 6).unwrap();
    let glsl = normalize(&translation.glsl);
    assert!(glsl.contains("r0 = col0 * vec4(0.5, 0.5, 0.5, 1);") || glsl.contains("vec4(0.5, 0.5, 0.5, 1)"));
    assert_eq!(translation.bytes_read, 32);
}

#[test]
fn scenario_c_saturate_and_scale_nest_outermost_to_innermost() {
    let translation = fp_glsl::translate(SCENARIO_C, 1 << 6).unwrap();
    let glsl = normalize(&translation.glsl);
    // clamp(...) wraps the whole expression; the scale factor sits just
    // inside it, right after the write-mask truncation.
    assert!(glsl.contains("r1.xyz = clamp("));
    assert!(glsl.contains("* 2.0"));
    assert!(glsl.contains(", 0.0, 1.0);"));
}

#[test]
fn scenario_d_nested_if_else_does_not_double_emit_or_misassociate() {
    let translation = fp_glsl::translate(SCENARIO_D, 1 << 6).unwrap();
    let glsl = normalize(&translation.glsl);
    assert_eq!(glsl.matches("if (true) {").count(), 1);
    assert_eq!(glsl.matches("} else {").count(), 1);
    assert!(glsl.contains("r0 = col0;"));
    assert!(glsl.contains("r1 = col0;"));
    assert!(glsl.contains("r2 = col0;"));
}

#[test]
fn scenario_e_nonuniform_predicate_splits_into_three_scalar_guards() {
    let translation = fp_glsl::translate(SCENARIO_E, 1 << 6).unwrap();
    let glsl = normalize(&translation.glsl);
    assert_eq!(glsl.matches("if (rc.").count(), 3);
    assert!(glsl.contains("< 0.0"));
}

#[test]
fn scenario_f_hash_matches_standard_test_vectors() {
    assert_eq!(fp_glsl::hash_program(&[0x00]), 0x514E_28B7);
    assert_eq!(fp_glsl::hash_program(&[]), 0x0000_0000);
}

#[test]
fn translating_the_same_bytes_twice_is_byte_identical() {
    let first = fp_glsl::translate(SCENARIO_A, 1 << 6).unwrap();
    let second = fp_glsl::translate(SCENARIO_A, 1 << 6).unwrap();
    assert_eq!(first.glsl, second.glsl);
    assert_eq!(first.hash, second.hash);
}

#[test]
fn trailing_garbage_after_end_does_not_change_output() {
    let mut with_garbage = SCENARIO_A.to_vec();
    with_garbage.extend_from_slice(&[0xFFu8; 16]);
    let clean = fp_glsl::translate(SCENARIO_A, 1 << 6).unwrap();
    let padded = fp_glsl::translate(&with_garbage, 1 << 6).unwrap();
    assert_eq!(clean.glsl, padded.glsl);
    assert_eq!(clean.hash, padded.hash);
    assert_eq!(clean.bytes_read, padded.bytes_read);
}

#[test]
fn bytes_read_is_always_a_multiple_of_sixteen() {
    for program in [SCENARIO_A, SCENARIO_B, SCENARIO_C, SCENARIO_D, SCENARIO_E] {
        let translation = fp_glsl::translate(program, 1 << 6).unwrap();
        assert_eq!(translation.bytes_read % 16, 0);
    }
}
