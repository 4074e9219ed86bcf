//! Translate a `MAD_sat` instruction with a `x2` post-scale and print the
//! resulting clamp/scale nesting in the generated GLSL.
//!
//! Run with `cargo run --example saturate_scale`.

fn main() {
    // MAD_sat r1.xyz, r0, r0, c[{1, 0, 0, 0}], scale = x2, end = 1.
    let program: &[u8] = &[
        0, 132, 3, 14, 157, 28, 0, 200, 1, 16, 0, 200, 1, 0, 2, 200, 128, 63, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0,
    ];

    match fp_glsl::translate(program, 0) {
        Ok(translation) => println!("{}", translation.glsl),
        Err(failure) => eprintln!("translation failed: {failure}"),
    }
}
