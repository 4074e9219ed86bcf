//! Translate a single `MOV r0, f[COL0]` fragment program and print the
//! resulting GLSL 330 source, along with its program hash.
//!
//! Run with `cargo run --example translate_stream`.

fn main() {
    tracing_subscriber_init();

    // One 16-byte instruction line: MOV r0, f[COL0], write-mask xyzw, end=1.
    let program: &[u8] = &[0, 1, 1, 62, 157, 28, 1, 200, 0, 0, 0, 0, 0, 0, 0, 0];
    let control_bits = 1 << 6; // output_from_r0

    match fp_glsl::translate(program, control_bits) {
        Ok(translation) => {
            println!("{}", translation.glsl);
            println!(
                "// hash = 0x{:08x}, bytes_read = {}",
                translation.hash, translation.bytes_read
            );
        }
        Err(failure) => eprintln!("translation failed: {failure}"),
    }
}

/// Best-effort subscriber setup; this demo has no dependency on
/// `tracing-subscriber`, so warnings simply go nowhere if one isn't
/// installed by the embedding application.
fn tracing_subscriber_init() {}
