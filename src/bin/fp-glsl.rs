//! Thin local-inspection harness: read a packed fragment program from disk,
//! translate it, and write the GLSL 330 source to another file.
//!
//! Not part of the library's caller-facing surface — a debugging tool for
//! humans, not something embedders link against.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fp-glsl", about = "Translate packed fragment-shader microcode to GLSL 330")]
struct Cli {
    /// Path to the packed binary fragment program.
    input: PathBuf,
    /// Path to write the generated GLSL source to.
    output: PathBuf,
    /// Control word accompanying the program, as a hex or decimal integer.
    #[arg(long, default_value = "0")]
    control_word: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let control_bits = match parse_control_word(&cli.control_word) {
        Ok(bits) => bits,
        Err(err) => {
            eprintln!("invalid --control-word: {err}");
            return ExitCode::FAILURE;
        }
    };

    let program_bytes = match fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let translation = match fp_glsl::translate(&program_bytes, control_bits) {
        Ok(translation) => translation,
        Err(failure) => {
            eprintln!("translation failed: {failure}");
            return ExitCode::FAILURE;
        }
    };

    if translation.unclosed_blocks {
        eprintln!("warning: program contained a control-flow block with no matching close");
    }

    if let Err(err) = fs::write(&cli.output, translation.glsl.as_bytes()) {
        eprintln!("failed to write {}: {err}", cli.output.display());
        return ExitCode::FAILURE;
    }

    eprintln!(
        "wrote {} ({} bytes read, hash = 0x{:08x})",
        cli.output.display(),
        translation.bytes_read,
        translation.hash
    );
    ExitCode::SUCCESS
}

fn parse_control_word(raw: &str) -> Result<u32, std::num::ParseIntError> {
    match raw.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    }
}
