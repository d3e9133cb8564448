//! CLI surface (spec §6, SPEC_FULL.md AMBIENT Configuration section):
//!
//! ```text
//! ceeify <input.src> [-o <output>] [--dump-tokens] [--dump-ast] [--dump-tac]
//!                     [--emit-only tac|c] [-v]... [-q] [--profile <out.json>]
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ceeify", about = "Compiles the ceeify language subset to C source")]
pub struct Cli {
    /// Source file to compile.
    pub input: PathBuf,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub dump_tokens: bool,

    #[arg(long)]
    pub dump_ast: bool,

    #[arg(long)]
    pub dump_tac: bool,

    #[arg(long, value_enum)]
    pub emit_only: Option<EmitOnly>,

    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitOnly {
    Tac,
    C,
}

/// Resolved, ready-to-run settings derived from [`Cli`] — the "beside the
/// input with a `.c` extension" default output path (spec §6) is computed
/// once here rather than re-derived at each call site.
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_tac: bool,
    pub emit_only: EmitOnly,
    pub profile: Option<PathBuf>,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        let output = cli.output.clone().unwrap_or_else(|| cli.input.with_extension("c"));
        Config {
            input: cli.input.clone(),
            output,
            dump_tokens: cli.dump_tokens,
            dump_ast: cli.dump_ast,
            dump_tac: cli.dump_tac,
            emit_only: cli.emit_only.unwrap_or(EmitOnly::C),
            profile: cli.profile.clone(),
        }
    }
}

/// Verbosity (spec §6's logging façade levels, SPEC_FULL.md AMBIENT Logging:
/// "`-v`/`-q`... translated to `log::LevelFilter`").
pub fn level_filter(cli: &Cli) -> log::LevelFilter {
    if cli.quiet {
        return log::LevelFilter::Error;
    }
    match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
