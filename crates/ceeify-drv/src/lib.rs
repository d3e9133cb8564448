//! The driver (spec §6): reads a source file, runs it through
//! `ceeify-lex` → `ceeify-par` → `ceeify-sem` → `ceeify-tac`/`ceeify-emit`,
//! and writes the result — mirroring the teacher's `faxc-drv` orchestration
//! shape (`Config`/`Session`), generalized from its 9-phase MIR/LIR/asm
//! pipeline down to this language's 4-stage one.

pub mod config;
pub mod dump;
pub mod error;
pub mod profiler;
pub mod session;

pub use config::{level_filter, Cli, Config, EmitOnly};
pub use error::StageError;
pub use profiler::{JsonProfiler, NoopProfiler, Profiler};
pub use session::{read_source, Session};
