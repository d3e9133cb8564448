//! Stage-error taxonomy for the driver (spec §6/§7, SPEC_FULL.md AMBIENT
//! Error handling): each pipeline stage's failure is wrapped here so `main`
//! can map it to an exit code (0 success, 1 I/O or lex error, 2 parse error,
//! 3 semantic error, 4 emit error) without re-inspecting the library
//! crates' own error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lex error")]
    Lex { rendered: String },

    #[error("parse error")]
    Parse {
        #[source]
        source: ceeify_par::ParseError,
        rendered: String,
    },

    #[error("semantic error")]
    Sem {
        #[source]
        source: ceeify_sem::SemError,
        rendered: String,
    },

    #[error("TAC build error")]
    Tac {
        #[source]
        source: ceeify_tac::TacError,
        rendered: String,
    },

    #[error("emit error")]
    Emit {
        #[source]
        source: ceeify_emit::EmitError,
        rendered: String,
    },
}

impl StageError {
    /// Exit code per spec §6/SPEC_FULL.md's AMBIENT Error handling section.
    pub fn exit_code(&self) -> i32 {
        match self {
            StageError::Io { .. } | StageError::Lex { .. } => 1,
            StageError::Parse { .. } => 2,
            StageError::Sem { .. } => 3,
            StageError::Tac { .. } | StageError::Emit { .. } => 4,
        }
    }

    /// The traceback-style text to show the user, where one was built from
    /// source + span (spec §7); falls back to the short `Display` message
    /// for stages with no source excerpt to point a caret at.
    pub fn render(&self) -> String {
        match self {
            StageError::Io { .. } => self.to_string(),
            StageError::Lex { rendered }
            | StageError::Parse { rendered, .. }
            | StageError::Sem { rendered, .. }
            | StageError::Tac { rendered, .. }
            | StageError::Emit { rendered, .. } => rendered.clone(),
        }
    }
}
