//! Emitter-local failure modes (spec §7's `UnsupportedFeature`/`Internal`,
//! the two kinds that can still surface after a tree has already passed
//! `ceeify-sem`).

use ceeify_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("'{op}' has no C lowering")]
    UnsupportedOperator { op: &'static str, span: Span },
    #[error("internal error: {detail}")]
    Internal { detail: String, span: Span },
}

pub type EmitResult<T> = Result<T, EmitError>;
