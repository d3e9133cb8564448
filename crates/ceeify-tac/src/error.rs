//! `ceeify-tac` only ever runs on a tree that already passed `ceeify-sem`,
//! so the one failure mode left is an internal bug: an expression whose
//! span wasn't recorded in the `Analysis` side table it was given.

use ceeify_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TacError {
    #[error("internal error: no resolved symbol for expression at {span:?}")]
    UnresolvedSymbol { span: Span },
}

pub type TacResult<T> = Result<T, TacError>;
