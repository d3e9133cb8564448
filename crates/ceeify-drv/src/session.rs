//! Pipeline orchestration (spec §5): one `Session` per invocation, owning
//! one source buffer, one diagnostic handler, and one arena — lex, parse,
//! analyze, then whichever of `ceeify-tac`/`ceeify-emit` the configuration
//! asks for, each stage short-circuiting the rest on its first error (spec
//! §7's propagation rule).

use std::path::Path;

use ceeify_util::{Arena, Diagnostic, Handler};

use crate::config::{Config, EmitOnly};
use crate::dump;
use crate::error::StageError;
use crate::profiler::Profiler;

pub struct Session {
    pub config: Config,
    handler: Handler,
    arena: Arena,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let arena = Arena::with_debug_stats("ceeify-drv::session");
        log::debug!("session arena '{}' ready", arena.name());
        Self { config, handler: Handler::new(), arena }
    }

    pub fn run(&mut self, profiler: &dyn Profiler) -> anyhow::Result<()> {
        let filename = self.config.input.display().to_string();

        let source = {
            let _scope = profiler.begin_scope("read_source");
            read_source(&self.config.input)
                .map_err(|source| StageError::Io { path: self.config.input.clone(), source })?
        };
        // The arena's own allocations don't back any pipeline data yet (every
        // stage still uses plain Rust ownership, see DESIGN.md); the source
        // buffer is copied in here so debug stats reflect real usage.
        self.arena.alloc_str(&source);

        let tokens = {
            let _scope = profiler.begin_scope("lex");
            ceeify_lex::tokenize(&source, &mut self.handler)
        };
        if self.handler.has_errors() {
            log::error!("lexing failed for {filename}");
            return Err(StageError::Lex { rendered: self.handler.render_all(&filename, &source) }.into());
        }
        if self.config.dump_tokens {
            write_sibling_json(&self.config.output, "tokens", dump::tokens_to_json(&tokens))?;
        }

        let mut module = {
            let _scope = profiler.begin_scope("parse");
            ceeify_par::parse_module(tokens)
        }
        .map_err(|err| {
            let rendered = Diagnostic::error("ParseError", err.to_string(), err.span()).render(&filename, &source);
            StageError::Parse { source: err, rendered }
        })?;
        if self.config.dump_ast {
            write_sibling_json(&self.config.output, "ast", dump::ast_to_json(&module))?;
        }

        let analysis = {
            let _scope = profiler.begin_scope("sem");
            ceeify_sem::analyze(&mut module)
        }
        .map_err(|err| {
            let rendered = err.to_diagnostic().render(&filename, &source);
            StageError::Sem { source: err, rendered }
        })?;

        let need_tac = self.config.dump_tac || self.config.emit_only == EmitOnly::Tac;
        if need_tac {
            let program = {
                let _scope = profiler.begin_scope("tac");
                ceeify_tac::build(&module, &analysis)
            }
            .map_err(|err| {
                let span = match &err {
                    ceeify_tac::TacError::UnresolvedSymbol { span } => *span,
                };
                let rendered = Diagnostic::error("Internal", err.to_string(), span).render(&filename, &source);
                StageError::Tac { source: err, rendered }
            })?;
            if self.config.dump_tac {
                write_sibling_json(&self.config.output, "tac", dump::tac_to_json(&program))?;
            }
        }

        if self.config.emit_only == EmitOnly::Tac {
            return Ok(());
        }

        let c_source = {
            let _scope = profiler.begin_scope("emit");
            ceeify_emit::emit(&module, &analysis)
        }
        .map_err(|err| {
            let (kind, span) = match &err {
                ceeify_emit::EmitError::UnsupportedOperator { span, .. } => ("UnsupportedFeature", *span),
                ceeify_emit::EmitError::Internal { span, .. } => ("Internal", *span),
            };
            let rendered = Diagnostic::error(kind, err.to_string(), span).render(&filename, &source);
            StageError::Emit { source: err, rendered }
        })?;

        std::fs::write(&self.config.output, c_source)
            .map_err(|source| StageError::Io { path: self.config.output.clone(), source })?;
        log::info!("wrote {}", self.config.output.display());
        Ok(())
    }
}

pub fn read_source(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

fn write_sibling_json(output: &Path, suffix: &str, value: serde_json::Value) -> anyhow::Result<()> {
    let path = output.with_extension(format!("{suffix}.json"));
    std::fs::write(&path, serde_json::to_string_pretty(&value)?)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
