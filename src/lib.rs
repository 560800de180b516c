use crate::{
    ir::text::{Module, TextBuilder},
    token::Spanned,
    util::{
        fmt::{Context, Show},
        intern::Interner,
    },
};

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into a typed AST. Scopes
/// and types are checked on the fly.
pub mod parser;

/// Lowering walks the typed AST, emitting blocks, branches and stack slots
/// through an [`ir::builder::IrBuilder`].
pub mod lower;

pub mod ast;
pub mod symbols;
pub mod token;
pub mod types;

pub mod ir {
    pub mod builder;
    pub mod text;
}

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("error [line {line}]: {message}")]
    Parse {
        line: u32,
        message: String,
        error: parser::Error,
    },
    #[error("error: {0}")]
    Lower(#[from] lower::Error),
}

impl CompileError {
    /// Renders a parse error while the interner that can resolve its names is
    /// still around.
    pub fn from_parse(idents: &Interner, error: &Spanned<parser::Error>) -> CompileError {
        let ctx = Context { idents };
        let message = error.display(&ctx).to_string();
        CompileError::Parse {
            line: error.span.line,
            message,
            error: error.inner.clone(),
        }
    }
}

/// Runs the whole pipeline over `src`, producing a textual IR module.
pub fn compile(src: &str, module_name: &str) -> Result<Module, CompileError> {
    let mut idents = Interner::with_capacity(128);
    let program = parser::parse_program(src, &mut idents)
        .map_err(|error| CompileError::from_parse(&idents, &error))?;

    let mut builder = TextBuilder::new(module_name);
    lower::lower_program(&mut builder, &idents, &program)?;
    Ok(builder.finish())
}
