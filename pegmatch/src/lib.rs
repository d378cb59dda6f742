//! Compile textual parsing-expression grammars and match strings against
//! them.
//!
//! A grammar is a sequence of rule definitions. Rule bodies are built from
//! ordered choice (`|`, optionally labeled `--name`), juxtaposed sequences,
//! negative lookahead (`~`), repetition (`?`, `*`, `+`), double-quoted
//! literals, character ranges (`"a".."z"`), the wildcard `any`, references to
//! other rules, and built-in classes such as `letter` and `digit`.
//!
//! Matching is whole-string and ordered-choice: the first alternative that
//! matches wins, repetition is greedy and never backtracks, and an input is
//! accepted only if the start rule consumes all of it.
//!
//! # Example
//!
//! ```
//! let grammar = pegmatch::compile(r#"
//!     greeting = "hi" | "hey" --casual
//! "#)?;
//!
//! assert!(grammar.matches("hi"));
//! assert!(!grammar.matches("hi there"));
//! # Ok::<(), pegmatch::Error>(())
//! ```

pub mod ast;
mod builtin;
pub mod compiler;
mod matcher;
mod parser;

use std::path::Path;

pub use self::compiler::Grammar;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("grammar has no rules")]
    Empty,

    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),

    #[error("rule '{0}' is undefined")]
    UndefinedRule(String),

    #[error("parse error:\n{0}")]
    Parse(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Parses grammar source into its syntax tree without compiling it.
pub fn parse<'source>(input: &'source str) -> Result<ast::Grammar<'source>, Error> {
    match parser::parse_grammar_complete(input) {
        Ok((_, ast)) => Ok(ast),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(Error::Parse(nom::error::convert_error(input, e)))
        }
        _ => unreachable!(),
    }
}

/// Compiles grammar source into an immutable [`Grammar`], reusable across any
/// number of matches.
pub fn compile(source: &str) -> Result<Grammar, Error> {
    let ast = parse(source)?;
    compiler::compile(&ast)
}

/// Reads and compiles a grammar file.
pub fn compile_file(path: impl AsRef<Path>) -> Result<Grammar, Error> {
    let source = std::fs::read_to_string(path)?;
    compile(&source)
}
