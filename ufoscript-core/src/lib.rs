pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod fields;
pub mod kinds;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod subparser;

pub use ast::{BlockOutcome, BlockResult, FailedBlock, Field, ParseOutput, Value};
pub use context::ParserContext;
pub use diagnostics::{
    format_diagnostic, Diagnostic, DiagnosticKind, DiagnosticSeverity, Diagnostics,
    SourceLocation, Span,
};
pub use fields::{FieldSpec, FieldTable, ValueType};
pub use kinds::{standard_kinds, standard_registry};
pub use lexer::{tokenize, Lexer, Token, TokenKind, TokenSource};
pub use parser::{parse_script, parse_tokens, parse_with_context};
pub use registry::{BlockKind, DuplicatePolicy, Registry, RegistryBuilder, RegistryError};
pub use subparser::{BlockBody, BlockHeader, BodyError, SubParser, Unstructured};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
