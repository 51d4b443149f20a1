pub mod cli;
pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod handlers;
pub mod literal;
pub mod normalize;
pub mod reporter;
pub mod scanner;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use cli::{Cli, Command, OutputFormat};
pub use convert::{ConversionError, document_from_json, document_to_json, json_to_php};
pub use emit::{ArrayStyle, EmitOptions, emit_document, emit_registration_call};
pub use error::{AcfError, Result};
pub use literal::{ParseError, parse_str};
pub use normalize::{Field, FieldGroupDocument, NormalizationError, Normalizer};
pub use reporter::{Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use scanner::{
    CancellationToken, FieldGroupScanner, ScanCache, ScanError, ScanRequest, ScanResult,
    ScanWarning, WarningKind,
};
pub use value::{Key, Value};
