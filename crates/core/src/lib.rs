//! SPF toolchain core library.
//!
//! Parses and expands SPF (RFC 7208) policy records without ever aborting on
//! malformed input: every entry point returns a best-effort value plus a
//! position-accurate diagnostic list, and the concatenated source text of a
//! parsed record reproduces the input byte-for-byte.
//!
//! The main entry points are [`parse_record`] for whole records,
//! [`parse_ip4_cidr`] / [`parse_ip6_cidr`] / [`parse_dual_cidr`] for
//! standalone cidr-length suffixes, and [`expand_macro_string`] for the
//! `%{...}` macro mini-language.
//!
//! Deliberately out of scope: DNS I/O and the match/pass/fail policy engine.
//! The caller retrieves records, resolves domains, and enforces recursion
//! limits around `include`/`redirect`.

#![warn(missing_docs)]

/// Request context consumed by the macro expander.
pub mod context;
/// SPF grammar: cursor-string, cidr-lengths, terms, macros, record parser.
pub mod grammar;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Record parser
pub use grammar::parser::{SPF_VERSION, parse_record};

// Term model
pub use grammar::term::{DirectiveArg, Qualifier, SpfRecord, Term, TermKind};

// cidr-length parser
pub use grammar::cidr::{CidrLengths, parse_dual_cidr, parse_ip4_cidr, parse_ip6_cidr};

// Macro-string expander
pub use grammar::macros::{MacroExpansion, expand_macro_string};

// Cursor-string substrate
pub use grammar::cursor::CursorStr;

// Request context
pub use context::{Domain, RequestContext, Sender};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
