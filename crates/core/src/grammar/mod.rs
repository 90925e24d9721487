/// cidr-length sub-grammar (`/24`, `/64`, `/24/64`).
pub mod cidr;
/// Cursor-string substrate every sub-parser advances over.
pub mod cursor;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for parse results.
pub mod dump;
/// Macro-string expander (`%{...}` mini-language).
pub mod macros;
/// SPF record parser — tokenizes a record into terms.
pub mod parser;
/// Term model: the tagged-variant hierarchy of SPF grammar elements.
pub mod term;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(crate) use ctx;
