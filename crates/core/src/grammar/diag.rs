//! Re-exports from [`spf_toolchain_diagnostics`] so grammar modules (and
//! downstream users) can reach the diagnostic types through one path.

pub use spf_toolchain_diagnostics::{Diagnostic, LineIndex, Severity, Span, codes};
