//! The term model: every whitespace-delimited unit of an SPF record becomes
//! exactly one [`Term`], malformed ones included, so that concatenating the
//! terms' source text reproduces the record byte-for-byte.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::cidr::CidrLengths;
use super::diag::{Diagnostic, Span};

/// A parsed SPF record: an ordered, round-trip-preserving term sequence.
///
/// There are no separate directive/modifier buckets — consumers filter by
/// [`TermKind`] (or use [`SpfRecord::directives`] / [`SpfRecord::modifiers`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpfRecord {
    /// Ordered list of terms found in the input, spacing runs included.
    pub terms: Vec<Term>,
}

impl SpfRecord {
    /// Reconstruct the original input exactly, including whitespace and
    /// malformed fragments.
    pub fn source(&self) -> String {
        self.terms.iter().map(|t| t.text.as_str()).collect()
    }

    /// All diagnostics, flattened across terms in term order.
    ///
    /// Argument sub-parse diagnostics were merged into their owning term
    /// during construction, already in record coordinates.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.terms.iter().flat_map(|t| t.diagnostics.iter())
    }

    /// The directive terms, in record order.
    pub fn directives(&self) -> impl Iterator<Item = &Term> {
        self.terms
            .iter()
            .filter(|t| matches!(t.kind, TermKind::Directive { .. }))
    }

    /// The modifier terms, in record order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Term> {
        self.terms
            .iter()
            .filter(|t| matches!(t.kind, TermKind::Modifier { .. }))
    }
}

/// One term of an SPF record.
///
/// `text` is the verbatim substring this term was parsed from; `diagnostics`
/// are appended only during the term's construction window and never after
/// the term is returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Verbatim source substring (reconstructable).
    pub text: String,
    /// Byte span of `text` in the record.
    pub span: Span,
    /// What kind of term this is, with kind-specific payload.
    #[serde(flatten)]
    pub kind: TermKind,
    /// Everything that went wrong inside this term, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Term {
    pub(crate) fn new(text: impl Into<String>, span: Span, kind: TermKind) -> Self {
        Self {
            text: text.into(),
            span,
            kind,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// The closed set of term variants.
///
/// Strictly speaking the version marker is not a term in RFC parlance, but
/// treating it as one keeps the record a single homogeneous sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[non_exhaustive]
pub enum TermKind {
    /// The `v=spf1` version marker (possibly malformed, see diagnostics).
    Version,
    /// A mechanism directive, e.g. `-all`, `include:example.com`, `ip4:...`.
    Directive {
        /// Qualifier character preceding the name, if any.
        qualifier: Option<Qualifier>,
        /// Mechanism name as written (`all`, `include`, ... or unknown).
        name: String,
        /// Parsed argument, when one was present and usable.
        arg: Option<DirectiveArg>,
    },
    /// A `name=value` modifier, e.g. `redirect=_spf.example.com`.
    Modifier {
        /// Modifier name as written.
        name: String,
        /// Raw argument text after the `=`.
        arg: String,
    },
    /// A run of spaces, preserved for exact round-trips.
    Spacing,
    /// A token matching neither grammar shape, preserved verbatim.
    Unknown,
}

/// Directive qualifier: the result a matching mechanism asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// `+` (also the default when no qualifier is written).
    Pass,
    /// `-`
    Fail,
    /// `~`
    SoftFail,
    /// `?`
    Neutral,
}

impl Qualifier {
    /// The qualifier for a leading byte, if it is one.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'+' => Some(Self::Pass),
            b'-' => Some(Self::Fail),
            b'~' => Some(Self::SoftFail),
            b'?' => Some(Self::Neutral),
            _ => None,
        }
    }

    /// The character this qualifier is written as.
    pub fn as_char(self) -> char {
        match self {
            Self::Pass => '+',
            Self::Fail => '-',
            Self::SoftFail => '~',
            Self::Neutral => '?',
        }
    }
}

/// A directive's parsed argument.
///
/// Which variant applies is decided by the mechanism name's entry in the
/// argument table (see the parser); unknown directives keep their raw text
/// as a `DomainSpec` so nothing is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "arg_kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DirectiveArg {
    /// A domain-spec (macro-string, expanded on demand): `include`, `exists`,
    /// `ptr`, and the raw argument of unknown directives.
    DomainSpec {
        /// The raw domain-spec text.
        domain: String,
    },
    /// `a` / `mx`: optional domain-spec plus optional dual cidr-length.
    DomainCidr {
        /// Domain-spec before the cidr suffix, when present.
        domain: Option<String>,
        /// Dual cidr-length suffix, when present.
        cidr: Option<CidrLengths>,
    },
    /// `ip4` / `ip6`: address literal plus optional cidr-length.
    IpCidr {
        /// The parsed address, when the literal was valid.
        addr: Option<IpAddr>,
        /// The cidr-length suffix, when present.
        cidr: Option<CidrLengths>,
    },
}
