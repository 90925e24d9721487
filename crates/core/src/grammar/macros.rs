//! Macro-string expander: SPF's `%{letter}` mini-language.
//!
//! Expansion never aborts. Every error substitutes deterministic best-effort
//! text (the escape's literal form, or the macro verbatim) so output length
//! stays predictable, and the [`MacroExpansion::error_is_fatal`] flag
//! separates cosmetic mistakes (stray literals, delimiter typos) from
//! structural ones that make the expansion semantically unusable.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::cursor::CursorStr;
use super::ctx;
use super::diag::{Diagnostic, Span, codes};
use crate::context::RequestContext;

/// Delimiters a macro expansion may split on.
const DELIMITER_SET: &str = ".-+,/_=";

/// Result of expanding a macro-string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroExpansion {
    /// The expanded string, best-effort on every error.
    pub expanded: String,
    /// Everything that went wrong, in input order.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether a structural error occurred: the expansion is still a string,
    /// but it is not semantically trustworthy.
    pub error_is_fatal: bool,
}

/// Expand a macro-string against a request context.
pub fn expand_macro_string(ctx: &RequestContext, input: &str) -> MacroExpansion {
    Expander {
        ctx,
        input,
        view: CursorStr::new(input),
        out: String::with_capacity(input.len()),
        diagnostics: Vec::new(),
        fatal: false,
    }
    .run()
}

struct Expander<'a> {
    ctx: &'a RequestContext,
    input: &'a str,
    view: CursorStr<'a>,
    out: String,
    diagnostics: Vec<Diagnostic>,
    fatal: bool,
}

/// Outcome of pre-parsing the transformer slot.
enum Transform {
    /// Empty slot: no transform applies.
    None,
    /// A located number and/or command, to be applied.
    Parts { num: Option<u32>, cmd: String },
    /// Unintelligible pattern: substitute the macro verbatim.
    Aborted,
}

impl Expander<'_> {
    fn run(mut self) -> MacroExpansion {
        while !self.view.is_empty() {
            let rest = self.view.rest();
            let lit_len = rest.find('%').unwrap_or(rest.len());
            if lit_len > 0 {
                self.literal_run(lit_len);
            }
            if !self.view.is_empty() {
                self.expand_percent();
            }
        }
        MacroExpansion {
            expanded: self.out,
            diagnostics: self.diagnostics,
            error_is_fatal: self.fatal,
        }
    }

    /// Copy a run of non-`%` characters, flagging anything outside printable
    /// ASCII. The run is kept as-is either way so the output round-trips.
    fn literal_run(&mut self, len: usize) {
        let run = self.view.slice(0, len);
        let start = self.view.offset();
        if !run.bytes().all(|b| (0x21..=0x7E).contains(&b)) {
            self.diagnostics.push(Diagnostic::warn(
                codes::MACRO_INVALID_LITERAL,
                "macro-string literal outside printable ASCII",
                Some(Span::new(start, start + len)),
            ));
        }
        self.out.push_str(run);
        self.view.advance(len as isize);
    }

    /// Expand one escape, starting at a `%`.
    fn expand_percent(&mut self) {
        let pct = self.view.offset();
        self.view.advance(1);

        let Some(next) = self.view.first() else {
            self.diagnostics.push(Diagnostic::error(
                codes::MACRO_TRAILING_PERCENT,
                "macro-string ends with a bare '%'",
                Some(Span::new(pct, pct + 1)),
            ));
            self.out.push('%');
            return;
        };

        if next == b'{' && self.expand_braced(pct) {
            return;
        }

        // A special escape, or an unterminated '{'.
        let special = self.view.rest().chars().next().unwrap_or(' ');
        self.view.advance(special.len_utf8() as isize);
        match special {
            '%' => self.out.push('%'),
            '_' => self.out.push(' '),
            '-' => self.out.push_str("%20"),
            other => {
                self.diagnostics.push(
                    Diagnostic::error(
                        codes::MACRO_UNKNOWN_SPECIAL,
                        format!("'%{other}' is not a valid macro escape"),
                        Some(Span::new(pct, self.view.offset())),
                    )
                    .with_context(ctx!("found" => other.to_string())),
                );
                self.fatal = true;
                self.out.push('%');
                self.out.push(other);
            }
        }
    }

    /// Expand a `%{letter transformer? delimiters?}` form. Returns false when
    /// no closing brace exists; the caller then treats the `{` as an unknown
    /// special escape.
    fn expand_braced(&mut self, pct: usize) -> bool {
        let rest = self.view.rest();
        let Some(close) = rest.find('}') else {
            return false;
        };
        let inner = &rest[1..close];
        self.view.advance((close + 1) as isize);
        let end = self.view.offset();
        let macro_span = Span::new(pct, end);
        // The whole `%{...}` as written, for verbatim substitution.
        let verbatim = &self.input[pct..end];

        let Some(letter) = inner.chars().next() else {
            self.diagnostics.push(Diagnostic::error(
                codes::MACRO_EMPTY_EXPAND,
                "empty macro letter slot",
                Some(macro_span),
            ));
            self.fatal = true;
            self.out.push_str(verbatim);
            return true;
        };

        // Split the tail into transformer (leading ASCII alnum run) and
        // delimiters (everything after it).
        let tail = &inner[letter.len_utf8()..];
        let trans_len = tail
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        let transformer = &tail[..trans_len];
        let raw_delims = &tail[trans_len..];

        let transform = self.prepare_transform(transformer, macro_span);

        let mut delims = String::new();
        for c in raw_delims.chars() {
            if DELIMITER_SET.contains(c) {
                delims.push(c);
            }
        }
        if delims.len() != raw_delims.len() {
            self.diagnostics.push(
                Diagnostic::warn(
                    codes::MACRO_INVALID_DELIMITER,
                    format!("invalid delimiter character(s) in '{raw_delims}'"),
                    Some(macro_span),
                )
                .with_context(ctx!("delimiters" => raw_delims)),
            );
        }

        let Some(mut value) = self.letter_value(letter) else {
            self.diagnostics.push(
                Diagnostic::error(
                    codes::MACRO_UNKNOWN_LETTER,
                    format!("unknown macro letter '{letter}'"),
                    Some(macro_span),
                )
                .with_context(ctx!("letter" => letter.to_string())),
            );
            self.fatal = true;
            self.out.push_str(verbatim);
            return true;
        };

        // Fold every supplied delimiter into the first one so the transform
        // splits on a single separator.
        let mut delim_chars = delims.chars();
        let primary = delim_chars.next();
        if let Some(primary) = primary {
            for other in delim_chars {
                value = value.replace(other, &primary.to_string());
            }
        }

        match transform {
            Transform::None => {
                // Custom delimiters without a transform: normalize to '.'
                // without reordering or truncating.
                if let Some(primary) = primary {
                    value = value.replace(primary, ".");
                }
                self.out.push_str(&value);
            }
            Transform::Parts { num, cmd } => {
                match self.transform(&value, num, &cmd, primary, macro_span) {
                    Some(transformed) => self.out.push_str(&transformed),
                    None => self.out.push_str(verbatim),
                }
            }
            Transform::Aborted => self.out.push_str(verbatim),
        }
        true
    }

    /// Pre-parse the transformer slot into a number and command.
    fn prepare_transform(&mut self, transformer: &str, span: Span) -> Transform {
        if transformer.is_empty() {
            return Transform::None;
        }

        let invalid = |this: &mut Self| {
            this.diagnostics.push(
                Diagnostic::error(
                    codes::MACRO_INVALID_TRANSFORMER,
                    format!("cannot make sense of transformer '{transformer}'"),
                    Some(span),
                )
                .with_context(ctx!("transformer" => transformer)),
            );
            this.fatal = true;
            Transform::Aborted
        };

        let Some(first_digit) = transformer.find(|c: char| c.is_ascii_digit()) else {
            // Just a command, no digits; validated during the transform.
            return Transform::Parts {
                num: None,
                cmd: transformer.to_string(),
            };
        };

        let digits_len = transformer[first_digit..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let after = &transformer[first_digit + digits_len..];
        let Ok(num) = transformer[first_digit..first_digit + digits_len].parse::<u32>() else {
            return invalid(self);
        };

        if after.bytes().any(|b| b.is_ascii_digit()) {
            // "{num}{cmd}{num}..." — don't even try.
            return invalid(self);
        }

        if first_digit == 0 {
            return Transform::Parts {
                num: Some(num),
                cmd: after.to_string(),
            };
        }

        if !after.is_empty() {
            // "{cmd}{num}{more}" — unintelligible.
            return invalid(self);
        }

        // Command before the digits: recover with the located parts, but the
        // expansion is no longer trustworthy.
        self.diagnostics.push(
            Diagnostic::error(
                codes::MACRO_SWAPPED_TRANSFORMER,
                format!("transformer '{transformer}' has the command before the digits"),
                Some(span),
            )
            .with_context(ctx!("transformer" => transformer)),
        );
        self.fatal = true;
        Transform::Parts {
            num: Some(num),
            cmd: transformer[..first_digit].to_string(),
        }
    }

    /// Apply a prepared transform: split, optionally reverse, keep the last
    /// `num` labels, re-join with `.`. Returns `None` when the command is
    /// invalid (the caller substitutes the macro verbatim).
    fn transform(
        &mut self,
        value: &str,
        num: Option<u32>,
        cmd: &str,
        delimiter: Option<char>,
        span: Span,
    ) -> Option<String> {
        let delimiter = delimiter.unwrap_or('.');
        let mut labels: Vec<&str> = value.split(delimiter).collect();

        match cmd {
            "" => {}
            "r" => labels.reverse(),
            other => {
                self.diagnostics.push(
                    Diagnostic::error(
                        codes::MACRO_INVALID_TRANSFORMER_COMMAND,
                        format!("'{other}' is not a transformer command (only 'r' is)"),
                        Some(span),
                    )
                    .with_context(ctx!("command" => other)),
                );
                self.fatal = true;
                return None;
            }
        }

        if let Some(num) = num {
            let num = num as usize;
            if num == 0 {
                return Some(String::new());
            }
            if num < labels.len() {
                labels.drain(..labels.len() - num);
            }
        }

        Some(labels.join("."))
    }

    /// Look up a macro letter against the request context. Case-sensitive.
    fn letter_value(&self, letter: char) -> Option<String> {
        Some(match letter {
            's' => self.ctx.sender.to_string(),
            'l' => self.ctx.sender.local.clone(),
            'o' => self.ctx.sender.domain.name(),
            'd' => self.ctx.current_domain().name(),
            'i' => self.ctx.sender.domain.ip.to_string(),
            // Placeholder: a real 'p' is a PTR lookup, which is DNS and
            // therefore outside this crate. Integration hook for callers.
            'p' => self.ctx.sender.domain.name(),
            'v' => {
                if self.ctx.sender.domain.ip.is_ipv4() {
                    "in-addr".to_string()
                } else {
                    "ip6".to_string()
                }
            }
            // Placeholder: HELO/EHLO identity is session state the caller
            // owns; not modeled in the request context yet.
            'h' => "unknown".to_string(),
            'c' => self.ctx.requester.ip.to_string(),
            'r' => self.ctx.requester.name(),
            't' => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs().to_string())
                .unwrap_or_else(|_| "0".to_string()),
            _ => return None,
        })
    }
}
