//! Diagnostic rendering for the `spf` binary.
//!
//! Pretty mode draws ariadne caret reports on stderr; since SPF records are
//! single-line, each report reads as an annotated copy of the record. JSON
//! mode emits the diagnostics verbatim on stdout for tooling.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use spf_toolchain_diagnostics::{Diagnostic, Severity};

/// Output format, resolved once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, caret-annotated terminal output.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Honor an explicit `--output` choice; otherwise pick pretty for a TTY
    /// and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ if io::stdout().is_terminal() => Format::Pretty,
            _ => Format::Json,
        }
    }
}

/// Renders batches of diagnostics against one source string.
pub(crate) struct Reporter<'a> {
    source: &'a str,
    name: &'a str,
    format: Format,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(source: &'a str, name: &'a str, format: Format) -> Self {
        Self {
            source,
            name,
            format,
        }
    }

    /// Render every diagnostic, then (in pretty mode) a severity tally.
    pub(crate) fn emit(&self, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        match self.format {
            Format::Json => {
                let json = serde_json::to_string_pretty(diagnostics)
                    .expect("Diagnostic serialization cannot fail");
                println!("{json}");
            }
            Format::Pretty => {
                let mut cache = (self.name, Source::from(self.source));
                for diag in diagnostics {
                    match diag.span {
                        Some(span) => {
                            // Clamp so a span past the end never panics.
                            let start = span.start.min(self.source.len());
                            let end = span.end.min(self.source.len()).max(start);
                            self.caret_report(diag, start..end)
                                .eprint(&mut cache)
                                .ok();
                        }
                        None => plain_report(diag),
                    }
                }
                eprintln!("{}", tally(diagnostics));
            }
        }
    }

    /// One ariadne report for a spanned diagnostic: context becomes the
    /// label (falling back to the message) and a note, `explain()` the help.
    fn caret_report(
        &self,
        diag: &Diagnostic,
        span: std::ops::Range<usize>,
    ) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
        let label_text = context_line(diag).unwrap_or_else(|| diag.message.clone());

        let mut builder = Report::build(kind_of(&diag.severity), (self.name, span.clone()))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(Config::default().with_compact(false))
            .with_label(
                Label::new((self.name, span))
                    .with_message(label_text)
                    .with_color(color_of(&diag.severity)),
            );
        if let Some(note) = context_line(diag) {
            builder = builder.with_note(note);
        }
        if let Some(help) = diag.explain() {
            builder = builder.with_help(help);
        }
        builder.finish()
    }
}

/// Spanless diagnostics degrade to rustc-style stderr lines.
fn plain_report(diag: &Diagnostic) {
    eprintln!("{}", diag.to_string().fg(color_of(&diag.severity)));
    if let Some(note) = context_line(diag) {
        eprintln!("  = note: {note}");
    }
    if let Some(help) = diag.explain() {
        eprintln!("  = help: {help}");
    }
}

/// The context map flattened to `k=v, k=v`, if there is one.
fn context_line(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref()?;
    if ctx.is_empty() {
        return None;
    }
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn kind_of(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        _ => ReportKind::Advice,
    }
}

fn color_of(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        _ => Color::Blue,
    }
}

/// Coloured severity tally, e.g. `2 errors, 1 warning`.
fn tally(diagnostics: &[Diagnostic]) -> String {
    let count = |s: Severity| diagnostics.iter().filter(|d| d.severity == s).count();
    let (errors, warnings, infos) = (
        count(Severity::Error),
        count(Severity::Warn),
        count(Severity::Info),
    );

    let mut parts = Vec::new();
    if errors > 0 {
        let noun = if errors == 1 { "error" } else { "errors" };
        parts.push(format!("{}", format!("{errors} {noun}").fg(Color::Red)));
    }
    if warnings > 0 {
        let noun = if warnings == 1 { "warning" } else { "warnings" };
        parts.push(format!(
            "{}",
            format!("{warnings} {noun}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    parts.join(", ")
}
