
//! Report problems that do not abort reading a header.

use std::fmt;
use crate::meta::attribute::Text;


/// A problem that was tolerated while reading a header.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {

    /// The offset from the start of the file where the problematic item begins.
    pub byte_position: usize,

    /// What went wrong.
    pub kind: WarningKind,
}

/// What went wrong while reading a header.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {

    /// The first four bytes are not the exr magic number.
    UnexpectedMagicNumber(i32),

    /// The version field contains flags that have no known meaning.
    UnknownVersionFlags(u32),

    /// The file contains multiple parts, but only the first header is read.
    MultipleParts,

    /// No null-terminator was found within the maximum length,
    /// so the text was cut off and reading continued after it.
    TruncatedText {

        /// The bytes up to the maximum length.
        text: Text,

        /// The maximum length in bytes, including the terminator.
        max_bytes: usize,
    },

    /// A value occupied a different number of bytes than its attribute declared.
    SizeMismatch {

        /// The name of the attribute.
        attribute: Text,

        /// The size found in the file.
        declared_size: i32,

        /// The number of bytes the value actually occupied.
        byte_size: usize,
    },

    /// A value ended before its declared size, and the remaining bytes were skipped.
    UnusedBytes {

        /// The name of the attribute.
        attribute: Text,

        /// The number of skipped bytes.
        byte_count: usize,
    },

    /// An attribute name appeared again, and the later value was kept.
    DuplicateAttribute(Text),

    /// Reading stopped after the maximum number of attributes.
    AttributeLimitReached(usize),
}

/// Receives the warnings produced while reading a header.
pub trait Diagnostics {

    /// Called once for each tolerated problem, in file order.
    fn warn(&mut self, warning: Warning);
}

/// Discards all warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreDiagnostics;

/// Forwards all warnings to the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;


impl Diagnostics for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

impl<F> Diagnostics for F where F: FnMut(Warning) {
    fn warn(&mut self, warning: Warning) {
        self(warning)
    }
}

impl Diagnostics for IgnoreDiagnostics {
    fn warn(&mut self, _: Warning) {}
}

impl Diagnostics for TracingDiagnostics {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!(byte_position = warning.byte_position, "{}", warning.kind);
    }
}


impl fmt::Display for Warning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "at byte {}: {}", self.byte_position, self.kind)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnexpectedMagicNumber(found) =>
                write!(formatter, "unexpected magic number {}", found),

            WarningKind::UnknownVersionFlags(flags) =>
                write!(formatter, "unknown version flags {:#010x}", flags),

            WarningKind::MultipleParts =>
                formatter.write_str("multi-part file, only the first header was read"),

            WarningKind::TruncatedText { text, max_bytes } =>
                write!(formatter, "text `{}` has no terminator within {} bytes", text, max_bytes),

            WarningKind::SizeMismatch { attribute, declared_size, byte_size } =>
                write!(formatter, "attribute `{}` declares {} bytes but occupies {}", attribute, declared_size, byte_size),

            WarningKind::UnusedBytes { attribute, byte_count } =>
                write!(formatter, "skipped {} unused bytes of attribute `{}`", byte_count, attribute),

            WarningKind::DuplicateAttribute(name) =>
                write!(formatter, "attribute `{}` appears more than once", name),

            WarningKind::AttributeLimitReached(limit) =>
                write!(formatter, "stopped after {} attributes", limit),
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn report(diagnostics: &mut impl Diagnostics) {
        diagnostics.warn(Warning { byte_position: 4, kind: WarningKind::MultipleParts });
        diagnostics.warn(Warning { byte_position: 9, kind: WarningKind::DuplicateAttribute(Text::from("owner")) });
    }

    #[test]
    fn collect_into_vec(){
        let mut warnings: Vec<Warning> = Vec::new();
        report(&mut warnings);

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1].to_string(), "at byte 9: attribute `owner` appears more than once");
    }

    #[test]
    fn forward_to_closure(){
        let mut positions = Vec::new();
        report(&mut |warning: Warning| positions.push(warning.byte_position));
        assert_eq!(positions, vec![4, 9]);
    }

    #[test]
    fn ignore_and_trace(){
        report(&mut IgnoreDiagnostics);
        report(&mut TracingDiagnostics);
    }
}
