//=====================================================
// File: errors.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Error taxonomy for HyperTalk script execution
// Objective: Classify script failures, map them to stable error codes, and
//            carry the source position an editor needs to highlight them
//=====================================================

use std::fmt;

use thiserror::Error;

use crate::ast::Span;

/// Every failure a script can raise. All variants except `Internal` are
/// recoverable at the nearest handler boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtError {
    /// Malformed script reported by the upstream parser.
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Semantic(String),
    /// Names the specifier segment that failed to resolve.
    #[error("No such {0}.")]
    NoSuchPart(String),
    #[error("No such property \"{0}\".")]
    NoSuchProperty(String),
    #[error("{0}")]
    ChunkRange(String),
    /// An evaluator invariant was violated; this is a bug, not a script error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HtError {
    pub fn semantic(message: impl Into<String>) -> Self {
        HtError::Semantic(message.into())
    }

    pub fn no_such_part(segment: impl fmt::Display) -> Self {
        HtError::NoSuchPart(segment.to_string())
    }

    pub fn no_such_property(name: impl Into<String>) -> Self {
        HtError::NoSuchProperty(name.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        HtError::Internal(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            HtError::Syntax(_) => ErrorCode::Syntax,
            HtError::Semantic(_) => ErrorCode::Semantic,
            HtError::NoSuchPart(_) => ErrorCode::NoSuchPart,
            HtError::NoSuchProperty(_) => ErrorCode::NoSuchProperty,
            HtError::ChunkRange(_) => ErrorCode::ChunkRange,
            HtError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for programmer-error failures that should be reported distinctly.
    pub fn is_internal(&self) -> bool {
        matches!(self, HtError::Internal(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Syntax,
    Semantic,
    NoSuchPart,
    NoSuchProperty,
    ChunkRange,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "E101",
            ErrorCode::Semantic => "E102",
            ErrorCode::NoSuchPart => "E103",
            ErrorCode::NoSuchProperty => "E104",
            ErrorCode::ChunkRange => "E105",
            ErrorCode::Internal => "E199",
        }
    }
}

/// A failure on its way to the dispatcher, annotated with where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub error: HtError,
    pub span: Option<Span>,
    pub handler: Option<String>,
}

impl ScriptError {
    pub fn new(error: HtError) -> Self {
        Self {
            error,
            span: None,
            handler: None,
        }
    }

    /// Attach a source position unless a more precise one is already set.
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Record the handler the error unwound out of (innermost wins).
    pub fn in_handler(mut self, name: &str) -> Self {
        if self.handler.is_none() {
            self.handler = Some(name.to_string());
        }
        self
    }

    pub fn code_str(&self) -> &'static str {
        self.error.code().as_str()
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(handler) = &self.handler {
            write!(f, " (in {handler})")?;
        }
        if let Some(span) = &self.span {
            write!(f, " at line {}, column {}", span.line, span.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<HtError> for ScriptError {
    fn from(value: HtError) -> Self {
        ScriptError::new(value)
    }
}

pub type HtResult<T> = Result<T, HtError>;
pub type ScriptResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_and_handler_keep_innermost() {
        let error = ScriptError::new(HtError::semantic("Too much recursion."))
            .at(Span::new(3, 5))
            .at(Span::new(9, 1))
            .in_handler("mouseUp")
            .in_handler("openCard");
        assert_eq!(error.span, Some(Span::new(3, 5)));
        assert_eq!(error.handler.as_deref(), Some("mouseUp"));
        assert_eq!(
            error.to_string(),
            "Too much recursion. (in mouseUp) at line 3, column 5"
        );
    }
}

//=====================================================
// End of file
//=====================================================
