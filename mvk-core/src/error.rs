use crate::params::ParamField;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch font from {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("failed to parse typeface JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid outline for glyph {glyph:?} near {near:?}")]
    Outline { glyph: char, near: String },
    #[error("font has no glyphs")]
    Empty,
    #[error("font loader stopped before delivering a result")]
    LoaderGone,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("no panel control is bound to {0}")]
    NoControl(ParamField),
    #[error("unknown parameter name {0:?}")]
    UnknownName(String),
    #[error("{field} cannot take the non-finite value {value}")]
    NotFinite { field: ParamField, value: f32 },
    #[error("{field} expects a {expected} value")]
    KindMismatch {
        field: ParamField,
        expected: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error from a panel commit: either the commit was rejected or the re-render failed
#[derive(Debug, thiserror::Error)]
pub enum CommitError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("failed to present frame: {0}")]
    Present(#[source] E),
}
