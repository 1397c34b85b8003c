use miette::{Diagnostic, SourceSpan};
use std::{
    error::Error,
    fmt::{Display, Formatter, Result},
    path::PathBuf,
};

#[derive(Debug, Diagnostic)]
pub enum EmojidexError {
    #[diagnostic(code(emojidex::terminal), url(docsrs))]
    Terminal {
        #[source_code]
        src: String,
        #[label("error occurred here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::io), url(docsrs))]
    Io {
        path: PathBuf,
        #[source_code]
        src: String,
        #[label("io error occurred here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(
        code(emojidex::storage),
        help("persisted values are plain JSON files; removing the file resets that slice")
    )]
    Storage {
        key: String,
        #[source_code]
        src: String,
        #[label("storage error occurred here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::config), help("config.toml accepts data_dir, tick_rate_ms, start_view and an [ai] table"))]
    Config {
        path: PathBuf,
        #[source_code]
        src: String,
        #[label("invalid configuration")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::network))]
    Network {
        #[source_code]
        src: String,
        #[label("request failed here")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::parse))]
    Parse {
        #[source_code]
        src: String,
        #[label("unexpected reply shape")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::no_results), help("try a different prompt"))]
    NoResults {
        #[source_code]
        src: String,
        #[label("nothing in the catalog matched")]
        err_span: SourceSpan,
    },

    #[diagnostic(code(emojidex::input))]
    InvalidInput {
        #[source_code]
        src: String,
        #[label("rejected")]
        err_span: SourceSpan,
        msg: String,
    },

    #[diagnostic(code(emojidex::channel), url(docsrs))]
    ChannelClosed {
        #[source_code]
        src: String,
        #[label("channel closed")]
        err_span: SourceSpan,
    },
}

pub type EmojidexResult<T> = miette::Result<T>;

impl Display for EmojidexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            EmojidexError::Terminal { msg, .. } => write!(f, "Terminal error: {}", msg),
            EmojidexError::Io { path, msg, .. } => {
                write!(f, "IO error at {}: {}", path.display(), msg)
            }
            EmojidexError::Storage { key, msg, .. } => {
                write!(f, "Storage error for '{}': {}", key, msg)
            }
            EmojidexError::Config { path, msg, .. } => {
                write!(f, "Config error in {}: {}", path.display(), msg)
            }
            EmojidexError::Network { msg, .. } => write!(f, "Network error: {}", msg),
            EmojidexError::Parse { msg, .. } => write!(f, "Parse error: {}", msg),
            EmojidexError::NoResults { .. } => write!(f, "No matching emoji found"),
            EmojidexError::InvalidInput { msg, .. } => write!(f, "Invalid input: {}", msg),
            EmojidexError::ChannelClosed { .. } => write!(f, "Channel closed"),
        }
    }
}

impl Error for EmojidexError {}

impl EmojidexError {
    pub fn terminal(
        src: impl Into<String>,
        err_span: impl Into<SourceSpan>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Terminal {
            src: src.into(),
            err_span: err_span.into(),
            msg: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        let path = path.into();
        let src = path.display().to_string();
        let len = src.len();
        Self::Io {
            path,
            src,
            err_span: (0, len).into(),
            msg: msg.into(),
        }
    }

    pub fn storage(
        key: impl Into<String>,
        src: impl Into<String>,
        err_span: impl Into<SourceSpan>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Storage {
            key: key.into(),
            src: src.into(),
            err_span: err_span.into(),
            msg: msg.into(),
        }
    }

    pub fn config(
        path: impl Into<PathBuf>,
        src: impl Into<String>,
        err_span: impl Into<SourceSpan>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Config {
            path: path.into(),
            src: src.into(),
            err_span: err_span.into(),
            msg: msg.into(),
        }
    }

    pub fn network(src: impl Into<String>, msg: impl Into<String>) -> Self {
        let src = src.into();
        let len = src.len();
        Self::Network {
            src,
            err_span: (0, len).into(),
            msg: msg.into(),
        }
    }

    /// Builds a parse error pointing at `line`/`column` (1-based, as reported by
    /// `serde_json`) inside `src`.
    pub fn parse_at(src: impl Into<String>, line: usize, column: usize, msg: impl Into<String>) -> Self {
        let src = src.into();
        let offset = offset_of(&src, line, column);
        Self::Parse {
            err_span: (offset, 0).into(),
            src,
            msg: msg.into(),
        }
    }

    pub fn parse(src: impl Into<String>, msg: impl Into<String>) -> Self {
        let src = src.into();
        let len = src.len();
        Self::Parse {
            src,
            err_span: (0, len).into(),
            msg: msg.into(),
        }
    }

    pub fn no_results(src: impl Into<String>) -> Self {
        let src = src.into();
        let len = src.len();
        Self::NoResults {
            src,
            err_span: (0, len).into(),
        }
    }

    pub fn invalid_input(src: impl Into<String>, msg: impl Into<String>) -> Self {
        let src = src.into();
        let len = src.len();
        Self::InvalidInput {
            src,
            err_span: (0, len).into(),
            msg: msg.into(),
        }
    }

    pub fn channel_closed(src: impl Into<String>, err_span: impl Into<SourceSpan>) -> Self {
        Self::ChannelClosed {
            src: src.into(),
            err_span: err_span.into(),
        }
    }
}

fn offset_of(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}
