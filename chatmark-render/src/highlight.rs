//! Syntax highlight service
//!
//!     Highlighting is the one genuinely expensive sub-step, so it lives off the pure
//!     parse/resolve/build path: callers get `plain()` immediately and await
//!     `highlight()` for the final markup. Results are memoized forever (inputs are
//!     immutable) and concurrent requests for the same key coalesce into a single
//!     computation through a per-key `tokio::sync::OnceCell`.
//!
//!     The engine is pluggable behind the `Highlight` trait; the built-in engine is a
//!     deterministic escape-only pass-through.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::tree::{escape, KNOWN_LANGUAGES};

#[derive(Debug)]
pub enum HighlightError {
    UnsupportedLanguage(String),
    Engine(String),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnsupportedLanguage(lang) => {
                write!(f, "unsupported language: {lang}")
            }
            HighlightError::Engine(msg) => write!(f, "highlight engine failure: {msg}"),
        }
    }
}

impl std::error::Error for HighlightError {}

/// A highlight engine. Implementations must be deterministic for a given
/// `(code, language, theme)` since results are cached indefinitely.
pub trait Highlight: Send + Sync {
    fn highlight(&self, code: &str, language: &str, theme: &str)
        -> Result<String, HighlightError>;
}

/// Escape-only engine: markup-safe output, no token coloring.
#[derive(Debug, Default)]
pub struct PlainHighlighter;

impl Highlight for PlainHighlighter {
    fn highlight(
        &self,
        code: &str,
        _language: &str,
        _theme: &str,
    ) -> Result<String, HighlightError> {
        Ok(escape(code))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    pub theme: String,
    pub languages: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            theme: "dark".to_string(),
            languages: KNOWN_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl HighlightConfig {
    pub fn allows(&self, language: &str) -> bool {
        self.languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRequest {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlighted {
    pub markup: String,
    /// False when the engine failed or the language was rejected and the
    /// escaped fallback was cached instead.
    pub colored: bool,
}

type Key = (u64, String, String);

pub struct HighlightService {
    engine: Arc<dyn Highlight>,
    config: HighlightConfig,
    cells: Mutex<HashMap<Key, Arc<OnceCell<Arc<Highlighted>>>>>,
}

impl HighlightService {
    pub fn new(engine: Arc<dyn Highlight>, config: HighlightConfig) -> HighlightService {
        HighlightService {
            engine,
            config,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Immediate synchronous fallback, shown until [`highlight`] resolves.
    ///
    /// [`highlight`]: HighlightService::highlight
    pub fn plain(&self, code: &str) -> String {
        escape(code)
    }

    /// Eventual highlighted result. Concurrent calls with an identical key
    /// share one computation; later calls hit the cache.
    pub async fn highlight(&self, req: &HighlightRequest) -> Arc<Highlighted> {
        let cell = self.cell_for(req);
        cell.get_or_init(|| async { Arc::new(self.compute(req)) })
            .await
            .clone()
    }

    fn cell_for(&self, req: &HighlightRequest) -> Arc<OnceCell<Arc<Highlighted>>> {
        let key = self.key(req);
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(key).or_default().clone()
    }

    fn key(&self, req: &HighlightRequest) -> Key {
        let mut hasher = DefaultHasher::new();
        req.code.hash(&mut hasher);
        (
            hasher.finish(),
            req.language.to_ascii_lowercase(),
            self.config.theme.clone(),
        )
    }

    fn compute(&self, req: &HighlightRequest) -> Highlighted {
        if !self.config.allows(&req.language) {
            tracing::debug!(language = %req.language, "language not in allowlist");
            return Highlighted {
                markup: escape(&req.code),
                colored: false,
            };
        }
        match self
            .engine
            .highlight(&req.code, &req.language, &self.config.theme)
        {
            Ok(markup) => Highlighted {
                markup,
                colored: true,
            },
            Err(err) => {
                tracing::warn!(language = %req.language, error = %err, "highlight failed");
                Highlighted {
                    markup: escape(&req.code),
                    colored: false,
                }
            }
        }
    }
}

impl Default for HighlightService {
    fn default() -> Self {
        HighlightService::new(Arc::new(PlainHighlighter), HighlightConfig::default())
    }
}
