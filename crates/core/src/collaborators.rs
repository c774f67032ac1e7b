//! Collaborators consumed at the edges of the extraction engine.
//!
//! The engine never converts PDFs or calls a generative model itself. Binaries inject a
//! [`TextSource`] (bytes to text) and optionally a [`TextGenerator`] (prompt to text); both
//! report failure as a [`CollaboratorError`] value that callers degrade on.

use crate::constants::PAGE_SEPARATOR;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Failure reported by an external collaborator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The source document could not be turned into text.
    #[error("text extraction failed: {0}")]
    Extraction(String),
    /// The provider rejected the call for quota reasons.
    #[error("quota exceeded: {message}")]
    Quota {
        message: String,
        retry_after: Option<Duration>,
    },
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl CollaboratorError {
    /// Suggested wait before retrying, when the provider gave one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CollaboratorError::Quota { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Text recovered from a source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceText {
    pub text: String,
    pub page_count: usize,
}

/// Converts an uploaded document into plain text.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<SourceText, CollaboratorError>;
}

/// Source for documents that are already plain text, such as a `pdftotext` export.
///
/// Pages are separated by form feeds; pages beyond `max_pages` are dropped.
#[derive(Clone, Debug)]
pub struct PlainTextSource {
    max_pages: usize,
}

impl PlainTextSource {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }
}

impl TextSource for PlainTextSource {
    fn extract_text(&self, bytes: &[u8]) -> Result<SourceText, CollaboratorError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CollaboratorError::Extraction(format!("source is not UTF-8: {e}")))?;

        let pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
        if pages.len() > self.max_pages {
            tracing::warn!(
                "source has {} pages, keeping the first {}",
                pages.len(),
                self.max_pages
            );
        }
        let kept: Vec<&str> = pages.into_iter().take(self.max_pages).collect();

        Ok(SourceText {
            page_count: kept.len(),
            text: kept.join("\n"),
        })
    }
}

/// One call to a text generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub timeout: Duration,
}

/// A generative text model. Implementations may block.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<String, CollaboratorError>;
}

/// Runs a generator call on a worker thread and gives up after the request's timeout.
///
/// A timed-out call is abandoned, not cancelled: its thread finishes on its own and the late
/// reply is discarded.
pub fn invoke_with_timeout(
    generator: Arc<dyn TextGenerator>,
    request: GenerationRequest,
) -> Result<String, CollaboratorError> {
    let timeout = request.timeout;
    let (tx, rx) = mpsc::channel();

    std::thread::Builder::new()
        .name("hc-generator".into())
        .spawn(move || {
            let _ = tx.send(generator.generate(&request));
        })
        .map_err(|e| CollaboratorError::Unavailable(format!("failed to spawn worker: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!("text generator timed out after {:?}", timeout);
            Err(CollaboratorError::Timeout(timeout))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(CollaboratorError::Unavailable(
            "generator worker exited without replying".into(),
        )),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Generator replaying canned results, recording every prompt it receives.
    pub(crate) struct ScriptedGenerator {
        reply: Result<String, CollaboratorError>,
        delay: Duration,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn replying(reply: Result<String, CollaboratorError>) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::replying(Ok(String::new()))
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, request: &GenerationRequest) -> Result<String, CollaboratorError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            std::thread::sleep(self.delay);
            self.reply.clone()
        }
    }

    #[test]
    fn plain_text_pages_are_counted_and_capped() {
        let source = PlainTextSource::new(2);
        let out = source
            .extract_text("pagina uno\u{c}pagina dos\u{c}pagina tres".as_bytes())
            .unwrap();
        assert_eq!(out.page_count, 2);
        assert_eq!(out.text, "pagina uno\npagina dos");
    }

    #[test]
    fn invalid_utf8_is_an_extraction_error() {
        let err = PlainTextSource::new(10)
            .extract_text(&[0xff, 0xfe, 0x00])
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Extraction(_)));
    }

    #[test]
    fn quota_error_carries_retry_after() {
        let err = CollaboratorError::Quota {
            message: "rate limited".into(),
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
        assert_eq!(CollaboratorError::Timeout(Duration::from_secs(1)).retry_after(), None);
    }

    #[test]
    fn generator_reply_is_returned() {
        let generator = Arc::new(ScriptedGenerator::replying(Ok("hola".into())));
        let request = GenerationRequest {
            prompt: "p".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(invoke_with_timeout(generator.clone(), request).unwrap(), "hola");
        assert_eq!(generator.prompts.lock().unwrap().as_slice(), ["p".to_string()]);
    }

    #[test]
    fn slow_generator_times_out() {
        let generator = Arc::new(ScriptedGenerator::slow(Duration::from_millis(500)));
        let request = GenerationRequest {
            prompt: "p".into(),
            timeout: Duration::from_millis(20),
        };
        let err = invoke_with_timeout(generator, request).unwrap_err();
        assert_eq!(err, CollaboratorError::Timeout(Duration::from_millis(20)));
    }
}
