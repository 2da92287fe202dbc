//! Encoding detection for SQL scripts of unknown origin.
//!
//! Every catalog encoding is tried in order and the decoded text is scored for
//! how much it looks like readable SQL. The highest score wins; on equal scores
//! the encoding listed first keeps the lead.

use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::{debug, info};

use super::error::{ConvertError, Result};
use crate::utils::encoding::{Codec, EncodingRsCodec, CATALOG};

/// Label reported when no candidate beats the default.
pub const DEFAULT_ENCODING: &str = "utf8";

const KEYWORDS: [&str; 10] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TABLE", "FROM", "WHERE",
];

const PUNCTUATION: [char; 6] = [';', '(', ')', ',', '\'', '"'];
const PUNCTUATION_CAP: usize = 20;

static KEYWORD_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(KEYWORDS.iter().map(|k| format!("(?i){}", k))).unwrap()
});

/// Outcome of resolving a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Catalog label (or the caller's hint) used to decode the buffer.
    pub encoding: String,
    pub text: String,
    /// Heuristic score of the winner; `None` when a hint skipped detection.
    pub score: Option<i64>,
}

/// One decoded candidate during detection.
#[derive(Debug)]
struct ScoredAttempt {
    encoding: &'static str,
    text: String,
    score: i64,
}

/// Picks the most plausible encoding for a byte buffer.
pub struct EncodingResolver<C: Codec = EncodingRsCodec> {
    codec: C,
}

impl EncodingResolver {
    pub fn new() -> Self {
        Self { codec: EncodingRsCodec }
    }
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> EncodingResolver<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// Decode `buffer`, using `hint` when given and detection otherwise.
    ///
    /// A hint is trusted: its decode error is returned as is, with no fallback.
    pub fn resolve(&self, buffer: &[u8], hint: Option<&str>) -> Result<Resolution> {
        if buffer.is_empty() {
            return Err(ConvertError::InvalidInput("content is empty".to_string()));
        }

        if let Some(hint) = hint {
            info!(encoding = hint, "decoding with hinted encoding");
            let text = self.codec.decode(buffer, hint)?;
            return Ok(Resolution {
                encoding: hint.to_string(),
                text,
                score: None,
            });
        }

        Ok(self.detect(buffer))
    }

    fn detect(&self, buffer: &[u8]) -> Resolution {
        let best = CATALOG
            .iter()
            .filter_map(|&encoding| match self.codec.decode(buffer, encoding) {
                Ok(text) => {
                    let score = score_text(&text);
                    let replacements = count_replacements(&text);
                    debug!(encoding, score, replacements, "scored candidate");
                    Some(ScoredAttempt { encoding, text, score })
                }
                Err(e) => {
                    debug!(encoding, error = %e, "skipping candidate");
                    None
                }
            })
            // Starts from UTF-8 at score 0; a candidate must strictly beat the leader.
            .fold(None::<ScoredAttempt>, |best, attempt| {
                let leader = best.as_ref().map_or(0, |b| b.score);
                if attempt.score > leader {
                    Some(attempt)
                } else {
                    best
                }
            });

        match best {
            Some(attempt) => {
                info!(encoding = attempt.encoding, score = attempt.score, "detected encoding");
                Resolution {
                    encoding: attempt.encoding.to_string(),
                    text: attempt.text,
                    score: Some(attempt.score),
                }
            }
            None => {
                info!("no candidate scored above zero, falling back to lossy UTF-8");
                let text = self
                    .codec
                    .decode(buffer, DEFAULT_ENCODING)
                    .unwrap_or_else(|_| String::from_utf8_lossy(buffer).into_owned());
                Resolution {
                    encoding: DEFAULT_ENCODING.to_string(),
                    text,
                    score: Some(0),
                }
            }
        }
    }
}

/// Score how much `text` looks like a readable SQL script.
pub fn score_text(text: &str) -> i64 {
    let mut score = 0i64;

    let replacements = count_replacements(text) as i64;
    if replacements == 0 {
        score += 100;
    } else {
        score -= 10 * replacements;
    }

    let length = text.chars().count();
    if length > 0 {
        score += 50;
    }

    score += 5 * KEYWORD_SET.matches(text).iter().count() as i64;

    if length > 0 {
        let printable = text.chars().filter(|&c| !is_control(c)).count();
        if printable as f64 / length as f64 > 0.8 {
            score += 30;
        }
    }

    let punctuation = text.chars().filter(|c| PUNCTUATION.contains(c)).count();
    score += punctuation.min(PUNCTUATION_CAP) as i64;

    score
}

/// Number of U+FFFD characters left by a lossy decode.
pub fn count_replacements(text: &str) -> usize {
    text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count()
}

fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Codec that records every label it is asked for.
    struct RecordingCodec {
        calls: RefCell<Vec<String>>,
    }

    impl RecordingCodec {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()) }
        }
    }

    impl Codec for RecordingCodec {
        fn decode(&self, bytes: &[u8], label: &str) -> Result<String> {
            self.calls.borrow_mut().push(label.to_string());
            EncodingRsCodec.decode(bytes, label)
        }
    }

    /// Codec whose decode fails for labels starting with `prefix`.
    struct FailingCodec {
        prefix: &'static str,
        failures: Cell<usize>,
    }

    impl Codec for FailingCodec {
        fn decode(&self, bytes: &[u8], label: &str) -> Result<String> {
            if label.starts_with(self.prefix) {
                self.failures.set(self.failures.get() + 1);
                return Err(ConvertError::DecodeFailure(label.to_string()));
            }
            EncodingRsCodec.decode(bytes, label)
        }
    }

    /// Codec that decodes everything to garbage.
    struct GarbageCodec;

    impl Codec for GarbageCodec {
        fn decode(&self, _bytes: &[u8], _label: &str) -> Result<String> {
            Ok("\u{FFFD}".repeat(40))
        }
    }

    #[test]
    fn test_score_select_statement() {
        // 100 clean + 50 non-empty + 10 keywords + 30 printable + 1 for ';'
        assert_eq!(score_text("SELECT * FROM t;"), 191);
    }

    #[test]
    fn test_score_empty_text() {
        assert_eq!(score_text(""), 100);
    }

    #[test]
    fn test_score_replacement_penalty() {
        assert_eq!(score_text("a\u{FFFD}\u{FFFD}"), -20 + 50 + 30);
    }

    #[test]
    fn test_count_replacements() {
        assert_eq!(count_replacements("SELECT 1;"), 0);
        let (decoded, _, _) = encoding_rs::UTF_8.decode(b"caf\xE9 \xFF;");
        assert_eq!(count_replacements(&decoded), 2);
    }

    #[test]
    fn test_keywords_count_once_and_ignore_case() {
        let once = score_text("select x");
        let twice = score_text("select select x");
        assert_eq!(once, twice);
        assert_eq!(score_text("drop table t"), 100 + 50 + 10 + 30);
    }

    #[test]
    fn test_punctuation_is_capped() {
        let text = ",".repeat(35);
        assert_eq!(score_text(&text), 100 + 50 + 30 + 20);
    }

    #[test]
    fn test_control_characters_lose_printable_bonus() {
        assert_eq!(score_text("\u{01}\u{02}\u{03}a"), 100 + 50);
        // C1 controls count too
        assert_eq!(score_text("\u{85}\u{90}\u{9F}a"), 100 + 50);
    }

    #[test]
    fn test_resolve_utf8_sql() {
        let resolver = EncodingResolver::new();
        let sql = "CREATE TABLE city (name TEXT);\nINSERT INTO city VALUES ('Zürich');\n";
        let resolution = resolver.resolve(sql.as_bytes(), None).unwrap();
        assert_eq!(resolution.encoding, "utf8");
        assert_eq!(resolution.text, sql);
        assert!(resolution.score.unwrap() >= 150);
    }

    #[test]
    fn test_resolve_select_scores_191() {
        let resolver = EncodingResolver::new();
        let resolution = resolver.resolve(b"SELECT * FROM t;", None).unwrap();
        assert_eq!(resolution.encoding, "utf8");
        assert_eq!(resolution.score, Some(191));
    }

    #[test]
    fn test_tie_goes_to_earlier_catalog_entry() {
        // Pure ASCII decodes the same under utf8, the single-byte pages and ascii.
        let resolver = EncodingResolver::new();
        let resolution = resolver.resolve(b"UPDATE t SET a = 1;", None).unwrap();
        assert_eq!(resolution.encoding, "utf8");
    }

    #[test]
    fn test_resolve_windows1251() {
        let sql = "INSERT INTO t VALUES ('Привет');";
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(sql);
        let resolution = EncodingResolver::new().resolve(&bytes, None).unwrap();
        assert_eq!(resolution.encoding, "windows1251");
        assert_eq!(resolution.text, sql);
    }

    #[test]
    fn test_round_trip_through_utf8() {
        let sql = "DELETE FROM t WHERE name = 'Größe';";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(sql);
        let resolution = EncodingResolver::new().resolve(&bytes, None).unwrap();
        let reencoded = resolution.text.clone().into_bytes();
        let again = EncodingRsCodec.decode(&reencoded, "utf8").unwrap();
        assert_eq!(again, resolution.text);
    }

    #[test]
    fn test_hint_skips_detection() {
        let codec = RecordingCodec::new();
        let resolver = EncodingResolver::with_codec(codec);
        let bytes: &[u8] = &[0xF0, 0xD2, 0xC9, 0xD7, 0xC5, 0xD4];
        let resolution = resolver.resolve(bytes, Some("koi8r")).unwrap();
        assert_eq!(resolution.text, "Привет");
        assert_eq!(resolution.encoding, "koi8r");
        assert_eq!(resolution.score, None);
        assert_eq!(*resolver.codec.calls.borrow(), vec!["koi8r".to_string()]);
    }

    #[test]
    fn test_unknown_hint_is_fatal() {
        let err = EncodingResolver::new().resolve(b"SELECT 1", Some("klingon")).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedEncoding(_)));
    }

    #[test]
    fn test_empty_buffer_is_rejected_without_decoding() {
        let resolver = EncodingResolver::with_codec(RecordingCodec::new());
        let err = resolver.resolve(b"", None).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInput(_)));
        assert!(resolver.codec.calls.borrow().is_empty());
    }

    #[test]
    fn test_detection_tries_whole_catalog_in_order() {
        let resolver = EncodingResolver::with_codec(RecordingCodec::new());
        resolver.resolve(b"SELECT 1", None).unwrap();
        let calls = resolver.codec.calls.borrow();
        assert_eq!(calls.len(), CATALOG.len());
        assert_eq!(calls[0], "utf8");
        assert_eq!(calls[CATALOG.len() - 1], "ascii");
    }

    #[test]
    fn test_failing_candidates_are_skipped() {
        let resolver = EncodingResolver::with_codec(FailingCodec { prefix: "utf", failures: Cell::new(0) });
        let resolution = resolver.resolve(b"SELECT 1;", None).unwrap();
        assert_eq!(resolution.encoding, "windows1251");
        // utf8, utf-8, utf16le, utf16be, utf32le, utf32be
        assert_eq!(resolver.codec.failures.get(), 6);
    }

    #[test]
    fn test_all_candidates_failing_falls_back_to_lossy_utf8() {
        let resolver = EncodingResolver::with_codec(FailingCodec { prefix: "", failures: Cell::new(0) });
        let resolution = resolver.resolve(b"SELECT \xFF;", None).unwrap();
        assert_eq!(resolution.encoding, DEFAULT_ENCODING);
        assert_eq!(resolution.score, Some(0));
        assert_eq!(resolution.text, "SELECT \u{FFFD};");
    }

    #[test]
    fn test_non_positive_scores_keep_default() {
        let resolution = EncodingResolver::with_codec(GarbageCodec).resolve(b"x", None).unwrap();
        assert_eq!(resolution.encoding, DEFAULT_ENCODING);
        assert_eq!(resolution.score, Some(0));
    }
}
