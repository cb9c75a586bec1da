//! Generation backend trait and the template fallback.

use async_trait::async_trait;

/// An answer generator. `None` means the backend could not produce an
/// answer and the caller should fall back to the template.
#[async_trait]
pub trait GeneratorBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Option<String>;

    /// Whether a model is expected to be reachable.
    fn is_available(&self) -> bool;
}

/// Deterministic Hindi fallback when no model is reachable. Echoes the
/// question and the first 400 characters of context so the farmer
/// still gets the facts that were retrieved.
pub fn fallback_answer(user_query: &str, context: &str) -> String {
    let truncated: String = context.chars().take(400).collect();
    format!(
        "कृपया ध्यान दें: ऑफ़लाइन LLM उपलब्ध नहीं है। आपके प्रश्न का संक्षिप्त उत्तर: {} | संदर्भ: {}",
        user_query, truncated
    )
}

/// Generator that never answers, used in tests and model-less runs.
pub struct NoopGenerator;

#[async_trait]
impl GeneratorBackend for NoopGenerator {
    async fn generate(&self, _prompt: &str) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_includes_query_and_context() {
        let answer = fallback_answer("गेहूं कब बोएं?", "Crop: Wheat | Season: Rabi");
        assert!(answer.contains("गेहूं कब बोएं?"));
        assert!(answer.contains("संदर्भ: Crop: Wheat | Season: Rabi"));
    }

    #[test]
    fn test_fallback_truncates_long_context_by_chars() {
        // Devanagari is multi-byte; truncation must count chars, not bytes
        let context = "क".repeat(1000);
        let answer = fallback_answer("प्रश्न", &context);
        let tail: String = answer.chars().rev().take_while(|&c| c == 'क').collect();
        assert_eq!(tail.chars().count(), 400);
    }

    #[tokio::test]
    async fn test_noop_generator() {
        let gen = NoopGenerator;
        assert!(!gen.is_available());
        assert!(gen.generate("anything").await.is_none());
    }
}
