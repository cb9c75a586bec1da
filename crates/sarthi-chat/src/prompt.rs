//! Mistral-instruct prompt assembly.

/// Wrap context and question in the `[INST]` format with the advisor
/// persona. The closing Hindi instruction pins the answer language.
pub fn build_prompt(context: &str, user_query: &str) -> String {
    format!(
        "[INST] You are Agri-Sarthi, a helpful agricultural advisor for Jaipur farmers. \
         Respond in simple, natural Hindi. Keep it concise and factual.\n\n\
         Context:\n{}\n\n\
         User question:\n{}\n\n\
         उत्तर हिंदी में दें। [/INST]",
        context, user_query
    )
}
