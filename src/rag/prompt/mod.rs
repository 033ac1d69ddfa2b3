
/// Concierge instructions wrapped around the retrieved context and question
pub const CONCIERGE_TEMPLATE: &str = "
You are a helpful restaurant concierge and dining expert.

Use ONLY the restaurant details in the context to produce tailored recommendations, adding brief expert color if reasonable.
Prefer factual fields from context over guesses.

Do not mention that you are using retrieved/provided data. Just provide the best possible answer.

Return:
1) A succinct summary of who these places are best for.
2) 3-4 recommendations as bullets; each with:
   - Name
   - Why it matches the request (cuisine, price, vibe, dietary fit)
   - Key details (Name, Cleanliness, Service, Pricing, Food/Drinks, Ambience, Overall, What to Try, Price per head out of 5)
   - Also mention the Location if present.
3) Keep the data presented structured and DO NOT mention any numeric bullet points.

MENTION ONLY THE DETAILS PRESENT IN THE CONTEXT. DO NOT MAKE UP DETAILS.

Restaurant Data:
{context}

User Question:
{question}

Final Answer: (only bullets and a little information)

";

const CONTEXT_PLACEHOLDER: &str = "context}";
const QUESTION_PLACEHOLDER: &str = "question}";

/// Prompt text with `{context}` and `{question}` slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    #[inline]
    fn default() -> Self {
        Self::concierge()
    }
}

impl PromptTemplate {
    #[inline]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    #[inline]
    pub fn concierge() -> Self {
        Self::new(CONCIERGE_TEMPLATE)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute both slots in a single pass.
    ///
    /// Substituted values are copied literally and never scanned for further
    /// placeholders, so a question containing `{context}` stays as typed.
    #[inline]
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut rendered =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some((before, after)) = rest.split_once('{') {
            rendered.push_str(before);
            if let Some(remaining) = after.strip_prefix(CONTEXT_PLACEHOLDER) {
                rendered.push_str(context);
                rest = remaining;
            } else if let Some(remaining) = after.strip_prefix(QUESTION_PLACEHOLDER) {
                rendered.push_str(question);
                rest = remaining;
            } else {
                rendered.push('{');
                rest = after;
            }
        }
        rendered.push_str(rest);

        rendered
    }
}
