use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::error::{QuotecardError, QuotecardResult};

/// Hard cap on quote length, enforced before anything reaches the renderer.
pub const MAX_QUOTE_LEN: usize = 110;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const PHILOSOPHERS: &[&str] = &[
    "Friedrich Nietzsche",
    "Plato",
    "Aristotle",
    "Socrates",
    "Jean-Paul Sartre",
    "Karl Marx",
];

/// Upstream quote producer. Implementations may return over-long text; the
/// length contract is enforced by [`fetch_valid_quote`].
pub trait QuoteSource {
    fn next_quote(&mut self) -> QuotecardResult<String>;
}

/// Asks the source until it produces a quote within [`MAX_QUOTE_LEN`]
/// characters, giving up after `max_attempts` so a non-compliant upstream
/// cannot stall the cycle forever.
pub fn fetch_valid_quote(
    source: &mut dyn QuoteSource,
    max_attempts: u32,
) -> QuotecardResult<String> {
    for attempt in 1..=max_attempts {
        let quote = source.next_quote()?.trim().to_string();
        let len = quote.chars().count();
        if !quote.is_empty() && len <= MAX_QUOTE_LEN {
            debug!(attempt, len, "quote accepted");
            return Ok(quote);
        }
        warn!(attempt, len, "quote rejected, retrying");
    }
    Err(QuotecardError::quote(format!(
        "no quote within {MAX_QUOTE_LEN} characters after {max_attempts} attempts"
    )))
}

/// Chat-completion backed source. Each call picks one of six philosophers at
/// random and asks for a short motivational phrase in that voice.
pub struct CompletionQuoteSource {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    rng: StdRng,
}

impl CompletionQuoteSource {
    pub fn new(api_key: String, model: String, rng: StdRng) -> QuotecardResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| QuotecardError::quote(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            rng,
        })
    }

    fn prompt(&mut self) -> String {
        let philosopher = PHILOSOPHERS[self.rng.gen_range(0..PHILOSOPHERS.len())];
        debug!(philosopher, "drafting prompt");
        format!(
            "Write a short motivational phrase with a deep, philosophical tone \
             in the style of {philosopher}. Do not use emoji or hashtags, and do \
             not attribute an author. Never repeat a phrase opening; vary the \
             construction: verbs, metaphors, questions, contrasts, poetic images. \
             The phrase must be at most {MAX_QUOTE_LEN} characters long."
        )
    }
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    n: u32,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(serde::Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl QuoteSource for CompletionQuoteSource {
    fn next_quote(&mut self) -> QuotecardResult<String> {
        let prompt = self.prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.9,
            n: 1,
        };

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| QuotecardError::quote(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(QuotecardError::quote(format!(
                "completion service returned {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| QuotecardError::quote(format!("completion response parse failed: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| QuotecardError::quote("completion response had no choices"))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        replies: Vec<String>,
        calls: usize,
    }

    impl QuoteSource for FixedSource {
        fn next_quote(&mut self) -> QuotecardResult<String> {
            let reply = self
                .replies
                .get(self.calls.min(self.replies.len() - 1))
                .cloned()
                .unwrap();
            self.calls += 1;
            Ok(reply)
        }
    }

    #[test]
    fn accepts_a_compliant_quote_first_try() {
        let mut source = FixedSource {
            replies: vec!["Doubt is the beginning of wisdom.".to_string()],
            calls: 0,
        };
        let quote = fetch_valid_quote(&mut source, 3).unwrap();
        assert_eq!(quote, "Doubt is the beginning of wisdom.");
        assert_eq!(source.calls, 1);
    }

    #[test]
    fn retries_until_a_quote_fits() {
        let mut source = FixedSource {
            replies: vec!["x".repeat(200), "y".repeat(150), "short enough".to_string()],
            calls: 0,
        };
        let quote = fetch_valid_quote(&mut source, 5).unwrap();
        assert_eq!(quote, "short enough");
        assert_eq!(source.calls, 3);
    }

    #[test]
    fn gives_up_after_the_attempt_limit() {
        // A permanently non-compliant upstream must fail the cycle, not spin.
        let mut source = FixedSource {
            replies: vec!["z".repeat(200)],
            calls: 0,
        };
        let err = fetch_valid_quote(&mut source, 4).unwrap_err();
        assert_eq!(source.calls, 4);
        assert!(err.to_string().contains("after 4 attempts"));
    }

    #[test]
    fn a_quote_of_exactly_the_limit_passes() {
        let mut source = FixedSource {
            replies: vec!["a".repeat(MAX_QUOTE_LEN)],
            calls: 0,
        };
        assert!(fetch_valid_quote(&mut source, 1).is_ok());
    }

    #[test]
    fn source_errors_propagate_immediately() {
        struct Broken;
        impl QuoteSource for Broken {
            fn next_quote(&mut self) -> QuotecardResult<String> {
                Err(QuotecardError::quote("upstream down"))
            }
        }
        assert!(fetch_valid_quote(&mut Broken, 3).is_err());
    }
}
