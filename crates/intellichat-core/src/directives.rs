//! Routing of one submitted input line.
//!
//! Three rules, checked in order: a literal URL is a navigation target
//! verbatim; the phrase "redirect me to" coerces the trailing text into a
//! `.com` address; anything else non-empty is a chat turn.

/// Trigger phrase for domain navigation, matched case-insensitively.
pub const REDIRECT_PHRASE: &str = "redirect me to";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Navigate the client to the input, taken verbatim.
    Navigate { url: String },
    /// Navigate to `https://<label>.com` built from the text after the
    /// trigger phrase.
    NavigateDomain { label: String, url: String },
    /// Forward to the model as the next conversation turn.
    Chat { text: String },
}

/// Classifies one input line. Empty or all-whitespace input is ignored.
pub fn parse(input: &str) -> Option<Directive> {
    if input.trim().is_empty() {
        return None;
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return Some(Directive::Navigate {
            url: input.to_string(),
        });
    }

    let lowered = input.to_lowercase();
    if let Some(position) = lowered.find(REDIRECT_PHRASE) {
        let label = lowered[position + REDIRECT_PHRASE.len()..].trim().to_string();
        let url = format!("https://{}.com", label);
        return Some(Directive::NavigateDomain { label, url });
    }

    Some(Directive::Chat {
        text: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_prefix_navigates_verbatim() {
        let input = "http://example.org/a?b=C";
        assert_eq!(
            parse(input),
            Some(Directive::Navigate {
                url: input.to_string()
            })
        );

        let input = "https://Example.org/Path";
        assert_eq!(
            parse(input),
            Some(Directive::Navigate {
                url: input.to_string()
            })
        );
    }

    #[test]
    fn test_url_prefix_wins_over_redirect_phrase() {
        let input = "https://example.org/redirect me to nowhere";
        assert!(matches!(parse(input), Some(Directive::Navigate { .. })));
    }

    #[test]
    fn test_redirect_phrase_is_case_insensitive() {
        let parsed = parse("Please REDIRECT ME TO GitHub").unwrap();
        assert_eq!(
            parsed,
            Directive::NavigateDomain {
                label: "github".to_string(),
                url: "https://github.com".to_string(),
            }
        );
    }

    #[test]
    fn test_redirect_label_is_trimmed_and_lowercased() {
        let parsed = parse("redirect me to   Google  ").unwrap();
        assert_eq!(
            parsed,
            Directive::NavigateDomain {
                label: "google".to_string(),
                url: "https://google.com".to_string(),
            }
        );
    }

    #[test]
    fn test_redirect_phrase_mid_sentence_takes_the_tail() {
        let parsed = parse("could you redirect me to open ai").unwrap();
        assert_eq!(
            parsed,
            Directive::NavigateDomain {
                label: "open ai".to_string(),
                url: "https://open ai.com".to_string(),
            }
        );
    }

    #[test]
    fn test_bare_redirect_phrase_yields_empty_label() {
        let parsed = parse("redirect me to").unwrap();
        assert_eq!(
            parsed,
            Directive::NavigateDomain {
                label: String::new(),
                url: "https://.com".to_string(),
            }
        );
    }

    #[test]
    fn test_plain_text_is_a_chat_turn() {
        let parsed = parse("what is the capital of France?").unwrap();
        assert_eq!(
            parsed,
            Directive::Chat {
                text: "what is the capital of France?".to_string()
            }
        );
    }

    #[test]
    fn test_url_mentioned_mid_sentence_is_still_chat() {
        let parsed = parse("see https://example.org for details").unwrap();
        assert!(matches!(parsed, Directive::Chat { .. }));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   \t "), None);
    }
}
