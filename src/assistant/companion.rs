//! Companionship mode: sentiment-aware small talk with session memory.
//!
//! Sentiment classification counts keyword hits from disjoint lists; ties
//! resolve in favor of the stronger positive signal (excited beats happy and
//! sad at equal counts). A fixed set of patterns screens for distressing
//! content so the reply can lead with support instead of chit-chat.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::InferenceError;
use crate::assistant::TextGenerator;
use crate::core::memory::{ConversationMemory, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Excited,
    Happy,
    Sad,
    Concerned,
    Neutral,
}

const EXCITED_WORDS: &[&str] = &[
    "amazing", "awesome", "fantastic", "incredible", "thrilled", "excited", "ecstatic",
];
const HAPPY_WORDS: &[&str] = &[
    "happy", "glad", "great", "wonderful", "joy", "love", "pleased",
];
const SAD_WORDS: &[&str] = &[
    "sad", "unhappy", "down", "miserable", "lonely", "cry", "gloomy",
];
const CONCERNED_WORDS: &[&str] = &[
    "worried", "anxious", "nervous", "scared", "afraid", "stressed", "overwhelmed",
];

/// Patterns indicating the user may be in real distress.
static NEGATIVE_CONTENT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bhate myself\b",
        r"(?i)\bhurt myself\b",
        r"(?i)\bwant to (die|disappear)\b",
        r"(?i)\bno reason to (live|go on)\b",
        r"(?i)\bend it all\b",
        r"(?i)\bgive up on everything\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("negative content pattern"))
    .collect()
});

/// Self-disclosures worth keeping for the rest of the session.
static FACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bmy name is [A-Za-z][\w-]*",
        r"(?i)\bi live in [A-Za-z][\w ,-]*",
        r"(?i)\bi work (as|at) [A-Za-z][\w ,-]*",
        r"(?i)\bmy birthday is [\w ,-]+",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("fact pattern"))
    .collect()
});

/// Topic keywords folded into memory so later prompts can refer back.
static TOPIC_TABLE: &[(&str, &[&str])] = &[
    ("work", &["work", "job", "boss", "office", "career"]),
    ("family", &["family", "mom", "dad", "parents", "sister", "brother"]),
    ("music", &["music", "song", "band", "concert"]),
    ("movies", &["movie", "film", "cinema", "series"]),
    ("games", &["game", "gaming", "play"]),
    ("books", &["book", "reading", "novel"]),
    ("food", &["food", "cooking", "dinner", "recipe"]),
    ("travel", &["travel", "trip", "vacation", "flight"]),
];

fn keyword_hits(words: &[&str], text: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|token| !token.is_empty())
        .filter(|token| {
            let token = token.to_lowercase();
            words.contains(&token.as_str())
        })
        .count()
}

/// Classify the message sentiment by keyword counts.
///
/// Candidates are ranked excited, happy, sad, concerned; the first with the
/// maximum count wins, so excited takes ties against happy and sad as long
/// as its count is at least their maximum. No hits at all means neutral.
pub fn classify_sentiment(text: &str) -> Sentiment {
    let counts = [
        (Sentiment::Excited, keyword_hits(EXCITED_WORDS, text)),
        (Sentiment::Happy, keyword_hits(HAPPY_WORDS, text)),
        (Sentiment::Sad, keyword_hits(SAD_WORDS, text)),
        (Sentiment::Concerned, keyword_hits(CONCERNED_WORDS, text)),
    ];

    // Keep the first maximum: later candidates only win with a strictly
    // greater count, which is what lets excited take ties.
    let mut best = (Sentiment::Neutral, 0);
    for (sentiment, count) in counts {
        if count > best.1 {
            best = (sentiment, count);
        }
    }
    best.0
}

/// True when the message matches any of the distress patterns.
pub fn contains_negative_content(text: &str) -> bool {
    NEGATIVE_CONTENT.iter().any(|pattern| pattern.is_match(text))
}

/// Extract self-disclosed facts, one per matching pattern occurrence.
pub fn extract_facts(text: &str) -> Vec<String> {
    FACT_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract topics present in the message, in table order.
pub fn extract_topics(text: &str) -> Vec<&'static str> {
    TOPIC_TABLE
        .iter()
        .filter(|(_, keywords)| keyword_hits(keywords, text) > 0)
        .map(|(topic, _)| *topic)
        .collect()
}

fn tone_instruction(sentiment: Sentiment, distressed: bool) -> &'static str {
    if distressed {
        return "The user may be in real distress. Respond with warmth and care, take \
                their words seriously, and gently suggest reaching out to someone they \
                trust or a support line.";
    }
    match sentiment {
        Sentiment::Excited => "Match the user's excitement and ask what made it so good.",
        Sentiment::Happy => "Share in the user's good mood and keep the conversation going.",
        Sentiment::Sad => "Be gentle and empathetic; acknowledge the feeling before anything else.",
        Sentiment::Concerned => "Be calm and reassuring; help the user untangle what worries them.",
        Sentiment::Neutral => "Be a friendly, attentive conversation partner.",
    }
}

/// Respond to a companion message: classify, fold topics into memory, build
/// a context-aware prompt, delegate, and record both sides. Backend failures
/// are returned as reply text, so the session continues.
pub async fn respond(
    generator: &dyn TextGenerator,
    model: &str,
    memory: &mut ConversationMemory,
    message: &str,
) -> String {
    let sentiment = classify_sentiment(message);
    let distressed = contains_negative_content(message);
    for topic in extract_topics(message) {
        memory.note_topic(topic);
    }
    for fact in extract_facts(message) {
        memory.note_fact(fact);
    }

    let mut prompt = String::from(
        "You are a warm, attentive companion. Reply conversationally in a few sentences.\n",
    );
    prompt.push_str(tone_instruction(sentiment, distressed));
    prompt.push('\n');
    if !memory.topics().is_empty() {
        prompt.push_str(&format!(
            "Topics discussed so far: {}.\n",
            memory.topics().join(", ")
        ));
    }
    if !memory.facts().is_empty() {
        prompt.push_str(&format!(
            "Things the user has shared: {}.\n",
            memory.facts().join("; ")
        ));
    }
    if !memory.is_empty() {
        prompt.push_str("Recent conversation:\n");
        prompt.push_str(&memory.recent_context());
        prompt.push('\n');
    }
    prompt.push_str(&format!("User: {message}\nCompanion:"));

    memory.record(Role::User, message);

    let reply = match generator.generate(&prompt, model).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => match e.downcast_ref::<InferenceError>() {
            Some(inference) => format!("Error generating reply: {inference}"),
            None => format!("An unexpected error occurred during the conversation: {e}"),
        },
    };

    memory.record(Role::Assistant, reply.clone());
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::test_support::{BackendDownGenerator, CannedGenerator};

    #[test]
    fn excited_only_words_classify_as_excited() {
        assert_eq!(
            classify_sentiment("that was amazing, truly incredible"),
            Sentiment::Excited
        );
    }

    #[test]
    fn no_keywords_classify_as_neutral() {
        assert_eq!(
            classify_sentiment("the meeting is at three tomorrow"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn excited_wins_ties_against_happy_and_sad() {
        // One excited hit, one happy hit, one sad hit.
        assert_eq!(
            classify_sentiment("I'm thrilled but also happy and a bit sad"),
            Sentiment::Excited
        );
    }

    #[test]
    fn plain_majority_wins_otherwise() {
        assert_eq!(
            classify_sentiment("I'm worried, anxious, and scared about this"),
            Sentiment::Concerned
        );
    }

    #[test]
    fn keyword_matching_is_word_bounded() {
        // "sadness" must not count as "sad", "downtown" not as "down".
        assert_eq!(
            classify_sentiment("the downtown sadness institute"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn negative_content_detection() {
        assert!(contains_negative_content("some days I hate myself"));
        assert!(!contains_negative_content("I hate mondays"));
    }

    #[test]
    fn topics_are_extracted_from_the_table() {
        let topics = extract_topics("after work I listened to music");
        assert_eq!(topics, ["work", "music"]);
    }

    #[test]
    fn facts_are_extracted_from_self_disclosures() {
        let facts = extract_facts("by the way, my name is Ada and I live in Lyon");
        assert_eq!(facts.len(), 2);
        assert!(facts[0].starts_with("my name is Ada"));
        assert!(extract_facts("nothing personal here").is_empty());
    }

    #[tokio::test]
    async fn respond_records_both_sides_and_topics() {
        let generator = CannedGenerator::new("That sounds like a good day.");
        let mut memory = ConversationMemory::new();
        let reply = respond(&generator, "llama3.2", &mut memory, "work went great today").await;
        assert_eq!(reply, "That sounds like a good day.");
        assert_eq!(memory.len(), 2);
        assert_eq!(memory.topics(), ["work"]);
    }

    #[tokio::test]
    async fn respond_survives_backend_failure() {
        let mut memory = ConversationMemory::new();
        let reply = respond(&BackendDownGenerator, "llama3.2", &mut memory, "hello").await;
        assert!(reply.starts_with("Error generating reply: "));
        // The session continues: both sides are still recorded.
        assert_eq!(memory.len(), 2);
    }

    #[tokio::test]
    async fn prompt_carries_recent_context() {
        let generator = CannedGenerator::new("nice");
        let mut memory = ConversationMemory::new();
        respond(&generator, "llama3.2", &mut memory, "I saw a great film").await;
        respond(&generator, "llama3.2", &mut memory, "tell me about it").await;
        let prompt = generator.last_prompt();
        assert!(prompt.contains("Recent conversation:"));
        assert!(prompt.contains("I saw a great film"));
        assert!(prompt.contains("movies"));
    }
}
