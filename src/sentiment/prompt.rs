//! Prompt templates for the two analysis modes

use crate::types::AnalysisMode;

const RESPONSE_SHAPE: &str = r#"Reply with a single JSON object and nothing else, shaped exactly like this:
{
    "label": "Positive" | "Negative" | "Neutral",
    "confidence": <number between 0 and 1>,
    "explanation": "<why this label fits, citing the review>",
    "evidence_phrases": ["<short quote>", "<short quote>"]
}"#;

const STRICT_RULES: &str = r#"You are a cautious film critic's assistant. Decide the sentiment of the movie review below, and only commit to Positive or Negative when the evidence is strong and unambiguous.

Rules:
- Positive: clear, emphatic praise with little or no criticism ("masterpiece", "loved every minute").
- Negative: clear, emphatic criticism with little or no praise ("unwatchable", "a total mess").
- Neutral: the default. Mixed opinions, mild wording, plot summaries and anything you are unsure about are Neutral.

Worked example:
Review: "The soundtrack is lovely and the cast tries hard, but the script drags and the twist is obvious from the start."
Answer:
{
    "label": "Neutral",
    "confidence": 0.8,
    "explanation": "Praise for the soundtrack and cast is offset by complaints about pacing and a predictable twist; mixed reviews are Neutral under these rules.",
    "evidence_phrases": ["soundtrack is lovely", "cast tries hard", "script drags", "twist is obvious"]
}"#;

const LENIENT_RULES: &str = r#"You are an attentive film critic's assistant. Decide the sentiment of the movie review below, picking up on subtle as well as explicit emotional cues.

Rules:
- Positive: any leaning towards enjoyment, including understated praise, implied satisfaction or a warm overall tone.
- Negative: any leaning towards dislike, including mild disappointment, faint praise used critically or a sour overall tone.
- Neutral: only for reviews that are purely factual or genuinely balanced.

Worked example:
Review: "Went in with low expectations and left still humming the songs. Not perfect, but I'd watch it again."
Answer:
{
    "label": "Positive",
    "confidence": 0.75,
    "explanation": "Exceeded low expectations and the reviewer would rewatch it; the small reservation does not outweigh the warm tone.",
    "evidence_phrases": ["still humming the songs", "I'd watch it again"]
}"#;

/// Build the full prompt for `review` under `mode`
pub fn build_prompt(mode: AnalysisMode, review: &str) -> String {
    let rules = match mode {
        AnalysisMode::Strict => STRICT_RULES,
        AnalysisMode::Lenient => LENIENT_RULES,
    };

    format!(
        "{rules}\n\n{RESPONSE_SHAPE}\n\nApply the {mode} rules to this movie review:\n\n{review}\n",
        review = review.trim()
    )
}
