//! AI emoji suggestions.
//!
//! The inference service is an injected [`CompletionClient`]: text prompt in,
//! text reply out. [`SuggestionAdapter`] builds prompts that embed the
//! catalog, parses the constrained JSON reply and validates every codepoint
//! against the catalog. Requests from the interactive UI go through
//! [`run_worker`], which posts each [`AiOutcome`] back into the event channel.

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use smol::future::FutureExt;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, Category, Emoji},
    config::AiConfig,
    error::{EmojidexError, EmojidexResult},
    event::{Event, EventHandler},
};

/// Number of suggestions requested in suggest mode
pub const SUGGESTION_COUNT: usize = 8;

pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Celebrating a big win at work!",
    "Feeling cozy on a rainy day",
    "Late night coding session",
    "First day of vacation",
    "Just finished a great workout",
];

/// Inference collaborator.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> EmojidexResult<String>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for Arc<C> {
    fn complete(&self, prompt: &str) -> EmojidexResult<String> {
        (**self).complete(prompt)
    }
}

impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    fn complete(&self, prompt: &str) -> EmojidexResult<String> {
        (**self).complete(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Suggest,
    Sentiment,
    Combine,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Suggest, Mode::Sentiment, Mode::Combine];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Suggest => "suggest",
            Mode::Sentiment => "sentiment",
            Mode::Combine => "combine",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Mode::Suggest => Mode::Sentiment,
            Mode::Sentiment => Mode::Combine,
            Mode::Combine => Mode::Suggest,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = EmojidexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EmojidexError::invalid_input(s, "expected suggest, sentiment or combine"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub emoji: &'static Emoji,
    pub reason: String,
    /// 1-10
    pub relevance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Emotion {
    pub name: String,
    /// 0-100
    pub intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentiment {
    pub overall: String,
    /// 0-100
    pub confidence: u8,
    pub emotions: Vec<Emotion>,
    pub tone: String,
    pub emojis: Vec<&'static Emoji>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    /// 2-4 emoji
    pub emojis: Vec<&'static Emoji>,
    pub meaning: String,
    pub usage: String,
    /// 1-10
    pub popularity: u8,
}

impl Combination {
    pub fn glyphs(&self) -> String {
        self.emojis.iter().map(|e| e.glyph).collect()
    }
}

/// A validated reply in any mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiReply {
    Suggestions(Vec<Suggestion>),
    Sentiment(Sentiment),
    Combinations(Vec<Combination>),
}

impl AiReply {
    pub fn mode(&self) -> Mode {
        match self {
            AiReply::Suggestions(_) => Mode::Suggest,
            AiReply::Sentiment(_) => Mode::Sentiment,
            AiReply::Combinations(_) => Mode::Combine,
        }
    }

    /// One emoji per selectable row: each suggestion, each suggested emoji of
    /// the analysis, or the lead emoji of each combination.
    pub fn emojis(&self) -> Vec<&'static Emoji> {
        match self {
            AiReply::Suggestions(items) => items.iter().map(|s| s.emoji).collect(),
            AiReply::Sentiment(analysis) => analysis.emojis.clone(),
            AiReply::Combinations(items) => items.iter().map(|c| c.emojis[0]).collect(),
        }
    }
}

#[derive(Serialize)]
struct PromptEntry<'a> {
    emoji: &'a str,
    name: &'a str,
    category: Category,
    keywords: &'a [&'a str],
    codepoint: &'a str,
}

/// Builds the full prompt for `mode`, embedding the catalog as JSON.
pub fn build_prompt(mode: Mode, text: &str, catalog: &Catalog) -> String {
    let entries: Vec<PromptEntry<'_>> = catalog
        .all()
        .iter()
        .map(|e| PromptEntry {
            emoji: e.glyph,
            name: e.name,
            category: e.category,
            keywords: e.keywords,
            codepoint: e.codepoint,
        })
        .collect();
    let database = serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string());

    let (task, format) = match mode {
        Mode::Suggest => (
            format!(
                "Analyze this text and suggest the {SUGGESTION_COUNT} most relevant emojis from the provided emoji list."
            ),
            format!(
                r#"Return EXACTLY {SUGGESTION_COUNT} emoji suggestions as a JSON object with a single property "suggestions" containing an array of objects with:
- codepoint: the emoji's codepoint from the database (string)
- reason: ONE short sentence (max 10 words) why this emoji fits the text
- relevance: integer score 1-10 based on how well it matches

Format:
{{"suggestions": [{{"codepoint": "U+1F600", "reason": "Expresses happiness and joy", "relevance": 9}}]}}"#
            ),
        ),
        Mode::Sentiment => (
            "Analyze the sentiment and emotions of this text and pick fitting emojis from the provided emoji list."
                .to_string(),
            r#"Return a JSON object with a single property "analysis" containing:
- overall: one word for the overall sentiment (positive, negative, neutral or mixed)
- confidence: integer 0-100
- emotions: array of {"name": string, "intensity": integer 0-100}
- tone: a short phrase describing the tone
- suggestedEmojis: array of codepoints from the database

Format:
{"analysis": {"overall": "positive", "confidence": 85, "emotions": [{"name": "joy", "intensity": 90}], "tone": "celebratory", "suggestedEmojis": ["U+1F600"]}}"#
                .to_string(),
        ),
        Mode::Combine => (
            "Suggest creative emoji combinations that express this text, using only the provided emoji list."
                .to_string(),
            r#"Return a JSON object with a single property "combinations" containing an array of objects with:
- codepoints: array of 2 to 4 codepoints from the database
- meaning: what the combination expresses
- usage: a short example of when to use it
- popularity: integer score 1-10

Format:
{"combinations": [{"codepoints": ["U+1F525", "U+1F4AF"], "meaning": "Absolutely on fire", "usage": "Reacting to a great result", "popularity": 8}]}"#
                .to_string(),
        ),
    };

    format!(
        "You are an expert at understanding context and emotions to suggest the most relevant emojis.\n\n\
         {task}\n\n\
         TEXT: \"{text}\"\n\n\
         EMOJI DATABASE (JSON array of objects with emoji, name, category, keywords, codepoint):\n\
         {database}\n\n\
         {format}\n\n\
         Return ONLY valid JSON, no other text."
    )
}

#[derive(Deserialize)]
struct SuggestionsReply {
    suggestions: Vec<RawSuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    codepoint: String,
    reason: String,
    relevance: u8,
}

#[derive(Deserialize)]
struct SentimentReply {
    analysis: RawAnalysis,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    overall: String,
    confidence: u8,
    emotions: Vec<Emotion>,
    tone: String,
    suggested_emojis: Vec<CodepointRef>,
}

/// `suggestedEmojis` entries may be bare codepoints or suggestion-like objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodepointRef {
    Bare(String),
    Tagged { codepoint: String },
}

impl CodepointRef {
    fn as_str(&self) -> &str {
        match self {
            CodepointRef::Bare(cp) | CodepointRef::Tagged { codepoint: cp } => cp,
        }
    }
}

#[derive(Deserialize)]
struct CombinationsReply {
    combinations: Vec<RawCombination>,
}

#[derive(Deserialize)]
struct RawCombination {
    codepoints: Vec<String>,
    meaning: String,
    usage: String,
    popularity: u8,
}

/// Drops a surrounding markdown code fence, if any.
fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn decode<T: DeserializeOwned>(reply: &str) -> EmojidexResult<T> {
    let body = strip_fence(reply);
    serde_json::from_str(body).map_err(|e| {
        EmojidexError::parse_at(body, e.line(), e.column(), e.to_string()).into()
    })
}

fn check_range(reply: &str, field: &str, value: u8, min: u8, max: u8) -> EmojidexResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(EmojidexError::parse(
            reply,
            format!("{field} {value} is outside {min}-{max}"),
        )
        .into())
    }
}

pub fn parse_suggestions(reply: &str, catalog: &Catalog) -> EmojidexResult<Vec<Suggestion>> {
    let decoded: SuggestionsReply = decode(reply)?;

    let mut suggestions = Vec::with_capacity(decoded.suggestions.len());
    for raw in decoded.suggestions {
        check_range(reply, "relevance", raw.relevance, 1, 10)?;
        match catalog.find(&raw.codepoint) {
            Some(emoji) if !suggestions.iter().any(|s: &Suggestion| s.emoji == emoji) => {
                suggestions.push(Suggestion {
                    emoji,
                    reason: raw.reason,
                    relevance: raw.relevance,
                });
            }
            Some(_) => {}
            None => debug!(codepoint = %raw.codepoint, "discarding unknown codepoint"),
        }
    }

    if suggestions.is_empty() {
        return Err(EmojidexError::no_results(reply).into());
    }
    suggestions.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    Ok(suggestions)
}

pub fn parse_sentiment(reply: &str, catalog: &Catalog) -> EmojidexResult<Sentiment> {
    let SentimentReply { analysis } = decode(reply)?;

    check_range(reply, "confidence", analysis.confidence, 0, 100)?;
    for emotion in &analysis.emotions {
        check_range(reply, "intensity", emotion.intensity, 0, 100)?;
    }

    let mut emojis: Vec<&'static Emoji> = Vec::new();
    for reference in &analysis.suggested_emojis {
        if let Some(emoji) = catalog.find(reference.as_str()) {
            if !emojis.contains(&emoji) {
                emojis.push(emoji);
            }
        }
    }

    Ok(Sentiment {
        overall: analysis.overall,
        confidence: analysis.confidence,
        emotions: analysis.emotions,
        tone: analysis.tone,
        emojis,
    })
}

pub fn parse_combinations(reply: &str, catalog: &Catalog) -> EmojidexResult<Vec<Combination>> {
    let decoded: CombinationsReply = decode(reply)?;

    let mut combinations = Vec::with_capacity(decoded.combinations.len());
    for raw in decoded.combinations {
        check_range(reply, "popularity", raw.popularity, 1, 10)?;
        if !(2..=4).contains(&raw.codepoints.len()) {
            return Err(EmojidexError::parse(
                reply,
                format!("combination has {} codepoints, expected 2-4", raw.codepoints.len()),
            )
            .into());
        }

        // A combination with any unknown member is dropped whole.
        let emojis: Option<Vec<_>> = raw.codepoints.iter().map(|cp| catalog.find(cp)).collect();
        match emojis {
            Some(emojis) => combinations.push(Combination {
                emojis,
                meaning: raw.meaning,
                usage: raw.usage,
                popularity: raw.popularity,
            }),
            None => debug!(codepoints = ?raw.codepoints, "discarding combination with unknown codepoint"),
        }
    }

    if combinations.is_empty() {
        return Err(EmojidexError::no_results(reply).into());
    }
    combinations.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    Ok(combinations)
}

/// Prompt construction, client call and reply validation for one catalog.
#[derive(Debug, Clone)]
pub struct SuggestionAdapter<C> {
    client: C,
    catalog: Catalog,
}

impl<C: CompletionClient> SuggestionAdapter<C> {
    pub fn new(client: C, catalog: Catalog) -> Self {
        Self { client, catalog }
    }

    fn ask(&self, mode: Mode, text: &str) -> EmojidexResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmojidexError::invalid_input(text, "please enter a prompt").into());
        }
        debug!(%mode, chars = text.len(), "requesting completion");
        self.client.complete(&build_prompt(mode, text, &self.catalog))
    }

    pub fn suggest(&self, text: &str) -> EmojidexResult<Vec<Suggestion>> {
        let reply = self.ask(Mode::Suggest, text)?;
        parse_suggestions(&reply, &self.catalog)
    }

    pub fn analyze(&self, text: &str) -> EmojidexResult<Sentiment> {
        let reply = self.ask(Mode::Sentiment, text)?;
        parse_sentiment(&reply, &self.catalog)
    }

    pub fn combine(&self, text: &str) -> EmojidexResult<Vec<Combination>> {
        let reply = self.ask(Mode::Combine, text)?;
        parse_combinations(&reply, &self.catalog)
    }

    pub fn run(&self, mode: Mode, text: &str) -> EmojidexResult<AiReply> {
        match mode {
            Mode::Suggest => self.suggest(text).map(AiReply::Suggestions),
            Mode::Sentiment => self.analyze(text).map(AiReply::Sentiment),
            Mode::Combine => self.combine(text).map(AiReply::Combinations),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

const SYSTEM_PROMPT: &str = "You reply with a single JSON object and nothing else.";

/// Messages-API client over blocking HTTP.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl HttpCompletionClient {
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> EmojidexResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmojidexError::network(&config.endpoint, e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, prompt: &str) -> EmojidexResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .map_err(|e| EmojidexError::network(&self.endpoint, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EmojidexError::network(&self.endpoint, e.to_string()))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("request failed with status {}", status));
            return Err(EmojidexError::network(&self.endpoint, msg).into());
        }

        let decoded: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            EmojidexError::parse_at(body.as_str(), e.line(), e.column(), e.to_string())
        })?;

        Ok(decoded
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

/// Work item for [`run_worker`]
#[derive(Debug, Clone)]
pub struct AiRequest {
    pub seq: u64,
    pub mode: Mode,
    pub text: String,
}

/// Result of an [`AiRequest`], delivered as [`Event::Custom`]
#[derive(Debug, Clone)]
pub struct AiOutcome {
    pub seq: u64,
    pub result: Result<AiReply, String>,
}

/// How often an idle worker checks for shutdown
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Serves requests until the sending side closes or the event handler stops.
pub async fn run_worker<C>(
    adapter: Arc<SuggestionAdapter<C>>,
    requests: async_channel::Receiver<AiRequest>,
    events: Arc<EventHandler>,
) -> EmojidexResult<()>
where
    C: CompletionClient + 'static,
{
    loop {
        let next = requests
            .recv()
            .or(async {
                while events.is_running() {
                    smol::Timer::after(SHUTDOWN_POLL).await;
                }
                Err(async_channel::RecvError)
            })
            .await;
        let Ok(AiRequest { seq, mode, text }) = next else {
            break;
        };

        let adapter = adapter.clone();
        let result = smol::unblock(move || adapter.run(mode, &text)).await;

        if let Err(e) = &result {
            warn!(seq, %mode, error = %e, "ai request failed");
        }
        let outcome = AiOutcome {
            seq,
            result: result.map_err(|e| e.to_string()),
        };
        // A full channel loses this outcome only; the session sees the next one.
        if let Err(e) = events.try_send(Event::custom(outcome)) {
            warn!(seq, error = %e, "dropping ai outcome");
        }
    }

    Ok(())
}
