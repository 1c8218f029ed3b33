//! `brain_guard` tool - the structured surface the host calls
//!
//! Input is loose JSON from the model. Output is always a JSON object; every
//! failure becomes `{ "success": false, "error": "..." }` and never escapes.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::error::GuardError;
use crate::patterns::{
    HistoryResult, PatternEngine, SearchQuery, SearchResponse, DEFAULT_HISTORY_DAYS,
};
use crate::storage::{NewPattern, PatternKind, PreviousMessage};

pub const TOOL_NAME: &str = "brain_guard";
pub const TOOL_DESCRIPTION: &str = "Record and query cognitive patterns for BrainGuard";

/// Entries of the same kind echoed back after a record
const RECORD_ECHO_LIMIT: usize = 5;

/// Raw tool arguments as sent by the model
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolArgs {
    pub action: Option<String>,
    pub pattern: Option<String>,
    pub message: Option<String>,
    pub message_id: Option<String>,
    pub previous_messages: Option<Vec<PreviousMessage>>,
    pub context: Option<String>,
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: Option<u32>,
}

/// Whole days from any JSON number; the fractional part is dropped
fn deserialize_days<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !raw.is_finite() || raw < 0.0 {
        return Err(de::Error::custom(format!(
            "days must be a non-negative number, got {}",
            raw
        )));
    }
    // saturates at u32::MAX
    Ok(Some(raw.trunc() as u32))
}

/// Per-invocation context supplied by the host
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub session_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub success: bool,
    pub recorded: Recorded,
    pub by_type: KindEcho,
    pub similar: Vec<SimilarBrief>,
}

#[derive(Debug, Serialize)]
pub struct Recorded {
    pub id: String,
    pub pattern: PatternKind,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct KindEcho {
    pub count: usize,
    pub entries: Vec<EntryBrief>,
}

#[derive(Debug, Serialize)]
pub struct EntryBrief {
    pub date: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SimilarBrief {
    pub date: DateTime<Utc>,
    pub pattern: PatternKind,
    pub message: String,
    pub similarity: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchToolResponse {
    pub success: bool,
    #[serde(flatten)]
    pub response: SearchResponse,
}

#[derive(Debug, Serialize)]
pub struct HistoryToolResponse {
    pub success: bool,
    pub data: HistoryResult,
}

/// JSON schema advertised to the host
pub fn schema() -> Value {
    let kinds: Vec<&str> = PatternKind::ALL.iter().map(PatternKind::as_str).collect();
    json!({
        "type": "object",
        "properties": {
            "action": { "type": "string", "enum": ["record", "search", "history"] },
            "pattern": { "type": "string", "enum": kinds },
            "message": { "type": "string" },
            "messageId": { "type": "string" },
            "previousMessages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "text": { "type": "string" }
                    },
                    "required": ["id", "text"]
                }
            },
            "context": { "type": "string" },
            "query": { "type": "string" },
            "type": { "type": "string", "enum": kinds },
            "days": { "type": "number", "minimum": 0 }
        },
        "required": ["action"]
    })
}

/// Run one tool call. Never fails.
pub fn handle_tool(engine: &mut PatternEngine, args: &Value, ctx: &ToolContext) -> Value {
    match dispatch(engine, args, ctx) {
        Ok(value) => value,
        Err(e) => json!({ "success": false, "error": format!("{:#}", e) }),
    }
}

fn dispatch(engine: &mut PatternEngine, args: &Value, ctx: &ToolContext) -> Result<Value> {
    let args: ToolArgs = serde_json::from_value(args.clone())
        .map_err(|e| GuardError::invalid(format!("Invalid arguments: {}", e)))?;

    match args.action.as_deref() {
        Some("record") => record(engine, args, ctx),
        Some("search") => search(engine, args),
        Some("history") => history(engine, args),
        Some(other) => Err(GuardError::invalid(format!("Unknown action: {}", other)).into()),
        None => Err(GuardError::invalid("action is required").into()),
    }
}

fn parse_kind(raw: Option<&str>) -> Result<Option<PatternKind>, GuardError> {
    raw.map(str::parse::<PatternKind>).transpose()
}

fn record(engine: &mut PatternEngine, args: ToolArgs, ctx: &ToolContext) -> Result<Value> {
    let kind = parse_kind(args.pattern.as_deref())?
        .ok_or_else(|| GuardError::invalid("pattern is required for record action"))?;
    let message = args
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| GuardError::invalid("message is required for record action"))?;

    let input = NewPattern {
        kind,
        message,
        message_id: args.message_id,
        previous_messages: args.previous_messages,
        context: args.context,
        session_key: ctx.session_key.clone(),
    };

    let outcome = engine.append(input)?;
    let same_kind = engine.get_history(Some(kind), DEFAULT_HISTORY_DAYS)?;

    let response = RecordResponse {
        success: true,
        recorded: Recorded {
            id: outcome.record.id.clone(),
            pattern: outcome.record.kind,
            message: outcome.record.message.clone(),
        },
        by_type: KindEcho {
            count: same_kind.summary.count,
            entries: same_kind
                .entries
                .into_iter()
                .take(RECORD_ECHO_LIMIT)
                .map(|e| EntryBrief {
                    date: e.date,
                    message: e.message,
                })
                .collect(),
        },
        similar: outcome
            .similar
            .into_iter()
            .map(|s| SimilarBrief {
                date: s.record.timestamp,
                pattern: s.record.kind,
                message: s.record.message,
                similarity: s.similarity,
            })
            .collect(),
    };

    Ok(serde_json::to_value(response)?)
}

fn search(engine: &mut PatternEngine, args: ToolArgs) -> Result<Value> {
    let query = SearchQuery {
        query: args.query,
        kind: parse_kind(args.kind.as_deref())?,
        days: args.days,
    };

    let response = engine.search(&query)?;
    Ok(serde_json::to_value(SearchToolResponse {
        success: true,
        response,
    })?)
}

fn history(engine: &mut PatternEngine, args: ToolArgs) -> Result<Value> {
    let kind = parse_kind(args.pattern.as_deref().or(args.kind.as_deref()))?;
    let days = args.days.unwrap_or(DEFAULT_HISTORY_DAYS);

    let data = engine.get_history(kind, days)?;
    Ok(serde_json::to_value(HistoryToolResponse {
        success: true,
        data,
    })?)
}
