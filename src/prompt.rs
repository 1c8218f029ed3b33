//! System-prompt injection with per-session turn counting
//!
//! A session gets the full methodology on its first turn and a one-line
//! reminder every `reminder_interval` turns after that. Counters live here and
//! nowhere else; the host's session-end hook removes them.

use std::collections::HashMap;
use tracing::debug;

const DEFAULT_SESSION: &str = "default";

pub const INITIAL_PROMPT: &str = r#"## BrainGuard - Cognitive Health Monitor

You have access to the `brain_guard` tool to protect the user's cognitive autonomy.

### Philosophy
AI assistants can create cognitive dependency. Your role: help without creating dependency. Guide rather than do.

### Patterns to watch
- **delegation**: "Do it for me" with no prior effort
- **no_reflection**: Direct question with no visible thinking
- **repetitive**: The same kind of request over and over
- **vocabulary**: Impoverished language
- **clarity**: Difficulty expressing the request clearly

### When you detect a pattern
1. Call `brain_guard({ action: "search", type: "...", days: 7 })`
2. If recurrent (several matches, trend up) → prefer guiding
3. Call `brain_guard({ action: "record", pattern: "...", message: "..." })` to record it

### How to respond
- Isolated pattern: answer normally
- Recurrent pattern: offer a guided approach
- Never judge, never block"#;

pub const REMINDER_PROMPT: &str = "BrainGuard reminder: watch for cognitive patterns (delegation, reflection, vocabulary, clarity). Use the brain_guard tool when relevant.";

/// Owner of the per-session message counters
#[derive(Debug)]
pub struct PromptInjector {
    reminder_interval: u32,
    sessions: HashMap<String, u32>,
}

impl PromptInjector {
    pub fn new(reminder_interval: u32) -> Self {
        Self {
            // zero behaves as 1
            reminder_interval: reminder_interval.max(1),
            sessions: HashMap::new(),
        }
    }

    /// Count one turn for `session_key` and return what to inject, if anything
    pub fn before_turn(&mut self, session_key: Option<&str>) -> Option<&'static str> {
        let key = session_key.unwrap_or(DEFAULT_SESSION);
        let count = self.sessions.entry(key.to_string()).or_insert(0);
        let seen = *count;
        *count += 1;

        if seen == 0 {
            Some(INITIAL_PROMPT)
        } else if seen % self.reminder_interval == 0 {
            Some(REMINDER_PROMPT)
        } else {
            None
        }
    }

    /// Drop the counter for a finished session
    pub fn end_session(&mut self, session_key: &str) {
        if self.sessions.remove(session_key).is_some() {
            debug!(session = session_key, "Cleared session prompt state");
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for PromptInjector {
    fn default() -> Self {
        Self::new(10)
    }
}
