//! Plugin state and method dispatch

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::protocol::{Request, Response, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::command::handle_brain_command;
use crate::config::Config;
use crate::patterns::PatternEngine;
use crate::prompt::PromptInjector;
use crate::tool::{self, ToolContext, TOOL_DESCRIPTION, TOOL_NAME};

const PROTOCOL_VERSION: &str = "2024-11-05";
const DISABLED_TEXT: &str = "🧠 BrainGuard is disabled.";

/// Everything the host talks to: engine, prompt counters, lifecycle
pub struct BrainGuardPlugin {
    enabled: bool,
    engine: PatternEngine,
    injector: PromptInjector,
    running: bool,
}

impl BrainGuardPlugin {
    pub fn new(config: &Config, engine: PatternEngine) -> Self {
        Self {
            enabled: config.enabled,
            engine,
            injector: PromptInjector::new(config.reminder_interval),
            running: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = PatternEngine::from_config(config)?;
        if !config.enabled {
            info!("BrainGuard disabled by config; no tools or hooks registered");
        }
        Ok(Self::new(config, engine))
    }

    /// False once the host has sent `hooks/shutdown`
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> &PatternEngine {
        &self.engine
    }

    pub fn handle(&mut self, req: &Request) -> Response {
        debug!(method = %req.method, "Host request");
        let id = req.id.clone();
        match req.method.as_str() {
            "initialize" => Response::success(id, self.initialize()),
            "initialized" => Response::success(id, json!({})),
            "tools/list" => Response::success(id, self.list_tools()),
            "tools/call" => self.call_tool(req),
            "hooks/before_turn" => Response::success(id, self.before_turn(&req.params)),
            "hooks/session_end" => Response::success(id, self.session_end(&req.params)),
            "hooks/shutdown" => {
                self.shutdown();
                Response::success(id, json!({}))
            }
            "commands/brain" => Response::success(id, self.brain_command(&req.params)),
            _ => Response::error(id, METHOD_NOT_FOUND, "Method not found"),
        }
    }

    fn initialize(&self) -> Value {
        let hooks: &[&str] = if self.enabled {
            &["before_turn", "session_end", "shutdown"]
        } else {
            &[]
        };
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "hooks": hooks,
                "commands": ["brain"]
            },
            "serverInfo": {
                "name": "brain-guard",
                "version": env!("CARGO_PKG_VERSION"),
                "storage": self.engine.backend_name()
            }
        })
    }

    fn list_tools(&self) -> Value {
        if !self.enabled {
            return json!({ "tools": [] });
        }
        json!({
            "tools": [{
                "name": TOOL_NAME,
                "description": TOOL_DESCRIPTION,
                "inputSchema": tool::schema()
            }]
        })
    }

    fn call_tool(&mut self, req: &Request) -> Response {
        let name = req
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if !self.enabled || name != TOOL_NAME {
            return Response::error(
                req.id.clone(),
                INVALID_PARAMS,
                &format!("Unknown tool: {}", name),
            );
        }

        let args = req.params.get("arguments").cloned().unwrap_or_default();
        let ctx = ToolContext {
            session_key: str_param(&req.params, "sessionKey"),
        };
        let result = tool::handle_tool(&mut self.engine, &args, &ctx);
        let is_error = result["success"] == false;

        Response::success(
            req.id.clone(),
            json!({
                "content": [{ "type": "text", "text": result.to_string() }],
                "isError": is_error
            }),
        )
    }

    fn before_turn(&mut self, params: &Value) -> Value {
        if !self.enabled {
            return json!({});
        }
        let session = str_param(params, "sessionKey");
        match self.injector.before_turn(session.as_deref()) {
            Some(prompt) => json!({ "systemPrompt": prompt }),
            None => json!({}),
        }
    }

    fn session_end(&mut self, params: &Value) -> Value {
        if let Some(session) = str_param(params, "sessionId") {
            self.injector.end_session(&session);
        }
        json!({})
    }

    fn shutdown(&mut self) {
        info!("Host shutdown; closing pattern store");
        self.engine.close();
        self.running = false;
    }

    fn brain_command(&self, params: &Value) -> Value {
        if !self.enabled {
            return json!({ "text": DISABLED_TEXT });
        }
        let args = str_param(params, "args");
        let text = match handle_brain_command(&self.engine, args.as_deref()) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "/brain failed");
                format!("🧠 BrainGuard error: {:#}", e)
            }
        };
        json!({ "text": text })
    }
}

fn str_param(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(String::from)
}
