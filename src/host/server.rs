//! Host bridge - stdio transport

use anyhow::Result;
use std::any::Any;
use std::io::{BufRead, BufReader, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

use super::plugin::BrainGuardPlugin;
use super::protocol::{
    Request, Response, INTERNAL_ERROR, INVALID_REQUEST, JSONRPC_VERSION, PARSE_ERROR,
};
use crate::config::Config;

/// Run the bridge over stdin/stdout until EOF or `hooks/shutdown`
pub fn run_stdio(config: &Config) -> Result<()> {
    let mut plugin = BrainGuardPlugin::from_config(config)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    info!("brain-guard host bridge ready");
    serve(&mut plugin, BufReader::new(stdin.lock()), stdout.lock())
}

/// Line-delimited JSON-RPC loop over any reader/writer pair
pub fn serve<R: BufRead, W: Write>(
    plugin: &mut BrainGuardPlugin,
    reader: R,
    mut writer: W,
) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) if request.jsonrpc != JSONRPC_VERSION => Response::error(
                request.id.clone(),
                INVALID_REQUEST,
                &format!(
                    "Invalid JSON-RPC version: expected 2.0, got {}",
                    request.jsonrpc
                ),
            ),
            Ok(request) => handle_guarded(plugin, &request),
            Err(e) => {
                warn!(error = %e, "Unparseable host request");
                Response::error(None, PARSE_ERROR, &format!("Parse error: {}", e))
            }
        };

        writeln!(writer, "{}", serde_json::to_string(&response)?)?;
        writer.flush()?;

        if !plugin.is_running() {
            break;
        }
    }

    Ok(())
}

/// Dispatch one request; a panic becomes an internal-error response
fn handle_guarded(plugin: &mut BrainGuardPlugin, request: &Request) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| plugin.handle(request))) {
        Ok(response) => response,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(method = %request.method, reason, "Request handler panicked");
            Response::error(
                request.id.clone(),
                INTERNAL_ERROR,
                &format!("Internal error: {}", reason),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
