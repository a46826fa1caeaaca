//! Request hosting: turns JSON lines into skill invocations.
//!
//! `exec`, `batch`, and `stdio` all funnel through [`handle_line`], so a
//! malformed line produces an `INVALID_REQUEST` envelope instead of aborting
//! the process. An optional `context` object inside a request is passed to
//! the skill as its [`SkillContext`].

use std::path::Path;

use anyhow::Context;
use console::style;
use maestro_core::event::EventBus;
use maestro_core::skill::Skill;
use maestro_types::error::OrchestrationError;
use maestro_types::skill::{SkillContext, SkillResponse};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Parse one request line into a params object.
pub fn parse_request(line: &str) -> Result<Value, OrchestrationError> {
    match serde_json::from_str::<Value>(line) {
        Ok(params @ Value::Object(_)) => Ok(params),
        Ok(_) => Err(OrchestrationError::InvalidRequest(
            "request must be a JSON object".to_string(),
        )),
        Err(e) => Err(OrchestrationError::InvalidRequest(e.to_string())),
    }
}

fn context_of(params: &Value) -> SkillContext {
    params
        .get("context")
        .cloned()
        .and_then(|ctx| serde_json::from_value(ctx).ok())
        .unwrap_or_default()
}

/// Run one request line through `skill`.
pub async fn handle_line<S: Skill>(skill: &S, line: &str) -> SkillResponse {
    match parse_request(line) {
        Ok(params) => {
            let context = context_of(&params);
            skill.execute(&params, &context).await
        }
        Err(e) => {
            tracing::debug!("rejecting request line: {e}");
            SkillResponse::failure(None, &e)
        }
    }
}

pub fn render(response: &SkillResponse, pretty: bool) -> anyhow::Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    Ok(rendered)
}

/// Answer every non-blank line of `reader` with one envelope on `writer`.
///
/// Returns the number of requests handled.
pub async fn serve_lines<S, R, W>(
    skill: &S,
    reader: R,
    writer: &mut W,
    pretty: bool,
) -> anyhow::Result<usize>
where
    S: Skill,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(skill, line).await;
        let mut out = render(&response, pretty)?;
        out.push('\n');
        writer
            .write_all(out.as_bytes())
            .await
            .context("failed to write response")?;
        writer.flush().await.context("failed to flush response")?;
        handled += 1;
    }

    Ok(handled)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub async fn exec(state: &AppState, request: &str, pretty: bool) -> anyhow::Result<()> {
    let response = handle_line(state.skill.as_ref(), request).await;
    println!("{}", render(&response, pretty)?);
    Ok(())
}

pub async fn batch(state: &AppState, file: &Path, pretty: bool) -> anyhow::Result<()> {
    let handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;
    let mut stdout = tokio::io::stdout();

    let handled = serve_lines(state.skill.as_ref(), BufReader::new(handle), &mut stdout, pretty).await?;
    tracing::info!(file = %file.display(), requests = handled, "batch finished");
    Ok(())
}

pub async fn stdio(state: &AppState, pretty: bool, events: bool) -> anyhow::Result<()> {
    tracing::info!(
        data_dir = %state.data_dir.display(),
        max_parallel_steps = state.config.max_parallel_steps,
        events,
        "serving requests on stdin"
    );
    let echo = events.then(|| spawn_event_echo(&state.event_bus));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let result = serve_lines(state.skill.as_ref(), stdin, &mut stdout, pretty).await;

    if let Some(echo) = echo {
        echo.abort();
    }

    let handled = result?;
    tracing::info!(requests = handled, "stdin closed");
    Ok(())
}

fn spawn_event_echo(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let line = serde_json::to_string(&event).unwrap_or_default();
                    eprintln!("{} {line}", style("event").cyan().bold());
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event echo fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
