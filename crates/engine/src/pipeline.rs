//! Pipeline: validates the input against each requested tool, runs the
//! survivors concurrently under per-tool timeouts and collects one output per
//! tool in registration order.

use adcopy_core::error::{PipelineFailure, ToolError};
use adcopy_core::types::{ErrorKind, ToolCategory, ToolInput, ToolOutput};
use adcopy_tools::registry::ToolRegistry;
use adcopy_tools::tool::Tool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs tools from a shared, read-only registry.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Arc<ToolRegistry>,
}

enum Planned {
    Scheduled {
        tool: Arc<dyn Tool>,
        timeout: Duration,
    },
    Done(ToolOutput),
}

impl Pipeline {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run the requested tools (every registered tool when `requested` is
    /// `None`) and return one output per tool.
    ///
    /// Registered tools come back in registration order; requested names that
    /// are not registered are appended in request order as `not_registered`
    /// failures. Every scheduled tool reaches a terminal state before this
    /// returns. Cancelling `cancel` aborts whatever is still in flight.
    pub async fn execute(
        &self,
        input: Arc<ToolInput>,
        requested: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Vec<ToolOutput> {
        let start = Instant::now();
        let plan = self.plan(&input, requested);
        let total = plan.len();

        let mut slots: Vec<Option<ToolOutput>> = Vec::with_capacity(total);
        let mut tasks = JoinSet::new();
        let mut names = Vec::with_capacity(total);

        for (slot, (name, planned)) in plan.into_iter().enumerate() {
            names.push(name);
            match planned {
                Planned::Done(output) => slots.push(Some(output)),
                Planned::Scheduled { tool, timeout } => {
                    slots.push(None);
                    let input = input.clone();
                    let token = cancel.clone();
                    tasks.spawn(async move { (slot, run_bounded(tool, input, timeout, token).await) });
                }
            }
        }

        info!(
            request_id = %input.request_id,
            tools = total,
            scheduled = tasks.len(),
            "Pipeline started"
        );

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, output)) => slots[slot] = Some(output),
                Err(e) => warn!(error = %e, "Tool task terminated abnormally"),
            }
        }

        let outputs: Vec<ToolOutput> = slots
            .into_iter()
            .zip(names)
            .map(|(output, name)| {
                output.unwrap_or_else(|| {
                    ToolOutput::failed(
                        name,
                        ToolCategory::Analyzer,
                        input.request_id,
                        ErrorKind::Execution,
                        "tool task terminated before producing an output",
                        start.elapsed(),
                    )
                })
            })
            .collect();

        for output in outputs.iter().filter(|o| !o.success) {
            warn!(
                request_id = %input.request_id,
                tool = %output.tool_name,
                kind = ?output.error_kind,
                error = output.error_message.as_deref().unwrap_or_default(),
                "Tool did not succeed"
            );
        }

        let succeeded = outputs.iter().filter(|o| o.is_usable()).count();
        info!(
            request_id = %input.request_id,
            succeeded,
            failed = outputs.len() - succeeded,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline finished"
        );
        outputs
    }

    /// [`execute`](Self::execute), then surface total failure as a typed
    /// pipeline failure.
    pub async fn run(
        &self,
        input: Arc<ToolInput>,
        requested: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ToolOutput>, PipelineFailure> {
        let outputs = self.execute(input, requested, cancel).await;
        if cancel.is_cancelled() {
            return Err(PipelineFailure::cancelled());
        }
        if !outputs.iter().any(|o| o.is_usable()) {
            return Err(PipelineFailure::insufficient_data(format!(
                "none of the {} requested tools produced a usable score",
                outputs.len()
            )));
        }
        Ok(outputs)
    }

    fn plan(&self, input: &ToolInput, requested: Option<&[String]>) -> Vec<(String, Planned)> {
        let wanted: Option<HashSet<&str>> =
            requested.map(|names| names.iter().map(|n| n.trim()).collect());

        let mut plan: Vec<(String, Planned)> = self
            .registry
            .list(None)
            .into_iter()
            .filter(|entry| {
                wanted
                    .as_ref()
                    .map_or(true, |w| w.contains(entry.config.name.as_str()))
            })
            .map(|entry| {
                let name = entry.config.name.clone();
                let planned = match entry.tool.validate_input(input) {
                    Ok(()) => Planned::Scheduled {
                        tool: entry.tool.clone(),
                        timeout: entry.config.timeout(),
                    },
                    Err(err) => {
                        debug!(tool = %name, error = %err, "Tool skipped by validation");
                        Planned::Done(ToolOutput::failed(
                            &name,
                            entry.config.category,
                            input.request_id,
                            ErrorKind::Validation,
                            format!("skipped: validation: {err}"),
                            Duration::ZERO,
                        ))
                    }
                };
                (name, planned)
            })
            .collect();

        if let Some(names) = requested {
            let mut seen = HashSet::new();
            for name in names.iter().map(|n| n.trim()) {
                if self.registry.contains(name) || !seen.insert(name) {
                    continue;
                }
                plan.push((
                    name.to_string(),
                    Planned::Done(ToolOutput::failed(
                        name,
                        ToolCategory::Analyzer,
                        input.request_id,
                        ErrorKind::NotRegistered,
                        format!("tool '{name}' is not registered"),
                        Duration::ZERO,
                    )),
                ));
            }
        }
        plan
    }
}

/// One tool execution bounded by its timeout and the shared cancellation
/// token. Losing either race drops the tool's future. A tool that never
/// yields cannot lose the race, so its output only counts if it arrived
/// within the deadline.
async fn run_bounded(
    tool: Arc<dyn Tool>,
    input: Arc<ToolInput>,
    timeout: Duration,
    cancel: CancellationToken,
) -> ToolOutput {
    let start = Instant::now();
    let failed = |err: ToolError, elapsed: Duration| {
        ToolOutput::failed(
            tool.name(),
            tool.category(),
            input.request_id,
            err.kind(),
            err.to_string(),
            elapsed,
        )
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => failed(ToolError::Cancelled, start.elapsed()),
        result = tokio::time::timeout(timeout, tool.run(&input)) => match result {
            Ok(output) if start.elapsed() <= timeout => output,
            _ => {
                let timeout_ms = timeout.as_millis() as u64;
                warn!(tool = %tool.name(), timeout_ms, "Tool timed out");
                failed(ToolError::Timeout { timeout_ms }, start.elapsed())
            }
        },
    }
}
