//! Conversation orchestrator use case.
//!
//! Drives the round loop between a model and the available tools:
//!
//! ```text
//! ┌──────────────────────┐  tool calls   ┌────────────────────────────┐
//! │ collect_model_response│─────────────▶│ execute_tools_round         │
//! └──────────▲───────────┘               │  cache → invoke → recover   │
//!            │        results appended   └─────────────┬──────────────┘
//!            └─────────────────────────────────────────┘
//!   no tool calls → Completed      round ceiling → one tool-less request
//! ```
//!
//! Rounds advance strictly one after another. Within a round the first attempt
//! of every call may run concurrently (`parallel_tool_calls`); failures are then
//! handled and results appended in request order.

mod types;

pub use types::{
    ConversationOutcome, ConversationRequest, OrchestratorError, RoundRecord, StopReason,
    ToolCallRecord,
};

use crate::config::OrchestratorParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::llm_gateway::{LlmGateway, RequestOptions};
use crate::ports::progress::ConversationProgress;
use crate::ports::tool_invoker::{InvocationError, ToolInvokerPort};
use crate::services::{ErrorRecoveryEngine, ExecutionRegistry, ToolResultManager};
use crate::use_cases::shared::{ResponseError, send_cancellable};
use crate::use_cases::tool_helpers::{task_description_for, tool_args_preview};
use relay_domain::{
    Conversation, ConversationId, ErrorKind, ExecutionId, ExecutionRecord, Message,
    RecoveryStrategy, ToolCall, ToolCallContext, ToolCallStatus, ToolError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Round-based tool-calling loop over shared cache, recovery and registry services.
pub struct ConversationOrchestrator<G: LlmGateway + 'static, T: ToolInvokerPort + 'static> {
    gateway: Arc<G>,
    tools: Arc<T>,
    cache: Arc<ToolResultManager>,
    recovery: Arc<ErrorRecoveryEngine>,
    registry: ExecutionRegistry,
    params: OrchestratorParams,
    logger: Arc<dyn ConversationLogger>,
}

impl<G, T> Clone for ConversationOrchestrator<G, T>
where
    G: LlmGateway + 'static,
    T: ToolInvokerPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tools: self.tools.clone(),
            cache: self.cache.clone(),
            recovery: self.recovery.clone(),
            registry: self.registry.clone(),
            params: self.params.clone(),
            logger: self.logger.clone(),
        }
    }
}

/// Result of the first invocation attempt of one call.
enum FirstAttempt {
    Cached(String),
    Invoked(InvokeOutcome),
    /// Name did not resolve; no invocation happened
    Unknown(ToolError),
}

enum InvokeOutcome {
    Output(String),
    Failed(ToolError),
    Cancelled,
}

/// What is known about a call once its name has been resolved.
struct CallMeta {
    tool_name: String,
    asynchronous: bool,
    execution_id: Option<ExecutionId>,
    started: Instant,
}

impl CallMeta {
    fn record(
        &self,
        call: &ToolCall,
        status: ToolCallStatus,
        output: String,
        attempts: u32,
        kind: Option<ErrorKind>,
    ) -> ToolCallRecord {
        ToolCallRecord {
            call_id: call.call_id.clone(),
            requested_name: call.tool_name.clone(),
            tool_name: self.tool_name.clone(),
            status,
            output,
            attempts,
            duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            error_kind: kind,
            execution_id: self.execution_id.clone(),
        }
    }
}

struct PreparedCall {
    meta: CallMeta,
    attempt: FirstAttempt,
}

enum CallResolution {
    Resolved(ToolCallRecord, Message),
    Halted(ToolCallRecord, Message, String),
    Cancelled,
}

#[derive(Default)]
struct RoundExecution {
    records: Vec<ToolCallRecord>,
    messages: Vec<Message>,
    halted: Option<String>,
    cancelled: bool,
}

impl<G, T> ConversationOrchestrator<G, T>
where
    G: LlmGateway + 'static,
    T: ToolInvokerPort + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        tools: Arc<T>,
        cache: Arc<ToolResultManager>,
        recovery: Arc<ErrorRecoveryEngine>,
        registry: ExecutionRegistry,
    ) -> Self {
        Self {
            gateway,
            tools,
            cache,
            recovery,
            registry,
            params: OrchestratorParams::default(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_params(mut self, params: OrchestratorParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &OrchestratorParams {
        &self.params
    }

    /// Run one conversation to completion.
    ///
    /// Only precondition failures return `Err`. Model failures, halts and
    /// cancellation all produce an outcome carrying whatever was accumulated.
    pub async fn run(
        &self,
        request: ConversationRequest,
        progress: &dyn ConversationProgress,
        cancel: &CancellationToken,
    ) -> Result<ConversationOutcome, OrchestratorError> {
        if request.user_intent.trim().is_empty() {
            return Err(OrchestratorError::InvalidRequest(
                "user intent is empty".to_string(),
            ));
        }
        if self.params.max_rounds == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }

        let ConversationRequest {
            user_intent,
            history,
            conversation_id,
            justification,
        } = request;
        let conversation_id = conversation_id.unwrap_or_else(ConversationId::generate);

        let mut conversation = Conversation::from_history(history);
        if conversation.is_empty()
            && let Some(prompt) = &self.params.system_prompt
        {
            conversation.push(Message::system(prompt.as_str()));
        }
        conversation.push(Message::user(user_intent.as_str()));

        let spec = self.tools.tool_spec();
        let tool_options =
            RequestOptions::with_tools(spec.to_api_tools()).with_justification(justification.clone());
        let max_rounds = self.params.max_rounds;

        info!(
            conversation_id = %conversation_id,
            tools = spec.len(),
            max_rounds,
            "Starting conversation"
        );

        let mut rounds: Vec<RoundRecord> = Vec::new();
        let mut previous_results: HashMap<String, String> = HashMap::new();
        let mut error_count = 0usize;
        let mut final_text = String::new();
        let mut round_number = 0u32;

        let stop_reason = loop {
            if round_number >= max_rounds {
                info!(round_number, "Round ceiling reached; requesting final summary");
                progress.on_final_summary();
                self.logger.log(ConversationEvent::new(
                    event_types::FINAL_SUMMARY,
                    json!({ "conversation_id": conversation_id.as_str(), "rounds": round_number }),
                ));

                let options = RequestOptions::without_tools().with_justification(justification.clone());
                match self
                    .collect_model_response(conversation.messages(), &options, progress, cancel)
                    .await
                {
                    Ok(response) => {
                        if !response.tool_calls.is_empty() {
                            warn!(
                                count = response.tool_calls.len(),
                                "Ignoring tool calls in the final summary response"
                            );
                        }
                        conversation.push(Message::assistant(response.text.as_str()));
                        rounds.push(RoundRecord {
                            round_number: round_number + 1,
                            text: response.text.clone(),
                            tool_calls: Vec::new(),
                            final_summary: true,
                        });
                        final_text = response.text;
                        break StopReason::RoundCeiling;
                    }
                    Err(ResponseError::Cancelled) => break StopReason::Cancelled,
                    Err(ResponseError::Model(message)) => break StopReason::ModelError { message },
                }
            }

            round_number += 1;
            debug!(round_number, max_rounds, "Starting round");
            progress.on_round_start(round_number, max_rounds);
            self.logger.log(ConversationEvent::new(
                event_types::ROUND_STARTED,
                json!({
                    "conversation_id": conversation_id.as_str(),
                    "round": round_number,
                    "messages": conversation.len(),
                }),
            ));

            let response = match self
                .collect_model_response(conversation.messages(), &tool_options, progress, cancel)
                .await
            {
                Ok(response) => response,
                Err(ResponseError::Cancelled) => break StopReason::Cancelled,
                Err(ResponseError::Model(message)) => {
                    warn!(round_number, "Model request failed: {}", message);
                    break StopReason::ModelError { message };
                }
            };
            final_text = response.text.clone();

            if response.tool_calls.is_empty() {
                conversation.push(Message::assistant(response.text.as_str()));
                rounds.push(RoundRecord {
                    round_number,
                    text: response.text,
                    tool_calls: Vec::new(),
                    final_summary: false,
                });
                break StopReason::Completed;
            }

            conversation.push(Message::assistant_with_tool_calls(
                response.text.as_str(),
                response.tool_calls.clone(),
            ));
            let context = ToolCallContext::new(conversation_id.clone(), user_intent.as_str())
                .with_tools(spec.all().to_vec())
                .with_history(conversation.messages().to_vec())
                .with_previous_results(previous_results.clone())
                .with_round(round_number);

            let round = self
                .execute_tools_round(&response.tool_calls, &context, &mut error_count, progress, cancel)
                .await;

            for record in &round.records {
                if matches!(
                    record.status,
                    ToolCallStatus::Succeeded | ToolCallStatus::Cached | ToolCallStatus::Delegated
                ) {
                    previous_results.insert(record.call_id.clone(), record.output.clone());
                }
            }
            conversation.extend(round.messages);
            rounds.push(RoundRecord {
                round_number,
                text: response.text,
                tool_calls: round.records,
                final_summary: false,
            });

            if round.cancelled {
                break StopReason::Cancelled;
            }
            if let Some(user_message) = round.halted {
                break StopReason::Halted { user_message };
            }
        };

        info!(
            conversation_id = %conversation_id,
            rounds = rounds.len(),
            error_count,
            stop = ?stop_reason,
            "Conversation finished"
        );

        Ok(ConversationOutcome {
            conversation_id,
            final_text,
            messages: conversation.into_messages(),
            rounds,
            stop_reason,
            error_count,
        })
    }

    async fn collect_model_response(
        &self,
        messages: &[Message],
        options: &RequestOptions,
        progress: &dyn ConversationProgress,
        cancel: &CancellationToken,
    ) -> Result<crate::use_cases::shared::CollectedResponse, ResponseError> {
        send_cancellable(
            self.gateway.as_ref(),
            messages,
            options,
            progress,
            cancel,
            self.params.model_timeout,
        )
        .await
    }

    async fn execute_tools_round(
        &self,
        calls: &[ToolCall],
        context: &ToolCallContext,
        error_count: &mut usize,
        progress: &dyn ConversationProgress,
        cancel: &CancellationToken,
    ) -> RoundExecution {
        let prepared: Vec<Option<PreparedCall>> = if self.params.parallel_tool_calls && calls.len() > 1 {
            futures::future::join_all(
                calls
                    .iter()
                    .map(|call| self.first_attempt(call, context, progress, cancel)),
            )
            .await
            .into_iter()
            .map(Some)
            .collect()
        } else {
            calls.iter().map(|_| None).collect()
        };

        let mut round = RoundExecution::default();
        let mut pending = calls.iter().zip(prepared);
        for (call, ready) in pending.by_ref() {
            let prepared = match ready {
                Some(prepared) => prepared,
                None => self.first_attempt(call, context, progress, cancel).await,
            };

            match self
                .resolve_call(call, prepared, context, error_count, progress, cancel)
                .await
            {
                CallResolution::Resolved(record, message) => {
                    self.report_result(context, &record, progress);
                    round.records.push(record);
                    round.messages.push(message);
                }
                CallResolution::Halted(record, message, user_message) => {
                    self.report_result(context, &record, progress);
                    warn!(tool = %record.tool_name, "Halting conversation");
                    progress.on_halt(&user_message);
                    self.logger.log(ConversationEvent::new(
                        event_types::HALTED,
                        json!({
                            "conversation_id": context.conversation_id.as_str(),
                            "round": context.round_number,
                            "tool": record.tool_name,
                            "message": user_message,
                        }),
                    ));
                    round.records.push(record);
                    round.messages.push(message);
                    round.halted = Some(user_message);
                    break;
                }
                CallResolution::Cancelled => {
                    round.cancelled = true;
                    break;
                }
            }
        }

        // Calls that already ran concurrently still get a record
        for (call, ready) in pending {
            let Some(prepared) = ready else { continue };
            let (record, message) = self.settle_leftover(call, prepared, context, round.cancelled);
            self.report_result(context, &record, progress);
            round.records.push(record);
            round.messages.push(message);
        }
        round
    }

    /// Record a call whose first attempt finished after the round was stopped.
    ///
    /// Outputs are kept (and cached) as usual. A delegated execution stays
    /// active after a halt but is cancelled when the whole round was cancelled.
    /// Failures are not sent through recovery.
    fn settle_leftover(
        &self,
        call: &ToolCall,
        prepared: PreparedCall,
        context: &ToolCallContext,
        cancelled: bool,
    ) -> (ToolCallRecord, Message) {
        let PreparedCall { meta, attempt } = prepared;
        let skipped = |reason: String, attempts: u32, kind: Option<ErrorKind>| {
            let message = Message::tool_failure(&call.call_id, reason.as_str());
            (meta.record(call, ToolCallStatus::Skipped, reason, attempts, kind), message)
        };

        match attempt {
            FirstAttempt::Cached(output) => {
                let message = Message::tool_result(&call.call_id, output.as_str());
                (meta.record(call, ToolCallStatus::Cached, output, 0, None), message)
            }
            FirstAttempt::Invoked(InvokeOutcome::Output(_)) if cancelled && meta.asynchronous => {
                if let Some(id) = &meta.execution_id {
                    self.registry.cancel_execution(id);
                }
                skipped(
                    format!("'{}' was handed off, then cancelled with the conversation", meta.tool_name),
                    1,
                    None,
                )
            }
            FirstAttempt::Invoked(InvokeOutcome::Output(output)) => {
                self.succeed(call, &meta, output, 1)
            }
            FirstAttempt::Invoked(InvokeOutcome::Cancelled) => {
                skipped(format!("'{}' was cancelled", meta.tool_name), 1, None)
            }
            FirstAttempt::Invoked(InvokeOutcome::Failed(error)) => {
                let kind = self.recovery.classify_error(&error, context).kind;
                skipped(unrecovered(&meta.tool_name, &error), 1, Some(kind))
            }
            FirstAttempt::Unknown(error) => {
                let kind = self.recovery.classify_error(&error, context).kind;
                skipped(unrecovered(&meta.tool_name, &error), 0, Some(kind))
            }
        }
    }

    /// Resolve the name, consult the cache, and make the first invocation.
    async fn first_attempt(
        &self,
        call: &ToolCall,
        context: &ToolCallContext,
        progress: &dyn ConversationProgress,
        cancel: &CancellationToken,
    ) -> PreparedCall {
        let started = Instant::now();
        progress.on_tool_call(&call.tool_name, &tool_args_preview(call));
        self.logger.log(ConversationEvent::new(
            event_types::TOOL_CALL,
            json!({
                "conversation_id": context.conversation_id.as_str(),
                "round": context.round_number,
                "call_id": call.call_id,
                "tool": call.tool_name,
                "input": call.input,
            }),
        ));

        let Some(definition) = self.tools.tool_spec().get_resolved(&call.tool_name) else {
            debug!(tool = %call.tool_name, "Requested tool is not registered");
            let error = ToolError::new(
                &call.tool_name,
                &call.call_id,
                InvocationError::NotFound(call.tool_name.clone()).to_string(),
            );
            return PreparedCall {
                meta: CallMeta {
                    tool_name: call.tool_name.clone(),
                    asynchronous: false,
                    execution_id: None,
                    started,
                },
                attempt: FirstAttempt::Unknown(error),
            };
        };
        let tool_name = definition.name.clone();
        let asynchronous = definition.asynchronous;
        if tool_name != call.tool_name {
            debug!(requested = %call.tool_name, resolved = %tool_name, "Resolved tool alias");
        }

        if self.params.cache_results
            && !asynchronous
            && let Some(hit) = self.cache.get_cached_result(&tool_name, &call.input)
        {
            debug!(tool = %tool_name, "Cache hit");
            return PreparedCall {
                meta: CallMeta {
                    tool_name,
                    asynchronous,
                    execution_id: None,
                    started,
                },
                attempt: FirstAttempt::Cached(hit),
            };
        }

        let execution_id = if asynchronous {
            self.delegate(call, &tool_name, context)
        } else {
            None
        };

        let outcome = self.invoke_once(&tool_name, call, 0, cancel).await;
        if let Some(id) = &execution_id {
            match &outcome {
                InvokeOutcome::Failed(error) => {
                    self.registry.fail_execution(id, Some(error.error.clone()));
                }
                InvokeOutcome::Cancelled => {
                    self.registry.cancel_execution(id);
                }
                InvokeOutcome::Output(_) => {}
            }
        }

        PreparedCall {
            meta: CallMeta {
                tool_name,
                asynchronous,
                execution_id,
                started,
            },
            attempt: FirstAttempt::Invoked(outcome),
        }
    }

    /// Register the hand-off of an asynchronous tool call.
    fn delegate(&self, call: &ToolCall, tool_name: &str, context: &ToolCallContext) -> Option<ExecutionId> {
        let record = ExecutionRecord::new(
            ExecutionId::generate(),
            tool_name,
            "invoke",
            task_description_for(call, &context.user_intent),
        )
        .with_params(call.input.clone())
        .with_prompt_context(context.user_intent.clone());

        match self.registry.register_execution(record) {
            Ok(id) => {
                self.registry.mark_executing(&id);
                Some(id)
            }
            Err(e) => {
                warn!(tool = %tool_name, "Could not register delegated execution: {}", e);
                None
            }
        }
    }

    async fn invoke_once(
        &self,
        tool_name: &str,
        call: &ToolCall,
        retry_count: u32,
        cancel: &CancellationToken,
    ) -> InvokeOutcome {
        let timeout = self.params.tool_timeout;
        let invocation = self.tools.invoke(tool_name, &call.input);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => InvokeOutcome::Cancelled,
            result = tokio::time::timeout(timeout, invocation) => match result {
                Ok(Ok(output)) => InvokeOutcome::Output(output),
                Ok(Err(e)) => InvokeOutcome::Failed(
                    ToolError::new(tool_name, &call.call_id, e.to_string()).with_retry_count(retry_count),
                ),
                Err(_) => InvokeOutcome::Failed(
                    ToolError::timed_out(
                        tool_name,
                        &call.call_id,
                        u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    )
                    .with_retry_count(retry_count),
                ),
            },
        }
    }

    /// Turn a first attempt into a record, running recovery for failures.
    ///
    /// Recovery executes before the continue decision. A user-intervention
    /// result stops with its own message; an UNKNOWN failure that degraded
    /// gracefully keeps going until an error ceiling is reached.
    async fn resolve_call(
        &self,
        call: &ToolCall,
        prepared: PreparedCall,
        context: &ToolCallContext,
        error_count: &mut usize,
        progress: &dyn ConversationProgress,
        cancel: &CancellationToken,
    ) -> CallResolution {
        let PreparedCall { meta, attempt } = prepared;
        let tool_name = meta.tool_name.as_str();

        let (mut error, known, mut attempts) = match attempt {
            FirstAttempt::Cached(output) => {
                let message = Message::tool_result(&call.call_id, output.as_str());
                return CallResolution::Resolved(
                    meta.record(call, ToolCallStatus::Cached, output, 0, None),
                    message,
                );
            }
            FirstAttempt::Invoked(InvokeOutcome::Output(output)) => {
                let (record, message) = self.succeed(call, &meta, output, 1);
                return CallResolution::Resolved(record, message);
            }
            FirstAttempt::Invoked(InvokeOutcome::Cancelled) => return CallResolution::Cancelled,
            FirstAttempt::Invoked(InvokeOutcome::Failed(error)) => (error, true, 1u32),
            FirstAttempt::Unknown(error) => (error, false, 0u32),
        };

        let halt = |user_message: String, attempts: u32, kind: ErrorKind| {
            let message = Message::tool_failure(&call.call_id, user_message.as_str());
            CallResolution::Halted(
                meta.record(call, ToolCallStatus::Halted, user_message.clone(), attempts, Some(kind)),
                message,
                user_message,
            )
        };

        loop {
            *error_count += 1;
            let classification = self.recovery.classify_error(&error, context);
            warn!(
                tool = %tool_name,
                kind = classification.kind.as_str(),
                retry = error.retry_count,
                "Tool call failed: {}",
                error.error
            );

            let action = self
                .recovery
                .generate_recovery_action(&classification, &error, context);
            let result = self
                .recovery
                .execute_recovery(&action, &error, context, cancel)
                .await;
            progress.on_recovery(tool_name, &result);
            self.logger.log(ConversationEvent::new(
                event_types::RECOVERY,
                json!({
                    "conversation_id": context.conversation_id.as_str(),
                    "round": context.round_number,
                    "call_id": call.call_id,
                    "tool": tool_name,
                    "error": error.error,
                    "kind": classification.kind.as_str(),
                    "strategy": action.strategy.as_str(),
                    "success": result.success,
                    "should_continue": result.should_continue,
                }),
            ));

            if cancel.is_cancelled() {
                return CallResolution::Cancelled;
            }
            if !result.should_continue {
                let reason = result.user_message.clone().unwrap_or_else(|| result.narrative());
                let user_message =
                    self.recovery
                        .append_suggestions(reason, &classification, &error, context);
                return halt(user_message, attempts, classification.kind);
            }

            let degraded = classification.kind == ErrorKind::Unknown
                && action.strategy == RecoveryStrategy::GracefulDegradation
                && result.success;
            let keep_going = if degraded {
                !self.recovery.ceiling_reached(&error, context, *error_count)
            } else {
                self.recovery
                    .should_continue_workflow(&error, context, *error_count)
            };
            if !keep_going {
                let user_message =
                    self.recovery
                        .halt_message(&classification, &error, context, *error_count);
                return halt(user_message, attempts, classification.kind);
            }

            let can_retry = known
                && !meta.asynchronous
                && action.strategy == RecoveryStrategy::Retry
                && action.retryable
                && error.retry_count < self.params.max_tool_retries;
            if can_retry {
                attempts += 1;
                match self
                    .invoke_once(tool_name, call, error.retry_count + 1, cancel)
                    .await
                {
                    InvokeOutcome::Output(output) => {
                        let (record, message) = self.succeed(call, &meta, output, attempts);
                        return CallResolution::Resolved(record, message);
                    }
                    InvokeOutcome::Failed(next) => {
                        error = next;
                        continue;
                    }
                    InvokeOutcome::Cancelled => return CallResolution::Cancelled,
                }
            }

            let narrative = if action.strategy == RecoveryStrategy::Retry {
                format!(
                    "'{}' failed after {} attempt(s) ({}); continuing without its output",
                    tool_name, attempts, error.error
                )
            } else {
                result.narrative()
            };
            let message = Message::tool_failure(&call.call_id, narrative.as_str());
            return CallResolution::Resolved(
                meta.record(
                    call,
                    ToolCallStatus::Recovered,
                    narrative,
                    attempts,
                    Some(classification.kind),
                ),
                message,
            );
        }
    }

    fn succeed(
        &self,
        call: &ToolCall,
        meta: &CallMeta,
        output: String,
        attempts: u32,
    ) -> (ToolCallRecord, Message) {
        let status = if meta.asynchronous {
            ToolCallStatus::Delegated
        } else {
            if self.params.cache_results {
                self.cache.cache_result(&meta.tool_name, &call.input, output.as_str());
            }
            ToolCallStatus::Succeeded
        };
        let message = Message::tool_result(&call.call_id, output.as_str());
        (meta.record(call, status, output, attempts, None), message)
    }

    fn report_result(
        &self,
        context: &ToolCallContext,
        record: &ToolCallRecord,
        progress: &dyn ConversationProgress,
    ) {
        progress.on_tool_result(&record.tool_name, &record.status);
        self.logger.log(ConversationEvent::new(
            event_types::TOOL_RESULT,
            json!({
                "conversation_id": context.conversation_id.as_str(),
                "round": context.round_number,
                "call_id": record.call_id,
                "tool": record.tool_name,
                "status": record.status,
                "attempts": record.attempts,
                "duration_ms": record.duration_ms,
                "execution_id": record.execution_id.as_ref().map(|id| id.as_str()),
            }),
        ));
    }
}

fn unrecovered(tool_name: &str, error: &ToolError) -> String {
    format!(
        "'{}' failed ({}); not recovered because the round stopped",
        tool_name, error.error
    )
}
