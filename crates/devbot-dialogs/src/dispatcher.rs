//! Turn dispatcher: the single entry point for inbound activities.
//!
//! Priority per turn:
//! 1. lifecycle signals do nothing;
//! 2. an incomplete profile resumes the active dialog or starts `identity`;
//! 3. an active dialog is resumed;
//! 4. otherwise the text is classified and may start `create_item`.
//!
//! Dialogs run as waterfalls. A step either passes a value to the next step
//! in the same turn, prompts and suspends the dialog until the next message,
//! or ends the dialog.

use std::sync::Arc;

use devbot_channels::Activity;
use devbot_core::config::ClassifierConfig;
use devbot_core::types::ItemType;
use devbot_state::DialogFrame;
use devbot_workitems::WorkItemService;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::definition::{DialogDefinition, DialogSet, CREATE_ITEM, IDENTITY};
use crate::error::{DialogError, Result};
use crate::messages;
use crate::recognizer::IntentClassifier;
use crate::steps::{self, StepContext, StepOutcome};
use crate::turn::{TurnOutcome, TurnState};

pub struct TurnDispatcher {
    dialogs: DialogSet,
    classifier: Arc<dyn IntentClassifier>,
    work_items: Arc<dyn WorkItemService>,
    create_intent: String,
    min_confidence: f64,
}

impl TurnDispatcher {
    pub fn new(
        dialogs: DialogSet,
        classifier: Arc<dyn IntentClassifier>,
        work_items: Arc<dyn WorkItemService>,
        config: &ClassifierConfig,
    ) -> Self {
        Self {
            dialogs,
            classifier,
            work_items,
            create_intent: config.create_intent.clone(),
            min_confidence: config.min_confidence,
        }
    }

    /// Process one activity against the conversation's loaded state.
    ///
    /// On `Err` the returned state is lost, so nothing from a failed turn
    /// can be persisted.
    #[instrument(skip_all, fields(conversation = %activity.conversation_id, channel = %activity.channel))]
    pub async fn handle_turn(&self, activity: &Activity, mut state: TurnState) -> Result<TurnOutcome> {
        let Some(text) = activity.text() else {
            debug!("lifecycle signal, no dialog work");
            return Ok(TurnOutcome::silent(state));
        };

        state
            .conversation
            .stamp(&activity.timestamp, &activity.channel);
        let mut replies = Vec::new();

        if !state.profile.is_complete() {
            if state.stack.is_empty() {
                self.begin(IDENTITY, Value::Null, &mut state, &mut replies)
                    .await?;
            } else {
                self.resume(text, &mut state, &mut replies).await?;
            }
        } else if !state.stack.is_empty() {
            self.resume(text, &mut state, &mut replies).await?;
        } else {
            self.route_intent(text, &mut state, &mut replies).await?;
        }

        debug!(replies = replies.len(), depth = state.stack.len(), "turn handled");
        Ok(TurnOutcome { state, replies })
    }

    /// Push a fresh frame for `name` and run it from step 0.
    async fn begin(
        &self,
        name: &str,
        options: Value,
        state: &mut TurnState,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        let def = self.dialogs.get(name)?;
        info!(dialog = name, "dialog started");
        state.stack.push(DialogFrame::new(name, options));
        self.run_from(def, 0, Value::Null, state, replies).await
    }

    /// Continue the top frame with the user's reply.
    async fn resume(
        &self,
        text: &str,
        state: &mut TurnState,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        let Some(frame) = state.stack.top().cloned() else {
            return Ok(());
        };
        let def = self.dialogs.get(&frame.dialog)?;

        if !frame.awaiting_input {
            // Saved between pass-through steps: pick up after the last one
            // without consuming the message.
            return self
                .run_from(def, frame.step_index + 1, frame.result, state, replies)
                .await;
        }

        let spec = def.step(frame.step_index)?;
        let kind = spec.input.ok_or_else(|| DialogError::Misconfigured {
            dialog: def.name.clone(),
            step: spec.name.to_string(),
            reason: "frame awaits input but the step declares no prompt".to_string(),
        })?;

        match kind.recognize(text) {
            Ok(value) => {
                self.run_from(def, frame.step_index + 1, value, state, replies)
                    .await
            }
            Err(err @ DialogError::Validation(_)) => {
                debug!(dialog = %def.name, step = spec.name, code = err.code(), error = %err, "reply rejected");
                replies.push(kind.retry_message().to_string());
                self.run_from(def, frame.step_index, frame.result, state, replies)
                    .await
            }
            Err(err) => Err(err),
        }
    }

    /// Run steps starting at `index` until one prompts or the dialog ends.
    async fn run_from(
        &self,
        def: &DialogDefinition,
        mut index: usize,
        mut input: Value,
        state: &mut TurnState,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        let options = match state.stack.top() {
            Some(frame) if frame.dialog == def.name => frame.options.clone(),
            _ => {
                return Err(DialogError::Misconfigured {
                    dialog: def.name.clone(),
                    step: index.to_string(),
                    reason: "dialog is not on top of the stack".to_string(),
                })
            }
        };

        loop {
            if index == def.len() {
                state.stack.pop();
                info!(dialog = %def.name, "dialog completed");
                return Ok(());
            }
            let spec = def.step(index)?;
            debug!(dialog = %def.name, step = spec.name, "running step");

            let mut ctx = StepContext {
                dialog: &def.name,
                step: spec.name,
                options: &options,
                input: input.clone(),
                state: &mut *state,
                replies: &mut *replies,
                work_items: self.work_items.as_ref(),
            };

            let outcome = steps::run(spec.action, &mut ctx).await?;
            match outcome {
                StepOutcome::Next(value) => {
                    index += 1;
                    input = value;
                }
                StepOutcome::Prompt(text) => {
                    if !spec.awaits_input() {
                        return Err(DialogError::Misconfigured {
                            dialog: def.name.clone(),
                            step: spec.name.to_string(),
                            reason: "step prompted but declares no prompt kind".to_string(),
                        });
                    }
                    replies.push(text);
                    if let Some(frame) = state.stack.top_mut() {
                        frame.step_index = index;
                        // Kept so a rejected reply can re-run this step.
                        frame.result = input;
                        frame.awaiting_input = true;
                    }
                    return Ok(());
                }
                StepOutcome::End(result) => {
                    state.stack.pop();
                    info!(dialog = %def.name, step = spec.name, ended_with = %result, "dialog completed");
                    return Ok(());
                }
            }
        }
    }

    /// No dialog is active: decide what the user wants.
    async fn route_intent(
        &self,
        text: &str,
        state: &mut TurnState,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        if text.trim().is_empty() {
            replies.push(messages::unsure(&state.profile.name));
            return Ok(());
        }

        let recognition = match self.classifier.classify(text).await {
            Ok(r) => r,
            Err(e) => {
                let err = DialogError::from(e);
                warn!(code = err.code(), error = %err, "intent classification failed");
                replies.push(messages::unsure(&state.profile.name));
                return Ok(());
            }
        };
        debug!(
            intent = %recognition.intent,
            confidence = recognition.confidence,
            "intent recognised"
        );

        if recognition.intent != self.create_intent
            || recognition.confidence < self.min_confidence
        {
            replies.push(messages::unsure(&state.profile.name));
            return Ok(());
        }

        match recognition
            .top_entity()
            .and_then(|e| ItemType::from_label(&e.value))
        {
            Some(item_type) => {
                self.begin(CREATE_ITEM, json!(item_type), state, replies)
                    .await
            }
            None => {
                debug!(entity = ?recognition.top_entity(), "no supported item type");
                replies.push(messages::unsupported_item_type());
                Ok(())
            }
        }
    }
}
