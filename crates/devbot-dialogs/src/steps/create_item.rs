use devbot_core::types::ItemType;
use devbot_state::PendingCreationRequest;
use devbot_workitems::NewWorkItem;
use serde_json::Value;
use tracing::{info, warn};

use super::{StepContext, StepOutcome};
use crate::error::{DialogError, Result};
use crate::messages;

pub(super) fn prompt_description(ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
    let item_type: ItemType = serde_json::from_value(ctx.options.clone())
        .map_err(|e| ctx.misconfigured(format!("launch argument is not an item type: {e}")))?;

    ctx.state.pending = Some(PendingCreationRequest::new(item_type));
    Ok(StepOutcome::Prompt(messages::ask_description(item_type)))
}

pub(super) fn confirm_description(ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
    let description = ctx
        .input_text()
        .map(str::to_string)
        .ok_or_else(|| ctx.misconfigured("expected a description"))?;

    let pending = ctx
        .state
        .pending
        .as_mut()
        .ok_or_else(|| DialogError::Misconfigured {
            dialog: ctx.dialog.to_string(),
            step: ctx.step.to_string(),
            reason: "no pending creation request".to_string(),
        })?;
    pending.description = description;

    let reply = messages::confirm_description(&ctx.state.profile.name, &pending.description);
    ctx.say(reply);
    Ok(StepOutcome::Next(Value::Null))
}

pub(super) fn prompt_assign_self() -> StepOutcome {
    StepOutcome::Prompt(messages::ASK_ASSIGN_SELF.to_string())
}

pub(super) async fn submit_item(ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
    let assign_to_self = ctx
        .input
        .as_bool()
        .ok_or_else(|| ctx.misconfigured("expected a yes/no answer"))?;

    let Some(pending) = ctx.state.pending.as_mut() else {
        return Err(ctx.misconfigured("no pending creation request"));
    };
    pending.assign_to_self = Some(assign_to_self);

    let request = NewWorkItem {
        item_type: pending.item_type,
        description: pending.description.clone(),
        assign_to_self,
        actor_id: ctx.state.profile.external_id.clone(),
    };
    ctx.say(messages::creation_summary(
        request.item_type,
        &request.description,
        assign_to_self,
    ));

    let result = match ctx.work_items.create(&request).await {
        Ok(item) => {
            info!(id = %item.id, item_type = %item.item_type, "work item created");
            ctx.say(messages::created(item.item_type, &item.id));
            serde_json::to_value(&item).unwrap_or(Value::Null)
        }
        Err(e) => {
            let err = DialogError::from(e);
            warn!(code = err.code(), error = %err, item_type = %request.item_type, "work item creation failed");
            ctx.say(messages::creation_failed(request.item_type));
            Value::Null
        }
    };

    ctx.say(messages::WHAT_NEXT);
    ctx.state.pending = None;
    Ok(StepOutcome::End(result))
}
