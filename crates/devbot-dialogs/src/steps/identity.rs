use devbot_state::AwaitingField;
use serde_json::Value;
use tracing::debug;

use super::{StepContext, StepOutcome};
use crate::error::Result;
use crate::messages;

pub(super) fn prompt_name(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.state.profile.name.is_empty() {
        return StepOutcome::Next(Value::Null);
    }
    ctx.state.conversation.awaiting = AwaitingField::Name;
    StepOutcome::Prompt(messages::ASK_NAME.to_string())
}

pub(super) fn confirm_name(ctx: &mut StepContext<'_>) -> StepOutcome {
    if let Some(name) = ctx.input_text().map(str::to_string) {
        ctx.state.profile.name = name;
        ctx.state.conversation.awaiting = AwaitingField::None;
        let thanks = messages::thanks_name(&ctx.state.profile.name);
        ctx.say(thanks);
    }
    StepOutcome::Next(Value::Null)
}

pub(super) fn prompt_external_id(ctx: &mut StepContext<'_>) -> StepOutcome {
    if !ctx.state.profile.external_id.is_empty() {
        return StepOutcome::Next(Value::Null);
    }
    ctx.state.conversation.awaiting = AwaitingField::ExternalId;
    StepOutcome::Prompt(messages::ASK_EXTERNAL_ID.to_string())
}

pub(super) fn confirm_external_id(ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
    if let Some(id) = ctx.input_text().map(str::to_string) {
        ctx.state.profile.external_id = id;
        ctx.state.conversation.awaiting = AwaitingField::None;
        let thanks =
            messages::thanks_external_id(&ctx.state.profile.name, &ctx.state.profile.external_id);
        ctx.say(thanks);
    }
    ctx.say(messages::WHAT_NEXT);

    debug!(name = %ctx.state.profile.name, "identity collected");
    let profile =
        serde_json::to_value(&ctx.state.profile).map_err(|e| ctx.misconfigured(e.to_string()))?;
    Ok(StepOutcome::End(profile))
}
