//! End-to-end turn walkthroughs against the standard dialog set.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use devbot_channels::Activity;
use devbot_core::config::ClassifierConfig;
use devbot_core::types::{ConversationId, ItemType, UserId};
use devbot_dialogs::messages;
use devbot_dialogs::{
    ClassifierError, DialogSet, Entity, IntentClassifier, Recognition, RecognizerClassifier,
    RecognizerClient, TurnDispatcher, TurnState, CREATE_ITEM, IDENTITY,
};
use devbot_state::{
    AwaitingField, DialogFrame, DialogStack, PendingCreationRequest, UserProfile,
};
use devbot_workitems::{NewWorkItem, WorkItem, WorkItemError, WorkItemService};
use serde_json::{json, Value};

struct StubClassifier(Recognition);

#[async_trait]
impl IntentClassifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<Recognition, ClassifierError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct StubService {
    fail: bool,
    calls: Mutex<usize>,
}

#[async_trait]
impl WorkItemService for StubService {
    async fn create(&self, req: &NewWorkItem) -> Result<WorkItem, WorkItemError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail {
            return Err(WorkItemError::Unavailable("connection refused".into()));
        }
        Ok(WorkItem {
            id: "1001".into(),
            item_type: req.item_type,
            description: req.description.clone(),
            assign_to_self: req.assign_to_self,
            actor_id: req.actor_id.clone(),
            created_at: "2024-05-01T09:00:00Z".into(),
        })
    }
}

fn dispatcher_with(recognition: Recognition, service: Arc<StubService>) -> TurnDispatcher {
    TurnDispatcher::new(
        DialogSet::standard(),
        Arc::new(StubClassifier(recognition)),
        service,
        &ClassifierConfig::default(),
    )
}

fn dispatcher(recognition: Recognition) -> TurnDispatcher {
    dispatcher_with(recognition, Arc::default())
}

fn say(text: &str) -> Activity {
    Activity::message(
        "console",
        ConversationId::from("conv-1"),
        UserId::from("user-1"),
        text,
    )
}

fn jane() -> UserProfile {
    UserProfile {
        name: "Jane".into(),
        external_id: "jdoe".into(),
    }
}

fn awaiting(dialog: &str, step_index: usize, options: Value, result: Value) -> DialogFrame {
    DialogFrame {
        dialog: dialog.into(),
        step_index,
        options,
        result,
        awaiting_input: true,
    }
}

fn create_bug() -> Recognition {
    Recognition {
        intent: "Create_New".into(),
        confidence: 0.95,
        entities: vec![Entity {
            name: "ItemType".into(),
            value: "Bug".into(),
        }],
    }
}

#[tokio::test]
async fn first_contact_asks_for_name_once() {
    let out = dispatcher(Recognition::none())
        .handle_turn(&say("hello"), TurnState::default())
        .await
        .unwrap();

    assert_eq!(out.replies, vec![messages::ASK_NAME]);
    assert_eq!(out.state.stack.len(), 1);
    let frame = out.state.stack.top().unwrap();
    assert_eq!(frame.dialog, IDENTITY);
    assert!(frame.awaiting_input);
}

#[tokio::test]
async fn name_reply_advances_to_external_id_prompt() {
    let state = TurnState {
        stack: DialogStack::from(vec![awaiting(IDENTITY, 0, Value::Null, Value::Null)]),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("Jane"), state)
        .await
        .unwrap();

    assert_eq!(out.state.profile.name, "Jane");
    assert_eq!(out.replies, vec!["Thanks Jane.", "What is your Azure Dev Ops Id?"]);
    assert_eq!(out.state.stack.top().unwrap().step_index, 2);
    assert_eq!(out.state.conversation.awaiting, AwaitingField::ExternalId);
}

#[tokio::test]
async fn create_intent_starts_item_creation() {
    let state = TurnState {
        profile: jane(),
        ..Default::default()
    };

    let out = dispatcher(create_bug())
        .handle_turn(&say("I need to log a bug"), state)
        .await
        .unwrap();

    assert_eq!(out.replies, vec!["What should be the description for this Bug?"]);
    let frame = out.state.stack.top().unwrap();
    assert_eq!(frame.dialog, CREATE_ITEM);
    assert_eq!(frame.options, json!("Bug"));
    assert_eq!(
        out.state.pending,
        Some(PendingCreationRequest::new(ItemType::Bug))
    );
}

#[tokio::test]
async fn description_reply_chains_into_assign_prompt() {
    let state = TurnState {
        profile: jane(),
        stack: DialogStack::from(vec![awaiting(CREATE_ITEM, 0, json!("Bug"), Value::Null)]),
        pending: Some(PendingCreationRequest::new(ItemType::Bug)),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("Fix login crash"), state)
        .await
        .unwrap();

    assert_eq!(
        out.replies,
        vec![
            "Thanks Jane, the description will be 'Fix login crash'.",
            "Do you want to assign this to yourself? (yes/no)",
        ]
    );
    assert_eq!(
        out.state.pending.as_ref().map(|p| p.description.as_str()),
        Some("Fix login crash")
    );
    assert_eq!(out.state.stack.top().unwrap().step_index, 2);
}

#[tokio::test]
async fn unrecognised_intent_asks_for_clarification() {
    let state = TurnState {
        profile: jane(),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("what's for lunch"), state.clone())
        .await
        .unwrap();

    assert_eq!(out.replies, vec!["Jane, I am unsure what you want to do."]);
    assert!(out.state.stack.is_empty());
    assert_eq!(out.state.profile, state.profile);
    assert_eq!(out.state.pending, None);
}

#[tokio::test]
async fn undefined_dialog_aborts_the_turn() {
    let state = TurnState {
        profile: jane(),
        stack: DialogStack::from(vec![awaiting("order_pizza", 0, Value::Null, Value::Null)]),
        ..Default::default()
    };

    let err = dispatcher(Recognition::none())
        .handle_turn(&say("pepperoni"), state)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn out_of_range_step_aborts_the_turn() {
    let state = TurnState {
        profile: jane(),
        stack: DialogStack::from(vec![awaiting(CREATE_ITEM, 9, json!("Bug"), Value::Null)]),
        ..Default::default()
    };

    let err = dispatcher(Recognition::none())
        .handle_turn(&say("anything"), state)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn invalid_confirm_reply_reprompts_without_advancing() {
    let state = TurnState {
        profile: jane(),
        stack: DialogStack::from(vec![awaiting(CREATE_ITEM, 2, json!("Bug"), Value::Null)]),
        pending: Some(PendingCreationRequest {
            item_type: ItemType::Bug,
            description: "Fix login crash".into(),
            assign_to_self: None,
        }),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("maybe"), state)
        .await
        .unwrap();

    assert_eq!(
        out.replies,
        vec![messages::RETRY_CONFIRM, messages::ASK_ASSIGN_SELF]
    );
    let frame = out.state.stack.top().unwrap();
    assert_eq!(frame.step_index, 2);
    assert!(frame.awaiting_input);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let state = TurnState {
        stack: DialogStack::from(vec![awaiting(IDENTITY, 0, Value::Null, Value::Null)]),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("   "), state)
        .await
        .unwrap();

    assert_eq!(out.replies, vec![messages::RETRY_TEXT, messages::ASK_NAME]);
    assert!(out.state.profile.name.is_empty());
    assert_eq!(out.state.stack.top().unwrap().step_index, 0);
}

#[tokio::test]
async fn creation_failure_still_closes_the_dialog() {
    let service = Arc::new(StubService {
        fail: true,
        ..Default::default()
    });
    let state = TurnState {
        profile: jane(),
        stack: DialogStack::from(vec![awaiting(CREATE_ITEM, 2, json!("Bug"), Value::Null)]),
        pending: Some(PendingCreationRequest {
            item_type: ItemType::Bug,
            description: "Fix login crash".into(),
            assign_to_self: None,
        }),
        ..Default::default()
    };

    let out = dispatcher_with(Recognition::none(), service.clone())
        .handle_turn(&say("no"), state)
        .await
        .unwrap();

    assert_eq!(
        out.replies,
        vec![
            "Creating a new Bug with a description of Fix login crash and assigned to self as false",
            "Sorry, I couldn't create the Bug. Please try again later.",
            messages::WHAT_NEXT,
        ]
    );
    assert!(out.state.stack.is_empty());
    assert!(out.state.pending.is_none());
    assert_eq!(*service.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn interrupted_chain_resumes_without_consuming_the_message() {
    // Saved right after confirm_name ran, before the id prompt.
    let frame = DialogFrame {
        dialog: IDENTITY.into(),
        step_index: 1,
        options: Value::Null,
        result: Value::Null,
        awaiting_input: false,
    };
    let state = TurnState {
        profile: UserProfile {
            name: "Jane".into(),
            external_id: String::new(),
        },
        stack: DialogStack::from(vec![frame]),
        ..Default::default()
    };

    let out = dispatcher(Recognition::none())
        .handle_turn(&say("whatever"), state)
        .await
        .unwrap();

    assert_eq!(out.replies, vec![messages::ASK_EXTERNAL_ID]);
    assert!(out.state.profile.external_id.is_empty());
    assert_eq!(out.state.stack.top().unwrap().step_index, 2);
}

#[tokio::test]
async fn lifecycle_signal_is_a_no_op() {
    let state = TurnState {
        profile: jane(),
        ..Default::default()
    };
    let join = Activity::joined("console", ConversationId::from("conv-1"), UserId::from("user-1"));

    let out = dispatcher(create_bug())
        .handle_turn(&join, state.clone())
        .await
        .unwrap();

    assert!(out.replies.is_empty());
    assert_eq!(out.state, state);
}

struct RecordedResult(Value);

#[async_trait]
impl RecognizerClient for RecordedResult {
    async fn recognize_raw(&self, _text: &str) -> Result<Value, ClassifierError> {
        Ok(self.0.clone())
    }
}

fn recognizer_dispatcher(raw: Value) -> TurnDispatcher {
    TurnDispatcher::new(
        DialogSet::standard(),
        Arc::new(RecognizerClassifier::new(RecordedResult(raw))),
        Arc::new(StubService::default()),
        &ClassifierConfig::default(),
    )
}

#[tokio::test]
async fn recognizer_result_starts_item_creation() {
    let raw = json!({
        "text": "please open a test case",
        "intents": { "Create_New": { "score": 0.88 }, "None": { "score": 0.1 } },
        "entities": { "$instance": {}, "ItemType": [["test case"]] }
    });
    let state = TurnState {
        profile: jane(),
        ..Default::default()
    };

    let out = recognizer_dispatcher(raw)
        .handle_turn(&say("please open a test case"), state)
        .await
        .unwrap();

    assert_eq!(
        out.replies,
        vec!["What should be the description for this Test Case?"]
    );
    assert_eq!(out.state.stack.top().unwrap().options, json!("Test Case"));
}

#[tokio::test]
async fn malformed_recognizer_result_asks_for_clarification() {
    let state = TurnState {
        profile: jane(),
        ..Default::default()
    };

    let out = recognizer_dispatcher(json!({ "intents": "Create_New" }))
        .handle_turn(&say("new bug"), state)
        .await
        .unwrap();

    assert_eq!(out.replies, vec!["Jane, I am unsure what you want to do."]);
    assert!(out.state.stack.is_empty());
}
