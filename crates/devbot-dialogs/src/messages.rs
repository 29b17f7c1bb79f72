//! User-facing reply texts.

use devbot_core::types::ItemType;

pub const ASK_NAME: &str =
    "Before we can start we need to know a bit about you, what is your name?";
pub const ASK_EXTERNAL_ID: &str = "What is your Azure Dev Ops Id?";
pub const WHAT_NEXT: &str = "What do you want to do?";
pub const ASK_ASSIGN_SELF: &str = "Do you want to assign this to yourself? (yes/no)";
pub const RETRY_TEXT: &str = "Sorry, I didn't get that.";
pub const RETRY_CONFIRM: &str = "Please answer yes or no.";
/// Sent instead of internal error details when a turn aborts.
pub const APOLOGY: &str = "Sorry, something went wrong on my side. Please try again.";

pub fn thanks_name(name: &str) -> String {
    format!("Thanks {}.", name)
}

pub fn thanks_external_id(name: &str, external_id: &str) -> String {
    format!(
        "Thanks {}, I have your Azure Dev Ops Id as {}.",
        name, external_id
    )
}

pub fn unsure(name: &str) -> String {
    format!("{}, I am unsure what you want to do.", name)
}

pub fn ask_description(item_type: ItemType) -> String {
    format!("What should be the description for this {}?", item_type)
}

pub fn confirm_description(name: &str, description: &str) -> String {
    format!(
        "Thanks {}, the description will be '{}'.",
        name, description
    )
}

pub fn creation_summary(item_type: ItemType, description: &str, assign_to_self: bool) -> String {
    format!(
        "Creating a new {} with a description of {} and assigned to self as {}",
        item_type, description, assign_to_self
    )
}

pub fn created(item_type: ItemType, id: &str) -> String {
    format!("Created {} #{}.", item_type, id)
}

pub fn creation_failed(item_type: ItemType) -> String {
    format!(
        "Sorry, I couldn't create the {}. Please try again later.",
        item_type
    )
}

/// Reply for a create request whose item type is missing or unknown.
pub fn unsupported_item_type() -> String {
    let names: Vec<&str> = ItemType::all().map(|t| t.as_str()).collect();
    format!("I can create one of: {}. Which one do you need?", names.join(", "))
}
