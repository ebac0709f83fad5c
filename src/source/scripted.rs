//! Story-book response source used by the demo.
//!
//! Recognizes the prompts in [`STORY_BOOK`] and plays a fixed multi-round
//! script for each. Every branching decision is read from the history
//! snapshot: the step within the turn is the number of tool-result messages
//! since the last typed prompt, and ids for follow-up calls come from
//! previously recorded tool results. The directory itself is never consulted.

use std::collections::HashSet;
use std::time::Duration;

use serde_json::{json, Value};

use super::{event_channel, EventSender, EventStream, ResponseSource};
use crate::constants::{DEMO_FALLBACK_TEXT, STORY_BOOK};
use crate::history::History;
use crate::message::{Role, ToolOutput};

/// Delays that make the scripted output read like a live response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacing {
    /// Pause before the first character.
    pub think: Duration,
    /// Pause before each character.
    pub per_char: Duration,
}

/// What one round of a story says and asks for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reply {
    pub text: String,
    pub call: Option<(String, Value)>,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            call: None,
        }
    }

    fn call(text: impl Into<String>, name: &str, args: Value) -> Self {
        Self {
            text: text.into(),
            call: Some((name.to_string(), args)),
        }
    }
}

pub struct StoryBookSource {
    pacing: Pacing,
}

impl StoryBookSource {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }
}

impl ResponseSource for StoryBookSource {
    fn stream(&self, history: History) -> EventStream {
        let reply = plan(&history);
        tracing::debug!(
            text_len = reply.text.len(),
            tool = reply.call.as_ref().map(|(name, _)| name.as_str()),
            "scripted reply planned"
        );
        let (tx, events) = event_channel();
        tokio::spawn(play(reply, tx, self.pacing));
        events
    }
}

async fn play(reply: Reply, tx: EventSender, pacing: Pacing) {
    pause(pacing.think).await;
    for ch in reply.text.chars() {
        pause(pacing.per_char).await;
        if !tx.text(ch.to_string()) {
            return;
        }
    }
    if let Some((name, args)) = reply.call {
        if !tx.tool_call(name, args) {
            return;
        }
    }
    tx.finish();
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Facts about the current turn, derived from history.
struct Turn<'a> {
    history: &'a History,
    /// Tool-result messages since the last typed prompt.
    step: usize,
    /// Most recent tool result of this turn.
    last: Option<(&'a str, &'a ToolOutput)>,
}

impl<'a> Turn<'a> {
    fn read(history: &'a History) -> (Option<&'a str>, Self) {
        let mut step = 0;
        let mut prompt = None;
        let mut last = None;
        for msg in history.messages().iter().rev() {
            if msg.role != Role::Submitter {
                continue;
            }
            if let Some(text) = msg.leading_text() {
                prompt = Some(text);
                break;
            }
            if msg.is_tool_feedback() {
                if step == 0 {
                    last = msg.tool_results().last().map(|(_, name, out)| (name, out));
                }
                step += 1;
            }
        }
        (
            prompt,
            Self {
                history,
                step,
                last,
            },
        )
    }

    fn last_tool(&self) -> Option<&str> {
        self.last.map(|(name, _)| name)
    }

    fn latest_value(&self, tool: &str) -> Option<&'a Value> {
        match self.history.latest_result(tool) {
            Some(ToolOutput::Success(value)) => Some(value),
            _ => None,
        }
    }
}

/// Decides the next reply from history alone.
pub(crate) fn plan(history: &History) -> Reply {
    let (prompt, turn) = Turn::read(history);
    let story = prompt.and_then(|p| STORY_BOOK.iter().position(|s| *s == p.trim()));

    if turn.step > 0 {
        if let Some((name, ToolOutput::Error(message))) = turn.last {
            return Reply::say(format!("The {} call failed: {}", name, message));
        }
    }

    match story {
        Some(0) => list_users(&turn),
        Some(1) => create_random_user(&turn),
        Some(2) => add_to_engineering(&turn),
        Some(3) => remove_from_engineering(&turn),
        Some(4) => update_email(&turn),
        Some(5) => rename_engineering(&turn),
        Some(6) => list_empty_groups(&turn),
        Some(7) => delete_deprecated(&turn),
        _ => Reply::say(DEMO_FALLBACK_TEXT),
    }
}

fn list_users(turn: &Turn) -> Reply {
    match turn.step {
        0 => Reply::call(
            "I'll fetch the list of all users for you.\n",
            "getUsers",
            json!({}),
        ),
        _ => Reply::say("Here are the users currently in the system."),
    }
}

fn create_random_user(turn: &Turn) -> Reply {
    match turn.step {
        0 => Reply::call(
            "First, I'll generate some random user data to work with.\n",
            "generateRandomUserResource",
            json!({}),
        ),
        1 => {
            let fallback = json!({
                "userName": "jdoe",
                "displayName": "John Doe",
                "email": "jdoe@test.com"
            });
            let data = turn
                .latest_value("generateRandomUserResource")
                .unwrap_or(&fallback);
            Reply::call(
                format!(
                    "Okay, I have generated data for {}. Creating the user now...\n",
                    str_field(data, "displayName")
                ),
                "createUser",
                json!({
                    "userName": data["userName"],
                    "displayName": data["displayName"],
                    "email": data["email"],
                }),
            )
        }
        _ => Reply::say("The user has been created successfully."),
    }
}

fn add_to_engineering(turn: &Turn) -> Reply {
    match turn.step {
        0 => Reply::call(
            "I need to check if the 'Engineering' group exists first, and verify the user.\n",
            "getGroups",
            json!({}),
        ),
        1 => match find_group(turn.history, "Engineering") {
            None => Reply::call(
                "The 'Engineering' group doesn't exist. I'll create it now.\n",
                "createGroup",
                json!({ "displayName": "Engineering" }),
            ),
            Some(group) => add_user(
                turn,
                "Found the 'Engineering' group. Adding the user to it.\n",
                &group,
            ),
        },
        2 if turn.last_tool() == Some("createGroup") => {
            match find_group(turn.history, "Engineering") {
                Some(group) => add_user(
                    turn,
                    "Group created. Now adding the user to 'Engineering'.\n",
                    &group,
                ),
                None => Reply::say("I couldn't find the group I just created."),
            }
        }
        2 => Reply::say("The user has been added to the group."),
        _ => Reply::say("Operation complete."),
    }
}

fn add_user(turn: &Turn, text: &str, group: &Value) -> Reply {
    match latest_user(turn) {
        Some(user) => Reply::call(
            text,
            "addUserToGroup",
            json!({ "userId": user["id"], "groupId": group["id"] }),
        ),
        None => Reply::say("I couldn't find a user to add. Try creating one first."),
    }
}

fn remove_from_engineering(turn: &Turn) -> Reply {
    match turn.step {
        0 => Reply::call(
            "I'll look up the IDs for the user and the group to remove them.\n",
            "getGroups",
            json!({}),
        ),
        1 => {
            let group = find_group(turn.history, "Engineering");
            let member = group
                .as_ref()
                .and_then(|g| g["members"].as_array())
                .and_then(|members| members.last())
                .map(|m| m["value"].clone());
            match (group, member) {
                (Some(group), Some(user_id)) => Reply::call(
                    "Removing user from 'Engineering' group.\n",
                    "removeUserFromGroup",
                    json!({ "userId": user_id, "groupId": group["id"] }),
                ),
                _ => Reply::say("I couldn't find the user in that group."),
            }
        }
        _ => Reply::say("User removed from the group."),
    }
}

fn update_email(turn: &Turn) -> Reply {
    let email = "alice.engineer@demo.com";
    let update = |user: &Value| {
        Reply::call(
            format!("Updating email for {}...\n", str_field(user, "displayName")),
            "updateUser",
            json!({ "id": user["id"], "email": email }),
        )
    };
    match (turn.step, turn.last_tool()) {
        (0, _) => match latest_user(turn) {
            Some(user) => update(&user),
            None => Reply::call("Let me look up the users first.\n", "getUsers", json!({})),
        },
        (_, Some("getUsers")) => match latest_user(turn) {
            Some(user) => update(&user),
            None => Reply::say("There are no users to update."),
        },
        _ => Reply::say("Email address has been updated."),
    }
}

fn rename_engineering(turn: &Turn) -> Reply {
    match turn.step {
        0 => match find_group(turn.history, "Engineering") {
            Some(group) => Reply::call(
                "Renaming 'Engineering' to 'Deprecated Group'...\n",
                "patchGroup",
                json!({ "id": group["id"], "displayName": "Deprecated Group" }),
            ),
            None => Reply::say("Could not find the 'Engineering' group."),
        },
        _ => Reply::say("Group renamed successfully."),
    }
}

fn list_empty_groups(turn: &Turn) -> Reply {
    match turn.step {
        0 => Reply::call(
            "Scanning for groups with no members...\n",
            "getGroups",
            json!({}),
        ),
        _ => {
            let empty: Vec<&str> = turn
                .latest_value("getGroups")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter(|g| g["members"].as_array().map_or(true, |m| m.is_empty()))
                .map(|g| str_field(g, "displayName"))
                .collect();
            if empty.is_empty() {
                Reply::say("All groups currently have members.")
            } else {
                Reply::say(format!(
                    "I found the following empty groups: {}.",
                    empty.join(", ")
                ))
            }
        }
    }
}

fn delete_deprecated(turn: &Turn) -> Reply {
    match turn.step {
        0 => match find_group(turn.history, "Deprecated Group") {
            Some(group) => Reply::call(
                "Deleting 'Deprecated Group'...\n",
                "deleteGroup",
                json!({ "id": group["id"] }),
            ),
            None => Reply::say("Group not found."),
        },
        _ => Reply::say("Group deleted."),
    }
}

fn str_field<'v>(value: &'v Value, key: &str) -> &'v str {
    value[key].as_str().unwrap_or("")
}

/// The newest known state of the group named `name`.
///
/// Walks recorded tool results newest first. Only the newest record of each
/// group id counts, so a group renamed or deleted later is not matched by an
/// older listing.
fn find_group(history: &History, name: &str) -> Option<Value> {
    let mut seen = HashSet::new();
    for msg in history.messages().iter().rev() {
        let results: Vec<_> = msg.tool_results().collect();
        for (_, tool, output) in results.into_iter().rev() {
            let ToolOutput::Success(value) = output else {
                continue;
            };
            let records: Vec<&Value> = match tool {
                "getGroups" => value.as_array().map(|a| a.iter().collect()).unwrap_or_default(),
                "createGroup" | "patchGroup" | "addUserToGroup" | "removeUserFromGroup" => {
                    vec![value.get("group").unwrap_or(value)]
                }
                "deleteGroup" => {
                    seen.insert(str_field(value, "id").to_string());
                    continue;
                }
                _ => continue,
            };
            for group in records {
                let id = str_field(group, "id").to_string();
                if !seen.insert(id) {
                    continue;
                }
                if group["displayName"] == name {
                    return Some(group.clone());
                }
            }
        }
    }
    None
}

/// The user most recently created, else the last user of the newest listing.
/// Users deleted later in the conversation are skipped.
fn latest_user(turn: &Turn) -> Option<Value> {
    let mut deleted = HashSet::new();
    for msg in turn.history.messages().iter().rev() {
        let results: Vec<_> = msg.tool_results().collect();
        for (_, tool, output) in results.into_iter().rev() {
            let ToolOutput::Success(value) = output else {
                continue;
            };
            match tool {
                "deleteUser" => {
                    deleted.insert(str_field(value, "id").to_string());
                }
                "createUser" if !deleted.contains(str_field(value, "id")) => {
                    return Some(value.clone());
                }
                "getUsers" => {
                    let live = value.as_array().and_then(|users| {
                        users
                            .iter()
                            .rev()
                            .find(|u| !deleted.contains(str_field(u, "id")))
                    });
                    if let Some(user) = live {
                        return Some(user.clone());
                    }
                }
                _ => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests;
