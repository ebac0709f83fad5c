use super::*;
use crate::message::{Message, Segment};
use crate::source::Event;
use futures::StreamExt;

fn prompt(history: &mut History, text: &str) {
    history.push(Message::submitter(text));
}

fn feedback(history: &mut History, name: &str, output: ToolOutput) {
    history.push(Message::responder());
    history.push(Message::feedback(vec![Segment::ToolCallResult {
        call_id: uuid::Uuid::new_v4().to_string(),
        name: name.into(),
        output,
    }]));
}

fn ok(history: &mut History, name: &str, value: Value) {
    feedback(history, name, ToolOutput::Success(value));
}

#[test]
fn test_unknown_prompt_falls_back() {
    let mut history = History::new();
    prompt(&mut history, "hello there");
    assert_eq!(plan(&history), Reply::say(DEMO_FALLBACK_TEXT));
}

#[test]
fn test_list_users_two_rounds() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[0]);
    let first = plan(&history);
    assert_eq!(first.call, Some(("getUsers".to_string(), json!({}))));

    ok(&mut history, "getUsers", json!([]));
    let second = plan(&history);
    assert!(second.call.is_none());
    assert_eq!(second.text, "Here are the users currently in the system.");
}

#[test]
fn test_step_resets_on_new_prompt() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[0]);
    ok(&mut history, "getUsers", json!([]));
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[0]);

    assert_eq!(plan(&history).call.map(|(n, _)| n), Some("getUsers".into()));
}

#[test]
fn test_create_user_uses_generated_data() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[1]);
    ok(
        &mut history,
        "generateRandomUserResource",
        json!({"userName": "ada.lee", "displayName": "Ada Lee", "email": "ada.lee@example.com"}),
    );

    let reply = plan(&history);
    assert!(reply.text.contains("Ada Lee"));
    let (name, args) = reply.call.unwrap();
    assert_eq!(name, "createUser");
    assert_eq!(args["userName"], "ada.lee");
    assert_eq!(args["email"], "ada.lee@example.com");
}

#[test]
fn test_engineering_created_then_joined() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[1]);
    ok(&mut history, "createUser", json!({"id": "u1", "displayName": "Ada"}));
    history.push(Message::responder());

    prompt(&mut history, STORY_BOOK[2]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g0", "displayName": "Sales Team", "members": []}]),
    );
    let reply = plan(&history);
    assert_eq!(reply.call.as_ref().unwrap().0, "createGroup");

    ok(
        &mut history,
        "createGroup",
        json!({"id": "g1", "displayName": "Engineering", "members": []}),
    );
    let (name, args) = plan(&history).call.unwrap();
    assert_eq!(name, "addUserToGroup");
    assert_eq!(args, json!({"userId": "u1", "groupId": "g1"}));

    ok(&mut history, "addUserToGroup", json!({"id": "g1"}));
    let done = plan(&history);
    assert!(done.call.is_none());
    assert_eq!(done.text, "Operation complete.");
}

#[test]
fn test_existing_engineering_joined_directly() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[2]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g1", "displayName": "Engineering", "members": []}]),
    );
    // No user known yet.
    let reply = plan(&history);
    assert!(reply.call.is_none());

    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[0]);
    ok(&mut history, "getUsers", json!([{"id": "u0"}, {"id": "u9"}]));
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[2]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g1", "displayName": "Engineering", "members": []}]),
    );
    let (_, args) = plan(&history).call.unwrap();
    assert_eq!(args, json!({"userId": "u9", "groupId": "g1"}));

    ok(&mut history, "addUserToGroup", json!({"id": "g1"}));
    assert_eq!(plan(&history).text, "The user has been added to the group.");
}

#[test]
fn test_renamed_group_not_found_by_old_name() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[6]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g1", "displayName": "Engineering", "members": []}]),
    );
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[5]);
    ok(
        &mut history,
        "patchGroup",
        json!({"id": "g1", "displayName": "Deprecated Group", "members": []}),
    );
    history.push(Message::responder());

    assert!(find_group(&history, "Engineering").is_none());
    assert_eq!(find_group(&history, "Deprecated Group").unwrap()["id"], "g1");

    prompt(&mut history, STORY_BOOK[7]);
    let (name, args) = plan(&history).call.unwrap();
    assert_eq!(name, "deleteGroup");
    assert_eq!(args, json!({"id": "g1"}));
}

#[test]
fn test_deleted_group_is_forgotten() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[6]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g1", "displayName": "Deprecated Group", "members": []}]),
    );
    ok(&mut history, "deleteGroup", json!({"success": true, "id": "g1"}));
    assert!(find_group(&history, "Deprecated Group").is_none());
}

#[test]
fn test_deleted_user_is_not_updated() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[1]);
    ok(
        &mut history,
        "createUser",
        json!({"id": "u1", "userName": "ada", "displayName": "Ada", "email": "ada@test.com"}),
    );
    ok(&mut history, "deleteUser", json!({"success": true, "id": "u1"}));
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[4]);

    assert_eq!(plan(&history).call.map(|(n, _)| n), Some("getUsers".into()));
}

#[test]
fn test_listing_skips_deleted_users() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[0]);
    ok(
        &mut history,
        "getUsers",
        json!([
            {"id": "u0", "displayName": "Grace"},
            {"id": "u9", "displayName": "Linus"}
        ]),
    );
    ok(&mut history, "deleteUser", json!({"success": true, "id": "u9"}));
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[4]);

    let (name, args) = plan(&history).call.unwrap();
    assert_eq!(name, "updateUser");
    assert_eq!(args, json!({"id": "u0", "email": "alice.engineer@demo.com"}));
}

#[test]
fn test_empty_groups_listed_from_result() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[6]);
    ok(
        &mut history,
        "getGroups",
        json!([
            {"id": "g1", "displayName": "Engineering", "members": [{"value": "u1"}]},
            {"id": "g2", "displayName": "HR Board", "members": []},
            {"id": "g3", "displayName": "IT Guild", "members": []}
        ]),
    );
    assert_eq!(
        plan(&history).text,
        "I found the following empty groups: HR Board, IT Guild."
    );
}

#[test]
fn test_failed_tool_is_reported() {
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[5]);
    ok(
        &mut history,
        "getGroups",
        json!([{"id": "g1", "displayName": "Engineering", "members": []}]),
    );
    history.push(Message::responder());
    prompt(&mut history, STORY_BOOK[5]);
    feedback(
        &mut history,
        "patchGroup",
        ToolOutput::Error("Group g1 not found".into()),
    );

    let reply = plan(&history);
    assert!(reply.call.is_none());
    assert_eq!(reply.text, "The patchGroup call failed: Group g1 not found");
}

#[tokio::test]
async fn test_stream_spells_text_then_requests() {
    let source = StoryBookSource::new(Pacing::default());
    let mut history = History::new();
    prompt(&mut history, STORY_BOOK[0]);

    let events: Vec<_> = source.stream(history).collect().await;
    let mut text = String::new();
    let mut calls = Vec::new();
    for event in events {
        match event.unwrap() {
            Event::Text(chunk) => {
                assert!(calls.is_empty(), "text after a tool call");
                assert_eq!(chunk.chars().count(), 1);
                text.push_str(&chunk);
            }
            Event::ToolCallRequest { name, .. } => calls.push(name),
        }
    }
    assert_eq!(text, "I'll fetch the list of all users for you.\n");
    assert_eq!(calls, vec!["getUsers".to_string()]);
}
