use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};

use super::directory::SharedDirectory;
use super::users::directory_tool;
use super::Tool;

directory_tool!(GetGroups);
directory_tool!(CreateGroup);
directory_tool!(PatchGroup);
directory_tool!(DeleteGroup);
directory_tool!(AddUserToGroup);
directory_tool!(RemoveUserFromGroup);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupInput {
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchGroupInput {
    id: String,
    display_name: String,
}

#[derive(Deserialize)]
struct DeleteGroupInput {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipInput {
    user_id: String,
    group_id: String,
}

fn membership_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "userId": { "type": "string" },
            "groupId": { "type": "string" }
        },
        "required": ["userId", "groupId"]
    })
}

#[async_trait::async_trait]
impl Tool for GetGroups {
    fn name(&self) -> &str {
        "getGroups"
    }

    fn description(&self) -> &str {
        "List every group with its members."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let dir = self.dir.lock().await;
        Ok(serde_json::to_value(&dir.groups)?)
    }
}

#[async_trait::async_trait]
impl Tool for CreateGroup {
    fn name(&self) -> &str {
        "createGroup"
    }

    fn description(&self) -> &str {
        "Create an empty group."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "displayName": { "type": "string" }
            },
            "required": ["displayName"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: CreateGroupInput = serde_json::from_value(input)?;
        let group = self.dir.lock().await.create_group(&input.display_name);
        Ok(serde_json::to_value(group)?)
    }
}

#[async_trait::async_trait]
impl Tool for PatchGroup {
    fn name(&self) -> &str {
        "patchGroup"
    }

    fn description(&self) -> &str {
        "Rename a group."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "displayName": { "type": "string" }
            },
            "required": ["id", "displayName"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: PatchGroupInput = serde_json::from_value(input)?;
        let group = self
            .dir
            .lock()
            .await
            .rename_group(&input.id, &input.display_name)?;
        Ok(serde_json::to_value(group)?)
    }
}

#[async_trait::async_trait]
impl Tool for DeleteGroup {
    fn name(&self) -> &str {
        "deleteGroup"
    }

    fn description(&self) -> &str {
        "Delete a group."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: DeleteGroupInput = serde_json::from_value(input)?;
        self.dir.lock().await.delete_group(&input.id)?;
        Ok(json!({ "success": true, "id": input.id }))
    }
}

#[async_trait::async_trait]
impl Tool for AddUserToGroup {
    fn name(&self) -> &str {
        "addUserToGroup"
    }

    fn description(&self) -> &str {
        "Add a user to a group."
    }

    fn schema(&self) -> Value {
        membership_schema()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: MembershipInput = serde_json::from_value(input)?;
        let (added, group) = self
            .dir
            .lock()
            .await
            .add_member(&input.user_id, &input.group_id)?;
        if !added {
            return Ok(json!({ "message": "User already in group", "group": group }));
        }
        Ok(serde_json::to_value(group)?)
    }
}

#[async_trait::async_trait]
impl Tool for RemoveUserFromGroup {
    fn name(&self) -> &str {
        "removeUserFromGroup"
    }

    fn description(&self) -> &str {
        "Remove a user from a group."
    }

    fn schema(&self) -> Value {
        membership_schema()
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: MembershipInput = serde_json::from_value(input)?;
        let group = self
            .dir
            .lock()
            .await
            .remove_member(&input.user_id, &input.group_id)?;
        Ok(serde_json::to_value(group)?)
    }
}
