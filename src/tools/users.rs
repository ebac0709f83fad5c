use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};

use super::directory::{SharedDirectory, UserResource};
use super::Tool;

/// Defines a tool struct holding a handle to the shared directory.
macro_rules! directory_tool {
    ($name:ident) => {
        pub struct $name {
            dir: SharedDirectory,
        }

        impl $name {
            pub fn new(dir: SharedDirectory) -> Self {
                Self { dir }
            }
        }
    };
}
pub(super) use directory_tool;

directory_tool!(GetUsers);
directory_tool!(GetOneUser);
directory_tool!(CreateUser);
directory_tool!(UpdateUser);
directory_tool!(DeleteUser);

#[derive(Deserialize)]
struct IdInput {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserInput {
    id: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[async_trait::async_trait]
impl Tool for GetUsers {
    fn name(&self) -> &str {
        "getUsers"
    }

    fn description(&self) -> &str {
        "List every user in the directory."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let dir = self.dir.lock().await;
        Ok(serde_json::to_value(&dir.users)?)
    }
}

#[async_trait::async_trait]
impl Tool for GetOneUser {
    fn name(&self) -> &str {
        "getOneUser"
    }

    fn description(&self) -> &str {
        "Fetch a single user by id."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "User id" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: IdInput = serde_json::from_value(input)?;
        let dir = self.dir.lock().await;
        Ok(serde_json::to_value(dir.user(&input.id)?)?)
    }
}

#[async_trait::async_trait]
impl Tool for CreateUser {
    fn name(&self) -> &str {
        "createUser"
    }

    fn description(&self) -> &str {
        "Create a user from a user name, display name and email."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "userName": { "type": "string" },
                "displayName": { "type": "string" },
                "email": { "type": "string" }
            },
            "required": ["userName", "displayName", "email"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let resource: UserResource = serde_json::from_value(input)?;
        let user = self.dir.lock().await.create_user(resource);
        tracing::debug!(user_id = %user.id, "created user");
        Ok(serde_json::to_value(user)?)
    }
}

#[async_trait::async_trait]
impl Tool for UpdateUser {
    fn name(&self) -> &str {
        "updateUser"
    }

    fn description(&self) -> &str {
        "Update a user's email and/or display name."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "email": { "type": "string" },
                "displayName": { "type": "string" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: UpdateUserInput = serde_json::from_value(input)?;
        let user = self
            .dir
            .lock()
            .await
            .update_user(&input.id, input.email, input.display_name)?;
        Ok(serde_json::to_value(user)?)
    }
}

#[async_trait::async_trait]
impl Tool for DeleteUser {
    fn name(&self) -> &str {
        "deleteUser"
    }

    fn description(&self) -> &str {
        "Delete a user and remove it from every group."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "User id" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: IdInput = serde_json::from_value(input)?;
        self.dir.lock().await.delete_user(&input.id)?;
        Ok(json!({ "success": true, "id": input.id }))
    }
}
