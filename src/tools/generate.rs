//! Tools that make up plausible directory resources without storing them.

use anyhow::Result;
use serde_json::{json, Value};

use super::directory::{random_group_name, UserResource};
use super::Tool;
use crate::constants::GENERATED_EMAIL_DOMAIN;

pub struct GenerateRandomUserResource;

pub struct GenerateRandomGroupResource;

#[async_trait::async_trait]
impl Tool for GenerateRandomUserResource {
    fn name(&self) -> &str {
        "generateRandomUserResource"
    }

    fn description(&self) -> &str {
        "Generate random user attributes suitable for createUser."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let resource = UserResource::random(&mut rand::thread_rng(), GENERATED_EMAIL_DOMAIN);
        Ok(serde_json::to_value(resource)?)
    }
}

#[async_trait::async_trait]
impl Tool for GenerateRandomGroupResource {
    fn name(&self) -> &str {
        "generateRandomGroupResource"
    }

    fn description(&self) -> &str {
        "Generate a random group name suitable for createGroup."
    }

    fn schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let name = random_group_name(&mut rand::thread_rng());
        Ok(json!({ "displayName": name }))
    }
}
