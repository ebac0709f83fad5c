pub mod directory;
pub mod generate;
pub mod groups;
pub mod users;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use directory::SharedDirectory;

/// Failures surfaced by [`ToolRegistry::invoke`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool {0} not implemented")]
    NotFound(String),
    #[error("{message}")]
    Execution { name: String, message: String },
}

/// Definition shown to the user so they know what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the response source uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<Value>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    /// Simulated round-trip before each call runs.
    latency: Duration,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a tool. Called during startup; a later tool with the same
    /// name replaces the earlier one.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Produce definitions for every registered tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Look up a tool by name and execute it.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tool.execute(args).await.map_err(|e| ToolError::Execution {
            name: name.to_string(),
            message: format!("{:#}", e),
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry with every directory-service tool bound to `dir`.
    pub fn with_directory(dir: SharedDirectory) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(users::GetUsers::new(dir.clone())));
        registry.register(Box::new(users::GetOneUser::new(dir.clone())));
        registry.register(Box::new(users::CreateUser::new(dir.clone())));
        registry.register(Box::new(users::UpdateUser::new(dir.clone())));
        registry.register(Box::new(users::DeleteUser::new(dir.clone())));
        registry.register(Box::new(groups::GetGroups::new(dir.clone())));
        registry.register(Box::new(groups::CreateGroup::new(dir.clone())));
        registry.register(Box::new(groups::PatchGroup::new(dir.clone())));
        registry.register(Box::new(groups::DeleteGroup::new(dir.clone())));
        registry.register(Box::new(groups::AddUserToGroup::new(dir.clone())));
        registry.register(Box::new(groups::RemoveUserFromGroup::new(dir)));
        registry.register(Box::new(generate::GenerateRandomUserResource));
        registry.register(Box::new(generate::GenerateRandomGroupResource));
        registry
    }
}
