//! In-memory SCIM-style directory backing the tools.
//!
//! Users and groups live in plain vectors behind a tokio mutex so every tool
//! in a registry sees the same data. Lookups by id that miss fail with
//! [`DirectoryError`].

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::constants::{DEPARTMENTS, FIRST_NAMES, GROUP_SUFFIXES, LAST_NAMES};

pub type SharedDirectory = Arc<Mutex<Directory>>;

#[derive(Debug, Error, PartialEq)]
pub enum DirectoryError {
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Group {0} not found")]
    GroupNotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Meta {
    fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            last_modified: now,
        }
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    /// User id.
    pub value: String,
    /// User display name.
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub display_name: String,
    pub members: Vec<Member>,
    pub meta: Meta,
}

/// Attributes for a new user, as produced by `generateRandomUserResource`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResource {
    pub user_name: String,
    pub display_name: String,
    pub email: String,
}

impl UserResource {
    pub fn random(rng: &mut impl Rng, domain: &str) -> Self {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
        let handle = format!("{}.{}", first.to_lowercase(), last.to_lowercase());
        Self {
            email: format!("{}@{}", handle, domain),
            user_name: handle,
            display_name: format!("{} {}", first, last),
        }
    }
}

/// A "<Department> <Suffix>" group name.
pub fn random_group_name(rng: &mut impl Rng) -> String {
    let department = DEPARTMENTS.choose(rng).copied().unwrap_or("Engineering");
    let suffix = GROUP_SUFFIXES.choose(rng).copied().unwrap_or("Team");
    format!("{} {}", department, suffix)
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Directory {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds random users, then groups with random membership.
    pub fn seeded(
        rng: &mut impl Rng,
        users: RangeInclusive<usize>,
        groups: RangeInclusive<usize>,
        domain: &str,
    ) -> Self {
        let mut dir = Self::new();
        for _ in 0..rng.gen_range(users) {
            dir.create_user(UserResource::random(rng, domain));
        }
        for _ in 0..rng.gen_range(groups) {
            let mut group = Group {
                id: Uuid::new_v4().to_string(),
                display_name: random_group_name(rng),
                members: Vec::new(),
                meta: Meta::now(),
            };
            let size = rng.gen_range(0..=dir.users.len());
            group.members = dir
                .users
                .choose_multiple(rng, size)
                .map(|u| Member {
                    value: u.id.clone(),
                    display: u.display_name.clone(),
                })
                .collect();
            dir.groups.push(group);
        }
        dir
    }

    pub fn shared(self) -> SharedDirectory {
        Arc::new(Mutex::new(self))
    }

    pub fn user(&self, id: &str) -> Result<&User, DirectoryError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| DirectoryError::UserNotFound(id.to_string()))
    }

    pub fn create_user(&mut self, resource: UserResource) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            user_name: resource.user_name,
            display_name: resource.display_name,
            email: resource.email,
            active: true,
            meta: Meta::now(),
        };
        self.users.push(user.clone());
        user
    }

    /// Applies the non-empty fields of an update.
    pub fn update_user(
        &mut self,
        id: &str,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Result<User, DirectoryError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DirectoryError::UserNotFound(id.to_string()))?;
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            user.email = email;
        }
        if let Some(name) = display_name.filter(|n| !n.is_empty()) {
            user.display_name = name;
        }
        user.meta.touch();
        Ok(user.clone())
    }

    /// Removes a user and every membership pointing at it.
    pub fn delete_user(&mut self, id: &str) -> Result<(), DirectoryError> {
        let idx = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| DirectoryError::UserNotFound(id.to_string()))?;
        self.users.remove(idx);
        for group in &mut self.groups {
            group.members.retain(|m| m.value != id);
        }
        Ok(())
    }

    pub fn create_group(&mut self, display_name: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.to_string(),
            members: Vec::new(),
            meta: Meta::now(),
        };
        self.groups.push(group.clone());
        group
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut Group, DirectoryError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))
    }

    pub fn rename_group(&mut self, id: &str, display_name: &str) -> Result<Group, DirectoryError> {
        let group = self.group_mut(id)?;
        group.display_name = display_name.to_string();
        group.meta.touch();
        Ok(group.clone())
    }

    pub fn delete_group(&mut self, id: &str) -> Result<(), DirectoryError> {
        let idx = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))?;
        self.groups.remove(idx);
        Ok(())
    }

    /// Adds a member. Returns `false` with the unchanged group when the user
    /// is already a member.
    pub fn add_member(
        &mut self,
        user_id: &str,
        group_id: &str,
    ) -> Result<(bool, Group), DirectoryError> {
        let display = self.user(user_id)?.display_name.clone();
        let group = self.group_mut(group_id)?;
        if group.members.iter().any(|m| m.value == user_id) {
            return Ok((false, group.clone()));
        }
        group.members.push(Member {
            value: user_id.to_string(),
            display,
        });
        group.meta.touch();
        Ok((true, group.clone()))
    }

    pub fn remove_member(&mut self, user_id: &str, group_id: &str) -> Result<Group, DirectoryError> {
        let group = self.group_mut(group_id)?;
        group.members.retain(|m| m.value != user_id);
        group.meta.touch();
        Ok(group.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let dir = Directory::seeded(&mut rng, 3..=6, 1..=2, "company.com");
        assert!((3..=6).contains(&dir.users.len()));
        assert!((1..=2).contains(&dir.groups.len()));
        for group in &dir.groups {
            assert!(group.members.len() <= dir.users.len());
            for member in &group.members {
                assert!(dir.user(&member.value).is_ok());
            }
        }
        assert!(dir.users.iter().all(|u| u.email.ends_with("@company.com")));
    }

    #[test]
    fn test_delete_user_drops_memberships() {
        let mut dir = Directory::new();
        let user = dir.create_user(UserResource {
            user_name: "ada".into(),
            display_name: "Ada".into(),
            email: "ada@x.io".into(),
        });
        let group = dir.create_group("Engineering");
        dir.add_member(&user.id, &group.id).unwrap();

        dir.delete_user(&user.id).unwrap();
        assert!(dir.groups[0].members.is_empty());
        assert_eq!(
            dir.delete_user(&user.id),
            Err(DirectoryError::UserNotFound(user.id))
        );
    }

    #[test]
    fn test_add_member_twice() {
        let mut dir = Directory::new();
        let user = dir.create_user(UserResource {
            user_name: "ada".into(),
            display_name: "Ada".into(),
            email: "ada@x.io".into(),
        });
        let group = dir.create_group("Engineering");
        let (added, _) = dir.add_member(&user.id, &group.id).unwrap();
        assert!(added);
        let (added, group) = dir.add_member(&user.id, &group.id).unwrap();
        assert!(!added);
        assert_eq!(group.members.len(), 1);
    }

    #[test]
    fn test_update_user_ignores_empty_fields() {
        let mut dir = Directory::new();
        let user = dir.create_user(UserResource {
            user_name: "ada".into(),
            display_name: "Ada".into(),
            email: "ada@x.io".into(),
        });
        let updated = dir
            .update_user(&user.id, Some(String::new()), Some("Ada L.".into()))
            .unwrap();
        assert_eq!(updated.email, "ada@x.io");
        assert_eq!(updated.display_name, "Ada L.");
    }
}
