// demos/onboarding/src/services/user_directory.rs

//! In-process stand-in for an identity provider.

use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
  pub id: Uuid,
  pub name: String,
  pub groups: Vec<String>,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
  users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl UserDirectory {
  pub fn create(&self, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    self.users.lock().insert(
      id,
      UserRecord {
        id,
        name: name.to_string(),
        groups: Vec::new(),
      },
    );
    tracing::info!(user_id = %id, name, "User created.");
    id
  }

  pub fn add_to_groups(&self, id: Uuid, groups: &[&str]) -> anyhow::Result<()> {
    let mut users = self.users.lock();
    let user = users
      .get_mut(&id)
      .ok_or_else(|| anyhow::anyhow!("User {} does not exist", id))?;
    user.groups.extend(groups.iter().map(|g| g.to_string()));
    tracing::info!(user_id = %id, ?groups, "User added to groups.");
    Ok(())
  }

  /// Returns whether the user existed.
  pub fn delete(&self, id: Uuid) -> bool {
    let removed = self.users.lock().remove(&id).is_some();
    tracing::info!(user_id = %id, removed, "User deleted.");
    removed
  }

  pub fn snapshot(&self) -> Vec<UserRecord> {
    self.users.lock().values().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.users.lock().len()
  }
}
