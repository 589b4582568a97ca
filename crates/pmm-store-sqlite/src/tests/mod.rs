//! Integration tests for `SqliteStore` and the core actions and views that
//! run against it, all on an in-memory database.

mod actions;
mod store;

use pmm_core::{
  actions::projects::{ProjectForm, create_project},
  actions::tasks::{TaskForm, create_task},
  identity::{Identity, resolve_user},
  project::Project,
  task::Task,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A signed-in caller already mirrored into the user table.
async fn user(s: &SqliteStore, email: &str) -> Identity {
  let identity = Identity {
    user_id: Uuid::new_v4(),
    email:   email.to_owned(),
  };
  resolve_user(s, Some(&identity)).await.unwrap();
  identity
}

async fn project(s: &SqliteStore, owner: &Identity, title: &str) -> Project {
  create_project(s, Some(owner), ProjectForm {
    title: Some(title.into()),
    ..Default::default()
  })
  .await
  .unwrap()
  .expect("project created")
  .data
}

async fn task(
  s: &SqliteStore,
  caller: &Identity,
  project_id: Uuid,
  parent_id: Option<Uuid>,
  title: &str,
  due_date: Option<&str>,
) -> Task {
  create_task(s, Some(caller), TaskForm {
    project_id: Some(project_id.to_string()),
    parent_id: parent_id.map(|id| id.to_string()),
    title: Some(title.into()),
    due_date: due_date.map(str::to_owned),
    ..Default::default()
  })
  .await
  .unwrap()
  .expect("task created")
  .data
}
