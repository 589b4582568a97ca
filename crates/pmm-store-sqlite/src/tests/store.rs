//! Direct `WorkspaceStore` behaviour.

use chrono::{TimeZone, Utc};
use pmm_core::{
  project::{NewProject, ProjectStatus, ProjectUpdate},
  store::WorkspaceStore,
  task::{NewTask, TaskLevel, TaskStatus},
  user::User,
};
use uuid::Uuid;

use super::{project, store, task, user};
use crate::Error;

fn new_project(owner_id: Uuid, title: &str, due: Option<(i32, u32, u32)>) -> NewProject {
  NewProject {
    title: title.into(),
    description: String::new(),
    due_date: due.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
    owner_id,
  }
}

fn new_task(project_id: Uuid, parent_id: Option<Uuid>, title: &str) -> NewTask {
  NewTask {
    project_id,
    parent_id,
    title: title.into(),
    importance: 3,
    urgency: 3,
    estimated_minutes: 30,
    due_date: None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_lookup_by_id_and_email() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let by_id = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "alice@example.com");
  assert_eq!(by_id.name, "New User");

  let by_email = s
    .find_user_by_email("alice@example.com".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_email.user_id, alice.user_id);

  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert!(
    s.find_user_by_email("nobody@example.com".into())
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_project() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let created = s
    .create_project(new_project(alice.user_id, "Launch", Some((2025, 6, 1))))
    .await
    .unwrap();
  assert_eq!(created.status, ProjectStatus::Active);

  let fetched = s.get_project(created.project_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn written_rows_read_back_identical() {
  let s = store().await;
  let precise = Utc.timestamp_opt(1_750_000_000, 838_958_910).unwrap();

  let inserted = s
    .insert_user(User {
      user_id:    Uuid::new_v4(),
      email:      "carol@example.com".into(),
      name:       "Carol".into(),
      created_at: precise,
    })
    .await
    .unwrap();
  assert_eq!(inserted.created_at.timestamp_subsec_nanos(), 838_958_000);
  assert_eq!(s.get_user(inserted.user_id).await.unwrap().unwrap(), inserted);

  let p = s
    .create_project(NewProject {
      due_date: Some(precise),
      ..new_project(inserted.user_id, "p", None)
    })
    .await
    .unwrap();
  assert_eq!(s.get_project(p.project_id).await.unwrap().unwrap(), p);

  let t = s
    .create_task(NewTask {
      due_date: Some(precise),
      ..new_task(p.project_id, None, "t")
    })
    .await
    .unwrap();
  assert_eq!(s.get_task(t.task_id).await.unwrap().unwrap(), t);
}

#[tokio::test]
async fn projects_ordered_by_due_date_then_newest() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let uid = alice.user_id;

  s.create_project(new_project(uid, "undated old", None)).await.unwrap();
  s.create_project(new_project(uid, "late", Some((2025, 9, 1)))).await.unwrap();
  s.create_project(new_project(uid, "soon", Some((2025, 6, 1)))).await.unwrap();
  s.create_project(new_project(uid, "undated new", None)).await.unwrap();

  let titles: Vec<String> = s
    .list_accessible_projects(uid)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.title)
    .collect();
  assert_eq!(titles, ["soon", "late", "undated new", "undated old"]);
}

#[tokio::test]
async fn accessible_projects_include_memberships_only() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  let shared = project(&s, &alice, "shared").await;
  project(&s, &alice, "private").await;
  s.upsert_member(shared.project_id, bob.user_id).await.unwrap();

  let bobs = s.list_accessible_projects(bob.user_id).await.unwrap();
  assert_eq!(bobs.len(), 1);
  assert_eq!(bobs[0].project_id, shared.project_id);

  assert!(
    s.find_accessible_project(shared.project_id, bob.user_id)
      .await
      .unwrap()
      .is_some()
  );
  assert_eq!(s.list_accessible_projects(alice.user_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn updating_missing_project_is_not_found() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .update_project(missing, ProjectUpdate {
      title:       "x".into(),
      description: String::new(),
      due_date:    None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProjectNotFound(id) if id == missing));
}

#[tokio::test]
async fn status_round_trips_through_storage() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;

  s.set_project_status(p.project_id, ProjectStatus::Completed).await.unwrap();
  let fetched = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn deleting_project_removes_tasks_and_members() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "doomed").await;
  let parent = task(&s, &alice, p.project_id, None, "parent", None).await;
  let child = task(&s, &alice, p.project_id, Some(parent.task_id), "child", None).await;
  s.upsert_member(p.project_id, bob.user_id).await.unwrap();

  s.delete_project(p.project_id).await.unwrap();

  assert!(s.get_project(p.project_id).await.unwrap().is_none());
  assert!(s.get_task(parent.task_id).await.unwrap().is_none());
  assert!(s.get_task(child.task_id).await.unwrap().is_none());
  assert!(s.list_members(p.project_id).await.unwrap().is_empty());
  assert!(s.list_accessible_projects(bob.user_id).await.unwrap().is_empty());
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_member_is_idempotent() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "p").await;

  let first = s.upsert_member(p.project_id, bob.user_id).await.unwrap();
  let second = s.upsert_member(p.project_id, bob.user_id).await.unwrap();
  assert_eq!(first.member_id, second.member_id);

  let members = s.list_members(p.project_id).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].user_id, bob.user_id);

  assert_eq!(s.remove_member(p.project_id, bob.user_id).await.unwrap(), 1);
  assert_eq!(s.remove_member(p.project_id, bob.user_id).await.unwrap(), 0);
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_parent_removes_children() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;

  let parent = s.create_task(new_task(p.project_id, None, "parent")).await.unwrap();
  let child = s
    .create_task(new_task(p.project_id, Some(parent.task_id), "child"))
    .await
    .unwrap();

  s.delete_task(parent.task_id).await.unwrap();
  assert!(s.get_task(child.task_id).await.unwrap().is_none());
  assert!(s.list_tasks(p.project_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn counts_split_by_level_and_status() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let pid = p.project_id;

  let parent = s.create_task(new_task(pid, None, "parent")).await.unwrap();
  s.create_task(new_task(pid, None, "other parent")).await.unwrap();
  let c1 = s.create_task(new_task(pid, Some(parent.task_id), "c1")).await.unwrap();
  s.create_task(new_task(pid, Some(parent.task_id), "c2")).await.unwrap();
  s.complete_task(c1.task_id, 20, None).await.unwrap();

  let count = |level, status| s.count_tasks(pid, level, status);
  assert_eq!(count(TaskLevel::Parent, TaskStatus::Todo).await.unwrap(), 2);
  assert_eq!(count(TaskLevel::Parent, TaskStatus::Done).await.unwrap(), 0);
  assert_eq!(count(TaskLevel::Child, TaskStatus::Todo).await.unwrap(), 1);
  assert_eq!(count(TaskLevel::Child, TaskStatus::Done).await.unwrap(), 1);
}

#[tokio::test]
async fn reopen_clears_minutes_but_keeps_reflection() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let t = s.create_task(new_task(p.project_id, None, "t")).await.unwrap();

  s.complete_task(t.task_id, 45, Some("slower than planned".into()))
    .await
    .unwrap();
  let done = s.get_task(t.task_id).await.unwrap().unwrap();
  assert_eq!(done.status, TaskStatus::Done);
  assert_eq!(done.actual_minutes, Some(45));

  s.reopen_task(t.task_id).await.unwrap();
  let reopened = s.get_task(t.task_id).await.unwrap().unwrap();
  assert_eq!(reopened.status, TaskStatus::Todo);
  assert_eq!(reopened.actual_minutes, None);
  assert_eq!(reopened.reflection.as_deref(), Some("slower than planned"));
}

#[tokio::test]
async fn task_access_reports_owner_and_membership() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "p").await;
  let t = s.create_task(new_task(p.project_id, None, "t")).await.unwrap();

  let as_bob = s.task_access(t.task_id, bob.user_id).await.unwrap().unwrap();
  assert_eq!(as_bob.owner_id, alice.user_id);
  assert!(!as_bob.is_member);

  s.upsert_member(p.project_id, bob.user_id).await.unwrap();
  let as_bob = s.task_access(t.task_id, bob.user_id).await.unwrap().unwrap();
  assert!(as_bob.is_member);
  assert_eq!(as_bob.task.task_id, t.task_id);

  assert!(s.task_access(Uuid::new_v4(), bob.user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn next_open_child_is_earliest_due() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let pid = p.project_id;

  let parent = task(&s, &alice, pid, None, "parent", Some("2025-01-01")).await;
  task(&s, &alice, pid, Some(parent.task_id), "undated", None).await;
  task(&s, &alice, pid, Some(parent.task_id), "later", Some("2025-07-01")).await;
  let first = task(&s, &alice, pid, Some(parent.task_id), "first", Some("2025-06-01")).await;

  let next = s.next_open_child_task(pid).await.unwrap().unwrap();
  assert_eq!(next.task_id, first.task_id);

  s.complete_task(first.task_id, 5, None).await.unwrap();
  let next = s.next_open_child_task(pid).await.unwrap().unwrap();
  assert_eq!(next.title, "later");
}
