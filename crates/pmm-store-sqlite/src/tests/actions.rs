//! Mutation actions end to end: validation, defaults, and revalidation.

use pmm_core::{
  Error,
  actions::{
    ViewPath,
    members::{MemberForm, add_member, remove_member},
    projects::{
      ProjectForm, complete_project, create_project, reopen_project, update_project,
    },
    tasks::{
      Completion, TaskDetailsForm, TaskForm, complete_task, create_task, undo_task,
      update_task, update_task_due_date,
    },
  },
  identity::Identity,
  project::ProjectStatus,
  store::WorkspaceStore,
  task::TaskStatus,
  views::{home, project_detail},
};
use chrono::Utc;
use uuid::Uuid;

use super::{project, store, task, user};

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_project_title_is_a_silent_no_op() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let result = create_project(&s, Some(&alice), ProjectForm {
    title: Some("   ".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(result.is_none());
  assert!(s.list_accessible_projects(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_project_requires_a_session() {
  let s = store().await;
  let result = create_project(&s, None, ProjectForm {
    title: Some("Launch".into()),
    ..Default::default()
  })
  .await;
  assert!(matches!(result, Err(Error::Unauthorized)));
}

#[tokio::test]
async fn first_project_mirrors_the_caller() {
  let s = store().await;
  let identity = Identity {
    user_id: Uuid::new_v4(),
    email:   "new@example.com".into(),
  };

  let created = create_project(&s, Some(&identity), ProjectForm {
    title:       Some(" Launch ".into()),
    description: Some(" notes ".into()),
    due_date:    Some("2025-06-01".into()),
  })
  .await
  .unwrap()
  .unwrap();

  assert_eq!(created.data.title, "Launch");
  assert_eq!(created.data.description, "notes");
  assert_eq!(created.data.owner_id, identity.user_id);
  assert_eq!(created.revalidate, [
    ViewPath::Root,
    ViewPath::Project(created.data.project_id)
  ]);
  assert!(s.get_user(identity.user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn malformed_due_date_is_rejected() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;

  let result = create_project(&s, Some(&alice), ProjectForm {
    title: Some("Launch".into()),
    due_date: Some("next tuesday".into()),
    ..Default::default()
  })
  .await;
  assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn out_of_range_due_year_never_reaches_the_store() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let parent = task(&s, &alice, p.project_id, None, "parent", None).await;

  let result = create_task(&s, Some(&alice), TaskForm {
    project_id: Some(p.project_id.to_string()),
    parent_id: Some(parent.task_id.to_string()),
    title: Some("ancient".into()),
    due_date: Some("-0001-01-01".into()),
    ..Default::default()
  })
  .await;
  assert!(matches!(result, Err(Error::Validation(_))));

  let moved = update_task_due_date(&s, Some(&alice), parent.task_id, Some("-0001-01-01")).await;
  assert!(matches!(moved, Err(Error::Validation(_))));

  assert_eq!(s.list_tasks(p.project_id).await.unwrap().len(), 1);
  assert_eq!(s.get_task(parent.task_id).await.unwrap().unwrap().due_date, None);
  assert!(project_detail(&s, Some(&alice), p.project_id).await.unwrap().is_some());
  assert!(home(&s, Some(&alice), Utc::now()).await.unwrap().urgent.is_empty());
}

#[tokio::test]
async fn update_and_status_changes() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "before").await;

  let blank = update_project(&s, Some(&alice), p.project_id, ProjectForm::default())
    .await
    .unwrap();
  assert!(blank.is_none());

  update_project(&s, Some(&alice), p.project_id, ProjectForm {
    title: Some("after".into()),
    ..Default::default()
  })
  .await
  .unwrap()
  .unwrap();

  let done = complete_project(&s, Some(&alice), p.project_id).await.unwrap();
  assert_eq!(done.data, ProjectStatus::Completed);

  let fetched = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "after");
  assert_eq!(fetched.status, ProjectStatus::Completed);

  reopen_project(&s, Some(&alice), p.project_id).await.unwrap();
  let fetched = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, ProjectStatus::Active);
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn task_scores_default_and_clamp() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;

  let created = create_task(&s, Some(&alice), TaskForm {
    project_id: Some(p.project_id.to_string()),
    title: Some("t".into()),
    importance: Some("9".into()),
    urgency: Some("0".into()),
    estimated_minutes: Some("-15".into()),
    ..Default::default()
  })
  .await
  .unwrap()
  .unwrap()
  .data;

  assert_eq!(created.importance, 5);
  assert_eq!(created.urgency, 3);
  assert_eq!(created.estimated_minutes, 0);
  assert!(!created.is_done());
}

#[tokio::test]
async fn task_without_title_or_project_is_skipped() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;

  let no_title = create_task(&s, Some(&alice), TaskForm {
    project_id: Some(p.project_id.to_string()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(no_title.is_none());

  let no_project = create_task(&s, Some(&alice), TaskForm {
    title: Some("orphan".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(no_project.is_none());

  assert!(s.list_tasks(p.project_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn nesting_is_limited_to_one_level_within_a_project() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let other = project(&s, &alice, "other").await;
  let parent = task(&s, &alice, p.project_id, None, "parent", None).await;
  let child = task(&s, &alice, p.project_id, Some(parent.task_id), "child", None).await;
  assert_eq!(child.parent_id, Some(parent.task_id));

  let attempt = |project_id: Uuid, parent_id: Uuid| {
    create_task(&s, Some(&alice), TaskForm {
      project_id: Some(project_id.to_string()),
      parent_id: Some(parent_id.to_string()),
      title: Some("nested".into()),
      ..Default::default()
    })
  };

  assert!(matches!(
    attempt(p.project_id, child.task_id).await,
    Err(Error::Validation(_))
  ));
  assert!(matches!(
    attempt(other.project_id, parent.task_id).await,
    Err(Error::Validation(_))
  ));
  assert!(matches!(
    attempt(p.project_id, Uuid::new_v4()).await,
    Err(Error::NotFound(_))
  ));
  assert_eq!(s.list_tasks(p.project_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn complete_then_undo() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let t = task(&s, &alice, p.project_id, None, "t", None).await;

  let done = complete_task(&s, Some(&alice), t.task_id, Completion {
    actual_minutes: 45,
    reflection:     Some("took longer".into()),
  })
  .await
  .unwrap();
  assert_eq!(done.revalidate, [ViewPath::Root, ViewPath::Project(p.project_id)]);

  let stored = s.get_task(t.task_id).await.unwrap().unwrap();
  assert_eq!(stored.status, TaskStatus::Done);
  assert_eq!(stored.actual_minutes, Some(45));
  assert_eq!(stored.reflection.as_deref(), Some("took longer"));

  for _ in 0..2 {
    undo_task(&s, Some(&alice), t.task_id).await.unwrap();
    let stored = s.get_task(t.task_id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Todo);
    assert_eq!(stored.actual_minutes, None);
  }
}

#[tokio::test]
async fn negative_minutes_and_blank_reflection_are_cleaned() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;
  let t = task(&s, &alice, p.project_id, None, "t", None).await;

  complete_task(&s, Some(&alice), t.task_id, Completion {
    actual_minutes: -5,
    reflection:     Some("  ".into()),
  })
  .await
  .unwrap();

  let stored = s.get_task(t.task_id).await.unwrap().unwrap();
  assert!(stored.is_done());
  assert_eq!(stored.actual_minutes, Some(0));
  assert_eq!(stored.reflection, None);
}

#[tokio::test]
async fn member_can_edit_tasks() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "p").await;
  s.upsert_member(p.project_id, bob.user_id).await.unwrap();
  let t = task(&s, &bob, p.project_id, None, "t", None).await;

  update_task(&s, Some(&bob), t.task_id, TaskDetailsForm {
    title: Some("renamed".into()),
    importance: Some("4".into()),
    estimated_minutes: Some("90".into()),
    ..Default::default()
  })
  .await
  .unwrap()
  .unwrap();
  update_task_due_date(&s, Some(&bob), t.task_id, Some("2025-06-01T09:30"))
    .await
    .unwrap();

  let stored = s.get_task(t.task_id).await.unwrap().unwrap();
  assert_eq!(stored.title, "renamed");
  assert_eq!(stored.importance, 4);
  assert_eq!(stored.urgency, 3);
  assert_eq!(stored.estimated_minutes, 90);
  assert_eq!(
    stored.due_date.map(|d| d.to_rfc3339()),
    Some("2025-06-01T09:30:00+00:00".to_string())
  );

  update_task_due_date(&s, Some(&bob), t.task_id, Some("")).await.unwrap();
  let stored = s.get_task(t.task_id).await.unwrap().unwrap();
  assert_eq!(stored.due_date, None);
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_member_rejections_do_not_write() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let p = project(&s, &alice, "p").await;

  let add = |email: &str| {
    add_member(&s, Some(&alice), p.project_id, MemberForm {
      email: Some(email.to_owned()),
    })
  };

  let empty = add("  ").await.unwrap();
  assert!(!empty.data.ok);
  assert!(empty.revalidate.is_empty());

  let unknown = add("ghost@example.com").await.unwrap();
  assert!(!unknown.data.ok);
  assert!(unknown.data.message.contains("ghost@example.com"));

  let owner = add("ALICE@example.com").await.unwrap();
  assert!(!owner.data.ok);

  assert!(s.list_members(p.project_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_member_twice_keeps_one_row() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "p").await;

  for email in ["bob@example.com", " Bob@Example.com "] {
    let added = add_member(&s, Some(&alice), p.project_id, MemberForm {
      email: Some(email.into()),
    })
    .await
    .unwrap();
    assert!(added.data.ok);
    assert_eq!(added.revalidate.len(), 2);
  }

  let members = s.list_members(p.project_id).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].user_id, bob.user_id);
}

#[tokio::test]
async fn owner_cannot_be_removed() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;
  let p = project(&s, &alice, "p").await;
  s.upsert_member(p.project_id, bob.user_id).await.unwrap();

  let refused = remove_member(&s, Some(&alice), p.project_id, alice.user_id)
    .await
    .unwrap();
  assert!(!refused.data.ok);
  assert!(refused.revalidate.is_empty());

  let removed = remove_member(&s, Some(&alice), p.project_id, bob.user_id)
    .await
    .unwrap();
  assert!(removed.data.ok);
  assert!(s.list_members(p.project_id).await.unwrap().is_empty());
  assert!(
    s.find_accessible_project(p.project_id, bob.user_id)
      .await
      .unwrap()
      .is_none()
  );
}
