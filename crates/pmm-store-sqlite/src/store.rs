//! [`SqliteStore`]: the SQLite implementation of [`WorkspaceStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Params};
use uuid::Uuid;

use pmm_core::{
  project::{NewProject, Project, ProjectMember, ProjectStatus, ProjectUpdate},
  store::{ProjectTask, TaskAccess, WorkspaceStore},
  task::{NewTask, Task, TaskDetails, TaskLevel, TaskStatus},
  user::User,
};

use crate::{
  Error, Result,
  encode::{
    ACCESSIBLE_BY_USER, PROJECT_COLUMNS, RawMember, RawProject, RawTask, RawUser,
    TASK_COLUMN_COUNT, TASK_COLUMNS, USER_COLUMNS, decode_uuid, encode_dt,
    encode_opt_dt, encode_uuid, now, stored_precision,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PM-Master store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one `UPDATE`/`DELETE` and return the number of rows it touched.
  async fn execute<P>(&self, sql: &'static str, params: P) -> Result<usize>
  where
    P: Params + Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.execute(sql, params)?))
        .await?,
    )
  }

  /// Run a query whose rows start with [`TASK_COLUMNS`].
  async fn query_tasks<P>(&self, sql: String, params: P) -> Result<Vec<Task>>
  where
    P: Params + Send + 'static,
  {
    let raws: Vec<RawTask> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params, RawTask::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTask::into_task).collect()
  }

  async fn query_project<P>(&self, sql: String, params: P) -> Result<Option<Project>>
  where
    P: Params + Send + 'static,
  {
    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, params, RawProject::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }
}

fn require_project(touched: usize, project_id: Uuid) -> Result<()> {
  if touched == 0 {
    return Err(Error::ProjectNotFound(project_id));
  }
  Ok(())
}

fn require_task(touched: usize, task_id: Uuid) -> Result<()> {
  if touched == 0 {
    return Err(Error::TaskNotFound(task_id));
  }
  Ok(())
}

fn level_predicate(level: TaskLevel) -> &'static str {
  match level {
    TaskLevel::Parent => "parent_id IS NULL",
    TaskLevel::Child => "parent_id IS NOT NULL",
  }
}

// ─── WorkspaceStore impl ─────────────────────────────────────────────────────

impl WorkspaceStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1"),
              rusqlite::params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn insert_user(&self, user: User) -> Result<User> {
    let user = User {
      created_at: stored_precision(user.created_at),
      ..user
    };
    let id_str = encode_uuid(user.user_id);
    let email  = user.email.clone();
    let name   = user.name.clone();
    let at_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let project = Project {
      project_id:  Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      due_date:    input.due_date.map(stored_precision),
      status:      ProjectStatus::Active,
      owner_id:    input.owner_id,
      created_at:  now(),
    };

    let id_str     = encode_uuid(project.project_id);
    let title      = project.title.clone();
    let desc       = project.description.clone();
    let due_str    = encode_opt_dt(project.due_date);
    let status_str = project.status.to_string();
    let owner_str  = encode_uuid(project.owner_id);
    let at_str     = encode_dt(project.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (
             project_id, title, description, due_date, status, owner_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, title, desc, due_str, status_str, owner_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(project)
  }

  async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>> {
    self
      .query_project(
        format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.project_id = ?1"),
        (encode_uuid(project_id),),
      )
      .await
  }

  async fn find_accessible_project(
    &self,
    project_id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<Project>> {
    self
      .query_project(
        format!(
          "SELECT {PROJECT_COLUMNS} FROM projects p
           WHERE p.project_id = ?2 AND {ACCESSIBLE_BY_USER}"
        ),
        (encode_uuid(user_id), encode_uuid(project_id)),
      )
      .await
  }

  async fn list_accessible_projects(&self, user_id: Uuid) -> Result<Vec<Project>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROJECT_COLUMNS} FROM projects p
           WHERE {ACCESSIBLE_BY_USER}
           ORDER BY p.due_date IS NULL, p.due_date ASC, p.created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawProject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn update_project(&self, project_id: Uuid, update: ProjectUpdate) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE projects SET title = ?2, description = ?3, due_date = ?4
         WHERE project_id = ?1",
        (
          encode_uuid(project_id),
          update.title,
          update.description,
          encode_opt_dt(update.due_date),
        ),
      )
      .await?;
    require_project(touched, project_id)
  }

  async fn set_project_due_date(
    &self,
    project_id: Uuid,
    due_date: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE projects SET due_date = ?2 WHERE project_id = ?1",
        (encode_uuid(project_id), encode_opt_dt(due_date)),
      )
      .await?;
    require_project(touched, project_id)
  }

  async fn set_project_status(&self, project_id: Uuid, status: ProjectStatus) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE projects SET status = ?2 WHERE project_id = ?1",
        (encode_uuid(project_id), status.to_string()),
      )
      .await?;
    require_project(touched, project_id)
  }

  async fn delete_project(&self, project_id: Uuid) -> Result<()> {
    let touched = self
      .execute(
        "DELETE FROM projects WHERE project_id = ?1",
        (encode_uuid(project_id),),
      )
      .await?;
    require_project(touched, project_id)
  }

  // ── Members ───────────────────────────────────────────────────────────────

  async fn upsert_member(&self, project_id: Uuid, user_id: Uuid) -> Result<ProjectMember> {
    let member_str  = encode_uuid(Uuid::new_v4());
    let project_str = encode_uuid(project_id);
    let user_str    = encode_uuid(user_id);
    let at_str      = encode_dt(now());

    let raw: RawMember = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO project_members (member_id, project_id, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (project_id, user_id) DO NOTHING",
          rusqlite::params![member_str, project_str, user_str, at_str],
        )?;

        Ok(conn.query_row(
          "SELECT member_id, project_id, user_id, created_at
           FROM project_members WHERE project_id = ?1 AND user_id = ?2",
          rusqlite::params![project_str, user_str],
          |row| {
            Ok(RawMember {
              member_id:  row.get(0)?,
              project_id: row.get(1)?,
              user_id:    row.get(2)?,
              created_at: row.get(3)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_member()
  }

  async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> Result<usize> {
    self
      .execute(
        "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
        (encode_uuid(project_id), encode_uuid(user_id)),
      )
      .await
  }

  async fn list_members(&self, project_id: Uuid) -> Result<Vec<User>> {
    let project_str = encode_uuid(project_id);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS}
           FROM project_members m
           JOIN users u ON u.user_id = m.user_id
           WHERE m.project_id = ?1
           ORDER BY m.created_at ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![project_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  async fn create_task(&self, input: NewTask) -> Result<Task> {
    let task = Task {
      task_id:           Uuid::new_v4(),
      project_id:        input.project_id,
      parent_id:         input.parent_id,
      title:             input.title,
      status:            TaskStatus::Todo,
      importance:        input.importance,
      urgency:           input.urgency,
      estimated_minutes: input.estimated_minutes,
      actual_minutes:    None,
      reflection:        None,
      due_date:          input.due_date.map(stored_precision),
      created_at:        now(),
    };

    let id_str      = encode_uuid(task.task_id);
    let project_str = encode_uuid(task.project_id);
    let parent_str  = task.parent_id.map(encode_uuid);
    let title       = task.title.clone();
    let status_str  = task.status.to_string();
    let importance  = task.importance;
    let urgency     = task.urgency;
    let estimate    = task.estimated_minutes;
    let due_str     = encode_opt_dt(task.due_date);
    let at_str      = encode_dt(task.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tasks (
             task_id, project_id, parent_id, title, status,
             importance, urgency, estimated_minutes, due_date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            project_str,
            parent_str,
            title,
            status_str,
            importance,
            urgency,
            estimate,
            due_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(task)
  }

  async fn get_task(&self, task_id: Uuid) -> Result<Option<Task>> {
    let mut tasks = self
      .query_tasks(
        format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.task_id = ?1"),
        (encode_uuid(task_id),),
      )
      .await?;
    Ok(tasks.pop())
  }

  async fn task_access(&self, task_id: Uuid, user_id: Uuid) -> Result<Option<TaskAccess>> {
    let task_str = encode_uuid(task_id);
    let user_str = encode_uuid(user_id);

    let raw: Option<(RawTask, String, bool)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {TASK_COLUMNS}, p.owner_id,
                   EXISTS (
                     SELECT 1 FROM project_members m
                     WHERE m.project_id = t.project_id AND m.user_id = ?2
                   )
                 FROM tasks t
                 JOIN projects p ON p.project_id = t.project_id
                 WHERE t.task_id = ?1"
              ),
              rusqlite::params![task_str, user_str],
              |row| {
                Ok((
                  RawTask::from_row(row)?,
                  row.get(TASK_COLUMN_COUNT)?,
                  row.get(TASK_COLUMN_COUNT + 1)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(task, owner_id, is_member)| {
        Ok(TaskAccess {
          task: task.into_task()?,
          owner_id: decode_uuid(&owner_id)?,
          is_member,
        })
      })
      .transpose()
  }

  async fn update_task_details(&self, task_id: Uuid, details: TaskDetails) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE tasks SET
           title = ?2, importance = ?3, urgency = ?4,
           estimated_minutes = ?5, due_date = ?6
         WHERE task_id = ?1",
        (
          encode_uuid(task_id),
          details.title,
          details.importance,
          details.urgency,
          details.estimated_minutes,
          encode_opt_dt(details.due_date),
        ),
      )
      .await?;
    require_task(touched, task_id)
  }

  async fn set_task_due_date(
    &self,
    task_id: Uuid,
    due_date: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE tasks SET due_date = ?2 WHERE task_id = ?1",
        (encode_uuid(task_id), encode_opt_dt(due_date)),
      )
      .await?;
    require_task(touched, task_id)
  }

  async fn complete_task(
    &self,
    task_id: Uuid,
    actual_minutes: i32,
    reflection: Option<String>,
  ) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE tasks SET status = ?2, actual_minutes = ?3, reflection = ?4
         WHERE task_id = ?1",
        (
          encode_uuid(task_id),
          TaskStatus::Done.to_string(),
          actual_minutes,
          reflection,
        ),
      )
      .await?;
    require_task(touched, task_id)
  }

  async fn reopen_task(&self, task_id: Uuid) -> Result<()> {
    let touched = self
      .execute(
        "UPDATE tasks SET status = ?2, actual_minutes = NULL WHERE task_id = ?1",
        (encode_uuid(task_id), TaskStatus::Todo.to_string()),
      )
      .await?;
    require_task(touched, task_id)
  }

  async fn delete_task(&self, task_id: Uuid) -> Result<()> {
    let touched = self
      .execute("DELETE FROM tasks WHERE task_id = ?1", (encode_uuid(task_id),))
      .await?;
    require_task(touched, task_id)
  }

  async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Task>> {
    self
      .query_tasks(
        format!(
          "SELECT {TASK_COLUMNS} FROM tasks t
           WHERE t.project_id = ?1
           ORDER BY t.due_date IS NULL, t.due_date ASC, t.created_at ASC"
        ),
        (encode_uuid(project_id),),
      )
      .await
  }

  async fn count_tasks(
    &self,
    project_id: Uuid,
    level: TaskLevel,
    status: TaskStatus,
  ) -> Result<u64> {
    let sql = format!(
      "SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND status = ?2 AND {}",
      level_predicate(level),
    );
    let project_str = encode_uuid(project_id);
    let status_str  = status.to_string();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![project_str, status_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn next_open_child_task(&self, project_id: Uuid) -> Result<Option<Task>> {
    let mut tasks = self
      .query_tasks(
        format!(
          "SELECT {TASK_COLUMNS} FROM tasks t
           WHERE t.project_id = ?1 AND t.status = ?2 AND t.parent_id IS NOT NULL
           ORDER BY t.due_date IS NULL, t.due_date ASC, t.created_at ASC
           LIMIT 1"
        ),
        (encode_uuid(project_id), TaskStatus::Todo.to_string()),
      )
      .await?;
    Ok(tasks.pop())
  }

  async fn due_child_tasks(
    &self,
    user_id: Uuid,
    deadline: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<ProjectTask>> {
    let user_str     = encode_uuid(user_id);
    let deadline_str = encode_dt(deadline);
    let status_str   = TaskStatus::Todo.to_string();
    let limit_val    = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<(RawTask, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TASK_COLUMNS}, p.title
           FROM tasks t
           JOIN projects p ON p.project_id = t.project_id
           WHERE {ACCESSIBLE_BY_USER}
             AND t.parent_id IS NOT NULL
             AND t.status = ?3
             AND t.due_date IS NOT NULL
             AND t.due_date <= ?2
           ORDER BY t.due_date ASC, t.created_at ASC
           LIMIT ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_str, deadline_str, status_str, limit_val],
            |row| Ok((RawTask::from_row(row)?, row.get(TASK_COLUMN_COUNT)?)),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(task, project_title)| {
        Ok(ProjectTask { task: task.into_task()?, project_title })
      })
      .collect()
  }

  async fn completed_tasks(&self, user_id: Uuid) -> Result<Vec<Task>> {
    self
      .query_tasks(
        format!(
          "SELECT {TASK_COLUMNS}
           FROM tasks t
           JOIN projects p ON p.project_id = t.project_id
           WHERE {ACCESSIBLE_BY_USER}
             AND t.status = ?2
             AND t.actual_minutes IS NOT NULL
           ORDER BY t.created_at ASC"
        ),
        (encode_uuid(user_id), TaskStatus::Done.to_string()),
      )
      .await
  }
}
