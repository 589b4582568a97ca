//! SQL schema for the PM-Master SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Workspace mirror of authenticated identities.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id   TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    due_date     TEXT,                          -- RFC 3339 UTC or NULL
    status       TEXT NOT NULL DEFAULT 'ACTIVE', -- 'ACTIVE' | 'COMPLETED'
    owner_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL
);

-- Non-owner access grants. The owner never appears here.
CREATE TABLE IF NOT EXISTS project_members (
    member_id   TEXT PRIMARY KEY,
    project_id  TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    UNIQUE (project_id, user_id)
);

-- parent_id NULL = parent task; non-NULL = child task.
CREATE TABLE IF NOT EXISTS tasks (
    task_id            TEXT PRIMARY KEY,
    project_id         TEXT NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    parent_id          TEXT REFERENCES tasks(task_id) ON DELETE CASCADE,
    title              TEXT NOT NULL,
    status             TEXT NOT NULL DEFAULT 'TODO',   -- 'TODO' | 'DONE'
    importance         INTEGER NOT NULL DEFAULT 3,
    urgency            INTEGER NOT NULL DEFAULT 3,
    estimated_minutes  INTEGER NOT NULL DEFAULT 0,
    actual_minutes     INTEGER,
    reflection         TEXT,
    due_date           TEXT,
    created_at         TEXT NOT NULL
);

-- Identity side: credentials and sessions.
CREATE TABLE IF NOT EXISTS accounts (
    user_id        TEXT PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_digest  TEXT PRIMARY KEY,  -- SHA-256 hex of the bearer token
    user_id       TEXT NOT NULL REFERENCES accounts(user_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    expires_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS projects_owner_idx   ON projects(owner_id);
CREATE INDEX IF NOT EXISTS members_user_idx     ON project_members(user_id);
CREATE INDEX IF NOT EXISTS tasks_project_idx    ON tasks(project_id);
CREATE INDEX IF NOT EXISTS tasks_parent_idx     ON tasks(parent_id);
CREATE INDEX IF NOT EXISTS tasks_due_idx        ON tasks(due_date);
CREATE INDEX IF NOT EXISTS sessions_user_idx    ON sessions(user_id);

PRAGMA user_version = 1;
";
