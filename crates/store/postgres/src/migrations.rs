use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating required tables if they do not exist.
///
/// Uniqueness of the signature owner and of `(round, signature)` pairs is
/// enforced here; the store relies on both.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let users = config.users_table();
    let documents = config.documents_table();
    let signatures = config.signatures_table();
    let rounds = config.rounds_table();
    let statuses = config.statuses_table();
    let logs = config.logs_table();
    let prefix = &config.table_prefix;

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS {users} (
                id          BIGSERIAL PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                role        TEXT NOT NULL DEFAULT 'signer',
                post        TEXT,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {documents} (
                id          BIGSERIAL PRIMARY KEY,
                title       TEXT NOT NULL,
                file        TEXT NOT NULL,
                owner_id    BIGINT NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {signatures} (
                id          BIGSERIAL PRIMARY KEY,
                user_id     BIGINT NOT NULL UNIQUE REFERENCES {users} (id) ON DELETE CASCADE,
                file        TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {rounds} (
                id            BIGSERIAL PRIMARY KEY,
                document_id   BIGINT NOT NULL REFERENCES {documents} (id) ON DELETE CASCADE,
                edited_file   TEXT NOT NULL,
                requester_id  BIGINT NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                draft         BOOLEAN NOT NULL DEFAULT TRUE,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {statuses} (
                id            BIGSERIAL PRIMARY KEY,
                round_id      BIGINT NOT NULL REFERENCES {rounds} (id) ON DELETE CASCADE,
                signature_id  BIGINT NOT NULL REFERENCES {signatures} (id) ON DELETE CASCADE,
                status        TEXT NOT NULL DEFAULT 'pending'
                              CHECK (status IN ('pending', 'approved', 'rejected')),
                updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (round_id, signature_id)
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {logs} (
                id           BIGSERIAL PRIMARY KEY,
                document_id  BIGINT NOT NULL REFERENCES {documents} (id) ON DELETE CASCADE,
                round_id     BIGINT NOT NULL REFERENCES {rounds} (id) ON DELETE CASCADE,
                status_id    BIGINT NOT NULL REFERENCES {statuses} (id) ON DELETE CASCADE,
                signer_id    BIGINT NOT NULL REFERENCES {users} (id) ON DELETE CASCADE,
                action       TEXT NOT NULL CHECK (action IN ('approve', 'reject')),
                timestamp    TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}statuses_signature ON {statuses} (signature_id)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{prefix}rounds_requester ON {rounds} (requester_id, created_at DESC)"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{prefix}logs_round ON {logs} (round_id, id)"),
    ];

    for stmt in &statements {
        sqlx::query(stmt).execute(pool).await?;
    }

    Ok(())
}
