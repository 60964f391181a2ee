use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};

use signet_core::{
    ApprovalStatus, Decision, Document, DocumentId, NewDocument, NewRound, NewUser, Round,
    RoundId, RoundTally, Signature, SignatureId, StatusDetail, StatusId, StatusRow, User, UserId,
    VerificationLog,
};
use signet_store::{
    DecisionResult, FinalizeResult, RoundFilter, SignatureUpsert, StoreError, WorkflowStore,
};

use crate::config::PostgresConfig;
use crate::migrations;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Build `PgConnectOptions` from a [`PostgresConfig`], applying SSL settings
/// when configured.
pub(crate) fn build_connect_options(
    config: &PostgresConfig,
) -> Result<sqlx::postgres::PgConnectOptions, StoreError> {
    let mut options: sqlx::postgres::PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| StoreError::Connection(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => sqlx::postgres::PgSslMode::Disable,
            "prefer" => sqlx::postgres::PgSslMode::Prefer,
            "require" => sqlx::postgres::PgSslMode::Require,
            "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
            "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
            other => {
                return Err(StoreError::Connection(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// Map a driver error, translating constraint violations into the
/// store's domain errors.
fn db_err(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::Conflict(db.message().to_owned()),
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::MissingReference(db.message().to_owned());
            }
            _ => {}
        }
    }
    warn!(error = %e, "postgres operation failed");
    StoreError::Backend(e.to_string())
}

fn parse_err(e: signet_core::ParseError) -> StoreError {
    StoreError::Serialization(e.to_string())
}

#[allow(clippy::cast_sign_loss)]
fn count(n: i64) -> u64 {
    n.max(0) as u64
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    post: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            role: row.role.parse().map_err(parse_err)?,
            post: row.post,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    file: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: DocumentId::new(row.id),
            title: row.title,
            file: row.file,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SignatureRow {
    id: i64,
    user_id: i64,
    file: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SignatureRow> for Signature {
    fn from(row: SignatureRow) -> Self {
        Self {
            id: SignatureId::new(row.id),
            user_id: UserId::new(row.user_id),
            file: row.file,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoundRow {
    id: i64,
    document_id: i64,
    edited_file: String,
    requester_id: i64,
    draft: bool,
    created_at: DateTime<Utc>,
}

impl From<RoundRow> for Round {
    fn from(row: RoundRow) -> Self {
        Self {
            id: RoundId::new(row.id),
            document_id: DocumentId::new(row.document_id),
            edited_file: row.edited_file,
            requester_id: UserId::new(row.requester_id),
            draft: row.draft,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TallyRow {
    #[sqlx(flatten)]
    round: RoundRow,
    total: i64,
    approved: i64,
    rejected: i64,
    pending: i64,
}

impl From<TallyRow> for RoundTally {
    fn from(row: TallyRow) -> Self {
        Self {
            round: row.round.into(),
            total: count(row.total),
            approved: count(row.approved),
            rejected: count(row.rejected),
            pending: count(row.pending),
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatusRowRecord {
    id: i64,
    round_id: i64,
    signature_id: i64,
    status: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StatusRowRecord> for StatusRow {
    type Error = StoreError;

    fn try_from(row: StatusRowRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StatusId::new(row.id),
            round_id: RoundId::new(row.round_id),
            signature_id: SignatureId::new(row.signature_id),
            status: row.status.parse().map_err(parse_err)?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatusDetailRow {
    status_id: i64,
    signature_id: i64,
    signer_id: i64,
    signer_name: String,
    status: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StatusDetailRow> for StatusDetail {
    type Error = StoreError;

    fn try_from(row: StatusDetailRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status_id: StatusId::new(row.status_id),
            signature_id: SignatureId::new(row.signature_id),
            signer_id: UserId::new(row.signer_id),
            signer_name: row.signer_name,
            status: row.status.parse().map_err(parse_err)?,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    document_id: i64,
    round_id: i64,
    status_id: i64,
    signer_id: i64,
    action: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<LogRow> for VerificationLog {
    type Error = StoreError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: signet_core::LogId::new(row.id),
            document_id: DocumentId::new(row.document_id),
            round_id: RoundId::new(row.round_id),
            status_id: StatusId::new(row.status_id),
            signer_id: UserId::new(row.signer_id),
            action: row.action.parse().map_err(parse_err)?,
            timestamp: row.timestamp,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, role, post, created_at";
const DOCUMENT_COLUMNS: &str = "id, title, file, owner_id, created_at, updated_at";
const SIGNATURE_COLUMNS: &str = "id, user_id, file, created_at, updated_at";
const ROUND_COLUMNS: &str = "id, document_id, edited_file, requester_id, draft, created_at";
const STATUS_COLUMNS: &str = "id, round_id, signature_id, status, updated_at";
const LOG_COLUMNS: &str = "id, document_id, round_id, status_id, signer_id, action, timestamp";

/// PostgreSQL-backed implementation of [`WorkflowStore`].
///
/// Multi-row writes (round creation, decisions) run inside a single
/// transaction; conditional transitions are expressed as guarded `UPDATE`s.
pub struct PostgresWorkflowStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresWorkflowStore {
    /// Connect, create the pool, and run migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if pool creation fails, or
    /// [`StoreError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StoreError> {
        let connect_options = build_connect_options(&config)?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Wrap an existing pool. Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl WorkflowStore for PostgresWorkflowStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let table = self.config.users_table();
        let sql = format!(
            "INSERT INTO {table} (username, email, role, post) VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(&user.post)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        row.try_into()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let table = self.config.users_table();
        let sql = format!("SELECT {USER_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(User::try_from).transpose()
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        let table = self.config.users_table();
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let (n,): (i64,) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count(n))
    }

    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError> {
        let table = self.config.documents_table();
        let sql = format!(
            "INSERT INTO {table} (title, file, owner_id) VALUES ($1, $2, $3)
             RETURNING {DOCUMENT_COLUMNS}"
        );
        let row: DocumentRow = sqlx::query_as(&sql)
            .bind(&document.title)
            .bind(&document.file)
            .bind(document.owner_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.into())
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        let table = self.config.documents_table();
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn upsert_signature(
        &self,
        user_id: UserId,
        file: &str,
    ) -> Result<SignatureUpsert, StoreError> {
        let table = self.config.signatures_table();
        let users = self.config.users_table();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // The signature row may not exist yet, so first uploads serialize on the owner.
        let lock_owner = format!("SELECT id FROM {users} WHERE id = $1 FOR UPDATE");
        let owner: Option<(i64,)> = sqlx::query_as(&lock_owner)
            .bind(user_id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if owner.is_none() {
            return Err(StoreError::MissingReference(format!("user {user_id}")));
        }

        let select = format!("SELECT file FROM {table} WHERE user_id = $1");
        let previous: Option<(String,)> = sqlx::query_as(&select)
            .bind(user_id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;

        let upsert = format!(
            "INSERT INTO {table} (user_id, file) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET file = EXCLUDED.file, updated_at = NOW()
             RETURNING {SIGNATURE_COLUMNS}"
        );
        let row: SignatureRow = sqlx::query_as(&upsert)
            .bind(user_id.get())
            .bind(file)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        debug!(%user_id, replaced = previous.is_some(), "signature upsert committed");

        Ok(SignatureUpsert {
            signature: row.into(),
            replaced_file: previous.map(|(f,)| f),
        })
    }

    async fn get_signature(&self, id: SignatureId) -> Result<Option<Signature>, StoreError> {
        let table = self.config.signatures_table();
        let sql = format!("SELECT {SIGNATURE_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<SignatureRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn list_signatures(&self, owner: Option<UserId>) -> Result<Vec<Signature>, StoreError> {
        let table = self.config.signatures_table();
        let sql = format!(
            "SELECT {SIGNATURE_COLUMNS} FROM {table}
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<SignatureRow> = sqlx::query_as(&sql)
            .bind(owner.map(UserId::get))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_round(
        &self,
        round: NewRound,
        signatures: &[SignatureId],
    ) -> Result<(Round, Vec<StatusRow>), StoreError> {
        let documents = self.config.documents_table();
        let sig_table = self.config.signatures_table();
        let rounds = self.config.rounds_table();
        let statuses = self.config.statuses_table();

        let mut seen = HashSet::with_capacity(signatures.len());
        if let Some(dup) = signatures.iter().find(|id| !seen.insert(**id)) {
            return Err(StoreError::Conflict(format!(
                "signature {dup} listed twice"
            )));
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let lock_document = format!("SELECT id FROM {documents} WHERE id = $1 FOR SHARE");
        let document: Option<(i64,)> = sqlx::query_as(&lock_document)
            .bind(round.document_id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if document.is_none() {
            return Err(StoreError::MissingReference(format!(
                "document {}",
                round.document_id
            )));
        }

        let ids: Vec<i64> = signatures.iter().map(|id| id.get()).collect();
        let lock = format!("SELECT id FROM {sig_table} WHERE id = ANY($1) FOR SHARE");
        let found: Vec<(i64,)> = sqlx::query_as(&lock)
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_err)?;
        let found: HashSet<i64> = found.into_iter().map(|(id,)| id).collect();
        if let Some(missing) = signatures.iter().find(|id| !found.contains(&id.get())) {
            debug!(signature_id = %missing, "round creation rolled back");
            return Err(StoreError::MissingReference(format!("signature {missing}")));
        }

        let insert_round = format!(
            "INSERT INTO {rounds} (document_id, edited_file, requester_id, draft)
             VALUES ($1, $2, $3, $4)
             RETURNING {ROUND_COLUMNS}"
        );
        let created: RoundRow = sqlx::query_as(&insert_round)
            .bind(round.document_id.get())
            .bind(&round.edited_file)
            .bind(round.requester_id.get())
            .bind(round.draft)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        let insert_status = format!(
            "INSERT INTO {statuses} (round_id, signature_id) VALUES ($1, $2)
             RETURNING {STATUS_COLUMNS}"
        );
        let mut rows = Vec::with_capacity(signatures.len());
        for id in signatures {
            let row: StatusRowRecord = sqlx::query_as(&insert_status)
                .bind(created.id)
                .bind(id.get())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;
            rows.push(StatusRow::try_from(row)?);
        }

        tx.commit().await.map_err(db_err)?;
        debug!(round_id = created.id, statuses = rows.len(), "round creation committed");
        Ok((created.into(), rows))
    }

    async fn get_round(&self, id: RoundId) -> Result<Option<Round>, StoreError> {
        let table = self.config.rounds_table();
        let sql = format!("SELECT {ROUND_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<RoundRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Into::into))
    }

    async fn finalize_round(
        &self,
        id: RoundId,
        requester: UserId,
    ) -> Result<FinalizeResult, StoreError> {
        let table = self.config.rounds_table();
        let update = format!(
            "UPDATE {table} SET draft = FALSE
             WHERE id = $1 AND requester_id = $2 AND draft = TRUE
             RETURNING {ROUND_COLUMNS}"
        );
        let updated: Option<RoundRow> = sqlx::query_as(&update)
            .bind(id.get())
            .bind(requester.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        if let Some(row) = updated {
            return Ok(FinalizeResult::Finalized(row.into()));
        }

        let probe = format!("SELECT draft FROM {table} WHERE id = $1 AND requester_id = $2");
        let owned: Option<(bool,)> = sqlx::query_as(&probe)
            .bind(id.get())
            .bind(requester.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(match owned {
            Some(_) => FinalizeResult::AlreadyFinal,
            None => FinalizeResult::NotFound,
        })
    }

    async fn round_tallies(&self, filter: &RoundFilter) -> Result<Vec<RoundTally>, StoreError> {
        let rounds = self.config.rounds_table();
        let statuses = self.config.statuses_table();
        let sql = format!(
            "SELECT r.id, r.document_id, r.edited_file, r.requester_id, r.draft, r.created_at,
                    COUNT(s.id) AS total,
                    COUNT(s.id) FILTER (WHERE s.status = 'approved') AS approved,
                    COUNT(s.id) FILTER (WHERE s.status = 'rejected') AS rejected,
                    COUNT(s.id) FILTER (WHERE s.status = 'pending') AS pending
             FROM {rounds} r
             LEFT JOIN {statuses} s ON s.round_id = r.id
             WHERE ($1 OR r.draft = FALSE)
               AND ($2::BIGINT[] IS NULL OR r.id = ANY($2))
               AND ($3::BIGINT IS NULL OR r.requester_id = $3)
             GROUP BY r.id
             ORDER BY r.created_at DESC, r.id DESC"
        );
        let ids: Option<Vec<i64>> = filter
            .ids
            .as_ref()
            .map(|ids| ids.iter().map(|id| id.get()).collect());
        let rows: Vec<TallyRow> = sqlx::query_as(&sql)
            .bind(filter.include_drafts)
            .bind(ids)
            .bind(filter.requester.map(UserId::get))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_rounds_for_signature(
        &self,
        signature: SignatureId,
    ) -> Result<Vec<Round>, StoreError> {
        let rounds = self.config.rounds_table();
        let statuses = self.config.statuses_table();
        let sql = format!(
            "SELECT {ROUND_COLUMNS} FROM {rounds} r
             WHERE r.draft = FALSE
               AND EXISTS (SELECT 1 FROM {statuses} s
                           WHERE s.round_id = r.id AND s.signature_id = $1)
             ORDER BY r.created_at DESC, r.id DESC"
        );
        let rows: Vec<RoundRow> = sqlx::query_as(&sql)
            .bind(signature.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn status_details(&self, round: RoundId) -> Result<Vec<StatusDetail>, StoreError> {
        let statuses = self.config.statuses_table();
        let signatures = self.config.signatures_table();
        let users = self.config.users_table();
        let sql = format!(
            "SELECT s.id AS status_id, s.signature_id, u.id AS signer_id,
                    u.username AS signer_name, s.status, s.updated_at
             FROM {statuses} s
             JOIN {signatures} g ON g.id = s.signature_id
             JOIN {users} u ON u.id = g.user_id
             WHERE s.round_id = $1
             ORDER BY s.id"
        );
        let rows: Vec<StatusDetailRow> = sqlx::query_as(&sql)
            .bind(round.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(StatusDetail::try_from).collect()
    }

    async fn get_status(&self, id: StatusId) -> Result<Option<StatusRow>, StoreError> {
        let table = self.config.statuses_table();
        let sql = format!("SELECT {STATUS_COLUMNS} FROM {table} WHERE id = $1");
        let row: Option<StatusRowRecord> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(StatusRow::try_from).transpose()
    }

    async fn apply_decision(
        &self,
        id: StatusId,
        decision: Decision,
        signer: UserId,
        allow_redecision: bool,
    ) -> Result<DecisionResult, StoreError> {
        let statuses = self.config.statuses_table();
        let rounds = self.config.rounds_table();
        let logs = self.config.logs_table();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let lock = format!(
            "SELECT s.status, r.id, r.document_id
             FROM {statuses} s JOIN {rounds} r ON r.id = s.round_id
             WHERE s.id = $1
             FOR UPDATE OF s"
        );
        let current: Option<(String, i64, i64)> = sqlx::query_as(&lock)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        let Some((status, round_id, document_id)) = current else {
            return Ok(DecisionResult::NotFound);
        };
        let status: ApprovalStatus = status.parse().map_err(parse_err)?;
        if !allow_redecision && status.is_decided() {
            debug!(status_id = %id, current = %status, "decision refused, row already decided");
            return Ok(DecisionResult::AlreadyDecided(status));
        }

        let update = format!(
            "UPDATE {statuses} SET status = $2, updated_at = NOW() WHERE id = $1
             RETURNING {STATUS_COLUMNS}"
        );
        let row: StatusRowRecord = sqlx::query_as(&update)
            .bind(id.get())
            .bind(decision.outcome().as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        let insert_log = format!(
            "INSERT INTO {logs} (document_id, round_id, status_id, signer_id, action)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LOG_COLUMNS}"
        );
        let log: LogRow = sqlx::query_as(&insert_log)
            .bind(document_id)
            .bind(round_id)
            .bind(id.get())
            .bind(signer.get())
            .bind(decision.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        debug!(status_id = %id, action = %decision, "decision committed");

        Ok(DecisionResult::Applied {
            status: row.try_into()?,
            log: log.try_into()?,
        })
    }

    async fn decision_log(&self, round: RoundId) -> Result<Vec<VerificationLog>, StoreError> {
        let table = self.config.logs_table();
        let sql = format!("SELECT {LOG_COLUMNS} FROM {table} WHERE round_id = $1 ORDER BY id");
        let rows: Vec<LogRow> = sqlx::query_as(&sql)
            .bind(round.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(VerificationLog::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_accept_known_ssl_modes() {
        for mode in ["disable", "prefer", "require", "verify-ca", "verify-full"] {
            let config = PostgresConfig {
                ssl_mode: Some(mode.to_owned()),
                ..PostgresConfig::default()
            };
            assert!(build_connect_options(&config).is_ok(), "{mode}");
        }
    }

    #[test]
    fn connect_options_reject_unknown_ssl_mode() {
        let config = PostgresConfig {
            ssl_mode: Some("sometimes".to_owned()),
            ..PostgresConfig::default()
        };
        assert!(matches!(
            build_connect_options(&config),
            Err(StoreError::Connection(_))
        ));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(count(-3), 0);
        assert_eq!(count(7), 7);
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    fn test_config() -> PostgresConfig {
        PostgresConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/signet_test".to_string()),
            table_prefix: format!("test_{}_", uuid::Uuid::new_v4().simple()),
            ..PostgresConfig::default()
        }
    }

    #[tokio::test]
    async fn store_conformance() {
        let config = test_config();
        let store = PostgresWorkflowStore::new(config)
            .await
            .expect("pool creation should succeed");
        signet_store::testing::run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }
}
