use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::domains::wallet::models::{
    Amount, NewWalletRequest, PageRequest, RequestFilter, RequestStatus, RequestType,
    WalletRequest,
};
use crate::domains::wallet::store::RequestDecision;
use crate::shared::errors::WalletError;

// 입출금 요청 레포지토리
// WalletRequestRepository: wallet_requests 테이블 (삭제 없음, 감사 기록)

const REQUEST_COLUMNS: &str = "id, owner_id, request_type, amount, status, evidence_image, \
     wallet_destination, decided_by_admin_id, rejection_reason, created_at, decided_at";

pub struct WalletRequestRepository {
    pool: PgPool,
}

fn request_from_row(row: &PgRow) -> Result<WalletRequest, WalletError> {
    let request_type: String = row.get("request_type");
    let status: String = row.get("status");
    let amount: Decimal = row.get("amount");
    let corrupt = |what: &str| WalletError::DatabaseError(format!("corrupt wallet request {}", what));

    Ok(WalletRequest {
        id: row.get("id"),
        owner_id: row.get::<i64, _>("owner_id") as u64,
        request_type: request_type.parse::<RequestType>().map_err(|_| corrupt("type"))?,
        amount: Amount::new(amount).map_err(|_| corrupt("amount"))?,
        status: status.parse::<RequestStatus>().map_err(|_| corrupt("status"))?,
        evidence_image: row.get("evidence_image"),
        wallet_destination: row.get("wallet_destination"),
        decided_by_admin_id: row.get::<Option<i64>, _>("decided_by_admin_id").map(|id| id as u64),
        rejection_reason: row.get("rejection_reason"),
        created_at: row.get("created_at"),
        decided_at: row.get("decided_at"),
    })
}

impl WalletRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 요청 생성 (pending)
    /// Create a pending request
    pub async fn create(&self, request: &NewWalletRequest) -> Result<WalletRequest, WalletError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO wallet_requests (
                owner_id, request_type, amount, status, evidence_image, wallet_destination, created_at
            )
            VALUES ($1, $2, $3, 'pending', $4, $5, $6)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request.owner_id as i64)
        .bind(request.request_type.as_str())
        .bind(request.amount.value())
        .bind(&request.evidence_image)
        .bind(&request.wallet_destination)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        request_from_row(&row)
    }

    /// ID로 요청 조회
    /// Find request by ID
    pub async fn find_by_id(&self, request_id: i64) -> Result<Option<WalletRequest>, WalletError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallet_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    /// 요청 행 잠금 조회 (결정 트랜잭션의 첫 단계)
    /// Read and lock a request row before deciding it
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        request_id: i64,
    ) -> Result<WalletRequest, WalletError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallet_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => request_from_row(&row),
            None => Err(WalletError::RequestNotFound { id: request_id }),
        }
    }

    /// 결정 반영 (pending 조건 포함)
    /// Apply a decision; the `status = 'pending'` guard makes a stale decision a no-op
    pub async fn apply_decision(
        conn: &mut PgConnection,
        decision: &RequestDecision,
        decided_at: DateTime<Utc>,
    ) -> Result<WalletRequest, WalletError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallet_requests
            SET status = $1,
                decided_by_admin_id = $2,
                decided_at = $3,
                evidence_image = COALESCE($4, evidence_image),
                rejection_reason = $5
            WHERE id = $6 AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(decision.status.as_str())
        .bind(decision.admin_id as i64)
        .bind(decided_at)
        .bind(&decision.evidence_image)
        .bind(&decision.rejection_reason)
        .bind(decision.request_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => request_from_row(&row),
            None => Err(WalletError::Internal(format!(
                "wallet request {} changed while locked",
                decision.request_id
            ))),
        }
    }

    /// 요청 목록 (최신순) + 전체 개수
    /// Newest-first listing with optional owner/type/status filters
    pub async fn list(
        &self,
        filter: &RequestFilter,
        page: Option<PageRequest>,
    ) -> Result<(Vec<WalletRequest>, i64), WalletError> {
        let owner_id = filter.owner_id.map(|id| id as i64);
        let request_type = filter.request_type.map(|t| t.as_str());
        let status = filter.status.map(|s| s.as_str());
        // LIMIT NULL = 전체
        let limit = page.map(|p| p.limit);
        let offset = page.map(|p| p.offset()).unwrap_or(0);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM wallet_requests
            WHERE ($1::bigint IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR request_type = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY id DESC
            LIMIT $4 OFFSET $5
            "#,
            REQUEST_COLUMNS
        ))
        .bind(owner_id)
        .bind(request_type)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM wallet_requests
            WHERE ($1::bigint IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR request_type = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(owner_id)
        .bind(request_type)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let items = rows.iter().map(request_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }
}
