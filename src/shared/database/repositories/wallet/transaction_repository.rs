use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::domains::wallet::models::{Amount, EntryKind, Reference, TransactionEntry, TransactionQuery};
use crate::domains::wallet::store::PlannedEntry;
use crate::shared::errors::WalletError;

// 원장 엔트리 레포지토리
// TransactionRepository: wallet_transactions 테이블 (추가 전용)

pub struct TransactionRepository {
    pool: PgPool,
}

fn entry_from_row(row: &PgRow) -> Result<TransactionEntry, WalletError> {
    let kind: String = row.get("kind");
    let amount: Decimal = row.get("amount");
    let reference_type: Option<String> = row.get("reference_type");

    Ok(TransactionEntry {
        id: row.get("id"),
        owner_id: row.get::<i64, _>("owner_id") as u64,
        kind: kind
            .parse::<EntryKind>()
            .map_err(|_| WalletError::DatabaseError(format!("unknown entry kind '{}'", kind)))?,
        amount: Amount::new(amount)
            .map_err(|e| WalletError::DatabaseError(format!("stored amount invalid: {}", e)))?,
        balance_before: row.get("balance_before"),
        balance_after: row.get("balance_after"),
        description: row.get("description"),
        reference: Reference::from_columns(reference_type.as_deref(), row.get("reference_id"))?,
        created_at: row.get("created_at"),
    })
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 엔트리 추가 (잔고 변경과 같은 트랜잭션)
    /// Append one entry inside the unit that changed the balance
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &PlannedEntry,
        created_at: DateTime<Utc>,
    ) -> Result<TransactionEntry, WalletError> {
        let (reference_type, reference_id) = entry.reference.to_columns();

        let row = sqlx::query(
            r#"
            INSERT INTO wallet_transactions (
                owner_id, kind, amount, balance_before, balance_after,
                description, reference_type, reference_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, owner_id, kind, amount, balance_before, balance_after,
                      description, reference_type, reference_id, created_at
            "#,
        )
        .bind(entry.owner_id as i64)
        .bind(entry.kind.as_str())
        .bind(entry.amount.value())
        .bind(entry.balance_before)
        .bind(entry.balance_after)
        .bind(&entry.description)
        .bind(reference_type)
        .bind(reference_id)
        .bind(created_at)
        .fetch_one(&mut *conn)
        .await?;

        entry_from_row(&row)
    }

    /// 소유자 엔트리 조회 (최신순) + 필터 적용 전체 개수
    /// Newest-first page of an owner's entries and the filtered total
    pub async fn list_by_owner(
        &self,
        owner_id: u64,
        query: &TransactionQuery,
    ) -> Result<(Vec<TransactionEntry>, i64), WalletError> {
        let kind = query.kind.map(|k| k.as_str());

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, kind, amount, balance_before, balance_after,
                   description, reference_type, reference_id, created_at
            FROM wallet_transactions
            WHERE owner_id = $1 AND ($2::text IS NULL OR kind = $2)
            ORDER BY id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id as i64)
        .bind(kind)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM wallet_transactions
            WHERE owner_id = $1 AND ($2::text IS NULL OR kind = $2)
            "#,
        )
        .bind(owner_id as i64)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        let items = rows.iter().map(entry_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }
}
