use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::domains::wallet::models::Wallet;
use crate::shared::errors::WalletError;

// 지갑 레포지토리
// WalletRepository: wallets 테이블 접근
//
// 잠금이 필요한 작업은 트랜잭션 연결(&mut PgConnection)을 받고,
// 단순 조회는 풀(PgPool)을 사용합니다.

pub struct WalletRepository {
    pool: PgPool,
}

fn wallet_from_row(row: &PgRow) -> Wallet {
    Wallet {
        id: row.get("id"),
        owner_id: row.get::<i64, _>("owner_id") as u64,
        balance: row.get("balance"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 지갑이 없으면 잔고 0으로 생성 (동시 호출에도 1행만 생성)
    /// Insert a zero-balance wallet unless the owner already has one
    pub async fn create_if_absent(conn: &mut PgConnection, owner_id: u64) -> Result<(), WalletError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO wallets (owner_id, balance, created_at, updated_at)
            VALUES ($1, 0, $2, $2)
            ON CONFLICT (owner_id) DO NOTHING
            "#,
        )
        .bind(owner_id as i64)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// 지갑 행 잠금 조회 (트랜잭션 종료까지 유지)
    /// Read and lock the owner's wallet row: SELECT ... FOR UPDATE
    pub async fn lock_by_owner(conn: &mut PgConnection, owner_id: u64) -> Result<Wallet, WalletError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, balance, created_at, updated_at
            FROM wallets
            WHERE owner_id = $1
            FOR UPDATE
            "#,
        )
        .bind(owner_id as i64)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref()
            .map(wallet_from_row)
            .ok_or(WalletError::WalletNotFound { owner_id })
    }

    /// 잔고 쓰기 (잠금을 잡은 트랜잭션 안에서만 호출)
    /// Write a new balance for a locked wallet row
    pub async fn update_balance(
        conn: &mut PgConnection,
        wallet_id: i64,
        balance: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<Wallet, WalletError> {
        let row = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $1, updated_at = $2
            WHERE id = $3
            RETURNING id, owner_id, balance, created_at, updated_at
            "#,
        )
        .bind(balance)
        .bind(updated_at)
        .bind(wallet_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(wallet_from_row(&row))
    }

    /// 소유자 ID로 지갑 조회
    /// Find wallet by owner ID
    pub async fn find_by_owner(&self, owner_id: u64) -> Result<Option<Wallet>, WalletError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, balance, created_at, updated_at
            FROM wallets
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(wallet_from_row))
    }
}
