use cpg_common::Paise;
use sqlx::SqliteConnection;

use crate::{db_types::Member, traits::DepositGatewayError};

pub async fn fetch_member(member_id: &str, conn: &mut SqliteConnection) -> Result<Option<Member>, sqlx::Error> {
    let member =
        sqlx::query_as("SELECT * FROM members WHERE id = $1").bind(member_id).fetch_optional(conn).await?;
    Ok(member)
}

pub async fn upsert_member(
    member_id: &str,
    name: &str,
    balance: Paise,
    conn: &mut SqliteConnection,
) -> Result<(), DepositGatewayError> {
    sqlx::query(
        r#"
            INSERT INTO members (id, name, balance) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING;
        "#,
    )
    .bind(member_id)
    .bind(name)
    .bind(balance)
    .execute(conn)
    .await?;
    Ok(())
}

/// Applies a balance delta in place. The read-modify-write happens inside the database, so the
/// increment is safe under concurrent callers.
pub(crate) async fn adjust_balance(
    member_id: &str,
    delta: Paise,
    conn: &mut SqliteConnection,
) -> Result<(), DepositGatewayError> {
    let result = sqlx::query(
        "UPDATE members SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(delta)
    .bind(member_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DepositGatewayError::MemberNotFound(member_id.to_string()));
    }
    Ok(())
}
