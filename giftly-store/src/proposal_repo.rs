use async_trait::async_trait;
use chrono::{DateTime, Utc};
use giftly_core::repository::ProposalRepository;
use giftly_core::{CoreError, CoreResult, Proposal, ProposalItem, ProposalStatus};
use giftly_shared::pii::Masked;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::storage_error;

const PROPOSAL_COLUMNS: &str = "id, customer_id, name, client_name, client_email, status, items, \
     total_amount, currency, valid_until, created_at, updated_at";

pub struct StoreProposalRepository {
    pool: PgPool,
}

impl StoreProposalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProposalRow {
    id: Uuid,
    customer_id: String,
    name: String,
    client_name: String,
    client_email: String,
    status: String,
    items: Json<Vec<ProposalItem>>,
    total_amount: Decimal,
    currency: String,
    valid_until: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> CoreResult<ProposalStatus> {
    match raw {
        "DRAFT" => Ok(ProposalStatus::Draft),
        "SENT" => Ok(ProposalStatus::Sent),
        "VIEWED" => Ok(ProposalStatus::Viewed),
        "ACCEPTED" => Ok(ProposalStatus::Accepted),
        other => Err(CoreError::StorageError(format!("unknown proposal status {}", other))),
    }
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = CoreError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        Ok(Proposal {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            client_name: row.client_name,
            client_email: Masked::new(row.client_email),
            status: parse_status(&row.status)?,
            items: row.items.0,
            total_amount: row.total_amount,
            currency: row.currency,
            valid_until: row.valid_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProposalRepository for StoreProposalRepository {
    async fn save_proposal(&self, proposal: &Proposal) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO proposals (id, customer_id, name, client_name, client_email, status, items,
                                   total_amount, currency, valid_until, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, client_name = EXCLUDED.client_name,
                client_email = EXCLUDED.client_email, status = EXCLUDED.status,
                items = EXCLUDED.items, total_amount = EXCLUDED.total_amount,
                valid_until = EXCLUDED.valid_until, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(proposal.id)
        .bind(&proposal.customer_id)
        .bind(&proposal.name)
        .bind(&proposal.client_name)
        .bind(proposal.client_email.expose())
        .bind(proposal.status.as_str())
        .bind(Json(&proposal.items))
        .bind(proposal.total_amount)
        .bind(&proposal.currency)
        .bind(proposal.valid_until)
        .bind(proposal.created_at)
        .bind(proposal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn get_proposal(&self, id: Uuid) -> CoreResult<Option<Proposal>> {
        let row = sqlx::query_as::<_, ProposalRow>(&format!(
            "SELECT {} FROM proposals WHERE id = $1",
            PROPOSAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Proposal::try_from).transpose()
    }

    async fn list_proposals(&self, customer_id: &str) -> CoreResult<Vec<Proposal>> {
        let rows = sqlx::query_as::<_, ProposalRow>(&format!(
            "SELECT {} FROM proposals WHERE customer_id = $1 ORDER BY created_at DESC",
            PROPOSAL_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(Proposal::try_from).collect()
    }

    async fn delete_proposal(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
