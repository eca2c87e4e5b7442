//! PostgreSQL repository (sqlx)
//!
//! Expected tables: `stores`, `operators`, `store_permissions`,
//! `dining_tables`, `menu_items`, `orders`, `order_items`,
//! `order_sequences (store_id, day, last_value)`, `calls`. Schema migrations
//! are managed outside this service.

use async_trait::async_trait;
use shared::models::{
    Call, CallStatus, DiningTable, MenuItem, Operator, Order, OrderDetail, OrderItem, OrderStatus,
    Store, StorePermission, TableStatus,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{
    CallRepository, CallUpdate, NewCall, NewOrder, OrderRepository, TableRepository,
    TenantRepository, day_key, format_order_number,
};
use crate::core::{Config, RepoError, RepoResult};

/// Repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool described by the configuration
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TenantRepository for PgRepository {
    async fn find_store(&self, store_id: i64) -> RepoResult<Option<Store>> {
        Ok(sqlx::query_as("SELECT * FROM stores WHERE id = $1")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_operator(&self, operator_id: i64) -> RepoResult<Option<Operator>> {
        Ok(sqlx::query_as("SELECT * FROM operators WHERE id = $1")
            .bind(operator_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_operator_by_username(&self, username: &str) -> RepoResult<Option<Operator>> {
        Ok(sqlx::query_as("SELECT * FROM operators WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_permission(
        &self,
        operator_id: i64,
        store_id: i64,
    ) -> RepoResult<Option<StorePermission>> {
        Ok(sqlx::query_as(
            "SELECT operator_id, store_id, role FROM store_permissions
             WHERE operator_id = $1 AND store_id = $2",
        )
        .bind(operator_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl TableRepository for PgRepository {
    async fn find_table(&self, store_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>> {
        Ok(
            sqlx::query_as("SELECT * FROM dining_tables WHERE id = $1 AND store_id = $2")
                .bind(table_id)
                .bind(store_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_tables(&self, store_id: i64) -> RepoResult<Vec<DiningTable>> {
        Ok(sqlx::query_as(
            "SELECT * FROM dining_tables WHERE store_id = $1 AND is_active
             ORDER BY table_number",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_table_status(
        &self,
        store_id: i64,
        table_id: i64,
        status: TableStatus,
    ) -> RepoResult<Option<DiningTable>> {
        Ok(sqlx::query_as(
            "UPDATE dining_tables SET status = $1
             WHERE id = $2 AND store_id = $3 AND is_active
             RETURNING *",
        )
        .bind(status.as_db())
        .bind(table_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl OrderRepository for PgRepository {
    async fn find_menu_items(&self, store_id: i64, menu_ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
        Ok(
            sqlx::query_as("SELECT * FROM menu_items WHERE store_id = $1 AND id = ANY($2)")
                .bind(store_id)
                .bind(menu_ids)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn create_order(&self, order: NewOrder) -> RepoResult<OrderDetail> {
        let mut tx = self.pool.begin().await?;

        // Per-store, per-day sequence; the row lock serializes concurrent creations
        let day = day_key(order.created_at);
        let (sequence,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO order_sequences (store_id, day, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (store_id, day)
            DO UPDATE SET last_value = order_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(order.store_id)
        .bind(&day)
        .fetch_one(&mut *tx)
        .await?;

        let header: Order = sqlx::query_as(
            r#"
            INSERT INTO orders (
                store_id, table_id, order_number, status, total_amount, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(order.store_id)
        .bind(order.table_id)
        .bind(format_order_number(&day, sequence))
        .bind(OrderStatus::Pending.as_db())
        .bind(order.total_amount)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let item: OrderItem = sqlx::query_as(
                r#"
                INSERT INTO order_items (
                    order_id, menu_id, menu_name, quantity, unit_price, line_total
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(header.id)
            .bind(line.menu_id)
            .bind(&line.menu_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        let occupied = sqlx::query(
            "UPDATE dining_tables SET status = $1 WHERE id = $2 AND store_id = $3 AND is_active",
        )
        .bind(TableStatus::Occupied.as_db())
        .bind(order.table_id)
        .bind(order.store_id)
        .execute(&mut *tx)
        .await?;

        // Dropping the transaction rolls back everything above
        if occupied.rows_affected() == 0 {
            return Err(RepoError::NotFound("Table"));
        }

        tx.commit().await?;

        Ok(OrderDetail {
            order: header,
            items,
        })
    }

    async fn find_order(&self, store_id: i64, order_id: i64) -> RepoResult<Option<OrderDetail>> {
        let header: Option<Order> =
            sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND store_id = $2")
                .bind(order_id)
                .bind(store_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(order) = header else {
            return Ok(None);
        };

        let items: Vec<OrderItem> =
            sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
                .bind(order.id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(OrderDetail { order, items }))
    }

    async fn list_orders(
        &self,
        store_id: i64,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>> {
        Ok(sqlx::query_as(
            "SELECT * FROM orders
             WHERE store_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(store_id)
        .bind(status.map(|s| s.as_db()))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn transition_order(
        &self,
        store_id: i64,
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        Ok(sqlx::query_as(
            "UPDATE orders SET status = $1, updated_at = $2
             WHERE id = $3 AND store_id = $4 AND status = $5
             RETURNING *",
        )
        .bind(to.as_db())
        .bind(now)
        .bind(order_id)
        .bind(store_id)
        .bind(from.as_db())
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl CallRepository for PgRepository {
    async fn create_call(&self, call: NewCall) -> RepoResult<Call> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO calls (store_id, table_id, call_type, status, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(call.store_id)
        .bind(call.table_id)
        .bind(call.call_type.as_db())
        .bind(CallStatus::Pending.as_db())
        .bind(&call.message)
        .bind(call.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_call(&self, store_id: i64, call_id: i64) -> RepoResult<Option<Call>> {
        Ok(
            sqlx::query_as("SELECT * FROM calls WHERE id = $1 AND store_id = $2")
                .bind(call_id)
                .bind(store_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_calls(
        &self,
        store_id: i64,
        status: Option<CallStatus>,
    ) -> RepoResult<Vec<Call>> {
        Ok(sqlx::query_as(
            "SELECT * FROM calls
             WHERE store_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(store_id)
        .bind(status.map(|s| s.as_db()))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn transition_call(
        &self,
        store_id: i64,
        call_id: i64,
        from: CallStatus,
        update: CallUpdate,
    ) -> RepoResult<Option<Call>> {
        Ok(sqlx::query_as(
            r#"
            UPDATE calls SET
                status = $1,
                responded_by = COALESCE($2, responded_by),
                responded_at = COALESCE($3, responded_at),
                completed_at = COALESCE($4, completed_at)
            WHERE id = $5 AND store_id = $6 AND status = $7
            RETURNING *
            "#,
        )
        .bind(update.status.as_db())
        .bind(update.responded_by)
        .bind(update.responded_at)
        .bind(update.completed_at)
        .bind(call_id)
        .bind(store_id)
        .bind(from.as_db())
        .fetch_optional(&self.pool)
        .await?)
    }
}
