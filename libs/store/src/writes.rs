//! Individual write statements used inside a batch transaction
//! (spec.md §4.2). Every function takes the open `Transaction` so the
//! caller (`batch::commit_batch`) controls commit/rollback.

use crate::batch::BalanceDelta;
use crate::conv::{addr_to_text, hash_to_text, text_to_u256, u256_to_text};
use crate::error::{Result, StoreError};
use ethers_core::types::{Address, U256};
use sqlx::{Postgres, Transaction};
use types::{
    Alert, AlertSeverity, AlertType, LiquidityEvent, LiquidityEventKind, Pair, Token,
    TokenAnalytics, TokenStatus, Trade, TransferEvent,
};

fn alert_type_str(t: AlertType) -> &'static str {
    match t {
        AlertType::NewToken => "NEW_TOKEN",
        AlertType::TokenLaunched => "TOKEN_LAUNCHED",
        AlertType::OwnershipRenounced => "OWNERSHIP_RENOUNCED",
        AlertType::HoneypotDetected => "HONEYPOT_DETECTED",
        AlertType::RugWarning => "RUG_WARNING",
        AlertType::WhaleActivity => "WHALE_ACTIVITY",
        AlertType::LargeBuy => "LARGE_BUY",
        AlertType::LargeSell => "LARGE_SELL",
        AlertType::NewPair => "NEW_PAIR",
        AlertType::LiquidityAdded => "LIQUIDITY_ADDED",
        AlertType::LiquidityRemoved => "LIQUIDITY_REMOVED",
        AlertType::CriticalLiquidityRemoval => "CRITICAL_LIQUIDITY_REMOVAL",
    }
}

fn severity_str(s: AlertSeverity) -> &'static str {
    match s {
        AlertSeverity::Low => "LOW",
        AlertSeverity::Medium => "MEDIUM",
        AlertSeverity::High => "HIGH",
        AlertSeverity::Critical => "CRITICAL",
    }
}

fn status_str(s: TokenStatus) -> &'static str {
    match s {
        TokenStatus::Created => "CREATED",
        TokenStatus::Launched => "LAUNCHED",
        TokenStatus::Graduated => "GRADUATED",
        TokenStatus::TradingEnabled => "TRADING_ENABLED",
    }
}

fn kind_str(k: LiquidityEventKind) -> &'static str {
    match k {
        LiquidityEventKind::Add => "ADD",
        LiquidityEventKind::Remove => "REMOVE",
    }
}

pub async fn upsert_token(tx: &mut Transaction<'_, Postgres>, token: &Token) -> Result<()> {
    let metadata = token
        .metadata
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO tokens
            (address, name, symbol, decimals, total_supply, creator, created_at,
             block_number, tx_hash, status, ownership_renounced, metadata,
             max_wallet, max_transaction, trading_enabled, holders_count)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
        ON CONFLICT (address) DO UPDATE SET
            name = EXCLUDED.name,
            symbol = EXCLUDED.symbol,
            decimals = EXCLUDED.decimals,
            total_supply = EXCLUDED.total_supply,
            status = EXCLUDED.status,
            ownership_renounced = EXCLUDED.ownership_renounced,
            metadata = COALESCE(EXCLUDED.metadata, tokens.metadata),
            max_wallet = EXCLUDED.max_wallet,
            max_transaction = EXCLUDED.max_transaction,
            trading_enabled = EXCLUDED.trading_enabled
        "#,
    )
    .bind(addr_to_text(token.address))
    .bind(&token.name)
    .bind(&token.symbol)
    .bind(token.decimals as i16)
    .bind(u256_to_text(token.total_supply))
    .bind(addr_to_text(token.creator))
    .bind(token.created_at)
    .bind(token.block_number as i64)
    .bind(hash_to_text(token.tx_hash))
    .bind(status_str(token.status))
    .bind(token.ownership_renounced)
    .bind(metadata)
    .bind(token.trading_controls.max_wallet.map(u256_to_text))
    .bind(token.trading_controls.max_transaction.map(u256_to_text))
    .bind(token.trading_controls.trading_enabled)
    .bind(token.holders_count)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

pub async fn upsert_pair(tx: &mut Transaction<'_, Postgres>, pair: &Pair) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pairs (address, token0, token1, reserve0, reserve1, dex_name, created_at, block_number)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        ON CONFLICT (address) DO UPDATE SET
            reserve0 = EXCLUDED.reserve0,
            reserve1 = EXCLUDED.reserve1
        "#,
    )
    .bind(addr_to_text(pair.address))
    .bind(addr_to_text(pair.token0))
    .bind(addr_to_text(pair.token1))
    .bind(u256_to_text(pair.reserve0))
    .bind(u256_to_text(pair.reserve1))
    .bind(&pair.dex_name)
    .bind(pair.created_at)
    .bind(pair.block_number as i64)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

pub async fn update_pair_reserves(
    tx: &mut Transaction<'_, Postgres>,
    pair: Address,
    reserve0: U256,
    reserve1: U256,
) -> Result<()> {
    sqlx::query("UPDATE pairs SET reserve0 = $1, reserve1 = $2 WHERE address = $3")
        .bind(u256_to_text(reserve0))
        .bind(u256_to_text(reserve1))
        .bind(addr_to_text(pair))
        .execute(&mut **tx)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}

pub async fn insert_trade(tx: &mut Transaction<'_, Postgres>, trade: &Trade) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO trades
            (tx_hash, log_index, block_number, "timestamp", pair, trader, token_in,
             token_out, amount_in, amount_out, price_impact, gas_used, gas_price_wei)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
        ON CONFLICT (tx_hash, log_index) DO NOTHING
        "#,
    )
    .bind(hash_to_text(trade.tx_hash))
    .bind(trade.log_index as i64)
    .bind(trade.block_number as i64)
    .bind(trade.timestamp)
    .bind(addr_to_text(trade.pair))
    .bind(addr_to_text(trade.trader))
    .bind(addr_to_text(trade.token_in))
    .bind(addr_to_text(trade.token_out))
    .bind(u256_to_text(trade.amount_in))
    .bind(u256_to_text(trade.amount_out))
    .bind(trade.price_impact)
    .bind(trade.gas_used.map(|g| g as i64))
    .bind(trade.gas_price_wei.map(u256_to_text))
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

pub async fn insert_liquidity_event(
    tx: &mut Transaction<'_, Postgres>,
    event: &LiquidityEvent,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO liquidity_events
            (tx_hash, log_index, block_number, "timestamp", pair, provider,
             token0_amount, token1_amount, liquidity, kind)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        ON CONFLICT (tx_hash, log_index) DO NOTHING
        "#,
    )
    .bind(hash_to_text(event.tx_hash))
    .bind(event.log_index as i64)
    .bind(event.block_number as i64)
    .bind(event.timestamp)
    .bind(addr_to_text(event.pair))
    .bind(addr_to_text(event.provider))
    .bind(u256_to_text(event.token0_amount))
    .bind(u256_to_text(event.token1_amount))
    .bind(u256_to_text(event.liquidity))
    .bind(kind_str(event.kind))
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

/// Returns `true` if this was a new row (not a duplicate delivery) —
/// invariant (5)'s at-most-one-effect gate.
pub async fn insert_transfer_event_if_new(
    tx: &mut Transaction<'_, Postgres>,
    ev: &TransferEvent,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO transfer_events
            (tx_hash, log_index, "from", "to", value, token_address, block_number, "timestamp")
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        ON CONFLICT (tx_hash, log_index) DO NOTHING
        "#,
    )
    .bind(hash_to_text(ev.tx_hash))
    .bind(ev.log_index as i64)
    .bind(addr_to_text(ev.from))
    .bind(addr_to_text(ev.to))
    .bind(u256_to_text(ev.value))
    .bind(addr_to_text(ev.token_address))
    .bind(ev.block_number as i64)
    .bind(ev.timestamp)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(result.rows_affected() == 1)
}

/// Apply a signed balance change to one `(token, holder)` row. A debit
/// clamps at zero and deletes the row when it reaches zero (spec.md
/// invariant (1), scenario 2 "Holder churn").
pub async fn apply_holder_delta(
    tx: &mut Transaction<'_, Postgres>,
    token: Address,
    holder: Address,
    delta: BalanceDelta,
    timestamp: i64,
) -> Result<()> {
    let token_text = addr_to_text(token);
    let holder_text = addr_to_text(holder);

    let current: Option<(String,)> =
        sqlx::query_as("SELECT balance FROM token_holders WHERE token_address = $1 AND address = $2 FOR UPDATE")
            .bind(&token_text)
            .bind(&holder_text)
            .fetch_optional(&mut **tx)
            .await
            .map_err(StoreError::from_sqlx)?;

    let current_balance = match &current {
        Some((s,)) => text_to_u256(s)?,
        None => U256::zero(),
    };

    let new_balance = match delta {
        BalanceDelta::Credit(v) => current_balance.saturating_add(v),
        BalanceDelta::Debit(v) => {
            if v >= current_balance {
                U256::zero()
            } else {
                current_balance - v
            }
        }
    };

    if new_balance.is_zero() {
        sqlx::query("DELETE FROM token_holders WHERE token_address = $1 AND address = $2")
            .bind(&token_text)
            .bind(&holder_text)
            .execute(&mut **tx)
            .await
            .map_err(StoreError::from_sqlx)?;
    } else {
        sqlx::query(
            r#"
            INSERT INTO token_holders (token_address, address, balance, last_updated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_address, address) DO UPDATE SET
                balance = EXCLUDED.balance, last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(&token_text)
        .bind(&holder_text)
        .bind(u256_to_text(new_balance))
        .bind(timestamp)
        .execute(&mut **tx)
        .await
        .map_err(StoreError::from_sqlx)?;
    }

    Ok(())
}

/// Recount holders for `token` from the durable table, inside the same
/// transaction as the balance deltas that just ran — this is the only
/// way `holders_count` can be trusted after a process restart, since an
/// in-memory cache of touched addresses starts empty every time and
/// under-counts everyone it hasn't seen yet (spec.md invariant (2)).
pub async fn count_holders(tx: &mut Transaction<'_, Postgres>, token: Address) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM token_holders WHERE token_address = $1")
            .bind(addr_to_text(token))
            .fetch_one(&mut **tx)
            .await
            .map_err(StoreError::from_sqlx)?;
    Ok(count)
}

pub async fn upsert_analytics(
    tx: &mut Transaction<'_, Postgres>,
    a: &TokenAnalytics,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO token_analytics
            (token_address, rug_score, is_honeypot, ownership_concentration, liquidity_usd,
             volume_24h, holders, transactions_24h, price_usd, price_change_24h,
             market_cap_usd, circulating_supply, max_wallet_pct, max_tx_pct, buy_tax,
             sell_tax, is_renounced, liquidity_locked, liquidity_lock_expiry)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
        ON CONFLICT (token_address) DO UPDATE SET
            rug_score = EXCLUDED.rug_score,
            is_honeypot = EXCLUDED.is_honeypot,
            ownership_concentration = EXCLUDED.ownership_concentration,
            liquidity_usd = EXCLUDED.liquidity_usd,
            volume_24h = EXCLUDED.volume_24h,
            holders = EXCLUDED.holders,
            transactions_24h = EXCLUDED.transactions_24h,
            price_usd = EXCLUDED.price_usd,
            price_change_24h = EXCLUDED.price_change_24h,
            market_cap_usd = EXCLUDED.market_cap_usd,
            circulating_supply = EXCLUDED.circulating_supply,
            max_wallet_pct = EXCLUDED.max_wallet_pct,
            max_tx_pct = EXCLUDED.max_tx_pct,
            buy_tax = EXCLUDED.buy_tax,
            sell_tax = EXCLUDED.sell_tax,
            is_renounced = EXCLUDED.is_renounced,
            liquidity_locked = EXCLUDED.liquidity_locked,
            liquidity_lock_expiry = EXCLUDED.liquidity_lock_expiry
        "#,
    )
    .bind(addr_to_text(a.token_address))
    .bind(a.rug_score as i16)
    .bind(a.is_honeypot)
    .bind(a.ownership_concentration)
    .bind(a.liquidity_usd)
    .bind(a.volume_24h)
    .bind(a.holders)
    .bind(a.transactions_24h)
    .bind(a.price_usd)
    .bind(a.price_change_24h)
    .bind(a.market_cap_usd)
    .bind(a.circulating_supply)
    .bind(a.max_wallet_pct)
    .bind(a.max_tx_pct)
    .bind(a.buy_tax)
    .bind(a.sell_tax)
    .bind(a.is_renounced)
    .bind(a.liquidity_locked)
    .bind(a.liquidity_lock_expiry)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

/// Insert-if-absent so duplicate emissions of the same deterministic
/// `Alert.id` collapse to one row (spec.md invariant 6).
pub async fn insert_alert_if_absent(tx: &mut Transaction<'_, Postgres>, alert: &Alert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts (id, alert_type, severity, token_address, message, data, "timestamp", sent)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&alert.id)
    .bind(alert_type_str(alert.alert_type))
    .bind(severity_str(alert.severity))
    .bind(addr_to_text(alert.token_address))
    .bind(&alert.message)
    .bind(&alert.data)
    .bind(alert.timestamp)
    .bind(alert.sent)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;

    Ok(())
}

pub async fn set_holders_count(
    tx: &mut Transaction<'_, Postgres>,
    token: Address,
    count: i64,
) -> Result<()> {
    sqlx::query("UPDATE tokens SET holders_count = $1 WHERE address = $2")
        .bind(count)
        .bind(addr_to_text(token))
        .execute(&mut **tx)
        .await
        .map_err(StoreError::from_sqlx)?;
    Ok(())
}

pub async fn advance_cursor(
    tx: &mut Transaction<'_, Postgres>,
    monitor: &str,
    to_block: u64,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        r#"
        INSERT INTO cursors (processor, last_block, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (processor) DO UPDATE SET
            last_block = GREATEST(cursors.last_block, EXCLUDED.last_block),
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(monitor)
    .bind(to_block as i64)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(StoreError::from_sqlx)?;
    Ok(())
}
