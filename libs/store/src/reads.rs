//! Plain read queries (spec.md §4.2: "not part of the write-batch
//! transaction"). Used by processors and analytics, not by the ingestion
//! pipeline's cursor-advancing path.

use crate::conv::{addr_to_text, text_to_addr, text_to_hash, text_to_u256};
use crate::error::{Result, StoreError};
use ethers_core::types::Address;
use types::{Cursor, Pair, Token, TokenMetadata, TokenStatus, Trade, TradingControls};

fn parse_status(s: &str) -> Result<TokenStatus> {
    Ok(match s {
        "CREATED" => TokenStatus::Created,
        "LAUNCHED" => TokenStatus::Launched,
        "GRADUATED" => TokenStatus::Graduated,
        "TRADING_ENABLED" => TokenStatus::TradingEnabled,
        other => return Err(StoreError::Decode(format!("unknown token status {other:?}"))),
    })
}

impl super::Store {
    pub async fn token_by_address(&self, address: Address) -> Result<Option<Token>> {
        let row: Option<(
            String, String, String, i16, String, String, i64, i64, String, String, bool,
            Option<serde_json::Value>, Option<String>, Option<String>, bool, i64,
        )> = sqlx::query_as(
            r#"
            SELECT address, name, symbol, decimals, total_supply, creator, created_at,
                   block_number, tx_hash, status, ownership_renounced, metadata,
                   max_wallet, max_transaction, trading_enabled, holders_count
            FROM tokens WHERE address = $1
            "#,
        )
        .bind(addr_to_text(address))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        let Some((
            address, name, symbol, decimals, total_supply, creator, created_at, block_number,
            tx_hash, status, ownership_renounced, metadata, max_wallet, max_transaction,
            trading_enabled, holders_count,
        )) = row
        else {
            return Ok(None);
        };

        Ok(Some(Token {
            address: text_to_addr(&address)?,
            name,
            symbol,
            decimals: decimals as u8,
            total_supply: text_to_u256(&total_supply)?,
            creator: text_to_addr(&creator)?,
            created_at,
            block_number: block_number as u64,
            tx_hash: text_to_hash(&tx_hash)?,
            status: parse_status(&status)?,
            ownership_renounced,
            metadata: metadata
                .map(serde_json::from_value::<TokenMetadata>)
                .transpose()
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            trading_controls: TradingControls {
                max_wallet: max_wallet.map(|s| text_to_u256(&s)).transpose()?,
                max_transaction: max_transaction.map(|s| text_to_u256(&s)).transpose()?,
                trading_enabled,
            },
            holders_count,
        }))
    }

    pub async fn pair_by_address(&self, address: Address) -> Result<Option<Pair>> {
        let row: Option<(String, String, String, String, String, String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT address, token0, token1, reserve0, reserve1, dex_name, created_at, block_number
            FROM pairs WHERE address = $1
            "#,
        )
        .bind(addr_to_text(address))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        let Some((address, token0, token1, reserve0, reserve1, dex_name, created_at, block_number)) = row
        else {
            return Ok(None);
        };

        Ok(Some(Pair {
            address: text_to_addr(&address)?,
            token0: text_to_addr(&token0)?,
            token1: text_to_addr(&token1)?,
            reserve0: text_to_u256(&reserve0)?,
            reserve1: text_to_u256(&reserve1)?,
            dex_name,
            created_at,
            block_number: block_number as u64,
        }))
    }

    /// Every known pair, used by `DexMonitor` on startup to rebuild its
    /// dynamic watch set together with each pair's last-persisted
    /// reserves (spec.md §4.6).
    pub async fn all_pairs(&self) -> Result<Vec<Pair>> {
        let rows: Vec<(String, String, String, String, String, String, i64, i64)> = sqlx::query_as(
            "SELECT address, token0, token1, reserve0, reserve1, dex_name, created_at, block_number FROM pairs",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter()
            .map(|(address, token0, token1, reserve0, reserve1, dex_name, created_at, block_number)| {
                Ok(Pair {
                    address: text_to_addr(&address)?,
                    token0: text_to_addr(&token0)?,
                    token1: text_to_addr(&token1)?,
                    reserve0: text_to_u256(&reserve0)?,
                    reserve1: text_to_u256(&reserve1)?,
                    dex_name,
                    created_at,
                    block_number: block_number as u64,
                })
            })
            .collect()
    }

    /// Every known pair address, used by `DexMonitor` on startup to
    /// rebuild its dynamic watch set (spec.md §4.6).
    pub async fn all_pair_addresses(&self) -> Result<Vec<Address>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT address FROM pairs")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(|(a,)| text_to_addr(&a)).collect()
    }

    /// Every known token address, used by `TransferMonitor` on startup to
    /// rebuild its dynamic watch set (spec.md §4.7).
    pub async fn all_token_addresses(&self) -> Result<Vec<Address>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT address FROM tokens")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        rows.into_iter().map(|(a,)| text_to_addr(&a)).collect()
    }

    pub async fn holder_count(&self, token: Address) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM token_holders WHERE token_address = $1")
                .bind(addr_to_text(token))
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from_sqlx)?;
        Ok(count)
    }

    pub async fn recent_trades(&self, pair: Address, limit: i64) -> Result<Vec<Trade>> {
        let rows: Vec<(
            String, i64, i64, i64, String, String, String, String, String, String, f64,
            Option<i64>, Option<String>,
        )> = sqlx::query_as(
            r#"
            SELECT tx_hash, log_index, block_number, "timestamp", pair, trader, token_in,
                   token_out, amount_in, amount_out, price_impact, gas_used, gas_price_wei
            FROM trades WHERE pair = $1 ORDER BY "timestamp" DESC LIMIT $2
            "#,
        )
        .bind(addr_to_text(pair))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        rows.into_iter()
            .map(
                |(
                    tx_hash,
                    log_index,
                    block_number,
                    timestamp,
                    pair,
                    trader,
                    token_in,
                    token_out,
                    amount_in,
                    amount_out,
                    price_impact,
                    gas_used,
                    gas_price_wei,
                )| {
                    Ok(Trade {
                        tx_hash: text_to_hash(&tx_hash)?,
                        log_index: log_index as u64,
                        block_number: block_number as u64,
                        timestamp,
                        pair: text_to_addr(&pair)?,
                        trader: text_to_addr(&trader)?,
                        token_in: text_to_addr(&token_in)?,
                        token_out: text_to_addr(&token_out)?,
                        amount_in: text_to_u256(&amount_in)?,
                        amount_out: text_to_u256(&amount_out)?,
                        price_impact,
                        gas_used: gas_used.map(|g| g as u64),
                        gas_price_wei: gas_price_wei.map(|s| text_to_u256(&s)).transpose()?,
                    })
                },
            )
            .collect()
    }

    /// Current balance for a single `(token, holder)` pair, zero if the
    /// row doesn't exist (invariant (1): zero balances aren't stored).
    /// Used by `TransferMonitor` to seed its in-memory holder shadow
    /// state the first time it sees an address.
    pub async fn holder_balance(&self, token: Address, holder: Address) -> Result<ethers_core::types::U256> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT balance FROM token_holders WHERE token_address = $1 AND address = $2",
        )
        .bind(addr_to_text(token))
        .bind(addr_to_text(holder))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        match row {
            Some((s,)) => text_to_u256(&s),
            None => Ok(ethers_core::types::U256::zero()),
        }
    }

    pub async fn cursor_for(&self, monitor: &str) -> Result<Option<Cursor>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT processor, last_block FROM cursors WHERE processor = $1")
                .bind(monitor)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from_sqlx)?;

        Ok(row.map(|(processor, last_block)| Cursor {
            processor,
            last_block: last_block as u64,
        }))
    }
}
