//! One write batch per processed block range (spec.md §4.2, §4.4).
//!
//! A `Batch` accumulates every derived write a monitor's `processRange`
//! produced for `[from, to]`; `Store::commit_batch` applies it and advances
//! that monitor's cursor in a single `sqlx` transaction — the mechanism
//! behind invariant (4) ("a block is processed only after all its logs plus
//! derived writes and publish intents are durably committed").

use crate::error::{Result, StoreError};
use ethers_core::types::{Address, U256};
use std::collections::HashSet;
use types::{Alert, LiquidityEvent, Pair, Token, TokenAnalytics, Trade, TransferEvent};

/// A signed balance change applied to one `(token, holder)` pair within a
/// batch. Multiple transfers touching the same holder in one batch are
/// folded into a single delta before the transaction runs.
#[derive(Debug, Clone, Copy)]
pub enum BalanceDelta {
    Credit(U256),
    Debit(U256),
}

#[derive(Debug, Default)]
pub struct Batch {
    pub tokens: Vec<Token>,
    pub pairs: Vec<Pair>,
    pub pair_reserve_updates: Vec<(Address, U256, U256)>,
    pub trades: Vec<Trade>,
    pub liquidity_events: Vec<LiquidityEvent>,
    pub transfer_events: Vec<TransferEvent>,
    pub analytics: Vec<TokenAnalytics>,
    pub alerts: Vec<Alert>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
            && self.pairs.is_empty()
            && self.pair_reserve_updates.is_empty()
            && self.trades.is_empty()
            && self.liquidity_events.is_empty()
            && self.transfer_events.is_empty()
            && self.analytics.is_empty()
            && self.alerts.is_empty()
    }
}

/// What changed, for the caller's post-commit KV publish step (spec.md
/// §4.4 step 5: "non-transactional side effects" happen *after* commit).
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub inserted_transfer_events: usize,
    /// Tokens touched by at least one accepted (non-duplicate) transfer in
    /// this batch, with their updated `holders_count`.
    pub touched_holder_tokens: Vec<(Address, i64)>,
}

impl super::Store {
    pub async fn commit_batch(
        &self,
        monitor: &str,
        to_block: u64,
        batch: Batch,
    ) -> Result<BatchOutcome> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        let mut outcome = BatchOutcome::default();

        for token in &batch.tokens {
            crate::writes::upsert_token(&mut tx, token).await?;
        }
        for pair in &batch.pairs {
            crate::writes::upsert_pair(&mut tx, pair).await?;
        }
        for (pair, reserve0, reserve1) in &batch.pair_reserve_updates {
            crate::writes::update_pair_reserves(&mut tx, *pair, *reserve0, *reserve1).await?;
        }
        for trade in &batch.trades {
            crate::writes::insert_trade(&mut tx, trade).await?;
        }
        for event in &batch.liquidity_events {
            crate::writes::insert_liquidity_event(&mut tx, event).await?;
        }
        let mut touched_tokens: HashSet<Address> = HashSet::new();
        for ev in &batch.transfer_events {
            if crate::writes::insert_transfer_event_if_new(&mut tx, ev).await? {
                outcome.inserted_transfer_events += 1;
                touched_tokens.insert(ev.token_address);
                if ev.from != Address::zero() {
                    crate::writes::apply_holder_delta(
                        &mut tx,
                        ev.token_address,
                        ev.from,
                        BalanceDelta::Debit(ev.value),
                        ev.timestamp,
                    )
                    .await?;
                }
                if ev.to != Address::zero() {
                    crate::writes::apply_holder_delta(
                        &mut tx,
                        ev.token_address,
                        ev.to,
                        BalanceDelta::Credit(ev.value),
                        ev.timestamp,
                    )
                    .await?;
                }
            }
        }
        for analytics in &batch.analytics {
            crate::writes::upsert_analytics(&mut tx, analytics).await?;
        }
        for alert in &batch.alerts {
            crate::writes::insert_alert_if_absent(&mut tx, alert).await?;
        }
        // Recount from the table itself, in the same transaction as the
        // deltas just applied, rather than trusting a caller-maintained
        // cache of touched addresses (spec.md invariant (2); see
        // `writes::count_holders`).
        for token in touched_tokens {
            let count = crate::writes::count_holders(&mut tx, token).await?;
            crate::writes::set_holders_count(&mut tx, token, count).await?;
            outcome.touched_holder_tokens.push((token, count));
        }

        crate::writes::advance_cursor(&mut tx, monitor, to_block).await?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(outcome)
    }
}
