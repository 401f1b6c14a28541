//! Reads authoritative position state from the ledger.
//!
//! Events only say that an account changed; the amounts always come from the
//! contracts. Reverted or absent calls read as zero.

use crate::contracts::{Exchange, SecurityToken};
use crate::error::Result;
use crate::kind::Fields;
use crate::ledger::{Ledger, call_or_default};
use crate::registry::TargetToken;
use crate::repository::PositionUpdate;
use alloy_primitives::{Address, U256};

pub struct BalanceResolver<'a, L: ?Sized> {
    ledger: &'a L,
}

impl<'a, L: Ledger + ?Sized> BalanceResolver<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    /// `(balance, exchange_balance, exchange_commitment)` of `account`.
    pub async fn resolve(
        &self,
        token: &TargetToken,
        account: Address,
    ) -> Result<(U256, U256, U256)> {
        let balance = self.balance(token.address, account).await?;
        let (exchange_balance, exchange_commitment) = self.resolve_exchange(token, account).await?;
        Ok((balance, exchange_balance, exchange_commitment))
    }

    /// Reads only the requested fields; the rest stay `None`.
    pub async fn resolve_fields(
        &self,
        token: &TargetToken,
        account: Address,
        fields: Fields,
    ) -> Result<PositionUpdate> {
        let mut update = PositionUpdate::default();

        if fields.balance && fields.exchange {
            let (balance, exchange_balance, commitment) = self.resolve(token, account).await?;
            update.balance = Some(balance);
            update.exchange_balance = Some(exchange_balance);
            update.exchange_commitment = Some(commitment);
        } else if fields.balance {
            update.balance = Some(self.balance(token.address, account).await?);
        } else if fields.exchange {
            let (balance, commitment) = self.resolve_exchange(token, account).await?;
            update.exchange_balance = Some(balance);
            update.exchange_commitment = Some(commitment);
        }
        if fields.pending_transfer {
            let pending = call_or_default(
                self.ledger,
                token.address,
                SecurityToken::pendingTransferCall { account },
                U256::ZERO,
            )
            .await?;
            update.pending_transfer = Some(pending);
        }

        Ok(update)
    }

    /// Balance and commitment held for `account` on the token's declared
    /// exchange. A token without an exchange reads `(0, 0)`.
    pub async fn resolve_exchange(
        &self,
        token: &TargetToken,
        account: Address,
    ) -> Result<(U256, U256)> {
        if token.exchange.is_zero() {
            return Ok((U256::ZERO, U256::ZERO));
        }

        let balance = call_or_default(
            self.ledger,
            token.exchange,
            Exchange::balanceOfCall {
                account,
                token: token.address,
            },
            U256::ZERO,
        )
        .await?;
        let commitment = call_or_default(
            self.ledger,
            token.exchange,
            Exchange::commitmentOfCall {
                account,
                token: token.address,
            },
            U256::ZERO,
        )
        .await?;

        Ok((balance, commitment))
    }

    pub async fn resolve_locked(
        &self,
        token: Address,
        lock: Address,
        account: Address,
    ) -> Result<U256> {
        let value = call_or_default(
            self.ledger,
            token,
            SecurityToken::lockedOfCall {
                lockAddress: lock,
                account,
            },
            U256::ZERO,
        )
        .await?;
        Ok(value)
    }

    async fn balance(&self, token: Address, account: Address) -> Result<U256> {
        let balance = call_or_default(
            self.ledger,
            token,
            SecurityToken::balanceOfCall { account },
            U256::ZERO,
        )
        .await?;
        Ok(balance)
    }
}
