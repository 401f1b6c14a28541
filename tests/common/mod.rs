use alloy::rpc::types::Log;
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use alloy_primitives::{Address, B256, Bytes, U256, address};
use async_trait::async_trait;
use position_indexer::contracts::{Exchange, SecurityToken, TokenList};
use position_indexer::repository::{CheckpointRepository, Database, Listing, ListingRepository};
use position_indexer::{Ledger, LedgerError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const TOKEN_LIST: Address = address!("0x9000000000000000000000000000000000000009");
pub const BOND: Address = address!("0x1000000000000000000000000000000000000001");
pub const BOND_B: Address = address!("0x1000000000000000000000000000000000000002");
pub const SHARE: Address = address!("0x1000000000000000000000000000000000000003");
pub const EXCHANGE: Address = address!("0x2000000000000000000000000000000000000002");
pub const ESCROW: Address = EXCHANGE;
pub const ISSUER: Address = address!("0x00000000000000000000000000000000000000a1");
pub const TRADER: Address = address!("0x00000000000000000000000000000000000000b2");
pub const LOCK: Address = address!("0x00000000000000000000000000000000000000c3");

/// In-memory ledger: logs and call results are seeded by the test, every
/// call is recorded.
#[derive(Default)]
pub struct MockLedger {
    head: AtomicU64,
    unavailable: AtomicBool,
    logs: Mutex<Vec<Log>>,
    state: Mutex<HashMap<(Address, Bytes), Bytes>>,
    senders: Mutex<HashMap<B256, Address>>,
    calls: Mutex<Vec<(Address, Bytes)>>,
}

/// Block time reported for every block.
pub fn block_time(block: u64) -> u64 {
    1_700_000_000 + block * 12
}

/// Transaction hash given to the log emitted at `(block, log_index)`.
pub fn tx_hash(block: u64, log_index: u64) -> B256 {
    B256::left_padding_from(&(block * 1_000 + log_index).to_be_bytes())
}

impl MockLedger {
    pub fn new(head: u64) -> Self {
        let ledger = Self::default();
        ledger.set_head(head);
        ledger
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn emit<E: SolEvent>(&self, emitter: Address, event: E, block: u64, log_index: u64) {
        let log = Log {
            inner: alloy_primitives::Log {
                address: emitter,
                data: event.encode_log_data(),
            },
            block_number: Some(block),
            log_index: Some(log_index),
            transaction_hash: Some(tx_hash(block, log_index)),
            ..Default::default()
        };
        self.logs.lock().unwrap().push(log);
    }

    pub fn set_sender(&self, block: u64, log_index: u64, sender: Address) {
        self.senders
            .lock()
            .unwrap()
            .insert(tx_hash(block, log_index), sender);
    }

    pub fn set_call<C: SolCall>(&self, to: Address, call: C, output: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .insert((to, call.abi_encode().into()), output.into());
    }

    /// Registers `token` in the token list and points it at `exchange`.
    pub fn list_token(&self, token: Address, template: &str, exchange: Address) {
        self.set_call(
            TOKEN_LIST,
            TokenList::getTokenByAddressCall { _token: token },
            (token, template.to_string(), ISSUER).abi_encode_params(),
        );
        self.set_call(
            token,
            SecurityToken::tradableExchangeCall {},
            exchange.abi_encode(),
        );
    }

    pub fn set_balance(&self, token: Address, account: Address, value: u64) {
        self.set_call(
            token,
            SecurityToken::balanceOfCall { account },
            U256::from(value).abi_encode(),
        );
    }

    pub fn set_pending(&self, token: Address, account: Address, value: u64) {
        self.set_call(
            token,
            SecurityToken::pendingTransferCall { account },
            U256::from(value).abi_encode(),
        );
    }

    pub fn set_locked(&self, token: Address, lock: Address, account: Address, value: u64) {
        self.set_call(
            token,
            SecurityToken::lockedOfCall {
                lockAddress: lock,
                account,
            },
            U256::from(value).abi_encode(),
        );
    }

    pub fn set_exchange_balance(
        &self,
        exchange: Address,
        token: Address,
        account: Address,
        balance: u64,
        commitment: u64,
    ) {
        self.set_call(
            exchange,
            Exchange::balanceOfCall { account, token },
            U256::from(balance).abi_encode(),
        );
        self.set_call(
            exchange,
            Exchange::commitmentOfCall { account, token },
            U256::from(commitment).abi_encode(),
        );
    }

    /// Number of recorded calls to `C` on any contract.
    pub fn count_calls<C: SolCall>(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, input)| input.starts_with(&C::SELECTOR))
            .count()
    }

    pub fn count_calls_to<C: SolCall>(&self, to: Address) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, input)| *target == to && input.starts_with(&C::SELECTOR))
            .count()
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        self.check_available()?;
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn logs(
        &self,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, LedgerError> {
        self.check_available()?;
        let mut logs: Vec<Log> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                let block = log.block_number.unwrap_or_default();
                log.address() == address
                    && log.topics().first() == Some(&topic0)
                    && (from_block..=to_block).contains(&block)
            })
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, LedgerError> {
        self.calls.lock().unwrap().push((to, input.clone()));
        self.state
            .lock()
            .unwrap()
            .get(&(to, input))
            .cloned()
            .ok_or_else(|| LedgerError::CallFailed("execution reverted".into()))
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, LedgerError> {
        self.check_available()?;
        Ok(block_time(block_number))
    }

    async fn transaction_sender(&self, hash: B256) -> Result<Address, LedgerError> {
        self.check_available()?;
        Ok(self
            .senders
            .lock()
            .unwrap()
            .get(&hash)
            .copied()
            .unwrap_or(Address::ZERO))
    }
}

pub fn seed_listing(db: &Database, token: Address) {
    ListingRepository::new(&db.conn)
        .insert(&Listing {
            token_address: token,
            is_public: true,
            owner_address: ISSUER,
        })
        .unwrap();
}

pub fn seed_checkpoint(db: &Database, token: Address, exchange: Address, block: u64) {
    CheckpointRepository::new(&db.conn)
        .upsert(&token, &exchange, block)
        .unwrap();
}

pub fn transfer(from: Address, to: Address, value: u64) -> SecurityToken::Transfer {
    SecurityToken::Transfer {
        from,
        to,
        value: U256::from(value),
    }
}
