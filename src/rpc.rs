use crate::error::LedgerError;
use crate::ledger::Ledger;
use alloy::eips::BlockNumberOrTag;
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::transports::TransportError;
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120); // 2 minutes timeout per request

/// JSON-RPC ledger client with round-robin failover across endpoints.
#[derive(Clone)]
pub struct RpcClient {
    providers: Vec<AlloyFullProvider>,
    urls: Vec<String>,
    current_provider: Arc<AtomicUsize>,
    max_retries: usize,
}

impl RpcClient {
    pub fn new(rpc_urls: &[String]) -> anyhow::Result<Self> {
        if rpc_urls.is_empty() {
            return Err(anyhow::anyhow!("At least one RPC URL must be provided"));
        }

        let mut providers = Vec::new();
        for url in rpc_urls {
            let parsed_url = url
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid RPC URL: {}", url))?;
            let provider: AlloyFullProvider = ProviderBuilder::new().connect_http(parsed_url);
            providers.push(provider);
        }

        Ok(RpcClient {
            providers,
            urls: rpc_urls.to_vec(),
            current_provider: Arc::new(AtomicUsize::new(0)),
            max_retries: 5,
        })
    }

    fn get_provider(&self) -> &AlloyFullProvider {
        let index = self.current_provider.load(Ordering::Relaxed) % self.providers.len();
        &self.providers[index]
    }

    pub fn get_current_url(&self) -> &str {
        let index = self.current_provider.load(Ordering::Relaxed) % self.urls.len();
        &self.urls[index]
    }

    pub fn rotate_provider(&self) {
        let current = self.current_provider.load(Ordering::Relaxed);
        let next = (current + 1) % self.providers.len();
        self.current_provider.store(next, Ordering::Relaxed);

        if self.providers.len() > 1 {
            debug!("Rotating to RPC provider #{}", next);
        }
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries)
    }

    fn handle_error(&self, error: &TransportError) -> LedgerError {
        let current_url = self.get_current_url();
        warn!("RPC error on {}: {}, rotating provider", current_url, error);
        self.rotate_provider();
        LedgerError::Unavailable(error.to_string())
    }

    fn handle_timeout(&self) -> LedgerError {
        let current_url = self.get_current_url();
        warn!(
            "Request timeout after {} seconds on {}, rotating provider",
            REQUEST_TIMEOUT.as_secs(),
            current_url
        );
        self.rotate_provider();
        LedgerError::Unavailable(format!(
            "Request timeout after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ))
    }

    pub async fn get_latest_block(&self) -> Result<u64, LedgerError> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                match timeout(REQUEST_TIMEOUT, provider.get_block_number()).await {
                    Ok(Ok(block_number)) => Ok(block_number),
                    Ok(Err(e)) => Err(client.handle_error(&e)),
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }

    /// `eth_call` with retries. Only an execution revert is returned as
    /// `CallFailed`; throttling and other error responses are retried and end
    /// up as `Unavailable`.
    pub async fn call_contract(&self, to: Address, input: Bytes) -> Result<Bytes, LedgerError> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            let input = input.clone();
            async move {
                let provider = client.get_provider();
                let tx = TransactionRequest::default().to(to).input(input.into());

                match timeout(REQUEST_TIMEOUT, provider.call(tx)).await {
                    Ok(Ok(output)) => Ok(Ok(output)),
                    Ok(Err(e))
                        if e.as_error_resp()
                            .is_some_and(|p| is_execution_revert(p.code, &p.message)) =>
                    {
                        // hack since we don't want to retry a revert
                        Ok(Err(LedgerError::CallFailed(e.to_string())))
                    }
                    Ok(Err(e)) => Err(client.handle_error(&e)),
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
        .and_then(|r| r)
    }

    pub async fn get_block_timestamp(&self, block_number: u64) -> Result<u64, LedgerError> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                let request = provider.get_block_by_number(BlockNumberOrTag::Number(block_number));
                match timeout(REQUEST_TIMEOUT, request).await {
                    Ok(Ok(Some(block))) => Ok(block.header.timestamp),
                    Ok(Ok(None)) => Err(LedgerError::Unavailable(format!(
                        "block {block_number} not found on {}",
                        client.get_current_url()
                    ))),
                    Ok(Err(e)) => Err(client.handle_error(&e)),
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }

    pub async fn get_transaction_sender(&self, hash: B256) -> Result<Address, LedgerError> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                match timeout(REQUEST_TIMEOUT, provider.get_transaction_receipt(hash)).await {
                    Ok(Ok(Some(receipt))) => Ok(receipt.from),
                    Ok(Ok(None)) => Err(LedgerError::Unavailable(format!(
                        "receipt {hash:?} not found on {}",
                        client.get_current_url()
                    ))),
                    Ok(Err(e)) => Err(client.handle_error(&e)),
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
    }

    async fn get_logs_internal(
        &self,
        from_block: u64,
        to_block: u64,
        contract_address: Address,
        topic0: B256,
    ) -> Result<Vec<Log>, LedgerError> {
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            async move {
                let provider = client.get_provider();
                let filter = Filter::new()
                    .address(contract_address)
                    .event_signature(topic0)
                    .from_block(from_block)
                    .to_block(to_block);

                match timeout(REQUEST_TIMEOUT, provider.get_logs(&filter)).await {
                    Ok(Ok(logs)) => Ok(Ok(logs)),
                    Ok(Err(e)) => {
                        let error_str = e.to_string();

                        if error_str.contains("exceeds max results") {
                            debug!(
                                "Max results exceeded for blocks {}-{}, will split range",
                                from_block, to_block
                            );
                            // hack since we don't want to retry on this specific error
                            Ok(Err(LedgerError::Unavailable(error_str)))
                        } else {
                            Err(client.handle_error(&e))
                        }
                    }
                    Err(_) => Err(client.handle_timeout()),
                }
            }
        })
        .await
        .and_then(|r| r)
    }

    fn parse_max_results_error(error_str: &str) -> Option<(u64, u64)> {
        let re = Regex::new(r"retry with the range (\d+)-(\d+)").ok()?;
        let captures = re.captures(error_str)?;

        let from = captures.get(1)?.as_str().parse().ok()?;
        let to = captures.get(2)?.as_str().parse().ok()?;

        Some((from, to))
    }

    pub async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        contract_address: Address,
        topic0: B256,
    ) -> Result<Vec<Log>, LedgerError> {
        let mut all_logs = Vec::new();
        let mut current_from = from_block;

        while current_from <= to_block {
            match self
                .get_logs_internal(current_from, to_block, contract_address, topic0)
                .await
            {
                Ok(logs) => {
                    all_logs.extend(logs);
                    break;
                }
                Err(e) => {
                    let error_str = e.to_string();

                    let Some((suggested_from, suggested_to)) =
                        Self::parse_max_results_error(&error_str)
                    else {
                        return Err(e);
                    };

                    info!(
                        "Hit max results limit for blocks {}-{}, splitting at block {}",
                        current_from, to_block, suggested_to
                    );

                    let logs = self
                        .get_logs_internal(suggested_from, suggested_to, contract_address, topic0)
                        .await?;

                    all_logs.extend(logs);
                    current_from = suggested_to + 1;
                }
            }
        }

        Ok(all_logs)
    }
}

/// Whether a JSON-RPC error response is the contract reverting, as opposed to
/// the node refusing or failing to serve the request.
fn is_execution_revert(code: i64, message: &str) -> bool {
    code == 3 || message.to_lowercase().contains("revert")
}

#[async_trait]
impl Ledger for RpcClient {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        self.get_latest_block().await
    }

    async fn logs(
        &self,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, LedgerError> {
        self.get_logs(from_block, to_block, address, topic0).await
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, LedgerError> {
        self.call_contract(to, input).await
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, LedgerError> {
        self.get_block_timestamp(block_number).await
    }

    async fn transaction_sender(&self, hash: B256) -> Result<Address, LedgerError> {
        self.get_transaction_sender(hash).await
    }
}
