use crate::domain::repositories::ChainClient;
use crate::shared::error::WalletError;
use crate::shared::types::{GasEstimateRequest, UnsignedTransaction};
use crate::shared::utils::{checksum_address, parse_ether_amount};
use crate::shared::WalletResult;
use ethers::types::U256;
use std::sync::Arc;

/// A transfer whose inputs passed local validation; no network call made yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub value: U256,
}

impl TransferRequest {
    /// Validate both addresses and the decimal ether amount
    pub fn new(from: &str, to: &str, amount: &str) -> WalletResult<Self> {
        let from = checksum_address(from.trim())
            .map_err(|e| WalletError::validation(format!("Invalid sender address: {}", e.message())))?;
        let to = checksum_address(to.trim())
            .map_err(|e| WalletError::validation(format!("Invalid recipient address: {}", e.message())))?;
        let value = parse_ether_amount(amount)?;
        Ok(Self { from, to, value })
    }
}

/// Assembles unsigned transfers from live chain state
pub struct TransactionBuilder {
    chain: Arc<dyn ChainClient>,
    chain_id: u64,
}

impl TransactionBuilder {
    pub fn new(chain: Arc<dyn ChainClient>, chain_id: u64) -> Self {
        Self { chain, chain_id }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Validate, then fetch nonce, gas price and gas estimate concurrently
    pub async fn build_unsigned(&self, from: &str, to: &str, amount: &str) -> WalletResult<UnsignedTransaction> {
        let request = TransferRequest::new(from, to, amount)?;
        self.build(&request).await
    }

    /// Fetch chain state for an already validated request
    ///
    /// Exactly one nonce, gas price and gas estimate call per invocation.
    pub async fn build(&self, request: &TransferRequest) -> WalletResult<UnsignedTransaction> {
        let estimate = GasEstimateRequest {
            from: request.from.clone(),
            to: request.to.clone(),
            value: request.value,
        };

        let (nonce, gas_price, gas_limit) = tokio::try_join!(
            self.chain.transaction_count(&request.from),
            self.chain.gas_price(),
            self.chain.estimate_gas(&estimate),
        )
        .map_err(|e| match e {
            WalletError::NetworkUnavailable(_) => e,
            other => WalletError::network(format!("Could not read chain state: {}", other.message())),
        })?;

        log::debug!(
            "Built transfer {} -> {} (nonce {}, gas {} @ {})",
            request.from,
            request.to,
            nonce,
            gas_limit,
            gas_price
        );

        Ok(UnsignedTransaction {
            from: request.from.clone(),
            to: request.to.clone(),
            value: request.value,
            gas_limit,
            gas_price,
            nonce,
            chain_id: self.chain_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChain;
    use std::sync::atomic::Ordering;

    const FROM: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const TO: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    #[tokio::test]
    async fn test_build_uses_fetched_values() {
        let chain = Arc::new(FakeChain::default());
        let builder = TransactionBuilder::new(chain.clone(), 11155111);

        let tx = builder.build_unsigned(FROM, TO, "0.5").await.unwrap();
        assert_eq!(tx.nonce, 9);
        assert_eq!(tx.gas_price, 20_000_000_000);
        assert_eq!(tx.gas_limit, 21_000);
        assert_eq!(tx.chain_id, 11155111);
        assert_eq!(tx.value, U256::from(500_000_000_000_000_000u64));

        assert_eq!(chain.nonce_calls.load(Ordering::SeqCst), 1);
        assert_eq!(chain.gas_price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(chain.estimate_calls.load(Ordering::SeqCst), 1);

        let estimate = chain.last_estimate.lock().unwrap().clone().unwrap();
        assert_eq!(estimate.to, TO);
        assert_eq!(estimate.value, tx.value);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_network_call() {
        let chain = Arc::new(FakeChain::default());
        let builder = TransactionBuilder::new(chain.clone(), 1);

        for (from, to, amount) in [
            ("0x123", TO, "1"),
            (FROM, "not-an-address", "1"),
            (FROM, TO, "0"),
            (FROM, TO, "-2"),
            (FROM, TO, "ten"),
            (FROM, TO, "1.0000000000000000009"),
        ] {
            let error = builder.build_unsigned(from, to, amount).await.unwrap_err();
            assert!(error.is_validation(), "{} {} {}", from, to, amount);
        }
        assert_eq!(chain.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_any_fetch_failure_is_network_unavailable() {
        for method in ["eth_getTransactionCount", "eth_gasPrice", "eth_estimateGas"] {
            let builder = TransactionBuilder::new(Arc::new(FakeChain::failing_on(method)), 1);
            let error = builder.build_unsigned(FROM, TO, "1").await.unwrap_err();
            assert!(error.is_network_unavailable(), "{}", method);
        }
    }
}
