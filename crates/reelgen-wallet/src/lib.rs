//! Reelgen Wallet - the payment gateway over the shared custodial balance
//!
//! One wallet backs the whole process; there are no per-agent wallets. The
//! gateway owns the two payment-critical rules:
//!
//! 1. Every payment decision starts with a **fresh** balance read — never a
//!    cached one — and a failed read is `BalanceUnavailable`, never zero.
//! 2. `charge` invokes the chain transfer **at most once**. There is no
//!    internal retry: a retry could double-charge the shared balance.

use std::sync::Arc;

use chrono::Utc;

use reelgen_chain::ChainClient;
use reelgen_types::{Amount, PaymentRecord, ReelgenError, Result, WalletInfo};

/// Treasury/burn address payments are routed to when none is configured
const DEFAULT_TREASURY: &str = "0x000000000000000000000000000000000000dEaD";

/// Gateway to the single shared custodial wallet
pub struct WalletGateway {
    chain: Arc<dyn ChainClient>,
    /// The shared wallet address (singleton for the process)
    address: String,
    /// Fixed payment recipient
    recipient: String,
    /// Network identifier, for display and audit
    network: String,
    /// Block-explorer base URL for addresses
    explorer_base: String,
}

impl WalletGateway {
    pub fn new(chain: Arc<dyn ChainClient>, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
            recipient: DEFAULT_TREASURY.to_string(),
            network: "Base Sepolia".to_string(),
            explorer_base: "https://sepolia.basescan.org/address".to_string(),
        }
    }

    /// Override the fixed payment recipient.
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    /// The shared wallet address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The fixed payment recipient.
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Block-explorer URL for the wallet address.
    pub fn explorer_url(&self) -> String {
        format!("{}/{}", self.explorer_base, self.address)
    }

    /// Read the wallet's current balance. Fails closed: a read error is
    /// [`ReelgenError::BalanceUnavailable`], never a silent zero.
    pub async fn balance(&self) -> Result<Amount> {
        self.chain
            .read_balance(&self.address)
            .await
            .map_err(|e| ReelgenError::BalanceUnavailable {
                detail: e.to_string(),
            })
    }

    /// Fresh snapshot of the wallet for callers that display it.
    pub async fn wallet_info(&self) -> Result<WalletInfo> {
        let balance = self.balance().await?;
        Ok(WalletInfo {
            address: self.address.clone(),
            balance,
            network: self.network.clone(),
            explorer_url: self.explorer_url(),
            last_updated: Utc::now(),
        })
    }

    /// Execute a payment of exactly `cost`.
    ///
    /// Reads the balance fresh, makes the sufficiency decision, and on
    /// success invokes the chain transfer exactly once. The returned
    /// [`PaymentRecord`] is the only proof the payment happened; callers
    /// must not assume funds moved on any error return.
    pub async fn charge(&self, cost: Amount) -> Result<PaymentRecord> {
        let available = self.balance().await?;

        if available < cost {
            tracing::warn!(
                required = %cost,
                available = %available,
                "payment refused: insufficient shared wallet balance"
            );
            return Err(ReelgenError::InsufficientBalance {
                required: cost,
                available,
            });
        }

        tracing::info!(
            amount = %cost,
            wallet = %self.address,
            recipient = %self.recipient,
            "executing payment from shared wallet"
        );

        let receipt = self
            .chain
            .transfer(&self.recipient, cost)
            .await
            .map_err(|e| ReelgenError::PaymentExecution {
                detail: e.to_string(),
            })?;

        Ok(PaymentRecord {
            amount: cost,
            recipient: self.recipient.clone(),
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelgen_chain::{ChainError, TransferReceipt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted chain collaborator counting its invocations
    struct MockChain {
        balance: std::result::Result<Amount, String>,
        transfer_ok: bool,
        reads: AtomicUsize,
        transfers: AtomicUsize,
    }

    impl MockChain {
        fn with_balance(usdc: f64) -> Self {
            Self {
                balance: Ok(Amount::from_usdc(usdc)),
                transfer_ok: true,
                reads: AtomicUsize::new(0),
                transfers: AtomicUsize::new(0),
            }
        }

        fn unreachable_rpc() -> Self {
            Self {
                balance: Err("connection refused".into()),
                transfer_ok: true,
                reads: AtomicUsize::new(0),
                transfers: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn read_balance(&self, _address: &str) -> std::result::Result<Amount, ChainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.balance
                .clone()
                .map_err(|detail| ChainError::Rpc { detail })
        }

        async fn transfer(
            &self,
            _to: &str,
            _amount: Amount,
        ) -> std::result::Result<TransferReceipt, ChainError> {
            self.transfers.fetch_add(1, Ordering::SeqCst);
            if self.transfer_ok {
                Ok(TransferReceipt {
                    tx_hash: "0xdeadbeef".into(),
                    block_number: 4242,
                    gas_used: 52_000,
                })
            } else {
                Err(ChainError::TransferRejected {
                    detail: "nonce too low".into(),
                })
            }
        }
    }

    fn gateway(chain: Arc<MockChain>) -> WalletGateway {
        WalletGateway::new(chain, "0x1111111111111111111111111111111111111111")
    }

    #[tokio::test]
    async fn insufficient_balance_reports_amounts_and_skips_transfer() {
        let chain = Arc::new(MockChain::with_balance(0.05));
        let gw = gateway(chain.clone());

        let err = gw.charge(Amount::from_usdc(0.10)).await.unwrap_err();
        match err {
            ReelgenError::InsufficientBalance {
                required,
                available,
            } => {
                assert_eq!(required, Amount::from_usdc(0.10));
                assert_eq!(available, Amount::from_usdc(0.05));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }
        assert_eq!(
            chain.transfers.load(Ordering::SeqCst),
            0,
            "no transfer may be attempted on an insufficient read"
        );
    }

    #[tokio::test]
    async fn sufficient_balance_transfers_once_and_records_payment() {
        let chain = Arc::new(MockChain::with_balance(1.00));
        let gw = gateway(chain.clone());

        let record = gw.charge(Amount::from_usdc(0.10)).await.expect("payment");
        assert_eq!(record.amount, Amount::from_usdc(0.10), "no partial payments");
        assert_eq!(record.recipient, DEFAULT_TREASURY);
        assert_eq!(record.tx_hash, "0xdeadbeef");
        assert_eq!(record.block_number, 4242);
        assert_eq!(record.gas_used, 52_000);
        assert_eq!(chain.transfers.load(Ordering::SeqCst), 1);
        assert_eq!(chain.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_read_is_balance_unavailable_not_zero() {
        let chain = Arc::new(MockChain::unreachable_rpc());
        let gw = gateway(chain.clone());

        let err = gw.charge(Amount::from_usdc(0.10)).await.unwrap_err();
        assert!(
            matches!(err, ReelgenError::BalanceUnavailable { .. }),
            "a failed read must not look like an empty wallet: {err:?}"
        );
        assert_eq!(chain.transfers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_transfer_is_payment_execution_error() {
        let chain = Arc::new(MockChain {
            balance: Ok(Amount::from_usdc(1.00)),
            transfer_ok: false,
            reads: AtomicUsize::new(0),
            transfers: AtomicUsize::new(0),
        });
        let gw = gateway(chain.clone());

        let err = gw.charge(Amount::from_usdc(0.10)).await.unwrap_err();
        assert!(matches!(err, ReelgenError::PaymentExecution { .. }));
        assert_eq!(
            chain.transfers.load(Ordering::SeqCst),
            1,
            "exactly one attempt, never retried"
        );
    }

    #[tokio::test]
    async fn every_charge_reads_the_balance_fresh() {
        let chain = Arc::new(MockChain::with_balance(1.00));
        let gw = gateway(chain.clone());

        gw.charge(Amount::from_usdc(0.10)).await.expect("first");
        gw.charge(Amount::from_usdc(0.10)).await.expect("second");
        assert_eq!(
            chain.reads.load(Ordering::SeqCst),
            2,
            "one fresh read per payment decision"
        );
    }

    #[tokio::test]
    async fn wallet_info_snapshots_the_read() {
        let chain = Arc::new(MockChain::with_balance(2.50));
        let gw = gateway(chain);

        let info = gw.wallet_info().await.expect("info");
        assert_eq!(info.balance, Amount::from_usdc(2.50));
        assert_eq!(info.network, "Base Sepolia");
        assert!(info.explorer_url.contains(&info.address));
    }
}
