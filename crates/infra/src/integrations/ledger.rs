//! External ledger reads from the staking contract
//!
//! The contract is the second source of truth for stakes. This adapter only
//! calls view functions; nothing here signs or sends a transaction.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::providers::{Http, Provider};
use ethers::types::Address;
use showup_core::ExternalLedger;
use showup_domain::{LedgerConfig, Result, ShowupError, WalletAddress};
use tracing::debug;

abigen!(
    StakingContract,
    r#"[
        function meetingExists(string meetingId) external view returns (bool)
        function getStakers(string meetingId) external view returns (address[])
        function hasStaked(string meetingId, address staker) external view returns (bool)
    ]"#
);

/// `ExternalLedger` backed by the deployed staking contract.
pub struct ContractLedger {
    contract: StakingContract<Provider<Http>>,
}

impl ContractLedger {
    /// Connect to `contract_address` through the JSON-RPC endpoint `rpc_url`.
    pub fn connect(rpc_url: &str, contract_address: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ShowupError::Config(format!("invalid ledger rpc url: {e}")))?;
        let address = contract_address
            .trim()
            .parse::<Address>()
            .map_err(|e| ShowupError::Config(format!("invalid contract address: {e}")))?;

        Ok(Self { contract: StakingContract::new(address, Arc::new(provider)) })
    }

    /// Connect when both the RPC url and the contract address are configured.
    pub fn from_config(config: &LedgerConfig) -> Result<Option<Self>> {
        match (config.rpc_url.as_deref(), config.contract_address.as_deref()) {
            (Some(rpc_url), Some(address)) => Self::connect(rpc_url, address).map(Some),
            _ => Ok(None),
        }
    }
}

fn contract_error(call: &str, err: impl std::fmt::Display) -> ShowupError {
    ShowupError::Network(format!("ledger call {call} failed: {err}"))
}

/// Canonical wallet form of an on-chain address.
pub fn wallet_from_address(address: Address) -> Result<WalletAddress> {
    WalletAddress::parse(&format!("{address:#x}"))
}

/// On-chain address of a canonical wallet.
pub fn address_from_wallet(wallet: &WalletAddress) -> Result<Address> {
    wallet
        .as_str()
        .parse::<Address>()
        .map_err(|e| ShowupError::InvalidInput(format!("invalid wallet address {wallet}: {e}")))
}

#[async_trait]
impl ExternalLedger for ContractLedger {
    async fn meeting_exists(&self, meeting_id: &str) -> Result<bool> {
        let exists = self
            .contract
            .meeting_exists(meeting_id.to_string())
            .call()
            .await
            .map_err(|e| contract_error("meetingExists", e))?;
        debug!(meeting_id, exists, "ledger meeting lookup");
        Ok(exists)
    }

    async fn stakers(&self, meeting_id: &str) -> Result<Vec<WalletAddress>> {
        let addresses = self
            .contract
            .get_stakers(meeting_id.to_string())
            .call()
            .await
            .map_err(|e| contract_error("getStakers", e))?;
        debug!(meeting_id, count = addresses.len(), "ledger stakers fetched");
        addresses.into_iter().map(wallet_from_address).collect()
    }

    async fn has_staked(&self, meeting_id: &str, wallet: &WalletAddress) -> Result<bool> {
        let staker = address_from_wallet(wallet)?;
        self.contract
            .has_staked(meeting_id.to_string(), staker)
            .call()
            .await
            .map_err(|e| contract_error("hasStaked", e))
    }
}

/// Stand-in used when no contract is configured; every read fails.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredLedger;

impl UnconfiguredLedger {
    fn unavailable() -> ShowupError {
        ShowupError::Config(
            "external ledger is not configured (set ledger.rpc_url and ledger.contract_address)"
                .to_string(),
        )
    }
}

#[async_trait]
impl ExternalLedger for UnconfiguredLedger {
    async fn meeting_exists(&self, _meeting_id: &str) -> Result<bool> {
        Err(Self::unavailable())
    }

    async fn stakers(&self, _meeting_id: &str) -> Result<Vec<WalletAddress>> {
        Err(Self::unavailable())
    }

    async fn has_staked(&self, _meeting_id: &str, _wallet: &WalletAddress) -> Result<bool> {
        Err(Self::unavailable())
    }
}
