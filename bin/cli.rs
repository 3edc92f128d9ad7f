//! CLI tool for deploying and operating the restaking vault suite.

use omnivault_contracts::adapters::delegation_adapter::DelegationAdapter;
use omnivault_contracts::oracle::ratio_feed::RatioFeed;
use omnivault_contracts::queue::withdrawal_queue::WithdrawalQueue;
use omnivault_contracts::token::AssetToken;
use omnivault_contracts::vault::claim_token::ClaimToken;
use omnivault_contracts::vault::vault_ledger::VaultLedger;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::HostEnv;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Adapter unlock delay used for the reference adapter deployment (~7 days).
const ADAPTER_UNLOCK_DELAY_MS: u64 = 604_800_000;

/// Deploys the underlying asset and claim tokens.
pub struct TokensDeployScript;

impl DeployScript for TokensDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use omnivault_contracts::token::AssetTokenInitArgs;
        use omnivault_contracts::vault::claim_token::ClaimTokenInitArgs;

        let _asset = AssetToken::load_or_deploy(
            &env,
            AssetTokenInitArgs {
                name: String::from("Wrapped Restaked ETH"),
                symbol: String::from("wrETH"),
            },
            container,
            300_000_000_000
        )?;

        let _claim = ClaimToken::load_or_deploy(
            &env,
            ClaimTokenInitArgs {
                name: String::from("Omnivault Restaked ETH"),
                symbol: String::from("ovETH"),
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the vault ledger, withdrawal queue, ratio feed and reference
/// adapter, and wires them together.
/// Requires the tokens to be deployed first.
pub struct VaultDeployScript;

impl DeployScript for VaultDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use odra::host::NoArgs;
        use omnivault_contracts::adapters::delegation_adapter::DelegationAdapterInitArgs;
        use omnivault_contracts::queue::withdrawal_queue::WithdrawalQueueInitArgs;
        use omnivault_contracts::token::AssetTokenInitArgs;
        use omnivault_contracts::vault::claim_token::ClaimTokenInitArgs;
        use omnivault_contracts::vault::vault_ledger::VaultLedgerInitArgs;

        let caller = env.caller();

        let asset = AssetToken::load_or_deploy(
            &env,
            AssetTokenInitArgs {
                name: String::from("Wrapped Restaked ETH"),
                symbol: String::from("wrETH"),
            },
            container,
            300_000_000_000
        )?;
        let asset_address = asset.address().clone();
        let mut claim = ClaimToken::load_or_deploy(
            &env,
            ClaimTokenInitArgs {
                name: String::from("Omnivault Restaked ETH"),
                symbol: String::from("ovETH"),
            },
            container,
            300_000_000_000
        )?;
        let claim_address = claim.address().clone();

        // Operator and treasury start as the deployer and are rotated to
        // operational accounts afterwards.
        let mut vault = VaultLedger::load_or_deploy(
            &env,
            VaultLedgerInitArgs {
                asset_token: asset_address,
                claim_token: claim_address,
                operator: caller,
                treasury: caller,
            },
            container,
            500_000_000_000
        )?;
        let vault_address = vault.address().clone();

        let queue = WithdrawalQueue::load_or_deploy(
            &env,
            WithdrawalQueueInitArgs {
                vault: vault_address,
                asset_token: asset_address,
                legacy_receivers: vec![],
                legacy_amounts: vec![],
            },
            container,
            500_000_000_000
        )?;

        let feed = RatioFeed::load_or_deploy(&env, NoArgs, container, 300_000_000_000)?;

        let adapter = DelegationAdapter::load_or_deploy(
            &env,
            DelegationAdapterInitArgs {
                vault: vault_address,
                trustee: caller,
                asset_token: asset_address,
                unlock_delay: ADAPTER_UNLOCK_DELAY_MS,
            },
            container,
            500_000_000_000
        )?;

        env.set_gas(300_000_000_000);
        vault.set_withdrawal_queue(queue.address().clone());
        vault.set_ratio_feed(feed.address().clone());
        vault.add_adapter(adapter.address().clone());
        claim.set_vault_ledger(vault_address);

        Ok(())
    }
}

/// Deploys the complete suite (tokens + vault wiring).
pub struct SuiteDeployScript;

impl DeployScript for SuiteDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        TokensDeployScript.deploy(env, container)?;
        VaultDeployScript.deploy(env, container)?;
        Ok(())
    }
}

/// Scenario to delegate free balance to a target through an adapter.
pub struct DelegateScenario;

impl Scenario for DelegateScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "adapter",
                "Address of the registered adapter",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "target",
                "Delegation target address",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "amount",
                "Amount of the underlying asset to delegate",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut vault = container.contract_ref::<VaultLedger>(env)?;
        let adapter = args.get_single::<Address>("adapter")?;
        let target = args.get_single::<Address>("target")?;
        let amount = args.get_single::<U256>("amount")?;

        env.set_gas(300_000_000_000);
        vault.try_delegate(adapter, target, amount)?;

        println!("Delegated {} to {:?} via {:?}", amount, target, adapter);
        Ok(())
    }
}

impl ScenarioMetadata for DelegateScenario {
    const NAME: &'static str = "delegate";
    const DESCRIPTION: &'static str = "Delegates vault free balance through an adapter";
}

/// Scenario to roll the withdrawal queue over to the next epoch.
pub struct RolloverEpochScenario;

impl Scenario for RolloverEpochScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args
    ) -> Result<(), Error> {
        let mut vault = container.contract_ref::<VaultLedger>(env)?;

        env.set_gas(300_000_000_000);
        vault.try_update_epoch()?;

        println!("Epoch rolled over");
        Ok(())
    }
}

impl ScenarioMetadata for RolloverEpochScenario {
    const NAME: &'static str = "rollover-epoch";
    const DESCRIPTION: &'static str = "Advances the withdrawal queue to the next epoch";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the Omnivault restaking vault suite")
        // Deploy scripts
        .deploy(TokensDeployScript)
        .deploy(VaultDeployScript)
        .deploy(SuiteDeployScript)
        // Contract references
        .contract::<VaultLedger>()
        .contract::<WithdrawalQueue>()
        .contract::<DelegationAdapter>()
        .contract::<RatioFeed>()
        .contract::<AssetToken>()
        .contract::<ClaimToken>()
        // Scenarios
        .scenario(DelegateScenario)
        .scenario(RolloverEpochScenario)
        .build()
        .run();
}
