//! CEP-18 token for the vault's underlying asset.
//!
//! Deployable as a wrapped restaked asset on its own, and used by the test
//! suite as the faucet asset behind the vault.
use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;

/// Underlying asset token, CEP-18 compatible. Minting is owner-gated.
#[odra::module]
pub struct AssetToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Token decimals
    decimals: Var<u8>,
    /// Total supply of tokens
    total_supply: Var<U256>,
    /// Balance mapping: owner -> balance
    balances: Mapping<Address, U256>,
    /// Allowance mapping: owner -> spender -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Contract owner, the only account allowed to mint
    owner: Var<Address>,
}

#[odra::module]
impl AssetToken {
    pub fn init(&mut self, name: String, symbol: String) {
        let caller = self.env().caller();
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(18);
        self.total_supply.set(U256::zero());
        self.owner.set(caller);
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.transfer_internal(caller, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.approve_internal(caller, spender, amount);
        true
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        let current_allowance = self.allowance(from, caller);

        if current_allowance < amount {
            self.env().revert(TokenError::InsufficientAllowance);
        }

        self.approve_internal(from, caller, current_allowance - amount);
        self.transfer_internal(from, to, amount);
        true
    }

    /// Mint new tokens (owner only)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.only_owner();

        let current_supply = self.total_supply();
        self.total_supply.set(current_supply + amount);

        let current_balance = self.balance_of(to);
        self.balances.set(&to, current_balance + amount);

        self.env().emit_event(Transfer {
            from: Address::from(self.env().self_address()),
            to,
            value: amount,
        });
    }

    // Internal functions

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);

        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }

    fn only_owner(&self) {
        let caller = self.env().caller();
        let owner = self.owner.get_or_revert_with(TokenError::OnlyOwnerAllowed);
        if caller != owner {
            self.env().revert(TokenError::OnlyOwnerAllowed);
        }
    }
}

/// External CEP-18 interface used by the vault, queue and adapters to move
/// the underlying asset.
#[odra::external_contract]
pub trait Cep18Token {
    /// Get the balance of an address
    fn balance_of(&self, owner: Address) -> U256;

    /// Transfer tokens
    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    /// Transfer tokens from another address
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    /// Approve a spender
    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    /// Get allowance
    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Get total supply
    fn total_supply(&self) -> U256;
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    fn setup() -> (HostEnv, AssetTokenHostRef) {
        let env = odra_test::env();
        let init_args = AssetTokenInitArgs {
            name: String::from("Wrapped Restaked ETH"),
            symbol: String::from("wrETH"),
        };
        let token = AssetToken::deploy(&env, init_args);
        (env, token)
    }

    #[test]
    fn test_init() {
        let (_, token) = setup();
        assert_eq!(token.name(), "Wrapped Restaked ETH");
        assert_eq!(token.symbol(), "wrETH");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.total_supply(), U256::zero());
    }

    #[test]
    fn test_mint_is_owner_gated() {
        let (env, mut token) = setup();
        let user = env.get_account(1);
        let amount = U256::from(1000);

        token.mint(user, amount);
        assert_eq!(token.balance_of(user), amount);
        assert_eq!(token.total_supply(), amount);

        env.set_caller(user);
        assert_eq!(
            token.try_mint(user, amount),
            Err(TokenError::OnlyOwnerAllowed.into())
        );
    }

    #[test]
    fn test_transfer_and_allowance() {
        let (env, mut token) = setup();
        let user1 = env.get_account(1);
        let user2 = env.get_account(2);
        let amount = U256::from(1000);

        token.mint(user1, amount);

        env.set_caller(user1);
        token.transfer(user2, U256::from(400));
        token.approve(user2, U256::from(300));

        env.set_caller(user2);
        token.transfer_from(user1, user2, U256::from(300));

        assert_eq!(token.balance_of(user1), U256::from(300));
        assert_eq!(token.balance_of(user2), U256::from(700));
        assert_eq!(token.allowance(user1, user2), U256::zero());
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (env, mut token) = setup();
        let user1 = env.get_account(1);
        let user2 = env.get_account(2);

        env.set_caller(user1);
        assert_eq!(
            token.try_transfer(user2, U256::from(1)),
            Err(TokenError::InsufficientBalance.into())
        );
    }
}
