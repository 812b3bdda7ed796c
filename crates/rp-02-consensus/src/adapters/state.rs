//! In-memory account state with balances and reputation

use crate::ports::{StateLedger, StateReader};
use primitive_types::U256;
use rlp::RlpStream;
use shared_types::{keccak256, Address, Hash};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Account {
    balance: U256,
    reputation: u64,
}

/// Ordered account map; the root commits to every account in address order.
#[derive(Debug, Clone)]
pub struct InMemoryState {
    init_reputation: u64,
    accounts: BTreeMap<Address, Account>,
}

impl InMemoryState {
    /// Empty state where untouched accounts hold `init_reputation`.
    pub fn new(init_reputation: u64) -> Self {
        Self {
            init_reputation,
            accounts: BTreeMap::new(),
        }
    }

    /// Overwrite a score, creating the account if needed.
    pub fn set_reputation(&mut self, address: &Address, reputation: u64) {
        self.account_mut(address).reputation = reputation;
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn account_mut(&mut self, address: &Address) -> &mut Account {
        let init = self.init_reputation;
        self.accounts.entry(*address).or_insert(Account {
            balance: U256::zero(),
            reputation: init,
        })
    }

    fn is_pristine(&self, account: &Account) -> bool {
        account.balance.is_zero() && account.reputation == self.init_reputation
    }
}

impl StateReader for InMemoryState {
    fn get_reputation(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map_or(self.init_reputation, |account| account.reputation)
    }
}

impl StateLedger for InMemoryState {
    fn add_reputation(&mut self, address: &Address, delta: u64) {
        let account = self.account_mut(address);
        account.reputation = account.reputation.saturating_add(delta);
    }

    fn sub_reputation(&mut self, address: &Address, delta: u64) {
        let account = self.account_mut(address);
        account.reputation = account.reputation.saturating_sub(delta);
    }

    fn add_balance(&mut self, address: &Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_add(amount);
    }

    fn balance(&self, address: &Address) -> U256 {
        self.accounts
            .get(address)
            .map_or_else(U256::zero, |account| account.balance)
    }

    fn intermediate_root(&mut self, delete_empty: bool) -> Hash {
        if delete_empty {
            let pristine: Vec<Address> = self
                .accounts
                .iter()
                .filter(|(_, account)| self.is_pristine(account))
                .map(|(address, _)| *address)
                .collect();
            for address in pristine {
                self.accounts.remove(&address);
            }
        }

        let mut stream = RlpStream::new_list(self.accounts.len());
        for (address, account) in &self.accounts {
            stream.begin_list(3);
            stream.append(address);
            stream.append(&account.balance);
            stream.append(&account.reputation);
        }
        keccak256(&stream.out())
    }
}
