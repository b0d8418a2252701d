#![cfg_attr(not(feature = "std"), no_std)]

#[ink::contract]
mod delphair {
    use ink::env::hash::{HashOutput, Keccak256};
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    pub type Result<T> = core::result::Result<T, Error>;

    /// Hard cap on circulating supply: 21,000,000 tokens at 18 decimals.
    pub const MAX_SUPPLY: Balance = 21_000_000 * 1_000_000_000_000_000_000;

    /// The full cap is minted to the initial owner at deployment.
    pub const INITIAL_SUPPLY: Balance = MAX_SUPPLY;

    /// Exact price of a turbulence fee payment: 0.01 native units.
    pub const TURBULENCE_FEE: Balance = 10_000_000_000_000_000;

    pub const TOKEN_NAME: &str = "DelphAir";
    pub const TOKEN_SYMBOL: &str = "DLPH";
    pub const TOKEN_DECIMALS: u8 = 18;

    #[derive(scale::Encode, scale::Decode, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        InsufficientBalance,
        InsufficientAllowance,
        InvalidRecipient,
        SupplyCapExceeded,
        IncorrectFeeAmount,
        NoFeesToWithdraw,
        Unauthorized,
        Overflow,
        NativeTransferFailed,
    }

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from_acc: Option<AccountId>,
        #[ink(topic)]
        to_acc: Option<AccountId>,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner_acc: AccountId,
        #[ink(topic)]
        spender_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct FeePaid {
        #[ink(topic)]
        payer_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct FeesWithdrawn {
        #[ink(topic)]
        to_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct CrashAndBurn {
        #[ink(topic)]
        from_acc: AccountId,
        amount_val: Balance,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous_acc: AccountId,
        #[ink(topic)]
        new_acc: AccountId,
    }

    #[ink(storage)]
    pub struct DelphAir {
        // governance / control
        owner_acc: AccountId,

        // token state
        total_supply: Balance,
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,

        // native value collected by pay_turbulence_fee, owed to the owner
        fees_collected: Balance,
    }

    impl DelphAir {
        // -------- constructors --------

        /// Deploys the token with the full supply minted to `initial_owner`.
        #[ink(constructor)]
        pub fn new(initial_owner: AccountId) -> Result<Self> {
            if is_zero_account(&initial_owner) {
                return Err(Error::InvalidRecipient)
            }
            let mut balances = Mapping::default();
            balances.insert(&initial_owner, &INITIAL_SUPPLY);
            Self::env().emit_event(Transfer {
                from_acc: None,
                to_acc: Some(initial_owner),
                amount_val: INITIAL_SUPPLY,
            });
            Ok(Self {
                owner_acc: initial_owner,
                total_supply: INITIAL_SUPPLY,
                balances,
                allowances: Mapping::default(),
                fees_collected: 0,
            })
        }

        // -------- modifiers (helpers) --------

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner_acc {
                return Err(Error::Unauthorized)
            }
            Ok(())
        }

        // -------- read API --------

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            TOKEN_DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.total_supply
        }

        #[ink(message)]
        pub fn max_supply(&self) -> Balance {
            MAX_SUPPLY
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner_acc
        }

        #[ink(message)]
        pub fn balance_of(&self, owner_acc: AccountId) -> Balance {
            self.balances.get(&owner_acc).unwrap_or(0)
        }

        #[ink(message)]
        pub fn my_balance(&self) -> Balance {
            let caller_acc = self.env().caller();
            self.balance_of(caller_acc)
        }

        #[ink(message)]
        pub fn allowance(&self, owner_acc: AccountId, spender_acc: AccountId) -> Balance {
            self.allowances.get(&(owner_acc, spender_acc)).unwrap_or(0)
        }

        /// Native value collected by `pay_turbulence_fee` and not yet withdrawn.
        #[ink(message)]
        pub fn fees_collected(&self) -> Balance {
            self.fees_collected
        }

        // -------- write API --------

        #[ink(message)]
        pub fn transfer(&mut self, to_acc: AccountId, amount_val: Balance) -> Result<()> {
            let from_acc = self.env().caller();
            self.move_balance(from_acc, to_acc, amount_val)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender_acc: AccountId, amount_val: Balance) -> Result<()> {
            let owner_acc = self.env().caller();
            self.allowances.insert(&(owner_acc, spender_acc), &amount_val);
            self.env().emit_event(Approval { owner_acc, spender_acc, amount_val });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
        ) -> Result<()> {
            let caller_acc = self.env().caller();
            let current_allow = self.allowances.get(&(from_acc, caller_acc)).unwrap_or(0);
            if current_allow < amount_val {
                return Err(Error::InsufficientAllowance)
            }
            self.move_balance(from_acc, to_acc, amount_val)?;

            // Reduce allowance only once the transfer is known to succeed.
            let new_allow = current_allow.checked_sub(amount_val).ok_or(Error::Overflow)?;
            self.allowances.insert(&(from_acc, caller_acc), &new_allow);
            Ok(())
        }

        /// Privileged mint, bounded by `MAX_SUPPLY`.
        #[ink(message)]
        pub fn mint(&mut self, to_acc: AccountId, amount_val: Balance) -> Result<()> {
            self.only_owner()?;
            if is_zero_account(&to_acc) {
                return Err(Error::InvalidRecipient)
            }
            let new_total = self.total_supply.checked_add(amount_val).ok_or(Error::Overflow)?;
            if new_total > MAX_SUPPLY {
                return Err(Error::SupplyCapExceeded)
            }
            self.total_supply = new_total;

            let to_bal = self.balances.get(&to_acc).unwrap_or(0);
            let new_to = to_bal.checked_add(amount_val).ok_or(Error::Overflow)?;
            self.balances.insert(&to_acc, &new_to);

            self.env().emit_event(Transfer {
                from_acc: None,
                to_acc: Some(to_acc),
                amount_val,
            });
            Ok(())
        }

        /// Accepts the fixed turbulence fee. Exact payment only; anything else
        /// rejects the whole call and no value is kept.
        #[ink(message, payable)]
        pub fn pay_turbulence_fee(&mut self) -> Result<()> {
            let paid_val = self.env().transferred_value();
            if paid_val != TURBULENCE_FEE {
                return Err(Error::IncorrectFeeAmount)
            }
            let payer_acc = self.env().caller();
            self.fees_collected =
                self.fees_collected.checked_add(paid_val).ok_or(Error::Overflow)?;
            self.env().emit_event(FeePaid { payer_acc, amount_val: paid_val });
            Ok(())
        }

        /// Pays out every collected fee to the owner in one native transfer.
        #[ink(message)]
        pub fn withdraw_fees(&mut self) -> Result<()> {
            self.only_owner()?;
            let amount_val = self.fees_collected;
            if amount_val == 0 {
                return Err(Error::NoFeesToWithdraw)
            }
            // Zero the accumulator before moving value out.
            self.fees_collected = 0;
            let to_acc = self.owner_acc;
            if self.env().transfer(to_acc, amount_val).is_err() {
                return Err(Error::NativeTransferFailed)
            }
            self.env().emit_event(FeesWithdrawn { to_acc, amount_val });
            Ok(())
        }

        /// Burns a block-derived 1-10% slice of the caller's balance and
        /// returns the burned amount. The percentage comes from hashing
        /// caller, block number and timestamp, so it is unpredictable enough
        /// for a promotional mechanic but NOT adversary-proof randomness.
        #[ink(message)]
        pub fn crash_and_burn(&mut self) -> Result<Balance> {
            let from_acc = self.env().caller();
            let from_bal = self.balances.get(&from_acc).unwrap_or(0);
            if from_bal == 0 {
                return Err(Error::InsufficientBalance)
            }

            let percent = self.turbulence_percent();
            let amount_val = burn_amount(from_bal, percent)?;

            // amount_val can round to zero for dust balances; the burn still
            // "happens" and the event records a zero amount.
            let new_bal = from_bal.checked_sub(amount_val).ok_or(Error::Overflow)?;
            self.balances.insert(&from_acc, &new_bal);
            self.total_supply =
                self.total_supply.checked_sub(amount_val).ok_or(Error::Overflow)?;

            self.env().emit_event(Transfer {
                from_acc: Some(from_acc),
                to_acc: None,
                amount_val,
            });
            self.env().emit_event(CrashAndBurn { from_acc, amount_val });
            Ok(amount_val)
        }

        /// Invoked by the dapp's "Successful Landing" button; intentionally
        /// has no on-chain effect.
        #[ink(message)]
        pub fn successful_landing(&self) {}

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_acc: AccountId) -> Result<()> {
            self.only_owner()?;
            if is_zero_account(&new_acc) {
                return Err(Error::InvalidRecipient)
            }
            let previous_acc = self.owner_acc;
            self.owner_acc = new_acc;
            self.env().emit_event(OwnershipTransferred { previous_acc, new_acc });
            Ok(())
        }

        // ---- internals ----

        fn move_balance(
            &mut self,
            from_acc: AccountId,
            to_acc: AccountId,
            amount_val: Balance,
        ) -> Result<()> {
            if is_zero_account(&to_acc) {
                return Err(Error::InvalidRecipient)
            }
            let from_bal = self.balances.get(&from_acc).unwrap_or(0);
            if from_bal < amount_val {
                return Err(Error::InsufficientBalance)
            }
            let new_from = from_bal.checked_sub(amount_val).ok_or(Error::Overflow)?;
            self.balances.insert(&from_acc, &new_from);

            let to_bal = self.balances.get(&to_acc).unwrap_or(0);
            let new_to = to_bal.checked_add(amount_val).ok_or(Error::Overflow)?;
            self.balances.insert(&to_acc, &new_to);

            self.env().emit_event(Transfer {
                from_acc: Some(from_acc),
                to_acc: Some(to_acc),
                amount_val,
            });
            Ok(())
        }

        /// Pseudo-random burn percentage in [1, 10].
        fn turbulence_percent(&self) -> u8 {
            let caller_acc = self.env().caller();
            let block_num = self.env().block_number();
            let now_ts = self.env().block_timestamp();

            let mut output = <Keccak256 as HashOutput>::Type::default();
            ink::env::hash_encoded::<Keccak256, _>(
                &(caller_acc, block_num, now_ts),
                &mut output,
            );
            let mut seed_bytes = [0u8; 8];
            seed_bytes.copy_from_slice(&output[..8]);
            let seed = u64::from_le_bytes(seed_bytes);
            (seed % 10) as u8 + 1
        }
    }

    fn is_zero_account(acc: &AccountId) -> bool {
        AsRef::<[u8; 32]>::as_ref(acc).iter().all(|byte| *byte == 0)
    }

    /// floor(balance * percent / 100)
    fn burn_amount(balance: Balance, percent: u8) -> Result<Balance> {
        let scaled = balance
            .checked_mul(Balance::from(percent))
            .ok_or(Error::Overflow)?;
        Ok(scaled / 100)
    }

}
