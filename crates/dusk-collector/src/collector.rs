//! The fee collector: auction entrypoints over the epoch ledger.
//!
//! Reward tokens deposited via `update_reward` are auctioned off for the
//! settlement token at a continuously decaying price; proceeds accrue to
//! the depositors of the epoch that sold. Every entrypoint is
//! all-or-nothing: fallible arithmetic and custody transfers run before
//! the first ledger write, and a failed second transfer is compensated.

use tracing::{debug, warn};

use dusk_core::error::{CollectorError, MathError};
use dusk_core::math::mul_div;
use dusk_core::traits::{PriceCurve, TokenTransfer};
use dusk_core::types::{Address, EpochBalance, TokenInfo};

use crate::ledger::TokenLedger;

/// One settled epoch in a user catch-up pass.
struct CatchupEntry {
    epoch: u64,
    user_balance: u128,
    owed: u128,
}

/// Continuous Dutch-auction fee collector.
///
/// Generic over the custody backend `T` and the price curve `C`; the
/// collector itself only keeps books. Epoch lifecycle per token: deposits
/// accumulate in `current_epoch`; the first trade against it freezes it
/// (`current_epoch` advances) and later deposits open the next epoch; a
/// frozen epoch is finalized lazily, at the start of the next touching
/// call, once fully sold. Depositors then collect their pro-rata
/// settlement proceeds through [`FeeCollector::claim`].
pub struct FeeCollector<T, C> {
    transfers: T,
    curve: C,
    settlement_token: Address,
    ledger: TokenLedger,
}

impl<T: TokenTransfer, C: PriceCurve> FeeCollector<T, C> {
    pub fn new(transfers: T, curve: C, settlement_token: Address) -> Self {
        Self { transfers, curve, settlement_token, ledger: TokenLedger::new() }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// The settlement currency all auctions quote in.
    pub fn settlement_token(&self) -> Address {
        self.settlement_token
    }

    /// Auction price of `token`'s whole sellable pool at `now`.
    pub fn price(&self, token: Address, now: u64) -> Result<u128, CollectorError> {
        let info = self.ledger.token_info(token);
        Ok(self.curve.price_for_time(info.last_value, info.last_time, now)?)
    }

    /// Settlement currency owed to `user`, claimable via [`Self::claim`].
    pub fn balance_of(&self, user: Address) -> u128 {
        self.ledger.settlement_balance(user)
    }

    /// Sellable remainder of `token` across its unfinalized epochs.
    pub fn available_balance(&self, token: Address) -> u128 {
        self.ledger.available_balance(token)
    }

    pub fn token_info(&self, token: Address) -> TokenInfo {
        self.ledger.token_info(token)
    }

    pub fn epoch_balance(&self, token: Address, epoch: u64) -> EpochBalance {
        self.ledger.epoch_balance(token, epoch)
    }

    pub fn user_epoch_balance(&self, user: Address, token: Address, epoch: u64) -> u128 {
        self.ledger.user_epoch_balance(user, token, epoch)
    }

    /// Oldest epoch of `token` that `user` has not settled yet.
    pub fn first_user_unprocessed_epoch(&self, user: Address, token: Address) -> u64 {
        self.ledger.user_pointer(user, token)
    }

    /// The custody backend, for host inspection.
    pub fn transfers(&self) -> &T {
        &self.transfers
    }

    pub fn transfers_mut(&mut self) -> &mut T {
        &mut self.transfers
    }

    // ------------------------------------------------------------------
    // Mutating entrypoints
    // ------------------------------------------------------------------

    /// Deposit `amount` of `token` pulled from `payer`, credited to `user`.
    ///
    /// This is the hook reward-bearing tokens call on fee accrual; `payer`
    /// and `user` differ when an LP token forwards fees on behalf of a
    /// holder. Repricing treats the deposit as new sellable supply at the
    /// current auction price. A zero `amount` is a no-op.
    pub fn update_reward(
        &mut self,
        token: Address,
        payer: Address,
        user: Address,
        amount: u128,
        now: u64,
    ) -> Result<(), CollectorError> {
        if amount == 0 {
            return Ok(());
        }

        let mut info = self.rolled_info(token);
        let price = self.curve.price_for_time(info.last_value, info.last_time, now)?;
        let fee = self.ledger.available_balance(token);
        let fee_after = fee.checked_add(amount).ok_or(MathError::Overflow)?;
        let anchor = if fee == 0 {
            // Empty pool: the first deposit sets the scale outright.
            mul_div(price, fee_after, 1)?
        } else {
            mul_div(price, fee_after, fee)?
        };
        let first = info.first_unprocessed_epoch;
        let catchup = self.plan_catchup(user, token, first)?;

        self.transfers.transfer_in(token, payer, amount)?;

        info.last_value = anchor;
        info.last_time = now;
        self.ledger.set_token_info(token, info);
        self.apply_catchup(user, token, first, catchup);
        self.ledger.credit_user_epoch(user, token, info.current_epoch, amount);
        self.ledger.epoch_balance_mut(token, info.current_epoch).total_supply += amount;

        debug!(
            %token, %user, amount, epoch = info.current_epoch, anchor,
            "reward deposited"
        );
        Ok(())
    }

    /// Direct deposit form for callers that are not reward-bearing tokens.
    ///
    /// Ledger semantics are identical to [`Self::update_reward`].
    pub fn update_reward_non_lp(
        &mut self,
        token: Address,
        payer: Address,
        user: Address,
        amount: u128,
        now: u64,
    ) -> Result<(), CollectorError> {
        self.update_reward(token, payer, user, amount, now)
    }

    /// Buy reward tokens with `amount` of settlement currency.
    ///
    /// The buyer receives `amount * available / price` reward tokens (floor
    /// division), filled oldest-epoch-first; the settlement payment is
    /// split across the filled epochs pro-rata to the tokens each
    /// contributed. Returns the reward amount paid out.
    ///
    /// # Errors
    ///
    /// [`CollectorError::InsufficientLiquidity`] when the quote exceeds the
    /// sellable remainder or rounds to zero; nothing changes.
    pub fn trade(
        &mut self,
        buyer: Address,
        token: Address,
        amount: u128,
        now: u64,
    ) -> Result<u128, CollectorError> {
        let mut info = self.rolled_info(token);
        let price = self.curve.price_for_time(info.last_value, info.last_time, now)?;
        let available = self.ledger.available_balance(token);
        let tokens_out = mul_div(amount, available, price)?;
        if tokens_out == 0 || tokens_out > available {
            return Err(CollectorError::InsufficientLiquidity {
                requested: tokens_out,
                available,
            });
        }

        // Fill the oldest unfinalized epoch first, spill into the current
        // one. The span is at most two epochs wide.
        let first = info.first_unprocessed_epoch;
        let head_take = tokens_out.min(self.ledger.epoch_balance(token, first).remaining());
        let spill_take = tokens_out - head_take;
        let head_pay = if spill_take == 0 {
            amount
        } else {
            mul_div(amount, head_take, tokens_out)?
        };
        let spill_pay = amount - head_pay;

        // available >= tokens_out >= 1, so the denominator is nonzero.
        let anchor = mul_div(price, available - tokens_out, available)?;

        self.transfers.transfer_in(self.settlement_token, buyer, amount)?;
        if let Err(err) = self.transfers.transfer_out(token, buyer, tokens_out) {
            if let Err(refund_err) =
                self.transfers.transfer_out(self.settlement_token, buyer, amount)
            {
                warn!(%buyer, amount, ?refund_err, "trade refund failed");
            }
            return Err(err.into());
        }

        let started_open = first == info.current_epoch;
        let current = info.current_epoch;
        info.last_value = anchor;
        info.last_time = now;
        if started_open || spill_take > 0 {
            // The traded epoch freezes; deposits move to the next one.
            info.current_epoch += 1;
        }
        self.ledger.set_token_info(token, info);

        let head = self.ledger.epoch_balance_mut(token, first);
        head.traded += head_take;
        head.token_balance += head_pay;
        if spill_take > 0 {
            let spill = self.ledger.epoch_balance_mut(token, current);
            spill.traded += spill_take;
            spill.token_balance += spill_pay;
        }

        debug!(
            %token, %buyer, amount, tokens_out, head_take, spill_take,
            current_epoch = info.current_epoch, "trade filled"
        );
        Ok(tokens_out)
    }

    /// Settle `caller`'s share of every finalized epoch of `tokens` and
    /// pay out their whole settlement balance. Returns the amount paid.
    ///
    /// Idempotent: a repeat call with no intervening activity pays zero.
    pub fn claim(&mut self, caller: Address, tokens: &[Address]) -> Result<u128, CollectorError> {
        for &token in tokens {
            let info = self.rolled_info(token);
            let first = info.first_unprocessed_epoch;
            let catchup = self.plan_catchup(caller, token, first)?;
            self.ledger.set_token_info(token, info);
            self.apply_catchup(caller, token, first, catchup);
        }

        let owed = self.ledger.settlement_balance(caller);
        if owed == 0 {
            return Ok(0);
        }
        self.transfers.transfer_out(self.settlement_token, caller, owed)?;
        self.ledger.clear_settlement(caller);

        debug!(%caller, owed, "settlement claimed");
        Ok(owed)
    }

    /// Withdraw `caller`'s untraded deposit from `token`'s open epoch.
    ///
    /// Pays back in `token` and shrinks the epoch's supply; a zero balance
    /// is a no-op. Returns the amount withdrawn.
    pub fn claim_current_epoch(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<u128, CollectorError> {
        let info = self.rolled_info(token);
        let balance = self.ledger.user_epoch_balance(caller, token, info.current_epoch);
        if balance == 0 {
            return Ok(0);
        }

        self.transfers.transfer_out(token, caller, balance)?;

        self.ledger.set_token_info(token, info);
        self.ledger.clear_user_epoch(caller, token, info.current_epoch);
        self.ledger.epoch_balance_mut(token, info.current_epoch).total_supply -= balance;

        debug!(%token, %caller, balance, epoch = info.current_epoch, "current epoch claimed");
        Ok(balance)
    }

    /// Exit the frozen, partially sold epoch of `token` early.
    ///
    /// Pays `caller` their pro-rata share of the unsold reward tokens and
    /// of the settlement proceeds collected so far, and shrinks the epoch
    /// so remaining depositors' shares are unchanged. Returns
    /// `(reward_paid, settlement_paid)`.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::EpochAlreadyFinalized`] when no frozen epoch
    ///   exists or `caller` already exited it
    /// - [`CollectorError::EpochFundsAlreadyClaimed`] when `caller` has
    ///   nothing in the frozen epoch, or lags behind it and must use
    ///   [`Self::claim`] instead
    pub fn claim_frozen_epoch(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<(u128, u128), CollectorError> {
        let info = self.rolled_info(token);
        let first = info.first_unprocessed_epoch;
        if first == info.current_epoch {
            return Err(CollectorError::EpochAlreadyFinalized);
        }
        let pointer = self.ledger.user_pointer(caller, token);
        if pointer > first {
            return Err(CollectorError::EpochAlreadyFinalized);
        }
        if pointer < first {
            return Err(CollectorError::EpochFundsAlreadyClaimed);
        }
        let balance = self.ledger.user_epoch_balance(caller, token, first);
        if balance == 0 {
            return Err(CollectorError::EpochFundsAlreadyClaimed);
        }

        let epoch = self.ledger.epoch_balance(token, first);
        let reward_out = mul_div(epoch.remaining(), balance, epoch.total_supply)?;
        let settlement_out = mul_div(epoch.token_balance, balance, epoch.total_supply)?;
        let traded_cut = mul_div(epoch.traded, balance, epoch.total_supply)?;

        if reward_out > 0 {
            self.transfers.transfer_out(token, caller, reward_out)?;
        }
        if settlement_out > 0 {
            if let Err(err) =
                self.transfers.transfer_out(self.settlement_token, caller, settlement_out)
            {
                if reward_out > 0 {
                    if let Err(refund_err) = self.transfers.transfer_in(token, caller, reward_out)
                    {
                        warn!(%caller, reward_out, ?refund_err, "frozen claim refund failed");
                    }
                }
                return Err(err.into());
            }
        }

        self.ledger.set_token_info(token, info);
        let entry = self.ledger.epoch_balance_mut(token, first);
        entry.total_supply -= balance;
        entry.traded -= traded_cut;
        entry.token_balance -= settlement_out;
        self.ledger.clear_user_epoch(caller, token, first);
        self.ledger.set_user_pointer(caller, token, first + 1);

        debug!(
            %token, %caller, epoch = first, reward_out, settlement_out,
            "frozen epoch claimed"
        );
        Ok((reward_out, settlement_out))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// `token`'s info with fully sold frozen epochs rolled past.
    ///
    /// A spill trade can leave two sold-out epochs behind, hence the loop.
    /// The open epoch is never finalized. Pure read: callers commit the
    /// advanced pointer together with their other ledger writes, so a
    /// rejected call leaves no trace.
    fn rolled_info(&self, token: Address) -> TokenInfo {
        let mut info = self.ledger.token_info(token);
        while info.first_unprocessed_epoch < info.current_epoch {
            let epoch = self.ledger.epoch_balance(token, info.first_unprocessed_epoch);
            if epoch.remaining() != 0 {
                break;
            }
            info.first_unprocessed_epoch += 1;
        }
        info
    }

    /// Stage `user`'s settlement shares from finalized epochs below `first`.
    ///
    /// Pure arithmetic; shares floor, so rounding dust stays in the pool.
    fn plan_catchup(
        &self,
        user: Address,
        token: Address,
        first: u64,
    ) -> Result<Vec<CatchupEntry>, MathError> {
        let mut entries = Vec::new();
        for epoch in self.ledger.user_pointer(user, token)..first {
            let user_balance = self.ledger.user_epoch_balance(user, token, epoch);
            if user_balance == 0 {
                continue;
            }
            let balances = self.ledger.epoch_balance(token, epoch);
            // total_supply >= user_balance > 0, so the division is sound.
            let owed = mul_div(balances.token_balance, user_balance, balances.total_supply)?;
            entries.push(CatchupEntry { epoch, user_balance, owed });
        }
        Ok(entries)
    }

    /// Commit a staged catch-up and advance the user's epoch pointer.
    fn apply_catchup(
        &mut self,
        user: Address,
        token: Address,
        first: u64,
        entries: Vec<CatchupEntry>,
    ) {
        for entry in entries {
            let epoch = self.ledger.epoch_balance_mut(token, entry.epoch);
            epoch.total_supply -= entry.user_balance;
            epoch.token_balance -= entry.owed;
            self.ledger.clear_user_epoch(user, token, entry.epoch);
            if entry.owed > 0 {
                self.ledger.credit_settlement(user, entry.owed);
            }
        }
        // A frozen-epoch exit can park the pointer ahead of `first`.
        if first > self.ledger.user_pointer(user, token) {
            self.ledger.set_user_pointer(user, token, first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dusk_core::error::TransferError;
    use std::collections::HashMap;

    const FLOOR: u128 = 10;

    /// Curve stub: price is the anchor itself, floored. Keeps the epoch
    /// arithmetic in the assertions exact.
    struct FlatCurve;

    impl PriceCurve for FlatCurve {
        fn price_for_time(
            &self,
            last_value: u128,
            _last_time: u64,
            _now: u64,
        ) -> Result<u128, MathError> {
            Ok(last_value.max(FLOOR))
        }
    }

    #[derive(Default)]
    struct Bank {
        holdings: HashMap<(Address, Address), u128>,
        custody: HashMap<Address, u128>,
    }

    impl Bank {
        fn fund(&mut self, token: Address, owner: Address, amount: u128) {
            *self.holdings.entry((token, owner)).or_default() += amount;
        }

        fn holding(&self, token: Address, owner: Address) -> u128 {
            self.holdings.get(&(token, owner)).copied().unwrap_or(0)
        }

        fn in_custody(&self, token: Address) -> u128 {
            self.custody.get(&token).copied().unwrap_or(0)
        }
    }

    impl TokenTransfer for Bank {
        fn transfer_in(
            &mut self,
            token: Address,
            from: Address,
            amount: u128,
        ) -> Result<(), TransferError> {
            let have = self.holdings.entry((token, from)).or_default();
            if *have < amount {
                return Err(TransferError::InsufficientBalance { have: *have, need: amount });
            }
            *have -= amount;
            *self.custody.entry(token).or_default() += amount;
            Ok(())
        }

        fn transfer_out(
            &mut self,
            token: Address,
            to: Address,
            amount: u128,
        ) -> Result<(), TransferError> {
            let have = self.custody.entry(token).or_default();
            if *have < amount {
                return Err(TransferError::InsufficientBalance { have: *have, need: amount });
            }
            *have -= amount;
            *self.holdings.entry((token, to)).or_default() += amount;
            Ok(())
        }
    }

    const INCH: Address = Address([0xaa; 20]);
    const WETH: Address = Address([0xbb; 20]);
    const ALICE: Address = Address([0x01; 20]);
    const BOB: Address = Address([0x02; 20]);
    const CAROL: Address = Address([0x03; 20]);

    fn collector() -> FeeCollector<Bank, FlatCurve> {
        let mut bank = Bank::default();
        bank.fund(WETH, ALICE, 1_000_000);
        bank.fund(INCH, BOB, 1_000_000_000);
        FeeCollector::new(bank, FlatCurve, INCH)
    }

    #[test]
    fn deposit_credits_epoch_and_reprices() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        let info = c.token_info(WETH);
        assert_eq!(info.last_value, FLOOR * 100);
        assert_eq!(info.current_epoch, 0);
        assert_eq!(c.epoch_balance(WETH, 0).total_supply, 100);
        assert_eq!(c.user_epoch_balance(ALICE, WETH, 0), 100);
        assert_eq!(c.transfers().in_custody(WETH), 100);
    }

    #[test]
    fn zero_deposit_is_a_noop() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 0, 0).unwrap();
        assert_eq!(c.token_info(WETH), TokenInfo::default());
    }

    #[test]
    fn second_deposit_scales_the_anchor() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        // price * (100 + 100) / 100
        assert_eq!(c.token_info(WETH).last_value, FLOOR * 100 * 2);
        assert_eq!(c.epoch_balance(WETH, 0).total_supply, 200);
    }

    #[test]
    fn trade_fills_and_freezes_the_epoch() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        // price = 1000, available = 100; 500 settlement buys 50.
        let out = c.trade(BOB, WETH, 500, 0).unwrap();
        assert_eq!(out, 50);

        let info = c.token_info(WETH);
        assert_eq!(info.current_epoch, 1);
        assert_eq!(info.first_unprocessed_epoch, 0);
        assert_eq!(info.last_value, 500);

        let epoch = c.epoch_balance(WETH, 0);
        assert_eq!(epoch.traded, 50);
        assert_eq!(epoch.token_balance, 500);
        assert_eq!(c.transfers().holding(WETH, BOB), 50);
        assert_eq!(c.transfers().in_custody(INCH), 500);
    }

    #[test]
    fn trade_rejects_oversized_quote() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        let err = c.trade(BOB, WETH, 2_000, 0).unwrap_err();
        assert_eq!(
            err,
            CollectorError::InsufficientLiquidity { requested: 200, available: 100 }
        );
        // Nothing moved.
        assert_eq!(c.transfers().in_custody(INCH), 0);
        assert_eq!(c.epoch_balance(WETH, 0).traded, 0);
    }

    #[test]
    fn trade_rejects_zero_quote() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        let err = c.trade(BOB, WETH, 0, 0).unwrap_err();
        assert!(matches!(err, CollectorError::InsufficientLiquidity { requested: 0, .. }));
    }

    #[test]
    fn failed_pull_leaves_ledger_untouched() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        let before = c.token_info(WETH);

        // Carol holds no settlement currency; the pull fails.
        let err = c.trade(CAROL, WETH, 500, 0).unwrap_err();
        assert!(matches!(err, CollectorError::Transfer(_)));
        assert_eq!(c.token_info(WETH), before);
        assert_eq!(c.epoch_balance(WETH, 0).traded, 0);
    }

    #[test]
    fn sellout_finalizes_on_next_touch() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 1_000, 0).unwrap();

        // Finalization is lazy: the pointer moves on the next call.
        assert_eq!(c.token_info(WETH).first_unprocessed_epoch, 0);
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        let info = c.token_info(WETH);
        assert_eq!(info.first_unprocessed_epoch, 1);
        assert_eq!(info.current_epoch, 1);
        // Alice's share of the sold epoch is banked internally.
        assert_eq!(c.balance_of(ALICE), 1_000);
        assert_eq!(c.user_epoch_balance(ALICE, WETH, 0), 0);
        assert_eq!(c.epoch_balance(WETH, 0).total_supply, 0);
    }

    #[test]
    fn rejected_trade_does_not_finalize_epochs() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 1_000, 0).unwrap();
        assert_eq!(c.token_info(WETH).first_unprocessed_epoch, 0);

        // The pool is empty, so any quote is rejected; the sold-out epoch
        // must stay pending rather than finalize as a side effect.
        let err = c.trade(BOB, WETH, 1_000, 0).unwrap_err();
        assert!(matches!(err, CollectorError::InsufficientLiquidity { .. }));
        assert_eq!(c.token_info(WETH).first_unprocessed_epoch, 0);
    }

    #[test]
    fn failed_deposit_does_not_finalize_epochs() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 1_000, 0).unwrap();
        let before = c.token_info(WETH);
        assert_eq!(before.first_unprocessed_epoch, 0);

        // Carol holds no reward tokens; the rejected pull must not advance
        // the pointer past the sold-out epoch.
        let err = c.update_reward(WETH, CAROL, CAROL, 100, 0).unwrap_err();
        assert!(matches!(err, CollectorError::Transfer(_)));
        assert_eq!(c.token_info(WETH), before);
        assert_eq!(c.user_epoch_balance(CAROL, WETH, 1), 0);
    }

    #[test]
    fn spill_trade_splits_payment_pro_rata() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 10, 0).unwrap();
        // anchor 100; buying 1 freezes epoch 0 with 9 left in it.
        c.trade(BOB, WETH, 10, 0).unwrap();
        // Deposit into the new epoch reprices: 90 * 19 / 9.
        c.update_reward(WETH, ALICE, ALICE, 10, 0).unwrap();

        let price = c.price(WETH, 0).unwrap();
        assert_eq!(price, 190);
        assert_eq!(c.available_balance(WETH), 19);

        // Spend exactly the pool price to buy everything.
        let out = c.trade(BOB, WETH, 190, 0).unwrap();
        assert_eq!(out, 19);

        let info = c.token_info(WETH);
        assert_eq!(info.current_epoch, 2);

        let head = c.epoch_balance(WETH, 0);
        let spill = c.epoch_balance(WETH, 1);
        assert_eq!(head.traded, 10);
        assert_eq!(spill.traded, 10);
        // 190 * 9 / 19 of the payment follows the 9 head tokens.
        assert_eq!(head.token_balance, 10 + 90);
        assert_eq!(spill.token_balance, 100);
    }

    #[test]
    fn claim_pays_full_balance_and_is_idempotent() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 1_000, 0).unwrap();

        let paid = c.claim(ALICE, &[WETH]).unwrap();
        assert_eq!(paid, 1_000);
        assert_eq!(c.balance_of(ALICE), 0);
        assert_eq!(c.transfers().holding(INCH, ALICE), 1_000);

        assert_eq!(c.claim(ALICE, &[WETH]).unwrap(), 0);
    }

    #[test]
    fn claim_current_epoch_withdraws_deposit() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        let held = c.transfers().holding(WETH, ALICE);

        let out = c.claim_current_epoch(ALICE, WETH).unwrap();
        assert_eq!(out, 100);
        assert_eq!(c.transfers().holding(WETH, ALICE), held + 100);
        assert_eq!(c.epoch_balance(WETH, 0).total_supply, 0);
        assert_eq!(c.user_epoch_balance(ALICE, WETH, 0), 0);

        // Nothing left to withdraw.
        assert_eq!(c.claim_current_epoch(ALICE, WETH).unwrap(), 0);
    }

    #[test]
    fn claim_frozen_epoch_requires_a_frozen_epoch() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();

        assert_eq!(
            c.claim_frozen_epoch(ALICE, WETH).unwrap_err(),
            CollectorError::EpochAlreadyFinalized
        );
    }

    #[test]
    fn claim_frozen_epoch_pays_unsold_share_and_proceeds() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        // Half sold: 50 traded for 500 settlement, epoch 0 freezes.
        c.trade(BOB, WETH, 500, 0).unwrap();

        let (reward_out, settlement_out) = c.claim_frozen_epoch(ALICE, WETH).unwrap();
        assert_eq!(reward_out, 50);
        assert_eq!(settlement_out, 500);

        let epoch = c.epoch_balance(WETH, 0);
        assert_eq!(epoch.total_supply, 0);
        assert_eq!(epoch.traded, 0);
        assert_eq!(epoch.token_balance, 0);
        assert_eq!(c.first_user_unprocessed_epoch(ALICE, WETH), 1);

        // A second exit finds the pointer past the epoch.
        assert_eq!(
            c.claim_frozen_epoch(ALICE, WETH).unwrap_err(),
            CollectorError::EpochAlreadyFinalized
        );
    }

    #[test]
    fn claim_frozen_epoch_rejects_strangers() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 500, 0).unwrap();

        assert_eq!(
            c.claim_frozen_epoch(BOB, WETH).unwrap_err(),
            CollectorError::EpochFundsAlreadyClaimed
        );
    }

    #[test]
    fn lagging_user_must_use_claim() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        // Sell out epoch 0, then freeze epoch 1 with Bob's trade half-filled.
        c.trade(BOB, WETH, 1_000, 0).unwrap();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 500, 0).unwrap();

        // Bob's pointer never advanced past the settled epoch 0.
        assert_eq!(c.first_user_unprocessed_epoch(BOB, WETH), 0);
        assert_eq!(c.token_info(WETH).first_unprocessed_epoch, 1);

        assert_eq!(
            c.claim_frozen_epoch(BOB, WETH).unwrap_err(),
            CollectorError::EpochFundsAlreadyClaimed
        );
    }

    #[test]
    fn conservation_across_a_full_cycle() {
        let mut c = collector();
        c.update_reward(WETH, ALICE, ALICE, 100, 0).unwrap();
        c.trade(BOB, WETH, 1_000, 0).unwrap();
        c.update_reward(WETH, ALICE, ALICE, 50, 0).unwrap();
        c.claim(ALICE, &[WETH]).unwrap();
        c.claim_current_epoch(ALICE, WETH).unwrap();

        // All value is back with the owners; custody holds nothing.
        assert_eq!(c.transfers().in_custody(WETH), 0);
        assert_eq!(c.transfers().in_custody(INCH), 0);
        assert_eq!(c.transfers().holding(WETH, BOB), 100);
        assert_eq!(c.transfers().holding(INCH, ALICE), 1_000);
    }
}
