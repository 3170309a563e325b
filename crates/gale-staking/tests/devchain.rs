// crates/gale-staking/tests/devchain.rs
//
// Deposit / claim / withdraw walkthrough on an auto-mining clock, where every
// transaction lands in its own block. Read-only previews observe the last
// sealed block, so a claim made after one empty block pays for two.

use gale_core::{Address, AssetLedger, LedgerEvent};
use gale_staking::{AutoMineClock, InMemoryAsset, Staker, StakerConfig, Wind};

fn tenths(n: u128) -> u128 {
    n * 100_000_000_000_000_000
}

#[test]
fn deposit_claim_withdraw_on_auto_mined_blocks() {
    let account = Address::from_label("account-0");
    let config = StakerConfig::default();
    let ledger = config.address;

    let mut wind = InMemoryAsset::new("WIND");
    wind.mint(&account, tenths(1000)).unwrap();
    let mut lp = InMemoryAsset::new("LP");
    lp.mint(&account, tenths(1000)).unwrap();

    // Send the ledger 10 WIND to pay rewards with, and approve it for LP.
    wind.transfer(&account, &ledger, tenths(100)).unwrap();
    lp.approve(&account, &ledger, tenths(1000));

    let mut staker = Staker::new(config, lp, wind, AutoMineClock::new(0));

    staker.deposit(&account, 1).unwrap();
    assert_eq!(staker.stake_asset().balance_of(&ledger), 1);
    assert_eq!(staker.stake_asset().balance_of(&account), tenths(1000) - 1);
    assert_eq!(staker.staked_amount_of(&account), 1);

    assert_eq!(staker.current_divisor_for_pool(&account), Some(1));
    assert_eq!(staker.percentage_divisor(&account), Some(1));

    // One empty block, then a full block's reward is visible.
    staker.clock().mine();
    assert_eq!(staker.pending_reward_preview(&account).unwrap().amount, tenths(1));

    // The claim itself seals another block: two blocks are paid.
    assert_eq!(staker.claim_rewards(&account, &account).unwrap(), tenths(2));
    assert_eq!(staker.reward_asset().balance_of(&account), tenths(902));
    assert_eq!(staker.reward_asset().balance_of(&ledger), tenths(98));

    staker.clock().mine();
    assert_eq!(staker.pending_reward_preview(&account).unwrap().amount, tenths(1));

    // Withdrawal settles first.
    staker.withdraw(&account, 1).unwrap();
    assert_eq!(staker.reward_asset().balance_of(&account), tenths(904));
    assert_eq!(staker.reward_asset().balance_of(&ledger), tenths(96));
    assert_eq!(
        Wind::from_wei(staker.reward_budget()).to_string(),
        "9.6 WIND"
    );

    assert_eq!(staker.stake_asset().balance_of(&ledger), 0);
    assert_eq!(staker.stake_asset().balance_of(&account), tenths(1000));

    let kinds: Vec<&str> = staker.events().iter().map(LedgerEvent::name).collect();
    assert_eq!(
        kinds,
        vec!["deposited", "reward_paid", "reward_paid", "withdrawn"]
    );
}
