// crates/gale-cli/src/scenario.rs
//
// Scripted ledger scenarios.
//
// A scenario names its accounts, their starting balances and approvals, then
// lists steps (block advances, deposits, withdrawals, claims, emergency
// withdrawals, previews, budget top-ups). Steps that the ledger rejects are
// recorded with their error and the run continues, the way a reverted
// transaction leaves the chain moving.
//
// Amounts are token strings ("1.5") or raw wei ("3 wei").

use serde::{Deserialize, Serialize};

use gale_core::{Address, AssetLedger, BlockClock, GaleError, LedgerEvent};
use gale_staking::{
    AutoMineClock, InMemoryAsset, ManualClock, ParticipantState, Staker, StakerConfig, Wind,
};

/// How blocks advance during a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Blocks only move on `advance` steps.
    #[default]
    Manual,
    /// Every ledger transaction seals its own block.
    AutoMine,
}

/// Starting position of one account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSpec {
    pub name: String,
    /// Stake asset minted to the account.
    #[serde(default)]
    pub stake_balance: Option<String>,
    /// Stake asset the ledger may pull. Defaults to the full stake balance.
    #[serde(default)]
    pub approve: Option<String>,
    /// Reward asset minted to the account.
    #[serde(default)]
    pub reward_balance: Option<String>,
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Advance { blocks: u64 },
    Deposit { who: String, amount: String },
    Withdraw { who: String, amount: String },
    Claim {
        #[serde(default)]
        caller: Option<String>,
        beneficiary: String,
    },
    EmergencyWithdraw { who: String },
    Preview { who: String },
    Fund { amount: String },
}

/// A complete scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub clock: ClockMode,
    #[serde(default)]
    pub start_block: u64,
    /// Overrides the configured emission rate.
    #[serde(default)]
    pub reward_per_block: Option<String>,
    /// Reward asset placed in the ledger before the first step.
    #[serde(default)]
    pub funding: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a scenario from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, GaleError> {
        Ok(toml::from_str(text)?)
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    /// Block after the step executed.
    pub block: u64,
    pub action: String,
    pub ok: bool,
    pub outcome: String,
}

/// Final position of one participant.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRecord {
    pub name: String,
    pub address: Address,
    pub state: ParticipantState,
    pub staked: u128,
    pub stored_divisor: Option<u128>,
    pub last_accrual_block: u64,
    pub reward_balance: u128,
    pub pending_reward: u128,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub name: Option<String>,
    pub final_block: u64,
    pub reward_per_block: u128,
    pub total_staked: u128,
    pub reward_budget: u128,
    pub steps: Vec<StepRecord>,
    pub events: Vec<LedgerEvent>,
    pub participants: Vec<ParticipantRecord>,
}

/// Parse a token amount ("0.1", "1_000") or a raw wei amount ("42 wei").
pub fn parse_amount(text: &str) -> Result<u128, GaleError> {
    let trimmed = text.trim();
    match trimmed.strip_suffix("wei") {
        Some(raw) => raw
            .trim()
            .replace('_', "")
            .parse::<u128>()
            .map_err(|e| GaleError::InvalidAmount(format!("Cannot parse {:?}: {}", text, e))),
        None => Ok(trimmed.parse::<Wind>()?.wei),
    }
}

/// Clocks the simulator can move forward.
trait SimClock: BlockClock {
    fn skip(&self, blocks: u64) -> u64;
}

impl SimClock for ManualClock {
    fn skip(&self, blocks: u64) -> u64 {
        self.advance(blocks)
    }
}

impl SimClock for AutoMineClock {
    fn skip(&self, blocks: u64) -> u64 {
        let mut block = self.current_block();
        for _ in 0..blocks {
            block = self.mine();
        }
        block
    }
}

/// Run `scenario` on a fresh in-memory ledger built from `base`.
///
/// # Errors
/// Returns an error only for malformed input (unparseable amounts or mint
/// overflow). Ledger rejections are recorded in the report.
pub fn run(scenario: &Scenario, base: &StakerConfig) -> Result<SimulationReport, GaleError> {
    match scenario.clock {
        ClockMode::Manual => execute(scenario, base, ManualClock::new(scenario.start_block)),
        ClockMode::AutoMine => execute(scenario, base, AutoMineClock::new(scenario.start_block)),
    }
}

fn execute<C: SimClock>(
    scenario: &Scenario,
    base: &StakerConfig,
    clock: C,
) -> Result<SimulationReport, GaleError> {
    let mut config = base.clone();
    if let Some(rate) = &scenario.reward_per_block {
        config.reward_per_block = parse_amount(rate)?;
    }
    let ledger = config.address;

    let mut lp = InMemoryAsset::new("LP");
    let mut wind = InMemoryAsset::new("WIND");
    let mut names = Vec::new();

    for account in &scenario.accounts {
        let address = Address::from_label(&account.name);
        let stake_balance = optional_amount(&account.stake_balance)?;
        let approve = match &account.approve {
            Some(text) => parse_amount(text)?,
            None => stake_balance,
        };

        lp.mint(&address, stake_balance)?;
        lp.approve(&address, &ledger, approve);
        wind.mint(&address, optional_amount(&account.reward_balance)?)?;
        names.push(account.name.clone());
    }
    wind.mint(&ledger, optional_amount(&scenario.funding)?)?;

    let mut staker = Staker::new(config, lp, wind, clock);
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let (action, result) = apply_step(&mut staker, step)?;
        let block = staker.clock().current_block();

        match &result {
            Ok(message) => tracing::debug!("Step {} at block {}: {} -> {}", index, block, action, message),
            Err(e) => tracing::warn!("Step {} at block {}: {} rejected: {}", index, block, action, e),
        }

        steps.push(StepRecord {
            index,
            block,
            ok: result.is_ok(),
            outcome: match result {
                Ok(message) => message,
                Err(e) => e.to_string(),
            },
            action,
        });
    }

    for step in &scenario.steps {
        if let Some(name) = step_subject(step) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    let mut participants = Vec::new();
    for name in names {
        let address = Address::from_label(&name);
        let Some(record) = staker.participant(&address) else {
            continue;
        };
        participants.push(ParticipantRecord {
            address,
            state: record.state(),
            staked: record.staked_amount,
            stored_divisor: record.stored_divisor,
            last_accrual_block: record.last_accrual_block,
            reward_balance: staker.reward_asset().balance_of(&address),
            pending_reward: staker.pending_reward_preview(&address)?.amount,
            name,
        });
    }

    Ok(SimulationReport {
        name: scenario.name.clone(),
        final_block: staker.clock().current_block(),
        reward_per_block: staker.reward_per_block(),
        total_staked: staker.total_staked(),
        reward_budget: staker.reward_budget(),
        steps,
        events: staker.events().to_vec(),
        participants,
    })
}

type StepResult = (String, Result<String, GaleError>);

fn apply_step<C: SimClock>(
    staker: &mut Staker<InMemoryAsset, InMemoryAsset, C>,
    step: &Step,
) -> Result<StepResult, GaleError> {
    let outcome = match step {
        Step::Advance { blocks } => (
            format!("advance {}", blocks),
            Ok(format!("block {}", staker.clock().skip(*blocks))),
        ),
        Step::Deposit { who, amount } => {
            let wei = parse_amount(amount)?;
            (
                format!("deposit {} by {}", Wind::from_wei(wei), who),
                staker
                    .deposit(&Address::from_label(who), wei)
                    .map(|divisor| format!("divisor {}", divisor)),
            )
        }
        Step::Withdraw { who, amount } => {
            let wei = parse_amount(amount)?;
            let address = Address::from_label(who);
            (
                format!("withdraw {} by {}", Wind::from_wei(wei), who),
                staker.withdraw(&address, wei).map(|()| {
                    format!("{} still staked", Wind::from_wei(staker.staked_amount_of(&address)))
                }),
            )
        }
        Step::Claim {
            caller,
            beneficiary,
        } => {
            let caller = caller.as_deref().unwrap_or(beneficiary);
            (
                format!("claim for {} by {}", beneficiary, caller),
                staker
                    .claim_rewards(&Address::from_label(caller), &Address::from_label(beneficiary))
                    .map(|paid| format!("paid {}", Wind::from_wei(paid))),
            )
        }
        Step::EmergencyWithdraw { who } => (
            format!("emergency withdraw by {}", who),
            staker
                .emergency_withdraw(&Address::from_label(who))
                .map(|amount| format!("returned {}", Wind::from_wei(amount))),
        ),
        Step::Preview { who } => {
            let address = Address::from_label(who);
            (
                format!("preview {}", who),
                staker.pending_reward_preview(&address).map(|preview| {
                    format!(
                        "pending {}, divisor {}, percentage divisor {}",
                        Wind::from_wei(preview.amount),
                        display_divisor(preview.divisor),
                        display_divisor(staker.percentage_divisor(&address))
                    )
                }),
            )
        }
        Step::Fund { amount } => {
            let wei = parse_amount(amount)?;
            let ledger = staker.address();
            staker.reward_asset_mut().mint(&ledger, wei)?;
            (
                format!("fund {}", Wind::from_wei(wei)),
                Ok(format!("budget {}", Wind::from_wei(staker.reward_budget()))),
            )
        }
    };
    Ok(outcome)
}

fn step_subject(step: &Step) -> Option<&str> {
    match step {
        Step::Deposit { who, .. }
        | Step::Withdraw { who, .. }
        | Step::EmergencyWithdraw { who }
        | Step::Preview { who } => Some(who),
        Step::Claim { beneficiary, .. } => Some(beneficiary),
        Step::Advance { .. } | Step::Fund { .. } => None,
    }
}

fn optional_amount(text: &Option<String>) -> Result<u128, GaleError> {
    match text {
        Some(t) => parse_amount(t),
        None => Ok(0),
    }
}

/// Render an optional divisor for tables and step outcomes.
pub fn display_divisor(divisor: Option<u128>) -> String {
    divisor.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::format_json;
    use gale_staking::{DEFAULT_REWARD_PER_BLOCK, WEI_PER_WIND};

    const LOWER_DIVISOR: &str = r#"
        name = "lower divisor adopted"
        funding = "10"

        [[accounts]]
        name = "alice"
        stake_balance = "100"

        [[accounts]]
        name = "bob"
        stake_balance = "100"

        [[steps]]
        action = "deposit"
        who = "alice"
        amount = "10 wei"

        [[steps]]
        action = "deposit"
        who = "bob"
        amount = "1 wei"

        [[steps]]
        action = "withdraw"
        who = "alice"
        amount = "10 wei"

        [[steps]]
        action = "claim"
        caller = "alice"
        beneficiary = "bob"

        [[steps]]
        action = "deposit"
        who = "alice"
        amount = "10 wei"

        [[steps]]
        action = "claim"
        beneficiary = "bob"

        [[steps]]
        action = "withdraw"
        who = "bob"
        amount = "5 wei"
    "#;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42 wei").unwrap(), 42);
        assert_eq!(parse_amount("1_000wei").unwrap(), 1_000);
        assert_eq!(parse_amount("0.1").unwrap(), DEFAULT_REWARD_PER_BLOCK);
        assert_eq!(parse_amount(" 2 ").unwrap(), 2 * WEI_PER_WIND);
        assert!(parse_amount("x wei").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_run_lower_divisor_scenario() {
        let scenario = Scenario::from_toml(LOWER_DIVISOR).unwrap();
        assert_eq!(scenario.clock, ClockMode::Manual);
        assert_eq!(scenario.steps.len(), 7);

        let report = run(&scenario, &StakerConfig::default()).unwrap();
        assert_eq!(report.total_staked, 11);

        // Only bob's over-withdrawal is rejected.
        let rejected: Vec<_> = report.steps.iter().filter(|s| !s.ok).collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 6);
        assert!(rejected[0].outcome.contains("Insufficient stake"));

        let bob = report
            .participants
            .iter()
            .find(|p| p.name == "bob")
            .unwrap();
        assert_eq!(bob.stored_divisor, Some(6));
        assert_eq!(bob.state, ParticipantState::Staking);
    }

    #[test]
    fn test_auto_mine_scenario_pays_per_transaction() {
        let scenario = Scenario::from_toml(
            r#"
            clock = "auto_mine"
            funding = "10"

            [[accounts]]
            name = "account-0"
            stake_balance = "100"

            [[steps]]
            action = "deposit"
            who = "account-0"
            amount = "1 wei"

            [[steps]]
            action = "advance"
            blocks = 1

            [[steps]]
            action = "claim"
            beneficiary = "account-0"
            "#,
        )
        .unwrap();

        let report = run(&scenario, &StakerConfig::default()).unwrap();
        assert_eq!(report.final_block, 3);
        assert_eq!(report.participants[0].reward_balance, 2 * DEFAULT_REWARD_PER_BLOCK);
        assert_eq!(report.reward_budget, 10 * WEI_PER_WIND - 2 * DEFAULT_REWARD_PER_BLOCK);
    }

    #[test]
    fn test_sample_budget_exhaustion() {
        let scenario =
            Scenario::from_toml(include_str!("../scenarios/budget-exhaustion.toml")).unwrap();
        let report = run(&scenario, &StakerConfig::default()).unwrap();

        let rejected: Vec<usize> = report.steps.iter().filter(|s| !s.ok).map(|s| s.index).collect();
        assert_eq!(rejected, vec![2]);
        assert!(report.steps[2].outcome.contains("capacity"));

        let carol = &report.participants[0];
        assert_eq!(carol.reward_balance, 3 * WEI_PER_WIND);
        assert_eq!(report.reward_budget, 9 * WEI_PER_WIND);
        assert_eq!(report.total_staked, 5 * WEI_PER_WIND);
    }

    #[test]
    fn test_sample_divisor_recovery() {
        let scenario =
            Scenario::from_toml(include_str!("../scenarios/divisor-recovery.toml")).unwrap();
        let report = run(&scenario, &StakerConfig::default()).unwrap();

        assert!(report.steps.iter().all(|s| s.ok));
        assert!(report.steps[5].outcome.contains("divisor 1"));
        let bob = report.participants.iter().find(|p| p.name == "bob").unwrap();
        assert_eq!(bob.stored_divisor, Some(6));
    }

    #[test]
    fn test_sample_devchain_report_serializes() {
        let scenario = Scenario::from_toml(include_str!("../scenarios/devchain.toml")).unwrap();
        let report = run(&scenario, &StakerConfig::default()).unwrap();
        assert_eq!(report.participants[0].reward_balance, 90 * WEI_PER_WIND + 4 * DEFAULT_REWARD_PER_BLOCK);

        assert_eq!(report.events[0].name(), "deposited");

        // 18-decimal balances exceed u64; the CLI renders them as plain integers.
        let json = format_json(&report);
        assert!(json.contains(r#""kind": "deposited""#));
        assert!(json.contains(&format!(r#""address": "{}""#, report.participants[0].address)));
        assert!(json.contains(&format!(r#""reward_balance": {}"#, report.participants[0].reward_balance)));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = Scenario::from_toml(
            r#"
            [[steps]]
            action = "teleport"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GaleError::Serialization(_)));
    }
}
