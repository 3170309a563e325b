// crates/gale-cli/src/commands/simulate.rs
//
// `gale simulate <scenario.toml>`: run a scripted scenario against an
// in-memory ledger and print each step, the emitted events, and the final
// participant positions.

use clap::Args;
use tabled::Tabled;

use gale_core::LedgerEvent;
use gale_staking::Wind;

use crate::config::GaleConfig;
use crate::output::{format_json, format_table, OutputFormat};
use crate::scenario::{self, display_divisor, Scenario, SimulationReport};

/// Arguments for `gale simulate`.
#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Path to the scenario TOML file.
    pub scenario: String,

    /// Hide the event log in table output.
    #[arg(long)]
    pub quiet_events: bool,
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Block")]
    block: u64,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Result")]
    result: String,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Event")]
    kind: String,
    #[tabled(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Divisor")]
    divisor: String,
}

#[derive(Tabled)]
struct ParticipantRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Staked (wei)")]
    staked: String,
    #[tabled(rename = "Divisor")]
    divisor: String,
    #[tabled(rename = "Rewards")]
    rewards: String,
    #[tabled(rename = "Pending")]
    pending: String,
}

/// Run the simulate command.
pub async fn run(
    cmd: &SimulateCmd,
    config: &GaleConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(&cmd.scenario).await?;
    let scenario = Scenario::from_toml(&text)?;
    let staker_config = config.staker_config()?;

    tracing::info!(
        "Simulating {} ({} steps)",
        scenario.name.as_deref().unwrap_or(&cmd.scenario),
        scenario.steps.len()
    );
    let report = scenario::run(&scenario, &staker_config)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => print_tables(&report, cmd.quiet_events),
    }

    Ok(())
}

fn print_tables(report: &SimulationReport, quiet_events: bool) {
    if let Some(name) = &report.name {
        println!("Scenario: {}", name);
    }
    println!(
        "Final block: {}  |  Total staked: {} wei  |  Reward budget: {}  |  Rate: {} per block",
        report.final_block,
        report.total_staked,
        Wind::from_wei(report.reward_budget),
        Wind::from_wei(report.reward_per_block)
    );
    println!();

    let steps: Vec<StepRow> = report
        .steps
        .iter()
        .map(|s| StepRow {
            index: s.index,
            block: s.block,
            action: s.action.clone(),
            result: if s.ok {
                s.outcome.clone()
            } else {
                format!("REJECTED: {}", s.outcome)
            },
        })
        .collect();
    println!("{}", format_table(&steps));

    if !quiet_events && !report.events.is_empty() {
        println!();
        let events: Vec<EventRow> = report.events.iter().map(event_row).collect();
        println!("{}", format_table(&events));
    }

    if !report.participants.is_empty() {
        println!();
        let participants: Vec<ParticipantRow> = report
            .participants
            .iter()
            .map(|p| ParticipantRow {
                name: p.name.clone(),
                address: p.address.short(),
                state: format!("{:?}", p.state),
                staked: p.staked.to_string(),
                divisor: display_divisor(p.stored_divisor),
                rewards: Wind::from_wei(p.reward_balance).to_string(),
                pending: Wind::from_wei(p.pending_reward).to_string(),
            })
            .collect();
        println!("{}", format_table(&participants));
    }
}

fn event_row(event: &LedgerEvent) -> EventRow {
    let (amount, divisor) = match event {
        LedgerEvent::Deposited {
            amount, divisor, ..
        } => (format!("{} wei", amount), divisor.to_string()),
        LedgerEvent::RewardPaid {
            amount, divisor, ..
        } => (Wind::from_wei(*amount).to_string(), divisor.to_string()),
        LedgerEvent::Withdrawn { amount, .. } => (format!("{} wei", amount), "-".to_string()),
    };
    EventRow {
        kind: event.name().to_string(),
        participant: event.participant().short(),
        amount,
        divisor,
    }
}
