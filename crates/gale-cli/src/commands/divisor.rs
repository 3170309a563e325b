// crates/gale-cli/src/commands/divisor.rs
//
// `gale divisor --total <n> --stake <n> [--stored <n>]`: evaluate the divisor
// update rule for one observation without running a ledger.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use gale_core::GaleError;
use gale_staking::{fresh_divisor, observe_divisor, DivisorUpdateKind};

use crate::output::{format_json, format_table, OutputFormat};
use crate::scenario::{display_divisor, parse_amount};

/// Arguments for `gale divisor`.
#[derive(Debug, Args)]
pub struct DivisorCmd {
    /// Pool total after the operation ("1.5" tokens or "42 wei").
    #[arg(long)]
    pub total: String,

    /// Participant's stake after the operation.
    #[arg(long)]
    pub stake: String,

    /// Previously stored divisor. Omit for a first observation.
    #[arg(long)]
    pub stored: Option<u128>,
}

/// Evaluated observation.
#[derive(Debug, Serialize)]
struct DivisorReport {
    total: u128,
    stake: u128,
    previous: Option<u128>,
    fresh: Option<u128>,
    divisor: Option<u128>,
    kind: Option<DivisorUpdateKind>,
}

#[derive(Tabled)]
struct DivisorRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn evaluate(cmd: &DivisorCmd) -> Result<DivisorReport, GaleError> {
    let total = parse_amount(&cmd.total)?;
    let stake = parse_amount(&cmd.stake)?;
    if stake > total {
        return Err(GaleError::InvalidAmount(format!(
            "Stake {} exceeds pool total {}",
            stake, total
        )));
    }

    let fresh = fresh_divisor(total, stake);
    // A dormant participant keeps whatever it had stored.
    let update = fresh.map(|f| observe_divisor(cmd.stored, f));

    Ok(DivisorReport {
        total,
        stake,
        previous: cmd.stored,
        fresh,
        divisor: update.map(|u| u.divisor).or(cmd.stored),
        kind: update.map(|u| u.kind),
    })
}

/// Run the divisor command.
pub async fn run(cmd: &DivisorCmd, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let report = evaluate(cmd)?;

    match format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            let rows = vec![
                DivisorRow {
                    field: "Pool total (wei)",
                    value: report.total.to_string(),
                },
                DivisorRow {
                    field: "Stake (wei)",
                    value: report.stake.to_string(),
                },
                DivisorRow {
                    field: "Stored before",
                    value: display_divisor(report.previous),
                },
                DivisorRow {
                    field: "Fresh",
                    value: display_divisor(report.fresh),
                },
                DivisorRow {
                    field: "Stored after",
                    value: display_divisor(report.divisor),
                },
                DivisorRow {
                    field: "Rule",
                    value: report
                        .kind
                        .map(|k| format!("{:?}", k))
                        .unwrap_or_else(|| "unchanged (no stake)".to_string()),
                },
            ];
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(total: &str, stake: &str, stored: Option<u128>) -> DivisorCmd {
        DivisorCmd {
            total: total.to_string(),
            stake: stake.to_string(),
            stored,
        }
    }

    #[test]
    fn test_baseline_and_smoothing() {
        let first = evaluate(&cmd("11 wei", "1 wei", None)).unwrap();
        assert_eq!(first.divisor, Some(11));
        assert_eq!(first.kind, Some(DivisorUpdateKind::Baseline));

        let smoothed = evaluate(&cmd("11 wei", "1 wei", Some(1))).unwrap();
        assert_eq!(smoothed.fresh, Some(11));
        assert_eq!(smoothed.divisor, Some(6));
        assert_eq!(smoothed.kind, Some(DivisorUpdateKind::Smoothed));
    }

    #[test]
    fn test_dormant_keeps_stored() {
        let report = evaluate(&cmd("10 wei", "0 wei", Some(5))).unwrap();
        assert_eq!(report.fresh, None);
        assert_eq!(report.divisor, Some(5));
        assert_eq!(report.kind, None);
    }

    #[test]
    fn test_stake_above_total_rejected() {
        assert!(matches!(
            evaluate(&cmd("1 wei", "2 wei", None)),
            Err(GaleError::InvalidAmount(_))
        ));
    }
}
