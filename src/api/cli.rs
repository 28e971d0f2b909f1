use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;

use super::{SimulatePayload, api_request_from_payload, build_simulate_response};
use crate::core::{ActualsByMonth, DEFAULT_DURATION_MONTHS, SimulationInput};

#[derive(Parser, Debug)]
#[command(
    name = "brokerage-sim",
    about = "Month-by-month cash-flow viability simulator for a real-estate brokerage"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON simulation API
    Serve(ServeArgs),
    /// Run one simulation and print the result as JSON
    Simulate(SimulateArgs),
    /// Print the default input set as JSON
    Defaults,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(
        long,
        help = "JSON file with simulation inputs; missing fields use the defaults"
    )]
    pub inputs: Option<PathBuf>,
    #[arg(long, help = "JSON file mapping month number to recorded actuals")]
    pub actuals: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_DURATION_MONTHS)]
    pub months: u32,
    #[arg(
        long,
        help = "Reference date (YYYY-MM-DD) deciding which months are past; defaults to today"
    )]
    pub today: Option<NaiveDate>,
    #[arg(long, help = "Print single-line JSON")]
    pub compact: bool,
}

pub fn run_simulate_command(args: &SimulateArgs) -> Result<String> {
    let inputs = args
        .inputs
        .as_deref()
        .map(read_json::<serde_json::Value>)
        .transpose()?;
    let actuals = args
        .actuals
        .as_deref()
        .map(read_json::<ActualsByMonth>)
        .transpose()?
        .unwrap_or_default();

    let payload = SimulatePayload {
        inputs,
        duration_months: Some(i64::from(args.months)),
        actuals,
        today: args.today,
    };
    let request = api_request_from_payload(payload, Local::now().date_naive())?;
    info!(
        months = request.duration_months,
        recorded_months = request.actuals.len(),
        "running simulation"
    );
    let response = build_simulate_response(request);

    let json = if args.compact {
        serde_json::to_string(&response)
    } else {
        serde_json::to_string_pretty(&response)
    };
    json.context("failed to serialize simulation result")
}

pub fn defaults_json() -> Result<String> {
    serde_json::to_string_pretty(&SimulationInput::default())
        .context("failed to serialize default inputs")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}
