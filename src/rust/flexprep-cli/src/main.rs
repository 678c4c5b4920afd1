// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use flexprep_common::types::{Height, Target, WellId};
use flexprep_executor::{
    CommandTrace, RobotCommand, TipTracker, run_aliquot_protocol, run_mix_protocol,
};
use flexprep_layout::{LayoutTable, parse_layout};
use flexprep_planner::{
    AliquotSettings, MixSettings, SanitizationChange, TubeRackKind, plan_mix_run,
};
use flexprep_units::duration::minutes;
use flexprep_units::volume::microliters;

#[derive(Parser)]
#[command(
    name = "flexprep",
    about = "Plan and simulate the FlexPrep liquid-handling protocols"
)]
struct Cli {
    /// Print the recorded command trace as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Enable diagnostics logging.
    #[arg(long)]
    diagnostics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build DNA transfection mixes from a CSV plate layout.
    DnaMix {
        /// CSV file describing the plate layout.
        csv: PathBuf,
        /// Number of mixes to build from the layout.
        #[arg(long, default_value_t = 3)]
        mixes: usize,
        /// Component slots read per mix block, NaCl included.
        #[arg(long, default_value_t = 6)]
        max_components: usize,
        #[arg(long, default_value = "A1")]
        starting_tip_50: WellId,
        #[arg(long, default_value = "A1")]
        starting_tip_200: WellId,
        /// Skip the per-source premix cycles.
        #[arg(long)]
        no_premix: bool,
        #[arg(long, default_value_t = 12)]
        batch_size: usize,
        /// Tube rack capacity: "2ml" or "1.5ml".
        #[arg(long, default_value = "1.5ml")]
        tube_rack: String,
    },
    /// Aliquot a premixed transfection reagent into mix wells and cells.
    Aliquot {
        #[arg(long, default_value_t = 12)]
        mixes: usize,
        /// Reagent volume per mix well, in µL.
        #[arg(long, default_value_t = 88.0)]
        reagent_volume: f64,
        /// Volume per cell well, in µL.
        #[arg(long, default_value_t = 20.0)]
        aliquot_volume: f64,
        #[arg(long, default_value = "D6")]
        reagent_well: WellId,
        #[arg(long, default_value = "C1")]
        mix_position: WellId,
        #[arg(long, default_value_t = 2)]
        mix_rows: u8,
        #[arg(long, default_value_t = 6)]
        mix_columns: u8,
        /// Incubation before aliquoting, in minutes.
        #[arg(long, default_value_t = 15.0)]
        delay_minutes: f64,
        #[arg(long, default_value = "A1")]
        starting_tip_200: WellId,
        #[arg(long, default_value = "A1")]
        starting_tip_1000: WellId,
        /// Premix the reagent before each draw.
        #[arg(long)]
        premix: bool,
        #[arg(long, default_value_t = 2.0)]
        premix_volume: f64,
        /// Tube rack capacity: "2ml" or "1.5ml".
        #[arg(long, default_value = "2ml")]
        tube_rack: String,
    },
}

fn tube_rack_kind(value: &str) -> anyhow::Result<TubeRackKind> {
    match value {
        "2ml" => Ok(TubeRackKind::Snapcap2Ml),
        "1.5ml" => Ok(TubeRackKind::Snapcap1_5Ml),
        other => bail!("unknown tube rack {other:?}, expected \"2ml\" or \"1.5ml\""),
    }
}

fn report_changes(changes: &[SanitizationChange]) {
    for change in changes {
        eprintln!(
            "note: {} adjusted from {} to {}: {}",
            change.field, change.original, change.sanitized, change.reason
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    flexprep_log::init_logging(cli.diagnostics);

    let mut trace = CommandTrace::new();
    match cli.command {
        Command::DnaMix {
            csv,
            mixes,
            max_components,
            starting_tip_50,
            starting_tip_200,
            no_premix,
            batch_size,
            tube_rack,
        } => {
            let mut settings = MixSettings {
                mix_count: mixes,
                max_components,
                starting_tip_50,
                starting_tip_200,
                tube_rack: tube_rack_kind(&tube_rack)?,
                premix: !no_premix,
                batch_size,
            };
            report_changes(&settings.sanitize());

            let table = LayoutTable::from_csv_path(&csv)
                .with_context(|| format!("reading layout table {}", csv.display()))?;
            let layout = parse_layout(&table, settings.mix_count, settings.max_components)?;
            let plan = plan_mix_run(&layout.mixes)?;
            let mut tips =
                TipTracker::for_mix_run(settings.starting_tip_50, settings.starting_tip_200)?;
            run_mix_protocol(&mut trace, &mut tips, &layout, &plan, &settings)?;
        }
        Command::Aliquot {
            mixes,
            reagent_volume,
            aliquot_volume,
            reagent_well,
            mix_position,
            mix_rows,
            mix_columns,
            delay_minutes,
            starting_tip_200,
            starting_tip_1000,
            premix,
            premix_volume,
            tube_rack,
        } => {
            let mut settings = AliquotSettings {
                mix_count: mixes,
                reagent_volume: microliters(reagent_volume),
                aliquot_volume: microliters(aliquot_volume),
                reagent_well,
                mix_position,
                mix_rows,
                mix_columns,
                delay: minutes(delay_minutes),
                starting_tip_200,
                starting_tip_1000,
                tube_rack: tube_rack_kind(&tube_rack)?,
                premix,
                premix_volume: microliters(premix_volume),
            };
            report_changes(&settings.sanitize());

            let mut tips = TipTracker::for_aliquot_run(
                settings.starting_tip_200,
                settings.starting_tip_1000,
            )?;
            run_aliquot_protocol(&mut trace, &mut tips, &settings)?;
        }
    }

    if cli.json {
        println!("{}", trace.to_json()?);
    } else {
        for command in trace.commands() {
            println!("{}", describe(command));
        }
    }
    Ok(())
}

fn describe_target(at: &Target) -> String {
    match at.height {
        Height::Default => format!("{}", at.location),
        Height::Bottom(mm) => format!("{} ({mm} mm above bottom)", at.location),
        Height::Top(mm) => format!("{} ({mm} mm from top)", at.location),
    }
}

fn describe(command: &RobotCommand) -> String {
    match command {
        RobotCommand::PickUpTip { tip } => format!("pick up tip {tip}"),
        RobotCommand::DropTip => "drop tip".to_string(),
        RobotCommand::Aspirate { volume_ul, at } => {
            format!("aspirate {volume_ul} µL from {}", describe_target(at))
        }
        RobotCommand::Dispense { volume_ul, at } => {
            format!("dispense {volume_ul} µL into {}", describe_target(at))
        }
        RobotCommand::Mix {
            repeats,
            volume_ul,
            at,
        } => format!(
            "mix {repeats}x{volume_ul} µL at {}",
            describe_target(at)
        ),
        RobotCommand::BlowOut { at: Some(at) } => {
            format!("blow out at {}", describe_target(at))
        }
        RobotCommand::BlowOut { at: None } => "blow out".to_string(),
        RobotCommand::AirGap { volume_ul } => format!("air gap {volume_ul} µL"),
        RobotCommand::SetFlowRate {
            aspirate_ul_s,
            dispense_ul_s,
        } => format!("flow rate {aspirate_ul_s}/{dispense_ul_s} µL/s"),
        RobotCommand::MoveLabware { labware, to } => {
            format!("move the {labware} to slot {to}")
        }
        RobotCommand::SetLatch { closed: true } => "close the plate latch".to_string(),
        RobotCommand::SetLatch { closed: false } => "open the plate latch".to_string(),
        RobotCommand::Pause { message } => format!("PAUSE: {message}"),
        RobotCommand::Comment { message } => format!("# {message}"),
        RobotCommand::Delay { minutes } => format!("delay {minutes} min"),
    }
}
