// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! The capability interface the drivers pipette through, and a recording
//! implementation used for simulation and tests.

use serde::{Deserialize, Serialize};

use flexprep_common::types::{DeckSlot, Labware, Location, Target};
use flexprep_units::duration::{Duration, Minute};
use flexprep_units::volume::{Microliter, Volume};

use crate::Result;

/// Everything the execution drivers ask of the hardware.
///
/// The planning layers never see this trait; only the drivers do, so the
/// whole engine can run against a recording implementation without a robot
/// attached.
pub trait Robot {
    fn pick_up_tip(&mut self, tip: Location) -> Result<()>;
    fn drop_tip(&mut self) -> Result<()>;
    fn aspirate(&mut self, volume: Volume<Microliter>, at: Target) -> Result<()>;
    fn dispense(&mut self, volume: Volume<Microliter>, at: Target) -> Result<()>;
    fn mix(&mut self, repeats: u32, volume: Volume<Microliter>, at: Target) -> Result<()>;
    /// Clear residual liquid from the tip, in place when `at` is `None`.
    fn blow_out(&mut self, at: Option<Target>) -> Result<()>;
    fn air_gap(&mut self, volume: Volume<Microliter>) -> Result<()>;
    /// Aspirate and dispense rates in µL/s.
    fn set_flow_rate(&mut self, aspirate: f64, dispense: f64) -> Result<()>;
    fn move_labware(&mut self, labware: Labware, to: DeckSlot) -> Result<()>;
    /// Heater-shaker clamp around the mix plate.
    fn set_latch(&mut self, closed: bool) -> Result<()>;
    fn pause(&mut self, message: &str) -> Result<()>;
    fn comment(&mut self, message: &str) -> Result<()>;
    fn delay(&mut self, duration: Duration<Minute>) -> Result<()>;
}

/// One recorded hardware call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RobotCommand {
    PickUpTip {
        tip: Location,
    },
    DropTip,
    Aspirate {
        volume_ul: f64,
        at: Target,
    },
    Dispense {
        volume_ul: f64,
        at: Target,
    },
    Mix {
        repeats: u32,
        volume_ul: f64,
        at: Target,
    },
    BlowOut {
        at: Option<Target>,
    },
    AirGap {
        volume_ul: f64,
    },
    SetFlowRate {
        aspirate_ul_s: f64,
        dispense_ul_s: f64,
    },
    MoveLabware {
        labware: Labware,
        to: DeckSlot,
    },
    SetLatch {
        closed: bool,
    },
    Pause {
        message: String,
    },
    Comment {
        message: String,
    },
    Delay {
        minutes: f64,
    },
}

/// A `Robot` that records every call instead of moving hardware.
#[derive(Debug, Clone, Default)]
pub struct CommandTrace {
    commands: Vec<RobotCommand>,
}

impl CommandTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RobotCommand] {
        &self.commands
    }

    pub fn pick_ups(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RobotCommand::PickUpTip { .. }))
            .count()
    }

    pub fn tip_drops(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RobotCommand::DropTip))
            .count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.commands)
    }
}

impl Robot for CommandTrace {
    fn pick_up_tip(&mut self, tip: Location) -> Result<()> {
        self.commands.push(RobotCommand::PickUpTip { tip });
        Ok(())
    }

    fn drop_tip(&mut self) -> Result<()> {
        self.commands.push(RobotCommand::DropTip);
        Ok(())
    }

    fn aspirate(&mut self, volume: Volume<Microliter>, at: Target) -> Result<()> {
        self.commands.push(RobotCommand::Aspirate {
            volume_ul: volume.value(),
            at,
        });
        Ok(())
    }

    fn dispense(&mut self, volume: Volume<Microliter>, at: Target) -> Result<()> {
        self.commands.push(RobotCommand::Dispense {
            volume_ul: volume.value(),
            at,
        });
        Ok(())
    }

    fn mix(&mut self, repeats: u32, volume: Volume<Microliter>, at: Target) -> Result<()> {
        self.commands.push(RobotCommand::Mix {
            repeats,
            volume_ul: volume.value(),
            at,
        });
        Ok(())
    }

    fn blow_out(&mut self, at: Option<Target>) -> Result<()> {
        self.commands.push(RobotCommand::BlowOut { at });
        Ok(())
    }

    fn air_gap(&mut self, volume: Volume<Microliter>) -> Result<()> {
        self.commands.push(RobotCommand::AirGap {
            volume_ul: volume.value(),
        });
        Ok(())
    }

    fn set_flow_rate(&mut self, aspirate: f64, dispense: f64) -> Result<()> {
        self.commands.push(RobotCommand::SetFlowRate {
            aspirate_ul_s: aspirate,
            dispense_ul_s: dispense,
        });
        Ok(())
    }

    fn move_labware(&mut self, labware: Labware, to: DeckSlot) -> Result<()> {
        self.commands.push(RobotCommand::MoveLabware { labware, to });
        Ok(())
    }

    fn set_latch(&mut self, closed: bool) -> Result<()> {
        self.commands.push(RobotCommand::SetLatch { closed });
        Ok(())
    }

    fn pause(&mut self, message: &str) -> Result<()> {
        self.commands.push(RobotCommand::Pause {
            message: message.to_string(),
        });
        Ok(())
    }

    fn comment(&mut self, message: &str) -> Result<()> {
        self.commands.push(RobotCommand::Comment {
            message: message.to_string(),
        });
        Ok(())
    }

    fn delay(&mut self, duration: Duration<Minute>) -> Result<()> {
        self.commands.push(RobotCommand::Delay {
            minutes: duration.value(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexprep_common::types::WellId;
    use flexprep_units::volume::microliters;

    #[test]
    fn test_trace_records_in_order() {
        let mut trace = CommandTrace::new();
        let tip = Location::new(Labware::TipRack50, WellId::new(0, 1));
        let well = Location::new(Labware::MixPlate, WellId::new(2, 1));
        trace.pick_up_tip(tip).unwrap();
        trace.aspirate(microliters(10.0), well.into()).unwrap();
        trace.dispense(microliters(10.0), well.bottom(1.0)).unwrap();
        trace.blow_out(None).unwrap();
        trace.drop_tip().unwrap();

        assert_eq!(trace.commands().len(), 5);
        assert_eq!(trace.pick_ups(), 1);
        assert_eq!(trace.tip_drops(), 1);
        assert!(matches!(
            trace.commands()[1],
            RobotCommand::Aspirate { volume_ul, .. } if volume_ul == 10.0
        ));
    }

    #[test]
    fn test_trace_serializes_to_json() {
        let mut trace = CommandTrace::new();
        trace.comment("hello").unwrap();
        trace.set_latch(true).unwrap();
        let json = trace.to_json().unwrap();
        assert!(json.contains("Comment"));
        assert!(json.contains("SetLatch"));

        let parsed: Vec<RobotCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trace.commands());
    }
}
