// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Consumable-tip bookkeeping: per-class queues, the mid-run rack swap for
//! the 50 µL class, and the usage counters reported at end of run.

use std::collections::VecDeque;

use flexprep_common::tip_traits::TipClass;
use flexprep_common::types::{DeckSlot, Labware, Location, WellId};

use crate::robot::Robot;
use crate::{Error, Result};

/// Slot the active rack sits in while tips are being picked.
pub const OPERATING_SLOT: DeckSlot = DeckSlot::B1;
/// Staging slot an exhausted rack is parked in during a swap.
pub const HOLDING_SLOT: DeckSlot = DeckSlot::C4;

/// Tip consumption for one capacity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipUsage {
    pub class: TipClass,
    pub picked: u32,
    pub dropped: u32,
    pub swaps: u32,
}

#[derive(Debug)]
struct TipSupply {
    class: TipClass,
    rack: Labware,
    reserve: Option<Labware>,
    queue: VecDeque<WellId>,
    picked: u32,
    dropped: u32,
    swaps: u32,
}

impl TipSupply {
    fn new(
        class: TipClass,
        rack: Labware,
        reserve: Option<Labware>,
        starting_tip: WellId,
    ) -> Result<Self> {
        let traits = class.traits();
        let all: Vec<WellId> = WellId::row_major(traits.rack_rows, traits.rack_columns).collect();
        let start = all
            .iter()
            .position(|w| *w == starting_tip)
            .ok_or(Error::StartingTipNotFound {
                class,
                well: starting_tip,
            })?;
        Ok(TipSupply {
            class,
            rack,
            reserve,
            queue: all[start..].iter().copied().collect(),
            picked: 0,
            dropped: 0,
            swaps: 0,
        })
    }

    fn refill(&mut self) {
        let traits = self.class.traits();
        self.queue = WellId::row_major(traits.rack_rows, traits.rack_columns).collect();
    }
}

/// Tracks the tip queues of a run. All pickups and drops go through here so
/// the per-class counters stay balanced.
#[derive(Debug)]
pub struct TipTracker {
    supplies: Vec<TipSupply>,
}

impl TipTracker {
    /// Racks of the mix-construction protocol: a 50 µL rack with a reserve,
    /// and a 200 µL rack without one.
    pub fn for_mix_run(starting_tip_50: WellId, starting_tip_200: WellId) -> Result<Self> {
        Ok(TipTracker {
            supplies: vec![
                TipSupply::new(
                    TipClass::Ul50,
                    Labware::TipRack50,
                    Some(Labware::TipRack50Reserve),
                    starting_tip_50,
                )?,
                TipSupply::new(TipClass::Ul200, Labware::TipRack200, None, starting_tip_200)?,
            ],
        })
    }

    /// Racks of the aliquoting protocol: 200 µL and 1000 µL, no reserves.
    pub fn for_aliquot_run(starting_tip_200: WellId, starting_tip_1000: WellId) -> Result<Self> {
        Ok(TipTracker {
            supplies: vec![
                TipSupply::new(TipClass::Ul200, Labware::TipRack200, None, starting_tip_200)?,
                TipSupply::new(
                    TipClass::Ul1000,
                    Labware::TipRack1000,
                    None,
                    starting_tip_1000,
                )?,
            ],
        })
    }

    fn supply_mut(&mut self, class: TipClass) -> Result<&mut TipSupply> {
        self.supplies
            .iter_mut()
            .find(|s| s.class == class)
            .ok_or_else(|| Error::new(&format!("no {class} tip rack on the deck")))
    }

    /// Pick up the next tip of the class, swapping in the reserve rack
    /// first when the active one is exhausted.
    ///
    /// A pickup refused by the hardware pauses the run with an operator
    /// message before the fault is propagated.
    pub fn acquire(&mut self, robot: &mut dyn Robot, class: TipClass) -> Result<Location> {
        let supply = self.supply_mut(class)?;
        let tip = match supply.queue.pop_front() {
            Some(well) => Location::new(supply.rack, well),
            None => {
                let Some(reserve) = supply.reserve.take() else {
                    return Err(Error::TipsExhausted { class });
                };
                flexprep_log::info!("{} tip rack exhausted, swapping in the reserve", class);
                robot.comment(&format!("====== SWAPPING {class} TIP RACK ======"))?;
                robot.move_labware(supply.rack, HOLDING_SLOT)?;
                robot.move_labware(reserve, OPERATING_SLOT)?;
                supply.rack = reserve;
                supply.swaps += 1;
                supply.refill();
                let well = supply.queue.pop_front().expect("rack was just refilled");
                Location::new(supply.rack, well)
            }
        };
        if let Err(fault) = robot.pick_up_tip(tip) {
            robot.pause("Tip pickup failed.")?;
            return Err(fault);
        }
        supply.picked += 1;
        Ok(tip)
    }

    /// Drop the tip currently held for this class.
    pub fn release(&mut self, robot: &mut dyn Robot, class: TipClass) -> Result<()> {
        robot.drop_tip()?;
        self.supply_mut(class)?.dropped += 1;
        Ok(())
    }

    pub fn usage(&self) -> Vec<TipUsage> {
        self.supplies
            .iter()
            .map(|s| TipUsage {
                class: s.class,
                picked: s.picked,
                dropped: s.dropped,
                swaps: s.swaps,
            })
            .collect()
    }

    /// Operator bookkeeping printed at end of run.
    pub fn report(&self, robot: &mut dyn Robot) -> Result<()> {
        for usage in self.usage() {
            robot.comment(&format!("Tips used ({}): {}", usage.class, usage.picked))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{CommandTrace, RobotCommand};

    fn well(name: &str) -> WellId {
        name.parse().unwrap()
    }

    #[test]
    fn test_tips_come_out_in_row_major_order_from_offset() {
        let mut tracker = TipTracker::for_mix_run(well("A3"), well("A1")).unwrap();
        let mut trace = CommandTrace::new();
        let first = tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
        let second = tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
        assert_eq!(first.well, well("A3"));
        assert_eq!(second.well, well("A4"));
        assert_eq!(first.labware, Labware::TipRack50);
    }

    #[test]
    fn test_unknown_starting_tip_is_rejected() {
        let err = TipTracker::for_mix_run(well("J1"), well("A1")).unwrap_err();
        match err {
            Error::StartingTipNotFound { class, well: w } => {
                assert_eq!(class, TipClass::Ul50);
                assert_eq!(w, well("J1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pickups_balance_drops() {
        let mut tracker = TipTracker::for_mix_run(well("A1"), well("A1")).unwrap();
        let mut trace = CommandTrace::new();
        for _ in 0..3 {
            tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
            tracker.release(&mut trace, TipClass::Ul50).unwrap();
        }
        tracker.acquire(&mut trace, TipClass::Ul200).unwrap();
        tracker.release(&mut trace, TipClass::Ul200).unwrap();

        assert_eq!(trace.pick_ups(), trace.tip_drops());
        let usage = tracker.usage();
        assert_eq!(usage[0].picked, 3);
        assert_eq!(usage[0].dropped, 3);
        assert_eq!(usage[1].picked, 1);
    }

    #[test]
    fn test_exhausted_50_rack_swaps_exactly_once() {
        // Start at the last tip so the second pickup hits an empty queue.
        let mut tracker = TipTracker::for_mix_run(well("H12"), well("A1")).unwrap();
        let mut trace = CommandTrace::new();
        tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
        let swapped = tracker.acquire(&mut trace, TipClass::Ul50).unwrap();

        // The reserve rack moved to the operating slot and now feeds tips
        // from its first well.
        assert_eq!(swapped.labware, Labware::TipRack50Reserve);
        assert_eq!(swapped.well, well("A1"));
        let moves: Vec<&RobotCommand> = trace
            .commands()
            .iter()
            .filter(|c| matches!(c, RobotCommand::MoveLabware { .. }))
            .collect();
        assert_eq!(moves.len(), 2);
        assert_eq!(
            *moves[0],
            RobotCommand::MoveLabware {
                labware: Labware::TipRack50,
                to: HOLDING_SLOT
            }
        );
        assert_eq!(
            *moves[1],
            RobotCommand::MoveLabware {
                labware: Labware::TipRack50Reserve,
                to: OPERATING_SLOT
            }
        );
        assert_eq!(tracker.usage()[0].swaps, 1);
    }

    #[test]
    fn test_no_second_swap_after_reserve_is_used() {
        let mut tracker = TipTracker::for_mix_run(well("H12"), well("A1")).unwrap();
        let mut trace = CommandTrace::new();
        tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
        // Swap happens here and hands out all 96 reserve tips.
        for _ in 0..96 {
            tracker.acquire(&mut trace, TipClass::Ul50).unwrap();
        }
        let err = tracker.acquire(&mut trace, TipClass::Ul50).unwrap_err();
        assert!(matches!(err, Error::TipsExhausted { class: TipClass::Ul50 }));
    }

    #[test]
    fn test_refused_pickup_pauses_then_propagates() {
        use flexprep_common::types::Target;
        use flexprep_units::duration::{Duration, Minute};
        use flexprep_units::volume::{Microliter, Volume};

        struct FailingRobot {
            pauses: Vec<String>,
        }

        impl Robot for FailingRobot {
            fn pick_up_tip(&mut self, _tip: Location) -> crate::Result<()> {
                Err(Error::Hardware("gripper jam".to_string()))
            }
            fn drop_tip(&mut self) -> crate::Result<()> {
                Ok(())
            }
            fn aspirate(&mut self, _v: Volume<Microliter>, _at: Target) -> crate::Result<()> {
                Ok(())
            }
            fn dispense(&mut self, _v: Volume<Microliter>, _at: Target) -> crate::Result<()> {
                Ok(())
            }
            fn mix(&mut self, _r: u32, _v: Volume<Microliter>, _at: Target) -> crate::Result<()> {
                Ok(())
            }
            fn blow_out(&mut self, _at: Option<Target>) -> crate::Result<()> {
                Ok(())
            }
            fn air_gap(&mut self, _v: Volume<Microliter>) -> crate::Result<()> {
                Ok(())
            }
            fn set_flow_rate(&mut self, _a: f64, _d: f64) -> crate::Result<()> {
                Ok(())
            }
            fn move_labware(&mut self, _l: Labware, _to: DeckSlot) -> crate::Result<()> {
                Ok(())
            }
            fn set_latch(&mut self, _closed: bool) -> crate::Result<()> {
                Ok(())
            }
            fn pause(&mut self, message: &str) -> crate::Result<()> {
                self.pauses.push(message.to_string());
                Ok(())
            }
            fn comment(&mut self, _message: &str) -> crate::Result<()> {
                Ok(())
            }
            fn delay(&mut self, _duration: Duration<Minute>) -> crate::Result<()> {
                Ok(())
            }
        }

        let mut tracker = TipTracker::for_mix_run(well("A1"), well("A1")).unwrap();
        let mut robot = FailingRobot { pauses: Vec::new() };
        let err = tracker.acquire(&mut robot, TipClass::Ul50).unwrap_err();
        assert!(matches!(err, Error::Hardware(_)));
        assert_eq!(robot.pauses, vec!["Tip pickup failed.".to_string()]);
        // The failed pickup is not counted as a consumed tip.
        assert_eq!(tracker.usage()[0].picked, 0);
    }

    #[test]
    fn test_200_class_has_no_reserve() {
        let mut tracker = TipTracker::for_mix_run(well("A1"), well("H12")).unwrap();
        let mut trace = CommandTrace::new();
        tracker.acquire(&mut trace, TipClass::Ul200).unwrap();
        let err = tracker.acquire(&mut trace, TipClass::Ul200).unwrap_err();
        assert!(matches!(err, Error::TipsExhausted { class: TipClass::Ul200 }));
    }
}
