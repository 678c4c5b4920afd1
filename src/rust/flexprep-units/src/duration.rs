// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Result as FormatterResult;
use std::fmt::{Display, Formatter};

crate::quantity!(Duration);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Second;

impl Display for Second {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatterResult {
        write!(f, "s")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Minute;

impl Display for Minute {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatterResult {
        write!(f, "min")
    }
}

pub const fn seconds<T>(value: T) -> Duration<Second, T> {
    Duration {
        value,
        unit: Second,
    }
}

pub const fn minutes<T>(value: T) -> Duration<Minute, T> {
    Duration {
        value,
        unit: Minute,
    }
}

pub fn minutes_to_seconds(duration: Duration<Minute>) -> Duration<Second> {
    seconds(duration.value() * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let duration: Duration<Minute> = 15.0.into();
        assert_eq!(duration.value(), 15.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", minutes(15.0)), "15.0 min");
        assert_eq!(format!("{}", seconds(90.0)), "90.0 s");
    }

    #[test]
    fn test_conversion() {
        assert_eq!(minutes_to_seconds(minutes(15.0)), seconds(900.0));
        assert_eq!(minutes_to_seconds(minutes(0.5)), seconds(30.0));
    }
}
