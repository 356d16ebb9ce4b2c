//! End-of-cycle summary.

use super::day_state::CYCLE_LENGTH_DAYS;
use crate::model::habit::LogEntry;
use serde::{Serialize, Serializer};

/// Canned feedback picked from the completed-day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight {
    /// 6 or more completed days.
    Consistent,
    /// 4 or 5 completed days.
    Momentum,
    /// 3 or fewer completed days.
    Blocked,
}

impl Insight {
    pub fn for_completed_days(completed_days: u32) -> Self {
        match completed_days {
            6.. => Self::Consistent,
            4..=5 => Self::Momentum,
            _ => Self::Blocked,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Consistent => "You proved consistency is possible with small steps.",
            Self::Momentum => "You're building momentum, but watch out for the weekend slip-ups.",
            Self::Blocked => {
                "Your environment seems to be the biggest blocker. Try an even smaller habit."
            }
        }
    }
}

impl Serialize for Insight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Completion summary for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Always `CYCLE_LENGTH_DAYS`, independent of how many logs exist.
    pub total_days: u32,
    pub completed_days: u32,
    pub insight: Insight,
    pub logs: Vec<LogEntry>,
}

/// Builds the summary for a log list.
pub fn summarize(logs: &[LogEntry]) -> Summary {
    let completed = logs.iter().filter(|log| log.completed).count();
    let completed_days = u32::try_from(completed).unwrap_or(u32::MAX);
    Summary {
        total_days: CYCLE_LENGTH_DAYS,
        completed_days,
        insight: Insight::for_completed_days(completed_days),
        logs: logs.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::Insight;

    #[test]
    fn insight_thresholds() {
        let expected = [
            (0, Insight::Blocked),
            (3, Insight::Blocked),
            (4, Insight::Momentum),
            (5, Insight::Momentum),
            (6, Insight::Consistent),
            (7, Insight::Consistent),
            (12, Insight::Consistent),
        ];
        for (count, insight) in expected {
            assert_eq!(Insight::for_completed_days(count), insight, "count={count}");
        }
    }

    #[test]
    fn insight_serializes_as_message() {
        let json = serde_json::to_string(&Insight::Momentum).unwrap();
        assert_eq!(
            json,
            "\"You're building momentum, but watch out for the weekend slip-ups.\""
        );
    }
}
