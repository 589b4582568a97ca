//! Estimate-versus-actual aggregation over completed tasks.

use serde::Serialize;

use crate::task::Task;

/// Shown in place of the ratio when there is nothing to compare.
pub const RATIO_PLACEHOLDER: &str = "---";

/// Ratios above this are flagged as underestimates.
pub const OVERRUN_THRESHOLD: f64 = 1.2;

const LABEL_CHARS: usize = 10;

/// One bar pair of the estimate/actual chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardEntry {
  /// Task title, shortened for the chart axis.
  pub label:             String,
  pub estimated_minutes: i32,
  pub actual_minutes:    i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub completed_count:         usize,
  pub total_actual_minutes:    i64,
  pub total_estimated_minutes: i64,
  /// `actual / estimated`; `None` when no task qualifies or nothing was
  /// estimated.
  pub accuracy_ratio:          Option<f64>,
  pub entries:                 Vec<DashboardEntry>,
}

impl Dashboard {
  /// Reduce over tasks that are done and have actual minutes recorded;
  /// everything else is ignored.
  pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
    let entries: Vec<DashboardEntry> = tasks
      .into_iter()
      .filter(|t| t.is_done())
      .filter_map(|t| {
        t.actual_minutes.map(|actual| DashboardEntry {
          label:             short_label(&t.title),
          estimated_minutes: t.estimated_minutes,
          actual_minutes:    actual,
        })
      })
      .collect();

    let total_actual_minutes: i64 =
      entries.iter().map(|e| i64::from(e.actual_minutes)).sum();
    let total_estimated_minutes: i64 =
      entries.iter().map(|e| i64::from(e.estimated_minutes)).sum();

    let accuracy_ratio = (total_estimated_minutes > 0)
      .then(|| total_actual_minutes as f64 / total_estimated_minutes as f64);

    Self {
      completed_count: entries.len(),
      total_actual_minutes,
      total_estimated_minutes,
      accuracy_ratio,
      entries,
    }
  }

  pub fn is_empty(&self) -> bool { self.completed_count == 0 }

  /// The ratio to two decimals, or [`RATIO_PLACEHOLDER`].
  pub fn ratio_label(&self) -> String {
    self
      .accuracy_ratio
      .map_or_else(|| RATIO_PLACEHOLDER.to_string(), |r| format!("{r:.2}"))
  }

  pub fn is_overrun(&self) -> bool {
    self.accuracy_ratio.is_some_and(|r| r > OVERRUN_THRESHOLD)
  }
}

fn short_label(title: &str) -> String {
  if title.chars().count() > LABEL_CHARS {
    let head: String = title.chars().take(LABEL_CHARS).collect();
    format!("{head}...")
  } else {
    title.to_string()
  }
}
