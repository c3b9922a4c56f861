//! Decision tables
//!
//! Renders an [`ApplicationDecision`] next to the discounts it was made from,
//! one row per discount.

use std::io;

use smallvec::SmallVec;
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    discounts::{DiscountId, DiscountInfo},
    lookup::DiscountInfoLookup,
    resolver::{ApplicationDecision, RejectionReason},
};

/// Errors that can occur when writing a decision table.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the output failed.
    #[error("failed to write decision table: {0}")]
    Io(#[from] io::Error),
}

/// What happened to a discount in a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// The candidate was accepted.
    Accepted,

    /// The candidate was rejected.
    Rejected,

    /// An applied discount that stays on the cart.
    Kept,

    /// An applied discount evicted by the candidate.
    Removed,

    /// The applied discount that blocked the candidate.
    Blocking,

    /// An applied discount that no longer exists.
    Missing,
}

impl RowStatus {
    fn label(self) -> &'static str {
        match self {
            RowStatus::Accepted => "accepted",
            RowStatus::Rejected => "rejected",
            RowStatus::Kept => "kept",
            RowStatus::Removed => "removed",
            RowStatus::Blocking => "blocking",
            RowStatus::Missing => "missing",
        }
    }

    fn color(self) -> Option<Color> {
        match self {
            RowStatus::Accepted | RowStatus::Kept => Some(Color::FG_GREEN),
            RowStatus::Rejected | RowStatus::Blocking => Some(Color::FG_RED),
            RowStatus::Removed => Some(Color::FG_YELLOW),
            RowStatus::Missing => None,
        }
    }
}

/// One discount in a decision report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    discount: DiscountId,
    name: Option<String>,
    info: Option<DiscountInfo>,
    status: RowStatus,
}

impl ReportRow {
    /// The discount this row describes.
    pub fn discount(&self) -> DiscountId {
        self.discount
    }

    /// The row's status.
    pub fn status(&self) -> RowStatus {
        self.status
    }
}

/// A decision together with the candidate and cart it was made for.
#[derive(Debug, Clone)]
pub struct DecisionReport<'a> {
    decision: &'a ApplicationDecision,
    rows: SmallVec<[ReportRow; 8]>,
}

impl<'a> DecisionReport<'a> {
    /// Build a report for `decision`, made for `candidate` against `existing`.
    pub fn new<L>(
        candidate: DiscountId,
        existing: &[DiscountId],
        decision: &'a ApplicationDecision,
        discounts: &L,
    ) -> Self
    where
        L: DiscountInfoLookup + ?Sized,
    {
        let blocking = decision.rejection_reason().and_then(RejectionReason::conflicting);

        let candidate_status = if decision.can_apply() {
            RowStatus::Accepted
        } else {
            RowStatus::Rejected
        };

        let mut rows = SmallVec::with_capacity(existing.len() + 1);

        rows.push(ReportRow {
            discount: candidate,
            name: None,
            info: discounts.get(candidate),
            status: candidate_status,
        });

        for &discount in existing {
            let info = discounts.get(discount);

            let status = if info.is_none() {
                RowStatus::Missing
            } else if blocking == Some(discount) {
                RowStatus::Blocking
            } else if decision.removes(discount) {
                RowStatus::Removed
            } else {
                RowStatus::Kept
            };

            rows.push(ReportRow {
                discount,
                name: None,
                info,
                status,
            });
        }

        Self { decision, rows }
    }

    /// Label discounts with display names.
    #[must_use]
    pub fn with_names<'n, F>(mut self, names: F) -> Self
    where
        F: Fn(DiscountId) -> Option<&'n str>,
    {
        for row in &mut self.rows {
            row.name = names(row.discount).map(str::to_string);
        }

        self
    }

    /// Rows in display order: the candidate first, then the cart's discounts
    /// as supplied.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Build the table.
    pub fn table(&self) -> Table {
        let mut builder = Builder::default();

        builder.push_record(["#", "Discount", "Type", "Priority", "Created", "Status"]);

        for row in &self.rows {
            builder.push_record(self.record(row));
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        for (index, row) in self.rows.iter().enumerate() {
            if let Some(color) = row.status.color() {
                table.modify((index + 1, 5), color);
            }
        }

        table
    }

    /// Write the table followed by a one-line summary.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), RenderError> {
        writeln!(out, "\n{}", self.table())?;
        writeln!(out, " {}\n", self.summary())?;

        Ok(())
    }

    /// Describe the outcome in a sentence.
    pub fn summary(&self) -> String {
        match self.decision.rejection_reason() {
            None => {
                let apply = join_ids(self.decision.discounts_to_apply());

                if self.decision.discounts_to_remove().is_empty() {
                    format!("Apply: {apply}")
                } else {
                    let remove = join_ids(self.decision.discounts_to_remove());

                    format!("Apply: {apply} (removing {remove})")
                }
            }
            Some(RejectionReason::NotFound) => "Rejected: discount not found".to_string(),
            Some(RejectionReason::HigherPriorityConflict { conflicting }) => {
                format!("Rejected: {conflicting} has higher priority")
            }
            Some(RejectionReason::EqualPriorityConflict { conflicting }) => {
                format!("Rejected: {conflicting} has equal priority and is already applied")
            }
        }
    }

    fn record(&self, row: &ReportRow) -> [String; 6] {
        let position = self
            .decision
            .can_apply()
            .then(|| {
                self.decision
                    .discounts_to_apply()
                    .iter()
                    .position(|&applied| applied == row.discount)
            })
            .flatten()
            .map_or_else(String::new, |position| (position + 1).to_string());

        let discount = match &row.name {
            Some(name) => format!("{name} ({})", row.discount),
            None => row.discount.to_string(),
        };

        let (kind, priority, created) = row.info.map_or_else(
            || (String::new(), String::new(), String::new()),
            |info| {
                (
                    info.kind().to_string(),
                    info.priority().to_string(),
                    info.created_at().to_string(),
                )
            },
        );

        [
            position,
            discount,
            kind,
            priority,
            created,
            row.status.label().to_string(),
        ]
    }
}

fn join_ids(ids: &[DiscountId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
