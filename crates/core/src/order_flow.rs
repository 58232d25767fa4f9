//! Surgical order lifecycle and wizard validation.
//!
//! An order is created as a draft and filled in over five wizard steps, with
//! every save persisted immediately so the doctor can leave and resume later
//! ("pedido em andamento"). Submission requires all five steps to pass their
//! presence checks; after that the order moves through the authorization
//! lifecycle driven by the health insurer's answer.
//!
//! ```text
//! InProgress ──► AwaitingSubmission ──► Submitted ──► Authorized ──► Completed
//!                                          │              ▲
//!                                          ▼              │
//!                                        Denied ──► UnderAppeal
//!                                                       │
//!                                                       ▼
//!                                                     Denied
//! ```
//!
//! `Cancelled` is reachable from every non-terminal state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of OPME suppliers quoted on one order.
///
/// Insurers require up to three quotations; the form never collects more.
pub const MAX_SUPPLIERS: usize = 3;

/// Lifecycle status of a surgical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Draft being filled through the wizard ("em preenchimento").
    InProgress,
    /// All steps complete, waiting for the doctor to submit.
    AwaitingSubmission,
    /// Sent to the health insurer.
    Submitted,
    /// Authorized by the insurer.
    Authorized,
    /// Denied by the insurer; an appeal may be opened.
    Denied,
    /// Denial under appeal.
    UnderAppeal,
    /// Procedure performed; terminal.
    Completed,
    /// Abandoned or withdrawn; terminal.
    Cancelled,
}

impl OrderStatus {
    /// Database string form (TEXT column on `medical_orders.status`).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in_progress",
            OrderStatus::AwaitingSubmission => "awaiting_submission",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Authorized => "authorized",
            OrderStatus::Denied => "denied",
            OrderStatus::UnderAppeal => "under_appeal",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the database string form.
    pub fn from_db_str(value: &str) -> Option<Self> {
        Some(match value {
            "in_progress" => OrderStatus::InProgress,
            "awaiting_submission" => OrderStatus::AwaitingSubmission,
            "submitted" => OrderStatus::Submitted,
            "authorized" => OrderStatus::Authorized,
            "denied" => OrderStatus::Denied,
            "under_appeal" => OrderStatus::UnderAppeal,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => return None,
        })
    }

    /// True while the wizard may still modify the draft fields.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            OrderStatus::InProgress | OrderStatus::AwaitingSubmission
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the lifecycle permits moving from `self` to `to`.
    pub fn can_transition(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        if to == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (InProgress, AwaitingSubmission)
                | (AwaitingSubmission, InProgress)
                | (AwaitingSubmission, Submitted)
                | (Submitted, Authorized)
                | (Submitted, Denied)
                | (Denied, UnderAppeal)
                | (UnderAppeal, Authorized)
                | (UnderAppeal, Denied)
                | (Authorized, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// The five screens of the order creation wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Patient,
    Hospital,
    Procedures,
    OpmeMaterials,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Patient,
        WizardStep::Hospital,
        WizardStep::Procedures,
        WizardStep::OpmeMaterials,
        WizardStep::Review,
    ];

    /// 1-based step number as shown in the UI and stored on the order row.
    pub fn number(&self) -> i16 {
        match self {
            WizardStep::Patient => 1,
            WizardStep::Hospital => 2,
            WizardStep::Procedures => 3,
            WizardStep::OpmeMaterials => 4,
            WizardStep::Review => 5,
        }
    }

    pub fn from_number(n: i16) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == n)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

/// Accumulated wizard form fields of one order.
///
/// Every field is optional: the draft row is created on step 1 and mutated in
/// place on each save. [`WizardStep`] presence checks decide when the draft
/// may advance, nothing else is enforced here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub patient_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub clinical_indication: Option<String>,
    pub cid_code_ids: Vec<Uuid>,
    pub procedure_id: Option<Uuid>,
    pub secondary_procedure_ids: Vec<Uuid>,
    pub opme_item_ids: Vec<Uuid>,
    pub opme_item_quantities: Vec<i32>,
    pub supplier_ids: Vec<Uuid>,
    pub additional_notes: Option<String>,
}

impl OrderDraft {
    /// Returns the field names whose presence checks fail for `step`.
    ///
    /// An empty result means the step is complete. Field names use the wire
    /// (camelCase) form so they can be surfaced directly to the form.
    pub fn missing_fields(&self, step: WizardStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            WizardStep::Patient => {
                if self.patient_id.is_none() {
                    missing.push("patientId");
                }
            }
            WizardStep::Hospital => {
                if self.hospital_id.is_none() {
                    missing.push("hospitalId");
                }
                if !has_text(&self.clinical_indication) {
                    missing.push("clinicalIndication");
                }
                if self.cid_code_ids.is_empty() {
                    missing.push("cidCodeIds");
                }
            }
            WizardStep::Procedures => {
                if self.procedure_id.is_none() {
                    missing.push("procedureId");
                }
            }
            WizardStep::OpmeMaterials => {
                if self.opme_item_ids.is_empty() {
                    missing.push("opmeItemIds");
                }
                if self.opme_item_quantities.len() != self.opme_item_ids.len()
                    || self.opme_item_quantities.iter().any(|q| *q <= 0)
                {
                    missing.push("opmeItemQuantities");
                }
                if self.supplier_ids.is_empty() || self.supplier_ids.len() > MAX_SUPPLIERS {
                    missing.push("supplierIds");
                }
            }
            // The review step only replays the earlier checks.
            WizardStep::Review => {}
        }
        missing
    }

    /// Validates every step up to and including `step`.
    ///
    /// Returns the union of missing field names, deduplicated in step order.
    pub fn validate_through(&self, step: WizardStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for s in WizardStep::ALL.iter().take_while(|s| **s <= step) {
            for field in self.missing_fields(*s) {
                if !missing.contains(&field) {
                    missing.push(field);
                }
            }
        }
        missing
    }

    /// True when the draft satisfies every step and may be submitted.
    pub fn is_complete(&self) -> bool {
        self.validate_through(WizardStep::Review).is_empty()
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> OrderDraft {
        OrderDraft {
            patient_id: Some(Uuid::new_v4()),
            hospital_id: Some(Uuid::new_v4()),
            clinical_indication: Some("Gonartrose grau IV, falha do tratamento conservador".into()),
            cid_code_ids: vec![Uuid::new_v4()],
            procedure_id: Some(Uuid::new_v4()),
            secondary_procedure_ids: vec![],
            opme_item_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            opme_item_quantities: vec![1, 2],
            supplier_ids: vec![Uuid::new_v4()],
            additional_notes: None,
        }
    }

    #[test]
    fn status_round_trips_db_form() {
        for status in [
            OrderStatus::InProgress,
            OrderStatus::AwaitingSubmission,
            OrderStatus::Submitted,
            OrderStatus::Authorized,
            OrderStatus::Denied,
            OrderStatus::UnderAppeal,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_db_str("em_preenchimento"), None);
    }

    #[test]
    fn happy_path_transitions() {
        use OrderStatus::*;
        assert!(InProgress.can_transition(AwaitingSubmission));
        assert!(AwaitingSubmission.can_transition(Submitted));
        assert!(Submitted.can_transition(Authorized));
        assert!(Authorized.can_transition(Completed));
    }

    #[test]
    fn appeal_cycle() {
        use OrderStatus::*;
        assert!(Submitted.can_transition(Denied));
        assert!(Denied.can_transition(UnderAppeal));
        assert!(UnderAppeal.can_transition(Authorized));
        assert!(UnderAppeal.can_transition(Denied));
        // A second appeal on a re-denied order is allowed.
        assert!(Denied.can_transition(UnderAppeal));
    }

    #[test]
    fn cancel_only_from_non_terminal() {
        use OrderStatus::*;
        assert!(InProgress.can_transition(Cancelled));
        assert!(Submitted.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Cancelled));
    }

    #[test]
    fn cancelling_under_appeal_blocks_the_verdict() {
        use OrderStatus::*;
        // An order with an open appeal can still be cancelled, but the
        // verdict must not resurrect it afterwards.
        assert!(UnderAppeal.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Authorized));
        assert!(!Cancelled.can_transition(Denied));
    }

    #[test]
    fn rejects_skipping_states() {
        use OrderStatus::*;
        assert!(!InProgress.can_transition(Submitted));
        assert!(!InProgress.can_transition(Authorized));
        assert!(!Submitted.can_transition(Completed));
        assert!(!Denied.can_transition(Authorized));
    }

    #[test]
    fn reopening_awaiting_submission_is_allowed() {
        // The doctor can go back and edit before submitting.
        assert!(OrderStatus::AwaitingSubmission.can_transition(OrderStatus::InProgress));
    }

    #[test]
    fn step_numbers_round_trip() {
        for step in WizardStep::ALL {
            assert_eq!(WizardStep::from_number(step.number()), Some(step));
        }
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(6), None);
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Patient.next(), Some(WizardStep::Hospital));
    }

    #[test]
    fn empty_draft_reports_step_one_missing() {
        let draft = OrderDraft::default();
        assert_eq!(draft.missing_fields(WizardStep::Patient), vec!["patientId"]);
        assert!(!draft.is_complete());
    }

    #[test]
    fn hospital_step_requires_indication_and_cids() {
        let mut draft = OrderDraft {
            hospital_id: Some(Uuid::new_v4()),
            clinical_indication: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(
            draft.missing_fields(WizardStep::Hospital),
            vec!["clinicalIndication", "cidCodeIds"]
        );

        draft.clinical_indication = Some("Fratura de fêmur".into());
        draft.cid_code_ids = vec![Uuid::new_v4()];
        assert!(draft.missing_fields(WizardStep::Hospital).is_empty());
    }

    #[test]
    fn opme_step_requires_aligned_quantities() {
        let mut draft = complete_draft();
        draft.opme_item_quantities = vec![1];
        assert_eq!(
            draft.missing_fields(WizardStep::OpmeMaterials),
            vec!["opmeItemQuantities"]
        );

        draft.opme_item_quantities = vec![1, 0];
        assert_eq!(
            draft.missing_fields(WizardStep::OpmeMaterials),
            vec!["opmeItemQuantities"]
        );
    }

    #[test]
    fn opme_step_caps_suppliers() {
        let mut draft = complete_draft();
        draft.supplier_ids = (0..4).map(|_| Uuid::new_v4()).collect();
        assert_eq!(
            draft.missing_fields(WizardStep::OpmeMaterials),
            vec!["supplierIds"]
        );
    }

    #[test]
    fn validate_through_accumulates_in_step_order() {
        let draft = OrderDraft::default();
        assert_eq!(
            draft.validate_through(WizardStep::Procedures),
            vec![
                "patientId",
                "hospitalId",
                "clinicalIndication",
                "cidCodeIds",
                "procedureId"
            ]
        );
    }

    #[test]
    fn complete_draft_is_submittable() {
        assert!(complete_draft().is_complete());
    }
}
