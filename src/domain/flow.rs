use super::payer::{EntityType, PayerEdit, PayerField, PayerMode, PayerRecord};
use super::verification::VerificationOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStep {
    Entry,
    Details,
    Review,
    Success,
    Failure,
}

impl FlowStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStep::Success | FlowStep::Failure)
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::Entry => "entry",
            FlowStep::Details => "details",
            FlowStep::Review => "review",
            FlowStep::Success => "success",
            FlowStep::Failure => "failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Idle,
    InProgress,
    Succeeded,
    Failed,
}

/// Receipt of the "connect to bank" step that follows a verified payer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BankHandoff {
    pub reference: String,
    pub ticket_reference: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub started_at: String,
}

/// State owned by the flow controller.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub step: FlowStep,
    pub payer_mode: Option<PayerMode>,
    pub entity_type: EntityType,
    pub attempt_counter: u32,
    pub payer_record: PayerRecord,
    pub verification_status: VerificationStatus,
    pub last_error: Option<VerificationOutcome>,
    pub is_repeat_shortcut: bool,
    /// Set when a recognized profile was too old to skip verification.
    pub reverify_notice: Option<String>,
    pub bank_account_hint: Option<String>,
    pub bank_handoff: Option<BankHandoff>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            step: FlowStep::Entry,
            payer_mode: None,
            entity_type: EntityType::default(),
            attempt_counter: 0,
            payer_record: PayerRecord::default(),
            verification_status: VerificationStatus::Idle,
            last_error: None,
            is_repeat_shortcut: false,
            reverify_notice: None,
            bank_account_hint: None,
            bank_handoff: None,
        }
    }
}

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    #[serde(flatten)]
    pub state: FlowState,
    pub attempts_remaining: u32,
    pub can_submit: bool,
    pub missing_fields: Vec<PayerField>,
    pub ticket_reference: String,
    pub display_amount: String,
}

/// Opaque user intents emitted by the presentation layer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "intent", content = "payload", rename_all = "camelCase")]
pub enum Intent {
    SelectPayerMode(PayerMode),
    ChangeEntityType(EntityType),
    EditField(PayerEdit),
    SubmitDetails,
    GoBackToDetails,
    ChangeDetails,
    ConfirmAndSubmit,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SelectPayerMode(_) => "select_payer_mode",
            Intent::ChangeEntityType(_) => "change_entity_type",
            Intent::EditField(_) => "edit_field",
            Intent::SubmitDetails => "submit_details",
            Intent::GoBackToDetails => "go_back_to_details",
            Intent::ChangeDetails => "change_details",
            Intent::ConfirmAndSubmit => "confirm_and_submit",
        }
    }
}
