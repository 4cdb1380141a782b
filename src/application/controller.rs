use crate::application::profile_store::PayerProfileStore;
use crate::config::FlowConfig;
use crate::domain::flow::{
    BankHandoff, FlowState, FlowStep, FlowView, Intent, VerificationStatus,
};
use crate::domain::form;
use crate::domain::payer::{EntityType, PayerEdit, PayerMode, PayerRecord};
use crate::domain::payment::PaymentRequest;
use crate::domain::ports::{BankConnectorBox, IdentityVerifierBox};
use crate::domain::verification::VerificationOutcome;
use crate::error::{FlowError, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

/// Notice shown when a recognized payer has to verify again.
pub const REVERIFY_NOTICE: &str =
    "Your saved verification has expired. Please confirm your details again.";

/// External collaborators the controller calls into.
struct Services {
    request: PaymentRequest,
    store: PayerProfileStore,
    verifier: IdentityVerifierBox,
    bank: BankConnectorBox,
}

/// How a confirmation ended, before it is folded into the flow state.
enum Submission {
    Authorized(BankHandoff),
    Rejected(VerificationOutcome),
    Interrupted(VerificationOutcome),
}

impl Services {
    async fn submit(
        &self,
        record: &PayerRecord,
        payer_mode: Option<PayerMode>,
        entity_type: EntityType,
        shortcut: bool,
        limit: Duration,
    ) -> Submission {
        if shortcut {
            debug!("Repeat payer shortcut, skipping identity verification");
            return self.hand_off(record, limit).await;
        }

        let outcome = match time::timeout(limit, self.verifier.verify(record)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(error = %e, "Identity verification failed to complete");
                return Submission::Interrupted(VerificationOutcome::unknown());
            }
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Identity verification timed out");
                return Submission::Interrupted(VerificationOutcome::unknown());
            }
        };

        if outcome.is_pass() {
            if let Some(mode) = payer_mode {
                self.store.save(record, entity_type, mode).await;
            }
            self.hand_off(record, limit).await
        } else if outcome.consumes_attempt() {
            Submission::Rejected(outcome)
        } else {
            Submission::Interrupted(outcome)
        }
    }

    async fn hand_off(&self, record: &PayerRecord, limit: Duration) -> Submission {
        match time::timeout(limit, self.bank.connect(&self.request, record)).await {
            Ok(Ok(handoff)) => Submission::Authorized(handoff),
            Ok(Err(e)) => {
                warn!(error = %e, "Bank connection failed");
                Submission::Interrupted(VerificationOutcome::unknown())
            }
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Bank connection timed out");
                Submission::Interrupted(VerificationOutcome::unknown())
            }
        }
    }
}

/// Resets a verification status left in progress when a confirmation is
/// abandoned mid-flight and republishes the idle view to watchers.
///
/// Armed while `idle` is set; a completed submission disarms it.
struct InFlight<'a> {
    status: &'a mut VerificationStatus,
    updates: &'a watch::Sender<FlowView>,
    idle: Option<FlowView>,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.idle = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(idle) = self.idle.take() else {
            return;
        };
        if *self.status == VerificationStatus::InProgress {
            *self.status = VerificationStatus::Idle;
            debug!("Confirmation abandoned, verification status reset");
            self.updates.send_replace(idle);
        }
    }
}

/// The payer verification state machine.
///
/// `ENTRY -> DETAILS -> REVIEW -> {SUCCESS | FAILURE}`. A returning payer
/// with a fresh profile starts directly on REVIEW. Every intent either applies
/// completely or returns an error and leaves the state untouched.
pub struct FlowController {
    services: Services,
    config: FlowConfig,
    state: FlowState,
    updates: watch::Sender<FlowView>,
}

impl FlowController {
    pub fn new(
        request: PaymentRequest,
        store: PayerProfileStore,
        verifier: IdentityVerifierBox,
        bank: BankConnectorBox,
        config: FlowConfig,
    ) -> Self {
        let services = Services {
            request,
            store,
            verifier,
            bank,
        };
        let state = FlowState::default();
        let initial = project(&services.request, &config, &state);
        let (updates, _) = watch::channel(initial);
        Self {
            services,
            config,
            state,
            updates,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.services.request
    }

    pub fn view(&self) -> FlowView {
        project(&self.services.request, &self.config, &self.state)
    }

    /// Receives a fresh projection after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FlowView> {
        self.updates.subscribe()
    }

    /// Runs the start-of-flow profile lookup. Only valid on ENTRY.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.state.step != FlowStep::Entry {
            return Err(FlowError::InvalidTransition {
                intent: "initialize",
                step: self.state.step,
            });
        }

        let profile = match self.services.request.identity_key() {
            Some(email) => {
                let lookup = self.services.store.lookup(email);
                match time::timeout(self.config.external_call_timeout(), lookup).await {
                    Ok(profile) => profile,
                    Err(_) => {
                        warn!("Profile lookup timed out, continuing without a stored profile");
                        None
                    }
                }
            }
            None => None,
        };

        match profile {
            Some(profile) if self.services.store.is_fresh(&profile) => {
                info!(
                    ticket = %self.services.request.ticket_reference,
                    "Recognized verified payer, starting on review"
                );
                self.state.step = FlowStep::Review;
                self.state.payer_mode = Some(profile.payer_mode);
                self.state.entity_type = profile.entity_type;
                self.state.payer_record = profile.payer_record;
                self.state.bank_account_hint = profile.bank_account_hint;
                self.state.is_repeat_shortcut = true;
            }
            Some(profile) => {
                info!(
                    ticket = %self.services.request.ticket_reference,
                    "Recognized payer with expired verification, asking to reverify"
                );
                self.state.step = FlowStep::Details;
                self.state.payer_mode = Some(profile.payer_mode);
                self.state.entity_type = profile.entity_type;
                self.state.payer_record = profile.payer_record;
                self.state.last_error = None;
                self.state.reverify_notice = Some(REVERIFY_NOTICE.to_string());
            }
            None => {
                info!(
                    ticket = %self.services.request.ticket_reference,
                    "Starting new payer flow"
                );
                self.state.step = FlowStep::Details;
            }
        }

        self.publish();
        Ok(())
    }

    pub fn select_payer_mode(&mut self, mode: PayerMode) -> Result<()> {
        self.ensure_step("select_payer_mode", FlowStep::Details)?;
        if self.state.payer_mode == Some(mode) {
            debug!(?mode, "Payer mode unchanged");
            return Ok(());
        }

        self.state.payer_mode = Some(mode);
        self.state.payer_record = match mode {
            PayerMode::SelfPay => form::prefill_for_self(&self.services.request),
            PayerMode::ThirdParty => form::reset_for_third_party(),
        };
        debug!(?mode, "Payer mode selected");
        self.publish();
        Ok(())
    }

    pub fn change_entity_type(&mut self, entity_type: EntityType) -> Result<()> {
        self.ensure_step("change_entity_type", FlowStep::Details)?;
        self.state.entity_type = entity_type;
        let record = std::mem::take(&mut self.state.payer_record);
        self.state.payer_record = form::apply_entity_type_change(record, entity_type);
        self.publish();
        Ok(())
    }

    pub fn edit_field(&mut self, edit: &PayerEdit) -> Result<()> {
        self.ensure_step("edit_field", FlowStep::Details)?;
        let record = std::mem::take(&mut self.state.payer_record);
        self.state.payer_record = form::merge_edit(record, edit);
        self.publish();
        Ok(())
    }

    pub fn submit_details(&mut self) -> Result<()> {
        self.ensure_step("submit_details", FlowStep::Details)?;
        if self.state.payer_mode.is_none() {
            return Err(FlowError::PayerModeRequired);
        }
        if self.state.entity_type == EntityType::Company {
            let missing = self.state.payer_record.missing_company_fields();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
                return Err(FlowError::ValidationError(format!(
                    "Company payers require {}",
                    names.join(", ")
                )));
            }
        }

        self.state.step = FlowStep::Review;
        self.publish();
        Ok(())
    }

    pub fn go_back_to_details(&mut self) -> Result<()> {
        self.ensure_step("go_back_to_details", FlowStep::Review)?;
        self.return_to_details();
        Ok(())
    }

    /// Same as [`go_back_to_details`](Self::go_back_to_details). The stored
    /// profile is left alone so a later flow can still use it.
    pub fn change_details(&mut self) -> Result<()> {
        self.ensure_step("change_details", FlowStep::Review)?;
        self.return_to_details();
        Ok(())
    }

    fn return_to_details(&mut self) {
        if self.state.is_repeat_shortcut {
            debug!("Payer chose to edit, repeat shortcut revoked");
        }
        self.state.is_repeat_shortcut = false;
        self.state.step = FlowStep::Details;
        self.publish();
    }

    /// Verifies the payer (unless the repeat shortcut applies) and hands off
    /// to the bank.
    ///
    /// Rejections consume an attempt and end the flow at the cap.
    /// Infrastructure failures leave the payer on REVIEW with a retry message
    /// and do not consume an attempt.
    pub async fn confirm_and_submit(&mut self) -> Result<()> {
        self.ensure_step("confirm_and_submit", FlowStep::Review)?;

        self.state.last_error = None;
        let mut idle = self.view();
        idle.state.verification_status = VerificationStatus::Idle;
        self.state.verification_status = VerificationStatus::InProgress;
        self.publish();

        let limit = self.config.external_call_timeout();
        let submission = {
            let mut in_flight = InFlight {
                status: &mut self.state.verification_status,
                updates: &self.updates,
                idle: Some(idle),
            };
            let submission = self
                .services
                .submit(
                    &self.state.payer_record,
                    self.state.payer_mode,
                    self.state.entity_type,
                    self.state.is_repeat_shortcut,
                    limit,
                )
                .await;
            in_flight.disarm();
            submission
        };

        match submission {
            Submission::Authorized(handoff) => {
                info!(
                    ticket = %handoff.ticket_reference,
                    reference = %handoff.reference,
                    shortcut = self.state.is_repeat_shortcut,
                    "Payer verified, bank authorization started"
                );
                self.state.verification_status = VerificationStatus::Succeeded;
                self.state.step = FlowStep::Success;
                self.state.bank_handoff = Some(handoff);
            }
            Submission::Rejected(outcome) => {
                self.state.attempt_counter =
                    (self.state.attempt_counter + 1).min(self.config.max_attempts);
                let attempts = self.state.attempt_counter;
                if attempts >= self.config.max_attempts {
                    warn!(attempts, ?outcome, "Verification attempts exhausted, flow blocked");
                    self.state.verification_status = VerificationStatus::Failed;
                    self.state.step = FlowStep::Failure;
                } else {
                    info!(attempts, ?outcome, "Verification rejected");
                    self.state.verification_status = VerificationStatus::Idle;
                }
                self.state.last_error = Some(outcome);
            }
            Submission::Interrupted(outcome) => {
                self.state.verification_status = VerificationStatus::Idle;
                self.state.last_error = Some(outcome);
            }
        }

        self.publish();
        Ok(())
    }

    pub async fn apply(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::SelectPayerMode(mode) => self.select_payer_mode(mode),
            Intent::ChangeEntityType(entity_type) => self.change_entity_type(entity_type),
            Intent::EditField(edit) => self.edit_field(&edit),
            Intent::SubmitDetails => self.submit_details(),
            Intent::GoBackToDetails => self.go_back_to_details(),
            Intent::ChangeDetails => self.change_details(),
            Intent::ConfirmAndSubmit => self.confirm_and_submit().await,
        }
    }

    fn ensure_step(&self, intent: &'static str, expected: FlowStep) -> Result<()> {
        if self.state.step.is_terminal() {
            return Err(FlowError::FlowClosed(self.state.step));
        }
        if self.state.verification_status == VerificationStatus::InProgress {
            return Err(FlowError::VerificationInProgress);
        }
        if self.state.step != expected {
            return Err(FlowError::InvalidTransition {
                intent,
                step: self.state.step,
            });
        }
        Ok(())
    }

    fn publish(&self) {
        self.updates.send_replace(self.view());
    }
}

fn project(request: &PaymentRequest, config: &FlowConfig, state: &FlowState) -> FlowView {
    let mut missing_fields = state.payer_record.missing_required_fields();
    if state.entity_type == EntityType::Company {
        missing_fields.extend(state.payer_record.missing_company_fields());
    }
    FlowView {
        state: state.clone(),
        attempts_remaining: config.max_attempts.saturating_sub(state.attempt_counter),
        can_submit: state.payer_mode.is_some(),
        missing_fields,
        ticket_reference: request.ticket_reference.clone(),
        display_amount: request.display_amount(),
    }
}
