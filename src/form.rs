//! Form controller
//!
//! Binds raw input to a validation [`Schema`] and drives one submission at a
//! time through the `Idle → Validating → (Invalid | Submitting) →
//! (Success | Failed)` cycle. The network call itself happens elsewhere; the
//! controller hands out a [`SubmitTicket`] when it accepts a submission and
//! only honours the outcome that carries the same ticket back.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppResult;
use crate::notification::Notification;
use crate::validation::{FieldErrors, FormValues, Schema};

static NEXT_MOUNT: AtomicU64 = AtomicU64::new(1);

/// Where a form is in its submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input
    #[default]
    Idle,
    /// Rules are being evaluated
    Validating,
    /// Last submit attempt failed validation. Like `Success` and `Failed`
    /// this lasts until the outcome has been drawn; [`Form::settle`] or the
    /// next edit returns to `Idle` (field errors stay until fixed)
    Invalid,
    /// Submit handler is running; re-submission is refused
    Submitting,
    /// Last submission succeeded
    Success,
    /// Last submission failed; values are kept for a retry
    Failed,
}

/// Identifies one accepted submission of one mounted form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket {
    mount: u64,
    serial: u64,
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Ticket to hand back to [`Form::resolve`]
    pub ticket: SubmitTicket,
    /// Normalised field values
    pub values: FormValues,
}

impl Submission {
    /// Normalised value of `field` (empty when the field was left blank)
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// Normalised value of `field`, `None` when blank
    pub fn optional(&self, field: &str) -> Option<String> {
        self.values.get(field).cloned()
    }
}

/// Result of pressing submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed; run the handler with these values
    Accepted(Submission),
    /// At least one rule failed; errors are now attached to the fields
    Invalid,
    /// A submission is already in flight
    Busy,
}

/// What the screen should do with a finished submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Handler succeeded; run the success side effects
    Succeeded(T),
    /// Handler failed; show this notification
    Failed(Notification),
    /// Ticket does not belong to the current submission of this form
    Stale,
}

/// State of one mounted form
#[derive(Debug, Clone)]
pub struct Form {
    schema: Schema,
    order: Vec<&'static str>,
    read_only: Vec<&'static str>,
    values: FormValues,
    errors: FieldErrors,
    phase: Phase,
    focus: usize,
    mount: u64,
    serial: u64,
    pending: Option<SubmitTicket>,
}

impl Form {
    /// Mount a new form for `schema` with every field empty
    pub fn new(schema: Schema) -> Self {
        let order: Vec<_> = schema.field_names().collect();
        let values = order
            .iter()
            .map(|name| ((*name).to_string(), String::new()))
            .collect();

        Self {
            schema,
            order,
            read_only: Vec::new(),
            values,
            errors: FieldErrors::default(),
            phase: Phase::Idle,
            focus: 0,
            mount: NEXT_MOUNT.fetch_add(1, Ordering::Relaxed),
            serial: 0,
            pending: None,
        }
    }

    /// Pre-fill a field
    pub fn with_value(mut self, field: &str, value: &str) -> Self {
        self.values.insert(field.to_string(), value.to_string());
        self
    }

    /// Mark a field as display-only (skipped by focus, ignores edits)
    pub fn read_only(mut self, field: &'static str) -> Self {
        self.read_only.push(field);
        if self.focused() == field {
            self.focus_next();
        }
        self
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a submission is in flight (drives the loading indicator)
    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    /// Field names in display order
    pub fn fields(&self) -> &[&'static str] {
        &self.order
    }

    /// Whether `field` is display-only
    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only.iter().any(|f| *f == field)
    }

    /// Current raw value of `field`
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// Error currently displayed under `field`
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// All displayed errors
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Name of the focused field
    pub fn focused(&self) -> &'static str {
        self.order.get(self.focus).copied().unwrap_or_default()
    }

    /// Whether focus is on the last editable field (Enter submits there)
    pub fn is_last_focused(&self) -> bool {
        !self
            .order
            .iter()
            .skip(self.focus + 1)
            .any(|f| !self.read_only.contains(f))
    }

    /// Move focus to the next editable field (wraps)
    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    /// Move focus to the previous editable field (wraps)
    pub fn focus_prev(&mut self) {
        self.step_focus(self.order.len().saturating_sub(1));
    }

    fn step_focus(&mut self, step: usize) {
        let len = self.order.len();
        if len == 0 {
            return;
        }
        for _ in 0..len {
            self.focus = (self.focus + step) % len;
            if !self.read_only.contains(&self.order[self.focus]) {
                break;
            }
        }
    }

    /// Replace the value of `field`.
    ///
    /// Fields that currently show an error are re-checked, together with the
    /// fields whose rules read `field`, so a confirmation error disappears as
    /// soon as the two passwords match again.
    pub fn set_value(&mut self, field: &str, value: &str) {
        if self.is_read_only(field) || !self.values.contains_key(field) {
            return;
        }
        self.values.insert(field.to_string(), value.to_string());
        self.settle();

        let affected: Vec<&'static str> = self
            .order
            .iter()
            .copied()
            .filter(|f| *f == field)
            .chain(self.schema.dependents(field))
            .collect();

        for name in affected {
            if self.errors.get(name).is_none() {
                continue;
            }
            match self.schema.check_field(name, &self.values) {
                Some(message) => self.errors.insert(name, message),
                None => self.errors.remove(name),
            }
        }
    }

    /// Append a character to the focused field
    pub fn push_char(&mut self, c: char) {
        let field = self.focused();
        let mut value = self.value(field).to_string();
        value.push(c);
        self.set_value(field, &value);
    }

    /// Delete the last character of the focused field
    pub fn pop_char(&mut self) {
        let field = self.focused();
        let mut value = self.value(field).to_string();
        if value.pop().is_some() {
            self.set_value(field, &value);
        }
    }

    /// Return a finished cycle to `Idle` once its outcome has been shown
    pub fn settle(&mut self) {
        if matches!(self.phase, Phase::Invalid | Phase::Success | Phase::Failed) {
            self.phase = Phase::Idle;
        }
    }

    /// Validate and, if everything passes, accept a submission
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.pending.is_some() {
            tracing::debug!("submit ignored: submission already in flight");
            return SubmitOutcome::Busy;
        }

        self.phase = Phase::Validating;
        match self.schema.validate(&self.values) {
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "form validation failed");
                self.errors = errors;
                self.phase = Phase::Invalid;
                SubmitOutcome::Invalid
            }
            Ok(values) => {
                self.errors.clear();
                self.serial += 1;
                let ticket = SubmitTicket {
                    mount: self.mount,
                    serial: self.serial,
                };
                self.pending = Some(ticket);
                self.phase = Phase::Submitting;
                SubmitOutcome::Accepted(Submission { ticket, values })
            }
        }
    }

    /// Whether `ticket` is the submission currently in flight here
    pub fn owns(&self, ticket: SubmitTicket) -> bool {
        self.pending == Some(ticket)
    }

    /// Finish the in-flight submission with the handler's result.
    ///
    /// On failure the values stay untouched and exactly one notification is
    /// produced: the server's message for application errors, `fallback`
    /// for everything else.
    pub fn resolve<T>(
        &mut self,
        ticket: SubmitTicket,
        result: AppResult<T>,
        fallback: &str,
    ) -> Resolution<T> {
        if !self.owns(ticket) {
            tracing::debug!(?ticket, "dropping result for inactive submission");
            return Resolution::Stale;
        }
        self.pending = None;

        match result {
            Ok(value) => {
                self.phase = Phase::Success;
                Resolution::Succeeded(value)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                if e.is_application() {
                    tracing::info!("submission rejected: {e}");
                } else {
                    tracing::error!("submission failed: {e}");
                }
                Resolution::Failed(Notification::error(e.user_message(fallback)))
            }
        }
    }

    /// Give up on the in-flight submission before any request was sent
    pub fn abort(&mut self, ticket: SubmitTicket) -> bool {
        if !self.owns(ticket) {
            return false;
        }
        self.pending = None;
        self.phase = Phase::Idle;
        true
    }

    /// Blank the given fields (e.g. passwords after a successful change)
    pub fn clear(&mut self, fields: &[&str]) {
        for field in fields {
            if let Some(value) = self.values.get_mut(*field) {
                value.clear();
            }
            self.errors.remove(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::notification::Level;
    use crate::validation::schemas::{self, fields};

    fn filled_sign_in() -> Form {
        Form::new(schemas::sign_in())
            .with_value(fields::EMAIL, "a@b.com")
            .with_value(fields::PASSWORD, "secret1")
    }

    fn accept(form: &mut Form) -> Submission {
        match form.submit() {
            SubmitOutcome::Accepted(submission) => submission,
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_submit_sets_field_errors() {
        let mut form = Form::new(schemas::sign_in()).with_value(fields::EMAIL, "a@b.com");
        form.set_value(fields::PASSWORD, "123");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(form.phase(), Phase::Invalid);
        assert_eq!(
            form.error(fields::PASSWORD),
            Some("Password must be at least 6 characters.")
        );
        assert!(!form.is_loading());
    }

    #[test]
    fn test_double_submit_is_refused_while_pending() {
        let mut form = filled_sign_in();
        let first = accept(&mut form);
        assert!(form.is_loading());
        assert_eq!(form.submit(), SubmitOutcome::Busy);

        let resolution = form.resolve(first.ticket, Ok::<_, AppError>(()), "fallback");
        assert_eq!(resolution, Resolution::Succeeded(()));
        assert!(!form.is_loading());
        assert!(matches!(form.submit(), SubmitOutcome::Accepted(_)));
    }

    #[test]
    fn test_failure_keeps_values_and_yields_one_notification() {
        let mut form = filled_sign_in();
        let submission = accept(&mut form);
        let resolution = form.resolve::<()>(
            submission.ticket,
            Err(AppError::application("Invalid credentials.", 400)),
            "Could not sign in.",
        );
        let Resolution::Failed(notification) = resolution else {
            panic!("expected failure");
        };
        assert_eq!(notification.title, "Invalid credentials.");
        assert_eq!(notification.level, Level::Error);
        assert_eq!(form.phase(), Phase::Failed);
        assert_eq!(form.value(fields::EMAIL), "a@b.com");
        assert_eq!(form.value(fields::PASSWORD), "secret1");

        // Second delivery of the same outcome is ignored
        let again =
            form.resolve::<()>(submission.ticket, Err(AppError::Network("x".into())), "f");
        assert_eq!(again, Resolution::Stale);
    }

    #[test]
    fn test_network_failure_uses_fallback() {
        let mut form = filled_sign_in();
        let submission = accept(&mut form);
        let resolution = form.resolve::<()>(
            submission.ticket,
            Err(AppError::Network("timed out".into())),
            "Could not sign in.",
        );
        assert_eq!(
            resolution,
            Resolution::Failed(Notification::error("Could not sign in."))
        );
    }

    #[test]
    fn test_result_for_remounted_form_is_stale() {
        let mut old = filled_sign_in();
        let submission = accept(&mut old);
        let mut fresh = filled_sign_in();
        assert_eq!(
            fresh.resolve(submission.ticket, Ok::<_, AppError>(()), "f"),
            Resolution::Stale
        );
        assert_eq!(fresh.phase(), Phase::Idle);
    }

    #[test]
    fn test_live_revalidation_clears_confirmation_error() {
        let mut form = Form::new(schemas::sign_up())
            .with_value(fields::NAME, "Ana")
            .with_value(fields::EMAIL, "ana@gym.com")
            .with_value(fields::PASSWORD, "abcdef")
            .with_value(fields::PASSWORD_CONFIRM, "abcdeg");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert!(form.error(fields::PASSWORD_CONFIRM).is_some());

        // Fixing the other side of the pair clears the error too
        form.set_value(fields::PASSWORD, "abcdeg");
        assert_eq!(form.error(fields::PASSWORD_CONFIRM), None);
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn test_cleared_new_password_needs_no_confirmation() {
        let mut form = Form::new(schemas::profile())
            .with_value(fields::NAME, "Ana")
            .with_value(fields::PASSWORD, "abcdef");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert!(form.error(fields::PASSWORD_CONFIRM).is_some());

        form.set_value(fields::PASSWORD, "");
        assert_eq!(form.error(fields::PASSWORD_CONFIRM), None);
        assert_eq!(form.error(fields::OLD_PASSWORD), None);

        let submission = accept(&mut form);
        assert_eq!(submission.optional(fields::PASSWORD), None);
        assert_eq!(submission.optional(fields::PASSWORD_CONFIRM), None);
    }

    #[test]
    fn test_leftover_confirmation_blocks_profile_submit() {
        let mut form = Form::new(schemas::profile())
            .with_value(fields::NAME, "Ana")
            .with_value(fields::PASSWORD, "abcdef")
            .with_value(fields::PASSWORD_CONFIRM, "abcdef");

        form.set_value(fields::PASSWORD, "");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(
            form.error(fields::PASSWORD_CONFIRM),
            Some("Password confirmation does not match.")
        );
    }

    #[test]
    fn test_focus_skips_read_only_fields() {
        let mut form = Form::new(schemas::profile())
            .with_value(fields::EMAIL, "ana@gym.com")
            .read_only(fields::EMAIL);
        assert_eq!(form.focused(), fields::NAME);
        form.focus_next();
        assert_eq!(form.focused(), fields::OLD_PASSWORD);
        form.focus_prev();
        assert_eq!(form.focused(), fields::NAME);

        form.set_value(fields::EMAIL, "other@gym.com");
        assert_eq!(form.value(fields::EMAIL), "ana@gym.com");
    }

    #[test]
    fn test_typing_into_focused_field() {
        let mut form = Form::new(schemas::sign_in());
        for c in "a@b.co".chars() {
            form.push_char(c);
        }
        form.pop_char();
        assert_eq!(form.value(fields::EMAIL), "a@b.c");
        assert!(!form.is_last_focused());
        form.focus_next();
        assert!(form.is_last_focused());
    }

    #[test]
    fn test_abort_releases_the_guard() {
        let mut form = Form::new(schemas::avatar()).with_value(fields::AVATAR_PATH, "/tmp/x.png");
        let submission = accept(&mut form);
        assert!(form.abort(submission.ticket));
        assert_eq!(form.phase(), Phase::Idle);
        assert!(matches!(form.submit(), SubmitOutcome::Accepted(_)));
    }
}
