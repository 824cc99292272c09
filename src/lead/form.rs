//! Lead-capture form state and submission.

use tracing::{debug, info};

use super::client::{Lead, LeadSink};
use super::validator::{format_phone_number, validate_full_name};
use crate::error::{SubmitError, ValidationError};

/// What a successful submission hands back to the page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Submitted {
    /// External chat to open next.
    pub follow_up_url: String,
}

/// The "try for free" form: full name, email, phone and consent.
#[derive(Debug, Clone, Default)]
pub struct LeadForm {
    name: String,
    email: String,
    phone: String,
    consent: bool,
    /// Result of the most recent name validation.
    name_error: Option<ValidationError>,
    /// Whether the "request sent" confirmation is showing.
    success_shown: bool,
}

impl LeadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the name; re-validates unless the field is blank.
    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
        self.name_error = if self.name.trim().is_empty() {
            None
        } else {
            validate_full_name(&self.name).err()
        };
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    /// Update the phone; the stored value is always the masked form.
    pub fn set_phone(&mut self, raw: &str) {
        self.phone = format_phone_number(raw);
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.consent = consent;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn name_error(&self) -> Option<ValidationError> {
        self.name_error
    }

    pub fn success_shown(&self) -> bool {
        self.success_shown
    }

    /// Close the confirmation.
    pub fn dismiss_success(&mut self) {
        self.success_shown = false;
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
            && self.consent
            && self.name_error.is_none()
    }

    /// Validate and send the form.
    ///
    /// On success the form is cleared and the confirmation shown. On any
    /// failure the fields stay as they were so the visitor can retry.
    pub async fn submit(
        &mut self,
        sink: &dyn LeadSink,
        follow_up_url: &str,
    ) -> Result<Submitted, SubmitError> {
        if let Err(e) = validate_full_name(&self.name) {
            debug!(error = %e, "Lead form blocked by name validation");
            self.name_error = Some(e);
            return Err(e.into());
        }

        if !self.consent {
            debug!("Lead form blocked: consent not given");
            return Err(SubmitError::ConsentRequired);
        }

        if self.email.trim().is_empty() || self.phone.trim().is_empty() {
            debug!("Lead form blocked: contact details missing");
            return Err(SubmitError::Incomplete);
        }

        let lead = Lead {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        };
        sink.submit(&lead).await?;

        info!(follow_up = %follow_up_url, "Lead accepted");
        *self = Self {
            success_shown: true,
            ..Self::default()
        };

        Ok(Submitted {
            follow_up_url: follow_up_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::SubmissionError;

    const FOLLOW_UP: &str = "https://t.me/Bot_RazblokBot";

    /// Records every lead; optionally fails.
    #[derive(Default)]
    struct RecordingSink {
        leads: Mutex<Vec<Lead>>,
        fail: bool,
    }

    #[async_trait]
    impl LeadSink for RecordingSink {
        async fn submit(&self, lead: &Lead) -> Result<(), SubmissionError> {
            self.leads.lock().unwrap().push(lead.clone());
            if self.fail {
                Err(SubmissionError::Rejected { status: 500 })
            } else {
                Ok(())
            }
        }
    }

    fn filled_form() -> LeadForm {
        let mut form = LeadForm::new();
        form.set_name("Иванов Иван Петрович");
        form.set_email("ivanov@mail.ru");
        form.set_phone("9991234567");
        form.set_consent(true);
        form
    }

    #[test]
    fn name_errors_track_the_latest_input() {
        let mut form = LeadForm::new();
        form.set_name("John");
        assert_eq!(form.name_error(), Some(ValidationError::InvalidScript));
        form.set_name("Иванов");
        assert_eq!(form.name_error(), Some(ValidationError::TooFewWords));
        form.set_name("Иванов Иван");
        assert_eq!(form.name_error(), None);
        form.set_name("Ли");
        assert!(form.name_error().is_some());
        form.set_name("   ");
        assert_eq!(form.name_error(), None);
    }

    #[test]
    fn phone_is_masked_on_every_change() {
        let mut form = LeadForm::new();
        form.set_phone("9");
        assert_eq!(form.phone(), "+7");
        form.set_phone("+79");
        assert_eq!(form.phone(), "+7 (9");
        form.set_phone("");
        assert_eq!(form.phone(), "");
    }

    #[test]
    fn submit_gate() {
        let form = filled_form();
        assert!(form.can_submit());

        let mut no_consent = filled_form();
        no_consent.set_consent(false);
        assert!(!no_consent.can_submit());

        let mut no_email = filled_form();
        no_email.set_email("  ");
        assert!(!no_email.can_submit());

        let mut bad_name = filled_form();
        bad_name.set_name("А Б");
        assert!(!bad_name.can_submit());

        let mut no_phone = filled_form();
        no_phone.set_phone("no digits");
        assert!(!no_phone.can_submit());
    }

    #[tokio::test]
    async fn missing_consent_never_reaches_the_endpoint() {
        let sink = RecordingSink::default();
        let mut form = filled_form();
        form.set_consent(false);

        let err = form.submit(&sink, FOLLOW_UP).await.unwrap_err();
        assert!(matches!(err, SubmitError::ConsentRequired));
        assert!(sink.leads.lock().unwrap().is_empty());
        assert_eq!(form.name(), "Иванов Иван Петрович");
    }

    #[tokio::test]
    async fn blank_contacts_never_reach_the_endpoint() {
        let sink = RecordingSink::default();

        let mut no_email = filled_form();
        no_email.set_email("   ");
        let err = no_email.submit(&sink, FOLLOW_UP).await.unwrap_err();
        assert!(matches!(err, SubmitError::Incomplete));

        let mut no_phone = filled_form();
        no_phone.set_phone("");
        let err = no_phone.submit(&sink, FOLLOW_UP).await.unwrap_err();
        assert!(matches!(err, SubmitError::Incomplete));

        assert!(sink.leads.lock().unwrap().is_empty());
        assert!(!no_phone.success_shown());
    }

    #[tokio::test]
    async fn invalid_name_blocks_and_is_reported() {
        let sink = RecordingSink::default();
        let mut form = filled_form();
        form.set_name("John Smith");

        let err = form.submit(&sink, FOLLOW_UP).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::InvalidScript)
        ));
        assert_eq!(form.name_error(), Some(ValidationError::InvalidScript));
        assert!(sink.leads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_sends_once_and_resets() {
        let sink = RecordingSink::default();
        let mut form = filled_form();

        let submitted = form.submit(&sink, FOLLOW_UP).await.unwrap();
        assert_eq!(submitted.follow_up_url, FOLLOW_UP);

        let leads = sink.leads.lock().unwrap().clone();
        assert_eq!(
            leads,
            vec![Lead {
                name: "Иванов Иван Петрович".into(),
                email: "ivanov@mail.ru".into(),
                phone: "+7 (999) 123-45-67".into(),
            }]
        );

        assert!(form.success_shown());
        assert!(form.name().is_empty());
        assert!(form.email().is_empty());
        assert!(form.phone().is_empty());
        assert!(!form.consent());
        assert!(!form.can_submit());

        form.dismiss_success();
        assert!(!form.success_shown());
    }

    #[tokio::test]
    async fn failure_keeps_the_form_for_retry() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut form = filled_form();

        let err = form.submit(&sink, FOLLOW_UP).await.unwrap_err();
        assert_eq!(err.user_message(), "Ошибка отправки заявки. Попробуйте позже.");
        assert!(!form.success_shown());
        assert_eq!(form.phone(), "+7 (999) 123-45-67");
        assert!(form.can_submit());
        assert_eq!(sink.leads.lock().unwrap().len(), 1);
    }
}
