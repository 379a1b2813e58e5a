//! Loan application wizard
//!
//! The three-step application form (personal info, payment method, review)
//! as an explicit state machine. [`ApplicationWizard`] is a plain value:
//! every step transition consumes it and hands it back, either advanced or
//! unchanged together with the reason it could not move. Only the fields
//! that belong to the current step are checked when moving forward; the
//! full schema is checked again on submit.

pub mod gateway;

use axum::body::Bytes;
use thiserror::Error;

use crate::calculator::{compute_monthly_payment, CalculatorSelection, PaymentQuote};
use crate::models::{
    CreateLoanApplicationRequest, Currency, LoanApplication, PaymentMethodType,
};
use crate::uploads::DEFAULT_MAX_UPLOAD_BYTES;
use crate::validation::{
    coerce_integer_text, validate_email, validate_iban, validate_income, validate_name, FieldError,
};

pub use gateway::{GatewayError, HttpSubmissionClient, SubmissionGateway};

/// File types the document picker offers
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "jpg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    PersonalInfo,
    PaymentMethod,
    Review,
    Success,
}

impl WizardStep {
    pub fn index(&self) -> u8 {
        match self {
            WizardStep::PersonalInfo => 0,
            WizardStep::PaymentMethod => 1,
            WizardStep::Review => 2,
            WizardStep::Success => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Info",
            WizardStep::PaymentMethod => "Payment Method",
            WizardStep::Review => "Review",
            WizardStep::Success => "Application Received",
        }
    }
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Please correct the highlighted fields")]
    InvalidFields(Vec<FieldError>),

    #[error("You must accept the terms")]
    TermsNotAccepted,

    #[error("Direct to card payouts are not available yet")]
    PaymentMethodUnavailable,

    #[error("{action} is not possible on the {step:?} step")]
    InvalidTransition {
        action: &'static str,
        step: WizardStep,
    },

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
}

impl WizardError {
    /// Field errors to display next to inputs, if any
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            WizardError::InvalidFields(errors) => errors,
            _ => &[],
        }
    }
}

/// A transition that did not happen. The wizard comes back untouched.
#[derive(Debug)]
pub struct Rejected {
    pub wizard: ApplicationWizard,
    pub error: WizardError,
}

/// Result of pressing "Back"
#[derive(Debug)]
pub enum BackOutcome {
    Step(ApplicationWizard),
    /// Leaving the first step returns to the calculator with the same terms
    ExitToCalculator(CalculatorSelection),
}

/// Identity document picked by the applicant
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Advisory only; the picker suggests these types but does not enforce them
    pub fn has_accepted_extension(&self) -> bool {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false)
    }

    /// Advisory only; the server enforces the real cap
    pub fn exceeds_size_hint(&self) -> bool {
        self.data.len() > DEFAULT_MAX_UPLOAD_BYTES
    }
}

/// Values collected across the wizard steps.
///
/// Loan terms come from the calculator and the payout method is chosen
/// through [`ApplicationWizard::select_payment_method`], so those are
/// read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Raw text of the income input; coerced when validated
    pub income: String,
    pub iban: String,
    pub terms_accepted: bool,
    amount: i64,
    duration: u32,
    currency: Currency,
    payment_method_type: PaymentMethodType,
}

impl ApplicationForm {
    fn new(selection: CalculatorSelection) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            income: "0".to_string(),
            iban: String::new(),
            terms_accepted: false,
            amount: selection.amount(),
            duration: selection.duration(),
            currency: selection.currency(),
            payment_method_type: PaymentMethodType::BankTransfer,
        }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn payment_method_type(&self) -> PaymentMethodType {
        self.payment_method_type
    }

    fn selection(&self) -> CalculatorSelection {
        CalculatorSelection::new(self.amount, self.duration, self.currency)
    }

    fn parsed_income(&self) -> Result<i32, FieldError> {
        let raw = self.income.trim();
        if raw.is_empty() {
            return validate_income(0);
        }
        let value = coerce_integer_text("income", raw)
            .map_err(|_| FieldError::new("income", "Income must be a number"))?;
        validate_income(value)
    }

    fn personal_info_errors(&self) -> Vec<FieldError> {
        [
            validate_name("firstName", &self.first_name).err(),
            validate_name("lastName", &self.last_name).err(),
            validate_email(&self.email).err(),
            self.parsed_income().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn payment_method_errors(&self) -> Vec<FieldError> {
        match self.payment_method_type {
            PaymentMethodType::BankTransfer => validate_iban(&self.iban).err().into_iter().collect(),
            PaymentMethodType::Card => Vec::new(),
        }
    }

    /// Check every field and build the request body the backend expects
    fn to_request(
        &self,
        identity_file_url: Option<String>,
    ) -> Result<CreateLoanApplicationRequest, Vec<FieldError>> {
        let mut errors = self.personal_info_errors();
        if self.amount < 1 {
            errors.push(FieldError::new("amount", "Number must be greater than 0"));
        }
        if self.duration < 1 {
            errors.push(FieldError::new("duration", "Number must be greater than 0"));
        }
        errors.extend(self.payment_method_errors());
        if !errors.is_empty() {
            return Err(errors);
        }

        let iban = match self.payment_method_type {
            PaymentMethodType::BankTransfer => validate_iban(&self.iban).map_err(|e| vec![e])?,
            PaymentMethodType::Card => String::new(),
        };

        Ok(CreateLoanApplicationRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            income: self.parsed_income().map_err(|e| vec![e])? as i64,
            identity_file_url,
            amount: self.amount,
            duration: self.duration as i64,
            currency: self.currency,
            iban,
            payment_method_type: self.payment_method_type,
        })
    }
}

/// What the review step shows before submitting
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub amount: i64,
    pub duration: u32,
    pub currency: Currency,
    pub applicant: String,
    pub iban: String,
    pub quote: PaymentQuote,
}

#[derive(Debug)]
pub struct ApplicationWizard {
    step: WizardStep,
    form: ApplicationForm,
    file: Option<SelectedFile>,
    confirmation: Option<LoanApplication>,
}

impl ApplicationWizard {
    /// Start a new application from the calculator's current terms
    pub fn new(selection: CalculatorSelection) -> Self {
        Self {
            step: WizardStep::PersonalInfo,
            form: ApplicationForm::new(selection),
            file: None,
            confirmation: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    /// Editable fields. Edits never change the current step.
    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// The stored application once the wizard has reached `Success`
    pub fn confirmation(&self) -> Option<&LoanApplication> {
        self.confirmation.as_ref()
    }

    /// Progress bar fill for the three visible steps
    pub fn progress_percent(&self) -> u8 {
        let filled = (self.step.index() + 1).min(3) as u32;
        (filled * 100 / 3) as u8
    }

    pub fn attach_file(&mut self, file: SelectedFile) {
        if !file.has_accepted_extension() {
            tracing::debug!(file = %file.name, "Attached file has an unexpected extension");
        }
        self.file = Some(file);
    }

    pub fn remove_file(&mut self) -> Option<SelectedFile> {
        self.file.take()
    }

    /// Only bank transfer is offered; selecting card leaves the choice as is
    pub fn select_payment_method(&mut self, method: PaymentMethodType) -> Result<(), WizardError> {
        match method {
            PaymentMethodType::BankTransfer => {
                self.form.payment_method_type = method;
                Ok(())
            }
            PaymentMethodType::Card => Err(WizardError::PaymentMethodUnavailable),
        }
    }

    pub fn review_summary(&self) -> ReviewSummary {
        ReviewSummary {
            amount: self.form.amount,
            duration: self.form.duration,
            currency: self.form.currency,
            applicant: format!("{} {}", self.form.first_name.trim(), self.form.last_name.trim()),
            iban: self.form.iban.clone(),
            quote: compute_monthly_payment(
                self.form.amount as f64,
                self.form.duration,
                self.form.currency,
            ),
        }
    }

    fn reject(self, error: WizardError) -> Rejected {
        Rejected {
            wizard: self,
            error,
        }
    }

    /// Advance one step if the current step's fields are valid
    pub fn next(mut self) -> Result<Self, Rejected> {
        let (errors, to) = match self.step {
            WizardStep::PersonalInfo => (self.form.personal_info_errors(), WizardStep::PaymentMethod),
            WizardStep::PaymentMethod => (self.form.payment_method_errors(), WizardStep::Review),
            step @ (WizardStep::Review | WizardStep::Success) => {
                return Err(self.reject(WizardError::InvalidTransition {
                    action: "Next",
                    step,
                }))
            }
        };

        if !errors.is_empty() {
            return Err(self.reject(WizardError::InvalidFields(errors)));
        }

        self.step = to;
        Ok(self)
    }

    /// Go back one step, keeping every entered value. A submitted
    /// application cannot be reopened.
    pub fn back(mut self) -> Result<BackOutcome, Rejected> {
        match self.step {
            WizardStep::PersonalInfo => Ok(BackOutcome::ExitToCalculator(self.form.selection())),
            WizardStep::PaymentMethod => {
                self.step = WizardStep::PersonalInfo;
                Ok(BackOutcome::Step(self))
            }
            WizardStep::Review => {
                self.step = WizardStep::PaymentMethod;
                Ok(BackOutcome::Step(self))
            }
            WizardStep::Success => Err(self.reject(WizardError::InvalidTransition {
                action: "Back",
                step: WizardStep::Success,
            })),
        }
    }

    /// Upload the attached document (if any), then submit the application.
    ///
    /// The wizard is moved into the call, so the same application cannot be
    /// submitted twice concurrently. Failures leave it on the review step.
    pub async fn submit<G>(mut self, gateway: &G) -> Result<Self, Rejected>
    where
        G: SubmissionGateway + ?Sized,
    {
        if self.step != WizardStep::Review {
            let step = self.step;
            return Err(self.reject(WizardError::InvalidTransition {
                action: "Submit",
                step,
            }));
        }
        if !self.form.terms_accepted {
            return Err(self.reject(WizardError::TermsNotAccepted));
        }
        if let Err(errors) = self.form.to_request(None) {
            return Err(self.reject(WizardError::InvalidFields(errors)));
        }

        let upload = match &self.file {
            Some(file) => Some(gateway.upload_file(file).await),
            None => None,
        };
        let identity_file_url = match upload {
            Some(Ok(uploaded)) => Some(uploaded.url),
            Some(Err(e)) => return Err(self.reject(WizardError::SubmissionFailed(e.to_string()))),
            None => None,
        };

        let request = match self.form.to_request(identity_file_url) {
            Ok(request) => request,
            Err(errors) => return Err(self.reject(WizardError::InvalidFields(errors))),
        };

        match gateway.submit_application(&request).await {
            Ok(application) => {
                tracing::info!(application_id = application.id, "Loan application submitted");
                self.confirmation = Some(application);
                self.step = WizardStep::Success;
                Ok(self)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Loan application submission failed");
                Err(self.reject(WizardError::SubmissionFailed(e.to_string())))
            }
        }
    }
}
