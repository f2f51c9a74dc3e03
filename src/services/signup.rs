// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multi-step sign-up wizard.
//!
//! The wizard is a fixed sequence of steps in which two steps are shown only
//! for some answers to the looking-for question. Navigation walks the
//! sequence skipping hidden steps, so there is no index arithmetic.

use crate::config::Config;
use crate::db::DataStore;
use crate::error::AppError;
use crate::models::{split_tags, Account, NewProfile, UserRoles};
use crate::services::auth_events::AuthEvents;
use crate::services::identity::IdentityProvider;
use crate::services::profiles::ProfileService;
use crate::storage::{keys, ClientStorage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{ValidateEmail, ValidateUrl};

/// Seconds the client waits on the success screen before moving on.
pub const COMPLETION_REDIRECT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignupStep {
    BasicInfo,
    LookingFor,
    FounderDetails,
    JobDetails,
    AdditionalQuestions,
    Terms,
}

impl SignupStep {
    /// Every step in display order.
    pub const ALL: [SignupStep; 6] = [
        SignupStep::BasicInfo,
        SignupStep::LookingFor,
        SignupStep::FounderDetails,
        SignupStep::JobDetails,
        SignupStep::AdditionalQuestions,
        SignupStep::Terms,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Whether this step is part of the flow for the given answers.
    pub fn is_shown(self, form: &SignupForm) -> bool {
        match self {
            SignupStep::FounderDetails => form.is_founder(),
            SignupStep::JobDetails => form.is_job_seeker(),
            _ => true,
        }
    }

    /// Next shown step, or `None` on the last step.
    pub fn next(self, form: &SignupForm) -> Option<SignupStep> {
        Self::ALL[self.position() + 1..]
            .iter()
            .copied()
            .find(|s| s.is_shown(form))
    }

    /// Previous shown step, or `None` on the first step.
    pub fn previous(self, form: &SignupForm) -> Option<SignupStep> {
        Self::ALL[..self.position()]
            .iter()
            .rev()
            .copied()
            .find(|s| s.is_shown(form))
    }

    pub fn title(self) -> &'static str {
        match self {
            SignupStep::BasicInfo => "Basic Information",
            SignupStep::LookingFor => "What are you looking for?",
            SignupStep::FounderDetails => "Tell us about your startup",
            SignupStep::JobDetails => "Tell us about your job interests",
            SignupStep::AdditionalQuestions => "Additional Matching Questions",
            SignupStep::Terms => "Final Steps",
        }
    }

    /// Fields that must be filled before leaving this step (form field names).
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            SignupStep::BasicInfo => &[
                "fullName",
                "email",
                "password",
                "confirmPassword",
                "major",
                "year",
                "interests",
                "skills",
            ],
            SignupStep::LookingFor => &["lookingFor"],
            SignupStep::FounderDetails => &[
                "founderType",
                "startupIdea",
                "rolesLookingFor",
                "founderSkills",
                "startupStage",
            ],
            SignupStep::JobDetails => &["interestedRoles", "experience"],
            SignupStep::AdditionalQuestions => &[],
            SignupStep::Terms => &["agreeToTerms"],
        }
    }
}

/// Answers to the looking-for question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookingFor {
    FounderLookingCofounder,
    FounderLookingTalent,
    LookingJob,
    LookingResources,
}

/// Everything the wizard collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    // Basic information
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub major: String,
    pub year: String,
    /// Comma-separated
    pub interests: String,
    /// Comma-separated
    pub skills: String,
    pub linkedin: String,
    pub twitter: String,

    pub looking_for: Vec<LookingFor>,

    // Founder details
    pub founder_type: String,
    pub startup_name: String,
    pub startup_idea: String,
    pub roles_looking_for: String,
    pub founder_skills: String,
    pub startup_stage: String,

    // Job details
    pub interested_roles: String,
    pub experience: String,

    // Additional questions
    pub industries: String,
    pub commitment: String,

    pub agree_to_terms: bool,
}

impl SignupForm {
    pub fn is_founder(&self) -> bool {
        self.looking_for.iter().any(|l| {
            matches!(
                l,
                LookingFor::FounderLookingCofounder | LookingFor::FounderLookingTalent
            )
        })
    }

    pub fn is_job_seeker(&self) -> bool {
        self.looking_for.contains(&LookingFor::LookingJob)
    }

    /// Whether a named field holds a non-blank value.
    pub fn is_filled(&self, field: &str) -> bool {
        let text = match field {
            "fullName" => &self.full_name,
            "email" => &self.email,
            "password" => &self.password,
            "confirmPassword" => &self.confirm_password,
            "major" => &self.major,
            "year" => &self.year,
            "interests" => &self.interests,
            "skills" => &self.skills,
            "linkedin" => &self.linkedin,
            "twitter" => &self.twitter,
            "lookingFor" => return !self.looking_for.is_empty(),
            "founderType" => &self.founder_type,
            "startupName" => &self.startup_name,
            "startupIdea" => &self.startup_idea,
            "rolesLookingFor" => &self.roles_looking_for,
            "founderSkills" => &self.founder_skills,
            "startupStage" => &self.startup_stage,
            "interestedRoles" => &self.interested_roles,
            "experience" => &self.experience,
            "industries" => &self.industries,
            "commitment" => &self.commitment,
            "agreeToTerms" => return self.agree_to_terms,
            _ => return false,
        };
        !text.trim().is_empty()
    }

    pub fn apply(&mut self, patch: SignupFormPatch) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut self.full_name, patch.full_name);
        set(&mut self.email, patch.email);
        set(&mut self.password, patch.password);
        set(&mut self.confirm_password, patch.confirm_password);
        set(&mut self.major, patch.major);
        set(&mut self.year, patch.year);
        set(&mut self.interests, patch.interests);
        set(&mut self.skills, patch.skills);
        set(&mut self.linkedin, patch.linkedin);
        set(&mut self.twitter, patch.twitter);
        if let Some(looking_for) = patch.looking_for {
            self.looking_for = looking_for;
        }
        set(&mut self.founder_type, patch.founder_type);
        set(&mut self.startup_name, patch.startup_name);
        set(&mut self.startup_idea, patch.startup_idea);
        set(&mut self.roles_looking_for, patch.roles_looking_for);
        set(&mut self.founder_skills, patch.founder_skills);
        set(&mut self.startup_stage, patch.startup_stage);
        set(&mut self.interested_roles, patch.interested_roles);
        set(&mut self.experience, patch.experience);
        set(&mut self.industries, patch.industries);
        set(&mut self.commitment, patch.commitment);
        if let Some(agree) = patch.agree_to_terms {
            self.agree_to_terms = agree;
        }
    }

    /// Profile row derived from the answers.
    pub fn to_new_profile(&self, account: &Account, university: &str) -> NewProfile {
        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        NewProfile {
            user_id: account.id.clone(),
            university: university.to_string(),
            full_name: optional(&self.full_name),
            bio: Some(format!("{} - {}", self.major.trim(), self.year.trim())),
            major: optional(&self.major),
            year: optional(&self.year),
            interests: Some(split_tags(&self.interests)),
            skills: Some(split_tags(&self.skills)),
            linkedin_url: optional(&self.linkedin),
            twitter_url: optional(&self.twitter),
        }
    }

    pub fn to_user_roles(&self, account: &Account) -> UserRoles {
        UserRoles {
            user_id: account.id.clone(),
            founder_looking_cofounder: self
                .looking_for
                .contains(&LookingFor::FounderLookingCofounder),
            founder_looking_talent: self.looking_for.contains(&LookingFor::FounderLookingTalent),
            looking_job: self.looking_for.contains(&LookingFor::LookingJob),
            looking_resources: self.looking_for.contains(&LookingFor::LookingResources),
        }
    }

    /// Copy with both password fields blanked, for responses.
    pub fn redacted(&self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self.clone()
        }
    }
}

/// Partial form update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupFormPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub interests: Option<String>,
    pub skills: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub looking_for: Option<Vec<LookingFor>>,
    pub founder_type: Option<String>,
    pub startup_name: Option<String>,
    pub startup_idea: Option<String>,
    pub roles_looking_for: Option<String>,
    pub founder_skills: Option<String>,
    pub startup_stage: Option<String>,
    pub interested_roles: Option<String>,
    pub experience: Option<String>,
    pub industries: Option<String>,
    pub commitment: Option<String>,
    pub agree_to_terms: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SignupStatus {
    Editing,
    /// Account created; the client moves on after a short pause.
    #[serde(rename_all = "camelCase")]
    Completed {
        redirect_to: String,
        redirect_after_secs: u64,
    },
}

/// Wizard state kept in client storage between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupWizard {
    pub step: SignupStep,
    pub form: SignupForm,
    pub status: SignupStatus,
    /// Inline error from the last action
    pub error: Option<String>,
}

impl Default for SignupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupWizard {
    pub fn new() -> Self {
        Self {
            step: SignupStep::BasicInfo,
            form: SignupForm::default(),
            status: SignupStatus::Editing,
            error: None,
        }
    }

    /// Load the client's wizard, starting a fresh one when absent or unreadable.
    pub fn load(storage: &ClientStorage) -> Self {
        match storage.get_json::<SignupWizard>(keys::SIGNUP_WIZARD) {
            Ok(Some(wizard)) => wizard,
            Ok(None) => Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed sign-up wizard state");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &ClientStorage) -> Result<(), AppError> {
        storage
            .set_json(keys::SIGNUP_WIZARD, self)
            .map_err(|e| AppError::Internal(e.into()))
    }

    pub fn update(&mut self, patch: SignupFormPatch) {
        self.form.apply(patch);
        self.error = None;
    }

    /// Required fields of the current step that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.missing_fields_of(self.step)
    }

    fn missing_fields_of(&self, step: SignupStep) -> Vec<&'static str> {
        step.required_fields()
            .iter()
            .copied()
            .filter(|field| !self.form.is_filled(field))
            .collect()
    }

    /// First shown step with required fields still empty.
    ///
    /// Answers can change after a step was passed (the looking-for set
    /// decides which steps are shown), so this walks every shown step.
    pub fn first_incomplete_step(&self) -> Option<(SignupStep, Vec<&'static str>)> {
        SignupStep::ALL
            .iter()
            .copied()
            .filter(|step| step.is_shown(&self.form))
            .map(|step| (step, self.missing_fields_of(step)))
            .find(|(_, missing)| !missing.is_empty())
    }

    fn check_links(&self) -> Result<(), String> {
        let links = [
            ("LinkedIn", &self.form.linkedin),
            ("X", &self.form.twitter),
        ];
        for (label, link) in links {
            let link = link.trim().to_string();
            if !link.is_empty() && !link.validate_url() {
                return Err(format!("Please enter a valid {} link", label));
            }
        }
        Ok(())
    }

    /// Move forward, refusing while the current step is incomplete.
    pub fn advance(&mut self) -> Result<SignupStep, AppError> {
        if !matches!(self.status, SignupStatus::Editing) {
            return Err(AppError::BadRequest("Sign-up already completed".to_string()));
        }

        let missing = self.missing_fields();
        if !missing.is_empty() {
            let message = format!("Please complete the required fields: {}", missing.join(", "));
            self.error = Some(message.clone());
            return Err(AppError::BadRequest(message));
        }

        if self.step == SignupStep::BasicInfo {
            if let Err(message) = self.check_links() {
                self.error = Some(message.clone());
                return Err(AppError::BadRequest(message));
            }
        }

        let next = self
            .step
            .next(&self.form)
            .ok_or_else(|| AppError::BadRequest("Already on the final step".to_string()))?;
        self.step = next;
        self.error = None;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<SignupStep, AppError> {
        let previous = self
            .step
            .previous(&self.form)
            .ok_or_else(|| AppError::BadRequest("Already on the first step".to_string()))?;
        self.step = previous;
        self.error = None;
        Ok(previous)
    }

    /// 1-based position among the steps currently shown, and how many are shown.
    pub fn progress(&self) -> (usize, usize) {
        let shown: Vec<SignupStep> = SignupStep::ALL
            .iter()
            .copied()
            .filter(|s| s.is_shown(&self.form))
            .collect();
        let current = shown
            .iter()
            .position(|s| *s == self.step)
            .map_or(1, |i| i + 1);
        (current, shown.len())
    }

    fn fail(&mut self, message: impl Into<String>) -> AppError {
        let message = message.into();
        self.error = Some(message.clone());
        AppError::BadRequest(message)
    }
}

/// JSON view of the wizard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupView {
    pub step: SignupStep,
    pub title: &'static str,
    pub step_number: usize,
    pub total_steps: usize,
    pub form: SignupForm,
    pub missing_fields: Vec<&'static str>,
    pub can_go_back: bool,
    pub is_final_step: bool,
    pub status: SignupStatus,
    pub error: Option<String>,
}

impl From<&SignupWizard> for SignupView {
    fn from(wizard: &SignupWizard) -> Self {
        let (step_number, total_steps) = wizard.progress();
        Self {
            step: wizard.step,
            title: wizard.step.title(),
            step_number,
            total_steps,
            form: wizard.form.redacted(),
            missing_fields: wizard.missing_fields(),
            can_go_back: wizard.step.previous(&wizard.form).is_some(),
            is_final_step: wizard.step.next(&wizard.form).is_none(),
            status: wizard.status.clone(),
            error: wizard.error.clone(),
        }
    }
}

/// Creates accounts from completed wizards.
#[derive(Clone)]
pub struct SignupService {
    identity: Arc<dyn IdentityProvider>,
    db: Arc<dyn DataStore>,
    profiles: ProfileService,
    events: AuthEvents,
    university: String,
    email_suffix: String,
    callback_url: String,
}

impl SignupService {
    pub fn new(
        config: &Config,
        identity: Arc<dyn IdentityProvider>,
        db: Arc<dyn DataStore>,
        profiles: ProfileService,
        events: AuthEvents,
    ) -> Self {
        Self {
            identity,
            db,
            profiles,
            events,
            university: config.university.clone(),
            email_suffix: config.institution_email_suffix(),
            callback_url: config.callback_url(),
        }
    }

    /// Submit the final step.
    ///
    /// Validation and account-creation failures leave the wizard on its
    /// current step with `error` set. Once the account exists, profile,
    /// role and auto sign-in failures are logged and do not block completion.
    pub async fn submit(
        &self,
        storage: &ClientStorage,
        wizard: &mut SignupWizard,
    ) -> Result<Account, AppError> {
        if !matches!(wizard.status, SignupStatus::Editing) {
            return Err(AppError::BadRequest("Sign-up already completed".to_string()));
        }
        if wizard.step.next(&wizard.form).is_some() {
            return Err(wizard.fail("Please complete every step before submitting"));
        }
        if let Some((step, missing)) = wizard.first_incomplete_step() {
            wizard.step = step;
            return Err(wizard.fail(format!(
                "Please complete the required fields: {}",
                missing.join(", ")
            )));
        }

        let form = wizard.form.clone();
        if form.password != form.confirm_password {
            return Err(wizard.fail("Passwords don't match"));
        }

        let email = form.email.trim().to_string();
        if !email.validate_email() || !email.to_lowercase().ends_with(&self.email_suffix) {
            return Err(wizard.fail(format!(
                "Please use a {} email ({})",
                self.university, self.email_suffix
            )));
        }

        let result = match self
            .identity
            .sign_up(&email, &form.password, &self.callback_url)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                wizard.error = Some(e.user_message());
                return Err(e);
            }
        };

        let Some(account) = result
            .user
            .clone()
            .or_else(|| result.session.as_ref().map(|s| s.user.clone()))
        else {
            wizard.error = Some("Failed to register. Please try again.".to_string());
            return Err(AppError::IdentityUnavailable(
                "sign-up response carried no user".to_string(),
            ));
        };
        tracing::info!(user_id = %account.id, "Account created");

        self.profiles
            .create_profile(&account, form.to_new_profile(&account, &self.university))
            .await;

        if let Err(e) = self.db.upsert_user_roles(&form.to_user_roles(&account)).await {
            tracing::warn!(user_id = %account.id, error = %e, "Failed to store user roles");
        }

        let session = match result.session {
            Some(session) => Some(session),
            None => match self
                .identity
                .sign_in_with_password(&email, &form.password)
                .await
            {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(user_id = %account.id, error = %e, "Automatic sign-in after registration failed");
                    None
                }
            },
        };

        let redirect_to = match session {
            Some(session) => {
                if let Err(e) = storage.set_json(keys::PROVIDER_SESSION, &session) {
                    tracing::error!(error = %e, "Failed to store session");
                }
                storage.remove_item(keys::SESSION_ENVELOPE);
                self.events.signed_in(&session.user);
                "/dashboard"
            }
            None => {
                storage.set_item(keys::PENDING_VERIFICATION_EMAIL, email.as_str());
                storage.set_item(
                    keys::VERIFICATION_SENT_AT,
                    chrono::Utc::now().timestamp().to_string(),
                );
                "/auth/verification"
            }
        };

        wizard.form.password.clear();
        wizard.form.confirm_password.clear();
        wizard.error = None;
        wizard.status = SignupStatus::Completed {
            redirect_to: redirect_to.to_string(),
            redirect_after_secs: COMPLETION_REDIRECT_SECS,
        };
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(looking_for: &[LookingFor]) -> SignupForm {
        SignupForm {
            looking_for: looking_for.to_vec(),
            ..SignupForm::default()
        }
    }

    #[test]
    fn test_job_only_skips_founder_details() {
        let form = form_with(&[LookingFor::LookingJob]);
        assert_eq!(
            SignupStep::LookingFor.next(&form),
            Some(SignupStep::JobDetails)
        );
        assert_eq!(
            SignupStep::JobDetails.previous(&form),
            Some(SignupStep::LookingFor)
        );
    }

    #[test]
    fn test_founder_only_skips_job_details() {
        let form = form_with(&[LookingFor::FounderLookingTalent]);
        assert_eq!(
            SignupStep::LookingFor.next(&form),
            Some(SignupStep::FounderDetails)
        );
        assert_eq!(
            SignupStep::FounderDetails.next(&form),
            Some(SignupStep::AdditionalQuestions)
        );
        assert_eq!(
            SignupStep::AdditionalQuestions.previous(&form),
            Some(SignupStep::FounderDetails)
        );
    }

    #[test]
    fn test_resources_only_skips_both() {
        let form = form_with(&[LookingFor::LookingResources]);
        assert_eq!(
            SignupStep::LookingFor.next(&form),
            Some(SignupStep::AdditionalQuestions)
        );
        assert_eq!(
            SignupStep::AdditionalQuestions.previous(&form),
            Some(SignupStep::LookingFor)
        );
    }

    #[test]
    fn test_both_sections_shown_in_order() {
        let form = form_with(&[LookingFor::FounderLookingCofounder, LookingFor::LookingJob]);
        let mut step = SignupStep::BasicInfo;
        let mut visited = vec![step];
        while let Some(next) = step.next(&form) {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited, SignupStep::ALL.to_vec());
        assert_eq!(SignupStep::BasicInfo.previous(&form), None);
    }

    #[test]
    fn test_advance_requires_fields() {
        let mut wizard = SignupWizard::new();
        assert!(wizard.advance().is_err());
        assert_eq!(wizard.step, SignupStep::BasicInfo);
        assert!(wizard.missing_fields().contains(&"fullName"));
        assert!(wizard.error.is_some());

        wizard.step = SignupStep::LookingFor;
        assert_eq!(wizard.missing_fields(), vec!["lookingFor"]);
        wizard.update(SignupFormPatch {
            looking_for: Some(vec![LookingFor::LookingJob]),
            ..SignupFormPatch::default()
        });
        assert!(wizard.error.is_none());
        assert_eq!(wizard.advance().unwrap(), SignupStep::JobDetails);
    }

    #[test]
    fn test_late_looking_for_change_reopens_steps() {
        let mut wizard = SignupWizard::new();
        wizard.form = SignupForm {
            full_name: "Ada".to_string(),
            email: "ada@chapman.edu".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            major: "Math".to_string(),
            year: "junior".to_string(),
            interests: "AI".to_string(),
            skills: "Rust".to_string(),
            looking_for: vec![LookingFor::LookingResources],
            agree_to_terms: true,
            ..SignupForm::default()
        };
        wizard.step = SignupStep::Terms;
        assert!(wizard.first_incomplete_step().is_none());

        wizard.update(SignupFormPatch {
            looking_for: Some(vec![LookingFor::LookingJob]),
            ..SignupFormPatch::default()
        });
        let (step, missing) = wizard.first_incomplete_step().unwrap();
        assert_eq!(step, SignupStep::JobDetails);
        assert_eq!(missing, vec!["interestedRoles", "experience"]);
    }

    #[test]
    fn test_blank_text_is_not_filled() {
        let form = SignupForm {
            full_name: "   ".to_string(),
            ..SignupForm::default()
        };
        assert!(!form.is_filled("fullName"));
        assert!(!form.is_filled("unknownField"));
    }

    #[test]
    fn test_profile_derivation() {
        let form = SignupForm {
            full_name: "Ada Lovelace".to_string(),
            major: "Computer Science".to_string(),
            year: "junior".to_string(),
            interests: "AI, fintech,".to_string(),
            skills: "Rust".to_string(),
            ..SignupForm::default()
        };
        let account = Account {
            id: "u1".to_string(),
            email: "ada@chapman.edu".to_string(),
        };

        let profile = form.to_new_profile(&account, "Chapman University");
        assert_eq!(profile.bio.as_deref(), Some("Computer Science - junior"));
        assert_eq!(
            profile.interests,
            Some(vec!["AI".to_string(), "fintech".to_string()])
        );
        assert!(profile.linkedin_url.is_none());
    }

    #[test]
    fn test_progress_counts_shown_steps() {
        let mut wizard = SignupWizard::new();
        assert_eq!(wizard.progress(), (1, 4));

        wizard.form.looking_for = vec![LookingFor::LookingJob];
        wizard.step = SignupStep::JobDetails;
        assert_eq!(wizard.progress(), (3, 5));
    }

    #[test]
    fn test_wizard_json_shape() {
        let wizard = SignupWizard::new();
        let json = serde_json::to_value(SignupView::from(&wizard)).unwrap();
        assert_eq!(json["step"], "basic-info");
        assert_eq!(json["status"]["state"], "editing");
        assert_eq!(json["canGoBack"], false);
    }
}
