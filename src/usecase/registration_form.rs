use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        error::{DomainError, RepositoryError},
        models::{
            draft::{ImageFile, RegistrationDraft},
            national_id::NationalId,
            registration::{Employer, Registration},
        },
        repositories::registration_repository::RegistrationRepository,
        services::{
            confirmation::SubmissionConfirmation,
            image_uploader::ImageUploader,
            notifier::{Notification, Notifier, Severity},
        },
    },
    usecase::submission::{BlockReason, SubmissionState, SubmitOutcome, success_notification},
};

#[derive(Debug, Default)]
struct FormState {
    draft: RegistrationDraft,
    status: SubmissionState,
}

enum Completion {
    Registered(Registration),
    Cancelled,
}

/// One registration form instance: the draft being edited plus the submit workflow.
///
/// At most one submission runs at a time. While it runs, edits and further
/// submits are refused.
pub struct RegistrationForm<
    R: RegistrationRepository,
    U: ImageUploader,
    C: SubmissionConfirmation,
    N: Notifier,
> {
    registration_repository: R,
    image_uploader: U,
    confirmation: C,
    notifier: N,
    max_image_bytes: usize,
    state: Mutex<FormState>,
}

impl<R, U, C, N> RegistrationForm<R, U, C, N>
where
    R: RegistrationRepository + Send + Sync,
    U: ImageUploader + Send + Sync,
    C: SubmissionConfirmation + Send + Sync,
    N: Notifier + Send + Sync,
{
    pub fn new(
        registration_repository: R,
        image_uploader: U,
        confirmation: C,
        notifier: N,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            registration_repository,
            image_uploader,
            confirmation,
            notifier,
            max_image_bytes,
            state: Mutex::new(FormState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, status: SubmissionState) {
        debug!(?status, "registration form transition");
        self.lock().status = status;
    }

    fn edit<T>(&self, apply: impl FnOnce(&mut RegistrationDraft) -> T) -> Result<T, DomainError> {
        let mut state = self.lock();
        if state.status.is_in_flight() {
            return Err(DomainError::FormBusy);
        }
        Ok(apply(&mut state.draft))
    }

    pub fn status(&self) -> SubmissionState {
        self.lock().status.clone()
    }

    pub fn draft(&self) -> RegistrationDraft {
        self.lock().draft.clone()
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn set_full_name(&self, value: &str) -> Result<(), DomainError> {
        self.edit(|draft| draft.set_full_name(value))
    }

    /// Returns the masked value to display back in the field
    pub fn set_national_id(&self, raw: &str) -> Result<String, DomainError> {
        self.edit(|draft| {
            draft.set_national_id(raw);
            draft.national_id().to_string()
        })
    }

    pub fn select_employer(&self, employer: Option<Employer>) -> Result<(), DomainError> {
        self.edit(|draft| draft.select_employer(employer))
    }

    pub fn attach_image(&self, image: ImageFile) -> Result<(), DomainError> {
        let max = self.max_image_bytes;
        let result = self.edit(|draft| draft.attach_image(image, max))?;

        if let Err(DomainError::ImageTooLarge { .. }) = &result {
            self.notifier.notify(
                Notification::new("File too large", Severity::Error).with_description(format!(
                    "The maximum allowed image size is {} MB.",
                    max / (1024 * 1024)
                )),
            );
        }
        result
    }

    pub fn clear_image(&self) -> Result<(), DomainError> {
        self.edit(RegistrationDraft::clear_image)
    }

    /// Clears every field, including the selected file
    pub fn reset_draft(&self) -> Result<(), DomainError> {
        self.edit(RegistrationDraft::reset)
    }

    /// Leave a blocked state once the registrant has seen why
    pub fn acknowledge(&self) {
        let mut state = self.lock();
        if matches!(state.status, SubmissionState::Blocked(_)) {
            state.status = SubmissionState::Idle;
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let draft = {
            let mut state = self.lock();
            if state.status != SubmissionState::Idle {
                debug!(status = ?state.status, "submit ignored");
                return SubmitOutcome::Ignored;
            }
            state.status = SubmissionState::Validating;
            state.draft.clone()
        };

        match self.run(draft).await {
            Ok(Completion::Registered(registration)) => {
                info!(
                    id = %registration.id(),
                    employer = registration.employer().value(),
                    has_bonus = registration.has_bonus(),
                    "registration persisted"
                );
                {
                    let mut state = self.lock();
                    state.draft.reset();
                    state.status = SubmissionState::Idle;
                }
                self.notifier.notify(success_notification());
                SubmitOutcome::Registered(registration)
            }
            Ok(Completion::Cancelled) => {
                self.transition(SubmissionState::Idle);
                SubmitOutcome::Cancelled
            }
            Err(reason) => {
                warn!(?reason, "registration blocked");
                self.transition(SubmissionState::Blocked(reason.clone()));
                self.notifier.notify(reason.notification());
                SubmitOutcome::Blocked(reason)
            }
        }
    }

    async fn run(&self, draft: RegistrationDraft) -> Result<Completion, BlockReason> {
        let employer = match draft.employer() {
            Some(employer) if draft.is_complete() => employer,
            _ => return Err(BlockReason::IncompleteFields),
        };
        let national_id =
            NationalId::parse(draft.national_id()).map_err(|_| BlockReason::InvalidNationalId)?;

        if draft.image().is_none() {
            self.transition(SubmissionState::AwaitingConfirmation);
            if !self.confirmation.confirm_without_image().await {
                return Ok(Completion::Cancelled);
            }
        }

        self.transition(SubmissionState::CheckingDuplicate);
        let already_registered = self
            .registration_repository
            .exists_by_national_id(&national_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "duplicate check failed");
                BlockReason::LookupFailed
            })?;
        if already_registered {
            return Err(BlockReason::DuplicateNationalId);
        }

        let image_url = match draft.image() {
            Some(image) => {
                self.transition(SubmissionState::Uploading);
                let url = self.image_uploader.upload(image).await.map_err(|e| {
                    warn!(error = %e, file = image.file_name(), "image upload failed");
                    BlockReason::UploadFailed(e.gateway_message().map(str::to_string))
                })?;
                Some(url)
            }
            None => None,
        };

        self.transition(SubmissionState::Persisting);
        let registration = Registration::new(
            draft.full_name(),
            national_id,
            employer,
            image_url,
            Utc::now(),
        )
        .map_err(|_| BlockReason::IncompleteFields)?;

        // an upload that succeeded above stays on the media host if this fails
        self.registration_repository
            .insert(&registration)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict => BlockReason::DuplicateNationalId,
                other => {
                    warn!(error = %other, "persisting registration failed");
                    BlockReason::PersistenceFailed
                }
            })?;

        Ok(Completion::Registered(registration))
    }
}
