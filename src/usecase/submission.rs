use crate::domain::{
    models::registration::Registration,
    services::notifier::{Notification, Severity},
};

/// Why a submission stopped. The form stays blocked until acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    IncompleteFields,
    InvalidNationalId,
    DuplicateNationalId,
    /// The duplicate query itself failed
    LookupFailed,
    /// Carries the gateway's message when it sent one
    UploadFailed(Option<String>),
    PersistenceFailed,
}

impl BlockReason {
    pub fn notification(&self) -> Notification {
        match self {
            BlockReason::IncompleteFields => Notification::new("Incomplete fields", Severity::Warning)
                .with_description("Please fill in the required fields (*)."),
            BlockReason::InvalidNationalId => Notification::new("Invalid ID", Severity::Error)
                .with_description("The national ID number entered is not valid."),
            BlockReason::DuplicateNationalId => {
                Notification::new("ID already registered", Severity::Error)
            }
            BlockReason::UploadFailed(message) => Notification::new("Upload failed", Severity::Error)
                .with_description(message.as_deref().unwrap_or("Image upload failed.")),
            BlockReason::LookupFailed | BlockReason::PersistenceFailed => {
                Notification::new("Error", Severity::Error)
                    .with_description("An error occurred during registration.")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    AwaitingConfirmation,
    CheckingDuplicate,
    Uploading,
    Persisting,
    Blocked(BlockReason),
}

impl SubmissionState {
    /// A workflow owns the form
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, SubmissionState::Idle | SubmissionState::Blocked(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Registered(Registration),
    /// Declined to continue without a photo
    Cancelled,
    Blocked(BlockReason),
    /// Another submission was already running, or the form is still blocked
    Ignored,
}

pub fn success_notification() -> Notification {
    Notification::new("Success!", Severity::Success)
        .with_description("Registration completed successfully.")
}
