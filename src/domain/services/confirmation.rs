use async_trait::async_trait;

/// Yes/no decision asked of the registrant in the middle of a submission
#[async_trait]
pub trait SubmissionConfirmation {
    /// `true` to go on without a photo (and without the bonus entry)
    async fn confirm_without_image(&self) -> bool;
}
