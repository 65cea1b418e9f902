use std::{
    io::{self, Write},
    path::Path,
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};

use crate::{
    domain::{
        error::DomainError,
        models::{draft::ImageFile, registration::Employer},
        repositories::registration_repository::RegistrationRepository,
        services::{
            confirmation::SubmissionConfirmation,
            image_uploader::ImageUploader,
            notifier::{Notification, Notifier, Severity},
        },
    },
    usecase::{
        registration_form::RegistrationForm,
        submission::{BlockReason, SubmissionState, SubmitOutcome},
    },
};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Console the interactive form reads answers from and prints notifications to
#[derive(Clone)]
pub struct TerminalConsole {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl TerminalConsole {
    pub fn stdin() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// `None` once stdin is closed
    pub async fn ask(&self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;
        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    async fn ask_yes_no(&self, prompt: &str) -> bool {
        matches!(
            self.ask(prompt).await,
            Ok(Some(answer)) if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
        )
    }
}

impl Notifier for TerminalConsole {
    fn notify(&self, notification: Notification) {
        match &notification.description {
            Some(description) => println!(
                "[{}] {}: {}",
                notification.severity, notification.title, description
            ),
            None => println!("[{}] {}", notification.severity, notification.title),
        }
    }
}

#[async_trait]
impl SubmissionConfirmation for TerminalConsole {
    async fn confirm_without_image(&self) -> bool {
        self.ask_yes_no(
            "Register without a photo? You will not get the bonus second chance in the game. [y/N] ",
        )
        .await
    }
}

/// Content type guessed from the file extension; `None` for anything that is not an image
pub fn image_content_type(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "png" => mime::IMAGE_PNG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "bmp" => mime::IMAGE_BMP.to_string(),
        "svg" => mime::IMAGE_SVG.to_string(),
        "webp" | "heic" | "avif" => format!("image/{extension}"),
        _ => return None,
    };
    Some(content_type)
}

/// Parse a 1-based menu choice
pub fn parse_employer_choice(answer: &str) -> Option<Employer> {
    let index: usize = answer.trim().parse().ok()?;
    Employer::ALL.get(index.checked_sub(1)?).copied()
}

fn too_large_notification(max_bytes: usize) -> Notification {
    Notification::new("File too large", Severity::Error).with_description(format!(
        "The maximum allowed image size is {} MB.",
        max_bytes / (1024 * 1024)
    ))
}

/// The size is checked on the file metadata so an oversized file is never read
async fn load_image(path: &Path, max_bytes: usize) -> Result<ImageFile, Notification> {
    let content_type = image_content_type(path).ok_or_else(|| {
        Notification::new("Unsupported file", Severity::Error)
            .with_description("Only image files can be attached.")
    })?;
    let unreadable = |e: io::Error| {
        Notification::new("Could not read file", Severity::Error).with_description(e.to_string())
    };
    let size = tokio::fs::metadata(path).await.map_err(unreadable)?.len();
    if size > max_bytes as u64 {
        return Err(too_large_notification(max_bytes));
    }
    let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    ImageFile::new(file_name, content_type, bytes).map_err(|e| {
        Notification::new("Unsupported file", Severity::Error).with_description(e.to_string())
    })
}

/// The form reports oversized images itself; every other refusal is shown here
fn attach_failure_notification(error: &DomainError) -> Option<Notification> {
    match error {
        DomainError::ImageTooLarge { .. } => None,
        other => Some(
            Notification::new("Could not attach file", Severity::Error)
                .with_description(other.to_string()),
        ),
    }
}

/// Drive the form from the terminal until the user stops or stdin closes
pub async fn run_registration_prompt<R, U, C, N>(
    form: &RegistrationForm<R, U, C, N>,
    console: &TerminalConsole,
) -> Result<(), PromptError>
where
    R: RegistrationRepository + Send + Sync,
    U: ImageUploader + Send + Sync,
    C: SubmissionConfirmation + Send + Sync,
    N: Notifier + Send + Sync,
{
    loop {
        form.reset_draft()?;
        println!("Sign up and take part in the Children's Day challenge!");

        let Some(full_name) = console.ask("Full name*: ").await? else {
            return Ok(());
        };
        form.set_full_name(&full_name)?;

        let Some(national_id) = console.ask("National ID (CPF)*: ").await? else {
            return Ok(());
        };
        let shown = form.set_national_id(&national_id)?;
        println!("  {shown}");

        for (idx, employer) in Employer::ALL.iter().enumerate() {
            println!("  {}) {}", idx + 1, employer.label());
        }
        let Some(choice) = console.ask("Select your employer*: ").await? else {
            return Ok(());
        };
        form.select_employer(parse_employer_choice(&choice))?;

        let Some(image_path) = console.ask("Photo path (empty to skip): ").await? else {
            return Ok(());
        };
        if !image_path.is_empty() {
            match load_image(Path::new(&image_path), form.max_image_bytes()).await {
                Ok(image) => {
                    if let Some(notification) = form
                        .attach_image(image)
                        .err()
                        .and_then(|e| attach_failure_notification(&e))
                    {
                        console.notify(notification);
                    }
                }
                Err(notification) => console.notify(notification),
            }
        }

        if let Some(image) = form.draft().image() {
            println!("  photo: {} ({} bytes)", image.file_name(), image.size());
        }

        let mut outcome = form.submit().await;
        // a failed photo upload can be retried without the photo
        while let SubmitOutcome::Blocked(BlockReason::UploadFailed(_)) = &outcome {
            form.acknowledge();
            if !console.ask_yes_no("Submit without the photo? [y/N] ").await {
                break;
            }
            form.clear_image()?;
            outcome = form.submit().await;
        }

        match outcome {
            SubmitOutcome::Registered(registration) => {
                println!(
                    "Registered {} ({}){}",
                    registration.full_name(),
                    registration.national_id().formatted(),
                    if registration.has_bonus() {
                        " with bonus entry"
                    } else {
                        ""
                    }
                );
            }
            SubmitOutcome::Blocked(_) => {
                if matches!(form.status(), SubmissionState::Blocked(_)) {
                    form.acknowledge();
                }
            }
            SubmitOutcome::Cancelled | SubmitOutcome::Ignored => {}
        }

        if !console.ask_yes_no("Register someone else? [y/N] ").await {
            return Ok(());
        }
    }
}
