pub mod confirmation;
pub mod image_uploader;
pub mod media_store;
pub mod notifier;
