pub mod entity;
pub mod http_image_uploader;
pub mod local_media_store;
pub mod registration_repository;
