//! Image upload storage and serving.
//!
//! Stands in for hosted blob storage: uploaded equation photos land in a
//! local media directory and are served back over HTTP by ID.

pub mod image_store;
pub mod media_server;
pub mod mime_detect;

pub use image_store::{ImageStore, StoredImage, to_data_url};
pub use media_server::media_router;
pub use mime_detect::{extension_for_mime, is_image, mime_for_extension};
