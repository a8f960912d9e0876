//! External collaborators: image storage and the vision inference service

pub mod image_storage;
pub mod vision;

pub use vision::VisionClient;
