pub mod normalizer;
pub mod preprocess;
pub mod providers;
pub mod upload;

pub use normalizer::{normalize, NormalizeError};
pub use preprocess::PreprocessError;
pub use providers::{ProviderError, VisionProvider};
pub use upload::{UploadError, UploadedImage};
