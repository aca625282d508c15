pub mod extraction;

pub use extraction::{ExtractionRequest, ExtractionResponse, ExtractionResult};
