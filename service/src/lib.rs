pub mod clues;
pub mod generate;
pub mod request;
pub mod response;
pub mod store;

pub use generate::{ServiceError, handle_generate};
pub use request::{GenerationRequest, InputType, Mode, RequestError, WordInput};
pub use response::{GenerationResponse, PuzzleView};
pub use store::ArtifactStore;
