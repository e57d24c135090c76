pub mod gemini;
pub mod relay;

pub use gemini::GeminiBackend;
pub use relay::RelayClient;
