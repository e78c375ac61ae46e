pub mod chart_renderer;
pub mod completion;
pub mod csv_exporter;
pub mod retry;
pub mod sentiment_service;

pub use chart_renderer::ChartRenderer;
pub use completion::{CompletionBackend, OpenAiBackend};
pub use csv_exporter::CsvExporter;
pub use retry::RetryPolicy;
pub use sentiment_service::SentimentService;
