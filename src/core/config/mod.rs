pub mod credentials;
pub mod defaults;
pub mod paths;
pub mod service;
pub mod settings;
pub mod validation;

pub use credentials::Credentials;
pub use paths::AppPaths;
pub use service::ConfigService;
pub use settings::{
    AppConfig, ChatConfig, EmbeddingConfig, IngestConfig, LogRotation, LoggingConfig,
    ServerConfig, SourcesConfig, VectorIndexConfig,
};
