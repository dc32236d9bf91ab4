use serde_json::Value;

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";

/// API keys for the three hosted services. Data loading stays disabled
/// until all of them are present.
#[derive(Clone, Default)]
pub struct Credentials {
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "****"))
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "****"))
            .field("pinecone_api_key", &self.pinecone_api_key.as_ref().map(|_| "****"))
            .finish()
    }
}

impl Credentials {
    /// Reads keys from the process environment, falling back to the
    /// `credentials` section of the merged config (normally `secrets.yaml`).
    pub fn resolve(config: &Value) -> Self {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(config: &Value, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = config.get("credentials");
        let read = |env_name: &str| {
            lookup(env_name)
                .or_else(|| {
                    section
                        .and_then(|s| s.get(env_name.to_lowercase()))
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            google_api_key: read(GOOGLE_API_KEY),
            groq_api_key: read(GROQ_API_KEY),
            pinecone_api_key: read(PINECONE_API_KEY),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_api_key.is_none() {
            missing.push(GOOGLE_API_KEY);
        }
        if self.groq_api_key.is_none() {
            missing.push(GROQ_API_KEY);
        }
        if self.pinecone_api_key.is_none() {
            missing.push(PINECONE_API_KEY);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}
