pub const SERVER_HOST: &str = "127.0.0.1";
pub const SERVER_PORT: u16 = 8501;

pub const PDF_URLS: [&str; 2] = [
    "https://catalog.uconn.edu/pdf/undergraduate-catalog.pdf",
    "https://catalog.grad.uconn.edu/pdf/graduate-catalog.pdf",
];
pub const UNDERGRADUATE_COURSES_URL: &str = "https://catalog.uconn.edu/undergraduate/courses/";
pub const GRADUATE_COURSES_URL: &str = "https://catalog.grad.uconn.edu/graduate-courses/";

pub const UNDERGRADUATE_CODES: [&str; 12] = [
    "acct", "bme", "cse", "econ", "ece", "fnce", "math", "mgmt", "mkt", "opim", "phys", "stat",
];
pub const GRADUATE_CODES: [&str; 8] = [
    "acct", "bme", "cse", "econ", "ece", "fnce", "opim", "stat",
];

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;
pub const FETCH_CONCURRENCY: usize = 1;
pub const FETCH_TIMEOUT_SECS: u64 = 60;
pub const EMBED_BATCH_SIZE: usize = 100;
pub const UPSERT_BATCH_SIZE: usize = 100;

pub const INDEX_NAME: &str = "uconn-course-catalog";
pub const NAMESPACE: &str = "course_catalog";
pub const EMBEDDING_DIMENSION: usize = 768;
pub const METRIC: &str = "cosine";
pub const CLOUD: &str = "aws";
pub const REGION: &str = "us-east-1";
pub const PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
pub const READINESS_ATTEMPTS: u32 = 30;
pub const READINESS_INTERVAL_MS: u64 = 2_000;

pub const EMBEDDING_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const EMBEDDING_MODEL: &str = "models/embedding-001";

pub const CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const CHAT_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const TEMPERATURE: f64 = 0.2;
pub const MAX_TOKENS: u32 = 1024;
pub const TOP_P: f64 = 0.9;
pub const STOP_SEQUENCE: &str = "\nUser:";
pub const RETRIEVAL_TOP_K: usize = 5;
pub const HISTORY_WINDOW: usize = 6;

pub const LOG_LEVEL: &str = "info";
pub const LOG_DIRECTORY: &str = "logs";
pub const LOG_FILE_NAME: &str = "catalog-advisor.log";

pub fn local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8501".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}
