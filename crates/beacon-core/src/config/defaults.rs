// Single source of truth for all default values.

// --- Sync ---
pub const DEFAULT_SOURCE_PAGE_SIZE: usize = 100;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ALLOW_EMPTY_REPLACE: bool = false;
pub const DEFAULT_SOURCE_API_KEY_ENV: &str = "BEACON_SOURCE_API_KEY";

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "tfidf";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 20;
pub const DEFAULT_EMBEDDING_STAGGER_MS: u64 = 50;
pub const DEFAULT_EMBEDDING_BATCH_DELAY_MS: u64 = 250;
pub const DEFAULT_EMBEDDING_MAX_RETRIES: u32 = 2;
pub const DEFAULT_QUERY_CACHE_TTL_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_EMBEDDING_API_KEY_ENV: &str = "OPENAI_API_KEY";

// --- Retrieval ---
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_TOP_K: usize = 5;

// --- Answer ---
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GENERATION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_GENERATION_MAX_TOKENS: usize = 1_024;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_QUESTION_CHARS: usize = 2_000;

// --- Query ---
pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_QUESTION_LOG_CAPACITY: usize = 10_000;
