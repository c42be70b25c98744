use crate::config::Config;
use crate::error::{HrqaError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_server(config, &mut errors);
        Self::validate_openai(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_weaviate(config, &mut errors);
        Self::validate_chunking(config, &mut errors);
        Self::validate_ingest(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HrqaError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_server(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.server.host.is_empty() {
            errors.push(ValidationError::new("server.host", "Host cannot be empty"));
        }

        if config.server.upload_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "server.upload_dir",
                "Upload directory cannot be empty",
            ));
        }

        if config.server.max_upload_bytes == 0 {
            errors.push(ValidationError::new(
                "server.max_upload_bytes",
                "Upload limit must be greater than 0",
            ));
        }
    }

    fn validate_openai(config: &Config, errors: &mut Vec<ValidationError>) {
        if !Self::is_http_url(&config.openai.base_url) {
            errors.push(ValidationError::new(
                "openai.base_url",
                format!("URL must start with http:// or https://, got '{}'", config.openai.base_url),
            ));
        }

        if config.openai.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "openai.api_key_env",
                "API key variable name cannot be empty",
            ));
        }

        if config.openai.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "openai.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.dimensions == 0 {
            errors.push(ValidationError::new(
                "embedding.dimensions",
                "Vector dimension must be greater than 0",
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        for (path, model) in [
            ("llm.expansion_model", &config.llm.expansion_model),
            ("llm.rerank_model", &config.llm.rerank_model),
            ("llm.answer_model", &config.llm.answer_model),
        ] {
            if model.is_empty() {
                errors.push(ValidationError::new(path, "Model name cannot be empty"));
            }
        }
    }

    fn validate_weaviate(config: &Config, errors: &mut Vec<ValidationError>) {
        let collection = &config.weaviate.collection;
        // Weaviate class names must start with an uppercase letter
        if !collection
            .chars()
            .next()
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
            || !collection.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(ValidationError::new(
                "weaviate.collection",
                format!("Invalid collection name: '{}'", collection),
            ));
        }

        if config.weaviate.url_env.is_empty() || config.weaviate.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "weaviate",
                "Credential variable names cannot be empty",
            ));
        }

        if config.weaviate.init_timeout_secs == 0
            || config.weaviate.query_timeout_secs == 0
            || config.weaviate.insert_timeout_secs == 0
        {
            errors.push(ValidationError::new(
                "weaviate",
                "Timeouts must be greater than 0",
            ));
        }
    }

    fn validate_chunking(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.chunking.chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if config.chunking.overlap >= config.chunking.chunk_size {
            errors.push(ValidationError::new(
                "chunking.overlap",
                format!(
                    "Overlap ({}) must be smaller than chunk_size ({})",
                    config.chunking.overlap, config.chunking.chunk_size
                ),
            ));
        }
    }

    fn validate_ingest(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.ingest.batch_size == 0 {
            errors.push(ValidationError::new(
                "ingest.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.ingest.max_retries == 0 {
            errors.push(ValidationError::new(
                "ingest.max_retries",
                "At least one insert attempt is required",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.search_limit == 0 {
            errors.push(ValidationError::new(
                "retrieval.search_limit",
                "Search limit must be greater than 0",
            ));
        }

        if config.retrieval.context_size == 0 {
            errors.push(ValidationError::new(
                "retrieval.context_size",
                "Context size must be greater than 0",
            ));
        }

        let alpha = config.retrieval.alpha;
        if !(0.0..=1.0).contains(&alpha) {
            errors.push(ValidationError::new(
                "retrieval.alpha",
                format!("Alpha must be between 0.0 and 1.0, got {}", alpha),
            ));
        }

        if config.retrieval.rerank_preview_chars == 0 {
            errors.push(ValidationError::new(
                "retrieval.rerank_preview_chars",
                "Preview length must be greater than 0",
            ));
        }
    }

    fn is_http_url(s: &str) -> bool {
        s.starts_with("http://") || s.starts_with("https://")
    }
}
