use crate::config::Config;
use crate::error::{AbrError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_engine(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_search(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AbrError::ConfigValidation { errors })
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

    fn validate_engine(config: &Config, errors: &mut Vec<ValidationError>) {
        let endpoint = &config.engine.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(ValidationError::new(
                "engine.endpoint",
                format!("Endpoint must be an http(s) URL: {}", endpoint),
            ));
        }

        if config.engine.index.is_empty() {
            errors.push(ValidationError::new(
                "engine.index",
                "Index name must not be empty",
            ));
        }

        if config.engine.password_env.is_empty() {
            errors.push(ValidationError::new(
                "engine.password_env",
                "Password environment variable name must not be empty",
            ));
        }

        if config.engine.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "engine.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name must not be empty",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.search.k == 0 {
            errors.push(ValidationError::new(
                "search.k",
                "k must be greater than 0",
            ));
        }

        if config.search.template_id.is_empty() {
            errors.push(ValidationError::new(
                "search.template_id",
                "Template id must not be empty",
            ));
        }

        if config.search.vector_field.is_empty() {
            errors.push(ValidationError::new(
                "search.vector_field",
                "Vector field must not be empty",
            ));
        }
    }
}
