use serde_json::{Map, Value};
use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(sources) = expect_optional_object(root, "sources")? {
        validate_string_array_field(sources, "sources.pdf_urls", "pdf_urls")?;
        validate_optional_string_field(
            sources,
            "sources.undergraduate_courses_url",
            "undergraduate_courses_url",
        )?;
        validate_optional_string_field(
            sources,
            "sources.graduate_courses_url",
            "graduate_courses_url",
        )?;
        validate_string_array_field(
            sources,
            "sources.undergraduate_codes",
            "undergraduate_codes",
        )?;
        validate_string_array_field(sources, "sources.graduate_codes", "graduate_codes")?;
    }

    if let Some(ingest) = expect_optional_object(root, "ingest")? {
        validate_u64_field(ingest, "ingest.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(ingest, "ingest.chunk_overlap", "chunk_overlap", 0, 1_000_000)?;
        validate_u64_field(
            ingest,
            "ingest.fetch_concurrency",
            "fetch_concurrency",
            1,
            64,
        )?;
        validate_u64_field(
            ingest,
            "ingest.fetch_timeout_secs",
            "fetch_timeout_secs",
            1,
            86_400,
        )?;
        validate_u64_field(ingest, "ingest.embed_batch_size", "embed_batch_size", 1, 100)?;
        validate_u64_field(
            ingest,
            "ingest.upsert_batch_size",
            "upsert_batch_size",
            1,
            1_000,
        )?;

        let size = ingest
            .get("chunk_size")
            .and_then(|v| v.as_u64())
            .unwrap_or(super::defaults::CHUNK_SIZE as u64);
        let overlap = ingest
            .get("chunk_overlap")
            .and_then(|v| v.as_u64())
            .unwrap_or(super::defaults::CHUNK_OVERLAP as u64);
        if overlap >= size {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at 'ingest.chunk_overlap': must be smaller than chunk_size ({})",
                size
            )));
        }
    }

    if let Some(index) = expect_optional_object(root, "vector_index")? {
        validate_optional_string_field(index, "vector_index.index_name", "index_name")?;
        validate_optional_string_field(index, "vector_index.namespace", "namespace")?;
        validate_u64_field(index, "vector_index.dimension", "dimension", 1, 20_000)?;
        validate_optional_string_field(index, "vector_index.metric", "metric")?;
        validate_u64_field(
            index,
            "vector_index.readiness_attempts",
            "readiness_attempts",
            1,
            1_000,
        )?;
    }

    if let Some(chat) = expect_optional_object(root, "chat")? {
        validate_optional_string_field(chat, "chat.model", "model")?;
        validate_f64_field(chat, "chat.temperature", "temperature", 0.0, 2.0)?;
        validate_f64_field(chat, "chat.top_p", "top_p", 0.0, 1.0)?;
        validate_u64_field(chat, "chat.max_tokens", "max_tokens", 1, 131_072)?;
        validate_u64_field(chat, "chat.top_k", "top_k", 1, 100)?;
        validate_u64_field(chat, "chat.history_window", "history_window", 0, 1_000)?;
        validate_string_array_field(chat, "chat.stop", "stop")?;
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_optional_string_field(logging, "logging.level", "level")?;
        validate_optional_string_field(logging, "logging.directory", "directory")?;
        validate_non_empty_string_field(logging, "logging.file_name", "file_name")?;
        if let Some(rotation) = logging.get("rotation") {
            match rotation.as_str() {
                Some("daily" | "hourly" | "never") => {}
                Some(other) => {
                    return Err(ApiError::BadRequest(format!(
                        "Invalid config at 'logging.rotation': unknown rotation '{}' (daily, hourly or never)",
                        other
                    )));
                }
                None => return Err(config_type_error("logging.rotation", "string")),
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_non_empty_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    validate_optional_string_field(section, path, key)?;
    match section.get(key).and_then(Value::as_str) {
        Some(text) if text.trim().is_empty() => Err(ApiError::BadRequest(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        ))),
        _ => Ok(()),
    }
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
