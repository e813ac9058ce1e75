use crate::client::LspClient;
use crate::types::{HoverResult, Location, Position};
use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::warn;

type CacheKey = (String, u32, u32);

/// Read-only adapter over a subprocess type server. All queries degrade to
/// `None`/empty on any protocol failure rather than propagating an error:
/// per the access rule, enrichment is best-effort and callers proceed
/// without it.
pub struct TypeServerAdapter {
    client: LspClient,
    hover_cache: DashMap<CacheKey, Option<HoverResult>>,
    definition_cache: DashMap<CacheKey, Option<Location>>,
    references_cache: DashMap<CacheKey, Vec<Location>>,
}

impl TypeServerAdapter {
    pub async fn start(
        command: &Path,
        args: &[String],
        root_uri: &str,
    ) -> Result<Self, crate::error::TypeServerError> {
        let client = LspClient::spawn(command, args, root_uri).await?;
        Ok(Self {
            client,
            hover_cache: DashMap::new(),
            definition_cache: DashMap::new(),
            references_cache: DashMap::new(),
        })
    }

    pub async fn hover(&self, file: &str, line: u32, column: u32) -> Option<HoverResult> {
        let key = (file.to_string(), line, column);
        if let Some(cached) = self.hover_cache.get(&key) {
            return cached.clone();
        }
        let params = serde_json::json!({
            "textDocument": {"uri": file_uri(file)},
            "position": {"line": line, "character": column},
        });
        let result = match self.client.request("textDocument/hover", params).await {
            Ok(value) => parse_hover(&value),
            Err(e) => {
                warn!(file, line, column, error = %e, "hover request failed, degrading to no enrichment");
                None
            }
        };
        self.hover_cache.insert(key, result.clone());
        result
    }

    pub async fn definition(&self, file: &str, line: u32, column: u32) -> Option<Location> {
        let key = (file.to_string(), line, column);
        if let Some(cached) = self.definition_cache.get(&key) {
            return cached.clone();
        }
        let params = serde_json::json!({
            "textDocument": {"uri": file_uri(file)},
            "position": {"line": line, "character": column},
        });
        let result = match self.client.request("textDocument/definition", params).await {
            Ok(value) => parse_single_location(&value),
            Err(e) => {
                warn!(file, line, column, error = %e, "definition request failed, degrading to none");
                None
            }
        };
        self.definition_cache.insert(key, result.clone());
        result
    }

    pub async fn references(&self, file: &str, line: u32, column: u32) -> Vec<Location> {
        let key = (file.to_string(), line, column);
        if let Some(cached) = self.references_cache.get(&key) {
            return cached.clone();
        }
        let params = serde_json::json!({
            "textDocument": {"uri": file_uri(file)},
            "position": {"line": line, "character": column},
            "context": {"includeDeclaration": false},
        });
        let result = match self.client.request("textDocument/references", params).await {
            Ok(value) => parse_locations(&value),
            Err(e) => {
                warn!(file, line, column, error = %e, "references request failed, degrading to empty");
                Vec::new()
            }
        };
        self.references_cache.insert(key, result.clone());
        result
    }
}

fn file_uri(path: &str) -> String {
    url::Url::from_file_path(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("file://{path}"))
}

fn parse_hover(value: &JsonValue) -> Option<HoverResult> {
    if value.is_null() {
        return None;
    }
    let contents = value.get("contents")?;
    let type_text = match contents {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(_) => contents.get("value")?.as_str()?.to_string(),
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    Some(HoverResult {
        type_text,
        docs: None,
    })
}

fn parse_single_location(value: &JsonValue) -> Option<Location> {
    let candidate = match value {
        JsonValue::Array(items) => items.first()?,
        JsonValue::Object(_) => value,
        _ => return None,
    };
    location_from_json(candidate)
}

fn parse_locations(value: &JsonValue) -> Vec<Location> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(location_from_json).collect())
        .unwrap_or_default()
}

fn location_from_json(value: &JsonValue) -> Option<Location> {
    let uri = value.get("uri").and_then(|v| v.as_str())?;
    let range = value.get("range")?;
    let start = range.get("start")?;
    let line = start.get("line")?.as_u64()? as u32;
    let column = start.get("character")?.as_u64()? as u32;
    Some(Location {
        file_path: uri.trim_start_matches("file://").to_string(),
        position: Position { line, column },
    })
}
