//! Data sources: static JSON documents and a spreadsheet values API.
//!
//! Both produce the same normalized [`Table`] for a given schema.

use color_eyre::eyre::eyre;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{FetchFailure, SourceError};
use crate::schema::TableSchema;
use crate::table::Table;
use crate::{Entity, SourceKind};

/// Default endpoint of the spreadsheet values API.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Something that can produce the table for a schema.
pub trait DataSource: Send + Sync {
    /// Human readable description for logs and the status line.
    fn describe(&self) -> String;

    fn load(&self, schema: &TableSchema) -> Result<Table, SourceError>;
}

const BUNDLED_SKATERS: &str = include_str!("../data/skaters.json");
const BUNDLED_GOALIES: &str = include_str!("../data/goalies.json");
const BUNDLED_TEAMS: &str = include_str!("../data/teams.json");

/// Static JSON documents of the form `{"<record key>": [{...}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticSource {
    /// Sample data compiled into the binary
    Bundled,
    /// `<dir>/skaters.json`, `<dir>/goalies.json`, `<dir>/teams.json`
    Directory(PathBuf),
}

impl StaticSource {
    /// File name holding an entity's document.
    pub fn file_name(entity: Entity) -> String {
        format!("{}.json", entity.name())
    }

    pub fn path_for(dir: &Path, entity: Entity) -> PathBuf {
        dir.join(Self::file_name(entity))
    }

    fn bundled(entity: Entity) -> &'static str {
        match entity {
            Entity::Skaters => BUNDLED_SKATERS,
            Entity::Goalies => BUNDLED_GOALIES,
            Entity::Teams => BUNDLED_TEAMS,
        }
    }
}

impl DataSource for StaticSource {
    fn describe(&self) -> String {
        match self {
            StaticSource::Bundled => "bundled sample data".to_string(),
            StaticSource::Directory(dir) => dir.display().to_string(),
        }
    }

    fn load(&self, schema: &TableSchema) -> Result<Table, SourceError> {
        match self {
            StaticSource::Bundled => {
                let origin = format!("bundled {}", Self::file_name(schema.entity));
                parse_document(&origin, Self::bundled(schema.entity), schema)
            }
            StaticSource::Directory(dir) => {
                let path = Self::path_for(dir, schema.entity);
                let origin = path.display().to_string();
                debug!(path = %origin, "reading static data");
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| SourceError::fetch(origin.clone(), e))?;
                parse_document(&origin, &text, schema)
            }
        }
    }
}

/// Parse a static document and normalize its records.
pub fn parse_document(origin: &str, text: &str, schema: &TableSchema) -> Result<Table, SourceError> {
    let doc: Value = serde_json::from_str(text).map_err(|e| SourceError::parse(origin, e))?;
    let records = doc
        .get(&schema.record_key)
        .ok_or_else(|| SourceError::parse(origin, format!("missing key \"{}\"", schema.record_key)))?
        .as_array()
        .ok_or_else(|| {
            SourceError::parse(origin, format!("\"{}\" is not an array", schema.record_key))
        })?;

    let records = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            r.as_object()
                .cloned()
                .ok_or_else(|| SourceError::parse(origin, format!("record {} is not an object", i)))
        })
        .collect::<Result<Vec<Map<String, Value>>, _>>()?;

    Ok(Table::from_records(schema, &records))
}

/// Body of a values API response.
#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Absent when the range is empty
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Parse a values API response body. The first row is the header.
pub fn parse_value_range(origin: &str, body: &str, schema: &TableSchema) -> Result<Table, SourceError> {
    let range: ValueRange = serde_json::from_str(body).map_err(|e| SourceError::parse(origin, e))?;
    Ok(Table::from_values(schema, &range.values))
}

/// Spreadsheet values API: `GET {base}/{id}/values/{range}?key={api key}`.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
    ranges: HashMap<Entity, String>,
    timeout: Option<Duration>,
}

impl RemoteSource {
    /// Ranges default to the entity titles (`Skaters`, `Goalies`, `Teams`).
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            ranges: Entity::ALL
                .iter()
                .map(|e| (*e, e.title().to_string()))
                .collect(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_range(mut self, entity: Entity, range: impl Into<String>) -> Self {
        self.ranges.insert(entity, range.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn range(&self, entity: Entity) -> &str {
        self.ranges
            .get(&entity)
            .map(String::as_str)
            .unwrap_or_else(|| entity.title())
    }

    /// Request URL without the API key, used in logs and errors.
    pub fn url(&self, entity: Entity) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(self.range(entity))
        )
    }
}

impl DataSource for RemoteSource {
    fn describe(&self) -> String {
        format!("spreadsheet {}", self.spreadsheet_id)
    }

    fn load(&self, schema: &TableSchema) -> Result<Table, SourceError> {
        let url = self.url(schema.entity);
        debug!(url = %url, "requesting range");

        let mut request = ureq::get(&url).query("key", &self.api_key);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, response) => SourceError::fetch(
                url.clone(),
                FetchFailure::Status {
                    code,
                    text: response.status_text().to_string(),
                },
            ),
            ureq::Error::Transport(t) => {
                SourceError::fetch(url.clone(), FetchFailure::Transport(transport_message(&t)))
            }
        })?;

        let body = response
            .into_string()
            .map_err(|e| SourceError::parse(url.clone(), e))?;
        parse_value_range(&url, &body, schema)
    }
}

/// Describe a transport failure without the request URL, whose query
/// string carries the API key.
fn transport_message(transport: &ureq::Transport) -> String {
    let mut parts = vec![transport.kind().to_string()];
    if let Some(message) = transport.message() {
        parts.push(message.to_string());
    }
    if let Some(source) = std::error::Error::source(transport) {
        parts.push(source.to_string());
    }
    parts.join(": ")
}

/// Build the data source selected by the configuration.
pub fn from_config(config: &SourceConfig) -> color_eyre::Result<Box<dyn DataSource>> {
    let kind = SourceKind::from_name(&config.kind)
        .ok_or_else(|| eyre!("Invalid source kind: {}. Must be 'static' or 'remote'", config.kind))?;

    let source: Box<dyn DataSource> = match kind {
        SourceKind::Static => match &config.data_dir {
            Some(dir) => Box::new(StaticSource::Directory(dir.clone())),
            None => Box::new(StaticSource::Bundled),
        },
        SourceKind::Remote => {
            let remote = &config.remote;
            let spreadsheet_id = remote
                .spreadsheet_id
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| eyre!("The remote source needs a spreadsheet id (--spreadsheet-id or [source.remote] spreadsheet_id)"))?;
            let api_key = remote
                .api_key
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| eyre!("The remote source needs an API key (--api-key or [source.remote] api_key)"))?;
            Box::new(
                RemoteSource::new(spreadsheet_id, api_key)
                    .with_base_url(remote.base_url.clone())
                    .with_range(Entity::Skaters, remote.skaters_range.clone())
                    .with_range(Entity::Goalies, remote.goalies_range.clone())
                    .with_range(Entity::Teams, remote.teams_range.clone())
                    .with_timeout(remote.timeout_secs.map(Duration::from_secs)),
            )
        }
    };
    info!(kind = kind.name(), source = %source.describe(), "data source selected");
    Ok(source)
}
