//! Hugging Face dataset viewer REST API (`/splits`, `/rows`).

use std::sync::Arc;

use serde_json::Value;

use super::{BoxFuture, DatasetSource, SourceSettings};
use crate::dataset::{Dataset, DatasetRef};
use crate::record::Record;
use crate::{CoreError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://datasets-server.huggingface.co";

/// Rows fetched per split unless configured otherwise.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// The `/rows` endpoint refuses pages longer than this.
const PAGE_SIZE: usize = 100;

pub struct HubSource {
    client: reqwest::Client,
    endpoint: String,
    config_name: Option<String>,
    max_rows: usize,
    token: Option<String>,
}

impl HubSource {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("dsviewer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            config_name: settings.config_name.clone().filter(|c| !c.is_empty()),
            max_rows: settings.max_rows.max(1),
            token: settings.hf_token.clone().filter(|t| !t.is_empty()),
        })
    }

    async fn get_json(&self, url: &str, dataset: &str) -> Result<Value> {
        let mut req = self.client.get(url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let message = body["error"].as_str().unwrap_or("").to_string();
        Err(classify_error(status.as_u16(), &message, dataset))
    }

    /// `(config, split)` pairs listed for the dataset.
    async fn split_listing(&self, dataset: &str) -> Result<Vec<(String, String)>> {
        let url = format!(
            "{}/splits?dataset={}",
            self.endpoint,
            urlencoding::encode(dataset)
        );
        let data = self.get_json(&url, dataset).await?;
        Ok(parse_split_listing(&data))
    }

    async fn resolve_config(&self, dataset: &str, split: &str) -> Result<String> {
        let listing = self.split_listing(dataset).await?;
        let config = pick_config(&listing, self.config_name.as_deref())
            .ok_or_else(|| CoreError::DatasetNotFound(dataset.to_string()))?;
        if !listing.iter().any(|(c, s)| *c == config && s == split) {
            return Err(CoreError::SplitNotFound {
                name: dataset.to_string(),
                split: split.to_string(),
            });
        }
        Ok(config)
    }

    async fn fetch_rows(&self, dataset: &str, split: &str) -> Result<Dataset> {
        let config = self.resolve_config(dataset, split).await?;

        let mut records: Vec<Record> = Vec::new();
        let mut total: Option<usize> = None;

        while records.len() < self.max_rows {
            let length = PAGE_SIZE.min(self.max_rows - records.len());
            let url = format!(
                "{}/rows?dataset={}&config={}&split={}&offset={}&length={}",
                self.endpoint,
                urlencoding::encode(dataset),
                urlencoding::encode(&config),
                urlencoding::encode(split),
                records.len(),
                length
            );
            let data = self.get_json(&url, dataset).await?;
            let page = parse_rows_page(&data)?;
            if total.is_none() {
                total = page.total;
            }
            tracing::debug!(
                dataset,
                split,
                offset = records.len(),
                fetched = page.records.len(),
                "fetched rows page"
            );
            if page.records.is_empty() {
                break;
            }
            records.extend(page.records);
            if let Some(t) = total
                && records.len() >= t
            {
                break;
            }
        }

        let reference = DatasetRef::new(dataset, split);
        let total = total.unwrap_or(records.len());
        if total > records.len() {
            tracing::warn!(
                "{} has {} rows; loaded the first {}",
                reference,
                total,
                records.len()
            );
        }
        Ok(Dataset::new(reference, records).with_total_rows(total))
    }
}

impl DatasetSource for HubSource {
    fn name(&self) -> &str {
        "hub"
    }

    fn splits<'a>(&'a self, dataset: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            let listing = self.split_listing(dataset).await?;
            let config = pick_config(&listing, self.config_name.as_deref())
                .ok_or_else(|| CoreError::DatasetNotFound(dataset.to_string()))?;
            let splits: Vec<String> = listing
                .into_iter()
                .filter(|(c, _)| *c == config)
                .map(|(_, s)| s)
                .collect();
            if splits.is_empty() {
                return Err(CoreError::DatasetNotFound(dataset.to_string()));
            }
            Ok(splits)
        })
    }

    fn load<'a>(&'a self, dataset: &'a str, split: &'a str) -> BoxFuture<'a, Result<Arc<Dataset>>> {
        Box::pin(async move {
            let ds = self.fetch_rows(dataset, split).await?;
            tracing::info!("loaded {} ({} rows)", ds.reference, ds.len());
            Ok(Arc::new(ds))
        })
    }
}

fn classify_error(status: u16, message: &str, dataset: &str) -> CoreError {
    let lower = message.to_ascii_lowercase();
    if status == 404 || lower.contains("doesn't exist") || lower.contains("not found") {
        return CoreError::DatasetNotFound(dataset.to_string());
    }
    match status {
        401 | 403 => CoreError::Api(format!(
            "access denied (HTTP {}); gated datasets need HF_TOKEN",
            status
        )),
        429 => CoreError::Api("Rate limited (429)".into()),
        _ if message.is_empty() => CoreError::Api(format!("HTTP {}", status)),
        _ => CoreError::Api(format!("HTTP {}: {}", status, message)),
    }
}

fn parse_split_listing(data: &Value) -> Vec<(String, String)> {
    let mut listing: Vec<(String, String)> = Vec::new();
    for entry in data["splits"].as_array().into_iter().flatten() {
        let (Some(config), Some(split)) = (entry["config"].as_str(), entry["split"].as_str())
        else {
            continue;
        };
        let pair = (config.to_string(), split.to_string());
        if !listing.contains(&pair) {
            listing.push(pair);
        }
    }
    listing
}

/// The requested config if listed, else the first config in the listing.
fn pick_config(listing: &[(String, String)], wanted: Option<&str>) -> Option<String> {
    match wanted {
        Some(w) => listing.iter().find(|(c, _)| c == w).map(|(c, _)| c.clone()),
        None => listing.first().map(|(c, _)| c.clone()),
    }
}

struct RowsPage {
    records: Vec<Record>,
    total: Option<usize>,
}

fn parse_rows_page(data: &Value) -> Result<RowsPage> {
    let rows = data["rows"]
        .as_array()
        .ok_or_else(|| CoreError::Api("response has no 'rows' array".into()))?;
    let records = rows
        .iter()
        .map(|row| Record::from_value(row["row"].clone()))
        .collect::<Result<Vec<_>>>()?;
    let total = data["num_rows_total"].as_u64().map(|n| n as usize);
    Ok(RowsPage { records, total })
}
