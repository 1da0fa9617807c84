// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use stockdesk_app::{
    Backend, BackendError, BackendResult, ConfirmStatus, NewStockEntry, RecordKey,
    StockEntryUpdate, StockRecord,
};
use tracing::debug;
use url::Url;

const GET_CATEGORIES: &str = "getCategories";
const GET_NEXT_CATEGORY_NUMBER: &str = "getNextCategoryNumber";
const GET_NEXT_PRODUCT_NUMBER: &str = "getNextProductNumber";
const GET_SHEET_DATA: &str = "getSheetData";
const ADD_STOCK_ITEM: &str = "addStockItem";
const UPDATE_STOCK_ITEM: &str = "updateStockItem";
const CONFIRM_ITEM: &str = "confirmItem";

/// Calls the spreadsheet script's functions over HTTP. Each call posts
/// `{"function", "parameters"}` and unwraps the script's result.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(endpoint: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            bail!("backend.endpoint must not be empty");
        }
        let parsed = Url::parse(endpoint)
            .with_context(|| format!("backend.endpoint {endpoint:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "backend.endpoint {endpoint:?} must use http or https, got {}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.to_owned(),
            token: token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn call<T: DeserializeOwned>(
        &self,
        function: &str,
        parameters: Vec<Value>,
    ) -> BackendResult<T> {
        debug!(function, "backend call");
        let body = json!({
            "function": function,
            "parameters": parameters,
            "devMode": false,
        });
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|error| BackendError::Transport(format!("{} ({error})", self.endpoint)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|error| BackendError::Transport(format!("read response: {error}")))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &text));
        }

        let result = unwrap_execution(&text)?;
        serde_json::from_value(result)
            .map_err(|error| BackendError::Decode(format!("{function}: {error}")))
    }

    fn mutate(&self, function: &str, parameters: Vec<Value>) -> BackendResult<String> {
        let reply: MutationReply = self.call(function, parameters)?;
        if reply.success {
            Ok(reply.message)
        } else {
            Err(BackendError::Rejected(reply.message))
        }
    }
}

impl Backend for Client {
    fn list_categories(&mut self) -> BackendResult<Vec<String>> {
        let codes: Vec<Value> = self.call(GET_CATEGORIES, Vec::new())?;
        Ok(codes
            .iter()
            .map(cell_text)
            .filter(|code| !code.is_empty())
            .collect())
    }

    fn next_category_prefix(&mut self) -> BackendResult<String> {
        let prefix: Value = self.call(GET_NEXT_CATEGORY_NUMBER, Vec::new())?;
        Ok(cell_text(&prefix))
    }

    fn next_product_prefix(&mut self, category: &str) -> BackendResult<String> {
        let prefix: Value = self.call(GET_NEXT_PRODUCT_NUMBER, vec![json!(category)])?;
        Ok(cell_text(&prefix))
    }

    fn list_records(&mut self) -> BackendResult<Vec<StockRecord>> {
        let rows: Vec<SheetRow> = self.call(GET_SHEET_DATA, Vec::new())?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(position, row)| row.into_record(position))
            .collect())
    }

    fn add_record(&mut self, entry: &NewStockEntry) -> BackendResult<String> {
        self.mutate(
            ADD_STOCK_ITEM,
            vec![
                json!(entry.main_office),
                json!(entry.sub_office),
                json!(entry.date),
                json!(entry.category),
                json!(entry.product),
            ],
        )
    }

    fn update_record(
        &mut self,
        key: RecordKey,
        entry: &StockEntryUpdate,
    ) -> BackendResult<String> {
        self.mutate(
            UPDATE_STOCK_ITEM,
            vec![
                json!(key.get()),
                json!(entry.main_office),
                json!(entry.sub_office),
                json!(entry.date),
                json!(entry.category),
                json!(entry.product),
                json!(entry.confirm.as_str()),
            ],
        )
    }

    fn set_confirm(&mut self, key: RecordKey, status: ConfirmStatus) -> BackendResult<String> {
        self.mutate(CONFIRM_ITEM, vec![json!(key.get()), json!(status.as_str())])
    }
}

/// Row shape returned by `getSheetData`; column names follow the sheet
/// header. `Id` is optional and falls back to the row's position.
#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Id", default)]
    id: Option<Value>,
    #[serde(rename = "MainOffice", default)]
    main_office: Value,
    #[serde(rename = "SubOffice", default)]
    sub_office: Value,
    #[serde(rename = "Date", default)]
    date: Value,
    #[serde(rename = "Category", default)]
    category: Value,
    #[serde(rename = "Product", default)]
    product: Value,
    #[serde(rename = "Confirm", default)]
    confirm: Value,
}

impl SheetRow {
    fn into_record(self, position: usize) -> StockRecord {
        let key = self
            .id
            .as_ref()
            .and_then(|id| match id {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse().ok(),
                _ => None,
            })
            .map(RecordKey::new)
            .unwrap_or_else(|| RecordKey::from_position(position));

        StockRecord {
            key,
            main_office: cell_text(&self.main_office),
            sub_office: cell_text(&self.sub_office),
            date: cell_text(&self.date),
            category: cell_text(&self.category),
            product: cell_text(&self.product),
            confirm: ConfirmStatus::parse(&cell_text(&self.confirm)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MutationReply {
    success: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ExecutionEnvelope {
    #[serde(default)]
    response: Option<ExecutionResponse>,
    #[serde(default)]
    error: Option<ExecutionError>,
}

#[derive(Debug, Deserialize)]
struct ExecutionResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ExecutionError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ExecutionErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ExecutionErrorDetail {
    #[serde(rename = "errorMessage", default)]
    error_message: String,
}

/// Extracts the script result from an execution envelope. Bodies without
/// an envelope (proxy deployments) are taken as the result itself.
fn unwrap_execution(body: &str) -> BackendResult<Value> {
    let value: Value = serde_json::from_str(body)
        .map_err(|error| BackendError::Decode(format!("response is not JSON: {error}")))?;

    let is_envelope = value
        .as_object()
        .is_some_and(|object| object.contains_key("response") || object.contains_key("error"));
    if !is_envelope {
        return Ok(value);
    }

    let envelope: ExecutionEnvelope = serde_json::from_value(value)
        .map_err(|error| BackendError::Decode(format!("execution envelope: {error}")))?;
    if let Some(error) = envelope.error {
        let detail = error
            .details
            .into_iter()
            .map(|detail| detail.error_message)
            .find(|message| !message.is_empty());
        return Err(BackendError::Script(detail.unwrap_or(error.message)));
    }
    Ok(envelope
        .response
        .map(|response| response.result)
        .unwrap_or(Value::Null))
}

/// Sheet cells come back as strings, numbers, or nulls; all are shown as text.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> BackendError {
    if let Ok(envelope) = serde_json::from_str::<ExecutionEnvelope>(body)
        && let Some(error) = envelope.error
        && !error.message.is_empty()
    {
        return BackendError::Server {
            status: status.as_u16(),
            message: error.message,
        };
    }

    let trimmed = body.trim();
    let message = if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('<') {
        trimmed.to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    };
    BackendError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, SheetRow, cell_text, clean_error_response, unwrap_execution};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use stockdesk_app::{BackendError, ConfirmStatus, RecordKey};

    #[test]
    fn client_rejects_bad_endpoints() {
        assert!(Client::new("", None, Duration::from_secs(1)).is_err());
        assert!(Client::new("not a url", None, Duration::from_secs(1)).is_err());
        let error = Client::new("ftp://example.com/exec", None, Duration::from_secs(1))
            .expect_err("ftp endpoint should fail");
        assert!(error.to_string().contains("http or https"));
    }

    #[test]
    fn envelope_result_is_unwrapped() {
        let body = r#"{"done":true,"response":{"@type":"type.googleapis.com/google.apps.script.v1.ExecutionResponse","result":["1-Bolts"]}}"#;
        assert_eq!(unwrap_execution(body), Ok(json!(["1-Bolts"])));
    }

    #[test]
    fn bare_json_is_taken_as_result() {
        assert_eq!(unwrap_execution(r#""3-""#), Ok(json!("3-")));
        assert_eq!(
            unwrap_execution(r#"{"success":true,"message":"ok"}"#),
            Ok(json!({"success": true, "message": "ok"}))
        );
    }

    #[test]
    fn script_error_prefers_detail_message() {
        let body = r#"{"done":true,"error":{"code":3,"message":"ScriptError","details":[{"errorMessage":"Sheet not found","errorType":"Error"}]}}"#;
        assert_eq!(
            unwrap_execution(body),
            Err(BackendError::Script("Sheet not found".to_owned()))
        );
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        assert!(matches!(
            unwrap_execution("<html>"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn sheet_row_uses_id_or_position() {
        let with_id: SheetRow = serde_json::from_value(json!({
            "Id": "17",
            "MainOffice": "North",
            "SubOffice": "Yard",
            "Date": "2024-03-05T00:00:00.000Z",
            "Category": "2-Bolts",
            "Product": "2-1-M8",
            "Confirm": "Yes"
        }))
        .expect("row decodes");
        let record = with_id.into_record(3);
        assert_eq!(record.key, RecordKey::new(17));
        assert_eq!(record.confirm, ConfirmStatus::Confirmed);

        let positional: SheetRow = serde_json::from_value(json!({
            "MainOffice": "North",
            "SubOffice": 12,
            "Confirm": "No"
        }))
        .expect("row decodes");
        let record = positional.into_record(3);
        assert_eq!(record.key, RecordKey::new(3));
        assert_eq!(record.sub_office, "12");
        assert!(record.date.is_empty());
        assert_eq!(record.confirm, ConfirmStatus::Pending);
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("a")), "a");
        assert_eq!(cell_text(&json!(4)), "4");
    }

    #[test]
    fn error_response_keeps_short_bodies() {
        assert_eq!(
            clean_error_response(StatusCode::FORBIDDEN, "Access denied"),
            BackendError::Server {
                status: 403,
                message: "Access denied".to_owned()
            }
        );
        assert_eq!(
            clean_error_response(StatusCode::BAD_GATEWAY, "<html>long page</html>"),
            BackendError::Server {
                status: 502,
                message: "Bad Gateway".to_owned()
            }
        );
        assert_eq!(
            clean_error_response(
                StatusCode::UNAUTHORIZED,
                r#"{"error":{"code":401,"message":"Request had invalid authentication credentials."}}"#
            ),
            BackendError::Server {
                status: 401,
                message: "Request had invalid authentication credentials.".to_owned()
            }
        );
    }
}
