/// `Spreadsheets` over the Google Sheets REST API v4.
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::auth::{Credentials, TokenProvider};
use super::client::{CellValue, SheetKey, Spreadsheets, Worksheet, pad_rows};
use super::errors::SheetsError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// HTTP timeouts for the blocking agent.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking Sheets API client.
pub struct GoogleSheets {
    agent: ureq::Agent,
    tokens: TokenProvider,
    base_url: String,
}

impl GoogleSheets {
    #[must_use]
    pub fn new(credentials: Credentials, options: HttpOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(options.connect_timeout)
            .timeout_read(options.request_timeout)
            .timeout_write(options.request_timeout)
            .build();
        Self {
            agent,
            tokens: TokenProvider::new(credentials),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Point the client at a different API root (emulators, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        self.tokens.credentials()
    }

    /// Obtain a token without touching any spreadsheet.
    ///
    /// # Errors
    ///
    /// Credential, token-endpoint or transport errors.
    pub fn authenticate(&mut self) -> Result<(), SheetsError> {
        self.tokens.token(&self.agent).map(|_| ())
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{suffix}",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    fn request(&mut self, method: &str, url: &str) -> Result<ureq::Request, SheetsError> {
        let token = self.tokens.token(&self.agent)?;
        Ok(self
            .agent
            .request(method, url)
            .set("authorization", &format!("Bearer {token}")))
    }

    fn read_range(&mut self, ws: &Worksheet, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(&ws.key.spreadsheet_id, range, "");
        debug!(%url, "values.get");
        let resp = self
            .request("GET", &url)?
            .call()
            .map_err(|e| map_ureq_error(e, &ws.key.spreadsheet_id))?;
        let body: ValueRange = decode(resp, "values.get")?;
        Ok(body.values.into_iter().map(render_row).collect())
    }
}

impl Spreadsheets for GoogleSheets {
    fn worksheet(&mut self, key: &SheetKey) -> Result<Worksheet, SheetsError> {
        let url = format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(&key.spreadsheet_id)
        );
        debug!(%url, "spreadsheets.get");
        let resp = self
            .request("GET", &url)?
            .query("fields", "sheets.properties(sheetId,title)")
            .call()
            .map_err(|e| map_ureq_error(e, &key.spreadsheet_id))?;
        let meta: SpreadsheetMeta = decode(resp, "spreadsheets.get")?;

        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == key.title)
            .map(|p| Worksheet {
                key: key.clone(),
                sheet_id: p.sheet_id,
            })
            .ok_or_else(|| SheetsError::WorksheetNotFound {
                spreadsheet_id: key.spreadsheet_id.clone(),
                title: key.title.clone(),
            })
    }

    fn row_values(&mut self, ws: &Worksheet, row: usize) -> Result<Vec<String>, SheetsError> {
        let range = format!("{}!{row}:{row}", ws.full_range());
        Ok(self.read_range(ws, &range)?.into_iter().next().unwrap_or_default())
    }

    fn write_row(
        &mut self,
        ws: &Worksheet,
        row: usize,
        cells: &[CellValue],
    ) -> Result<(), SheetsError> {
        let range = ws.row_range(row);
        let url = self.values_url(&ws.key.spreadsheet_id, &range, "");
        debug!(%url, cells = cells.len(), "values.update");
        self.request("PUT", &url)?
            .query("valueInputOption", "RAW")
            .send_json(value_range(&range, cells))
            .map_err(|e| map_ureq_error(e, &ws.key.spreadsheet_id))?;
        Ok(())
    }

    fn append_row(&mut self, ws: &Worksheet, cells: &[CellValue]) -> Result<(), SheetsError> {
        let range = ws.full_range();
        let url = self.values_url(&ws.key.spreadsheet_id, &range, ":append");
        debug!(%url, cells = cells.len(), "values.append");
        self.request("POST", &url)?
            .query("valueInputOption", "RAW")
            .query("insertDataOption", "INSERT_ROWS")
            .send_json(value_range(&range, cells))
            .map_err(|e| map_ureq_error(e, &ws.key.spreadsheet_id))?;
        Ok(())
    }

    fn get_all_values(&mut self, ws: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = ws.full_range();
        let mut rows = self.read_range(ws, &range)?;
        pad_rows(&mut rows);
        Ok(rows)
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// `values` is omitted entirely when the range is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn value_range(range: &str, cells: &[CellValue]) -> Value {
    let row: Vec<Value> = cells.iter().map(CellValue::to_json).collect();
    json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": [row],
    })
}

fn render_row(row: Vec<Value>) -> Vec<String> {
    row.into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}

fn decode<T: for<'de> Deserialize<'de>>(
    resp: ureq::Response,
    context: &str,
) -> Result<T, SheetsError> {
    resp.into_json().map_err(|e| SheetsError::Decode {
        context: context.to_owned(),
        detail: e.to_string(),
    })
}

fn map_ureq_error(err: ureq::Error, spreadsheet_id: &str) -> SheetsError {
    match err {
        ureq::Error::Status(code, resp) => {
            let retry_after = resp
                .header("retry-after")
                .and_then(|h| h.trim().parse::<u64>().ok());
            let body = resp.into_string().unwrap_or_default();
            map_status(code, &body, retry_after, spreadsheet_id)
        }
        ureq::Error::Transport(t) => SheetsError::Transport(t.to_string()),
    }
}

/// Map a non-success status and its body to a typed error.
fn map_status(
    code: u16,
    body: &str,
    retry_after: Option<u64>,
    spreadsheet_id: &str,
) -> SheetsError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_owned());
    warn!(code, %message, "Sheets API error");
    match code {
        401 | 403 => SheetsError::Unauthorized { message },
        404 => SheetsError::SpreadsheetNotFound {
            spreadsheet_id: spreadsheet_id.to_owned(),
        },
        429 => SheetsError::RateLimited { retry_after },
        _ => SheetsError::Status { code, message },
    }
}
