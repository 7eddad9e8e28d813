//! Spreadsheet lookup and row append

use super::auth::ServiceAccountAuth;
use super::{DRIVE_API_BASE, SHEETS_API_BASE, SheetsError, api_error_message};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Handle to the first sheet of a spreadsheet found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub title: String,
}

impl Worksheet {
    /// A1 range naming the whole sheet, quoted so any title is valid
    pub fn range(&self) -> String {
        format!("'{}'", self.title.replace('\'', "''"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendResult {
    pub updated_range: Option<String>,
    pub updated_rows: u64,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

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
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: AppendUpdates,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: u64,
}

pub struct SheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    sheets_base: String,
    drive_base: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, auth: ServiceAccountAuth) -> Self {
        Self {
            http,
            auth,
            sheets_base: SHEETS_API_BASE.to_string(),
            drive_base: DRIVE_API_BASE.to_string(),
        }
    }

    /// Point the client at different API roots
    pub fn with_endpoints(mut self, sheets_base: impl Into<String>, drive_base: impl Into<String>) -> Self {
        self.sheets_base = sheets_base.into();
        self.drive_base = drive_base.into();
        self
    }

    pub fn service_account(&self) -> &str {
        self.auth.client_email()
    }

    /// Find a spreadsheet visible to the service account and resolve its first sheet
    pub async fn open_by_name(&self, name: &str) -> Result<Worksheet, SheetsError> {
        let spreadsheet_id = self.find_spreadsheet_id(name).await?;
        let title = self.first_sheet_title(&spreadsheet_id, name).await?;
        info!("Opened spreadsheet '{}' sheet '{}'", name, title);
        Ok(Worksheet {
            spreadsheet_id,
            spreadsheet_name: name.to_string(),
            title,
        })
    }

    async fn find_spreadsheet_id(&self, name: &str) -> Result<String, SheetsError> {
        let token = self.auth.access_token().await?;
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_literal(name),
            SPREADSHEET_MIME_TYPE
        );
        debug!("Drive lookup: {}", query);

        let response = self
            .http
            .get(format!("{}/files", self.drive_base))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let body = read_success(response).await?;

        let list: FileList = serde_json::from_str(&body)?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(name.to_string()))
    }

    async fn first_sheet_title(&self, spreadsheet_id: &str, name: &str) -> Result<String, SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(format!("{}/spreadsheets/{}", self.sheets_base, spreadsheet_id))
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties(title,index)")])
            .send()
            .await?;
        let body = read_success(response).await?;

        let meta: SpreadsheetMeta = serde_json::from_str(&body)?;
        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .min_by_key(|p| p.index)
            .map(|p| p.title)
            .ok_or_else(|| SheetsError::NoWorksheets(name.to_string()))
    }

    /// Append one row after the last row of the sheet's data table
    pub async fn append_row(&self, worksheet: &Worksheet, row: &[Value]) -> Result<AppendResult, SheetsError> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.sheets_base,
            worksheet.spreadsheet_id,
            urlencoding::encode(&worksheet.range())
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?;
        let body = read_success(response).await?;

        let parsed: AppendResponse = serde_json::from_str(&body).unwrap_or_default();
        Ok(AppendResult {
            updated_range: parsed.updates.updated_range,
            updated_rows: parsed.updates.updated_rows,
        })
    }
}

async fn read_success(response: reqwest::Response) -> Result<String, SheetsError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SheetsError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(body)
}

/// Escape a string literal for a Drive `q` expression
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sheets::{SCOPES, ServiceAccountKey};
    use mockito::{Matcher, Server, ServerGuard};

    async fn token_mock(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token": "ya29.test", "expires_in": 3600}"#)
            .create_async()
            .await
    }

    fn client(server: &ServerGuard) -> SheetsClient {
        let pem = std::fs::read_to_string(format!(
            "{}/tests/fixtures/test_service_account_key.pem",
            env!("CARGO_MANIFEST_DIR")
        ))
        .unwrap();
        let key = ServiceAccountKey {
            key_type: Some("service_account".into()),
            client_email: "recorder@asset-control.iam.gserviceaccount.com".into(),
            private_key: pem,
            private_key_id: None,
            token_uri: format!("{}/token", server.url()),
        };
        let auth = ServiceAccountAuth::new(key, reqwest::Client::new(), SCOPES);
        SheetsClient::new(reqwest::Client::new(), auth)
            .with_endpoints(format!("{}/v4", server.url()), format!("{}/drive/v3", server.url()))
    }

    #[test]
    fn test_worksheet_range_quoting() {
        let ws = Worksheet {
            spreadsheet_id: "id".into(),
            spreadsheet_name: "asset_control".into(),
            title: "Ops' Log".into(),
        };
        assert_eq!(ws.range(), "'Ops'' Log'");
    }

    #[test]
    fn test_escape_query_literal() {
        assert_eq!(escape_query_literal("it's"), "it\\'s");
        assert_eq!(escape_query_literal("a\\b"), "a\\\\b");
    }

    #[tokio::test]
    async fn test_open_by_name_and_append() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server).await;

        let drive = server
            .mock("GET", "/drive/v3/files")
            .match_header("authorization", "Bearer ya29.test")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                "name = 'asset_control' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false".into(),
            ))
            .with_status(200)
            .with_body(r#"{"files": [{"id": "sheet-123", "name": "asset_control"}]}"#)
            .create_async()
            .await;
        let meta = server
            .mock("GET", "/v4/spreadsheets/sheet-123")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"sheets": [
                {"properties": {"title": "Archive", "index": 1}},
                {"properties": {"title": "Sheet1", "index": 0}}
            ]}"#)
            .create_async()
            .await;
        let append = server
            .mock(
                "POST",
                Matcher::Regex(r"^/v4/spreadsheets/sheet-123/values/.*Sheet1.*:append$".into()),
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("valueInputOption".into(), "USER_ENTERED".into()),
                Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
            ]))
            .match_body(Matcher::Json(serde_json::json!({
                "majorDimension": "ROWS",
                "values": [["SSW", 100, 5, 0, 0, "2024-01-01 08:00:00"]]
            })))
            .with_status(200)
            .with_body(r#"{"spreadsheetId": "sheet-123", "updates": {"updatedRange": "Sheet1!A7:F7", "updatedRows": 1}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server);
        let ws = client.open_by_name("asset_control").await.unwrap();
        assert_eq!(ws.spreadsheet_id, "sheet-123");
        assert_eq!(ws.title, "Sheet1");

        let row = vec![
            serde_json::json!("SSW"),
            serde_json::json!(100),
            serde_json::json!(5),
            serde_json::json!(0),
            serde_json::json!(0),
            serde_json::json!("2024-01-01 08:00:00"),
        ];
        let result = client.append_row(&ws, &row).await.unwrap();
        assert_eq!(result.updated_range.as_deref(), Some("Sheet1!A7:F7"));
        assert_eq!(result.updated_rows, 1);

        drive.assert_async().await;
        meta.assert_async().await;
        append.assert_async().await;
    }

    #[tokio::test]
    async fn test_open_by_name_not_found() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server).await;
        let _drive = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"files": []}"#)
            .create_async()
            .await;

        let err = client(&server).open_by_name("missing").await.unwrap_err();
        assert!(matches!(err, SheetsError::SpreadsheetNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_append_api_error() {
        let mut server = Server::new_async().await;
        let _token = token_mock(&mut server).await;
        let _append = server
            .mock("POST", Matcher::Regex(r":append$".into()))
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "The caller does not have permission"}}"#)
            .create_async()
            .await;

        let ws = Worksheet {
            spreadsheet_id: "sheet-123".into(),
            spreadsheet_name: "asset_control".into(),
            title: "Sheet1".into(),
        };
        match client(&server).append_row(&ws, &[]).await {
            Err(SheetsError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
