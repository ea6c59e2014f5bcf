use reqwest::blocking::Client;
use tracing::debug;

use crate::error::IngestError;
use crate::parser::RawRecord;
use crate::ui::{Phase, Ui};

pub const DEFAULT_DATASET_URL: &str = "https://data.nasa.gov/resource/gh4g-9sfh.json";

pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    pub fn new() -> Result<Self, IngestError> {
        let client = Client::builder()
            .user_agent("meteorite-regions")
            .build()
            .map_err(IngestError::Client)?;
        Ok(Self { client })
    }

    /// Use a preconfigured HTTP client (proxy settings, timeouts)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Issue a single GET and return the body. Non-success statuses are
    /// reported and returned as errors; nothing is retried.
    pub fn fetch_body(&self, url: &str, ui: &mut impl Ui) -> Result<String, IngestError> {
        ui.set_phase(Phase::Fetching);
        ui.set_info(url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| IngestError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            ui.log(format!("The GET request was NOT successful: {}", status));
            return Err(IngestError::Status {
                url: url.to_string(),
                status,
            });
        }
        ui.log(format!("The GET request was successful: {}", status));

        let body = response.text().map_err(IngestError::Read)?;
        debug!(url, bytes = body.len(), "fetched dataset");
        Ok(body)
    }

    /// Fetch and decode the dataset
    pub fn fetch_records(&self, url: &str, ui: &mut impl Ui) -> Result<Vec<RawRecord>, IngestError> {
        let body = self.fetch_body(url, ui)?;
        decode_records(&body, ui)
    }
}

/// Decode a response body into records. The body must be a JSON array of
/// objects; anything else is a decode error.
pub fn decode_records(body: &str, ui: &mut impl Ui) -> Result<Vec<RawRecord>, IngestError> {
    ui.set_phase(Phase::Decoding);

    match serde_json::from_str::<Vec<RawRecord>>(body) {
        Ok(records) => {
            ui.log(format!("Content converted to {} JSON records", records.len()));
            Ok(records)
        }
        Err(err) => {
            ui.log(format!("An error occurred while converting the content to JSON: {}", err));
            Err(IngestError::Decode(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a local port
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{}/resource/meteorites.json", addr)
    }

    fn local_client() -> DatasetClient {
        DatasetClient::with_client(Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn test_fetch_records() {
        let url = serve_once("200 OK", r#"[{"id":"1","name":"Aachen"},{"id":"2"}]"#);
        let records = local_client().fetch_records(&url, &mut SilentUi::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Aachen");
    }

    #[test]
    fn test_non_success_status() {
        let url = serve_once("404 Not Found", "");
        let err = local_client().fetch_records(&url, &mut SilentUi::new()).unwrap_err();
        match err {
            IngestError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_body() {
        let url = serve_once("200 OK", "<html>maintenance</html>");
        let err = local_client().fetch_records(&url, &mut SilentUi::new()).unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn test_decode_requires_array_of_objects() {
        let mut ui = SilentUi::new();
        assert!(decode_records(r#"{"id": "1"}"#, &mut ui).is_err());
        assert!(decode_records(r#"[1, 2]"#, &mut ui).is_err());
        assert!(decode_records("[]", &mut ui).unwrap().is_empty());
    }
}
