//! Blocking HTTP transport for the flights endpoint.

use std::time::Duration;

use fr24_core::{FeedError, Result, Transport};

/// `reqwest` blocking client with a per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(HttpTransport { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| FeedError::Transport(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Serve one canned HTTP response on a random local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://127.0.0.1:{port}/flights.json")
    }

    #[test]
    fn test_get_ok() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"A1B2C3": []}"#);
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        assert_eq!(transport.get(&url).unwrap(), r#"{"A1B2C3": []}"#);
    }

    #[test]
    fn test_get_non_2xx() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable", "");
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport.get(&url).unwrap_err();
        assert!(matches!(err, FeedError::HttpStatus(503)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .get(&format!("http://127.0.0.1:{port}/flights.json"))
            .unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)));
    }

    #[test]
    fn test_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            // Accept and hold the connection without answering.
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
        });

        let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_millis(200));
        let err = transport
            .get(&format!("http://127.0.0.1:{port}/flights.json"))
            .unwrap_err();
        assert!(matches!(err, FeedError::Transport(_)));
    }
}
