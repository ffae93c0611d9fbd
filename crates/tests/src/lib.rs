//! # Integration Tests
//!
//! End-to-end tests over the real component wiring.
//!
//! Covers:
//! - Input lines -> engine -> sinks -> checkpoint stream
//! - Checkpoint safety on delivery failure
//! - Remote sink retry behavior against a local HTTP fixture

#[cfg(test)]
mod support {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use contracts::BatchLimits;

    pub fn unlimited() -> BatchLimits {
        BatchLimits {
            max_batch_bytes: usize::MAX,
            max_batch_records: usize::MAX,
            batch_delay_seconds: f64::INFINITY,
        }
    }

    pub fn input_lines(lines: &[&str]) -> String {
        let mut input = lines.join("\n");
        input.push('\n');
        input
    }

    fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Minimal HTTP/1.1 fixture that answers every request with one canned
    /// response and counts connections.
    pub async fn http_fixture(
        status: &'static str,
        body: &'static str,
    ) -> (SocketAddr, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                hits_counter.fetch_add(1, Ordering::SeqCst);

                // Read headers, then the declared body length, so the client
                // never sees the connection close mid-request.
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let (header_end, content_length) = loop {
                    let Ok(n) = socket.read(&mut chunk).await else {
                        break (buf.len(), 0);
                    };
                    if n == 0 {
                        break (buf.len(), 0);
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                        let headers = String::from_utf8_lossy(&buf[..pos]).into_owned();
                        let content_length = headers
                            .lines()
                            .find_map(|line| {
                                let lower = line.to_ascii_lowercase();
                                lower
                                    .strip_prefix("content-length:")
                                    .and_then(|v| v.trim().parse::<usize>().ok())
                            })
                            .unwrap_or(0);
                        break (pos + 4, content_length);
                    }
                };
                while buf.len() < header_end + content_length {
                    let Ok(n) = socket.read(&mut chunk).await else {
                        break;
                    };
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (addr, hits)
    }
}

#[cfg(test)]
mod e2e_tests {
    use engine::PipelineEngine;
    use ingestion::MessageReader;
    use tokio::io::BufReader;

    use contracts::ContractError;
    use delivery::{FileSink, TargetSink, ValidatingSink};
    use observability::TimingsHandle;

    use crate::support::{input_lines, unlimited};

    fn checkpoint_lines(writer: &[u8]) -> Vec<String> {
        String::from_utf8(writer.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Input lines -> engine -> file sink: the output file holds the exact
    /// request bodies and the checkpoint stream holds the trailing state.
    #[tokio::test]
    async fn test_end_to_end_file_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let sink = TargetSink::LocalFile(
            FileSink::new("output-file", &path, 4_000_000, TimingsHandle::new()).unwrap(),
        );

        let input = input_lines(&[
            r#"{"type": "SCHEMA", "stream": "users", "key_properties": ["id"], "schema": {"type": "object", "properties": {"id": {"type": "integer"}}}}"#,
            r#"{"type": "RECORD", "stream": "users", "record": {"id": 1, "name": "mike"}}"#,
            r#"{"type": "RECORD", "stream": "users", "record": {"id": 2, "name": "paul"}}"#,
            r#"{"type": "STATE", "value": {"bookmarks": {"users": {"id": 2}}}}"#,
        ]);

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(vec![sink], Vec::<u8>::new(), unlimited());
        let stats = engine.run(&mut source).await.unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.checkpoints, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let bodies: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["table_name"], serde_json::json!("users"));
        assert_eq!(bodies[0]["key_names"], serde_json::json!(["id"]));
        assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 2);
        assert_eq!(
            bodies[0]["messages"][0]["data"],
            serde_json::json!({"id": 1, "name": "mike"})
        );

        let (_, writer) = engine.into_parts();
        assert_eq!(
            checkpoint_lines(&writer),
            vec![r#"{"bookmarks":{"users":{"id":2}}}"#]
        );
    }

    /// A record missing a declared key property aborts the run under the
    /// validating sink, with zero checkpoints emitted.
    #[tokio::test]
    async fn test_missing_key_property_aborts_with_no_checkpoint() {
        let sink = TargetSink::Validating(ValidatingSink::new("validator"));

        let input = input_lines(&[
            r#"{"type": "SCHEMA", "stream": "users", "key_properties": ["id"], "schema": {"type": "object", "properties": {"id": {"type": "integer"}}}}"#,
            r#"{"type": "RECORD", "stream": "users", "record": {"name": "no id"}}"#,
            r#"{"type": "STATE", "value": 1}"#,
        ]);

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(vec![sink], Vec::<u8>::new(), unlimited());
        let result = engine.run(&mut source).await;

        assert!(matches!(
            result,
            Err(ContractError::MissingKeyProperty { .. })
        ));

        let (_, writer) = engine.into_parts();
        assert!(checkpoint_lines(&writer).is_empty());
    }

    /// Malformed input is fatal and keeps the unexpected-error category.
    #[tokio::test]
    async fn test_malformed_line_aborts_the_run() {
        let sink = TargetSink::Validating(ValidatingSink::new("validator"));
        let input = input_lines(&[r#"{"type": "STATE", "value": 1}"#, "boom"]);

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(vec![sink], Vec::<u8>::new(), unlimited());
        let result = engine.run(&mut source).await;

        match result {
            Err(err @ ContractError::MessageParse { .. }) => assert!(!err.is_expected()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// File capture completes before a later sink fails, and the checkpoint
    /// is still withheld.
    #[tokio::test]
    async fn test_file_capture_survives_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let sinks = vec![
            TargetSink::LocalFile(
                FileSink::new("output-file", &path, 4_000_000, TimingsHandle::new()).unwrap(),
            ),
            TargetSink::Validating(ValidatingSink::new("validator")),
        ];

        let input = input_lines(&[
            r#"{"type": "SCHEMA", "stream": "users", "key_properties": ["id"], "schema": {"type": "object", "properties": {"id": {"type": "integer"}}}}"#,
            r#"{"type": "RECORD", "stream": "users", "record": {"name": "no id"}}"#,
            r#"{"type": "STATE", "value": 1}"#,
        ]);

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(sinks, Vec::<u8>::new(), unlimited());
        assert!(engine.run(&mut source).await.is_err());

        // The file sink ran first, so its capture is complete.
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);

        let (_, writer) = engine.into_parts();
        assert!(checkpoint_lines(&writer).is_empty());
    }
}

#[cfg(test)]
mod remote_tests {
    use std::sync::atomic::Ordering;

    use engine::PipelineEngine;
    use ingestion::MessageReader;
    use tokio::io::BufReader;

    use contracts::ContractError;
    use delivery::{RemoteSink, RemoteSinkConfig, TargetSink, MAX_DELIVERY_ATTEMPTS};
    use observability::TimingsHandle;

    use crate::support::{http_fixture, input_lines, unlimited};

    fn remote_sink(endpoint: String) -> TargetSink {
        TargetSink::Remote(
            RemoteSink::new(
                "stitch",
                RemoteSinkConfig {
                    endpoint,
                    token: "test-token".to_string(),
                    max_batch_bytes: 4_000_000,
                },
                TimingsHandle::new(),
            )
            .unwrap(),
        )
    }

    fn scripted_input() -> String {
        input_lines(&[
            r#"{"type": "SCHEMA", "stream": "users", "key_properties": ["id"], "schema": {"type": "object", "properties": {"id": {"type": "integer"}}}}"#,
            r#"{"type": "RECORD", "stream": "users", "record": {"id": 1}}"#,
            r#"{"type": "STATE", "value": 1}"#,
        ])
    }

    #[tokio::test]
    async fn test_accepted_batch_emits_checkpoint() {
        let (addr, hits) = http_fixture("200 OK", "{}").await;
        let input = scripted_input();

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(
            vec![remote_sink(format!("http://{addr}/v2/import/batch"))],
            Vec::<u8>::new(),
            unlimited(),
        );
        let stats = engine.run(&mut source).await.unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.checkpoints, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// Client-error responses are never retried; the decoded rejection
    /// message surfaces and no checkpoint is emitted.
    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (addr, hits) =
            http_fixture("400 Bad Request", r#"{"message": "schema mismatch"}"#).await;
        let input = scripted_input();

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(
            vec![remote_sink(format!("http://{addr}/v2/import/batch"))],
            Vec::<u8>::new(),
            unlimited(),
        );
        let result = engine.run(&mut source).await;

        match result {
            Err(ContractError::Delivery { message }) => {
                assert_eq!(message, "schema mismatch");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let (_, writer) = engine.into_parts();
        assert!(writer.is_empty());
    }

    /// Server errors retry up to the attempt ceiling, then surface the
    /// decoded rejection. Paused time fast-forwards the backoff sleeps.
    #[tokio::test(start_paused = true)]
    async fn test_server_error_exhausts_retries() {
        let (addr, hits) =
            http_fixture("502 Bad Gateway", r#"{"message": "gate unavailable"}"#).await;
        let input = scripted_input();

        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(
            vec![remote_sink(format!("http://{addr}/v2/import/batch"))],
            Vec::<u8>::new(),
            unlimited(),
        );
        let result = engine.run(&mut source).await;

        match result {
            Err(ContractError::Delivery { message }) => {
                assert_eq!(message, "gate unavailable");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), MAX_DELIVERY_ATTEMPTS as usize);

        let (_, writer) = engine.into_parts();
        assert!(writer.is_empty());
    }

    /// A connection refused outright exhausts retries into the generic
    /// connectivity error.
    #[tokio::test(start_paused = true)]
    async fn test_unreachable_endpoint_is_a_connection_error() {
        // Bind and immediately drop to get a port nobody is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let input = scripted_input();
        let mut source = MessageReader::new(BufReader::new(input.as_bytes()));
        let mut engine = PipelineEngine::new(
            vec![remote_sink(format!("http://{addr}/v2/import/batch"))],
            Vec::<u8>::new(),
            unlimited(),
        );
        let result = engine.run(&mut source).await;

        assert!(matches!(result, Err(ContractError::Connection { .. })));
    }
}
