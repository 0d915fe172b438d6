// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! An in-process JSON-RPC node for tests that must not depend on anvil.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

type Handler = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Serves HTTP JSON-RPC on a local port, answering each method with `handler(method)`.
///
/// Returns the node's url. The listener lives until the test runtime shuts down.
pub async fn stub_node(handler: impl Fn(&str) -> Value + Send + Sync + 'static) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handler: Handler = Arc::new(handler);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, handler.clone()));
        }
    });
    url
}

async fn serve(stream: TcpStream, handler: Handler) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    loop {
        let mut length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0; length];
        reader.read_exact(&mut body).await?;
        let request: Value = serde_json::from_slice(&body)?;
        let response = match &request {
            Value::Array(batch) => Value::Array(batch.iter().map(|r| answer(r, &handler)).collect()),
            single => answer(single, &handler),
        }
        .to_string();

        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            response.len()
        );
        let stream = reader.get_mut();
        stream.write_all(head.as_bytes()).await?;
        stream.write_all(response.as_bytes()).await?;
        stream.flush().await?;
    }
}

fn answer(request: &Value, handler: &Handler) -> Value {
    let method = request["method"].as_str().unwrap_or_default();
    json!({ "jsonrpc": "2.0", "id": request["id"], "result": handler(method) })
}
