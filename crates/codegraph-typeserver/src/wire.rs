use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Content-Length framing, as used by the Language Server Protocol's
/// base wire format.
pub fn encode_message(body: &str) -> Vec<u8> {
    format!("Content-Length: {}\r\n\r\n{}", body.as_bytes().len(), body).into_bytes()
}

pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, body: &str) -> io::Result<()> {
    writer.write_all(&encode_message(body)).await?;
    writer.flush().await
}

/// Read one Content-Length-framed message body. Returns `Ok(None)` on a
/// clean EOF (the subprocess exited).
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> io::Result<Option<String>> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if let Some(rest) = trimmed.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = rest.trim().parse::<usize>().ok();
        }
    }

    let Some(len) = content_length else {
        return Ok(Some(String::new()));
    };

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(String::from_utf8_lossy(&body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_content_length_header() {
        let encoded = encode_message("{}");
        let text = String::from_utf8(encoded).unwrap();
        assert_eq!(text, "Content-Length: 2\r\n\r\n{}");
    }

    #[tokio::test]
    async fn round_trips_a_message() {
        let body = r#"{"jsonrpc":"2.0","id":1}"#;
        let (mut client, server) = tokio::io::duplex(4096);
        client.write_all(&encode_message(body)).await.unwrap();
        drop(client);
        let mut reader = BufReader::new(server);
        let read = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(read, body);
    }
}
