use embassy_net::tcp::TcpSocket;
use embedded_io_async::Write as _;
#[cfg(feature = "log")]
use esp_println::println;
use heapless::{String, Vec};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    Error,
    HttpResult,
    headers::{
        ContentHeaders,
        ContentType,
        HttpMethod,
        ResponseHeaders,
        StatusCode,
        TargetWriter as _,
        TextEncoding,
        find_content_length,
        parse_request_line,
        read_heading,
    },
};

const HEADER_BUFFER_SIZE: usize = 512;
const BODY_BUFFER_SIZE: usize = 512;
const BODY_RX_CHUNK_SIZE: usize = 256;
const STREAM_CHUNK_SIZE: usize = 1024;

/// HTTP connection context
pub(crate) struct HttpConnection<'a> {
    pub method: HttpMethod,
    pub path: heapless::String<64>,

    socket: TcpSocket<'a>,
    content_length: u32,
    header_end: usize,
    header_buf: Vec<u8, HEADER_BUFFER_SIZE>,
    body_buf: Vec<u8, BODY_BUFFER_SIZE>,
}

impl<'a> HttpConnection<'a> {
    /// Create a new HTTP connection from a socket.
    pub(crate) async fn from_socket(
        mut socket: TcpSocket<'a>,
    ) -> Result<Self, Error> {
        let mut header_buf = Vec::<u8, HEADER_BUFFER_SIZE>::new();
        header_buf
            .resize_default(header_buf.capacity())
            .map_err(|()| Error::Parse)?;
        let (header_end, header_len) =
            read_heading(header_buf.as_mut_slice(), &mut socket).await?;
        header_buf.truncate(header_len);

        // Only parse the headers portion (before body data) to avoid
        // misreading binary body bytes
        let headers_only = &header_buf.as_slice()[..header_end];
        let header_str =
            core::str::from_utf8(headers_only).map_err(|_| Error::Parse)?;
        let (method, raw_path, rest_headers) =
            parse_request_line(header_str).ok_or(Error::Parse)?;
        let content_length = find_content_length(rest_headers).unwrap_or(0);

        let mut path = String::new();
        let _ = path.push_str(raw_path);
        Ok(Self {
            method,
            path,
            socket,
            header_buf,
            body_buf: Vec::new(),
            content_length,
            header_end,
        })
    }

    /// Get request method and path
    pub(crate) fn route(&self) -> (HttpMethod, &'_ str) {
        (self.method, self.path.as_str())
    }

    /// Write the headers to the connection
    pub(crate) async fn write_headers(
        &mut self,
        headers: &ResponseHeaders,
    ) -> HttpResult {
        self.header_buf.clear();
        headers.write_to(&mut self.header_buf)?;
        self.write_all_buffered().await
    }

    /// Write the body to the connection
    pub(crate) async fn write_body(&mut self, body: &[u8]) -> HttpResult {
        for chunk in body.chunks(STREAM_CHUNK_SIZE) {
            self.socket.write_all(chunk).await?;
        }
        self.socket.flush().await?;
        Ok(())
    }

    /// Write an HTML document to the connection
    ///
    /// Writes both headers and body.
    pub(crate) async fn write_html(
        &mut self,
        code: StatusCode,
        html: &str,
    ) -> HttpResult {
        let content = ContentHeaders::new(ContentType::TextHtml)
            .with_text_encoding(TextEncoding::Utf8)
            .with_length(html.len());
        let headers = ResponseHeaders::from_code(code).with_content(content);
        self.write_headers(&headers).await?;
        self.write_body(html.as_bytes()).await
    }

    /// Write JSON to the connection
    ///
    /// Writes both headers and body.
    pub(crate) async fn write_json<T: Serialize>(&mut self, data: &T) -> HttpResult {
        self.body_buf.clear();
        self.body_buf
            .resize_default(self.body_buf.capacity())
            .map_err(|()| Error::Closed)?;
        let n = serde_json_core::to_slice(data, self.body_buf.as_mut_slice())
            .map_err(|_| Error::Closed)?;
        self.body_buf.truncate(n);
        let headers = ResponseHeaders::success()
            .with_content(ContentHeaders::new(ContentType::Json).with_length(n));

        self.write_headers(&headers).await?;

        let body = self.body_buf.clone();
        self.write_body(body.as_slice()).await
    }

    /// Read JSON from the request body
    pub(crate) async fn read_json<T: DeserializeOwned>(
        &mut self,
    ) -> Result<T, Error> {
        let body = self.read_body().await?;
        let (data, _) = serde_json_core::from_slice(body).map_err(|_e| {
            #[cfg(feature = "log")]
            println!("http: body parse error: {:?}", _e);
            Error::Parse
        })?;
        Ok(data)
    }

    /// Write the header buffer to the connection
    async fn write_all_buffered(&mut self) -> HttpResult {
        self.socket.write_all(self.header_buf.as_slice()).await?;
        self.socket.flush().await?;

        Ok(())
    }

    /// Read the request body
    async fn read_body(&mut self) -> Result<&[u8], Error> {
        if self.content_length == 0 {
            return Err(Error::NoData);
        }

        self.body_buf.clear();

        // Bytes of the body that arrived together with the headers
        if self.header_buf.len() > self.header_end {
            self.body_buf
                .extend_from_slice(&self.header_buf.as_slice()[self.header_end..])
                .map_err(|()| Error::Parse)?;
        }

        // Read remaining body
        while self.body_buf.len() < self.content_length as usize {
            let mut buf = [0u8; BODY_RX_CHUNK_SIZE];
            let n = self.socket.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.body_buf
                .extend_from_slice(&buf[..n])
                .map_err(|()| Error::Parse)?;
        }

        Ok(self.body_buf.as_slice())
    }
}
