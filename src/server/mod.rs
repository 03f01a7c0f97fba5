//! Editor transport: `Content-Length` framed JSON requests in, framed JSON
//! responses out, one instrumentation per request.

mod protocol;

pub use protocol::{InstrumentArguments, Message, MessageContent, SnippetArguments, SourceBody};

use crate::debugger::Instrumenter;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

const CONTENT_LENGTH: &str = "Content-Length:";

pub struct Server<W: Write> {
    seq: u64,
    instrumenter: Instrumenter,
    output: W,
}

impl<W: Write> Server<W> {
    pub fn new(instrumenter: Instrumenter, output: W) -> Self {
        Self {
            seq: 0,
            instrumenter,
            output,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        result: Result<Option<Value>, String>,
    ) -> io::Result<()> {
        let (success, body, message) = match result {
            Ok(body) => (true, body, None),
            Err(message) => (false, None, Some(message)),
        };
        let msg = Message {
            seq: self.next_seq(),
            msg_type: "response".to_string(),
            content: MessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        write_message(&mut self.output, &msg)
    }

    fn handle_instrument(&self, arguments: Option<Value>) -> Result<Option<Value>, String> {
        let args: InstrumentArguments = parse_arguments(arguments)?;
        let source = self
            .instrumenter
            .try_instrument(&args.source, args.target_line, &args.target_line_text, &args.loop_caps)
            .map_err(|e| e.to_string())?;
        to_body(SourceBody { source })
    }

    fn handle_snippet(&self, arguments: Option<Value>) -> Result<Option<Value>, String> {
        let args: SnippetArguments = parse_arguments(arguments)?;
        let source = self
            .instrumenter
            .instrument_snippet(&args.line_text, args.shader_type())
            .ok_or_else(|| "statement has no visualizable value".to_string())?;
        to_body(SourceBody { source })
    }

    /// Answer one message. Returns `false` once the client disconnects.
    pub fn handle(&mut self, msg: Message) -> io::Result<bool> {
        let MessageContent::Request { command, arguments } = msg.content else {
            warn!(seq = msg.seq, "ignoring non-request message");
            return Ok(true);
        };
        debug!(seq = msg.seq, %command, "request");

        let result = match command.as_str() {
            "instrument" => self.handle_instrument(arguments),
            "snippet" => self.handle_snippet(arguments),
            "disconnect" => {
                self.send_response(msg.seq, command, Ok(None))?;
                return Ok(false);
            }
            other => {
                warn!(command = other, "unhandled command");
                Err(format!("unknown command `{}`", other))
            }
        };
        self.send_response(msg.seq, command, result)?;
        Ok(true)
    }
}

fn parse_arguments<T: serde::de::DeserializeOwned>(arguments: Option<Value>) -> Result<T, String> {
    serde_json::from_value(arguments.unwrap_or(Value::Null))
        .map_err(|e| format!("invalid arguments: {}", e))
}

fn to_body<T: serde::Serialize>(body: T) -> Result<Option<Value>, String> {
    serde_json::to_value(body)
        .map(Some)
        .map_err(|e| e.to_string())
}

pub fn write_message<W: Write>(output: &mut W, msg: &Message) -> io::Result<()> {
    let json = serde_json::to_string(msg)?;
    write!(output, "{} {}\r\n\r\n{}", CONTENT_LENGTH, json.len(), json)?;
    output.flush()
}

/// Read one frame's payload. `Ok(None)` on a clean end of input.
pub fn read_frame<R: BufRead>(input: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut content_length = None;

    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end();
        if line.is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix(CONTENT_LENGTH) {
            content_length = value.trim().parse::<usize>().ok();
        }
    }

    let mut buffer = vec![0u8; content_length.unwrap_or(0)];
    input.read_exact(&mut buffer)?;
    Ok(Some(buffer))
}

/// Read one framed message. `Ok(None)` on a clean end of input.
pub fn read_message<R: BufRead>(input: &mut R) -> io::Result<Option<Message>> {
    let Some(buffer) = read_frame(input)? else {
        return Ok(None);
    };
    let msg = serde_json::from_slice(&buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(msg))
}

/// Serve requests from `input` until `disconnect` or end of input. A frame
/// that is not a valid message gets a failed response and the loop goes on.
pub fn serve<R: BufRead, W: Write>(
    instrumenter: Instrumenter,
    mut input: R,
    output: W,
) -> io::Result<()> {
    info!("server starting");
    let mut server = Server::new(instrumenter, output);

    while let Some(buffer) = read_frame(&mut input)? {
        let msg = match serde_json::from_slice::<Message>(&buffer) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "malformed message");
                let request_seq = serde_json::from_slice::<Value>(&buffer)
                    .ok()
                    .and_then(|value| value.get("seq").and_then(Value::as_u64))
                    .unwrap_or(0);
                server.send_response(
                    request_seq,
                    "unknown".to_string(),
                    Err(format!("invalid message: {}", e)),
                )?;
                continue;
            }
        };
        if !server.handle(msg)? {
            break;
        }
    }

    info!("server exiting");
    Ok(())
}
