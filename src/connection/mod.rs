use std::{io, net::SocketAddr};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    logic::SharedGame,
    protocol::{Command, Reply},
};

/// Longest command line accepted, terminator excluded.
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, PartialEq, Eq)]
enum Incoming {
    Line(String),
    /// The line went past [`MAX_LINE_LEN`] and was skipped up to its end.
    Oversized,
}

/// Reads one line into `buf` without ever holding more than
/// `MAX_LINE_LEN + 1` bytes of it. Invalid UTF-8 is replaced rather than
/// rejected, so such a line simply fails to parse as a command.
async fn next_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<Incoming>> {
    let limit = MAX_LINE_LEN as u64 + 1;

    buf.clear();
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') && buf.len() > MAX_LINE_LEN {
        loop {
            buf.clear();
            let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
            if read == 0 || buf.last() == Some(&b'\n') {
                break;
            }
        }
        buf.clear();
        return Ok(Some(Incoming::Oversized));
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(Incoming::Line(String::from_utf8_lossy(buf).into_owned())))
}

/// Writes `text` one line at a time, each terminated by `\n`.
async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> io::Result<()> {
    let mut buffer = String::with_capacity(text.len() + 1);
    for line in text.split('\n') {
        buffer.push_str(line);
        buffer.push('\n');
    }
    writer.write_all(buffer.as_bytes()).await?;
    writer.flush().await
}

/// Serves one player until they leave, explode (outside debug mode), or the
/// socket fails. The player is counted for exactly as long as this runs.
#[instrument(level = "trace", skip(game, stream, debug))]
pub async fn handle_connection(game: SharedGame, stream: TcpStream, peer: SocketAddr, debug: bool) {
    let connection_id = Uuid::new_v4();

    let hello = {
        let mut game = game.lock().await;
        game.join()
    };

    info!("Client {} connected (connection: {})", peer, connection_id);

    if let Err(e) = serve(&game, stream, &hello, debug, connection_id).await {
        warn!("I/O error on connection {}: {}", connection_id, e);
    }

    {
        let mut game = game.lock().await;
        game.leave();
    }

    info!(
        "Client {} disconnected (connection: {})",
        peer, connection_id
    );
}

async fn serve(
    game: &SharedGame,
    stream: TcpStream,
    hello: &str,
    debug: bool,
    connection_id: Uuid,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    write_lines(&mut writer, hello).await?;

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    while let Some(incoming) = next_line(&mut reader, &mut buf).await? {
        let reply = match incoming {
            Incoming::Line(line) => match line.parse::<Command>() {
                Ok(command) => {
                    debug!("Connection {} sent {:?}", connection_id, command);
                    let mut game = game.lock().await;
                    game.execute(command)
                }
                Err(e) => {
                    debug!("Connection {}: {}", connection_id, e);
                    Reply::Help
                }
            },
            Incoming::Oversized => {
                warn!(
                    "Connection {} sent a line longer than {} bytes",
                    connection_id, MAX_LINE_LEN
                );
                Reply::Help
            }
        };

        let Some(text) = reply.text() else {
            info!("Connection {} said bye", connection_id);
            break;
        };
        write_lines(&mut writer, text).await?;

        if reply == Reply::Boom && !debug {
            info!("Disconnecting {} after BOOM", connection_id);
            break;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of connection {} failed: {}", connection_id, e);
    }
    Ok(())
}
