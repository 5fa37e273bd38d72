//! Console task: line commands on UART1 from the companion app or a terminal.
//!
//! Writes become bus events; `get` is answered from the last published
//! settings without involving the dispatcher.

use defmt::{info, warn};
use embassy_rp::uart::{Async, UartTx};

use compass_core::transport::status_line;
use compass_core::{parse_command, Command, CommandError, Source};

use crate::line_reader::LineReader;
use crate::shared::{post, SETTINGS};

pub async fn run(mut reader: LineReader<'static>, mut tx: UartTx<'static, Async>) -> ! {
    info!("console ready");

    loop {
        if let Err(e) = reader.read_line().await {
            warn!("console uart error: {:?}", e);
            continue;
        }
        if reader.line().iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let reply: &[u8] = match parse_command(reader.line()) {
            Ok(Command::Query) => match SETTINGS.try_get() {
                Some(current) => {
                    let line = status_line(&current);
                    let _ = tx.write(line.as_bytes()).await;
                    b"\r\n"
                }
                None => b"err not ready\r\n",
            },
            Ok(command) => match command.into_event(Source::Console) {
                Some(event) => match post(event).await {
                    Ok(()) => b"ok\r\n",
                    Err(_) => b"err busy\r\n",
                },
                None => b"ok\r\n",
            },
            Err(CommandError::Unknown) => b"err unknown command\r\n",
            Err(CommandError::Parse) => b"err parse\r\n",
            Err(CommandError::Range) => b"err range\r\n",
        };

        if let Err(e) = tx.write(reply).await {
            warn!("console write failed: {:?}", e);
        }
    }
}
