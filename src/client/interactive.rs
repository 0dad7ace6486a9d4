//! Interactive prompt loop.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};

use super::menu::{self, MainChoice};
use super::session::{ClientError, ClientSession};
use crate::protocol::Response;
use crate::timezone::ZoneEntry;

/// Prompt, send, print; repeat until `input` ends.
///
/// Cancellation (Ctrl-C) is handled by the caller dropping this future.
pub async fn run_interactive<S, R, W>(
    session: &mut ClientSession<S>,
    zones: &[ZoneEntry],
    input: R,
    output: &mut W,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        menu::write_main_menu(output).map_err(ClientError::Terminal)?;
        let Some(line) = lines.next_line().await.map_err(ClientError::Terminal)? else {
            return Ok(());
        };

        match menu::parse_main_choice(&line) {
            Ok(MainChoice::GetTime) => {
                let response = session.get_time().await?;
                let label = match response {
                    Response::Time(_) => "Current time: ",
                    _ => "",
                };
                writeln!(output, "{label}{response}").map_err(ClientError::Terminal)?;
            }
            Ok(MainChoice::SetTimezone) => {
                menu::write_zone_menu(output, zones).map_err(ClientError::Terminal)?;
                let Some(line) = lines.next_line().await.map_err(ClientError::Terminal)? else {
                    return Ok(());
                };
                match menu::parse_zone_choice(&line, zones) {
                    Ok(zone) => {
                        let response = session.set_timezone(&zone.code).await?;
                        writeln!(output, "{response}").map_err(ClientError::Terminal)?;
                    }
                    Err(e) => writeln!(output, "{e}").map_err(ClientError::Terminal)?,
                }
            }
            Err(e) => writeln!(output, "{e}").map_err(ClientError::Terminal)?,
        }
    }
}
