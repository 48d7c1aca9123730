// Range selection from stdin
use crate::domain::telemetry::{TimeRange, UnknownTimeRange};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Blank lines select nothing.
pub fn parse_range_command(line: &str) -> Option<Result<TimeRange, UnknownTimeRange>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(line.parse())
}

/// Forward each range typed on stdin to the scheduler until stdin closes
/// or the scheduler stops listening.
pub fn spawn_stdin_ranges(tx: mpsc::Sender<TimeRange>) -> JoinHandle<()> {
    tokio::spawn(forward_ranges(BufReader::new(tokio::io::stdin()), tx))
}

async fn forward_ranges<R>(reader: R, tx: mpsc::Sender<TimeRange>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_range_command(&line) {
                Some(Ok(range)) => {
                    if tx.send(range).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => tracing::warn!("{}", e),
                None => {}
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading range input");
                break;
            }
        }
    }
}
