// src/app.rs
//
// Interactive session: open the port, read operator lines until exit or a
// fatal fault, then close the port.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::console::Console;
use crate::controller::{Controller, Submission};
use crate::error::FatalFault;
use crate::export::StreamSessionManager;
use crate::io::serial::SerialTransport;
use crate::settings::AppSettings;

pub const PROMPT: &str = "Enter a command ($<command>;) or $exit; to exit:";
const EXIT_NOTICE: &str = "Exiting the TenzrController.";

/// Connect with `settings`, run the operator loop on stdin, disconnect.
pub async fn run(settings: &AppSettings, console: Arc<dyn Console>) -> Result<(), FatalFault> {
    let config = settings.serial_config();
    let transport = SerialTransport::open(&config)?;
    console.notice(&format!("Connected to {} at {} Bd.", config.port, config.baud_rate));

    let controller = Controller::new(
        Box::new(transport),
        StreamSessionManager::new(&settings.export_dir),
        settings.controller_options(),
        console.clone(),
    );
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(controller, console, stdin, config.baud_rate).await
}

/// Run `controller` against `input` until it finishes, then shut it down.
///
/// The first fault wins: a close failure after a fault is only logged.
pub async fn serve<R>(
    mut controller: Controller,
    console: Arc<dyn Console>,
    input: R,
    baud_rate: u32,
) -> Result<(), FatalFault>
where
    R: AsyncBufRead + Unpin,
{
    controller.spawn_receiver();
    let driven = drive(&mut controller, console.as_ref(), input).await;
    let closed = controller.shutdown().await;

    match (driven, closed) {
        (Err(fault), Err(e)) => {
            warn!("[controller] Close after fault also failed: {}", e);
            Err(fault)
        }
        (Err(fault), Ok(())) => Err(fault),
        (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => {
            console.notice(&format!(
                "Connection with {} at {} Bd closed.",
                controller.port_name(),
                baud_rate
            ));
            Ok(())
        }
    }
}

/// Operator loop. Returns Ok on `$exit;`, a blank line or end of input, and
/// the fault if either flow hits one.
pub async fn drive<R>(controller: &mut Controller, console: &dyn Console, input: R) -> Result<(), FatalFault>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        console.notice(PROMPT);

        // Faults first: no operator line is submitted once the link has failed
        let line = tokio::select! {
            biased;
            Some(fault) = controller.next_fault() => return Err(fault),
            line = lines.next_line() => line,
        };

        let text = match line {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                info!("[controller] End of operator input");
                console.notice(EXIT_NOTICE);
                return Ok(());
            }
            Err(e) => {
                warn!("[controller] Failed to read operator input: {}", e);
                console.notice(EXIT_NOTICE);
                return Ok(());
            }
        };

        match controller.submit(&text)? {
            Submission::Sent(_) | Submission::Rejected(_) => {}
            Submission::Exit => {
                console.notice(EXIT_NOTICE);
                return Ok(());
            }
            Submission::Ignored => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::RecordingConsole;
    use crate::controller::{ControllerOptions, ControllerState};
    use crate::error::TransportError;
    use crate::io::mock::MockTransport;
    use std::time::Duration;

    fn controller(transport: &MockTransport, console: &Arc<RecordingConsole>, dir: &tempfile::TempDir) -> Controller {
        let options = ControllerOptions {
            poll_interval: Duration::from_millis(1),
            ..ControllerOptions::default()
        };
        Controller::new(
            Box::new(transport.clone()),
            StreamSessionManager::new(dir.path().join("exportedData")),
            options,
            console.clone(),
        )
    }

    #[tokio::test]
    async fn test_exit_while_streaming_closes_connection() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let console = Arc::new(RecordingConsole::default());
        let controller = controller(&transport, &console, &dir);

        let input: &[u8] = b"$stream;\n$exit;\n$menu;\n";
        serve(controller, console.clone(), input, 921_600).await.unwrap();

        assert_eq!(transport.written(), vec!["$stream;"]);
        assert!(transport.is_closed());
        let notices = console.notice_lines();
        assert_eq!(notices[0], PROMPT);
        assert!(notices.contains(&"Sent: $stream;".to_string()));
        assert!(notices.contains(&EXIT_NOTICE.to_string()));
        assert_eq!(
            notices.last().map(String::as_str),
            Some("Connection with mock at 921600 Bd closed.")
        );
    }

    #[tokio::test]
    async fn test_blank_line_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let console = Arc::new(RecordingConsole::default());
        let controller = controller(&transport, &console, &dir);

        let input: &[u8] = b"$menu;\n$freq, 500;\n\n$freq, 5;\n";
        serve(controller, console.clone(), input, 115_200).await.unwrap();

        assert_eq!(transport.written(), vec!["$menu;"]);
        assert!(console
            .notice_lines()
            .iter()
            .any(|n| n.starts_with("Command Invalid")));
        assert!(transport.is_closed());
    }

    #[tokio::test]
    async fn test_end_of_input_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let console = Arc::new(RecordingConsole::default());
        let mut controller = controller(&transport, &console, &dir);

        let input: &[u8] = b"";
        drive(&mut controller, console.as_ref(), input).await.unwrap();

        assert_eq!(console.notice_lines(), vec![PROMPT, EXIT_NOTICE]);
        assert_eq!(controller.state(), ControllerState::Connected);
        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_pending_fault_wins_over_ready_input() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let console = Arc::new(RecordingConsole::default());
        let mut controller = controller(&transport, &console, &dir);
        controller.queue_fault(FatalFault::Transport(TransportError::Poisoned));

        let input: &[u8] = b"$menu;\n$stream;\n";
        let result = drive(&mut controller, console.as_ref(), input).await;

        assert!(matches!(result, Err(FatalFault::Transport(TransportError::Poisoned))));
        assert!(transport.written().is_empty());
        assert_eq!(console.notice_lines(), vec![PROMPT]);
        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_receiver_fault_ends_operator_loop() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new();
        let console = Arc::new(RecordingConsole::default());
        let controller = controller(&transport, &console, &dir);
        transport.fail_reads();

        // Writer half kept alive so operator input never arrives
        let (_writer, reader) = tokio::io::duplex(64);
        let input = tokio::io::BufReader::new(reader);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve(controller, console.clone(), input, 921_600),
        )
        .await
        .expect("fault should end the session");

        assert!(matches!(result, Err(FatalFault::Transport(_))));
        assert!(transport.is_closed());
        assert!(!console
            .notice_lines()
            .iter()
            .any(|n| n.starts_with("Connection with")));
    }
}
