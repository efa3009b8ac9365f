//! Operator input from the terminal
//!
//! One command per line: `ack`, `spectate <icao>`, `clear`. Any line counts
//! as operator interaction, which unlocks audio cues.
//!
//! Input is read on a dedicated OS thread: a blocked terminal read must not
//! hold up runtime shutdown.

use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use radar_compliance::{ActivationFlag, FlightId, OperatorCommand, OperatorHandle};
use tracing::{debug, warn};

/// Parse one input line.
pub fn parse_command(line: &str) -> Option<OperatorCommand> {
    let mut words = line.split_whitespace();
    match (words.next()?, words.next(), words.next()) {
        ("ack" | "a" | "ok", None, _) => Some(OperatorCommand::Acknowledge),
        ("spectate" | "s", Some(icao), None) => {
            Some(OperatorCommand::Spectate(FlightId::new(icao)))
        }
        ("clear" | "c", None, _) => Some(OperatorCommand::ClearSpectate),
        _ => None,
    }
}

/// Forward commands from `reader` until it closes or the monitor stops.
///
/// Blocks the calling thread.
pub fn forward_commands<R: BufRead>(reader: R, operator: &OperatorHandle, activation: &ActivationFlag) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Operator input failed");
                break;
            }
        };

        activation.mark_interacted();

        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                println!("commands: ack | spectate <icao> | clear");
            }
            continue;
        };

        debug!(command = ?command, "Operator command");
        if operator.blocking_send(command).is_err() {
            break;
        }
    }
}

/// Read operator commands from stdin on a background thread.
pub fn spawn_console_input(
    operator: OperatorHandle,
    activation: Arc<ActivationFlag>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("radar-console-input".into())
        .spawn(move || forward_commands(std::io::stdin().lock(), &operator, &activation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_compliance::UserActivation;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("ack"), Some(OperatorCommand::Acknowledge));
        assert_eq!(parse_command("  ok "), Some(OperatorCommand::Acknowledge));
        assert_eq!(
            parse_command("spectate 4CA1FA"),
            Some(OperatorCommand::Spectate(FlightId::new("4CA1FA")))
        );
        assert_eq!(parse_command("clear"), Some(OperatorCommand::ClearSpectate));
        assert_eq!(parse_command("spectate"), None);
        assert_eq!(parse_command("spectate a b"), None);
        assert_eq!(parse_command("ack now"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_forward_commands() {
        let (operator, mut commands) = OperatorHandle::channel(8);
        let activation = ActivationFlag::default();
        let input: &[u8] = b"help\nspectate abc123\nack\n";

        forward_commands(input, &operator, &activation);
        drop(operator);

        assert!(activation.has_interacted());
        assert_eq!(
            commands.blocking_recv(),
            Some(OperatorCommand::Spectate(FlightId::new("abc123")))
        );
        assert_eq!(commands.blocking_recv(), Some(OperatorCommand::Acknowledge));
        assert_eq!(commands.blocking_recv(), None);
    }

    #[test]
    fn test_stops_when_monitor_gone() {
        let (operator, commands) = OperatorHandle::channel(1);
        drop(commands);
        let activation = ActivationFlag::default();

        // Returns instead of blocking on the closed channel.
        forward_commands(&b"ack\nack\n"[..], &operator, &activation);
        assert!(activation.has_interacted());
    }
}
