//! Session-facing access-control filter.
//!
//! A session owns one [`ProxyGate`] per client connection and pushes every
//! byte read from the client through [`ProxyGate::feed`]. The gate decodes
//! complete messages, classifies them, and tells the session what to do with
//! each one; all socket I/O stays with the session.

use tracing::debug;

use crate::classify::is_read_only;
use crate::error::GateError;
use crate::wire::{Decoder, DecoderLimits, Message, SvnItem, encode_item};

/// Subversion's "not authorized" error code (`SVN_ERR_RA_NOT_AUTHORIZED`).
pub const SVN_ERR_RA_NOT_AUTHORIZED: i64 = 170001;

/// What a session must do with one completed client message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Send these bytes to the upstream server verbatim.
    ///
    /// These are the captured raw bytes of the message, never a
    /// re-serialization, so classification can never alter what the real
    /// server receives — even for protocol-legal but unusual formatting.
    Forward(Vec<u8>),
    /// Send this serialized `failure` response back to the client and forward
    /// nothing upstream.
    Reject(Vec<u8>),
}

/// Decodes and classifies one client connection's command stream.
#[derive(Debug)]
pub struct ProxyGate {
    decoder: Decoder,
    write_allowed: bool,
}

impl ProxyGate {
    /// Creates a gate for a connection with or without write permission.
    pub fn new(write_allowed: bool) -> Self {
        Self::with_limits(write_allowed, DecoderLimits::default())
    }

    /// Creates a gate with explicit decoder budgets.
    pub fn with_limits(write_allowed: bool, limits: DecoderLimits) -> Self {
        Self {
            decoder: Decoder::with_limits(limits),
            write_allowed,
        }
    }

    /// Feeds client bytes in and returns one action per completed message.
    ///
    /// Write commands from a read-only connection yield
    /// [`GateAction::Reject`]; everything else is forwarded. Errors are
    /// connection-fatal: the session must close the socket and drop the gate.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<GateAction>, GateError> {
        let mut actions = Vec::new();
        for message in self.decoder.feed(bytes)? {
            actions.push(self.decide(message)?);
        }
        Ok(actions)
    }

    fn decide(&self, message: Message) -> Result<GateAction, GateError> {
        let read_only = is_read_only(&message.structure)?;
        let command = message.command().unwrap_or_default();
        if self.write_allowed || read_only {
            debug!(command, read_only, "forwarding command");
            Ok(GateAction::Forward(message.raw))
        } else {
            debug!(command, "rejecting write command on read-only connection");
            Ok(GateAction::Reject(failure_response(
                SVN_ERR_RA_NOT_AUTHORIZED,
                &format!("write access denied for command '{command}'"),
            )))
        }
    }
}

/// Serializes a `failure` response: `( failure ( ( code msg file line ) ) )`.
///
/// The server-side file and line slots are sent empty, as a proxy has nothing
/// meaningful to put there.
pub fn failure_response(code: i64, message: &str) -> Vec<u8> {
    let item = SvnItem::List(vec![
        SvnItem::Word("failure".to_string()),
        SvnItem::List(vec![SvnItem::List(vec![
            SvnItem::Number(code),
            SvnItem::String(message.as_bytes().to_vec()),
            SvnItem::String(Vec::new()),
            SvnItem::Number(0),
        ])]),
    ]);
    let mut buf = Vec::new();
    encode_item(&item, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::Decoder;

    #[test]
    fn read_only_connection_forwards_read_commands_verbatim() {
        let mut gate = ProxyGate::new(false);
        // Trailing newline is protocol-legal; the forwarded bytes must keep it.
        let wire = b"( get-file ( 3:foo ) )\n";
        let actions = gate.feed(wire).unwrap();
        assert_eq!(actions, vec![GateAction::Forward(wire.to_vec())]);
    }

    #[test]
    fn read_only_connection_rejects_write_commands() {
        let mut gate = ProxyGate::new(false);
        let actions = gate.feed(b"( commit ( 3:msg ) ) ").unwrap();
        assert_eq!(actions.len(), 1);
        let GateAction::Reject(response) = &actions[0] else {
            panic!("expected a rejection, got {:?}", actions[0]);
        };

        let mut decoder = Decoder::new();
        let messages = decoder.feed(response).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].command(), Some("failure"));
        let parts = messages[0].structure.as_list().unwrap();
        let err = parts[1].as_list().unwrap()[0].as_list().unwrap();
        assert_eq!(err[0].as_i64(), Some(SVN_ERR_RA_NOT_AUTHORIZED));
    }

    #[test]
    fn writable_connection_forwards_everything() {
        let mut gate = ProxyGate::new(true);
        let wire = b"( commit ( 3:msg ) ) ";
        let actions = gate.feed(wire).unwrap();
        assert_eq!(actions, vec![GateAction::Forward(wire.to_vec())]);
    }

    #[test]
    fn unknown_commands_are_rejected_without_write_permission() {
        let mut gate = ProxyGate::new(false);
        let actions = gate.feed(b"( frobnicate ( ) ) ").unwrap();
        assert!(matches!(actions[0], GateAction::Reject(_)));
    }

    #[test]
    fn one_feed_can_yield_mixed_actions() {
        let mut gate = ProxyGate::new(false);
        let actions = gate
            .feed(b"( status ( ) ) ( lock ( 4:path ) ) ( log ( ) ) ")
            .unwrap();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[0], GateAction::Forward(_)));
        assert!(matches!(actions[1], GateAction::Reject(_)));
        assert!(matches!(actions[2], GateAction::Forward(_)));
    }

    #[test]
    fn partial_command_yields_no_action_until_complete() {
        let mut gate = ProxyGate::new(false);
        assert!(gate.feed(b"( stat").unwrap().is_empty());
        let actions = gate.feed(b"us ( ) ) ").unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], GateAction::Forward(_)));
    }

    #[test]
    fn malformed_command_is_connection_fatal() {
        let mut gate = ProxyGate::new(false);
        let err = gate.feed(b"( 5 ( ) ) ").unwrap_err();
        assert!(matches!(err, GateError::MalformedCommand(_)));
    }

    #[test]
    fn failure_response_roundtrips_through_the_decoder() {
        let bytes = failure_response(1, "boom");
        assert_eq!(bytes, b"( failure ( ( 1 4:boom 0: 0 ) ) ) ");
    }
}
