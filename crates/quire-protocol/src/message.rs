// message.rs — Line framing for stream transports.
//
// On a stream, the trusted side writes one JSON object per line. A line is
// either a Response (has "requestId") or a Notification (has "event").

use serde_json::Value;

use crate::error::ProtocolError;
use crate::notification::Notification;
use crate::response::Response;

/// One line written by the trusted side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    Response(Response),
    Notification(Notification),
}

impl HostMessage {
    /// Encode as a single line of JSON (without the trailing newline).
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        let line = match self {
            HostMessage::Response(response) => serde_json::to_string(response)?,
            HostMessage::Notification(notification) => serde_json::to_string(notification)?,
        };
        Ok(line)
    }

    /// Decode one line.
    pub fn from_line(line: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(line)?;
        if value.get("requestId").is_some() {
            return Ok(HostMessage::Response(Response::try_from(value)?));
        }
        if value.get("event").is_some() {
            return Ok(HostMessage::Notification(serde_json::from_value(value)?));
        }
        Err(ProtocolError::UnrecognizedMessage(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::FileChanged;
    use crate::response::Payload;
    use uuid::Uuid;

    #[test]
    fn response_line_is_recognized() {
        let msg = HostMessage::Response(Response::success(Uuid::new_v4(), Payload::Written));
        let line = msg.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(HostMessage::from_line(&line).unwrap(), msg);
    }

    #[test]
    fn notification_line_is_recognized() {
        let msg = HostMessage::Notification(Notification::FileChanged(FileChanged::now("/x")));
        let line = msg.to_line().unwrap();
        assert_eq!(HostMessage::from_line(&line).unwrap(), msg);
    }

    #[test]
    fn unrelated_object_is_rejected() {
        let err = HostMessage::from_line(r#"{"hello": "world"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnrecognizedMessage(_)));
    }
}
