use crate::message::{ClientEvent, ServerEvent, ToolOptions};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MAX_COLOR_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed json frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary frame: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("line width must be a positive finite number, got {0}")]
    InvalidLineWidth(f64),
    #[error("color must be between 1 and 64 bytes")]
    InvalidColor,
    #[error("point coordinates must be finite")]
    NonFinitePoint,
    #[error("unknown wire format `{0}`")]
    UnknownFormat(String),
}

/// Frame encoding of one connection. JSON travels in text frames, bincode in binary frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    Bincode,
}

impl FromStr for WireFormat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(WireFormat::Json),
            "bincode" | "binary" => Ok(WireFormat::Bincode),
            other => Err(ProtocolError::UnknownFormat(other.to_owned())),
        }
    }
}

pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl WireFormat {
    pub fn encode(&self, event: &ServerEvent) -> Result<Frame, ProtocolError> {
        match self {
            WireFormat::Json => Ok(Frame::Text(serde_json::to_string(event)?)),
            WireFormat::Bincode => Ok(Frame::Binary(bincode::serialize(event)?)),
        }
    }
}

pub fn decode_text(text: &str) -> Result<ClientEvent, ProtocolError> {
    let event = serde_json::from_str::<ClientEvent>(text)?;
    validate(&event)?;
    Ok(event)
}

pub fn decode_binary(bytes: &[u8]) -> Result<ClientEvent, ProtocolError> {
    let event = bincode::deserialize::<ClientEvent>(bytes)?;
    validate(&event)?;
    Ok(event)
}

/// Rejects payloads that would put unrenderable data into shared state.
pub fn validate(event: &ClientEvent) -> Result<(), ProtocolError> {
    match event {
        ClientEvent::BeginStroke(options) => validate_options(options),
        ClientEvent::DrawPoint(point) | ClientEvent::Cursor(point) => {
            if point.is_finite() {
                Ok(())
            } else {
                Err(ProtocolError::NonFinitePoint)
            }
        }
        ClientEvent::EndStroke | ClientEvent::Undo | ClientEvent::Redo => Ok(()),
    }
}

fn validate_options(options: &ToolOptions) -> Result<(), ProtocolError> {
    if !(options.line_width.is_finite() && options.line_width > 0.0) {
        return Err(ProtocolError::InvalidLineWidth(options.line_width));
    }
    if options.color.is_empty() || options.color.len() > MAX_COLOR_LEN {
        return Err(ProtocolError::InvalidColor);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Point, Tool};

    #[test]
    fn it_decodes_json_and_bincode_alike() {
        let event = ClientEvent::DrawPoint(Point::new(3.0, 4.5));
        let json = serde_json::to_string(&event).unwrap();
        let bytes = bincode::serialize(&event).unwrap();

        assert_eq!(decode_text(&json).unwrap(), event);
        assert_eq!(decode_binary(&bytes).unwrap(), event);
    }

    #[test]
    fn it_rejects_unknown_event_kind() {
        assert!(matches!(
            decode_text(r#"{"erase-everything":null}"#),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(decode_binary(&[0xff, 0, 0, 0]), Err(ProtocolError::Bincode(_))));
    }

    #[test]
    fn it_rejects_non_positive_line_width() {
        let result = decode_text(r##"{"begin-stroke":{"tool":"brush","color":"#fff","lineWidth":0}}"##);
        assert!(matches!(result, Err(ProtocolError::InvalidLineWidth(_))));

        let event = ClientEvent::BeginStroke(ToolOptions {
            tool: Tool::Brush,
            color: "#fff".into(),
            line_width: f64::NAN,
        });
        assert!(matches!(validate(&event), Err(ProtocolError::InvalidLineWidth(_))));
    }

    #[test]
    fn it_rejects_empty_color() {
        let event = ClientEvent::BeginStroke(ToolOptions {
            tool: Tool::Eraser,
            color: String::new(),
            line_width: 3.0,
        });
        assert!(matches!(validate(&event), Err(ProtocolError::InvalidColor)));
    }

    #[test]
    fn it_rejects_non_finite_points() {
        let event = ClientEvent::Cursor(Point::new(f64::INFINITY, 0.0));
        assert!(matches!(validate(&event), Err(ProtocolError::NonFinitePoint)));
    }

    #[test]
    fn it_parses_wire_format() {
        assert_eq!("json".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert_eq!("bincode".parse::<WireFormat>().unwrap(), WireFormat::Bincode);
        assert!("xml".parse::<WireFormat>().is_err());
        assert_eq!(WireFormat::default(), WireFormat::Json);
    }
}
