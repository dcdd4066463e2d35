//! Whiteboard action payloads.
//!
//! Actions arrive as JSON objects tagged by `kind` and decode into one sum
//! type, so an unknown kind or a mistyped field is rejected at the decode
//! boundary rather than probed for downstream. Field names match the wire
//! format the client sends (camelCase).

use serde::{Deserialize, Serialize};

/// A two-point stroke segment shared by draw, erase, and brush actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "prevX", default, skip_serializing_if = "Option::is_none")]
    pub prev_x: Option<f64>,
    #[serde(rename = "prevY", default, skip_serializing_if = "Option::is_none")]
    pub prev_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "strokeWidth",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_width: Option<f64>,
    /// Client-side unix-millis timestamp, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// A shape outline: start corner to end corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "startX", default, skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(rename = "startY", default, skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    #[serde(
        rename = "shapeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "strokeWidth",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// A text placement on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(
        rename = "textBoxId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text_box_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// One atomic whiteboard mutation. Immutable once appended to a room's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    Draw(Segment),
    Erase(Segment),
    Brush(Segment),
    Shape(Shape),
    Text(TextPlacement),
    /// Log-reset marker; carries no payload.
    Clear,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Draw(_) => "draw",
            Action::Erase(_) => "erase",
            Action::Brush(_) => "brush",
            Action::Shape(_) => "shape",
            Action::Text(_) => "text",
            Action::Clear => "clear",
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Action::Clear)
    }

    pub fn stroke_width(&self) -> Option<f64> {
        match self {
            Action::Draw(s) | Action::Erase(s) | Action::Brush(s) => s.stroke_width,
            Action::Shape(s) => s.stroke_width,
            Action::Text(_) | Action::Clear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_draw() {
        let json = r##"{"kind":"draw","prevX":0,"prevY":0,"x":10,"y":10,"color":"#000000","strokeWidth":2}"##;
        let action: Action = serde_json::from_str(json).unwrap();
        match &action {
            Action::Draw(seg) => {
                assert_eq!(seg.x, 10.0);
                assert_eq!(seg.prev_x, Some(0.0));
                assert_eq!(seg.color.as_deref(), Some("#000000"));
                assert_eq!(seg.stroke_width, Some(2.0));
            }
            other => panic!("expected draw, got {:?}", other),
        }
        assert_eq!(action.kind(), "draw");
    }

    #[test]
    fn rejects_unknown_kind() {
        let json = r#"{"kind":"scribble","x":1,"y":2}"#;
        assert!(serde_json::from_str::<Action>(json).is_err());
    }

    #[test]
    fn rejects_missing_coordinates() {
        let json = r##"{"kind":"draw","color":"#fff"}"##;
        assert!(serde_json::from_str::<Action>(json).is_err());
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let json = r#"{"kind":"erase","x":"ten","y":5}"#;
        assert!(serde_json::from_str::<Action>(json).is_err());
    }

    #[test]
    fn rejects_non_string_color() {
        let json = r#"{"kind":"draw","x":1,"y":2,"color":7}"#;
        assert!(serde_json::from_str::<Action>(json).is_err());
    }

    #[test]
    fn clear_has_no_payload() {
        let action: Action = serde_json::from_str(r#"{"kind":"clear"}"#).unwrap();
        assert!(action.is_clear());
        assert_eq!(serde_json::to_string(&action).unwrap(), r#"{"kind":"clear"}"#);
    }

    #[test]
    fn text_round_trips_wire_names() {
        let json = r#"{"kind":"text","x":5,"y":6,"text":"hello","fontSize":14,"textBoxId":"tb1"}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&action).unwrap();
        assert_eq!(back["fontSize"], 14.0);
        assert_eq!(back["textBoxId"], "tb1");
        assert_eq!(back["kind"], "text");
    }
}
