//! Input validation for room ids, usernames, and whiteboard actions.
//!
//! All functions are pure: they never mutate state, and callers reject the
//! triggering event (signalling the originating connection only) on failure.

use crate::rooms::action::Action;

/// Maximum stroke width accepted for any drawing action.
const MAX_STROKE_WIDTH: f64 = 100.0;

/// A room id is alphanumeric plus `_`/`-`, at least 5 characters.
/// Accepts both generated ids (`room_<ts>_<hex>`) and user-entered ones.
pub fn validate_room_id(room_id: &str) -> bool {
    room_id.len() >= 5
        && room_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A username is 1-30 characters after trimming, alphanumeric and spaces.
pub fn validate_username(username: &str) -> bool {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    len >= 1
        && len <= 30
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
}

/// Validate a decoded whiteboard action.
///
/// The tagged decode already guarantees the `kind` is recognized and fields
/// are well-typed; this checks the numeric bounds: finite coordinates for
/// every non-clear kind, and strokeWidth within [0, 100] when present.
/// Shape/text-specific fields are deliberately not bounds-checked further.
pub fn validate_action(action: &Action) -> bool {
    let finite = |v: Option<f64>| v.is_none_or(f64::is_finite);

    let geometry_ok = match action {
        Action::Clear => return true,
        Action::Draw(seg) | Action::Erase(seg) | Action::Brush(seg) => {
            seg.x.is_finite()
                && seg.y.is_finite()
                && finite(seg.prev_x)
                && finite(seg.prev_y)
        }
        Action::Shape(shape) => {
            shape.x.is_finite()
                && shape.y.is_finite()
                && finite(shape.start_x)
                && finite(shape.start_y)
        }
        Action::Text(text) => text.x.is_finite() && text.y.is_finite(),
    };

    geometry_ok
        && action
            .stroke_width()
            .is_none_or(|w| w.is_finite() && (0.0..=MAX_STROKE_WIDTH).contains(&w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::action::Segment;

    fn segment(x: f64, y: f64, stroke_width: Option<f64>) -> Segment {
        Segment {
            x,
            y,
            prev_x: None,
            prev_y: None,
            color: Some("#000000".to_string()),
            stroke_width,
            timestamp: None,
        }
    }

    #[test]
    fn room_id_format() {
        assert!(validate_room_id("abc12"));
        assert!(validate_room_id("room_m4k2_deadbeef"));
        assert!(validate_room_id("with-dash_and_underscore1"));
        assert!(!validate_room_id("abcd")); // too short
        assert!(!validate_room_id(""));
        assert!(!validate_room_id("has space"));
        assert!(!validate_room_id("bad!chars"));
    }

    #[test]
    fn username_format() {
        assert!(validate_username("alice"));
        assert!(validate_username("Alice Smith 2"));
        assert!(validate_username("  padded  ")); // trimmed before checks
        assert!(!validate_username(""));
        assert!(!validate_username("   "));
        assert!(!validate_username("a".repeat(31).as_str()));
        assert!(validate_username("a".repeat(30).as_str()));
        assert!(!validate_username("no@symbols"));
    }

    #[test]
    fn draw_requires_finite_coordinates() {
        assert!(validate_action(&Action::Draw(segment(1.0, 2.0, Some(2.0)))));
        assert!(!validate_action(&Action::Draw(segment(f64::NAN, 2.0, None))));
        assert!(!validate_action(&Action::Draw(segment(
            1.0,
            f64::INFINITY,
            None
        ))));
    }

    #[test]
    fn stroke_width_bounds() {
        assert!(validate_action(&Action::Erase(segment(0.0, 0.0, Some(0.0)))));
        assert!(validate_action(&Action::Erase(segment(
            0.0,
            0.0,
            Some(100.0)
        ))));
        assert!(!validate_action(&Action::Erase(segment(
            0.0,
            0.0,
            Some(-1.0)
        ))));
        assert!(!validate_action(&Action::Erase(segment(
            0.0,
            0.0,
            Some(100.5)
        ))));
    }

    #[test]
    fn clear_always_passes() {
        assert!(validate_action(&Action::Clear));
    }

    #[test]
    fn validation_is_deterministic() {
        let action = Action::Draw(segment(10.0, 10.0, Some(2.0)));
        for _ in 0..3 {
            assert!(validate_action(&action));
        }
    }
}
