//! Prefixed identifier generation.
//!
//! Ids look like `room_m4k2x1_9f3c...`: an optional prefix, the current
//! unix-millis timestamp in base36, and 128 random bits in hex. Sortable
//! by creation time and unique for all practical purposes; collisions are
//! still handled by the room registry's retry loop.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Generate an id with the given prefix (empty prefix allowed).
pub fn generate_id(prefix: &str) -> String {
    let random: u128 = rand::rng().random();
    let timestamp = to_base36(Utc::now().timestamp_millis().max(0) as u64);
    if prefix.is_empty() {
        format!("{}_{:032x}", timestamp, random)
    } else {
        format!("{}_{}_{:032x}", prefix, timestamp, random)
    }
}

pub fn room_id() -> String {
    generate_id("room")
}

pub fn user_id() -> String {
    generate_id("user")
}

pub fn connection_id() -> String {
    generate_id("conn")
}

pub fn message_id() -> String {
    generate_id("msg")
}

pub fn log_id() -> String {
    generate_id("log")
}

pub fn recording_id() -> String {
    generate_id("rec")
}

pub fn login_id() -> String {
    generate_id("login")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix() {
        assert!(room_id().starts_with("room_"));
        assert!(message_id().starts_with("msg_"));
        assert!(recording_id().starts_with("rec_"));
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_id("x");
        let b = generate_id("x");
        assert_ne!(a, b);
    }

    #[test]
    fn generated_room_ids_pass_validation() {
        assert!(crate::validate::validate_room_id(&room_id()));
    }

    #[test]
    fn base36_round_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
