//! Transient status messages ("Listening...", "+10 points! Great job!").

use chrono::{DateTime, Duration, Utc};

/// How long a status message stays visible.
pub const STATUS_TTL_SECS: i64 = 3;

pub trait StatusSink {
    fn report(&mut self, message: &str);
}

/// Collects every message; handy for tests and for batch output.
impl StatusSink for Vec<String> {
    fn report(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Holds the latest message until it expires.
///
/// A new message replaces the previous one and restarts the timer.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    ttl: Duration,
    current: Option<(String, DateTime<Utc>)>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(Duration::seconds(STATUS_TTL_SECS))
    }
}

impl StatusBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn report_at(&mut self, message: &str, now: DateTime<Utc>) {
        self.current = Some((message.to_string(), now + self.ttl));
    }

    /// Message visible at `now`, if it has not expired.
    pub fn current_at(&self, now: DateTime<Utc>) -> Option<&str> {
        match &self.current {
            Some((msg, expires)) if now < *expires => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current_at(Utc::now())
    }

    /// Drop the message and its timer (the owning view went away).
    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl StatusSink for StatusBoard {
    fn report(&mut self, message: &str) {
        self.report_at(message, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_message_expires_after_ttl() {
        let mut board = StatusBoard::default();
        board.report_at("Listening...", t0());
        assert_eq!(board.current_at(t0() + Duration::seconds(2)), Some("Listening..."));
        assert_eq!(board.current_at(t0() + Duration::seconds(3)), None);
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let mut board = StatusBoard::default();
        board.report_at("Listening...", t0());
        board.report_at("Heard: \"next\"", t0() + Duration::seconds(2));
        assert_eq!(
            board.current_at(t0() + Duration::seconds(4)),
            Some("Heard: \"next\"")
        );
    }

    #[test]
    fn test_clear_cancels() {
        let mut board = StatusBoard::default();
        board.report_at("x", t0());
        board.clear();
        assert_eq!(board.current_at(t0()), None);
    }
}
