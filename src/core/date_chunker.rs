use crate::domain::model::{DateWindow, TIMESTAMP_FORMAT};
use crate::utils::error::{AuditError, Result};
use chrono::{NaiveDateTime, TimeDelta};

/// Parses `YYYY-MM-DD HH:MM:SS.mmm`; the fraction may have any precision.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f").map_err(|_| {
        AuditError::TimestampError {
            value: value.to_string(),
        }
    })
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// 將 [start, end) 切成不超過一天的區間，end 會被截到 now。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateChunker {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateChunker {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.min(now),
        }
    }

    /// Like [`DateChunker::new`], but reports a collapsed range as `InvalidRange`.
    pub fn checked(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> Result<Self> {
        let chunker = Self::new(start, end, now);
        if chunker.is_empty() {
            return Err(AuditError::InvalidRange {
                start: format_timestamp(&chunker.start),
                end: format_timestamp(&chunker.end),
            });
        }
        Ok(chunker)
    }

    /// The end bound after clamping to "now".
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn windows(&self) -> DateWindows {
        DateWindows {
            cursor: self.start,
            end: self.end,
        }
    }
}

impl IntoIterator for &DateChunker {
    type Item = DateWindow;
    type IntoIter = DateWindows;

    fn into_iter(self) -> Self::IntoIter {
        self.windows()
    }
}

#[derive(Debug, Clone)]
pub struct DateWindows {
    cursor: NaiveDateTime,
    end: NaiveDateTime,
}

impl Iterator for DateWindows {
    type Item = DateWindow;

    fn next(&mut self) -> Option<DateWindow> {
        if self.cursor >= self.end {
            return None;
        }
        let next = self
            .cursor
            .checked_add_signed(TimeDelta::days(1))
            .map_or(self.end, |n| n.min(self.end));
        let window = DateWindow {
            start: self.cursor,
            end: next,
        };
        self.cursor = next;
        Some(window)
    }
}

impl std::iter::FusedIterator for DateWindows {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_windows_reconstruct_range() {
        let start = ts("2024-03-01 10:30:00.000");
        let end = ts("2024-03-04 08:00:00.250");
        let chunker = DateChunker::new(start, end, ts("2025-01-01 00:00:00.000"));

        let windows: Vec<DateWindow> = chunker.windows().collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows.first().unwrap().start, start);
        assert_eq!(windows.last().unwrap().end, end);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for w in &windows {
            assert!(w.end > w.start);
            assert!(w.end - w.start <= TimeDelta::days(1));
        }
    }

    #[test]
    fn test_end_is_clamped_to_now() {
        let now = ts("2024-03-02 12:00:00.000");
        let chunker = DateChunker::new(
            ts("2024-03-01 00:00:00.000"),
            ts("2024-03-10 00:00:00.000"),
            now,
        );
        assert_eq!(chunker.end(), now);
        let windows: Vec<_> = chunker.windows().collect();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].end, now);
    }

    #[test]
    fn test_collapsed_range_is_empty() {
        let now = ts("2024-03-01 00:00:00.000");
        let chunker = DateChunker::new(ts("2024-03-05 00:00:00.000"), ts("2024-03-06 00:00:00.000"), now);
        assert!(chunker.is_empty());
        assert_eq!(chunker.windows().count(), 0);

        let err = DateChunker::checked(ts("2024-03-05 00:00:00.000"), ts("2024-03-06 00:00:00.000"), now);
        assert!(matches!(err, Err(AuditError::InvalidRange { .. })));
    }

    #[test]
    fn test_windows_are_restartable() {
        let chunker = DateChunker::new(
            ts("2024-01-01 00:00:00.000"),
            ts("2024-01-03 00:00:00.000"),
            ts("2024-06-01 00:00:00.000"),
        );
        let first: Vec<_> = chunker.windows().collect();
        let second: Vec<_> = (&chunker).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_wire_format_is_millisecond_padded() {
        let window = DateWindow {
            start: ts("2024-01-01 00:00:00.5"),
            end: ts("2024-01-01 09:05:03.007"),
        };
        assert_eq!(window.start_wire(), "2024-01-01 00:00:00.500");
        assert_eq!(window.end_wire(), "2024-01-01 09:05:03.007");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("01/02/2024"),
            Err(AuditError::TimestampError { .. })
        ));
    }
}
