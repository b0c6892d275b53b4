use std::fmt;

/// Appointment status values as exported by the scheduling platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Approved,
    Started,
    Completed,
    NoShow,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses of appointments that were actually on the calendar.
    pub const VALID_SCHEDULED: [Self; 3] = [Self::Approved, Self::Started, Self::Completed];

    /// Statuses that count as the appointment having taken place.
    pub const VALID_COMPLETED: [Self; 2] = [Self::Started, Self::Completed];

    /// Statuses of appointments that never happened.
    pub const VALID_CANCELLED: [Self; 2] = [Self::Cancelled, Self::NoShow];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse an exported status, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        [
            Self::Approved,
            Self::Started,
            Self::Completed,
            Self::NoShow,
            Self::Cancelled,
        ]
        .into_iter()
        .find(|status| status.as_str() == normalized)
    }

    /// Returns true for statuses in [`AppointmentStatus::VALID_COMPLETED`].
    pub fn is_completed(self) -> bool {
        Self::VALID_COMPLETED.contains(&self)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient_about_case() {
        assert_eq!(
            AppointmentStatus::parse(" Completed "),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(AppointmentStatus::parse("no_show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::parse("pending"), None);
    }

    #[test]
    fn completed_group() {
        assert!(AppointmentStatus::Started.is_completed());
        assert!(!AppointmentStatus::Approved.is_completed());
    }
}
