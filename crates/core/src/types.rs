/// Record identifiers are human-readable strings such as `ATC-001`.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Analysis dates carry no time-of-day component.
pub type AnalysisDate = chrono::NaiveDate;
