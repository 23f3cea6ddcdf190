/// How an update payload is applied to an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every mutable field is overwritten; the payload must be a complete record.
    Replace,
    /// Only the fields present in the payload are written.
    Merge,
}

impl UpdateMode {
    /// Returns true if the payload must carry every required field.
    pub fn requires_full_record(&self) -> bool {
        match self {
            UpdateMode::Replace => true,
            UpdateMode::Merge => false,
        }
    }
}
