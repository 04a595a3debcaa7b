/// Change to an optional field in a partial update.
///
/// Plain `Option<T>` cannot tell "leave it alone" from "clear it", which
/// matters for fields such as a task's assignee:
/// - `NoChange`: keep the existing value
/// - `Set(value)`: replace it
/// - `Clear`: remove it
///
/// # Example
///
/// ```
/// use sprintboard_domain::FieldUpdate;
///
/// let mut assignee = Some("ana@example.com".to_string());
///
/// FieldUpdate::<String>::NoChange.apply_to(&mut assignee);
/// assert_eq!(assignee.as_deref(), Some("ana@example.com"));
///
/// FieldUpdate::Set("bo@example.com".to_string()).apply_to(&mut assignee);
/// assert_eq!(assignee.as_deref(), Some("bo@example.com"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut assignee);
/// assert_eq!(assignee, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets, `None` clears.
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}
