//! Kinematics error types.

/// Errors raised while registering bodies.
///
/// [`OrbitalKinematics::update`](crate::OrbitalKinematics::update) itself has
/// no error path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    /// A body parameter is non-finite or out of range.
    #[error("invalid parameter for body '{body}': {reason}")]
    InvalidParameter { body: String, reason: String },

    /// The parent id does not name a body registered before this one.
    #[error("body '{body}' references unknown parent #{parent}")]
    UnknownParent { body: String, parent: usize },

    /// Two bodies share a name.
    #[error("duplicate body name '{0}'")]
    DuplicateName(String),
}
