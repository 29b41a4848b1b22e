//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Author of a message.
///
/// # Examples
///
/// ```
/// use relay_core::Role;
///
/// assert_eq!(format!("{}", Role::Tool), "tool");
/// assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    #[display("system")]
    System,
    /// User messages are from the human
    #[display("user")]
    User,
    /// Assistant messages are from the model
    #[display("assistant")]
    Assistant,
    /// Tool messages carry the result of a tool call
    #[display("tool")]
    Tool,
}
