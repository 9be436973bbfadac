//! Client configuration

use serde::{Deserialize, Serialize};

/// How `JsonClient::build_post` encodes the JSON text it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostEncoding {
    /// Send the JSON text bytes unchanged.
    #[default]
    Raw,
    /// Form-urlencode the JSON text, as a www-form POST of a string does.
    WwwForm,
}

/// What to do with a 2xx response whose body is not valid JSON.
///
/// An empty or whitespace-only body parses to `null` under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Fail the request with `RequestError::Parse`.
    #[default]
    Strict,
    /// Hand `null` to the completion handler and log a warning.
    Lenient,
}

/// JSON client configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub post_encoding: PostEncoding,
    pub parse_policy: ParsePolicy,
}
