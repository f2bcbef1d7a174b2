//! DomainEvent trait - binds a payload type to its event type string.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A payload type that knows which event type it travels under.
///
/// # Example
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct CustomerCreated {
///     name: String,
/// }
///
/// impl DomainEvent for CustomerCreated {
///     const TYPE: &'static str = "CustomerCreated";
/// }
/// ```
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE: &'static str;
}
