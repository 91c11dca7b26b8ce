/// Maps a lowercase kind name to a [`ParameterKind`](crate::ParameterKind).
///
/// ```rust
/// use parley::{ParameterKind, parley_kind};
///
/// assert_eq!(parley_kind!(integer), ParameterKind::Integer);
/// ```
#[macro_export]
macro_rules! parley_kind {
    (string) => {
        $crate::ParameterKind::String
    };
    (integer) => {
        $crate::ParameterKind::Integer
    };
    (number) => {
        $crate::ParameterKind::Number
    };
    (boolean) => {
        $crate::ParameterKind::Boolean
    };
    (object) => {
        $crate::ParameterKind::Object
    };
    (array) => {
        $crate::ParameterKind::Array
    };
    (any) => {
        $crate::ParameterKind::Any
    };
    ($other:ident) => {
        compile_error!(
            "unsupported parameter kind: use string, integer, number, boolean, object, array, or any"
        )
    };
}

/// Declares one parameter. A default makes it optional.
///
/// ```rust
/// use parley::parley_param;
/// use parley::serde_json::json;
///
/// let size = parley_param!(size: string = "medium");
/// assert!(!size.required);
/// assert_eq!(size.default, Some(json!("medium")));
///
/// let quantity = parley_param!(quantity: integer);
/// assert!(quantity.required);
/// ```
#[macro_export]
macro_rules! parley_param {
    ($name:ident : $kind:ident) => {
        $crate::ToolParameter::required(stringify!($name), $crate::parley_kind!($kind))
    };
    ($name:ident : $kind:ident = $default:expr) => {
        $crate::ToolParameter::optional(stringify!($name), $crate::parley_kind!($kind))
            .with_default($crate::serde_json::json!($default))
    };
}

/// Builds a [`ToolDescriptor`](crate::ToolDescriptor) from a name, a
/// description, and parameter declarations.
///
/// ```rust
/// use parley::parley_tool;
///
/// let descriptor = parley_tool!(
///     "add_to_order",
///     "Add a drink to the current order",
///     coffee_type: string,
///     size: string = "medium",
///     quantity: integer = 1,
/// );
///
/// assert_eq!(descriptor.name, "add_to_order");
/// assert_eq!(descriptor.parameters.len(), 3);
/// assert_eq!(descriptor.required_parameters().count(), 1);
/// ```
#[macro_export]
macro_rules! parley_tool {
    ($name:expr, $description:expr $(, $param:ident : $kind:ident $(= $default:expr)?)* $(,)?) => {
        $crate::ToolDescriptor::new($name)
            .with_description($description)
            $(.with_parameter($crate::parley_param!($param : $kind $(= $default)?)))*
    };
}
