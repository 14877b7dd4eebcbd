/// Builds a [`Value`](crate::Value) from a literal.
///
/// ```rust
/// use tagcodec::{value, Symbol, Value};
///
/// let v = value!({
///     "name": "Alice",
///     "tags": [1, 2.5, null, true],
///     "status": (:active)
/// });
///
/// let map = v.as_map().unwrap();
/// assert_eq!(map.get_str("name"), Some(&Value::from("Alice")));
/// assert_eq!(map.get_str("status"), Some(&Value::from(Symbol::new("active"))));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    // Symbols: `(:name)`
    ((: $name:ident)) => {
        $crate::Value::Symbol($crate::Symbol::new(stringify!($name)))
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::Mapping::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut mapping = $crate::Mapping::new();
        $(
            mapping.insert($crate::Value::from($key), $crate::value!($value));
        )*
        $crate::Value::Map(mapping)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Mapping, Symbol, Value};

    #[test]
    fn test_value_macro_primitives() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(42), Value::Int(42));
        assert_eq!(value!(3.5), Value::Float(3.5));
        assert_eq!(value!("hello"), Value::String("hello".to_string()));
        assert_eq!(value!((:ok)), Value::Symbol(Symbol::new("ok")));
    }

    #[test]
    fn test_value_macro_collections() {
        assert_eq!(value!([]), Value::Array(vec![]));
        assert_eq!(value!({}), Value::Map(Mapping::new()));

        let nested = value!({ "a": [1, { "b": null }] });
        let inner = nested
            .as_map()
            .and_then(|m| m.get_str("a"))
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(inner[0], Value::Int(1));
        assert_eq!(inner[1].as_map().and_then(|m| m.get_str("b")), Some(&Value::Null));
    }
}
