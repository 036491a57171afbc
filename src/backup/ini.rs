//! INI configuration reader.
//!
//! Reads INI text with `configparser` and turns it into a `serde_json::Value`
//! of `{section: {key: value}}`, so INI files deserialize into the same
//! serde model used for YAML.
//!
//! Section names and keys are case-insensitive and stored lower-cased.
//! Indented lines continue the previous value, also across blank lines.
//! Keys of the `[DEFAULT]` section, and keys written before any section
//! header, are inherited by every other section. Values are always strings;
//! a key without a delimiter has no value and becomes `null`.

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use configparser::ini::Ini;
use serde_json::{Map, Value};

fn ini_value(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

pub fn parse_ini(text: &str) -> Result<Value> {
    let mut defaults = Ini::new().defaults();
    defaults.multiline = true;
    let default_section = defaults.default_section.clone();

    let mut sections = Ini::new_from_defaults(defaults)
        .read(text.to_string())
        .map_err(Error::Ini)?;
    let shared = sections.remove(&default_section).unwrap_or_default();

    let root = sections
        .into_iter()
        .map(|(name, keys)| {
            let mut map: Map<String, Value> = shared
                .iter()
                .map(|(k, v)| (k.clone(), ini_value(v.clone())))
                .collect();
            for (k, v) in keys {
                tracing::trace!("INI [{}] {} = {:?}", name, k, v);
                map.insert(k, ini_value(v));
            }
            (name, Value::Object(map))
        })
        .collect::<Map<_, _>>();

    Ok(Value::Object(root))
}
