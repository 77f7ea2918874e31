use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types that can be requested as constrained JSON output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Self-contained JSON schema for this type.
    ///
    /// Objects are closed (`additionalProperties: false`), every property is
    /// listed in `required`, and `$ref`s are inlined so the schema can be
    /// embedded in a prompt or a request body as-is.
    fn output_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        fix_object_schemas(&mut value);
        inline_refs(&mut value);
        collapse_enum_unions(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn fix_object_schemas(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.get("type") == Some(&Value::String("object".to_string())) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));

            if let Some(Value::Object(props)) = map.get("properties") {
                let all_keys: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();
                map.insert("required".to_string(), Value::Array(all_keys));
            }
        }

        for (_, v) in map.iter_mut() {
            fix_object_schemas(v);
        }
    } else if let Value::Array(arr) = value {
        for item in arr.iter_mut() {
            fix_object_schemas(item);
        }
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = if let Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [single] = all_of.as_slice() {
                    *value = single.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

// Documented unit variants arrive as `oneOf: [{enum: ["a"]}, {enum: ["b"]}]`.
fn string_enum_union(map: &Map<String, Value>) -> Option<Vec<Value>> {
    let members = ["oneOf", "anyOf"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))?;
    let mut values = Vec::new();
    for member in members {
        let variants = member.get("enum").and_then(Value::as_array)?;
        if !variants.iter().all(Value::is_string) {
            return None;
        }
        values.extend(variants.iter().cloned());
    }
    (!values.is_empty()).then_some(values)
}

fn collapse_enum_unions(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(values) = string_enum_union(map) {
                map.remove("oneOf");
                map.remove("anyOf");
                map.insert("type".to_string(), Value::String("string".to_string()));
                map.insert("enum".to_string(), Value::Array(values));
            }
            for (_, v) in map.iter_mut() {
                collapse_enum_unions(v);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(collapse_enum_unions),
        _ => {}
    }
}

/// Convert an inlined JSON schema to Gemini's schema dialect.
///
/// Gemini takes a single upper-case `type` per node and marks optional values
/// with `nullable`; union types and `anyOf` with `null` collapse to that form.
pub fn to_gemini_schema(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    if let Some(values) = string_enum_union(map) {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::String("STRING".to_string()));
        if let Some(desc) = map.get("description") {
            out.insert("description".to_string(), desc.clone());
        }
        out.insert("enum".to_string(), Value::Array(values));
        return Value::Object(out);
    }

    // Option<Enum> arrives as anyOf [<variant>, {type: null}]
    if let Some(Value::Array(any_of)) = map.get("anyOf") {
        let non_null: Vec<&Value> = any_of.iter().filter(|v| !is_null_type(v)).collect();
        if let [inner] = non_null.as_slice() {
            let mut converted = to_gemini_schema(inner);
            if let Value::Object(out) = &mut converted {
                out.insert("nullable".to_string(), Value::Bool(true));
                if let Some(desc) = map.get("description") {
                    out.insert("description".to_string(), desc.clone());
                }
            }
            return converted;
        }
    }

    let mut out = Map::new();
    let mut nullable = false;

    match map.get("type") {
        Some(Value::String(t)) => {
            out.insert("type".to_string(), Value::String(t.to_uppercase()));
        }
        Some(Value::Array(types)) => {
            nullable = types.iter().any(|t| t.as_str() == Some("null"));
            if let Some(t) = types.iter().filter_map(Value::as_str).find(|t| *t != "null") {
                out.insert("type".to_string(), Value::String(t.to_uppercase()));
            }
        }
        _ => {}
    }

    if nullable {
        out.insert("nullable".to_string(), Value::Bool(true));
    }

    for key in ["description", "enum"] {
        if let Some(v) = map.get(key) {
            out.insert(key.to_string(), v.clone());
        }
    }

    if let Some(items) = map.get("items") {
        out.insert("items".to_string(), to_gemini_schema(items));
    }

    if let Some(Value::Object(props)) = map.get("properties") {
        let mut converted = Map::new();
        let mut required = Vec::new();
        for (name, prop) in props {
            let prop = to_gemini_schema(prop);
            if prop.get("nullable") != Some(&Value::Bool(true)) {
                required.push(Value::String(name.clone()));
            }
            converted.insert(name.clone(), prop);
        }
        out.insert("properties".to_string(), Value::Object(converted));
        out.insert("required".to_string(), Value::Array(required));
    }

    Value::Object(out)
}

fn is_null_type(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("null")
}
