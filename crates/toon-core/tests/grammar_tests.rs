/// Grammar conformance tests, grouped by construct.
///
/// Each group pins the exact text for a representative input and checks that
/// it reads back to the same value. Decoder-only cases cover text a person
/// might write by hand that the encoder never produces.
use serde_json::{json, Value};
use toon_core::{decode, encode, encode_with, Delimiter, EncodeOptions};

/// Assert the exact encoding and that it decodes back to `value`.
fn assert_canonical(value: Value, expected_toon: &str) {
    let toon = encode(&value).unwrap();
    assert_eq!(
        toon, expected_toon,
        "Encode mismatch:\n  input: {value}\n  got:\n{toon}\n  expected:\n{expected_toon}"
    );
    assert_eq!(decode(&toon).unwrap(), value, "decode of:\n{toon}");
}

/// No trailing newline, no trailing spaces on any line.
fn assert_toon_invariants(toon: &str) {
    assert!(!toon.ends_with('\n'), "ends with newline: {toon:?}");
    for (i, line) in toon.split('\n').enumerate() {
        assert!(!line.ends_with(' '), "line {i} has trailing space: {line:?}");
    }
}

// ============================================================================
// 1. KEYS
// ============================================================================

mod keys {
    use super::*;

    #[test]
    fn dotted_keys_are_plain_identifiers() {
        assert_canonical(json!({"a.b": 1}), "a.b: 1");
    }

    #[test]
    fn quoted_key_before_array_header() {
        assert_canonical(json!({"my list": [1, 2]}), "\"my list\"[2]: 1,2");
    }

    #[test]
    fn quoted_key_as_first_field_of_list_item() {
        assert_canonical(
            json!({"items": [{"my key": 1, "b": 2}, 3]}),
            "items[2]:\n  - \"my key\": 1\n    b: 2\n  - 3",
        );
    }

    #[test]
    fn escaped_characters_in_keys() {
        assert_canonical(json!({"a\"b": 1, "c\nd": 2}), "\"a\\\"b\": 1\n\"c\\nd\": 2");
    }

    #[test]
    fn duplicate_keys_last_wins() {
        assert_eq!(decode("a: 1\nb: 2\na: 3").unwrap(), json!({"a": 3, "b": 2}));
    }
}

// ============================================================================
// 2. ARRAY FORMS
// ============================================================================

mod arrays {
    use super::*;

    #[test]
    fn array_of_arrays_uses_list_items() {
        assert_canonical(
            json!({"matrix": [[1, 2], [3, 4]]}),
            "matrix[2]:\n  - [2]: 1,2\n  - [2]: 3,4",
        );
    }

    #[test]
    fn objects_with_nested_values_are_not_tabular() {
        assert_canonical(
            json!({"items": [{"a": {"x": 1}}, {"a": {"x": 2}}]}),
            "items[2]:\n  - a:\n      x: 1\n  - a:\n      x: 2",
        );
    }

    #[test]
    fn list_item_whose_first_field_is_an_array() {
        assert_canonical(
            json!({"items": [{"tags": ["a"], "n": 1}]}),
            "items[1]:\n  - tags[1]: a\n    n: 1",
        );
    }

    #[test]
    fn list_item_whose_first_field_is_a_list() {
        assert_canonical(
            json!([{"xs": [{"a": 1}, 2], "n": 0}]),
            "[1]:\n  - xs[2]:\n      - a: 1\n      - 2\n    n: 0",
        );
    }

    #[test]
    fn tabular_cells_keep_colons_unquoted() {
        assert_canonical(
            json!({"log": [{"at": "10:30", "msg": "ok"}, {"at": "11:00", "msg": "a, b"}]}),
            "log[2]{at,msg}:\n  10:30,ok\n  11:00,\"a, b\"",
        );
    }

    #[test]
    fn three_level_nested_arrays() {
        let value = json!({"data": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]});
        assert_eq!(decode(&encode(&value).unwrap()).unwrap(), value);
    }
}

// ============================================================================
// 3. DELIMITER SCOPING
// ============================================================================

mod delimiters {
    use super::*;

    #[test]
    fn each_header_declares_its_own_delimiter() {
        assert_eq!(
            decode("a[2|]: x,y|z\nb[2]: 1,2\nc[2\t]: p|q\tr").unwrap(),
            json!({"a": ["x,y", "z"], "b": [1, 2], "c": ["p|q", "r"]})
        );
    }

    #[test]
    fn nested_header_overrides_enclosing_delimiter() {
        assert_eq!(
            decode("outer[2]:\n  - inner[2|]: a,b|c\n  - x").unwrap(),
            json!({"outer": [{"inner": ["a,b", "c"]}, "x"]})
        );
    }

    #[test]
    fn tab_delimited_table() {
        let opts = EncodeOptions {
            delimiter: Delimiter::Tab,
            ..EncodeOptions::default()
        };
        let value = json!({"people": [{"name": "Smith, J", "age": 40}, {"name": "Doe|K", "age": 31}]});
        let toon = encode_with(&value, &opts).unwrap();
        assert_eq!(
            toon,
            "people[2\t]{name\tage}:\n  Smith, J\t40\n  Doe|K\t31"
        );
        assert_eq!(decode(&toon).unwrap(), value);
    }
}

// ============================================================================
// 4. FORMATTING INVARIANTS
// ============================================================================

mod formatting_invariants {
    use super::*;

    #[test]
    fn no_trailing_whitespace_anywhere() {
        for value in [
            json!(42),
            json!({}),
            json!({"a": {}, "b": []}),
            json!({"items": [{}, {"a": {}}, [], [[]]]}),
            json!({"items": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]}),
            json!([{"a": 1}, {"b": 2}]),
        ] {
            assert_toon_invariants(&encode(&value).unwrap());
        }
    }

    #[test]
    fn wide_indent_keeps_invariants() {
        let opts = EncodeOptions {
            indent: 4,
            ..EncodeOptions::default()
        };
        let toon = encode_with(&json!({"a": [{"b": [{}, 1]}]}), &opts).unwrap();
        assert_eq!(toon, "a[1]:\n    - b[2]:\n            -\n            - 1");
        assert_toon_invariants(&toon);
    }
}

// ============================================================================
// 5. REALISTIC PAYLOADS
// ============================================================================

mod realistic_payloads {
    use super::*;

    #[test]
    fn api_response_roundtrip() {
        let value = json!({
            "status": 200,
            "data": {
                "page": 1,
                "per_page": 2,
                "users": [
                    {"id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael", "avatar": "https://reqres.in/img/faces/7-image.jpg"},
                    {"id": 8, "email": "lindsay.ferguson@reqres.in", "first_name": "Lindsay", "avatar": "https://reqres.in/img/faces/8-image.jpg"}
                ]
            },
            "support": {"url": "https://reqres.in/#support-heading", "text": "Tired of writing endless social media content?"}
        });
        let toon = encode(&value).unwrap();
        assert!(toon.contains("users[2]{id,email,first_name,avatar}:"), "{toon}");
        assert_eq!(decode(&toon).unwrap(), value);
    }

    #[test]
    fn toon_is_smaller_than_json_for_uniform_rows() {
        let rows: Vec<Value> = (0..50)
            .map(|i| json!({"id": i, "sku": format!("SKU-{i:04}"), "qty": i % 7, "price": 9.99}))
            .collect();
        let value = json!({ "rows": rows });
        let toon = encode(&value).unwrap();
        assert!(toon.len() * 2 < value.to_string().len(), "{toon}");
    }
}

// ============================================================================
// 6. STRESS
// ============================================================================

mod stress_tests {
    use super::*;

    #[test]
    fn thousand_row_table() {
        let rows: Vec<Value> = (0..1000)
            .map(|i| json!({"id": i, "name": format!("user-{i}"), "active": i % 2 == 0}))
            .collect();
        let value = json!(rows);
        let toon = encode(&value).unwrap();
        assert_eq!(toon.lines().count(), 1001);
        assert_eq!(decode(&toon).unwrap(), value);
    }

    #[test]
    fn nesting_up_to_the_limit_roundtrips() {
        let mut value = json!("leaf");
        for i in 0..100 {
            value = if i % 2 == 0 {
                json!({ "k": value })
            } else {
                json!([value, 1])
            };
        }
        assert_eq!(decode(&encode(&value).unwrap()).unwrap(), value);
    }
}
