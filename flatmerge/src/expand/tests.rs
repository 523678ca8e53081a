//! Unit tests for flat map expansion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;

fn scalar(text: &str) -> Value {
    Value::from(text)
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| (*s).to_owned()).collect())
}

fn object(entries: &[(&str, Value)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    )
}

fn into_dict(value: Value) -> Dict {
    match value {
        Value::Object(dict) => dict,
        other => panic!("expected object, got {other:?}"),
    }
}

type Recorded = Arc<Mutex<Vec<Diagnostic>>>;

#[fixture]
fn recorded() -> (MergeOptions, Recorded) {
    let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let options = MergeOptions::new().on_diagnostic(move |d| {
        sink.lock().expect("lock").push(d.clone());
    });
    (options, seen)
}

#[test]
fn leaves_are_identity_without_nesting() {
    let flat = [("F1", "20"), ("F2", "Text"), ("F3", "True")];
    let expected = object(&[
        ("F1", scalar("20")),
        ("F2", scalar("Text")),
        ("F3", scalar("True")),
    ]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn lists_are_classified_per_value() {
    let flat = [
        ("OneItem", "[Item]"),
        ("Books", "  B1,B2, B3"),
        ("Articles", "[A1, A2, A3]  "),
        ("Items", "  [  I1  , I2,  'Item number #3'   ,   I4  ]  "),
    ];
    let expected = object(&[
        ("OneItem", list(&["Item"])),
        ("Books", list(&["B1", "B2", "B3"])),
        ("Articles", list(&["A1", "A2", "A3"])),
        ("Items", list(&["I1", "I2", "Item number #3", "I4"])),
    ]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn separated_keys_nest() {
    let flat = [
        ("Address__City", "New York"),
        ("Address__Country", "US"),
        ("Parents__Address__Zip", "32123"),
        ("Parents__Address__Planet", "Earth"),
    ];
    let expected = object(&[
        (
            "Address",
            object(&[("City", scalar("New York")), ("Country", scalar("US"))]),
        ),
        (
            "Parents",
            object(&[(
                "Address",
                object(&[("Zip", scalar("32123")), ("Planet", scalar("Earth"))]),
            )]),
        ),
    ]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn mixed_scalars_and_nested_lists() {
    let flat = [
        ("IP", "192.168.1.0"),
        ("DNS__Servers", "[192.168.0.1, 192.168.0.2, 192.168.0.3]"),
    ];
    let expected = object(&[
        ("IP", scalar("192.168.1.0")),
        (
            "DNS",
            object(&[(
                "Servers",
                list(&["192.168.0.1", "192.168.0.2", "192.168.0.3"]),
            )]),
        ),
    ]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn embedded_objects_expand_in_place() {
    let flat = [
        ("Address", r#"{"city": "New York", "country": "US"}"#),
        ("Parents", r#"{"address": {"zip": "32123", "planet": "Earth"}}"#),
    ];
    let expected = object(&[
        (
            "Address",
            object(&[("city", scalar("New York")), ("country", scalar("US"))]),
        ),
        (
            "Parents",
            object(&[(
                "address",
                object(&[("planet", scalar("Earth")), ("zip", scalar("32123"))]),
            )]),
        ),
    ]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn nested_keys_and_embedded_objects_merge() {
    let flat = [
        ("IP", "192.168.1.0"),
        ("DNS__Servers", "[192.168.0.1, 192.168.0.2, 192.168.0.3]"),
        ("Parents__Address__Zip", "32123"),
        ("Parents", r#"{"Address": {"Planet": "Earth"}}"#),
    ];
    let root = Value::Object(expand(flat));
    assert_eq!(
        root.pointer(&["Parents", "Address", "Zip"]),
        Some(&scalar("32123"))
    );
    assert_eq!(
        root.pointer(&["Parents", "Address", "Planet"]),
        Some(&scalar("Earth"))
    );
    assert_eq!(root.pointer(&["IP"]), Some(&scalar("192.168.1.0")));
}

#[test]
fn literal_pair_and_json_object_coexist() {
    let flat = [
        ("Address__City", "New York"),
        ("Address", r#"{"country":"US"}"#),
    ];
    let expected = object(&[(
        "Address",
        object(&[("City", scalar("New York")), ("country", scalar("US"))]),
    )]);
    assert_eq!(expand(flat), into_dict(expected));
}

#[test]
fn output_does_not_depend_on_input_order() {
    let forward = [("A", "scalar"), ("A__B", "nested"), ("A__C", "x,y")];
    let mut backward = forward;
    backward.reverse();
    let hashed: HashMap<&str, &str> = forward.into_iter().collect();

    let expected = expand(forward);
    assert_eq!(expand(backward), expected);
    assert_eq!(expand(hashed), expected);
}

#[rstest]
fn nested_path_replaces_scalar_and_reports(recorded: (MergeOptions, Recorded)) {
    let (options, seen) = recorded;
    let dict = Expander::new(&options).expand([("A", "scalar"), ("A__B", "nested")]);

    assert_eq!(dict, into_dict(object(&[("A", object(&[("B", scalar("nested"))]))])));
    let diagnostics = seen.lock().expect("lock");
    assert_eq!(
        diagnostics.as_slice(),
        [Diagnostic::ValueDiscarded {
            path: "A".into(),
            discarded: ValueKind::Scalar,
            replacement: ValueKind::Object,
        }]
    );
}

#[rstest]
#[case::empty("")]
#[case::separator_only("__")]
#[case::trailing("a__")]
#[case::leading("__a")]
#[case::double("a____b")]
fn degenerate_keys_are_skipped(recorded: (MergeOptions, Recorded), #[case] key: &str) {
    let (options, seen) = recorded;
    let dict = Expander::new(&options).expand([(key, "v"), ("kept", "yes")]);

    assert_eq!(dict, into_dict(object(&[("kept", scalar("yes"))])));
    let diagnostics = seen.lock().expect("lock");
    assert_eq!(
        diagnostics.as_slice(),
        [Diagnostic::DegenerateKey { key: key.into() }]
    );
}

#[test]
fn custom_separator_is_honoured() {
    let options = MergeOptions::new().separator(".");
    let dict = Expander::new(&options).expand([("Address.City", "LA"), ("a__b", "flat")]);
    let root = Value::Object(dict);
    assert_eq!(root.pointer(&["Address", "City"]), Some(&scalar("LA")));
    assert_eq!(root.pointer(&["a__b"]), Some(&scalar("flat")));
}

#[test]
fn empty_separator_disables_nesting() {
    let options = MergeOptions::new().separator("");
    let dict = Expander::new(&options).expand([("a__b", "flat")]);
    assert_eq!(dict.get("a__b"), Some(&scalar("flat")));
}

#[test]
fn insert_applies_classified_values() {
    let options = MergeOptions::default();
    let expander = Expander::new(&options);
    let mut dict = Dict::new();

    assert!(expander.insert(&mut dict, "a__b", list(&["1", "2"])));
    assert!(!expander.insert(&mut dict, "a__", scalar("lost")));
    assert_eq!(
        Value::Object(dict).pointer(&["a", "b"]),
        Some(&list(&["1", "2"]))
    );
}
