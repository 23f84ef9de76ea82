use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xmlrpc_serde::codec::{self, Format, MethodCall, MethodResponse, Param};
use xmlrpc_serde::convert::{
    array_values, fault_code, fault_from, map_to_struct, rows_to_struct, struct_to_map,
    struct_to_rows, values_to_array,
};
use xmlrpc_serde::{Error, Member, Value, ValueType, datetime, from_value, to_value};

fn response_with(value_xml: &str) -> Vec<u8> {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param>{value_xml}</param></params></methodResponse>"
    )
    .into_bytes()
}

fn decode_value(value_xml: &str) -> Value {
    match codec::decode_response(&response_with(value_xml)).unwrap() {
        MethodResponse::Success(value) => value,
        other => panic!("expected success, got {:?}", other),
    }
}

fn roundtrip(value: &Value) -> Value {
    let body =
        codec::encode_response(&MethodResponse::Success(value.clone()), Format::default()).unwrap();
    match codec::decode_response(&body).unwrap() {
        MethodResponse::Success(value) => value,
        other => panic!("expected success, got {:?}", other),
    }
}

fn sample_struct() -> Value {
    Value::Struct(vec![
        Member::new("symbol", "IBM"),
        Member::new("price", 81.5),
        Member::new("open", true),
        Member::new(
            "history",
            Value::Array(vec![Value::Int(1), Value::I4(2), Value::Nil]),
        ),
        Member::new(
            "meta",
            Value::Struct(vec![Member::new("source", "nyse"), Member::new("source", "nasdaq")]),
        ),
    ])
}

// ══════════════════════════════════════════════════════════════════════════
// Value model
// ══════════════════════════════════════════════════════════════════════════

#[test]
fn test_value_type_wire_names() {
    for ty in ValueType::ALL {
        assert_eq!(ty, ty.as_str().parse::<ValueType>().unwrap());
    }
    assert_eq!(ValueType::DateTime.as_str(), "dateTime.iso8601");
    assert!(matches!(
        "long".parse::<ValueType>(),
        Err(Error::UnknownType(t)) if t == "long"
    ));
}

#[test]
fn test_scalar_roundtrip() {
    for v in [
        Value::String("hello <world> & \"friends\"".into()),
        Value::String(String::new()),
        Value::Int(i32::MIN),
        Value::I4(42),
        Value::Double(3.25),
        Value::Double(-0.5),
        Value::Boolean(true),
        Value::Boolean(false),
        Value::DateTime("2003-04-01T12:00:00".into()),
        Value::Base64(vec![0, 1, 2, 255]),
        Value::Base64(Vec::new()),
        Value::Nil,
    ] {
        assert_eq!(v, roundtrip(&v), "value {:?}", v);
    }
}

#[test]
fn test_nested_roundtrip() {
    let v = Value::Array(vec![sample_struct(), Value::Array(vec![]), Value::Struct(vec![])]);
    assert_eq!(v, roundtrip(&v));
}

#[test]
fn test_i4_tag_preserved() {
    let v = decode_value("<value><i4>5</i4></value>");
    assert_eq!(v, Value::I4(5));
    assert_eq!(v.as_i32(), Some(5));

    let body = codec::encode_response(&MethodResponse::Success(v), Format::default()).unwrap();
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("<i4>5</i4>"), "{}", text);
}

#[test]
fn test_struct_get_last_member_wins() {
    let meta = sample_struct().get("meta").cloned().unwrap();
    assert_eq!(meta.get("source"), Some(&Value::String("nasdaq".into())));
    assert_eq!(meta.get("missing"), None);
}

#[test]
fn test_parse_lenient_scalars() {
    assert_eq!(Value::parse(ValueType::Int, " 42\n").unwrap(), Value::Int(42));
    assert_eq!(Value::parse(ValueType::I4, "+7").unwrap(), Value::I4(7));
    assert_eq!(Value::parse(ValueType::Boolean, "true").unwrap(), Value::Boolean(true));
    assert_eq!(Value::parse(ValueType::Boolean, "0").unwrap(), Value::Boolean(false));
    assert_eq!(
        Value::parse(ValueType::Base64, "SGVs\nbG8=").unwrap(),
        Value::Base64(b"Hello".to_vec())
    );
    assert_eq!(Value::parse(ValueType::String, " keep ").unwrap(), Value::String(" keep ".into()));
    assert!(matches!(
        Value::parse(ValueType::Double, "abc"),
        Err(Error::InvalidScalar { ty: ValueType::Double, .. })
    ));
    assert!(matches!(
        Value::parse(ValueType::Int, "4294967296"),
        Err(Error::InvalidScalar { ty: ValueType::Int, .. })
    ));
    assert!(Value::parse(ValueType::Double, "inf").is_err());
    assert!(Value::parse(ValueType::Boolean, "2").is_err());
}

#[test]
fn test_coerce_scalars() {
    assert_eq!(Value::String("42".into()).coerce(ValueType::Int).unwrap(), Value::Int(42));
    assert_eq!(Value::Int(3).coerce(ValueType::I4).unwrap(), Value::I4(3));
    assert_eq!(Value::Int(1).coerce(ValueType::Boolean).unwrap(), Value::Boolean(true));
    assert_eq!(Value::Int(2).coerce(ValueType::Double).unwrap(), Value::Double(2.0));
    assert_eq!(Value::Double(8.0).coerce(ValueType::Int).unwrap(), Value::Int(8));
    assert_eq!(Value::Int(-3).coerce(ValueType::String).unwrap(), Value::String("-3".into()));
    assert_eq!(
        Value::String("20030401T120000".into()).coerce(ValueType::DateTime).unwrap(),
        Value::DateTime("2003-04-01T12:00:00".into())
    );
    assert!(Value::Double(8.5).coerce(ValueType::Int).is_err());
}

#[test]
fn test_no_coercion_between_compound_kinds() {
    let err = Value::Array(vec![]).coerce(ValueType::Struct).unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch { expected: ValueType::Struct, found: ValueType::Array }
    );
    assert!(Value::typed(ValueType::Array, Value::Struct(vec![])).is_err());
    assert!(Value::typed(ValueType::String, Value::Array(vec![])).is_err());
    assert!(Value::typed(ValueType::Struct, "a=1").is_err());
    assert_eq!(
        Value::typed(ValueType::Array, vec![Value::Int(1)]).unwrap(),
        Value::Array(vec![Value::Int(1)])
    );
}

#[test]
fn test_from_conversions() {
    assert_eq!(Value::from(Some(5)), Value::Int(5));
    assert_eq!(Value::from(None::<i32>), Value::Nil);
    assert_eq!(Value::from(vec![1u8, 2]), Value::Base64(vec![1, 2]));
    let dt = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(23, 59, 1).unwrap();
    let v = Value::from(dt);
    assert_eq!(v, Value::DateTime("2024-02-29T23:59:01".into()));
    assert_eq!(v.as_datetime(), Some(dt));
}

// ══════════════════════════════════════════════════════════════════════════
// Date normalization
// ══════════════════════════════════════════════════════════════════════════

#[test]
fn test_date_normalize() {
    assert_eq!(datetime::normalize("20030401T120000").as_deref(), Some("2003-04-01T12:00:00"));
    assert_eq!(datetime::normalize("20030401T12:00:00").as_deref(), Some("2003-04-01T12:00:00"));
    assert_eq!(datetime::normalize("2003-04-01T120000").as_deref(), Some("2003-04-01T12:00:00"));
    assert_eq!(
        datetime::normalize("2003-04-01T12:00:00").as_deref(),
        Some("2003-04-01T12:00:00")
    );
    assert_eq!(datetime::normalize("2003-04-01 12:00:00"), None);
    assert_eq!(datetime::normalize("2003041T120000"), None);
    assert!(datetime::is_canonical("2003-04-01T12:00:00"));
    assert!(!datetime::is_canonical("20030401T120000"));
}

#[test]
fn test_date_constructor_rejects_garbage() {
    assert_eq!(
        Value::date_time("19980717T14:08:55").unwrap(),
        Value::DateTime("1998-07-17T14:08:55".into())
    );
    assert!(matches!(
        Value::date_time("next tuesday"),
        Err(Error::InvalidScalar { ty: ValueType::DateTime, .. })
    ));
}

#[test]
fn test_date_read_path() {
    let v = decode_value("<value><dateTime.iso8601>19980717T14:08:55</dateTime.iso8601></value>");
    assert_eq!(v, Value::DateTime("1998-07-17T14:08:55".into()));

    let nested = decode_value(
        "<value><array><data><value><dateTime.iso8601>20030401T120000</dateTime.iso8601></value></data></array></value>",
    );
    assert_eq!(nested, Value::Array(vec![Value::DateTime("2003-04-01T12:00:00".into())]));

    // Unrecognised layouts are kept as received.
    let odd = decode_value("<value><dateTime.iso8601>2003-04-01T12:00:00Z</dateTime.iso8601></value>");
    assert_eq!(odd, Value::DateTime("2003-04-01T12:00:00Z".into()));
}

#[test]
fn test_date_write_path() {
    let call = MethodCall::new("at", vec![Value::DateTime("20030401T120000".into())]);
    let text = String::from_utf8(codec::encode_call(&call, Format::default()).unwrap()).unwrap();
    assert!(text.contains("<dateTime.iso8601>2003-04-01T12:00:00</dateTime.iso8601>"), "{}", text);
}

// ══════════════════════════════════════════════════════════════════════════
// Bare strings
// ══════════════════════════════════════════════════════════════════════════

#[test]
fn test_bare_string_equals_explicit_string() {
    let bare = decode_value("<value>Hello, World!</value>");
    let explicit = decode_value("<value><string>Hello, World!</string></value>");
    assert_eq!(bare, explicit);
    assert_eq!(bare, Value::String("Hello, World!".into()));
}

#[test]
fn test_bare_string_inside_compounds() {
    let v = decode_value(
        "<value><struct>\
           <member><name>greeting</name><value>hi</value></member>\
           <member><name>list</name><value><array><data><value>a</value><value><int>1</int></value></data></array></value></member>\
         </struct></value>",
    );
    assert_eq!(
        v,
        Value::Struct(vec![
            Member::new("greeting", "hi"),
            Member::new("list", Value::Array(vec![Value::from("a"), Value::Int(1)])),
        ])
    );
}

#[test]
fn test_empty_bare_value_is_empty_string() {
    assert_eq!(decode_value("<value/>"), Value::String(String::new()));
    assert_eq!(decode_value("<value></value>"), Value::String(String::new()));
}

#[test]
fn test_value_with_children_is_not_bare() {
    let v = decode_value("<value>\n    <int>3</int>\n  </value>");
    assert_eq!(v, Value::Int(3));
}

#[test]
fn test_rewrite_pass_leaves_typed_values() {
    use xmlrpc_serde::xml::Element;

    let typed = Element::with_children("value", vec![Element::with_text("int", "1")]);
    assert_eq!(codec::rewrite_bare_strings(typed.clone()), typed);

    let bare = Element::with_text("value", "x");
    assert_eq!(
        codec::rewrite_bare_strings(bare),
        Element::with_children("value", vec![Element::with_text("string", "x")])
    );
}

// ══════════════════════════════════════════════════════════════════════════
// Converters
// ══════════════════════════════════════════════════════════════════════════

#[test]
fn test_struct_to_map_last_write_wins() {
    let s = Value::Struct(vec![
        Member::new("a", 1),
        Member::new("b", "two"),
        Member::new("a", 3),
    ]);
    let map: BTreeMap<String, Value> = struct_to_map(&s).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], Value::Int(3));
    assert_eq!(map["b"], Value::String("two".into()));
}

#[test]
fn test_struct_to_map_drops_type_tags() {
    let s = Value::Struct(vec![
        Member::new("count", Value::I4(4)),
        Member::new("when", Value::DateTime("2003-04-01T12:00:00".into())),
    ]);
    let map: BTreeMap<String, Value> = struct_to_map(&s).unwrap();
    assert_eq!(map["count"], Value::Int(4));
    assert_eq!(map["when"], Value::from("2003-04-01T12:00:00"));

    let prices = Value::Struct(vec![Member::new("ibm", 81.5), Member::new("sun", 3.25)]);
    let typed: BTreeMap<String, f64> = struct_to_map(&prices).unwrap();
    assert_eq!(typed["ibm"], 81.5);
    assert!(struct_to_map::<i32>(&prices).is_err());
}

#[test]
fn test_struct_rows_preserve_everything() {
    let s = Value::Struct(vec![
        Member::new("z", Value::I4(1)),
        Member::new("a", "x"),
        Member::new("z", Value::Double(2.5)),
    ]);
    let rows = struct_to_rows(&s).unwrap();
    assert_eq!(
        rows,
        vec![
            ("z".to_string(), ValueType::I4, Value::I4(1)),
            ("a".to_string(), ValueType::String, Value::from("x")),
            ("z".to_string(), ValueType::Double, Value::Double(2.5)),
        ]
    );
    assert_eq!(rows_to_struct(rows).unwrap(), s);
}

#[test]
fn test_rows_to_struct_coerces_to_row_type() {
    let s = rows_to_struct(vec![("n".to_string(), ValueType::Int, Value::from("12"))]).unwrap();
    assert_eq!(s, Value::Struct(vec![Member::new("n", 12)]));
}

#[test]
fn test_map_to_struct_sorted_and_reversible() {
    let m: BTreeMap<String, Value> = [("zeta", 3), ("alpha", 1), ("mid", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::Int(v)))
        .collect();
    let s = map_to_struct(ValueType::Int, m.clone()).unwrap();
    let names: Vec<&str> = s.as_struct().unwrap().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["alpha", "mid", "zeta"]);
    assert_eq!(struct_to_map::<Value>(&s).unwrap(), m);
}

#[test]
fn test_map_to_struct_declared_type() {
    let s = map_to_struct(ValueType::String, [("b", 2), ("a", 1)]).unwrap();
    assert_eq!(s, Value::Struct(vec![Member::new("a", "1"), Member::new("b", "2")]));
    assert!(map_to_struct(ValueType::Int, [("a", "x")]).is_err());
}

#[test]
fn test_array_conversions() {
    let a = values_to_array(ValueType::Double, [1, 2, 3]).unwrap();
    assert_eq!(
        a,
        Value::Array(vec![Value::Double(1.0), Value::Double(2.0), Value::Double(3.0)])
    );
    assert_eq!(array_values::<f64>(&a).unwrap(), [1.0, 2.0, 3.0]);
    assert_eq!(array_values::<Value>(&a).unwrap()[2], Value::Double(3.0));

    let mixed = Value::Array(vec![Value::I4(1), Value::from("two"), Value::Nil]);
    assert_eq!(
        array_values::<Value>(&mixed).unwrap(),
        [Value::Int(1), Value::from("two"), Value::Nil]
    );
    assert!(array_values::<i32>(&mixed).is_err());
    assert!(matches!(
        array_values::<Value>(&Value::Nil),
        Err(Error::TypeMismatch { expected: ValueType::Array, found: ValueType::Nil })
    ));
}

#[test]
fn test_fault_code_normalization() {
    assert_eq!(fault_code(&fault_from(42, "boom")).unwrap(), (42, Some("boom".to_string())));
    assert_eq!(fault_code(&fault_from(0, "zero")).unwrap(), (-1, Some("zero".to_string())));

    let missing = Value::Struct(vec![Member::new("faultString", "no code")]);
    assert_eq!(fault_code(&missing).unwrap(), (-1, Some("no code".to_string())));

    let textual = Value::Struct(vec![Member::new("faultCode", "7")]);
    assert_eq!(fault_code(&textual).unwrap(), (7, None));

    assert!(fault_code(&Value::Int(1)).is_err());
}

#[test]
fn test_fault_from_shape() {
    assert_eq!(
        fault_from(4, "Too many parameters."),
        Value::Struct(vec![
            Member::new("faultCode", Value::Int(4)),
            Member::new("faultString", Value::String("Too many parameters.".into())),
        ])
    );
}

// ══════════════════════════════════════════════════════════════════════════
// Call codec
// ══════════════════════════════════════════════════════════════════════════

#[test]
fn test_encode_call_shape() {
    let call = MethodCall::new("examples.getStateName", vec![Value::I4(41)]);
    let text = String::from_utf8(codec::encode_call(&call, Format::default()).unwrap()).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"), "{}", text);
    assert!(text.contains(
        "<methodCall><methodName>examples.getStateName</methodName><params><param><value><i4>41</i4></value></param></params></methodCall>"
    ), "{}", text);
}

#[test]
fn test_call_roundtrip_compact_and_indented() {
    let call = MethodCall::new("store", vec![sample_struct(), Value::from("x"), Value::Nil]);
    for format in [Format::compact(), Format::indented(2)] {
        let bytes = codec::encode_call(&call, format).unwrap();
        assert_eq!(codec::decode_call(&bytes).unwrap(), call);
    }
    let pretty = codec::encode_call(&call, Format::indented(4)).unwrap();
    assert!(pretty.contains(&b'\n'));
}

#[test]
fn test_call_without_params() {
    let call = MethodCall::new("system.listMethods", vec![]);
    let bytes = codec::encode_call(&call, Format::default()).unwrap();
    assert_eq!(codec::decode_call(&bytes).unwrap(), call);
    let bare = b"<methodCall><methodName> ping </methodName></methodCall>";
    assert_eq!(codec::decode_call(bare).unwrap(), MethodCall::new("ping", vec![]));
}

#[test]
fn test_call_needs_method_name() {
    let call = MethodCall::new("  ", vec![]);
    assert!(matches!(
        codec::encode_call(&call, Format::default()),
        Err(Error::MalformedCall(_))
    ));
    assert!(matches!(
        codec::decode_call(b"<methodCall><params/></methodCall>"),
        Err(Error::MalformedCall(_))
    ));
}

#[test]
fn test_build_params() {
    let prebuilt = Value::Struct(vec![Member::new("k", "v")]);
    let params = codec::build_params([
        Param::typed(ValueType::Int, "42"),
        Param::from((ValueType::String, 7)),
        Param::from(prebuilt.clone()),
        Param::typed(ValueType::Boolean, 1),
    ])
    .unwrap();
    assert_eq!(
        params,
        vec![Value::Int(42), Value::from("7"), prebuilt, Value::Boolean(true)]
    );

    assert!(codec::build_params([Param::typed(ValueType::Int, "forty-two")]).is_err());
}

#[test]
fn test_decode_fault_response() {
    let body = codec::encode_response(
        &MethodResponse::Fault(fault_from(7, "bad symbol")),
        Format::default(),
    )
    .unwrap();
    let MethodResponse::Fault(fault) = codec::decode_response(&body).unwrap() else {
        panic!("expected a fault");
    };
    assert_eq!(fault_code(&fault).unwrap(), (7, Some("bad symbol".to_string())));
}

#[test]
fn test_encode_fault_must_be_struct() {
    assert!(codec::encode_response(&MethodResponse::Fault(Value::Int(1)), Format::default()).is_err());
}

#[test]
fn test_empty_response_is_distinct() {
    assert_eq!(codec::decode_response(b""), Err(Error::EmptyResponse));
    assert_eq!(codec::decode_response(b" \r\n\t"), Err(Error::EmptyResponse));
}

#[test]
fn test_malformed_responses() {
    let cases: [&[u8]; 9] = [
        b"<methodResponse/>",
        b"<methodResponse><params><param><value>a</value></param></params><params><param><value>b</value></param></params></methodResponse>",
        b"<methodResponse><fault><value><struct/></value></fault><fault><value><struct/></value></fault></methodResponse>",
        b"<methodResponse><params><param><value>a</value></param></params><params/></methodResponse>",
        b"<methodResponse><params/></methodResponse>",
        b"<methodResponse><params><param><value>a</value></param><param><value>b</value></param></params></methodResponse>",
        b"<methodResponse><params><param><value>a</value></param></params><fault><value><struct/></value></fault></methodResponse>",
        b"<methodResponse><fault><value><int>1</int></value></fault></methodResponse>",
        b"<methodCall><methodName>x</methodName></methodCall>",
    ];
    for body in cases {
        let result = codec::decode_response(body);
        assert!(
            matches!(result, Err(Error::MalformedResponse(_))),
            "{:?} -> {:?}",
            String::from_utf8_lossy(body),
            result
        );
    }
}

#[test]
fn test_non_finite_double_is_not_encoded() {
    for d in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let call = MethodCall::new("store", vec![Value::Array(vec![Value::Double(d)])]);
        assert!(matches!(
            codec::encode_call(&call, Format::default()),
            Err(Error::InvalidScalar { ty: ValueType::Double, .. })
        ));
        let response = MethodResponse::Success(Value::Struct(vec![Member::new("x", d)]));
        assert!(matches!(
            codec::encode_response(&response, Format::default()),
            Err(Error::InvalidScalar { ty: ValueType::Double, .. })
        ));
        assert!(matches!(
            to_value(&d),
            Err(Error::InvalidScalar { ty: ValueType::Double, .. })
        ));
    }
    assert!(to_value(&f32::NAN).is_err());

    for d in [1e300, -1e-300, f64::MAX] {
        assert_eq!(roundtrip(&Value::Double(d)), Value::Double(d));
    }
}

#[test]
fn test_bad_documents() {
    assert!(matches!(codec::decode_response(b"<methodResponse><params>"), Err(Error::Xml(_))));
    assert!(matches!(codec::decode_response(b"not xml at all"), Err(Error::Xml(_))));
    assert!(matches!(
        codec::decode_response(&response_with("<value><long>1</long></value>")),
        Err(Error::UnknownType(t)) if t == "long"
    ));
    assert!(matches!(
        codec::decode_response(&response_with("<value><int>1</int><int>2</int></value>")),
        Err(Error::InvalidValue(_))
    ));
}

#[test]
fn test_cdata_and_entities() {
    let v = decode_value("<value><string><![CDATA[<b>bold</b>]]> &amp; more</string></value>");
    assert_eq!(v, Value::String("<b>bold</b> & more".into()));
}

// ══════════════════════════════════════════════════════════════════════════
// Serde bridge
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Serialize, Deserialize)]
enum Status {
    Active,
    Renamed(String),
    Suspended { reason: String },
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Account {
    id: u32,
    name: String,
    balance: f64,
    tags: Vec<String>,
    nickname: Option<String>,
    #[serde(with = "serde_bytes")]
    avatar: Vec<u8>,
    #[serde(with = "xmlrpc_serde::iso8601")]
    created: NaiveDateTime,
    status: Status,
}

fn sample_account(status: Status) -> Account {
    Account {
        id: 7,
        name: "ada".into(),
        balance: 12.75,
        tags: vec!["admin".into(), "ops".into()],
        nickname: None,
        avatar: vec![0xde, 0xad],
        created: NaiveDate::from_ymd_opt(2003, 4, 1).unwrap().and_hms_opt(12, 0, 0).unwrap(),
        status,
    }
}

#[test]
fn test_to_value_struct_layout() {
    let v = to_value(&sample_account(Status::Active)).unwrap();
    let names: Vec<&str> = v.as_struct().unwrap().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "name", "balance", "tags", "nickname", "avatar", "created", "status"]
    );
    assert_eq!(v.get("id"), Some(&Value::Int(7)));
    assert_eq!(v.get("nickname"), Some(&Value::Nil));
    assert_eq!(v.get("avatar"), Some(&Value::Base64(vec![0xde, 0xad])));
    assert_eq!(v.get("created"), Some(&Value::DateTime("2003-04-01T12:00:00".into())));
    assert_eq!(v.get("status"), Some(&Value::from("Active")));
}

#[test]
fn test_serde_roundtrip_over_the_wire() {
    for status in [
        Status::Active,
        Status::Renamed("grace".into()),
        Status::Suspended { reason: "audit".into() },
    ] {
        let account = sample_account(status);
        let wire = roundtrip(&to_value(&account).unwrap());
        let decoded: Account = from_value(wire).unwrap();
        assert_eq!(account, decoded);
    }
}

#[test]
fn test_from_value_timestamp_from_string() {
    #[derive(Debug, Deserialize)]
    struct Stamp {
        #[serde(with = "xmlrpc_serde::iso8601")]
        at: NaiveDateTime,
    }

    let v = Value::Struct(vec![Member::new("at", "20030401T120000")]);
    let stamp: Stamp = from_value(v).unwrap();
    assert_eq!(stamp.at.to_string(), "2003-04-01 12:00:00");
}

#[test]
fn test_integer_range() {
    assert_eq!(to_value(&(i32::MAX as u64)).unwrap(), Value::Int(i32::MAX));
    assert_eq!(
        to_value(&u64::MAX).unwrap_err(),
        Error::IntegerOutOfRange(u64::MAX as i128)
    );
    let n: i64 = from_value(Value::I4(-9)).unwrap();
    assert_eq!(n, -9);
}

#[test]
fn test_map_keys() {
    let by_id: BTreeMap<u8, &str> = [(1, "one"), (2, "two")].into_iter().collect();
    assert_eq!(
        to_value(&by_id).unwrap(),
        Value::Struct(vec![Member::new("1", "one"), Member::new("2", "two")])
    );
    let by_pair: BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();
    assert_eq!(to_value(&by_pair).unwrap_err(), Error::KeyMustBeString);
}

#[test]
fn test_from_value_map_duplicates() {
    let v = Value::Struct(vec![Member::new("a", 1), Member::new("a", 2)]);
    let map: BTreeMap<String, i32> = from_value(v).unwrap();
    assert_eq!(map["a"], 2);
}

#[test]
fn test_option_and_unit() {
    assert_eq!(to_value(&None::<u8>).unwrap(), Value::Nil);
    assert_eq!(to_value(&Some("x")).unwrap(), Value::from("x"));
    assert_eq!(from_value::<Option<i32>>(Value::Nil).unwrap(), None);
    assert_eq!(from_value::<Option<i32>>(Value::Int(3)).unwrap(), Some(3));
    from_value::<()>(Value::Nil).unwrap();
    assert!(from_value::<()>(Value::Int(1)).is_err());
}

#[test]
fn test_value_serializes_through_bridge() {
    let v = Value::Array(vec![
        Value::Struct(vec![Member::new("n", Value::I4(2)), Member::new("none", Value::Nil)]),
        Value::DateTime("2003-04-01T12:00:00".into()),
        Value::Base64(vec![9]),
    ]);
    // `i4` has no serde counterpart and comes back as `int`.
    let expected = Value::Array(vec![
        Value::Struct(vec![Member::new("n", Value::Int(2)), Member::new("none", Value::Nil)]),
        Value::DateTime("2003-04-01T12:00:00".into()),
        Value::Base64(vec![9]),
    ]);
    assert_eq!(to_value(&v).unwrap(), expected);
}
