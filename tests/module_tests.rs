//! Integration tests for the shipped registries, called through a built
//! `FuncMap` with deterministic services.

use tmplkit::{
    Dynamic, FixedClock, FuncMap, Handler, MapEnvironment, NON_HERMETIC, SeededEntropy, Services,
    StaticResolver,
};

fn deterministic_services(seed: u64) -> Services {
    Services::default()
        .with_clock(FixedClock::from_secs(1_700_000_000))
        .with_entropy(SeededEntropy::new(seed))
        .with_env(MapEnvironment::new().with("APP_ENV", "test"))
        .with_resolver(StaticResolver::new().with("db.internal", &["10.1.2.3"]))
}

fn build_funcs(seed: u64) -> FuncMap {
    Handler::builder()
        .with_services(deterministic_services(seed))
        .with_default_registries()
        .build()
        .expect("Failed to add default registries")
        .build()
        .expect("Failed to build handler")
}

// =============================================================================
// Injected services
// =============================================================================

#[test]
fn test_services_reach_registries() {
    let funcs = build_funcs(1);

    assert_eq!(funcs.call("now", &[]).unwrap(), Dynamic::Int(1_700_000_000));
    assert_eq!(funcs.call("unixEpoch", &[]).unwrap(), Dynamic::from("1700000000"));
    assert_eq!(funcs.call("env", &["APP_ENV".into()]).unwrap(), Dynamic::from("test"));
    assert_eq!(
        funcs.call("expandEnv", &["env=$APP_ENV".into()]).unwrap(),
        Dynamic::from("env=test")
    );
    assert_eq!(
        funcs.call("getHostByName", &["db.internal".into()]).unwrap(),
        Dynamic::from("10.1.2.3")
    );
}

#[test]
fn test_seeded_randomness_repeats() {
    let a = build_funcs(99);
    let b = build_funcs(99);
    for name in ["randAlpha", "randNumeric", "randAlphaNum", "randAscii"] {
        assert_eq!(
            a.call(name, &[12.into()]).unwrap(),
            b.call(name, &[12.into()]).unwrap(),
            "{} differs",
            name
        );
    }
    let n = a.call("randInt", &[10.into(), 20.into()]).unwrap();
    assert!(matches!(n, Dynamic::Int(v) if (10..20).contains(&v)));
}

// =============================================================================
// Hermetic view
// =============================================================================

#[test]
fn test_hermetic_view() {
    let funcs = build_funcs(1);
    let hermetic = funcs.hermetic();

    for name in NON_HERMETIC {
        assert!(funcs.contains(name), "{} should be registered", name);
        assert!(!hermetic.contains(name), "{} should be excluded", name);
    }
    assert_eq!(hermetic.len(), funcs.len() - NON_HERMETIC.len());
    assert_eq!(hermetic.call("upper", &["x".into()]).unwrap(), Dynamic::from("X"));
}

// =============================================================================
// Registered notices
// =============================================================================

#[test]
fn test_atoi_notice_fires_every_call() {
    let funcs = build_funcs(1);
    assert_eq!(funcs.call("atoi", &["7".into()]).unwrap(), Dynamic::Int(7));
    assert_eq!(funcs.call("atoi", &["8".into()]).unwrap(), Dynamic::Int(8));
    assert_eq!(
        funcs.notices(),
        vec![
            ("atoi".to_string(), "use toInt".to_string()),
            ("atoi".to_string(), "use toInt".to_string()),
        ]
    );
}

#[test]
fn test_drain_notices_flushes_shared_log() {
    let funcs = build_funcs(1);
    let hermetic = funcs.hermetic();

    funcs.call("toupper", &["a".into()]).unwrap();
    hermetic.call("atoi", &["1".into()]).unwrap();

    let drained = funcs.drain_notices();
    let subjects: Vec<&str> = drained.iter().map(|n| n.subject.as_str()).collect();
    assert_eq!(subjects, vec!["toupper", "atoi"]);
    assert!(funcs.notices().is_empty());
    assert!(hermetic.notices().is_empty());

    funcs.call("toupper", &["a".into()]).unwrap();
    assert_eq!(funcs.notice_log().len(), 1);
}

// =============================================================================
// Pipelines
// =============================================================================

#[test]
fn test_json_round_trip_through_maps() {
    let funcs = build_funcs(1);

    let dict = funcs
        .call("dict", &["name".into(), "tmpl".into(), "n".into(), 2.into()])
        .unwrap();
    let dict = funcs.call("set", &["n".into(), 3.into(), dict]).unwrap();
    let json = funcs.call("toJson", &[dict]).unwrap();
    assert_eq!(json, Dynamic::from(r#"{"n":3,"name":"tmpl"}"#));

    let back = funcs.call("mustFromJson", &[json]).unwrap();
    assert_eq!(funcs.call("get", &["n".into(), back]).unwrap(), Dynamic::Int(3));

    assert!(funcs.call("mustFromJson", &["{".into()]).is_err());
    assert_eq!(funcs.call("fromJson", &["{".into()]).unwrap(), Dynamic::Null);
}

#[test]
fn test_string_pipeline() {
    let funcs = build_funcs(1);
    let s = funcs.call("trimPrefix", &["x-".into(), "x-hello world".into()]).unwrap();
    let s = funcs.call("title", &[s]).unwrap();
    let parts = funcs.call("splitList", &[" ".into(), s]).unwrap();
    let joined = funcs.call("join", &["_".into(), parts]).unwrap();
    assert_eq!(joined, Dynamic::from("Hello_World"));
}

#[test]
fn test_checksum_is_stable() {
    let funcs = build_funcs(1);
    assert_eq!(
        funcs.call("xxh64sum", &["".into()]).unwrap(),
        Dynamic::from("ef46db3751d8e999")
    );
}
