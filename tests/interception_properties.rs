// tests/interception_properties.rs
//! Behavioural properties of intercepted call sites
//!
//! Runs calls through a `MethodTable` with a session attached and checks
//! the wrapped call against the unwrapped one.

use calltap_engine::interception::{
    implementation, ArgValue, CallFailure, FieldSpec, HookPlan, HookPoint, InterceptionSession,
    MethodTable, ObservedEvent,
};
use calltap_engine::transport::MemoryTransport;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CLASS: &str = "com.example.Crypto";

/// Deterministic stand-in for a target member: fails on a marker argument
fn target_behaviour(args: &[ArgValue]) -> Result<ArgValue, CallFailure> {
    if args.iter().any(|a| a.as_str() == Some("raise")) {
        return Err(CallFailure::new("java.lang.IllegalArgumentException", "bad input"));
    }
    Ok(ArgValue::List(args.iter().rev().cloned().collect()))
}

fn plan() -> HookPlan {
    HookPlan::new(vec![
        HookPoint::request(CLASS, "seal", 1)
            .with_field(FieldSpec::new(0, "body"))
            .with_field(FieldSpec::new(2, "extra")),
        HookPoint::response(CLASS, "open", 1, 1).with_field(FieldSpec::new(0, "body")),
    ])
}

struct Harness {
    table: Arc<MethodTable>,
    transport: Arc<MemoryTransport>,
    calls: Arc<AtomicUsize>,
    session: InterceptionSession,
}

fn harness() -> Harness {
    let table = Arc::new(MethodTable::new());
    let calls = Arc::new(AtomicUsize::new(0));

    for member in ["seal", "open"] {
        let counter = Arc::clone(&calls);
        table.define(
            CLASS,
            member,
            None,
            implementation(move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                target_behaviour(args)
            }),
        );
    }

    let transport = Arc::new(MemoryTransport::new());
    let session = InterceptionSession::new(table.clone(), transport.clone());
    let report = session.attach(&plan()).unwrap();
    assert!(report.is_complete());

    Harness {
        table,
        transport,
        calls,
        session,
    }
}

fn arg_value() -> impl Strategy<Value = ArgValue> {
    let leaf = prop_oneof![
        Just(ArgValue::Null),
        any::<bool>().prop_map(ArgValue::Bool),
        any::<i64>().prop_map(ArgValue::Int),
        "[a-z0-9]{0,12}".prop_map(ArgValue::Str),
        Just(ArgValue::from("raise")),
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(ArgValue::Bytes),
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(ArgValue::List),
            proptest::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(ArgValue::Map),
        ]
    })
}

proptest! {
    #[test]
    fn wrapped_call_matches_original(
        args in proptest::collection::vec(arg_value(), 0..6),
        member in prop_oneof![Just("seal"), Just("open")],
    ) {
        let h = harness();

        let wrapped = h.table.invoke(CLASS, member, &args).unwrap();
        prop_assert_eq!(&wrapped, &target_behaviour(&args));

        // original runs exactly once per call
        prop_assert_eq!(h.calls.load(Ordering::SeqCst), 1);

        // one event on success, none on failure
        let expected_events = usize::from(wrapped.is_ok());
        prop_assert_eq!(h.transport.len(), expected_events);
    }

    #[test]
    fn kind_is_fixed_per_hook_point(
        calls in proptest::collection::vec(proptest::collection::vec(arg_value(), 0..5), 1..10),
    ) {
        let h = harness();

        for args in &calls {
            let _ = h.table.invoke(CLASS, "seal", args).unwrap();
        }

        for message in h.transport.messages() {
            let event: serde_json::Value = serde_json::from_str(&message).unwrap();
            prop_assert_eq!(&event["type"], "request");
            prop_assert!(event["nonce"].is_string());
        }
    }
}

#[test]
fn request_scenario_emits_one_message() {
    let table = Arc::new(MethodTable::new());
    table.define(CLASS, "encrypt", Some(4), implementation(|_| Ok(ArgValue::from("sealed"))));

    let point = HookPoint::request(CLASS, "encrypt", 3)
        .with_arity(4)
        .with_field(FieldSpec::new(0, "method"))
        .with_field(FieldSpec::new(1, "route"))
        .with_field(FieldSpec::new(2, "body").with_key("data"));

    let transport = Arc::new(MemoryTransport::new());
    let session = InterceptionSession::new(table.clone(), transport.clone());
    session.attach(&HookPlan::new(vec![point])).unwrap();

    let args = vec![
        ArgValue::from("POST"),
        ArgValue::from("/api/x"),
        ArgValue::map([("data", r#"{"k":"v"}"#)]),
        ArgValue::from("n0nce123"),
    ];
    let result = table.invoke(CLASS, "encrypt", &args).unwrap();
    assert_eq!(result.unwrap(), ArgValue::from("sealed"));

    let messages = transport.messages();
    assert_eq!(messages.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&messages[0]).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "nonce": "n0nce123",
            "type": "request",
            "method": "POST",
            "route": "/api/x",
            "body": r#"{"k":"v"}"#
        })
    );

    // correlation key absent: still emitted, with an empty nonce
    let short = &args[..3];
    table.invoke(CLASS, "encrypt", short).unwrap().unwrap();

    let event = ObservedEvent::from_message(&transport.messages()[1]).unwrap();
    assert_eq!(event.correlation_key.as_str(), "");
    assert_eq!(event.field("method"), Some("POST"));
    assert_eq!(event.field("route"), Some("/api/x"));
    assert_eq!(event.field("body"), Some(r#"{"k":"v"}"#));
}

#[test]
fn failing_response_hook_emits_nothing() {
    let h = harness();
    let args = vec![ArgValue::from("raise"), ArgValue::from("nonce")];

    let err = h.table.invoke(CLASS, "open", &args).unwrap().unwrap_err();
    assert_eq!(err, CallFailure::new("java.lang.IllegalArgumentException", "bad input"));
    assert!(h.transport.is_empty());
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn detached_session_stops_emitting() {
    let h = harness();
    let args = vec![ArgValue::from("body"), ArgValue::from("nonce")];

    h.table.invoke(CLASS, "seal", &args).unwrap().unwrap();
    assert_eq!(h.transport.len(), 1);

    h.session.detach();
    let result = h.table.invoke(CLASS, "seal", &args).unwrap();
    assert_eq!(result, target_behaviour(&args));
    assert_eq!(h.transport.len(), 1);
}
