use crate::{
    chain::{Chain, ChainBuilder, Dispatch, DispatchError, Handler, Outcome},
    observers::OutcomeRecorder,
};

/// Helper function to wire the three-link test chain by hand
fn setup_test_chain() -> Chain {
    let built = ChainBuilder::new()
        .successor(Handler::new("handler1", 0, 10))
        .successor(Handler::new("handler2", 10, 20))
        .successor(Handler::new("handler3", 20, 30))
        .build();
    assert!(built.is_ok());
    built.unwrap_or_else(|_| Chain::standard())
}

#[test]
fn test_built_chain_is_never_empty() {
    let chain = setup_test_chain();
    assert!(!chain.is_empty());
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.handlers().first().map(|h| h.name.as_str()), Some("handler1"));
}

#[test]
fn test_concrete_requests() {
    let chain = setup_test_chain();

    assert_eq!(
        chain.handle(5),
        Outcome::Handled(Dispatch { handler: "handler1".to_string(), value: 5, hops: 0 })
    );
    assert_eq!(
        chain.handle(22),
        Outcome::Handled(Dispatch { handler: "handler3".to_string(), value: 22, hops: 2 })
    );
    assert_eq!(chain.handle(31), Outcome::Unhandled(31));
}

#[test]
fn test_every_request_lands_on_its_range_owner() {
    let chain = setup_test_chain();

    for request in -20..50_i64 {
        let expected = match request {
            0..=9 => Some("handler1"),
            10..=19 => Some("handler2"),
            20..=29 => Some("handler3"),
            _ => None,
        };
        let outcome = chain.handle(request);
        assert_eq!(outcome.handler(), expected, "request {request}");
        assert_eq!(outcome.value(), request);
    }
}

#[test]
fn test_boundaries_are_half_open() {
    let chain = setup_test_chain();
    assert_eq!(chain.handle(0).handler(), Some("handler1"));
    assert_eq!(chain.handle(9).handler(), Some("handler1"));
    assert_eq!(chain.handle(10).handler(), Some("handler2"));
    assert_eq!(chain.handle(29).handler(), Some("handler3"));
    assert_eq!(chain.handle(30), Outcome::Unhandled(30));
    assert_eq!(chain.handle(-1), Outcome::Unhandled(-1));
}

#[test]
fn test_first_match_wins_on_overlap() {
    let wide_first = ChainBuilder::new().handler("wide", 0, 30).handler("narrow", 10, 20).build();
    let narrow_first = ChainBuilder::new().handler("narrow", 10, 20).handler("wide", 0, 30).build();
    assert!(wide_first.is_ok() && narrow_first.is_ok());

    if let (Ok(wide_first), Ok(narrow_first)) = (wide_first, narrow_first) {
        assert_eq!(wide_first.handle(15).handler(), Some("wide"));
        assert_eq!(narrow_first.handle(15).handler(), Some("narrow"));
        assert_eq!(narrow_first.handle(25).handler(), Some("wide"));
        assert_eq!(narrow_first.handle(25).dispatch().map(|d| d.hops), Some(1));
    }
}

#[test]
fn test_handle_all_keeps_order() {
    let chain = Chain::standard();
    let requests = [1, 3, 15, 18, 22, 25, 14, 2, 16, 27, 31];
    let outcomes = chain.handle_all(requests);

    let handlers: Vec<_> = outcomes.iter().map(Outcome::handler).collect();
    assert_eq!(
        handlers,
        [
            Some("handler1"),
            Some("handler1"),
            Some("handler2"),
            Some("handler2"),
            Some("handler3"),
            Some("handler3"),
            Some("handler2"),
            Some("handler1"),
            Some("handler2"),
            Some("handler3"),
            None,
        ]
    );
    let values: Vec<_> = outcomes.iter().map(Outcome::value).collect();
    assert_eq!(values, requests);
}

#[test]
fn test_observers_see_every_outcome() {
    let recorder = OutcomeRecorder::new();
    let built = ChainBuilder::new()
        .handler("low", 0, 5)
        .observer(Box::new(recorder.clone()))
        .build();
    assert!(built.is_ok());

    if let Ok(chain) = built {
        chain.handle(3);
        chain.handle(7);
    }

    assert_eq!(
        recorder.outcomes(),
        [
            Outcome::Handled(Dispatch { handler: "low".to_string(), value: 3, hops: 0 }),
            Outcome::Unhandled(7),
        ]
    );
}

#[test]
fn test_build_rejects_bad_layouts() {
    assert_eq!(ChainBuilder::new().build().err(), Some(DispatchError::EmptyChain));
    assert_eq!(
        ChainBuilder::new().handler("backwards", 10, 5).build().err(),
        Some(DispatchError::EmptyRange { name: "backwards".to_string(), low: 10, high: 5 })
    );
    assert_eq!(
        ChainBuilder::new().handler("twice", 0, 5).handler("twice", 5, 10).build().err(),
        Some(DispatchError::DuplicateHandler("twice".to_string()))
    );
}

#[test]
fn test_outcome_display() {
    let chain = Chain::standard();
    assert_eq!(chain.handle(15).to_string(), "handler2 handled request 15");
    assert_eq!(chain.handle(99).to_string(), "request 99 fell off the chain");
}
