//! End-to-end checks through the public API.

use duty_cycle::{
    Activity, Chain, ChainBuilder, ChainConfig, DayReport, Handler, Outcome, StateVisualization,
    WorkDay, WorkState, run,
};

#[test]
fn test_standard_chain_scenarios() {
    let chain = Chain::standard();

    let five = chain.handle(5);
    assert_eq!(five.handler(), Some("handler1"));
    assert_eq!(five.value(), 5);

    let twenty_two = chain.handle(22);
    assert_eq!(twenty_two.handler(), Some("handler3"));
    assert_eq!(twenty_two.value(), 22);

    assert_eq!(chain.handle(31), Outcome::Unhandled(31));
}

#[test]
fn test_gaps_between_ranges_fall_through() {
    let built = ChainBuilder::new()
        .successor(Handler::new("low", 0, 10))
        .successor(Handler::new("high", 20, 30))
        .build();
    assert!(built.is_ok());

    if let Ok(chain) = built {
        assert_eq!(chain.handle(15), Outcome::Unhandled(15));
        assert_eq!(chain.handle(25).dispatch().map(|d| d.hops), Some(1));
    }
}

#[test]
fn test_demo_layout_file_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/chain.json");
    let chain = ChainConfig::load_from_file(&path).and_then(|config| config.build());
    assert!(chain.is_ok());

    if let Ok(chain) = chain {
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.handle(5).handler(), Some("handler1"));
        assert_eq!(chain.handle(22).handler(), Some("handler3"));
        assert_eq!(chain.handle(31), Outcome::Unhandled(31));
    }
}

#[test]
fn test_day_scenarios() {
    assert_eq!(run(9, false), Ok(Activity::Forenoon));
    assert_eq!(run(22, false), Ok(Activity::Sleep));
    assert_eq!(run(18, true), Ok(Activity::Off));
}

#[test]
fn test_run_is_pure() {
    for hour in 0..24 {
        for finished in [false, true] {
            let first = run(hour, finished);
            assert_eq!(run(hour, finished), first);
            assert!(matches!(first, Ok(activity) if Activity::ALL.contains(&activity)));
        }
    }
}

#[test]
fn test_report_json_shape() {
    let mut day = WorkDay::new(22, false);
    assert_eq!(day.run(), Ok(Activity::Sleep));

    let report = day.report();
    assert!(report.is_some());
    if let Some(report) = report {
        assert_eq!(report.path.last(), Some(&WorkState::Sleeping));

        let json = serde_json::to_string(&report);
        assert!(json.is_ok());
        if let Ok(json) = json {
            assert!(json.contains("\"activity\":\"Sleep\""));
            let parsed: Result<DayReport, _> = serde_json::from_str(&json);
            assert!(matches!(parsed, Ok(ref parsed) if *parsed == report));
        }
    }
}

#[test]
fn test_history_table_for_a_late_day() {
    let mut day = WorkDay::new(22, false);
    assert!(day.run().is_ok());
    let table = StateVisualization::history_table(day.get_history());
    assert!(table.contains("| 1 | Forenoon | Noon | 22 |"));
    assert!(table.contains("| 4 | Evening | Sleeping | 22 |"));
}

#[test]
fn test_loaded_layout_is_what_gets_drawn() {
    let dir = tempfile::tempdir();
    assert!(dir.is_ok());
    if let Ok(dir) = dir {
        let path = dir.path().join("layout.json");
        let written = std::fs::write(
            &path,
            r#"{ "handlers": [ { "name": "clerk", "low": 0, "high": 500 },
                               { "name": "manager", "low": 500, "high": 5000 } ] }"#,
        );
        assert!(written.is_ok());

        let chain = ChainConfig::load_from_file(&path).and_then(|config| config.build());
        assert!(chain.is_ok());
        if let Ok(chain) = chain {
            let dot = StateVisualization::chain_dot(&chain);
            assert!(dot.contains("h0 [label=\"clerk\\n[0, 500)\"];"));
            assert!(dot.contains("h1 [label=\"manager\\n[500, 5000)\"];"));
            assert!(dot.contains("h1 -> unhandled"));
            assert!(!dot.contains("handler1"));
        }
    }
}
