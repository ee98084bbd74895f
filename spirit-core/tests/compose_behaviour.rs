//! Behavioural tests for theme composition.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::{cell::RefCell, fs, path::PathBuf};
use spirit_core::{
    ColumnDefinition, ComposeError, ComposedTheme, Composer, GeometryClass, GeometryKind, IdKind,
    IndexDefinition, LoadOutcome, SchemaError, TableDefinition, TableName, TopicCatalog,
    TopicConfig, TopicContext, TopicDescriptor, TopicName, TopicRequest, compose,
};

type Outcome = RefCell<Option<Result<ComposedTheme, ComposeError>>>;
type Attempts = RefCell<Vec<TopicConfig>>;
type Session = RefCell<Option<(Vec<Result<LoadOutcome, ComposeError>>, ComposedTheme)>>;

fn topic_name(name: &str) -> TopicName {
    TopicName::new(name).unwrap_or_else(|err| panic!("invalid topic name {name}: {err}"))
}

fn water_table(extra: Option<&str>) -> TableDefinition {
    let table = TableDefinition::new(
        TableName::new("water").expect("valid table name"),
        IdKind::Area,
        GeometryKind::MultiPolygon,
    )
    .with_column(ColumnDefinition::text("kind").expect("valid column"));
    match extra {
        Some(column) => table.with_column(ColumnDefinition::text(column).expect("valid column")),
        None => table,
    }
}

fn declare_water(ctx: &mut TopicContext<'_>, _: &TopicConfig) -> Result<(), ComposeError> {
    ctx.declare_table(water_table(None)).map(drop)
}

fn declare_named_water(ctx: &mut TopicContext<'_>, _: &TopicConfig) -> Result<(), ComposeError> {
    ctx.declare_table(water_table(Some("name"))).map(drop)
}

fn index_missing_column(ctx: &mut TopicContext<'_>, _: &TopicConfig) -> Result<(), ComposeError> {
    let handle = ctx.declare_table(water_table(None))?;
    ctx.add_index(handle, IndexDefinition::spatial("centroid"))
}

/// Declares a table, extends it, registers a callback and requires another
/// topic before honouring the `fail` flag.
fn build_half_then_check(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    let handle = ctx.declare_table(TableDefinition::new(
        TableName::new("half").expect("valid table name"),
        IdKind::Area,
        GeometryKind::MultiPolygon,
    ))?;
    ctx.add_column(handle, ColumnDefinition::text("kind").expect("valid column"))?;
    ctx.register(GeometryClass::Area, |_, _, _| Ok(()));
    ctx.require("test/water", &TopicConfig::new())?;
    if config.get("fail").and_then(|value| value.as_bool()) == Some(true) {
        return Err(ComposeError::InvalidConfiguration {
            topic: ctx.topic().clone(),
            message: "asked to fail".to_owned(),
        });
    }
    Ok(())
}

fn catalog() -> TopicCatalog {
    let descriptors = [
        TopicDescriptor::new(topic_name("test/water"), "water polygons", declare_water),
        TopicDescriptor::new(topic_name("test/water-copy"), "same water polygons", declare_water),
        TopicDescriptor::new(topic_name("test/named-water"), "named water", declare_named_water),
        TopicDescriptor::new(topic_name("test/bad-index"), "broken index", index_missing_column),
        TopicDescriptor::new(topic_name("test/ping"), "requires pong", |ctx, _| {
            ctx.require("test/pong", &TopicConfig::new()).map(drop)
        }),
        TopicDescriptor::new(topic_name("test/pong"), "requires ping", |ctx, _| {
            ctx.require("test/ping", &TopicConfig::new()).map(drop)
        }),
        TopicDescriptor::new(topic_name("test/leader"), "runs first", |_, _| Ok(())),
        TopicDescriptor::new(topic_name("test/follower"), "runs second", |_, _| Ok(()))
            .with_runs_after(topic_name("test/leader")),
        TopicDescriptor::new(topic_name("test/half"), "fails on request", build_half_then_check),
    ];
    let mut catalog = TopicCatalog::default();
    for descriptor in descriptors {
        catalog
            .register(descriptor)
            .unwrap_or_else(|err| panic!("catalog registration failed: {err}"));
    }
    catalog
}

#[fixture]
fn requests() -> RefCell<Vec<TopicRequest>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn outcome() -> Outcome {
    RefCell::new(None)
}

#[fixture]
fn attempts() -> Attempts {
    RefCell::new(Vec::new())
}

#[fixture]
fn session() -> Session {
    RefCell::new(None)
}

fn set_theme(requests: &RefCell<Vec<TopicRequest>>, names: &[&str]) {
    *requests.borrow_mut() = names
        .iter()
        .map(|name| TopicRequest::new(topic_name(name)))
        .collect();
}

fn expect_error(outcome: &Outcome) -> ComposeError {
    match outcome.borrow_mut().take() {
        Some(Err(err)) => err,
        Some(Ok(theme)) => panic!("expected composition to fail, got {:?}", theme.load_order()),
        None => panic!("composition was not attempted"),
    }
}

fn expect_theme(outcome: &Outcome) -> std::cell::Ref<'_, ComposedTheme> {
    std::cell::Ref::map(outcome.borrow(), |slot| match slot {
        Some(Ok(theme)) => theme,
        Some(Err(err)) => panic!("expected composition to succeed: {err}"),
        None => panic!("composition was not attempted"),
    })
}

#[given("a theme with two topics declaring different water tables")]
fn conflicting_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/water", "test/named-water"]);
}

#[given("a theme with two topics declaring the same water table")]
fn identical_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/water", "test/water-copy"]);
}

#[given("a theme listing the water topic twice")]
fn repeated_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/water", "test/water"]);
}

#[given("a theme with topics that require each other")]
fn cyclic_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/ping"]);
}

#[given("a theme with a topic indexing a missing column")]
fn bad_index_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/bad-index"]);
}

#[given("a theme loading a follower before its leader")]
fn misordered_theme(#[from(requests)] requests: &RefCell<Vec<TopicRequest>>) {
    set_theme(requests, &["test/follower", "test/leader"]);
}

#[given("a half-built topic that fails")]
fn failing_attempt(#[from(attempts)] attempts: &Attempts) {
    attempts
        .borrow_mut()
        .push(TopicConfig::new().with("fail", true));
}

#[given("the half-built topic retried with a valid configuration")]
fn valid_attempt(#[from(attempts)] attempts: &Attempts) {
    attempts.borrow_mut().push(TopicConfig::new());
}

#[when("I load each attempt and finish composing")]
fn load_attempts(#[from(attempts)] attempts: &Attempts, #[from(session)] session: &Session) {
    let catalog = catalog();
    let mut composer = Composer::new(&catalog);
    let results = attempts
        .borrow()
        .iter()
        .map(|config| composer.load("test/half", config))
        .collect();
    *session.borrow_mut() = Some((results, composer.finish()));
}

#[when("I compose the theme")]
fn compose_theme(
    #[from(requests)] requests: &RefCell<Vec<TopicRequest>>,
    #[from(outcome)] outcome: &Outcome,
) {
    let catalog = catalog();
    let result = compose(&catalog, &requests.borrow());
    *outcome.borrow_mut() = Some(result);
}

#[then("composition fails with a duplicate table error")]
fn duplicate_table(#[from(outcome)] outcome: &Outcome) {
    match expect_error(outcome) {
        ComposeError::Schema {
            topic,
            source: SchemaError::DuplicateTable { table, owner },
        } => {
            assert_eq!(topic.as_str(), "test/named-water");
            assert_eq!(table.as_str(), "water");
            assert_eq!(owner.as_str(), "test/water");
        }
        other => panic!("expected a duplicate table error, got {other}"),
    }
}

#[then("the schema holds a single water table")]
fn single_water_table(#[from(outcome)] outcome: &Outcome) {
    let theme = expect_theme(outcome);
    assert_eq!(theme.schema().len(), 1);
    let water = theme.schema().table("water").expect("water table declared");
    assert_eq!(water, &water_table(None));
}

#[then("the water topic appears once in the load order")]
fn water_loaded_once(#[from(outcome)] outcome: &Outcome) {
    let theme = expect_theme(outcome);
    let names: Vec<_> = theme.load_order().iter().map(TopicName::as_str).collect();
    assert_eq!(names, ["test/water"]);
}

#[then("composition fails with a cyclic load error")]
fn cyclic_load(#[from(outcome)] outcome: &Outcome) {
    match expect_error(outcome) {
        ComposeError::CyclicTopicLoad { chain } => {
            let names: Vec<_> = chain.iter().map(TopicName::as_str).collect();
            assert_eq!(names, ["test/ping", "test/pong", "test/ping"]);
        }
        other => panic!("expected a cyclic load error, got {other}"),
    }
}

#[then("composition fails with an unknown column error")]
fn unknown_column(#[from(outcome)] outcome: &Outcome) {
    let err = expect_error(outcome);
    assert!(
        matches!(
            &err,
            ComposeError::Schema {
                source: SchemaError::UnknownColumn { column, .. },
                ..
            } if column == "centroid"
        ),
        "expected an unknown column error, got {err}"
    );
}

#[then("composition succeeds with one ordering warning")]
fn one_ordering_warning(#[from(outcome)] outcome: &Outcome) {
    let theme = expect_theme(outcome);
    let warnings = theme.warnings();
    assert_eq!(warnings.len(), 1);
    let warning = warnings.first().expect("one warning");
    assert_eq!(warning.topic().as_str(), "test/follower");
    assert_eq!(warning.should_follow().as_str(), "test/leader");
}

fn expect_session(session: &Session) -> std::cell::Ref<'_, (Vec<Result<LoadOutcome, ComposeError>>, ComposedTheme)> {
    std::cell::Ref::map(session.borrow(), |slot| {
        slot.as_ref().unwrap_or_else(|| panic!("attempts were not loaded"))
    })
}

#[then("the failed attempt reports its error")]
fn failed_attempt_reported(#[from(session)] session: &Session) {
    let state = expect_session(session);
    let first = state.0.first().expect("one attempt");
    assert!(
        matches!(first, Err(ComposeError::InvalidConfiguration { topic, .. }) if topic.as_str() == "test/half"),
        "expected the first attempt to fail, got {first:?}"
    );
}

#[then("the composed theme holds nothing from the failed topic")]
fn nothing_from_failed_topic(#[from(session)] session: &Session) {
    let state = expect_session(session);
    let theme = &state.1;
    assert!(theme.schema().table("half").is_none());
    assert!(theme.schema().table("water").is_none());
    assert!(theme.schema().is_empty());
    assert_eq!(theme.pipeline().len(GeometryClass::Area), 0);
    assert!(theme.load_order().is_empty());
}

#[then("the retry loads the half table once")]
fn retry_loads_half(#[from(session)] session: &Session) {
    let state = expect_session(session);
    let (results, theme) = &*state;
    assert!(matches!(results.last(), Some(Ok(LoadOutcome::Loaded))));
    let half = theme.schema().table("half").expect("half table declared");
    assert!(half.column("kind").is_some());
    assert_eq!(half.columns().len(), 2);
    assert_eq!(theme.pipeline().len(GeometryClass::Area), 1);
    let names: Vec<_> = theme.load_order().iter().map(TopicName::as_str).collect();
    assert_eq!(names, ["test/water", "test/half"]);
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/compose_theme.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "rejecting conflicting table declarations",
            "merging identical table declarations",
            "loading a topic twice",
            "detecting mutually dependent topics",
            "rejecting an index on a missing column",
            "warning about topics loaded out of order",
            "discarding a failed topic's contributions",
            "retrying a topic after a failed load",
        ]
    );
}

#[scenario(path = "tests/features/compose_theme.feature", index = 0)]
fn rejecting_conflicting_tables(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 1)]
fn merging_identical_tables(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 2)]
fn loading_a_topic_twice(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 3)]
fn detecting_cycles(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 4)]
fn rejecting_bad_indexes(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 5)]
fn warning_about_order(requests: RefCell<Vec<TopicRequest>>, outcome: Outcome) {
    let _ = (requests, outcome);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 6)]
fn discarding_failed_contributions(attempts: Attempts, session: Session) {
    let _ = (attempts, session);
}

#[scenario(path = "tests/features/compose_theme.feature", index = 7)]
fn retrying_after_failure(attempts: Attempts, session: Session) {
    let _ = (attempts, session);
}
