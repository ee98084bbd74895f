//! Focused unit tests covering command configuration and execution.

use super::helpers::{LANDUSE_AND_POIS, Workspace};
use super::*;
use crate::fonts::{DEFAULT_FONTS_CONFIG, FontsConfig, execute_fonts};
use crate::ingest::{DEFAULT_OUTPUT, IngestConfig};
use crate::schema::{SchemaConfig, run_schema};
use crate::theme::load_theme;
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use spirit_data::fonts::FetchOptions;
use spirit_data::fonts::test_support::{RecordingGlyphBuilder, StubFontSource};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

#[rstest]
#[case(None, Some("planet.osm.pbf"), ARG_THEME, ENV_INGEST_THEME)]
#[case(Some("theme.json"), None, ARG_OSM_PBF, ENV_INGEST_OSM_PBF)]
fn ingest_requires_theme_and_extract(
    #[case] theme: Option<&str>,
    #[case] osm: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = IngestArgs {
        theme: theme.map(Utf8PathBuf::from),
        osm_pbf: osm.map(Utf8PathBuf::from),
        ..IngestArgs::default()
    };
    let err = IngestConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn ingest_output_defaults_to_spirit_db() {
    let args = IngestArgs {
        theme: Some(Utf8PathBuf::from("theme.json")),
        osm_pbf: Some(Utf8PathBuf::from("planet.osm.pbf")),
        output: None,
    };
    let config = IngestConfig::try_from(args).expect("config resolves");
    assert_eq!(config.output, DEFAULT_OUTPUT);
}

#[rstest]
fn schema_requires_a_theme() {
    let err = SchemaConfig::try_from(SchemaArgs::default()).expect_err("theme missing");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_THEME);
            assert_eq!(env, ENV_SCHEMA_THEME);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_files(workspace: Workspace) {
    let config = IngestConfig {
        theme: workspace.file("theme.json", LANDUSE_AND_POIS),
        osm_pbf: workspace.root().join("missing.osm.pbf"),
        output: workspace.root().join("out.db"),
    };
    match config.validate_sources().expect_err("extract missing") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_OSM_PBF),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directory_outputs(workspace: Workspace) {
    let config = IngestConfig {
        theme: workspace.file("theme.json", LANDUSE_AND_POIS),
        osm_pbf: workspace.file("extract.osm.pbf", b""),
        output: workspace.root().to_path_buf(),
    };
    match config.validate_sources().expect_err("output is a directory") {
        CliError::OutputIsDirectory { path } => assert_eq!(path, workspace.root()),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn schema_command_prints_tables_in_load_order(workspace: Workspace) {
    let config = SchemaConfig {
        theme: workspace.file("theme.json", LANDUSE_AND_POIS),
    };
    let mut out = Vec::new();
    run_schema(&config, &mut out).expect("schema printed");

    let printed: serde_json::Value = serde_json::from_slice(&out).expect("valid JSON");
    let tables = printed["tables"].as_array().expect("tables array");
    let names: Vec<_> = tables
        .iter()
        .map(|table| table["name"].as_str().expect("table name"))
        .collect();
    assert_eq!(names, ["landuse", "pois"]);
    assert_eq!(tables[0]["owner"], "shortbread_v1/landuse");
}

#[rstest]
fn loaded_theme_carries_ordering_warnings(workspace: Workspace) {
    let path = workspace.file(
        "theme.json",
        r#"{"topics": [{"name": "shortbread_v1/addresses"}, {"name": "shortbread_v1/pois"}]}"#,
    );
    let theme = load_theme(&path).expect("theme composes");
    let warnings = theme.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].topic().as_str(), "shortbread_v1/addresses");
}

#[rstest]
#[case::malformed("{\"topics\": [", "parse")]
#[case::unknown_topic(r#"{"topics": [{"name": "shortbread_v1/roads"}]}"#, "compose")]
fn schema_command_reports_theme_errors(
    workspace: Workspace,
    #[case] contents: &str,
    #[case] expected: &str,
) {
    let config = SchemaConfig {
        theme: workspace.file("theme.json", contents),
    };
    let err = run_schema(&config, &mut Vec::new()).expect_err("theme rejected");
    match (expected, err) {
        ("parse", CliError::ParseTheme { .. }) | ("compose", CliError::Compose { .. }) => {}
        (_, other) => panic!("expected {expected} error, found {other:?}"),
    }
}

#[rstest]
fn fonts_config_defaults() {
    let config = FontsConfig::from(FontsArgs::default());
    assert_eq!(config.config, DEFAULT_FONTS_CONFIG);
    assert_eq!(config.data, None);
    assert_eq!(config.options, FetchOptions::default());
}

#[rstest]
fn fonts_command_honours_the_data_override(workspace: Workspace) {
    let fonts_yml = workspace.file(
        "fonts.yml",
        "settings:\n  fonts_dir: configured\nsources:\n  noto:\n    url: https://example.org/noto.ttf\n",
    );
    let data = workspace.root().join("override");
    let config = FontsConfig {
        config: fonts_yml,
        data: Some(data.clone()),
        options: FetchOptions::default(),
    };
    let source = StubFontSource::new(b"font".to_vec(), "Tue, 01 Oct 2024 10:00:00 GMT");
    let glyphs = RecordingGlyphBuilder::default();

    let report = execute_fonts(&config, &source, &glyphs).expect("fonts fetched");

    assert_eq!(report.downloaded(), 1);
    assert!(spirit_fs::file_is_file(&data.join("noto.ttf")).expect("probe"));
    assert!(spirit_fs::dir_exists(&data.join("noto")).expect("probe"));
    assert!(!spirit_fs::dir_exists(&workspace.root().join("configured")).expect("probe"));
}

#[rstest]
fn fonts_command_requires_its_configuration(workspace: Workspace) {
    let config = FontsConfig {
        config: workspace.root().join("fonts.yml"),
        data: None,
        options: FetchOptions::default(),
    };
    let source = StubFontSource::new(Vec::new(), "");
    let err = execute_fonts(&config, &source, &RecordingGlyphBuilder::default())
        .expect_err("configuration missing");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_FONTS_CONFIG),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
#[case(false, false, Verbosity::Normal)]
#[case(true, false, Verbosity::Verbose)]
#[case(false, true, Verbosity::Quiet)]
fn verbosity_follows_flags(#[case] verbose: bool, #[case] quiet: bool, #[case] expected: Verbosity) {
    assert_eq!(Verbosity::from_flags(verbose, quiet), expected);
}

#[rstest]
fn quiet_runs_keep_spirit_crates_at_warn() {
    let directives = Verbosity::Quiet.directives();
    assert!(directives.starts_with("warn,"));
    assert!(directives.contains("spirit_data=warn"));
    assert!(directives.contains("spirit_core=warn"));
}

#[rstest]
fn verbose_and_quiet_conflict() {
    let err = Cli::try_parse_from(["spirit", "-v", "-q", "schema"]).expect_err("flags conflict");
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[rstest]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from(["spirit", "fonts", "--no-update", "--verbose"])
        .expect("arguments parse");
    assert!(cli.verbose);
    match cli.command {
        Command::Fonts(args) => assert!(args.no_update),
        other => panic!("expected fonts command, found {other:?}"),
    }
}
