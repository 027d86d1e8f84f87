//! Integration tests over a full campaign script

use ufoscript_core::tests::test_helpers::{approx_eq_f32, parse_ufo_file};
use ufoscript_core::{DiagnosticKind, ParseOutput, Value};
use std::path::PathBuf;

fn data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("integration");
    path.push("data");
    path.push(filename);
    path
}

fn campaign() -> ParseOutput {
    parse_ufo_file(data_path("campaign_full.ufo").to_str().unwrap())
        .expect("campaign_full.ufo should be readable")
}

#[test]
fn test_campaign_parses_every_known_block() {
    let output = campaign();

    assert_eq!(output.parsed().count(), 7);
    assert_eq!(output.failed().count(), 0);
    assert!(!output.diagnostics.has_errors());
}

#[test]
fn test_unknown_mapdef_is_a_warning() {
    let output = campaign();

    let warnings: Vec<_> = output.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::UnknownKeyword);
    assert!(warnings[0].message.contains("mapdef"));
}

#[test]
fn test_salary_values() {
    let output = campaign();
    let salary = output.find("salary", None).unwrap();

    assert_eq!(salary.fields.len(), 20);
    assert_eq!(salary.field("base_upkeep").and_then(Value::as_int), Some(20000));
    assert_eq!(salary.field("admin_robot").and_then(Value::as_int), Some(150));
    let interest = salary.field("debt_interest").and_then(Value::as_float).unwrap();
    assert!(approx_eq_f32(interest, 0.005, 1e-6));
}

#[test]
fn test_tech_values() {
    let output = campaign();
    let laser = output.find("tech", Some("rs_laser")).unwrap();

    assert_eq!(
        laser.field("name"),
        Some(&Value::Translation("Laser Weapons".to_string()))
    );
    assert_eq!(laser.field("needscollected").and_then(Value::as_bool), Some(false));
    assert_eq!(laser.field("image_top").and_then(Value::as_str), Some("techs/laser"));

    let plasma = output.find("tech", Some("rs_plasma")).unwrap();
    assert_eq!(plasma.fields.len(), 2);
}

#[test]
fn test_alien_teams_keep_source_order() {
    let output = campaign();
    let teams: Vec<_> = output
        .parsed()
        .filter(|b| b.keyword == "alienteam")
        .map(|b| b.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(teams, vec!["grey".to_string(), "taman".to_string()]);

    let grey = output.find("alienteam", Some("grey")).unwrap();
    assert_eq!(
        grey.field("equipment").and_then(Value::as_list),
        Some(&["alien_pistol".to_string(), "plasma_blaster".to_string()][..])
    );
    assert_eq!(grey.fields_named("category").count(), 1);
}

#[test]
fn test_physics_body_with_nested_groups() {
    let output = campaign();
    let physics = output.find("physics", Some("soldier1")).unwrap();
    assert!(physics.fields.is_empty());
}
