//! Test helper utilities for UFO script tests

use crate::ast::{BlockOutcome, ParseOutput, Value};
use crate::kinds::standard_registry;
use crate::parser::parse_script;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Check if two f32 values are approximately equal within tolerance
pub fn approx_eq_f32(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

/// Load expected output from a file
pub fn load_expected(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)?)
}

/// Write expected output to a file (for initial generation)
pub fn write_expected(path: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(path, content)?)
}

/// Parse a script file with the standard block kinds
pub fn parse_ufo_file(file: &str) -> Result<ParseOutput, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(file)?;
    Ok(parse_ufo_source(&src))
}

/// Parse script text with the standard block kinds
pub fn parse_ufo_source(source: &str) -> ParseOutput {
    parse_script(source, &standard_registry())
}

/// Render a value on one line
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Int(v) => format!("int {}", v),
        Value::Float(v) => format!("float {}", v),
        Value::Bool(v) => format!("bool {}", v),
        Value::String(s) => format!("string {:?}", s),
        Value::Translation(s) => format!("translation {:?}", s),
        Value::Vec2(v) => format!("vec2 {} {}", v.x, v.y),
        Value::Vec3(v) => format!("vec3 {} {} {}", v.x, v.y, v.z),
        Value::Vec4(v) => format!("vec4 {} {} {} {}", v.x, v.y, v.z, v.w),
        Value::List(items) => format!("list [{}]", items.join(", ")),
        Value::Record(parts) => {
            let parts: Vec<String> = parts.iter().map(value_to_text).collect();
            format!("record ({})", parts.join(", "))
        }
    }
}

/// Convert a parse output to text for golden tests
pub fn output_to_text(output: &ParseOutput) -> String {
    let mut text = String::new();
    for outcome in &output.blocks {
        let (label, keyword, name) = match outcome {
            BlockOutcome::Parsed(block) => ("block", &block.keyword, &block.name),
            BlockOutcome::Failed(block) => ("failed", &block.keyword, &block.name),
        };
        match name {
            Some(name) => writeln!(text, "{} {} {}", label, keyword, name).unwrap(),
            None => writeln!(text, "{} {}", label, keyword).unwrap(),
        }
        if let BlockOutcome::Parsed(block) = outcome {
            for field in &block.fields {
                writeln!(text, "  {} = {}", field.key, value_to_text(&field.value)).unwrap();
            }
        }
    }
    for diagnostic in &output.diagnostics {
        writeln!(text, "{}", diagnostic).unwrap();
    }
    text
}

/// Keywords and names of all outcomes, in order
pub fn outline(output: &ParseOutput) -> Vec<(String, Option<String>, bool)> {
    output
        .blocks
        .iter()
        .map(|b| (b.keyword().to_string(), b.name().map(str::to_string), b.is_failed()))
        .collect()
}
