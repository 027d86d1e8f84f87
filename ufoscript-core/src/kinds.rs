//! Block kinds understood out of the box

use crate::fields::{FieldSpec, FieldTable, ValueType};
use crate::registry::{BlockKind, Registry, RegistryBuilder};
use crate::subparser::Unstructured;

/// `physics <name> { ... }`; the body is accepted without field parsing
pub fn physics() -> BlockKind {
    BlockKind::named("physics", Unstructured)
}

const SALARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("soldier_base", ValueType::Int),
    FieldSpec::new("soldier_rankbonus", ValueType::Int),
    FieldSpec::new("worker_base", ValueType::Int),
    FieldSpec::new("worker_rankbonus", ValueType::Int),
    FieldSpec::new("scientist_base", ValueType::Int),
    FieldSpec::new("scientist_rankbonus", ValueType::Int),
    FieldSpec::new("pilot_base", ValueType::Int),
    FieldSpec::new("pilot_rankbonus", ValueType::Int),
    FieldSpec::new("robot_base", ValueType::Int),
    FieldSpec::new("robot_rankbonus", ValueType::Int),
    FieldSpec::new("aircraft_factor", ValueType::Int),
    FieldSpec::new("aircraft_divisor", ValueType::Int),
    FieldSpec::new("base_upkeep", ValueType::Int),
    FieldSpec::new("admin_initial", ValueType::Int),
    FieldSpec::new("admin_soldier", ValueType::Int),
    FieldSpec::new("admin_worker", ValueType::Int),
    FieldSpec::new("admin_scientist", ValueType::Int),
    FieldSpec::new("admin_pilot", ValueType::Int),
    FieldSpec::new("admin_robot", ValueType::Int),
    FieldSpec::new("debt_interest", ValueType::Float),
];

/// `salary { soldier_base 3000 ... }`
pub fn salary() -> BlockKind {
    BlockKind::unnamed("salary", FieldTable::new(SALARY_FIELDS))
}

const TECH_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", ValueType::Translation),
    FieldSpec::new("description", ValueType::Translation),
    FieldSpec::new("provides", ValueType::String),
    FieldSpec::new("needscollected", ValueType::Bool),
    FieldSpec::new("time", ValueType::Float),
    FieldSpec::new("image_top", ValueType::String),
    FieldSpec::new("image_bottom", ValueType::String),
    FieldSpec::new("mdl_top", ValueType::String),
    FieldSpec::new("mdl_bottom", ValueType::String),
];

/// `tech <id> { name "_Laser" time 120 ... }`
pub fn tech() -> BlockKind {
    BlockKind::named("tech", FieldTable::new(TECH_FIELDS))
}

/// item id, amount, and amount on disassembly (`%` scales it)
const COMPONENT_ITEM: &[ValueType] = &[ValueType::String, ValueType::Int, ValueType::String];

const COMPONENTS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("item", ValueType::Record(COMPONENT_ITEM)).repeatable(),
    FieldSpec::new("time", ValueType::Int),
];

/// `components <item> { item <id> <n> <n|%> ... time <hours> }`
pub fn components() -> BlockKind {
    BlockKind::named("components", FieldTable::new(COMPONENTS_FIELDS))
}

const ALIEN_TEAM_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("mininterest", ValueType::Int),
    FieldSpec::new("maxinterest", ValueType::Int),
    FieldSpec::new("equipment", ValueType::List).repeatable(),
    FieldSpec::new("category", ValueType::List).repeatable(),
];

/// `alienteam <category> { equipment { ... } category { ... } }`
pub fn alien_team() -> BlockKind {
    BlockKind::named("alienteam", FieldTable::new(ALIEN_TEAM_FIELDS))
}

pub fn standard_kinds() -> Vec<BlockKind> {
    vec![physics(), salary(), tech(), components(), alien_team()]
}

/// Registry holding every standard kind
pub fn standard_registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    for kind in standard_kinds() {
        builder
            .register(kind)
            .expect("standard keywords are distinct and well formed");
    }
    builder.build()
}
