//! Basic manageMemory Walkthrough
//!
//! Demonstrates the fundamental structured-memory workflow:
//! 1. Declare a schema (profile, a task list, a topic tree)
//! 2. View a path to make it visible, then mutate it
//! 3. Add array items and watch pagination kick in
//! 4. Render the tree as the LLM would see it
//!
//! This uses an in-memory tree with no DB binding; see the `aac-memory-db`
//! crate for wiring a real store behind individual fields.

use aac_memory_core::schema::build::*;
use aac_memory_core::{EngineConfig, Path, Schema, Tree};
use aac_memory_engine::{apply_batch, MemoryState};
use aac_memory_render::{render, RenderOptions};
use serde_json::json;

fn main() {
    println!("=== manageMemory Basic Walkthrough ===\n");

    let schema = demo_schema();
    println!("✓ Schema declared");
    println!("  Fields: {}", schema.fields().iter().map(|f| f.id()).collect::<Vec<_>>().join(", "));

    let tree = Tree::new();
    let visibility = MemoryState::new();
    let config = EngineConfig::default();

    let (tree, visibility) = step(
        &schema,
        tree,
        visibility,
        &config,
        "Step 1: view /profile, then set /profile/name",
        json!({"ops": [
            {"action": "view", "path": "/profile"},
            {"action": "set", "path": "/profile/name", "value": "Ana"}
        ]}),
    );

    let (tree, visibility) = step(
        &schema,
        tree,
        visibility,
        &config,
        "Step 2: view /tasks, add three tasks",
        json!({"ops": [
            {"action": "view", "path": "/tasks"},
            {"action": "add", "path": "/tasks", "value": "write the proposal"},
            {"action": "add", "path": "/tasks", "value": "review the budget"},
            {"action": "add", "path": "/tasks", "value": "schedule the kickoff"}
        ]}),
    );

    let (tree, visibility) = step(
        &schema,
        tree,
        visibility,
        &config,
        "Step 3: grow a topic tree",
        json!({"ops": [
            {"action": "view", "path": "/research"},
            {"action": "add", "path": "/research", "key": "AI", "value": {"description": "artificial intelligence"}}
        ]}),
    );

    println!("\n=== Current Memory (as the LLM would see it) ===\n");
    let snapshot = render(&schema, &tree, &visibility, &config, &RenderOptions::default());
    println!("{snapshot}");
}

fn step(
    schema: &Schema,
    tree: Tree,
    visibility: MemoryState,
    config: &EngineConfig,
    label: &str,
    batch_json: serde_json::Value,
) -> (Tree, MemoryState) {
    println!("\n{label}");
    let input = serde_json::from_value(batch_json).expect("well-formed batch");
    let outcome = apply_batch(schema, tree, visibility, input, config);
    for result in &outcome.results {
        let status = if result.ok { "ok" } else { "FAILED" };
        println!("  [{status}] {} {}", result.action.as_str(), result.target);
        if let Some(message) = &result.message {
            println!("         {message}");
        }
    }
    (outcome.tree, outcome.visibility)
}

fn demo_schema() -> Schema {
    Schema::new(vec![
        object("profile", vec![("name".to_string(), string("name"))], vec!["name".to_string()]),
        array("tasks", string("task")),
        topic("research", 4, 20),
    ])
}
