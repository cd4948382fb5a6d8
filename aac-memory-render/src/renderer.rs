//! Renders the deterministic "current memory" snapshot pasted into the
//! LLM's system prompt (§4.H). Pure and read-only: visibility, pagination,
//! and ordering are consulted but never mutated here.

use aac_memory_core::schema::{Field, FieldMeta, NumericField, StringField};
use aac_memory_core::{EngineConfig, Path, Schema, Tree};
use aac_memory_engine::visibility::effective_visibility;
use aac_memory_engine::MemoryState;
use aac_memory_resolver::resolve;
use serde_json::Value;
use std::collections::BTreeMap;

const INSTRUCTIONS: &str = "\
You manage a structured memory tree through a single `manageMemory` tool.\n\
Paths are JSON-Pointer-flavoured (`/a/b/c`); `/` is the root. A trailing\n\
`*` addresses every immediate child of a container and is only valid on\n\
`view`/`hide`. Containers rendered below as hidden must be `view`ed before\n\
their contents appear on your next turn; mutating a path that has never\n\
been viewed may be refused. Actions: view, hide, set, upsert, add, insert,\n\
delete, clear, rename. See the schema hints at the end for what each\n\
container accepts and an example `add` call.";

/// What to render: the full tree, or a focused slice for a `view` result.
pub struct RenderOptions<'a> {
    pub include_instructions: bool,
    pub only_paths: Option<&'a [Path]>,
    /// True remote counts for DB-backed containers (e.g. an `aac-memory-db`
    /// `LoadState::totals` snapshot), so a container with only a page loaded
    /// locally can still report "75 of 312" rather than "75 of 75". A path
    /// absent here falls back to the tree's own in-memory length.
    pub known_totals: Option<&'a BTreeMap<Path, usize>>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        RenderOptions {
            include_instructions: true,
            only_paths: None,
            known_totals: None,
        }
    }
}

pub fn render(
    schema: &Schema,
    tree: &Tree,
    state: &MemoryState,
    config: &EngineConfig,
    opts: &RenderOptions,
) -> String {
    let mut out = String::new();
    if opts.include_instructions {
        out.push_str(INSTRUCTIONS);
        out.push_str("\n\n");
    }

    let focused = opts.only_paths.is_some();
    if !focused {
        out.push_str("=== Current Memory ===\n");
    }

    let targets: Vec<Path> = match opts.only_paths {
        Some(paths) => paths.to_vec(),
        None => schema
            .fields()
            .iter()
            .map(|f| Path::from_tokens(vec![f.id().to_string()]))
            .collect(),
    };

    for path in &targets {
        render_path(schema, tree, state, config, opts.known_totals, path, 0, &mut out);
    }

    if !focused {
        out.push_str("\n=== Schema Hints ===\n");
        render_schema_hints(schema, config, &mut out);
    }

    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[allow(clippy::too_many_arguments)]
fn render_path(
    schema: &Schema,
    tree: &Tree,
    state: &MemoryState,
    config: &EngineConfig,
    known_totals: Option<&BTreeMap<Path, usize>>,
    path: &Path,
    depth: usize,
    out: &mut String,
) {
    let Ok(step) = resolve(schema, tree, path) else {
        indent(out, depth);
        out.push_str(&format!("• {} (unresolvable)\n", path.to_wire()));
        return;
    };

    if !effective_visibility(schema, tree, state, path) {
        indent(out, depth);
        out.push_str(&format!("• {} (hidden — view to inspect)\n", path.to_wire()));
        return;
    }

    match step.field() {
        Some(field) if field.is_container() => {
            render_container(schema, tree, state, config, known_totals, path, field, depth, out)
        }
        Some(field) => render_leaf(tree, path, field, depth, out),
        None => render_untyped_leaf(tree, path, depth, out),
    }
}

fn render_leaf(tree: &Tree, path: &Path, field: &Field, depth: usize, out: &mut String) {
    let value = aac_memory_engine::tree::get(tree, path);
    indent(out, depth);
    match value {
        Some(v) => out.push_str(&format!("{}: {} ({})\n", path.to_wire(), preview(v), field.kind_name())),
        None => out.push_str(&format!("{}: (empty) ({})\n", path.to_wire(), field.kind_name())),
    }
}

fn render_untyped_leaf(tree: &Tree, path: &Path, depth: usize, out: &mut String) {
    let value = aac_memory_engine::tree::get(tree, path);
    indent(out, depth);
    match value {
        Some(v) => out.push_str(&format!("{}: {}\n", path.to_wire(), preview(v))),
        None => out.push_str(&format!("{}: (empty)\n", path.to_wire())),
    }
}

fn preview(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    };
    const CAP: usize = 120;
    if rendered.chars().count() > CAP {
        let truncated: String = rendered.chars().take(CAP).collect();
        format!("{truncated}…")
    } else {
        rendered
    }
}

#[allow(clippy::too_many_arguments)]
fn render_container(
    schema: &Schema,
    tree: &Tree,
    state: &MemoryState,
    config: &EngineConfig,
    known_totals: Option<&BTreeMap<Path, usize>>,
    path: &Path,
    field: &Field,
    depth: usize,
    out: &mut String,
) {
    let value = aac_memory_engine::tree::get(tree, path);
    let children_source = if path.is_root() { None } else { value };
    let reported_total = |loaded_len: usize| -> usize {
        known_totals.and_then(|m| m.get(path)).copied().unwrap_or(loaded_len).max(loaded_len)
    };

    match field {
        Field::Object { object, .. } => {
            let count = object.properties.len();
            indent(out, depth);
            out.push_str(&format!("• {} (object, {count} properties)\n", path.to_wire()));
            for (name, child_field) in &object.properties {
                let child_path = path.child(name.clone());
                let present = children_source
                    .and_then(Value::as_object)
                    .is_some_and(|m| m.contains_key(name));
                if present {
                    render_path(schema, tree, state, config, known_totals, &child_path, depth + 1, out);
                } else {
                    indent(out, depth + 1);
                    let tag = if object.is_required(name) { "(required)" } else { "(empty)" };
                    out.push_str(&format!("{}: {tag} ({})\n", child_path.to_wire(), child_field.kind_name()));
                }
            }
        }
        Field::Array { .. } => {
            let items = children_source.and_then(Value::as_array).cloned().unwrap_or_default();
            indent(out, depth);
            out.push_str(&format!("• {} (array, {} items)\n", path.to_wire(), items.len()));
            let page = state.pagination(path).unwrap_or(aac_memory_engine::visibility::Page {
                offset: 0,
                limit: config.renderer_preview_cap as u32,
            });
            let window = window_indices(items.len(), page.offset as usize, page.limit as usize);
            for idx in window.clone() {
                render_path(schema, tree, state, config, known_totals, &path.child(idx.to_string()), depth + 1, out);
            }
            render_truncation_trailer(out, depth + 1, reported_total(items.len()), window.end, page.limit);
        }
        Field::Map { .. } => {
            let entries = children_source.and_then(Value::as_object).cloned().unwrap_or_default();
            indent(out, depth);
            out.push_str(&format!("• {} (map, {} entries)\n", path.to_wire(), entries.len()));
            let page = state.pagination(path).unwrap_or(aac_memory_engine::visibility::Page {
                offset: 0,
                limit: config.renderer_preview_cap as u32,
            });
            let keys: Vec<String> = entries.keys().cloned().collect();
            let window = window_indices(keys.len(), page.offset as usize, page.limit as usize);
            for idx in window.clone() {
                render_path(schema, tree, state, config, known_totals, &path.child(keys[idx].clone()), depth + 1, out);
            }
            render_truncation_trailer(out, depth + 1, reported_total(keys.len()), window.end, page.limit);
        }
        Field::Topic { .. } => {
            let subtopics = children_source
                .and_then(aac_memory_core::topic::subtopics)
                .cloned()
                .unwrap_or_default();
            indent(out, depth);
            out.push_str(&format!("• {} (topic, {} subtopics)\n", path.to_wire(), subtopics.len()));
            if let Some(value) = children_source {
                if let Some(description) = aac_memory_core::topic::description(value) {
                    indent(out, depth + 1);
                    out.push_str(&format!("{}/description: \"{description}\"\n", path.to_wire()));
                }
            }
            let page = state.pagination(path).unwrap_or(aac_memory_engine::visibility::Page {
                offset: 0,
                limit: config.renderer_preview_cap as u32,
            });
            let keys: Vec<String> = subtopics.keys().cloned().collect();
            let window = window_indices(keys.len(), page.offset as usize, page.limit as usize);
            for idx in window.clone() {
                render_path(schema, tree, state, config, known_totals, &path.child(keys[idx].clone()), depth + 1, out);
            }
            render_truncation_trailer(out, depth + 1, reported_total(keys.len()), window.end, page.limit);
        }
        _ => {}
    }
}

fn window_indices(len: usize, offset: usize, limit: usize) -> std::ops::Range<usize> {
    let start = offset.min(len);
    let end = start.saturating_add(limit).min(len);
    start..end
}

fn render_truncation_trailer(out: &mut String, depth: usize, total: usize, shown_end: usize, limit: u32) {
    if shown_end < total {
        indent(out, depth);
        out.push_str(&format!(
            "… {} more (view with page.offset={shown_end}, page.limit={limit})\n",
            total - shown_end
        ));
    }
}

fn render_schema_hints(schema: &Schema, config: &EngineConfig, out: &mut String) {
    for field in schema.fields() {
        render_field_hint(field, &Path::from_tokens(vec![field.id().to_string()]), config, out);
    }
}

fn render_field_hint(field: &Field, path: &Path, config: &EngineConfig, out: &mut String) {
    match field {
        Field::Object { object, .. } => {
            out.push_str(&format!(
                "- {} (object): properties = {:?}, required = {:?}\n",
                path.to_wire(),
                object.properties.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
                object.required
            ));
            for (name, child) in &object.properties {
                render_field_hint(child, &path.child(name.clone()), config, out);
            }
        }
        Field::Array { array, .. } => {
            out.push_str(&format!(
                "- {} (array of {}): maxItems={:?}, uniqueItems={}\n  example: {{\"action\": \"add\", \"path\": \"{}\", \"value\": <{}>}}\n",
                path.to_wire(),
                array.items.kind_name(),
                array.max_items,
                array.unique_items,
                path.to_wire(),
                array.items.kind_name()
            ));
            render_field_hint(&array.items, &path.child("0"), config, out);
        }
        Field::Map { map, .. } => {
            out.push_str(&format!(
                "- {} (map of {}): keyPattern={:?}, maxProperties={:?}\n  example: {{\"action\": \"add\", \"path\": \"{}\", \"key\": \"<key>\", \"value\": <{}>}}\n",
                path.to_wire(),
                map.values.kind_name(),
                map.key_pattern,
                map.max_properties,
                path.to_wire(),
                map.values.kind_name()
            ));
            render_field_hint(&map.values, &path.child("<key>"), config, out);
        }
        Field::Topic { topic, .. } => {
            out.push_str(&format!(
                "- {} (topic tree): maxDepth={}, maxBreadthPerNode={}\n  example: {{\"action\": \"add\", \"path\": \"{}\", \"key\": \"<name>\", \"value\": \"<description>\"}}\n",
                path.to_wire(),
                topic.max_depth,
                topic.max_breadth_per_node,
                path.to_wire()
            ));
        }
        Field::String { meta, constraints } => {
            render_constraint_hint(path, meta, string_constraint_parts(constraints), config, out);
        }
        Field::Number { meta, constraints } | Field::Integer { meta, constraints } => {
            render_constraint_hint(path, meta, numeric_constraint_parts(constraints), config, out);
        }
        Field::Boolean { meta } | Field::Null { meta } => {
            render_constraint_hint(path, meta, Vec::new(), config, out);
        }
    }
}

/// Renders one hint line for a leaf field's numeric/string/enum/const
/// constraints (§4.H item 5). Silent if the field carries none.
fn render_constraint_hint(path: &Path, meta: &FieldMeta, mut parts: Vec<String>, config: &EngineConfig, out: &mut String) {
    if let Some(values) = &meta.enum_values {
        parts.push(format_enum(values, config.renderer_enum_cap));
    }
    if let Some(const_value) = &meta.const_value {
        parts.push(format!("const={const_value}"));
    }
    if parts.is_empty() {
        return;
    }
    out.push_str(&format!("- {}: {}\n", path.to_wire(), parts.join(", ")));
}

fn format_enum(values: &[Value], cap: usize) -> String {
    let shown: Vec<String> = values.iter().take(cap).map(|v| v.to_string()).collect();
    if values.len() > cap {
        format!("enum=[{}, … +{} more]", shown.join(", "), values.len() - cap)
    } else {
        format!("enum=[{}]", shown.join(", "))
    }
}

fn string_constraint_parts(constraints: &StringField) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(v) = constraints.min_length {
        parts.push(format!("minLength={v}"));
    }
    if let Some(v) = constraints.max_length {
        parts.push(format!("maxLength={v}"));
    }
    if let Some(p) = &constraints.pattern {
        parts.push(format!("pattern={p:?}"));
    }
    if let Some(f) = constraints.format {
        parts.push(format!("format={f:?}"));
    }
    parts
}

fn numeric_constraint_parts(constraints: &NumericField) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(v) = constraints.minimum {
        parts.push(format!("minimum={v}"));
    }
    if let Some(v) = constraints.maximum {
        parts.push(format!("maximum={v}"));
    }
    if let Some(v) = constraints.exclusive_minimum {
        parts.push(format!("exclusiveMinimum={v}"));
    }
    if let Some(v) = constraints.exclusive_maximum {
        parts.push(format!("exclusiveMaximum={v}"));
    }
    if let Some(v) = constraints.multiple_of {
        parts.push(format!("multipleOf={v}"));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use aac_memory_core::schema::build::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            object("profile", vec![("name".to_string(), string("name"))], vec!["name".to_string()]),
            array("tags", string("item")),
        ])
    }

    #[test]
    fn hidden_container_renders_a_hint_line() {
        let tree = Tree::new();
        let state = MemoryState::new();
        let config = EngineConfig::default();
        let out = render(&schema(), &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("/profile (hidden"));
        assert!(out.contains("/tags (hidden"));
    }

    #[test]
    fn visible_object_lists_missing_required_property() {
        let tree = Tree::new();
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let out = render(&schema(), &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("/profile/name: (required)"));
    }

    #[test]
    fn array_truncates_past_the_page_limit() {
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!((0..10).map(|i| i.to_string()).collect::<Vec<_>>()));
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/tags"));
        state.set_pagination(Path::parse("/tags"), None, Some(3), 50, 500).unwrap();
        let schema = schema();
        let config = EngineConfig::default();
        let out = render(&schema, &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("7 more"));
    }

    #[test]
    fn unpaginated_array_truncates_at_the_renderer_preview_cap() {
        let mut tree = Tree::new();
        tree.insert(
            "tags".to_string(),
            json!((0..30).map(|i| i.to_string()).collect::<Vec<_>>()),
        );
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/tags"));
        let schema = schema();
        let mut config = EngineConfig::default();
        config.renderer_preview_cap = 10;
        let out = render(&schema, &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("20 more"), "{out}");
    }

    #[test]
    fn enum_constraint_renders_and_truncates_at_the_renderer_enum_cap() {
        let tags_schema = Schema::new(vec![{
            let mut field = string("tag");
            if let Field::String { meta, .. } = &mut field {
                meta.enum_values = Some((0..5).map(|i| json!(format!("v{i}"))).collect());
            }
            field
        }]);
        let mut config = EngineConfig::default();
        config.renderer_enum_cap = 2;
        let tree = Tree::new();
        let state = MemoryState::new();
        let out = render(&tags_schema, &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("enum=[\"v0\", \"v1\", … +3 more]"), "{out}");
    }

    #[test]
    fn numeric_constraints_render_as_a_schema_hint() {
        let bounded_schema = Schema::new(vec![{
            let mut field = integer("count");
            if let Field::Integer { constraints, .. } = &mut field {
                constraints.minimum = Some(0.0);
                constraints.maximum = Some(100.0);
            }
            field
        }]);
        let config = EngineConfig::default();
        let tree = Tree::new();
        let state = MemoryState::new();
        let out = render(&bounded_schema, &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("minimum=0"), "{out}");
        assert!(out.contains("maximum=100"), "{out}");
    }

    #[test]
    fn schema_hints_include_an_example_add_call() {
        let tree = Tree::new();
        let state = MemoryState::new();
        let config = EngineConfig::default();
        let out = render(&schema(), &tree, &state, &config, &RenderOptions::default());
        assert!(out.contains("\"action\": \"add\", \"path\": \"/tags\""));
    }

    #[test]
    fn render_is_pure_given_identical_inputs() {
        let mut tree = Tree::new();
        tree.insert("profile".to_string(), json!({"name": "Ana"}));
        tree.insert("tags".to_string(), json!(["a", "b", "c"]));
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/profile"));
        state.open_path(Path::parse("/tags"));
        let schema = schema();
        let config = EngineConfig::default();

        let first = render(&schema, &tree, &state, &config, &RenderOptions::default());
        let second = render(&schema, &tree, &state, &config, &RenderOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn known_totals_override_the_loaded_slice_length_in_the_trailer() {
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!(["a", "b", "c"]));
        let mut state = MemoryState::new();
        state.open_path(Path::parse("/tags"));
        let schema = schema();
        let config = EngineConfig::default();
        let mut totals = BTreeMap::new();
        totals.insert(Path::parse("/tags"), 312);
        let opts = RenderOptions { known_totals: Some(&totals), ..RenderOptions::default() };

        let out = render(&schema, &tree, &state, &config, &opts);
        assert!(out.contains("309 more"));
    }
}
