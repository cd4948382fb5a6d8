//! Operation executor (§4.G) — the heart of the engine. Applies a batch of
//! ops sequentially: a failed op yields an `ok: false` result and execution
//! continues with the next op against whatever the tree/visibility now are.

use aac_memory_core::schema::{ArrayField, Field, MapField, ObjectField, TopicField};
use aac_memory_core::{
    BatchError, EngineConfig, MemoryResult, Path, PathError, Schema, ShapeError, TopicError, Tree,
};
use aac_memory_resolver::{resolve, validate, validate_key_pattern, SchemaStep};
use serde_json::{Map, Value};

use crate::op::{Action, BatchInput, OpInput, OpResult, PageInput};
use crate::topic_paths;
use crate::visibility::{effective_visibility, MemoryState};

/// The result of applying a batch: the (possibly mutated) tree and
/// visibility, plus one result per op in order.
pub struct BatchOutcome {
    pub tree: Tree,
    pub visibility: MemoryState,
    pub results: Vec<OpResult>,
}

/// Apply `input` against `tree`/`visibility` under `schema`, in order,
/// never aborting early on a failed op (§4.G "Order").
pub fn apply_batch(
    schema: &Schema,
    mut tree: Tree,
    mut visibility: MemoryState,
    input: BatchInput,
    config: &EngineConfig,
) -> BatchOutcome {
    let ops = input.into_ops();
    if ops.is_empty() {
        return BatchOutcome {
            tree,
            visibility,
            results: vec![OpResult::fail("/", Action::View, BatchError::EmptyBatch.to_string())],
        };
    }

    let mut results = Vec::with_capacity(ops.len());
    for op in &ops {
        let span = tracing::info_span!("manage_memory_op", action = op.action.as_str());
        let _enter = span.enter();
        let result = apply_op(schema, &mut tree, &mut visibility, config, op);
        if !result.ok {
            tracing::debug!(message = result.message.as_deref().unwrap_or(""), "op failed");
        }
        results.push(result);
    }

    BatchOutcome {
        tree,
        visibility,
        results,
    }
}

fn apply_op(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    match op.action {
        Action::View => apply_view(schema, tree, visibility, config, op),
        Action::Hide => apply_hide(schema, tree, visibility, op),
        Action::Set => apply_set_like(schema, tree, visibility, config, op, MutKind::Set),
        Action::Upsert => apply_set_like(schema, tree, visibility, config, op, MutKind::Upsert),
        Action::Add => apply_add(schema, tree, visibility, config, op),
        Action::Insert => apply_insert(schema, tree, visibility, config, op),
        Action::Delete => apply_delete(schema, tree, visibility, config, op),
        Action::Clear => apply_clear(schema, tree, visibility, config, op),
        Action::Rename => apply_rename(schema, tree, visibility, config, op),
    }
}

// ---------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------

fn raw_target_label(op: &OpInput) -> String {
    if let Some(p) = &op.path {
        return p.clone();
    }
    if let Some(paths) = &op.paths {
        return paths.join(", ");
    }
    "/".to_string()
}

/// A mutating op's target must be exactly one concrete (non-wildcard) path.
fn single_path(op: &OpInput) -> MemoryResult<Path> {
    match (&op.path, &op.paths) {
        (Some(p), None) => Ok(Path::parse(p)),
        (None, Some(paths)) if paths.len() == 1 => Ok(Path::parse(&paths[0])),
        (Some(_), Some(_)) => Err(BatchError::MissingField("path").into()),
        _ => Err(BatchError::MissingField("path").into()),
    }
}

/// view/hide accept one path, many paths, or a wildcard in any of them.
fn multi_paths(op: &OpInput) -> MemoryResult<Vec<Path>> {
    let mut out = Vec::new();
    if let Some(p) = &op.path {
        out.push(Path::parse(p));
    }
    if let Some(paths) = &op.paths {
        out.extend(paths.iter().map(|p| Path::parse(p)));
    }
    if out.is_empty() {
        return Err(BatchError::MissingField("path").into());
    }
    Ok(out)
}

fn reject_wildcard(path: &Path) -> MemoryResult<()> {
    if path.has_trailing_wildcard() {
        Err(BatchError::WildcardOnMutation.into())
    } else {
        Ok(())
    }
}

fn check_visibility_gate(
    config: &EngineConfig,
    schema: &Schema,
    tree: &Tree,
    visibility: &MemoryState,
    path: &Path,
) -> MemoryResult<()> {
    if !config.visibility_gate_enabled {
        return Ok(());
    }
    if effective_visibility(schema, tree, visibility, path)
        || effective_visibility(schema, tree, visibility, &path.parent())
    {
        Ok(())
    } else {
        Err(BatchError::NotVisible(path.clone()).into())
    }
}

fn object_field_of<'a>(schema: &'a Schema, tree: &Tree, path: &Path) -> Option<&'a ObjectField> {
    resolve(schema, tree, path).ok()?.field()?.as_object()
}

/// Auto-seed every missing ancestor of `path` that the schema declares as an
/// object, the same rule `set_object_prop` applies to its own immediate
/// parent: an ancestor may be created empty if its governing object's
/// `required` list is empty or is satisfied by the single property being
/// written through it right now. Stops (without error) at the first
/// ancestor the schema does not declare as an object — array/map/topic
/// ancestors have their own existence rules and are never auto-seeded here.
/// Used by `add` so a container nested inside an object (§4.G) seeds its
/// whole containing chain, not just its own immediate value.
fn ensure_ancestor_objects(schema: &Schema, tree: &mut Tree, path: &Path) -> MemoryResult<()> {
    let tokens = path.tokens();
    for depth in 1..tokens.len() {
        let ancestor = Path::from_tokens(tokens[..depth].to_vec());
        if tree::get(tree, &ancestor).is_some() {
            continue;
        }
        let Some(object) = object_field_of(schema, tree, &ancestor) else {
            return Ok(());
        };
        let next_property = &tokens[depth];
        let auto_seedable =
            object.required.is_empty() || (object.required.len() == 1 && object.required[0] == *next_property);
        if !auto_seedable {
            return Err(ShapeError::MissingRequired(object.required.clone()).into());
        }
        tree::set(tree, &ancestor, Value::Object(Map::new()))?;
    }
    Ok(())
}

fn array_field_of<'a>(schema: &'a Schema, tree: &Tree, path: &Path) -> Option<&'a ArrayField> {
    resolve(schema, tree, path).ok()?.field()?.as_array()
}

fn map_field_of<'a>(schema: &'a Schema, tree: &Tree, path: &Path) -> Option<&'a MapField> {
    resolve(schema, tree, path).ok()?.field()?.as_map()
}

/// Opens `path` iff the schema field governing it is a container kind — the
/// executor's "auto-open" rule (§4.G).
fn auto_open_if_container(visibility: &mut MemoryState, path: &Path, field: Option<&Field>) {
    if field.map(Field::is_container).unwrap_or(false) {
        visibility.open_path(path.clone());
    }
}

/// Drop visibility/pagination entries for paths that no longer resolve
/// after a `clear`, without disturbing `path` itself (§4.G "clear": "the
/// container itself remains visible").
fn prune_descendants(visibility: &mut MemoryState, path: &Path) {
    visibility.visible.retain(|v| v == path || !v.is_self_or_descendant_of(path));
    visibility.page.retain(|p, _| p == path || !p.is_self_or_descendant_of(path));
}

/// Enumerate the immediate children of an existing container at `base`
/// (view/hide wildcard expansion, §4.G — "does not recurse").
fn expand_wildcard(schema: &Schema, tree: &Tree, base: &Path) -> MemoryResult<Vec<Path>> {
    if base.is_root() {
        return Ok(schema
            .fields()
            .iter()
            .map(|f| Path::from_tokens(vec![f.id().to_string()]))
            .collect());
    }

    let step = resolve(schema, tree, base)?;
    if let SchemaStep::Topic { .. } = &step {
        let node = tree::get(tree, base).ok_or_else(|| PathError::NotFound(base.clone()))?;
        let keys = aac_memory_core::topic::subtopics(node)
            .map(|m| m.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        return Ok(keys.into_iter().map(|k| base.child(k)).collect());
    }

    let value = tree::get(tree, base).ok_or_else(|| PathError::NotFound(base.clone()))?;
    match value {
        Value::Array(items) => Ok((0..items.len()).map(|i| base.child(i.to_string())).collect()),
        Value::Object(map) => Ok(map.keys().map(|k| base.child(k.clone())).collect()),
        _ => Err(PathError::TraverseIntoPrimitive(base.clone()).into()),
    }
}

use crate::tree;

// ---------------------------------------------------------------------
// view / hide
// ---------------------------------------------------------------------

fn apply_view(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let targets = match multi_paths(op) {
        Ok(t) => t,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::View, e.to_string()),
    };

    let mut expanded = Vec::new();
    for t in &targets {
        if t.has_trailing_wildcard() {
            match expand_wildcard(schema, tree, &t.without_trailing_wildcard()) {
                Ok(children) => expanded.extend(children),
                Err(e) => return OpResult::fail(t.to_wire(), Action::View, e.to_string()),
            }
        } else {
            expanded.push(t.clone());
        }
    }

    for p in &expanded {
        let step = match resolve(schema, tree, p) {
            Ok(s) => s,
            Err(e) => return OpResult::fail(p.to_wire(), Action::View, e.to_string()),
        };
        visibility.open_path(p.clone());

        let default_open_children = match &step {
            SchemaStep::TopicDescription { .. } => false,
            other => other.is_container_step(),
        };
        if op.open_children.unwrap_or(default_open_children) {
            open_children_for_step(tree, visibility, p, &step);
        }

        if let Some(PageInput { offset, limit }) = op.page {
            if let Err(e) = visibility.set_pagination(
                p.clone(),
                offset,
                limit,
                config.default_page_limit,
                config.max_page_limit,
            ) {
                return OpResult::fail(p.to_wire(), Action::View, e.to_string());
            }
        }
    }

    let label = targets.iter().map(Path::to_wire).collect::<Vec<_>>().join(", ");
    let mut result = OpResult::ok(
        label,
        Action::View,
        format!("opened {} path(s)", expanded.len()),
    );
    if targets.iter().any(|t| t.has_trailing_wildcard()) || targets.len() > 1 {
        result = result.with_mutated_paths(expanded.iter().map(Path::to_wire).collect());
    }
    result
}

fn open_children_for_step(tree: &Tree, visibility: &mut MemoryState, p: &Path, step: &SchemaStep) {
    if let SchemaStep::Topic { .. } = step {
        if let Some(node) = tree::get(tree, p) {
            if let Some(map) = aac_memory_core::topic::subtopics(node) {
                for key in map.keys() {
                    visibility.open_path(p.child(key.clone()));
                }
            }
        }
        return;
    }
    visibility.open_children(p, tree::get(tree, p));
}

fn apply_hide(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    op: &OpInput,
) -> OpResult {
    let targets = match multi_paths(op) {
        Ok(t) => t,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Hide, e.to_string()),
    };

    let mut expanded = Vec::new();
    for t in &targets {
        if t.has_trailing_wildcard() {
            match expand_wildcard(schema, tree, &t.without_trailing_wildcard()) {
                Ok(children) => expanded.extend(children),
                Err(e) => return OpResult::fail(t.to_wire(), Action::Hide, e.to_string()),
            }
        } else {
            expanded.push(t.clone());
        }
    }

    for p in &expanded {
        visibility.close_path_and_descendants(p);
    }

    let label = targets.iter().map(Path::to_wire).collect::<Vec<_>>().join(", ");
    let mut result = OpResult::ok(
        label,
        Action::Hide,
        format!("closed {} path(s)", expanded.len()),
    );
    if targets.iter().any(|t| t.has_trailing_wildcard()) || targets.len() > 1 {
        result = result.with_mutated_paths(expanded.iter().map(Path::to_wire).collect());
    }
    result
}

// ---------------------------------------------------------------------
// set / upsert
// ---------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum MutKind {
    Set,
    Upsert,
}

fn apply_set_like(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
    kind: MutKind,
) -> OpResult {
    let action = match kind {
        MutKind::Set => Action::Set,
        MutKind::Upsert => Action::Upsert,
    };
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), action, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), action, e.to_string());
    }
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), action, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), action, e.to_string()),
    };

    let Some(value) = op.value.clone() else {
        return OpResult::fail(path.to_wire(), action, BatchError::MissingField("value").to_string());
    };

    // `Some(parent)` when the write auto-created a missing parent object, so
    // the result message can note it per §8 Scenario A's literal wording.
    let outcome: MemoryResult<Option<Path>> = match &step {
        SchemaStep::TopLevelField { field } => set_whole_field(tree, visibility, &path, field, value).map(|()| None),
        SchemaStep::ObjectProp { parent, property, field } => {
            set_object_prop(schema, tree, visibility, &path, parent, property, *field, value)
        }
        SchemaStep::ArrayItem { parent, index, field } => {
            set_array_item(schema, tree, visibility, &path, parent, *index, field, value, kind).map(|()| None)
        }
        SchemaStep::MapValue { parent, key, field } => {
            set_map_value(schema, tree, visibility, &path, parent, key, field, value, kind).map(|()| None)
        }
        SchemaStep::TopicDescription { node_path, .. } => {
            set_topic_description(tree, &path, node_path, value).map(|()| None)
        }
        SchemaStep::Topic { topic_field, node_path } => {
            set_topic_node(tree, visibility, &path, topic_field, node_path, value, kind).map(|()| None)
        }
        SchemaStep::TopicSubtopics { .. } => {
            Err(PathError::TraverseIntoPrimitive(path.clone()).into())
        }
    };

    match outcome {
        Ok(Some(seeded_parent)) => OpResult::ok(
            path.to_wire(),
            action,
            format!("value written (auto-created {})", seeded_parent.to_wire()),
        ),
        Ok(None) => OpResult::ok(path.to_wire(), action, "value written"),
        Err(e) => OpResult::fail(path.to_wire(), action, e.to_string()),
    }
}

fn set_whole_field(
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    field: &Field,
    value: Value,
) -> MemoryResult<()> {
    if matches!(field, Field::Topic { .. }) {
        return Err(PathError::TopicRoot.into());
    }
    validate(Some(field), &value)?;
    tree::set(tree, path, value)?;
    auto_open_if_container(visibility, path, Some(field));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn set_object_prop(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    parent: &Path,
    property: &str,
    field: Option<&Field>,
    value: Value,
) -> MemoryResult<Option<Path>> {
    let mut auto_seeded = None;
    if tree::get(tree, parent).is_none() {
        let Some(object) = object_field_of(schema, tree, parent) else {
            return Err(PathError::NotFound(parent.clone()).into());
        };
        let auto_seedable =
            object.required.is_empty() || (object.required.len() == 1 && object.required[0] == property);
        if !auto_seedable {
            return Err(ShapeError::MissingRequired(object.required.clone()).into());
        }
        tree::set(tree, parent, Value::Object(Map::new()))?;
        auto_seeded = Some(parent.clone());
    }

    validate(field, &value)?;
    tree::set(tree, path, value)?;
    auto_open_if_container(visibility, path, field);
    Ok(auto_seeded)
}

#[allow(clippy::too_many_arguments)]
fn set_array_item(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    parent: &Path,
    index: usize,
    field: &Field,
    value: Value,
    kind: MutKind,
) -> MemoryResult<()> {
    let current_len = tree::get(tree, parent)
        .and_then(Value::as_array)
        .map(|a| a.len())
        .ok_or_else(|| PathError::NotFound(parent.clone()))?;

    if index == current_len {
        if kind == MutKind::Set {
            return Err(BatchError::IndexOutOfBounds { index, len: current_len }.into());
        }
        if let Some(array) = array_field_of(schema, tree, parent) {
            check_array_append(array, tree, parent, &value)?;
        }
    } else if index > current_len {
        return Err(BatchError::IndexOutOfBounds { index, len: current_len }.into());
    }

    validate(Some(field), &value)?;
    tree::set(tree, path, value)?;
    auto_open_if_container(visibility, path, Some(field));
    Ok(())
}

fn check_array_append(array: &ArrayField, tree: &Tree, parent: &Path, value: &Value) -> MemoryResult<()> {
    let items = tree::get(tree, parent).and_then(Value::as_array).cloned().unwrap_or_default();
    let new_len = items.len() + 1;
    if array.max_items.is_some_and(|max| new_len > max) {
        return Err(ShapeError::ArrayLength {
            len: new_len,
            min: array.min_items,
            max: array.max_items,
        }
        .into());
    }
    if array.unique_items && items.iter().any(|existing| existing == value) {
        return Err(ShapeError::DuplicateItem.into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn set_map_value(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    parent: &Path,
    key: &str,
    field: &Field,
    value: Value,
    kind: MutKind,
) -> MemoryResult<()> {
    let exists = tree::get(tree, parent)
        .and_then(Value::as_object)
        .is_some_and(|m| m.contains_key(key));

    if !exists {
        if kind == MutKind::Set {
            return Err(PathError::NotFound(path.clone()).into());
        }
        if let Some(map) = map_field_of(schema, tree, parent) {
            validate_key_pattern(map.key_pattern.as_deref(), key)?;
            let len = tree::get(tree, parent).and_then(Value::as_object).map(|m| m.len()).unwrap_or(0);
            if map.max_properties.is_some_and(|max| len + 1 > max) {
                return Err(ShapeError::MapSize {
                    len: len + 1,
                    min: map.min_properties,
                    max: map.max_properties,
                }
                .into());
            }
        }
        if tree::get(tree, parent).is_none() {
            tree::set(tree, parent, Value::Object(Map::new()))?;
        }
    }

    validate(Some(field), &value)?;
    tree::set(tree, path, value)?;
    auto_open_if_container(visibility, path, Some(field));
    Ok(())
}

fn set_topic_description(tree: &mut Tree, path: &Path, node_path: &[String], value: Value) -> MemoryResult<()> {
    if !value.is_string() && !value.is_null() {
        return Err(ShapeError::TypeMismatch {
            expected: "string or null".to_string(),
            got: json_type_name(&value).to_string(),
        }
        .into());
    }
    let _ = node_path;
    tree::set(tree, path, value)
}

#[allow(clippy::too_many_arguments)]
fn set_topic_node(
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    topic_field: &Field,
    node_path: &[String],
    value: Value,
    kind: MutKind,
) -> MemoryResult<()> {
    if node_path.is_empty() {
        return Err(PathError::TopicRoot.into());
    }
    let normalized = aac_memory_core::topic::from_op_value(&value).ok_or(TopicError::InvalidNodeLiteral)?;

    let exists = tree::get(tree, path).is_some();
    if !exists {
        if kind == MutKind::Set {
            return Err(PathError::NotFound(path.clone()).into());
        }
        let field_id = topic_field.id().to_string();
        let parent_node_path = &node_path[..node_path.len() - 1];
        let topic = topic_field.as_topic().expect("Topic step carries a topic field");
        let depth = node_path.len();
        if depth > topic.max_depth {
            return Err(TopicError::MaxDepthExceeded {
                max_depth: topic.max_depth,
                attempted: depth,
            }
            .into());
        }
        let container_path = topic_paths::children_container_path(&field_id, parent_node_path);
        if tree::get(tree, &container_path).is_none() {
            tree::set(tree, &container_path, Value::Object(Map::new()))?;
        }
        let siblings = tree::get(tree, &container_path).and_then(Value::as_object).map(|m| m.len()).unwrap_or(0);
        if siblings + 1 > topic.max_breadth_per_node {
            return Err(TopicError::MaxBreadthExceeded {
                max_breadth: topic.max_breadth_per_node,
            }
            .into());
        }
    }

    tree::set(tree, path, normalized)?;
    visibility.open_path(path.clone());
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------
// add
// ---------------------------------------------------------------------

fn apply_add(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Add, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), Action::Add, e.to_string());
    }
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), Action::Add, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), Action::Add, e.to_string()),
    };

    let outcome = match step.field() {
        Some(Field::Array { array, .. }) => add_to_array(schema, tree, visibility, &path, array, op),
        Some(Field::Map { map, .. }) => add_to_map(schema, tree, visibility, &path, map, op),
        Some(field @ Field::Topic { topic, .. }) => {
            let node_path = match &step {
                SchemaStep::TopLevelField { .. } => Vec::new(),
                SchemaStep::Topic { node_path, .. } => node_path.clone(),
                _ => return OpResult::fail(path.to_wire(), Action::Add, "invalid topic target".to_string()),
            };
            add_topic_child(tree, visibility, field.id(), &node_path, topic, op)
        }
        _ => Err(PathError::TraverseIntoPrimitive(path.clone()).into()),
    };

    match outcome {
        Ok(new_path) => {
            let mut result = OpResult::ok(path.to_wire(), Action::Add, "element added");
            if let Some(p) = new_path {
                result = result.with_new_path(p.to_wire());
            }
            result
        }
        Err(e) => OpResult::fail(path.to_wire(), Action::Add, e.to_string()),
    }
}

fn add_to_array(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    array: &ArrayField,
    op: &OpInput,
) -> MemoryResult<Option<Path>> {
    let Some(value) = op.value.clone() else {
        return Err(BatchError::MissingField("value").into());
    };
    validate(Some(array.items.as_ref()), &value)?;
    if tree::get(tree, path).is_none() {
        ensure_ancestor_objects(schema, tree, path)?;
        tree::set(tree, path, Value::Array(Vec::new()))?;
    }
    check_array_append(array, tree, path, &value)?;
    let index = tree::get(tree, path).and_then(Value::as_array).map(|a| a.len()).unwrap_or(0);
    let new_path = path.child(index.to_string());
    tree::set(tree, &new_path, value)?;
    auto_open_if_container(visibility, &new_path, Some(array.items.as_ref()));
    Ok(Some(new_path))
}

fn add_to_map(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    path: &Path,
    map: &MapField,
    op: &OpInput,
) -> MemoryResult<Option<Path>> {
    let key = op.key.clone().ok_or(BatchError::MissingField("key"))?;
    let Some(value) = op.value.clone() else {
        return Err(BatchError::MissingField("value").into());
    };
    validate_key_pattern(map.key_pattern.as_deref(), &key)?;

    if tree::get(tree, path).is_none() {
        ensure_ancestor_objects(schema, tree, path)?;
        tree::set(tree, path, Value::Object(Map::new()))?;
    }
    let len = tree::get(tree, path).and_then(Value::as_object).map(|m| m.len()).unwrap_or(0);
    if tree::get(tree, path).and_then(Value::as_object).is_some_and(|m| m.contains_key(&key)) {
        return Err(ShapeError::DuplicateKey(key).into());
    }
    if map.max_properties.is_some_and(|max| len + 1 > max) {
        return Err(ShapeError::MapSize {
            len: len + 1,
            min: map.min_properties,
            max: map.max_properties,
        }
        .into());
    }

    validate(Some(map.values.as_ref()), &value)?;
    let new_path = path.child(key);
    tree::set(tree, &new_path, value)?;
    auto_open_if_container(visibility, &new_path, Some(map.values.as_ref()));
    Ok(Some(new_path))
}

fn add_topic_child(
    tree: &mut Tree,
    visibility: &mut MemoryState,
    field_id: &str,
    node_path: &[String],
    topic: &TopicField,
    op: &OpInput,
) -> MemoryResult<Option<Path>> {
    let key = op.key.clone().ok_or(BatchError::MissingField("key"))?;

    let container_path = topic_paths::children_container_path(field_id, node_path);
    if tree::get(tree, &container_path).is_none() {
        if node_path.is_empty() {
            tree::set(tree, &container_path, Value::Object(Map::new()))?;
        } else {
            return Err(PathError::NotFound(topic_paths::node_path(field_id, node_path)).into());
        }
    }

    let depth = node_path.len() + 1;
    if depth > topic.max_depth {
        return Err(TopicError::MaxDepthExceeded {
            max_depth: topic.max_depth,
            attempted: depth,
        }
        .into());
    }

    let siblings = tree::get(tree, &container_path).and_then(Value::as_object).map(|m| m.len()).unwrap_or(0);
    if tree::get(tree, &container_path).and_then(Value::as_object).is_some_and(|m| m.contains_key(&key)) {
        return Err(TopicError::DuplicateSubtopic(key).into());
    }
    if siblings + 1 > topic.max_breadth_per_node {
        return Err(TopicError::MaxBreadthExceeded {
            max_breadth: topic.max_breadth_per_node,
        }
        .into());
    }

    let node_value = match &op.value {
        Some(v) => aac_memory_core::topic::from_op_value(v).ok_or(TopicError::InvalidNodeLiteral)?,
        None => aac_memory_core::topic::empty_node(),
    };
    let new_path = container_path.child(key);
    tree::set(tree, &new_path, node_value)?;
    visibility.open_path(new_path.clone());
    Ok(Some(new_path))
}

// ---------------------------------------------------------------------
// insert (array-only)
// ---------------------------------------------------------------------

fn apply_insert(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Insert, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), Action::Insert, e.to_string());
    }
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), Action::Insert, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), Action::Insert, e.to_string()),
    };
    let Some(Field::Array { array, .. }) = step.field() else {
        return OpResult::fail(path.to_wire(), Action::Insert, "insert target must be an array".to_string());
    };
    let Some(index) = op.index else {
        return OpResult::fail(path.to_wire(), Action::Insert, BatchError::MissingField("index").to_string());
    };
    let Some(value) = op.value.clone() else {
        return OpResult::fail(path.to_wire(), Action::Insert, BatchError::MissingField("value").to_string());
    };

    let outcome = (|| -> MemoryResult<Path> {
        validate(Some(array.items.as_ref()), &value)?;
        check_array_append(array, tree, &path, &value)?;
        let idx = index as usize;
        tree::insert_at(tree, &path, idx, value)?;
        let item_path = path.child(idx.to_string());
        auto_open_if_container(visibility, &item_path, Some(array.items.as_ref()));
        Ok(item_path)
    })();

    match outcome {
        Ok(item_path) => OpResult::ok(path.to_wire(), Action::Insert, "element inserted").with_new_path(item_path.to_wire()),
        Err(e) => OpResult::fail(path.to_wire(), Action::Insert, e.to_string()),
    }
}

// ---------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------

fn apply_delete(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Delete, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), Action::Delete, e.to_string());
    }
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), Action::Delete, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), Action::Delete, e.to_string()),
    };

    let outcome: MemoryResult<()> = match &step {
        SchemaStep::ObjectProp { parent, property, .. } => {
            if object_field_of(schema, tree, parent).is_some_and(|o| o.is_required(property)) {
                Err(ShapeError::MissingRequired(vec![property.clone()]).into())
            } else {
                tree::delete(tree, &path).map(|_| visibility.close_path_and_descendants(&path))
            }
        }
        SchemaStep::ArrayItem { .. } | SchemaStep::MapValue { .. } => {
            tree::delete(tree, &path).map(|_| visibility.close_path_and_descendants(&path))
        }
        SchemaStep::Topic { node_path, .. } => {
            if node_path.is_empty() {
                Err(PathError::TopicRoot.into())
            } else {
                tree::delete(tree, &path).map(|_| visibility.close_path_and_descendants(&path))
            }
        }
        SchemaStep::TopicDescription { .. } => tree::set(tree, &path, Value::Null),
        SchemaStep::TopLevelField { .. } => {
            tree::delete(tree, &path).map(|_| visibility.close_path_and_descendants(&path))
        }
        SchemaStep::TopicSubtopics { .. } => {
            Err(PathError::TraverseIntoPrimitive(path.clone()).into())
        }
    };

    match outcome {
        Ok(()) => OpResult::ok(path.to_wire(), Action::Delete, "deleted"),
        Err(e) => OpResult::fail(path.to_wire(), Action::Delete, e.to_string()),
    }
}

// ---------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------

fn apply_clear(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Clear, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), Action::Clear, e.to_string());
    }
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), Action::Clear, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), Action::Clear, e.to_string()),
    };

    let outcome: MemoryResult<()> = match &step {
        SchemaStep::Topic { topic_field, node_path } if node_path.is_empty() => {
            let _ = topic_field;
            tree::set(tree, &path, Value::Object(Map::new()))
        }
        SchemaStep::Topic { .. } => {
            let subtopics_path = path.child("subtopics");
            tree::set(tree, &subtopics_path, Value::Object(Map::new()))
        }
        SchemaStep::TopLevelField { field } if matches!(field, Field::Topic { .. }) => {
            tree::set(tree, &path, Value::Object(Map::new()))
        }
        _ => match step.field() {
            Some(Field::Array { .. }) => tree::set(tree, &path, Value::Array(Vec::new())),
            Some(Field::Map { .. }) => tree::set(tree, &path, Value::Object(Map::new())),
            _ => Err(PathError::TraverseIntoPrimitive(path.clone()).into()),
        },
    };

    match outcome {
        Ok(()) => {
            prune_descendants(visibility, &path);
            OpResult::ok(path.to_wire(), Action::Clear, "cleared")
        }
        Err(e) => OpResult::fail(path.to_wire(), Action::Clear, e.to_string()),
    }
}

// ---------------------------------------------------------------------
// rename
// ---------------------------------------------------------------------

fn apply_rename(
    schema: &Schema,
    tree: &mut Tree,
    visibility: &mut MemoryState,
    config: &EngineConfig,
    op: &OpInput,
) -> OpResult {
    let path = match single_path(op) {
        Ok(p) => p,
        Err(e) => return OpResult::fail(raw_target_label(op), Action::Rename, e.to_string()),
    };
    if let Err(e) = reject_wildcard(&path) {
        return OpResult::fail(path.to_wire(), Action::Rename, e.to_string());
    }
    let Some(new_key) = op.new_key.clone().filter(|k| !k.is_empty()) else {
        return OpResult::fail(path.to_wire(), Action::Rename, BatchError::MissingField("newKey").to_string());
    };
    if let Err(e) = check_visibility_gate(config, schema, tree, visibility, &path) {
        return OpResult::fail(path.to_wire(), Action::Rename, e.to_string());
    }

    let step = match resolve(schema, tree, &path) {
        Ok(s) => s,
        Err(e) => return OpResult::fail(path.to_wire(), Action::Rename, e.to_string()),
    };

    let outcome: MemoryResult<Path> = match &step {
        SchemaStep::MapValue { parent, key, .. } => {
            if let Some(map) = map_field_of(schema, tree, parent) {
                if let Err(e) = validate_key_pattern(map.key_pattern.as_deref(), &new_key) {
                    return OpResult::fail(path.to_wire(), Action::Rename, e.to_string());
                }
            }
            tree::rename_key(tree, parent, key, &new_key).map(|_| parent.child(new_key.clone()))
        }
        SchemaStep::Topic { topic_field, node_path } => {
            if node_path.is_empty() {
                Err(PathError::TopicRoot.into())
            } else {
                let parent_node_path = &node_path[..node_path.len() - 1];
                let container = topic_paths::children_container_path(topic_field.id(), parent_node_path);
                let old_key = &node_path[node_path.len() - 1];
                tree::rename_key(tree, &container, old_key, &new_key).map(|_| container.child(new_key.clone()))
            }
        }
        _ => Err(PathError::TraverseIntoPrimitive(path.clone()).into()),
    };

    match outcome {
        Ok(new_path) => {
            visibility.close_path_and_descendants(&path);
            visibility.open_path(new_path.clone());
            OpResult::ok(path.to_wire(), Action::Rename, "renamed").with_new_path(new_path.to_wire())
        }
        Err(e) => OpResult::fail(path.to_wire(), Action::Rename, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aac_memory_core::schema::build::*;
    use serde_json::json;

    fn profile_schema() -> Schema {
        Schema::new(vec![object(
            "profile",
            vec![
                ("name".to_string(), string("name")),
                ("age".to_string(), integer("age")),
            ],
            vec!["name".to_string()],
        )])
    }

    fn batch(json_value: Value) -> BatchInput {
        serde_json::from_value(json_value).unwrap()
    }

    #[test]
    fn scenario_a_object_auto_seed() {
        let schema = profile_schema();
        let tree = Tree::new();
        let visibility = MemoryState::new();
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [
            {"action": "view", "path": "/profile"},
            {"action": "set", "path": "/profile/name", "value": "Ana"}
        ]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[1].ok, "{:?}", outcome.results[1]);
        assert_eq!(outcome.tree.get("profile"), Some(&json!({"name": "Ana"})));
        assert!(outcome.visibility.is_visible(&Path::parse("/profile")));
        let message = outcome.results[1].message.as_deref().unwrap_or_default();
        assert!(message.contains("auto-created"), "{message:?}");
        assert!(message.contains("/profile"), "{message:?}");
    }

    #[test]
    fn set_into_an_existing_parent_does_not_mention_auto_create() {
        let schema = profile_schema();
        let mut tree = Tree::new();
        tree.insert("profile".to_string(), json!({"name": "Ana"}));
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let input = batch(json!({"action": "set", "path": "/profile/name", "value": "Beatriz"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok, "{:?}", outcome.results[0]);
        assert_eq!(outcome.results[0].message.as_deref(), Some("value written"));
    }

    #[test]
    fn scenario_b_array_unique_items_rejected() {
        let mut tags = array("tags", string("item"));
        if let Field::Array { array, .. } = &mut tags {
            array.unique_items = true;
        }
        let schema = Schema::new(vec![tags]);
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!(["a"]));
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/tags"));
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [{"action": "add", "path": "/tags", "value": "a"}]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(!outcome.results[0].ok);
        assert!(outcome.results[0].message.as_ref().unwrap().contains("uniqueItems"));
        assert_eq!(outcome.tree.get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn scenario_c_map_key_pattern_then_success() {
        let mut contacts = map(
            "contacts",
            object("contact", vec![("Name".to_string(), string("Name"))], vec![]),
        );
        if let Field::Map { map, .. } = &mut contacts {
            map.key_pattern = Some("^[A-Z][a-zA-Z]+$".to_string());
        }
        let schema = Schema::new(vec![contacts]);
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/contacts"));
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [
            {"action": "add", "path": "/contacts", "key": "john", "value": {"Name": "John"}},
            {"action": "add", "path": "/contacts", "key": "John", "value": {"Name": "John"}}
        ]}));

        let outcome = apply_batch(&schema, Tree::new(), visibility, input, &config);
        assert!(!outcome.results[0].ok);
        assert!(outcome.results[1].ok, "{:?}", outcome.results[1]);
        assert_eq!(outcome.tree.get("contacts"), Some(&json!({"John": {"Name": "John"}})));
    }

    #[test]
    fn scenario_d_paginated_view() {
        let schema = Schema::new(vec![array("todos", string("item"))]);
        let items: Vec<Value> = (0..120).map(|i| json!(format!("todo-{i}"))).collect();
        let mut tree = Tree::new();
        tree.insert("todos".to_string(), Value::Array(items));
        let visibility = MemoryState::new();
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [{"action": "view", "path": "/todos", "page": {"offset": 50, "limit": 25}}]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok);
        assert!(outcome.visibility.is_visible(&Path::parse("/todos")));
        assert_eq!(
            outcome.visibility.pagination(&Path::parse("/todos")),
            Some(crate::visibility::Page { offset: 50, limit: 25 })
        );
    }

    #[test]
    fn scenario_e_wildcard_view_exposes_every_child() {
        let schema = Schema::new(vec![array("todos", string("item"))]);
        let mut tree = Tree::new();
        tree.insert("todos".to_string(), json!(["a", "b", "c"]));
        let visibility = MemoryState::new();
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [{"action": "view", "path": "/todos/*"}]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok);
        for i in 0..3 {
            assert!(outcome.visibility.is_visible(&Path::parse(&format!("/todos/{i}"))));
        }
    }

    #[test]
    fn scenario_f_topic_rename() {
        let schema = Schema::new(vec![topic("research", 5, 5)]);
        let mut tree = Tree::new();
        tree.insert(
            "research".to_string(),
            json!({"AI": {"description": null, "subtopics": {"NLP": {"description": null, "subtopics": {}}}}}),
        );
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/research/AI"));
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [{"action": "rename", "path": "/research/AI", "newKey": "ArtificialIntelligence"}]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok, "{:?}", outcome.results[0]);
        assert_eq!(outcome.results[0].new_path.as_deref(), Some("/research/ArtificialIntelligence"));
        assert!(!outcome.visibility.is_visible(&Path::parse("/research/AI")));
        assert!(outcome.visibility.is_visible(&Path::parse("/research/ArtificialIntelligence")));
        let research = outcome.tree.get("research").unwrap();
        assert!(research.get("AI").is_none());
        assert!(research.get("ArtificialIntelligence").is_some());
    }

    #[test]
    fn insert_boundary_behaviours() {
        let schema = Schema::new(vec![array("tags", string("item"))]);
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!(["a", "b"]));
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/tags"));
        let config = EngineConfig::default();

        let prepend = batch(json!({"action": "insert", "path": "/tags", "index": 0, "value": "x"}));
        let outcome = apply_batch(&schema, tree, visibility, prepend, &config);
        assert!(outcome.results[0].ok);
        assert_eq!(outcome.tree.get("tags"), Some(&json!(["x", "a", "b"])));

        let append = batch(json!({"action": "insert", "path": "/tags", "index": 3, "value": "y"}));
        let outcome2 = apply_batch(&schema, outcome.tree, outcome.visibility, append, &config);
        assert!(outcome2.results[0].ok);
        assert_eq!(outcome2.tree.get("tags"), Some(&json!(["x", "a", "b", "y"])));

        let out_of_bounds = batch(json!({"action": "insert", "path": "/tags", "index": 10, "value": "z"}));
        let outcome3 = apply_batch(&schema, outcome2.tree, outcome2.visibility, out_of_bounds, &config);
        assert!(!outcome3.results[0].ok);
    }

    #[test]
    fn delete_refuses_required_property() {
        let schema = profile_schema();
        let mut tree = Tree::new();
        tree.insert("profile".to_string(), json!({"name": "Ana"}));
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let input = batch(json!({"action": "delete", "path": "/profile/name"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(!outcome.results[0].ok);
    }

    #[test]
    fn clear_then_add_yields_single_element() {
        let mut tags = array("tags", string("item"));
        if let Field::Array { array, .. } = &mut tags {
            array.unique_items = true;
        }
        let schema = Schema::new(vec![tags]);
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!(["a", "b", "c"]));
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/tags"));
        let config = EngineConfig::default();
        let input = batch(json!({"ops": [
            {"action": "clear", "path": "/tags"},
            {"action": "add", "path": "/tags", "value": "z"}
        ]}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok);
        assert!(outcome.results[1].ok);
        assert_eq!(outcome.tree.get("tags"), Some(&json!(["z"])));
    }

    #[test]
    fn visibility_gate_blocks_unseen_mutation() {
        let schema = profile_schema();
        let tree = Tree::new();
        let visibility = MemoryState::new();
        let config = EngineConfig::default();
        let input = batch(json!({"action": "set", "path": "/profile/name", "value": "Ana"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(!outcome.results[0].ok, "neither /profile/name nor /profile has been viewed");

        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let input = batch(json!({"action": "set", "path": "/profile/name", "value": "Ana"}));
        let outcome = apply_batch(&schema, Tree::new(), visibility, input, &config);
        assert!(outcome.results[0].ok, "{:?}", outcome.results[0]);
    }

    #[test]
    fn wildcard_rejected_on_mutation() {
        let schema = Schema::new(vec![array("tags", string("item"))]);
        let mut tree = Tree::new();
        tree.insert("tags".to_string(), json!(["a"]));
        let visibility = MemoryState::new();
        let config = EngineConfig::default();
        let input = batch(json!({"action": "delete", "path": "/tags/*"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(!outcome.results[0].ok);
    }

    fn profile_with_tags_schema() -> Schema {
        Schema::new(vec![object(
            "profile",
            vec![("tags".to_string(), array("tags", string("item")))],
            vec![],
        )])
    }

    #[test]
    fn add_to_array_nested_in_an_unseeded_object_auto_creates_the_object() {
        let schema = profile_with_tags_schema();
        let tree = Tree::new();
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let input = batch(json!({"action": "add", "path": "/profile/tags", "value": "x"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok, "{:?}", outcome.results[0]);
        assert_eq!(outcome.tree.get("profile"), Some(&json!({"tags": ["x"]})));
    }

    #[test]
    fn add_to_map_nested_in_an_unseeded_object_auto_creates_the_object() {
        let schema = Schema::new(vec![object(
            "profile",
            vec![("contacts".to_string(), map("contacts", string("name")))],
            vec![],
        )]);
        let tree = Tree::new();
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let input = batch(json!({"action": "add", "path": "/profile/contacts", "key": "a", "value": "Ana"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(outcome.results[0].ok, "{:?}", outcome.results[0]);
        assert_eq!(outcome.tree.get("profile"), Some(&json!({"contacts": {"a": "Ana"}})));
    }

    #[test]
    fn add_nested_in_an_object_with_other_required_properties_is_refused() {
        let schema = Schema::new(vec![object(
            "profile",
            vec![
                ("name".to_string(), string("name")),
                ("tags".to_string(), array("tags", string("item"))),
            ],
            vec!["name".to_string()],
        )]);
        let tree = Tree::new();
        let mut visibility = MemoryState::new();
        visibility.open_path(Path::parse("/profile"));
        let config = EngineConfig::default();
        let input = batch(json!({"action": "add", "path": "/profile/tags", "value": "x"}));

        let outcome = apply_batch(&schema, tree, visibility, input, &config);
        assert!(!outcome.results[0].ok, "seeding /profile without its required name should fail");
    }
}
