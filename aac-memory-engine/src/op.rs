//! The `manageMemory` batch/op wire shapes (§4.G, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Hide,
    Set,
    Upsert,
    Add,
    Insert,
    Delete,
    Clear,
    Rename,
}

impl Action {
    pub fn is_mutating(self) -> bool {
        !matches!(self, Action::View | Action::Hide)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Hide => "hide",
            Action::Set => "set",
            Action::Upsert => "upsert",
            Action::Add => "add",
            Action::Insert => "insert",
            Action::Delete => "delete",
            Action::Clear => "clear",
            Action::Rename => "rename",
        }
    }
}

/// `page` as carried on a `view` op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One op in a `manageMemory` batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpInput {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "newKey")]
    pub new_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInput>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "openChildren")]
    pub open_children: Option<bool>,
}

/// Accepts a single op, `{ ops: [...] }`, or `{ operations: [...] }` (§4.G).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BatchInput {
    Ops { ops: Vec<OpInput> },
    Operations { operations: Vec<OpInput> },
    Single(Box<OpInput>),
}

impl BatchInput {
    pub fn into_ops(self) -> Vec<OpInput> {
        match self {
            BatchInput::Ops { ops } => ops,
            BatchInput::Operations { operations } => operations,
            BatchInput::Single(op) => vec![*op],
        }
    }
}

/// The result of applying a single op (§4.G "Result shape").
#[derive(Debug, Clone, Serialize)]
pub struct OpResult {
    pub target: String,
    pub action: Action,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "newPath")]
    pub new_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "mutatedPaths")]
    pub mutated_paths: Option<Vec<String>>,
}

impl OpResult {
    pub fn ok(target: impl Into<String>, action: Action, message: impl Into<String>) -> Self {
        OpResult {
            target: target.into(),
            action,
            ok: true,
            message: Some(message.into()),
            new_path: None,
            mutated_paths: None,
        }
    }

    pub fn fail(target: impl Into<String>, action: Action, message: impl Into<String>) -> Self {
        OpResult {
            target: target.into(),
            action,
            ok: false,
            message: Some(message.into()),
            new_path: None,
            mutated_paths: None,
        }
    }

    pub fn with_new_path(mut self, new_path: impl Into<String>) -> Self {
        self.new_path = Some(new_path.into());
        self
    }

    pub fn with_mutated_paths(mut self, paths: Vec<String>) -> Self {
        self.mutated_paths = Some(paths);
        self
    }
}
