//! Inline editor
//!
//! One optional `(row, field)` edit target per table view plus its buffer.
//! Cells are rendered from a declarative [`FieldSpec`] instead of per-field
//! branches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::association::AssociationKind;
use crate::entity::code::{Gender, Status};
use crate::error::{AppError, AppResult};
use crate::resource::RowId;

pub const INVALID_EDIT_CONTEXT: &str = "无效的编辑上下文";

/// One entry of a closed choice list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

pub fn status_choices() -> Vec<Choice> {
    Status::ALL
        .into_iter()
        .map(|s| Choice {
            value: s.code(),
            label: s.label(),
            color: Some(s.color()),
        })
        .collect()
}

pub fn gender_choices() -> Vec<Choice> {
    Gender::ALL
        .into_iter()
        .map(|g| Choice {
            value: g.code(),
            label: g.label(),
            color: None,
        })
        .collect()
}

/// How a field is displayed and edited
#[derive(Debug, Clone, PartialEq)]
pub enum EditorKind {
    /// Display only
    ReadOnly,
    Text,
    Email,
    /// `missing` is shown for an empty value, `unknown` for a code outside
    /// `choices`; without `unknown` such codes are shown verbatim
    Select {
        choices: Vec<Choice>,
        missing: Option<&'static str>,
        unknown: Option<&'static str>,
    },
    MultiSelect(AssociationKind),
}

impl EditorKind {
    pub fn status() -> Self {
        EditorKind::Select {
            choices: status_choices(),
            missing: Some(Status::Normal.code()),
            unknown: None,
        }
    }

    pub fn gender() -> Self {
        EditorKind::Select {
            choices: gender_choices(),
            missing: Some(Gender::Unknown.code()),
            unknown: Some(Gender::Unknown.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: EditorKind,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: EditorKind) -> Self {
        Self { name, label, kind }
    }
}

/// Value held by a cell: text for scalar columns, ids for associations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Ids(Vec<i64>),
    Text(Option<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(Some(value.into()))
    }

    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Self {
        FieldValue::Ids(ids.into_iter().collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => text.as_deref(),
            FieldValue::Ids(_) => None,
        }
    }

    fn fits(&self, kind: &EditorKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Ids(_), EditorKind::MultiSelect(_))
                | (
                    FieldValue::Text(_),
                    EditorKind::ReadOnly | EditorKind::Text | EditorKind::Email | EditorKind::Select { .. }
                )
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CellKey {
    pub row_id: RowId,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Viewing,
    Editing { key: CellKey, buffer: FieldValue },
}

/// The write a finished edit turns into
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    /// Column patch for the resource client
    Scalar(Map<String, JsonValue>),
    /// Full replacement of one association kind
    Associations { kind: AssociationKind, ids: Vec<i64> },
}

/// An edit taken out of the editor, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub key: CellKey,
    pub value: FieldValue,
    kind: EditorKind,
}

impl PendingSave {
    pub fn action(&self) -> SaveAction {
        match (&self.kind, &self.value) {
            (EditorKind::MultiSelect(kind), FieldValue::Ids(ids)) => SaveAction::Associations {
                kind: *kind,
                ids: ids.clone(),
            },
            (_, value) => {
                let json = match value {
                    FieldValue::Text(Some(text)) => JsonValue::String(text.clone()),
                    FieldValue::Text(None) => JsonValue::Null,
                    FieldValue::Ids(ids) => JsonValue::from(ids.clone()),
                };
                let mut patch = Map::new();
                patch.insert(self.key.field.clone(), json);
                SaveAction::Scalar(patch)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

/// id -> label entry of an option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub value: i64,
    pub label: String,
}

/// A rendered cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Cell {
    View {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tags: Vec<Tag>,
    },
    Edit {
        value: FieldValue,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        options: Vec<OptionItem>,
    },
}

/// Edit state machine of one table
#[derive(Debug, Clone)]
pub struct InlineEditor {
    fields: Vec<FieldSpec>,
    state: EditorState,
}

impl InlineEditor {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            state: EditorState::Viewing,
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn target(&self) -> Option<&CellKey> {
        match &self.state {
            EditorState::Editing { key, .. } => Some(key),
            EditorState::Viewing => None,
        }
    }

    pub fn is_editing(&self, row_id: &RowId, field: &str) -> bool {
        self.target()
            .is_some_and(|key| &key.row_id == row_id && key.field == field)
    }

    /// Enter editing for `(row_id, field)`, dropping any other edit in progress
    pub fn start(&mut self, row_id: RowId, field: &str, seed: FieldValue) -> AppResult<()> {
        let spec = self
            .field(field)
            .filter(|spec| spec.kind != EditorKind::ReadOnly)
            .ok_or_else(|| AppError::Validation(format!("字段 {} 不可编辑", field)))?;
        if !seed.fits(&spec.kind) {
            return Err(AppError::Validation(format!("字段 {} 的初始值类型不匹配", spec.label)));
        }

        if let Some(previous) = self.target() {
            tracing::debug!("Dropping edit of {} on {}", previous.field, previous.row_id);
        }
        self.state = EditorState::Editing {
            key: CellKey {
                row_id,
                field: field.to_string(),
            },
            buffer: seed,
        };
        Ok(())
    }

    /// Replace the edit buffer
    pub fn set_buffer(&mut self, value: FieldValue) -> AppResult<()> {
        let EditorState::Editing { key, buffer } = &mut self.state else {
            return Err(AppError::Validation(INVALID_EDIT_CONTEXT.to_string()));
        };
        let spec = self
            .fields
            .iter()
            .find(|f| f.name == key.field)
            .ok_or_else(|| AppError::Validation(INVALID_EDIT_CONTEXT.to_string()))?;
        if !value.fits(&spec.kind) {
            return Err(AppError::Validation(format!("字段 {} 的值类型不匹配", spec.label)));
        }
        *buffer = value;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.state = EditorState::Viewing;
    }

    /// Hand the edit over for writing and go back to viewing.
    /// A buffer that fails validation keeps the editor in place.
    pub fn take_for_save(&mut self) -> AppResult<PendingSave> {
        let EditorState::Editing { key, buffer } = &self.state else {
            return Err(AppError::Validation(INVALID_EDIT_CONTEXT.to_string()));
        };
        let spec = self
            .field(&key.field)
            .ok_or_else(|| AppError::Validation(INVALID_EDIT_CONTEXT.to_string()))?;
        validate(spec, buffer)?;

        let kind = spec.kind.clone();
        match std::mem::take(&mut self.state) {
            EditorState::Editing { key, buffer } => Ok(PendingSave {
                key,
                value: normalize(buffer),
                kind,
            }),
            EditorState::Viewing => Err(AppError::Validation(INVALID_EDIT_CONTEXT.to_string())),
        }
    }

    /// Render one cell: the edit control when it is the edit target,
    /// otherwise the display form of `current`
    pub fn render_cell(
        &self,
        row_id: &RowId,
        spec: &FieldSpec,
        current: &FieldValue,
        options: &[OptionItem],
    ) -> Cell {
        if let EditorState::Editing { key, buffer } = &self.state {
            if &key.row_id == row_id && key.field == spec.name {
                let choices = match &spec.kind {
                    EditorKind::Select { choices, .. } => choices.clone(),
                    _ => Vec::new(),
                };
                return Cell::Edit {
                    value: buffer.clone(),
                    choices,
                    options: options.to_vec(),
                };
            }
        }
        view_cell(spec, current, options)
    }
}

fn view_cell(spec: &FieldSpec, current: &FieldValue, options: &[OptionItem]) -> Cell {
    match (&spec.kind, current) {
        (EditorKind::MultiSelect(_), FieldValue::Ids(ids)) => {
            let tags: Vec<Tag> = ids
                .iter()
                .map(|id| Tag {
                    label: options
                        .iter()
                        .find(|o| o.value == *id)
                        .map(|o| o.label.clone())
                        .unwrap_or_else(|| id.to_string()),
                    color: Some("blue"),
                })
                .collect();
            let text = tags
                .iter()
                .map(|t| t.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Cell::View { text, tags }
        }
        (
            EditorKind::Select {
                choices,
                missing,
                unknown,
            },
            value,
        ) => {
            let code = match value.as_text().filter(|c| !c.is_empty()) {
                Some(code) if choices.iter().any(|c| c.value == code) => Some(code),
                Some(code) => match unknown {
                    Some(fallback) => Some(*fallback),
                    None => {
                        return Cell::View {
                            text: code.to_string(),
                            tags: Vec::new(),
                        }
                    }
                },
                None => *missing,
            };
            match code.and_then(|code| choices.iter().find(|c| c.value == code)) {
                Some(choice) => Cell::View {
                    text: choice.label.to_string(),
                    tags: vec![Tag {
                        label: choice.label.to_string(),
                        color: choice.color,
                    }],
                },
                None => Cell::View {
                    text: String::new(),
                    tags: Vec::new(),
                },
            }
        }
        (_, value) => Cell::View {
            text: value.as_text().unwrap_or_default().to_string(),
            tags: Vec::new(),
        },
    }
}

fn validate(spec: &FieldSpec, value: &FieldValue) -> AppResult<()> {
    match (&spec.kind, value) {
        (EditorKind::Email, FieldValue::Text(Some(text))) if !text.trim().is_empty() => {
            if !is_email(text.trim()) {
                return Err(AppError::Validation(format!("{}格式不正确", spec.label)));
            }
        }
        (EditorKind::Select { choices, .. }, FieldValue::Text(Some(code))) => {
            if !choices.iter().any(|c| c.value == code) {
                return Err(AppError::Validation(format!("{}的取值无效: {}", spec.label, code)));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Check a column patch against the field definitions before it is written.
/// Columns without a definition are left to the resource client; text values
/// of defined fields are trimmed like an inline save.
pub fn validate_patch(fields: &[FieldSpec], patch: &Map<String, JsonValue>) -> AppResult<Map<String, JsonValue>> {
    let mut checked = Map::with_capacity(patch.len());
    for (name, raw) in patch {
        let Some(spec) = fields.iter().find(|spec| spec.name == name.as_str()) else {
            checked.insert(name.clone(), raw.clone());
            continue;
        };
        let value = match (&spec.kind, raw) {
            (EditorKind::ReadOnly | EditorKind::MultiSelect(_), _) => {
                return Err(AppError::Validation(format!("字段 {} 不可编辑", spec.label)));
            }
            (_, JsonValue::Null) => FieldValue::Text(None),
            (_, JsonValue::String(text)) => FieldValue::text(text.as_str()),
            (EditorKind::Text, other) => {
                checked.insert(name.clone(), other.clone());
                continue;
            }
            (_, other) => {
                return Err(AppError::Validation(format!("{}的取值无效: {}", spec.label, other)));
            }
        };
        validate(spec, &value)?;
        let value = match normalize(value) {
            FieldValue::Text(Some(text)) => JsonValue::String(text),
            _ => JsonValue::Null,
        };
        checked.insert(name.clone(), value);
    }
    Ok(checked)
}

fn normalize(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Ids(mut ids) => {
            ids.sort_unstable();
            ids.dedup();
            FieldValue::Ids(ids)
        }
        FieldValue::Text(text) => FieldValue::Text(text.map(|t| t.trim().to_string())),
    }
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}
