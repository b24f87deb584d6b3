//! Association store
//!
//! Keeps `user_id -> {dept_ids, post_ids, role_ids}` for the users on screen,
//! read from the three junction tables, and replaces one user's associations
//! of one kind inside a single transaction.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QuerySelect, Set, Value,
};
use serde::{Deserialize, Serialize};

use crate::entity::code::DEL_FLAG_LIVE;
use crate::entity::{user_dept, user_post, user_role};
use crate::error::AppResult;
use crate::resource::{Filter, ListQuery, Resource, ResourceClient, Table};

/// Which junction table an association lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    Dept,
    Post,
    Role,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 3] = [AssociationKind::Dept, AssociationKind::Post, AssociationKind::Role];

    /// Name of the multi-select field on the user list
    pub fn field(self) -> &'static str {
        match self {
            AssociationKind::Dept => "dept_ids",
            AssociationKind::Post => "post_ids",
            AssociationKind::Role => "role_ids",
        }
    }

    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.field() == field)
    }

    pub fn table(self) -> Table {
        match self {
            AssociationKind::Dept => Table::UserDept,
            AssociationKind::Post => Table::UserPost,
            AssociationKind::Role => Table::UserRole,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssociationKind::Dept => "部门",
            AssociationKind::Post => "岗位",
            AssociationKind::Role => "角色",
        }
    }

    /// Success notice after replacing this kind of association
    pub fn saved_message(self) -> &'static str {
        match self {
            AssociationKind::Dept => "部门保存成功",
            AssociationKind::Post => "岗位保存成功",
            AssociationKind::Role => "角色保存成功",
        }
    }
}

/// Associated ids of one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Associations {
    pub dept_ids: BTreeSet<i64>,
    pub post_ids: BTreeSet<i64>,
    pub role_ids: BTreeSet<i64>,
}

impl Associations {
    pub fn get(&self, kind: AssociationKind) -> &BTreeSet<i64> {
        match kind {
            AssociationKind::Dept => &self.dept_ids,
            AssociationKind::Post => &self.post_ids,
            AssociationKind::Role => &self.role_ids,
        }
    }

    fn get_mut(&mut self, kind: AssociationKind) -> &mut BTreeSet<i64> {
        match kind {
            AssociationKind::Dept => &mut self.dept_ids,
            AssociationKind::Post => &mut self.post_ids,
            AssociationKind::Role => &mut self.role_ids,
        }
    }

    pub fn set(&mut self, kind: AssociationKind, ids: BTreeSet<i64>) {
        *self.get_mut(kind) = ids;
    }
}

/// A junction table keyed by (user_id, target id)
pub trait Junction: Resource {
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send;

    const KIND: AssociationKind;

    fn target_column() -> Self::Column;
    fn del_flag_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;

    fn user_of(row: &Self::Model) -> &str;
    fn target_of(row: &Self::Model) -> i64;
    fn is_live(row: &Self::Model) -> bool;

    /// New live row stamped with `now`
    fn new_row(user_id: &str, target_id: i64, now: DateTime<Utc>) -> Self::Active;
}

macro_rules! impl_junction {
    ($module:ident, $kind:expr, $target:ident, $target_column:ident) => {
        impl Junction for $module::Entity {
            type Active = $module::ActiveModel;

            const KIND: AssociationKind = $kind;

            fn target_column() -> Self::Column {
                $module::Column::$target_column
            }

            fn del_flag_column() -> Self::Column {
                $module::Column::DelFlag
            }

            fn updated_at_column() -> Self::Column {
                $module::Column::UpdatedAt
            }

            fn user_of(row: &Self::Model) -> &str {
                &row.user_id
            }

            fn target_of(row: &Self::Model) -> i64 {
                row.$target
            }

            fn is_live(row: &Self::Model) -> bool {
                row.del_flag == DEL_FLAG_LIVE
            }

            fn new_row(user_id: &str, target_id: i64, now: DateTime<Utc>) -> Self::Active {
                $module::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    $target: Set(target_id),
                    del_flag: Set(DEL_FLAG_LIVE.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
            }
        }
    };
}

impl_junction!(user_dept, AssociationKind::Dept, dept_id, DeptId);
impl_junction!(user_post, AssociationKind::Post, post_id, PostId);
impl_junction!(user_role, AssociationKind::Role, role_id, RoleId);

/// Read live associations of every kind for `user_ids`.
/// Every requested id gets an entry, possibly empty.
pub async fn fetch_associations(
    client: &ResourceClient,
    user_ids: &[String],
) -> AppResult<HashMap<String, Associations>> {
    let mut fetched: HashMap<String, Associations> = user_ids
        .iter()
        .map(|id| (id.clone(), Associations::default()))
        .collect();
    if user_ids.is_empty() {
        return Ok(fetched);
    }

    for kind in AssociationKind::ALL {
        fetch_kind(client, user_ids, kind, &mut fetched).await?;
    }
    Ok(fetched)
}

/// Read live associations of one kind for one user
pub async fn fetch_user_associations(
    client: &ResourceClient,
    user_id: &str,
    kind: AssociationKind,
) -> AppResult<BTreeSet<i64>> {
    let ids = [user_id.to_string()];
    let mut fetched = HashMap::from([(user_id.to_string(), Associations::default())]);
    fetch_kind(client, &ids, kind, &mut fetched).await?;
    Ok(fetched
        .remove(user_id)
        .map(|a| a.get(kind).clone())
        .unwrap_or_default())
}

async fn fetch_kind(
    client: &ResourceClient,
    user_ids: &[String],
    kind: AssociationKind,
    into: &mut HashMap<String, Associations>,
) -> AppResult<()> {
    match kind {
        AssociationKind::Dept => fetch_rows::<user_dept::Entity>(client, user_ids, into).await,
        AssociationKind::Post => fetch_rows::<user_post::Entity>(client, user_ids, into).await,
        AssociationKind::Role => fetch_rows::<user_role::Entity>(client, user_ids, into).await,
    }
}

async fn fetch_rows<J>(
    client: &ResourceClient,
    user_ids: &[String],
    into: &mut HashMap<String, Associations>,
) -> AppResult<()>
where
    J: Junction,
    J::Model: Sync,
{
    let query = ListQuery::all()
        .with_filter(Filter::is_in("user_id", user_ids.iter().cloned()))
        .with_filter(Filter::eq("del_flag", DEL_FLAG_LIVE));
    let rows = client.list::<J>(&query).await?.rows;
    for row in &rows {
        if let Some(entry) = into.get_mut(J::user_of(row)) {
            entry.get_mut(J::KIND).insert(J::target_of(row));
        }
    }
    Ok(())
}

/// What a replacement changed in the junction table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    /// The de-duplicated selection now stored
    pub selection: BTreeSet<i64>,
    pub added: Vec<i64>,
    pub removed: Vec<i64>,
    /// Selected rows that were soft-deleted and are live again
    pub revived: Vec<i64>,
}

/// Make the live `kind` associations of `user_id` exactly `selection`.
/// Runs in one transaction: either every change commits or none does.
pub async fn replace_associations(
    client: &ResourceClient,
    user_id: &str,
    kind: AssociationKind,
    selection: impl IntoIterator<Item = i64>,
) -> AppResult<ReplaceSummary> {
    let txn = client.begin().await?;
    let summary = replace_associations_in(&txn, user_id, kind, selection).await?;
    txn.commit().await?;
    Ok(summary)
}

/// Same as [`replace_associations`] on a caller-owned connection or
/// transaction; nothing is committed here.
pub async fn replace_associations_in<C>(
    conn: &C,
    user_id: &str,
    kind: AssociationKind,
    selection: impl IntoIterator<Item = i64>,
) -> AppResult<ReplaceSummary>
where
    C: ConnectionTrait,
{
    let selection: BTreeSet<i64> = selection.into_iter().collect();
    let summary = match kind {
        AssociationKind::Dept => replace_rows::<user_dept::Entity, _>(conn, user_id, selection).await?,
        AssociationKind::Post => replace_rows::<user_post::Entity, _>(conn, user_id, selection).await?,
        AssociationKind::Role => replace_rows::<user_role::Entity, _>(conn, user_id, selection).await?,
    };

    tracing::info!(
        "Replaced {} of user {}: +{:?} -{:?} revived {:?}",
        kind.field(),
        user_id,
        summary.added,
        summary.removed,
        summary.revived
    );
    Ok(summary)
}

async fn replace_rows<J, C>(
    conn: &C,
    user_id: &str,
    selection: BTreeSet<i64>,
) -> AppResult<ReplaceSummary>
where
    J: Junction,
    J::Model: IntoActiveModel<J::Active>,
    C: ConnectionTrait,
{
    let now = Utc::now();

    let existing = J::find()
        .filter(J::id_column().eq(user_id))
        .all(conn)
        .await?;

    let mut present = BTreeSet::new();
    let mut removed = Vec::new();
    let mut revived = Vec::new();
    for row in &existing {
        let target = J::target_of(row);
        if !selection.contains(&target) {
            removed.push(target);
            continue;
        }
        present.insert(target);
        if !J::is_live(row) {
            revived.push(target);
        }
    }
    let added: Vec<i64> = selection.difference(&present).copied().collect();

    if !removed.is_empty() {
        J::delete_many()
            .filter(J::id_column().eq(user_id))
            .filter(J::target_column().is_in(removed.iter().copied()))
            .exec(conn)
            .await?;
    }

    if !revived.is_empty() {
        J::update_many()
            .col_expr(J::del_flag_column(), Expr::value(Value::from(DEL_FLAG_LIVE)))
            .col_expr(J::updated_at_column(), Expr::value(Value::from(now)))
            .filter(J::id_column().eq(user_id))
            .filter(J::target_column().is_in(revived.iter().copied()))
            .exec(conn)
            .await?;
    }

    if !added.is_empty() {
        J::insert_many(added.iter().map(|&target| J::new_row(user_id, target, now)))
            .exec_without_returning(conn)
            .await?;
    }

    Ok(ReplaceSummary {
        selection,
        added,
        removed,
        revived,
    })
}

/// Live member count per department id; departments without members are absent
pub async fn member_counts(client: &ResourceClient) -> AppResult<HashMap<i64, u64>> {
    let counts: Vec<(i64, i64)> = user_dept::Entity::find()
        .select_only()
        .column(user_dept::Column::DeptId)
        .column_as(user_dept::Column::UserId.count(), "members")
        .filter(user_dept::Column::DelFlag.eq(DEL_FLAG_LIVE))
        .group_by(user_dept::Column::DeptId)
        .into_tuple()
        .all(client.conn())
        .await?;

    Ok(counts
        .into_iter()
        .map(|(dept_id, members)| (dept_id, members.max(0) as u64))
        .collect())
}

/// Client-side association cache for the users seen on screen.
///
/// Refreshes merge by key, so users that left the page keep their last
/// known associations until they are fetched again.
#[derive(Debug, Clone, Default)]
pub struct AssociationStore {
    entries: HashMap<String, Associations>,
}

impl AssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&Associations> {
        self.entries.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, fetched: HashMap<String, Associations>) {
        self.entries.extend(fetched);
    }

    /// Fetch associations for the visible users and merge them in
    pub async fn refresh(&mut self, client: &ResourceClient, user_ids: &[String]) -> AppResult<()> {
        let mut unique: Vec<String> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if !id.is_empty() && !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        if unique.is_empty() {
            return Ok(());
        }

        let fetched = fetch_associations(client, &unique).await?;
        self.merge(fetched);
        Ok(())
    }

    /// Cached ids of `kind` for `user_id`, read from storage when not cached
    pub async fn ids_for(
        &self,
        client: &ResourceClient,
        user_id: &str,
        kind: AssociationKind,
    ) -> AppResult<BTreeSet<i64>> {
        if let Some(entry) = self.entries.get(user_id) {
            return Ok(entry.get(kind).clone());
        }
        fetch_user_associations(client, user_id, kind).await
    }

    /// Record a saved selection without reading it back
    pub fn record(&mut self, user_id: &str, kind: AssociationKind, ids: BTreeSet<i64>) {
        self.entries.entry(user_id.to_string()).or_default().set(kind, ids);
    }
}
