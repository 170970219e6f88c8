use sea_orm::{
    entity::prelude::*, sea_query::Expr, DatabaseConnection, PaginatorTrait, QueryOrder, QuerySelect, Set,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "domain")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub logo: String,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub meta_ico: String,
    /// Comma-joined module keys, e.g. `"blog,gallery"`.
    pub modul: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default)]
pub struct NewDomain {
    pub name: String,
    pub logo: String,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub meta_ico: String,
    pub modul: String,
    pub status: String,
}

/// Sparse column update; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomainPatch {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub meta_title: Option<String>,
    pub meta_desc: Option<String>,
    pub meta_keyword: Option<String>,
    pub meta_ico: Option<String>,
    pub modul: Option<String>,
    pub status: Option<String>,
}

impl DomainPatch {
    pub fn is_empty(&self) -> bool {
        *self == DomainPatch::default()
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if !validation::is_valid_domain_name(name) {
        return Err(errors::ModelError::Validation("invalid domain name".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewDomain) -> Result<Model, errors::ModelError> {
    validate_name(&input.name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(input.name),
        logo: Set(input.logo),
        meta_title: Set(input.meta_title),
        meta_desc: Set(input.meta_desc),
        meta_keyword: Set(input.meta_keyword),
        meta_ico: Set(input.meta_ico),
        modul: Set(input.modul),
        status: Set(input.status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(errors::ModelError::from)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// True when another row (not `exclude_id`) already uses `name`.
pub async fn name_taken(db: &DatabaseConnection, name: &str, exclude_id: Option<i32>) -> Result<bool, errors::ModelError> {
    let mut q = Entity::find().filter(Column::Name.eq(name));
    if let Some(id) = exclude_id {
        q = q.filter(Column::Id.ne(id));
    }
    let n = q.count(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(n > 0)
}

/// Apply a sparse patch; returns the number of affected rows.
pub async fn update_fields(db: &DatabaseConnection, id: i32, patch: DomainPatch) -> Result<u64, errors::ModelError> {
    let mut q = Entity::update_many().col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())));
    if let Some(v) = patch.name { q = q.col_expr(Column::Name, Expr::value(v)); }
    if let Some(v) = patch.logo { q = q.col_expr(Column::Logo, Expr::value(v)); }
    if let Some(v) = patch.meta_title { q = q.col_expr(Column::MetaTitle, Expr::value(v)); }
    if let Some(v) = patch.meta_desc { q = q.col_expr(Column::MetaDesc, Expr::value(v)); }
    if let Some(v) = patch.meta_keyword { q = q.col_expr(Column::MetaKeyword, Expr::value(v)); }
    if let Some(v) = patch.meta_ico { q = q.col_expr(Column::MetaIco, Expr::value(v)); }
    if let Some(v) = patch.modul { q = q.col_expr(Column::Modul, Expr::value(v)); }
    if let Some(v) = patch.status { q = q.col_expr(Column::Status, Expr::value(v)); }
    let res = q
        .filter(Column::Id.eq(id))
        .exec(db)
        .await
        .map_err(errors::ModelError::from)?;
    Ok(res.rows_affected)
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, errors::ModelError> {
    Entity::find().count(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest first.
pub async fn page(db: &DatabaseConnection, offset: u64, limit: u64) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_desc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
