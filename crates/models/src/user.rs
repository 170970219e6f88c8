use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub phone: String,
    /// Comma-joined domain ids, e.g. `"3,7"`.
    pub domains_id: String,
    pub access_right: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new user; `password` is already hashed.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub domains_id: String,
    pub access_right: String,
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if email.trim().is_empty() {
        return Err(errors::ModelError::Validation("email required".into()));
    }
    if !validation::is_valid_email(email) {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewUser) -> Result<Model, errors::ModelError> {
    validate_email(&input.email)?;
    if input.first_name.trim().is_empty() {
        return Err(errors::ModelError::Validation("first_name required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        email: Set(input.email),
        password: Set(input.password),
        phone: Set(input.phone),
        domains_id: Set(input.domains_id),
        access_right: Set(input.access_right),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(errors::ModelError::from)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
