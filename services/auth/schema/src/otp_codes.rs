use sea_orm::entity::prelude::*;

/// One-time passcode issued to an email address or phone number.
/// Expires after 10 minutes; deactivated after 5 failed attempts.
///
/// Only the bcrypt hash of the code is stored. `user_id` is set when the
/// identifier already belonged to an account at issuance time; phone signup
/// codes have no user yet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub identifier: String,
    /// Channel wire value: 0 = email, 1 = phone.
    pub channel: i16,
    pub code_hash: String,
    pub user_id: Option<Uuid>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub consumed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub attempts: i16,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
