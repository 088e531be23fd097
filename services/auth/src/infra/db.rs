use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use mrkim_auth_schema::{otp_codes, users};

use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{MAX_OTP_ATTEMPTS, OtpChannel, OtpRecord, User, UserRole};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .context("find user by phone")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        user_active_model(user)
            .insert(&self.db)
            .await
            .context("create user")?;
        Ok(())
    }
}

// ── OTP repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn create(&self, record: &OtpRecord) -> Result<(), AuthServiceError> {
        otp_codes::ActiveModel {
            id: Set(record.id),
            identifier: Set(record.identifier.clone()),
            channel: Set(record.channel.as_i16()),
            code_hash: Set(record.code_hash.clone()),
            user_id: Set(record.user_id),
            expires_at: Set(record.expires_at),
            consumed_at: Set(None),
            attempts: Set(0),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp record")?;
        Ok(())
    }

    async fn find_active(
        &self,
        identifier: &str,
        channel: OtpChannel,
    ) -> Result<Option<OtpRecord>, AuthServiceError> {
        let now = Utc::now();
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::Identifier.eq(identifier))
            .filter(otp_codes::Column::Channel.eq(channel.as_i16()))
            .filter(otp_codes::Column::ConsumedAt.is_null())
            .filter(otp_codes::Column::ExpiresAt.gt(now))
            .filter(otp_codes::Column::Attempts.lt(MAX_OTP_ATTEMPTS))
            .order_by_desc(otp_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find active otp record")?;
        model.map(otp_from_model).transpose()
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<(), AuthServiceError> {
        // Increment in SQL; concurrent wrong attempts must each count toward
        // the lockout, which a read-modify-write would lose.
        otp_codes::Entity::update_many()
            .col_expr(
                otp_codes::Column::Attempts,
                Expr::col(otp_codes::Column::Attempts).add(1),
            )
            .filter(otp_codes::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record failed otp attempt")?;
        Ok(())
    }

    async fn consume_verifying_user(
        &self,
        record_id: Uuid,
        user_id: Uuid,
        channel: OtpChannel,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    consume_record(txn, record_id).await?;
                    let mut user = users::ActiveModel {
                        id: Set(user_id),
                        ..Default::default()
                    };
                    match channel {
                        OtpChannel::Email => user.email_verified = Set(true),
                        OtpChannel::Phone => user.phone_verified = Set(true),
                    }
                    user.update(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("consume otp verifying user")?;
        Ok(())
    }

    async fn consume_creating_user(
        &self,
        record_id: Uuid,
        user: &User,
    ) -> Result<(), AuthServiceError> {
        let user = user.clone();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    consume_record(txn, record_id).await?;
                    user_active_model(&user).insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .context("consume otp creating user")?;
        Ok(())
    }
}

async fn consume_record(txn: &DatabaseTransaction, record_id: Uuid) -> Result<(), sea_orm::DbErr> {
    otp_codes::ActiveModel {
        id: Set(record_id),
        consumed_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .update(txn)
    .await?;
    Ok(())
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        phone: Set(user.phone.clone()),
        password: Set(user.password.clone()),
        role: Set(user.role.as_u8() as i16),
        email_verified: Set(user.email_verified),
        phone_verified: Set(user.phone_verified),
        created_at: Set(user.created_at),
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let role = UserRole::from_u8(model.role as u8)
        .ok_or_else(|| anyhow!("unknown role value {} for user {}", model.role, model.id))?;
    Ok(User {
        id: model.id,
        email: model.email,
        phone: model.phone,
        password: model.password,
        role,
        email_verified: model.email_verified,
        phone_verified: model.phone_verified,
        created_at: model.created_at,
    })
}

fn otp_from_model(model: otp_codes::Model) -> Result<OtpRecord, AuthServiceError> {
    let channel = OtpChannel::from_i16(model.channel)
        .ok_or_else(|| anyhow!("unknown channel value {} for otp {}", model.channel, model.id))?;
    Ok(OtpRecord {
        id: model.id,
        identifier: model.identifier,
        channel,
        code_hash: model.code_hash,
        user_id: model.user_id,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        attempts: model.attempts,
        created_at: model.created_at,
    })
}
