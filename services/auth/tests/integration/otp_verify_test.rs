use chrono::{Duration, Utc};

use mrkim_auth::domain::types::{MAX_OTP_ATTEMPTS, OtpChannel, PhoneVerifyOutcome, UserRole};
use mrkim_auth::error::AuthServiceError;
use mrkim_auth::usecase::otp::{
    VerifyIdentifierInput, VerifyIdentifierUseCase, VerifyPhoneOtpInput, VerifyPhoneOtpUseCase,
};

use crate::helpers::{MockOtpRepo, MockUserRepo, email_user, otp_record, otp_record_at, phone_user};

fn email_input(code: &str) -> VerifyIdentifierInput {
    VerifyIdentifierInput {
        identifier: "a@example.com".to_owned(),
        channel: OtpChannel::Email,
        code: code.to_owned(),
    }
}

#[tokio::test]
async fn should_verify_email_and_consume_the_record() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_store = users.users_handle();
    let record = otp_record("a@example.com", OtpChannel::Email, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    uc.execute(email_input("123456")).await.unwrap();

    assert!(codes.lock().unwrap()[0].consumed_at.is_some());
    assert!(users_store.lock().unwrap()[0].email_verified);
}

#[tokio::test]
async fn should_reject_when_no_code_was_issued() {
    let users = MockUserRepo::new(vec![email_user("a@example.com", false)]);
    let otp_codes = MockOtpRepo::new(vec![], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc.execute(email_input("123456")).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidOrExpiredOtp)),
        "expected InvalidOrExpiredOtp, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_code_even_when_correct() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    // Issued 11 minutes ago, so past the 10-minute window.
    let record = otp_record_at(
        "a@example.com",
        OtpChannel::Email,
        "123456",
        Some(user.id),
        Utc::now() - Duration::minutes(11),
    );
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc.execute(email_input("123456")).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidOrExpiredOtp)),
        "expected InvalidOrExpiredOtp, got {result:?}"
    );
}

#[tokio::test]
async fn wrong_code_counts_an_attempt_and_leaves_the_record_live() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_store = users.users_handle();
    let record = otp_record("a@example.com", OtpChannel::Email, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc.execute(email_input("654321")).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
    {
        let codes = codes.lock().unwrap();
        assert_eq!(codes[0].attempts, 1);
        assert!(codes[0].consumed_at.is_none());
    }
    assert!(!users_store.lock().unwrap()[0].email_verified);

    // The real code still works afterwards.
    uc.execute(email_input("123456")).await.unwrap();
    assert!(users_store.lock().unwrap()[0].email_verified);
}

#[tokio::test]
async fn repeated_wrong_codes_exhaust_the_record() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let record = otp_record("a@example.com", OtpChannel::Email, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    for _ in 0..MAX_OTP_ATTEMPTS {
        let result = uc.execute(email_input("654321")).await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidCode)),
            "expected InvalidCode, got {result:?}"
        );
    }
    assert_eq!(codes.lock().unwrap()[0].attempts, MAX_OTP_ATTEMPTS);

    // Every failure counted; the record is now dead even for the real code.
    let result = uc.execute(email_input("123456")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidOrExpiredOtp)),
        "expected InvalidOrExpiredOtp after exhaustion, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_reuse_of_a_consumed_code() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let record = otp_record("a@example.com", OtpChannel::Email, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    uc.execute(email_input("123456")).await.unwrap();

    let result = uc.execute(email_input("123456")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidOrExpiredOtp)),
        "expected InvalidOrExpiredOtp on reuse, got {result:?}"
    );
}

#[tokio::test]
async fn newest_record_wins_when_several_are_live() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let older = otp_record_at(
        "a@example.com",
        OtpChannel::Email,
        "111111",
        Some(user.id),
        Utc::now() - Duration::minutes(3),
    );
    let newer = otp_record("a@example.com", OtpChannel::Email, "222222", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![newer, older], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    // The superseded code is checked against the newest hash, so it reads as
    // a mismatch, not a hit on the old record.
    let result = uc.execute(email_input("111111")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCode)),
        "expected InvalidCode for superseded code, got {result:?}"
    );

    uc.execute(email_input("222222")).await.unwrap();
}

#[tokio::test]
async fn should_lock_out_after_too_many_failed_attempts() {
    let user = email_user("a@example.com", false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let mut record = otp_record("a@example.com", OtpChannel::Email, "123456", Some(user.id));
    record.attempts = MAX_OTP_ATTEMPTS;
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc.execute(email_input("123456")).await;

    // An exhausted record is dead even for the correct code.
    assert!(
        matches!(result, Err(AuthServiceError::InvalidOrExpiredOtp)),
        "expected InvalidOrExpiredOtp after lockout, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_email_verification_when_account_vanished() {
    let users = MockUserRepo::empty();
    let record = otp_record("a@example.com", OtpChannel::Email, "123456", None);
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc.execute(email_input("123456")).await;

    assert!(
        matches!(result, Err(AuthServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_verify_phone_on_existing_account_without_session_or_signup() {
    let user = phone_user("+254700000000");
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_store = users.users_handle();
    let record = otp_record("+254700000000", OtpChannel::Phone, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    uc.execute(VerifyIdentifierInput {
        identifier: "+254700000000".to_owned(),
        channel: OtpChannel::Phone,
        code: "123456".to_owned(),
    })
    .await
    .unwrap();

    assert!(codes.lock().unwrap()[0].consumed_at.is_some());
    let users_store = users_store.lock().unwrap();
    assert_eq!(users_store.len(), 1, "re-verification never creates accounts");
    assert!(users_store[0].phone_verified);
}

#[tokio::test]
async fn phone_reverification_requires_an_account() {
    let users = MockUserRepo::empty();
    let record = otp_record("+254700000000", OtpChannel::Phone, "123456", None);
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyIdentifierUseCase { users, otp_codes };
    let result = uc
        .execute(VerifyIdentifierInput {
            identifier: "+254700000000".to_owned(),
            channel: OtpChannel::Phone,
            code: "123456".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn phone_verification_creates_an_account_when_none_exists() {
    let users = MockUserRepo::empty();
    let users_store = users.users_handle();
    let record = otp_record("+254700000000", OtpChannel::Phone, "123456", None);
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyPhoneOtpUseCase { users, otp_codes };
    let outcome = uc
        .execute(VerifyPhoneOtpInput {
            phone: "+254700000000".to_owned(),
            code: "123456".to_owned(),
            role: Some(UserRole::Customer),
        })
        .await
        .unwrap();

    assert!(outcome.is_new_user());
    let user = outcome.user();
    assert_eq!(user.phone.as_deref(), Some("+254700000000"));
    assert_eq!(user.role, UserRole::Customer);
    assert!(user.phone_verified);
    assert!(user.password.is_none(), "OTP-only accounts carry no password");

    assert!(codes.lock().unwrap()[0].consumed_at.is_some());
    let users_store = users_store.lock().unwrap();
    assert_eq!(users_store.len(), 1);
    assert_eq!(users_store[0].id, user.id);
}

#[tokio::test]
async fn phone_signup_requires_a_role() {
    let users = MockUserRepo::empty();
    let record = otp_record("+254700000000", OtpChannel::Phone, "123456", None);
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());
    let codes = otp_codes.codes_handle();

    let uc = VerifyPhoneOtpUseCase { users, otp_codes };
    let result = uc
        .execute(VerifyPhoneOtpInput {
            phone: "+254700000000".to_owned(),
            code: "123456".to_owned(),
            role: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::MissingField("role"))),
        "expected MissingField(role), got {result:?}"
    );
    // The code survives the rejected signup and can be retried with a role.
    assert!(codes.lock().unwrap()[0].consumed_at.is_none());
}

#[tokio::test]
async fn phone_verification_flags_an_existing_account() {
    let user = phone_user("+254700000000");
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_store = users.users_handle();
    let record = otp_record("+254700000000", OtpChannel::Phone, "123456", Some(user.id));
    let otp_codes = MockOtpRepo::new(vec![record], users.users_handle());

    let uc = VerifyPhoneOtpUseCase { users, otp_codes };
    let outcome = uc
        .execute(VerifyPhoneOtpInput {
            phone: "+254700000000".to_owned(),
            code: "123456".to_owned(),
            role: None,
        })
        .await
        .unwrap();

    assert!(!outcome.is_new_user());
    assert!(matches!(outcome, PhoneVerifyOutcome::Verified(_)));
    let users_store = users_store.lock().unwrap();
    assert_eq!(users_store.len(), 1, "no second account for a known phone");
    assert!(users_store[0].phone_verified);
}
