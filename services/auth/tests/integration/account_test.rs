use mrkim_auth::domain::types::UserRole;
use mrkim_auth::error::AuthServiceError;
use mrkim_auth::usecase::account::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use mrkim_auth::usecase::otp::verify_code;
use mrkim_auth::usecase::session::issue_session_token;
use mrkim_session::cookie::SESSION_EXP;
use mrkim_session::token::validate_session_token;

use crate::helpers::{MockUserRepo, TEST_SESSION_SECRET, email_user, phone_user};

#[tokio::test]
async fn should_register_an_unverified_user() {
    let users = MockUserRepo::empty();
    let store = users.users_handle();

    let uc = RegisterUseCase { users };
    let user = uc
        .execute(RegisterInput {
            email: Some("a@example.com".to_owned()),
            phone: None,
            password: "hunter2!".to_owned(),
            role: UserRole::Vendor,
        })
        .await
        .unwrap();

    assert_eq!(user.email.as_deref(), Some("a@example.com"));
    assert_eq!(user.role, UserRole::Vendor);
    assert!(!user.email_verified && !user.phone_verified);
    // Hashed, not stored plaintext.
    let hash = user.password.as_deref().unwrap();
    assert_ne!(hash, "hunter2!");
    assert!(verify_code("hunter2!", hash).unwrap());

    assert_eq!(store.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_duplicate_registration() {
    let users = MockUserRepo::new(vec![email_user("a@example.com", false)]);

    let uc = RegisterUseCase { users };
    let result = uc
        .execute(RegisterInput {
            email: Some("a@example.com".to_owned()),
            phone: None,
            password: "hunter2!".to_owned(),
            role: UserRole::Customer,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UserExists)),
        "expected UserExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_some_identifier_to_register() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc
        .execute(RegisterInput {
            email: None,
            phone: None,
            password: "hunter2!".to_owned(),
            role: UserRole::Customer,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::MissingField(_))),
        "expected MissingField, got {result:?}"
    );
}

#[tokio::test]
async fn should_log_in_a_verified_user() {
    let users = MockUserRepo::new(vec![email_user("a@example.com", true)]);

    let uc = LoginUseCase { users };
    let user = uc
        .execute(LoginInput {
            email: "a@example.com".to_owned(),
            password: "hunter2!".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(user.email.as_deref(), Some("a@example.com"));
}

#[tokio::test]
async fn should_gate_login_on_email_verification() {
    let users = MockUserRepo::new(vec![email_user("a@example.com", false)]);

    let uc = LoginUseCase { users };
    let result = uc
        .execute(LoginInput {
            email: "a@example.com".to_owned(),
            password: "hunter2!".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::EmailNotVerified)),
        "expected EmailNotVerified, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let users = MockUserRepo::new(vec![email_user("a@example.com", true)]);

    let uc = LoginUseCase { users };
    let result = uc
        .execute(LoginInput {
            email: "a@example.com".to_owned(),
            password: "wrong".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_email_with_the_same_error_as_wrong_password() {
    let uc = LoginUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc
        .execute(LoginInput {
            email: "nobody@example.com".to_owned(),
            password: "hunter2!".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_password_login_for_phone_first_account() {
    let mut user = phone_user("+254700000000");
    user.email = Some("a@example.com".to_owned());
    let users = MockUserRepo::new(vec![user]);

    let uc = LoginUseCase { users };
    let result = uc
        .execute(LoginInput {
            email: "a@example.com".to_owned(),
            password: "anything".to_owned(),
        })
        .await;

    // No password on the account reads exactly like a wrong password.
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[test]
fn issued_session_token_round_trips() {
    let user = email_user("a@example.com", true);
    let (token, exp) = issue_session_token(&user, "a@example.com", TEST_SESSION_SECRET).unwrap();

    let info = validate_session_token(&token, TEST_SESSION_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.identifier, "a@example.com");
    assert_eq!(info.role, user.role.as_u8());
    assert_eq!(info.session_exp, exp);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    // Seven-day session.
    assert!(exp >= now + SESSION_EXP - 5 && exp <= now + SESSION_EXP);
}
