//! Sign-in, sign-up and sign-out against an [AuthApi].

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{AuthApi, BackendError};
use crate::models::{AuthSession, Credentials, User};

pub const SIGN_UP_SUCCESS_MESSAGE: &str = "Account created successfully! Please sign in.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingFields,
    #[error("{0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggle(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }

    /// Text of the link that flips to the other mode
    pub fn switch_prompt(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Need an account? Sign Up",
            AuthMode::SignUp => "Already have an account? Sign In",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn(AuthSession),
    /// Account created; the user still has to sign in
    SignedUp(User),
}

/// Submit the form in the given mode
pub fn submit<A: AuthApi + ?Sized>(
    api: &A,
    mode: AuthMode,
    credentials: &Credentials,
) -> Result<AuthOutcome, AuthError> {
    if !credentials.is_complete() {
        return Err(AuthError::MissingFields);
    }

    match mode {
        AuthMode::SignIn => match api.sign_in_with_password(credentials) {
            Ok(session) => {
                info!(user_id = %session.user.id, "signed in");
                Ok(AuthOutcome::SignedIn(session))
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                Err(e.into())
            }
        },
        AuthMode::SignUp => match api.sign_up(credentials) {
            Ok(user) => {
                info!(user_id = %user.id, "account created");
                Ok(AuthOutcome::SignedUp(user))
            }
            Err(e) => {
                warn!(error = %e, "sign-up failed");
                Err(e.into())
            }
        },
    }
}

pub fn sign_out<A: AuthApi + ?Sized>(api: &A, session: &AuthSession) -> Result<(), AuthError> {
    match api.sign_out(session) {
        Ok(()) => {
            info!(user_id = %session.user.id, "signed out");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "sign-out failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockAuthApi;

    fn user() -> User {
        User {
            id: "user-1".into(),
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn sign_in_returns_a_session() {
        let mut api = MockAuthApi::new();
        api.expect_sign_in_with_password()
            .withf(|c| c.email == "ada@example.com" && c.password == "secret1")
            .times(1)
            .returning(|_| {
                Ok(AuthSession {
                    access_token: "tok".into(),
                    user: user(),
                })
            });
        api.expect_sign_up().never();

        let outcome = submit(&api, AuthMode::SignIn, &Credentials::new("ada@example.com", "secret1")).unwrap();
        let AuthOutcome::SignedIn(session) = outcome else {
            panic!("expected a session");
        };
        assert_eq!(session.user.id, "user-1");
    }

    #[test]
    fn sign_up_never_returns_a_session() {
        let mut api = MockAuthApi::new();
        api.expect_sign_up().times(1).returning(|_| Ok(user()));
        api.expect_sign_in_with_password().never();

        let outcome = submit(&api, AuthMode::SignUp, &Credentials::new("ada@example.com", "secret1")).unwrap();
        assert_eq!(outcome, AuthOutcome::SignedUp(user()));
    }

    #[test]
    fn backend_message_is_surfaced_verbatim() {
        let mut api = MockAuthApi::new();
        api.expect_sign_in_with_password()
            .returning(|_| Err(BackendError::InvalidCredentials));

        let err = submit(&api, AuthMode::SignIn, &Credentials::new("ada@example.com", "wrong")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn empty_fields_are_refused_without_calling_the_backend() {
        let mut api = MockAuthApi::new();
        api.expect_sign_in_with_password().never();
        api.expect_sign_up().never();

        let err = submit(&api, AuthMode::SignIn, &Credentials::new("", "secret1")).unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
        let err = submit(&api, AuthMode::SignUp, &Credentials::new("ada@example.com", "")).unwrap_err();
        assert_eq!(err.to_string(), "Email and password are required");
    }

    #[test]
    fn sign_out_failure_is_reported() {
        let session = AuthSession {
            access_token: "tok".into(),
            user: user(),
        };
        let mut api = MockAuthApi::new();
        api.expect_sign_out()
            .returning(|_| Err(BackendError::InvalidRequest("offline".into())));
        assert_eq!(sign_out(&api, &session).unwrap_err().to_string(), "offline");

        let mut api = MockAuthApi::new();
        api.expect_sign_out().times(1).returning(|_| Ok(()));
        assert!(sign_out(&api, &session).is_ok());
    }

    #[test]
    fn mode_labels() {
        assert_eq!(AuthMode::default(), AuthMode::SignIn);
        assert_eq!(AuthMode::SignIn.toggle(), AuthMode::SignUp);
        assert_eq!(AuthMode::SignUp.submit_label(), "Sign Up");
        assert_eq!(AuthMode::SignIn.switch_prompt(), "Need an account? Sign Up");
        assert_eq!(AuthMode::SignUp.switch_prompt(), "Already have an account? Sign In");
    }
}
