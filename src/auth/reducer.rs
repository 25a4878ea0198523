use std::sync::Arc;

use crate::auth::model::{AuthEvent, SessionState, User};

/// Computes the next session state for `event`.
///
/// Every event is accepted. `APP_READY` clears the loading flag and nothing
/// sets it again, so once the app is ready it stays ready.
pub fn reduce(prev: &SessionState, event: &AuthEvent) -> SessionState {
    match event {
        AuthEvent::AppReady => SessionState {
            is_loading: false,
            ..prev.clone()
        },
        AuthEvent::MissingToken => SessionState {
            user: None,
            ..prev.clone()
        },
        AuthEvent::RestoreToken(user) => SessionState {
            user: Some(user.clone()),
            is_loading: false,
            ..prev.clone()
        },
        AuthEvent::SignIn(user) => SessionState {
            user: Some(user.clone()),
            is_signout: false,
            ..prev.clone()
        },
        AuthEvent::SignOut => SessionState {
            user: None,
            is_signout: true,
            ..prev.clone()
        },
    }
}

/// Applies a tag-addressed event; unknown tags leave the state untouched.
pub fn reduce_tagged(
    prev: &SessionState,
    tag: &str,
    user: Option<Arc<User>>,
) -> SessionState {
    match AuthEvent::from_tag(tag, user) {
        Some(event) => reduce(prev, &event),
        None => {
            log::debug!("ignoring unrecognized session event `{tag}`");
            prev.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Arc<User> {
        Arc::new(User::new(name))
    }

    fn all_events() -> Vec<AuthEvent> {
        vec![
            AuthEvent::AppReady,
            AuthEvent::MissingToken,
            AuthEvent::RestoreToken(user("restored")),
            AuthEvent::SignIn(user("signed-in")),
            AuthEvent::SignOut,
        ]
    }

    #[test]
    fn app_ready_only_clears_loading() {
        let prev = SessionState {
            is_loading: true,
            is_signout: true,
            user: Some(user("ash")),
        };
        let next = reduce(&prev, &AuthEvent::AppReady);
        assert!(!next.is_loading);
        assert!(next.is_signout);
        assert_eq!(next.user, prev.user);
    }

    #[test]
    fn missing_token_clears_user_but_keeps_flags() {
        let prev = SessionState {
            is_loading: true,
            is_signout: false,
            user: Some(user("ash")),
        };
        let next = reduce(&prev, &AuthEvent::MissingToken);
        assert_eq!(next.user, None);
        assert!(next.is_loading);
        assert!(!next.is_signout);
    }

    #[test]
    fn restore_token_sets_user_and_finishes_loading() {
        let restored = user("misty");
        let next = reduce(
            &SessionState::default(),
            &AuthEvent::RestoreToken(restored.clone()),
        );
        assert_eq!(next.user, Some(restored));
        assert!(!next.is_loading);
        assert!(!next.is_signout);
    }

    #[test]
    fn sign_in_resets_signout_flag_and_keeps_loading() {
        let prev = SessionState {
            is_loading: true,
            is_signout: true,
            user: None,
        };
        let signed_in = user("brock");
        let next = reduce(&prev, &AuthEvent::SignIn(signed_in.clone()));
        assert_eq!(next.user, Some(signed_in));
        assert!(!next.is_signout);
        assert!(next.is_loading);
    }

    #[test]
    fn sign_out_clears_user_and_flags_signout() {
        let prev = SessionState {
            is_loading: false,
            is_signout: false,
            user: Some(user("ash")),
        };
        let next = reduce(&prev, &AuthEvent::SignOut);
        assert_eq!(next.user, None);
        assert!(next.is_signout);
        assert!(!next.is_loading);
    }

    #[test]
    fn missing_token_and_sign_out_are_idempotent() {
        let start = SessionState {
            is_loading: false,
            is_signout: false,
            user: Some(user("ash")),
        };
        for event in [AuthEvent::MissingToken, AuthEvent::SignOut] {
            let once = reduce(&start, &event);
            let twice = reduce(&once, &event);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn same_input_gives_same_output() {
        let start = SessionState::default();
        for event in all_events() {
            assert_eq!(reduce(&start, &event), reduce(&start, &event));
        }
    }

    #[test]
    fn loading_never_returns_after_app_ready() {
        let events = all_events();
        let mut state = reduce(&SessionState::default(), &AuthEvent::AppReady);
        for round in 0..3 {
            for (idx, event) in events.iter().enumerate() {
                if (idx + round) % 2 == 0 {
                    state = reduce(&state, event);
                    assert!(!state.is_loading, "{} re-enabled loading", event.tag());
                }
            }
        }
    }

    #[test]
    fn unrecognized_tag_is_a_no_op() {
        let prev = SessionState {
            is_loading: false,
            is_signout: true,
            user: None,
        };
        assert_eq!(reduce_tagged(&prev, "REFRESH_TOKEN", None), prev);
        assert_eq!(
            reduce_tagged(&prev, AuthEvent::SIGN_IN, Some(user("ash"))).user,
            Some(user("ash"))
        );
    }
}
