//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and the worker task
//! that owns the API client. Commands are handled one at a time, in order.
//! Every result carries the submission ticket or screen epoch it was requested
//! under so the UI can drop results nobody is waiting for anymore.

use tokio::sync::mpsc;

use crate::api::{GymApi, GymClient, ProfileUpdate};
use crate::avatar::AvatarUpload;
use crate::error::AppResult;
use crate::form::SubmitTicket;
use crate::models::{AuthSession, Exercise, HistoryByDay};
use crate::session;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Sign in with the submitted credentials
    SignIn {
        ticket: SubmitTicket,
        email: String,
        password: String,
    },
    /// Create an account, then sign in
    SignUp {
        ticket: SubmitTicket,
        name: String,
        email: String,
        password: String,
    },
    /// Save name/password changes
    UpdateProfile {
        ticket: SubmitTicket,
        update: ProfileUpdate,
    },
    /// Upload a new avatar
    UpdateAvatar {
        ticket: SubmitTicket,
        upload: AvatarUpload,
    },
    /// Load the muscle groups
    FetchGroups { epoch: u64 },
    /// Load the exercises of one group
    FetchExercises { epoch: u64, group: String },
    /// Load one exercise
    FetchExercise { epoch: u64, id: String },
    /// Load the history
    FetchHistory { epoch: u64 },
    /// Mark an exercise as done
    RegisterHistory { epoch: u64, exercise_id: String },
    /// Stop sending the bearer token
    SignOut,
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    SignedIn {
        ticket: SubmitTicket,
        result: AppResult<AuthSession>,
    },
    SignedUp {
        ticket: SubmitTicket,
        result: AppResult<AuthSession>,
    },
    /// Carries the accepted display name
    ProfileSaved {
        ticket: SubmitTicket,
        result: AppResult<String>,
    },
    /// Carries the stored avatar reference
    AvatarSaved {
        ticket: SubmitTicket,
        result: AppResult<String>,
    },
    Groups {
        epoch: u64,
        result: AppResult<Vec<String>>,
    },
    Exercises {
        epoch: u64,
        group: String,
        result: AppResult<Vec<Exercise>>,
    },
    Exercise {
        epoch: u64,
        result: AppResult<Exercise>,
    },
    History {
        epoch: u64,
        result: AppResult<Vec<HistoryByDay>>,
    },
    HistoryRegistered {
        epoch: u64,
        result: AppResult<()>,
    },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(client: GymClient) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        let mut client = client;
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, AsyncCommand::Shutdown) {
                break;
            }
            if let Some(result) = execute(&mut client, cmd).await
                && result_tx.send(result).await.is_err()
            {
                // UI is gone
                break;
            }
        }
        tracing::debug!("worker stopped");
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Run one command against `api`
pub async fn execute<A: GymApi>(api: &mut A, cmd: AsyncCommand) -> Option<AsyncResult> {
    let result = match cmd {
        AsyncCommand::SignIn {
            ticket,
            email,
            password,
        } => {
            let result = session::authenticate(&*api, &email, &password).await;
            adopt_token(api, &result);
            AsyncResult::SignedIn { ticket, result }
        }
        AsyncCommand::SignUp {
            ticket,
            name,
            email,
            password,
        } => {
            let result = session::register(&*api, &name, &email, &password).await;
            adopt_token(api, &result);
            AsyncResult::SignedUp { ticket, result }
        }
        AsyncCommand::UpdateProfile { ticket, update } => AsyncResult::ProfileSaved {
            ticket,
            result: session::save_profile(&*api, &update).await,
        },
        AsyncCommand::UpdateAvatar { ticket, upload } => AsyncResult::AvatarSaved {
            ticket,
            result: session::save_avatar(&*api, &upload).await,
        },
        AsyncCommand::FetchGroups { epoch } => AsyncResult::Groups {
            epoch,
            result: api.groups().await,
        },
        AsyncCommand::FetchExercises { epoch, group } => {
            let result = api.exercises_by_group(&group).await;
            AsyncResult::Exercises {
                epoch,
                group,
                result,
            }
        }
        AsyncCommand::FetchExercise { epoch, id } => AsyncResult::Exercise {
            epoch,
            result: api.exercise(&id).await,
        },
        AsyncCommand::FetchHistory { epoch } => AsyncResult::History {
            epoch,
            result: api.history().await,
        },
        AsyncCommand::RegisterHistory { epoch, exercise_id } => AsyncResult::HistoryRegistered {
            epoch,
            result: api.register_history(&exercise_id).await,
        },
        AsyncCommand::SignOut => {
            api.set_token(None);
            return None;
        }
        AsyncCommand::Shutdown => return None,
    };
    Some(result)
}

fn adopt_token<A: GymApi>(api: &mut A, result: &AppResult<AuthSession>) {
    if let Ok(auth) = result {
        api.set_token(Some(auth.token.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::error::AppError;
    use crate::form::{Form, SubmitOutcome};
    use crate::validation::schemas;
    use tokio_test::block_on;

    fn ticket() -> SubmitTicket {
        let mut form = Form::new(schemas::avatar()).with_value("avatar_path", "a.png");
        match form.submit() {
            SubmitOutcome::Accepted(submission) => submission.ticket,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_sign_up_sets_token_after_both_requests() {
        let mut api = FakeApi::new();
        let cmd = AsyncCommand::SignUp {
            ticket: ticket(),
            name: "Ana".into(),
            email: "a@b.com".into(),
            password: "abcdef".into(),
        };

        let result = block_on(execute(&mut api, cmd));

        assert!(matches!(
            result,
            Some(AsyncResult::SignedUp { result: Ok(_), .. })
        ));
        assert_eq!(api.calls().len(), 2);
        assert_eq!(api.token.as_deref(), Some("token-1"));
    }

    #[test]
    fn test_failed_sign_in_keeps_token_unset() {
        let mut api = FakeApi::new().fail("sign_in", AppError::application("Invalid credentials.", 400));
        let cmd = AsyncCommand::SignIn {
            ticket: ticket(),
            email: "a@b.com".into(),
            password: "abcdef".into(),
        };

        let result = block_on(execute(&mut api, cmd));

        assert!(matches!(
            result,
            Some(AsyncResult::SignedIn { result: Err(_), .. })
        ));
        assert_eq!(api.token, None);
    }

    #[test]
    fn test_sign_out_clears_token() {
        let mut api = FakeApi::new();
        api.token = Some("t".into());
        assert!(block_on(execute(&mut api, AsyncCommand::SignOut)).is_none());
        assert_eq!(api.token, None);
    }

    #[test]
    fn test_fetch_results_keep_their_epoch() {
        let mut api = FakeApi::new();
        let result = block_on(execute(
            &mut api,
            AsyncCommand::FetchExercises {
                epoch: 9,
                group: "costas".into(),
            },
        ));
        match result {
            Some(AsyncResult::Exercises { epoch, group, .. }) => {
                assert_eq!(epoch, 9);
                assert_eq!(group, "costas");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(api.calls(), vec!["exercises_by_group costas"]);
    }
}
