use crate::core::schema::{FieldErrors, ValidationSchema};
use crate::domain::model::{Field, RegistrationInput};
use crate::domain::ports::{AccountService, Navigator, Notifier};
use std::fmt;
use tokio::sync::watch;

pub const SIGN_UP_FAILED: &str = "sign up failed! please try again.";
pub const SIGN_IN_FAILED: &str = "sign in failed. please try again";
pub const AUTH_CHECK_FAILED: &str = "signup failed.";

pub const DEFAULT_LANDING_ROUTE: &str = "/";

/// One of the three sequential steps of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreatingAccount,
    SigningIn,
    CheckingAuth,
}

impl Stage {
    /// Notice shown when this stage fails.
    pub fn failure_notice(&self) -> &'static str {
        match self {
            Stage::CreatingAccount => SIGN_UP_FAILED,
            Stage::SigningIn => SIGN_IN_FAILED,
            Stage::CheckingAuth => AUTH_CHECK_FAILED,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CreatingAccount => "create account",
            Stage::SigningIn => "sign in",
            Stage::CheckingAuth => "verify auth",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Validating,
    Submitting(Stage),
    Failed(Stage),
}

impl FlowState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, FlowState::Submitting(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Form reset and navigation done.
    Success,
    /// Validation blocked the submission; nothing was sent.
    Invalid(FieldErrors),
    Failed(Stage),
}

pub struct RegistrationFlow<A: AccountService, N: Notifier, R: Navigator> {
    service: A,
    notifier: N,
    navigator: R,
    schema: ValidationSchema,
    landing_route: String,
    form: RegistrationInput,
    errors: FieldErrors,
    state: watch::Sender<FlowState>,
}

impl<A: AccountService, N: Notifier, R: Navigator> RegistrationFlow<A, N, R> {
    pub fn new(service: A, notifier: N, navigator: R) -> Self {
        Self::with_schema(service, notifier, navigator, ValidationSchema::sign_up())
    }

    pub fn with_schema(service: A, notifier: N, navigator: R, schema: ValidationSchema) -> Self {
        Self {
            service,
            notifier,
            navigator,
            schema,
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
            form: RegistrationInput::default(),
            errors: FieldErrors::default(),
            state: watch::Sender::new(FlowState::Idle),
        }
    }

    pub fn landing_route(mut self, route: impl Into<String>) -> Self {
        self.landing_route = route.into();
        self
    }

    pub fn form(&self) -> &RegistrationInput {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    /// Live view of the flow state. The presentation layer keeps this
    /// receiver while `on_submit` runs and disables the submit control
    /// whenever `is_submitting()` holds.
    pub fn watch_state(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: FlowState) {
        self.state.send_replace(state);
    }

    pub fn on_field_change(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let message = self.schema.validate_field(field, &value);
        self.form.set(field, value);
        self.errors.set(field, message);

        if matches!(self.state(), FlowState::Failed(_)) {
            self.set_state(FlowState::Idle);
        }
    }

    pub fn reset(&mut self) {
        self.form = RegistrationInput::default();
        self.errors = FieldErrors::default();
        self.set_state(FlowState::Idle);
    }

    /// 驗證整份表單後依序執行：建立帳號 → 登入 → 確認登入狀態
    pub async fn on_submit(&mut self) -> SubmitOutcome {
        self.set_state(FlowState::Validating);
        if let Err(errors) = self.schema.validate(&self.form) {
            tracing::debug!("Submission blocked by validation: {}", errors);
            self.errors = errors.clone();
            self.set_state(FlowState::Idle);
            return SubmitOutcome::Invalid(errors);
        }
        self.errors = FieldErrors::default();

        // each attempt works on its own snapshot
        let input = self.form.clone();

        match self.run_stages(&input).await {
            Ok(()) => {
                tracing::info!("Account created and signed in for {}", input.email);
                self.reset();
                self.navigator.navigate(&self.landing_route);
                SubmitOutcome::Success
            }
            Err(stage) => {
                tracing::warn!("Sign-up attempt failed at stage '{}'", stage);
                self.notifier.notify(stage.failure_notice());
                self.set_state(FlowState::Failed(stage));
                SubmitOutcome::Failed(stage)
            }
        }
    }

    async fn run_stages(&mut self, input: &RegistrationInput) -> Result<(), Stage> {
        self.set_state(FlowState::Submitting(Stage::CreatingAccount));
        let account = self
            .service
            .create_account(input)
            .await
            .ok_or(Stage::CreatingAccount)?;
        tracing::debug!("Account {} created", account.id);

        self.set_state(FlowState::Submitting(Stage::SigningIn));
        let session = match self.service.sign_in(&input.credentials()).await {
            Some(session) => session,
            None => {
                // no compensation: the account stays without a session
                tracing::warn!(
                    "Account {} was created but sign-in failed; it is left in place",
                    account.id
                );
                return Err(Stage::SigningIn);
            }
        };
        tracing::debug!("Session {} established", session.id);

        self.set_state(FlowState::Submitting(Stage::CheckingAuth));
        if !self.service.check_current_user().await {
            return Err(Stage::CheckingAuth);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{INVALID_EMAIL, TOO_SHORT};
    use crate::domain::model::{AccountRecord, SessionHandle, SignInInput};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Calls {
        create: Arc<Mutex<Vec<RegistrationInput>>>,
        sign_in: Arc<Mutex<Vec<SignInInput>>>,
        check: Arc<Mutex<usize>>,
        notices: Arc<Mutex<Vec<String>>>,
        routes: Arc<Mutex<Vec<String>>>,
        watcher: Arc<Mutex<Option<watch::Receiver<FlowState>>>>,
        seen_states: Arc<Mutex<Vec<FlowState>>>,
    }

    impl Calls {
        /// Records what a subscriber sees while the service call is running.
        fn observe_state(&self) {
            if let Some(rx) = self.watcher.lock().unwrap().as_ref() {
                self.seen_states.lock().unwrap().push(*rx.borrow());
            }
        }

        fn create_count(&self) -> usize {
            self.create.lock().unwrap().len()
        }

        fn sign_in_count(&self) -> usize {
            self.sign_in.lock().unwrap().len()
        }

        fn check_count(&self) -> usize {
            *self.check.lock().unwrap()
        }

        fn notices(&self) -> Vec<String> {
            self.notices.lock().unwrap().clone()
        }

        fn routes(&self) -> Vec<String> {
            self.routes.lock().unwrap().clone()
        }
    }

    struct MockService {
        calls: Calls,
        account: bool,
        session: bool,
        authenticated: bool,
    }

    #[async_trait::async_trait]
    impl AccountService for MockService {
        async fn create_account(&self, input: &RegistrationInput) -> Option<AccountRecord> {
            self.calls.observe_state();
            self.calls.create.lock().unwrap().push(input.clone());
            self.account.then(|| AccountRecord {
                id: "acc-1".to_string(),
                name: input.name.clone(),
                email: input.email.clone(),
                created_at: None,
            })
        }

        async fn sign_in(&self, credentials: &SignInInput) -> Option<SessionHandle> {
            self.calls.observe_state();
            self.calls.sign_in.lock().unwrap().push(credentials.clone());
            self.session.then(|| SessionHandle {
                id: "sess-1".to_string(),
                user_id: "acc-1".to_string(),
                expire: None,
            })
        }

        async fn check_current_user(&self) -> bool {
            self.calls.observe_state();
            *self.calls.check.lock().unwrap() += 1;
            self.authenticated
        }
    }

    struct MockNotifier(Calls);

    impl Notifier for MockNotifier {
        fn notify(&self, message: &str) {
            self.0.notices.lock().unwrap().push(message.to_string());
        }
    }

    struct MockNavigator(Calls);

    impl Navigator for MockNavigator {
        fn navigate(&self, route: &str) {
            self.0.routes.lock().unwrap().push(route.to_string());
        }
    }

    fn flow(
        account: bool,
        session: bool,
        authenticated: bool,
    ) -> (RegistrationFlow<MockService, MockNotifier, MockNavigator>, Calls) {
        let calls = Calls::default();
        let service = MockService {
            calls: calls.clone(),
            account,
            session,
            authenticated,
        };
        let flow = RegistrationFlow::new(
            service,
            MockNotifier(calls.clone()),
            MockNavigator(calls.clone()),
        );
        (flow, calls)
    }

    fn fill_valid(flow: &mut RegistrationFlow<MockService, MockNotifier, MockNavigator>) {
        flow.on_field_change(Field::Name, "Ada Lovelace");
        flow.on_field_change(Field::Username, "ada");
        flow.on_field_change(Field::Email, "ada@example.com");
        flow.on_field_change(Field::Password, "analytical");
    }

    #[tokio::test]
    async fn test_create_account_failure_stops_the_attempt() {
        let (mut flow, calls) = flow(false, true, true);
        fill_valid(&mut flow);

        let outcome = flow.on_submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed(Stage::CreatingAccount));
        assert_eq!(calls.notices(), vec![SIGN_UP_FAILED.to_string()]);
        assert_eq!(calls.create_count(), 1);
        assert_eq!(calls.sign_in_count(), 0);
        assert_eq!(calls.check_count(), 0);
        assert!(calls.routes().is_empty());
        assert_eq!(flow.state(), FlowState::Failed(Stage::CreatingAccount));
    }

    #[tokio::test]
    async fn test_sign_in_failure_skips_auth_check() {
        let (mut flow, calls) = flow(true, false, true);
        fill_valid(&mut flow);

        let outcome = flow.on_submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed(Stage::SigningIn));
        assert_eq!(calls.notices(), vec![SIGN_IN_FAILED.to_string()]);
        assert_eq!(calls.sign_in_count(), 1);
        assert_eq!(calls.check_count(), 0);
        assert!(calls.routes().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_uses_submitted_credentials() {
        let (mut flow, calls) = flow(true, false, true);
        fill_valid(&mut flow);

        flow.on_submit().await;

        let sent = calls.sign_in.lock().unwrap().clone();
        assert_eq!(sent[0].email, "ada@example.com");
        assert_eq!(sent[0].password, "analytical");
    }

    #[tokio::test]
    async fn test_auth_check_failure_keeps_form() {
        let (mut flow, calls) = flow(true, true, false);
        fill_valid(&mut flow);

        let outcome = flow.on_submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed(Stage::CheckingAuth));
        assert_eq!(calls.notices(), vec![AUTH_CHECK_FAILED.to_string()]);
        assert!(calls.routes().is_empty());
        assert_eq!(flow.form().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_success_resets_form_and_navigates_once() {
        let (mut flow, calls) = flow(true, true, true);
        fill_valid(&mut flow);

        let outcome = flow.on_submit().await;

        assert_eq!(outcome, SubmitOutcome::Success);
        assert_eq!(flow.form(), &RegistrationInput::default());
        assert_eq!(calls.routes(), vec!["/".to_string()]);
        assert!(calls.notices().is_empty());
        assert_eq!(calls.check_count(), 1);
        assert_eq!(flow.state(), FlowState::Idle);
        assert!(!flow.state().is_submitting());
    }

    #[tokio::test]
    async fn test_state_watcher_sees_each_stage_in_flight() {
        let (mut flow, calls) = flow(true, true, true);
        let rx = flow.watch_state();
        *calls.watcher.lock().unwrap() = Some(flow.watch_state());
        fill_valid(&mut flow);

        flow.on_submit().await;

        let seen = calls.seen_states.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                FlowState::Submitting(Stage::CreatingAccount),
                FlowState::Submitting(Stage::SigningIn),
                FlowState::Submitting(Stage::CheckingAuth),
            ]
        );
        assert!(seen.iter().all(FlowState::is_submitting));
        assert!(!rx.borrow().is_submitting());
        assert_eq!(*rx.borrow(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_state_watcher_sees_failure() {
        let (mut flow, calls) = flow(true, false, true);
        let rx = flow.watch_state();
        *calls.watcher.lock().unwrap() = Some(flow.watch_state());
        fill_valid(&mut flow);

        flow.on_submit().await;

        assert_eq!(
            calls.seen_states.lock().unwrap().clone(),
            vec![
                FlowState::Submitting(Stage::CreatingAccount),
                FlowState::Submitting(Stage::SigningIn),
            ]
        );
        assert_eq!(*rx.borrow(), FlowState::Failed(Stage::SigningIn));
    }

    #[tokio::test]
    async fn test_custom_landing_route() {
        let (flow, calls) = flow(true, true, true);
        let mut flow = flow.landing_route("/home");
        fill_valid(&mut flow);

        flow.on_submit().await;

        assert_eq!(calls.routes(), vec!["/home".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_form_calls_nothing() {
        let (mut flow, calls) = flow(true, true, true);
        flow.on_field_change(Field::Email, "not-an-email");

        let outcome = flow.on_submit().await;

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.get(Field::Name), Some(TOO_SHORT));
                assert_eq!(errors.get(Field::Username), Some(TOO_SHORT));
                assert_eq!(errors.get(Field::Email), Some(INVALID_EMAIL));
            }
            other => panic!("expected invalid outcome, got {:?}", other),
        }
        assert_eq!(calls.create_count(), 0);
        assert!(calls.notices().is_empty());
        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(flow.errors().len(), 3);
    }

    #[test]
    fn test_field_change_is_idempotent() {
        let (mut flow, _calls) = flow(true, true, true);

        flow.on_field_change(Field::Name, "A");
        let first = flow.errors().clone();
        flow.on_field_change(Field::Name, "A");
        flow.on_field_change(Field::Name, "A");

        assert_eq!(flow.errors(), &first);
        assert_eq!(first.get(Field::Name), Some(TOO_SHORT));
    }

    #[test]
    fn test_field_change_revalidates_only_that_field() {
        let (mut flow, _calls) = flow(true, true, true);

        flow.on_field_change(Field::Email, "bad");
        flow.on_field_change(Field::Name, "Ada");

        assert_eq!(flow.errors().get(Field::Email), Some(INVALID_EMAIL));
        assert_eq!(flow.errors().get(Field::Name), None);
        // untouched fields are not reported yet
        assert_eq!(flow.errors().get(Field::Username), None);

        flow.on_field_change(Field::Email, "ada@example.com");
        assert!(flow.errors().is_empty());
    }

    #[tokio::test]
    async fn test_editing_after_failure_returns_to_idle() {
        let (mut flow, _calls) = flow(false, true, true);
        fill_valid(&mut flow);

        flow.on_submit().await;
        assert_eq!(flow.state(), FlowState::Failed(Stage::CreatingAccount));

        flow.on_field_change(Field::Username, "ada2");
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn test_manual_resubmit_runs_a_fresh_attempt() {
        let (mut flow, calls) = flow(false, true, true);
        fill_valid(&mut flow);

        flow.on_submit().await;
        flow.on_submit().await;

        assert_eq!(calls.create_count(), 2);
        assert_eq!(calls.notices().len(), 2);
    }
}
