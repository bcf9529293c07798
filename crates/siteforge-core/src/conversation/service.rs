//! Turn handling: the transition table plus the generation pipeline.

use std::time::Duration;

use chrono::Utc;

use siteforge_types::error::{GenerationError, TurnError};
use siteforge_types::message::InboundMessage;
use siteforge_types::project::{Project, ProjectId};
use siteforge_types::prompt::PromptRecord;
use siteforge_types::site::{DeployMetadata, DeployRequest};
use siteforge_types::user::{ConversationState, Platform, User};

use crate::conversation::locks::TurnLocks;
use crate::conversation::replies;
use crate::deploy::DeployTrigger;
use crate::generate::SiteGenerator;
use crate::notify::Notifier;
use crate::outbound::MessageSender;
use crate::packager;
use crate::parser;
use crate::prompt;
use crate::repository::project::ProjectRepository;
use crate::repository::prompt::PromptRepository;
use crate::repository::user::UserRepository;
use crate::storage::SiteStore;

/// What one turn reported back to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn ran to completion, including any generation pipeline.
    Completed,
    /// The turn failed; the user got a generic failure notice.
    Failed,
    /// The payload was malformed; nothing happened, no reply was sent.
    Rejected,
}

impl TurnOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }
}

/// The conversation state machine.
///
/// Generic over repository and capability traits to keep the core free of
/// infrastructure; the application layer pins these to concrete adapters.
/// One instance serves one platform (its channel identity namespace).
pub struct ConversationService<U, P, L, G, M, S, D>
where
    U: UserRepository,
    P: ProjectRepository,
    L: PromptRepository,
    G: SiteGenerator,
    M: MessageSender,
    S: SiteStore,
    D: DeployTrigger,
{
    users: U,
    projects: P,
    prompts: L,
    generator: G,
    notifier: Notifier<M>,
    store: S,
    deployer: D,
    platform: Platform,
    generation_timeout: Duration,
    locks: TurnLocks,
}

impl<U, P, L, G, M, S, D> ConversationService<U, P, L, G, M, S, D>
where
    U: UserRepository,
    P: ProjectRepository,
    L: PromptRepository,
    G: SiteGenerator,
    M: MessageSender,
    S: SiteStore,
    D: DeployTrigger,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: U,
        projects: P,
        prompts: L,
        generator: G,
        notifier: Notifier<M>,
        store: S,
        deployer: D,
        platform: Platform,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            users,
            projects,
            prompts,
            generator,
            notifier,
            store,
            deployer,
            platform,
            generation_timeout,
            locks: TurnLocks::new(),
        }
    }

    /// Handle one inbound message. Never panics and never returns an error:
    /// every failure is converted into a logged outcome, and all but
    /// payload rejection produce one user-facing notice.
    pub async fn handle_turn(&self, message: &InboundMessage) -> TurnOutcome {
        if let Err(err) = message.validate() {
            tracing::warn!(error = %err, "rejected invalid inbound payload");
            return TurnOutcome::Rejected;
        }

        // One turn per sender at a time: concurrent deliveries for the same
        // address serialize here instead of racing on the persisted state.
        let _turn = self.locks.acquire(&message.sender_address).await;

        match self.run_turn(message).await {
            Ok(()) => TurnOutcome::Completed,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    sender = %message.sender_address,
                    "turn failed"
                );
                self.notifier
                    .notify(
                        &message.recipient_address,
                        &message.sender_address,
                        replies::TRY_AGAIN,
                    )
                    .await;
                TurnOutcome::Failed
            }
        }
    }

    async fn run_turn(&self, message: &InboundMessage) -> Result<(), TurnError> {
        let from = &message.recipient_address;
        let to = &message.sender_address;

        let existing = self
            .users
            .find_by_address(self.platform, &message.sender_address)
            .await?;

        // First contact: register and ask for a project name. The body is
        // irrelevant on this turn.
        let Some(user) = existing else {
            let user = User::register(
                self.platform,
                &message.sender_address,
                message.sender_display_name.as_deref(),
            );
            self.users.create(&user).await?;
            self.notifier.notify(from, to, replies::WELCOME).await;
            return Ok(());
        };

        // Case-normalized command text. The raw body only matters inside an
        // active project, where it becomes the generation prompt.
        let command = message.body_text.trim().to_lowercase();

        // "menu" overrides whatever state the user is in.
        if command == "menu" {
            self.users
                .update_state(&user.id, Some(&ConversationState::WaitingForOption))
                .await?;
            self.notifier.notify(from, to, replies::MENU).await;
            return Ok(());
        }

        match user.state.clone() {
            Some(ConversationState::WaitingForProjectName) => {
                self.create_project(&user, message).await
            }
            Some(ConversationState::WaitingForOption) => {
                self.pick_option(&user, &command, from, to).await
            }
            Some(ConversationState::WaitingForProjectSelection) => {
                self.pick_project(&user, &command, from, to).await
            }
            Some(ConversationState::ActiveProject(project_id)) => {
                self.generation_turn(&user, &project_id, message).await
            }
            // Undefined state: reset to the menu.
            None => {
                self.users
                    .update_state(&user.id, Some(&ConversationState::WaitingForOption))
                    .await?;
                self.notifier.notify(from, to, replies::MENU).await;
                Ok(())
            }
        }
    }

    async fn create_project(
        &self,
        user: &User,
        message: &InboundMessage,
    ) -> Result<(), TurnError> {
        let name = message.body_text.trim();
        let project = self.projects.create(&Project::new(user.id.clone(), name)).await?;

        self.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await?;

        self.notifier
            .notify(
                &message.recipient_address,
                &message.sender_address,
                replies::PROJECT_CREATED,
            )
            .await;
        Ok(())
    }

    async fn pick_option(
        &self,
        user: &User,
        command: &str,
        from: &str,
        to: &str,
    ) -> Result<(), TurnError> {
        match command {
            "1" => {
                self.users
                    .update_state(&user.id, Some(&ConversationState::WaitingForProjectName))
                    .await?;
                self.notifier.notify(from, to, replies::ASK_PROJECT_NAME).await;
            }
            "2" => {
                let projects = self.projects.list_for_user(&user.id).await?;
                if projects.is_empty() {
                    // State unchanged; the user has nothing to resume.
                    self.notifier.notify(from, to, replies::NO_PROJECTS).await;
                } else {
                    self.users
                        .update_state(
                            &user.id,
                            Some(&ConversationState::WaitingForProjectSelection),
                        )
                        .await?;
                    self.notifier
                        .notify(from, to, &replies::project_list(&projects))
                        .await;
                }
            }
            _ => {
                self.notifier.notify(from, to, replies::INVALID_OPTION).await;
            }
        }
        Ok(())
    }

    async fn pick_project(
        &self,
        user: &User,
        command: &str,
        from: &str,
        to: &str,
    ) -> Result<(), TurnError> {
        let Ok(selection) = command.parse::<usize>() else {
            self.notifier.notify(from, to, replies::REPLY_WITH_NUMBER).await;
            return Ok(());
        };

        // 1-based index into the most-recent-first list the user was shown,
        // validated before any lookup.
        let projects = self.projects.list_for_user(&user.id).await?;
        if selection == 0 || selection > projects.len() {
            self.notifier.notify(from, to, replies::INVALID_SELECTION).await;
            return Ok(());
        }

        let selected = &projects[selection - 1];
        self.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(selected.id.clone())),
            )
            .await?;
        self.notifier
            .notify(from, to, &replies::resuming(&selected.name))
            .await;
        Ok(())
    }

    async fn generation_turn(
        &self,
        user: &User,
        project_id: &ProjectId,
        message: &InboundMessage,
    ) -> Result<(), TurnError> {
        let from = &message.recipient_address;
        let to = &message.sender_address;

        let Some(project) = self.projects.get_by_id(project_id).await? else {
            // The active project vanished; fall back to the menu.
            self.users
                .update_state(&user.id, Some(&ConversationState::WaitingForOption))
                .await?;
            self.notifier.notify(from, to, replies::PROJECT_NOT_FOUND).await;
            self.notifier.notify(from, to, replies::MENU).await;
            return Ok(());
        };

        self.notifier.notify(from, to, replies::WORKING).await;

        let url = self.generate_and_publish(user, &project, message).await?;
        self.notifier.notify(from, to, &replies::site_live(&url)).await;
        Ok(())
    }

    /// The generation pipeline: prompt -> model -> parse -> record -> package
    /// -> upload -> deploy. Strictly sequenced; any failure aborts the rest
    /// of the pipeline but already-written records stay.
    async fn generate_and_publish(
        &self,
        user: &User,
        project: &Project,
        message: &InboundMessage,
    ) -> Result<String, TurnError> {
        let rendered =
            prompt::build_site_prompt(&message.body_text, project.last_ai_summary.as_deref());

        let secs = self.generation_timeout.as_secs();
        let response =
            match tokio::time::timeout(self.generation_timeout, self.generator.generate(&rendered))
                .await
            {
                Ok(result) => result.map_err(TurnError::Generation)?,
                Err(_) => return Err(GenerationError::Timeout { secs }.into()),
            };

        let bundle = parser::parse_site_response(&response).map_err(GenerationError::from)?;

        // The conversational exchange is durable from here on: upload or
        // deploy failures do not roll this record back.
        let record = PromptRecord::new(
            user.id.clone(),
            project.id.clone(),
            &message.channel_message_id,
            &message.body_text,
            Some(response),
        );
        self.prompts.create(&record).await?;

        let archive = packager::package_site(&bundle, &user.id)?;

        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let object_key = format!("{}/{}/{}/site.zip", user.id, project.name, stamp);
        let public_url = self.store.upload(&object_key, archive.bytes).await?;

        let request = DeployRequest {
            username: user.phone_number.clone(),
            project_name: project.name.clone(),
            prompt: message.body_text.clone(),
            metadata: DeployMetadata {
                source: self.platform.to_string(),
                message_id: message.channel_message_id.clone(),
                profile_name: user.display_name.clone(),
                project_id: project.id.to_string(),
                last_ai_summary: project.last_ai_summary.clone(),
            },
        };
        let status = self.deployer.deploy(&request).await?;
        if status.is_error() {
            return Err(TurnError::Delivery(format!(
                "deploy reported status '{}'",
                status.status
            )));
        }

        // Context for the next turn. The site is already live, so a failed
        // summary write is logged rather than failing the turn.
        if let Err(err) = self
            .projects
            .update_summary(&project.id, &message.body_text)
            .await
        {
            tracing::warn!(error = %err, project = %project.id, "failed to update project summary");
        }

        Ok(status.url.unwrap_or(public_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use siteforge_types::error::{DeployError, RepositoryError, SendError, StorageError};
    use siteforge_types::site::DeployStatus;
    use siteforge_types::user::UserId;

    const SENDER: &str = "whatsapp:+1555";
    const RECIPIENT: &str = "whatsapp:+1456";

    const FENCED_RESPONSE: &str =
        "```html\n<h1>Cakes</h1>\n```css\nh1 { color: pink; }\n```javascript\nconsole.log('hi');\n```";

    #[derive(Clone, Default)]
    struct FakeUsers {
        rows: Arc<Mutex<Vec<User>>>,
    }

    impl UserRepository for FakeUsers {
        async fn find_by_address(
            &self,
            platform: Platform,
            phone_number: &str,
        ) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.platform == platform && u.phone_number == phone_number)
                .cloned())
        }

        async fn create(&self, user: &User) -> Result<User, RepositoryError> {
            self.rows.lock().unwrap().push(user.clone());
            Ok(user.clone())
        }

        async fn update_state(
            &self,
            id: &UserId,
            state: Option<&ConversationState>,
        ) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let user = rows
                .iter_mut()
                .find(|u| &u.id == id)
                .ok_or(RepositoryError::NotFound)?;
            user.state = state.cloned();
            Ok(())
        }
    }

    impl FakeUsers {
        fn single(&self) -> User {
            let rows = self.rows.lock().unwrap();
            assert_eq!(rows.len(), 1, "expected exactly one user");
            rows[0].clone()
        }
    }

    #[derive(Clone, Default)]
    struct FakeProjects {
        rows: Arc<Mutex<Vec<Project>>>,
    }

    impl ProjectRepository for FakeProjects {
        async fn create(&self, project: &Project) -> Result<Project, RepositoryError> {
            self.rows.lock().unwrap().push(project.clone());
            Ok(project.clone())
        }

        async fn get_by_id(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.id == id)
                .cloned())
        }

        async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Project>, RepositoryError> {
            let mut rows: Vec<Project> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| &p.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
            Ok(rows)
        }

        async fn update_summary(
            &self,
            id: &ProjectId,
            summary: &str,
        ) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let project = rows
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or(RepositoryError::NotFound)?;
            project.last_ai_summary = Some(summary.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakePrompts {
        rows: Arc<Mutex<Vec<PromptRecord>>>,
    }

    impl PromptRepository for FakePrompts {
        async fn create(&self, record: &PromptRecord) -> Result<PromptRecord, RepositoryError> {
            self.rows.lock().unwrap().push(record.clone());
            Ok(record.clone())
        }
    }

    enum FakeGenerator {
        Respond(String),
        Fail,
        Hang,
    }

    impl SiteGenerator for FakeGenerator {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            match self {
                FakeGenerator::Respond(text) => Ok(text.clone()),
                FakeGenerator::Fail => Err(GenerationError::Provider {
                    message: "upstream 500".to_string(),
                }),
                FakeGenerator::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("generation should have timed out")
                }
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl MessageSender for RecordingSender {
        async fn send(&self, _from: &str, _to: &str, text: &str) -> Result<(), SendError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl RecordingSender {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    struct FakeStore;

    impl SiteStore for FakeStore {
        async fn upload(&self, object_key: &str, _bytes: Vec<u8>) -> Result<String, StorageError> {
            Ok(format!("https://cdn.test/{object_key}"))
        }
    }

    struct FakeDeploy {
        status: &'static str,
        url: Option<&'static str>,
    }

    impl DeployTrigger for FakeDeploy {
        async fn deploy(&self, _request: &DeployRequest) -> Result<DeployStatus, DeployError> {
            Ok(DeployStatus {
                status: self.status.to_string(),
                url: self.url.map(str::to_string),
            })
        }
    }

    type TestService = ConversationService<
        FakeUsers,
        FakeProjects,
        FakePrompts,
        FakeGenerator,
        RecordingSender,
        FakeStore,
        FakeDeploy,
    >;

    struct Harness {
        users: FakeUsers,
        projects: FakeProjects,
        prompts: FakePrompts,
        sender: RecordingSender,
        service: TestService,
    }

    fn harness_with(generator: FakeGenerator, deploy: FakeDeploy) -> Harness {
        let users = FakeUsers::default();
        let projects = FakeProjects::default();
        let prompts = FakePrompts::default();
        let sender = RecordingSender::default();

        let service = ConversationService::new(
            users.clone(),
            projects.clone(),
            prompts.clone(),
            generator,
            Notifier::new(sender.clone()),
            FakeStore,
            deploy,
            Platform::Whatsapp,
            Duration::from_secs(30),
        );

        Harness {
            users,
            projects,
            prompts,
            sender,
            service,
        }
    }

    fn harness() -> Harness {
        harness_with(
            FakeGenerator::Respond(FENCED_RESPONSE.to_string()),
            FakeDeploy {
                status: "success",
                url: Some("https://site.test/deployed"),
            },
        )
    }

    fn inbound(body: &str) -> InboundMessage {
        InboundMessage {
            channel_message_id: "SM1".to_string(),
            sender_address: SENDER.to_string(),
            recipient_address: RECIPIENT.to_string(),
            sender_display_name: Some("Ada".to_string()),
            body_text: body.to_string(),
        }
    }

    /// Seed a registered user in the given state, bypassing the welcome turn.
    async fn seed_user(h: &Harness, state: Option<ConversationState>) -> User {
        let mut user = User::register(Platform::Whatsapp, SENDER, Some("Ada"));
        user.state = state;
        h.users.create(&user).await.unwrap();
        user
    }

    async fn seed_project(h: &Harness, user: &User, name: &str) -> Project {
        h.projects
            .create(&Project::new(user.id.clone(), name))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_sender_registers_user() {
        for body in ["hello", "menu", "2"] {
            let h = harness();
            let outcome = h.service.handle_turn(&inbound(body)).await;

            assert_eq!(outcome, TurnOutcome::Completed);
            let user = h.users.single();
            assert_eq!(user.state, Some(ConversationState::WaitingForProjectName));
            assert_eq!(h.sender.texts(), vec![replies::WELCOME.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_menu_overrides_any_state() {
        let h = harness();
        seed_user(&h, Some(ConversationState::ActiveProject(ProjectId::new()))).await;

        let outcome = h.service.handle_turn(&inbound("  MeNu  ")).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForOption)
        );
        assert_eq!(h.sender.texts(), vec![replies::MENU.to_string()]);
    }

    #[tokio::test]
    async fn test_project_name_creates_active_project() {
        let h = harness();
        seed_user(&h, Some(ConversationState::WaitingForProjectName)).await;

        let outcome = h.service.handle_turn(&inbound("My Bakery Site")).await;

        assert_eq!(outcome, TurnOutcome::Completed);

        let projects = h.projects.rows.lock().unwrap().clone();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "My Bakery Site");

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::ActiveProject(projects[0].id.clone()))
        );
        assert_eq!(h.sender.texts(), vec![replies::PROJECT_CREATED.to_string()]);
    }

    #[tokio::test]
    async fn test_option_one_asks_for_name() {
        let h = harness();
        seed_user(&h, Some(ConversationState::WaitingForOption)).await;

        h.service.handle_turn(&inbound("1")).await;

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForProjectName)
        );
        assert_eq!(h.sender.texts(), vec![replies::ASK_PROJECT_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_option_two_with_no_projects() {
        let h = harness();
        seed_user(&h, Some(ConversationState::WaitingForOption)).await;

        let outcome = h.service.handle_turn(&inbound("2")).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForOption),
            "state must not change when there is nothing to resume"
        );
        assert_eq!(h.sender.texts(), vec![replies::NO_PROJECTS.to_string()]);
    }

    #[tokio::test]
    async fn test_option_two_lists_projects() {
        let h = harness();
        let user = seed_user(&h, Some(ConversationState::WaitingForOption)).await;
        seed_project(&h, &user, "First").await;
        seed_project(&h, &user, "Second").await;

        h.service.handle_turn(&inbound("2")).await;

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForProjectSelection)
        );
        let texts = h.sender.texts();
        assert_eq!(texts.len(), 1);
        // Most recent first.
        assert!(texts[0].contains("1. Second"));
        assert!(texts[0].contains("2. First"));
    }

    #[tokio::test]
    async fn test_unknown_option_rejected() {
        let h = harness();
        seed_user(&h, Some(ConversationState::WaitingForOption)).await;

        h.service.handle_turn(&inbound("3")).await;

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForOption)
        );
        assert_eq!(h.sender.texts(), vec![replies::INVALID_OPTION.to_string()]);
    }

    #[tokio::test]
    async fn test_selection_in_range_resumes() {
        let h = harness();
        let user = seed_user(&h, Some(ConversationState::WaitingForProjectSelection)).await;
        seed_project(&h, &user, "First").await;
        let second = seed_project(&h, &user, "Second").await;

        h.service.handle_turn(&inbound("1")).await;

        // "1" is the most recent project.
        assert_eq!(
            h.users.single().state,
            Some(ConversationState::ActiveProject(second.id.clone()))
        );
        assert_eq!(h.sender.texts(), vec![replies::resuming("Second")]);
    }

    #[tokio::test]
    async fn test_selection_out_of_range_rejected() {
        let h = harness();
        let user = seed_user(&h, Some(ConversationState::WaitingForProjectSelection)).await;
        seed_project(&h, &user, "Only").await;

        for body in ["0", "2", "99"] {
            h.service.handle_turn(&inbound(body)).await;
            assert_eq!(
                h.users.single().state,
                Some(ConversationState::WaitingForProjectSelection)
            );
        }
        assert_eq!(
            h.sender.texts(),
            vec![replies::INVALID_SELECTION.to_string(); 3]
        );
    }

    #[tokio::test]
    async fn test_selection_non_integer_rejected() {
        let h = harness();
        let user = seed_user(&h, Some(ConversationState::WaitingForProjectSelection)).await;
        seed_project(&h, &user, "Only").await;

        h.service.handle_turn(&inbound("the first one")).await;

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForProjectSelection)
        );
        assert_eq!(h.sender.texts(), vec![replies::REPLY_WITH_NUMBER.to_string()]);
    }

    #[tokio::test]
    async fn test_generation_turn_happy_path() {
        let h = harness();
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Completed);

        // Working notice strictly before the terminal notice.
        let texts = h.sender.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], replies::WORKING);
        assert_eq!(texts[1], replies::site_live("https://site.test/deployed"));

        // One prompt record with the stored model response.
        let prompts = h.prompts.rows.lock().unwrap().clone();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].prompt_text, "make it pink");
        assert_eq!(prompts[0].model_response.as_deref(), Some(FENCED_RESPONSE));

        // Summary carried forward for the next turn.
        let stored = h.projects.get_by_id(&project.id).await.unwrap().unwrap();
        assert_eq!(stored.last_ai_summary.as_deref(), Some("make it pink"));

        // State stays on the same active project.
        assert_eq!(
            h.users.single().state,
            Some(ConversationState::ActiveProject(project.id))
        );
    }

    #[tokio::test]
    async fn test_generation_turn_falls_back_to_storage_url() {
        let h = harness_with(
            FakeGenerator::Respond(FENCED_RESPONSE.to_string()),
            FakeDeploy {
                status: "success",
                url: None,
            },
        );
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        h.service.handle_turn(&inbound("make it pink")).await;

        let texts = h.sender.texts();
        assert!(texts[1].contains("https://cdn.test/"));
        assert!(texts[1].contains("/site.zip"));
    }

    #[tokio::test]
    async fn test_generation_failure_sends_try_again() {
        let h = harness_with(
            FakeGenerator::Fail,
            FakeDeploy {
                status: "success",
                url: None,
            },
        );
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(
            h.sender.texts(),
            vec![replies::WORKING.to_string(), replies::TRY_AGAIN.to_string()]
        );
        // No prompt record, no project mutation.
        assert!(h.prompts.rows.lock().unwrap().is_empty());
        let stored = h.projects.get_by_id(&project.id).await.unwrap().unwrap();
        assert!(stored.last_ai_summary.is_none());
    }

    #[tokio::test]
    async fn test_unparsable_response_is_generation_failure() {
        let h = harness_with(
            FakeGenerator::Respond("Sorry, I can't help with that.".to_string()),
            FakeDeploy {
                status: "success",
                url: None,
            },
        );
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Failed);
        // Parsing failed, so nothing downstream of the parser ran.
        assert!(h.prompts.rows.lock().unwrap().is_empty());
        assert_eq!(
            h.sender.texts(),
            vec![replies::WORKING.to_string(), replies::TRY_AGAIN.to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout_fails_the_turn() {
        let h = harness_with(
            FakeGenerator::Hang,
            FakeDeploy {
                status: "success",
                url: None,
            },
        );
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(
            h.sender.texts(),
            vec![replies::WORKING.to_string(), replies::TRY_AGAIN.to_string()]
        );
    }

    #[tokio::test]
    async fn test_deploy_error_status_keeps_prompt_record() {
        let h = harness_with(
            FakeGenerator::Respond(FENCED_RESPONSE.to_string()),
            FakeDeploy {
                status: "error",
                url: None,
            },
        );
        let user = seed_user(&h, None).await;
        let project = seed_project(&h, &user, "Bakery").await;
        h.users
            .update_state(
                &user.id,
                Some(&ConversationState::ActiveProject(project.id.clone())),
            )
            .await
            .unwrap();

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Failed);
        // Delivery failed after the record was written; it is not rolled back.
        assert_eq!(h.prompts.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_active_project_missing_falls_back_to_menu() {
        let h = harness();
        seed_user(&h, Some(ConversationState::ActiveProject(ProjectId::new()))).await;

        let outcome = h.service.handle_turn(&inbound("make it pink")).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForOption)
        );
        assert_eq!(
            h.sender.texts(),
            vec![
                replies::PROJECT_NOT_FOUND.to_string(),
                replies::MENU.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_undefined_state_shows_menu() {
        let h = harness();
        seed_user(&h, None).await;

        h.service.handle_turn(&inbound("hello?")).await;

        assert_eq!(
            h.users.single().state,
            Some(ConversationState::WaitingForOption)
        );
        assert_eq!(h.sender.texts(), vec![replies::MENU.to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected_without_side_effects() {
        let h = harness();

        let mut message = inbound("");
        let outcome = h.service.handle_turn(&message).await;
        assert_eq!(outcome, TurnOutcome::Rejected);

        message = inbound("hello");
        message.sender_address = String::new();
        let outcome = h.service.handle_turn(&message).await;
        assert_eq!(outcome, TurnOutcome::Rejected);

        assert!(h.users.rows.lock().unwrap().is_empty());
        assert!(h.sender.texts().is_empty());
    }
}
