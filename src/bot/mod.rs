//! The conversational bot.
//!
//! Owns the per-user context and the collaborators a turn may reach:
//! chat completion, a sentiment backend and (optionally) the query store.
//! A bot can only be built with a [`Consented`] token.

pub mod activity;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::consent::{self, ConsentError, ConsentGate, Consented};
use crate::context::{is_end_request, ConversationContext, TurnRecord};
use crate::inference::{
    question_messages, ChatCompletion, InferenceError, Message, DEFAULT_SYSTEM_PROMPT,
};
use crate::sentiment::SentimentAnalyzer;
use crate::store::{QueryStore, Row, TableInfo};

pub use activity::{Activity, ActivityType, ChannelAccount};

/// Sent for any failure while handling a turn.
pub const GENERIC_ERROR: &str = "An error occurred. Please try again later.";

/// Sent when the completion endpoint gave up.
pub const GENERATION_FAILED: &str = "Sorry, I couldn't generate a response at this time.";

pub const ENDING_CONVERSATION: &str = "Ending conversation from the skill...";

#[derive(Debug, Error)]
pub enum BotError {
    #[error("activity has no sender id")]
    MissingSender,

    #[error("activity has no text")]
    MissingText,
}

pub struct Bot {
    context: Mutex<ConversationContext>,
    chat: Arc<dyn ChatCompletion>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    store: Option<Arc<dyn QueryStore>>,
}

impl Bot {
    pub fn new(
        _consent: Consented,
        chat: Arc<dyn ChatCompletion>,
        sentiment: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            context: Mutex::new(ConversationContext::new()),
            chat,
            sentiment,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn QueryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Copy of the user's history.
    pub fn history(&self, user_id: &str) -> Vec<TurnRecord> {
        self.context.lock().get(user_id).to_vec()
    }

    /// Number of users with a live conversation.
    pub fn active_users(&self) -> usize {
        self.context.lock().len()
    }

    fn record(&self, user_id: &str, record: TurnRecord) {
        self.context.lock().append(user_id, record);
    }

    fn render(&self, user_id: &str) -> String {
        self.context.lock().render(user_id)
    }

    // ------------------------------------------------------------------------
    // Turn handling
    // ------------------------------------------------------------------------

    /// Handle one inbound activity and return the activities to send back.
    pub async fn on_message_activity(&self, activity: &Activity) -> Vec<Activity> {
        match self.handle_turn(activity).await {
            Ok(outbound) => outbound,
            Err(e) => {
                log::error!("An error occurred: {}", e);
                vec![Activity::text(GENERIC_ERROR)]
            }
        }
    }

    async fn handle_turn(&self, activity: &Activity) -> Result<Vec<Activity>, BotError> {
        let user_id = activity.user_id().ok_or(BotError::MissingSender)?;
        let text = activity.text.as_deref().ok_or(BotError::MissingText)?;
        self.context.lock().ensure(user_id);

        if is_end_request(text) {
            self.context.lock().remove(user_id);
            log::info!("Ended conversation for user_id: {}", user_id);
            return Ok(vec![
                Activity::text(ENDING_CONVERSATION),
                Activity::end_of_conversation(),
            ]);
        }

        self.record(user_id, TurnRecord::message(text));
        let response = self.generate_response(text, user_id).await;
        Ok(vec![Activity::text(response)])
    }

    /// The prompt sent for a turn: the user's text plus their whole history.
    pub fn response_messages(&self, text: &str, user_id: &str) -> Vec<Message> {
        vec![
            Message::system(DEFAULT_SYSTEM_PROMPT),
            Message::user(format!(
                "User: {}\nContext: {}\nBot:",
                text,
                self.render(user_id)
            )),
        ]
    }

    /// Ask the completion endpoint for a reply. The context lock is released
    /// before the request goes out.
    pub async fn generate_response(&self, text: &str, user_id: &str) -> String {
        log::info!(
            "Generating response for user_id: {} with text: {}",
            user_id,
            text
        );
        let messages = self.response_messages(text, user_id);
        match self.chat.complete(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Error generating response: {}", e);
                GENERATION_FAILED.to_string()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Context enrichment
    // ------------------------------------------------------------------------

    /// Score `text` and keep it with its sentiment.
    pub fn enhance_context_awareness(&self, user_id: &str, text: &str) {
        let result = self.sentiment.analyze(text);
        self.record(
            user_id,
            TurnRecord::Sentiment {
                text: text.to_string(),
                result,
            },
        );
    }

    pub fn proactive_learning(&self, user_id: &str, feedback: &str) {
        self.record(user_id, TurnRecord::feedback(feedback));
    }

    pub fn ethical_decision_making(&self, user_id: &str, decision: &str) {
        let text = format!("Considering ethical principles, the decision is: {}", decision);
        self.record(user_id, TurnRecord::EthicalDecision { text });
    }

    /// Reflect the user's sentiment back to them.
    ///
    /// Reports the backend's headline score, which is the compound score for
    /// the intensity backend the binaries build the bot with. The score keeps
    /// its decimal point (`0.0`, not `0`).
    pub fn emotional_intelligence(&self, user_id: &str, text: &str) -> String {
        let score = self.sentiment.analyze(text).headline();
        let response = format!(
            "I sense that you are feeling {:?}. How can I assist you further?",
            score
        );
        self.record(
            user_id,
            TurnRecord::EmotionalResponse {
                text: response.clone(),
            },
        );
        response
    }

    /// Explain a decision by quoting the history as it stood before the
    /// explanation is recorded.
    pub fn transparency_and_explainability(&self, user_id: &str, _decision: &str) -> String {
        let mut ctx = self.context.lock();
        let explanation = format!(
            "The decision was made based on the following context: {}",
            ctx.render(user_id)
        );
        ctx.append(user_id, TurnRecord::explanation(explanation.clone()));
        explanation
    }

    /// Record an action the bot took on the user's behalf.
    pub fn record_action(&self, user_id: &str, action: &str) {
        self.record(
            user_id,
            TurnRecord::Action {
                text: action.to_string(),
            },
        );
    }

    // ------------------------------------------------------------------------
    // Collaborator pass-throughs
    // ------------------------------------------------------------------------

    /// One-off question with no user context.
    pub async fn get_internet_answer(&self, question: &str) -> Result<String, InferenceError> {
        self.chat.complete(&question_messages(question)).await
    }

    /// Run `query` against the store. Failures are logged and yield no rows.
    pub fn ask_database(&self, query: &str) -> Vec<Row> {
        let Some(store) = &self.store else {
            log::warn!("No database attached");
            return Vec::new();
        };
        store.ask(query).unwrap_or_else(|e| {
            log::error!("Error executing query: {}", e);
            Vec::new()
        })
    }

    /// Every table with its columns. Failures are logged and yield nothing.
    pub fn database_info(&self) -> Vec<TableInfo> {
        let Some(store) = &self.store else {
            log::warn!("No database attached");
            return Vec::new();
        };
        store.database_info().unwrap_or_else(|e| {
            log::error!("Error fetching database info: {}", e);
            Vec::new()
        })
    }
}

/// Run the consent gate and build a bot only if it was accepted.
///
/// The collaborators are handed over untouched on decline; nothing calls
/// them before the gate has answered.
pub fn launch(
    gate: &mut dyn ConsentGate,
    chat: Arc<dyn ChatCompletion>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    store: Option<Arc<dyn QueryStore>>,
) -> Result<Option<Bot>, ConsentError> {
    let Some(consent) = consent::obtain(gate)? else {
        return Ok(None);
    };
    let bot = Bot::new(consent, chat, sentiment);
    Ok(Some(match store {
        Some(store) => bot.with_store(store),
        None => bot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{Backend, IntensityScores, SentimentResult};
    use crate::store::StoreError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingChat {
        calls: AtomicUsize,
        prompts: Mutex<Vec<Vec<Message>>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatCompletion for CountingChat {
        async fn complete(&self, messages: &[Message]) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(messages.to_vec());
            if self.fail {
                Err(InferenceError::Transport("connection refused".into()))
            } else {
                Ok("Hi there!".into())
            }
        }
    }

    #[derive(Default)]
    struct CountingSentiment {
        calls: AtomicUsize,
    }

    impl SentimentAnalyzer for CountingSentiment {
        fn backend(&self) -> Backend {
            Backend::Intensity
        }

        fn analyze(&self, _text: &str) -> SentimentResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SentimentResult::Intensity(IntensityScores {
                neg: 0.0,
                neu: 0.4,
                pos: 0.6,
                compound: 0.6249,
            })
        }
    }

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        broken: bool,
    }

    impl QueryStore for CountingStore {
        fn table_names(&self) -> Result<Vec<String>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(StoreError::NotFound("gone.db".into()));
            }
            Ok(vec!["albums".into()])
        }

        fn column_names(&self, _table: &str) -> Result<Vec<String>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["AlbumId".into(), "Title".into()])
        }

        fn ask(&self, _query: &str) -> Result<Vec<Row>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(StoreError::NotFound("gone.db".into()));
            }
            Ok(vec![vec![json!(1), json!("For Those About To Rock")]])
        }
    }

    struct Answer(bool);

    impl ConsentGate for Answer {
        fn ask(&mut self) -> Result<bool, ConsentError> {
            Ok(self.0)
        }
    }

    fn bot_with(chat: Arc<CountingChat>) -> Bot {
        Bot::new(
            Consented::for_tests(),
            chat,
            Arc::new(CountingSentiment::default()),
        )
    }

    #[tokio::test]
    async fn test_declined_consent_touches_nothing() {
        let chat = Arc::new(CountingChat::default());
        let sentiment = Arc::new(CountingSentiment::default());
        let store = Arc::new(CountingStore::default());

        let bot = launch(
            &mut Answer(false),
            chat.clone(),
            sentiment.clone(),
            Some(store.clone() as Arc<dyn QueryStore>),
        )
        .unwrap();

        assert!(bot.is_none());
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sentiment.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_accepted_consent_builds_working_bot() {
        let chat = Arc::new(CountingChat::default());
        let sentiment = Arc::new(CountingSentiment::default());
        let store = Arc::new(CountingStore::default());

        let bot = launch(
            &mut Answer(true),
            chat.clone(),
            sentiment.clone(),
            Some(store.clone() as Arc<dyn QueryStore>),
        )
        .unwrap()
        .unwrap();

        bot.on_message_activity(&Activity::message_from("u1", "hello"))
            .await;
        bot.enhance_context_awareness("u1", "great");
        assert_eq!(bot.database_info().len(), 1);

        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sentiment.calls.load(Ordering::SeqCst), 1);
        assert!(store.calls.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_message_turn_replies_and_records() {
        let chat = Arc::new(CountingChat::default());
        let bot = bot_with(chat.clone());

        let out = bot
            .on_message_activity(&Activity::message_from("u1", "hello"))
            .await;
        assert_eq!(out, vec![Activity::text("Hi there!")]);
        assert_eq!(bot.history("u1"), vec![TurnRecord::message("hello")]);

        let prompts = chat.prompts.lock();
        assert_eq!(prompts[0][0], Message::system("You are a helpful assistant."));
        assert_eq!(
            prompts[0][1].content,
            "User: hello\nContext: [hello]\nBot:"
        );
    }

    #[tokio::test]
    async fn test_end_request_clears_context() {
        let chat = Arc::new(CountingChat::default());
        let bot = bot_with(chat.clone());

        bot.on_message_activity(&Activity::message_from("u1", "hello"))
            .await;
        let out = bot
            .on_message_activity(&Activity::message_from("u1", "please stop"))
            .await;

        assert_eq!(
            out,
            vec![
                Activity::text(ENDING_CONVERSATION),
                Activity::end_of_conversation()
            ]
        );
        assert!(bot.history("u1").is_empty());
        assert_eq!(bot.active_users(), 0);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inference_failure_sends_fallback() {
        let chat = Arc::new(CountingChat {
            fail: true,
            ..CountingChat::default()
        });
        let bot = bot_with(chat);
        let out = bot
            .on_message_activity(&Activity::message_from("u1", "hello"))
            .await;
        assert_eq!(out, vec![Activity::text(GENERATION_FAILED)]);
    }

    #[tokio::test]
    async fn test_malformed_activity_sends_generic_error() {
        let bot = bot_with(Arc::new(CountingChat::default()));
        let mut activity = Activity::message_from("u1", "hello");
        activity.text = None;
        assert_eq!(
            bot.on_message_activity(&activity).await,
            vec![Activity::text(GENERIC_ERROR)]
        );

        activity = Activity::text("hello");
        assert_eq!(
            bot.on_message_activity(&activity).await,
            vec![Activity::text(GENERIC_ERROR)]
        );
    }

    #[test]
    fn test_context_enrichment() {
        let bot = bot_with(Arc::new(CountingChat::default()));
        bot.proactive_learning("u", "more examples please");
        bot.ethical_decision_making("u", "share the data anonymised");
        let reply = bot.emotional_intelligence("u", "I love this");
        assert_eq!(
            reply,
            "I sense that you are feeling 0.6249. How can I assist you further?"
        );

        bot.record_action("u", "opened a support ticket");

        let explanation = bot.transparency_and_explainability("u", "anything");
        assert!(explanation.starts_with(
            "The decision was made based on the following context: [feedback: more examples please; "
        ));
        assert!(explanation.ends_with("; action: opened a support ticket]"));

        let history = bot.history("u");
        assert_eq!(history.len(), 5);
        assert_eq!(
            history[1],
            TurnRecord::EthicalDecision {
                text: "Considering ethical principles, the decision is: share the data anonymised"
                    .into()
            }
        );
        assert_eq!(
            history[3],
            TurnRecord::Action {
                text: "opened a support ticket".into()
            }
        );
        assert_eq!(history[3].to_string(), "action: opened a support ticket");
        assert_eq!(history[4], TurnRecord::explanation(explanation));
    }

    #[test]
    fn test_neutral_score_keeps_decimal_point() {
        let bot = Bot::new(
            Consented::for_tests(),
            Arc::new(CountingChat::default()),
            Arc::from(crate::sentiment::analyzer(Backend::Intensity)),
        );
        assert_eq!(
            bot.emotional_intelligence("u", "The table is in the kitchen"),
            "I sense that you are feeling 0.0. How can I assist you further?"
        );
    }

    #[tokio::test]
    async fn test_internet_answer_uses_plain_prompt() {
        let chat = Arc::new(CountingChat::default());
        let bot = bot_with(chat.clone());
        assert_eq!(bot.get_internet_answer("why?").await.unwrap(), "Hi there!");
        assert_eq!(chat.prompts.lock()[0], question_messages("why?"));
        assert!(bot.history("anyone").is_empty());
    }

    #[test]
    fn test_store_errors_become_empty_results() {
        let bot = bot_with(Arc::new(CountingChat::default())).with_store(Arc::new(CountingStore {
            broken: true,
            ..CountingStore::default()
        }));
        assert!(bot.ask_database("SELECT 1").is_empty());
        assert!(bot.database_info().is_empty());

        let detached = bot_with(Arc::new(CountingChat::default()));
        assert!(detached.ask_database("SELECT 1").is_empty());
    }

    #[test]
    fn test_ask_database_rows() {
        let bot = bot_with(Arc::new(CountingChat::default()))
            .with_store(Arc::new(CountingStore::default()));
        let rows = bot.ask_database("SELECT * FROM albums");
        assert_eq!(rows, vec![vec![json!(1), json!("For Those About To Rock")]]);
    }
}
