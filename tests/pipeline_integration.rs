//! End-to-end pipeline tests against scripted collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentic_loop::agents::{Row, TweetType, BLOG_POST_COUNT, LINKEDIN_POST_COUNT, TWEET_COUNT};
use agentic_loop::collectors::{sample_rows, StaticRowSource};
use agentic_loop::export::{Attachment, ResultSink, RunSummary};
use agentic_loop::llm::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, RoleClients, Usage,
};
use agentic_loop::pipeline::{Orchestrator, Phase, RunStatus, TaskId, TaskIdAllocator};
use agentic_loop::server::{router, AppState, BackgroundLauncher, HealthChecker};
use agentic_loop::{DeliveryError, LlmError};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Replies with a fixed text, or fails every call.
struct FixedProvider {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(GenerationResponse {
                id: "resp".to_string(),
                model: "fixed".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(text.clone()),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage::default(),
            }),
            Err(message) => Err(LlmError::ApiError {
                code: 503,
                message: message.clone(),
            }),
        }
    }
}

/// Forwards every delivery to a channel.
struct ChannelSink(mpsc::UnboundedSender<(RunSummary, Vec<Attachment>)>);

#[async_trait]
impl ResultSink for ChannelSink {
    async fn send_results(
        &self,
        summary: &RunSummary,
        attachments: &[Attachment],
    ) -> Result<(), DeliveryError> {
        let _ = self.0.send((summary.clone(), attachments.to_vec()));
        Ok(())
    }
}

struct Providers {
    research: Arc<FixedProvider>,
    content: Arc<FixedProvider>,
    social: Arc<FixedProvider>,
    optimization: Arc<FixedProvider>,
}

impl Providers {
    fn healthy() -> Self {
        Self {
            research: FixedProvider::replying("Executive summary: agents are maturing."),
            content: FixedProvider::replying("# Clear Title\n\nA body with several words."),
            social: FixedProvider::replying("1. First idea #AI\n2. Second idea #AI"),
            optimization: FixedProvider::replying("Polished text."),
        }
    }

    fn clients(&self) -> RoleClients {
        RoleClients::new(
            self.research.clone(),
            self.content.clone(),
            self.social.clone(),
            self.optimization.clone(),
        )
    }
}

fn orchestrator(
    providers: &Providers,
    rows: Vec<Row>,
) -> (Orchestrator, mpsc::UnboundedReceiver<(RunSummary, Vec<Attachment>)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let orchestrator = Orchestrator::new(
        &providers.clients(),
        Arc::new(StaticRowSource::new(rows)),
        Arc::new(ChannelSink(tx)),
    );
    (orchestrator, rx)
}

#[tokio::test]
async fn test_single_row_run_produces_full_content() {
    let providers = Providers::healthy();
    let (orchestrator, mut deliveries) =
        orchestrator(&providers, vec![Row::new().with("topic", "X")]);

    let record = orchestrator.run(TaskId::new("task_single")).await;

    assert_eq!(record.status(), RunStatus::Completed);
    assert!(record.errors().is_empty());

    let topics: Vec<&str> = record
        .blog_posts()
        .unwrap()
        .iter()
        .map(|p| p.topic.as_str())
        .collect();
    assert_eq!(
        topics,
        vec!["X", "AI Innovation Topic 2", "AI Innovation Topic 3"]
    );
    assert_eq!(record.blog_posts().unwrap()[0].title, "Clear Title");

    let tweets = record.tweets().unwrap();
    assert_eq!(tweets.len(), TWEET_COUNT);
    assert_eq!(
        tweets.iter().filter(|t| t.kind == TweetType::BlogBased).count(),
        6
    );
    assert_eq!(record.linkedin_posts().unwrap().len(), LINKEDIN_POST_COUNT);

    let optimized = record.optimized_content().unwrap();
    assert_eq!(optimized.blog_posts.len(), BLOG_POST_COUNT);
    assert!(optimized.tweets.iter().all(|t| t.item.content == "Polished text."));

    // one research call, one per blog, 3 + 1 tweet calls and 6 LinkedIn calls
    assert_eq!(providers.research.calls(), 1);
    assert_eq!(providers.content.calls(), BLOG_POST_COUNT);
    assert_eq!(providers.social.calls(), 4 + 6);
    assert_eq!(
        providers.optimization.calls(),
        BLOG_POST_COUNT + TWEET_COUNT + LINKEDIN_POST_COUNT
    );

    let (summary, attachments) = deliveries.recv().await.expect("one delivery");
    assert_eq!(summary.status, RunStatus::Completed);
    let names: Vec<&str> = attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "blog_posts_task_single.json",
            "tweets_task_single.json",
            "linkedin_posts_task_single.json"
        ]
    );
    let tweets_json: serde_json::Value = serde_json::from_str(&attachments[1].content).unwrap();
    assert_eq!(tweets_json.as_array().unwrap().len(), TWEET_COUNT);
    assert_eq!(tweets_json[0]["optimization_status"], "completed");
    assert!(deliveries.try_recv().is_err());
}

#[tokio::test]
async fn test_research_failure_stops_run_and_still_delivers() {
    let mut providers = Providers::healthy();
    providers.research = FixedProvider::failing("quota exhausted");
    let (orchestrator, mut deliveries) = orchestrator(&providers, sample_rows());

    let record = orchestrator.run(TaskId::new("task_research")).await;

    assert_eq!(record.status(), RunStatus::Failed);
    assert_eq!(record.errors().len(), 1);
    assert_eq!(record.errors()[0].phase, Phase::Research);
    assert_eq!(providers.content.calls(), 0);
    assert_eq!(providers.social.calls(), 0);
    assert_eq!(providers.optimization.calls(), 0);

    let (summary, attachments) = deliveries.recv().await.expect("one delivery");
    assert_eq!(summary.status, RunStatus::Failed);
    assert_eq!(summary.errors[0].phase, Phase::Research);
    assert!(attachments.is_empty());
    let html = summary.render_html().unwrap();
    assert!(html.contains("quota exhausted"));
}

#[tokio::test]
async fn test_optimization_failure_delivers_raw_content() {
    let mut providers = Providers::healthy();
    providers.optimization = FixedProvider::failing("editor offline");
    let (orchestrator, mut deliveries) = orchestrator(&providers, sample_rows());

    let record = orchestrator.run(TaskId::new("task_raw")).await;

    assert_eq!(record.status(), RunStatus::Completed);
    assert_eq!(record.errors().len(), 1);
    assert_eq!(record.errors()[0].phase, Phase::Optimization);
    assert!(record.optimized_content().is_none());

    let (_, attachments) = deliveries.recv().await.expect("one delivery");
    assert_eq!(attachments.len(), 3);
    assert!(attachments
        .iter()
        .all(|a| !a.content.contains("optimization_status")));
}

#[tokio::test]
async fn test_empty_social_replies_are_padded_not_fatal() {
    let mut providers = Providers::healthy();
    providers.social = FixedProvider::replying("   ");
    let (orchestrator, mut deliveries) = orchestrator(&providers, sample_rows());

    let record = orchestrator.run(TaskId::new("task_blank")).await;

    assert_eq!(record.status(), RunStatus::Completed);
    assert!(record.errors().is_empty());
    let tweets = record.tweets().unwrap();
    assert_eq!(tweets.len(), TWEET_COUNT);
    assert!(tweets.iter().all(|t| t.kind == TweetType::Filler));
    let posts = record.linkedin_posts().unwrap();
    assert_eq!(posts.len(), LINKEDIN_POST_COUNT);
    assert!(posts.iter().all(|p| !p.content.trim().is_empty()));

    let (summary, _) = deliveries.recv().await.expect("one delivery");
    assert_eq!(summary.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_start_endpoint_runs_pipeline_in_background() {
    let providers = Providers::healthy();
    let (orchestrator, mut deliveries) = orchestrator(&providers, sample_rows());
    let state = AppState {
        health: Arc::new(HealthChecker::new()),
        launcher: Arc::new(BackgroundLauncher::new(Arc::new(orchestrator))),
        task_ids: Arc::new(TaskIdAllocator::new()),
    };

    let request = Request::builder()
        .method(Method::POST)
        .uri("/start")
        .body(Body::empty())
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let task_id = body["task_id"].as_str().unwrap().to_string();

    let (summary, attachments) = tokio::time::timeout(Duration::from_secs(10), deliveries.recv())
        .await
        .expect("run should finish")
        .expect("one delivery");
    assert_eq!(summary.task_id.as_str(), task_id);
    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(attachments.len(), 3);
}
