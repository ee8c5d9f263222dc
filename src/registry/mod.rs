//! Function registry for JSON call plans.
//!
//! A plan names functions by string key. Every key is resolved against a
//! closed set when the plan is loaded, so a typo fails before anything runs
//! instead of halfway through execution.
//!
//! ```json
//! {"functions": [
//!   {"name": "einstein_insights", "parameters": {"question": "What is time?"}},
//!   {"name": "get_weather", "parameters": {"location": "London"}}
//! ]}
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::consent::Consented;
use crate::inference::{question_messages, ChatCompletion, InferenceError};
use crate::persona::{self, Persona};
use crate::services::{InfoServices, ServiceError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Function {0} not found.")]
    UnknownFunction(String),

    #[error("Function {function} is missing parameter '{parameter}'")]
    MissingParameter {
        function: String,
        parameter: &'static str,
    },

    #[error("Invalid plan: {0}")]
    InvalidPlan(#[from] serde_json::Error),

    #[error("Failed to read plan: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not available")]
    Unavailable(&'static str),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

// ----------------------------------------------------------------------------
// Keys
// ----------------------------------------------------------------------------

/// Every function a plan may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKey {
    Persona(Persona),
    IdentifyAndRefuteFallacies,
    UniversalReasoning,
    GetWeather,
    GetLatestNews,
    GetStockPrice,
    TranslateText,
    GetInternetAnswer,
}

impl FunctionKey {
    /// All keys, personas first in composite order.
    pub fn all() -> Vec<FunctionKey> {
        let mut keys: Vec<FunctionKey> = Persona::ALL.into_iter().map(Self::Persona).collect();
        keys.extend([
            Self::IdentifyAndRefuteFallacies,
            Self::UniversalReasoning,
            Self::GetWeather,
            Self::GetLatestNews,
            Self::GetStockPrice,
            Self::TranslateText,
            Self::GetInternetAnswer,
        ]);
        keys
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Persona(p) => p.function_name(),
            Self::IdentifyAndRefuteFallacies => "identify_and_refute_fallacies",
            Self::UniversalReasoning => "universal_reasoning",
            Self::GetWeather => "get_weather",
            Self::GetLatestNews => "get_latest_news",
            Self::GetStockPrice => "get_stock_price",
            Self::TranslateText => "translate_text",
            Self::GetInternetAnswer => "get_internet_answer",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.name() == name)
    }

    /// Parameter names the function requires, in call order.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            Self::Persona(_) | Self::UniversalReasoning | Self::GetInternetAnswer => &["question"],
            Self::IdentifyAndRefuteFallacies => &["argument"],
            Self::GetWeather => &["location"],
            Self::GetLatestNews => &[],
            Self::GetStockPrice => &["symbol"],
            Self::TranslateText => &["text", "target_language"],
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----------------------------------------------------------------------------
// Plans
// ----------------------------------------------------------------------------

/// A resolved call: key plus its required arguments in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub key: FunctionKey,
    pub args: Vec<String>,
}

impl Call {
    /// Resolve a raw name and parameter object.
    pub fn resolve(name: &str, parameters: &Map<String, Value>) -> Result<Self, RegistryError> {
        let key = FunctionKey::from_name(name)
            .ok_or_else(|| RegistryError::UnknownFunction(name.to_string()))?;
        let args = key
            .parameters()
            .iter()
            .map(|&parameter| {
                parameters
                    .get(parameter)
                    .and_then(argument_text)
                    .ok_or_else(|| RegistryError::MissingParameter {
                        function: name.to_string(),
                        parameter,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { key, args })
    }

    fn arg(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or_default()
    }
}

fn argument_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct RawCall {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    question: Option<String>,
    functions: Vec<RawCall>,
}

/// A plan file holds one plan object or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPlanFile {
    One(RawPlan),
    Many(Vec<RawPlan>),
}

/// One validated step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub call: Call,
    pub description: Option<String>,
}

/// A validated sequence of calls, optionally tied to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub question: Option<String>,
    pub steps: Vec<PlanStep>,
}

impl Plan {
    fn resolve(raw: RawPlan) -> Result<Self, RegistryError> {
        let steps = raw
            .functions
            .into_iter()
            .map(|f| {
                Ok(PlanStep {
                    call: Call::resolve(&f.name, &f.parameters)?,
                    description: f.description,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(Self {
            question: raw.question,
            steps,
        })
    }
}

/// Parse and validate plan JSON. Fails on the first unknown name or missing
/// parameter.
pub fn parse_plans(json: &str) -> Result<Vec<Plan>, RegistryError> {
    let raw: RawPlanFile = serde_json::from_str(json)?;
    let raw = match raw {
        RawPlanFile::One(plan) => vec![plan],
        RawPlanFile::Many(plans) => plans,
    };
    raw.into_iter().map(Plan::resolve).collect()
}

/// Read, parse and validate a plan file.
pub fn load_plans(path: impl AsRef<Path>) -> Result<Vec<Plan>, RegistryError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let plans = parse_plans(&text)?;
    log::info!(
        "Loaded {} plan(s) with {} call(s) from {}",
        plans.len(),
        plans.iter().map(|p| p.steps.len()).sum::<usize>(),
        path.as_ref().display()
    );
    Ok(plans)
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

/// Executes resolved calls against the bot's collaborators.
pub struct FunctionRegistry {
    chat: Option<Arc<dyn ChatCompletion>>,
    services: Option<InfoServices>,
}

impl FunctionRegistry {
    /// Personas and the fallacy refuter work without any collaborator; the
    /// remaining functions report [`RegistryError::Unavailable`] until one is
    /// attached.
    pub fn new(_consent: Consented) -> Self {
        Self {
            chat: None,
            services: None,
        }
    }

    pub fn with_chat(mut self, chat: Arc<dyn ChatCompletion>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn with_services(mut self, services: InfoServices) -> Self {
        self.services = Some(services);
        self
    }

    fn services(&self) -> Result<&InfoServices, RegistryError> {
        self.services
            .as_ref()
            .ok_or(RegistryError::Unavailable("information services"))
    }

    /// Run one call.
    pub async fn call(&self, call: &Call) -> Result<String, RegistryError> {
        log::debug!("Calling {} with {:?}", call.key, call.args);
        let output = match call.key {
            FunctionKey::Persona(p) => p.respond(call.arg(0)),
            FunctionKey::IdentifyAndRefuteFallacies => {
                persona::identify_and_refute_fallacies(call.arg(0))
            }
            FunctionKey::UniversalReasoning => persona::universal_reasoning(call.arg(0)),
            FunctionKey::GetWeather => self.services()?.get_weather(call.arg(0)).await?,
            FunctionKey::GetLatestNews => self.services()?.get_latest_news().await?,
            FunctionKey::GetStockPrice => self.services()?.get_stock_price(call.arg(0)).await?,
            FunctionKey::TranslateText => {
                self.services()?
                    .translate_text(call.arg(0), call.arg(1))
                    .await?
            }
            FunctionKey::GetInternetAnswer => {
                let chat = self
                    .chat
                    .as_ref()
                    .ok_or(RegistryError::Unavailable("chat completion"))?;
                chat.complete(&question_messages(call.arg(0))).await?
            }
        };
        Ok(output)
    }

    /// Run every step in order. A failing step is logged and its error text
    /// becomes that step's output; later steps still run.
    pub async fn execute(&self, plan: &Plan) -> Vec<(String, String)> {
        let mut outputs = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let name = step.call.key.name().to_string();
            let output = match self.call(&step.call).await {
                Ok(output) => output,
                Err(e) => {
                    log::error!("Function {} failed: {}", name, e);
                    format!("Error: {}", e)
                }
            };
            outputs.push((name, output));
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Message;
    use crate::persona::fallacy::REFUTATIONS;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;

    struct Echo;

    #[async_trait]
    impl ChatCompletion for Echo {
        async fn complete(&self, messages: &[Message]) -> Result<String, InferenceError> {
            Ok(format!("answer to {}", messages[1].content))
        }
    }

    fn registry() -> FunctionRegistry {
        FunctionRegistry::new(Consented::for_tests()).with_chat(Arc::new(Echo))
    }

    #[test]
    fn test_key_set_is_closed_and_unique() {
        let keys = FunctionKey::all();
        assert_eq!(keys.len(), 17);
        let names: HashSet<&str> = keys.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), 17);
        for key in keys {
            assert_eq!(FunctionKey::from_name(key.name()), Some(key));
        }
        assert_eq!(FunctionKey::from_name("Newton_Thoughts"), None);
    }

    #[test]
    fn test_unknown_function_rejected_at_load() {
        let plan = json!({"functions": [
            {"name": "newton_thoughts", "parameters": {"question": "q"}},
            {"name": "launch_rockets", "parameters": {}}
        ]});
        let err = parse_plans(&plan.to_string()).unwrap_err();
        match err {
            RegistryError::UnknownFunction(name) => assert_eq!(name, "launch_rockets"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_parameter_rejected_at_load() {
        let plan = json!({"functions": [
            {"name": "translate_text", "parameters": {"text": "Hello"}}
        ]});
        let err = parse_plans(&plan.to_string()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingParameter { parameter: "target_language", .. }
        ));
    }

    #[test]
    fn test_question_list_format() {
        let plans = json!([
            {"question": "What is time?", "functions": [
                {"name": "einstein_insights", "description": "relativity", "parameters": {"question": "What is time?"}},
                {"name": "get_latest_news"}
            ]},
            {"question": "Stocks?", "functions": [
                {"name": "get_stock_price", "parameters": {"symbol": "MSFT"}}
            ]}
        ]);
        let plans = parse_plans(&plans.to_string()).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].question.as_deref(), Some("What is time?"));
        assert_eq!(plans[0].steps[0].description.as_deref(), Some("relativity"));
        assert_eq!(plans[0].steps[1].call.key, FunctionKey::GetLatestNews);
        assert_eq!(plans[1].steps[0].call.args, vec!["MSFT"]);
    }

    #[test]
    fn test_non_string_arguments_are_stringified() {
        let params = json!({"symbol": 42}).as_object().cloned().unwrap();
        let call = Call::resolve("get_stock_price", &params).unwrap();
        assert_eq!(call.args, vec!["42"]);
    }

    #[tokio::test]
    async fn test_execute_in_order() {
        let plan = json!({"functions": [
            {"name": "newton_thoughts", "parameters": {"question": "abcd"}},
            {"name": "identify_and_refute_fallacies", "parameters": {"argument": "everyone agrees"}},
            {"name": "get_internet_answer", "parameters": {"question": "why?"}},
            {"name": "gandhi_insights", "parameters": {"question": "peace"}}
        ]});
        let plans = parse_plans(&plan.to_string()).unwrap();
        let outputs = registry().execute(&plans[0]).await;

        let names: Vec<&str> = outputs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "newton_thoughts",
                "identify_and_refute_fallacies",
                "get_internet_answer",
                "gandhi_insights"
            ]
        );
        assert_eq!(outputs[0].1, "Thought force: 8.0");
        assert!(REFUTATIONS.contains(&outputs[1].1.as_str()));
        assert_eq!(outputs[2].1, "answer to why?");
        assert!(Persona::Gandhi.templates("peace").contains(&outputs[3].1));
    }

    #[tokio::test]
    async fn test_missing_collaborator_is_reported_per_step() {
        let plan = json!({"functions": [
            {"name": "get_weather", "parameters": {"location": "Paris"}},
            {"name": "human_intuition", "parameters": {"question": "q"}}
        ]});
        let plans = parse_plans(&plan.to_string()).unwrap();
        let outputs = FunctionRegistry::new(Consented::for_tests())
            .execute(&plans[0])
            .await;
        assert_eq!(outputs[0].1, "Error: information services is not available");
        assert!(Persona::HumanIntuition.templates("q").contains(&outputs[1].1));
    }

    #[test]
    fn test_load_plans_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(
            &path,
            r#"{"functions":[{"name":"universal_reasoning","parameters":{"question":"q"}}]}"#,
        )
        .unwrap();
        let plans = load_plans(&path).unwrap();
        assert_eq!(plans[0].steps[0].call.key, FunctionKey::UniversalReasoning);

        let err = load_plans(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
