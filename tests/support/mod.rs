//! In-memory GraphQL client shared by the integration tests.
//!
//! Every client built by [`factory`] reports to one [`Backend`], which
//! records constructions, requests and subscriptions and lets tests script
//! results and push subscription events.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use graphql_dispatch::clients::{
    BoxFuture, CancelError, ClientFactory, GraphqlClient, ResultCallback, SubscriptionCancel,
};
use graphql_dispatch::operations::OperationSet;
use graphql_dispatch::{
    ConnectionConfig, Endpoint, ExecutionOptions, Graphql, OperationError, OperationKind,
    OperationRequest, OperationResult, Variables,
};

/// Variable that makes a subscription's cancel capability return an error.
pub const FAIL_CANCEL: &str = "failCancel";
/// Variable that makes a subscription's cancel capability panic.
pub const PANIC_CANCEL: &str = "panicCancel";

/// One request seen by a fake client.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub endpoint: String,
    pub kind: OperationKind,
    pub operation_name: Option<String>,
    pub variables: Variables,
    pub options: ExecutionOptions,
}

struct Stream {
    variables: Variables,
    on_result: ResultCallback,
    cancelled: Arc<AtomicBool>,
}

/// State shared by every fake client of one test.
pub struct Backend {
    constructed: Mutex<Vec<String>>,
    query_result: Mutex<OperationResult>,
    mutation_result: Mutex<OperationResult>,
    refuse_subscriptions: AtomicBool,
    requests: Mutex<Vec<Recorded>>,
    streams: Mutex<Vec<Stream>>,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            constructed: Mutex::new(Vec::new()),
            query_result: Mutex::new(OperationResult::empty()),
            mutation_result: Mutex::new(OperationResult::empty()),
            refuse_subscriptions: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            streams: Mutex::new(Vec::new()),
        })
    }

    pub fn respond_to_queries(&self, result: OperationResult) {
        *self.query_result.lock().unwrap() = result;
    }

    pub fn respond_to_mutations(&self, result: OperationResult) {
        *self.mutation_result.lock().unwrap() = result;
    }

    pub fn refuse_subscriptions(&self) {
        self.refuse_subscriptions.store(true, Ordering::SeqCst);
    }

    /// Endpoints in the order their clients were constructed.
    pub fn constructed(&self) -> Vec<String> {
        self.constructed.lock().unwrap().clone()
    }

    pub fn construction_count(&self, endpoint: &str) -> usize {
        self.constructed
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == endpoint)
            .count()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn subscription_count(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    /// Cancellation state of every started subscription, in start order.
    pub fn cancelled(&self) -> Vec<bool> {
        self.streams
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.cancelled.load(Ordering::SeqCst))
            .collect()
    }

    /// Variables of every started subscription, in start order.
    pub fn started_variables(&self) -> Vec<Variables> {
        self.streams
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.variables.clone())
            .collect()
    }

    /// Delivers `result` to every subscription that has not been cancelled.
    pub fn emit(&self, result: &OperationResult) {
        for stream in self.streams.lock().unwrap().iter_mut() {
            if !stream.cancelled.load(Ordering::SeqCst) {
                (stream.on_result)(result.clone());
            }
        }
    }

    fn record(&self, endpoint: &str, request: &OperationRequest) {
        self.requests.lock().unwrap().push(Recorded {
            endpoint: endpoint.to_string(),
            kind: request.kind(),
            operation_name: request.document.operation_name().map(str::to_string),
            variables: request.variables.clone(),
            options: request.options.clone(),
        });
    }
}

/// A client bound to one endpoint.
pub struct FakeClient {
    endpoint: String,
    backend: Arc<Backend>,
}

impl GraphqlClient for FakeClient {
    fn execute_query(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
        self.backend.record(&self.endpoint, &request);
        let result = self.backend.query_result.lock().unwrap().clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            result
        })
    }

    fn execute_mutation(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
        self.backend.record(&self.endpoint, &request);
        let result = self.backend.mutation_result.lock().unwrap().clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            result
        })
    }

    fn start_subscription(
        &self,
        request: OperationRequest,
        on_result: ResultCallback,
    ) -> Result<SubscriptionCancel, OperationError> {
        if self.backend.refuse_subscriptions.load(Ordering::SeqCst) {
            return Err(OperationError::network("subscriptions are not supported"));
        }
        self.backend.record(&self.endpoint, &request);

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let should_fail = request.variables.get(FAIL_CANCEL).is_some();
        let should_panic = request.variables.get(PANIC_CANCEL).is_some();

        self.backend.streams.lock().unwrap().push(Stream {
            variables: request.variables,
            on_result,
            cancelled,
        });

        Ok(SubscriptionCancel::new(move || {
            flag.store(true, Ordering::SeqCst);
            if should_panic {
                panic!("subscription already torn down");
            }
            if should_fail {
                return Err(CancelError::Failed {
                    reason: "socket closed".to_string(),
                });
            }
            Ok(())
        }))
    }
}

/// A factory whose clients all report to `backend`.
pub fn factory(backend: &Arc<Backend>) -> impl ClientFactory + 'static {
    let backend = Arc::clone(backend);
    move |config: &ConnectionConfig| {
        let endpoint = config.endpoint().as_str().to_string();
        backend.constructed.lock().unwrap().push(endpoint.clone());
        FakeClient {
            endpoint,
            backend: Arc::clone(&backend),
        }
    }
}

pub fn config(url: &str) -> ConnectionConfig {
    ConnectionConfig::new(Endpoint::new(url).unwrap())
}

/// A facade over `operations` backed by a fresh [`Backend`], not yet initialized.
pub fn graphql(operations: OperationSet) -> (Graphql, Arc<Backend>) {
    let backend = Backend::new();
    let graphql = Graphql::new(operations, factory(&backend));
    (graphql, backend)
}

/// Like [`graphql`], initialized against `https://api.example.com/graphql`.
pub fn initialized(operations: OperationSet) -> (Graphql, Arc<Backend>) {
    let (graphql, backend) = graphql(operations);
    graphql.initialize(config("https://api.example.com/graphql"));
    (graphql, backend)
}
