//! Scriptable stand-ins for the remote binding, for tests and downstream
//! test suites. Enabled with the `test-utils` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::handle::{
    BatchStatement, D1Database, D1ExecResult, D1PreparedStatement, D1Result, HandleError,
    HandleResult,
};

/// One recorded prepare/bind/execute cycle.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<JsonValue>,
    /// Which statement method finished the call: `run`, `all`, `first`,
    /// `raw`, or `exec`.
    pub method: &'static str,
}

#[derive(Default)]
struct StubState {
    responses: VecDeque<HandleResult<D1Result>>,
    calls: Vec<RecordedCall>,
}

/// In-memory stand-in for a D1 binding.
///
/// Responses are consumed FIFO; when the queue is empty every call succeeds
/// with an empty result. All calls are recorded with their bound parameters.
#[derive(Default)]
pub struct StubDatabase {
    state: Arc<Mutex<StubState>>,
}

impl StubDatabase {
    #[must_use]
    pub fn new() -> Self {
        StubDatabase::default()
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queue the next result envelope.
    pub fn queue_result(&self, result: D1Result) {
        self.state().responses.push_back(Ok(result));
    }

    /// Queue a thrown error for the next call.
    pub fn queue_error(&self, error: HandleError) {
        self.state().responses.push_back(Err(error));
    }

    /// Everything executed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// SQL text of every executed statement, in order.
    #[must_use]
    pub fn executed_sql(&self) -> Vec<String> {
        self.state().calls.iter().map(|c| c.sql.clone()).collect()
    }
}

struct StubStatement {
    state: Arc<Mutex<StubState>>,
    sql: String,
    params: Vec<JsonValue>,
}

impl StubStatement {
    fn finish(&mut self, method: &'static str) -> HandleResult<D1Result> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.calls.push(RecordedCall {
            sql: self.sql.clone(),
            params: self.params.clone(),
            method,
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(D1Result::ok_with_rows(Vec::new())))
    }
}

#[async_trait]
impl D1PreparedStatement for StubStatement {
    fn bind(&mut self, values: Vec<JsonValue>) {
        self.params = values;
    }

    async fn first(&mut self) -> HandleResult<Option<JsonValue>> {
        let result = self.finish("first")?;
        Ok(result.results.into_iter().next())
    }

    async fn run(&mut self) -> HandleResult<D1Result> {
        self.finish("run")
    }

    async fn all(&mut self) -> HandleResult<D1Result> {
        self.finish("all")
    }

    async fn raw(&mut self) -> HandleResult<Vec<JsonValue>> {
        self.finish("raw").map(|result| result.results)
    }
}

#[async_trait]
impl D1Database for StubDatabase {
    fn prepare(&self, sql: &str) -> Box<dyn D1PreparedStatement> {
        Box::new(StubStatement {
            state: self.state.clone(),
            sql: sql.to_string(),
            params: Vec::new(),
        })
    }

    async fn batch(&self, statements: Vec<BatchStatement>) -> HandleResult<Vec<D1Result>> {
        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            self.state().calls.push(RecordedCall {
                sql: statement.sql,
                params: statement.params,
                method: "batch",
            });
            results.push(D1Result::ok_with_rows(Vec::new()));
        }
        Ok(results)
    }

    async fn exec(&self, sql: &str) -> HandleResult<D1ExecResult> {
        self.state().calls.push(RecordedCall {
            sql: sql.to_string(),
            params: Vec::new(),
            method: "exec",
        });
        Ok(D1ExecResult {
            count: 1,
            duration: 0.0,
        })
    }
}
