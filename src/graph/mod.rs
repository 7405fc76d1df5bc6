//! 极简状态图执行器 - 在一条线性链上依次执行命名步骤
//!
//! 每个步骤读取当前状态的只读引用，返回一个部分更新（delta）；
//! 执行器是唯一的写入点，负责把更新按字段合并回状态，再沿边前进到下一个步骤，
//! 直到遇到 [`END`] 或者当前步骤没有出边。
//!
//! 该设计只支持线性链：每个步骤至多一条出边，运行前会校验整条链，出现环直接报错。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

pub mod timing;

pub use timing::TimingScope;

/// 终止标记，不是合法的步骤名
pub const END: &str = "__end__";

/// 可以在图中流转的状态
pub trait GraphState: Send + Sync {
    /// 步骤返回的部分更新
    type Update: Send;

    /// 把部分更新合并到状态上。
    ///
    /// 合并是字段级的浅合并：更新中出现的字段整体替换旧值（序列不追加），
    /// 未出现的字段保持不变。
    fn apply(&mut self, update: Self::Update);
}

/// 图中的一个步骤
///
/// 步骤不能向执行器抛出错误：外部调用失败时必须自行降级，返回一个安全的部分更新。
#[async_trait]
pub trait Step<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> S::Update;
}

/// 把同步闭包包装成步骤
pub struct FnStep<F>(pub F);

#[async_trait]
impl<S, F> Step<S> for FnStep<F>
where
    S: GraphState,
    F: Fn(&S) -> S::Update + Send + Sync,
{
    async fn run(&self, state: &S) -> S::Update {
        (self.0)(state)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("step `{0}` is already registered")]
    DuplicateStep(String),

    #[error("`{0}` is reserved as the terminal marker")]
    ReservedName(String),

    #[error("no entry point has been set")]
    MissingEntryPoint,

    #[error("step `{0}` is referenced but not registered")]
    UnknownStep(String),

    #[error("step `{0}` is reached twice; cycles are not supported")]
    Cycle(String),
}

/// 线性状态图
pub struct StateGraph<S: GraphState> {
    steps: HashMap<String, Arc<dyn Step<S>>>,
    edges: HashMap<String, String>,
    entry_point: Option<String>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            edges: HashMap::new(),
            entry_point: None,
        }
    }

    /// 注册步骤，名称重复或者与终止标记冲突时立即失败
    pub fn add_step<T>(&mut self, name: impl Into<String>, step: T) -> Result<&mut Self, GraphError>
    where
        T: Step<S> + 'static,
    {
        let name = name.into();
        if name == END {
            return Err(GraphError::ReservedName(name));
        }
        if self.steps.contains_key(&name) {
            return Err(GraphError::DuplicateStep(name));
        }
        self.steps.insert(name, Arc::new(step));
        Ok(self)
    }

    /// 设置入口步骤，名称在运行前注册即可
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_point = Some(name.into());
        self
    }

    /// 声明 `from` 完成后进入 `to`；同一个 `from` 再次声明会覆盖之前的边
    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        let from = from.into();
        let to = to.into();
        if let Some(previous) = self.edges.insert(from.clone(), to.clone()) {
            debug!(from = %from, previous = %previous, to = %to, "edge overwritten");
        }
        self
    }

    /// 按边的顺序解析出整条执行链，并校验入口、未注册步骤和环
    pub fn execution_order(&self) -> Result<Vec<String>, GraphError> {
        let entry = self
            .entry_point
            .as_ref()
            .ok_or(GraphError::MissingEntryPoint)?;

        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut current = entry.clone();

        while current != END {
            if !self.steps.contains_key(&current) {
                return Err(GraphError::UnknownStep(current));
            }
            if !seen.insert(current.clone()) {
                return Err(GraphError::Cycle(current));
            }
            order.push(current.clone());
            current = match self.edges.get(&current) {
                Some(next) => next.clone(),
                None => END.to_string(),
            };
        }

        Ok(order)
    }

    /// 从入口开始执行，返回最终状态
    pub async fn run(&self, state: S) -> Result<S, GraphError> {
        let (state, _timing) = self.run_timed(state).await?;
        Ok(state)
    }

    /// 与 [`StateGraph::run`] 相同，额外返回每个步骤的耗时
    pub async fn run_timed(&self, mut state: S) -> Result<(S, TimingScope), GraphError> {
        // 先校验整条链，结构错误不会在执行到一半时才暴露
        let order = self.execution_order()?;
        let mut timing = TimingScope::new();

        for name in &order {
            let step = &self.steps[name];

            info!(step = %name, "running step");
            let started = Instant::now();
            timing.start_phase(name);

            let update = step.run(&state).await;
            state.apply(update);

            timing.end_phase(name);
            debug!(
                step = %name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                next = %self.edges.get(name).map(String::as_str).unwrap_or(END),
                "step complete"
            );
        }

        Ok((state, timing))
    }
}

#[cfg(test)]
mod tests;
