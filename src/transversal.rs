//! Transversal (AOP) engine: per-container advice registry, method
//! interception via a dispatch wrapper, and Before/After/Around chain
//! execution.
//!
//! No method wrapping or prototype mutation: a generated method wrapper
//! calls through a thin invocation façade (`TransversalEngine::invoke`),
//! which consults a per-target advice table by method name. The
//! registry lives on one `TransversalEngine` value per container rather
//! than behind a module-level static, so nothing needs resetting
//! between builds — each container simply owns its own table.

use crate::assemblage::BoxFuture;
use crate::error::Result;
use crate::pointcut::Pointcut;
use ahash::RandomState;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing::{debug, trace};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdviceKind {
    Before,
    After,
    Around,
}

/// The mutable call context threaded through one advice chain execution.
#[derive(Debug)]
pub struct AdviceContext {
    pub method_name: &'static str,
    pub class_name: &'static str,
    pub args: Vec<Arc<dyn Any + Send + Sync>>,
    pub result: Option<Arc<dyn Any + Send + Sync>>,
}

/// A `Before`/`After` advice body: inspect or mutate the context, or
/// fail to abort the chain.
pub type AdviceFn = Arc<dyn Fn(AdviceContext) -> BoxFuture<'static, Result<AdviceContext>> + Send + Sync>;

/// The continuation an `Around` advice calls to run the next advice (or
/// the original method, for the innermost `Around`).
pub type ProceedFn = Arc<dyn Fn(AdviceContext) -> BoxFuture<'static, Result<AdviceContext>> + Send + Sync>;

/// An `Around` advice body: given the context and a `proceed`
/// continuation, decide whether and how to call it, and what the final
/// context should be.
pub type AroundFn = Arc<dyn Fn(AdviceContext, ProceedFn) -> BoxFuture<'static, Result<AdviceContext>> + Send + Sync>;

#[derive(Clone)]
enum Handler {
    Simple(AdviceFn),
    Around(AroundFn),
}

/// One piece of advice: a pointcut, a priority (higher runs first
/// within its kind), and a handler.
#[derive(Clone)]
pub struct Advice {
    kind: AdviceKind,
    pointcut: Pointcut,
    priority: i32,
    handler: Handler,
}

impl Advice {
    pub fn before(pointcut: Pointcut, priority: i32, handler: AdviceFn) -> Self {
        Self {
            kind: AdviceKind::Before,
            pointcut,
            priority,
            handler: Handler::Simple(handler),
        }
    }

    pub fn after(pointcut: Pointcut, priority: i32, handler: AdviceFn) -> Self {
        Self {
            kind: AdviceKind::After,
            pointcut,
            priority,
            handler: Handler::Simple(handler),
        }
    }

    pub fn around(pointcut: Pointcut, priority: i32, handler: AroundFn) -> Self {
        Self {
            kind: AdviceKind::Around,
            pointcut,
            priority,
            handler: Handler::Around(handler),
        }
    }
}

/// Per-container advice table and dispatch wrapper.
pub struct TransversalEngine {
    advice: DashMap<TypeId, Vec<Advice>, RandomState>,
}

impl TransversalEngine {
    pub fn new() -> Self {
        Self {
            advice: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Installs `advices` against `type_id`. Called once per registered
    /// concrete for every engaged transversal, after every instance in
    /// the graph has finished construction and `on_init`.
    pub fn install(&self, type_id: TypeId, advices: Vec<Advice>) {
        #[cfg(feature = "logging")]
        debug!(target: "assemblage", advice_count = advices.len(), "installing advice for type");
        self.advice.entry(type_id).or_default().extend(advices);
    }

    pub fn clear(&self) {
        self.advice.clear();
    }

    /// The dispatch wrapper: runs the advice chain matching
    /// `(type_id, method_name)`, falling through to `original` when no
    /// `Around` advice matches.
    pub fn invoke<F>(
        &self,
        type_id: TypeId,
        class_name: &'static str,
        method_name: &'static str,
        args: Vec<Arc<dyn Any + Send + Sync>>,
        original: F,
    ) -> BoxFuture<'static, Result<AdviceContext>>
    where
        F: Fn(Vec<Arc<dyn Any + Send + Sync>>) -> BoxFuture<'static, Result<Arc<dyn Any + Send + Sync>>>
            + Send
            + Sync
            + 'static,
    {
        let candidates = self
            .advice
            .get(&type_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        let matching: Vec<Advice> = candidates
            .into_iter()
            .filter(|advice| advice.pointcut.matches(class_name, method_name))
            .collect();

        #[cfg(feature = "logging")]
        trace!(target: "assemblage", class_name, method_name, matched = matching.len(), "invoking advice chain");

        let mut befores: Vec<Advice> = matching.iter().filter(|a| a.kind == AdviceKind::Before).cloned().collect();
        befores.sort_by(|a, b| b.priority.cmp(&a.priority));
        let mut afters: Vec<Advice> = matching.iter().filter(|a| a.kind == AdviceKind::After).cloned().collect();
        afters.sort_by(|a, b| b.priority.cmp(&a.priority));
        let mut arounds: Vec<Advice> = matching.into_iter().filter(|a| a.kind == AdviceKind::Around).collect();
        arounds.sort_by(|a, b| b.priority.cmp(&a.priority));

        let original = Arc::new(original);
        let base: ProceedFn = Arc::new(move |mut ctx: AdviceContext| {
            let original = Arc::clone(&original);
            Box::pin(async move {
                let result = original(ctx.args.clone()).await?;
                ctx.result = Some(result);
                Ok(ctx)
            })
        });

        // Compose innermost-first: the lowest-priority Around wraps the
        // original directly, the highest-priority Around wraps everything.
        let mut proceed: ProceedFn = base;
        for advice in arounds.into_iter().rev() {
            if let Handler::Around(handler) = advice.handler {
                let inner = proceed.clone();
                proceed = Arc::new(move |ctx: AdviceContext| handler(ctx, inner.clone()));
            }
        }

        Box::pin(async move {
            let mut ctx = AdviceContext {
                method_name,
                class_name,
                args,
                result: None,
            };

            for advice in &befores {
                if let Handler::Simple(handler) = &advice.handler {
                    ctx = handler(ctx).await?;
                }
            }

            let mut ctx = proceed(ctx).await?;

            for advice in &afters {
                if let Handler::Simple(handler) = &advice.handler {
                    ctx = handler(ctx).await?;
                }
            }

            Ok(ctx)
        })
    }
}

impl Default for TransversalEngine {
    fn default() -> Self {
        Self::new()
    }
}
