//! Pipeline composer - ハンドラを behavior で包んで 1 つの呼び出し可能値にする
//!
//! # 合成順序
//! behaviors を登録の逆順に畳み込むので、最初に登録した behavior が最外殻になります。
//! `[A, B, C]` + ハンドラ `H` の実行順は
//! `A-enter, B-enter, C-enter, H, C-exit, B-exit, A-exit` です。
//!
//! behavior が空のときは、ハンドラ呼び出しそのものが返ります。

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::domain::{CancellationToken, MediatorError, Notification, Request};
use crate::typed::{
    Next, NotificationBehavior, NotificationFn, NotificationHandler, NotificationNext,
    PipelineBehavior, RequestFn, RequestHandler,
};

/// Fold `behaviors` around `terminal`, first element outermost.
fn wrap_outer_to_inner<S, B>(terminal: S, behaviors: Vec<B>, wrap: impl Fn(B, S) -> S) -> S {
    behaviors
        .into_iter()
        .rev()
        .fold(terminal, |next, behavior| wrap(behavior, next))
}

pub fn compose_request<R: Request>(
    handler: Arc<dyn RequestHandler<R>>,
    behaviors: Vec<Arc<dyn PipelineBehavior<R>>>,
) -> RequestFn<R> {
    let terminal: RequestFn<R> = Arc::new(
        move |request: R,
              cancel: CancellationToken|
              -> BoxFuture<'static, Result<R::Response, MediatorError>> {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler.handle(request, cancel).await })
        },
    );

    wrap_outer_to_inner(terminal, behaviors, |behavior, next| {
        let step: RequestFn<R> = Arc::new(
            move |request: R,
                  cancel: CancellationToken|
                  -> BoxFuture<'static, Result<R::Response, MediatorError>> {
                let behavior = Arc::clone(&behavior);
                let next = Next::new(Arc::clone(&next));
                Box::pin(async move { behavior.handle(request, next, cancel).await })
            },
        );
        step
    })
}

pub fn compose_notification<N: Notification>(
    handler: Arc<dyn NotificationHandler<N>>,
    behaviors: Vec<Arc<dyn NotificationBehavior<N>>>,
) -> NotificationFn<N> {
    let terminal: NotificationFn<N> = Arc::new(
        move |notification: N,
              cancel: CancellationToken|
              -> BoxFuture<'static, Result<(), MediatorError>> {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler.handle(notification, cancel).await })
        },
    );

    wrap_outer_to_inner(terminal, behaviors, |behavior, next| {
        let step: NotificationFn<N> = Arc::new(
            move |notification: N,
                  cancel: CancellationToken|
                  -> BoxFuture<'static, Result<(), MediatorError>> {
                let behavior = Arc::clone(&behavior);
                let next = NotificationNext::new(Arc::clone(&next));
                Box::pin(async move { behavior.handle(notification, next, cancel).await })
            },
        );
        step
    })
}
