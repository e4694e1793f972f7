//! DispatchCache - 型をキーにした合成済みパイプラインのメモ表
//!
//! # 構造
//! - Request 側: `(Request 型, Response 型)` → `RequestFn<R>`（1 エントリ 1 パイプライン）
//! - Notification 側: `Notification 型` → `NotificationSlot<N>`（ハンドラごとのパイプラインを追記していく）
//!
//! # 並行性
//! - DashMap の entry().or_insert_with() で原子的に get-or-insert する
//! - 初回ビルドは競合しうる（複数スレッドが同時に build を呼ぶ）。build は登録状態の
//!   純関数なので、どれが勝っても振る舞いは同じ。負けた方は捨てる
//! - build はマップのロック外で実行する。シャードロックを await 越しに持たない
//! - Notification の追記は per-entry の RwLock で守る（短く、await を含まない）
//!
//! エントリは一度作られたら削除しません。Mediator と同じ寿命です。

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{MediatorError, Notification, Request, type_name_of};
use crate::ports::resolver::{ErasedService, downcast_service};
use crate::typed::{NotificationFn, RequestFn};

/// Cache key for the request side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey {
    request: TypeId,
    response: TypeId,
}

impl RequestKey {
    pub fn of<R: Request>() -> Self {
        Self {
            request: TypeId::of::<R>(),
            response: TypeId::of::<R::Response>(),
        }
    }
}

/// Accumulated per-handler pipelines for one notification type.
pub struct NotificationSlot<N: Notification> {
    pipelines: RwLock<Vec<NotificationFn<N>>>,
}

impl<N: Notification> NotificationSlot<N> {
    fn new(pipelines: Vec<NotificationFn<N>>) -> Self {
        Self {
            pipelines: RwLock::new(pipelines),
        }
    }

    fn push(&self, pipeline: NotificationFn<N>) {
        self.pipelines.write().push(pipeline);
    }

    fn snapshot(&self) -> Vec<NotificationFn<N>> {
        self.pipelines.read().clone()
    }

    pub fn len(&self) -> usize {
        self.pipelines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct DispatchCache {
    requests: DashMap<RequestKey, ErasedService>,
    notifications: DashMap<TypeId, ErasedService>,
}

impl DispatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pipeline for `R`, building it on a miss.
    ///
    /// A failed build is not cached.
    pub fn get_or_build_request<R, F>(&self, build: F) -> Result<RequestFn<R>, MediatorError>
    where
        R: Request,
        F: FnOnce() -> Result<RequestFn<R>, MediatorError>,
    {
        let key = RequestKey::of::<R>();
        if let Some(pipeline) = self.cached_request::<R>(&key) {
            tracing::trace!(request = type_name_of::<R>(), "request pipeline cache hit");
            return Ok(pipeline);
        }

        let built = build()?;
        tracing::debug!(request = type_name_of::<R>(), "request pipeline built");

        let erased = self
            .requests
            .entry(key)
            .or_insert_with(|| Arc::new(built.clone()) as ErasedService)
            .clone();
        // the losing side of a first-build race returns the winner's pipeline
        Ok(downcast_service::<RequestFn<R>>(&erased).unwrap_or(built))
    }

    fn cached_request<R: Request>(&self, key: &RequestKey) -> Option<RequestFn<R>> {
        let entry = self.requests.get(key)?;
        downcast_service::<RequestFn<R>>(entry.value())
    }

    /// Snapshot of every per-handler pipeline for `N`. The slot is seeded on first use.
    pub fn get_or_build_notification<N, F>(&self, seed: F) -> Vec<NotificationFn<N>>
    where
        N: Notification,
        F: FnOnce() -> Vec<NotificationFn<N>>,
    {
        self.notification_slot(seed).snapshot()
    }

    /// Append a pipeline to the slot for `N`, seeding the slot first if it is new.
    pub fn accumulate_notification<N, F>(&self, seed: F, pipeline: NotificationFn<N>)
    where
        N: Notification,
        F: FnOnce() -> Vec<NotificationFn<N>>,
    {
        self.notification_slot(seed).push(pipeline);
    }

    fn notification_slot<N, F>(&self, seed: F) -> Arc<NotificationSlot<N>>
    where
        N: Notification,
        F: FnOnce() -> Vec<NotificationFn<N>>,
    {
        let key = TypeId::of::<N>();
        if let Some(slot) = self.cached_notification::<N>(&key) {
            tracing::trace!(notification = type_name_of::<N>(), "notification cache hit");
            return slot;
        }

        let seeded = Arc::new(NotificationSlot::new(seed()));
        tracing::debug!(
            notification = type_name_of::<N>(),
            handlers = seeded.len(),
            "notification pipelines built"
        );

        let erased = self
            .notifications
            .entry(key)
            .or_insert_with(|| Arc::clone(&seeded) as ErasedService)
            .clone();
        erased.downcast::<NotificationSlot<N>>().unwrap_or(seeded)
    }

    fn cached_notification<N: Notification>(
        &self,
        key: &TypeId,
    ) -> Option<Arc<NotificationSlot<N>>> {
        let erased = self.notifications.get(key)?.value().clone();
        erased.downcast::<NotificationSlot<N>>().ok()
    }

    pub fn request_entries(&self) -> usize {
        self.requests.len()
    }

    pub fn notification_entries(&self) -> usize {
        self.notifications.len()
    }
}
