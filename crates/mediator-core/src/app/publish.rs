//! Notification fan-out - ハンドラごとのパイプラインを戦略に従って実行する
//!
//! # 戦略
//! - Parallel: すべて同時に開始し、全部が終わるまで待つ。失敗は全員の完了後にまとめて返す
//!   （1 件ならそのエラー自体、複数なら `MediatorError::Aggregate`）
//! - Sequential: 解決順に 1 つずつ待つ。各ハンドラの前にキャンセルを確認し、
//!   最初の失敗で打ち切る

use futures::future::join_all;

use crate::domain::{CancellationToken, DispatchStrategy, MediatorError, Notification};
use crate::typed::NotificationFn;

pub(crate) async fn fan_out<N: Notification>(
    strategy: DispatchStrategy,
    pipelines: Vec<NotificationFn<N>>,
    notification: N,
    cancel: CancellationToken,
) -> Result<(), MediatorError> {
    if pipelines.is_empty() {
        return Ok(());
    }
    match strategy {
        DispatchStrategy::Parallel => parallel(pipelines, notification, cancel).await,
        DispatchStrategy::Sequential => sequential(pipelines, notification, cancel).await,
    }
}

async fn parallel<N: Notification>(
    pipelines: Vec<NotificationFn<N>>,
    notification: N,
    cancel: CancellationToken,
) -> Result<(), MediatorError> {
    let running = pipelines
        .iter()
        .map(|pipeline| pipeline(notification.clone(), cancel.clone()));
    let mut failures: Vec<MediatorError> = join_all(running)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        _ => Err(MediatorError::Aggregate(failures)),
    }
}

async fn sequential<N: Notification>(
    pipelines: Vec<NotificationFn<N>>,
    notification: N,
    cancel: CancellationToken,
) -> Result<(), MediatorError> {
    for pipeline in pipelines {
        cancel.check()?;
        pipeline(notification.clone(), cancel.clone()).await?;
    }
    Ok(())
}
